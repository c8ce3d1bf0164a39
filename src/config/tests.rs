use super::*;
use std::collections::HashMap;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn valid_config() -> Config {
    let mut config = Config::default();
    config.bot.token = "111:bot".to_string();
    config.source.token = "222:source".to_string();
    config.relay.destinations = vec!["-1001".to_string(), "@relay_out".to_string()];
    config
}

#[test]
fn defaults_are_sane() {
    let config = Config::default();
    assert_eq!(config.relay.watch_mode, WatchMode::Channel);
    assert_eq!(config.staging.startup_policy, StartupPolicy::Purge);
    assert_eq!(config.relay.queue_capacity, 256);
    assert_eq!(config.bot.api_base, "https://api.telegram.org");
    assert!(config.bot.commands_enabled);
    assert!(config.destination_set().is_empty());
    assert!(config.block_list().is_empty());
}

#[test]
fn parses_toml_sections() {
    let config: Config = toml::from_str(
        r#"
        [bot]
        token = "abc"

        [relay]
        destinations = ["1", "2"]
        blocked_senders = ["9"]
        watch_mode = "filesystem"

        [staging]
        dir = "/tmp/relay"
        startup_policy = "relay"
        "#,
    )
    .unwrap();

    assert_eq!(config.bot.token, "abc");
    assert_eq!(config.bot.poll_timeout, 30);
    assert_eq!(config.relay.watch_mode, WatchMode::Filesystem);
    assert_eq!(config.staging.startup_policy, StartupPolicy::Relay);
    assert_eq!(config.destination_set().len(), 2);
    assert!(config.block_list().contains("9"));
    assert_eq!(config.staging_path(), PathBuf::from("/tmp/relay"));
}

#[test]
fn template_parses() {
    let config: Config = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
    assert_eq!(config.bot.token, "${BOT_TOKEN}");
    assert_eq!(config.relay.watch_mode, WatchMode::Channel);
}

#[test]
fn env_overrides_replace_lists() {
    let mut config = Config::default();
    config.relay.destinations = vec!["1".to_string()];
    config.apply_env_overrides(env(&[
        ("BOT_TOKEN", " 111:bot "),
        ("CHAT_IDS", "-1001, -1002,,"),
        ("BLOCKED_CHAT_IDS", "7,8"),
        ("MEDIA_RELAY_STAGING_DIR", "/data/staging"),
    ]));

    assert_eq!(config.bot.token, "111:bot");
    assert_eq!(config.relay.destinations, vec!["-1001", "-1002"]);
    assert_eq!(config.relay.blocked_senders, vec!["7", "8"]);
    assert_eq!(config.staging.dir, "/data/staging");
}

#[test]
fn blocked_ids_alias_is_accepted() {
    let mut config = Config::default();
    config.apply_env_overrides(env(&[("BLOCKED_IDS", "9")]));
    assert_eq!(config.relay.blocked_senders, vec!["9"]);

    // The canonical name wins when both are set.
    config.apply_env_overrides(env(&[("BLOCKED_IDS", "9"), ("BLOCKED_CHAT_IDS", "3, 4")]));
    assert_eq!(config.relay.blocked_senders, vec!["3", "4"]);
    assert!(config.block_list().contains("4"));
}

#[test]
fn missing_env_keeps_file_values() {
    let mut config = Config::default();
    config.relay.blocked_senders = vec!["5".to_string()];
    config.apply_env_overrides(env(&[]));
    assert_eq!(config.relay.blocked_senders, vec!["5"]);
}

#[test]
fn empty_chat_ids_means_no_destinations() {
    let mut config = valid_config();
    config.apply_env_overrides(env(&[("CHAT_IDS", "")]));
    assert!(config.destination_set().is_empty());
    assert!(config.validate().is_ok());
}

#[test]
fn validation() {
    assert!(valid_config().validate().is_ok());

    let mut config = valid_config();
    config.bot.token.clear();
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.source.token = config.bot.token.clone();
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.relay.queue_capacity = 0;
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.relay.destinations.push("not a chat".to_string());
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("not a chat"));
}

#[test]
fn redacted_hides_tokens() {
    let redacted = valid_config().redacted();
    assert_eq!(redacted.bot.token, "111:***");
    assert!(!redacted.to_toml().unwrap().contains("111:bot"));
}

#[test]
fn load_missing_file_gives_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("absent.toml");
    let config = Config::load(path.to_str()).unwrap();
    assert_eq!(config.relay.queue_capacity, 256);
}

#[test]
fn write_template_refuses_to_overwrite() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("conf").join("config.toml");
    Config::write_template(&path).unwrap();
    assert!(path.exists());
    assert!(Config::write_template(&path).is_err());
}
