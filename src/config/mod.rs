#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingress::telegram_client::DEFAULT_API_BASE;
use crate::ingress::BlockList;
use crate::relay::DestinationSet;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub relay: RelayConfig,

    #[serde(default)]
    pub staging: StagingConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The bot account that delivers to the destination chats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Bot API token. `${VAR}` references are expanded.
    #[serde(default)]
    pub token: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Long polling timeout in seconds for the command listener
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout: u64,

    /// Answer `/start` with the chat id
    #[serde(default = "default_true")]
    pub commands_enabled: bool,
}

/// The account whose inbound media is captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub token: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_poll_timeout")]
    pub poll_timeout: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WatchMode {
    /// Ingestion hands staged files to the relay over an in-process queue.
    #[default]
    Channel,
    /// Additionally relay files other processes finish writing into the
    /// staging directory.
    Filesystem,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Destination chat ids (numeric ids or `@channel` usernames)
    #[serde(default)]
    pub destinations: Vec<String>,

    /// Sender ids whose media is never relayed
    #[serde(default)]
    pub blocked_senders: Vec<String>,

    #[serde(default)]
    pub watch_mode: WatchMode,

    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StartupPolicy {
    /// Delete leftovers from a previous run without relaying them.
    #[default]
    Purge,
    /// Relay leftovers once, then delete them.
    Relay,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    #[serde(default = "default_staging_dir")]
    pub dir: String,

    #[serde(default)]
    pub startup_policy: StartupPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout for Bot API calls, uploads included
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Daily-rotated log file; stderr only when unset
    #[serde(default)]
    pub file: Option<String>,
}

// Default value functions
fn default_true() -> bool {
    true
}
fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}
fn default_poll_timeout() -> u64 {
    30
}
fn default_queue_capacity() -> usize {
    256
}
fn default_staging_dir() -> String {
    "~/.media-relay/staging".to_string()
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: default_api_base(),
            poll_timeout: default_poll_timeout(),
            commands_enabled: default_true(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: default_api_base(),
            poll_timeout: default_poll_timeout(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            destinations: Vec::new(),
            blocked_senders: Vec::new(),
            watch_mode: WatchMode::default(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            dir: default_staging_dir(),
            startup_policy: StartupPolicy::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Config {
    /// Load the config file (defaults when it does not exist), then apply
    /// environment overrides. Call [`Config::validate`] before running the
    /// bridge.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let path = match path {
            Some(p) => PathBuf::from(shellexpand::tilde(p).to_string()),
            None => Self::config_path()?,
        };

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Config::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.expand_env_vars();
        Ok(config)
    }

    pub fn config_path() -> Result<PathBuf> {
        let base = directories::BaseDirs::new()
            .context("Could not determine home directory")?;
        Ok(base.home_dir().join(".media-relay").join("config.toml"))
    }

    /// Environment variables win over the file:
    /// `BOT_TOKEN`, `SOURCE_BOT_TOKEN`, `CHAT_IDS`, `BLOCKED_CHAT_IDS`
    /// (`BLOCKED_IDS` is accepted as an alias), `MEDIA_RELAY_STAGING_DIR`.
    /// Lists are comma separated.
    pub fn apply_env_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = var("BOT_TOKEN") {
            self.bot.token = token.trim().to_string();
        }
        if let Some(token) = var("SOURCE_BOT_TOKEN") {
            self.source.token = token.trim().to_string();
        }
        if let Some(ids) = var("CHAT_IDS") {
            self.relay.destinations = split_list(&ids);
        }
        if let Some(ids) = var("BLOCKED_CHAT_IDS").or_else(|| var("BLOCKED_IDS")) {
            self.relay.blocked_senders = split_list(&ids);
        }
        if let Some(dir) = var("MEDIA_RELAY_STAGING_DIR") {
            if !dir.trim().is_empty() {
                self.staging.dir = dir.trim().to_string();
            }
        }
    }

    fn expand_env_vars(&mut self) {
        self.bot.token = expand_env(&self.bot.token);
        self.source.token = expand_env(&self.source.token);
    }

    pub fn validate(&self) -> Result<()> {
        if self.bot.token.trim().is_empty() {
            anyhow::bail!("Bot token is missing (set bot.token or BOT_TOKEN)");
        }
        if self.source.token.trim().is_empty() {
            anyhow::bail!("Source account token is missing (set source.token or SOURCE_BOT_TOKEN)");
        }
        if self.source.token.trim() == self.bot.token.trim() {
            anyhow::bail!("Source and bot accounts must use different tokens");
        }
        if self.relay.queue_capacity == 0 {
            anyhow::bail!("relay.queue_capacity must be greater than 0");
        }
        for chat in &self.relay.destinations {
            if !is_valid_chat_id(chat) {
                anyhow::bail!(
                    "Invalid destination chat id '{}': expected a number or @username",
                    chat
                );
            }
        }
        if self.staging.dir.trim().is_empty() {
            anyhow::bail!("staging.dir cannot be empty");
        }

        Ok(())
    }

    pub fn staging_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.staging.dir).to_string())
    }

    pub fn destination_set(&self) -> DestinationSet {
        DestinationSet::new(&self.relay.destinations)
    }

    pub fn block_list(&self) -> BlockList {
        BlockList::new(&self.relay.blocked_senders)
    }

    /// Copy with tokens masked, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.bot.token = redact(&config.bot.token);
        config.source.token = redact(&config.source.token);
        config
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the commented template, refusing to overwrite an existing file.
    pub fn write_template(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists: {}", path.display());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
        Ok(())
    }
}

/// Comma separated list, blanks dropped.
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_valid_chat_id(chat: &str) -> bool {
    chat.parse::<i64>().is_ok()
        || chat
            .strip_prefix('@')
            .map(|name| !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(false)
}

fn redact(token: &str) -> String {
    if token.is_empty() {
        String::new()
    } else {
        let visible: String = token.chars().take(4).collect();
        format!("{}***", visible)
    }
}

fn expand_env(s: &str) -> String {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).unwrap_or_else(|_| s.to_string())
    } else if let Some(var_name) = s.strip_prefix('$') {
        std::env::var(var_name).unwrap_or_else(|_| s.to_string())
    } else {
        s.to_string()
    }
}

/// Default config template with helpful comments (used by `config init`)
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# media-relay configuration
# Environment variables override these values:
#   BOT_TOKEN, SOURCE_BOT_TOKEN, CHAT_IDS, BLOCKED_CHAT_IDS, MEDIA_RELAY_STAGING_DIR

[bot]
# Account that delivers media to the destination chats
token = "${BOT_TOKEN}"
# Answer /start with the chat id
commands_enabled = true

[source]
# Account whose inbound media is captured
token = "${SOURCE_BOT_TOKEN}"

[relay]
# Chats every file is sent to (numeric ids or @channel usernames)
destinations = []
# Senders whose media is ignored
blocked_senders = []
# "channel": ingestion hands files to the relay directly (default)
# "filesystem": also relay files other processes write into the staging directory
watch_mode = "channel"

[staging]
dir = "~/.media-relay/staging"
# What to do with files left over from a previous run: "purge" or "relay"
startup_policy = "purge"

[http]
timeout_secs = 120

[logging]
level = "info"
# file = "~/.media-relay/logs/relay.log"
"#;
