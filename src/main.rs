use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};
use media_relay::config::{Config, LoggingConfig};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Config(args) => cli::config::run(args, config_path),
        Commands::Run(args) => {
            let config = Config::load(config_path)?;
            let _guard = init_logging(&config.logging, cli.verbose)?;
            cli::run::run(args, config).await
        }
        Commands::Purge => {
            let config = Config::load(config_path)?;
            let _guard = init_logging(&config.logging, cli.verbose)?;
            cli::purge::run(&config).await
        }
    }
}

/// stderr always; plus a daily-rotated file when `logging.file` is set.
fn init_logging(logging: &LoggingConfig, verbose: bool) -> Result<Option<WorkerGuard>> {
    let log_level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
    };

    let Some(file) = &logging.file else {
        tracing_subscriber::fmt().with_env_filter(filter()).init();
        return Ok(None);
    };

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let path = PathBuf::from(shellexpand::tilde(file).to_string());
    let dir = path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "media-relay.log".to_string());
    std::fs::create_dir_all(&dir)?;

    let file_appender = tracing_appender::rolling::daily(dir, name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter())
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    Ok(Some(guard))
}
