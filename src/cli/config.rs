use anyhow::Result;
use clap::{Args, Subcommand};

use media_relay::config::Config;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a commented config template
    Init,

    /// Print the effective configuration (tokens redacted)
    Show,

    /// Print the config file location
    Path,
}

pub fn run(args: ConfigArgs, path: Option<&str>) -> Result<()> {
    let file = match path {
        Some(p) => std::path::PathBuf::from(shellexpand::tilde(p).to_string()),
        None => Config::config_path()?,
    };

    match args.command {
        ConfigCommands::Init => {
            Config::write_template(&file)?;
            println!("Wrote {}", file.display());
        }
        ConfigCommands::Show => {
            let config = Config::load(path)?;
            print!("{}", config.redacted().to_toml()?);
            if let Err(e) = config.validate() {
                eprintln!("\nWarning: {}", e);
            }
        }
        ConfigCommands::Path => println!("{}", file.display()),
    }
    Ok(())
}
