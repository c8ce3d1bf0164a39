use anyhow::Result;

use media_relay::concurrency::InstanceLock;
use media_relay::config::Config;
use media_relay::staging::StagingDir;

pub async fn run(config: &Config) -> Result<()> {
    let dir = config.staging_path();
    if !dir.exists() {
        println!("Nothing to purge: {} does not exist", dir.display());
        return Ok(());
    }

    let _lock = InstanceLock::for_staging_dir(&dir)?.acquire()?;
    let removed = StagingDir::new(&dir).purge().await?;
    println!("Removed {} file(s) from {}", removed, dir.display());
    Ok(())
}
