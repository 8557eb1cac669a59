//! Show or initialize the configuration.

use flipbook_common::config::AppConfig;

pub fn run(config: AppConfig, init: bool) -> anyhow::Result<()> {
    let path = AppConfig::path();
    if init {
        config.save()?;
        println!("Wrote configuration: {}", path.display());
        return Ok(());
    }

    println!("Config file: {}", path.display());
    if !path.exists() {
        println!("  (not found, showing defaults)");
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
