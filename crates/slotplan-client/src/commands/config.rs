//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.validate()?;
    let planner = config.planner_config()?;
    println!(
        "Working hours {}-{}, buffer {} min, store {}",
        planner.working_hours.start.format("%H:%M"),
        planner.working_hours.end.format("%H:%M"),
        planner.default_buffer.num_minutes(),
        config.store_path().display()
    );
    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration and store paths.
pub fn path(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    println!("config: {}", path.display());
    println!("store: {}", config.store_path().display());
    Ok(())
}
