//! Init command implementation

use std::path::Path;

use colored::Colorize;

use crate::cli::GlobalOptions;
use crate::config::Config;
use crate::error::{ConfigError, Result};

/// Write a default configuration file, refusing to clobber one unless forced
pub fn run(opts: &GlobalOptions, force: bool) -> Result<()> {
    let path = match opts.config_ref() {
        Some(path) => path.to_path_buf(),
        None => Config::default_path()?,
    };

    let config = write_default(&path, opts, force)?;

    println!("{}", "✓ Configuration written".green());
    println!("Config file: {}", path.display().to_string().cyan());
    println!("API host:    {}", config.api_host);
    println!("Generation:  {}", config.cache.generation);
    println!();
    println!(
        "Edit {} to list assets to pre-cache for offline use.",
        "cache.assets".cyan()
    );
    Ok(())
}

fn write_default(path: &Path, opts: &GlobalOptions, force: bool) -> Result<Config> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path.display().to_string()).into());
    }

    let mut config = Config::default();
    if let Some(host) = opts.api_host_ref() {
        config.api_host = host.to_string();
    }
    if let Some(dir) = opts.cache_dir_ref() {
        config.cache.dir = Some(dir.to_path_buf());
    }
    config.validate()?;
    config.save_to(path)?;

    Ok(config)
}
