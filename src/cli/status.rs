//! Status command implementation

use colored::Colorize;

use crate::cli::GlobalOptions;
use crate::cli::context::ResolvedConfig;
use crate::error::Result;
use crate::output::formatters::format_size;

/// Run the status command to display configuration and cache state
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "NetMirror Status".bold());

    let resolved = match ResolvedConfig::load(opts) {
        Ok(resolved) => resolved,
        Err(e) => {
            println!("{} Configuration invalid: {}", "✗".red(), e);
            println!("  → Fix the file or run 'netmirror init --force'");
            println!();
            return Ok(());
        }
    };
    let config = &resolved.config;

    if resolved.config_path.exists() {
        println!(
            "{} Config file: {}",
            "✓".green(),
            resolved.config_path.display().to_string().cyan()
        );
    } else {
        println!("{} No config file (using defaults)", "○".dimmed());
        println!("  → Run 'netmirror init' to create one");
    }

    println!("{} API host: {}", "○".dimmed(), config.api_host.cyan());
    println!(
        "{} Output: {} ({}, ipv4 {}, ipv6 {})",
        "○".dimmed(),
        config.output.vendor,
        if config.output.merge { "merged" } else { "per ASN" },
        on_off(config.output.ipv4),
        on_off(config.output.ipv6)
    );

    if opts.offline {
        println!("{} Offline mode: cached data only", "⚠".yellow());
    }

    println!();

    if opts.no_cache {
        println!("{} Cache disabled", "○".dimmed());
        println!();
        return Ok(());
    }

    match resolved.open_storage().and_then(|s| Ok(s.stats()?)) {
        Ok(stats) => {
            println!("Cache: {}", resolved.cache_dir.display().to_string().cyan());
            match stats.active_generation.as_deref() {
                Some(active) if active == config.cache.generation => {
                    println!("{} Generation {} active", "✓".green(), active.bold());
                }
                Some(active) => {
                    println!(
                        "{} Generation {} active, {} configured (installs on next run)",
                        "⚠".yellow(),
                        active,
                        config.cache.generation.bold()
                    );
                }
                None => {
                    println!(
                        "{} No active generation ({} installs on next run)",
                        "○".dimmed(),
                        config.cache.generation.bold()
                    );
                }
            }
            println!(
                "{} {} entries, {}",
                "○".dimmed(),
                stats.total_entries,
                format_size(stats.total_size_bytes)
            );
        }
        Err(e) => println!("{} Cache unavailable: {}", "✗".red(), e),
    }

    println!();
    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}
