//! Cache management commands

use colored::Colorize;

use crate::cli::context::{ResolvedConfig, install_generation};
use crate::cli::{GlobalOptions, OutputFormat};
use crate::error::Result;
use crate::output::formatters::{format_size, format_timestamp_local};

/// Show cache status/statistics
pub fn status(opts: &GlobalOptions) -> Result<()> {
    let resolved = ResolvedConfig::load(opts)?;
    let stats = resolved.open_storage()?.stats()?;
    let configured = &resolved.config.cache.generation;

    match opts.format {
        OutputFormat::Json => {
            let generations: Vec<_> = stats
                .generations
                .iter()
                .map(|g| {
                    serde_json::json!({
                        "generation": g.generation,
                        "entries": g.entries,
                        "size_bytes": g.size_bytes,
                    })
                })
                .collect();
            let json = serde_json::json!({
                "path": resolved.cache_dir.display().to_string(),
                "configured_generation": configured,
                "active_generation": stats.active_generation,
                "generations": generations,
                "total_entries": stats.total_entries,
                "total_size_bytes": stats.total_size_bytes,
                "total_size_human": format_size(stats.total_size_bytes),
                "oldest_entry_timestamp": stats.oldest_entry,
                "newest_entry_timestamp": stats.newest_entry,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        _ => {
            println!("Cache Status");
            println!("────────────────────────────────────────");
            println!("Location:       {}", resolved.cache_dir.display());
            match stats.active_generation.as_deref() {
                Some(active) if active == configured => {
                    println!("Generation:     {}", active.green());
                }
                Some(active) => {
                    println!(
                        "Generation:     {} {}",
                        active.yellow(),
                        format!("(configured: {})", configured).dimmed()
                    );
                }
                None => println!("Generation:     {}", "none".dimmed()),
            }
            println!("Entries:        {}", stats.total_entries);
            println!("Total size:     {}", format_size(stats.total_size_bytes));
            for generation in &stats.generations {
                println!(
                    "  {:<14}{} entries, {}",
                    generation.generation,
                    generation.entries,
                    format_size(generation.size_bytes)
                );
            }
            if stats.total_entries > 0 {
                println!("Oldest entry:   {}", format_timestamp_local(stats.oldest_entry));
                println!("Newest entry:   {}", format_timestamp_local(stats.newest_entry));
            }
        }
    }

    Ok(())
}

/// Clear all cache entries
pub fn clear(opts: &GlobalOptions) -> Result<()> {
    let resolved = ResolvedConfig::load(opts)?;
    let stats = resolved.open_storage()?.clear_all()?;

    match opts.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "entries_removed": stats.entries_removed,
                "success": true,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        _ => {
            if stats.entries_removed > 0 {
                println!("Cleared {} cache entries", stats.entries_removed);
            } else {
                println!("Cache was already empty");
            }
        }
    }

    Ok(())
}

/// Show cache path
pub fn path(opts: &GlobalOptions) -> Result<()> {
    let resolved = ResolvedConfig::load(opts)?;
    println!("{}", resolved.cache_dir.display());
    Ok(())
}

/// Install the configured generation, failing loudly if any asset is unreachable
pub async fn install(opts: &GlobalOptions) -> Result<()> {
    let report = install_generation(opts).await?;

    match opts.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "generation": report.generation.as_str(),
                "assets_cached": report.assets_cached,
                "entries_purged": report.entries_purged,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        _ => {
            println!(
                "{} Generation {} active ({} assets cached, {} stale entries purged)",
                "✓".green(),
                report.generation.as_str().bold(),
                report.assets_cached,
                report.entries_purged
            );
        }
    }

    Ok(())
}
