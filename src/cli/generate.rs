//! Generate command implementation

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::{CommandContext, GenerateArgs, GlobalOptions, OutputFormat};
use crate::error::{Error, Result};
use crate::output::json::{GenerateReport, format_json};
use crate::output::table::{asn_rows, format_table};
use crate::output::{DisplayConfig, Stats, Vendor};
use crate::state::AppState;

/// Run the generate command
pub async fn run(opts: &GlobalOptions, args: &GenerateArgs) -> Result<()> {
    let raw = collect_input(args)?;
    if raw.trim().is_empty() {
        return Err(Error::Other(
            "No ASNs given. Pass them as arguments or with --input".to_string(),
        ));
    }

    let ctx = CommandContext::new(opts).await?;
    let mut state = AppState::new(display_config(ctx.config().display_config(), args));
    state.set_input(raw);

    let spinner = spinner("Fetching prefixes...");
    state.fetch_asns(&ctx.router).await;
    spinner.finish_and_clear();

    ctx.router.flush().await;

    match ctx.format {
        OutputFormat::Text => {
            print!("{}", state.formatted_output());
            print_summary(&state.stats());
        }
        OutputFormat::Table => {
            println!("{}", format_table(&asn_rows(&state.results, &state.display)));
            print_summary(&state.stats());
        }
        OutputFormat::Json => {
            let report = GenerateReport {
                display: &state.display,
                stats: state.stats(),
                results: &state.results,
                config: state.formatted_output(),
            };
            println!("{}", format_json(&report)?);
        }
    }

    Ok(())
}

/// Positional ASNs followed by the contents of `--input`
fn collect_input(args: &GenerateArgs) -> Result<String> {
    let mut raw = args.asns.join(" ");

    if let Some(input) = &args.input {
        raw.push('\n');
        raw.push_str(&read_input(input)?);
    }

    Ok(raw)
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Apply per-run flags on top of the configured display settings
fn display_config(mut display: DisplayConfig, args: &GenerateArgs) -> DisplayConfig {
    if let Some(vendor) = &args.vendor {
        display.vendor = Vendor::from_name(vendor);
    }
    if args.merge {
        display.merge = true;
    }
    if args.per_asn {
        display.merge = false;
    }
    if args.no_ipv4 {
        display.show_ipv4 = false;
    }
    if args.no_ipv6 {
        display.show_ipv6 = false;
    }
    display
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_summary(stats: &Stats) {
    let summary = format!(
        "{} ASNs, {} IPv4, {} IPv6",
        stats.total_asns, stats.ipv4, stats.ipv6
    );
    if stats.errors > 0 {
        eprintln!(
            "{} {}",
            summary.dimmed(),
            format!("({} not found)", stats.errors).yellow()
        );
    } else {
        eprintln!("{}", summary.dimmed());
    }
}
