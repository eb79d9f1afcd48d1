//! Common CLI types shared across commands

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Text format - router configuration lines, ready to paste
    #[default]
    Text,
    /// Table format - one summary row per ASN
    Table,
    /// JSON format - results, stats and rendered text for scripts
    Json,
}
