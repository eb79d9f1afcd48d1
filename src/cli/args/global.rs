//! Global CLI options shared across all commands

use std::path::{Path, PathBuf};

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// For most options, the precedence is: CLI flag > environment variable > config file > default.
/// This struct captures the CLI/env layer; config file defaults are resolved later in
/// `CommandContext`.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format (text, table, json)
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.netmirror/config.yaml)
    pub config: Option<PathBuf>,

    /// Backend base URL override
    pub api_host: Option<String>,

    /// Cache directory override
    pub cache_dir: Option<PathBuf>,

    /// Disable the offline cache entirely
    pub no_cache: bool,

    /// Never touch the network; serve from cache only
    pub offline: bool,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            api_host: cli.api_host.clone(),
            cache_dir: cli.cache_dir.clone(),
            no_cache: cli.no_cache,
            offline: cli.offline,
        }
    }

    pub fn config_ref(&self) -> Option<&Path> {
        self.config.as_deref()
    }

    pub fn api_host_ref(&self) -> Option<&str> {
        self.api_host.as_deref()
    }

    pub fn cache_dir_ref(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }
}
