//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
pub use clap_complete::Shell;

pub mod args;
pub mod cache;
pub mod context;
pub mod generate;
pub mod get;
pub mod init;
pub mod status;

pub use args::{GlobalOptions, OutputFormat};
pub use context::CommandContext;

/// NetMirror - offline-capable ASN prefix-list generator
#[derive(Parser, Debug)]
#[command(name = "netmirror")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text, table, json)
    #[arg(
        long,
        global = true,
        env = "NETMIRROR_FORMAT",
        default_value = "text",
        hide_env = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "NETMIRROR_CONFIG", hide_env = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true, env = "NETMIRROR_API_HOST", hide_env = true)]
    pub api_host: Option<String>,

    /// Override cache directory
    #[arg(long, global = true, env = "NETMIRROR_CACHE_DIR", hide_env = true)]
    pub cache_dir: Option<PathBuf>,

    /// Disable the offline cache
    #[arg(long, global = true, env = "NETMIRROR_NO_CACHE", hide_env = true)]
    pub no_cache: bool,

    /// Serve from the cache only, never touching the network
    #[arg(long, global = true, env = "NETMIRROR_OFFLINE", hide_env = true)]
    pub offline: bool,

    /// Enable debug logging
    #[arg(long, global = true, env = "NETMIRROR_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate router prefix lists for one or more ASNs
    Generate(GenerateArgs),

    /// Retrieve a single backend path through the cache router
    Get {
        /// Root-relative path, e.g. /api/asn/13335.json
        path: String,
    },

    /// Manage the offline cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Show configuration and cache status
    Status,

    /// Generate shell completions
    #[command(after_help = "\
Examples:
  bash:   netmirror completion bash > /etc/bash_completion.d/netmirror
  zsh:    netmirror completion zsh > \"${fpath[1]}/_netmirror\"
  fish:   netmirror completion fish > ~/.config/fish/completions/netmirror.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Display version information
    Version,
}

/// Arguments for `generate`
#[derive(Debug, Clone, Args, Default)]
pub struct GenerateArgs {
    /// ASNs separated by spaces or commas (e.g. 13335 15169,32934)
    pub asns: Vec<String>,

    /// Read additional ASNs from a file ("-" for stdin)
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Router dialect: cisco, huawei, juniper, mikrotik, mikrotik_route, bird
    #[arg(long, short = 'v')]
    pub vendor: Option<String>,

    /// Merge all ASNs into one list
    #[arg(long, conflicts_with = "per_asn")]
    pub merge: bool,

    /// Emit one list per ASN
    #[arg(long)]
    pub per_asn: bool,

    /// Exclude IPv4 prefixes
    #[arg(long)]
    pub no_ipv4: bool,

    /// Exclude IPv6 prefixes
    #[arg(long)]
    pub no_ipv6: bool,
}

/// Cache management subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache statistics
    Status,
    /// Clear all cached data
    Clear,
    /// Print cache directory path
    Path,
    /// Install and activate the configured cache generation
    Install,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::parse_from([
            "netmirror",
            "generate",
            "13335",
            "15169,32934",
            "--vendor",
            "juniper",
            "--per-asn",
            "--no-ipv6",
        ]);

        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.asns, vec!["13335", "15169,32934"]);
                assert_eq!(args.vendor.as_deref(), Some("juniper"));
                assert!(args.per_asn);
                assert!(!args.merge);
                assert!(args.no_ipv6);
                assert!(!args.no_ipv4);
            }
            other => panic!("Expected generate, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_conflicts_with_per_asn() {
        let result = Cli::try_parse_from(["netmirror", "generate", "1", "--merge", "--per-asn"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_cache_install() {
        let cli = Cli::parse_from(["netmirror", "--no-cache", "cache", "install"]);
        assert!(matches!(cli.command, Commands::Cache(CacheCommands::Install)));
        assert!(cli.no_cache);
    }
}
