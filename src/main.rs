//! NetMirror CLI - offline-capable ASN prefix-list generator

use clap::{CommandFactory, Parser};

mod cache;
mod cli;
mod client;
mod config;
mod error;
mod models;
mod output;
mod state;

use cli::{CacheCommands, Cli, Commands, GlobalOptions};
use error::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// Default level is `warn`, `debug` for this crate with `--debug`; `RUST_LOG` wins
fn init_logging(debug: bool) {
    let default_filter = if debug { "netmirror=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Generate(args) => cli::generate::run(&opts, &args).await,
        Commands::Get { path } => cli::get::run(&opts, &path).await,
        Commands::Cache(cache_cmd) => match cache_cmd {
            CacheCommands::Status => cli::cache::status(&opts),
            CacheCommands::Clear => cli::cache::clear(&opts),
            CacheCommands::Path => cli::cache::path(&opts),
            CacheCommands::Install => cli::cache::install(&opts).await,
        },
        Commands::Init { force } => cli::init::run(&opts, force),
        Commands::Status => cli::status::run(&opts),
        Commands::Completion { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "netmirror", &mut std::io::stdout());
            Ok(())
        }
        Commands::Version => {
            println!("netmirror version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
