//! fxarchive CLI - keeps a local FXT tick archive of the Dukascopy datafeed.

use clap::{CommandFactory, Parser, Subcommand};
use fxarchive_lib::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

#[derive(Parser)]
#[command(name = "fxarchive")]
#[command(about = "Local FXT tick archive of the Dukascopy datafeed", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (warnings only, no progress output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Archive root directory. Defaults to the platform data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Bring the archive of one or more symbols up to date
    Sync {
        /// Symbols to synchronise (e.g., EURUSD). Defaults to the whole catalog.
        symbols: Vec<String>,

        /// Keep downloaded bi5 files in the provider cache
        #[arg(long)]
        keep_compressed_cache: bool,

        /// Keep decompressed bi5 payloads in the provider cache
        #[arg(long)]
        keep_decompressed_cache: bool,

        /// Also write uncompressed tick files (.bin)
        #[arg(long)]
        store_uncompressed: bool,

        /// Do not write compressed tick files (.rar); requires --store-uncompressed
        #[arg(long)]
        no_compressed: bool,

        /// Do not record missing hours as marker files
        #[arg(long)]
        no_error_markers: bool,
    },

    /// Show the first available data of a symbol, or of all symbols
    HistoryStart {
        /// Symbol name. Without it the provider's combined file is shown.
        symbol: Option<String>,
    },

    /// List catalog symbols
    List {
        /// Filter by instrument type (forex, metals, index, commodity, crypto)
        #[arg(short = 't', long = "type")]
        instrument_type: Option<String>,

        /// Search pattern
        #[arg(short, long)]
        search: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        return match Cli::command().print_help() {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        };
    };

    let mut config = cli
        .data_dir
        .map_or_else(SyncConfig::default, SyncConfig::with_data_root);

    let result = match command {
        Commands::Sync {
            symbols,
            keep_compressed_cache,
            keep_decompressed_cache,
            store_uncompressed,
            no_compressed,
            no_error_markers,
        } => {
            config.keep_compressed_cache = keep_compressed_cache;
            config.keep_decompressed_cache = keep_decompressed_cache;
            config.persist_raw = keep_compressed_cache;
            config.store_uncompressed = store_uncompressed;
            config.store_compressed = !no_compressed;
            config.persist_errors = !no_error_markers;
            commands::sync::sync(&symbols, config, cli.quiet).await
        }
        Commands::HistoryStart { symbol } => {
            commands::history_start::history_start(symbol.as_deref(), &config).await
        }
        Commands::List {
            instrument_type,
            search,
        } => commands::list::list_symbols(instrument_type.as_deref(), search.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Installs the log subscriber; `RUST_LOG` takes precedence over the flags.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 0)
        .init();
}
