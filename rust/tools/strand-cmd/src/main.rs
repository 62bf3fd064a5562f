use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "strand-cmd")]
#[command(about = "Command-line utility for columnar extraction of wire-format messages")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode selected fields of length-delimited messages into columns
    Decode {
        /// Path to the JSON decode configuration (fields and options)
        #[arg(short, long)]
        config: String,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// File of messages, each preceded by its varint length
        file: String,
    },

    /// Dump the field tags and payloads of length-delimited messages
    Inspect {
        /// Number of messages to dump
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Increase verbosity (-v shows payload contents)
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,

        /// File of messages, each preceded by its varint length
        file: String,
    },

    /// Convert definition/repetition levels into parent indices
    Levels {
        /// Root-first repetition pattern, e.g. "repeated,optional,repeated"
        #[arg(short, long)]
        pattern: String,

        /// Split the levels into batches of this many records
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// Level pairs as "definition:repetition"
        #[arg(required = true)]
        levels: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Decode {
            config,
            pretty,
            file,
        } => commands::decode::run(config, file, pretty),
        Commands::Inspect {
            count,
            verbose,
            file,
        } => commands::inspect::run(count, verbose, file),
        Commands::Levels {
            pattern,
            batch_size,
            levels,
        } => commands::levels::run(pattern, levels, batch_size),
    }
}
