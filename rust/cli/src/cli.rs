use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Terminal Dou Dizhu with a recoverable, hash-chained game ledger.
#[derive(Debug, Parser)]
#[command(name = "doudizhu", version, about)]
pub struct DoudizhuCli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Play an interactive 3-player game
    Play {
        /// Player names, comma separated
        #[arg(long, value_delimiter = ',', default_value = "Alice,Bob,Cara")]
        names: Vec<String>,
        /// Seed for the session RNG (shuffle, bidding order, tie breaks)
        #[arg(long)]
        seed: Option<u64>,
        /// Resume the most recent session instead of dealing a new one
        #[arg(long)]
        resume: bool,
    },
    /// Verify a ledger file's hash chain
    Verify {
        /// Path to a ledger .jsonl file
        #[arg(long)]
        input: PathBuf,
    },
    /// Rebuild and print the table state recorded in a ledger
    Replay {
        /// Path to a ledger .jsonl file
        #[arg(long)]
        input: PathBuf,
    },
}
