//! # trainprep CLI
//!
//! Command-line interface for the training-corpus preparation pipelines.
//!
//! ## Usage
//!
//! ```bash
//! trainprep pretrain --config ./config/pretrain.toml
//! trainprep synthesize --config ./config/synthesis.toml
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `trainprep pretrain` | Extract repositories and build the token-chunked pretraining dataset |
//! | `trainprep synthesize` | Extract reference files and build SFT train/validation/test splits |
//!
//! Both commands read a TOML configuration file, fetch the configured
//! repositories into the local cache, and write their outputs as JSONL
//! consumable by the downstream trainer.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use trainprep::chunker::ByteTokenizer;
use trainprep::config;
use trainprep::pretrain;
use trainprep::repo_cache::RepoCache;
use trainprep::synthesis;

/// trainprep — prepare pretraining corpora and fine-tuning splits from
/// source repositories and curated conversation examples.
#[derive(Parser)]
#[command(
    name = "trainprep",
    about = "Prepare training corpora from source repositories and curated examples",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Build the pretraining dataset.
    ///
    /// Extracts all matching text files from the configured repositories,
    /// concatenates them (with optional per-file headers), chunks the
    /// corpus into overlapping token windows, and writes `dataset.jsonl`
    /// plus `metadata.json` to the output directory.
    Pretrain {
        /// Path to the pretrain configuration file (TOML).
        #[arg(long)]
        config: PathBuf,

        /// Override the configured output directory.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Itemize per-file skip reasons on stderr.
        #[arg(long)]
        verbose: bool,
    },

    /// Build supervised fine-tuning splits.
    ///
    /// Extracts reference files from the configured repositories, loads
    /// curated conversation examples, injects the configured system
    /// message, and writes seeded train/validation/test JSONL splits.
    Synthesize {
        /// Path to the synthesis configuration file (TOML).
        #[arg(long)]
        config: PathBuf,

        /// Override the configured processed directory.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Itemize per-file skip reasons on stderr.
        #[arg(long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Pretrain {
            config,
            output,
            verbose,
        } => {
            let cfg = config::load_pretrain_config(&config)?;
            let cache = RepoCache::new(&cfg.cache_dir);
            let tokenizer = ByteTokenizer;
            pretrain::run_pretrain(&cfg, cache, &tokenizer, output.as_deref(), verbose)?;
        }
        Commands::Synthesize {
            config,
            output,
            verbose,
        } => {
            let cfg = config::load_synthesis_config(&config)?;
            let cache = RepoCache::new(&cfg.cache_dir);
            synthesis::run_synthesis(&cfg, cache, output.as_deref(), verbose)?;
        }
    }

    Ok(())
}
