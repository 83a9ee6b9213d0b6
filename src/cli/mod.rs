use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "dramaflow")]
#[command(about = "Short-drama localization workflow engine")]
#[command(long_about = "Dramaflow tracks every language variant of a short drama through AI extraction, \
                       translation, quality check and video compression. Start with 'dramaflow simulate' \
                       to watch a project run through the extraction pipeline.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a demo project through extraction and AI translation on the task queue
    Simulate {
        /// Number of episodes in the demo project
        #[arg(long, default_value = "10", help = "Episodes to extract and translate")]
        episodes: u32,
        /// Target languages for the demo project
        #[arg(long, value_delimiter = ',', default_value = "en,es", help = "Comma separated target languages")]
        languages: Vec<String>,
        /// Override the queue tick interval
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..), help = "Milliseconds between queue ticks")]
        tick_ms: Option<u64>,
        /// Seed the progress and failure sources for a reproducible run
        #[arg(long, help = "Seed for the random progress increments and failures")]
        seed: Option<u64>,
    },
    /// Print the editor policy for a stage and role as JSON
    Policy {
        /// Stage id, e.g. extract_review or quality_check
        #[arg(long)]
        stage: String,
        /// Role, e.g. translator or quality_checker
        #[arg(long)]
        role: String,
        /// Treat the variant as the source language
        #[arg(long)]
        source: bool,
    },
    /// Parse an upload file name and show whether it would overwrite
    Parse {
        /// File name following <title>-<type>-<language>-<episode>.<ext>
        filename: String,
        /// Episodes that already have a file, as language:episode
        #[arg(long = "existing", value_delimiter = ',', help = "Existing uploads, e.g. en:3,es:1")]
        existing: Vec<String>,
    },
    /// Show the effective configuration, optionally writing it to a file
    Config {
        /// Write the configuration as TOML to this path
        #[arg(long)]
        write: Option<PathBuf>,
    },
}
