// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # opcheck
//!
//! Command-line interface for the fused bias+GELU equivalence checker.
//!
//! ## Usage
//! ```bash
//! # Run the default batch × sequence × channels × dtype matrix
//! opcheck run
//!
//! # Narrow the matrix and run cases on 4 worker threads
//! opcheck run --channels 512,4096 --dtypes f16,bf16 --jobs 4
//!
//! # Reproduce a single case
//! opcheck case --batch 2 --sequence 255 --channels 4096 --dtype f16
//!
//! # Show the active tolerance profile
//! opcheck tolerances
//! ```
//!
//! Exit status is non-zero when any case fails. Skips are not failures.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "opcheck",
    about = "Numerical equivalence checks for fused bias+GELU kernels",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file (CLI arguments override it).
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every case of the parameter matrix.
    Run(commands::run::RunArgs),

    /// Run a single (batch, sequence, channels, dtype) case.
    Case {
        #[arg(short, long)]
        batch: usize,

        #[arg(short, long)]
        sequence: usize,

        #[arg(short = 'n', long)]
        channels: usize,

        /// Precision: f32, f16, bf16.
        #[arg(short, long, default_value = "f32")]
        dtype: String,

        /// Seed for input generation (defaults to the configured seed).
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the tolerance profile in effect.
    Tolerances,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(config, args).await,
        Commands::Case {
            batch,
            sequence,
            channels,
            dtype,
            seed,
        } => commands::case::execute(config, batch, sequence, channels, dtype, seed).await,
        Commands::Tolerances => commands::tolerances::execute(config).await,
    }
}
