// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared CLI plumbing.

pub mod case;
pub mod run;
pub mod tolerances;

use std::path::Path;

use equivalence::VerifyConfig;
use tracing_subscriber::EnvFilter;

/// Initialises the tracing subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Loads the config file if given, else the built-in defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<VerifyConfig> {
    match path {
        Some(p) => {
            let config = VerifyConfig::from_file(p)?;
            tracing::info!("loaded config from {}", p.display());
            Ok(config)
        }
        None => Ok(VerifyConfig::default()),
    }
}

/// Parses a comma-separated list such as `"1,128,255"`.
pub fn parse_list<T>(label: &str, s: &str) -> anyhow::Result<Vec<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse::<T>()
                .map_err(|e| anyhow::anyhow!("invalid {label} '{p}': {e}"))
        })
        .collect()
}

/// Prints the boxed banner used at the top of every command.
pub fn banner(title: &str) {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║ {:<52} ║", format!("opcheck · {title}"));
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
}
