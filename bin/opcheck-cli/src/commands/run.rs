// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `opcheck run` command: run the whole parameter matrix.
//!
//! Cases share no state, so they are fanned out over the blocking pool,
//! at most `--jobs` at a time, and reassembled in matrix order.

use std::sync::Arc;

use equivalence::{
    CaseOutcome, CpuBiasGelu, EquivalenceSuite, FusedOperator, SuiteOutcome, SuiteReport,
    VerifyConfig, VerifyError,
};
use tensor_core::DType;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(clap::Args)]
pub struct RunArgs {
    /// Comma-separated batch sizes (e.g., "1,2").
    #[arg(long)]
    batches: Option<String>,

    /// Comma-separated sequence lengths (e.g., "1,128,255").
    #[arg(long)]
    sequences: Option<String>,

    /// Comma-separated channel counts (e.g., "512,1232,4096").
    #[arg(long)]
    channels: Option<String>,

    /// Comma-separated precisions (e.g., "f16,f32,bf16").
    #[arg(long)]
    dtypes: Option<String>,

    /// Base seed for input generation.
    #[arg(long)]
    seed: Option<u64>,

    /// Installed reference version, checked against the minimum.
    #[arg(long)]
    reference_version: Option<String>,

    /// Number of cases to run concurrently (defaults to online CPU cores).
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Print the report as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn apply(&self, config: &mut VerifyConfig) -> anyhow::Result<()> {
        if let Some(s) = &self.batches {
            config.batches = super::parse_list("batch", s)?;
        }
        if let Some(s) = &self.sequences {
            config.sequences = super::parse_list("sequence", s)?;
        }
        if let Some(s) = &self.channels {
            config.channels = super::parse_list("channel count", s)?;
        }
        if let Some(s) = &self.dtypes {
            config.dtypes = Some(super::parse_list::<DType>("dtype", s)?);
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(v) = &self.reference_version {
            config.reference_version = v.parse()?;
        }
        Ok(())
    }

    fn resolve_jobs(&self) -> usize {
        self.jobs
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4)
            })
            .max(1)
    }
}

pub async fn execute(mut config: VerifyConfig, args: RunArgs) -> anyhow::Result<()> {
    args.apply(&mut config)?;

    let operator: Arc<dyn FusedOperator> = Arc::new(CpuBiasGelu::new());
    let suite = match EquivalenceSuite::load(&config, operator) {
        Ok(suite) => suite,
        Err(VerifyError::Skip(reason)) => {
            if args.json {
                let outcome = SuiteOutcome::Skipped { reason };
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("  SKIPPED: {reason}");
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let jobs = args.resolve_jobs();
    if !args.json {
        super::banner("Equivalence Suite");
        println!("  Operator:   {}", suite.operator_name());
        println!("  Cases:      {}", suite.matrix().len());
        println!("  Seed:       {}", suite.seed());
        println!("  Jobs:       {jobs}");
        println!();
    }

    let outcomes = run_concurrently(&suite, jobs).await?;
    let report = suite.report(outcomes);
    tracing::info!("{}", report.summary());

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&SuiteOutcome::Completed(report.clone()))?
        );
    } else {
        print_table(&report);
    }

    if !report.is_success() {
        anyhow::bail!(
            "{} of {} cases failed",
            report.failed(),
            report.outcomes.len()
        );
    }
    Ok(())
}

async fn run_concurrently(
    suite: &EquivalenceSuite,
    jobs: usize,
) -> anyhow::Result<Vec<CaseOutcome>> {
    let semaphore = Arc::new(Semaphore::new(jobs));
    let mut set = JoinSet::new();

    for (index, case) in suite.cases() {
        let permit = semaphore.clone().acquire_owned().await?;
        let suite = suite.clone();
        set.spawn_blocking(move || {
            let _permit = permit;
            (index, suite.run_case(index, case))
        });
    }

    let mut indexed = Vec::with_capacity(suite.matrix().len());
    while let Some(joined) = set.join_next().await {
        indexed.push(joined?);
    }
    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, outcome)| outcome).collect())
}

fn print_table(report: &SuiteReport) {
    println!(
        "  {:<8} {:>6} {:>9} {:>9} {:>6} {:>12} {:>12}",
        "Status", "Batch", "Sequence", "Channels", "DType", "Max abs", "Max rel",
    );
    println!("  {}", "-".repeat(70));

    for outcome in &report.outcomes {
        let case = outcome.case();
        let (status, abs, rel) = match outcome {
            CaseOutcome::Passed { comparison, .. } => (
                "PASS",
                format!("{:.3e}", comparison.max_abs_error),
                format!("{:.3e}", comparison.max_rel_error),
            ),
            CaseOutcome::Skipped { .. } => ("SKIP", "-".into(), "-".into()),
            CaseOutcome::Failed { comparison, .. } => match comparison {
                Some(c) => (
                    "FAIL",
                    format!("{:.3e}", c.max_abs_error),
                    format!("{:.3e}", c.max_rel_error),
                ),
                None => ("FAIL", "-".into(), "-".into()),
            },
        };
        println!(
            "  {:<8} {:>6} {:>9} {:>9} {:>6} {:>12} {:>12}",
            status, case.batch, case.sequence, case.channels, case.dtype.as_str(), abs, rel,
        );
    }
    println!();

    for outcome in &report.outcomes {
        match outcome {
            CaseOutcome::Skipped { case, reason } => println!("  skip  {case}: {reason}"),
            CaseOutcome::Failed { case, error, .. } => println!("  FAIL  {case}: {error}"),
            CaseOutcome::Passed { .. } => {}
        }
    }

    println!("  {}", report.summary());
}
