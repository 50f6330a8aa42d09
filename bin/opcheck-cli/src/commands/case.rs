// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `opcheck case` command: run and explain one parameter combination.

use equivalence::{
    CpuBiasGelu, EquivalenceChecker, FusedOperator, TestCase, VerifyConfig, VerifyError,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tensor_core::DType;

pub async fn execute(
    config: VerifyConfig,
    batch: usize,
    sequence: usize,
    channels: usize,
    dtype: String,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let dtype: DType = dtype.parse()?;
    let case = TestCase::new(batch, sequence, channels, dtype);
    let seed = seed.unwrap_or(config.seed);

    let operator = CpuBiasGelu::new();
    let capabilities = config.capabilities(operator.is_available());
    let checker = EquivalenceChecker::new(capabilities, config.tolerances);

    super::banner("Single Case");
    println!("  Operator:   {}", operator.name());
    println!("  Case:       {case}");
    println!("  Tolerance:  {}", checker.tolerances().get(dtype));
    println!("  Seed:       {seed}");
    println!();

    if !checker.capabilities().operator_available {
        println!("  SKIPPED: operator '{}' is not available", operator.name());
        return Ok(());
    }

    let mut rng = StdRng::seed_from_u64(seed);
    match checker.check_case(&case, &operator, &mut rng) {
        Ok(comparison) => {
            println!("  PASS  {comparison}");
            Ok(())
        }
        Err(VerifyError::Skip(reason)) => {
            println!("  SKIP  {reason}");
            Ok(())
        }
        Err(e) => {
            println!("  FAIL  {e}");
            Err(e.into())
        }
    }
}
