// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `opcheck tolerances` command: print the active tolerance table.

use equivalence::VerifyConfig;

pub async fn execute(config: VerifyConfig) -> anyhow::Result<()> {
    super::banner("Tolerance Profile");

    println!("  {:<6} {:>10} {:>10}  {}", "DType", "rtol", "atol", "Storage");
    println!("  {}", "-".repeat(40));
    for (dtype, tol) in config.tolerances.iter() {
        let storage = if dtype.is_reduced_precision() {
            "16-bit"
        } else {
            "32-bit"
        };
        println!(
            "  {:<6} {:>10.1e} {:>10.1e}  {storage}",
            dtype.as_str(),
            tol.rtol,
            tol.atol,
        );
    }
    println!();
    println!("  close(c, r)  <=>  |c - r| <= atol + rtol * |r|");
    Ok(())
}
