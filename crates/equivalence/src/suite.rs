// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Running the full parameter matrix against one operator.
//!
//! Operator availability is decided once, when the suite is loaded: an
//! unavailable operator skips the whole suite instead of producing one skip
//! per case. Every case gets its own RNG seeded from `(seed, index)`, so
//! cases can run in any order, on any thread, and still reproduce.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{
    Comparison, EquivalenceChecker, FusedOperator, SkipReason, TestCase, TestMatrix, VerifyConfig,
    VerifyError,
};

/// Result of a single case.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaseOutcome {
    Passed {
        case: TestCase,
        comparison: Comparison,
    },
    Skipped {
        case: TestCase,
        reason: SkipReason,
    },
    Failed {
        case: TestCase,
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        comparison: Option<Comparison>,
    },
}

impl CaseOutcome {
    /// Classifies the result of [`EquivalenceChecker::check_case`].
    pub fn from_result(case: TestCase, result: Result<Comparison, VerifyError>) -> Self {
        match result {
            Ok(comparison) => CaseOutcome::Passed { case, comparison },
            Err(VerifyError::Skip(reason)) => CaseOutcome::Skipped { case, reason },
            Err(err) => {
                let error = err.to_string();
                let comparison = match err {
                    VerifyError::EquivalenceViolation { comparison, .. } => Some(comparison),
                    _ => None,
                };
                CaseOutcome::Failed {
                    case,
                    error,
                    comparison,
                }
            }
        }
    }

    pub fn case(&self) -> &TestCase {
        match self {
            CaseOutcome::Passed { case, .. }
            | CaseOutcome::Skipped { case, .. }
            | CaseOutcome::Failed { case, .. } => case,
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, CaseOutcome::Passed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, CaseOutcome::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CaseOutcome::Failed { .. })
    }
}

/// Per-case outcomes of one suite run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SuiteReport {
    pub operator: String,
    pub seed: u64,
    pub outcomes: Vec<CaseOutcome>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_passed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    /// `true` when no case failed. Skips do not count against success.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Returns a human-readable one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "{}: {} cases, {} passed, {} skipped, {} failed (seed {})",
            self.operator,
            self.outcomes.len(),
            self.passed(),
            self.skipped(),
            self.failed(),
            self.seed
        )
    }
}

/// Result of attempting a suite.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "suite", rename_all = "snake_case")]
pub enum SuiteOutcome {
    /// The suite could not load on this host; no case ran.
    Skipped { reason: SkipReason },
    Completed(SuiteReport),
}

impl SuiteOutcome {
    /// `true` unless a case failed.
    pub fn is_success(&self) -> bool {
        match self {
            SuiteOutcome::Skipped { .. } => true,
            SuiteOutcome::Completed(report) => report.is_success(),
        }
    }
}

/// A loaded suite: checker, matrix, and the operator under test.
#[derive(Clone)]
pub struct EquivalenceSuite {
    checker: EquivalenceChecker,
    matrix: TestMatrix,
    seed: u64,
    operator: Arc<dyn FusedOperator>,
}

impl EquivalenceSuite {
    /// Loads a suite, applying the operator-availability gate.
    ///
    /// # Errors
    /// [`VerifyError::Skip`] with [`SkipReason::OperatorUnavailable`] when
    /// the operator cannot run here, and configuration errors for an
    /// invalid matrix.
    pub fn load(
        config: &VerifyConfig,
        operator: Arc<dyn FusedOperator>,
    ) -> Result<Self, VerifyError> {
        let capabilities = config.capabilities(operator.is_available());
        if !capabilities.operator_available {
            let reason = SkipReason::OperatorUnavailable {
                operator: operator.name().to_string(),
            };
            tracing::warn!("suite skipped: {reason}");
            return Err(VerifyError::Skip(reason));
        }
        let matrix = config.matrix()?;
        tracing::info!(
            operator = operator.name(),
            cases = matrix.len(),
            seed = config.seed,
            "equivalence suite loaded"
        );
        Ok(Self {
            checker: EquivalenceChecker::new(capabilities, config.tolerances),
            matrix,
            seed: config.seed,
            operator,
        })
    }

    /// Loads and runs, folding a load-time skip into [`SuiteOutcome::Skipped`].
    pub fn execute(
        config: &VerifyConfig,
        operator: Arc<dyn FusedOperator>,
    ) -> Result<SuiteOutcome, VerifyError> {
        match Self::load(config, operator) {
            Ok(suite) => Ok(SuiteOutcome::Completed(suite.run())),
            Err(VerifyError::Skip(reason)) => Ok(SuiteOutcome::Skipped { reason }),
            Err(e) => Err(e),
        }
    }

    pub fn checker(&self) -> &EquivalenceChecker {
        &self.checker
    }

    pub fn matrix(&self) -> &TestMatrix {
        &self.matrix
    }

    pub fn operator_name(&self) -> &str {
        self.operator.name()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The `(index, case)` pairs this suite will run.
    pub fn cases(&self) -> Vec<(usize, TestCase)> {
        self.matrix.cases().enumerate().collect()
    }

    /// Runs case `index` of the matrix with its dedicated RNG.
    pub fn run_case(&self, index: usize, case: TestCase) -> CaseOutcome {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(index as u64));
        let result = self.checker.check_case(&case, self.operator.as_ref(), &mut rng);
        CaseOutcome::from_result(case, result)
    }

    /// Runs every case sequentially.
    pub fn run(&self) -> SuiteReport {
        let outcomes = self
            .cases()
            .into_iter()
            .map(|(index, case)| self.run_case(index, case))
            .collect();
        let report = self.report(outcomes);
        tracing::info!("{}", report.summary());
        report
    }

    /// Wraps externally collected outcomes (e.g. from parallel workers).
    pub fn report(&self, outcomes: Vec<CaseOutcome>) -> SuiteReport {
        SuiteReport {
            operator: self.operator.name().to_string(),
            seed: self.seed,
            outcomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CpuBiasGelu, Version};
    use tensor_core::DType;

    fn small_config() -> VerifyConfig {
        VerifyConfig {
            batches: vec![1, 2],
            sequences: vec![1, 3],
            channels: vec![8],
            ..Default::default()
        }
    }

    #[test]
    fn test_run_small_matrix_passes() {
        let suite = EquivalenceSuite::load(&small_config(), Arc::new(CpuBiasGelu)).unwrap();
        let report = suite.run();
        assert_eq!(report.outcomes.len(), 2 * 2 * 3);
        assert!(report.is_success(), "{}", report.summary());
        assert_eq!(report.passed(), 12);
    }

    #[test]
    fn test_unavailable_operator_skips_suite() {
        let config = VerifyConfig {
            operator_available: Some(false),
            ..small_config()
        };
        match EquivalenceSuite::execute(&config, Arc::new(CpuBiasGelu)).unwrap() {
            SuiteOutcome::Skipped {
                reason: SkipReason::OperatorUnavailable { operator },
            } => assert_eq!(operator, "cpu-bias-gelu"),
            other => panic!("expected suite skip, got {other:?}"),
        }
    }

    #[test]
    fn test_old_reference_skips_every_case() {
        let config = VerifyConfig {
            reference_version: Version::new(1, 10, 2),
            ..small_config()
        };
        let report = EquivalenceSuite::load(&config, Arc::new(CpuBiasGelu))
            .unwrap()
            .run();
        assert_eq!(report.skipped(), report.outcomes.len());
        assert_eq!(report.passed(), 0);
        assert!(report.is_success());
    }

    #[test]
    fn test_run_case_is_reproducible() {
        let suite = EquivalenceSuite::load(&small_config(), Arc::new(CpuBiasGelu)).unwrap();
        let case = TestCase::new(2, 3, 8, DType::BF16);
        assert_eq!(suite.run_case(5, case), suite.run_case(5, case));
    }

    #[test]
    fn test_invalid_matrix_is_error() {
        let config = VerifyConfig {
            batches: vec![],
            ..small_config()
        };
        assert!(matches!(
            EquivalenceSuite::execute(&config, Arc::new(CpuBiasGelu)),
            Err(VerifyError::InvalidCase(_))
        ));
    }

    #[test]
    fn test_outcome_from_violation_keeps_comparison() {
        let case = TestCase::new(1, 1, 1, DType::F32);
        let comparison = Comparison {
            dtype: DType::F32,
            tolerance: crate::Tolerance::new(0.0, 0.0),
            elements: 1,
            mismatches: 1,
            max_abs_error: 1.0,
            max_rel_error: 1.0,
            first_mismatch: None,
        };
        let outcome = CaseOutcome::from_result(
            case,
            Err(VerifyError::EquivalenceViolation {
                case,
                comparison: comparison.clone(),
            }),
        );
        match outcome {
            CaseOutcome::Failed {
                comparison: Some(c),
                error,
                ..
            } => {
                assert_eq!(c, comparison);
                assert!(error.contains("batch=1 sequence=1 channels=1 dtype=f32"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
