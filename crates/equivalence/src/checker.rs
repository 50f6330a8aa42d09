// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The equivalence checker.
//!
//! ```text
//! TestCase ──► gates ──► OperatorInputs::generate ──► duplicate
//!                                                      │        │
//!                                          reference ◄─┘        └─► operator.forward
//!                                                      │        │
//!                                                      └► compare ◄┘
//! ```
//!
//! Each case is a pure compute-and-compare: nothing outlives the call
//! except the returned [`Comparison`].

use std::fmt;

use rand::Rng;
use tensor_core::{DType, Tensor};

use crate::{
    bias_gelu_reference, Capabilities, FusedOperator, OperatorInputs, SkipReason, TestCase,
    Tolerance, ToleranceProfile, VerifyError,
};

/// The first element pair found outside tolerance.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Mismatch {
    pub index: usize,
    pub candidate: f32,
    pub reference: f32,
}

/// Elementwise agreement statistics for one candidate/reference pair.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Comparison {
    pub dtype: DType,
    pub tolerance: Tolerance,
    pub elements: usize,
    pub mismatches: usize,
    /// Largest finite `|candidate - reference|`.
    pub max_abs_error: f64,
    /// Largest finite `|candidate - reference| / |reference|` over non-zero references.
    pub max_rel_error: f64,
    pub first_mismatch: Option<Mismatch>,
}

impl Comparison {
    /// `true` when every element pair is within tolerance.
    pub fn passed(&self) -> bool {
        self.mismatches == 0
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} elements outside {} ({}); max abs err {:.3e}, max rel err {:.3e}",
            self.mismatches,
            self.elements,
            self.tolerance,
            self.dtype,
            self.max_abs_error,
            self.max_rel_error
        )?;
        if let Some(m) = &self.first_mismatch {
            write!(
                f,
                "; first at [{}]: candidate {} vs reference {}",
                m.index, m.candidate, m.reference
            )?;
        }
        Ok(())
    }
}

/// Judges a fused operator against the f32 reference.
///
/// Host capabilities and tolerances are fixed at construction.
#[derive(Debug, Clone)]
pub struct EquivalenceChecker {
    capabilities: Capabilities,
    tolerances: ToleranceProfile,
}

impl EquivalenceChecker {
    pub fn new(capabilities: Capabilities, tolerances: ToleranceProfile) -> Self {
        Self {
            capabilities,
            tolerances,
        }
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn tolerances(&self) -> &ToleranceProfile {
        &self.tolerances
    }

    /// Compares two tensors elementwise under `dtype`'s tolerance.
    ///
    /// # Errors
    /// [`VerifyError::ShapeMismatch`] if the shapes differ and
    /// [`VerifyError::DTypeMismatch`] if either tensor is not in `dtype`.
    pub fn compare(
        &self,
        candidate: &Tensor,
        reference: &Tensor,
        dtype: DType,
    ) -> Result<Comparison, VerifyError> {
        if candidate.shape() != reference.shape() {
            return Err(VerifyError::ShapeMismatch {
                context: "compare",
                lhs: candidate.shape().clone(),
                rhs: reference.shape().clone(),
            });
        }
        for actual in [candidate.dtype(), reference.dtype()] {
            if actual != dtype {
                return Err(VerifyError::DTypeMismatch {
                    context: "compare",
                    expected: dtype,
                    actual,
                });
            }
        }

        let tolerance = self.tolerances.get(dtype);
        let mut cmp = Comparison {
            dtype,
            tolerance,
            elements: candidate.num_elements(),
            mismatches: 0,
            max_abs_error: 0.0,
            max_rel_error: 0.0,
            first_mismatch: None,
        };

        for (index, (c, r)) in candidate
            .view()
            .iter_f32()
            .zip(reference.view().iter_f32())
            .enumerate()
        {
            let abs = (f64::from(c) - f64::from(r)).abs();
            if abs.is_finite() {
                cmp.max_abs_error = cmp.max_abs_error.max(abs);
                if r != 0.0 {
                    cmp.max_rel_error = cmp.max_rel_error.max(abs / f64::from(r).abs());
                }
            }
            if !tolerance.is_close(c, r) {
                cmp.mismatches += 1;
                cmp.first_mismatch.get_or_insert(Mismatch {
                    index,
                    candidate: c,
                    reference: r,
                });
            }
        }

        Ok(cmp)
    }

    /// Like [`compare`](Self::compare), but turns any out-of-tolerance
    /// element into [`VerifyError::EquivalenceViolation`] tagged with `case`.
    pub fn assert_close(
        &self,
        case: &TestCase,
        candidate: &Tensor,
        reference: &Tensor,
    ) -> Result<Comparison, VerifyError> {
        let comparison = self.compare(candidate, reference, case.dtype)?;
        if comparison.passed() {
            Ok(comparison)
        } else {
            tracing::warn!(%case, "{comparison}");
            Err(VerifyError::EquivalenceViolation {
                case: *case,
                comparison,
            })
        }
    }

    /// Runs one parameter combination end to end.
    ///
    /// Returns [`VerifyError::Skip`] when the reference version is too old
    /// or the dtype cannot run here; these are never failures.
    pub fn check_case<R: Rng + ?Sized>(
        &self,
        case: &TestCase,
        operator: &dyn FusedOperator,
        rng: &mut R,
    ) -> Result<Comparison, VerifyError> {
        case.validate()?;
        if let Some(reason) = self.skip_reason(case.dtype, operator) {
            tracing::warn!(%case, "skipping: {reason}");
            return Err(VerifyError::Skip(reason));
        }

        let inputs = OperatorInputs::generate(case, rng)?;
        let (reference_inputs, candidate_inputs) = inputs.duplicate();
        drop(inputs);

        let (activations, bias) = candidate_inputs.into_parts();
        let candidate = operator.forward(&activations, &bias)?;
        let reference = bias_gelu_reference(&reference_inputs)?;

        let comparison = self.assert_close(case, &candidate, &reference)?;
        tracing::debug!(
            %case,
            max_abs_error = comparison.max_abs_error,
            max_rel_error = comparison.max_rel_error,
            "case passed"
        );
        Ok(comparison)
    }

    fn skip_reason(&self, dtype: DType, operator: &dyn FusedOperator) -> Option<SkipReason> {
        if let Some(reason) = self.capabilities.version_gate() {
            return Some(reason);
        }
        if !operator.supports_bf16() && dtype == DType::BF16 {
            return Some(SkipReason::DTypeUnsupported { dtype });
        }
        self.capabilities.dtype_gate(dtype)
    }
}

impl Default for EquivalenceChecker {
    fn default() -> Self {
        Self::new(Capabilities::default(), ToleranceProfile::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CpuBiasGelu, Version};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tensor_core::Shape;

    fn tensor(dtype: DType, values: &[f32]) -> Tensor {
        Tensor::from_f32_as(Shape::vector(values.len()), dtype, values).unwrap()
    }

    #[test]
    fn test_compare_identical() {
        let checker = EquivalenceChecker::default();
        let t = tensor(DType::F32, &[1.0, -2.0, 0.0]);
        let cmp = checker.compare(&t, &t.clone(), DType::F32).unwrap();
        assert!(cmp.passed());
        assert_eq!(cmp.elements, 3);
        assert_eq!(cmp.max_abs_error, 0.0);
        assert_eq!(cmp.first_mismatch, None);
    }

    #[test]
    fn test_compare_reports_first_mismatch() {
        let checker = EquivalenceChecker::default();
        let candidate = tensor(DType::F32, &[1.0, 2.5, 3.0, 9.0]);
        let reference = tensor(DType::F32, &[1.0, 2.0, 3.0, 4.0]);
        let cmp = checker.compare(&candidate, &reference, DType::F32).unwrap();
        assert!(!cmp.passed());
        assert_eq!(cmp.mismatches, 2);
        assert_eq!(cmp.max_abs_error, 5.0);
        assert_eq!(cmp.max_rel_error, 1.25);
        assert_eq!(
            cmp.first_mismatch,
            Some(Mismatch {
                index: 1,
                candidate: 2.5,
                reference: 2.0
            })
        );
    }

    #[test]
    fn test_tolerance_is_per_dtype() {
        let checker = EquivalenceChecker::default();
        // Off by 1e-2 at magnitude 1: outside f32, inside f16.
        let c32 = tensor(DType::F32, &[1.01]);
        let r32 = tensor(DType::F32, &[1.0]);
        assert!(!checker.compare(&c32, &r32, DType::F32).unwrap().passed());

        let c16 = tensor(DType::F16, &[1.01]);
        let r16 = tensor(DType::F16, &[1.0]);
        assert!(checker.compare(&c16, &r16, DType::F16).unwrap().passed());
    }

    #[test]
    fn test_compare_nan_is_mismatch() {
        let checker = EquivalenceChecker::default();
        let candidate = tensor(DType::F32, &[f32::NAN, 1.0]);
        let reference = tensor(DType::F32, &[0.0, 1.0]);
        let cmp = checker.compare(&candidate, &reference, DType::F32).unwrap();
        assert_eq!(cmp.mismatches, 1);
        assert_eq!(cmp.max_abs_error, 0.0);
    }

    #[test]
    fn test_compare_shape_mismatch() {
        let checker = EquivalenceChecker::default();
        let a = tensor(DType::F32, &[1.0, 2.0]);
        let b = tensor(DType::F32, &[1.0, 2.0, 3.0]);
        assert!(matches!(
            checker.compare(&a, &b, DType::F32),
            Err(VerifyError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_compare_dtype_mismatch() {
        let checker = EquivalenceChecker::default();
        let a = tensor(DType::F16, &[1.0]);
        let b = tensor(DType::F32, &[1.0]);
        assert!(matches!(
            checker.compare(&a, &b, DType::F16),
            Err(VerifyError::DTypeMismatch {
                actual: DType::F32,
                ..
            })
        ));
    }

    #[test]
    fn test_assert_close_carries_case() {
        let checker = EquivalenceChecker::default();
        let case = TestCase::new(1, 1, 2, DType::F32);
        let c = Tensor::from_f32(case.activation_shape(), &[0.0, 1.0]).unwrap();
        let r = Tensor::from_f32(case.activation_shape(), &[0.0, 2.0]).unwrap();
        match checker.assert_close(&case, &c, &r) {
            Err(VerifyError::EquivalenceViolation { case: got, comparison }) => {
                assert_eq!(got, case);
                assert_eq!(comparison.mismatches, 1);
            }
            other => panic!("expected violation, got {other:?}"),
        }
    }

    #[test]
    fn test_check_case_smallest_f32() {
        let checker = EquivalenceChecker::default();
        let case = TestCase::new(1, 1, 512, DType::F32);
        let cmp = checker
            .check_case(&case, &CpuBiasGelu, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert!(cmp.passed());
        assert_eq!(cmp.elements, 512);
    }

    #[test]
    fn test_check_case_skips_old_reference() {
        let checker = EquivalenceChecker::new(
            Capabilities {
                reference_version: Version::new(1, 11, 0),
                ..Default::default()
            },
            ToleranceProfile::default(),
        );
        let case = TestCase::new(1, 1, 512, DType::F32);
        let err = checker
            .check_case(&case, &CpuBiasGelu, &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert!(err.is_skip());
    }

    #[test]
    fn test_check_case_rejects_zero_dimension() {
        let checker = EquivalenceChecker::default();
        let case = TestCase::new(0, 1, 512, DType::F32);
        assert!(matches!(
            checker.check_case(&case, &CpuBiasGelu, &mut StdRng::seed_from_u64(0)),
            Err(VerifyError::InvalidCase(_))
        ));
    }
}
