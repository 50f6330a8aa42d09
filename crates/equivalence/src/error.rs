// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for equivalence checking.
//!
//! Skips and failures travel through the same enum but are kept apart by
//! [`VerifyError::is_skip`]: a missing capability is never reported as a
//! correctness failure.

use std::fmt;

use tensor_core::{DType, Shape, TensorError};

use crate::{Comparison, TestCase, Version};

/// Why a case (or a whole suite) was skipped rather than run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The fused operator is not available on this host.
    OperatorUnavailable { operator: String },
    /// The reference implementation is older than the minimum version at
    /// which its GELU matches the fused kernel's numerics.
    VersionTooLow { found: Version, required: Version },
    /// The host cannot run this precision (bf16 without hardware support).
    DTypeUnsupported { dtype: DType },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::OperatorUnavailable { operator } => {
                write!(f, "operator '{operator}' is not available on this system")
            }
            SkipReason::VersionTooLow { found, required } => write!(
                f,
                "reference gelu matches only from version {required} (found {found})"
            ),
            SkipReason::DTypeUnsupported { dtype } => {
                write!(f, "dtype {dtype} is not supported on this system")
            }
        }
    }
}

/// Errors that can occur while verifying an operator.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The environment lacks a required capability. Not a failure.
    #[error("skipped: {0}")]
    Skip(SkipReason),

    /// Candidate and reference diverge beyond the dtype's tolerance.
    #[error("equivalence violation for {case}: {comparison}")]
    EquivalenceViolation {
        case: TestCase,
        comparison: Comparison,
    },

    /// Tensors that must agree in shape do not.
    #[error("shape mismatch in {context}: {lhs} vs {rhs}")]
    ShapeMismatch {
        context: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    /// Tensors that must agree in precision do not.
    #[error("dtype mismatch in {context}: expected {expected}, got {actual}")]
    DTypeMismatch {
        context: &'static str,
        expected: DType,
        actual: DType,
    },

    /// A test case has a non-positive dimension.
    #[error("invalid test case: {0}")]
    InvalidCase(String),

    /// A tensor operation failed.
    #[error("tensor error: {0}")]
    Tensor(#[from] TensorError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl VerifyError {
    /// Returns `true` if this error is a skip signal rather than a failure.
    pub fn is_skip(&self) -> bool {
        matches!(self, VerifyError::Skip(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_is_distinguishable() {
        let skip = VerifyError::Skip(SkipReason::DTypeUnsupported { dtype: DType::BF16 });
        assert!(skip.is_skip());
        assert_eq!(
            skip.to_string(),
            "skipped: dtype bf16 is not supported on this system"
        );

        let fail = VerifyError::InvalidCase("batch must be positive".into());
        assert!(!fail.is_skip());
    }

    #[test]
    fn test_version_skip_message() {
        let reason = SkipReason::VersionTooLow {
            found: Version::new(1, 11, 0),
            required: Version::new(1, 12, 0),
        };
        assert_eq!(
            reason.to_string(),
            "reference gelu matches only from version 1.12.0 (found 1.11.0)"
        );
    }

    #[test]
    fn test_tensor_error_converts() {
        let err: VerifyError = TensorError::UnknownDType("i8".into()).into();
        assert!(matches!(err, VerifyError::Tensor(_)));
    }
}
