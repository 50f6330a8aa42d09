// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # equivalence
//!
//! Decides whether a fused, precision-reduced `gelu(activations + bias)`
//! kernel is an acceptable approximation of its mathematical reference.
//!
//! # Key Components
//!
//! - [`EquivalenceChecker`] — compares candidate and reference tensors
//!   under a per-dtype tolerance and runs single cases end to end.
//! - [`ToleranceProfile`] — the `(rtol, atol)` table keyed by [`DType`].
//! - [`Capabilities`] — explicit host capability gates (operator present,
//!   bf16 usable, reference version).
//! - [`OperatorInputs`] — validated `(activations, bias)` pairs.
//! - [`FusedOperator`] — the seam for the operator under test.
//! - [`EquivalenceSuite`] — the batch × sequence × channels × dtype matrix.
//!
//! # Outcomes
//!
//! ```text
//! capability missing  ──► Skip       (never a failure)
//! beyond tolerance    ──► EquivalenceViolation { case, comparison }
//! malformed inputs    ──► ShapeMismatch / DTypeMismatch (fail fast)
//! ```
//!
//! # Example
//! ```
//! use equivalence::{CpuBiasGelu, EquivalenceChecker, TestCase};
//! use rand::{rngs::StdRng, SeedableRng};
//! use tensor_core::DType;
//!
//! let checker = EquivalenceChecker::default();
//! let case = TestCase::new(1, 1, 512, DType::F32);
//! let cmp = checker
//!     .check_case(&case, &CpuBiasGelu, &mut StdRng::seed_from_u64(0))
//!     .unwrap();
//! assert!(cmp.passed());
//! ```
//!
//! [`DType`]: tensor_core::DType

mod capability;
mod checker;
mod config;
mod error;
mod inputs;
mod matrix;
mod operator;
mod reference;
mod suite;
mod tolerance;

pub use capability::{Capabilities, Version, MIN_REFERENCE_VERSION};
pub use checker::{Comparison, EquivalenceChecker, Mismatch};
pub use config::VerifyConfig;
pub use error::{SkipReason, VerifyError};
pub use inputs::OperatorInputs;
pub use matrix::{TestCase, TestMatrix};
pub use operator::{CpuBiasGelu, FusedOperator};
pub use reference::bias_gelu_reference;
pub use suite::{CaseOutcome, EquivalenceSuite, SuiteOutcome, SuiteReport};
pub use tolerance::{Tolerance, ToleranceProfile};
