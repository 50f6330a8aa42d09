// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Operator inputs and their generation.

use rand::Rng;
use tensor_core::{Shape, Tensor};

use crate::{TestCase, VerifyError};

/// `(activations[batch, sequence, channels], bias[channels])`, one dtype.
///
/// The bias length always equals the activations' innermost dimension;
/// [`OperatorInputs::new`] is the only way in and rejects anything else.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorInputs {
    activations: Tensor,
    bias: Tensor,
}

impl OperatorInputs {
    /// Validates and wraps a pair of tensors.
    ///
    /// # Errors
    /// - [`VerifyError::ShapeMismatch`] if activations are not rank 3 or the
    ///   bias is not a 1-D vector of the channel count.
    /// - [`VerifyError::DTypeMismatch`] if the two dtypes differ.
    pub fn new(activations: Tensor, bias: Tensor) -> Result<Self, VerifyError> {
        if activations.shape().rank() != 3 || !activations.shape().accepts_bias(bias.shape()) {
            return Err(VerifyError::ShapeMismatch {
                context: "operator inputs",
                lhs: activations.shape().clone(),
                rhs: bias.shape().clone(),
            });
        }
        if activations.dtype() != bias.dtype() {
            return Err(VerifyError::DTypeMismatch {
                context: "operator inputs",
                expected: activations.dtype(),
                actual: bias.dtype(),
            });
        }
        Ok(Self { activations, bias })
    }

    /// Draws standard-normal activations and bias for `case`.
    pub fn generate<R: Rng + ?Sized>(case: &TestCase, rng: &mut R) -> Result<Self, VerifyError> {
        case.validate()?;
        let activations = Tensor::randn(case.activation_shape(), case.dtype, rng);
        let bias = Tensor::randn(Shape::vector(case.channels), case.dtype, rng);
        Self::new(activations, bias)
    }

    /// Returns two independent deep copies: one for the reference path and
    /// one for the candidate path.
    pub fn duplicate(&self) -> (OperatorInputs, OperatorInputs) {
        (self.clone(), self.clone())
    }

    pub fn activations(&self) -> &Tensor {
        &self.activations
    }

    pub fn bias(&self) -> &Tensor {
        &self.bias
    }

    /// Consumes the inputs, returning `(activations, bias)`.
    pub fn into_parts(self) -> (Tensor, Tensor) {
        (self.activations, self.bias)
    }
}
