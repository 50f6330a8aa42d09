// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The fused operator under test.

use tensor_core::{bias_gelu, Tensor};

use crate::VerifyError;

/// A fused `gelu(activations + bias)` implementation.
///
/// The checker hands over inputs in their original precision; how the
/// operator handles precision internally is its own business.
pub trait FusedOperator: Send + Sync {
    /// Returns a human-readable name for this operator.
    fn name(&self) -> &str;

    /// Whether the operator can run on this host at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Whether the operator accepts bf16 inputs on this host.
    fn supports_bf16(&self) -> bool {
        true
    }

    /// Computes the fused result in the inputs' dtype.
    fn forward(&self, activations: &Tensor, bias: &Tensor) -> Result<Tensor, VerifyError>;
}

/// Single-pass CPU kernel from `tensor-core`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBiasGelu;

impl CpuBiasGelu {
    pub fn new() -> Self {
        Self
    }
}

impl FusedOperator for CpuBiasGelu {
    fn name(&self) -> &str {
        "cpu-bias-gelu"
    }

    fn forward(&self, activations: &Tensor, bias: &Tensor) -> Result<Tensor, VerifyError> {
        let mut out = Tensor::zeros(activations.shape().clone(), activations.dtype());
        bias_gelu(&activations.view(), &bias.view(), &mut out)?;
        Ok(out)
    }
}
