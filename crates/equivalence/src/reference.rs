// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Reference path for bias+GELU.
//!
//! ```text
//! activations (dtype) ─┐ upcast f32
//!                      ├─► add_bias ─► gelu (tanh form) ─► downcast (dtype)
//! bias        (dtype) ─┘ upcast f32
//! ```
//!
//! Computing in f32 and rounding once at the end is what "correct" means
//! for 16-bit inputs; the fused kernel is judged against this, not against
//! arithmetic carried out in the storage precision.

use tensor_core::{add_bias, gelu, DType, Tensor};

use crate::{OperatorInputs, VerifyError};

/// Computes `gelu(activations + bias)` via the f32 round trip.
pub fn bias_gelu_reference(inputs: &OperatorInputs) -> Result<Tensor, VerifyError> {
    let dtype = inputs.activations().dtype();
    let activations = inputs.activations().to_dtype(DType::F32);
    let bias = inputs.bias().to_dtype(DType::F32);

    let mut biased = Tensor::zeros(activations.shape().clone(), DType::F32);
    add_bias(&activations.view(), &bias.view(), &mut biased)?;

    let mut activated = Tensor::zeros(biased.shape().clone(), DType::F32);
    gelu(&biased.view(), &mut activated)?;

    Ok(activated.to_dtype(dtype))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::{gelu_tanh, Shape};

    fn inputs(dtype: DType, acts: &[f32], bias: &[f32]) -> OperatorInputs {
        let channels = bias.len();
        let sequence = acts.len() / channels;
        OperatorInputs::new(
            Tensor::from_f32_as(Shape::activations(1, sequence, channels), dtype, acts).unwrap(),
            Tensor::from_f32_as(Shape::vector(channels), dtype, bias).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_reference_f32_is_tanh_gelu_of_sum() {
        let acts = [0.5f32, -1.0, 2.0, 0.0, -0.25, 1.5];
        let bias = [0.25f32, 0.5, -1.0];
        let out = bias_gelu_reference(&inputs(DType::F32, &acts, &bias)).unwrap();

        assert_eq!(out.dtype(), DType::F32);
        assert_eq!(out.shape(), &Shape::activations(1, 2, 3));
        for (i, y) in out.to_f32_vec().into_iter().enumerate() {
            assert_eq!(y, gelu_tanh(acts[i] + bias[i % 3]));
        }
    }

    #[test]
    fn test_reference_half_rounds_once() {
        let acts = [0.1f32, 0.7, -0.3, 1.9];
        let bias = [0.05f32, -0.2];
        let inputs = inputs(DType::F16, &acts, &bias);
        let out = bias_gelu_reference(&inputs).unwrap();

        assert_eq!(out.dtype(), DType::F16);
        let a = inputs.activations().to_f32_vec();
        let b = inputs.bias().to_f32_vec();
        for (i, y) in out.to_f32_vec().into_iter().enumerate() {
            let expected = DType::F16.round_f32(gelu_tanh(a[i] + b[i % 2]));
            assert_eq!(y, expected, "index {i}");
        }
    }

    #[test]
    fn test_reference_differs_from_erf_form() {
        // At x = 1 the tanh form is 0.841192, the erf form 0.841345.
        let out = bias_gelu_reference(&inputs(DType::F32, &[1.0], &[0.0])).unwrap();
        let y = out.to_f32_vec()[0];
        assert!((y - 0.841_192).abs() < 1e-5);
        assert!((y - 0.841_345).abs() > 1e-4);
    }

    #[test]
    fn test_reference_leaves_inputs_untouched() {
        let inputs = inputs(DType::BF16, &[1.0, -2.0], &[0.5, 0.5]);
        let before = inputs.clone();
        bias_gelu_reference(&inputs).unwrap();
        assert_eq!(inputs, before);
    }
}
