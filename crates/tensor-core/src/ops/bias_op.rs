// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Bias addition along the innermost axis, plain and fused with GELU.

use super::gelu_op::{GELU_COEFF, SQRT_2_OVER_PI};
use crate::{DType, Shape, Tensor, TensorError, TensorView};

/// Validates that `bias` is a 1-D vector matching `input`'s last dimension
/// and that `output` has `input`'s shape.
fn check_bias_shapes(
    op: &'static str,
    input: &Shape,
    bias: &Shape,
    output: &Shape,
) -> Result<(), TensorError> {
    if !input.accepts_bias(bias) {
        return Err(TensorError::ShapeMismatch {
            op,
            lhs: input.clone(),
            rhs: bias.clone(),
        });
    }
    if input != output {
        return Err(TensorError::ShapeMismatch {
            op,
            lhs: input.clone(),
            rhs: output.clone(),
        });
    }
    Ok(())
}

/// Adds a `[channels]` bias to every row of an `[..., channels]` tensor.
///
/// All three tensors must be `F32`.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if the bias does not match the
/// innermost dimension or the output shape differs from the input.
pub fn add_bias(
    input: &TensorView<'_>,
    bias: &TensorView<'_>,
    output: &mut Tensor,
) -> Result<(), TensorError> {
    for dtype in [input.dtype(), bias.dtype(), output.dtype()] {
        if dtype != DType::F32 {
            return Err(TensorError::UnsupportedDType {
                op: "add_bias",
                dtype,
            });
        }
    }
    check_bias_shapes("add_bias", input.shape(), bias.shape(), output.shape())?;

    let bias = bias.to_f32_vec();
    if bias.is_empty() {
        return Ok(());
    }
    let row_bytes = bias.len() * 4;
    for (dst_row, src_row) in output
        .as_bytes_mut()
        .chunks_exact_mut(row_bytes)
        .zip(input.as_bytes().chunks_exact(row_bytes))
    {
        for ((dst, src), b) in dst_row
            .chunks_exact_mut(4)
            .zip(src_row.chunks_exact(4))
            .zip(&bias)
        {
            DType::F32.encode(DType::F32.decode(src) + b, dst);
        }
    }
    Ok(())
}

/// Fused `gelu(input + bias)` in a single pass, in the tensors' own dtype.
///
/// Each element is widened to `f32`, biased, activated and rounded back
/// once, so no intermediate tensor is materialised. The activation uses the
/// logistic rewrite of the tanh form, `x / (1 + exp(-2u))`, which is
/// algebraically identical to `0.5 * x * (1 + tanh(u))`.
///
/// # Errors
/// Returns [`TensorError::UnsupportedDType`] if the three tensors do not
/// share one dtype, and [`TensorError::ShapeMismatch`] as for [`add_bias`].
pub fn bias_gelu(
    input: &TensorView<'_>,
    bias: &TensorView<'_>,
    output: &mut Tensor,
) -> Result<(), TensorError> {
    let dtype = input.dtype();
    for other in [bias.dtype(), output.dtype()] {
        if other != dtype {
            return Err(TensorError::UnsupportedDType {
                op: "bias_gelu",
                dtype: other,
            });
        }
    }
    check_bias_shapes("bias_gelu", input.shape(), bias.shape(), output.shape())?;

    let bias = bias.to_f32_vec();
    if bias.is_empty() {
        return Ok(());
    }
    let width = dtype.size_bytes();
    let row_bytes = bias.len() * width;
    for (dst_row, src_row) in output
        .as_bytes_mut()
        .chunks_exact_mut(row_bytes)
        .zip(input.as_bytes().chunks_exact(row_bytes))
    {
        for ((dst, src), b) in dst_row
            .chunks_exact_mut(width)
            .zip(src_row.chunks_exact(width))
            .zip(&bias)
        {
            let x = dtype.decode(src) + b;
            let u = SQRT_2_OVER_PI * (x + GELU_COEFF * x * x * x);
            dtype.encode(x / (1.0 + (-2.0 * u).exp()), dst);
        }
    }
    Ok(())
}
