// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Gaussian Error Linear Unit (GELU) activation, tanh form.

use crate::{DType, Tensor, TensorError, TensorView};

/// Coefficient `sqrt(2/π)`.
pub(crate) const SQRT_2_OVER_PI: f32 = 0.797_884_56;

/// Cubic coefficient in the tanh approximation.
pub(crate) const GELU_COEFF: f32 = 0.044715;

/// Applies the GELU activation element-wise using the tanh approximation:
///
/// `GELU(x) ≈ 0.5 * x * (1 + tanh(sqrt(2/π) * (x + 0.044715 * x³)))`
///
/// This is the form fused transformer kernels are tuned against; the
/// erf-based GELU differs from it by up to ~1e-3 and must not be
/// substituted.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if input and output shapes differ.
/// Returns [`TensorError::UnsupportedDType`] if either tensor is not `F32`.
pub fn gelu(input: &TensorView<'_>, output: &mut Tensor) -> Result<(), TensorError> {
    for dtype in [input.dtype(), output.dtype()] {
        if dtype != DType::F32 {
            return Err(TensorError::UnsupportedDType { op: "gelu", dtype });
        }
    }

    if input.shape() != output.shape() {
        return Err(TensorError::ShapeMismatch {
            op: "gelu",
            lhs: input.shape().clone(),
            rhs: output.shape().clone(),
        });
    }

    for (dst, x) in output
        .as_bytes_mut()
        .chunks_exact_mut(4)
        .zip(input.iter_f32())
    {
        DType::F32.encode(gelu_tanh(x), dst);
    }

    Ok(())
}

/// Computes tanh-approximated GELU for a single f32 value.
#[inline(always)]
pub fn gelu_tanh(x: f32) -> f32 {
    let inner = SQRT_2_OVER_PI * (x + GELU_COEFF * x * x * x);
    0.5 * x * (1.0 + inner.tanh())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Shape;

    fn approx_eq(a: f32, b: f32, tol: f32) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_gelu_zero() {
        assert_eq!(gelu_tanh(0.0), 0.0);
    }

    #[test]
    fn test_gelu_tails() {
        // GELU(x) ≈ x for large positive x, ≈ 0 for large negative x.
        let y = gelu_tanh(3.0);
        assert!((y - 3.0).abs() < 0.01, "GELU(3.0) should be ≈ 3.0, got {y}");
        let y = gelu_tanh(-3.0);
        assert!(y.abs() < 0.01, "GELU(-3.0) should be ≈ 0, got {y}");
    }

    #[test]
    fn test_gelu_known_values() {
        // Values of the tanh form, not the erf form (erf gives 0.841345 at 1.0).
        assert!(approx_eq(gelu_tanh(1.0), 0.841_192, 1e-5));
        assert!(approx_eq(gelu_tanh(-1.0), -0.158_808, 1e-5));
        assert!(approx_eq(gelu_tanh(0.5), 0.345_714, 1e-5));
    }

    #[test]
    fn test_gelu_tensor() {
        let input = Tensor::from_f32(Shape::vector(4), &[0.0, 1.0, -1.0, 2.0]).unwrap();
        let mut output = Tensor::zeros(Shape::vector(4), DType::F32);

        gelu(&input.view(), &mut output).unwrap();

        let r = output.to_f32_vec();
        assert!(approx_eq(r[0], 0.0, 1e-6));
        assert!(approx_eq(r[1], 0.841_192, 1e-5));
        assert!(approx_eq(r[2], -0.158_808, 1e-5));
        assert!(approx_eq(r[3], 1.954_598, 1e-5));
    }

    #[test]
    fn test_gelu_shape_mismatch() {
        let input = Tensor::zeros(Shape::vector(3), DType::F32);
        let mut output = Tensor::zeros(Shape::vector(4), DType::F32);
        assert!(matches!(
            gelu(&input.view(), &mut output),
            Err(TensorError::ShapeMismatch { op: "gelu", .. })
        ));
    }

    #[test]
    fn test_gelu_rejects_half() {
        let input = Tensor::zeros(Shape::vector(3), DType::F16);
        let mut output = Tensor::zeros(Shape::vector(3), DType::F32);
        assert!(matches!(
            gelu(&input.view(), &mut output),
            Err(TensorError::UnsupportedDType {
                dtype: DType::F16,
                ..
            })
        ));
    }
}
