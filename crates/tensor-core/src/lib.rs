// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Precision-tagged tensors and the elementwise operations needed to check
//! a fused bias+GELU kernel against its reference.
//!
//! This crate provides:
//! - [`Tensor`] — an owned, row-major tensor whose elements are stored in
//!   their declared precision.
//! - [`Shape`] — runtime shape descriptors.
//! - [`DType`] — supported floating-point precisions (f32, f16, bf16).
//! - Operations: bias addition, tanh-form GELU, and the fused `bias_gelu`.
//!
//! # Precision Model
//! Storage is always in the tensor's dtype (via the `half` crate for the
//! 16-bit formats). Reads widen to `f32` exactly; writes round to nearest,
//! ties to even.

mod dtype;
mod error;
mod ops;
mod shape;
mod tensor;

pub use dtype::DType;
pub use error::TensorError;
pub use ops::{add_bias, bias_gelu, gelu, gelu_tanh};
pub use shape::Shape;
pub use tensor::{Tensor, TensorView};
