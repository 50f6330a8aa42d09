// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Elementwise tensor operations.
//!
//! Each operation writes into a pre-allocated output tensor. `add_bias` and
//! `gelu` are the `F32` building blocks of the reference path; `bias_gelu`
//! is the fused single-pass kernel that runs in the storage precision.

mod bias_op;
mod gelu_op;

pub use bias_op::{add_bias, bias_gelu};
pub use gelu_op::{gelu, gelu_tanh};
