// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Supported tensor element data types.

use std::fmt;
use std::str::FromStr;

use half::{bf16, f16};

use crate::TensorError;

/// Enumerates the floating-point precisions a [`crate::Tensor`] can hold.
///
/// Precision-dependent behaviour (element encoding, rounding, tolerance
/// selection downstream) is dispatched on this enum rather than on the
/// runtime type of the stored values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    /// 32-bit IEEE 754 floating point.
    #[serde(alias = "float32")]
    F32,
    /// 16-bit IEEE 754 floating point.
    #[serde(alias = "float16", alias = "half")]
    F16,
    /// 16-bit brain floating point.
    #[serde(alias = "bfloat16")]
    BF16,
}

impl DType {
    /// Every supported precision, widest first.
    pub const ALL: [DType; 3] = [DType::F32, DType::F16, DType::BF16];

    /// Returns the size of a single element in bytes.
    pub fn size_bytes(self) -> usize {
        match self {
            DType::F32 => 4,
            DType::F16 => 2,
            DType::BF16 => 2,
        }
    }

    /// Returns a human-readable label for this data type.
    pub fn as_str(self) -> &'static str {
        match self {
            DType::F32 => "f32",
            DType::F16 => "f16",
            DType::BF16 => "bf16",
        }
    }

    /// Returns `true` for the 16-bit formats.
    pub fn is_reduced_precision(self) -> bool {
        !matches!(self, DType::F32)
    }

    /// Rounds `x` to the nearest value representable in this precision
    /// (ties to even) and returns it widened back to `f32`.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::DType;
    /// assert_eq!(DType::F32.round_f32(0.1), 0.1);
    /// assert_ne!(DType::F16.round_f32(0.1), 0.1);
    /// ```
    #[inline]
    pub fn round_f32(self, x: f32) -> f32 {
        match self {
            DType::F32 => x,
            DType::F16 => f16::from_f32(x).to_f32(),
            DType::BF16 => bf16::from_f32(x).to_f32(),
        }
    }

    /// Writes `x` into `out` using this precision's little-endian encoding.
    #[inline]
    pub(crate) fn encode(self, x: f32, out: &mut [u8]) {
        match self {
            DType::F32 => out.copy_from_slice(&x.to_le_bytes()),
            DType::F16 => out.copy_from_slice(&f16::from_f32(x).to_le_bytes()),
            DType::BF16 => out.copy_from_slice(&bf16::from_f32(x).to_le_bytes()),
        }
    }

    /// Reads one element encoded in this precision and widens it to `f32`.
    #[inline]
    pub(crate) fn decode(self, bytes: &[u8]) -> f32 {
        match self {
            DType::F32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            DType::F16 => f16::from_le_bytes([bytes[0], bytes[1]]).to_f32(),
            DType::BF16 => bf16::from_le_bytes([bytes[0], bytes[1]]).to_f32(),
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DType {
    type Err = TensorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "f32" | "float32" | "fp32" => Ok(DType::F32),
            "f16" | "float16" | "fp16" | "half" => Ok(DType::F16),
            "bf16" | "bfloat16" => Ok(DType::BF16),
            other => Err(TensorError::UnknownDType(other.to_string())),
        }
    }
}
