// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-precision tolerance table.
//!
//! ```text
//! dtype   rtol     atol
//! f32     5e-4     5e-5
//! f16     3e-2     2e-3
//! bf16    4.8e-1   3.2e-2
//! ```
//!
//! bf16 is looser than f16 because it keeps 8 significand bits against
//! f16's 11.

use std::fmt;

use tensor_core::DType;

/// A `(relative, absolute)` error bound.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    pub rtol: f64,
    pub atol: f64,
}

impl Tolerance {
    pub const fn new(rtol: f64, atol: f64) -> Self {
        Self { rtol, atol }
    }

    /// Largest allowed `|candidate - reference|` for this reference value.
    #[inline]
    pub fn bound(&self, reference: f64) -> f64 {
        self.atol + self.rtol * reference.abs()
    }

    /// `allclose`-style check: `|c - r| <= atol + rtol * |r|`.
    ///
    /// NaN on either side is never close; infinities are close only to an
    /// identical infinity.
    #[inline]
    pub fn is_close(&self, candidate: f32, reference: f32) -> bool {
        if candidate.is_nan() || reference.is_nan() {
            return false;
        }
        if candidate == reference {
            return true;
        }
        if candidate.is_infinite() || reference.is_infinite() {
            return false;
        }
        let (c, r) = (f64::from(candidate), f64::from(reference));
        (c - r).abs() <= self.bound(r)
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rtol={:e} atol={:e}", self.rtol, self.atol)
    }
}

/// Tolerance for every [`DType`].
///
/// Missing entries in a deserialised profile fall back to the defaults, so
/// a config file may override a single precision.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToleranceProfile {
    #[serde(default = "ToleranceProfile::default_f32")]
    pub f32: Tolerance,
    #[serde(default = "ToleranceProfile::default_f16")]
    pub f16: Tolerance,
    #[serde(default = "ToleranceProfile::default_bf16")]
    pub bf16: Tolerance,
}

impl ToleranceProfile {
    fn default_f32() -> Tolerance {
        Tolerance::new(5e-4, 5e-5)
    }

    fn default_f16() -> Tolerance {
        Tolerance::new(3e-2, 2e-3)
    }

    fn default_bf16() -> Tolerance {
        Tolerance::new(4.8e-1, 3.2e-2)
    }

    /// Looks up the tolerance for `dtype`.
    pub fn get(&self, dtype: DType) -> Tolerance {
        match dtype {
            DType::F32 => self.f32,
            DType::F16 => self.f16,
            DType::BF16 => self.bf16,
        }
    }

    /// Replaces the tolerance for `dtype`.
    pub fn set(&mut self, dtype: DType, tolerance: Tolerance) {
        match dtype {
            DType::F32 => self.f32 = tolerance,
            DType::F16 => self.f16 = tolerance,
            DType::BF16 => self.bf16 = tolerance,
        }
    }

    /// Iterates over `(dtype, tolerance)` pairs, widest precision first.
    pub fn iter(&self) -> impl Iterator<Item = (DType, Tolerance)> + '_ {
        DType::ALL.into_iter().map(|d| (d, self.get(d)))
    }
}

impl Default for ToleranceProfile {
    fn default() -> Self {
        Self {
            f32: Self::default_f32(),
            f16: Self::default_f16(),
            bf16: Self::default_bf16(),
        }
    }
}
