// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Capability gates passed to the checker at construction.
//!
//! Nothing here is looked up from process-wide state: the host's answers
//! (is the fused operator present, is bf16 usable, which reference version
//! is installed) are plain values, so the comparison logic can be exercised
//! with any combination of them.

use std::fmt;
use std::str::FromStr;

use tensor_core::DType;

use crate::{SkipReason, VerifyError};

/// A `major.minor[.patch]` version number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Creates a version from its components.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = VerifyError;

    /// Parses `"1.12"`, `"2.1.0"` and suffixed forms such as `"2.1.0+cpu"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let core = s
            .trim()
            .split(|c: char| c == '+' || c == '-')
            .next()
            .unwrap_or_default();
        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(VerifyError::Config(format!(
                "invalid version '{s}'; expected MAJOR.MINOR[.PATCH]"
            )));
        }
        let parse = |p: &str| {
            p.parse::<u32>().map_err(|e| {
                VerifyError::Config(format!("invalid version component '{p}' in '{s}': {e}"))
            })
        };
        Ok(Self {
            major: parse(parts[0])?,
            minor: parse(parts[1])?,
            patch: parts.get(2).map(|p| parse(p)).transpose()?.unwrap_or(0),
        })
    }
}

impl TryFrom<String> for Version {
    type Error = VerifyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.to_string()
    }
}

/// Minimum reference version whose tanh GELU matches fused kernels.
pub const MIN_REFERENCE_VERSION: Version = Version::new(1, 12, 0);

/// What the host can do, supplied explicitly by the caller.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Capabilities {
    /// Whether the fused operator can be loaded at all.
    pub operator_available: bool,
    /// Whether bf16 cases can run.
    pub bf16_supported: bool,
    /// Version of the installed reference implementation.
    pub reference_version: Version,
    /// Lowest reference version the checker trusts.
    pub min_reference_version: Version,
}

impl Capabilities {
    /// Returns the skip reason when the reference is too old.
    pub fn version_gate(&self) -> Option<SkipReason> {
        (self.reference_version < self.min_reference_version).then(|| SkipReason::VersionTooLow {
            found: self.reference_version,
            required: self.min_reference_version,
        })
    }

    /// Returns the skip reason when `dtype` cannot run on this host.
    pub fn dtype_gate(&self, dtype: DType) -> Option<SkipReason> {
        (dtype == DType::BF16 && !self.bf16_supported)
            .then_some(SkipReason::DTypeUnsupported { dtype })
    }

    /// Precisions that can run on this host, in matrix order.
    pub fn supported_dtypes(&self) -> Vec<DType> {
        let mut dtypes = vec![DType::F16, DType::F32];
        if self.bf16_supported {
            dtypes.push(DType::BF16);
        }
        dtypes
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            operator_available: true,
            bf16_supported: true,
            reference_version: Version::new(2, 1, 0),
            min_reference_version: MIN_REFERENCE_VERSION,
        }
    }
}
