// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Verification configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! seed = 42
//! batches = [1, 2]
//! sequences = [1, 128, 255]
//! channels = [512, 1232, 4096]
//! dtypes = ["f16", "f32", "bf16"]   # omit to use what the host supports
//! reference_version = "2.1"
//! min_reference_version = "1.12"
//! operator_available = true
//! bf16_supported = true
//!
//! [tolerances.f16]
//! rtol = 3e-2
//! atol = 2e-3
//! ```

use std::path::Path;

use tensor_core::DType;

use crate::capability::MIN_REFERENCE_VERSION;
use crate::{Capabilities, TestMatrix, ToleranceProfile, VerifyError, Version};

/// Configuration for an equivalence run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VerifyConfig {
    /// Base seed; case `i` draws its inputs from `seed + i`.
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_batches")]
    pub batches: Vec<usize>,
    #[serde(default = "default_sequences")]
    pub sequences: Vec<usize>,
    #[serde(default = "default_channels")]
    pub channels: Vec<usize>,
    /// Precisions to test. `None` means every precision the host supports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtypes: Option<Vec<DType>>,
    /// Installed reference version.
    #[serde(default = "default_reference_version")]
    pub reference_version: Version,
    /// Lowest trusted reference version.
    #[serde(default = "default_min_reference_version")]
    pub min_reference_version: Version,
    /// Overrides operator availability; `None` asks the operator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_available: Option<bool>,
    /// Whether bf16 can run on this host.
    #[serde(default = "default_true")]
    pub bf16_supported: bool,
    #[serde(default)]
    pub tolerances: ToleranceProfile,
}

fn default_seed() -> u64 {
    42
}

fn default_batches() -> Vec<usize> {
    TestMatrix::DEFAULT_BATCHES.to_vec()
}

fn default_sequences() -> Vec<usize> {
    TestMatrix::DEFAULT_SEQUENCES.to_vec()
}

fn default_channels() -> Vec<usize> {
    TestMatrix::DEFAULT_CHANNELS.to_vec()
}

fn default_reference_version() -> Version {
    Capabilities::default().reference_version
}

fn default_min_reference_version() -> Version {
    MIN_REFERENCE_VERSION
}

fn default_true() -> bool {
    true
}

impl VerifyConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, VerifyError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            VerifyError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, VerifyError> {
        toml::from_str(toml_str)
            .map_err(|e| VerifyError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, VerifyError> {
        toml::to_string_pretty(self)
            .map_err(|e| VerifyError::Config(format!("TOML serialise error: {e}")))
    }

    /// Host capabilities, with operator availability taken from
    /// `operator_available` when set and from `detected` otherwise.
    pub fn capabilities(&self, detected: bool) -> Capabilities {
        Capabilities {
            operator_available: self.operator_available.unwrap_or(detected),
            bf16_supported: self.bf16_supported,
            reference_version: self.reference_version,
            min_reference_version: self.min_reference_version,
        }
    }

    /// Builds and validates the parameter matrix.
    pub fn matrix(&self) -> Result<TestMatrix, VerifyError> {
        let dtypes = match &self.dtypes {
            Some(d) => d.clone(),
            None => self.capabilities(true).supported_dtypes(),
        };
        let matrix = TestMatrix {
            batches: self.batches.clone(),
            sequences: self.sequences.clone(),
            channels: self.channels.clone(),
            dtypes,
        };
        matrix.validate()?;
        Ok(matrix)
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            batches: default_batches(),
            sequences: default_sequences(),
            channels: default_channels(),
            dtypes: None,
            reference_version: default_reference_version(),
            min_reference_version: default_min_reference_version(),
            operator_available: None,
            bf16_supported: true,
            tolerances: ToleranceProfile::default(),
        }
    }
}
