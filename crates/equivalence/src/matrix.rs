// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Parameter matrix: batch × sequence × channels × dtype.

use std::fmt;

use tensor_core::{DType, Shape};

use crate::VerifyError;

/// One parameter combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TestCase {
    pub batch: usize,
    pub sequence: usize,
    pub channels: usize,
    pub dtype: DType,
}

impl TestCase {
    pub fn new(batch: usize, sequence: usize, channels: usize, dtype: DType) -> Self {
        Self {
            batch,
            sequence,
            channels,
            dtype,
        }
    }

    /// `[batch, sequence, channels]`.
    pub fn activation_shape(&self) -> Shape {
        Shape::activations(self.batch, self.sequence, self.channels)
    }

    /// Rejects zero-sized dimensions.
    pub fn validate(&self) -> Result<(), VerifyError> {
        for (name, value) in [
            ("batch", self.batch),
            ("sequence", self.sequence),
            ("channels", self.channels),
        ] {
            if value == 0 {
                return Err(VerifyError::InvalidCase(format!(
                    "{name} must be positive ({self})"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "batch={} sequence={} channels={} dtype={}",
            self.batch, self.sequence, self.channels, self.dtype
        )
    }
}

/// Cartesian product of the four parameter axes.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TestMatrix {
    pub batches: Vec<usize>,
    pub sequences: Vec<usize>,
    pub channels: Vec<usize>,
    pub dtypes: Vec<DType>,
}

impl TestMatrix {
    /// Default batch sizes; includes the batch-1 boundary.
    pub const DEFAULT_BATCHES: [usize; 2] = [1, 2];
    /// Default sequence lengths; 255 is deliberately not a power of two.
    pub const DEFAULT_SEQUENCES: [usize; 3] = [1, 128, 255];
    /// Default channel counts; 1232 is not a multiple of 512.
    pub const DEFAULT_CHANNELS: [usize; 3] = [512, 1232, 4096];

    /// The default matrix over the given precisions.
    pub fn with_dtypes(dtypes: Vec<DType>) -> Self {
        Self {
            batches: Self::DEFAULT_BATCHES.to_vec(),
            sequences: Self::DEFAULT_SEQUENCES.to_vec(),
            channels: Self::DEFAULT_CHANNELS.to_vec(),
            dtypes,
        }
    }

    /// Number of cases.
    pub fn len(&self) -> usize {
        self.batches.len() * self.sequences.len() * self.channels.len() * self.dtypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks every axis is non-empty and every dimension positive.
    pub fn validate(&self) -> Result<(), VerifyError> {
        for (name, axis) in [
            ("batches", &self.batches),
            ("sequences", &self.sequences),
            ("channels", &self.channels),
        ] {
            if axis.is_empty() {
                return Err(VerifyError::InvalidCase(format!("{name} axis is empty")));
            }
            if axis.contains(&0) {
                return Err(VerifyError::InvalidCase(format!(
                    "{name} axis contains 0: {axis:?}"
                )));
            }
        }
        if self.dtypes.is_empty() {
            return Err(VerifyError::InvalidCase("dtypes axis is empty".into()));
        }
        Ok(())
    }

    /// Enumerates all cases, dtype varying slowest.
    pub fn cases(&self) -> impl Iterator<Item = TestCase> + '_ {
        self.dtypes.iter().flat_map(move |&dtype| {
            self.channels.iter().flat_map(move |&channels| {
                self.sequences.iter().flat_map(move |&sequence| {
                    self.batches
                        .iter()
                        .map(move |&batch| TestCase::new(batch, sequence, channels, dtype))
                })
            })
        })
    }
}

impl Default for TestMatrix {
    fn default() -> Self {
        Self::with_dtypes(vec![DType::F16, DType::F32, DType::BF16])
    }
}
