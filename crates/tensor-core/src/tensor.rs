// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Core tensor type and view abstractions.

use rand::Rng;
use rand_distr::StandardNormal;

use crate::{DType, Shape, TensorError};

/// An owned, n-dimensional tensor stored in contiguous memory.
///
/// # Memory Layout
/// Data is stored in row-major (C) order as a flat little-endian byte
/// buffer whose element width follows [`DType::size_bytes`]. Values are
/// read widened to `f32` and written back rounded to the tensor's dtype.
///
/// `Clone` is a deep copy: the clone owns a fresh buffer, so writes to one
/// copy are never observed through the other.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Shape,
    dtype: DType,
    data: Vec<u8>,
}

impl Tensor {
    /// Creates a new tensor filled with zeros.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape, DType};
    /// let t = Tensor::zeros(Shape::vector(6), DType::F16);
    /// assert_eq!(t.size_bytes(), 12);
    /// ```
    pub fn zeros(shape: Shape, dtype: DType) -> Self {
        let size = shape.size_bytes(dtype);
        Self {
            shape,
            dtype,
            data: vec![0u8; size],
        }
    }

    /// Creates a tensor from raw little-endian bytes.
    ///
    /// Returns an error if the buffer size does not match `shape.size_bytes(dtype)`.
    pub fn from_bytes(shape: Shape, dtype: DType, data: Vec<u8>) -> Result<Self, TensorError> {
        let expected = shape.size_bytes(dtype);
        if data.len() != expected {
            return Err(TensorError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, dtype, data })
    }

    /// Creates an `F32` tensor from a slice of values.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape};
    /// let t = Tensor::from_f32(Shape::vector(3), &[1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(t.to_f32_vec(), vec![1.0, 2.0, 3.0]);
    /// ```
    pub fn from_f32(shape: Shape, values: &[f32]) -> Result<Self, TensorError> {
        Self::from_f32_as(shape, DType::F32, values)
    }

    /// Creates a tensor of `dtype` from `f32` values, rounding each value
    /// to the target precision.
    pub fn from_f32_as(shape: Shape, dtype: DType, values: &[f32]) -> Result<Self, TensorError> {
        let mut t = Self::zeros(shape, dtype);
        t.write_f32(values)?;
        Ok(t)
    }

    /// Creates a tensor of `dtype` whose elements are drawn from the
    /// standard normal distribution and rounded to `dtype`.
    pub fn randn<R: Rng + ?Sized>(shape: Shape, dtype: DType, rng: &mut R) -> Self {
        let mut t = Self::zeros(shape, dtype);
        for chunk in t.data.chunks_exact_mut(dtype.size_bytes()) {
            let x: f32 = rng.sample(StandardNormal);
            dtype.encode(x, chunk);
        }
        t
    }

    /// Returns the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the tensor's data type.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Returns the number of elements.
    pub fn num_elements(&self) -> usize {
        self.shape.num_elements()
    }

    /// Returns an immutable view over this tensor's data.
    pub fn view(&self) -> TensorView<'_> {
        TensorView {
            shape: &self.shape,
            dtype: self.dtype,
            data: &self.data,
        }
    }

    /// Returns the raw byte slice backing this tensor.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns a mutable reference to the raw byte buffer.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Returns the memory footprint of this tensor in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Reads element `index` (flat, row-major) widened to `f32`.
    pub fn get_f32(&self, index: usize) -> Option<f32> {
        self.view().get_f32(index)
    }

    /// Widens every element to `f32`. Exact for all supported dtypes.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.view().to_f32_vec()
    }

    /// Overwrites the tensor's contents, rounding each value to the dtype.
    ///
    /// # Errors
    /// Returns [`TensorError::BufferSizeMismatch`] if `values` does not hold
    /// exactly one value per element.
    pub fn write_f32(&mut self, values: &[f32]) -> Result<(), TensorError> {
        let width = self.dtype.size_bytes();
        if values.len() != self.num_elements() {
            return Err(TensorError::BufferSizeMismatch {
                expected: self.data.len(),
                actual: values.len() * width,
            });
        }
        let dtype = self.dtype;
        for (chunk, &x) in self.data.chunks_exact_mut(width).zip(values) {
            dtype.encode(x, chunk);
        }
        Ok(())
    }

    /// Returns a copy of this tensor converted to `dtype`.
    ///
    /// Upcasts are exact; downcasts round to nearest, ties to even.
    pub fn to_dtype(&self, dtype: DType) -> Tensor {
        if dtype == self.dtype {
            return self.clone();
        }
        let mut out = Tensor::zeros(self.shape.clone(), dtype);
        let (src_w, dst_w) = (self.dtype.size_bytes(), dtype.size_bytes());
        for (dst, src) in out
            .data
            .chunks_exact_mut(dst_w)
            .zip(self.data.chunks_exact(src_w))
        {
            dtype.encode(self.dtype.decode(src), dst);
        }
        out
    }

    /// Fills the tensor with a constant value, rounded to the dtype.
    pub fn fill_f32(&mut self, value: f32) {
        let dtype = self.dtype;
        for chunk in self.data.chunks_exact_mut(dtype.size_bytes()) {
            dtype.encode(value, chunk);
        }
    }
}

/// A borrowed, read-only view over a [`Tensor`]'s data.
///
/// Views are zero-copy and tied to the lifetime of the source tensor,
/// enforced by the borrow checker.
#[derive(Debug, Clone, Copy)]
pub struct TensorView<'a> {
    shape: &'a Shape,
    dtype: DType,
    data: &'a [u8],
}

impl<'a> TensorView<'a> {
    /// Returns the shape of the viewed tensor.
    pub fn shape(&self) -> &'a Shape {
        self.shape
    }

    /// Returns the data type of the viewed tensor.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Returns the raw byte slice.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Reads element `index` widened to `f32`.
    pub fn get_f32(&self, index: usize) -> Option<f32> {
        let w = self.dtype.size_bytes();
        let start = index.checked_mul(w)?;
        self.data
            .get(start..start + w)
            .map(|bytes| self.dtype.decode(bytes))
    }

    /// Iterates over every element widened to `f32`.
    pub fn iter_f32(&self) -> impl Iterator<Item = f32> + 'a {
        let dtype = self.dtype;
        let data: &'a [u8] = self.data;
        data.chunks_exact(dtype.size_bytes())
            .map(move |bytes| dtype.decode(bytes))
    }

    /// Widens every element to `f32`.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.iter_f32().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zeros() {
        let t = Tensor::zeros(Shape::new(vec![2, 3]), DType::F32);
        assert_eq!(t.size_bytes(), 24);
        assert_eq!(t.dtype(), DType::F32);
        assert!(t.to_f32_vec().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_from_f32() {
        let data = vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let t = Tensor::from_f32(Shape::new(vec![2, 3]), &data).unwrap();
        assert_eq!(t.to_f32_vec(), data);
    }

    #[test]
    fn test_from_f32_as_rounds() {
        let t = Tensor::from_f32_as(Shape::vector(2), DType::F16, &[0.1, 65504.0]).unwrap();
        let v = t.to_f32_vec();
        assert_eq!(v[0], DType::F16.round_f32(0.1));
        assert_eq!(v[1], 65504.0);
        assert_eq!(t.size_bytes(), 4);
    }

    #[test]
    fn test_from_bytes_size_mismatch() {
        let result = Tensor::from_bytes(Shape::vector(3), DType::BF16, vec![0u8; 5]);
        assert!(matches!(
            result,
            Err(TensorError::BufferSizeMismatch {
                expected: 6,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_write_len_mismatch() {
        let mut t = Tensor::zeros(Shape::vector(3), DType::F32);
        assert!(t.write_f32(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_view_lifetime() {
        let t = Tensor::from_f32(Shape::vector(4), &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let v = t.view();
        assert_eq!(v.shape(), &Shape::vector(4));
        assert_eq!(v.to_f32_vec(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(v.get_f32(3), Some(4.0));
        assert_eq!(v.get_f32(4), None);
    }

    #[test]
    fn test_to_dtype_roundtrip_exact_for_upcast() {
        let mut rng = StdRng::seed_from_u64(7);
        let half = Tensor::randn(Shape::vector(64), DType::BF16, &mut rng);
        let wide = half.to_dtype(DType::F32);
        assert_eq!(wide.dtype(), DType::F32);
        assert_eq!(wide.to_f32_vec(), half.to_f32_vec());
        assert_eq!(wide.to_dtype(DType::BF16), half);
    }

    #[test]
    fn test_randn_is_seeded() {
        let a = Tensor::randn(Shape::vector(32), DType::F16, &mut StdRng::seed_from_u64(1));
        let b = Tensor::randn(Shape::vector(32), DType::F16, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
        assert!(a.to_f32_vec().iter().any(|&x| x != 0.0));
    }

    #[test]
    fn test_clone_is_independent() {
        let src = Tensor::from_f32(Shape::vector(3), &[1.0, 2.0, 3.0]).unwrap();
        let mut copy = src.clone();
        copy.fill_f32(-1.0);
        assert_eq!(src.to_f32_vec(), vec![1.0, 2.0, 3.0]);
        assert_ne!(src.as_bytes().as_ptr(), copy.as_bytes().as_ptr());
    }

    #[test]
    fn test_fill_f32() {
        let mut t = Tensor::zeros(Shape::vector(5), DType::F16);
        t.fill_f32(3.14);
        let expected = DType::F16.round_f32(3.14);
        assert!(t.to_f32_vec().iter().all(|&x| x == expected));
    }
}
