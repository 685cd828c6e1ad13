// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Typed, bounds-checked views over mapped bytes.

use bytemuck::Pod;
use std::marker::PhantomData;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("element {index} is out of bounds for a view of {len} elements")]
    OutOfBounds { index: usize, len: usize },
    #[error("stride {stride} is smaller than the element size {element_size}")]
    StrideTooSmall { stride: usize, element_size: usize },
}

/// A view of `len` elements of type `T`, `stride` bytes apart, over a byte region.
///
/// Every access is bounds-checked against the element count; elements are read and
/// written unaligned, so the region needs no particular alignment.
#[derive(Debug)]
pub struct MappedView<'a, T> {
    bytes: &'a mut [u8],
    stride: usize,
    len: usize,
    element: PhantomData<T>,
}

impl<'a, T: Pod> MappedView<'a, T> {
    /// A tightly packed view over `bytes`. Trailing bytes that don't fit an element are excluded.
    pub fn new(bytes: &'a mut [u8]) -> Self {
        let stride = std::mem::size_of::<T>();
        let len = if stride == 0 { 0 } else { bytes.len() / stride };
        MappedView {
            bytes,
            stride,
            len,
            element: PhantomData,
        }
    }

    /// A view with elements `stride` bytes apart.
    pub fn with_stride(bytes: &'a mut [u8], stride: usize) -> Result<Self, ViewError> {
        let element_size = std::mem::size_of::<T>();
        if stride < element_size || stride == 0 {
            return Err(ViewError::StrideTooSmall {
                stride,
                element_size,
            });
        }
        //the last element only needs its own size, not a full stride
        let len = if bytes.len() < element_size {
            0
        } else {
            (bytes.len() - element_size) / stride + 1
        };
        Ok(MappedView {
            bytes,
            stride,
            len,
            element: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    fn range(&self, index: usize) -> Result<std::ops::Range<usize>, ViewError> {
        if index >= self.len {
            return Err(ViewError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        let start = index * self.stride;
        Ok(start..start + std::mem::size_of::<T>())
    }

    pub fn get(&self, index: usize) -> Result<T, ViewError> {
        let range = self.range(index)?;
        Ok(bytemuck::pod_read_unaligned(&self.bytes[range]))
    }

    pub fn set(&mut self, index: usize, value: T) -> Result<(), ViewError> {
        let range = self.range(index)?;
        self.bytes[range].copy_from_slice(bytemuck::bytes_of(&value));
        Ok(())
    }

    /// Writes `values` starting at element `start`.
    ///
    /// Nothing is written if any element would fall out of bounds.
    pub fn write_from(&mut self, start: usize, values: &[T]) -> Result<(), ViewError> {
        if values.is_empty() {
            return Ok(());
        }
        let last = start + values.len() - 1;
        if last >= self.len {
            return Err(ViewError::OutOfBounds {
                index: last,
                len: self.len,
            });
        }
        for (i, value) in values.iter().enumerate() {
            self.set(start + i, *value)?;
        }
        Ok(())
    }
}
