/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A row addressable pixel buffer
use alloc::vec;
use alloc::vec::Vec;

use crate::pixel::Pixel;

/// A `width x height` grid of pixels stored row major.
///
/// Dimensions are fixed at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer<T: Pixel> {
    width:  usize,
    height: usize,
    pixels: Vec<T>
}

impl<T: Pixel> PixelBuffer<T> {
    /// Create a buffer with every pixel set to `T::default()`
    ///
    /// # Panics
    /// If `width * height` overflows
    pub fn new(width: usize, height: usize) -> PixelBuffer<T> {
        let size = width
            .checked_mul(height)
            .expect("Pixel buffer dimensions overflow");

        PixelBuffer {
            width,
            height,
            pixels: vec![T::default(); size]
        }
    }

    /// Wrap an existing vector of pixels, returning `None`
    /// if its length does not match the dimensions
    pub fn from_vec(width: usize, height: usize, pixels: Vec<T>) -> Option<PixelBuffer<T>> {
        if width.checked_mul(height)? != pixels.len() {
            return None;
        }
        Some(PixelBuffer {
            width,
            height,
            pixels
        })
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Get row `y`
    ///
    /// # Panics
    /// If `y` is not less than the height
    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }

    /// Get a mutable reference to row `y`
    ///
    /// # Panics
    /// If `y` is not less than the height
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = y * self.width;
        &mut self.pixels[start..start + self.width]
    }

    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }

    /// View the pixels as raw native endian bytes
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn into_vec(self) -> Vec<T> {
        self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{Luma8, Rgb8};

    #[test]
    fn rows_are_disjoint() {
        let mut buffer = PixelBuffer::<Luma8>::new(3, 2);

        buffer.row_mut(1)[2] = Luma8(9);
        assert_eq!(buffer.row(0), &[Luma8(0); 3]);
        assert_eq!(buffer.pixels()[5], Luma8(9));
    }

    #[test]
    fn bytes_are_interleaved() {
        let mut buffer = PixelBuffer::<Rgb8>::new(1, 1);
        buffer.row_mut(0)[0] = Rgb8 { r: 1, g: 2, b: 3 };

        assert_eq!(buffer.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(PixelBuffer::from_vec(2, 2, vec![Luma8(0); 3]).is_none());
        assert!(PixelBuffer::from_vec(2, 2, vec![Luma8(0); 4]).is_some());
    }
}
