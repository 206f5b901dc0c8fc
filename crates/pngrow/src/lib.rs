/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A streaming png decoder
//!
//! This crate reads ISO/IEC 15948:2003 (E) PNG images from any seekable
//! source and reconstructs them one scanline at a time, writing pixels
//! straight into a caller owned [`PixelBuffer`](pngrow_core::buffer::PixelBuffer).
//!
//! Neither the compressed nor the filtered image is ever held in memory
//! as a whole, the decoder keeps two scanlines around and pulls
//! compressed bytes out of IDAT chunks as the inflater asks for them.
//!
//! # Features
//! - Platform specific intrinsics for accelerated de-filtering on x86
//! - Adam7 interlaced images
//! - Optional CRC validation of every chunk
//! - Output into any pixel type implementing [`Pixel`](pngrow_core::pixel::Pixel)
//!
//! # Usage
//! Add the library to `Cargo.toml`
//!
//! ```toml
//! pngrow="0.1"
//! ```
//!
//! #### Decode into a new buffer
//!
//!```no_run
//! use std::io::Cursor;
//!
//! use pngrow::PngDecoder;
//! use pngrow_core::pixel::Rgb8;
//!
//! let data = std::fs::read("image.png").unwrap();
//! let mut decoder = PngDecoder::new(Cursor::new(data));
//!
//! let pixels = decoder.decode::<Rgb8>().unwrap();
//! ```
//!
//! #### Decode into an existing buffer
//!
//! Headers can be decoded first to size the destination.
//!
//!```no_run
//! use std::fs::File;
//!
//! use pngrow::PngDecoder;
//! use pngrow_core::buffer::PixelBuffer;
//! use pngrow_core::pixel::Luma16;
//!
//! let mut decoder = PngDecoder::new(File::open("image.png").unwrap());
//! decoder.decode_headers().unwrap();
//!
//! let (width, height) = decoder.dimensions().unwrap();
//! let mut pixels = PixelBuffer::<Luma16>::new(width, height);
//!
//! decoder.decode_into(&mut pixels).unwrap();
//! ```
//!
//! # Alternatives
//! - [png](https://crates.io/crates/png) crate
//!
#![allow(clippy::op_ref, clippy::identity_op)]

pub use decoder::{DecodeState, PngDecoder};
pub use enums::{ChunkType, FilterType, InterlaceMethod, PngColor};
pub use headers::PngHeader;
pub use pngrow_core;

pub mod adam7;
pub mod bridge;
pub mod chunk;
mod constants;
pub mod crc;
mod decoder;
mod enums;
pub mod error;
pub mod expand;
pub mod filters;
pub mod headers;
pub mod projector;
