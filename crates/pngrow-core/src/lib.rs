/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Core routines shared by the pngrow decoder
//!
//! It currently contains
//!
//! - A bytestream reader with endian aware reads over any seekable source
//! - Colorspace and bit depth information shared by images
//! - Decoder options
//! - Typed pixels and a row addressable pixel buffer
//! - A scratch buffer pool with scoped, guaranteed release
//!
//! # Features
//!  - `serde`: Enables serializing of some of the data structures
//!     present in the crate
//!
extern crate alloc;

pub mod bit_depth;
pub mod buffer;
pub mod bytestream;
pub mod colorspace;
pub mod options;
pub mod pixel;
pub mod pool;
pub mod serde;
