/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Decoder options
//!
//! This module exposes a struct for which the decoder
//! gets shared options for decoding
//!
//! All supported options are put into one DecoderOptions to allow for global configurations
pub use decoder::{DecoderOptions, PaletteIndexPolicy};

mod decoder;
