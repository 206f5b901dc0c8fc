/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Errors possible during png decoding
use core::fmt::{Debug, Display, Formatter};

use pngrow_core::bytestream::ByteIoError;

/// Errors that can occur during png decoding
#[non_exhaustive]
pub enum PngDecodeErrors {
    /// The stream does not start with the png signature
    BadSignature,
    /// Missing or duplicate IHDR, bad dimensions, chunks out of order
    HeaderError(String),
    /// Valid png, but something this decoder does not handle
    /// or a combination of fields the format does not allow
    UnsupportedFormat(String),
    /// CRC mismatch for a chunk
    BadCrc {
        chunk:    [u8; 4],
        expected: u32,
        found:    u32
    },
    /// The image data ended before all scanlines were read
    TruncatedStream { expected: usize, found: usize },
    /// A palette image reached its pixel data without a PLTE chunk
    MissingPalette,
    /// A palette index pointed past the palette end
    /// (index, palette entries)
    PaletteIndexOutOfRange(u8, usize),
    /// The stream ended without any pixel data
    NoData,
    /// Output buffer is too small to hold the image
    /// (expected, found)
    TooSmallOutput(usize, usize),
    /// Reading from the underlying source failed
    IoError(ByteIoError),
    /// The deflate stream inside IDAT chunks is corrupt
    InflateError(std::io::Error)
}

impl Debug for PngDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BadSignature => writeln!(f, "Bad PNG signature, not a png"),
            Self::HeaderError(val) => writeln!(f, "Header error: {val}"),
            Self::UnsupportedFormat(val) => writeln!(f, "Unsupported: {val}"),
            Self::BadCrc {
                chunk,
                expected,
                found
            } => {
                let name = core::str::from_utf8(chunk).unwrap_or("XXXX");
                writeln!(
                    f,
                    "CRC does not match for chunk {name}, expected {expected:#010X} but found {found:#010X}"
                )
            }
            Self::TruncatedStream { expected, found } => writeln!(
                f,
                "Image data ended early, expected {expected} bytes but found {found}"
            ),
            Self::MissingPalette => writeln!(f, "Palette image without a PLTE chunk"),
            Self::PaletteIndexOutOfRange(index, entries) => writeln!(
                f,
                "Palette index {index} out of range for a palette of {entries} entries"
            ),
            Self::NoData => writeln!(f, "No image data found in the stream"),
            Self::TooSmallOutput(expected, found) => writeln!(
                f,
                "Too small output, expected buffer with at least {expected} pixels but got {found}"
            ),
            Self::IoError(err) => writeln!(f, "I/O error: {err:?}"),
            Self::InflateError(err) => writeln!(f, "Error inflating image data: {err}")
        }
    }
}

impl Display for PngDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for PngDecodeErrors {}

impl From<&'static str> for PngDecodeErrors {
    fn from(val: &'static str) -> Self {
        Self::HeaderError(val.to_string())
    }
}

impl From<String> for PngDecodeErrors {
    fn from(val: String) -> Self {
        Self::HeaderError(val)
    }
}

impl From<ByteIoError> for PngDecodeErrors {
    fn from(val: ByteIoError) -> Self {
        Self::IoError(val)
    }
}
