/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! IHDR and PLTE parsing plus the values derived from them
use log::{info, trace};
use pngrow_core::bit_depth::BitDepth;
use pngrow_core::options::DecoderOptions;

use crate::constants::{IHDR_SIZE, MAX_PALETTE_ENTRIES};
use crate::enums::{InterlaceMethod, PngColor};
use crate::error::PngDecodeErrors;

/// Contents of the IHDR chunk
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PngHeader {
    pub width:     usize,
    pub height:    usize,
    pub depth:     u8,
    pub color:     PngColor,
    pub interlace: InterlaceMethod
}

impl PngHeader {
    pub const fn components(&self) -> usize {
        self.color.num_components()
    }

    pub const fn bits_per_pixel(&self) -> usize {
        self.depth as usize * self.components()
    }

    /// Distance in bytes to the corresponding byte of the pixel on the left,
    /// one for images with less than 8 bits per pixel
    pub const fn bytes_per_pixel(&self) -> usize {
        let bytes = self.bits_per_pixel() / 8;

        if bytes == 0 {
            1
        } else {
            bytes
        }
    }

    /// Bytes one scanline of `width` pixels takes, filter byte included
    pub const fn scanline_bytes(&self, width: usize) -> usize {
        (width * self.bits_per_pixel() + 7) / 8 + 1
    }

    pub const fn bit_depth(&self) -> BitDepth {
        if self.depth == 16 {
            BitDepth::Sixteen
        } else {
            BitDepth::Eight
        }
    }
}

/// Everything the pipeline learns about an image while walking its chunks
#[derive(Clone, Debug, Default)]
pub struct ImageMeta {
    pub header:             Option<PngHeader>,
    /// PLTE payload as it appeared in the stream
    pub palette_raw:        Vec<u8>,
    /// Colour table derived from `palette_raw`
    pub palette:            Vec<[u8; 3]>,
    pub bytes_per_pixel:    usize,
    /// Bytes per full width scanline, filter byte included
    pub bytes_per_scanline: usize,
    pub bytes_per_sample:   usize
}

impl ImageMeta {
    pub fn set_header(&mut self, header: PngHeader) {
        self.bytes_per_pixel = header.bytes_per_pixel();
        self.bytes_per_scanline = header.scanline_bytes(header.width);
        self.bytes_per_sample = if header.depth == 16 { 2 } else { 1 };
        self.header = Some(header);
    }

    pub fn set_palette(&mut self, data: &[u8]) -> Result<(), PngDecodeErrors> {
        self.palette = parse_plte(data)?;
        self.palette_raw = data.to_vec();
        Ok(())
    }
}

/// Parse and validate the 13 byte IHDR payload
pub fn parse_ihdr(data: &[u8], options: &DecoderOptions) -> Result<PngHeader, PngDecodeErrors> {
    let data: &[u8; IHDR_SIZE as usize] = data.try_into().map_err(|_| {
        PngDecodeErrors::HeaderError(format!(
            "Bad IHDR length {}, expected {IHDR_SIZE}",
            data.len()
        ))
    })?;

    let width = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
    let height = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);

    if width == 0 || height == 0 {
        return Err(PngDecodeErrors::from("Width or height cannot be zero"));
    }
    if width > i32::MAX as u32 || height > i32::MAX as u32 {
        return Err(PngDecodeErrors::HeaderError(format!(
            "Dimensions {width}x{height} exceed the largest allowed png dimension"
        )));
    }
    let (width, height) = (width as usize, height as usize);

    if width > options.get_max_width() {
        return Err(PngDecodeErrors::HeaderError(format!(
            "Image width {}, larger than maximum configured width {}, aborting",
            width,
            options.get_max_width()
        )));
    }
    if height > options.get_max_height() {
        return Err(PngDecodeErrors::HeaderError(format!(
            "Image height {}, larger than maximum configured height {}, aborting",
            height,
            options.get_max_height()
        )));
    }

    let depth = data[8];
    let color = PngColor::from_int(data[9]).ok_or_else(|| {
        PngDecodeErrors::UnsupportedFormat(format!("Unknown color value {}", data[9]))
    })?;

    if !color.allowed_depths().contains(&depth) {
        return Err(PngDecodeErrors::UnsupportedFormat(format!(
            "Bit depth {depth} is not allowed for color type {color:?}"
        )));
    }
    if data[10] != 0 {
        return Err(PngDecodeErrors::UnsupportedFormat(format!(
            "Unknown compression method {}",
            data[10]
        )));
    }
    if data[11] != 0 {
        return Err(PngDecodeErrors::UnsupportedFormat(format!(
            "Unknown filter method {}",
            data[11]
        )));
    }
    let interlace = InterlaceMethod::from_int(data[12]).ok_or_else(|| {
        PngDecodeErrors::UnsupportedFormat(format!("Unknown interlace method {}", data[12]))
    })?;

    info!("Width: {}", width);
    info!("Height: {}", height);
    info!("Color type: {:?}", color);
    info!("Depth: {}", depth);
    info!("Interlace: {:?}", interlace);

    Ok(PngHeader {
        width,
        height,
        depth,
        color,
        interlace
    })
}

/// Parse a PLTE payload into rgb entries
pub fn parse_plte(data: &[u8]) -> Result<Vec<[u8; 3]>, PngDecodeErrors> {
    if data.is_empty() || data.len() % 3 != 0 {
        return Err(PngDecodeErrors::HeaderError(format!(
            "Invalid PLTE length {}, not a non-zero multiple of 3",
            data.len()
        )));
    }
    if data.len() / 3 > MAX_PALETTE_ENTRIES {
        return Err(PngDecodeErrors::HeaderError(format!(
            "PLTE has {} entries, more than {MAX_PALETTE_ENTRIES}",
            data.len() / 3
        )));
    }
    trace!("Palette entries: {}", data.len() / 3);

    Ok(data
        .chunks_exact(3)
        .map(|entry| [entry[0], entry[1], entry[2]])
        .collect())
}
