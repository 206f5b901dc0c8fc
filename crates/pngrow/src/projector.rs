/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Writing de-filtered scanlines into rows of typed pixels
use log::warn;
use pngrow_core::options::PaletteIndexPolicy;
use pngrow_core::pixel::{Pixel, Rgb16, Rgb8, Rgba16, Rgba8};

use crate::constants::LUMA_SCALE;
use crate::enums::PngColor;
use crate::error::PngDecodeErrors;
use crate::expand::expand_bits;
use crate::headers::PngHeader;

/// Placement of a scanline's pixels in the destination row
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RowLayout {
    /// Pixels in the scanline
    pub columns:          usize,
    /// Destination column of the first pixel
    pub pixel_offset:     usize,
    /// Distance between destination columns
    pub column_increment: usize
}

impl RowLayout {
    /// Every column of a row `width` pixels wide
    pub const fn full(width: usize) -> RowLayout {
        RowLayout {
            columns:          width,
            pixel_offset:     0,
            column_increment: 1
        }
    }
}

pub struct ScanlineProjector<'a> {
    header:         PngHeader,
    palette:        &'a [[u8; 3]],
    policy:         PaletteIndexPolicy,
    scale_low_bits: bool,
    warned_clamp:   bool
}

impl<'a> ScanlineProjector<'a> {
    pub fn new(
        header: PngHeader, palette: &'a [[u8; 3]], policy: PaletteIndexPolicy,
        scale_low_bits: bool
    ) -> ScanlineProjector<'a> {
        ScanlineProjector {
            header,
            palette,
            policy,
            scale_low_bits,
            warned_clamp: false
        }
    }

    /// Write the pixels of `scanline` (filter byte removed) into `row`
    ///
    /// `scratch` holds unpacked samples for depths below 8 and must fit
    /// `layout.columns` bytes in that case.
    pub fn project<T: Pixel>(
        &mut self, scanline: &[u8], row: &mut [T], layout: RowLayout, scratch: &mut [u8]
    ) -> Result<(), PngDecodeErrors> {
        let header = self.header;
        let columns = layout.columns;

        // destination pixels this scanline touches
        let targets = row
            .iter_mut()
            .skip(layout.pixel_offset)
            .step_by(layout.column_increment.max(1))
            .take(columns);

        let samples = if header.depth < 8 {
            expand_bits(scanline, scratch, header.depth, columns);
            &scratch[..columns.min(scratch.len())]
        } else {
            scanline
        };

        match (header.color, header.depth) {
            (PngColor::Palette, _) => {
                self.project_palette(samples, targets)?;
            }
            (PngColor::Luma, 16) => {
                for (px, v) in targets.zip(samples.chunks_exact(2)) {
                    *px = T::from_luma16(u16::from_be_bytes([v[0], v[1]]));
                }
            }
            (PngColor::Luma, depth) => {
                let scale = if depth < 8 && self.scale_low_bits {
                    LUMA_SCALE[usize::from(depth)]
                } else {
                    1
                };
                for (px, v) in targets.zip(samples) {
                    *px = T::from_luma8(v.wrapping_mul(scale));
                }
            }
            (PngColor::LumaA, 16) => {
                for (px, v) in targets.zip(samples.chunks_exact(4)) {
                    let luma = u16::from_be_bytes([v[0], v[1]]);
                    let alpha = u16::from_be_bytes([v[2], v[3]]);
                    *px = T::from_luma_alpha16(luma, alpha);
                }
            }
            (PngColor::LumaA, _) => {
                for (px, v) in targets.zip(samples.chunks_exact(2)) {
                    *px = T::from_luma_alpha8(v[0], v[1]);
                }
            }
            (PngColor::RGB, 16) => {
                for (px, v) in targets.zip(samples.chunks_exact(6)) {
                    *px = T::from_rgb16(Rgb16 {
                        r: u16::from_be_bytes([v[0], v[1]]),
                        g: u16::from_be_bytes([v[2], v[3]]),
                        b: u16::from_be_bytes([v[4], v[5]])
                    });
                }
            }
            (PngColor::RGB, _) => {
                let len = (samples.len() / 3).min(columns) * 3;
                let pixels: &[Rgb8] = bytemuck::cast_slice(&samples[..len]);

                for (px, v) in targets.zip(pixels) {
                    *px = T::from_rgb8(*v);
                }
            }
            (PngColor::RGBA, 16) => {
                for (px, v) in targets.zip(samples.chunks_exact(8)) {
                    *px = T::from_rgba16(Rgba16 {
                        r: u16::from_be_bytes([v[0], v[1]]),
                        g: u16::from_be_bytes([v[2], v[3]]),
                        b: u16::from_be_bytes([v[4], v[5]]),
                        a: u16::from_be_bytes([v[6], v[7]])
                    });
                }
            }
            (PngColor::RGBA, _) => {
                let len = (samples.len() / 4).min(columns) * 4;
                let pixels: &[Rgba8] = bytemuck::cast_slice(&samples[..len]);

                for (px, v) in targets.zip(pixels) {
                    *px = T::from_rgba8(*v);
                }
            }
        }
        Ok(())
    }

    fn project_palette<'p, T: Pixel + 'p>(
        &mut self, indices: &[u8], targets: impl Iterator<Item = &'p mut T>
    ) -> Result<(), PngDecodeErrors> {
        let entries = self.palette.len();

        if entries == 0 {
            return Err(PngDecodeErrors::MissingPalette);
        }
        let last = entries - 1;

        for (px, &index) in targets.zip(indices) {
            let mut slot = usize::from(index);

            if slot > last {
                if self.policy == PaletteIndexPolicy::Reject {
                    return Err(PngDecodeErrors::PaletteIndexOutOfRange(index, entries));
                }
                if !self.warned_clamp {
                    warn!(
                        "Palette index {} out of range for {} entries, clamping",
                        index, entries
                    );
                    self.warned_clamp = true;
                }
                slot = last;
            }
            let [r, g, b] = self.palette[slot];
            *px = T::from_rgb8(Rgb8 { r, g, b });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pngrow_core::pixel::{Luma16, Luma8, LumaA8};

    use super::*;
    use crate::enums::InterlaceMethod;

    fn header(color: PngColor, depth: u8, width: usize) -> PngHeader {
        PngHeader {
            width,
            height: 1,
            depth,
            color,
            interlace: InterlaceMethod::Standard
        }
    }

    #[test]
    fn scales_low_bit_gray() {
        let mut projector =
            ScanlineProjector::new(header(PngColor::Luma, 2, 4), &[], Default::default(), true);
        let mut row = [Luma8(0); 4];
        let mut scratch = [0; 4];

        projector
            .project(&[0b0001_1011], &mut row, RowLayout::full(4), &mut scratch)
            .unwrap();
        assert_eq!(row, [Luma8(0), Luma8(0x55), Luma8(0xAA), Luma8(0xFF)]);

        let mut raw =
            ScanlineProjector::new(header(PngColor::Luma, 2, 4), &[], Default::default(), false);
        raw.project(&[0b0001_1011], &mut row, RowLayout::full(4), &mut scratch)
            .unwrap();
        assert_eq!(row, [Luma8(0), Luma8(1), Luma8(2), Luma8(3)]);
    }

    #[test]
    fn sixteen_bits_are_big_endian() {
        let mut projector =
            ScanlineProjector::new(header(PngColor::Luma, 16, 2), &[], Default::default(), true);
        let mut row = [Luma16(0); 2];

        projector
            .project(&[0x12, 0x34, 0xFF, 0x00], &mut row, RowLayout::full(2), &mut [])
            .unwrap();
        assert_eq!(row, [Luma16(0x1234), Luma16(0xFF00)]);
    }

    #[test]
    fn palette_clamps_or_rejects() {
        let palette = [[1, 2, 3], [4, 5, 6]];
        let mut row = [Rgb8::default(); 2];

        let mut clamp = ScanlineProjector::new(
            header(PngColor::Palette, 8, 2),
            &palette,
            PaletteIndexPolicy::Clamp,
            true
        );
        clamp
            .project(&[0, 7], &mut row, RowLayout::full(2), &mut [])
            .unwrap();
        assert_eq!(row[1], Rgb8 { r: 4, g: 5, b: 6 });

        let mut reject = ScanlineProjector::new(
            header(PngColor::Palette, 8, 2),
            &palette,
            PaletteIndexPolicy::Reject,
            true
        );
        assert!(matches!(
            reject.project(&[0, 7], &mut row, RowLayout::full(2), &mut []),
            Err(PngDecodeErrors::PaletteIndexOutOfRange(7, 2))
        ));
    }

    #[test]
    fn interlaced_rows_write_every_nth_column() {
        let mut projector =
            ScanlineProjector::new(header(PngColor::LumaA, 8, 8), &[], Default::default(), true);
        let mut row = [LumaA8::default(); 8];
        let layout = RowLayout {
            columns:          2,
            pixel_offset:     1,
            column_increment: 4
        };

        projector
            .project(&[10, 11, 20, 21], &mut row, layout, &mut [])
            .unwrap();

        assert_eq!(row[1], LumaA8 { l: 10, a: 11 });
        assert_eq!(row[5], LumaA8 { l: 20, a: 21 });
        assert_eq!(row[0], LumaA8::default());
        assert_eq!(row[2], LumaA8::default());
    }
}
