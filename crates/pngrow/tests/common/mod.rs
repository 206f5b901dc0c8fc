/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Helpers for assembling png streams by hand
#![allow(dead_code)]

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use pngrow::adam7;
use pngrow::crc::chunk_crc;
use pngrow::filters::encode;
use pngrow::FilterType;

pub const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

pub fn chunk(tag: [u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 12);
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(&tag);
    out.extend_from_slice(data);
    out.extend_from_slice(&chunk_crc(tag, data).to_be_bytes());
    out
}

pub fn ihdr(width: u32, height: u32, depth: u8, color: u8, interlace: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(13);
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[depth, color, 0, 0, interlace]);
    chunk(*b"IHDR", &data)
}

pub fn iend() -> Vec<u8> {
    chunk(*b"IEND", &[])
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Compressed `scanlines` split over `segments` IDAT chunks
pub fn idat(scanlines: &[u8], segments: usize) -> Vec<u8> {
    let compressed = zlib(scanlines);
    let size = compressed.len().div_ceil(segments.max(1)).max(1);

    compressed
        .chunks(size)
        .flat_map(|piece| chunk(*b"IDAT", piece))
        .collect()
}

/// Signature followed by `parts`
pub fn png(parts: &[Vec<u8>]) -> Vec<u8> {
    let mut out = SIGNATURE.to_vec();
    for part in parts {
        out.extend_from_slice(part);
    }
    out
}

/// Filter every row of a byte aligned image, prefixing filter bytes
pub fn filter_rows(pixels: &[u8], row_bytes: usize, bpp: usize, filter: FilterType) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixels.len() + pixels.len() / row_bytes.max(1));
    let mut previous = vec![0; row_bytes];

    for row in pixels.chunks_exact(row_bytes) {
        out.push(filter.to_u8());
        out.extend(encode(filter, row, &previous, bpp).0);
        previous.copy_from_slice(row);
    }
    out
}

/// Reduce a byte aligned image to its seven interlace passes, filtered
pub fn adam7_rows(
    pixels: &[u8], width: usize, height: usize, bpp: usize, filter: FilterType
) -> Vec<u8> {
    let mut out = Vec::new();

    for pass in 0..adam7::PASSES {
        if adam7::is_empty(pass, width, height) {
            continue;
        }
        let mut reduced = Vec::new();

        for y in (adam7::FIRST_ROW[pass]..height).step_by(adam7::ROW_INCREMENT[pass]) {
            for x in (adam7::FIRST_COLUMN[pass]..width).step_by(adam7::COLUMN_INCREMENT[pass]) {
                let start = (y * width + x) * bpp;
                reduced.extend_from_slice(&pixels[start..start + bpp]);
            }
        }
        let row_bytes = adam7::columns(pass, width) * bpp;
        out.extend(filter_rows(&reduced, row_bytes, bpp, filter));
    }
    out
}

/// Pack one sample per byte into `depth` bit samples, leftmost sample
/// in the most significant bits, the last byte padded with zeroes
pub fn pack_bits(samples: &[u8], depth: u8) -> Vec<u8> {
    let depth = usize::from(depth);

    samples
        .chunks(8 / depth)
        .map(|group| {
            group
                .iter()
                .enumerate()
                .fold(0_u8, |byte, (i, sample)| byte | (sample << (8 - depth * (i + 1))))
        })
        .collect()
}

/// Reduce an image of sub byte samples, one sample per input byte, to its
/// interlace passes, packing every reduced row on its own
pub fn adam7_packed(
    samples: &[u8], width: usize, height: usize, depth: u8, filter: FilterType
) -> Vec<u8> {
    let mut out = Vec::new();

    for pass in 0..adam7::PASSES {
        if adam7::is_empty(pass, width, height) {
            continue;
        }
        let mut packed = Vec::new();
        let mut row_bytes = 0;

        for y in (adam7::FIRST_ROW[pass]..height).step_by(adam7::ROW_INCREMENT[pass]) {
            let row: Vec<u8> = (adam7::FIRST_COLUMN[pass]..width)
                .step_by(adam7::COLUMN_INCREMENT[pass])
                .map(|x| samples[y * width + x])
                .collect();
            let bytes = pack_bits(&row, depth);

            row_bytes = bytes.len();
            packed.extend(bytes);
        }
        out.extend(filter_rows(&packed, row_bytes, 1, filter));
    }
    out
}

/// Deterministic noise
pub fn noise(seed: u64, len: usize) -> Vec<u8> {
    use nanorand::Rng;

    let mut rng = nanorand::WyRand::new_seed(seed);
    let mut out = vec![0_u8; len];
    rng.fill(&mut out);
    out
}
