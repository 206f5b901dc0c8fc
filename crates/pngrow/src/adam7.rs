/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Adam7 interlace geometry
//!
//! The image is split into seven passes over an 8x8 tile:
//!
//! ```text
//! 1 6 4 6 2 6 4 6
//! 7 7 7 7 7 7 7 7
//! 5 6 5 6 5 6 5 6
//! 7 7 7 7 7 7 7 7
//! 3 6 4 6 3 6 4 6
//! 7 7 7 7 7 7 7 7
//! 5 6 5 6 5 6 5 6
//! 7 7 7 7 7 7 7 7
//! ```
//! Passes are numbered from zero here.

/// Number of interlace passes
pub const PASSES: usize = 7;

pub const FIRST_ROW: [usize; PASSES] = [0, 0, 4, 0, 2, 0, 1];
pub const FIRST_COLUMN: [usize; PASSES] = [0, 4, 0, 2, 0, 1, 0];
pub const ROW_INCREMENT: [usize; PASSES] = [8, 8, 8, 4, 4, 2, 2];
pub const COLUMN_INCREMENT: [usize; PASSES] = [8, 8, 4, 4, 2, 2, 1];

/// Number of pixels one row of `pass` holds for an image `width` pixels wide
///
/// # Panics
/// If `pass` is not in `0..7`
pub const fn columns(pass: usize, width: usize) -> usize {
    match pass {
        0 => (width + 7) / 8,
        1 => (width + 3) / 8,
        2 => (width + 3) / 4,
        3 => (width + 1) / 4,
        4 => (width + 1) / 2,
        5 => width / 2,
        6 => width,
        _ => panic!("Adam7 has only seven passes")
    }
}

/// Number of rows `pass` holds for an image `height` pixels tall
///
/// # Panics
/// If `pass` is not in `0..7`
pub const fn rows(pass: usize, height: usize) -> usize {
    match pass {
        0 | 1 => (height + 7) / 8,
        2 => (height + 3) / 8,
        3 => (height + 3) / 4,
        4 => (height + 1) / 4,
        5 => (height + 1) / 2,
        6 => height / 2,
        _ => panic!("Adam7 has only seven passes")
    }
}

/// Bytes of one reduced scanline of `pass`, filter byte included,
/// zero when the pass is empty
pub const fn scanline_bytes(pass: usize, width: usize, bits_per_pixel: usize) -> usize {
    let cols = columns(pass, width);

    if cols == 0 {
        return 0;
    }
    (cols * bits_per_pixel + 7) / 8 + 1
}

/// Whether `pass` contributes any scanline
pub const fn is_empty(pass: usize, width: usize, height: usize) -> bool {
    columns(pass, width) == 0 || rows(pass, height) == 0
}
