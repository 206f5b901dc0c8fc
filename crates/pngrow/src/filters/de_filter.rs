/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Scalar de-filter routines
//!
//! All routines work in place, `row` holds filtered bytes on entry and
//! reconstructed bytes on exit. `prev_row` is the reconstructed row above,
//! all zeroes for the first row of an image or pass.
//! Bytes left of the first pixel are treated as zero.

pub fn defilter_sub(row: &mut [u8], components: usize) {
    for i in components..row.len() {
        row[i] = row[i].wrapping_add(row[i - components]);
    }
}

pub fn defilter_up(prev_row: &[u8], row: &mut [u8]) {
    for (recon, up) in row.iter_mut().zip(prev_row) {
        *recon = recon.wrapping_add(*up);
    }
}

pub fn defilter_avg(prev_row: &[u8], row: &mut [u8], components: usize) {
    // raw length is one row, so always keep it in check
    let end = row.len().min(prev_row.len());

    // handle leftmost pixel explicitly
    for i in 0..components.min(end) {
        row[i] = row[i].wrapping_add(prev_row[i] >> 1);
    }

    for i in components..end {
        let a = row[i - components];
        let b = prev_row[i];

        // floor((a + b) / 2) without leaving 8 bits
        let c = (a & b) + ((a ^ b) >> 1);

        row[i] = row[i].wrapping_add(c);
    }
}

pub fn defilter_paeth(prev_row: &[u8], row: &mut [u8], components: usize) {
    let end = row.len().min(prev_row.len());

    // left and upper left are zero, so the predictor is always above
    for i in 0..components.min(end) {
        row[i] = row[i].wrapping_add(prev_row[i]);
    }

    for i in components..end {
        let predicted = paeth(row[i - components], prev_row[i], prev_row[i - components]);
        row[i] = row[i].wrapping_add(predicted);
    }
}

/// The paeth predictor
///
/// Picks whichever of left (`a`), above (`b`) or upper left (`c`)
/// is closest to `a + b - c`, ties favour `a`, then `b`.
#[inline(always)]
pub fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let a_i = i16::from(a);
    let b_i = i16::from(b);
    let c_i = i16::from(c);

    let p = a_i + b_i - c_i;
    let pa = (p - a_i).abs();
    let pb = (p - b_i).abs();
    let pc = (p - c_i).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paeth_ties_pick_left() {
        for v in [0, 1, 127, 255] {
            assert_eq!(paeth(v, v, v), v);
        }
        // p = 10, |p-a| = 0
        assert_eq!(paeth(10, 20, 20), 10);
        // p = 30, a = 10, b = 30, c = 10 => b wins
        assert_eq!(paeth(10, 30, 10), 30);
    }

    #[test]
    fn up_with_zero_row_is_identity() {
        let mut row = [9_u8, 200, 3, 44];
        defilter_up(&[0; 4], &mut row);
        assert_eq!(row, [9, 200, 3, 44]);
    }

    #[test]
    fn average_truncates() {
        // above = 3, left = 0 -> predictor 1, not 2
        let mut row = [0_u8];
        defilter_avg(&[3], &mut row, 1);
        assert_eq!(row, [1]);

        // left = 255 (after first pixel), above = 255 -> 255
        let mut row = [255_u8, 0];
        defilter_avg(&[0, 255], &mut row, 1);
        assert_eq!(row, [255, 255]);
    }

    #[test]
    fn sub_wraps() {
        let mut row = [200_u8, 100, 1];
        defilter_sub(&mut row, 1);
        assert_eq!(row, [200, 44, 45]);
    }
}
