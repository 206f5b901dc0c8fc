/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Forward filters, the inverse of [`de_filter`](super::de_filter)
//!
//! Only the filter math and its cost heuristic live here, choosing a
//! filter per row is left to whoever encodes.
use crate::enums::FilterType;
use crate::filters::de_filter::paeth;

fn filter_sub(row: &[u8], components: usize, output: &mut Vec<u8>) {
    for (i, &byte) in row.iter().enumerate() {
        let left = if i >= components { row[i - components] } else { 0 };
        output.push(byte.wrapping_sub(left));
    }
}

fn filter_up(row: &[u8], prev_row: &[u8], output: &mut Vec<u8>) {
    for (byte, up) in row.iter().zip(prev_row) {
        output.push(byte.wrapping_sub(*up));
    }
}

fn filter_avg(row: &[u8], prev_row: &[u8], components: usize, output: &mut Vec<u8>) {
    for (i, (&byte, &above)) in row.iter().zip(prev_row).enumerate() {
        let left = if i >= components { u16::from(row[i - components]) } else { 0 };
        let avg = ((left + u16::from(above)) >> 1) as u8;
        output.push(byte.wrapping_sub(avg));
    }
}

fn filter_paeth(row: &[u8], prev_row: &[u8], components: usize, output: &mut Vec<u8>) {
    for (i, (&byte, &above)) in row.iter().zip(prev_row).enumerate() {
        let (left, upper_left) = if i >= components {
            (row[i - components], prev_row[i - components])
        } else {
            (0, 0)
        };
        output.push(byte.wrapping_sub(paeth(left, above, upper_left)));
    }
}

/// Filter `row` into `output`, clearing it first
///
/// `prev_row` must be at least as long as `row` for filters that use it
pub fn filter_scanline(
    filter: FilterType, row: &[u8], prev_row: &[u8], components: usize, output: &mut Vec<u8>
) {
    output.clear();
    output.reserve(row.len());

    match filter {
        FilterType::None => output.extend_from_slice(row),
        FilterType::Sub => filter_sub(row, components, output),
        FilterType::Up => filter_up(row, prev_row, output),
        FilterType::Average => filter_avg(row, prev_row, components, output),
        FilterType::Paeth => filter_paeth(row, prev_row, components, output)
    }
}

/// Sum of absolute values of the filtered bytes read as signed,
/// lower usually compresses better
pub fn score_filter(filtered: &[u8]) -> u64 {
    filtered
        .iter()
        .map(|&b| u64::from((b as i8).unsigned_abs()))
        .sum()
}
