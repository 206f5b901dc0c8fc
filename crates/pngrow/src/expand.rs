/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Unpacking of 1, 2 and 4 bit samples into one byte per sample

/// Expand `samples` packed samples of `depth` bits from `input` into `output`
///
/// Samples are stored high bits first, each output byte holds the raw
/// sample value, i.e a 2 bit sample becomes a value in `0..=3`.
/// Bits past the last sample in the final byte are ignored.
///
/// Stops early if `output` or `input` is too short. A depth of 8 copies
/// the bytes through, other depths leave `output` untouched.
pub fn expand_bits(input: &[u8], output: &mut [u8], depth: u8, samples: usize) {
    let samples = samples.min(output.len());
    let output = &mut output[..samples];

    match depth {
        1 => expand::<1>(input, output),
        2 => expand::<2>(input, output),
        4 => expand::<4>(input, output),
        8 => {
            let len = samples.min(input.len());
            output[..len].copy_from_slice(&input[..len]);
        }
        _ => {}
    }
}

#[inline(always)]
fn expand<const DEPTH: usize>(input: &[u8], output: &mut [u8]) {
    let per_byte = 8 / DEPTH;
    let mask = 0xFF_u8 >> (8 - DEPTH);

    let full_bytes = output.len() / per_byte;
    let mut chunks = output.chunks_exact_mut(per_byte);

    for (out, byte) in (&mut chunks).zip(input) {
        for (i, px) in out.iter_mut().enumerate() {
            let shift = 8 - DEPTH * (i + 1);
            *px = (byte >> shift) & mask;
        }
    }
    // leftovers
    if let Some(byte) = input.get(full_bytes) {
        for (i, px) in chunks.into_remainder().iter_mut().enumerate() {
            let shift = 8 - DEPTH * (i + 1);
            *px = (byte >> shift) & mask;
        }
    }
}
