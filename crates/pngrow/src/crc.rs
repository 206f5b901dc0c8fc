/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! CRC-32 (ISO-HDLC) used by png chunks
//!
//! Reflected polynomial `0xEDB88320`, initial value and final xor of `0xFFFF_FFFF`.

const CRC_POLY: u32 = 0xEDB8_8320;

static CRC_TABLE: [u32; 256] = make_crc_table();

const fn make_crc_table() -> [u32; 256] {
    let mut table = [0_u32; 256];
    let mut n = 0;

    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;

        while k < 8 {
            c = if c & 1 == 1 { CRC_POLY ^ (c >> 1) } else { c >> 1 };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

/// Update a running (un-finalized) crc with `data`
#[inline]
pub fn update_crc(mut crc: u32, data: &[u8]) -> u32 {
    for byte in data {
        crc = CRC_TABLE[((crc ^ u32::from(*byte)) & 0xFF) as usize] ^ (crc >> 8);
    }
    crc
}

/// Calculate the crc of a png chunk, covering the chunk type and then its data
pub fn chunk_crc(chunk_type: [u8; 4], data: &[u8]) -> u32 {
    let crc = update_crc(u32::MAX, &chunk_type);
    !update_crc(crc, data)
}
