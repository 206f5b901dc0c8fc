/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// The eight bytes every png stream starts with
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Length of a chunk header, i.e length plus type
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Size of the IHDR payload
pub const IHDR_SIZE: u32 = 13;

/// Largest block of chunk data held at once while confirming a crc
pub const CRC_BLOCK_SIZE: usize = 4096;

/// Maximum number of entries a PLTE chunk may have
pub const MAX_PALETTE_ENTRIES: usize = 256;

/// Multiplier that stretches a 1, 2 or 4 bit gray sample to 8 bits,
/// indexed by bit depth
pub const LUMA_SCALE: [u8; 9] = [0, 0xFF, 0x55, 0, 0x11, 0, 0, 0, 0x01];
