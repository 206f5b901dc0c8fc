/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
#![allow(clippy::upper_case_acronyms, non_camel_case_types)]

use pngrow_core::colorspace::ColorSpace;

/// Chunk type according to table 5.3 of
/// the png standard, see https://www.w3.org/TR/2003/REC-PNG-20031110/
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ChunkType {
    IHDR,
    PLTE,
    IDAT,
    IEND,
    cHRM,
    gAMA,
    iCCP,
    sBIT,
    sRGB,
    bKGD,
    hIST,
    tRNS,
    pHYs,
    sPLT,
    tIME,
    iTXt,
    tEXt,
    zTXt,
    eXIf,
    /// Anything else, with its raw tag
    Unknown([u8; 4])
}

impl ChunkType {
    pub const fn from_bytes(tag: [u8; 4]) -> ChunkType {
        match &tag {
            b"IHDR" => Self::IHDR,
            b"PLTE" => Self::PLTE,
            b"IDAT" => Self::IDAT,
            b"IEND" => Self::IEND,
            b"cHRM" => Self::cHRM,
            b"gAMA" => Self::gAMA,
            b"iCCP" => Self::iCCP,
            b"sBIT" => Self::sBIT,
            b"sRGB" => Self::sRGB,
            b"bKGD" => Self::bKGD,
            b"hIST" => Self::hIST,
            b"tRNS" => Self::tRNS,
            b"pHYs" => Self::pHYs,
            b"sPLT" => Self::sPLT,
            b"tIME" => Self::tIME,
            b"iTXt" => Self::iTXt,
            b"tEXt" => Self::tEXt,
            b"zTXt" => Self::zTXt,
            b"eXIf" => Self::eXIf,
            _ => Self::Unknown(tag)
        }
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        match self {
            Self::IHDR => *b"IHDR",
            Self::PLTE => *b"PLTE",
            Self::IDAT => *b"IDAT",
            Self::IEND => *b"IEND",
            Self::cHRM => *b"cHRM",
            Self::gAMA => *b"gAMA",
            Self::iCCP => *b"iCCP",
            Self::sBIT => *b"sBIT",
            Self::sRGB => *b"sRGB",
            Self::bKGD => *b"bKGD",
            Self::hIST => *b"hIST",
            Self::tRNS => *b"tRNS",
            Self::pHYs => *b"pHYs",
            Self::sPLT => *b"sPLT",
            Self::tIME => *b"tIME",
            Self::iTXt => *b"iTXt",
            Self::tEXt => *b"tEXt",
            Self::zTXt => *b"zTXt",
            Self::eXIf => *b"eXIf",
            Self::Unknown(tag) => tag
        }
    }

    /// Critical chunks have bit 5 of the first byte clear,
    /// i.e an uppercase first letter
    pub const fn is_critical(self) -> bool {
        self.to_bytes()[0] & (1 << 5) == 0
    }

    /// Printable name of the chunk, `XXXX` when the tag is not ascii
    pub fn name(self) -> String {
        let bytes = self.to_bytes();
        core::str::from_utf8(&bytes).unwrap_or("XXXX").to_string()
    }
}

/// Per scanline filter kinds
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FilterType {
    None,
    Sub,
    Up,
    Average,
    Paeth
}

impl FilterType {
    pub const fn from_u8(int: u8) -> Option<FilterType> {
        match int {
            0 => Some(FilterType::None),
            1 => Some(FilterType::Sub),
            2 => Some(FilterType::Up),
            3 => Some(FilterType::Average),
            4 => Some(FilterType::Paeth),
            _ => None
        }
    }

    pub const fn to_u8(self) -> u8 {
        match self {
            FilterType::None => 0,
            FilterType::Sub => 1,
            FilterType::Up => 2,
            FilterType::Average => 3,
            FilterType::Paeth => 4
        }
    }

    pub const ALL: [FilterType; 5] = [
        FilterType::None,
        FilterType::Sub,
        FilterType::Up,
        FilterType::Average,
        FilterType::Paeth
    ];
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InterlaceMethod {
    Standard,
    Adam7
}

impl InterlaceMethod {
    pub const fn from_int(int: u8) -> Option<InterlaceMethod> {
        match int {
            0 => Some(Self::Standard),
            1 => Some(Self::Adam7),
            _ => None
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PngColor {
    Luma,
    Palette,
    LumaA,
    RGB,
    RGBA
}

impl PngColor {
    pub const fn num_components(self) -> usize {
        match self {
            PngColor::Luma | PngColor::Palette => 1,
            PngColor::LumaA => 2,
            PngColor::RGB => 3,
            PngColor::RGBA => 4
        }
    }

    pub const fn from_int(int: u8) -> Option<PngColor> {
        match int {
            0 => Some(Self::Luma),
            2 => Some(Self::RGB),
            3 => Some(Self::Palette),
            4 => Some(Self::LumaA),
            6 => Some(Self::RGBA),
            _ => None
        }
    }

    /// Bit depths the png specification allows for this colour type
    pub const fn allowed_depths(self) -> &'static [u8] {
        match self {
            PngColor::Luma => &[1, 2, 4, 8, 16],
            PngColor::Palette => &[1, 2, 4, 8],
            PngColor::LumaA | PngColor::RGB | PngColor::RGBA => &[8, 16]
        }
    }

    /// Colorspace pixels end up in once decoded, palettes expand to RGB
    pub const fn colorspace(self) -> ColorSpace {
        match self {
            PngColor::Luma => ColorSpace::Luma,
            PngColor::LumaA => ColorSpace::LumaA,
            PngColor::RGB | PngColor::Palette => ColorSpace::RGB,
            PngColor::RGBA => ColorSpace::RGBA
        }
    }
}
