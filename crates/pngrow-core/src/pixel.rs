/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Typed pixels the decoder can write into.
//!
//! Every pixel type knows how to build itself from the four
//! shapes a png sample can come in (gray, gray+alpha, rgb, rgba)
//! at eight or sixteen bits. Conversions are deliberately simple,
//! colour management lives elsewhere.
use bytemuck::{Pod, Zeroable};

/// A pixel that can be constructed from decoded png samples.
///
/// Only the four `*_alpha`/`rgba` constructors are required,
/// the opaque variants forward to them with a fully opaque alpha.
pub trait Pixel: Pod + Default + core::fmt::Debug {
    /// Number of channels this pixel stores
    const COMPONENTS: usize;

    fn from_luma_alpha8(luma: u8, alpha: u8) -> Self;

    fn from_luma_alpha16(luma: u16, alpha: u16) -> Self;

    fn from_rgba8(px: Rgba8) -> Self;

    fn from_rgba16(px: Rgba16) -> Self;

    #[inline(always)]
    fn from_luma8(luma: u8) -> Self {
        Self::from_luma_alpha8(luma, u8::MAX)
    }

    #[inline(always)]
    fn from_luma16(luma: u16) -> Self {
        Self::from_luma_alpha16(luma, u16::MAX)
    }

    #[inline(always)]
    fn from_rgb8(px: Rgb8) -> Self {
        Self::from_rgba8(Rgba8 {
            r: px.r,
            g: px.g,
            b: px.b,
            a: u8::MAX
        })
    }

    #[inline(always)]
    fn from_rgb16(px: Rgb16) -> Self {
        Self::from_rgba16(Rgba16 {
            r: px.r,
            g: px.g,
            b: px.b,
            a: u16::MAX
        })
    }
}

/// Grayscale, 8 bits
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Pod, Zeroable)]
pub struct Luma8(pub u8);

/// Grayscale, 16 bits
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Pod, Zeroable)]
pub struct Luma16(pub u16);

/// Grayscale with alpha, 8 bits per channel
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Pod, Zeroable)]
pub struct LumaA8 {
    pub l: u8,
    pub a: u8
}

/// Grayscale with alpha, 16 bits per channel
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Pod, Zeroable)]
pub struct LumaA16 {
    pub l: u16,
    pub a: u16
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Pod, Zeroable)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Pod, Zeroable)]
pub struct Rgb16 {
    pub r: u16,
    pub g: u16,
    pub b: u16
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Pod, Zeroable)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Pod, Zeroable)]
pub struct Rgba16 {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub a: u16
}

/// Replicate the byte so 0xAB becomes 0xABAB, mapping 255 to 65535
#[inline(always)]
const fn widen(v: u8) -> u16 {
    (v as u16) * 257
}

#[inline(always)]
const fn narrow(v: u16) -> u8 {
    (v >> 8) as u8
}

/// BT.601 luma with 8 bit fixed point weights, the weights sum to 256
#[inline(always)]
const fn luma_of8(r: u8, g: u8, b: u8) -> u8 {
    ((77 * r as u32 + 150 * g as u32 + 29 * b as u32 + 128) >> 8) as u8
}

#[inline(always)]
const fn luma_of16(r: u16, g: u16, b: u16) -> u16 {
    ((19595 * r as u64 + 38470 * g as u64 + 7471 * b as u64 + 32768) >> 16) as u16
}

impl Pixel for Luma8 {
    const COMPONENTS: usize = 1;

    fn from_luma_alpha8(luma: u8, _: u8) -> Self {
        Luma8(luma)
    }
    fn from_luma_alpha16(luma: u16, _: u16) -> Self {
        Luma8(narrow(luma))
    }
    fn from_rgba8(px: Rgba8) -> Self {
        Luma8(luma_of8(px.r, px.g, px.b))
    }
    fn from_rgba16(px: Rgba16) -> Self {
        Luma8(narrow(luma_of16(px.r, px.g, px.b)))
    }
}

impl Pixel for Luma16 {
    const COMPONENTS: usize = 1;

    fn from_luma_alpha8(luma: u8, _: u8) -> Self {
        Luma16(widen(luma))
    }
    fn from_luma_alpha16(luma: u16, _: u16) -> Self {
        Luma16(luma)
    }
    fn from_rgba8(px: Rgba8) -> Self {
        Luma16(widen(luma_of8(px.r, px.g, px.b)))
    }
    fn from_rgba16(px: Rgba16) -> Self {
        Luma16(luma_of16(px.r, px.g, px.b))
    }
}

impl Pixel for LumaA8 {
    const COMPONENTS: usize = 2;

    fn from_luma_alpha8(luma: u8, alpha: u8) -> Self {
        LumaA8 { l: luma, a: alpha }
    }
    fn from_luma_alpha16(luma: u16, alpha: u16) -> Self {
        LumaA8 {
            l: narrow(luma),
            a: narrow(alpha)
        }
    }
    fn from_rgba8(px: Rgba8) -> Self {
        LumaA8 {
            l: luma_of8(px.r, px.g, px.b),
            a: px.a
        }
    }
    fn from_rgba16(px: Rgba16) -> Self {
        LumaA8 {
            l: narrow(luma_of16(px.r, px.g, px.b)),
            a: narrow(px.a)
        }
    }
}

impl Pixel for LumaA16 {
    const COMPONENTS: usize = 2;

    fn from_luma_alpha8(luma: u8, alpha: u8) -> Self {
        LumaA16 {
            l: widen(luma),
            a: widen(alpha)
        }
    }
    fn from_luma_alpha16(luma: u16, alpha: u16) -> Self {
        LumaA16 { l: luma, a: alpha }
    }
    fn from_rgba8(px: Rgba8) -> Self {
        LumaA16 {
            l: widen(luma_of8(px.r, px.g, px.b)),
            a: widen(px.a)
        }
    }
    fn from_rgba16(px: Rgba16) -> Self {
        LumaA16 {
            l: luma_of16(px.r, px.g, px.b),
            a: px.a
        }
    }
}

impl Pixel for Rgb8 {
    const COMPONENTS: usize = 3;

    fn from_luma_alpha8(luma: u8, _: u8) -> Self {
        Rgb8 {
            r: luma,
            g: luma,
            b: luma
        }
    }
    fn from_luma_alpha16(luma: u16, _: u16) -> Self {
        let luma = narrow(luma);
        Rgb8 {
            r: luma,
            g: luma,
            b: luma
        }
    }
    fn from_rgba8(px: Rgba8) -> Self {
        Rgb8 {
            r: px.r,
            g: px.g,
            b: px.b
        }
    }
    fn from_rgba16(px: Rgba16) -> Self {
        Rgb8 {
            r: narrow(px.r),
            g: narrow(px.g),
            b: narrow(px.b)
        }
    }
    #[inline(always)]
    fn from_rgb8(px: Rgb8) -> Self {
        px
    }
}

impl Pixel for Rgb16 {
    const COMPONENTS: usize = 3;

    fn from_luma_alpha8(luma: u8, _: u8) -> Self {
        let luma = widen(luma);
        Rgb16 {
            r: luma,
            g: luma,
            b: luma
        }
    }
    fn from_luma_alpha16(luma: u16, _: u16) -> Self {
        Rgb16 {
            r: luma,
            g: luma,
            b: luma
        }
    }
    fn from_rgba8(px: Rgba8) -> Self {
        Rgb16 {
            r: widen(px.r),
            g: widen(px.g),
            b: widen(px.b)
        }
    }
    fn from_rgba16(px: Rgba16) -> Self {
        Rgb16 {
            r: px.r,
            g: px.g,
            b: px.b
        }
    }
    #[inline(always)]
    fn from_rgb16(px: Rgb16) -> Self {
        px
    }
}

impl Pixel for Rgba8 {
    const COMPONENTS: usize = 4;

    fn from_luma_alpha8(luma: u8, alpha: u8) -> Self {
        Rgba8 {
            r: luma,
            g: luma,
            b: luma,
            a: alpha
        }
    }
    fn from_luma_alpha16(luma: u16, alpha: u16) -> Self {
        Self::from_luma_alpha8(narrow(luma), narrow(alpha))
    }
    fn from_rgba8(px: Rgba8) -> Self {
        px
    }
    fn from_rgba16(px: Rgba16) -> Self {
        Rgba8 {
            r: narrow(px.r),
            g: narrow(px.g),
            b: narrow(px.b),
            a: narrow(px.a)
        }
    }
}

impl Pixel for Rgba16 {
    const COMPONENTS: usize = 4;

    fn from_luma_alpha8(luma: u8, alpha: u8) -> Self {
        Self::from_luma_alpha16(widen(luma), widen(alpha))
    }
    fn from_luma_alpha16(luma: u16, alpha: u16) -> Self {
        Rgba16 {
            r: luma,
            g: luma,
            b: luma,
            a: alpha
        }
    }
    fn from_rgba8(px: Rgba8) -> Self {
        Rgba16 {
            r: widen(px.r),
            g: widen(px.g),
            b: widen(px.b),
            a: widen(px.a)
        }
    }
    fn from_rgba16(px: Rgba16) -> Self {
        px
    }
}
