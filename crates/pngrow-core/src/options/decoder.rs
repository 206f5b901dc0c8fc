/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Global Decoder options

/// What to do when a palette index points past the
/// end of the PLTE chunk
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum PaletteIndexPolicy {
    /// Use the last palette entry
    #[default]
    Clamp,
    /// Treat the image as corrupt
    Reject
}

fn decoder_strict_mode() -> DecoderFlags {
    DecoderFlags {
        png_confirm_crc:          true,
        png_scale_low_bit_depths: true,

        intrinsics_unsafe: true,
        intrinsics_sse2:   true,
        intrinsics_sse41:  true
    }
}

/// Fast decoder options
///
/// Enables all intrinsics + unsafe routines
///
/// Disables png crc checking.
fn fast_options() -> DecoderFlags {
    DecoderFlags {
        png_confirm_crc:          false,
        png_scale_low_bit_depths: true,

        intrinsics_unsafe: true,
        intrinsics_sse2:   true,
        intrinsics_sse41:  true
    }
}

/// Decoder options that are flags
///
/// NOTE: When you extend this, add true or false to
/// all options above that return a `DecoderFlag`
#[derive(Copy, Debug, Clone, Default)]
struct DecoderFlags {
    /// Whether the PNG decoder should confirm crc
    png_confirm_crc:          bool,
    /// Whether 1, 2 and 4 bit grayscale samples are stretched to 0..=255
    png_scale_low_bit_depths: bool,
    /// Whether the decoder should use unsafe platform specific intrinsics
    ///
    /// This will also shut down every `intrinsics_*` flag below
    intrinsics_unsafe:        bool,
    /// Whether we should use SSE2.
    intrinsics_sse2:          bool,
    /// Whether we should use sse4.1 instructions where possible.
    intrinsics_sse41:         bool
}

/// Decoder options
///
/// The default is the strict variant, crc checking on and
/// out of range palette indices clamped.
#[derive(Debug, Copy, Clone)]
pub struct DecoderOptions {
    /// Maximum width for which decoders will
    /// not try to decode images larger than
    /// the specified width.
    ///
    /// - Default value: 16384
    max_width:      usize,
    /// Maximum height for which decoders will not
    /// try to decode images larger than the
    /// specified height
    ///
    /// - Default value: 16384
    max_height:     usize,
    /// Boolean flags that influence decoding
    flags:          DecoderFlags,
    /// Handling of palette indices past the palette end
    palette_policy: PaletteIndexPolicy
}

/// Initializers
impl DecoderOptions {
    /// Create the decoder with options  setting most configurable
    /// options to be their safe counterparts
    ///
    /// This is the same as `default` option as default initializes
    /// options to the  safe variant.
    pub fn new_safe() -> DecoderOptions {
        DecoderOptions::default()
    }

    /// Create the decoder with options setting the configurable options
    /// to the fast  counterparts
    ///
    /// This enables platform specific code paths and skips crc checking
    pub fn new_fast() -> DecoderOptions {
        let flag = fast_options();
        DecoderOptions::default().set_decoder_flags(flag)
    }
}

/// Global options
impl DecoderOptions {
    /// Get maximum width configured for which the decoder
    /// should not try to decode images greater than this width
    pub const fn get_max_width(&self) -> usize {
        self.max_width
    }

    /// Get maximum height configured for which the decoder should
    /// not try to decode images greater than this height
    pub const fn get_max_height(&self) -> usize {
        self.max_height
    }

    /// Return true if the decoder should use unsafe
    /// routines where possible
    pub const fn get_use_unsafe(&self) -> bool {
        self.flags.intrinsics_unsafe
    }

    /// Set maximum width for which the decoder should not try
    /// decoding images greater than that width
    #[must_use]
    pub fn set_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    /// Set maximum height for which the decoder should not try
    /// decoding images greater than that height
    #[must_use]
    pub fn set_max_height(mut self, height: usize) -> Self {
        self.max_height = height;
        self
    }

    /// Whether the routines can use unsafe platform specific
    /// intrinsics when necessary
    ///
    /// Treat this with caution, disabling it will cause slowdowns but
    /// it's provided for mainly for debugging use.
    #[must_use]
    pub fn set_use_unsafe(mut self, yes: bool) -> Self {
        self.flags.intrinsics_unsafe = yes;
        self
    }

    fn set_decoder_flags(mut self, flags: DecoderFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set whether the decoder should be in standards conforming/
    /// strict mode
    ///
    /// This turns on crc confirmation and rejects palette indices
    /// that point past the palette.
    #[must_use]
    pub fn set_strict_mode(mut self, yes: bool) -> Self {
        self.flags.png_confirm_crc = yes;
        self.palette_policy = if yes {
            PaletteIndexPolicy::Reject
        } else {
            PaletteIndexPolicy::Clamp
        };
        self
    }
}

/// PNG specific options
impl DecoderOptions {
    /// Whether the png decoder should confirm
    /// crc 32 checksums
    pub const fn png_get_confirm_crc(&self) -> bool {
        self.flags.png_confirm_crc
    }

    /// Set whether the png decoder should confirm
    /// CRC 32 checksums
    #[must_use]
    pub fn png_set_confirm_crc(mut self, yes: bool) -> Self {
        self.flags.png_confirm_crc = yes;
        self
    }

    /// Whether grayscale images with depths of 1,2 or 4 bits
    /// are stretched to the full 0-255 range
    pub const fn png_get_scale_low_bit_depths(&self) -> bool {
        self.flags.png_scale_low_bit_depths
    }

    /// Set whether grayscale images with depths of 1,2 or 4 bits
    /// are stretched to the full 0-255 range.
    ///
    /// When false, the raw sample value is stored, e.g a 1 bit
    /// image produces pixels of 0 and 1
    #[must_use]
    pub fn png_set_scale_low_bit_depths(mut self, yes: bool) -> Self {
        self.flags.png_scale_low_bit_depths = yes;
        self
    }

    /// Return how palette indices past the palette end are handled
    pub const fn png_get_palette_policy(&self) -> PaletteIndexPolicy {
        self.palette_policy
    }

    /// Set how palette indices past the palette end are handled
    #[must_use]
    pub fn png_set_palette_policy(mut self, policy: PaletteIndexPolicy) -> Self {
        self.palette_policy = policy;
        self
    }
}

/// Intrinsics support
///
/// These routines are compiled depending
/// on the platform they are used, if compiled for a platform
/// it doesn't support,(e.g sse on Arm), it will always return `false`
impl DecoderOptions {
    /// Use SSE 2 code paths where possible
    ///
    /// This checks for existence of SSE2 first and returns
    /// false if it's not present
    #[allow(unreachable_code)]
    pub fn use_sse2(&self) -> bool {
        let opt = self.flags.intrinsics_sse2 & self.get_use_unsafe();
        // options says no
        if !opt {
            return false;
        }

        #[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
        {
            if is_x86_feature_detected!("sse2") {
                return true;
            }
        }
        // everything failed return false
        false
    }

    /// Use SSE4 paths where possible
    ///
    /// This also checks for sse 4.1 support and returns false if it
    /// is not present
    #[allow(unreachable_code)]
    pub fn use_sse41(&self) -> bool {
        let opt = self.flags.intrinsics_sse41 & self.get_use_unsafe();
        // options says no
        if !opt {
            return false;
        }

        #[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
        {
            if is_x86_feature_detected!("sse4.1") {
                return true;
            }
        }
        // everything failed return false
        false
    }
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_width:      1 << 14,
            max_height:     1 << 14,
            flags:          decoder_strict_mode(),
            palette_policy: PaletteIndexPolicy::Clamp
        }
    }
}
