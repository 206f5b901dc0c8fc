/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Png scanline filters
//!
//! Decoding goes through [`FilterKernels`], which settles once which
//! kernels (scalar or SSE) a decode uses so rows do no feature detection.
use pngrow_core::options::DecoderOptions;

use crate::enums::FilterType;

pub mod de_filter;
pub mod en_filter;
mod sse4;

/// The set of de-filter kernels used for a decode
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct FilterKernels {
    use_sse2:  bool,
    use_sse41: bool
}

impl FilterKernels {
    /// Kernels picked from `options` and what the running cpu supports
    pub fn new(options: &DecoderOptions) -> FilterKernels {
        if cfg!(feature = "sse") {
            FilterKernels {
                use_sse2:  options.use_sse2(),
                use_sse41: options.use_sse41()
            }
        } else {
            FilterKernels::scalar()
        }
    }

    /// Portable kernels only
    pub const fn scalar() -> FilterKernels {
        FilterKernels {
            use_sse2:  false,
            use_sse41: false
        }
    }

    pub const fn uses_simd(&self) -> bool {
        self.use_sse2 | self.use_sse41
    }

    /// Reverse `filter` on `row` in place
    ///
    /// `prev_row` is the reconstructed row above, all zeroes for
    /// the first row of an image or an interlace pass. `components`
    /// is the number of bytes per complete pixel, at least one.
    pub fn decode(&self, filter: FilterType, row: &mut [u8], prev_row: &[u8], components: usize) {
        #[cfg(all(feature = "sse", any(target_arch = "x86", target_arch = "x86_64")))]
        {
            if self.decode_simd(filter, row, prev_row, components) {
                return;
            }
        }
        match filter {
            FilterType::None => {}
            FilterType::Sub => de_filter::defilter_sub(row, components),
            FilterType::Up => de_filter::defilter_up(prev_row, row),
            FilterType::Average => de_filter::defilter_avg(prev_row, row, components),
            FilterType::Paeth => de_filter::defilter_paeth(prev_row, row, components)
        }
    }

    /// Returns false when no vector kernel handles this filter and pixel size
    #[cfg(all(feature = "sse", any(target_arch = "x86", target_arch = "x86_64")))]
    fn decode_simd(
        &self, filter: FilterType, row: &mut [u8], prev_row: &[u8], components: usize
    ) -> bool {
        use crate::filters::sse4::*;

        match (filter, components) {
            (FilterType::Up, _) if self.use_sse2 => defilter_up_sse2(prev_row, row),
            (FilterType::Sub, 3) if self.use_sse2 => defilter_sub_sse2::<3>(row),
            (FilterType::Sub, 4) if self.use_sse2 => defilter_sub_sse2::<4>(row),
            (FilterType::Sub, 8) if self.use_sse2 => defilter_sub_sse2::<8>(row),
            (FilterType::Average, 3) if self.use_sse2 => defilter_avg_sse2::<3>(prev_row, row),
            (FilterType::Average, 4) if self.use_sse2 => defilter_avg_sse2::<4>(prev_row, row),
            (FilterType::Average, 8) if self.use_sse2 => defilter_avg_sse2::<8>(prev_row, row),
            (FilterType::Paeth, 3) if self.use_sse41 => defilter_paeth_sse41::<3>(prev_row, row),
            (FilterType::Paeth, 4) if self.use_sse41 => defilter_paeth_sse41::<4>(prev_row, row),
            (FilterType::Paeth, 8) if self.use_sse41 => defilter_paeth_sse41::<8>(prev_row, row),
            _ => return false
        }
        true
    }
}

/// Reverse `filter` on `scanline` in place with the portable kernels
pub fn decode(filter: FilterType, scanline: &mut [u8], previous: &[u8], components: usize) {
    FilterKernels::scalar().decode(filter, scanline, previous, components);
}

/// Apply `filter` to `scanline`, returning the filtered bytes and their cost
///
/// The cost is the sum of the filtered bytes read as signed magnitudes.
pub fn encode(
    filter: FilterType, scanline: &[u8], previous: &[u8], components: usize
) -> (Vec<u8>, u64) {
    let mut filtered = Vec::with_capacity(scanline.len());
    en_filter::filter_scanline(filter, scanline, previous, components, &mut filtered);
    let cost = en_filter::score_filter(&filtered);

    (filtered, cost)
}
