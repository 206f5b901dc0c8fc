/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! SSE capable de-filter routines.
//!
//! The paeth and average kernels follow the ones in libspng
//! (https://github.com/randy408/libspng), which took them from libpng,
//! and hence they are governed by that license.
//!
//! Every routine works in place and finishes bytes that do not fill
//! a whole pixel with scalar code.

// COPYRIGHT NOTICE, DISCLAIMER, and LICENSE
// =========================================
//
// PNG Reference Library License version 2
// ---------------------------------------
//
//  * Copyright (c) 1995-2022 The PNG Reference Library Authors.
//  * Copyright (c) 2018-2022 Cosmin Truta.
//  * Copyright (c) 2000-2002, 2004, 2006-2018 Glenn Randers-Pehrson.
//  * Copyright (c) 1996-1997 Andreas Dilger.
//  * Copyright (c) 1995-1996 Guy Eric Schalnat, Group 42, Inc.
//
// The software is supplied "as is", without warranty of any kind,
// express or implied, including, without limitation, the warranties
// of merchantability, fitness for a particular purpose, title, and
// non-infringement.  In no event shall the Copyright owners, or
// anyone distributing the software, be liable for any damages or
// other liability, whether in contract, tort or otherwise, arising
// from, out of, or in connection with the software, or the use or
// other dealings in the software, even if advised of the possibility
// of such damage.
//
// Permission is hereby granted to use, copy, modify, and distribute
// this software, or portions hereof, for any purpose, without fee,
// subject to the following restrictions:
//
//  1. The origin of this software must not be misrepresented; you
//     must not claim that you wrote the original software.  If you
//     use this software in a product, an acknowledgment in the product
//     documentation would be appreciated, but is not required.
//
//  2. Altered source versions must be plainly marked as such, and must
//     not be misrepresented as being the original software.
//
//  3. This Copyright notice may not be removed or altered from any
//     source or altered source distribution.
//
//
// PNG Reference Library License version 1 (for libpng 0.5 through 1.6.35)
// -----------------------------------------------------------------------
//
// libpng versions 1.0.7, July 1, 2000, through 1.6.35, July 15, 2018 are
// Copyright (c) 2000-2002, 2004, 2006-2018 Glenn Randers-Pehrson, are
// derived from libpng-1.0.6, and are distributed according to the same
// disclaimer and license as libpng-1.0.6 with the following individuals
// added to the list of Contributing Authors:
//
//     Simon-Pierre Cadieux
//     Eric S. Raymond
//     Mans Rullgard
//     Cosmin Truta
//     Gilles Vollant
//     James Yu
//     Mandar Sahastrabuddhe
//     Google Inc.
//     Vadim Barkov
//
// and with the following additions to the disclaimer:
//
//     There is no warranty against interference with your enjoyment of
//     the library or against infringement.  There is no warranty that our
//     efforts or the library will fulfill any of your particular purposes
//     or needs.  This library is provided with all faults, and the entire
//     risk of satisfactory quality, performance, accuracy, and effort is
//     with the user.
//
// Some files in the "contrib" directory and some configure-generated
// files that are distributed with libpng have other copyright owners, and
// are released under other open source licenses.
//
// libpng versions 0.97, January 1998, through 1.0.6, March 20, 2000, are
// Copyright (c) 1998-2000 Glenn Randers-Pehrson, are derived from
// libpng-0.96, and are distributed according to the same disclaimer and
// license as libpng-0.96, with the following individuals added to the
// list of Contributing Authors:
//
//     Tom Lane
//     Glenn Randers-Pehrson
//     Willem van Schaik
//
// libpng versions 0.89, June 1996, through 0.96, May 1997, are
// Copyright (c) 1996-1997 Andreas Dilger, are derived from libpng-0.88,
// and are distributed according to the same disclaimer and license as
// libpng-0.88, with the following individuals added to the list of
// Contributing Authors:
//
//     John Bowler
//     Kevin Bracey
//     Sam Bushell
//     Magnus Holmgren
//     Greg Roelofs
//     Tom Tanner
//
// Some files in the "scripts" directory have other copyright owners,
// but are released under this license.
//
// libpng versions 0.5, May 1995, through 0.88, January 1996, are
// Copyright (c) 1995-1996 Guy Eric Schalnat, Group 42, Inc.
//
// For the purposes of this copyright and license, "Contributing Authors"
// is defined as the following set of individuals:
//
//     Andreas Dilger
//     Dave Martindale
//     Guy Eric Schalnat
//     Paul Schmidt
//     Tim Wegner
//
// The PNG Reference Library is supplied "AS IS".  The Contributing
// Authors and Group 42, Inc. disclaim all warranties, expressed or
// implied, including, without limitation, the warranties of
// merchantability and of fitness for any purpose.  The Contributing
// Authors and Group 42, Inc. assume no liability for direct, indirect,
// incidental, special, exemplary, or consequential damages, which may
// result from the use of the PNG Reference Library, even if advised of
// the possibility of such damage.
//
// Permission is hereby granted to use, copy, modify, and distribute this
// source code, or portions hereof, for any purpose, without fee, subject
// to the following restrictions:
//
//  1. The origin of this source code must not be misrepresented.
//
//  2. Altered versions must be plainly marked as such and must not
//     be misrepresented as being the original source.
//
//  3. This Copyright notice may not be removed or altered from any
//     source or altered source distribution.
//
// The Contributing Authors and Group 42, Inc. specifically permit,
// without fee, and encourage the use of this source code as a component
// to supporting the PNG file format in commercial products.  If you use
// this source code in a product, acknowledgment is not required but would
// be appreciated.

#![cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#![cfg(feature = "sse")]

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use crate::filters::de_filter::paeth;

/// Load `N` bytes into the low lanes of a register, the rest are zero
#[inline(always)]
unsafe fn load<const N: usize>(x: &[u8]) -> __m128i {
    let mut tmp = [0_u8; 16];
    tmp[..N].copy_from_slice(&x[..N]);
    _mm_loadu_si128(tmp.as_ptr().cast())
}

/// Store the low `N` lanes of `v` into `x`
#[inline(always)]
unsafe fn store<const N: usize>(x: &mut [u8], v: __m128i) {
    let mut tmp = [0_u8; 16];
    _mm_storeu_si128(tmp.as_mut_ptr().cast(), v);
    x[..N].copy_from_slice(&tmp[..N]);
}

#[inline]
#[target_feature(enable = "sse4.1")]
unsafe fn if_then_else(c: __m128i, t: __m128i, e: __m128i) -> __m128i {
    _mm_blendv_epi8(e, t, c)
}

#[target_feature(enable = "sse2")]
unsafe fn defilter_sub_sse2_inner<const N: usize>(row: &mut [u8]) {
    let mut a = _mm_setzero_si128();

    for pixel in row.chunks_exact_mut(N) {
        a = _mm_add_epi8(load::<N>(pixel), a);
        store::<N>(pixel, a);
    }
}

#[target_feature(enable = "sse2")]
unsafe fn defilter_up_sse2_inner(prev_row: &[u8], row: &mut [u8]) {
    let end = row.len().min(prev_row.len());

    let mut out_chunks = row[..end].chunks_exact_mut(16);
    let mut prev_chunks = prev_row[..end].chunks_exact(16);

    for (out, up) in (&mut out_chunks).zip(&mut prev_chunks) {
        let x = _mm_loadu_si128(out.as_ptr().cast());
        let b = _mm_loadu_si128(up.as_ptr().cast());
        _mm_storeu_si128(out.as_mut_ptr().cast(), _mm_add_epi8(x, b));
    }
    for (recon, up) in out_chunks
        .into_remainder()
        .iter_mut()
        .zip(prev_chunks.remainder())
    {
        *recon = recon.wrapping_add(*up);
    }
}

#[target_feature(enable = "sse2")]
unsafe fn defilter_avg_sse2_inner<const N: usize>(prev_row: &[u8], row: &mut [u8]) {
    /*
     * There is no pixel left of the first pixel, its prediction is half
     * the pixel above, which falls out of the loop if a starts at zero.
     */
    let ones = _mm_set1_epi8(1);
    let mut a = _mm_setzero_si128();

    for (pixel, prev) in row.chunks_exact_mut(N).zip(prev_row.chunks_exact(N)) {
        let b = load::<N>(prev);
        let d = load::<N>(pixel);

        // _mm_avg_epu8 rounds up, take one off wherever it did
        let mut avg = _mm_avg_epu8(a, b);
        avg = _mm_sub_epi8(avg, _mm_and_si128(_mm_xor_si128(a, b), ones));

        a = _mm_add_epi8(d, avg);
        store::<N>(pixel, a);
    }
}

#[target_feature(enable = "sse4.1")]
unsafe fn defilter_paeth_sse41_inner<const N: usize>(prev_row: &[u8], row: &mut [u8]) {
    /*
     *   prev: c b
     *   row:  a d
     * The first pixel has no left context, forcing a and c to zero
     * turns p = a + b - c into p = b, which is what the format wants.
     */
    let zero = _mm_setzero_si128();
    let (mut b, mut d) = (zero, zero);

    for (pixel, prev) in row.chunks_exact_mut(N).zip(prev_row.chunks_exact(N)) {
        // 16 bit lanes so pc cannot overflow
        let c = b;
        b = _mm_unpacklo_epi8(load::<N>(prev), zero);
        let a = d;
        d = _mm_unpacklo_epi8(load::<N>(pixel), zero);

        // p - a == b - c
        let pa = _mm_sub_epi16(b, c);
        // p - b == a - c
        let pb = _mm_sub_epi16(a, c);
        // p - c == (b - c) + (a - c)
        let pc = _mm_add_epi16(pa, pb);

        let pa = _mm_abs_epi16(pa);
        let pb = _mm_abs_epi16(pb);
        let pc = _mm_abs_epi16(pc);

        let smallest = _mm_min_epi16(pc, _mm_min_epi16(pa, pb));

        // ties favour a, then b, then c
        let nearest = if_then_else(
            _mm_cmpeq_epi16(smallest, pa),
            a,
            if_then_else(_mm_cmpeq_epi16(smallest, pb), b, c)
        );

        // 8 bit add so each lane wraps at 256, upper halves stay zero
        d = _mm_add_epi8(d, nearest);

        store::<N>(pixel, _mm_packus_epi16(d, d));
    }
}

/// Index of the first byte the vector loop did not cover
#[inline(always)]
const fn vector_end(len: usize, components: usize) -> usize {
    len - len % components
}

/// De-filter a sub filtered row
///
/// # Panics
/// If sse2 isn't present
pub fn defilter_sub_sse2<const N: usize>(row: &mut [u8]) {
    assert!(
        is_x86_feature_detected!("sse2"),
        "SSE2 feature not found, this is unsound, please file an issue"
    );
    unsafe { defilter_sub_sse2_inner::<N>(row) };

    for i in vector_end(row.len(), N).max(N)..row.len() {
        row[i] = row[i].wrapping_add(row[i - N]);
    }
}

/// De-filter an up filtered row, 16 bytes at a time
///
/// # Panics
/// If sse2 isn't present
pub fn defilter_up_sse2(prev_row: &[u8], row: &mut [u8]) {
    assert!(
        is_x86_feature_detected!("sse2"),
        "SSE2 feature not found, this is unsound, please file an issue"
    );
    unsafe { defilter_up_sse2_inner(prev_row, row) };
}

/// De-filter an average filtered row
///
/// # Panics
/// If sse2 isn't present
pub fn defilter_avg_sse2<const N: usize>(prev_row: &[u8], row: &mut [u8]) {
    assert!(
        is_x86_feature_detected!("sse2"),
        "SSE2 feature not found, this is unsound, please file an issue"
    );
    unsafe { defilter_avg_sse2_inner::<N>(prev_row, row) };

    let end = row.len().min(prev_row.len());

    for i in vector_end(end, N)..end {
        let left = if i >= N { row[i - N] } else { 0 };
        let above = prev_row[i];
        row[i] = row[i].wrapping_add((left & above) + ((left ^ above) >> 1));
    }
}

/// De-filter a paeth filtered row
///
/// # Panics
/// If sse4.1 isn't present
pub fn defilter_paeth_sse41<const N: usize>(prev_row: &[u8], row: &mut [u8]) {
    assert!(
        is_x86_feature_detected!("sse4.1"),
        "SSE4.1 feature not found, this is unsound, please file an issue"
    );
    unsafe { defilter_paeth_sse41_inner::<N>(prev_row, row) };

    let end = row.len().min(prev_row.len());

    for i in vector_end(end, N)..end {
        let predicted = if i >= N {
            paeth(row[i - N], prev_row[i], prev_row[i - N])
        } else {
            prev_row[i]
        };
        row[i] = row[i].wrapping_add(predicted);
    }
}

#[cfg(test)]
mod tests {
    use nanorand::Rng;

    use super::*;
    use crate::filters::de_filter;

    fn random_rows(len: usize, seed: u64) -> (Vec<u8>, Vec<u8>) {
        let mut rng = nanorand::WyRand::new_seed(seed);
        let mut prev = vec![0_u8; len];
        let mut row = vec![0_u8; len];
        rng.fill(&mut prev);
        rng.fill(&mut row);
        (prev, row)
    }

    macro_rules! compare {
        ($n:expr) => {
            // odd lengths exercise the scalar tails
            for len in [$n, 4 * $n, 31 * $n, 31 * $n + 2, 1] {
                let (prev, raw) = random_rows(len, len as u64);

                let mut expected = raw.clone();
                let mut found = raw.clone();
                de_filter::defilter_sub(&mut expected, $n);
                defilter_sub_sse2::<$n>(&mut found);
                assert_eq!(expected, found, "sub bpp={} len={}", $n, len);

                let mut expected = raw.clone();
                let mut found = raw.clone();
                de_filter::defilter_avg(&prev, &mut expected, $n);
                defilter_avg_sse2::<$n>(&prev, &mut found);
                assert_eq!(expected, found, "avg bpp={} len={}", $n, len);

                if is_x86_feature_detected!("sse4.1") {
                    let mut expected = raw.clone();
                    let mut found = raw.clone();
                    de_filter::defilter_paeth(&prev, &mut expected, $n);
                    defilter_paeth_sse41::<$n>(&prev, &mut found);
                    assert_eq!(expected, found, "paeth bpp={} len={}", $n, len);
                }
            }
        };
    }

    #[test]
    fn kernels_match_scalar() {
        if !is_x86_feature_detected!("sse2") {
            return;
        }
        compare!(3);
        compare!(4);
        compare!(8);
    }

    #[test]
    fn up_matches_scalar() {
        if !is_x86_feature_detected!("sse2") {
            return;
        }
        for len in [0, 1, 15, 16, 17, 100] {
            let (prev, raw) = random_rows(len, 7);

            let mut expected = raw.clone();
            let mut found = raw;
            de_filter::defilter_up(&prev, &mut expected);
            defilter_up_sse2(&prev, &mut found);
            assert_eq!(expected, found);
        }
    }
}
