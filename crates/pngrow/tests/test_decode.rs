/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::io::Cursor;

use pngrow::{DecodeState, FilterType, PngDecoder};
use pngrow_core::buffer::PixelBuffer;
use pngrow_core::options::DecoderOptions;
use pngrow_core::pixel::{Luma16, Luma8, LumaA8, Rgb16, Rgb8, Rgba8};

mod common;

fn encode_ref(
    data: &[u8], width: u32, height: u32, color: png::ColorType, depth: png::BitDepth,
    palette: Option<Vec<u8>>
) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(color);
        encoder.set_depth(depth);
        encoder.set_adaptive_filter(png::AdaptiveFilterType::Adaptive);

        if let Some(palette) = palette {
            encoder.set_palette(palette);
        }
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(data).unwrap();
    }
    out
}

fn decode_ref(data: &[u8]) -> Vec<u8> {
    let mut decoder = png::Decoder::new(data);
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder.read_info().unwrap();

    let mut buf = vec![0; reader.output_buffer_size()];
    reader.next_frame(&mut buf).unwrap();

    buf
}

fn decode_pngrow<T: pngrow_core::pixel::Pixel>(data: &[u8]) -> PixelBuffer<T> {
    PngDecoder::new(Cursor::new(data)).decode::<T>().unwrap()
}

#[test]
fn matches_reference_eight_bit() {
    let (width, height) = (37, 23);

    let gray = common::noise(1, width * height);
    let png = encode_ref(&gray, 37, 23, png::ColorType::Grayscale, png::BitDepth::Eight, None);
    assert_eq!(decode_pngrow::<Luma8>(&png).as_bytes(), decode_ref(&png));

    let gray_alpha = common::noise(2, width * height * 2);
    let png = encode_ref(
        &gray_alpha,
        37,
        23,
        png::ColorType::GrayscaleAlpha,
        png::BitDepth::Eight,
        None
    );
    assert_eq!(decode_pngrow::<LumaA8>(&png).as_bytes(), decode_ref(&png));

    let rgb = common::noise(3, width * height * 3);
    let png = encode_ref(&rgb, 37, 23, png::ColorType::Rgb, png::BitDepth::Eight, None);
    assert_eq!(decode_pngrow::<Rgb8>(&png).as_bytes(), decode_ref(&png));

    let rgba = common::noise(4, width * height * 4);
    let png = encode_ref(&rgba, 37, 23, png::ColorType::Rgba, png::BitDepth::Eight, None);
    assert_eq!(decode_pngrow::<Rgba8>(&png).as_bytes(), decode_ref(&png));
}

#[test]
fn matches_reference_sixteen_bit() {
    let rgb = common::noise(5, 19 * 11 * 6);
    let png = encode_ref(&rgb, 19, 11, png::ColorType::Rgb, png::BitDepth::Sixteen, None);

    let ours: Vec<u8> = decode_pngrow::<Rgb16>(&png)
        .pixels()
        .iter()
        .flat_map(|px| [px.r, px.g, px.b])
        .flat_map(u16::to_be_bytes)
        .collect();

    assert_eq!(ours, decode_ref(&png));
}

#[test]
fn matches_reference_palette() {
    let palette: Vec<u8> = (0..=255_u8).flat_map(|i| [i, 255 - i, i / 2]).collect();
    let indices = common::noise(6, 40 * 9);

    let png = encode_ref(
        &indices,
        40,
        9,
        png::ColorType::Indexed,
        png::BitDepth::Eight,
        Some(palette)
    );
    assert_eq!(decode_pngrow::<Rgb8>(&png).as_bytes(), decode_ref(&png));
}

#[test]
fn every_filter_type_decodes() {
    let (width, height) = (13, 6);
    let pixels = common::noise(7, width * height * 3);

    for filter in FilterType::ALL {
        let rows = common::filter_rows(&pixels, width * 3, 3, filter);
        let png = common::png(&[
            common::ihdr(13, 6, 8, 2, 0),
            common::idat(&rows, 1),
            common::iend()
        ]);
        assert_eq!(decode_pngrow::<Rgb8>(&png).as_bytes(), pixels, "{filter:?}");
    }
}

#[test]
fn tiny_gray_plain_and_interlaced_agree() {
    let pixels = [10_u8, 20, 30, 40];

    let plain = common::png(&[
        common::ihdr(2, 2, 8, 0, 0),
        common::idat(&common::filter_rows(&pixels, 2, 1, FilterType::None), 1),
        common::iend()
    ]);
    let interlaced = common::png(&[
        common::ihdr(2, 2, 8, 0, 1),
        common::idat(
            &common::adam7_rows(&pixels, 2, 2, 1, FilterType::Paeth),
            1
        ),
        common::iend()
    ]);
    let expected = [Luma8(10), Luma8(20), Luma8(30), Luma8(40)];

    assert_eq!(decode_pngrow::<Luma8>(&plain).pixels(), &expected);
    assert_eq!(decode_pngrow::<Luma8>(&interlaced).pixels(), &expected);
}

#[test]
fn interlaced_images_of_awkward_sizes() {
    for (width, height) in [(1, 1), (3, 1), (1, 9), (5, 5), (8, 8), (17, 13)] {
        let pixels = common::noise((width * 31 + height) as u64, width * height * 4);

        for filter in [FilterType::Sub, FilterType::Average, FilterType::Paeth] {
            let png = common::png(&[
                common::ihdr(width as u32, height as u32, 8, 6, 1),
                common::idat(&common::adam7_rows(&pixels, width, height, 4, filter), 2),
                common::iend()
            ]);
            let decoded = decode_pngrow::<Rgba8>(&png);

            assert_eq!(
                decoded.as_bytes(),
                pixels,
                "{width}x{height} with {filter:?}"
            );
        }
    }
}

#[test]
fn sixteen_bit_gray_interlaced() {
    let (width, height) = (9, 7);
    let pixels = common::noise(8, width * height * 2);

    let png = common::png(&[
        common::ihdr(9, 7, 16, 0, 1),
        common::idat(
            &common::adam7_rows(&pixels, width, height, 2, FilterType::Up),
            1
        ),
        common::iend()
    ]);
    let decoded = decode_pngrow::<Luma16>(&png);
    let expected: Vec<Luma16> = pixels
        .chunks_exact(2)
        .map(|v| Luma16(u16::from_be_bytes([v[0], v[1]])))
        .collect();

    assert_eq!(decoded.pixels(), expected.as_slice());
}

#[test]
fn low_bit_gray_is_scaled() {
    // 1 bit, width 10, two bytes per row
    let rows = [0, 0b1010_1010, 0b1100_0000, 0, 0b0101_0101, 0b0011_1111];
    let png = common::png(&[
        common::ihdr(10, 2, 1, 0, 0),
        common::idat(&rows, 1),
        common::iend()
    ]);
    let decoded = decode_pngrow::<Luma8>(&png);
    let values: Vec<u8> = decoded.pixels().iter().map(|px| px.0).collect();

    assert_eq!(
        values,
        [
            255, 0, 255, 0, 255, 0, 255, 0, 255, 255, //
            0, 255, 0, 255, 0, 255, 0, 255, 0, 0
        ]
    );

    let raw = PngDecoder::new_with_options(
        Cursor::new(&png),
        DecoderOptions::default().png_set_scale_low_bit_depths(false)
    )
    .decode::<Luma8>()
    .unwrap();
    assert_eq!(raw.pixels()[0], Luma8(1));
}

#[test]
fn low_bit_palette() {
    // 2 bit indices, width 3
    let palette = [255, 0, 0, 0, 255, 0, 0, 0, 255, 9, 9, 9];
    let png = common::png(&[
        common::ihdr(3, 1, 2, 3, 0),
        common::chunk(*b"PLTE", &palette),
        common::idat(&[0, 0b0001_1000], 1),
        common::iend()
    ]);
    let decoded = decode_pngrow::<Rgb8>(&png);

    assert_eq!(
        decoded.pixels(),
        &[
            Rgb8 { r: 255, g: 0, b: 0 },
            Rgb8 { r: 0, g: 255, b: 0 },
            Rgb8 { r: 0, g: 0, b: 255 }
        ]
    );
}

#[test]
fn low_bit_gray_interlaced() {
    for depth in [1_u8, 2, 4] {
        let max = (1_u8 << depth) - 1;

        for (width, height) in [(1, 1), (11, 9), (3, 17), (13, 5)] {
            let samples: Vec<u8> = common::noise(u64::from(depth) * 100 + width as u64, width * height)
                .iter()
                .map(|v| v & max)
                .collect();

            for filter in [FilterType::None, FilterType::Sub] {
                let png = common::png(&[
                    common::ihdr(width as u32, height as u32, depth, 0, 1),
                    common::idat(
                        &common::adam7_packed(&samples, width, height, depth, filter),
                        2
                    ),
                    common::iend()
                ]);

                let scaled: Vec<u8> = decode_pngrow::<Luma8>(&png)
                    .pixels()
                    .iter()
                    .map(|px| px.0)
                    .collect();
                let expected: Vec<u8> = samples.iter().map(|v| v * (255 / max)).collect();
                assert_eq!(scaled, expected, "{depth} bit {width}x{height} {filter:?}");

                let raw = PngDecoder::new_with_options(
                    Cursor::new(&png),
                    DecoderOptions::default().png_set_scale_low_bit_depths(false)
                )
                .decode::<Luma8>()
                .unwrap();
                let raw: Vec<u8> = raw.pixels().iter().map(|px| px.0).collect();
                assert_eq!(raw, samples, "{depth} bit {width}x{height} {filter:?} unscaled");
            }
        }
    }
}

#[test]
fn low_bit_palette_interlaced() {
    for depth in [1_u8, 2, 4] {
        let entries = 1_usize << depth;
        let palette = common::noise(u64::from(depth), entries * 3);

        for (width, height) in [(11, 9), (13, 5)] {
            let indices: Vec<u8> = common::noise(width as u64 + u64::from(depth), width * height)
                .iter()
                .map(|v| v % entries as u8)
                .collect();

            let png = common::png(&[
                common::ihdr(width as u32, height as u32, depth, 3, 1),
                common::chunk(*b"PLTE", &palette),
                common::idat(
                    &common::adam7_packed(&indices, width, height, depth, FilterType::Sub),
                    1
                ),
                common::iend()
            ]);
            let expected: Vec<u8> = indices
                .iter()
                .flat_map(|&i| palette[usize::from(i) * 3..usize::from(i) * 3 + 3].to_vec())
                .collect();

            assert_eq!(
                decode_pngrow::<Rgb8>(&png).as_bytes(),
                expected,
                "{depth} bit {width}x{height}"
            );
        }
    }
}

#[test]
fn gray_into_rgba_buffer() {
    let png = common::png(&[
        common::ihdr(2, 1, 8, 4, 0),
        common::idat(&[0, 100, 50, 200, 0], 1),
        common::iend()
    ]);
    let decoded = decode_pngrow::<Rgba8>(&png);

    assert_eq!(
        decoded.pixels(),
        &[
            Rgba8 { r: 100, g: 100, b: 100, a: 50 },
            Rgba8 { r: 200, g: 200, b: 200, a: 0 }
        ]
    );
}

#[test]
fn image_data_split_over_many_chunks() {
    let (width, height) = (31, 17);
    let pixels = common::noise(9, width * height * 3);
    let rows = common::filter_rows(&pixels, width * 3, 3, FilterType::Paeth);

    let mut compressed = common::zlib(&rows);
    let mut parts = vec![common::ihdr(31, 17, 8, 2, 0)];
    // empty chunks between real ones must be skipped
    parts.push(common::chunk(*b"IDAT", &[]));
    while !compressed.is_empty() {
        let rest = compressed.split_off(compressed.len().min(7));
        parts.push(common::chunk(*b"IDAT", &compressed));
        parts.push(common::chunk(*b"IDAT", &[]));
        compressed = rest;
    }
    parts.push(common::chunk(*b"tEXt", b"Comment\0split"));
    parts.push(common::iend());

    let png = common::png(&parts);

    assert_eq!(decode_pngrow::<Rgb8>(&png).as_bytes(), pixels);
}

#[test]
fn ancillary_chunks_are_skipped() {
    let png = common::png(&[
        common::ihdr(1, 1, 8, 0, 0),
        common::chunk(*b"gAMA", &45455_u32.to_be_bytes()),
        common::chunk(*b"zzZz", b"private"),
        common::idat(&[0, 77], 1),
        common::chunk(*b"tIME", &[7, 231, 1, 1, 0, 0, 0]),
        common::iend()
    ]);
    assert_eq!(decode_pngrow::<Luma8>(&png).pixels(), &[Luma8(77)]);
}

#[test]
fn large_ancillary_chunk_is_skipped() {
    // text spanning several crc blocks
    let text: Vec<u8> = (0..10_000).map(|i| b'a' + (i % 26) as u8).collect();
    let png = common::png(&[
        common::ihdr(2, 1, 8, 0, 0),
        common::chunk(*b"tEXt", &text),
        common::idat(&[0, 12, 34], 1),
        common::chunk(*b"zTXt", &text),
        common::iend()
    ]);
    let mut decoder = PngDecoder::new(Cursor::new(png));
    let decoded = decoder.decode::<Luma8>().unwrap();

    assert_eq!(decoded.pixels(), &[Luma8(12), Luma8(34)]);
    assert_eq!(decoder.buffer_pool().outstanding(), 0);
}

#[test]
fn headers_first_then_into_larger_buffer() {
    let png = common::png(&[
        common::ihdr(2, 1, 8, 0, 0),
        common::idat(&[0, 1, 2], 1),
        common::iend()
    ]);
    let mut decoder = PngDecoder::new(Cursor::new(png));
    assert_eq!(decoder.state(), DecodeState::AwaitHeader);

    decoder.decode_headers().unwrap();
    assert_eq!(decoder.state(), DecodeState::StreamingRows);
    assert_eq!(decoder.dimensions(), Some((2, 1)));
    assert_eq!(decoder.depth(), Some(pngrow_core::bit_depth::BitDepth::Eight));
    assert_eq!(
        decoder.colorspace(),
        Some(pngrow_core::colorspace::ColorSpace::Luma)
    );

    let mut out = PixelBuffer::<Luma8>::new(3, 2);
    decoder.decode_into(&mut out).unwrap();

    assert_eq!(decoder.state(), DecodeState::Done);
    assert_eq!(out.row(0), &[Luma8(1), Luma8(2), Luma8(0)]);
    assert_eq!(out.row(1), &[Luma8(0); 3]);
    assert_eq!(decoder.buffer_pool().outstanding(), 0);
}

#[test]
fn trailing_bytes_after_iend_are_ignored() {
    let mut png = common::png(&[
        common::ihdr(1, 1, 8, 0, 0),
        common::idat(&[0, 5], 1),
        common::iend()
    ]);
    png.extend_from_slice(b"garbage");

    assert_eq!(decode_pngrow::<Luma8>(&png).pixels(), &[Luma8(5)]);
}

#[test]
fn missing_iend_is_tolerated() {
    let png = common::png(&[common::ihdr(1, 1, 8, 2, 0), common::idat(&[0, 1, 2, 3], 1)]);

    assert_eq!(
        decode_pngrow::<Rgb8>(&png).pixels(),
        &[Rgb8 { r: 1, g: 2, b: 3 }]
    );
}
