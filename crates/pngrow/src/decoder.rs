/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::io::{ErrorKind, Read, Seek};

use flate2::read::ZlibDecoder;
use log::{trace, warn};
use pngrow_core::bit_depth::BitDepth;
use pngrow_core::buffer::PixelBuffer;
use pngrow_core::colorspace::ColorSpace;
use pngrow_core::options::DecoderOptions;
use pngrow_core::pixel::Pixel;
use pngrow_core::pool::{BufferPool, PooledBuffer};

use crate::adam7;
use crate::bridge::IdatReader;
use crate::chunk::{Chunk, ChunkReader};
use crate::enums::{ChunkType, FilterType, InterlaceMethod, PngColor};
use crate::error::PngDecodeErrors;
use crate::filters::FilterKernels;
use crate::headers::{parse_ihdr, ImageMeta, PngHeader};
use crate::projector::{RowLayout, ScanlineProjector};

/// Where a decoder is in the stream
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DecodeState {
    /// Nothing read yet, IHDR comes next
    AwaitHeader,
    /// IHDR seen, walking chunks up to the first IDAT
    AwaitFirstIdat,
    /// Positioned at the image data
    StreamingRows,
    /// Image decoded or decoding failed
    Done
}

/// The current and previous scanline
///
/// Two pooled buffers and a flag saying which one is current,
/// swapping flips the flag.
pub(crate) struct ScanlineBuffers<'p> {
    buffers: [PooledBuffer<'p>; 2],
    current: usize
}

impl<'p> ScanlineBuffers<'p> {
    /// Two zeroed buffers of `len` bytes
    pub fn new(pool: &'p BufferPool, len: usize) -> ScanlineBuffers<'p> {
        ScanlineBuffers {
            buffers: [pool.acquire(len), pool.acquire(len)],
            current: 0
        }
    }

    /// The first `len` bytes of the current and previous buffers
    pub fn split(&mut self, len: usize) -> (&mut [u8], &[u8]) {
        let [first, second] = &mut self.buffers;

        let (current, previous) = if self.current == 0 {
            (first, second)
        } else {
            (second, first)
        };
        (&mut current[..len], &previous[..len])
    }

    pub fn swap(&mut self) {
        self.current ^= 1;
    }

    /// Forget the previous row, as at the start of an interlace pass
    pub fn clear_previous(&mut self) {
        self.buffers[self.current ^ 1].fill(0);
    }
}

/// A png decoder
///
/// Reads a png stream from any seekable source and writes its
/// pixels into a caller provided [`PixelBuffer`], one scanline at
/// a time, without holding the whole compressed or filtered image.
///
/// # Example
/// ```no_run
/// use std::io::Cursor;
///
/// use pngrow::PngDecoder;
/// use pngrow_core::pixel::Rgba8;
///
/// let data = std::fs::read("image.png").unwrap();
/// let mut decoder = PngDecoder::new(Cursor::new(data));
///
/// let pixels = decoder.decode::<Rgba8>().unwrap();
/// println!("{}x{}", pixels.width(), pixels.height());
/// ```
pub struct PngDecoder<R: Read + Seek> {
    source:     Option<R>,
    chunks:     Option<ChunkReader<R>>,
    options:    DecoderOptions,
    meta:       ImageMeta,
    state:      DecodeState,
    /// Length of the first IDAT chunk, the stream points at its data
    first_idat: u32,
    pool:       BufferPool
}

impl<R: Read + Seek> PngDecoder<R> {
    pub fn new(source: R) -> PngDecoder<R> {
        PngDecoder::new_with_options(source, DecoderOptions::default())
    }

    pub fn new_with_options(source: R, options: DecoderOptions) -> PngDecoder<R> {
        PngDecoder {
            source: Some(source),
            chunks: None,
            options,
            meta: ImageMeta::default(),
            state: DecodeState::AwaitHeader,
            first_idat: 0,
            pool: BufferPool::new()
        }
    }

    pub const fn state(&self) -> DecodeState {
        self.state
    }

    pub const fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// The pool scratch buffers are taken from
    pub const fn buffer_pool(&self) -> &BufferPool {
        &self.pool
    }

    /// Header of the image, `None` before headers are decoded
    pub const fn header(&self) -> Option<PngHeader> {
        self.meta.header
    }

    /// Image width and height
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.meta.header.map(|h| (h.width, h.height))
    }

    /// Colorspace of decoded pixels, palette images report RGB
    pub fn colorspace(&self) -> Option<ColorSpace> {
        self.meta.header.map(|h| h.color.colorspace())
    }

    /// Depth of decoded samples, anything up to 8 bits reports eight
    pub fn depth(&self) -> Option<BitDepth> {
        self.meta.header.map(|h| h.bit_depth())
    }

    /// The palette entries if a PLTE chunk was seen
    pub fn palette(&self) -> &[[u8; 3]] {
        &self.meta.palette
    }

    /// Decode everything up to the first IDAT chunk
    ///
    /// After this, image information is available and the
    /// output buffer can be sized. Calling it again does nothing.
    pub fn decode_headers(&mut self) -> Result<(), PngDecodeErrors> {
        match self.state {
            DecodeState::AwaitHeader | DecodeState::AwaitFirstIdat => {}
            DecodeState::StreamingRows => return Ok(()),
            DecodeState::Done => {
                return Err(PngDecodeErrors::from(
                    "Decoder already finished, create a new one"
                ))
            }
        }
        let result = self.walk_headers();

        if result.is_err() {
            self.state = DecodeState::Done;
        }
        result
    }

    /// Decode the image into a new buffer
    pub fn decode<T: Pixel>(&mut self) -> Result<PixelBuffer<T>, PngDecodeErrors> {
        self.decode_headers()?;

        let (width, height) = self
            .dimensions()
            .ok_or(PngDecodeErrors::from("No IHDR chunk"))?;

        let mut buffer = PixelBuffer::new(width, height);
        self.decode_into(&mut buffer)?;

        Ok(buffer)
    }

    /// Decode the image into `out`
    ///
    /// `out` must be at least as wide and as tall as the image,
    /// extra rows and columns are left untouched.
    pub fn decode_into<T: Pixel>(&mut self, out: &mut PixelBuffer<T>) -> Result<(), PngDecodeErrors> {
        self.decode_headers()?;

        let header = self
            .meta
            .header
            .ok_or(PngDecodeErrors::from("No IHDR chunk"))?;

        if out.width() < header.width || out.height() < header.height {
            return Err(PngDecodeErrors::TooSmallOutput(
                header.width * header.height,
                out.width() * out.height()
            ));
        }
        // the pool lives outside self while buffers borrow from it
        let pool = core::mem::take(&mut self.pool);
        let result = self.decode_inner(&pool, header, out);
        self.pool = pool;

        self.state = DecodeState::Done;
        result
    }

    fn open(&mut self) -> Result<(), PngDecodeErrors> {
        if self.chunks.is_none() {
            let source = self
                .source
                .take()
                .ok_or(PngDecodeErrors::from("No source to read from"))?;

            let mut chunks = ChunkReader::new(source, self.options.png_get_confirm_crc())?;
            chunks.read_signature()?;

            self.chunks = Some(chunks);
        }
        Ok(())
    }

    fn walk_headers(&mut self) -> Result<(), PngDecodeErrors> {
        self.open()?;

        let PngDecoder {
            chunks: Some(chunks),
            meta,
            options,
            state,
            first_idat,
            pool,
            ..
        } = self
        else {
            return Err(PngDecodeErrors::from("No source to read from"));
        };

        loop {
            if !chunks.has_chunk_header()? {
                return Err(end_of_headers(meta));
            }
            let chunk = chunks.read_chunk(pool)?;

            if meta.header.is_none() && chunk.chunk_type != ChunkType::IHDR {
                return Err(PngDecodeErrors::HeaderError(format!(
                    "First chunk not IHDR but {}, corrupt PNG",
                    chunk.chunk_type.name()
                )));
            }
            match chunk.chunk_type {
                ChunkType::IHDR => {
                    if meta.header.is_some() {
                        return Err(PngDecodeErrors::from("Multiple IHDR, corrupt PNG"));
                    }
                    let header = parse_ihdr(whole_data(&chunk)?, options)?;
                    meta.set_header(header);
                    *state = DecodeState::AwaitFirstIdat;
                }
                ChunkType::PLTE => {
                    if !meta.palette.is_empty() {
                        return Err(PngDecodeErrors::from("Multiple PLTE chunks"));
                    }
                    meta.set_palette(whole_data(&chunk)?)?;
                }
                ChunkType::IDAT => {
                    let is_palette = meta.header.map(|h| h.color) == Some(PngColor::Palette);

                    if is_palette && meta.palette.is_empty() {
                        return Err(PngDecodeErrors::MissingPalette);
                    }
                    *first_idat = chunk.length;
                    *state = DecodeState::StreamingRows;
                    return Ok(());
                }
                ChunkType::IEND => return Err(end_of_headers(meta)),
                _ => skip_ancillary(&chunk)?
            }
        }
    }

    fn decode_inner<T: Pixel>(
        &mut self, pool: &BufferPool, header: PngHeader, out: &mut PixelBuffer<T>
    ) -> Result<(), PngDecodeErrors> {
        let PngDecoder {
            chunks: Some(chunks),
            meta,
            options,
            first_idat,
            ..
        } = self
        else {
            return Err(PngDecodeErrors::from("No source to read from"));
        };

        let kernels = FilterKernels::new(options);
        let mut projector = ScanlineProjector::new(
            header,
            &meta.palette,
            options.png_get_palette_policy(),
            options.png_get_scale_low_bit_depths()
        );
        let mut lines = ScanlineBuffers::new(pool, meta.bytes_per_scanline);
        // unpacked samples for depths below 8
        let mut scratch = pool.acquire(if header.depth < 8 { header.width } else { 0 });

        trace!("Vector de-filter kernels: {}", kernels.uses_simd());

        let mut inflater = ZlibDecoder::new(IdatReader::new(chunks, pool, *first_idat));

        let rows = RowDecoder {
            header,
            bytes_per_pixel: meta.bytes_per_pixel,
            kernels
        };
        let result = match header.interlace {
            InterlaceMethod::Standard => {
                rows.decode_standard(&mut inflater, &mut lines, &mut projector, &mut scratch, out)
            }
            InterlaceMethod::Adam7 => {
                rows.decode_adam7(&mut inflater, &mut lines, &mut projector, &mut scratch, out)
            }
        };
        if let Err(err) = result {
            // errors from walking IDAT chunks are more specific than what inflate reports
            let mut bridge = inflater.into_inner();
            return Err(bridge.take_error().unwrap_or(err));
        }

        let mut rest = [0_u8; 1];
        let tail = inflater.read(&mut rest);
        let mut bridge = inflater.into_inner();

        // chunk errors past the last scanline are fatal, inflate ones are not
        if let Some(err) = bridge.take_error() {
            return Err(err);
        }
        match tail {
            Ok(0) => {}
            Ok(_) => warn!("Extra data after the last scanline, ignoring"),
            Err(err) => warn!("Error after the last scanline, ignoring: {err}")
        }
        bridge.drain()?;
        let pending = bridge.take_pending();
        drop(bridge);

        finish_chunks(chunks, pool, pending)
    }
}

/// Error for a stream that ends (IEND or EOF) before its image data
fn end_of_headers(meta: &ImageMeta) -> PngDecodeErrors {
    if meta.header.is_none() {
        PngDecodeErrors::from("No IHDR chunk")
    } else {
        PngDecodeErrors::NoData
    }
}

/// Payload of an IHDR or PLTE chunk, which the chunk reader only keeps
/// when its length could be valid
fn whole_data<'c>(chunk: &'c Chunk) -> Result<&'c [u8], PngDecodeErrors> {
    if chunk.data.len() != chunk.length as usize {
        return Err(PngDecodeErrors::HeaderError(format!(
            "{} chunk of {} bytes is too large",
            chunk.chunk_type.name(),
            chunk.length
        )));
    }
    Ok(&chunk.data)
}

/// Chunks the decoder does not interpret, an error for unknown critical ones
fn skip_ancillary(chunk: &Chunk) -> Result<(), PngDecodeErrors> {
    let name = chunk.chunk_type.name();

    if chunk.chunk_type.is_critical() {
        return Err(PngDecodeErrors::UnsupportedFormat(format!(
            "Marker {name} unknown but deemed necessary"
        )));
    }
    trace!("Skipping chunk {}, {} bytes", name, chunk.length);

    Ok(())
}

/// Walk whatever follows the image data up to IEND
fn finish_chunks<R: Read + Seek>(
    chunks: &mut ChunkReader<R>, pool: &BufferPool, mut pending: Option<Chunk>
) -> Result<(), PngDecodeErrors> {
    loop {
        let chunk = match pending.take() {
            Some(chunk) => chunk,
            None => {
                if !chunks.has_chunk_header()? {
                    trace!("Stream ended without IEND");
                    return Ok(());
                }
                chunks.read_chunk(pool)?
            }
        };
        match chunk.chunk_type {
            ChunkType::IEND => {
                let trailing = chunks.remaining()?;

                if trailing > 0 {
                    warn!("{} bytes of trailing data after IEND", trailing);
                }
                return Ok(());
            }
            ChunkType::IDAT => {
                warn!("IDAT chunk after the image data, ignoring");
                chunks.skip(chunk.length as usize + 4)?;
            }
            ChunkType::PLTE => return Err(PngDecodeErrors::from("PLTE chunk after IDAT")),
            ChunkType::IHDR => return Err(PngDecodeErrors::from("Multiple IHDR, corrupt PNG")),
            _ => skip_ancillary(&chunk)?
        }
    }
}

/// Read exactly `buf.len()` bytes of inflated data
fn read_scanline<D: Read>(inflater: &mut D, buf: &mut [u8]) -> Result<(), PngDecodeErrors> {
    let mut filled = 0;

    while filled < buf.len() {
        match inflater.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(PngDecodeErrors::TruncatedStream {
                    expected: buf.len(),
                    found:    filled
                })
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => {}
            // the deflate stream stopped short of its end block
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                return Err(PngDecodeErrors::TruncatedStream {
                    expected: buf.len(),
                    found:    filled
                })
            }
            Err(err) => return Err(PngDecodeErrors::InflateError(err))
        }
    }
    Ok(())
}

/// Per row work shared by plain and interlaced images
struct RowDecoder {
    header:          PngHeader,
    bytes_per_pixel: usize,
    kernels:         FilterKernels
}

impl RowDecoder {
    /// Pull one scanline of `layout.columns` pixels, undo its filter
    /// and write it to `row`
    fn decode_row<D: Read, T: Pixel>(
        &self, inflater: &mut D, lines: &mut ScanlineBuffers, projector: &mut ScanlineProjector,
        scratch: &mut [u8], row: &mut [T], layout: RowLayout
    ) -> Result<(), PngDecodeErrors> {
        let len = self.header.scanline_bytes(layout.columns);
        let (current, previous) = lines.split(len);

        read_scanline(inflater, current)?;

        let filter = FilterType::from_u8(current[0]).ok_or_else(|| {
            PngDecodeErrors::UnsupportedFormat(format!("Unknown filter type {}", current[0]))
        })?;

        self.kernels
            .decode(filter, &mut current[1..], &previous[1..], self.bytes_per_pixel);

        projector.project(&current[1..], row, layout, scratch)?;
        lines.swap();

        Ok(())
    }

    fn decode_standard<D: Read, T: Pixel>(
        &self, inflater: &mut D, lines: &mut ScanlineBuffers, projector: &mut ScanlineProjector,
        scratch: &mut [u8], out: &mut PixelBuffer<T>
    ) -> Result<(), PngDecodeErrors> {
        let layout = RowLayout::full(self.header.width);

        for y in 0..self.header.height {
            self.decode_row(inflater, lines, projector, scratch, out.row_mut(y), layout)?;
        }
        Ok(())
    }

    fn decode_adam7<D: Read, T: Pixel>(
        &self, inflater: &mut D, lines: &mut ScanlineBuffers, projector: &mut ScanlineProjector,
        scratch: &mut [u8], out: &mut PixelBuffer<T>
    ) -> Result<(), PngDecodeErrors> {
        let (width, height) = (self.header.width, self.header.height);

        for pass in 0..adam7::PASSES {
            if adam7::is_empty(pass, width, height) {
                trace!("Adam7 pass {} is empty", pass);
                continue;
            }
            let layout = RowLayout {
                columns:          adam7::columns(pass, width),
                pixel_offset:     adam7::FIRST_COLUMN[pass],
                column_increment: adam7::COLUMN_INCREMENT[pass]
            };
            lines.clear_previous();

            for y in (adam7::FIRST_ROW[pass]..height).step_by(adam7::ROW_INCREMENT[pass]) {
                self.decode_row(inflater, lines, projector, scratch, out.row_mut(y), layout)?;
            }
        }
        Ok(())
    }
}
