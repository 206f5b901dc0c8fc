/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Presents the payloads of consecutive IDAT chunks as one byte stream
//!
//! The zlib stream of an image may be split over any number of IDAT
//! chunks. [`IdatReader`] walks those chunks as the inflate decoder asks
//! for input, so the decoder never sees chunk framing and the image data
//! is never gathered in one buffer.
use std::io::{Read, Seek};

use log::trace;
use pngrow_core::pool::BufferPool;

use crate::chunk::{Chunk, ChunkReader};
use crate::enums::ChunkType;
use crate::error::PngDecodeErrors;

pub struct IdatReader<'a, 'p, R: Read + Seek> {
    chunks:    &'a mut ChunkReader<R>,
    pool:      &'p BufferPool,
    /// Bytes left in the current IDAT segment
    remaining: u32,
    /// No more IDAT segments follow
    finished:  bool,
    segments:  usize,
    /// First chunk after the image data, kept for the pipeline
    pending:   Option<Chunk<'p>>,
    error:     Option<PngDecodeErrors>
}

impl<'a, 'p, R: Read + Seek> IdatReader<'a, 'p, R> {
    /// Start reading, `chunks` must point at the data of an IDAT chunk
    /// `first_length` bytes long. Chunk data read on the way is borrowed
    /// from `pool`
    pub fn new(
        chunks: &'a mut ChunkReader<R>, pool: &'p BufferPool, first_length: u32
    ) -> IdatReader<'a, 'p, R> {
        trace!("IDAT segment 0, {} bytes", first_length);

        IdatReader {
            chunks,
            pool,
            remaining: first_length,
            finished: false,
            segments: 1,
            pending: None,
            error: None
        }
    }

    /// Called once the current segment is exhausted
    ///
    /// Skips the crc of the finished segment and reads the next chunk
    /// header. Returns the length of the next IDAT segment, or zero when
    /// a different chunk (stored for [`take_pending`](Self::take_pending))
    /// or the end of the stream is reached. Empty IDAT chunks are skipped.
    pub fn next_chunk_len(&mut self) -> Result<u32, PngDecodeErrors> {
        if self.finished {
            return Ok(0);
        }
        loop {
            // crc of the segment we just finished
            self.chunks.skip(4)?;

            if !self.chunks.has_chunk_header()? {
                trace!("Stream ended after {} IDAT segments", self.segments);
                self.finished = true;
                return Ok(0);
            }
            let chunk = self.chunks.read_chunk(self.pool)?;

            if chunk.chunk_type != ChunkType::IDAT {
                trace!(
                    "IDAT run ended by {} after {} segments",
                    chunk.chunk_type.name(),
                    self.segments
                );
                self.pending = Some(chunk);
                self.finished = true;
                return Ok(0);
            }
            if chunk.length == 0 {
                trace!("Skipping empty IDAT");
                continue;
            }
            trace!("IDAT segment {}, {} bytes", self.segments, chunk.length);

            self.segments += 1;
            return Ok(chunk.length);
        }
    }

    /// Move past any IDAT data not yet consumed, leaving the stream after
    /// the image data, with the chunk that ended it stored
    pub fn drain(&mut self) -> Result<(), PngDecodeErrors> {
        while !self.finished {
            self.chunks.skip(self.remaining as usize)?;
            self.remaining = 0;
            self.remaining = self.next_chunk_len()?;
        }
        Ok(())
    }

    /// The chunk that followed the last IDAT, if any
    pub fn take_pending(&mut self) -> Option<Chunk<'p>> {
        self.pending.take()
    }

    /// The error behind a failed `read`, if chunk handling caused it
    pub fn take_error(&mut self) -> Option<PngDecodeErrors> {
        self.error.take()
    }

    pub const fn segments(&self) -> usize {
        self.segments
    }
}

impl<R: Read + Seek> Read for IdatReader<'_, '_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.remaining == 0 {
            if self.finished {
                return Ok(0);
            }
            match self.next_chunk_len() {
                Ok(length) => self.remaining = length,
                Err(err) => {
                    let message = format!("{err:?}");
                    self.error = Some(err);
                    return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, message));
                }
            }
        }
        let max = buf.len().min(self.remaining as usize);

        let read = self
            .chunks
            .read_raw(&mut buf[..max])
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, format!("{err:?}")))?;

        if read == 0 {
            // source ended inside an IDAT chunk
            self.finished = true;
            self.remaining = 0;
        }
        self.remaining -= read as u32;

        Ok(read)
    }
}
