/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A simple implementation of a bytestream reader
//!
//! The reader wraps anything that is `Read + Seek` and keeps
//! track of how many bytes the underlying source holds, so callers
//! can clip requests to what is actually present.
pub use reader::{ByteIoError, ByteReader};

mod reader;
