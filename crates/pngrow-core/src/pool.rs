/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Scratch buffer pool
//!
//! Decoders borrow byte buffers from a [`BufferPool`] as [`PooledBuffer`]
//! guards. A guard hands its allocation back to the pool when it is
//! dropped, so buffers come back on every exit path, including early
//! returns through `?`.
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::ops::{Deref, DerefMut};

/// Number of idle allocations a pool keeps around
const MAX_IDLE_BUFFERS: usize = 8;

/// A single threaded pool of byte buffers
#[derive(Default)]
pub struct BufferPool {
    idle:        RefCell<Vec<Vec<u8>>>,
    outstanding: Cell<usize>
}

impl BufferPool {
    pub fn new() -> BufferPool {
        BufferPool::default()
    }

    /// Borrow a buffer of exactly `len` zeroed bytes
    pub fn acquire(&self, len: usize) -> PooledBuffer<'_> {
        let mut buf = if len == 0 {
            Vec::new()
        } else {
            let mut idle = self.idle.borrow_mut();
            // prefer an allocation that is already large enough
            match idle.iter().position(|b| b.capacity() >= len) {
                Some(pos) => idle.swap_remove(pos),
                None => idle.pop().unwrap_or_default()
            }
        };
        buf.clear();
        buf.resize(len, 0);

        self.outstanding.set(self.outstanding.get() + 1);

        PooledBuffer { buf, pool: self }
    }

    /// Number of buffers currently lent out
    pub fn outstanding(&self) -> usize {
        self.outstanding.get()
    }

    /// Number of idle buffers waiting to be reused
    pub fn idle(&self) -> usize {
        self.idle.borrow().len()
    }

    fn release(&self, buf: Vec<u8>) {
        self.outstanding.set(self.outstanding.get().saturating_sub(1));

        let mut idle = self.idle.borrow_mut();
        if idle.len() < MAX_IDLE_BUFFERS && buf.capacity() > 0 {
            idle.push(buf);
        }
    }
}

/// A buffer borrowed from a [`BufferPool`], returned on drop
pub struct PooledBuffer<'a> {
    buf:  Vec<u8>,
    pool: &'a BufferPool
}

impl Deref for PooledBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl fmt::Debug for PooledBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("len", &self.buf.len())
            .finish()
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(core::mem::take(&mut self.buf));
    }
}
