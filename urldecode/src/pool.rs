//! Reusable working buffers for decoding.
//!
//! Each decode checks out one set of buffers and has it to itself until it
//! is done. Buffers are cleared when checked out and when returned, and at
//! most `max_idle` of them are kept around.

use core::fmt;
use core::mem::ManuallyDrop;
use core::ops::{Deref, DerefMut};
use std::sync::LazyLock;

use parking_lot::Mutex;

use crate::SCRATCH_LEN;

/// The transient state of one decode.
pub struct DecoderBuffers {
    /// the raw query, when it is read from a stream
    pub read: Vec<u8>,
    /// the unescaped query, which tokens borrow from
    pub query: Vec<u8>,
    /// relay for the unescaper
    pub scratch: [u8; SCRATCH_LEN],
}

impl DecoderBuffers {
    /// Creates empty buffers.
    pub fn new() -> Self {
        Self {
            read: Vec::new(),
            query: Vec::new(),
            scratch: [0; SCRATCH_LEN],
        }
    }

    /// Forgets everything the buffers hold, keeping their capacity.
    pub fn clear(&mut self) {
        self.read.clear();
        self.query.clear();
        self.scratch.fill(0);
    }

    /// Returns true if no bytes are held.
    pub fn is_empty(&self) -> bool {
        self.read.is_empty() && self.query.is_empty() && self.scratch.iter().all(|&b| b == 0)
    }
}

impl Default for DecoderBuffers {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DecoderBuffers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderBuffers")
            .field("read", &self.read.len())
            .field("query", &self.query.len())
            .finish_non_exhaustive()
    }
}

/// A bounded free list of [`DecoderBuffers`].
#[derive(Debug)]
pub struct DecoderPool {
    idle: Mutex<Vec<Box<DecoderBuffers>>>,
    max_idle: usize,
}

static GLOBAL: LazyLock<DecoderPool> = LazyLock::new(DecoderPool::new);

impl DecoderPool {
    /// How many idle buffer sets a pool keeps unless told otherwise.
    pub const DEFAULT_MAX_IDLE: usize = 32;

    /// Creates an empty pool keeping up to [`Self::DEFAULT_MAX_IDLE`] buffer sets.
    pub fn new() -> Self {
        Self::with_max_idle(Self::DEFAULT_MAX_IDLE)
    }

    /// Creates an empty pool keeping up to `max_idle` buffer sets.
    pub fn with_max_idle(max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            max_idle,
        }
    }

    /// The process-wide pool, used unless a decoder is given its own.
    pub fn global() -> &'static DecoderPool {
        &GLOBAL
    }

    /// Checks out a set of empty buffers. They return to the pool when the
    /// guard is dropped.
    pub fn get(&self) -> PooledBuffers<'_> {
        let recycled = self.idle.lock().pop();
        let buffers = match recycled {
            Some(mut buffers) => {
                buffers.clear();
                buffers
            }
            None => Box::default(),
        };
        PooledBuffers {
            pool: self,
            buffers: ManuallyDrop::new(buffers),
        }
    }

    /// Number of buffer sets waiting to be reused.
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }

    /// Most buffer sets this pool keeps.
    pub fn max_idle(&self) -> usize {
        self.max_idle
    }

    fn put(&self, mut buffers: Box<DecoderBuffers>) {
        buffers.clear();
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(buffers);
        }
    }
}

impl Default for DecoderPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Buffers checked out of a [`DecoderPool`].
pub struct PooledBuffers<'pool> {
    pool: &'pool DecoderPool,
    buffers: ManuallyDrop<Box<DecoderBuffers>>,
}

impl Deref for PooledBuffers<'_> {
    type Target = DecoderBuffers;

    fn deref(&self) -> &DecoderBuffers {
        &self.buffers
    }
}

impl DerefMut for PooledBuffers<'_> {
    fn deref_mut(&mut self) -> &mut DecoderBuffers {
        &mut self.buffers
    }
}

impl Drop for PooledBuffers<'_> {
    fn drop(&mut self) {
        // SAFETY: `buffers` is not used after this
        let buffers = unsafe { ManuallyDrop::take(&mut self.buffers) };
        self.pool.put(buffers);
    }
}

impl fmt::Debug for PooledBuffers<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self.buffers, f)
    }
}
