//! Fixed-capacity byte ring buffer between the producer and consumer paths.

use ringbuf::traits::{Consumer, Observer, Producer};
use ringbuf::HeapRb;

use crate::BridgeError;

/// A fixed-capacity circular byte store with overwrite-oldest semantics.
///
/// Writes never fail for lack of space: when the buffer is full the oldest
/// unread bytes are discarded so the most recent audio is kept. Reads return
/// whatever is available, never block, and never pad.
///
/// There is no internal locking. The owner serializes access.
pub struct ByteRingBuffer {
    storage: Option<HeapRb<u8>>,
    capacity: usize,
    overwritten: u64,
}

impl ByteRingBuffer {
    /// Allocates a buffer holding `capacity` bytes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, BridgeError> {
        if capacity == 0 {
            return Err(BridgeError::invalid_config(
                "ring buffer capacity must be non-zero",
            ));
        }

        Ok(Self {
            storage: Some(HeapRb::new(capacity)),
            capacity,
            overwritten: 0,
        })
    }

    /// Copies `bytes` into the buffer, discarding the oldest unread bytes if
    /// there is not enough room.
    ///
    /// A write longer than the capacity keeps only its trailing `capacity`
    /// bytes. Returns the number of bytes now stored from this write.
    ///
    /// # Errors
    ///
    /// Returns `Closed` after [`dispose`](Self::dispose).
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize, BridgeError> {
        let capacity = self.capacity;
        let storage = self.storage.as_mut().ok_or(BridgeError::Closed)?;

        let (skipped_input, bytes) = if bytes.len() > capacity {
            let skip = bytes.len() - capacity;
            (skip, &bytes[skip..])
        } else {
            (0, bytes)
        };

        let vacant = storage.vacant_len();
        let mut dropped = skipped_input;
        if bytes.len() > vacant {
            dropped += storage.skip(bytes.len() - vacant);
        }
        self.overwritten += dropped as u64;

        Ok(storage.push_slice(bytes))
    }

    /// Copies up to `dest.len()` unread bytes into `dest`.
    ///
    /// Returns the number of bytes copied. The rest of `dest` is untouched;
    /// zero-filling a shortfall is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns `Closed` after [`dispose`](Self::dispose).
    pub fn read(&mut self, dest: &mut [u8]) -> Result<usize, BridgeError> {
        let storage = self.storage.as_mut().ok_or(BridgeError::Closed)?;
        Ok(storage.pop_slice(dest))
    }

    /// Number of unread bytes.
    pub fn available(&self) -> usize {
        self.storage.as_ref().map_or(0, |rb| rb.occupied_len())
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total bytes discarded by overwrite-oldest since creation.
    ///
    /// Includes leading bytes of writes that were longer than the capacity.
    pub fn overwritten(&self) -> u64 {
        self.overwritten
    }

    /// Returns `true` once the buffer has been disposed.
    pub fn is_closed(&self) -> bool {
        self.storage.is_none()
    }

    /// Releases the storage. Further reads and writes fail with `Closed`.
    ///
    /// Disposing an already disposed buffer does nothing.
    pub fn dispose(&mut self) {
        self.storage = None;
    }
}

impl std::fmt::Debug for ByteRingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteRingBuffer")
            .field("capacity", &self.capacity)
            .field("available", &self.available())
            .field("overwritten", &self.overwritten)
            .field("closed", &self.is_closed())
            .finish()
    }
}
