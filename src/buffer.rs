//! # Capture Buffer
//!
//! Bounded storage for bytes arriving from the receiver. Bytes are appended one at a
//! time until the buffer saturates one short of its capacity; further bytes are
//! dropped without complaint and the flush policy clears the buffer on the next pass.

use log::trace;

use crate::clock::Timestamp;

/// Default capacity in bytes.
pub const DEFAULT_CAPACITY: usize = 512;

/// Append-only byte buffer with a write cursor and a last-activity tick.
///
/// The write cursor never exceeds `capacity - 1`.
///
/// ```rust
/// use nmea0183_capture::{CaptureBuffer, Timestamp};
///
/// let mut buffer = CaptureBuffer::new(4);
/// for (tick, byte) in b"$GPG".iter().enumerate() {
///     buffer.push(*byte, Timestamp::from_millis(tick as u64));
/// }
///
/// // The last byte did not fit but was still seen.
/// assert_eq!(buffer.snapshot(), b"$GP");
/// assert!(buffer.is_saturated());
/// assert_eq!(buffer.last_update(), Timestamp::from_millis(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureBuffer {
    chars: Box<[u8]>,
    cursor: usize,
    last_update: Timestamp,
}

impl CaptureBuffer {
    /// Creates an empty buffer holding at most `capacity - 1` bytes.
    ///
    /// A capacity below 2 is raised to 2 so the buffer can hold at least one byte.
    pub fn new(capacity: usize) -> Self {
        CaptureBuffer {
            chars: vec![0; capacity.max(2)].into_boxed_slice(),
            cursor: 0,
            last_update: Timestamp::ZERO,
        }
    }

    /// Appends `byte` and records `now` as the last activity.
    ///
    /// The tick is recorded even when the byte is not stored: NUL bytes are never
    /// stored, and neither is anything arriving once the buffer is saturated.
    pub fn push(&mut self, byte: u8, now: Timestamp) {
        self.last_update = now;

        if byte == 0 {
            return;
        }

        if self.is_saturated() {
            trace!("capture buffer saturated, dropping {byte:#04x}");
            return;
        }

        self.chars[self.cursor] = byte;
        self.cursor += 1;
    }

    /// Zeroes the contents and rewinds the cursor.
    pub fn reset(&mut self, now: Timestamp) {
        self.chars.fill(0);
        self.cursor = 0;
        self.last_update = now;
    }

    /// Discards the first `count` stored bytes, moving the rest to the front.
    ///
    /// The activity tick is left alone: nothing arrived.
    pub fn consume(&mut self, count: usize) {
        let count = count.min(self.cursor);
        if count == 0 {
            return;
        }

        self.chars.copy_within(count..self.cursor, 0);
        let remaining = self.cursor - count;
        self.chars[remaining..self.cursor].fill(0);
        self.cursor = remaining;
    }

    /// The bytes stored so far.
    pub fn snapshot(&self) -> &[u8] {
        &self.chars[..self.cursor]
    }

    /// Number of stored bytes (the write cursor).
    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    pub fn capacity(&self) -> usize {
        self.chars.len()
    }

    /// `true` once the cursor has reached `capacity - 1`.
    pub fn is_saturated(&self) -> bool {
        self.cursor >= self.chars.len() - 1
    }

    /// Tick of the most recent byte arrival or reset.
    pub fn last_update(&self) -> Timestamp {
        self.last_update
    }
}

impl Default for CaptureBuffer {
    fn default() -> Self {
        CaptureBuffer::new(DEFAULT_CAPACITY)
    }
}
