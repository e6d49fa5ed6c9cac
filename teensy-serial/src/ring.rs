//! Lock-free single-producer single-consumer (SPSC) byte ring.
//!
//! Backs the RX and TX paths of the UART driver: one side of each ring is
//! touched only by application code, the other only by the interrupt
//! handler. Index arithmetic is a bitmask, so the capacity must be a power
//! of two and no division happens in the steady-state path.
//!
//! # Safety Contract
//!
//! - Only ONE context may call [`put()`](RingBuffer::put) (the "producer").
//! - Only ONE context may call [`get()`](RingBuffer::get) (the "consumer").
//! - These may be different priority/ISR contexts running concurrently.
//!
//! Each side publishes only its own index (with release ordering) after
//! touching the storage, and only reads the other side's index. That is the
//! whole synchronization story; there are no locks.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

/// Error returned by [`RingBuffer::put`] when the ring is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Full;

/// A lock-free single-producer single-consumer circular byte queue.
///
/// The usable capacity is `N - 1`: one slot stays empty so that
/// `head == tail` unambiguously means "empty" and `head + 1 == tail` means
/// "full".
///
/// # Type Parameters
///
/// - `N`: Total number of slots. Must be a power of two and at least 2
///   (`N == 1` would leave zero usable slots).
pub struct RingBuffer<const N: usize> {
    buffer: [UnsafeCell<u8>; N],
    /// Write position (only advanced by the producer).
    head: AtomicUsize,
    /// Read position (only advanced by the consumer).
    tail: AtomicUsize,
}

// SAFETY: The SPSC contract (single producer, single consumer) ensures that
// head and tail are each written from exactly one context, and the
// acquire/release pairing on the indices orders the buffer accesses.
unsafe impl<const N: usize> Sync for RingBuffer<N> {}
unsafe impl<const N: usize> Send for RingBuffer<N> {}

impl<const N: usize> RingBuffer<N> {
    const MASK: usize = N - 1;

    /// Create a new empty ring.
    ///
    /// # Panics
    ///
    /// Compile-time assertion: `N` must be a power of two and at least 2.
    pub const fn new() -> Self {
        assert!(
            N >= 2 && N.is_power_of_two(),
            "ring capacity must be a power of two >= 2"
        );

        RingBuffer {
            buffer: [const { UnsafeCell::new(0) }; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Enqueue a byte (producer side).
    ///
    /// Returns `Err(Full)` without touching any state if the ring is full —
    /// there is no partial write to undo.
    pub fn put(&self, byte: u8) -> Result<(), Full> {
        let head = self.head.load(Ordering::Relaxed);
        let next_head = (head + 1) & Self::MASK;

        if next_head == self.tail.load(Ordering::Acquire) {
            return Err(Full);
        }

        // SAFETY: We are the sole producer and `head` is only advanced by
        // us. `next_head != tail` guarantees the consumer is not reading
        // this slot.
        unsafe {
            *self.buffer[head].get() = byte;
        }

        // Release ordering publishes the byte before the index advances.
        self.head.store(next_head, Ordering::Release);
        Ok(())
    }

    /// Dequeue a byte (consumer side).
    ///
    /// Returns `None` if the ring is empty. An empty ring is a defined
    /// no-op, not a fault.
    pub fn get(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);

        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: We are the sole consumer and `tail` is only advanced by
        // us. `tail != head` guarantees this slot holds published data.
        let byte = unsafe { *self.buffer[tail].get() };

        // Release ordering frees the slot for the producer only after the
        // read completes.
        self.tail.store((tail + 1) & Self::MASK, Ordering::Release);
        Some(byte)
    }

    /// `true` if the ring holds zero bytes.
    pub fn is_empty(&self) -> bool {
        self.tail.load(Ordering::Acquire) == self.head.load(Ordering::Acquire)
    }

    /// `true` if the ring holds `N - 1` bytes (the next `put` would fail).
    pub fn is_full(&self) -> bool {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (head + 1) & Self::MASK == tail
    }

    /// Number of bytes currently queued.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        head.wrapping_sub(tail) & Self::MASK
    }

    /// Number of bytes that can still be written before [`is_full()`]
    /// returns true. Always equals `N - 1 - len()`.
    ///
    /// [`is_full()`]: RingBuffer::is_full
    pub fn space_available(&self) -> usize {
        Self::MASK - self.len()
    }

    /// Reset the ring to empty.
    ///
    /// Takes `&mut self`: resetting is only sound while no other context
    /// holds a reference, which is exactly the situation during driver
    /// (re-)initialization.
    pub fn clear(&mut self) {
        *self.head.get_mut() = 0;
        *self.tail.get_mut() = 0;
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
