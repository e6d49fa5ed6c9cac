//! Interrupt-driven UART line driver.
//!
//! [`Uart`] owns a receive ring, a transmit ring, the sticky error
//! bitfield, and the injected [`RegisterSurface`]. Data movement between
//! the rings and the hardware FIFOs happens exclusively in
//! [`on_interrupt()`](Uart::on_interrupt); the application-facing calls
//! only touch the rings (plus the transmit-interrupt enable bit).
//!
//! ## Concurrency
//!
//! The driver assumes a single application context plus a single interrupt
//! context that can preempt it at any instruction boundary (and cannot
//! preempt itself). Each ring has exactly one producer and one consumer:
//!
//! | Ring | Producer | Consumer |
//! |------|----------|----------|
//! | RX | interrupt handler | application (`get_byte`) |
//! | TX | application (`put_byte`) | interrupt handler |
//!
//! The two places where both contexts read-modify-write the same state —
//! the transmit-interrupt enable bit and the error bitfield — are covered
//! by a `critical_section::with` block and an atomic swap respectively.
//!
//! ## Usage
//!
//! ```ignore
//! // In init (exclusive access), before sharing with the ISR:
//! let mut uart = Uart::new(Uart0Surface::take());
//! uart.init(115_200);
//!
//! // In the UART0 status ISR:
//! uart.on_interrupt();
//!
//! // In application code:
//! uart.put_bytes_blocking(b"hello\r\n");
//! while let Some(byte) = uart.get_byte() { /* ... */ }
//! ```

use core::sync::atomic::{AtomicU8, Ordering};

use crate::constants::{
    CPU_FREQUENCY_HZ, FIFO_DEPTH, IRQ_PRIORITY, RX_BUFFER_SIZE, RX_FIFO_WATERMARK,
    TX_BUFFER_SIZE, TX_FIFO_WATERMARK,
};
use crate::errors::{ErrorFlags, TxBufferFull};
use crate::registers::{LineStatus, Parity, RegisterSurface};
use crate::ring::RingBuffer;

/// Compute the baud-rate divisor for the UART0 baud generator.
///
/// Uses the Teensyduino rounding formula: the generator divides the core
/// clock by `divisor / 32`, so `divisor = round(32 · F_CPU / (16 · baud))
/// = round(2 · F_CPU / baud)`, computed in integer math with half-baud
/// rounding.
pub const fn baud_to_divisor(baud: u32) -> u32 {
    (CPU_FREQUENCY_HZ * 2 + (baud >> 1)) / baud
}

/// Interrupt-driven UART line driver.
///
/// Generic over the hardware [`RegisterSurface`] and the two ring
/// capacities (both default to 64 slots, 63 usable). Capacities must be
/// powers of two.
///
/// All operations except [`init()`](Self::init) take `&self`, so a single
/// instance can be shared between the application context and the
/// interrupt handler (e.g. as a `static` or an RTIC shared resource).
pub struct Uart<R, const RX_CAP: usize = { RX_BUFFER_SIZE }, const TX_CAP: usize = { TX_BUFFER_SIZE }> {
    regs: R,
    rx: RingBuffer<RX_CAP>,
    tx: RingBuffer<TX_CAP>,
    /// Sticky error bitfield; handler sets bits, `get_errors` swaps to 0.
    errors: AtomicU8,
    /// Currently configured parity mode (encoded; see `parity_to_bits`).
    parity: AtomicU8,
}

const PARITY_NONE: u8 = 0;
const PARITY_ODD: u8 = 1;
const PARITY_EVEN: u8 = 2;

const fn parity_to_bits(parity: Parity) -> u8 {
    match parity {
        Parity::None => PARITY_NONE,
        Parity::Odd => PARITY_ODD,
        Parity::Even => PARITY_EVEN,
    }
}

impl<R: RegisterSurface, const RX_CAP: usize, const TX_CAP: usize> Uart<R, RX_CAP, TX_CAP> {
    /// Create a driver around a register surface.
    ///
    /// The hardware is not touched until [`init()`](Self::init) runs.
    pub const fn new(regs: R) -> Self {
        Uart {
            regs,
            rx: RingBuffer::new(),
            tx: RingBuffer::new(),
            errors: AtomicU8::new(0),
            parity: AtomicU8::new(PARITY_NONE),
        }
    }

    /// Initialize (or fully re-initialize) the UART at the given baud rate.
    ///
    /// Resets both rings to empty, clears the error bitfield, and brings
    /// the hardware up: clock and pins, FIFO flush, FIFO watermarks, baud
    /// divisor, idle-line detection, receive interrupts, transceiver, and
    /// finally the interrupt-controller enable at a fixed priority.
    ///
    /// Takes `&mut self`: initialization must not race the handler, and
    /// exclusive access is what guarantees that. Re-invoking is equivalent
    /// to a full reset.
    pub fn init(&mut self, baud: u32) {
        self.rx.clear();
        self.tx.clear();
        self.errors.store(0, Ordering::Release);
        self.parity.store(PARITY_NONE, Ordering::Release);

        self.regs.enable_peripheral();

        // Quiesce the UART while settings change, then drop stale data.
        self.regs.disable_uart();
        self.regs.flush_fifos();

        self.regs.configure_fifos(TX_FIFO_WATERMARK, RX_FIFO_WATERMARK);
        self.regs.set_baud_divisor(baud_to_divisor(baud));
        self.regs.set_parity(Parity::None);

        self.regs.enable_rx_interrupts();
        self.regs.enable_transceiver();
        self.regs.enable_irq(IRQ_PRIORITY);
    }

    /// Enqueue one byte for transmission. Non-blocking.
    ///
    /// Returns `Err(TxBufferFull)` if the transmit ring has no space; the
    /// caller decides whether to retry. The transmit interrupt is enabled
    /// on every call — including failed ones — so a transmitter that
    /// stalled with a full ring recovers on the next attempt.
    pub fn put_byte(&self, byte: u8) -> Result<(), TxBufferFull> {
        // The enqueue and the TIE set must be one atomic step: the handler
        // clears TIE when it sees an empty ring, and must never do so
        // between our enqueue and our enable.
        critical_section::with(|_| {
            let result = self.tx.put(byte);
            self.regs.set_tx_interrupt(true);
            result.map_err(|_| TxBufferFull)
        })
    }

    /// Enqueue a byte sequence, best-effort. Non-blocking.
    ///
    /// Stops at the first full-ring failure and returns `Err`, leaving the
    /// earlier bytes enqueued — a partial transmission is possible by
    /// contract.
    pub fn put_bytes(&self, bytes: &[u8]) -> Result<(), TxBufferFull> {
        for &byte in bytes {
            self.put_byte(byte)?;
        }
        Ok(())
    }

    /// Enqueue a byte sequence, retrying each byte until it fits.
    ///
    /// Busy-waits with no bound: if nothing ever drains the transmit ring
    /// (for example, interrupts globally disabled), this call never
    /// returns. Callers must only invoke it while the handler is able to
    /// run.
    pub fn put_bytes_blocking(&self, bytes: &[u8]) {
        for &byte in bytes {
            while self.put_byte(byte).is_err() {
                core::hint::spin_loop();
            }
        }
    }

    /// Dequeue one received byte, or `None` if nothing is available.
    /// Non-blocking.
    pub fn get_byte(&self) -> Option<u8> {
        self.rx.get()
    }

    /// Return the errors accumulated since the previous call, clearing
    /// them atomically.
    ///
    /// With a single reader context, consecutive calls partition the error
    /// history with no gap and no duplication.
    pub fn get_errors(&self) -> ErrorFlags {
        ErrorFlags::from_bits(self.errors.swap(0, Ordering::AcqRel))
    }

    /// Reconfigure parity framing.
    ///
    /// Takes effect on subsequent frames; safe to call at any time, but a
    /// frame in flight may be received with an error.
    pub fn set_parity(&self, parity: Parity) {
        self.parity.store(parity_to_bits(parity), Ordering::Release);
        self.regs.set_parity(parity);
    }

    /// Currently configured parity mode.
    pub fn parity(&self) -> Parity {
        match self.parity.load(Ordering::Acquire) {
            PARITY_ODD => Parity::Odd,
            PARITY_EVEN => Parity::Even,
            _ => Parity::None,
        }
    }

    /// Number of received bytes waiting in the receive ring.
    pub fn rx_available(&self) -> usize {
        self.rx.len()
    }

    /// Number of bytes queued in the transmit ring, not yet handed to
    /// hardware.
    pub fn tx_pending(&self) -> usize {
        self.tx.len()
    }

    /// Space left in the transmit ring before `put_byte` fails.
    pub fn tx_space(&self) -> usize {
        self.tx.space_available()
    }

    /// Borrow the register surface (wire-side access for tests and demos).
    pub fn surface(&self) -> &R {
        &self.regs
    }

    fn record_error(&self, flag: ErrorFlags) {
        self.errors.fetch_or(flag.bits(), Ordering::AcqRel);
    }

    /// UART status interrupt handler.
    ///
    /// Call this, and nothing else, from the UART status ISR. Every branch
    /// makes bounded forward progress; nothing here blocks, retries, or
    /// reports errors synchronously (they land in the bitfield read by
    /// [`get_errors()`](Self::get_errors)).
    ///
    /// Within the driver's concurrency model this is the sole producer for
    /// the RX ring and the sole consumer for the TX ring.
    pub fn on_interrupt(&self) {
        let status = self.regs.status();

        // ── Receiver ──────────────────────────────────────────────────
        if status.intersects(LineStatus::RX_DATA_READY | LineStatus::LINE_IDLE) {
            let avail = critical_section::with(|_| {
                let avail = self.regs.rx_fifo_count();
                if avail == 0 {
                    // Idle with an empty FIFO. Clearing IDLE requires a
                    // data-register read, which underruns the FIFO, which
                    // in turn needs a flush to clear. A byte arriving in
                    // this window would be lost, hence the masked section.
                    let _ = self.regs.read_data();
                    self.regs.flush_rx_fifo();
                }
                avail
            });

            if avail != 0 {
                if status.contains(LineStatus::PARITY_ERROR) {
                    // The offending frame is at the front; drop it and
                    // everything behind it (its framing is suspect too).
                    let _ = self.regs.read_data();
                    self.regs.flush_rx_fifo();
                    self.record_error(ErrorFlags::PARITY);
                } else if status.contains(LineStatus::FRAMING_ERROR) {
                    let _ = self.regs.read_data();
                    self.regs.flush_rx_fifo();
                    self.record_error(ErrorFlags::FRAMING);
                }

                while self.regs.rx_fifo_count() > 0 {
                    let byte = self.regs.read_data();
                    if self.rx.put(byte).is_err() {
                        // Ring full: drop the newest byte, keep draining
                        // so the hardware FIFO cannot overrun as well.
                        self.record_error(ErrorFlags::RX_OVERRUN);
                    }
                }
            }
        }

        // ── Transmitter ───────────────────────────────────────────────
        if self.regs.tx_interrupt_enabled() {
            // Nothing left to send: turn the transmit interrupt back off.
            // This is the only place that happens, and the empty check and
            // the clear must be one atomic step with respect to
            // `put_byte`'s enqueue-then-enable.
            let emptied = critical_section::with(|_| {
                if self.tx.is_empty() {
                    self.regs.set_tx_interrupt(false);
                    true
                } else {
                    false
                }
            });

            if !emptied && self.regs.status().contains(LineStatus::TX_DATA_EMPTY) {
                while let Some(byte) = self.tx.get() {
                    self.regs.write_data(byte);
                    if self.regs.tx_fifo_count() >= FIFO_DEPTH {
                        break;
                    }
                }
            }
        }
    }
}
