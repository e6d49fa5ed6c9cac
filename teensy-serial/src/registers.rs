//! Hardware register surface consumed by the UART driver.
//!
//! The driver never touches memory-mapped registers directly; it goes
//! through the [`RegisterSurface`] trait. A hardware implementation wraps
//! the Kinetis UART0 register block (plus the SIM clock gate, PORTB pin
//! control, and NVIC), while tests and demos use the simulated surface in
//! [`crate::sim`].
//!
//! Methods take `&self`: memory-mapped I/O has interior mutability by
//! nature, and both the application context and the interrupt handler need
//! access to the same surface.

/// Parity framing mode for transmitted and received frames.
///
/// With parity enabled the frame is widened to 9 bits (8 data + parity),
/// matching what the hardware's `C1[M]`/`C1[PE]`/`C1[PT]` bits do on the
/// MK20.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    /// 8N1, no parity bit.
    #[default]
    None,
    /// Even parity.
    Even,
    /// Odd parity.
    Odd,
}

/// Snapshot of the UART status register.
///
/// A thin bitfield newtype over the flags the interrupt handler cares
/// about, modeled on the MK20's `UART0_S1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineStatus(u8);

impl LineStatus {
    /// Receive data register full (`S1[RDRF]`): the RX FIFO has reached
    /// its watermark.
    pub const RX_DATA_READY: LineStatus = LineStatus(1 << 0);
    /// Idle line detected (`S1[IDLE]`): no transitions on the wire for at
    /// least one character time after a stop bit.
    pub const LINE_IDLE: LineStatus = LineStatus(1 << 1);
    /// Parity error on the frame at the front of the RX FIFO (`S1[PF]`).
    pub const PARITY_ERROR: LineStatus = LineStatus(1 << 2);
    /// Framing error on the frame at the front of the RX FIFO (`S1[FE]`).
    pub const FRAMING_ERROR: LineStatus = LineStatus(1 << 3);
    /// Transmit data register empty (`S1[TDRE]`): the TX FIFO has drained
    /// to its watermark.
    pub const TX_DATA_EMPTY: LineStatus = LineStatus(1 << 4);

    /// No flags set.
    pub const fn empty() -> Self {
        LineStatus(0)
    }

    /// Construct from raw bits.
    pub const fn from_bits(bits: u8) -> Self {
        LineStatus(bits)
    }

    /// Raw bit representation.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// `true` if every flag in `other` is set in `self`.
    pub const fn contains(self, other: LineStatus) -> bool {
        self.0 & other.0 == other.0
    }

    /// `true` if any flag in `other` is set in `self`.
    pub const fn intersects(self, other: LineStatus) -> bool {
        self.0 & other.0 != 0
    }
}

impl core::ops::BitOr for LineStatus {
    type Output = LineStatus;

    fn bitor(self, rhs: LineStatus) -> LineStatus {
        LineStatus(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for LineStatus {
    fn bitor_assign(&mut self, rhs: LineStatus) {
        self.0 |= rhs.0;
    }
}

/// The hardware register surface the driver is generic over.
///
/// Each method corresponds to a small, non-blocking register access; none
/// of them may spin or sleep. The documentation names the MK20/Teensy 3.x
/// registers an on-target implementation would touch, but nothing in the
/// driver depends on that mapping.
pub trait RegisterSurface {
    /// Gate the UART clock on and mux the RX/TX pins to the UART function
    /// with pullups (`SIM_SCGC4[UART0]`, `PORTB_PCR16/17`).
    fn enable_peripheral(&self);

    /// Disable the transmitter, receiver, and all UART interrupt sources,
    /// and reset line-control settings to their defaults (`C1`–`C5`
    /// cleared). Called before reconfiguration.
    fn disable_uart(&self);

    /// Discard everything held in both hardware FIFOs
    /// (`CFIFO[TXFLUSH | RXFLUSH]`).
    fn flush_fifos(&self);

    /// Discard everything held in the receive FIFO (`CFIFO[RXFLUSH]`).
    fn flush_rx_fifo(&self);

    /// Enable the hardware FIFOs and program their interrupt watermarks
    /// (`PFIFO`, `TWFIFO`, `RWFIFO`).
    fn configure_fifos(&self, tx_watermark: u8, rx_watermark: u8);

    /// Program the baud-rate divisor (split across `BDH`/`BDL` plus the
    /// `C4[BRFA]` fine-adjust field on real hardware).
    fn set_baud_divisor(&self, divisor: u32);

    /// Configure parity framing. Takes effect on subsequent frames; frames
    /// in flight may be corrupted.
    fn set_parity(&self, parity: Parity);

    /// Enable the receive and idle-line interrupts, with the idle counter
    /// starting after the stop bit (`C1[ILT]`, `C2[RIE | ILIE]`).
    fn enable_rx_interrupts(&self);

    /// Set or clear the transmit interrupt enable (`C2[TIE]`).
    ///
    /// This bit is toggled from both the application context and the
    /// handler; application-side callers must wrap the call in a critical
    /// section (the driver does).
    fn set_tx_interrupt(&self, enabled: bool);

    /// Current state of the transmit interrupt enable (`C2[TIE]`).
    fn tx_interrupt_enabled(&self) -> bool;

    /// Enable the transmitter and receiver (`C2[TE | RE]`).
    fn enable_transceiver(&self);

    /// Enable the UART status interrupt in the interrupt controller at the
    /// given priority (`NVIC_ENABLE_IRQ` / `NVIC_SET_PRIORITY` for the
    /// UART0 status vector).
    fn enable_irq(&self, priority: u8);

    /// Read the status register (`S1`).
    fn status(&self) -> LineStatus;

    /// Read one byte from the data register (`D`), popping the RX FIFO.
    ///
    /// Reading with an empty FIFO is permitted (the idle-recovery sequence
    /// relies on it) and returns an unspecified value.
    fn read_data(&self) -> u8;

    /// Write one byte to the data register (`D`), pushing the TX FIFO.
    fn write_data(&self, byte: u8);

    /// Number of bytes currently held in the receive FIFO (`RCFIFO`).
    fn rx_fifo_count(&self) -> u8;

    /// Number of bytes currently held in the transmit FIFO (`TCFIFO`).
    fn tx_fifo_count(&self) -> u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_status_bit_ops() {
        let s = LineStatus::RX_DATA_READY | LineStatus::LINE_IDLE;
        assert!(s.contains(LineStatus::RX_DATA_READY));
        assert!(s.contains(LineStatus::LINE_IDLE));
        assert!(!s.contains(LineStatus::PARITY_ERROR));

        assert!(s.intersects(LineStatus::LINE_IDLE | LineStatus::TX_DATA_EMPTY));
        assert!(!s.intersects(LineStatus::PARITY_ERROR | LineStatus::FRAMING_ERROR));

        assert_eq!(LineStatus::empty().bits(), 0);
        assert_eq!(LineStatus::from_bits(s.bits()), s);
    }

    #[test]
    fn line_status_contains_empty() {
        // Every status contains the empty set.
        assert!(LineStatus::empty().contains(LineStatus::empty()));
        assert!(LineStatus::PARITY_ERROR.contains(LineStatus::empty()));
        // But the empty set intersects nothing.
        assert!(!LineStatus::PARITY_ERROR.intersects(LineStatus::empty()));
    }

    #[test]
    fn parity_default_is_none() {
        assert_eq!(Parity::default(), Parity::None);
    }
}
