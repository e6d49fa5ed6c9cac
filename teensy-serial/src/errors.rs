//! Error types surfaced by the driver.
//!
//! Two kinds of failure exist, with different propagation paths:
//!
//! - [`TxBufferFull`] is synchronous: the transmit ring had no space at
//!   the call site. The caller decides whether to retry.
//! - [`ErrorFlags`] is asynchronous: the interrupt handler records parity,
//!   framing, and overrun conditions into a sticky bitfield that the
//!   application polls (and clears) with
//!   [`Uart::get_errors`](crate::Uart::get_errors). Nothing is ever pushed
//!   to the application, and nothing here is fatal.

/// The transmit ring buffer was full; the byte was not enqueued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxBufferFull;

impl core::fmt::Display for TxBufferFull {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("transmit ring buffer full")
    }
}

/// Accumulated line-error bitfield.
///
/// Bit positions are a stable contract:
///
/// | Bit | Flag | Meaning |
/// |-----|------|---------|
/// | 0 | [`PARITY`](Self::PARITY) | Hardware flagged a parity error; the byte was discarded |
/// | 1 | [`FRAMING`](Self::FRAMING) | Hardware flagged a framing error; the byte was discarded |
/// | 2 | [`RX_OVERRUN`](Self::RX_OVERRUN) | The receive ring was full; incoming byte(s) were dropped |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorFlags(u8);

impl ErrorFlags {
    /// Parity error detected by the hardware.
    pub const PARITY: ErrorFlags = ErrorFlags(1 << 0);
    /// Framing error detected by the hardware.
    pub const FRAMING: ErrorFlags = ErrorFlags(1 << 1);
    /// Receive ring buffer overrun; newest byte(s) dropped.
    pub const RX_OVERRUN: ErrorFlags = ErrorFlags(1 << 2);

    /// No errors recorded.
    pub const fn empty() -> Self {
        ErrorFlags(0)
    }

    /// Construct from raw bits.
    pub const fn from_bits(bits: u8) -> Self {
        ErrorFlags(bits)
    }

    /// Raw bit representation.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// `true` if no error bit is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `true` if every flag in `other` is set in `self`.
    pub const fn contains(self, other: ErrorFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for ErrorFlags {
    type Output = ErrorFlags;

    fn bitor(self, rhs: ErrorFlags) -> ErrorFlags {
        ErrorFlags(self.0 | rhs.0)
    }
}

impl core::fmt::Display for ErrorFlags {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let mut first = true;
        for (flag, name) in [
            (Self::PARITY, "parity"),
            (Self::FRAMING, "framing"),
            (Self::RX_OVERRUN, "rx-overrun"),
        ] {
            if self.contains(flag) {
                if !first {
                    f.write_str("+")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_bit_positions() {
        assert_eq!(ErrorFlags::PARITY.bits(), 1 << 0);
        assert_eq!(ErrorFlags::FRAMING.bits(), 1 << 1);
        assert_eq!(ErrorFlags::RX_OVERRUN.bits(), 1 << 2);
    }

    #[test]
    fn combine_and_query() {
        let e = ErrorFlags::PARITY | ErrorFlags::RX_OVERRUN;
        assert!(!e.is_empty());
        assert!(e.contains(ErrorFlags::PARITY));
        assert!(e.contains(ErrorFlags::RX_OVERRUN));
        assert!(!e.contains(ErrorFlags::FRAMING));
        assert_eq!(ErrorFlags::from_bits(e.bits()), e);
    }

    #[test]
    fn display_formatting() {
        extern crate std;
        use std::string::ToString;

        assert_eq!(ErrorFlags::empty().to_string(), "none");
        assert_eq!(ErrorFlags::FRAMING.to_string(), "framing");
        assert_eq!(
            (ErrorFlags::PARITY | ErrorFlags::RX_OVERRUN).to_string(),
            "parity+rx-overrun"
        );
    }
}
