//! [`embedded_io`] trait implementations.
//!
//! Lets the driver slot into anything written against the embedded I/O
//! traits. The blocking contracts mirror the driver's own:
//!
//! - [`Write::write`] busy-waits for space for the first byte, then takes
//!   as many of the remaining bytes as fit without blocking.
//! - [`Read::read`] busy-waits for the first byte, then drains whatever
//!   else is already buffered.
//! - [`Write::flush`] busy-waits until the transmit ring has been handed
//!   to hardware (the hardware FIFO may still be emptying onto the wire).
//!
//! As with [`Uart::put_bytes_blocking`], every busy-wait here relies on
//! the interrupt handler being able to run; do not call these with
//! interrupts globally disabled.

use embedded_io::{ErrorType, Read, ReadReady, Write, WriteReady};

use crate::registers::RegisterSurface;
use crate::uart::Uart;

impl<R: RegisterSurface, const RX_CAP: usize, const TX_CAP: usize> ErrorType
    for Uart<R, RX_CAP, TX_CAP>
{
    type Error = core::convert::Infallible;
}

impl<R: RegisterSurface, const RX_CAP: usize, const TX_CAP: usize> Write
    for Uart<R, RX_CAP, TX_CAP>
{
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let Some((&first, rest)) = buf.split_first() else {
            return Ok(0);
        };

        while self.put_byte(first).is_err() {
            core::hint::spin_loop();
        }

        let mut written = 1;
        for &byte in rest {
            if self.put_byte(byte).is_err() {
                break;
            }
            written += 1;
        }
        Ok(written)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        while self.tx_pending() > 0 {
            core::hint::spin_loop();
        }
        Ok(())
    }
}

impl<R: RegisterSurface, const RX_CAP: usize, const TX_CAP: usize> Read
    for Uart<R, RX_CAP, TX_CAP>
{
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }

        buf[0] = loop {
            if let Some(byte) = self.get_byte() {
                break byte;
            }
            core::hint::spin_loop();
        };

        let mut count = 1;
        while count < buf.len() {
            match self.get_byte() {
                Some(byte) => {
                    buf[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }
}

impl<R: RegisterSurface, const RX_CAP: usize, const TX_CAP: usize> ReadReady
    for Uart<R, RX_CAP, TX_CAP>
{
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.rx_available() > 0)
    }
}

impl<R: RegisterSurface, const RX_CAP: usize, const TX_CAP: usize> WriteReady
    for Uart<R, RX_CAP, TX_CAP>
{
    fn write_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.tx_space() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimSurface;

    fn init_uart() -> Uart<SimSurface> {
        let mut uart = Uart::new(SimSurface::new());
        uart.init(115_200);
        uart
    }

    #[test]
    fn write_enqueues_and_reports_count() {
        let mut uart = init_uart();
        assert_eq!(uart.write(b"abc").unwrap(), 3);
        assert_eq!(uart.tx_pending(), 3);
        assert_eq!(uart.write(b"").unwrap(), 0);
    }

    #[test]
    fn write_takes_what_fits() {
        let mut uart: Uart<SimSurface, 64, 8> = Uart::new(SimSurface::new());
        uart.init(115_200);

        // 7 usable TX slots, 10-byte input: the overflow is reported, not
        // dropped silently.
        assert_eq!(uart.write(b"0123456789").unwrap(), 7);
        assert_eq!(uart.tx_pending(), 7);
    }

    #[test]
    fn flush_returns_once_ring_is_drained() {
        let mut uart = init_uart();
        uart.write(b"ok").unwrap();
        uart.on_interrupt(); // hand the ring to the (simulated) hardware
        uart.flush().unwrap();
        assert_eq!(uart.tx_pending(), 0);
    }

    #[test]
    fn read_drains_buffered_bytes() {
        let mut uart = init_uart();
        for byte in b"ping" {
            uart.surface().wire_write_rx(*byte);
        }
        uart.on_interrupt();

        let mut buf = [0u8; 16];
        let count = uart.read(&mut buf).unwrap();
        assert_eq!(&buf[..count], b"ping");
    }

    #[test]
    fn read_is_bounded_by_buffer() {
        let mut uart = init_uart();
        for byte in b"abcdef" {
            uart.surface().wire_write_rx(*byte);
        }
        uart.on_interrupt();

        let mut buf = [0u8; 4];
        assert_eq!(uart.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(uart.rx_available(), 2);
    }

    #[test]
    fn readiness_tracks_ring_state() {
        let mut uart: Uart<SimSurface, 64, 2> = Uart::new(SimSurface::new());
        uart.init(115_200);

        assert!(!uart.read_ready().unwrap());
        assert!(uart.write_ready().unwrap());

        uart.put_byte(b'x').unwrap(); // 1 usable slot, now full
        assert!(!uart.write_ready().unwrap());

        uart.surface().wire_write_rx(b'y');
        uart.on_interrupt();
        assert!(uart.read_ready().unwrap());
    }
}
