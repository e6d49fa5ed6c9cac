/// Core clock frequency the UART0 baud generator is driven from.
///
/// UART0 on the MK20 is clocked from the core/system clock, 96 MHz in the
/// usual Teensy 3.2 configuration.
pub const CPU_FREQUENCY_HZ: u32 = 96_000_000;

/// Depth of the hardware TX/RX FIFOs on UART0 (MK20DX256).
pub const FIFO_DEPTH: u8 = 8;

/// TX FIFO watermark: the transmit interrupt fires when the hardware FIFO
/// drains to this many bytes or fewer.
pub const TX_FIFO_WATERMARK: u8 = 2;

/// RX FIFO watermark: the receive interrupt fires when the hardware FIFO
/// holds this many bytes or more.
pub const RX_FIFO_WATERMARK: u8 = 4;

/// Default capacity of the software receive ring (one slot reserved, so 63
/// bytes usable).
pub const RX_BUFFER_SIZE: usize = 64;

/// Default capacity of the software transmit ring (one slot reserved, so 63
/// bytes usable).
pub const TX_BUFFER_SIZE: usize = 64;

/// NVIC priority for the UART0 status interrupt (0 = highest, 255 = lowest).
pub const IRQ_PRIORITY: u8 = 64;
