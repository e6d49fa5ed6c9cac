//! # teensy-serial
//!
//! A `no_std`, zero-allocation, interrupt-driven UART driver for the
//! [Teensy 3.x](https://www.pjrc.com/teensy/) (MK20DX256, Cortex-M4)
//! written in pure Rust. Hardware byte-at-a-time I/O is decoupled from
//! application-speed production and consumption by a pair of lock-free
//! ring buffers serviced from the UART status interrupt.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Queue | [`ring`] | Lock-free SPSC byte ring (power-of-two, bitmask indices) |
//! | Seam | [`registers`] | [`RegisterSurface`] trait the driver is generic over |
//! | Driver | [`uart`] | Init, TX/RX API, and the interrupt handler |
//! | Errors | [`errors`] | Synchronous full-ring error + sticky line-error bitfield |
//! | Sim | [`sim`] | Software register surface for host tests (feature `sim`) |
//!
//! ## Quick start
//!
//! ```ignore
//! use teensy_serial::Uart;
//!
//! let mut uart = Uart::new(Uart0Surface::take());
//! uart.init(115_200);
//!
//! // From the UART0 status interrupt handler:
//! //     UART.on_interrupt();
//!
//! uart.put_bytes_blocking(b"hello\r\n");
//! if let Some(byte) = uart.get_byte() {
//!     // ...
//! }
//! let errors = uart.get_errors(); // read-and-clear
//! ```
//!
//! ## Concurrency model
//!
//! One application context plus one interrupt context; the handler may
//! preempt the application at any point, never the other way around. Each
//! ring has a fixed producer and consumer role, which is what makes the
//! index scheme lock-free; the two genuinely shared read-modify-write spots
//! (transmit-interrupt enable, error bitfield) use `critical-section` and
//! an atomic swap. See [`uart`] for the full discussion.
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `embedded-io` | yes | [`embedded_io`] `Read`/`Write` trait implementations |
//! | `sim` | no | [`sim::SimSurface`] outside of tests (demos, bring-up) |
//! | `defmt` | no | `defmt::Format` derives on the public types |

#![no_std]

#[cfg(test)]
extern crate std;

pub mod constants;
pub mod errors;
pub mod registers;
pub mod ring;
pub mod uart;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

#[cfg(feature = "embedded-io")]
mod io;

pub use errors::{ErrorFlags, TxBufferFull};
pub use registers::{LineStatus, Parity, RegisterSurface};
pub use uart::{baud_to_divisor, Uart};

#[cfg(test)]
mod integration_tests;
