//! Software loopback demo.
//!
//! Runs the whole driver on the host: one thread plays the interrupt
//! handler and the wire (everything transmitted is fed straight back into
//! the receiver), while the main thread transmits a message with the
//! blocking API and reads it back.
//!
//! ```text
//! cargo run -p teensy-serial-demos --bin loopback
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use teensy_serial::sim::SimSurface;
use teensy_serial::Uart;

fn main() {
    let mut uart = Uart::<SimSurface>::new(SimSurface::new());
    uart.init(115_200);
    println!(
        "initialized: divisor={} watermarks={:?} parity={:?}",
        uart.surface().divisor(),
        uart.surface().watermarks(),
        uart.parity(),
    );

    let message = b"hello from the other side of the ring buffers\r\n";
    let done = AtomicBool::new(false);

    let received = std::thread::scope(|scope| {
        // Interrupt handler + wire, in one thread: service the driver,
        // then loop every transmitted byte back into the receiver.
        scope.spawn(|| {
            while !done.load(Ordering::Acquire) {
                uart.on_interrupt();
                while let Some(byte) = uart.surface().wire_read_tx() {
                    uart.surface().wire_write_rx(byte);
                }
                std::thread::yield_now();
            }
        });

        uart.put_bytes_blocking(message);

        let mut received = Vec::with_capacity(message.len());
        while received.len() < message.len() {
            match uart.get_byte() {
                Some(byte) => received.push(byte),
                None => std::thread::yield_now(),
            }
        }
        done.store(true, Ordering::Release);
        received
    });

    println!("sent     {} bytes", message.len());
    println!("received {} bytes: {:?}", received.len(), String::from_utf8_lossy(&received));
    println!("line errors: {}", uart.get_errors());
    assert_eq!(received, message);
    println!("loopback ok");
}
