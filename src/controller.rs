/*
 * @file controller.rs
 * @brief Serial toggle loop driving the board LED
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! The toggle loop itself: poll the port, report inbound bytes, send the
//! current toggle value, flip, sleep, repeat until Ctrl-C.

use std::io::{Read, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use serialport::SerialPort;

use crate::cancel::{self, sleep_until_cancelled, CancelFlag};
use crate::config;
use crate::toggle::ToggleSignal;

/// Pause between loop iterations; the LED blinks at twice this period.
const LOOP_INTERVAL: Duration = Duration::from_millis(500);

/// Maximum number of inbound bytes drained per poll.
const READ_CHUNK: usize = 80;

/// Zero read timeout: the poll returns immediately with whatever bytes the
/// OS has queued, so the loop never blocks waiting on the board.
const SERIAL_TIMEOUT: Duration = Duration::ZERO;

/// Time to let the board reboot after the UART is opened (DTR toggle).
const SERIAL_BOOT_DELAY: Duration = Duration::from_millis(150);

/// Runs the LED controller until the user interrupts it.
///
/// # Details
/// Prints the startup banner, resolves the configured serial device, opens
/// it at the configured baud rate, installs the Ctrl-C handler, and hands
/// control to [`LedControllerLoop`]. A port that cannot be opened is fatal;
/// the error propagates to `main` and the process exits non-zero.
///
/// # Returns
/// `Ok(())` when the user interrupts the loop.
///
/// # Errors
/// Returns an error if no port is configured, the port cannot be opened, the
/// Ctrl-C handler cannot be installed, or a mid-run write fails.
pub fn run_led_controller() -> Result<()> {
    println!("Control Arduino LED over serial communication");
    let app_config = config::load_app_config();
    let path = config::serial_port_path(&app_config)?;
    let baud = config::serial_baud_rate();
    let mut port = open_port_with_fallback(&path, baud)?;
    configure_port_signals(&mut port);
    let cancel = CancelFlag::new();
    cancel::install_ctrl_c_handler(&cancel)?;
    eprintln!("✓ Connected to {} at {} baud", path, baud);
    LedControllerLoop::new(port, cancel).run()
}

/// The serial toggle loop: owns the port and the outgoing toggle state.
///
/// # Details
/// Generic over `Read + Write` rather than tied to [`SerialPort`] so the
/// loop can be driven against an in-memory port in tests. Each iteration is
/// atomic: poll inbound bytes, report them, write the current toggle byte,
/// flip, then sleep. Cancellation is only observed between iterations and
/// during the sleep, never mid-iteration.
pub struct LedControllerLoop<P> {
    port: P,
    outgoing: ToggleSignal,
    cancel: CancelFlag,
    interval: Duration,
}

impl<P: Read + Write> LedControllerLoop<P> {
    /// Creates a loop over the given port with the standard 500 ms interval.
    ///
    /// # Arguments
    /// * `port` - The opened serial port (or a test double).
    /// * `cancel` - Flag tripped by the Ctrl-C handler.
    pub fn new(port: P, cancel: CancelFlag) -> Self {
        Self {
            port,
            outgoing: ToggleSignal::default(),
            cancel,
            interval: LOOP_INTERVAL,
        }
    }

    /// Replaces the inter-iteration interval; used to speed up tests.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Runs iterations until the cancellation flag is tripped.
    ///
    /// # Returns
    /// `Ok(())` on cancellation.
    ///
    /// # Errors
    /// Returns the first write or read failure; the loop does not retry a
    /// dead port.
    pub fn run(&mut self) -> Result<()> {
        while !self.cancel.is_cancelled() {
            self.iteration()?;
            sleep_until_cancelled(self.interval, &self.cancel);
        }
        Ok(())
    }

    /// Executes one poll-report-send-flip cycle.
    ///
    /// # Errors
    /// Propagates unexpected read errors and any write failure.
    fn iteration(&mut self) -> Result<()> {
        if let Some(report) = self.poll_incoming()? {
            println!("Incoming: {}", report);
        }
        self.send_outgoing()?;
        self.outgoing.flip();
        Ok(())
    }

    /// Drains up to [`READ_CHUNK`] queued inbound bytes from the port.
    ///
    /// # Details
    /// The port is opened with a zero timeout, so an empty queue surfaces as
    /// `TimedOut` (or `Ok(0)` from a test double); both mean "no data" and
    /// are not errors.
    ///
    /// # Returns
    /// * `Ok(Some(String))` - A displayable rendering of the bytes read.
    /// * `Ok(None)` - Nothing was queued.
    ///
    /// # Errors
    /// Returns an error for read failures other than an empty queue.
    fn poll_incoming(&mut self) -> Result<Option<String>> {
        let mut buf = [0u8; READ_CHUNK];
        match self.port.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(n) => Ok(Some(format_incoming(&buf[..n]))),
            Err(err) if is_empty_read(&err) => Ok(None),
            Err(err) => Err(err).with_context(|| "Failed to read from serial port"),
        }
    }

    /// Writes the current toggle byte and flushes it to the device.
    ///
    /// # Errors
    /// A failed write usually means the board was unplugged mid-run; the
    /// error is propagated so the loop ends loudly instead of spinning
    /// against a dead handle.
    fn send_outgoing(&mut self) -> Result<()> {
        let payload = [self.outgoing.as_byte()];
        self.port
            .write_all(&payload)
            .with_context(|| format!("Failed to write '{}' to serial port", self.outgoing.as_char()))?;
        self.port
            .flush()
            .with_context(|| "Failed to flush serial port")?;
        Ok(())
    }
}

/// Returns `true` for read errors that just mean "no bytes queued".
fn is_empty_read(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::TimedOut
            | std::io::ErrorKind::WouldBlock
            | std::io::ErrorKind::Interrupted
    )
}

/// Renders inbound bytes for the diagnostic console line.
///
/// # Details
/// Valid UTF-8 is shown as text with trailing line endings trimmed; anything
/// else is shown as the raw byte values. Undecodable input is a diagnostic
/// curiosity, never a reason to stop the loop.
fn format_incoming(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.trim_end_matches(['\r', '\n']).to_string(),
        Err(_) => format!("{:?}", bytes),
    }
}

/// Opens the configured port, trying the macOS callout variant on failure.
///
/// # Details
/// On macOS the same device appears as both `/dev/tty.*` and `/dev/cu.*`;
/// when the configured `tty.*` path fails to open, the `cu.*` variant is
/// tried before giving up. The original error is reported if both fail.
///
/// # Arguments
/// * `path` - The configured device path.
/// * `baud` - The baud rate to open at.
///
/// # Returns
/// * `Ok(Box<dyn SerialPort>)` - Opened port ready for polling.
///
/// # Errors
/// Returns the primary open error when no variant can be opened.
fn open_port_with_fallback(path: &str, baud: u32) -> Result<Box<dyn SerialPort>> {
    match open_serial_port(path, baud) {
        Ok(port) => Ok(port),
        Err(primary_err) => {
            let Some(callout) = callout_variant(path) else {
                return Err(primary_err);
            };
            match open_serial_port(&callout, baud) {
                Ok(port) => {
                    eprintln!("Primary port {} unavailable, switching to {}", path, callout);
                    Ok(port)
                }
                Err(_) => Err(primary_err),
            }
        }
    }
}

/// Opens a serial port with the zero poll timeout.
///
/// # Arguments
/// * `path` - The device path (e.g., "/dev/ttyACM0").
/// * `baud` - The baud rate (e.g., 115200).
///
/// # Errors
/// Returns an error if the port is missing, busy, or permission-denied.
fn open_serial_port(path: &str, baud: u32) -> Result<Box<dyn SerialPort>> {
    serialport::new(path, baud)
        .timeout(SERIAL_TIMEOUT)
        .open()
        .with_context(|| format!("Failed to open {}", path))
}

/// Asserts DTR/RTS and waits for the board to finish its post-open reboot.
fn configure_port_signals(port: &mut Box<dyn SerialPort>) {
    let _ = port.write_data_terminal_ready(true);
    let _ = port.write_request_to_send(true);
    std::thread::sleep(SERIAL_BOOT_DELAY);
}

/// Converts a tty.* device path to its cu.* callout variant.
///
/// # Returns
/// * `Some(String)` - The callout variant if the path starts with "/dev/tty.".
/// * `None` - If the path doesn't match the expected pattern.
fn callout_variant(path: &str) -> Option<String> {
    let suffix = path.strip_prefix("/dev/tty.")?;
    Some(format!("/dev/cu.{}", suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    /// In-memory stand-in for the serial device.
    ///
    /// Records every written byte, serves preloaded inbound bytes, and can
    /// trip a shared [`CancelFlag`] after a set number of writes to emulate
    /// an interrupt arriving during a particular iteration's sleep.
    struct MockPort {
        inbound: VecDeque<u8>,
        written: Vec<u8>,
        fail_writes: bool,
        cancel_after_writes: Option<(usize, CancelFlag)>,
    }

    impl MockPort {
        fn new() -> Self {
            Self {
                inbound: VecDeque::new(),
                written: Vec::new(),
                fail_writes: false,
                cancel_after_writes: None,
            }
        }

        fn with_inbound(bytes: &[u8]) -> Self {
            let mut port = Self::new();
            port.inbound.extend(bytes);
            port
        }

        fn cancel_after(mut self, writes: usize, flag: &CancelFlag) -> Self {
            self.cancel_after_writes = Some((writes, flag.clone()));
            self
        }
    }

    impl Read for MockPort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.inbound.is_empty() {
                // Matches a zero-timeout serialport read on an empty queue.
                return Err(io::Error::new(io::ErrorKind::TimedOut, "no data"));
            }
            let n = buf.len().min(self.inbound.len());
            for slot in buf.iter_mut().take(n) {
                *slot = self.inbound.pop_front().unwrap();
            }
            Ok(n)
        }
    }

    impl Write for MockPort {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail_writes {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device gone"));
            }
            self.written.extend_from_slice(buf);
            if let Some((after, flag)) = &self.cancel_after_writes {
                if self.written.len() >= *after {
                    flag.cancel();
                }
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn test_loop(port: MockPort, cancel: CancelFlag) -> LedControllerLoop<MockPort> {
        LedControllerLoop::new(port, cancel).with_interval(Duration::from_millis(1))
    }

    #[test]
    fn three_iterations_emit_alternating_sequence() {
        let cancel = CancelFlag::new();
        let port = MockPort::new().cancel_after(3, &cancel);
        let mut controller = test_loop(port, cancel);
        controller.run().unwrap();
        assert_eq!(controller.port.written, b"010");
    }

    #[test]
    fn cancel_during_second_sleep_prevents_third_write() {
        let cancel = CancelFlag::new();
        let port = MockPort::new().cancel_after(2, &cancel);
        let mut controller = test_loop(port, cancel);
        controller.run().unwrap();
        assert_eq!(controller.port.written, b"01");
    }

    #[test]
    fn pre_cancelled_run_writes_nothing() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let mut controller = test_loop(MockPort::new(), cancel);
        controller.run().unwrap();
        assert!(controller.port.written.is_empty());
    }

    #[test]
    fn empty_poll_is_not_an_error() {
        let cancel = CancelFlag::new();
        let mut controller = test_loop(MockPort::new(), cancel);
        assert!(controller.poll_incoming().unwrap().is_none());
    }

    #[test]
    fn preloaded_inbound_is_reported() {
        let cancel = CancelFlag::new();
        let port = MockPort::with_inbound(b"hello");
        let mut controller = test_loop(port, cancel);
        let report = controller.poll_incoming().unwrap().unwrap();
        assert!(report.contains("hello"));
    }

    #[test]
    fn poll_drains_at_most_the_read_chunk() {
        let cancel = CancelFlag::new();
        let port = MockPort::with_inbound(&[b'x'; READ_CHUNK + 20]);
        let mut controller = test_loop(port, cancel);
        let report = controller.poll_incoming().unwrap().unwrap();
        assert_eq!(report.len(), READ_CHUNK);
        assert_eq!(controller.port.inbound.len(), 20);
    }

    #[test]
    fn iteration_reads_before_it_writes() {
        let cancel = CancelFlag::new();
        let port = MockPort::with_inbound(b"ready");
        let mut controller = test_loop(port, cancel);
        controller.iteration().unwrap();
        assert!(controller.port.inbound.is_empty());
        assert_eq!(controller.port.written, b"0");
        assert_eq!(controller.outgoing, ToggleSignal::LedOn);
    }

    #[test]
    fn write_failure_ends_the_run_with_an_error() {
        let cancel = CancelFlag::new();
        let mut port = MockPort::new();
        port.fail_writes = true;
        let mut controller = test_loop(port, cancel);
        let err = controller.run().unwrap_err();
        assert!(err.to_string().contains("write"));
    }

    #[test]
    fn utf8_incoming_renders_as_text() {
        assert_eq!(format_incoming(b"status ok\r\n"), "status ok");
    }

    #[test]
    fn non_utf8_incoming_renders_raw_bytes() {
        let report = format_incoming(&[0xff, 0x00, 0x41]);
        assert!(report.contains("255"));
        assert!(report.contains("65"));
    }

    #[test]
    fn callout_variant_maps_tty_to_cu() {
        assert_eq!(
            callout_variant("/dev/tty.usbmodem21402").as_deref(),
            Some("/dev/cu.usbmodem21402")
        );
        assert!(callout_variant("/dev/ttyACM0").is_none());
        assert!(callout_variant("COM3").is_none());
    }
}
