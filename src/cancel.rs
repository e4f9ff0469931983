/*
 * @file cancel.rs
 * @brief Polled cancellation flag and interruptible sleep
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

//! Cooperative cancellation for the controller loop.
//!
//! Ctrl-C does not unwind anything here: the signal handler only trips a
//! shared flag, and the loop polls it between iterations and during its
//! sleep, so every iteration completes atomically before the loop exits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

/// Granularity at which a sleeping loop re-checks the cancellation flag.
///
/// Small enough that an interrupt during the 500 ms inter-iteration sleep
/// ends the wait promptly, large enough to keep the idle loop cheap.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Cloneable cancellation token polled by the controller loop.
///
/// # Details
/// Wraps an `Arc<AtomicBool>` so the Ctrl-C handler and the loop can share
/// it without locking. Once set, the flag never clears for the lifetime of
/// the process.
#[derive(Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    /// Creates a flag in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trips the flag; every clone observes the change.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`CancelFlag::cancel`] has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Registers a Ctrl-C handler that trips the given flag.
///
/// # Details
/// The handler runs on the signal-delivery thread and only stores into the
/// shared atomic, so there is no work to unwind and no shared mutable state
/// beyond the flag itself.
///
/// # Arguments
/// * `flag` - The flag the controller loop polls.
///
/// # Returns
/// * `Ok(())` - Handler installed.
///
/// # Errors
/// Returns an error if a Ctrl-C handler was already installed for this
/// process.
pub fn install_ctrl_c_handler(flag: &CancelFlag) -> Result<()> {
    let flag = flag.clone();
    ctrlc::set_handler(move || {
        eprintln!("Interrupt received, stopping...");
        flag.cancel();
    })
    .with_context(|| "Failed to install Ctrl-C handler")
}

/// Sleeps for `duration`, returning early if the flag is tripped.
///
/// # Details
/// The wait is sliced into [`CANCEL_POLL_INTERVAL`] chunks with the flag
/// checked between slices, so an interrupt delivered mid-sleep ends the
/// current iteration's pause without waiting out the remainder.
///
/// # Arguments
/// * `duration` - Total time to wait when no cancellation arrives.
/// * `flag` - The flag to poll between slices.
pub fn sleep_until_cancelled(duration: Duration, flag: &CancelFlag) {
    let deadline = Instant::now() + duration;
    while !flag.is_cancelled() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        std::thread::sleep(remaining.min(CANCEL_POLL_INTERVAL));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_starts_clear_and_latches() {
        let flag = CancelFlag::new();
        assert!(!flag.is_cancelled());
        flag.cancel();
        assert!(flag.is_cancelled());
    }

    #[test]
    fn clones_share_state() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        other.cancel();
        assert!(flag.is_cancelled());
    }

    #[test]
    fn sleep_returns_immediately_when_already_cancelled() {
        let flag = CancelFlag::new();
        flag.cancel();
        let start = Instant::now();
        sleep_until_cancelled(Duration::from_secs(5), &flag);
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn sleep_ends_early_when_cancelled_from_another_thread() {
        let flag = CancelFlag::new();
        let trip = flag.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            trip.cancel();
        });
        let start = Instant::now();
        sleep_until_cancelled(Duration::from_secs(5), &flag);
        assert!(start.elapsed() < Duration::from_secs(1));
        handle.join().unwrap();
    }

    #[test]
    fn sleep_waits_out_full_duration_without_cancellation() {
        let flag = CancelFlag::new();
        let start = Instant::now();
        sleep_until_cancelled(Duration::from_millis(60), &flag);
        assert!(start.elapsed() >= Duration::from_millis(60));
    }
}
