/*
 * @file lib.rs
 * @brief Blinkctl library root
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

//! Blinkctl - blink an Arduino LED over a serial link.
//!
//! Opens the configured serial device at 115200 baud, then alternates
//! between sending `'0'` and `'1'` every 500 ms while echoing any bytes the
//! board sends back. Ctrl-C stops the loop cleanly.
//!
//! # Example
//! ```no_run
//! use anyhow::Result;
//! use blinkctl::controller;
//!
//! fn main() -> Result<()> {
//!     dotenv::dotenv().ok();
//!     controller::run_led_controller()
//! }
//! ```

pub mod cancel;
pub mod config;
pub mod controller;
pub mod toggle;
