/*
 * @file toggle.rs
 * @brief Two-state LED toggle signal
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

//! The outgoing signal sent to the board each loop iteration.

/// The wire value written to the board on each iteration.
///
/// # Details
/// The board interprets a single ASCII character per write: `'0'` turns the
/// LED off, `'1'` turns it on. The controller flips between the two states
/// unconditionally every iteration, starting at `'0'`. No other wire values
/// exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleSignal {
    /// LED off, encoded as ASCII `'0'`.
    LedOff,
    /// LED on, encoded as ASCII `'1'`.
    LedOn,
}

/// The sequence always starts with the LED off.
impl Default for ToggleSignal {
    fn default() -> Self {
        ToggleSignal::LedOff
    }
}

impl ToggleSignal {
    /// Returns the single byte written to the serial port for this state.
    ///
    /// # Returns
    /// * `u8` - ASCII `b'0'` for [`ToggleSignal::LedOff`], `b'1'` for
    ///   [`ToggleSignal::LedOn`].
    pub fn as_byte(self) -> u8 {
        match self {
            ToggleSignal::LedOff => b'0',
            ToggleSignal::LedOn => b'1',
        }
    }

    /// Returns the state as a printable character for diagnostics.
    pub fn as_char(self) -> char {
        self.as_byte() as char
    }

    /// Returns the opposite state.
    ///
    /// # Returns
    /// * `ToggleSignal` - [`ToggleSignal::LedOn`] when off, and vice versa.
    pub fn flipped(self) -> Self {
        match self {
            ToggleSignal::LedOff => ToggleSignal::LedOn,
            ToggleSignal::LedOn => ToggleSignal::LedOff,
        }
    }

    /// Flips the state in place.
    pub fn flip(&mut self) {
        *self = self.flipped();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_off() {
        assert_eq!(ToggleSignal::default(), ToggleSignal::LedOff);
        assert_eq!(ToggleSignal::default().as_byte(), b'0');
    }

    #[test]
    fn flipping_alternates() {
        let mut signal = ToggleSignal::default();
        let mut sequence = Vec::new();
        for _ in 0..6 {
            sequence.push(signal.as_char());
            signal.flip();
        }
        assert_eq!(sequence, vec!['0', '1', '0', '1', '0', '1']);
    }

    #[test]
    fn flipped_is_involutive() {
        assert_eq!(ToggleSignal::LedOff.flipped().flipped(), ToggleSignal::LedOff);
        assert_eq!(ToggleSignal::LedOn.flipped(), ToggleSignal::LedOff);
    }
}
