//! 8-digit 7-segment LED array layout
//!
//! Each word addresses one digit: the digit number goes in bits 8-10 and the
//! segment pattern in the low byte (bit 0 = segment a ... bit 6 = segment g,
//! bit 7 = decimal point).

use super::{BufferError, DisplayBuffer};

/// Number of digits on the array
pub const LED_DIGITS: usize = 8;

/// Refresh buffer for the LED array
pub type LedBuffer = DisplayBuffer<LED_DIGITS>;

/// Decimal point segment
pub const SEG_DP: u8 = 0x80;

/// Words for an array with every digit dark
pub const fn blank() -> [u16; LED_DIGITS] {
    let mut words = [0u16; LED_DIGITS];
    let mut digit = 0;
    while digit < LED_DIGITS {
        words[digit] = (digit as u16) << 8;
        digit += 1;
    }
    words
}

/// Create a blank LED buffer (usable in a `static`)
pub const fn led_buffer() -> LedBuffer {
    DisplayBuffer::new(blank())
}

/// Segment pattern for a character
///
/// Letters without a sensible 7-segment shape are dark.
pub const fn segments(ch: u8) -> u8 {
    match ch {
        b'0' | b'O' => 0x3F,
        b'1' => 0x06,
        b'2' => 0x5B,
        b'3' => 0x4F,
        b'4' => 0x66,
        b'5' | b'S' | b's' => 0x6D,
        b'6' => 0x7D,
        b'7' => 0x07,
        b'8' => 0x7F,
        b'9' => 0x67,
        b'A' | b'a' => 0x77,
        b'B' | b'b' => 0x7C,
        b'C' => 0x39,
        b'c' => 0x58,
        b'D' | b'd' => 0x5E,
        b'E' | b'e' => 0x79,
        b'F' | b'f' => 0x71,
        b'G' | b'g' => 0x3D,
        b'H' => 0x76,
        b'h' => 0x74,
        b'I' | b'i' => 0x30,
        b'J' | b'j' => 0x1E,
        b'L' | b'l' => 0x38,
        b'N' | b'n' => 0x54,
        b'o' => 0x5C,
        b'P' | b'p' => 0x73,
        b'R' | b'r' => 0x50,
        b'T' | b't' => 0x78,
        b'U' => 0x3E,
        b'u' => 0x1C,
        b'Y' | b'y' => 0x6E,
        b'-' => 0x40,
        b'_' => 0x08,
        b'=' => 0x48,
        b'.' => SEG_DP,
        b'*' => 0x63,
        b'#' => 0x5C | SEG_DP,
        _ => 0x00,
    }
}

fn encode(digit: usize, pattern: u8) -> u16 {
    ((digit as u16) << 8) | pattern as u16
}

/// Show a character on one digit
pub fn set_char(buffer: &LedBuffer, digit: usize, ch: char) -> Result<(), BufferError> {
    let pattern = if ch.is_ascii() { segments(ch as u8) } else { 0 };
    set_segments(buffer, digit, pattern)
}

/// Show a raw segment pattern on one digit
pub fn set_segments(buffer: &LedBuffer, digit: usize, pattern: u8) -> Result<(), BufferError> {
    if digit >= LED_DIGITS {
        return Err(BufferError::OutOfRange);
    }
    buffer.set(digit, encode(digit, pattern))
}

/// Show up to eight characters, left-aligned, blanking the rest
pub fn print(buffer: &LedBuffer, text: &str) {
    let mut chars = text.chars();
    for digit in 0..LED_DIGITS {
        let ch = chars.next().unwrap_or(' ');
        set_char(buffer, digit, ch).ok();
    }
}

/// Shift every digit one place left and show `ch` on the rightmost digit
pub fn scroll_in(buffer: &LedBuffer, ch: char) {
    for digit in 0..LED_DIGITS - 1 {
        let pattern = buffer.get(digit + 1).unwrap_or(0) as u8;
        set_segments(buffer, digit, pattern).ok();
    }
    set_char(buffer, LED_DIGITS - 1, ch).ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_addresses_digits() {
        assert_eq!(blank(), [0x000, 0x100, 0x200, 0x300, 0x400, 0x500, 0x600, 0x700]);
    }

    #[test]
    fn test_print_banner() {
        let buffer = led_buffer();
        print(&buffer, "ECE 362");
        assert_eq!(buffer.get(0), Some(0x079));
        assert_eq!(buffer.get(1), Some(0x139));
        assert_eq!(buffer.get(3), Some(0x300));
        assert_eq!(buffer.get(6), Some(0x65B));
        // Padded with blanks
        assert_eq!(buffer.get(7), Some(0x700));
    }

    #[test]
    fn test_set_char_range() {
        let buffer = led_buffer();
        set_char(&buffer, 7, '8').unwrap();
        assert_eq!(buffer.get(7), Some(0x77F));
        assert_eq!(set_char(&buffer, 8, '8'), Err(BufferError::OutOfRange));
    }

    #[test]
    fn test_scroll_in() {
        let buffer = led_buffer();
        scroll_in(&buffer, '1');
        scroll_in(&buffer, '2');
        assert_eq!(buffer.get(6), Some(0x600 | segments(b'1') as u16));
        assert_eq!(buffer.get(7), Some(0x700 | segments(b'2') as u16));
        assert_eq!(buffer.get(5), Some(0x500));
    }
}
