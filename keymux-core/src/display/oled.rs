//! 2×16 character OLED layout
//!
//! The OLED controller takes 10-bit SPI words. Bit 9 selects character
//! data; without it the low byte is a command. The refresh buffer holds one
//! cursor command per line followed by that line's characters:
//!
//! ```text
//! [0]      0x002       cursor to line 1, column 0
//! [1..17]  0x200 | ch  16 characters
//! [17]     0x0C0       cursor to line 2, column 0
//! [18..34] 0x200 | ch  16 characters
//! ```

use super::{BufferError, DisplayBuffer, WordFormat};
use crate::traits::WordSink;

/// Characters per line
pub const OLED_COLS: usize = 16;

/// Number of lines
pub const OLED_LINES: usize = 2;

/// Words in the refresh buffer
pub const OLED_BUFFER_LEN: usize = OLED_LINES * (OLED_COLS + 1);

/// OLED word encoding
pub const OLED_FORMAT: WordFormat = WordFormat { data_flag: 0x200 };

/// Cursor-positioning command for the start of each line
pub const LINE_COMMANDS: [u8; OLED_LINES] = [0x02, 0xC0];

/// Refresh buffer for the OLED
pub type OledBuffer = DisplayBuffer<OLED_BUFFER_LEN>;

/// One step of the power-up sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitStep {
    /// Send a command word
    Command(u8),
    /// Wait before continuing
    DelayUs(u32),
}

/// Controller power-up sequence, sent once before the refresh transfer starts
pub const OLED_INIT_SEQUENCE: [InitStep; 8] = [
    InitStep::DelayUs(1_000),
    InitStep::Command(0x38), // function set: 8-bit, 2 lines
    InitStep::Command(0x08), // display off
    InitStep::Command(0x01), // clear
    InitStep::DelayUs(2_000),
    InitStep::Command(0x06), // entry mode: increment, no shift
    InitStep::Command(0x02), // home
    InitStep::Command(0x0C), // display on, cursor off
];

/// Words for a buffer showing two blank lines
pub const fn blank() -> [u16; OLED_BUFFER_LEN] {
    let mut words = [0u16; OLED_BUFFER_LEN];
    let mut line = 0;
    while line < OLED_LINES {
        let start = line * (OLED_COLS + 1);
        words[start] = OLED_FORMAT.command(LINE_COMMANDS[line]);
        let mut col = 0;
        while col < OLED_COLS {
            words[start + 1 + col] = OLED_FORMAT.character(b' ');
            col += 1;
        }
        line += 1;
    }
    words
}

/// Create a blank OLED buffer (usable in a `static`)
pub const fn oled_buffer() -> OledBuffer {
    DisplayBuffer::new(blank())
}

fn glyph(ch: char) -> u8 {
    if ch.is_ascii() && !ch.is_ascii_control() {
        ch as u8
    } else {
        b'?'
    }
}

fn cell_index(line: usize, col: usize) -> Result<usize, BufferError> {
    if line >= OLED_LINES || col >= OLED_COLS {
        return Err(BufferError::OutOfRange);
    }
    Ok(line * (OLED_COLS + 1) + 1 + col)
}

/// Replace a whole line, padding with spaces and truncating at 16 characters
pub fn set_line(buffer: &OledBuffer, line: usize, text: &str) -> Result<(), BufferError> {
    let start = cell_index(line, 0)?;
    let mut words = [OLED_FORMAT.character(b' '); OLED_COLS];
    for (word, ch) in words.iter_mut().zip(text.chars()) {
        *word = OLED_FORMAT.character(glyph(ch));
    }
    buffer.write(start, &words)
}

/// Replace one character
pub fn set_char(buffer: &OledBuffer, line: usize, col: usize, ch: char) -> Result<(), BufferError> {
    buffer.set(cell_index(line, col)?, OLED_FORMAT.character(glyph(ch)))
}

/// Text currently held for a line
pub fn line_text(buffer: &OledBuffer, line: usize) -> Result<heapless::String<OLED_COLS>, BufferError> {
    let start = cell_index(line, 0)?;
    let mut text = heapless::String::new();
    for index in start..start + OLED_COLS {
        let word = buffer.get(index).ok_or(BufferError::OutOfRange)?;
        text.push(word as u8 as char).ok();
    }
    Ok(text)
}

/// Write a line straight to the controller without a refresh buffer
///
/// Sends the line's cursor command followed by the characters of `text`
/// (up to 16). Used when the OLED is driven directly instead of by a
/// circular transfer.
pub fn write_line_direct<S: WordSink>(sink: &mut S, line: usize, text: &str) -> Result<(), S::Error> {
    let Some(&command) = LINE_COMMANDS.get(line) else {
        return Ok(());
    };
    sink.write_word(OLED_FORMAT.command(command))?;
    for ch in text.chars().take(OLED_COLS) {
        sink.write_word(OLED_FORMAT.character(glyph(ch)))?;
    }
    Ok(())
}

/// Write every line held in `buffer` straight to the controller
///
/// Sends the same words, in the same order, as one pass of a circular
/// transfer over the buffer.
pub fn write_buffer_direct<S: WordSink>(sink: &mut S, buffer: &OledBuffer) -> Result<(), S::Error> {
    for line in 0..OLED_LINES {
        if let Ok(text) = line_text(buffer, line) {
            write_line_direct(sink, line, &text)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Cell;
    use heapless::Vec;

    #[test]
    fn test_blank_layout() {
        let words = blank();
        assert_eq!(words.len(), 34);
        assert_eq!(words[0], 0x002);
        assert_eq!(words[17], 0x0C0);
        assert_eq!(words[1], 0x220);
        assert_eq!(words[33], 0x220);
    }

    #[test]
    fn test_set_line() {
        let buffer = oled_buffer();
        set_line(&buffer, 0, "ECE362 is the").unwrap();
        set_line(&buffer, 1, "class for you! and more").unwrap();

        assert_eq!(line_text(&buffer, 0).unwrap().as_str(), "ECE362 is the   ");
        assert_eq!(line_text(&buffer, 1).unwrap().as_str(), "class for you! a");
        // Commands untouched
        assert_eq!(OLED_FORMAT.decode(buffer.get(0).unwrap()), Cell::Command(0x02));
        assert_eq!(OLED_FORMAT.decode(buffer.get(17).unwrap()), Cell::Command(0xC0));
    }

    #[test]
    fn test_set_char() {
        let buffer = oled_buffer();
        set_char(&buffer, 1, 15, 'x').unwrap();
        assert_eq!(buffer.get(33), Some(0x200 | b'x' as u16));
        assert_eq!(set_char(&buffer, 2, 0, 'x'), Err(BufferError::OutOfRange));
        assert_eq!(set_char(&buffer, 0, 16, 'x'), Err(BufferError::OutOfRange));
    }

    #[test]
    fn test_non_ascii_replaced() {
        let buffer = oled_buffer();
        set_line(&buffer, 0, "°C").unwrap();
        assert_eq!(&line_text(&buffer, 0).unwrap()[..2], "?C");
    }

    struct Recorder(Vec<u16, 40>);

    impl WordSink for Recorder {
        type Error = ();

        fn write_word(&mut self, word: u16) -> Result<(), ()> {
            self.0.push(word).map_err(|_| ())
        }
    }

    #[test]
    fn test_write_line_direct() {
        let mut sink = Recorder(Vec::new());
        write_line_direct(&mut sink, 1, "Hi").unwrap();
        assert_eq!(sink.0.as_slice(), &[0x0C0, 0x248, 0x269]);
    }

    #[test]
    fn test_write_buffer_direct_sends_banner() {
        let buffer = oled_buffer();
        set_line(&buffer, 0, "keymux").unwrap();
        set_line(&buffer, 1, "Press a key").unwrap();

        let mut sink = Recorder(Vec::new());
        write_buffer_direct(&mut sink, &buffer).unwrap();

        assert_eq!(sink.0.as_slice(), &buffer.snapshot()[..]);
        assert_eq!(sink.0[0], 0x002);
        assert_eq!(sink.0[1], 0x200 | b'k' as u16);
        assert_eq!(sink.0[17], 0x0C0);
    }
}
