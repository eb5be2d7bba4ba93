//! Numeric entry from the keypad
//!
//! Keys are interpreted as:
//!
//! | key | meaning |
//! |-----|---------|
//! | `0`-`9` | digit |
//! | `*` | decimal point |
//! | `B` | minus sign (first position only) |
//! | `C` | delete last character |
//! | `D` | clear entry |
//! | `#` | finish |
//!
//! Anything else is ignored. The accumulated text is validated and parsed
//! only when `#` is pressed.
//!
//! Values are `f64`: every literal of up to 15 characters holds at most 15
//! significant digits, which `f64` represents without changing them.

use core::fmt::Write;
use core::future::Future;
use core::pin::pin;

use embassy_sync::blocking_mutex::raw::RawMutex;
use heapless::String;

use super::EventQueue;

/// Longest accepted entry, in characters
pub const MAX_ENTRY_LEN: usize = 15;

/// Key that completes an entry
pub const TERMINATOR: char = '#';

/// Reasons an entry could not be turned into a number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EntryError {
    /// Finished without any digits
    Empty,
    /// Minus sign anywhere but the first position
    MisplacedSign,
    /// More than one decimal point
    DuplicatePoint,
    /// More than [`MAX_ENTRY_LEN`] characters were typed
    TooLong,
    /// Text passed validation but is not a number
    Invalid,
    /// Waiting was cancelled before the terminator
    Cancelled,
}

/// Result of feeding one key to a [`NumericEntry`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryStep {
    /// Key has no meaning in numeric entry
    Ignored,
    /// Text changed; show it to the user
    Edited,
    /// Terminator seen; the entry has been reset
    Done(Result<f64, EntryError>),
}

/// Render an entered value in at most `N` characters
///
/// Returns `None` rather than a truncated number when it does not fit.
pub fn format_value<const N: usize>(value: f64) -> Option<String<N>> {
    let mut text = String::new();
    write!(text, "{}", value).ok()?;
    Some(text)
}

/// Accumulates keypad symbols into a floating-point literal
#[derive(Debug, Clone, Default)]
pub struct NumericEntry {
    text: String<MAX_ENTRY_LEN>,
    overflowed: bool,
}

impl NumericEntry {
    /// Create an empty entry
    pub const fn new() -> Self {
        Self {
            text: String::new(),
            overflowed: false,
        }
    }

    /// Text typed so far
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Feed the symbol of a pressed key
    pub fn feed(&mut self, symbol: char) -> EntryStep {
        let ch = match symbol {
            '0'..='9' => symbol,
            '*' => '.',
            'B' => '-',
            'C' => {
                self.text.pop();
                self.overflowed = false;
                return EntryStep::Edited;
            }
            'D' => {
                self.reset();
                return EntryStep::Edited;
            }
            TERMINATOR => {
                let result = self.parse();
                self.reset();
                return EntryStep::Done(result);
            }
            _ => return EntryStep::Ignored,
        };

        if self.text.push(ch).is_err() {
            self.overflowed = true;
            return EntryStep::Ignored;
        }
        EntryStep::Edited
    }

    /// Validate and parse the current text
    pub fn parse(&self) -> Result<f64, EntryError> {
        if self.overflowed {
            return Err(EntryError::TooLong);
        }

        let text = self.text.as_str();
        if text.char_indices().any(|(i, c)| c == '-' && i != 0) {
            return Err(EntryError::MisplacedSign);
        }
        if text.matches('.').count() > 1 {
            return Err(EntryError::DuplicatePoint);
        }
        if !text.chars().any(|c| c.is_ascii_digit()) {
            return Err(EntryError::Empty);
        }

        text.parse::<f64>().map_err(|_| EntryError::Invalid)
    }

    /// Discard everything typed
    pub fn reset(&mut self) {
        self.text.clear();
        self.overflowed = false;
    }
}

/// Read a number from the keypad
///
/// Waits for presses on `queue`, translating keys through `keymap`.
/// `on_edit` receives the current text after every edit, for echoing.
pub async fn read_float<M: RawMutex, const N: usize>(
    queue: &EventQueue<M, N>,
    keymap: &str,
    on_edit: impl FnMut(&str),
) -> Result<f64, EntryError> {
    read_float_or(queue, keymap, core::future::pending::<()>(), on_edit).await
}

/// Like [`read_float`], but returns [`EntryError::Cancelled`] once `cancel`
/// completes
pub async fn read_float_or<M: RawMutex, const N: usize, F: Future>(
    queue: &EventQueue<M, N>,
    keymap: &str,
    cancel: F,
    mut on_edit: impl FnMut(&str),
) -> Result<f64, EntryError> {
    let mut cancel = pin!(cancel);
    let mut entry = NumericEntry::new();

    loop {
        let key = queue
            .wait_for_press_or(cancel.as_mut())
            .await
            .ok_or(EntryError::Cancelled)?;

        match entry.feed(key.symbol_in(keymap)) {
            EntryStep::Ignored => {}
            EntryStep::Edited => on_edit(entry.text()),
            EntryStep::Done(result) => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_KEYMAP;
    use crate::keypad::{Column, Direction, EventSink, Key, KeyEvent};
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    fn type_keys(entry: &mut NumericEntry, keys: &str) -> EntryStep {
        let mut last = EntryStep::Ignored;
        for c in keys.chars() {
            last = entry.feed(c);
        }
        last
    }

    fn key_for(symbol: char) -> Key {
        let index = DEFAULT_KEYMAP.find(symbol).unwrap();
        Key::new(Column::new((index / 4) as u8).unwrap(), (index % 4) as u8).unwrap()
    }

    #[test]
    fn test_integer() {
        let mut entry = NumericEntry::new();
        assert_eq!(type_keys(&mut entry, "42#"), EntryStep::Done(Ok(42.0)));
        assert_eq!(entry.text(), "");
    }

    #[test]
    fn test_decimal_and_sign() {
        let mut entry = NumericEntry::new();
        assert_eq!(type_keys(&mut entry, "B3*25#"), EntryStep::Done(Ok(-3.25)));
        assert_eq!(type_keys(&mut entry, "*5#"), EntryStep::Done(Ok(0.5)));
    }

    #[test]
    fn test_edit_keys() {
        let mut entry = NumericEntry::new();
        type_keys(&mut entry, "129C");
        assert_eq!(entry.text(), "12");
        type_keys(&mut entry, "D7");
        assert_eq!(entry.text(), "7");
        assert_eq!(entry.feed('A'), EntryStep::Ignored);
        assert_eq!(entry.feed('#'), EntryStep::Done(Ok(7.0)));
    }

    #[test]
    fn test_malformed_entries() {
        let mut entry = NumericEntry::new();
        assert_eq!(type_keys(&mut entry, "#"), EntryStep::Done(Err(EntryError::Empty)));
        assert_eq!(type_keys(&mut entry, "B*#"), EntryStep::Done(Err(EntryError::Empty)));
        assert_eq!(
            type_keys(&mut entry, "1B#"),
            EntryStep::Done(Err(EntryError::MisplacedSign))
        );
        assert_eq!(
            type_keys(&mut entry, "1*2*3#"),
            EntryStep::Done(Err(EntryError::DuplicatePoint))
        );
        assert_eq!(
            type_keys(&mut entry, "1234567890123456#"),
            EntryStep::Done(Err(EntryError::TooLong))
        );
    }

    #[test]
    fn test_longest_entry_keeps_every_digit() {
        let mut entry = NumericEntry::new();
        let step = type_keys(&mut entry, "999999999999999#");
        assert_eq!(step, EntryStep::Done(Ok(999_999_999_999_999.0)));

        let EntryStep::Done(Ok(value)) = step else {
            unreachable!();
        };
        let text = format_value::<16>(value).unwrap();
        assert_eq!(text.as_str(), "999999999999999");
    }

    #[test]
    fn test_format_value_fits_display_line() {
        let mut entry = NumericEntry::new();
        for keys in ["B*00000000001#", "*0000000000001#", "B12345678901234#", "5*#"] {
            let EntryStep::Done(Ok(value)) = type_keys(&mut entry, keys) else {
                panic!("{} did not parse", keys);
            };
            let text = format_value::<16>(value).unwrap();
            assert!(text.len() <= 16, "{} rendered as {}", keys, text);
        }
        assert_eq!(format_value::<16>(-0.00000000001).unwrap().as_str(), "-0.00000000001");
        assert_eq!(format_value::<16>(5.0).unwrap().as_str(), "5");
    }

    #[test]
    fn test_format_value_never_truncates() {
        assert_eq!(format_value::<4>(12345.0), None);
        assert_eq!(format_value::<5>(12345.0).unwrap().as_str(), "12345");
    }

    #[test]
    fn test_read_float_from_queue() {
        let queue: EventQueue<CriticalSectionRawMutex, 16> = EventQueue::new();
        let mut sequence = 0;
        for symbol in ['1', '*', '5', '#'] {
            for direction in [Direction::Pressed, Direction::Released] {
                queue.push(KeyEvent {
                    key: key_for(symbol),
                    direction,
                    sequence,
                });
                sequence += 1;
            }
        }

        let mut echoes = 0;
        let value = block_on(read_float(&queue, DEFAULT_KEYMAP, |_| echoes += 1));
        assert_eq!(value, Ok(1.5));
        assert_eq!(echoes, 3);
    }

    #[test]
    fn test_read_float_cancelled() {
        let queue: EventQueue<CriticalSectionRawMutex, 4> = EventQueue::new();
        let result = block_on(read_float_or(
            &queue,
            DEFAULT_KEYMAP,
            core::future::ready(()),
            |_| {},
        ));
        assert_eq!(result, Err(EntryError::Cancelled));
    }
}
