//! Column scanning
//!
//! [`KeypadScanner::tick`] is meant to be called from a fixed-rate,
//! non-reentrant context (1 kHz by default). Each tick samples the rows of
//! the column energized by the *previous* tick, so every column gets one
//! full tick period to settle before it is read.

use super::{Column, Debouncer, EventSink};
use crate::traits::KeypadMatrix;

/// Errors raised while scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanError<E> {
    /// Failed to energize a column
    Drive(E),
    /// Failed to sample the rows
    Sense(E),
}

/// Drives the keypad matrix and feeds samples to the debouncer
pub struct KeypadScanner<K> {
    matrix: K,
    debouncer: Debouncer,
    /// Column the hardware is energizing
    column: Column,
    /// False until `column` is known to be driven
    driven: bool,
    ticks: u32,
}

impl<K: KeypadMatrix> KeypadScanner<K> {
    /// Take over the matrix and energize the first column
    ///
    /// Fails if the first column can't be driven, so a scanner never
    /// exists without a configured column.
    pub fn new(mut matrix: K, debouncer: Debouncer) -> Result<Self, ScanError<K::Error>> {
        matrix
            .drive_column(Column::FIRST)
            .map_err(ScanError::Drive)?;

        Ok(Self {
            matrix,
            debouncer,
            column: Column::FIRST,
            driven: true,
            ticks: 0,
        })
    }

    /// Run one scan step
    ///
    /// Samples the active column, pushes any debounced transitions to
    /// `sink`, then energizes the next column. Returns the number of events
    /// emitted.
    ///
    /// If the previous tick failed to drive its column, this tick only
    /// retries the drive: a column that was never energized has no valid
    /// samples to debounce.
    pub fn tick<S: EventSink + ?Sized>(&mut self, sink: &S) -> Result<usize, ScanError<K::Error>> {
        self.ticks = self.ticks.wrapping_add(1);

        if !self.driven {
            self.matrix
                .drive_column(self.column)
                .map_err(ScanError::Drive)?;
            self.driven = true;
            return Ok(0);
        }

        let rows = self.matrix.read_rows().map_err(ScanError::Sense)?;
        let emitted = self
            .debouncer
            .on_tick(self.column, rows, |event| sink.push(event));

        self.column = self.column.next();
        self.driven = false;
        self.matrix
            .drive_column(self.column)
            .map_err(ScanError::Drive)?;
        self.driven = true;

        Ok(emitted)
    }

    /// Column that will be sampled on the next tick
    pub fn column(&self) -> Column {
        self.column
    }

    /// Total ticks run (wraps)
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Debounce state, for diagnostics
    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Get access to the underlying matrix
    pub fn matrix(&self) -> &K {
        &self.matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypad::{Direction, EventQueue, Key, RowSample};
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use heapless::Vec;

    /// Simulated keypad: a set of closed switches and a log of driven columns
    struct MockMatrix {
        /// Pressed keys, one row mask per column
        closed: [u8; 4],
        driven: Option<Column>,
        log: Vec<u8, 64>,
        fail_drive: bool,
        fail_sense: bool,
    }

    impl MockMatrix {
        fn new() -> Self {
            Self {
                closed: [0; 4],
                driven: None,
                log: Vec::new(),
                fail_drive: false,
                fail_sense: false,
            }
        }
    }

    impl KeypadMatrix for MockMatrix {
        type Error = ();

        fn drive_column(&mut self, column: Column) -> Result<(), ()> {
            if self.fail_drive {
                return Err(());
            }
            self.driven = Some(column);
            let _ = self.log.push(column.index());
            Ok(())
        }

        fn read_rows(&mut self) -> Result<RowSample, ()> {
            if self.fail_sense {
                return Err(());
            }
            let col = self.driven.ok_or(())?;
            Ok(RowSample::from_bits(self.closed[col.index() as usize]))
        }
    }

    type Queue = EventQueue<CriticalSectionRawMutex, 16>;

    #[test]
    fn test_new_drives_first_column() {
        let scanner = KeypadScanner::new(MockMatrix::new(), Debouncer::new(3)).unwrap();
        assert_eq!(scanner.column(), Column::FIRST);
        assert_eq!(scanner.matrix().log.as_slice(), &[0]);
    }

    #[test]
    fn test_new_fails_without_column() {
        let mut matrix = MockMatrix::new();
        matrix.fail_drive = true;
        assert!(matches!(
            KeypadScanner::new(matrix, Debouncer::new(3)),
            Err(ScanError::Drive(()))
        ));
    }

    #[test]
    fn test_column_cycles_once_per_tick() {
        let queue = Queue::new();
        let mut scanner = KeypadScanner::new(MockMatrix::new(), Debouncer::new(3)).unwrap();

        for _ in 0..8 {
            scanner.tick(&queue).unwrap();
        }
        assert_eq!(
            scanner.matrix().log.as_slice(),
            &[0, 1, 2, 3, 0, 1, 2, 3, 0]
        );
        assert_eq!(scanner.ticks(), 8);
    }

    #[test]
    fn test_press_and_release_scenario() {
        let queue = Queue::new();
        let mut matrix = MockMatrix::new();
        // Key at column 2, row 1
        matrix.closed[2] = 0b0010;
        let mut scanner = KeypadScanner::new(matrix, Debouncer::new(3)).unwrap();

        // Two full cycles: key history has two samples, no event yet
        for _ in 0..8 {
            scanner.tick(&queue).unwrap();
        }
        assert!(queue.is_empty());

        // Third cycle reaches the depth
        for _ in 0..4 {
            scanner.tick(&queue).unwrap();
        }
        let press = queue.try_pop().unwrap();
        assert_eq!(press.direction, Direction::Pressed);
        assert_eq!(press.key, Key::new(Column::new(2).unwrap(), 1).unwrap());
        assert_eq!(press.key.symbol(), '8');

        // Release: three more cycles with the switch open
        scanner.matrix.closed[2] = 0;
        for _ in 0..8 {
            scanner.tick(&queue).unwrap();
        }
        assert!(queue.is_empty());
        for _ in 0..4 {
            scanner.tick(&queue).unwrap();
        }
        let release = queue.try_pop().unwrap();
        assert_eq!(release.direction, Direction::Released);
        assert_eq!(release.key, press.key);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_failed_read_leaves_history_untouched() {
        let queue = Queue::new();
        let mut matrix = MockMatrix::new();
        matrix.closed[0] = 0b0001;
        let mut scanner = KeypadScanner::new(matrix, Debouncer::new(1)).unwrap();

        scanner.matrix.fail_sense = true;
        assert_eq!(scanner.tick(&queue), Err(ScanError::Sense(())));
        assert_eq!(scanner.column(), Column::FIRST);
        assert!(queue.is_empty());

        scanner.matrix.fail_sense = false;
        assert_eq!(scanner.tick(&queue), Ok(1));
    }

    #[test]
    fn test_failed_drive_skips_next_sample() {
        let queue = Queue::new();
        let mut matrix = MockMatrix::new();
        matrix.closed[1] = 0b0001;
        let mut scanner = KeypadScanner::new(matrix, Debouncer::new(1)).unwrap();

        scanner.matrix.fail_drive = true;
        assert_eq!(scanner.tick(&queue), Err(ScanError::Drive(())));

        // The retry only drives column 1, it does not sample it
        scanner.matrix.fail_drive = false;
        assert_eq!(scanner.tick(&queue), Ok(0));
        assert_eq!(scanner.column().index(), 1);

        assert_eq!(scanner.tick(&queue), Ok(1));
    }
}
