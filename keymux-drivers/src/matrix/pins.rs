//! Keypad matrix on plain GPIO
//!
//! Columns are outputs, rows are inputs. With the usual active-low wiring
//! the columns are open-drain and the rows have pull-ups: the energized
//! column is pulled low and any closed switch drags its row low with it.

use embedded_hal::digital::{InputPin, OutputPin};
use keymux_core::config::RowPolarity;
use keymux_core::keypad::{Column, RowSample, NUM_COLS, NUM_ROWS};
use keymux_core::traits::KeypadMatrix;

use crate::PinError;

/// 4×4 keypad wired straight to GPIO
pub struct PinMatrix<C, R> {
    columns: [C; NUM_COLS],
    rows: [R; NUM_ROWS],
    polarity: RowPolarity,
}

impl<C: OutputPin, R: InputPin> PinMatrix<C, R> {
    /// Create a matrix from column outputs and row inputs, in line order
    pub fn new(columns: [C; NUM_COLS], rows: [R; NUM_ROWS], polarity: RowPolarity) -> Self {
        Self {
            columns,
            rows,
            polarity,
        }
    }

    /// Row polarity in use
    pub fn polarity(&self) -> RowPolarity {
        self.polarity
    }

    fn set_column(&mut self, index: usize, energized: bool) -> Result<(), PinError> {
        // Active-low: energized = low; active-high: energized = high
        let high = energized == (self.polarity == RowPolarity::ActiveHigh);
        let pin = &mut self.columns[index];
        let result = if high { pin.set_high() } else { pin.set_low() };
        result.map_err(|_| PinError::Drive)
    }
}

impl<C: OutputPin, R: InputPin> KeypadMatrix for PinMatrix<C, R> {
    type Error = PinError;

    fn drive_column(&mut self, column: Column) -> Result<(), PinError> {
        let selected = column.index() as usize;

        // Release the others first so two columns are never energized together
        for index in (0..NUM_COLS).filter(|&i| i != selected) {
            self.set_column(index, false)?;
        }
        self.set_column(selected, true)
    }

    fn read_rows(&mut self) -> Result<RowSample, PinError> {
        let mut bits = 0u8;
        for (row, pin) in self.rows.iter_mut().enumerate() {
            let high = pin.is_high().map_err(|_| PinError::Sense)?;
            if self.polarity.is_contact(high) {
                bits |= 1 << row;
            }
        }
        Ok(RowSample::from_bits(bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    fn column_pins(expect: [PinState; 4]) -> [PinMock; 4] {
        expect.map(|state| PinMock::new(&[PinTransaction::set(state)]))
    }

    fn row_pins(levels: [PinState; 4]) -> [PinMock; 4] {
        levels.map(|state| PinMock::new(&[PinTransaction::get(state)]))
    }

    fn idle_rows() -> [PinMock; 4] {
        [(); 4].map(|_| PinMock::new(&[]))
    }

    fn finish(pins: &mut [PinMock]) {
        for pin in pins {
            pin.done();
        }
    }

    #[test]
    fn test_drive_column_active_low() {
        let mut cols = column_pins([PinState::High, PinState::Low, PinState::High, PinState::High]);
        let mut rows = idle_rows();
        let mut matrix = PinMatrix::new(cols.clone(), rows.clone(), RowPolarity::ActiveLow);

        matrix.drive_column(Column::new(1).unwrap()).unwrap();

        finish(&mut cols);
        finish(&mut rows);
    }

    #[test]
    fn test_drive_column_active_high() {
        let mut cols = column_pins([PinState::Low, PinState::Low, PinState::Low, PinState::High]);
        let mut rows = idle_rows();
        let mut matrix = PinMatrix::new(cols.clone(), rows.clone(), RowPolarity::ActiveHigh);

        matrix.drive_column(Column::new(3).unwrap()).unwrap();

        finish(&mut cols);
        finish(&mut rows);
    }

    #[test]
    fn test_read_rows_active_low() {
        let mut cols = [(); 4].map(|_| PinMock::new(&[]));
        let mut rows = row_pins([PinState::Low, PinState::High, PinState::Low, PinState::High]);
        let mut matrix = PinMatrix::new(cols.clone(), rows.clone(), RowPolarity::ActiveLow);

        assert_eq!(matrix.read_rows().unwrap().bits(), 0b0101);

        finish(&mut cols);
        finish(&mut rows);
    }

    #[test]
    fn test_read_rows_active_high() {
        let mut cols = [(); 4].map(|_| PinMock::new(&[]));
        let mut rows = row_pins([PinState::Low, PinState::High, PinState::Low, PinState::High]);
        let mut matrix = PinMatrix::new(cols.clone(), rows.clone(), RowPolarity::ActiveHigh);

        assert_eq!(matrix.read_rows().unwrap().bits(), 0b1010);

        finish(&mut cols);
        finish(&mut rows);
    }
}
