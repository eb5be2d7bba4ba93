//! Property tests for debouncing and the event readers

use embassy_futures::block_on;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use keymux_core::keypad::{
    Column, Debouncer, Direction, EventQueue, EventSink, Key, KeyEvent, RowSample,
};
use proptest::prelude::*;

/// Feed one key's samples (row 0 of column 0) and collect (tick, direction)
fn run(depth: u8, samples: &[bool]) -> Vec<(usize, Direction)> {
    let mut debouncer = Debouncer::new(depth);
    let mut events = Vec::new();
    for (tick, &pressed) in samples.iter().enumerate() {
        let rows = RowSample::from_bits(pressed as u8);
        debouncer.on_tick(Column::FIRST, rows, |e| events.push((tick, e.direction)));
    }
    events
}

proptest! {
    #[test]
    fn events_require_depth_consistent_samples(
        depth in 1u8..=8,
        samples in proptest::collection::vec(any::<bool>(), 0..200),
    ) {
        let depth_usize = depth as usize;
        for (tick, direction) in run(depth, &samples) {
            prop_assert!(tick + 1 >= depth_usize);
            let window = &samples[tick + 1 - depth_usize..=tick];
            let expected = direction == Direction::Pressed;
            prop_assert!(window.iter().all(|&s| s == expected));
        }
    }

    #[test]
    fn events_alternate_starting_with_press(
        depth in 1u8..=8,
        samples in proptest::collection::vec(any::<bool>(), 0..200),
    ) {
        let events = run(depth, &samples);
        for (i, (_, direction)) in events.iter().enumerate() {
            let expected = if i % 2 == 0 { Direction::Pressed } else { Direction::Released };
            prop_assert_eq!(*direction, expected);
        }
    }

    #[test]
    fn stable_runs_are_never_missed(
        depth in 1u8..=8,
        runs in proptest::collection::vec((any::<bool>(), 8usize..16), 1..10),
    ) {
        // Every run is at least as long as the deepest history, so each
        // change of level must be reported exactly once.
        let mut samples = Vec::new();
        for &(level, len) in &runs {
            samples.extend(core::iter::repeat(level).take(len));
        }

        let mut expected = Vec::new();
        let mut state = false;
        for &(level, _) in &runs {
            if level != state {
                expected.push(if level { Direction::Pressed } else { Direction::Released });
                state = level;
            }
        }

        let got: Vec<Direction> = run(depth, &samples).into_iter().map(|(_, d)| d).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn wait_for_press_never_returns_a_release(
        stream in proptest::collection::vec((0u8..4, any::<bool>()), 0..16),
    ) {
        let queue: EventQueue<CriticalSectionRawMutex, 16> = EventQueue::new();
        let mut presses = Vec::new();

        for (sequence, &(row, pressed)) in stream.iter().enumerate() {
            let key = Key::new(Column::FIRST, row).unwrap();
            let direction = if pressed { Direction::Pressed } else { Direction::Released };
            queue.push(KeyEvent { key, direction, sequence: sequence as u32 });
            if pressed {
                presses.push(key);
            }
        }

        for expected in presses {
            prop_assert_eq!(block_on(queue.wait_for_press()), expected);
        }
        // Only releases can be left behind
        while let Some(event) = queue.try_pop() {
            prop_assert!(event.is_release());
        }
    }
}
