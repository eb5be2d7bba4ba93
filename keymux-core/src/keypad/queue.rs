//! Key event queue shared between the scan context and the application
//!
//! The scan tick is the only producer and the application is the only
//! consumer. Both sides touch the deque inside a short critical section,
//! and a [`Signal`] wakes a reader that is waiting on an empty queue.
//!
//! # Overflow
//!
//! Pushing never blocks. When the queue is full the **oldest** event is
//! discarded to make room, so a reader that falls behind always sees the
//! most recent activity. Discards are counted in [`EventQueue::dropped`].

use core::cell::RefCell;
use core::future::Future;
use core::pin::pin;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use heapless::Deque;

use super::{Key, KeyEvent};

/// Destination for debounced events
pub trait EventSink {
    /// Accept an event without blocking
    fn push(&self, event: KeyEvent);
}

struct Inner<const N: usize> {
    events: Deque<KeyEvent, N>,
    dropped: u32,
}

/// Bounded FIFO of key events with blocking readers
pub struct EventQueue<M: RawMutex, const N: usize> {
    inner: Mutex<M, RefCell<Inner<N>>>,
    ready: Signal<M, ()>,
}

impl<M: RawMutex, const N: usize> EventQueue<M, N> {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                events: Deque::new(),
                dropped: 0,
            })),
            ready: Signal::new(),
        }
    }

    /// Queue capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of events waiting
    pub fn len(&self) -> usize {
        self.inner.lock(|inner| inner.borrow().events.len())
    }

    /// Check if no events are waiting
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of events discarded because the queue was full
    pub fn dropped(&self) -> u32 {
        self.inner.lock(|inner| inner.borrow().dropped)
    }

    /// Append an event, discarding the oldest one if the queue is full
    ///
    /// Returns the discarded event, if any.
    pub fn push_evicting(&self, event: KeyEvent) -> Option<KeyEvent> {
        let evicted = self.inner.lock(|inner| {
            let mut inner = inner.borrow_mut();
            let evicted = if inner.events.is_full() {
                inner.dropped = inner.dropped.wrapping_add(1);
                inner.events.pop_front()
            } else {
                None
            };
            inner.events.push_back(event).ok();
            evicted
        });

        self.ready.signal(());
        evicted
    }

    /// Dequeue the oldest event without waiting
    pub fn try_pop(&self) -> Option<KeyEvent> {
        self.inner
            .lock(|inner| inner.borrow_mut().events.pop_front())
    }

    /// Wait for the next event and dequeue it
    pub async fn wait_for_event(&self) -> KeyEvent {
        loop {
            if let Some(event) = self.try_pop() {
                return event;
            }
            self.ready.wait().await;
        }
    }

    /// Wait for the next press, discarding releases
    pub async fn wait_for_press(&self) -> Key {
        loop {
            let event = self.wait_for_event().await;
            if event.is_press() {
                return event.key;
            }
        }
    }

    /// Like [`wait_for_event`](Self::wait_for_event), but gives up when
    /// `cancel` completes first
    ///
    /// Pass a timer future to get a timeout. Returns `None` on cancellation;
    /// no event is consumed in that case.
    pub async fn wait_for_event_or<F: Future>(&self, cancel: F) -> Option<KeyEvent> {
        match select(self.wait_for_event(), cancel).await {
            Either::First(event) => Some(event),
            Either::Second(_) => None,
        }
    }

    /// Like [`wait_for_press`](Self::wait_for_press), but gives up when
    /// `cancel` completes first
    pub async fn wait_for_press_or<F: Future>(&self, cancel: F) -> Option<Key> {
        let mut cancel = pin!(cancel);
        loop {
            let event = self.wait_for_event_or(cancel.as_mut()).await?;
            if event.is_press() {
                return Some(event.key);
            }
        }
    }

    /// Discard all waiting events
    pub fn clear(&self) {
        self.inner.lock(|inner| inner.borrow_mut().events.clear());
        self.ready.reset();
    }
}

impl<M: RawMutex, const N: usize> Default for EventQueue<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const N: usize> EventSink for EventQueue<M, N> {
    fn push(&self, event: KeyEvent) {
        self.push_evicting(event);
    }
}
