// Copyright (c) 2017-2021 Fabian Schuiki

//! The future event queue.
//!
//! This module implements the queue of pending signal changes. Events carry a
//! target signal, a new value, and a bit mask selecting the driven lanes.
//! Newly produced events are staged and only become visible to `pop_events`
//! after a `commit`, which coalesces overlapping drives such that every lane
//! of a target is covered at most once per time step, with the last-added
//! event winning.

use crate::{
    sim::{SignalRef, SimTime},
    value::{Bitmask, LogicValue},
};
use log::trace;
use std::collections::HashMap;

/// A pending change of a signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// The time at which the change takes effect.
    pub time: SimTime,
    /// The changed signal.
    pub signal: SignalRef,
    /// The value the driven lanes take.
    pub value: LogicValue,
    /// The driven lanes. An event with an all-zero mask is cancelled.
    pub mask: Bitmask,
}

impl Event {
    /// Create a new event driving all lanes of a signal.
    pub fn new(time: SimTime, signal: SignalRef, value: LogicValue) -> Event {
        let mask = Bitmask::ones(value.width());
        Event {
            time,
            signal,
            value,
            mask,
        }
    }

    /// Create a new event driving the masked lanes of a signal.
    pub fn new_masked(time: SimTime, signal: SignalRef, value: LogicValue, mask: Bitmask) -> Event {
        assert_eq!(
            value.width(),
            mask.width(),
            "event value and mask widths must match"
        );
        Event {
            time,
            signal,
            value,
            mask,
        }
    }

    /// Check whether the event has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.mask.is_all_zero()
    }
}

/// A queue of pending events.
///
/// The queue consists of a committed, time-ordered list of events and a
/// staging list of added events not yet visible to `pop_events`.
#[derive(Default)]
pub struct EventQueue {
    /// The committed events, in time order.
    events: Vec<Event>,
    /// The staged events added since the last commit.
    staged: Vec<Event>,
}

impl EventQueue {
    /// Create a new event queue.
    pub fn new() -> Self {
        Default::default()
    }

    /// Stage an event.
    ///
    /// Every already-staged event for the same target at the same or a later
    /// time loses the lanes the new event drives. This makes the last added
    /// event win for overlapping lanes.
    pub fn add(&mut self, event: Event) {
        trace!(
            "stage {:?} <- {} mask {} [@ {}]",
            event.signal,
            event.value,
            event.mask,
            event.time
        );
        for staged in &mut self.staged {
            if staged.signal == event.signal && staged.time >= event.time {
                staged.mask.subtract(&event.mask);
            }
        }
        self.staged.push(event);
    }

    /// Stage a collection of events.
    pub fn add_all(&mut self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.add(event);
        }
    }

    /// Merge the staged events into the committed list.
    ///
    /// Staged events override the lanes of committed events for the same
    /// target at the same or a later time. Cancelled events are dropped and
    /// the committed list is restored to time order. Afterwards no two
    /// committed events for the same `(time, target)` drive overlapping
    /// lanes.
    pub fn commit(&mut self) {
        if self.staged.is_empty() {
            return;
        }
        // Cancelled events sort last, the rest by time.
        self.staged
            .sort_by_key(|e| (e.mask.is_all_zero(), e.time));

        // Sweep the committed list in time order, accumulating the staged
        // masks per target up to each event's time and clearing the lanes
        // they override.
        let mut seen: HashMap<SignalRef, Bitmask> = HashMap::new();
        let mut ai = 0;
        for event in &mut self.events {
            while ai < self.staged.len() && self.staged[ai].time <= event.time {
                let staged = &self.staged[ai];
                seen.entry(staged.signal)
                    .and_modify(|m| m.union(&staged.mask))
                    .or_insert_with(|| staged.mask.clone());
                ai += 1;
            }
            if let Some(mask) = seen.get(&event.signal) {
                event.mask.subtract(mask);
            }
        }

        self.events.append(&mut self.staged);
        self.events.retain(|e| !e.is_cancelled());
        self.events.sort_by_key(|e| e.time);
    }

    /// Extract all events sharing the smallest time.
    ///
    /// The caller processes the returned events as one delta step.
    pub fn pop_events(&mut self) -> Vec<Event> {
        let first_time = match self.events.first() {
            Some(event) => event.time,
            None => return vec![],
        };
        let end = self
            .events
            .iter()
            .position(|e| e.time != first_time)
            .unwrap_or_else(|| self.events.len());
        self.events.drain(0..end).collect()
    }

    /// Check whether the committed list is empty.
    ///
    /// Staged events do not count until they are committed.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get the time of the earliest committed event.
    pub fn next_time(&self) -> Option<SimTime> {
        self.events.first().map(|e| e.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(ps: u64, signal: usize, value: &str, mask: u64) -> Event {
        let value = LogicValue::from_str(value);
        let mask = Bitmask::from_bits(value.width(), mask);
        Event::new_masked(SimTime::new(ps, 0), SignalRef::new(signal), value, mask)
    }

    #[test]
    fn staged_last_writer_wins() {
        let mut eq = EventQueue::new();
        eq.add(ev(10, 0, "1100", 0b1100));
        eq.add(ev(10, 0, "0010", 0b0110));
        eq.commit();
        let events = eq.pop_events();
        assert_eq!(events.len(), 2);
        // The earlier event lost the lanes the later one drives.
        assert_eq!(events[0].mask, Bitmask::from_bits(4, 0b1000));
        assert_eq!(events[1].mask, Bitmask::from_bits(4, 0b0110));
    }

    #[test]
    fn staged_overrides_committed() {
        let mut eq = EventQueue::new();
        eq.add(ev(10, 0, "1111", 0b1111));
        eq.commit();
        eq.add(ev(5, 0, "0000", 0b0011));
        eq.commit();
        let first = eq.pop_events();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].time, SimTime::new(5, 0));
        let second = eq.pop_events();
        assert_eq!(second.len(), 1);
        // The committed event at t=10 lost the lanes rescheduled at t=5.
        assert_eq!(second[0].mask, Bitmask::from_bits(4, 0b1100));
    }

    #[test]
    fn cancelled_events_are_dropped() {
        let mut eq = EventQueue::new();
        eq.add(ev(10, 0, "1100", 0b1100));
        eq.add(ev(10, 0, "1100", 0b1100));
        eq.commit();
        let events = eq.pop_events();
        // The first event was fully overwritten and dropped.
        assert_eq!(events.len(), 1);
        assert!(eq.is_empty());
    }

    #[test]
    fn pop_returns_one_time_slice() {
        let mut eq = EventQueue::new();
        eq.add(ev(20, 0, "1", 0b1));
        eq.add(ev(10, 1, "1", 0b1));
        eq.add(ev(10, 2, "0", 0b1));
        eq.commit();
        assert_eq!(eq.next_time(), Some(SimTime::new(10, 0)));
        assert_eq!(eq.pop_events().len(), 2);
        assert_eq!(eq.pop_events().len(), 1);
        assert!(eq.pop_events().is_empty());
    }
}
