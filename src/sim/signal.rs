// Copyright (c) 2017-2021 Fabian Schuiki

//! Runtime signal wrappers.

use crate::{
    ir,
    value::{Bitmask, LogicValue},
};
use std::fmt;

/// A unique handle to a signal in a simulation.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct SignalRef(pub(crate) usize);

impl SignalRef {
    /// Create a new signal reference.
    pub fn new(id: usize) -> SignalRef {
        SignalRef(id)
    }

    /// Return the underlying index of this reference.
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl fmt::Debug for SignalRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// A signal in a simulation.
///
/// Wraps the signal's current value and, optionally, the IR signal value it
/// was instantiated from. Signals live exactly as long as the owning engine.
pub struct SimSignal {
    /// The IR value this signal was created from, if any.
    ir: Option<ir::Value>,
    /// The current value of the signal.
    value: LogicValue,
}

impl SimSignal {
    /// Create a new signal with the given initial value.
    pub fn new(value: LogicValue) -> SimSignal {
        SimSignal { ir: None, value }
    }

    /// Create a new signal bound to an IR signal value.
    pub fn with_ir(ir: ir::Value, value: LogicValue) -> SimSignal {
        SimSignal {
            ir: Some(ir),
            value,
        }
    }

    /// Get the IR value this signal was created from, if any.
    pub fn ir(&self) -> Option<ir::Value> {
        self.ir
    }

    /// Bind the signal to an IR signal value.
    pub fn bind_ir(&mut self, ir: ir::Value) {
        self.ir = Some(ir);
    }

    /// Get the width of the signal.
    pub fn width(&self) -> usize {
        self.value.width()
    }

    /// Get the signal's current value.
    pub fn value(&self) -> &LogicValue {
        &self.value
    }

    /// Write the masked lanes of `value` into the signal.
    ///
    /// Only lanes whose mask bit is set are written. Returns whether any lane
    /// actually changed.
    pub fn set_masked(&mut self, value: &LogicValue, mask: &Bitmask) -> bool {
        assert_eq!(self.value.width(), value.width());
        assert_eq!(self.value.width(), mask.width());
        let mut changed = false;
        for lane in 0..self.value.width() {
            if mask.get(lane) && self.value.get(lane) != value.get(lane) {
                self.value.set(lane, value.get(lane));
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masked_write() {
        let mut sig = SimSignal::new(LogicValue::from_str("UUUU"));
        let changed = sig.set_masked(
            &LogicValue::from_str("1100"),
            &Bitmask::from_bits(4, 0b0110),
        );
        assert!(changed);
        assert_eq!(format!("{}", sig.value()), "U10U");
        // Writing the same lanes again changes nothing.
        let changed = sig.set_masked(
            &LogicValue::from_str("1100"),
            &Bitmask::from_bits(4, 0b0110),
        );
        assert!(!changed);
    }
}
