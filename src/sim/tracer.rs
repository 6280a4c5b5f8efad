// Copyright (c) 2017-2021 Fabian Schuiki

//! Simulation observers.
//!
//! The engine reports signal changes through the `Tracer` trait, once per
//! changed observed signal per delta step. Waveform sinks such as a VCD
//! writer implement this trait; this module provides the trait itself and two
//! simple sinks.

use crate::sim::{Engine, SignalRef, SimTime};
use crate::value::LogicValue;
use std::collections::HashSet;

/// A simulation observer.
pub trait Tracer {
    /// Called once at the beginning of the simulation.
    fn init(&mut self, engine: &Engine);

    /// Called by the engine after each delta step, with the set of observed
    /// signals that changed in the step.
    fn step(&mut self, engine: &Engine, changed: &HashSet<SignalRef>);

    /// Called once at the end of the simulation.
    fn finish(&mut self, engine: &Engine);
}

/// A null tracer that does nothing.
pub struct NullTracer;

impl Tracer for NullTracer {
    fn init(&mut self, _: &Engine) {}
    fn step(&mut self, _: &Engine, _: &HashSet<SignalRef>) {}
    fn finish(&mut self, _: &Engine) {}
}

/// A tracer that writes one line per signal change to a sink.
///
/// Lines have the form `<time> <name> <value>`, with changed signals ordered
/// by their reference so the output is deterministic.
pub struct DumpTracer<T> {
    sink: T,
}

impl<T: std::io::Write> DumpTracer<T> {
    /// Create a new dump tracer which will write to `sink`.
    pub fn new(sink: T) -> Self {
        DumpTracer { sink }
    }

    fn dump(&mut self, engine: &Engine, changed: &HashSet<SignalRef>) {
        let mut changed: Vec<_> = changed.iter().cloned().collect();
        changed.sort();
        for sig in changed {
            let name = engine
                .probes_of(sig)
                .first()
                .cloned()
                .unwrap_or_else(|| format!("{:?}", sig));
            writeln!(
                self.sink,
                "{} {} {}",
                engine.time(),
                name,
                engine.signal(sig).value()
            )
            .expect("writing trace failed");
        }
    }
}

impl<T: std::io::Write> Tracer for DumpTracer<T> {
    fn init(&mut self, engine: &Engine) {
        let all: HashSet<_> = engine.observed().iter().cloned().collect();
        self.dump(engine, &all);
    }

    fn step(&mut self, engine: &Engine, changed: &HashSet<SignalRef>) {
        self.dump(engine, changed);
    }

    fn finish(&mut self, _: &Engine) {}
}

/// A tracer that records every reported change.
///
/// Useful in tests to assert on the exact sequence of observer callbacks.
#[derive(Default)]
pub struct CollectTracer {
    records: Vec<(SimTime, SignalRef, LogicValue)>,
}

impl CollectTracer {
    /// Create a new collecting tracer.
    pub fn new() -> Self {
        Default::default()
    }

    /// Get the recorded changes.
    pub fn records(&self) -> &[(SimTime, SignalRef, LogicValue)] {
        &self.records
    }
}

impl Tracer for CollectTracer {
    fn init(&mut self, _: &Engine) {}

    fn step(&mut self, engine: &Engine, changed: &HashSet<SignalRef>) {
        let mut changed: Vec<_> = changed.iter().cloned().collect();
        changed.sort();
        for sig in changed {
            self.records
                .push((engine.time(), sig, engine.signal(sig).value().clone()));
        }
    }

    fn finish(&mut self, _: &Engine) {}
}
