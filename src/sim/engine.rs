// Copyright (c) 2017-2021 Fabian Schuiki

//! Simulation execution engine
//!
//! The execution engine that advances the simulation step by step. One step
//! corresponds to one delta cycle: the earliest events are applied, observers
//! are notified, sensitive processes are woken and run, and freshly staged
//! events are committed.

use crate::{
    ir,
    sim::{
        Event, EventQueue, Process, ProcessRef, ProcessState, Program, SignalRef, SimSignal,
        SimTime, Tracer,
    },
    value::LogicValue,
};
use anyhow::{bail, Result};
use log::{debug, info, trace};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Configuration of a simulation engine.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// The watchdog limit on the number of delta steps.
    pub max_delta_steps: usize,
    /// Whether ready processes are stepped in parallel.
    pub parallelize: bool,
}

impl Default for SimConfig {
    fn default() -> SimConfig {
        SimConfig {
            max_delta_steps: 1_000_000,
            parallelize: false,
        }
    }
}

/// The outcome of a simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// The number of delta steps performed.
    pub steps: usize,
    /// The simulation time at termination.
    pub time: SimTime,
    /// Whether the watchdog limit terminated the run.
    pub watchdog_hit: bool,
}

/// A declarative assignment of one signal to another.
///
/// Whenever the source signal changes, the target is scheduled to take the
/// source's new value: at the next delta cycle for identity assignments, or
/// after a fixed delay.
struct Assignment {
    target: SignalRef,
    source: SignalRef,
    delay: Option<u64>,
}

/// A simulation engine.
///
/// The engine owns the signal table, the process set, and the event queue,
/// and advances the simulation one delta step at a time.
pub struct Engine {
    /// The current simulation time.
    time: SimTime,
    /// The signals in the simulation.
    signals: Vec<SimSignal>,
    /// The processes in the simulation.
    processes: Vec<Process>,
    /// The pending events.
    events: EventQueue,
    /// The signals reported to observers.
    observed: HashSet<SignalRef>,
    /// The names given to probed signals.
    probes: HashMap<SignalRef, Vec<String>>,
    /// The declarative signal assignments.
    assignments: Vec<Assignment>,
    /// The engine configuration.
    config: SimConfig,
}

impl Default for Engine {
    fn default() -> Engine {
        Engine::new()
    }
}

impl Engine {
    /// Create a new engine with the default configuration.
    pub fn new() -> Engine {
        Engine::with_config(Default::default())
    }

    /// Create a new engine with the given configuration.
    pub fn with_config(config: SimConfig) -> Engine {
        Engine {
            time: SimTime::ZERO,
            signals: vec![],
            processes: vec![],
            events: EventQueue::new(),
            observed: Default::default(),
            probes: Default::default(),
            assignments: vec![],
            config,
        }
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Add a signal with the given initial value.
    pub fn add_signal(&mut self, initial: LogicValue) -> SignalRef {
        let sig = SignalRef::new(self.signals.len());
        self.signals.push(SimSignal::new(initial));
        sig
    }

    /// Bind a signal to the IR signal value it simulates.
    pub fn bind_ir(&mut self, sig: SignalRef, ir: ir::Value) {
        self.signals[sig.as_usize()].bind_ir(ir);
    }

    /// Get a signal.
    pub fn signal(&self, sig: SignalRef) -> &SimSignal {
        &self.signals[sig.as_usize()]
    }

    /// Get all signals.
    pub fn signals(&self) -> &[SimSignal] {
        &self.signals
    }

    /// Give a signal a probe name and mark it as observed.
    pub fn probe(&mut self, sig: SignalRef, name: impl Into<String>) {
        self.probes.entry(sig).or_default().push(name.into());
        self.observed.insert(sig);
    }

    /// Get the probe names of a signal.
    pub fn probes_of(&self, sig: SignalRef) -> &[String] {
        self.probes.get(&sig).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mark a signal as observed.
    ///
    /// Observers are notified whenever an observed signal changes.
    pub fn observe(&mut self, sig: SignalRef) {
        self.observed.insert(sig);
    }

    /// Get the set of observed signals.
    pub fn observed(&self) -> &HashSet<SignalRef> {
        &self.observed
    }

    /// Add a process executing `program` with the given signal bindings.
    ///
    /// The bindings are checked against the program's input and output
    /// schedules.
    pub fn add_process(
        &mut self,
        program: Arc<Program>,
        inputs: Vec<SignalRef>,
        outputs: Vec<SignalRef>,
    ) -> Result<ProcessRef> {
        if inputs.len() != program.inputs.len() {
            bail!(
                "program expects {} inputs, got {}",
                program.inputs.len(),
                inputs.len()
            );
        }
        if outputs.len() != program.outputs.len() {
            bail!(
                "program expects {} outputs, got {}",
                program.outputs.len(),
                outputs.len()
            );
        }
        for (i, (&sig, arg)) in inputs.iter().zip(program.inputs.iter()).enumerate() {
            let have = self.signals[sig.as_usize()].width();
            if have != arg.width {
                bail!("input {} has width {}, program expects {}", i, have, arg.width);
            }
        }
        for (i, (&sig, arg)) in outputs.iter().zip(program.outputs.iter()).enumerate() {
            let have = self.signals[sig.as_usize()].width();
            if have != arg.width {
                bail!(
                    "output {} has width {}, program expects {}",
                    i,
                    have,
                    arg.width
                );
            }
        }
        let proc_ref = ProcessRef::new(self.processes.len());
        self.processes.push(Process::new(program, inputs, outputs));
        Ok(proc_ref)
    }

    /// Get the state of a process.
    pub fn process_state(&self, proc_ref: ProcessRef) -> ProcessState {
        self.processes[proc_ref.0].state()
    }

    /// Add a declarative assignment from `source` to `target`.
    ///
    /// Whenever `source` changes, `target` is scheduled to take the new
    /// value: at the next delta cycle when `delay` is `None`, or after the
    /// given number of picoseconds.
    pub fn assign(&mut self, target: SignalRef, source: SignalRef, delay: Option<u64>) -> Result<()> {
        let tw = self.signals[target.as_usize()].width();
        let sw = self.signals[source.as_usize()].width();
        if tw != sw {
            bail!("assignment widths {} and {} must match", tw, sw);
        }
        self.assignments.push(Assignment {
            target,
            source,
            delay,
        });
        Ok(())
    }

    /// Stage an event.
    ///
    /// This is how external stimuli are injected; the event becomes visible
    /// at the end of the current delta step.
    pub fn schedule(&mut self, event: Event) {
        assert_eq!(
            event.value.width(),
            self.signals[event.signal.as_usize()].width(),
            "event width must match its target signal"
        );
        self.events.add(event);
    }

    /// Perform one delta step.
    ///
    /// Returns true if the simulation can continue, false if it has settled.
    pub fn step(&mut self, tracer: &mut dyn Tracer) -> bool {
        trace!("step at {}", self.time);

        // Apply the events due at the earliest time, noting changed signals.
        let events = self.events.pop_events();
        if let Some(first) = events.first() {
            self.time = first.time;
        }
        let mut changed = HashSet::new();
        for event in events {
            let signal = &mut self.signals[event.signal.as_usize()];
            if signal.set_masked(&event.value, &event.mask) {
                debug!(
                    "change {:?} -> {}  [@ {}]",
                    event.signal,
                    signal.value(),
                    self.time
                );
                changed.insert(event.signal);
            }
        }

        // Notify the observers, once per changed observed signal.
        let observed_changed: HashSet<_> =
            changed.intersection(&self.observed).cloned().collect();
        tracer.step(self, &observed_changed);

        // Re-evaluate the declarative assignments fed by changed signals.
        for assignment in &self.assignments {
            if changed.contains(&assignment.source) {
                let value = self.signals[assignment.source.as_usize()].value().clone();
                let time = match assignment.delay {
                    None => self.time.adv_delta(),
                    Some(d) => self.time.adv_time(d),
                };
                self.events
                    .add(Event::new(time, assignment.target, value));
            }
        }

        // Wake up processes that are sensitive to one of the changed signals.
        for process in &mut self.processes {
            if process.state() == ProcessState::WaitInputs
                && process.inputs().iter().any(|s| changed.contains(s))
            {
                process.wake();
            }
        }

        // Run the processes that can make progress, collecting the events
        // they stage. Parallel execution merges the per-process buffers in
        // process order, so both modes trace identically.
        let now = self.time;
        let signals = &self.signals;
        let runnable = |p: &Process| {
            matches!(
                p.state(),
                ProcessState::Ready | ProcessState::Suspended | ProcessState::WaitTime
            )
        };
        let staged: Vec<Vec<Event>> = if self.config.parallelize {
            self.processes
                .par_iter_mut()
                .map(|p| if runnable(p) { p.run(signals, now) } else { vec![] })
                .collect()
        } else {
            self.processes
                .iter_mut()
                .map(|p| if runnable(p) { p.run(signals, now) } else { vec![] })
                .collect()
        };
        for events in staged {
            self.events.add_all(events);
        }

        // Merge and coalesce the freshly staged events.
        self.events.commit();

        // Advance time to the next event, or to the earliest timed wake-up
        // when the queue has settled.
        if self.events.is_empty() {
            let earliest = self
                .processes
                .iter()
                .filter(|p| p.state() == ProcessState::WaitTime)
                .map(|p| p.wait_time())
                .min();
            match earliest {
                Some(t) => {
                    self.time = std::cmp::max(t, self.time);
                    true
                }
                None => false,
            }
        } else {
            true
        }
    }

    /// Run the simulation to completion.
    ///
    /// The watchdog limit on delta steps terminates runaway simulations
    /// gracefully; the tracer is notified of the final state either way.
    pub fn run(&mut self, tracer: &mut dyn Tracer) -> RunResult {
        tracer.init(self);
        let mut steps = 0;
        let mut watchdog_hit = true;
        while steps < self.config.max_delta_steps {
            steps += 1;
            if !self.step(tracer) {
                watchdog_hit = false;
                break;
            }
        }
        if watchdog_hit {
            info!("watchdog limit of {} steps reached", self.config.max_delta_steps);
        }
        tracer.finish(self);
        info!("simulation ended at {} after {} steps", self.time, steps);
        RunResult {
            steps,
            time: self.time,
            watchdog_hit,
        }
    }
}
