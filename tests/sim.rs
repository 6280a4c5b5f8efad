use silica::sim::{
    ArithOp, CollectTracer, Engine, Event, ProgArgKind, ProgInst, Program, SimConfig, SimTime,
};
use silica::LogicValue;
use std::sync::Arc;

/// The clock generator: alternating `1`/`0` on output 0 at 500 ps intervals,
/// then a 4000 ps wait, looping forever.
fn clock_generator() -> Program {
    let mut b = Program::build();
    let out = b.output(ProgArgKind::Logic, 1);
    let one = b.constant_logic("1");
    let zero = b.constant_logic("0");
    let period = b.constant_time(4000);
    for i in 0..8u64 {
        b.inst(ProgInst::Output {
            output: out,
            ra: if i % 2 == 0 { one } else { zero },
            delay: i * 500,
        });
    }
    b.inst(ProgInst::WaitTime { ra: period });
    b.finish()
}

#[test]
fn clock_generator_toggles_until_watchdog() {
    let mut engine = Engine::with_config(SimConfig {
        max_delta_steps: 40,
        parallelize: false,
    });
    let clk = engine.add_signal(LogicValue::undef(1));
    engine.probe(clk, "clk");
    engine
        .add_process(Arc::new(clock_generator()), vec![], vec![clk])
        .unwrap();

    let mut tracer = CollectTracer::new();
    let result = engine.run(&mut tracer);
    assert!(result.watchdog_hit);

    let expect_times = [
        SimTime::new(0, 1),
        SimTime::new(500, 0),
        SimTime::new(1000, 0),
        SimTime::new(1500, 0),
        SimTime::new(2000, 0),
        SimTime::new(2500, 0),
        SimTime::new(3000, 0),
        SimTime::new(3500, 0),
        SimTime::new(4000, 1),
        SimTime::new(4500, 0),
    ];
    let records = tracer.records();
    assert!(records.len() >= expect_times.len());
    for (i, (&time, record)) in expect_times.iter().zip(records.iter()).enumerate() {
        let expect_value = if i % 2 == 0 { "1" } else { "0" };
        assert_eq!(record.0, time, "toggle {} at wrong time", i);
        assert_eq!(record.1, clk);
        assert_eq!(format!("{}", record.2), expect_value, "toggle {}", i);
    }
}

/// A pass-through process: wait for the clock input, copy it through a pair
/// of registers, and drive it onto the output in the next delta cycle.
fn follower() -> Program {
    let mut b = Program::build();
    let clk_in = b.input(ProgArgKind::Logic, 1);
    let out = b.output(ProgArgKind::Logic, 1);
    let r0 = b.register(1);
    let r1 = b.register(1);
    b.inst(ProgInst::WaitInputs);
    b.inst(ProgInst::Input {
        rd: r0,
        input: clk_in,
    });
    b.inst(ProgInst::Move { rd: r1, ra: r0 });
    b.inst(ProgInst::Output {
        output: out,
        ra: r1,
        delay: 0,
    });
    b.finish()
}

#[test]
fn sensitivity_wakeup() {
    let mut engine = Engine::new();
    let clk = engine.add_signal(LogicValue::undef(1));
    let out = engine.add_signal(LogicValue::undef(1));
    engine.probe(clk, "clk");
    engine.probe(out, "out");
    engine
        .add_process(Arc::new(follower()), vec![clk], vec![out])
        .unwrap();
    engine.schedule(Event::new(
        SimTime::new(10, 0),
        clk,
        LogicValue::from_str("1"),
    ));

    let mut tracer = CollectTracer::new();
    let result = engine.run(&mut tracer);
    assert!(!result.watchdog_hit);

    // The input change wakes the process, which schedules the output for the
    // next delta cycle.
    let records = tracer.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].0, SimTime::new(10, 0));
    assert_eq!(records[0].1, clk);
    assert_eq!(records[1].0, SimTime::new(10, 1));
    assert_eq!(records[1].1, out);
    assert_eq!(format!("{}", records[1].2), "1");
}

#[test]
fn unrelated_changes_do_not_wake_a_process() {
    // A waiting process becomes ready only through a change to one of its
    // bound input signals.
    let mut engine = Engine::new();
    let clk = engine.add_signal(LogicValue::undef(1));
    let out = engine.add_signal(LogicValue::undef(1));
    let unrelated = engine.add_signal(LogicValue::undef(1));
    let p = engine
        .add_process(Arc::new(follower()), vec![clk], vec![out])
        .unwrap();
    engine.schedule(Event::new(
        SimTime::new(10, 0),
        unrelated,
        LogicValue::from_str("1"),
    ));

    let mut tracer = CollectTracer::new();
    engine.run(&mut tracer);
    assert_eq!(
        engine.process_state(p),
        silica::sim::ProcessState::WaitInputs
    );
    assert!(tracer.records().is_empty());
}

#[test]
fn declarative_assignments() {
    let mut engine = Engine::new();
    let a = engine.add_signal(LogicValue::undef(4));
    let ident = engine.add_signal(LogicValue::undef(4));
    let delayed = engine.add_signal(LogicValue::undef(4));
    engine.probe(ident, "ident");
    engine.probe(delayed, "delayed");
    engine.assign(ident, a, None).unwrap();
    engine.assign(delayed, a, Some(3)).unwrap();
    engine.schedule(Event::new(
        SimTime::new(5, 0),
        a,
        LogicValue::from_str("1010"),
    ));

    let mut tracer = CollectTracer::new();
    engine.run(&mut tracer);
    let records = tracer.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].0, SimTime::new(5, 1));
    assert_eq!(records[0].1, ident);
    assert_eq!(records[1].0, SimTime::new(8, 0));
    assert_eq!(records[1].1, delayed);
    assert_eq!(format!("{}", records[1].2), "1010");
}

#[test]
fn stopped_process_does_not_stop_the_kernel() {
    // One process faults immediately on a width mismatch, the other keeps
    // producing output.
    let mut faulty = Program::build();
    let r0 = faulty.register(4);
    let wide = faulty.constant_logic("00000001");
    faulty.inst(ProgInst::Move { rd: r0, ra: wide });
    let faulty = faulty.finish();

    let mut engine = Engine::with_config(SimConfig {
        max_delta_steps: 20,
        parallelize: false,
    });
    let clk = engine.add_signal(LogicValue::undef(1));
    engine.probe(clk, "clk");
    let bad = engine.add_process(Arc::new(faulty), vec![], vec![]).unwrap();
    engine
        .add_process(Arc::new(clock_generator()), vec![], vec![clk])
        .unwrap();

    let mut tracer = CollectTracer::new();
    engine.run(&mut tracer);
    assert_eq!(
        engine.process_state(bad),
        silica::sim::ProcessState::Stopped
    );
    assert!(!tracer.records().is_empty());
}

#[test]
fn binding_width_mismatch_is_rejected() {
    let mut engine = Engine::new();
    let narrow = engine.add_signal(LogicValue::undef(1));
    let mut b = Program::build();
    b.output(ProgArgKind::Logic, 8);
    let program = b.finish();
    assert!(engine
        .add_process(Arc::new(program), vec![], vec![narrow])
        .is_err());
}

#[test]
fn deterministic_traces() {
    // Property: the observer sequence is a pure function of the inputs, and
    // parallel process execution does not change it.
    let run = |parallelize: bool| {
        let mut engine = Engine::with_config(SimConfig {
            max_delta_steps: 64,
            parallelize,
        });
        let clk = engine.add_signal(LogicValue::undef(1));
        let out = engine.add_signal(LogicValue::undef(1));
        engine.probe(clk, "clk");
        engine.probe(out, "out");
        engine
            .add_process(Arc::new(clock_generator()), vec![], vec![clk])
            .unwrap();
        engine
            .add_process(Arc::new(follower()), vec![clk], vec![out])
            .unwrap();
        let mut tracer = CollectTracer::new();
        engine.run(&mut tracer);
        tracer
            .records()
            .iter()
            .map(|(t, s, v)| (*t, *s, format!("{}", v)))
            .collect::<Vec<_>>()
    };
    let a = run(false);
    let b = run(false);
    let c = run(true);
    assert!(!a.is_empty());
    assert_eq!(a, b);
    assert_eq!(a, c);
}

#[test]
fn arithmetic_process_end_to_end() {
    // An adder that increments its 8-lane input by one whenever it changes.
    let mut b = Program::build();
    let input = b.input(ProgArgKind::Logic, 8);
    let out = b.output(ProgArgKind::Logic, 8);
    let r0 = b.register(8);
    let one = b.constant_logic("00000001");
    b.inst(ProgInst::WaitInputs);
    b.inst(ProgInst::Input {
        rd: r0,
        input,
    });
    b.inst(ProgInst::BinaryArith {
        op: ArithOp::Add,
        n: 8,
        rd: r0,
        ra: r0,
        rb: one,
    });
    b.inst(ProgInst::Output {
        output: out,
        ra: r0,
        delay: 0,
    });

    let mut engine = Engine::new();
    let data = engine.add_signal(LogicValue::undef(8));
    let sum = engine.add_signal(LogicValue::undef(8));
    engine.probe(sum, "sum");
    engine
        .add_process(Arc::new(b.finish()), vec![data], vec![sum])
        .unwrap();
    engine.schedule(Event::new(
        SimTime::new(1, 0),
        data,
        LogicValue::from_str("00000011"),
    ));

    let mut tracer = CollectTracer::new();
    engine.run(&mut tracer);
    let records = tracer.records();
    assert_eq!(records.len(), 1);
    assert_eq!(format!("{}", records[0].2), "00000100");
}
