use silica::sim::{Engine, Event, EventQueue, NullTracer, SignalRef, SimTime};
use silica::{Bitmask, LogicValue};

fn ev(time: SimTime, signal: SignalRef, value: &str, mask: u64) -> Event {
    let value = LogicValue::from_str(value);
    let mask = Bitmask::from_bits(value.width(), mask);
    Event::new_masked(time, signal, value, mask)
}

#[test]
fn bitmask_coalescing() {
    // Two overlapping drives of the same signal at t=10: bits 1 and 2 come
    // from the later event, bit 3 from the earlier one.
    let mut engine = Engine::new();
    let s = engine.add_signal(LogicValue::from_str("0000"));
    let t = SimTime::new(10, 0);
    engine.schedule(ev(t, s, "1100", 0b1100));
    engine.schedule(ev(t, s, "0010", 0b0110));
    let mut tracer = NullTracer;
    while engine.step(&mut tracer) {}
    // Bit 3 comes from the first event, bits 2 and 1 from the second, bit 0
    // keeps its old value.
    assert_eq!(format!("{}", engine.signal(s).value()), "1010");
}

#[test]
fn last_add_wins_across_times() {
    // An event added later for an earlier time overrides the overlapping
    // bits of an event already committed for a later time.
    let mut eq = EventQueue::new();
    let s = SignalRef::new(0);
    eq.add(ev(SimTime::new(20, 0), s, "1111", 0b1111));
    eq.commit();
    eq.add(ev(SimTime::new(10, 0), s, "0000", 0b0011));
    eq.commit();

    let first = eq.pop_events();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].time, SimTime::new(10, 0));
    assert_eq!(first[0].mask, Bitmask::from_bits(4, 0b0011));

    let second = eq.pop_events();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].time, SimTime::new(20, 0));
    assert_eq!(second[0].mask, Bitmask::from_bits(4, 0b1100));
    assert!(eq.is_empty());
}

#[test]
fn earlier_committed_events_are_untouched() {
    // A late add for a later time must not steal bits from an event already
    // committed for an earlier time.
    let mut eq = EventQueue::new();
    let s = SignalRef::new(0);
    eq.add(ev(SimTime::new(10, 0), s, "1111", 0b1111));
    eq.commit();
    eq.add(ev(SimTime::new(20, 0), s, "0000", 0b0011));
    eq.commit();
    let first = eq.pop_events();
    assert_eq!(first[0].mask, Bitmask::from_bits(4, 0b1111));
}

#[test]
fn disjoint_targets_do_not_interact() {
    let mut eq = EventQueue::new();
    let a = SignalRef::new(0);
    let b = SignalRef::new(1);
    let t = SimTime::new(5, 0);
    eq.add(ev(t, a, "1111", 0b1111));
    eq.add(ev(t, b, "0000", 0b1111));
    eq.commit();
    let events = eq.pop_events();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.mask.is_all_one()));
}

#[test]
fn applied_updates_are_last_add_wins() {
    // Property: for overlapping masks on the same target, the bits in the
    // intersection are taken from the later add, regardless of how commits
    // and pops interleave.
    let mut engine = Engine::new();
    let s = engine.add_signal(LogicValue::from_str("00000000"));
    engine.schedule(ev(SimTime::new(1, 0), s, "11111111", 0b1111_1111));
    engine.schedule(ev(SimTime::new(1, 0), s, "00000000", 0b0000_1111));
    engine.schedule(ev(SimTime::new(1, 0), s, "00110011", 0b0011_0000));
    let mut tracer = NullTracer;
    while engine.step(&mut tracer) {}
    // Bits 7..6 are left to the first add, bits 5..4 go to the third add,
    // bits 3..0 to the second.
    assert_eq!(format!("{}", engine.signal(s).value()), "11110000");
}
