//! Build a small design with the IR builder, print its assembly, and run a
//! clocked counter program in the simulator.

use silica::assembly::write_module_string;
use silica::ir::prelude::*;
use silica::sim::{
    ArithOp, DumpTracer, Engine, ProgArgKind, ProgInst, Program, SimConfig,
};
use silica::{int_ty, LogicValue};
use std::sync::Arc;

fn main() {
    // A gated-clock entity, for show: the IR half of the crate.
    let mut sig = Signature::new();
    sig.add_input(int_ty(1));
    sig.add_input(int_ty(1));
    sig.add_output(int_ty(1));
    let mut ent = UnitData::new(UnitKind::Entity, UnitName::global("gated_clk"), sig);
    {
        let mut builder = UnitBuilder::new(&mut ent);
        let ck = builder.unit.input_arg(0);
        let en = builder.unit.input_arg(1);
        let gck = builder.unit.output_arg(0);
        builder.set_name(ck, "ck".to_string());
        builder.set_name(en, "en".to_string());
        builder.set_name(gck, "gck".to_string());
        let gated = builder.ins().name("gated").and(ck, en);
        builder.ins().drv(gck, gated);
    }
    let mut module = Module::new();
    module.add_unit(ent);
    module.verify();
    print!("{}", write_module_string(&module));

    // A clock generator and a counter that increments on every clock change:
    // the simulator half.
    let mut clkgen = Program::build();
    let clk_out = clkgen.output(ProgArgKind::Logic, 1);
    let one = clkgen.constant_logic("1");
    let zero = clkgen.constant_logic("0");
    let period = clkgen.constant_time(2000);
    clkgen.inst(ProgInst::Output {
        output: clk_out,
        ra: one,
        delay: 0,
    });
    clkgen.inst(ProgInst::Output {
        output: clk_out,
        ra: zero,
        delay: 1000,
    });
    clkgen.inst(ProgInst::WaitTime { ra: period });

    let mut counter = Program::build();
    let clk_in = counter.input(ProgArgKind::Logic, 1);
    let count_out = counter.output(ProgArgKind::Logic, 8);
    let r0 = counter.register(1);
    let acc = counter.register(8);
    let init = counter.constant_logic("00000000");
    let incr = counter.constant_logic("00000001");
    counter.inst(ProgInst::Move { rd: acc, ra: init });
    counter.inst(ProgInst::WaitInputs);
    counter.inst(ProgInst::Input {
        rd: r0,
        input: clk_in,
    });
    counter.inst(ProgInst::BinaryArith {
        op: ArithOp::Add,
        n: 8,
        rd: acc,
        ra: acc,
        rb: incr,
    });
    counter.inst(ProgInst::Output {
        output: count_out,
        ra: acc,
        delay: 0,
    });
    counter.inst(ProgInst::Jump { target: 1 });

    let mut engine = Engine::with_config(SimConfig {
        max_delta_steps: 100,
        parallelize: false,
    });
    let clk = engine.add_signal(LogicValue::undef(1));
    let count = engine.add_signal(LogicValue::undef(8));
    engine.probe(clk, "clk");
    engine.probe(count, "count");
    engine
        .add_process(Arc::new(clkgen.finish()), vec![], vec![clk])
        .expect("clkgen bindings");
    engine
        .add_process(Arc::new(counter.finish()), vec![clk], vec![count])
        .expect("counter bindings");

    let mut tracer = DumpTracer::new(std::io::stdout());
    let result = engine.run(&mut tracer);
    println!(
        "finished at {} after {} steps (watchdog: {})",
        result.time, result.steps, result.watchdog_hit
    );
}
