use silica::assembly::write_module_string;
use silica::ir::prelude::*;
use silica::{int_ty, logic_ty};

fn counter_module() -> Module {
    let mut module = Module::new();

    let mut sig = Signature::new();
    sig.add_input(int_ty(1));
    sig.add_output(int_ty(8));
    let mut prok = UnitData::new(UnitKind::Process, UnitName::global("counter"), sig);
    {
        let mut builder = UnitBuilder::new(&mut prok);
        let entry = builder.named_block("entry");
        let next = builder.named_block("next");
        builder.append_to(entry);
        let zero = builder.ins().name("zero").const_int((8, 0));
        builder.ins().br(next);
        builder.append_to(next);
        let one = builder.ins().const_int((8, 1));
        let count = builder.ins().name("count").add(zero, one);
        let out = builder.unit.output_arg(0);
        builder.ins().drv(out, count);
        builder.ins().br(next);
    }
    module.add_unit(prok);

    let mut sig = Signature::new();
    sig.add_input(int_ty(1));
    sig.add_output(int_ty(8));
    module.declare(UnitName::global("other"), sig);
    module
}

#[test]
fn print_process() {
    let module = counter_module();
    assert_eq!(
        write_module_string(&module),
        "declare @other (i1) -> (i8)\n\
         \n\
         proc @counter (i1 %0) -> (i8 %1) {\n\
         %entry:\n\
         \x20   %zero = const i8 0\n\
         \x20   br %next\n\
         %next:\n\
         \x20   %2 = const i8 1\n\
         \x20   %count = add i8 %zero, %2\n\
         \x20   drv i8 %1, %count\n\
         \x20   br %next\n\
         }\n"
    );
}

#[test]
fn printing_is_deterministic() {
    let module = counter_module();
    assert_eq!(write_module_string(&module), write_module_string(&module));
}

#[test]
fn print_entity() {
    let mut sig = Signature::new();
    sig.add_input(logic_ty(1));
    sig.add_output(logic_ty(1));
    let mut ent = UnitData::new(UnitKind::Entity, UnitName::global("buf"), sig);
    {
        let mut builder = UnitBuilder::new(&mut ent);
        let a = builder.unit.input_arg(0);
        let z = builder.unit.output_arg(0);
        let inv = builder.ins().name("inv").not(a);
        let back = builder.ins().name("back").not(inv);
        builder.ins().drv(z, back);
        builder.set_name(a, "a".to_string());
        builder.set_name(z, "z".to_string());
    }
    let mut module = Module::new();
    module.add_unit(ent);
    assert_eq!(
        write_module_string(&module),
        "entity @buf (l1 %a) -> (l1 %z) {\n\
         \x20   %inv = not l1 %a\n\
         \x20   %back = not l1 %inv\n\
         \x20   drv l1 %z, %back\n\
         }\n"
    );
}

#[test]
fn name_collisions_are_uniquified() {
    let mut prok = UnitData::new(UnitKind::Process, UnitName::local("dups"), Signature::new());
    {
        let mut builder = UnitBuilder::new(&mut prok);
        let bb = builder.named_block("entry");
        builder.append_to(bb);
        let a = builder.ins().name("x").const_int((8, 1));
        let b = builder.ins().name("x").const_int((8, 2));
        builder.ins().ret(vec![a, b]);
    }
    let mut module = Module::new();
    module.add_unit(prok);
    let asm = write_module_string(&module);
    assert!(asm.contains("%x = const i8 1"));
    assert!(asm.contains("%x0 = const i8 2"));
    assert!(asm.contains("ret %x, %x0"));
}
