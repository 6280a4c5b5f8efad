use silica::ir::prelude::*;
use silica::{component_ty, int_ty, logic_ty, struct_ty};

/// Create a `proc %test` unit populated by a callback. Useful to act as a
/// simple container to collect instructions.
fn within_proc(f: impl FnOnce(&mut UnitBuilder)) -> UnitData {
    let mut prok = UnitData::new(UnitKind::Process, UnitName::local("test"), Signature::new());
    let mut builder = UnitBuilder::new(&mut prok);
    let bb = builder.named_block("entry");
    builder.append_to(bb);
    f(&mut builder);
    prok
}

#[test]
fn binary_result_types() {
    within_proc(|builder| {
        let a = builder.ins().name("a").const_int((8, 42));
        let b = builder.ins().name("b").const_int((8, 9));
        let sum = builder.ins().add(a, b);
        let cmp = builder.ins().ult(a, b);
        assert_eq!(builder.value_type(sum), int_ty(8));
        assert_eq!(builder.value_type(cmp), int_ty(1));
        builder.ins().ret(vec![sum, cmp]);
    });
}

#[test]
#[should_panic(expected = "equal types")]
fn binary_operand_mismatch_asserts() {
    within_proc(|builder| {
        let a = builder.ins().const_int((8, 1));
        let b = builder.ins().const_int((4, 1));
        builder.ins().add(a, b);
    });
}

#[test]
fn call_yields_output_struct() {
    within_proc(|builder| {
        let mut sig = Signature::new();
        sig.add_input(int_ty(8));
        sig.add_output(int_ty(8));
        sig.add_output(int_ty(1));
        let ext = builder.add_extern(UnitName::global("helper"), sig);
        let a = builder.ins().const_int((8, 3));
        let r = builder.ins().call(ext, vec![a]);
        assert_eq!(
            builder.value_type(r),
            struct_ty(vec![int_ty(8), int_ty(1)])
        );
        builder.ins().ret(vec![]);
    });
}

#[test]
fn extract_and_insert() {
    within_proc(|builder| {
        let a = builder.ins().const_logic("00001111");
        let slice = builder.ins().ext_value(a, 2, 4);
        assert_eq!(builder.value_type(slice), logic_ty(4));
        let patched = builder.ins().ins_value(a, slice, 4, 4);
        assert_eq!(builder.value_type(patched), logic_ty(8));
        builder.ins().ret(vec![]);
    });
}

#[test]
fn use_sets_track_operands() {
    within_proc(|builder| {
        let a = builder.ins().const_int((8, 1));
        let b = builder.ins().const_int((8, 2));
        let sum = builder.ins().add(a, b);
        let sum_inst = builder.unit.dfg.value_inst(sum);
        assert!(builder.unit.dfg.uses(a).any(|i| i == sum_inst));
        assert!(builder.unit.dfg.uses(b).any(|i| i == sum_inst));
        assert!(builder.unit.dfg.has_uses(a));
        assert!(!builder.unit.dfg.has_uses(sum));
        builder.ins().ret(vec![sum]);
        assert!(builder.unit.dfg.has_uses(sum));
    });
}

#[test]
fn replace_use_rewrites_operands_and_migrates_users() {
    within_proc(|builder| {
        let a = builder.ins().name("a").const_int((8, 1));
        let b = builder.ins().name("b").const_int((8, 2));
        let c = builder.ins().name("c").const_int((8, 3));
        let sum = builder.ins().add(a, b);
        let sum_inst = builder.unit.dfg.value_inst(sum);

        let count = builder.replace_use(a, c);
        assert_eq!(count, 1);
        assert_eq!(builder.unit.dfg[sum_inst].args(), &[c, b]);
        // The old operand no longer lists the instruction as a user.
        assert!(!builder.unit.dfg.uses(a).any(|i| i == sum_inst));
        assert!(builder.unit.dfg.uses(c).any(|i| i == sum_inst));
        builder.ins().ret(vec![sum]);
    });
}

#[test]
#[should_panic(expected = "still has users")]
fn removing_used_instruction_asserts() {
    within_proc(|builder| {
        let a = builder.ins().const_int((8, 1));
        let b = builder.ins().const_int((8, 2));
        builder.ins().add(a, b);
        let a_inst = builder.unit.dfg.value_inst(a);
        builder.remove_inst(a_inst);
    });
}

#[test]
#[should_panic(expected = "already has a parent")]
fn double_insertion_asserts() {
    within_proc(|builder| {
        let a = builder.ins().const_int((8, 1));
        let a_inst = builder.unit.dfg.value_inst(a);
        let bb = builder.unit.layout.entry();
        builder.unit.layout.append_inst(a_inst, bb);
    });
}

#[test]
fn entity_with_signal_and_instance() {
    // An entity with two i1 inputs CK and E, one i1 output GCK, an internal
    // signal Q, and an instance reading {CK, E, Q} and driving {GCK, Q}.
    let mut sig = Signature::new();
    sig.add_input(int_ty(1));
    sig.add_input(int_ty(1));
    sig.add_output(int_ty(1));
    assert_eq!(
        sig.ty(),
        component_ty(vec![int_ty(1), int_ty(1)], vec![int_ty(1)])
    );

    let mut ent = UnitData::new(UnitKind::Entity, UnitName::global("latch"), sig);
    let ck = ent.input_arg(0);
    let e = ent.input_arg(1);
    let gck = ent.output_arg(0);
    let (inst, q, q2) = {
        let mut builder = UnitBuilder::new(&mut ent);
        let mut ext_sig = Signature::new();
        for _ in 0..3 {
            ext_sig.add_input(int_ty(1));
        }
        for _ in 0..2 {
            ext_sig.add_output(int_ty(1));
        }
        let ext = builder.add_extern(UnitName::global("gate"), ext_sig);
        let init = builder.ins().const_int((1, 0));
        let q = builder.ins().name("Q").sig(init);
        let inst = builder.ins().inst(ext, vec![ck, e, q], vec![gck, q]);
        // Replacing Q updates both the instance's input slot 2 and its
        // output slot 1.
        let init2 = builder.ins().const_int((1, 1));
        let q2 = builder.ins().name("Q2").sig(init2);
        let count = builder.replace_use(q, q2);
        assert_eq!(count, 2);
        (inst, q, q2)
    };
    assert_eq!(ent.dfg[inst].input_args()[2], q2);
    assert_eq!(ent.dfg[inst].output_args()[1], q2);
    assert!(!ent.dfg.uses(q).any(|i| i == inst));
    ent.verify();

    // Printing preserves operand identity: both slots print the same name.
    let printed = format!("{}", ent.dump());
    assert!(printed.contains(", %Q2) -> ("));
    assert!(printed.contains(", %Q2)\n"));
}

#[test]
fn branch_targets_track_blocks() {
    let mut prok = UnitData::new(UnitKind::Process, UnitName::local("branchy"), Signature::new());
    let mut builder = UnitBuilder::new(&mut prok);
    let entry = builder.named_block("entry");
    let then_bb = builder.named_block("then");
    let else_bb = builder.named_block("else");
    builder.append_to(entry);
    let cond = builder.ins().const_int((1, 1));
    let br = builder.ins().br_cond(cond, then_bb, else_bb);
    builder.append_to(then_bb);
    builder.ins().ret(vec![]);
    builder.append_to(else_bb);
    builder.ins().ret(vec![]);
    assert_eq!(builder.unit.dfg[br].blocks(), &[then_bb, else_bb]);
    assert!(builder.unit.dfg.block_uses(then_bb).any(|i| i == br));
    prok.verify();
}

#[test]
fn verifier_rejects_missing_terminator() {
    let mut prok = UnitData::new(UnitKind::Process, UnitName::local("broken"), Signature::new());
    let mut builder = UnitBuilder::new(&mut prok);
    let bb = builder.named_block("entry");
    builder.append_to(bb);
    builder.ins().const_int((8, 1));
    let mut verifier = silica::verifier::Verifier::new();
    verifier.verify_unit(&prok);
    let errors = verifier.finish().unwrap_err();
    assert!(errors
        .iter()
        .any(|e| e.message.contains("must be a terminator")));
}
