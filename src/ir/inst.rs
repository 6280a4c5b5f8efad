// Copyright (c) 2017-2021 Fabian Schuiki

//! Representation of instructions.
//!
//! This module implements the various instructions of the intermediate
//! representation: their formats, opcodes, and the builder used to construct
//! them inside a unit.

use crate::{
    ir::{Block, ExtUnit, Inst, UnitBuilder, UnitData, Value},
    ty::{int_ty, logic_ty, struct_ty, void_ty, Type, TypeKind},
    value::{IntValue, LogicValue},
};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A temporary object used to construct a single instruction.
pub struct InstBuilder<'a, 'u> {
    builder: &'a mut UnitBuilder<'u>,
    name: Option<String>,
}

impl<'a, 'u> InstBuilder<'a, 'u> {
    /// Create a new instruction builder that inserts into `builder`.
    pub fn new(builder: &'a mut UnitBuilder<'u>) -> Self {
        Self {
            builder,
            name: None,
        }
    }

    /// Assign a name to the instruction being built.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Assign another value's name plus a suffix to the instruction being
    /// built.
    ///
    /// If `value` has a name, the instruction's name will be
    /// `<value>.<suffix>`. Otherwise it will just be `<suffix>`.
    pub fn suffix<'c>(mut self, value: Value, suffix: impl Into<Cow<'c, str>>) -> Self {
        let suffix = suffix.into();
        self.name = if let Some(name) = self.builder.get_name(value) {
            Some(format!("{}.{}", name, suffix))
        } else {
            Some(suffix.into_owned())
        };
        self
    }
}

/// Constant construction.
impl<'a, 'u> InstBuilder<'a, 'u> {
    /// Construct an integer constant.
    pub fn const_int(&mut self, value: impl Into<IntValue>) -> Value {
        let value = value.into();
        let ty = value.ty();
        let inst = self.build(
            InstData::ConstInt {
                opcode: Opcode::ConstInt,
                imm: value,
            },
            ty,
        );
        self.inst_result(inst)
    }

    /// Construct a logic constant.
    pub fn const_logic(&mut self, value: impl Into<LogicValue>) -> Value {
        let value = value.into();
        let ty = value.ty();
        let inst = self.build(
            InstData::ConstLogic {
                opcode: Opcode::ConstLogic,
                imm: value,
            },
            ty,
        );
        self.inst_result(inst)
    }

    /// Construct the zero value for a type.
    ///
    /// For logic types all lanes are `0`.
    pub fn const_zero(&mut self, ty: &Type) -> Value {
        match ty.as_ref() {
            TypeKind::IntType(w) => self.const_int(IntValue::zero(*w)),
            TypeKind::LogicType(w) => self.const_logic(LogicValue::zeros(*w)),
            _ => panic!("no zero value for {}", ty),
        }
    }
}

/// Computation.
impl<'a, 'u> InstBuilder<'a, 'u> {
    /// Creates a `not` instruction, the lane- or bit-wise inverse of a value.
    pub fn not(&mut self, x: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_unary(Opcode::Not, ty, x);
        self.inst_result(inst)
    }

    /// Creates an `add` instruction.
    pub fn add(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary_same_type(Opcode::Add, x, y);
        self.inst_result(inst)
    }

    /// Creates a `sub` instruction.
    pub fn sub(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary_same_type(Opcode::Sub, x, y);
        self.inst_result(inst)
    }

    /// Creates a `mul` instruction.
    pub fn mul(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary_same_type(Opcode::Mul, x, y);
        self.inst_result(inst)
    }

    /// Creates a `udiv` instruction.
    pub fn udiv(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary_same_type(Opcode::Udiv, x, y);
        self.inst_result(inst)
    }

    /// Creates a `urem` instruction.
    pub fn urem(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary_same_type(Opcode::Urem, x, y);
        self.inst_result(inst)
    }

    /// Creates an `sdiv` instruction.
    pub fn sdiv(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary_same_type(Opcode::Sdiv, x, y);
        self.inst_result(inst)
    }

    /// Creates an `srem` instruction.
    pub fn srem(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary_same_type(Opcode::Srem, x, y);
        self.inst_result(inst)
    }

    /// Creates an `lsl` instruction, shifting a value left.
    pub fn lsl(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary_same_type(Opcode::Lsl, x, y);
        self.inst_result(inst)
    }

    /// Creates an `lsr` instruction, shifting a value right with zero fill.
    pub fn lsr(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary_same_type(Opcode::Lsr, x, y);
        self.inst_result(inst)
    }

    /// Creates an `asr` instruction, shifting a value right with sign fill.
    pub fn asr(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary_same_type(Opcode::Asr, x, y);
        self.inst_result(inst)
    }

    /// Creates an `and` instruction.
    pub fn and(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary_same_type(Opcode::And, x, y);
        self.inst_result(inst)
    }

    /// Creates an `or` instruction.
    pub fn or(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary_same_type(Opcode::Or, x, y);
        self.inst_result(inst)
    }

    /// Creates an `xor` instruction.
    pub fn xor(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary_same_type(Opcode::Xor, x, y);
        self.inst_result(inst)
    }
}

/// Comparison.
impl<'a, 'u> InstBuilder<'a, 'u> {
    fn build_compare(&mut self, opcode: Opcode, x: Value, y: Value) -> Value {
        assert_eq!(
            self.value_type(x),
            self.value_type(y),
            "compare operands must have equal types"
        );
        let inst = self.build(
            InstData::Binary {
                opcode,
                args: [x, y],
            },
            int_ty(1),
        );
        self.inst_result(inst)
    }

    /// Creates an `eq` instruction.
    pub fn eq(&mut self, x: Value, y: Value) -> Value {
        self.build_compare(Opcode::Eq, x, y)
    }

    /// Creates an `ne` instruction.
    pub fn ne(&mut self, x: Value, y: Value) -> Value {
        self.build_compare(Opcode::Ne, x, y)
    }

    /// Creates an `ult` instruction.
    pub fn ult(&mut self, x: Value, y: Value) -> Value {
        self.build_compare(Opcode::Ult, x, y)
    }

    /// Creates an `ugt` instruction.
    pub fn ugt(&mut self, x: Value, y: Value) -> Value {
        self.build_compare(Opcode::Ugt, x, y)
    }

    /// Creates an `ule` instruction.
    pub fn ule(&mut self, x: Value, y: Value) -> Value {
        self.build_compare(Opcode::Ule, x, y)
    }

    /// Creates an `uge` instruction.
    pub fn uge(&mut self, x: Value, y: Value) -> Value {
        self.build_compare(Opcode::Uge, x, y)
    }

    /// Creates an `slt` instruction.
    pub fn slt(&mut self, x: Value, y: Value) -> Value {
        self.build_compare(Opcode::Slt, x, y)
    }

    /// Creates an `sgt` instruction.
    pub fn sgt(&mut self, x: Value, y: Value) -> Value {
        self.build_compare(Opcode::Sgt, x, y)
    }

    /// Creates an `sle` instruction.
    pub fn sle(&mut self, x: Value, y: Value) -> Value {
        self.build_compare(Opcode::Sle, x, y)
    }

    /// Creates an `sge` instruction.
    pub fn sge(&mut self, x: Value, y: Value) -> Value {
        self.build_compare(Opcode::Sge, x, y)
    }
}

/// Aggregate access.
impl<'a, 'u> InstBuilder<'a, 'u> {
    /// Creates an `extv` instruction to extract a struct field, array slice,
    /// or bit slice from a value.
    ///
    /// For struct targets `index` selects the field and `length` is ignored;
    /// for array targets the result is a `length`-element slice starting at
    /// `index`; for integer and logic targets it is a `length`-bit slice.
    pub fn ext_value(&mut self, target: Value, index: usize, length: usize) -> Value {
        let ty = match self.value_type(target).as_ref() {
            TypeKind::StructType(fields) => {
                assert!(index < fields.len(), "field index in `extv` out of range");
                fields[index].clone()
            }
            TypeKind::ArrayType(len, elem) => {
                assert!(index + length <= *len, "array slice in `extv` out of range");
                crate::ty::array_ty(length, elem.clone())
            }
            TypeKind::IntType(w) => {
                assert!(index + length <= *w, "bit slice in `extv` out of range");
                int_ty(length)
            }
            TypeKind::LogicType(w) => {
                assert!(index + length <= *w, "lane slice in `extv` out of range");
                logic_ty(length)
            }
            ty => panic!("argument to `extv` must be an aggregate or word, got {}", ty),
        };
        let inst = self.build(
            InstData::InsExt {
                opcode: Opcode::ExtValue,
                args: [target, Value::invalid()],
                imms: [index, length],
            },
            ty,
        );
        self.inst_result(inst)
    }

    /// Creates an `insv` instruction to insert a struct field, array slice,
    /// or bit slice into a value. The result has the target's type.
    pub fn ins_value(&mut self, target: Value, value: Value, index: usize, length: usize) -> Value {
        let ty = self.value_type(target);
        let expected = match ty.as_ref() {
            TypeKind::StructType(fields) => {
                assert!(index < fields.len(), "field index in `insv` out of range");
                fields[index].clone()
            }
            TypeKind::ArrayType(len, elem) => {
                assert!(index + length <= *len, "array slice in `insv` out of range");
                crate::ty::array_ty(length, elem.clone())
            }
            TypeKind::IntType(w) => {
                assert!(index + length <= *w, "bit slice in `insv` out of range");
                int_ty(length)
            }
            TypeKind::LogicType(w) => {
                assert!(index + length <= *w, "lane slice in `insv` out of range");
                logic_ty(length)
            }
            ty => panic!("argument to `insv` must be an aggregate or word, got {}", ty),
        };
        assert_eq!(
            self.value_type(value),
            expected,
            "inserted value type mismatch in `insv`"
        );
        let inst = self.build(
            InstData::InsExt {
                opcode: Opcode::InsValue,
                args: [target, value],
                imms: [index, length],
            },
            ty,
        );
        self.inst_result(inst)
    }
}

/// Signals, registers, and structure.
impl<'a, 'u> InstBuilder<'a, 'u> {
    /// Creates a `sig` instruction, materializing a signal carrying the given
    /// initial value.
    pub fn sig(&mut self, init: Value) -> Value {
        let ty = self.value_type(init);
        let inst = self.build_unary(Opcode::Sig, ty, init);
        self.inst_result(inst)
    }

    /// Creates a `drv` instruction, scheduling a signal to take a new value.
    pub fn drv(&mut self, signal: Value, value: Value) -> Inst {
        assert_eq!(
            self.value_type(signal),
            self.value_type(value),
            "`drv` signal and value types must match"
        );
        self.build(
            InstData::Binary {
                opcode: Opcode::Drv,
                args: [signal, value],
            },
            void_ty(),
        )
    }

    /// Creates a `reg` instruction, a storage element sampling `x` when the
    /// `strobe` is high.
    pub fn reg(&mut self, x: Value, strobe: Value) -> Value {
        assert_eq!(
            self.value_type(strobe),
            int_ty(1),
            "`reg` strobe must be i1"
        );
        let ty = self.value_type(x);
        let inst = self.build(
            InstData::Binary {
                opcode: Opcode::Reg,
                args: [x, strobe],
            },
            ty,
        );
        self.inst_result(inst)
    }

    /// Creates a `call` instruction, transferring control to a function and
    /// yielding a struct of its outputs.
    pub fn call(&mut self, unit: ExtUnit, args: Vec<Value>) -> Value {
        let sig = self.builder.extern_sig(unit);
        let arg_tys: Vec<_> = sig.input_types();
        let ty = struct_ty(sig.output_types());
        assert_eq!(
            args.len(),
            arg_tys.len(),
            "`call` argument count must match callee inputs"
        );
        for (&arg, want) in args.iter().zip(arg_tys.iter()) {
            assert_eq!(&self.value_type(arg), want, "`call` argument type mismatch");
        }
        let inst = self.build(
            InstData::Call {
                opcode: Opcode::Call,
                unit,
                ins: args.len() as u16,
                args,
            },
            ty,
        );
        self.inst_result(inst)
    }

    /// Creates an `inst` instruction, instantiating a process or entity
    /// within the current entity.
    pub fn inst(&mut self, unit: ExtUnit, mut inputs: Vec<Value>, outputs: Vec<Value>) -> Inst {
        {
            let sig = self.builder.extern_sig(unit);
            assert_eq!(
                (inputs.len(), outputs.len()),
                (sig.inputs().count(), sig.outputs().count()),
                "`inst` argument counts must match the instantiated signature"
            );
        }
        let ins = inputs.len() as u16;
        inputs.extend(outputs);
        self.build(
            InstData::Call {
                opcode: Opcode::Inst,
                unit,
                ins,
                args: inputs,
            },
            void_ty(),
        )
    }
}

/// Control flow.
impl<'a, 'u> InstBuilder<'a, 'u> {
    /// Creates an unconditional `br` instruction.
    pub fn br(&mut self, bb: Block) -> Inst {
        self.build(
            InstData::Jump {
                opcode: Opcode::Br,
                bbs: [bb],
            },
            void_ty(),
        )
    }

    /// Creates a conditional `br` instruction.
    ///
    /// Control transfers to `bb1` when the condition is 1 and to `bb0`
    /// otherwise.
    pub fn br_cond(&mut self, cond: Value, bb1: Block, bb0: Block) -> Inst {
        assert_eq!(
            self.value_type(cond),
            int_ty(1),
            "`br` condition must be i1"
        );
        self.build(
            InstData::Branch {
                opcode: Opcode::BrCond,
                args: [cond],
                bbs: [bb1, bb0],
            },
            void_ty(),
        )
    }

    /// Creates a `ret` instruction returning the given values.
    pub fn ret(&mut self, args: Vec<Value>) -> Inst {
        self.build(
            InstData::Aggregate {
                opcode: Opcode::Ret,
                args,
            },
            void_ty(),
        )
    }
}

/// Convenience functions to construct the different instruction formats.
impl<'a, 'u> InstBuilder<'a, 'u> {
    /// `a = opcode type x`
    fn build_unary(&mut self, opcode: Opcode, ty: Type, x: Value) -> Inst {
        self.build(InstData::Unary { opcode, args: [x] }, ty)
    }

    /// `a = opcode type x, y`, with both operands of the result type.
    fn build_binary_same_type(&mut self, opcode: Opcode, x: Value, y: Value) -> Inst {
        let ty = self.value_type(x);
        assert_eq!(
            ty,
            self.value_type(y),
            "{} operands must have equal types",
            opcode
        );
        self.build(
            InstData::Binary {
                opcode,
                args: [x, y],
            },
            ty,
        )
    }

    /// Forward to the unit builder, applying the pending name.
    pub(crate) fn build(&mut self, data: InstData, ty: Type) -> Inst {
        let inst = self.builder.build_inst(data, ty);
        if let Some(name) = self.name.take() {
            if let Some(value) = self.builder.get_inst_result(inst) {
                self.builder.set_name(value, name);
            }
        }
        inst
    }

    fn value_type(&self, value: Value) -> Type {
        self.builder.value_type(value)
    }

    fn inst_result(&self, inst: Inst) -> Value {
        self.builder.inst_result(inst)
    }
}

/// An instruction format.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstData {
    /// `a = const iN imm`
    ConstInt { opcode: Opcode, imm: IntValue },
    /// `a = const lN imm`
    ConstLogic { opcode: Opcode, imm: LogicValue },
    /// `opcode args`
    Aggregate { opcode: Opcode, args: Vec<Value> },
    /// `a = opcode type x`
    Unary { opcode: Opcode, args: [Value; 1] },
    /// `a = opcode type x, y`
    Binary { opcode: Opcode, args: [Value; 2] },
    /// `opcode bb`
    Jump { opcode: Opcode, bbs: [Block; 1] },
    /// `opcode x, bb1, bb0`
    Branch {
        opcode: Opcode,
        args: [Value; 1],
        bbs: [Block; 2],
    },
    /// `a = opcode unit (inputs) -> (outputs)`
    Call {
        opcode: Opcode,
        unit: ExtUnit,
        ins: u16,
        args: Vec<Value>,
    },
    /// `a = opcode type x [, y], index, length`
    InsExt {
        opcode: Opcode,
        args: [Value; 2],
        imms: [usize; 2],
    },
}

impl InstData {
    /// Get the opcode of the instruction.
    pub fn opcode(&self) -> Opcode {
        match *self {
            InstData::ConstInt { opcode, .. } => opcode,
            InstData::ConstLogic { opcode, .. } => opcode,
            InstData::Aggregate { opcode, .. } => opcode,
            InstData::Unary { opcode, .. } => opcode,
            InstData::Binary { opcode, .. } => opcode,
            InstData::Jump { opcode, .. } => opcode,
            InstData::Branch { opcode, .. } => opcode,
            InstData::Call { opcode, .. } => opcode,
            InstData::InsExt { opcode, .. } => opcode,
        }
    }

    /// Get the arguments of an instruction.
    pub fn args(&self) -> &[Value] {
        match self {
            InstData::ConstInt { .. } => &[],
            InstData::ConstLogic { .. } => &[],
            InstData::Aggregate { args, .. } => args,
            InstData::Unary { args, .. } => args,
            InstData::Binary { args, .. } => args,
            InstData::Jump { .. } => &[],
            InstData::Branch { args, .. } => args,
            InstData::Call { args, .. } => args,
            InstData::InsExt {
                opcode: Opcode::ExtValue,
                args,
                ..
            } => &args[0..1],
            InstData::InsExt { args, .. } => args,
        }
    }

    /// Mutable access to the arguments of an instruction.
    fn args_mut(&mut self) -> &mut [Value] {
        match self {
            InstData::ConstInt { .. } => &mut [],
            InstData::ConstLogic { .. } => &mut [],
            InstData::Aggregate { args, .. } => args,
            InstData::Unary { args, .. } => args,
            InstData::Binary { args, .. } => args,
            InstData::Jump { .. } => &mut [],
            InstData::Branch { args, .. } => args,
            InstData::Call { args, .. } => args,
            InstData::InsExt {
                opcode: Opcode::ExtValue,
                args,
                ..
            } => &mut args[0..1],
            InstData::InsExt { args, .. } => args,
        }
    }

    /// Get the immediates of an instruction.
    pub fn imms(&self) -> &[usize] {
        match self {
            InstData::InsExt { imms, .. } => imms,
            _ => &[],
        }
    }

    /// Get the blocks of an instruction.
    pub fn blocks(&self) -> &[Block] {
        match self {
            InstData::Jump { bbs, .. } => bbs,
            InstData::Branch { bbs, .. } => bbs,
            _ => &[],
        }
    }

    /// Mutable access to the blocks of an instruction.
    fn blocks_mut(&mut self) -> &mut [Block] {
        match self {
            InstData::Jump { bbs, .. } => bbs,
            InstData::Branch { bbs, .. } => bbs,
            _ => &mut [],
        }
    }

    /// Get the input arguments of a call or instance instruction.
    pub fn input_args(&self) -> &[Value] {
        match *self {
            InstData::Call { ref args, ins, .. } => &args[0..ins as usize],
            _ => &[],
        }
    }

    /// Get the output arguments of a call or instance instruction.
    pub fn output_args(&self) -> &[Value] {
        match *self {
            InstData::Call { ref args, ins, .. } => &args[ins as usize..],
            _ => &[],
        }
    }

    /// Replace all occurrences of a value in the operands with another.
    pub(crate) fn replace_value(&mut self, from: Value, to: Value) -> usize {
        let mut count = 0;
        for arg in self.args_mut() {
            if *arg == from {
                *arg = to;
                count += 1;
            }
        }
        count
    }

    /// Replace all occurrences of a block in the operands with another.
    pub(crate) fn replace_block(&mut self, from: Block, to: Block) -> usize {
        let mut count = 0;
        for bb in self.blocks_mut() {
            if *bb == from {
                *bb = to;
                count += 1;
            }
        }
        count
    }

    /// Return the integer constant constructed by this instruction.
    pub fn get_const_int(&self) -> Option<&IntValue> {
        match self {
            InstData::ConstInt { imm, .. } => Some(imm),
            _ => None,
        }
    }

    /// Return the logic constant constructed by this instruction.
    pub fn get_const_logic(&self) -> Option<&LogicValue> {
        match self {
            InstData::ConstLogic { imm, .. } => Some(imm),
            _ => None,
        }
    }

    /// Return the external unit being called or instantiated by this
    /// instruction.
    pub fn get_ext_unit(&self) -> Option<ExtUnit> {
        match self {
            InstData::Call { unit, .. } => Some(*unit),
            _ => None,
        }
    }
}

impl Default for InstData {
    fn default() -> InstData {
        InstData::Aggregate {
            opcode: Opcode::Ret,
            args: vec![],
        }
    }
}

bitflags! {
    /// A set of flags identifying a unit.
    #[derive(Default, Serialize, Deserialize)]
    pub struct UnitFlags: u8 {
        /// Unit flag for a function
        const FUNCTION = 0b001;
        /// Unit flag for a process
        const PROCESS = 0b010;
        /// Unit flag for an entity
        const ENTITY = 0b100;
        /// Unit flag for all units
        const ALL = 0b111;
    }
}

/// An instruction opcode.
///
/// This enum represents the actual instruction, whereas `InstData` covers the
/// format and arguments of the instruction.
#[allow(missing_docs)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    ConstInt,
    ConstLogic,

    Not,

    Add,
    Sub,
    Mul,
    Udiv,
    Urem,
    Sdiv,
    Srem,
    Lsl,
    Lsr,
    Asr,
    And,
    Or,
    Xor,

    Eq,
    Ne,
    Ult,
    Ugt,
    Ule,
    Uge,
    Slt,
    Sgt,
    Sle,
    Sge,

    ExtValue,
    InsValue,
    Reg,

    Sig,
    Drv,

    Call,
    Inst,

    Ret,
    Br,
    BrCond,
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match *self {
                Opcode::ConstInt => "const",
                Opcode::ConstLogic => "const",
                Opcode::Not => "not",
                Opcode::Add => "add",
                Opcode::Sub => "sub",
                Opcode::Mul => "mul",
                Opcode::Udiv => "udiv",
                Opcode::Urem => "urem",
                Opcode::Sdiv => "sdiv",
                Opcode::Srem => "srem",
                Opcode::Lsl => "lsl",
                Opcode::Lsr => "lsr",
                Opcode::Asr => "asr",
                Opcode::And => "and",
                Opcode::Or => "or",
                Opcode::Xor => "xor",
                Opcode::Eq => "eq",
                Opcode::Ne => "ne",
                Opcode::Ult => "ult",
                Opcode::Ugt => "ugt",
                Opcode::Ule => "ule",
                Opcode::Uge => "uge",
                Opcode::Slt => "slt",
                Opcode::Sgt => "sgt",
                Opcode::Sle => "sle",
                Opcode::Sge => "sge",
                Opcode::ExtValue => "extv",
                Opcode::InsValue => "insv",
                Opcode::Reg => "reg",
                Opcode::Sig => "sig",
                Opcode::Drv => "drv",
                Opcode::Call => "call",
                Opcode::Inst => "inst",
                Opcode::Ret => "ret",
                Opcode::Br => "br",
                Opcode::BrCond => "br",
            }
        )
    }
}

impl Opcode {
    /// Return a set of flags where this instruction is valid.
    pub fn valid_in(self) -> UnitFlags {
        match self {
            Opcode::Ret => UnitFlags::FUNCTION | UnitFlags::PROCESS,
            Opcode::Br | Opcode::BrCond => UnitFlags::FUNCTION | UnitFlags::PROCESS,
            Opcode::Call => UnitFlags::FUNCTION | UnitFlags::PROCESS,
            Opcode::Sig => UnitFlags::ENTITY,
            Opcode::Inst => UnitFlags::ENTITY,
            Opcode::Reg => UnitFlags::ENTITY,
            Opcode::Drv => UnitFlags::PROCESS | UnitFlags::ENTITY,
            _ => UnitFlags::ALL,
        }
    }

    /// Check if this instruction can appear in a `Function`.
    pub fn valid_in_function(self) -> bool {
        self.valid_in().contains(UnitFlags::FUNCTION)
    }

    /// Check if this instruction can appear in a `Process`.
    pub fn valid_in_process(self) -> bool {
        self.valid_in().contains(UnitFlags::PROCESS)
    }

    /// Check if this instruction can appear in an `Entity`.
    pub fn valid_in_entity(self) -> bool {
        self.valid_in().contains(UnitFlags::ENTITY)
    }

    /// Check if this instruction is a constant.
    pub fn is_const(self) -> bool {
        match self {
            Opcode::ConstInt | Opcode::ConstLogic => true,
            _ => false,
        }
    }

    /// Check if this instruction is a terminator.
    pub fn is_terminator(self) -> bool {
        match self {
            Opcode::Ret | Opcode::Br | Opcode::BrCond => true,
            _ => false,
        }
    }
}

impl Inst {
    /// Dump the instruction in human-readable form.
    pub fn dump<'a>(self, unit: &'a UnitData) -> InstDumper<'a> {
        InstDumper(self, unit)
    }
}

/// Temporary object to dump an `Inst` in human-readable form for debugging.
pub struct InstDumper<'a>(Inst, &'a UnitData);

impl std::fmt::Display for InstDumper<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let inst = self.0;
        let unit = self.1;
        let data = &unit.dfg[inst];
        if unit.dfg.has_result(inst) {
            let result = unit.dfg.inst_result(inst);
            write!(
                f,
                "{} = {} {}",
                result,
                data.opcode(),
                unit.dfg.value_type(result)
            )?;
        } else {
            write!(f, "{}", data.opcode())?;
        }
        if let InstData::Call { unit: ext_unit, .. } = *data {
            write!(f, " {}", unit.dfg[ext_unit].name)?;
            write!(f, " (")?;
            let mut comma = false;
            for arg in data.input_args() {
                if comma {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
                comma = true;
            }
            write!(f, ")")?;
            if data.opcode() == Opcode::Inst {
                write!(f, " -> (")?;
                let mut comma = false;
                for arg in data.output_args() {
                    if comma {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                    comma = true;
                }
                write!(f, ")")?;
            }
        } else {
            let mut comma = false;
            for arg in data.args() {
                if comma {
                    write!(f, ",")?;
                }
                write!(f, " {}", arg)?;
                comma = true;
            }
            for block in data.blocks() {
                if comma {
                    write!(f, ",")?;
                }
                write!(f, " {}", block)?;
                comma = true;
            }
            for imm in data.imms() {
                if comma {
                    write!(f, ",")?;
                }
                write!(f, " {}", imm)?;
                comma = true;
            }
            match data {
                InstData::ConstInt { imm, .. } => write!(f, " {}", imm.value)?,
                InstData::ConstLogic { imm, .. } => write!(f, " \"{}\"", imm)?,
                _ => (),
            }
        }
        Ok(())
    }
}
