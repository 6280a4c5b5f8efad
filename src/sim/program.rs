// Copyright (c) 2017-2021 Fabian Schuiki

//! Process programs.
//!
//! This module implements the bytecode-like programs executed by simulation
//! processes. A program is immutable after construction and may be shared by
//! any number of processes; each process brings its own register file and
//! program counter.

use serde::{Deserialize, Serialize};

/// The bit selecting the constants pool in a register id.
pub const CONST_BIT: u16 = 0x8000;

/// A register or constant operand id.
///
/// The high bit selects the constants pool; the low bits index either the
/// register file or the constants directory.
pub type RegId = u16;

/// The kind of a program input or output.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgArgKind {
    /// A signed integer.
    Signed,
    /// An unsigned integer.
    Unsigned,
    /// A simulation time.
    Time,
    /// A nine-valued logic word.
    Logic,
}

/// A program input or output slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgArg {
    /// The kind of the slot.
    pub kind: ProgArgKind,
    /// The width of the slot, in lanes or bits.
    pub width: usize,
}

/// An entry in the constants directory.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstSlot {
    /// Byte offset into the constants buffer.
    pub offset: usize,
    /// Length of the constant in bytes.
    pub len: usize,
}

/// The lane-wise logic operations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicOp {
    /// Lane-wise inversion.
    Neg,
    /// Lane-wise and.
    And,
    /// Lane-wise or.
    Or,
    /// Lane-wise xor.
    Xor,
}

/// The arithmetic operations on logic words.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithOp {
    /// Addition modulo `2^n`.
    Add,
    /// Subtraction modulo `2^n`.
    Sub,
    /// Multiplication modulo `2^n`.
    Mul,
    /// Unsigned division.
    Udiv,
}

/// The unsigned comparison operations on logic words.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    /// Equality.
    Eq,
    /// Inequality.
    Ne,
    /// Unsigned less-than.
    Ult,
    /// Unsigned greater-than.
    Ugt,
    /// Unsigned less-than-or-equal.
    Ule,
    /// Unsigned greater-than-or-equal.
    Uge,
}

/// A program instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgInst {
    /// Copy the current value of an input signal into a register.
    Input {
        /// Destination register.
        rd: RegId,
        /// Index into the program's input schedule.
        input: u16,
    },
    /// Schedule an event driving an output signal.
    ///
    /// The event's time is the next delta cycle when `delay` is zero and
    /// `now` advanced by `delay` picoseconds otherwise. All lanes are driven.
    Output {
        /// Index into the program's output schedule.
        output: u16,
        /// Source register or constant.
        ra: RegId,
        /// Delay in picoseconds; zero schedules for the next delta cycle.
        delay: u64,
    },
    /// Copy bytes between registers. Lengths must match.
    Move {
        /// Destination register.
        rd: RegId,
        /// Source register or constant.
        ra: RegId,
    },
    /// Suspend until a fixed time has passed.
    ///
    /// The operand is an 8-byte little-endian picosecond delay.
    WaitTime {
        /// Source register or constant holding the delay.
        ra: RegId,
    },
    /// Suspend until any input signal changes.
    WaitInputs,
    /// Lane-wise unary nine-valued logic.
    UnaryLogic {
        /// The operation; only `Neg` is unary.
        op: LogicOp,
        /// The number of lanes.
        n: usize,
        /// Destination register.
        rd: RegId,
        /// Source register or constant.
        ra: RegId,
    },
    /// Lane-wise binary nine-valued logic.
    BinaryLogic {
        /// The operation.
        op: LogicOp,
        /// The number of lanes.
        n: usize,
        /// Destination register.
        rd: RegId,
        /// First source register or constant.
        ra: RegId,
        /// Second source register or constant.
        rb: RegId,
    },
    /// Unsigned arithmetic on fully-defined logic words, modulo `2^n`.
    ///
    /// Any undefined lane in either operand makes every destination lane `X`.
    BinaryArith {
        /// The operation.
        op: ArithOp,
        /// The number of lanes.
        n: usize,
        /// Destination register.
        rd: RegId,
        /// First source register or constant.
        ra: RegId,
        /// Second source register or constant.
        rb: RegId,
    },
    /// Unsigned comparison of fully-defined logic words into a single lane.
    ///
    /// Any undefined lane in either operand makes the destination lane `X`.
    Compare {
        /// The operation.
        op: CmpOp,
        /// The number of lanes of the operands.
        n: usize,
        /// Destination register, one lane wide.
        rd: RegId,
        /// First source register or constant.
        ra: RegId,
        /// Second source register or constant.
        rb: RegId,
    },
    /// Transfer control to an absolute instruction index.
    Jump {
        /// The absolute instruction index.
        target: usize,
    },
    /// Transfer control to an absolute instruction index if the condition
    /// lane reads as logical 1.
    BranchIf {
        /// A one-lane register holding the condition.
        cond: RegId,
        /// The absolute instruction index.
        target: usize,
    },
}

/// A program executed by simulation processes.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// The byte length of each register.
    pub registers: Vec<usize>,
    /// The constants buffer.
    pub constants: Vec<u8>,
    /// The constants directory.
    pub const_slots: Vec<ConstSlot>,
    /// The ordered input schedule.
    pub inputs: Vec<ProgArg>,
    /// The ordered output schedule.
    pub outputs: Vec<ProgArg>,
    /// The instructions of the program.
    pub insts: Vec<ProgInst>,
}

impl Program {
    /// Create a new empty program.
    pub fn new() -> Self {
        Default::default()
    }

    /// Start building a program.
    pub fn build() -> ProgramBuilder {
        ProgramBuilder {
            program: Program::new(),
        }
    }

    /// Resolve an operand id to its byte length.
    ///
    /// Returns `None` for ids that index neither the register file nor the
    /// constants directory.
    pub fn operand_len(&self, id: RegId) -> Option<usize> {
        if id & CONST_BIT != 0 {
            self.const_slots
                .get((id & !CONST_BIT) as usize)
                .map(|s| s.len)
        } else {
            self.registers.get(id as usize).copied()
        }
    }
}

/// A convenience builder for programs.
pub struct ProgramBuilder {
    program: Program,
}

impl ProgramBuilder {
    /// Add a register of the given byte length. Returns its id.
    pub fn register(&mut self, len: usize) -> RegId {
        let id = self.program.registers.len();
        assert!(id < CONST_BIT as usize, "register file overflow");
        self.program.registers.push(len);
        id as RegId
    }

    /// Add a constant. Returns its constants-pool id.
    pub fn constant(&mut self, bytes: &[u8]) -> RegId {
        let id = self.program.const_slots.len();
        assert!(id < CONST_BIT as usize, "constants directory overflow");
        self.program.const_slots.push(ConstSlot {
            offset: self.program.constants.len(),
            len: bytes.len(),
        });
        self.program.constants.extend_from_slice(bytes);
        id as RegId | CONST_BIT
    }

    /// Add a logic constant from its string form.
    ///
    /// The lane bytes are stored least significant first, matching the
    /// register layout the logic instructions operate on.
    pub fn constant_logic(&mut self, value: &str) -> RegId {
        let value = crate::value::LogicValue::from_str(value);
        self.constant(value.as_bytes())
    }

    /// Add an 8-byte little-endian time constant, in picoseconds.
    pub fn constant_time(&mut self, ps: u64) -> RegId {
        self.constant(&ps.to_le_bytes())
    }

    /// Add an input slot. Returns its index.
    pub fn input(&mut self, kind: ProgArgKind, width: usize) -> u16 {
        let id = self.program.inputs.len();
        self.program.inputs.push(ProgArg { kind, width });
        id as u16
    }

    /// Add an output slot. Returns its index.
    pub fn output(&mut self, kind: ProgArgKind, width: usize) -> u16 {
        let id = self.program.outputs.len();
        self.program.outputs.push(ProgArg { kind, width });
        id as u16
    }

    /// Append an instruction.
    pub fn inst(&mut self, inst: ProgInst) -> &mut Self {
        self.program.insts.push(inst);
        self
    }

    /// Finish building and return the program.
    pub fn finish(self) -> Program {
        self.program
    }
}
