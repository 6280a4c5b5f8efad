// Copyright (c) 2017-2021 Fabian Schuiki

//! Common functionality of `Entity`, `Process`, and `Function` units.

use crate::{
    ir::{
        Arg, Block, ControlFlowGraph, DataFlowGraph, ExtUnit, ExtUnitData, Inst, InstBuilder,
        InstData, Signature, UnitLayout, Value,
    },
    ty::Type,
    verifier::Verifier,
};
use serde::{Deserialize, Serialize};

/// A name of an entity, process, or function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitName {
    /// An anonymous name, like `%42`.
    Anonymous(u32),
    /// A local name, like `%foo`.
    Local(String),
    /// A global name, like `@foo`.
    Global(String),
}

impl UnitName {
    /// Create a new anonymous unit name.
    pub fn anonymous(id: u32) -> Self {
        UnitName::Anonymous(id)
    }

    /// Create a new local unit name.
    pub fn local(name: impl Into<String>) -> Self {
        UnitName::Local(name.into())
    }

    /// Create a new global unit name.
    pub fn global(name: impl Into<String>) -> Self {
        UnitName::Global(name.into())
    }

    /// Check whether this is a local name.
    ///
    /// Local names can only be linked within the same module.
    pub fn is_local(&self) -> bool {
        match self {
            UnitName::Anonymous(..) | UnitName::Local(..) => true,
            _ => false,
        }
    }

    /// Check whether this is a global name.
    pub fn is_global(&self) -> bool {
        match self {
            UnitName::Global(..) => true,
            _ => false,
        }
    }

    /// Get the underlying name.
    pub fn get_name(&self) -> Option<&str> {
        match self {
            UnitName::Global(n) | UnitName::Local(n) => Some(n.as_str()),
            _ => None,
        }
    }
}

impl std::fmt::Display for UnitName {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            UnitName::Anonymous(id) => write!(f, "%{}", id),
            UnitName::Local(n) => write!(f, "%{}", n),
            UnitName::Global(n) => write!(f, "@{}", n),
        }
    }
}

/// The three different units that may appear in the IR.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitKind {
    /// An `Entity`, structural hardware with an unordered instruction list.
    Entity,
    /// A `Process`, sequential behavior organized as basic blocks.
    Process,
    /// A `Function`, a computation that returns values.
    Function,
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            UnitKind::Entity => write!(f, "entity"),
            UnitKind::Process => write!(f, "proc"),
            UnitKind::Function => write!(f, "func"),
        }
    }
}

/// An entity, process, or function.
#[derive(Serialize, Deserialize)]
pub struct UnitData {
    /// The kind of unit.
    pub kind: UnitKind,
    /// The name of the unit.
    pub name: UnitName,
    /// The unit's signature.
    pub sig: Signature,
    /// The data flow graph of the unit.
    pub dfg: DataFlowGraph,
    /// The control flow graph of the unit.
    pub cfg: ControlFlowGraph,
    /// The block and instruction ordering of the unit.
    pub layout: UnitLayout,
}

impl UnitData {
    /// Create a new unit.
    ///
    /// Entities get their single implicit block which holds their unordered
    /// body.
    pub fn new(kind: UnitKind, name: UnitName, sig: Signature) -> Self {
        let mut data = Self {
            kind,
            name,
            sig,
            dfg: DataFlowGraph::new(),
            cfg: ControlFlowGraph::new(),
            layout: UnitLayout::new(),
        };
        if kind == UnitKind::Entity {
            let bb = data.cfg.add_block();
            data.layout.append_block(bb);
        }
        data.dfg.make_args_for_signature(&data.sig);
        data
    }

    /// Check if this unit is an `Entity`.
    pub fn is_entity(&self) -> bool {
        self.kind == UnitKind::Entity
    }

    /// Check if this unit is a `Process`.
    pub fn is_process(&self) -> bool {
        self.kind == UnitKind::Process
    }

    /// Check if this unit is a `Function`.
    pub fn is_function(&self) -> bool {
        self.kind == UnitKind::Function
    }

    /// Get the entry block of the unit.
    pub fn entry(&self) -> Block {
        self.layout.entry()
    }

    /// Return an iterator over the unit's input arguments.
    pub fn input_args<'a>(&'a self) -> impl Iterator<Item = Value> + 'a {
        self.sig.inputs().map(move |arg| self.dfg.arg_value(arg))
    }

    /// Return an iterator over the unit's output arguments.
    pub fn output_args<'a>(&'a self) -> impl Iterator<Item = Value> + 'a {
        self.sig.outputs().map(move |arg| self.dfg.arg_value(arg))
    }

    /// Return an iterator over all of the unit's arguments.
    pub fn args<'a>(&'a self) -> impl Iterator<Item = Value> + 'a {
        self.sig.args().map(move |arg| self.dfg.arg_value(arg))
    }

    /// Get the input argument at position `pos`.
    pub fn input_arg(&self, pos: usize) -> Value {
        self.dfg.arg_value(
            self.sig
                .inputs()
                .nth(pos)
                .expect("input argument position out of bounds"),
        )
    }

    /// Get the output argument at position `pos`.
    pub fn output_arg(&self, pos: usize) -> Value {
        self.dfg.arg_value(
            self.sig
                .outputs()
                .nth(pos)
                .expect("output argument position out of bounds"),
        )
    }

    /// Return the name of an external unit.
    pub fn extern_name(&self, ext: ExtUnit) -> &UnitName {
        &self.dfg[ext].name
    }

    /// Return the signature of an external unit.
    pub fn extern_sig(&self, ext: ExtUnit) -> &Signature {
        &self.dfg[ext].sig
    }

    /// Return the name of a block.
    pub fn get_block_name(&self, bb: Block) -> Option<&str> {
        self.cfg.get_name(bb)
    }

    /// Return an iterator over all instructions of an entity's body.
    ///
    /// Panics if the unit is not an entity.
    pub fn body_insts<'a>(&'a self) -> impl Iterator<Item = Inst> + 'a {
        assert!(self.is_entity(), "body_insts() called on {}", self.kind);
        self.layout.insts(self.layout.entry())
    }

    /// Dump the unit in human-readable form.
    pub fn dump(&self) -> UnitDumper {
        UnitDumper(self)
    }

    /// Panic if the unit is not well-formed.
    pub fn verify(&self) {
        let mut verifier = Verifier::new();
        verifier.verify_unit(self);
        match verifier.finish() {
            Ok(()) => (),
            Err(errs) => {
                eprintln!();
                eprintln!("Verified {}:", self.kind);
                eprintln!("{}", self.dump());
                eprintln!();
                eprintln!("Verification errors:");
                eprintln!("{}", errs);
                panic!("verification failed");
            }
        }
    }
}

/// Temporary object to dump a `UnitData` in human-readable form.
pub struct UnitDumper<'a>(&'a UnitData);

impl std::fmt::Display for UnitDumper<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let unit = self.0;
        let mut out = Vec::new();
        crate::assembly::Writer::new(&mut out)
            .write_unit(unit)
            .map_err(|_| std::fmt::Error)?;
        write!(f, "{}", String::from_utf8_lossy(&out))
    }
}

/// The position where new instructions will be inserted into a unit.
#[derive(Clone, Copy)]
enum InsertPos {
    None,
    Append(Block),
    Prepend(Block),
    After(Inst),
    Before(Inst),
}

/// A temporary object used to populate a `UnitData`.
pub struct UnitBuilder<'u> {
    /// The unit currently being built.
    pub unit: &'u mut UnitData,
    /// The position where we are currently inserting instructions.
    pos: InsertPos,
}

impl<'u> UnitBuilder<'u> {
    /// Create a new unit builder.
    ///
    /// For entities the builder starts out appending to the implicit body
    /// block; for processes and functions a block must first be created.
    pub fn new(unit: &'u mut UnitData) -> Self {
        let pos = match unit.kind {
            UnitKind::Entity => InsertPos::Append(unit.layout.entry()),
            _ => InsertPos::None,
        };
        Self { unit, pos }
    }

    /// Add a new instruction using an `InstBuilder`.
    pub fn ins<'a>(&'a mut self) -> InstBuilder<'a, 'u> {
        InstBuilder::new(self)
    }

    /// Add a new instruction at the current insertion position.
    pub fn build_inst(&mut self, data: InstData, ty: Type) -> Inst {
        let inst = self.unit.dfg.add_inst(data, ty);
        match self.pos {
            InsertPos::None => panic!("no insertion position set; use append_to or prepend_to"),
            InsertPos::Append(bb) => self.unit.layout.append_inst(inst, bb),
            InsertPos::Prepend(bb) => self.unit.layout.prepend_inst(inst, bb),
            InsertPos::After(after) => {
                self.unit.layout.insert_inst_after(inst, after);
                self.pos = InsertPos::After(inst);
            }
            InsertPos::Before(before) => self.unit.layout.insert_inst_before(inst, before),
        }
        inst
    }

    /// Remove an instruction.
    ///
    /// The instruction is detached from its block before it leaves the data
    /// flow graph. Panics if its result still has users.
    pub fn remove_inst(&mut self, inst: Inst) {
        match self.pos {
            InsertPos::After(i) if i == inst => {
                self.pos = InsertPos::After(self.unit.layout.prev_inst(inst).unwrap_or(inst))
            }
            InsertPos::Before(i) if i == inst => {
                self.pos = InsertPos::Before(self.unit.layout.next_inst(inst).unwrap_or(inst))
            }
            _ => (),
        }
        self.unit.layout.remove_inst(inst);
        self.unit.dfg.remove_inst(inst);
    }

    /// Create a new block.
    ///
    /// Panics if the unit is an `Entity`.
    pub fn block(&mut self) -> Block {
        assert!(
            !self.unit.is_entity(),
            "blocks can only be created in processes and functions"
        );
        let bb = self.unit.cfg.add_block();
        self.unit.layout.append_block(bb);
        bb
    }

    /// Create a new named block.
    pub fn named_block(&mut self, name: impl Into<String>) -> Block {
        let bb = self.block();
        self.unit.cfg.set_name(bb, name.into());
        bb
    }

    /// Remove a block and all the instructions it contains.
    pub fn remove_block(&mut self, bb: Block) {
        let insts: Vec<_> = self.unit.layout.insts(bb).collect();
        self.unit.dfg.replace_block_use(bb, Block::invalid());
        self.unit.layout.remove_block(bb);
        self.unit.cfg.remove_block(bb);
        for inst in insts {
            if self.unit.dfg.has_result(inst) {
                let value = self.unit.dfg.inst_result(inst);
                self.unit.dfg.replace_use(value, Value::invalid());
            }
            self.unit.dfg.remove_inst(inst);
        }
    }

    /// Append all following instructions to the end of `bb`.
    pub fn append_to(&mut self, bb: Block) {
        self.pos = InsertPos::Append(bb);
    }

    /// Prepend all following instructions to the beginning of `bb`.
    pub fn prepend_to(&mut self, bb: Block) {
        self.pos = InsertPos::Prepend(bb);
    }

    /// Insert all following instructions after `inst`.
    pub fn insert_after(&mut self, inst: Inst) {
        self.pos = InsertPos::After(inst);
    }

    /// Insert all following instructions before `inst`.
    pub fn insert_before(&mut self, inst: Inst) {
        self.pos = InsertPos::Before(inst);
    }

    /// Import an external unit for use within this unit.
    pub fn add_extern(&mut self, name: UnitName, sig: Signature) -> ExtUnit {
        self.unit.dfg.ext_units.add(ExtUnitData { sig, name })
    }

    /// Set the name of a block.
    pub fn set_block_name(&mut self, bb: Block, name: impl Into<String>) {
        self.unit.cfg.set_name(bb, name.into())
    }

    /// Set the name of a value.
    pub fn set_name(&mut self, value: Value, name: impl Into<String>) {
        self.unit.dfg.set_name(value, name.into())
    }

    /// Get the name of a value.
    pub fn get_name(&self, value: Value) -> Option<&str> {
        self.unit.dfg.get_name(value)
    }

    /// Returns the type of a value.
    pub fn value_type(&self, value: Value) -> Type {
        self.unit.dfg.value_type(value)
    }

    /// Returns the result of an instruction.
    pub fn inst_result(&self, inst: Inst) -> Value {
        self.unit.dfg.inst_result(inst)
    }

    /// Returns the result of an instruction, if it has one.
    pub fn get_inst_result(&self, inst: Inst) -> Option<Value> {
        self.unit.dfg.get_inst_result(inst)
    }

    /// Returns the value of an argument.
    pub fn arg_value(&self, arg: Arg) -> Value {
        self.unit.dfg.arg_value(arg)
    }

    /// Return the signature of an external unit.
    pub fn extern_sig(&self, ext: ExtUnit) -> Signature {
        self.unit.dfg[ext].sig.clone()
    }

    /// Replace all uses of a value with another.
    ///
    /// Returns how many operand slots were rewritten.
    pub fn replace_use(&mut self, from: Value, to: Value) -> usize {
        self.unit.dfg.replace_use(from, to)
    }

    /// Replace all uses of a block with another.
    ///
    /// Returns how many block slots were rewritten.
    pub fn replace_block_use(&mut self, from: Block, to: Block) -> usize {
        self.unit.dfg.replace_block_use(from, to)
    }

    /// Remove an instruction if its result is not being read.
    ///
    /// Returns true if the instruction was removed.
    pub fn prune_if_unused(&mut self, inst: Inst) -> bool {
        if self.unit.dfg.has_result(inst)
            && !self.unit.dfg.has_uses(self.unit.dfg.inst_result(inst))
        {
            let inst_args: Vec<_> = self.unit.dfg[inst]
                .args()
                .iter()
                .cloned()
                .flat_map(|arg| self.unit.dfg.get_value_inst(arg))
                .collect();
            self.remove_inst(inst);
            for inst in inst_args {
                self.prune_if_unused(inst);
            }
            true
        } else {
            false
        }
    }
}
