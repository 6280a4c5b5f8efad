// Copyright (c) 2017-2021 Fabian Schuiki

//! Representation of the data flow in a unit.
//!
//! Each unit has an associated `DataFlowGraph` which contains all the values,
//! instructions, arguments, and the use/def links between them. Forward edges
//! (instruction operands) are table keys; backward edges are maintained as
//! per-value sets of using instructions, kept in sync on insertion, removal,
//! and substitution.

use crate::{
    impl_table_indexing,
    ir::{Arg, Block, ExtUnit, ExtUnitData, Inst, InstData, Signature, Value, ValueData},
    table::{PrimaryTable, PrimaryTable2, SecondaryTable},
    ty::{void_ty, Type},
    value::{IntValue, LogicValue},
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A data flow graph.
///
/// This is the main container for instructions, values, and the relationship
/// between them.
#[derive(Default, Serialize, Deserialize)]
pub struct DataFlowGraph {
    /// The instructions in the graph.
    pub(crate) insts: PrimaryTable2<Inst, InstData>,
    /// The result values produced by instructions.
    pub(crate) results: SecondaryTable<Inst, Value>,
    /// The values in the graph.
    pub(crate) values: PrimaryTable2<Value, ValueData>,
    /// The argument values.
    pub(crate) args: SecondaryTable<Arg, Value>,
    /// The external units referenced by the graph.
    pub(crate) ext_units: PrimaryTable<ExtUnit, ExtUnitData>,
    /// The names assigned to values.
    pub(crate) names: HashMap<Value, String>,
    /// The use sets of values: which instructions mention a value as operand.
    pub(crate) value_uses: HashMap<Value, HashSet<Inst>>,
    /// The use sets of blocks: which instructions mention a block as target.
    pub(crate) block_uses: HashMap<Block, HashSet<Inst>>,
}

impl_table_indexing!(DataFlowGraph, insts, Inst, InstData);
impl_table_indexing!(DataFlowGraph, values, Value, ValueData);
impl_table_indexing!(DataFlowGraph, ext_units, ExtUnit, ExtUnitData);

impl DataFlowGraph {
    /// Create a new data flow graph.
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a placeholder value.
    ///
    /// This function is intended to be used when constructing cyclic graphs.
    pub fn add_placeholder(&mut self, ty: Type) -> Value {
        self.values.add(ValueData::Placeholder { ty })
    }

    /// Remove a placeholder value.
    pub fn remove_placeholder(&mut self, value: Value) {
        assert!(!self.has_uses(value), "placeholder {} still in use", value);
        assert!(self[value].is_placeholder());
        self.values.remove(value);
    }

    /// Check if a value is a placeholder.
    pub fn is_placeholder(&self, value: Value) -> bool {
        self[value].is_placeholder()
    }

    /// Add an instruction.
    ///
    /// Registers the instruction as a user of each of its operands.
    pub fn add_inst(&mut self, data: InstData, ty: Type) -> Inst {
        let inst = self.insts.add(data);
        if !ty.is_void() {
            let result = self.values.add(ValueData::Inst { ty, inst });
            self.results.add(inst, result);
        }
        self.register_uses(inst);
        inst
    }

    /// Remove an instruction.
    ///
    /// Unregisters the instruction from the use sets of its operands first,
    /// then detaches it from the graph. Panics if its result is still used.
    pub fn remove_inst(&mut self, inst: Inst) {
        if let Some(value) = self.get_inst_result(inst) {
            assert!(
                !self.has_uses(value),
                "removing {} whose result {} still has users",
                inst,
                value
            );
        }
        self.unregister_uses(inst);
        if let Some(value) = self.get_inst_result(inst) {
            self.values.remove(value);
        }
        self.insts.remove(inst);
        self.results.remove(inst);
    }

    fn register_uses(&mut self, inst: Inst) {
        let args: Vec<_> = self[inst].args().to_vec();
        let bbs: Vec<_> = self[inst].blocks().to_vec();
        for arg in args {
            if arg != Value::invalid() {
                self.value_uses.entry(arg).or_default().insert(inst);
            }
        }
        for bb in bbs {
            if bb != Block::invalid() {
                self.block_uses.entry(bb).or_default().insert(inst);
            }
        }
    }

    fn unregister_uses(&mut self, inst: Inst) {
        let args: Vec<_> = self[inst].args().to_vec();
        let bbs: Vec<_> = self[inst].blocks().to_vec();
        for arg in args {
            if let Some(set) = self.value_uses.get_mut(&arg) {
                set.remove(&inst);
                if set.is_empty() {
                    self.value_uses.remove(&arg);
                }
            }
        }
        for bb in bbs {
            if let Some(set) = self.block_uses.get_mut(&bb) {
                set.remove(&inst);
                if set.is_empty() {
                    self.block_uses.remove(&bb);
                }
            }
        }
    }

    /// Returns whether an instruction produces a result.
    pub fn has_result(&self, inst: Inst) -> bool {
        self.results.contains(inst)
    }

    /// Returns the result of an instruction.
    pub fn inst_result(&self, inst: Inst) -> Value {
        self.results[inst]
    }

    /// Returns the result of an instruction, if it has one.
    pub fn get_inst_result(&self, inst: Inst) -> Option<Value> {
        self.results.get(inst).cloned()
    }

    /// Returns the value of an argument.
    pub fn arg_value(&self, arg: Arg) -> Value {
        self.args[arg]
    }

    /// Create values for the arguments in a signature.
    pub(crate) fn make_args_for_signature(&mut self, sig: &Signature) {
        for arg in sig.args() {
            let value = self.values.add(ValueData::Arg {
                ty: sig.arg_type(arg),
                arg,
            });
            self.args.add(arg, value);
        }
    }

    /// Returns the type of a value.
    pub fn value_type(&self, value: Value) -> Type {
        match &self[value] {
            ValueData::Inst { ty, .. } => ty.clone(),
            ValueData::Arg { ty, .. } => ty.clone(),
            ValueData::Placeholder { ty, .. } => ty.clone(),
        }
    }

    /// Returns the type of an instruction.
    pub fn inst_type(&self, inst: Inst) -> Type {
        if self.has_result(inst) {
            self.value_type(self.inst_result(inst))
        } else {
            void_ty()
        }
    }

    /// Return the argument that produces `value`.
    pub fn get_value_arg(&self, value: Value) -> Option<Arg> {
        match self[value] {
            ValueData::Arg { arg, .. } => Some(arg),
            _ => None,
        }
    }

    /// Return the instruction that produces `value`.
    pub fn get_value_inst(&self, value: Value) -> Option<Inst> {
        match self[value] {
            ValueData::Inst { inst, .. } => Some(inst),
            _ => None,
        }
    }

    /// Return the instruction that produces `value`, or panic.
    pub fn value_inst(&self, value: Value) -> Inst {
        match self.get_value_inst(value) {
            Some(inst) => inst,
            None => panic!("value {} not the result of an instruction", value),
        }
    }

    /// Return the name of a value.
    pub fn get_name(&self, value: Value) -> Option<&str> {
        self.names.get(&value).map(AsRef::as_ref)
    }

    /// Set the name of a value.
    pub fn set_name(&mut self, value: Value, name: String) {
        self.names.insert(value, name);
    }

    /// Clear the name of a value.
    pub fn clear_name(&mut self, value: Value) -> Option<String> {
        self.names.remove(&value)
    }

    /// Iterate over the users of a value.
    pub fn uses(&self, value: Value) -> impl Iterator<Item = Inst> + '_ {
        self.value_uses
            .get(&value)
            .into_iter()
            .flat_map(|set| set.iter().cloned())
    }

    /// Check if a value is used.
    pub fn has_uses(&self, value: Value) -> bool {
        self.value_uses.get(&value).map_or(false, |s| !s.is_empty())
    }

    /// Check if a value has exactly one use.
    pub fn has_one_use(&self, value: Value) -> bool {
        self.value_uses.get(&value).map_or(false, |s| s.len() == 1)
    }

    /// Iterate over the users of a block.
    pub fn block_uses(&self, block: Block) -> impl Iterator<Item = Inst> + '_ {
        self.block_uses
            .get(&block)
            .into_iter()
            .flat_map(|set| set.iter().cloned())
    }

    /// Replace all uses of a value with another.
    ///
    /// Rewrites every matching operand slot of every user and migrates the
    /// use back-edges. Returns how many operand slots were rewritten.
    pub fn replace_use(&mut self, from: Value, to: Value) -> usize {
        let users: Vec<_> = self.uses(from).collect();
        let mut count = 0;
        for inst in users {
            count += self.replace_value_within_inst(from, to, inst);
        }
        count
    }

    /// Replace the uses of a value with another, in a single instruction.
    ///
    /// Returns how many operand slots were rewritten.
    pub fn replace_value_within_inst(&mut self, from: Value, to: Value, inst: Inst) -> usize {
        let count = self[inst].replace_value(from, to);
        if count > 0 {
            if let Some(set) = self.value_uses.get_mut(&from) {
                set.remove(&inst);
                if set.is_empty() {
                    self.value_uses.remove(&from);
                }
            }
            if to != Value::invalid() {
                self.value_uses.entry(to).or_default().insert(inst);
            }
        }
        count
    }

    /// Replace all uses of a block with another.
    ///
    /// Returns how many block slots were rewritten.
    pub fn replace_block_use(&mut self, from: Block, to: Block) -> usize {
        let users: Vec<_> = self.block_uses(from).collect();
        let mut count = 0;
        for inst in users {
            count += self.replace_block_within_inst(from, to, inst);
        }
        count
    }

    /// Replace all uses of a block with another, in a single instruction.
    ///
    /// Returns how many block slots were rewritten.
    pub fn replace_block_within_inst(&mut self, from: Block, to: Block, inst: Inst) -> usize {
        let count = self[inst].replace_block(from, to);
        if count > 0 {
            if let Some(set) = self.block_uses.get_mut(&from) {
                set.remove(&inst);
                if set.is_empty() {
                    self.block_uses.remove(&from);
                }
            }
            if to != Block::invalid() {
                self.block_uses.entry(to).or_default().insert(inst);
            }
        }
        count
    }

    /// Resolve a constant integer value.
    ///
    /// Returns `None` if the value is not the result of a `const` instruction.
    pub fn get_const_int(&self, value: Value) -> Option<&IntValue> {
        let inst = self.get_value_inst(value)?;
        self[inst].get_const_int()
    }

    /// Resolve a constant logic value.
    ///
    /// Returns `None` if the value is not the result of a `const` instruction.
    pub fn get_const_logic(&self, value: Value) -> Option<&LogicValue> {
        let inst = self.get_value_inst(value)?;
        self[inst].get_const_logic()
    }
}
