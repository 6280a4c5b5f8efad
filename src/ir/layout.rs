// Copyright (c) 2017-2021 Fabian Schuiki

//! Instruction and basic block ordering.

use crate::{
    ir::{Block, Inst},
    table::SecondaryTable,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Determines the order of blocks and instructions in a unit.
#[derive(Default, Serialize, Deserialize)]
pub struct UnitLayout {
    /// A linked list of blocks in layout order.
    pub(crate) bbs: SecondaryTable<Block, BlockNode>,
    /// The first block in the layout. This is the entry block.
    first_bb: Option<Block>,
    /// The last block in the layout.
    last_bb: Option<Block>,
    /// Lookup table to find the block that contains an instruction.
    inst_map: HashMap<Inst, Block>,
}

/// A node in the layout's doubly linked list of blocks.
#[derive(Default, Serialize, Deserialize)]
pub(crate) struct BlockNode {
    prev: Option<Block>,
    next: Option<Block>,
    pub(crate) layout: InstLayout,
}

impl UnitLayout {
    /// Create a new unit layout.
    pub fn new() -> Self {
        Default::default()
    }

    /// Check if a block is inserted.
    pub fn is_block_inserted(&self, bb: Block) -> bool {
        self.bbs.contains(bb)
    }

    /// Check if an instruction is inserted.
    pub fn is_inst_inserted(&self, inst: Inst) -> bool {
        self.inst_map.contains_key(&inst)
    }
}

/// Basic block arrangement.
impl UnitLayout {
    /// Append a block to the end of the unit.
    pub fn append_block(&mut self, bb: Block) {
        self.bbs.add(
            bb,
            BlockNode {
                prev: self.last_bb,
                next: None,
                layout: Default::default(),
            },
        );
        if let Some(prev) = self.last_bb {
            self.bbs[prev].next = Some(bb);
        }
        if self.first_bb.is_none() {
            self.first_bb = Some(bb);
        }
        self.last_bb = Some(bb);
    }

    /// Prepend a block to the beginning of the unit.
    ///
    /// This effectively makes `bb` the new entry block.
    pub fn prepend_block(&mut self, bb: Block) {
        self.bbs.add(
            bb,
            BlockNode {
                prev: None,
                next: self.first_bb,
                layout: Default::default(),
            },
        );
        if let Some(next) = self.first_bb {
            self.bbs[next].prev = Some(bb);
        }
        if self.last_bb.is_none() {
            self.last_bb = Some(bb);
        }
        self.first_bb = Some(bb);
    }

    /// Insert a block after another block.
    pub fn insert_block_after(&mut self, bb: Block, after: Block) {
        self.bbs.add(
            bb,
            BlockNode {
                prev: Some(after),
                next: self.bbs[after].next,
                layout: Default::default(),
            },
        );
        if let Some(next) = self.bbs[after].next {
            self.bbs[next].prev = Some(bb);
        }
        self.bbs[after].next = Some(bb);
        if self.last_bb == Some(after) {
            self.last_bb = Some(bb);
        }
    }

    /// Remove a block from the unit.
    pub fn remove_block(&mut self, bb: Block) {
        let node = self.bbs.remove(bb).expect("block not in layout");
        if let Some(next) = node.next {
            self.bbs[next].prev = node.prev;
        }
        if let Some(prev) = node.prev {
            self.bbs[prev].next = node.next;
        }
        if self.first_bb == Some(bb) {
            self.first_bb = node.next;
        }
        if self.last_bb == Some(bb) {
            self.last_bb = node.prev;
        }
        for inst in node.layout.insts() {
            self.inst_map.remove(&inst);
        }
    }

    /// Return an iterator over all blocks in layout order.
    pub fn blocks<'a>(&'a self) -> impl Iterator<Item = Block> + 'a {
        std::iter::successors(self.first_bb, move |&bb| self.next_block(bb))
    }

    /// Get the first block in the layout. This is the entry block.
    pub fn first_block(&self) -> Option<Block> {
        self.first_bb
    }

    /// Get the last block in the layout.
    pub fn last_block(&self) -> Option<Block> {
        self.last_bb
    }

    /// Get the block preceding `bb` in the layout.
    pub fn prev_block(&self, bb: Block) -> Option<Block> {
        self.bbs[bb].prev
    }

    /// Get the block following `bb` in the layout.
    pub fn next_block(&self, bb: Block) -> Option<Block> {
        self.bbs[bb].next
    }

    /// Get the entry block in the layout.
    ///
    /// The fallible alternative is `first_block()`.
    pub fn entry(&self) -> Block {
        self.first_block().expect("entry block is required")
    }
}

/// Instruction arrangement.
impl UnitLayout {
    /// Get the block which contains `inst`, or `None` if `inst` is not
    /// inserted.
    pub fn inst_block(&self, inst: Inst) -> Option<Block> {
        self.inst_map.get(&inst).cloned()
    }

    /// Append an instruction to the end of a block.
    pub fn append_inst(&mut self, inst: Inst, bb: Block) {
        assert!(
            !self.is_inst_inserted(inst),
            "instruction {} already has a parent",
            inst
        );
        self.bbs[bb].layout.append_inst(inst);
        self.inst_map.insert(inst, bb);
    }

    /// Prepend an instruction to the beginning of a block.
    pub fn prepend_inst(&mut self, inst: Inst, bb: Block) {
        assert!(
            !self.is_inst_inserted(inst),
            "instruction {} already has a parent",
            inst
        );
        self.bbs[bb].layout.prepend_inst(inst);
        self.inst_map.insert(inst, bb);
    }

    /// Insert an instruction after another instruction.
    pub fn insert_inst_after(&mut self, inst: Inst, after: Inst) {
        assert!(
            !self.is_inst_inserted(inst),
            "instruction {} already has a parent",
            inst
        );
        let bb = self.inst_block(after).expect("`after` not inserted");
        self.bbs[bb].layout.insert_inst_after(inst, after);
        self.inst_map.insert(inst, bb);
    }

    /// Insert an instruction before another instruction.
    pub fn insert_inst_before(&mut self, inst: Inst, before: Inst) {
        assert!(
            !self.is_inst_inserted(inst),
            "instruction {} already has a parent",
            inst
        );
        let bb = self.inst_block(before).expect("`before` not inserted");
        self.bbs[bb].layout.insert_inst_before(inst, before);
        self.inst_map.insert(inst, bb);
    }

    /// Remove an instruction from the unit.
    pub fn remove_inst(&mut self, inst: Inst) {
        let bb = self.inst_block(inst).expect("`inst` not inserted");
        self.bbs[bb].layout.remove_inst(inst);
        self.inst_map.remove(&inst);
    }

    /// Return an iterator over all instructions in a block in layout order.
    pub fn insts<'a>(&'a self, bb: Block) -> impl Iterator<Item = Inst> + 'a {
        self.bbs[bb].layout.insts()
    }

    /// Get the first instruction in a block.
    pub fn first_inst(&self, bb: Block) -> Option<Inst> {
        self.bbs[bb].layout.first_inst()
    }

    /// Get the last instruction in a block.
    pub fn last_inst(&self, bb: Block) -> Option<Inst> {
        self.bbs[bb].layout.last_inst()
    }

    /// Get the instruction preceding `inst` in its block.
    pub fn prev_inst(&self, inst: Inst) -> Option<Inst> {
        let bb = self.inst_map[&inst];
        self.bbs[bb].layout.prev_inst(inst)
    }

    /// Get the instruction following `inst` in its block.
    pub fn next_inst(&self, inst: Inst) -> Option<Inst> {
        let bb = self.inst_map[&inst];
        self.bbs[bb].layout.next_inst(inst)
    }

    /// Get the terminator instruction of a block.
    ///
    /// The fallible alternative is `last_inst(bb)`.
    pub fn terminator(&self, bb: Block) -> Inst {
        self.last_inst(bb).expect("block must have terminator")
    }
}

/// Determines the order of instructions within one block.
#[derive(Default, Serialize, Deserialize)]
pub struct InstLayout {
    /// A linked list of instructions in layout order.
    insts: SecondaryTable<Inst, InstNode>,
    /// The first instruction in the layout.
    first_inst: Option<Inst>,
    /// The last instruction in the layout.
    last_inst: Option<Inst>,
}

/// A node in the layout's doubly linked list of instructions.
#[derive(Default, Serialize, Deserialize)]
struct InstNode {
    prev: Option<Inst>,
    next: Option<Inst>,
}

impl InstLayout {
    /// Create a new instruction layout.
    pub fn new() -> Self {
        Default::default()
    }

    /// Append an instruction to the end of the layout.
    pub fn append_inst(&mut self, inst: Inst) {
        self.insts.add(
            inst,
            InstNode {
                prev: self.last_inst,
                next: None,
            },
        );
        if let Some(prev) = self.last_inst {
            self.insts[prev].next = Some(inst);
        }
        if self.first_inst.is_none() {
            self.first_inst = Some(inst);
        }
        self.last_inst = Some(inst);
    }

    /// Prepend an instruction to the beginning of the layout.
    pub fn prepend_inst(&mut self, inst: Inst) {
        self.insts.add(
            inst,
            InstNode {
                prev: None,
                next: self.first_inst,
            },
        );
        if let Some(next) = self.first_inst {
            self.insts[next].prev = Some(inst);
        }
        if self.last_inst.is_none() {
            self.last_inst = Some(inst);
        }
        self.first_inst = Some(inst);
    }

    /// Insert an instruction after another instruction.
    pub fn insert_inst_after(&mut self, inst: Inst, after: Inst) {
        self.insts.add(
            inst,
            InstNode {
                prev: Some(after),
                next: self.insts[after].next,
            },
        );
        if let Some(next) = self.insts[after].next {
            self.insts[next].prev = Some(inst);
        }
        self.insts[after].next = Some(inst);
        if self.last_inst == Some(after) {
            self.last_inst = Some(inst);
        }
    }

    /// Insert an instruction before another instruction.
    pub fn insert_inst_before(&mut self, inst: Inst, before: Inst) {
        self.insts.add(
            inst,
            InstNode {
                prev: self.insts[before].prev,
                next: Some(before),
            },
        );
        if let Some(prev) = self.insts[before].prev {
            self.insts[prev].next = Some(inst);
        }
        self.insts[before].prev = Some(inst);
        if self.first_inst == Some(before) {
            self.first_inst = Some(inst);
        }
    }

    /// Remove an instruction from the layout.
    pub fn remove_inst(&mut self, inst: Inst) {
        let node = self.insts.remove(inst).expect("instruction not in layout");
        if let Some(next) = node.next {
            self.insts[next].prev = node.prev;
        }
        if let Some(prev) = node.prev {
            self.insts[prev].next = node.next;
        }
        if self.first_inst == Some(inst) {
            self.first_inst = node.next;
        }
        if self.last_inst == Some(inst) {
            self.last_inst = node.prev;
        }
    }

    /// Return an iterator over all instructions in layout order.
    pub fn insts<'a>(&'a self) -> impl Iterator<Item = Inst> + 'a {
        std::iter::successors(self.first_inst, move |&inst| self.next_inst(inst))
    }

    /// Get the first instruction in the layout.
    pub fn first_inst(&self) -> Option<Inst> {
        self.first_inst
    }

    /// Get the last instruction in the layout.
    pub fn last_inst(&self) -> Option<Inst> {
        self.last_inst
    }

    /// Get the instruction preceding `inst` in the layout.
    pub fn prev_inst(&self, inst: Inst) -> Option<Inst> {
        self.insts[inst].prev
    }

    /// Get the instruction following `inst` in the layout.
    pub fn next_inst(&self, inst: Inst) -> Option<Inst> {
        self.insts[inst].next
    }
}
