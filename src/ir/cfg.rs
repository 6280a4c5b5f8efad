// Copyright (c) 2017-2021 Fabian Schuiki

//! Representation of the control flow in a `Process` or `Function`.

use crate::{
    impl_table_indexing,
    ir::{Block, BlockData},
    table::PrimaryTable2,
};
use serde::{Deserialize, Serialize};

/// A control flow graph.
///
/// This is the main container for basic blocks. Every unit has an associated
/// control flow graph; entities use a single implicit block.
#[derive(Default, Serialize, Deserialize)]
pub struct ControlFlowGraph {
    /// The basic blocks in the graph.
    pub(crate) blocks: PrimaryTable2<Block, BlockData>,
}

impl_table_indexing!(ControlFlowGraph, blocks, Block, BlockData);

impl ControlFlowGraph {
    /// Create a new control flow graph.
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a block to the graph.
    pub(super) fn add_block(&mut self) -> Block {
        self.blocks.add(BlockData { name: None })
    }

    /// Remove a block from the graph.
    pub(super) fn remove_block(&mut self, bb: Block) {
        self.blocks.remove(bb);
    }

    /// Return the name of a block.
    pub(super) fn get_name(&self, bb: Block) -> Option<&str> {
        self[bb].name.as_ref().map(AsRef::as_ref)
    }

    /// Set the name of a block.
    pub(super) fn set_name(&mut self, bb: Block, name: String) {
        self[bb].name = Some(name);
    }

    /// Clear the name of a block.
    pub(super) fn clear_name(&mut self, bb: Block) -> Option<String> {
        self[bb].name.take()
    }
}
