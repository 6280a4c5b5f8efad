// Copyright (c) 2017-2021 Fabian Schuiki

//! Representation of hardware units.
//!
//! This module implements the intermediate representation around which the
//! rest of the crate is built: SSA values, instructions, basic blocks, and
//! the units (entities, processes, and functions) that contain them.

use crate::{impl_table_key, ty::Type};
use serde::{Deserialize, Serialize};

mod cfg;
mod dfg;
mod inst;
mod layout;
mod module;
pub mod prelude;
mod sig;
mod unit;

pub use self::cfg::*;
pub use self::dfg::*;
pub use self::inst::*;
pub use self::layout::*;
pub use self::module::*;
pub use self::sig::*;
pub use self::unit::*;

impl_table_key! {
    /// An instruction.
    struct Inst(u32) as "i";

    /// A value.
    struct Value(u32) as "v";

    /// A basic block.
    struct Block(u32) as "bb";

    /// An argument of an `Entity`, `Process`, or `Function`.
    struct Arg(u32) as "arg";

    /// An external unit referenced from within another unit.
    struct ExtUnit(u32) as "ext";
}

impl Value {
    /// A placeholder for unused instruction arguments.
    pub(crate) fn invalid() -> Self {
        Value(std::u32::MAX)
    }
}

impl Block {
    /// A placeholder for detached block references.
    pub(crate) fn invalid() -> Self {
        Block(std::u32::MAX)
    }
}

/// Internal table storage for values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ValueData {
    /// The value is the result of an instruction.
    Inst {
        /// The type of the value.
        ty: Type,
        /// The instruction that produces the value.
        inst: Inst,
    },
    /// The value is an argument of the containing unit.
    Arg {
        /// The type of the value.
        ty: Type,
        /// The argument that holds the value.
        arg: Arg,
    },
    /// The value is a placeholder used during construction.
    Placeholder {
        /// The type of the value.
        ty: Type,
    },
}

impl ValueData {
    /// Check if the value is a placeholder.
    pub fn is_placeholder(&self) -> bool {
        match self {
            ValueData::Placeholder { .. } => true,
            _ => false,
        }
    }
}

impl Default for ValueData {
    fn default() -> ValueData {
        ValueData::Placeholder {
            ty: crate::ty::void_ty(),
        }
    }
}

/// Internal table storage for basic blocks.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BlockData {
    /// The name of the block.
    pub name: Option<String>,
}

/// Another unit referenced within an `Entity`, `Process`, or `Function`.
///
/// The linker hooks external units up to their actual counterparts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtUnitData {
    /// The name of the referenced unit.
    pub name: UnitName,
    /// The signature of the referenced unit.
    pub sig: Signature,
}
