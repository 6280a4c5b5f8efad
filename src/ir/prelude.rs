// Copyright (c) 2017-2021 Fabian Schuiki

//! Re-exports of commonly used IR items.

pub use crate::ir::{
    Arg, Block, DeclData, DeclId, Inst, InstBuilder, InstData, Module, Opcode, Signature,
    UnitBuilder, UnitData, UnitId, UnitKind, UnitName, Value,
};
