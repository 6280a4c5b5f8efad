// Copyright (c) 2017-2021 Fabian Schuiki

//! Emitting units in their textual assembly form.
//!
//! The reader half of the textual form is an external collaborator; this
//! module only implements the deterministic writer.

mod writer;

pub use self::writer::*;

use crate::ir::Module;

/// Emit a module's assembly as a string.
pub fn write_module_string(module: &Module) -> String {
    let mut asm = Vec::new();
    Writer::new(&mut asm)
        .write_module(module)
        .expect("writing to string failed");
    String::from_utf8(asm).expect("writer produced invalid UTF-8")
}
