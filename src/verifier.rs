// Copyright (c) 2017-2021 Fabian Schuiki

//! Verification of IR integrity.
//!
//! This module implements verification of the intermediate representation. It
//! checks that entities, processes, and functions are well-formed, basic
//! blocks have terminators, and types line up.

use crate::{
    ir::{Inst, InstData, Opcode, UnitData, UnitFlags, UnitKind},
    ty::{int_ty, void_ty},
};
use std::{
    fmt::Display,
    ops::{Deref, DerefMut},
};

/// An IR verifier.
///
/// The `Verifier` acts as a context to call the various IR checking functions
/// on. It keeps track of errors.
#[derive(Default)]
pub struct Verifier {
    errors: VerifierErrors,
    unit: Option<String>,
    flags: UnitFlags,
}

impl Verifier {
    /// Create a new verifier.
    pub fn new() -> Self {
        Default::default()
    }

    /// Verify the integrity of a unit.
    pub fn verify_unit(&mut self, unit: &UnitData) {
        self.unit = Some(format!("{} {}", unit.kind, unit.name));
        self.flags = match unit.kind {
            UnitKind::Entity => UnitFlags::ENTITY,
            UnitKind::Process => UnitFlags::PROCESS,
            UnitKind::Function => UnitFlags::FUNCTION,
        };
        match unit.kind {
            UnitKind::Entity => {
                for inst in unit.body_insts() {
                    self.verify_inst(inst, unit);
                }
            }
            UnitKind::Process | UnitKind::Function => self.verify_block_layout(unit),
        }
        self.unit = None;
    }

    /// Verify the integrity of the block and instruction layout.
    fn verify_block_layout(&mut self, unit: &UnitData) {
        if unit.layout.first_block().is_none() {
            self.errors.push(VerifierError {
                unit: self.unit.clone(),
                object: None,
                message: "layout has no entry block".to_string(),
            });
        }
        for bb in unit.layout.blocks() {
            if unit.layout.first_inst(bb).is_none() {
                self.errors.push(VerifierError {
                    unit: self.unit.clone(),
                    object: Some(format!("{}", bb)),
                    message: "block is empty".to_string(),
                });
            }

            for inst in unit.layout.insts(bb) {
                let is_last = Some(inst) == unit.layout.last_inst(bb);
                let is_term = unit.dfg[inst].opcode().is_terminator();
                // Terminators appear exactly once, in last position.
                if is_term && !is_last {
                    self.errors.push(VerifierError {
                        unit: self.unit.clone(),
                        object: Some(format!("{}", inst)),
                        message: format!(
                            "terminator `{}` must be at the end of block {}",
                            inst.dump(unit),
                            bb
                        ),
                    });
                }
                if is_last && !is_term {
                    self.errors.push(VerifierError {
                        unit: self.unit.clone(),
                        object: Some(format!("{}", bb)),
                        message: format!(
                            "last instruction `{}` must be a terminator",
                            inst.dump(unit)
                        ),
                    });
                }

                self.verify_inst(inst, unit);
            }
        }
    }

    /// Verify the integrity of a single instruction.
    fn verify_inst(&mut self, inst: Inst, unit: &UnitData) {
        let data = &unit.dfg[inst];

        if !data.opcode().valid_in().contains(self.flags) {
            self.errors.push(VerifierError {
                unit: self.unit.clone(),
                object: Some(format!("{}", inst)),
                message: format!("{} may not appear in this unit", data.opcode()),
            });
        }

        match data {
            InstData::Binary { opcode, args } => {
                let lhs = unit.dfg.value_type(args[0]);
                let rhs = unit.dfg.value_type(args[1]);
                if lhs != rhs {
                    self.errors.push(VerifierError {
                        unit: self.unit.clone(),
                        object: Some(format!("{}", inst)),
                        message: format!(
                            "{} operand types {} and {} must match",
                            opcode, lhs, rhs
                        ),
                    });
                }
                if *opcode == Opcode::Reg && rhs != int_ty(1) {
                    self.errors.push(VerifierError {
                        unit: self.unit.clone(),
                        object: Some(format!("{}", inst)),
                        message: format!("reg strobe must be i1, got {}", rhs),
                    });
                }
            }
            InstData::Branch { args, .. } => {
                let cond = unit.dfg.value_type(args[0]);
                if cond != int_ty(1) {
                    self.errors.push(VerifierError {
                        unit: self.unit.clone(),
                        object: Some(format!("{}", inst)),
                        message: format!("br condition must be i1, got {}", cond),
                    });
                }
            }
            InstData::Unary { args, .. } => {
                let ty = unit.dfg.value_type(args[0]);
                if ty == void_ty() {
                    self.errors.push(VerifierError {
                        unit: self.unit.clone(),
                        object: Some(format!("{}", inst)),
                        message: "operand may not be void".to_string(),
                    });
                }
            }
            _ => (),
        }
    }

    /// Finish verification and return the result.
    ///
    /// Consumes the verifier.
    pub fn finish(self) -> Result<(), VerifierErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    /// Finish verification and panic if errors occurred.
    ///
    /// Consumes the verifier.
    pub fn finish_panic(self) {
        match self.finish() {
            Ok(()) => (),
            Err(errs) => panic!("Verification failed:\n{}", errs),
        }
    }
}

/// A verification error.
#[derive(Debug)]
pub struct VerifierError {
    /// The unit which caused the error.
    pub unit: Option<String>,
    /// The object which caused the error.
    pub object: Option<String>,
    /// The error message.
    pub message: String,
}

impl Display for VerifierError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(ref unit) = self.unit {
            write!(f, "{}: ", unit)?;
        }
        if let Some(ref object) = self.object {
            write!(f, "{}: ", object)?;
        }
        write!(f, "{}", self.message)?;
        Ok(())
    }
}

/// A list of verification errors.
#[derive(Debug, Default)]
pub struct VerifierErrors(pub Vec<VerifierError>);

impl Deref for VerifierErrors {
    type Target = Vec<VerifierError>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for VerifierErrors {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Display for VerifierErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for err in self.iter() {
            writeln!(f, "- {}", err)?;
        }
        Ok(())
    }
}
