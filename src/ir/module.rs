// Copyright (c) 2017-2021 Fabian Schuiki

//! Representation of linked units.
//!
//! This module implements the `Module`, a collection of `Entity`, `Process`,
//! and `Function` units linked together. A module acts as the root node of an
//! intermediate representation and is the unit of information emitted by the
//! assembly writer.

use crate::{
    impl_table_key,
    ir::{Signature, UnitData, UnitName},
    table::PrimaryTable,
    verifier::Verifier,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

impl_table_key! {
    /// A unit definition in a module.
    struct UnitId(u32) as "u";

    /// A unit declaration in a module.
    struct DeclId(u32) as "decl";
}

/// An external unit declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclData {
    /// The name of the declared unit.
    pub name: UnitName,
    /// The signature of the declared unit.
    pub sig: Signature,
}

/// A module.
///
/// This is the root node of an intermediate representation. Contains
/// definitions of entities, processes, and functions, plus declarations of
/// external units.
#[derive(Serialize, Deserialize)]
pub struct Module {
    /// The units in this module.
    units: PrimaryTable<UnitId, UnitData>,
    /// The declarations in this module.
    decls: PrimaryTable<DeclId, DeclData>,
    /// The order of units in the module.
    unit_order: BTreeSet<UnitId>,
    /// The order of declarations in the module.
    decl_order: BTreeSet<DeclId>,
}

impl std::ops::Index<UnitId> for Module {
    type Output = UnitData;
    fn index(&self, idx: UnitId) -> &UnitData {
        &self.units[idx]
    }
}

impl std::ops::IndexMut<UnitId> for Module {
    fn index_mut(&mut self, idx: UnitId) -> &mut UnitData {
        &mut self.units[idx]
    }
}

impl std::ops::Index<DeclId> for Module {
    type Output = DeclData;
    fn index(&self, idx: DeclId) -> &DeclData {
        &self.decls[idx]
    }
}

impl Default for Module {
    fn default() -> Module {
        Module::new()
    }
}

impl Module {
    /// Create a new empty module.
    pub fn new() -> Self {
        Self {
            units: PrimaryTable::new(),
            decls: PrimaryTable::new(),
            unit_order: BTreeSet::new(),
            decl_order: BTreeSet::new(),
        }
    }

    /// Add a unit to the module.
    pub fn add_unit(&mut self, data: UnitData) -> UnitId {
        let id = self.units.add(data);
        self.unit_order.insert(id);
        id
    }

    /// Remove a unit from the module.
    pub fn remove_unit(&mut self, unit: UnitId) {
        self.units.remove(unit);
        self.unit_order.remove(&unit);
    }

    /// Declare an external unit.
    pub fn declare(&mut self, name: UnitName, sig: Signature) -> DeclId {
        let id = self.decls.add(DeclData { name, sig });
        self.decl_order.insert(id);
        id
    }

    /// Return an iterator over the units in this module, in a stable order.
    pub fn units<'a>(&'a self) -> impl Iterator<Item = (UnitId, &'a UnitData)> + 'a {
        self.unit_order.iter().map(move |&id| (id, &self.units[id]))
    }

    /// Return an iterator over the declarations in this module, in a stable
    /// order.
    pub fn decls<'a>(&'a self) -> impl Iterator<Item = (DeclId, &'a DeclData)> + 'a {
        self.decl_order.iter().map(move |&id| (id, &self.decls[id]))
    }

    /// Return the first unit with the given name, if any.
    pub fn unit_by_name(&self, name: &UnitName) -> Option<UnitId> {
        self.unit_order
            .iter()
            .cloned()
            .find(|&id| &self.units[id].name == name)
    }

    /// Check that every external unit reference resolves to a unit definition
    /// or declaration with an identical signature.
    ///
    /// Returns a list of unresolved `(unit, external name)` pairs.
    pub fn link_errors(&self) -> Vec<(UnitName, UnitName)> {
        let mut errors = Vec::new();
        for (_, unit) in self.units() {
            for ext in unit.dfg.ext_units.values() {
                let defined = self
                    .units()
                    .any(|(_, u)| u.name == ext.name && u.sig == ext.sig);
                let declared = self
                    .decls()
                    .any(|(_, d)| d.name == ext.name && d.sig == ext.sig);
                if !defined && !declared {
                    errors.push((unit.name.clone(), ext.name.clone()));
                }
            }
        }
        errors
    }

    /// Panic if any external unit reference does not resolve.
    pub fn link(&self) {
        let errors = self.link_errors();
        if !errors.is_empty() {
            for (unit, ext) in &errors {
                eprintln!("unit {} references unresolved external {}", unit, ext);
            }
            panic!("linking failed");
        }
    }

    /// Panic if any unit in the module is not well-formed.
    pub fn verify(&self) {
        let mut verifier = Verifier::new();
        for (_, unit) in self.units() {
            verifier.verify_unit(unit);
        }
        match verifier.finish() {
            Ok(()) => (),
            Err(errs) => {
                eprintln!("{}", errs);
                panic!("verification failed");
            }
        }
    }

    /// Dump the module in human-readable form.
    pub fn dump(&self) -> ModuleDumper {
        ModuleDumper(self)
    }
}

/// Temporary object to dump a `Module` in human-readable form.
pub struct ModuleDumper<'a>(&'a Module);

impl std::fmt::Display for ModuleDumper<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut out = Vec::new();
        crate::assembly::Writer::new(&mut out)
            .write_module(self.0)
            .map_err(|_| std::fmt::Error)?;
        write!(f, "{}", String::from_utf8_lossy(&out))
    }
}
