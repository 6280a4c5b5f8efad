// Copyright (c) 2017-2021 Fabian Schuiki

//! Emitting IR assembly.

use crate::ir::{Arg, Block, DeclData, Inst, InstData, Module, Opcode, UnitData, UnitKind, Value};
use itertools::Itertools;
use std::{
    collections::{HashMap, HashSet},
    io::{Result, Write},
    rc::Rc,
};

/// Temporary object to emit IR assembly.
pub struct Writer<T> {
    sink: T,
}

impl<T: Write> Writer<T> {
    /// Create a new assembly writer.
    pub fn new(sink: T) -> Self {
        Self { sink }
    }

    /// Emit assembly for a module.
    ///
    /// Declarations come first, then unit definitions in module order. The
    /// output is deterministic: writing the same module twice produces
    /// identical text.
    pub fn write_module(&mut self, module: &Module) -> Result<()> {
        let mut separate = false;
        for (_, decl) in module.decls() {
            self.write_declaration(decl)?;
            separate = true;
        }
        for (_, unit) in module.units() {
            if separate {
                writeln!(self.sink)?;
            }
            separate = true;
            self.write_unit(unit)?;
        }
        Ok(())
    }

    /// Emit assembly for a declaration.
    pub fn write_declaration(&mut self, decl: &DeclData) -> Result<()> {
        writeln!(self.sink, "declare {} {}", decl.name, decl.sig)?;
        Ok(())
    }

    /// Emit assembly for a unit.
    pub fn write_unit(&mut self, unit: &UnitData) -> Result<()> {
        let mut uw = UnitWriter::new(self, unit);
        write!(uw.writer.sink, "{} {} (", unit.kind, unit.name)?;
        uw.write_params(unit.sig.inputs())?;
        write!(uw.writer.sink, ") -> (")?;
        uw.write_params(unit.sig.outputs())?;
        writeln!(uw.writer.sink, ") {{")?;
        match unit.kind {
            UnitKind::Entity => {
                for inst in unit.body_insts() {
                    write!(uw.writer.sink, "    ")?;
                    uw.write_inst(inst)?;
                    writeln!(uw.writer.sink)?;
                }
            }
            UnitKind::Process | UnitKind::Function => {
                for block in unit.layout.blocks() {
                    uw.write_block_name(block)?;
                    writeln!(uw.writer.sink, ":")?;
                    for inst in unit.layout.insts(block) {
                        write!(uw.writer.sink, "    ")?;
                        uw.write_inst(inst)?;
                        writeln!(uw.writer.sink)?;
                    }
                }
            }
        }
        writeln!(uw.writer.sink, "}}")?;
        Ok(())
    }
}

struct UnitWriter<'a, T> {
    writer: &'a mut Writer<T>,
    unit: &'a UnitData,
    value_names: HashMap<Value, Rc<String>>,
    block_names: HashMap<Block, Rc<String>>,
    name_indices: HashMap<String, usize>,
    names: HashSet<Rc<String>>,
    tmp_index: usize,
}

impl<'a, T: Write> UnitWriter<'a, T> {
    /// Create a new writer for a unit.
    fn new(writer: &'a mut Writer<T>, unit: &'a UnitData) -> Self {
        Self {
            writer,
            unit,
            value_names: Default::default(),
            block_names: Default::default(),
            name_indices: Default::default(),
            names: Default::default(),
            tmp_index: 0,
        }
    }

    /// Emit a parameter list, `type %name` for each argument.
    fn write_params(&mut self, args: impl Iterator<Item = Arg>) -> Result<()> {
        let mut comma = false;
        let args: Vec<_> = args.collect();
        for arg in args {
            if comma {
                write!(self.writer.sink, ", ")?;
            }
            comma = true;
            write!(self.writer.sink, "{} ", self.unit.sig.arg_type(arg))?;
            self.write_value_name(self.unit.dfg.arg_value(arg))?;
        }
        Ok(())
    }

    /// Uniquify a value or block name.
    ///
    /// Named objects keep their name, suffixed with an index on collision;
    /// anonymous objects get stable per-unit temporaries.
    fn uniquify_name(&mut self, name: Option<&str>) -> Rc<String> {
        if let Some(requested) = name {
            let mut candidate = requested.to_owned();
            while self.names.contains(&candidate) {
                let index = self.name_indices.entry(requested.to_owned()).or_insert(0);
                candidate = format!("{}{}", requested, index);
                *index += 1;
            }
            let name = Rc::new(candidate);
            self.names.insert(name.clone());
            name
        } else {
            let name = Rc::new(format!("{}", self.tmp_index));
            self.tmp_index += 1;
            self.names.insert(name.clone());
            name
        }
    }

    /// Emit the name of a value.
    fn write_value_name(&mut self, value: Value) -> Result<()> {
        if let Some(name) = self.value_names.get(&value) {
            return write!(self.writer.sink, "%{}", name);
        }
        let name = self.uniquify_name(self.unit.dfg.get_name(value));
        write!(self.writer.sink, "%{}", name)?;
        self.value_names.insert(value, name);
        Ok(())
    }

    /// Emit the name of a block.
    fn write_block_name(&mut self, block: Block) -> Result<()> {
        if let Some(name) = self.block_names.get(&block) {
            return write!(self.writer.sink, "%{}", name);
        }
        let name = self.uniquify_name(self.unit.get_block_name(block));
        write!(self.writer.sink, "%{}", name)?;
        self.block_names.insert(block, name);
        Ok(())
    }

    /// Emit an instruction.
    fn write_inst(&mut self, inst: Inst) -> Result<()> {
        if self.unit.dfg.has_result(inst) {
            self.write_value_name(self.unit.dfg.inst_result(inst))?;
            write!(self.writer.sink, " = ")?;
        }
        let data = &self.unit.dfg[inst];
        match data {
            InstData::ConstInt { imm, .. } => {
                write!(self.writer.sink, "const i{} {}", imm.width, imm.value)?;
            }
            InstData::ConstLogic { imm, .. } => {
                write!(self.writer.sink, "const l{} \"{}\"", imm.width(), imm)?;
            }
            InstData::Unary { opcode, args } => {
                let ty = self.unit.dfg.value_type(args[0]);
                write!(self.writer.sink, "{} {} ", opcode, ty)?;
                self.write_value_name(args[0])?;
            }
            InstData::Binary { opcode, args } => {
                let ty = self.unit.dfg.value_type(args[0]);
                write!(self.writer.sink, "{} {} ", opcode, ty)?;
                self.write_value_name(args[0])?;
                write!(self.writer.sink, ", ")?;
                self.write_value_name(args[1])?;
            }
            InstData::Jump { opcode, bbs } => {
                write!(self.writer.sink, "{} ", opcode)?;
                self.write_block_name(bbs[0])?;
            }
            InstData::Branch { opcode, args, bbs } => {
                write!(self.writer.sink, "{} ", opcode)?;
                self.write_value_name(args[0])?;
                write!(self.writer.sink, ", ")?;
                self.write_block_name(bbs[0])?;
                write!(self.writer.sink, ", ")?;
                self.write_block_name(bbs[1])?;
            }
            InstData::Aggregate { opcode, args } => {
                write!(self.writer.sink, "{}", opcode)?;
                let mut comma = false;
                for &arg in args {
                    write!(self.writer.sink, "{}", if comma { ", " } else { " " })?;
                    comma = true;
                    self.write_value_name(arg)?;
                }
            }
            InstData::Call { opcode, unit, .. } => {
                let name = self.unit.dfg[*unit].name.clone();
                write!(self.writer.sink, "{} {} (", opcode, name)?;
                let inputs: Vec<_> = data.input_args().to_vec();
                let outputs: Vec<_> = data.output_args().to_vec();
                let mut comma = false;
                for arg in inputs {
                    if comma {
                        write!(self.writer.sink, ", ")?;
                    }
                    comma = true;
                    self.write_value_name(arg)?;
                }
                write!(self.writer.sink, ")")?;
                if data.opcode() == Opcode::Inst {
                    write!(self.writer.sink, " -> (")?;
                    let mut comma = false;
                    for arg in outputs {
                        if comma {
                            write!(self.writer.sink, ", ")?;
                        }
                        comma = true;
                        self.write_value_name(arg)?;
                    }
                    write!(self.writer.sink, ")")?;
                }
            }
            InstData::InsExt { opcode, imms, .. } => {
                let args: Vec<_> = data.args().to_vec();
                let ty = self.unit.dfg.value_type(args[0]);
                write!(self.writer.sink, "{} {} ", opcode, ty)?;
                let mut comma = false;
                for arg in args {
                    if comma {
                        write!(self.writer.sink, ", ")?;
                    }
                    comma = true;
                    self.write_value_name(arg)?;
                }
                write!(self.writer.sink, ", {}", imms.iter().format(", "))?;
            }
        }
        Ok(())
    }
}
