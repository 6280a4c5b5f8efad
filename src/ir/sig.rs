// Copyright (c) 2017-2021 Fabian Schuiki

//! Representation of the input and output arguments of units.

use crate::{
    ir::Arg,
    table::PrimaryTable,
    ty::{component_ty, Type},
};
use serde::{Deserialize, Serialize};

/// A description of the input and output arguments of a unit.
///
/// The signature is the unit's component type: it fixes the types of the
/// input and output parameters.
#[derive(Default, Clone, Serialize, Deserialize)]
pub struct Signature {
    args: PrimaryTable<Arg, ArgData>,
    inp: Vec<Arg>,
    oup: Vec<Arg>,
}

/// Argument direction.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
enum ArgDir {
    Input,
    Output,
}

/// A single argument of a unit.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ArgData {
    ty: Type,
    dir: ArgDir,
    num: u16,
}

impl Signature {
    /// Create a new signature.
    pub fn new() -> Self {
        Default::default()
    }

    /// Add an input argument.
    pub fn add_input(&mut self, ty: Type) -> Arg {
        let arg = self.args.add(ArgData {
            ty,
            dir: ArgDir::Input,
            num: self.inp.len() as u16,
        });
        self.inp.push(arg);
        arg
    }

    /// Add an output argument.
    pub fn add_output(&mut self, ty: Type) -> Arg {
        let arg = self.args.add(ArgData {
            ty,
            dir: ArgDir::Output,
            num: self.oup.len() as u16,
        });
        self.oup.push(arg);
        arg
    }

    /// Check whether the signature has any inputs.
    pub fn has_inputs(&self) -> bool {
        !self.inp.is_empty()
    }

    /// Check whether the signature has any outputs.
    pub fn has_outputs(&self) -> bool {
        !self.oup.is_empty()
    }

    /// Return an iterator over the inputs of the signature.
    pub fn inputs<'a>(&'a self) -> impl Iterator<Item = Arg> + 'a {
        self.inp.iter().cloned()
    }

    /// Return an iterator over the outputs of the signature.
    pub fn outputs<'a>(&'a self) -> impl Iterator<Item = Arg> + 'a {
        self.oup.iter().cloned()
    }

    /// Return an iterator over the arguments of the signature.
    ///
    /// Inputs come first, then outputs.
    pub fn args<'a>(&'a self) -> impl Iterator<Item = Arg> + 'a {
        self.inputs().chain(self.outputs())
    }

    /// Return the type of argument `arg`.
    pub fn arg_type(&self, arg: Arg) -> Type {
        self.args[arg].ty.clone()
    }

    /// Return the types of the input arguments.
    pub fn input_types(&self) -> Vec<Type> {
        self.inputs().map(|arg| self.arg_type(arg)).collect()
    }

    /// Return the types of the output arguments.
    pub fn output_types(&self) -> Vec<Type> {
        self.outputs().map(|arg| self.arg_type(arg)).collect()
    }

    /// Check whether `arg` is an input.
    pub fn is_input(&self, arg: Arg) -> bool {
        self.args[arg].dir == ArgDir::Input
    }

    /// Check whether `arg` is an output.
    pub fn is_output(&self, arg: Arg) -> bool {
        self.args[arg].dir == ArgDir::Output
    }

    /// Return the component type described by this signature.
    pub fn ty(&self) -> Type {
        component_ty(self.input_types(), self.output_types())
    }
}

impl Eq for Signature {}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.inp.len() == other.inp.len()
            && self.oup.len() == other.oup.len()
            && self
                .args()
                .zip(other.args())
                .all(|(a, b)| self.args[a] == other.args[b])
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use std::iter::{once, repeat};
        write!(f, "(")?;
        for (arg, sep) in self.inputs().zip(once("").chain(repeat(", "))) {
            write!(f, "{}{}", sep, self.arg_type(arg))?;
        }
        write!(f, ") -> (")?;
        for (arg, sep) in self.outputs().zip(once("").chain(repeat(", "))) {
            write!(f, "{}{}", sep, self.arg_type(arg))?;
        }
        write!(f, ")")?;
        Ok(())
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::int_ty;

    #[test]
    fn equality() {
        let mut a = Signature::new();
        a.add_input(int_ty(1));
        a.add_output(int_ty(8));
        let mut b = Signature::new();
        b.add_input(int_ty(1));
        b.add_output(int_ty(8));
        let mut c = Signature::new();
        c.add_input(int_ty(2));
        c.add_output(int_ty(8));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(format!("{}", a), "(i1) -> (i8)");
        assert_eq!(a.ty(), b.ty());
    }
}
