// Copyright (c) 2017-2021 Fabian Schuiki

//! A hardware description intermediate representation and event-driven
//! simulator. This library provides tools to create, modify, print, and
//! simulate hardware units expressed as SSA graphs.

#![deny(missing_docs)]

pub mod assembly;
pub mod ir;
pub mod sim;
pub mod table;
mod ty;
mod value;
pub mod verifier;

pub use crate::{ty::*, value::*};
