// Copyright (c) 2017-2021 Fabian Schuiki

//! Representation of runtime values.
//!
//! This module implements the values that constants and signals carry, as
//! opposed to the SSA values of the IR itself: arbitrary-width integers,
//! nine-valued logic words, and the bit masks that select lanes of them.

mod bits;
mod int;
mod logic;

pub use self::bits::*;
pub use self::int::*;
pub use self::logic::*;
