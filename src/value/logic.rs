// Copyright (c) 2017-2021 Fabian Schuiki

//! Nine-valued logic words
//!
//! This module implements words of nine-valued logic as they appear on
//! signals during simulation. Each lane is one of the codes `U`, `X`, `0`,
//! `1`, `Z`, `W`, `L`, `H`, and `-`, stored as a single byte.

use crate::{
    ty::{logic_ty, Type},
    value::IntValue,
};
use num::{BigUint, One, Zero};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// The nine lane codes.
pub const LOGIC_CODES: [u8; 9] = *b"UX01ZWLH-";

/// A word of nine-valued logic.
///
/// Lane 0 is the least significant position. The string forms accepted and
/// produced by `from_str` and `Display` are most-significant-first, as is
/// conventional for bit vectors.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicValue {
    lanes: Vec<u8>,
}

impl LogicValue {
    /// Create a word with all lanes uninitialized (`U`).
    pub fn undef(width: usize) -> Self {
        Self {
            lanes: vec![b'U'; width],
        }
    }

    /// Create a word with all lanes `0`.
    pub fn zeros(width: usize) -> Self {
        Self {
            lanes: vec![b'0'; width],
        }
    }

    /// Create a word with all lanes `X`.
    pub fn all_x(width: usize) -> Self {
        Self {
            lanes: vec![b'X'; width],
        }
    }

    /// Create a word from its most-significant-first string form.
    ///
    /// Panics if the string contains a byte that is not a lane code.
    pub fn from_str(s: &str) -> Self {
        let lanes: Vec<u8> = s
            .bytes()
            .rev()
            .inspect(|b| {
                assert!(
                    LOGIC_CODES.contains(b),
                    "invalid logic lane code {:?}",
                    *b as char
                )
            })
            .collect();
        Self { lanes }
    }

    /// Create a fully-defined word from an integer.
    pub fn from_int(value: &IntValue) -> Self {
        let lanes = (0..value.width)
            .map(|i| if value.bit(i) { b'1' } else { b'0' })
            .collect();
        Self { lanes }
    }

    /// Get the width of the word.
    pub fn width(&self) -> usize {
        self.lanes.len()
    }

    /// Get the type of the word.
    pub fn ty(&self) -> Type {
        logic_ty(self.width())
    }

    /// Get the lane at the given position.
    pub fn get(&self, lane: usize) -> u8 {
        self.lanes[lane]
    }

    /// Set the lane at the given position.
    pub fn set(&mut self, lane: usize, code: u8) {
        assert!(LOGIC_CODES.contains(&code), "invalid logic lane code");
        self.lanes[lane] = code;
    }

    /// Iterate over the lanes, least significant first.
    pub fn lanes(&self) -> impl Iterator<Item = u8> + '_ {
        self.lanes.iter().cloned()
    }

    /// Access the raw lane bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.lanes
    }

    /// Create a word from raw lane bytes, least significant first.
    ///
    /// Panics if a byte is not a lane code; `try_from_bytes` is the
    /// non-panicking variant.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::try_from_bytes(bytes).expect("invalid logic lane code")
    }

    /// Create a word from raw lane bytes, least significant first.
    ///
    /// Returns `None` if a byte is not a lane code.
    pub fn try_from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.iter().all(|b| LOGIC_CODES.contains(b)) {
            Some(Self {
                lanes: bytes.to_vec(),
            })
        } else {
            None
        }
    }

    /// Interpret a lane as a boolean, if it is defined.
    ///
    /// `0` and `L` read as false, `1` and `H` as true, everything else as
    /// undefined.
    pub fn lane_bool(code: u8) -> Option<bool> {
        match code {
            b'0' | b'L' => Some(false),
            b'1' | b'H' => Some(true),
            _ => None,
        }
    }

    /// Check whether every lane is defined.
    pub fn is_defined(&self) -> bool {
        self.lanes.iter().all(|&l| Self::lane_bool(l).is_some())
    }

    /// Convert the word to an integer, if every lane is defined.
    pub fn to_int(&self) -> Option<IntValue> {
        let mut value = BigUint::zero();
        for (i, lane) in self.lanes().enumerate() {
            if Self::lane_bool(lane)? {
                value |= BigUint::one() << i;
            }
        }
        Some(IntValue::from_unsigned(self.width(), value))
    }
}

/// Lane-wise operators.
///
/// A binary operator yields `0` or `1` when both lanes are defined and `X`
/// when either lane is undefined. Note that an undefined lane dominates even
/// when the other operand would force the result (`0 and X` is `X`).
impl LogicValue {
    /// Compute the lane-wise inverse.
    pub fn not(&self) -> LogicValue {
        let lanes = self
            .lanes()
            .map(|a| match Self::lane_bool(a) {
                Some(a) => if a { b'0' } else { b'1' },
                None => b'X',
            })
            .collect();
        LogicValue { lanes }
    }

    fn binary(&self, other: &Self, op: impl Fn(bool, bool) -> bool) -> LogicValue {
        assert_eq!(self.width(), other.width());
        let lanes = self
            .lanes()
            .zip(other.lanes())
            .map(|(a, b)| match (Self::lane_bool(a), Self::lane_bool(b)) {
                (Some(a), Some(b)) => {
                    if op(a, b) {
                        b'1'
                    } else {
                        b'0'
                    }
                }
                _ => b'X',
            })
            .collect();
        LogicValue { lanes }
    }

    /// Compute the lane-wise `and`.
    pub fn and(&self, other: &Self) -> LogicValue {
        self.binary(other, |a, b| a && b)
    }

    /// Compute the lane-wise `or`.
    pub fn or(&self, other: &Self) -> LogicValue {
        self.binary(other, |a, b| a || b)
    }

    /// Compute the lane-wise `xor`.
    pub fn xor(&self, other: &Self) -> LogicValue {
        self.binary(other, |a, b| a != b)
    }
}

impl From<&str> for LogicValue {
    fn from(s: &str) -> Self {
        LogicValue::from_str(s)
    }
}

impl Display for LogicValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for &lane in self.lanes.iter().rev() {
            write!(f, "{}", lane as char)?;
        }
        Ok(())
    }
}

impl Debug for LogicValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "l{} {}", self.width(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings() {
        let v = LogicValue::from_str("1HX0");
        assert_eq!(v.width(), 4);
        assert_eq!(v.get(0), b'0');
        assert_eq!(v.get(1), b'X');
        assert_eq!(v.get(2), b'H');
        assert_eq!(v.get(3), b'1');
        assert_eq!(format!("{}", v), "1HX0");
    }

    #[test]
    fn conversion() {
        assert_eq!(
            LogicValue::from_str("0110").to_int(),
            Some(IntValue::from_usize(4, 6))
        );
        assert_eq!(
            LogicValue::from_str("LH10").to_int(),
            Some(IntValue::from_usize(4, 6))
        );
        assert_eq!(LogicValue::from_str("01Z0").to_int(), None);
        assert_eq!(
            LogicValue::from_int(&IntValue::from_usize(4, 6)),
            LogicValue::from_str("0110")
        );
    }

    #[test]
    fn nine_valued_and() {
        let and = |a: &str, b: &str| {
            format!("{}", LogicValue::from_str(a).and(&LogicValue::from_str(b)))
        };
        assert_eq!(and("1", "1"), "1");
        assert_eq!(and("1", "0"), "0");
        assert_eq!(and("H", "L"), "0");
        assert_eq!(and("1", "X"), "X");
        assert_eq!(and("1", "Z"), "X");
        // An undefined lane dominates even against a forcing zero.
        assert_eq!(and("0", "X"), "X");
        assert_eq!(and("0", "U"), "X");
        assert_eq!(and("0", "-"), "X");
    }

    #[test]
    fn nine_valued_or_xor() {
        let a = LogicValue::from_str("10XW");
        let b = LogicValue::from_str("1100");
        assert_eq!(format!("{}", a.or(&b)), "11XX");
        assert_eq!(format!("{}", a.xor(&b)), "01XX");
        assert_eq!(format!("{}", a.not()), "01XX");
    }
}
