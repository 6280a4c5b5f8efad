// Copyright (c) 2017-2021 Fabian Schuiki

//! Integer values
//!
//! This module implements arbitrary-width integers and the arithmetic defined
//! on them. Values are magnitude-only and reduced modulo `2^width`; signed
//! operations reinterpret the magnitude as two's complement.

use crate::ty::{int_ty, Type};
use num::{bigint::ToBigInt, BigInt, BigUint, One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// An integer value.
#[derive(Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IntValue {
    /// The width of the value in bits.
    pub width: usize,
    /// The value itself.
    pub value: BigUint,
}

impl IntValue {
    /// Create a zero value.
    pub fn zero(width: usize) -> Self {
        Self {
            width,
            value: BigUint::zero(),
        }
    }

    /// Create a value with all bits set to one.
    pub fn all_ones(width: usize) -> Self {
        Self {
            width,
            value: (BigUint::one() << width) - BigUint::one(),
        }
    }

    /// Create a new integer value from a `usize`.
    pub fn from_usize(width: usize, value: usize) -> Self {
        Self::from_unsigned(width, value.into())
    }

    /// Create a new integer value from an `isize`.
    pub fn from_isize(width: usize, value: isize) -> Self {
        Self::from_signed(width, value.into())
    }

    /// Create a new integer value from an unsigned `BigUint` value.
    pub fn from_unsigned(width: usize, value: BigUint) -> Self {
        let value = value % (BigUint::one() << width);
        Self { width, value }
    }

    /// Create a new integer value from a signed `BigInt` value.
    pub fn from_signed(width: usize, value: BigInt) -> Self {
        let modulus = BigInt::one() << width;
        let mut v = value % &modulus;
        if v.is_negative() {
            v += modulus;
        }
        Self::from_unsigned(width, v.to_biguint().unwrap())
    }

    /// Get the type of the value.
    pub fn ty(&self) -> Type {
        int_ty(self.width)
    }

    /// Convert the value to a signed `BigInt`.
    pub fn to_signed(&self) -> BigInt {
        assert!(self.width > 0);
        let sign_mask = BigUint::one() << (self.width - 1);
        if (&self.value & &sign_mask).is_zero() {
            self.value.to_bigint().unwrap()
        } else {
            self.value.to_bigint().unwrap() - (BigInt::one() << self.width)
        }
    }

    /// Convert the value to a `usize`, or panic if it does not fit.
    pub fn to_usize(&self) -> usize {
        self.value.to_usize().expect("value does not fit in usize")
    }

    /// Check if the value is zero.
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Check if the value is one.
    pub fn is_one(&self) -> bool {
        self.value.is_one()
    }

    /// Check if the bit at the given position is set.
    pub fn bit(&self, idx: usize) -> bool {
        assert!(idx < self.width);
        !((&self.value >> idx) & BigUint::one()).is_zero()
    }
}

/// Unary and bitwise operators.
impl IntValue {
    /// Compute `not`.
    pub fn not(&self) -> IntValue {
        IntValue::from_unsigned(
            self.width,
            &Self::all_ones(self.width).value ^ &self.value,
        )
    }

    /// Compute two's complement negation.
    pub fn neg(&self) -> IntValue {
        IntValue::from_signed(self.width, -self.to_signed())
    }

    /// Compute `and`.
    pub fn and(&self, other: &Self) -> IntValue {
        assert_eq!(self.width, other.width);
        IntValue::from_unsigned(self.width, &self.value & &other.value)
    }

    /// Compute `or`.
    pub fn or(&self, other: &Self) -> IntValue {
        assert_eq!(self.width, other.width);
        IntValue::from_unsigned(self.width, &self.value | &other.value)
    }

    /// Compute `xor`.
    pub fn xor(&self, other: &Self) -> IntValue {
        assert_eq!(self.width, other.width);
        IntValue::from_unsigned(self.width, &self.value ^ &other.value)
    }
}

/// Arithmetic operators, modulo `2^width`.
impl IntValue {
    /// Compute `add`.
    pub fn add(&self, other: &Self) -> IntValue {
        assert_eq!(self.width, other.width);
        IntValue::from_unsigned(self.width, &self.value + &other.value)
    }

    /// Compute `sub`.
    pub fn sub(&self, other: &Self) -> IntValue {
        assert_eq!(self.width, other.width);
        IntValue::from_signed(
            self.width,
            self.value.to_bigint().unwrap() - other.value.to_bigint().unwrap(),
        )
    }

    /// Compute `mul`.
    pub fn mul(&self, other: &Self) -> IntValue {
        assert_eq!(self.width, other.width);
        IntValue::from_unsigned(self.width, &self.value * &other.value)
    }

    /// Compute `udiv`.
    pub fn udiv(&self, other: &Self) -> IntValue {
        assert_eq!(self.width, other.width);
        IntValue::from_unsigned(self.width, &self.value / &other.value)
    }

    /// Compute `urem`.
    pub fn urem(&self, other: &Self) -> IntValue {
        assert_eq!(self.width, other.width);
        IntValue::from_unsigned(self.width, &self.value % &other.value)
    }

    /// Compute `sdiv`.
    pub fn sdiv(&self, other: &Self) -> IntValue {
        assert_eq!(self.width, other.width);
        IntValue::from_signed(self.width, self.to_signed() / other.to_signed())
    }

    /// Compute `srem`.
    pub fn srem(&self, other: &Self) -> IntValue {
        assert_eq!(self.width, other.width);
        IntValue::from_signed(self.width, self.to_signed() % other.to_signed())
    }

    /// Compute `lsl`.
    pub fn lsl(&self, other: &Self) -> IntValue {
        assert_eq!(self.width, other.width);
        match other.value.to_usize() {
            Some(s) if s < self.width => {
                IntValue::from_unsigned(self.width, &self.value << s)
            }
            _ => IntValue::zero(self.width),
        }
    }

    /// Compute `lsr`.
    pub fn lsr(&self, other: &Self) -> IntValue {
        assert_eq!(self.width, other.width);
        match other.value.to_usize() {
            Some(s) if s < self.width => {
                IntValue::from_unsigned(self.width, &self.value >> s)
            }
            _ => IntValue::zero(self.width),
        }
    }

    /// Compute `asr`.
    pub fn asr(&self, other: &Self) -> IntValue {
        assert_eq!(self.width, other.width);
        let fill = if self.bit(self.width - 1) {
            Self::all_ones(self.width)
        } else {
            Self::zero(self.width)
        };
        match other.value.to_usize() {
            Some(s) if s < self.width => {
                IntValue::from_signed(self.width, self.to_signed() >> s)
            }
            _ => fill,
        }
    }
}

/// Comparisons.
impl IntValue {
    /// Compute `==`.
    pub fn eq(&self, other: &Self) -> bool {
        assert_eq!(self.width, other.width);
        self.value == other.value
    }

    /// Compute `!=`.
    pub fn ne(&self, other: &Self) -> bool {
        assert_eq!(self.width, other.width);
        self.value != other.value
    }

    /// Compute unsigned `<`.
    pub fn ult(&self, other: &Self) -> bool {
        assert_eq!(self.width, other.width);
        self.value < other.value
    }

    /// Compute unsigned `>`.
    pub fn ugt(&self, other: &Self) -> bool {
        assert_eq!(self.width, other.width);
        self.value > other.value
    }

    /// Compute unsigned `<=`.
    pub fn ule(&self, other: &Self) -> bool {
        assert_eq!(self.width, other.width);
        self.value <= other.value
    }

    /// Compute unsigned `>=`.
    pub fn uge(&self, other: &Self) -> bool {
        assert_eq!(self.width, other.width);
        self.value >= other.value
    }

    /// Compute signed `<`.
    pub fn slt(&self, other: &Self) -> bool {
        assert_eq!(self.width, other.width);
        self.to_signed() < other.to_signed()
    }

    /// Compute signed `>`.
    pub fn sgt(&self, other: &Self) -> bool {
        assert_eq!(self.width, other.width);
        self.to_signed() > other.to_signed()
    }

    /// Compute signed `<=`.
    pub fn sle(&self, other: &Self) -> bool {
        assert_eq!(self.width, other.width);
        self.to_signed() <= other.to_signed()
    }

    /// Compute signed `>=`.
    pub fn sge(&self, other: &Self) -> bool {
        assert_eq!(self.width, other.width);
        self.to_signed() >= other.to_signed()
    }
}

impl Display for IntValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "i{} {}", self.width, self.value)
    }
}

impl Debug for IntValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl From<(usize, usize)> for IntValue {
    fn from((width, value): (usize, usize)) -> Self {
        IntValue::from_usize(width, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign() {
        assert_eq!(IntValue::from_isize(8, 9), IntValue::from_usize(8, 9));
        assert_eq!(IntValue::from_isize(8, -9), IntValue::from_usize(8, 247));
        assert_eq!(IntValue::from_isize(8, 9).to_signed(), BigInt::from(9));
        assert_eq!(IntValue::from_isize(8, -9).to_signed(), BigInt::from(-9));
    }

    #[test]
    fn add() {
        let a = IntValue::from_usize(8, 7);
        let b = IntValue::from_usize(8, 2);
        let an = a.neg();
        let bn = b.neg();

        assert_eq!(a.add(&b), IntValue::from_usize(8, 9));
        assert_eq!(a.add(&bn), IntValue::from_usize(8, 5));
        assert_eq!(an.add(&b), IntValue::from_isize(8, -5));
        assert_eq!(an.add(&bn), IntValue::from_isize(8, -9));
    }

    #[test]
    fn sub() {
        let a = IntValue::from_usize(8, 7);
        let b = IntValue::from_usize(8, 2);

        assert_eq!(a.sub(&b), IntValue::from_usize(8, 5));
        assert_eq!(b.sub(&a), IntValue::from_isize(8, -5));
    }

    #[test]
    fn wrapping() {
        let a = IntValue::from_usize(8, 200);
        let b = IntValue::from_usize(8, 100);
        assert_eq!(a.add(&b), IntValue::from_usize(8, 44));
        assert_eq!(a.mul(&b), IntValue::from_usize(8, 32));
    }

    #[test]
    fn shifts() {
        let a = IntValue::from_usize(8, 0b1001_0110);
        let one = IntValue::from_usize(8, 1);
        assert_eq!(a.lsl(&one), IntValue::from_usize(8, 0b0010_1100));
        assert_eq!(a.lsr(&one), IntValue::from_usize(8, 0b0100_1011));
        assert_eq!(a.asr(&one), IntValue::from_usize(8, 0b1100_1011));
    }

    #[test]
    fn compares() {
        let a = IntValue::from_usize(8, 200);
        let b = IntValue::from_usize(8, 100);
        assert!(a.ugt(&b));
        assert!(a.slt(&b));
        assert!(a.eq(&a));
        assert!(a.ne(&b));
    }
}
