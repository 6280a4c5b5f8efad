// Copyright (c) 2017-2021 Fabian Schuiki

//! Bit masks
//!
//! This module implements fixed-width bit masks as used by the event queue to
//! track which lanes of a signal an event drives. Bits at positions at or
//! above the mask's width are kept clear at all times, such that predicates
//! never observe them.

use num::{BigUint, One, Zero};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// A fixed-width bit mask.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bitmask {
    width: usize,
    bits: BigUint,
}

impl Bitmask {
    /// Create a mask with all bits cleared.
    pub fn zeros(width: usize) -> Self {
        Self {
            width,
            bits: BigUint::zero(),
        }
    }

    /// Create a mask with all bits set.
    pub fn ones(width: usize) -> Self {
        Self {
            width,
            bits: Self::tail_mask(width),
        }
    }

    /// Create a mask from the low bits of a `u64`.
    pub fn from_bits(width: usize, bits: u64) -> Self {
        Self {
            width,
            bits: BigUint::from(bits) & Self::tail_mask(width),
        }
    }

    fn tail_mask(width: usize) -> BigUint {
        (BigUint::one() << width) - BigUint::one()
    }

    /// Get the width of the mask.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the bit at the given position.
    pub fn get(&self, idx: usize) -> bool {
        assert!(idx < self.width, "bit index out of range");
        !((&self.bits >> idx) & BigUint::one()).is_zero()
    }

    /// Set the bit at the given position.
    pub fn set(&mut self, idx: usize, value: bool) {
        assert!(idx < self.width, "bit index out of range");
        if value {
            self.bits |= BigUint::one() << idx;
        } else {
            self.bits &= Self::tail_mask(self.width) ^ (BigUint::one() << idx);
        }
    }

    /// Set all bits.
    pub fn set_all(&mut self) {
        self.bits = Self::tail_mask(self.width);
    }

    /// Clear all bits.
    pub fn clear_all(&mut self) {
        self.bits = BigUint::zero();
    }

    /// Check whether no bit is set.
    pub fn is_all_zero(&self) -> bool {
        self.bits.is_zero()
    }

    /// Check whether every bit is set.
    pub fn is_all_one(&self) -> bool {
        self.bits == Self::tail_mask(self.width)
    }

    /// Compute the bitwise inverse.
    pub fn not(&self) -> Bitmask {
        Bitmask {
            width: self.width,
            bits: &self.bits ^ Self::tail_mask(self.width),
        }
    }

    /// Compute the bitwise `and`.
    pub fn and(&self, other: &Self) -> Bitmask {
        assert_eq!(self.width, other.width);
        Bitmask {
            width: self.width,
            bits: &self.bits & &other.bits,
        }
    }

    /// Compute the bitwise `or`.
    pub fn or(&self, other: &Self) -> Bitmask {
        assert_eq!(self.width, other.width);
        Bitmask {
            width: self.width,
            bits: &self.bits | &other.bits,
        }
    }

    /// Compute the bitwise `xor`.
    pub fn xor(&self, other: &Self) -> Bitmask {
        assert_eq!(self.width, other.width);
        Bitmask {
            width: self.width,
            bits: &self.bits ^ &other.bits,
        }
    }

    /// Clear the bits of this mask that are set in `other`.
    pub fn subtract(&mut self, other: &Self) {
        assert_eq!(self.width, other.width);
        self.bits = &self.bits & (&other.bits ^ Self::tail_mask(self.width));
    }

    /// Set the bits of this mask that are set in `other`.
    pub fn union(&mut self, other: &Self) {
        assert_eq!(self.width, other.width);
        self.bits = &self.bits | &other.bits;
    }

    /// Iterate over the bits, least significant first.
    pub fn iter<'a>(&'a self) -> impl Iterator<Item = bool> + 'a {
        (0..self.width).map(move |i| self.get(i))
    }
}

impl Display for Bitmask {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", if self.get(i) { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl Debug for Bitmask {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}'{}", self.width, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn involution() {
        let m = Bitmask::from_bits(12, 0b1010_0110_0101);
        assert_eq!(m.not().not(), m);
        assert_eq!(m.and(&m), m);
        assert_eq!(m.or(&m), m);
        assert!(m.xor(&m).is_all_zero());
    }

    #[test]
    fn tail_bits_stay_clear() {
        let m = Bitmask::from_bits(4, 0xffff);
        assert!(m.is_all_one());
        let n = m.not();
        assert!(n.is_all_zero());
        assert!(Bitmask::ones(4).xor(&m).is_all_zero());
    }

    #[test]
    fn get_set() {
        let mut m = Bitmask::zeros(8);
        m.set(3, true);
        m.set(5, true);
        assert!(m.get(3) && m.get(5) && !m.get(4));
        m.set(3, false);
        assert!(!m.get(3));
        assert_eq!(format!("{}", m), "00100000");
    }

    #[test]
    fn subtraction() {
        let mut a = Bitmask::from_bits(4, 0b1100);
        a.subtract(&Bitmask::from_bits(4, 0b0110));
        assert_eq!(a, Bitmask::from_bits(4, 0b1000));
    }
}
