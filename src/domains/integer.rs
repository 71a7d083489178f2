//! Exact integers with a machine-word fast path.
//!
//! [Integer] is used for the unbounded exponents of [BigFloat](super::float::BigFloat)
//! and [Magnitude](super::magnitude::Magnitude). Almost all exponents fit in an `i64`,
//! so arithmetic is performed on machine words and only spills into a
//! multi-precision integer on overflow.

use std::{
    cmp::Ordering,
    fmt::{Display, Formatter},
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use rug::{Complete, Integer as MultiPrecisionInteger};
use serde::{Deserialize, Serialize};

use super::InternalOrdering;

/// An arbitrary-size integer.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Integer {
    Natural(i64),
    Large(MultiPrecisionInteger),
}

impl InternalOrdering for Integer {
    fn internal_cmp(&self, other: &Self) -> Ordering {
        Ord::cmp(self, other)
    }
}

macro_rules! from_with_cast {
    ($base: ty) => {
        impl From<$base> for Integer {
            #[inline]
            fn from(value: $base) -> Self {
                Integer::Natural(value as i64)
            }
        }

        impl PartialEq<$base> for Integer {
            #[inline]
            fn eq(&self, other: &$base) -> bool {
                match self {
                    Integer::Natural(n) => *n == *other as i64,
                    _ => false,
                }
            }
        }

        impl PartialOrd<$base> for Integer {
            #[inline]
            fn partial_cmp(&self, other: &$base) -> Option<Ordering> {
                match self {
                    Integer::Natural(n) => n.partial_cmp(&(*other as i64)),
                    x => {
                        if x.is_negative() {
                            Some(Ordering::Less)
                        } else {
                            Some(Ordering::Greater)
                        }
                    }
                }
            }
        }
    };
}

from_with_cast!(i8);
from_with_cast!(i16);
from_with_cast!(i32);
from_with_cast!(i64);
from_with_cast!(u8);
from_with_cast!(u16);
from_with_cast!(u32);

impl From<u64> for Integer {
    #[inline]
    fn from(value: u64) -> Self {
        if value <= i64::MAX as u64 {
            Integer::Natural(value as i64)
        } else {
            Integer::Large(value.into())
        }
    }
}

impl From<usize> for Integer {
    #[inline]
    fn from(value: usize) -> Self {
        Integer::from(value as u64)
    }
}

impl From<i128> for Integer {
    #[inline]
    fn from(value: i128) -> Self {
        if value >= i64::MIN as i128 && value <= i64::MAX as i128 {
            Integer::Natural(value as i64)
        } else {
            Integer::Large(value.into())
        }
    }
}

impl From<MultiPrecisionInteger> for Integer {
    #[inline]
    fn from(n: MultiPrecisionInteger) -> Self {
        if let Some(n) = n.to_i64() {
            Integer::Natural(n)
        } else {
            Integer::Large(n)
        }
    }
}

impl Integer {
    pub fn new(num: i64) -> Integer {
        Integer::Natural(num)
    }

    #[inline]
    fn simplify(&mut self) -> &mut Self {
        if let Integer::Large(l) = self {
            if let Some(n) = l.to_i64() {
                *self = Integer::Natural(n);
            }
        }
        self
    }

    #[inline]
    pub fn zero() -> Integer {
        Integer::Natural(0)
    }

    #[inline]
    pub fn one() -> Integer {
        Integer::Natural(1)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        matches!(self, Integer::Natural(0))
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        match self {
            Integer::Natural(n) => *n < 0,
            Integer::Large(r) => r.cmp0() == Ordering::Less,
        }
    }

    #[inline]
    pub fn is_odd(&self) -> bool {
        match self {
            Integer::Natural(n) => n & 1 == 1,
            Integer::Large(r) => r.is_odd(),
        }
    }

    #[inline]
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Integer::Natural(n) => Some(*n),
            Integer::Large(_) => None,
        }
    }

    /// Convert to an `i32`, if it fits.
    #[inline]
    pub fn to_i32(&self) -> Option<i32> {
        self.to_i64().and_then(|n| i32::try_from(n).ok())
    }

    /// Convert to a shift amount. Shifts that do not fit in a `u32` would
    /// require an allocation of more than 512 MiB and are treated as
    /// resource exhaustion.
    #[inline]
    pub fn to_shift(&self) -> u32 {
        match self.to_i64().and_then(|n| u32::try_from(n).ok()) {
            Some(s) => s,
            None => panic!("Shift amount {} is out of range", self),
        }
    }

    pub fn to_multi_prec(self) -> MultiPrecisionInteger {
        match self {
            Integer::Natural(n) => n.into(),
            Integer::Large(l) => l,
        }
    }

    pub fn abs(&self) -> Integer {
        match self {
            Integer::Natural(n) => {
                if *n == i64::MIN {
                    Integer::Large(MultiPrecisionInteger::from(*n).abs())
                } else {
                    Integer::Natural(n.abs())
                }
            }
            Integer::Large(n) => Integer::Large(n.clone().abs()),
        }
    }

    /// Compute `floor(self / 2)`.
    pub fn half_floor(&self) -> Integer {
        match self {
            Integer::Natural(n) => Integer::Natural(n >> 1),
            Integer::Large(r) => Integer::from((r >> 1u32).complete()),
        }
    }

    /// Compute `2 * self`.
    pub fn double(&self) -> Integer {
        self + self
    }
}

impl std::fmt::Debug for Integer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Integer::Natural(n) => std::fmt::Debug::fmt(n, f),
            Integer::Large(r) => std::fmt::Debug::fmt(r, f),
        }
    }
}

impl Display for Integer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Integer::Natural(n) => n.fmt(f),
            Integer::Large(r) => r.fmt(f),
        }
    }
}

impl PartialOrd for Integer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Integer {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Integer::Natural(n1), Integer::Natural(n2)) => n1.cmp(n2),
            (Integer::Natural(n1), Integer::Large(n2)) => n2
                .partial_cmp(n1)
                .map(|x| x.reverse())
                .unwrap_or(Ordering::Equal),
            (Integer::Large(n1), Integer::Natural(n2)) => {
                n1.partial_cmp(n2).unwrap_or(Ordering::Equal)
            }
            (Integer::Large(n1), Integer::Large(n2)) => n1.cmp(n2),
        }
    }
}

impl<'a, 'b> Add<&'b Integer> for &'a Integer {
    type Output = Integer;

    #[inline(always)]
    fn add(self, rhs: &'b Integer) -> Integer {
        match (self, rhs) {
            (Integer::Natural(n1), Integer::Natural(n2)) => {
                if let Some(num) = n1.checked_add(*n2) {
                    Integer::Natural(num)
                } else {
                    Integer::from(*n1 as i128 + *n2 as i128)
                }
            }
            (Integer::Natural(n1), Integer::Large(r2))
            | (Integer::Large(r2), Integer::Natural(n1)) => Integer::from((*n1 + r2).complete()),
            (Integer::Large(r1), Integer::Large(r2)) => Integer::from((r1 + r2).complete()),
        }
    }
}

impl<'b> Add<&'b Integer> for Integer {
    type Output = Integer;

    #[inline(always)]
    fn add(self, rhs: &'b Integer) -> Integer {
        &self + rhs
    }
}

impl Add<Integer> for Integer {
    type Output = Integer;

    #[inline(always)]
    fn add(self, rhs: Integer) -> Integer {
        &self + &rhs
    }
}

impl<'a, 'b> Sub<&'b Integer> for &'a Integer {
    type Output = Integer;

    #[inline(always)]
    fn sub(self, rhs: &'b Integer) -> Integer {
        match (self, rhs) {
            (Integer::Natural(n1), Integer::Natural(n2)) => {
                if let Some(num) = n1.checked_sub(*n2) {
                    Integer::Natural(num)
                } else {
                    Integer::from(*n1 as i128 - *n2 as i128)
                }
            }
            (Integer::Natural(n1), Integer::Large(r2)) => Integer::from((*n1 - r2).complete()),
            (Integer::Large(r1), Integer::Natural(n2)) => Integer::from((r1 - *n2).complete()),
            (Integer::Large(r1), Integer::Large(r2)) => Integer::from((r1 - r2).complete()),
        }
    }
}

impl<'b> Sub<&'b Integer> for Integer {
    type Output = Integer;

    #[inline(always)]
    fn sub(self, rhs: &'b Integer) -> Integer {
        &self - rhs
    }
}

impl Sub<Integer> for Integer {
    type Output = Integer;

    #[inline(always)]
    fn sub(self, rhs: Integer) -> Integer {
        &self - &rhs
    }
}

impl<'a> Add<i64> for &'a Integer {
    type Output = Integer;

    #[inline(always)]
    fn add(self, rhs: i64) -> Integer {
        match self {
            Integer::Natural(n) => {
                if let Some(num) = n.checked_add(rhs) {
                    Integer::Natural(num)
                } else {
                    Integer::from(*n as i128 + rhs as i128)
                }
            }
            Integer::Large(r) => Integer::from((r + rhs).complete()),
        }
    }
}

impl Add<i64> for Integer {
    type Output = Integer;

    #[inline(always)]
    fn add(self, rhs: i64) -> Integer {
        &self + rhs
    }
}

impl<'a> Sub<i64> for &'a Integer {
    type Output = Integer;

    #[inline(always)]
    fn sub(self, rhs: i64) -> Integer {
        match self {
            Integer::Natural(n) => {
                if let Some(num) = n.checked_sub(rhs) {
                    Integer::Natural(num)
                } else {
                    Integer::from(*n as i128 - rhs as i128)
                }
            }
            Integer::Large(r) => Integer::from((r - rhs).complete()),
        }
    }
}

impl Sub<i64> for Integer {
    type Output = Integer;

    #[inline(always)]
    fn sub(self, rhs: i64) -> Integer {
        &self - rhs
    }
}

impl<'a> AddAssign<&'a Integer> for Integer {
    #[inline(always)]
    fn add_assign(&mut self, rhs: &'a Integer) {
        if let Integer::Large(l) = self {
            match rhs {
                Integer::Natural(r) => l.add_assign(*r),
                Integer::Large(r) => l.add_assign(r),
            }

            self.simplify();
        } else {
            *self = &*self + rhs;
        }
    }
}

impl AddAssign<i64> for Integer {
    #[inline(always)]
    fn add_assign(&mut self, rhs: i64) {
        if let Integer::Large(l) = self {
            l.add_assign(rhs);
            self.simplify();
        } else {
            *self = &*self + rhs;
        }
    }
}

impl<'a> SubAssign<&'a Integer> for Integer {
    #[inline(always)]
    fn sub_assign(&mut self, rhs: &'a Integer) {
        if let Integer::Large(l) = self {
            match rhs {
                Integer::Natural(r) => l.sub_assign(*r),
                Integer::Large(r) => l.sub_assign(r),
            }

            self.simplify();
        } else {
            *self = &*self - rhs;
        }
    }
}

impl SubAssign<i64> for Integer {
    #[inline(always)]
    fn sub_assign(&mut self, rhs: i64) {
        if let Integer::Large(l) = self {
            l.sub_assign(rhs);
            self.simplify();
        } else {
            *self = &*self - rhs;
        }
    }
}

impl Neg for Integer {
    type Output = Integer;

    #[inline]
    fn neg(self) -> Self::Output {
        -&self
    }
}

impl<'a> Neg for &'a Integer {
    type Output = Integer;

    #[inline]
    fn neg(self) -> Self::Output {
        match self {
            Integer::Natural(n) => {
                if let Some(neg) = n.checked_neg() {
                    Integer::Natural(neg)
                } else {
                    Integer::from(-(*n as i128))
                }
            }
            Integer::Large(r) => Integer::from(r.clone().neg()),
        }
    }
}
