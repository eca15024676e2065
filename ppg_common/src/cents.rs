use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CURRENCY_CODE: &str = "NOK";

//--------------------------------------        Cents        ---------------------------------------------------------

/// A monetary amount in minor currency units. Price deltas may be negative, so the inner value is signed.
#[derive(Debug, Clone, Copy, Default, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(i64);

impl Add for Cents {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Cents {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Cents {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Cents {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<i64> for Cents {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in cents: {0}")]
pub struct CentsConversionError(String);

impl From<i64> for Cents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Cents {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Cents {}

impl TryFrom<u64> for Cents {
    type Error = CentsConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(CentsConversionError(format!("Value {} is too large to convert to Cents", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Cents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Cents {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_whole(units: i64) -> Self {
        Self(units * 100)
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}
