//! Fee schedule and money representation.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Money in pence. Serializes as decimal pounds, which is how the cart
/// contract carries amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Money(u32);

impl Money {
    pub const fn from_pence(pence: u32) -> Self {
        Self(pence)
    }

    pub const fn from_pounds(pounds: u32) -> Self {
        Self(pounds * 100)
    }

    pub fn pence(&self) -> u32 {
        self.0
    }

    pub fn pounds(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "£{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::default(), Add::add)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.pounds())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pounds = f64::deserialize(deserializer)?;
        Ok(Money((pounds * 100.0).round() as u32))
    }
}

/// Vectorization of a single-colour design.
pub const VECTORIZATION_SINGLE: Money = Money::from_pounds(30);
/// Vectorization of a dual-colour design.
pub const VECTORIZATION_DUAL: Money = Money::from_pounds(50);
/// One-time plate setup for a design that has never been printed.
pub const PLATE_SETUP: Money = Money::from_pounds(100);
/// Advisory surcharge quoted for complex designs before validation.
pub const COMPLEXITY_SURCHARGE: Money = Money::from_pounds(20);

/// One named charge attached to a cart line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeLine {
    pub label: String,
    pub amount: Money,
}

impl FeeLine {
    pub fn new(label: impl Into<String>, amount: Money) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

/// Vectorization is always charged for a validated custom design; the
/// rate depends on the final colour count.
pub fn vectorization_fee(color_count: usize) -> FeeLine {
    let amount = if color_count <= 1 {
        VECTORIZATION_SINGLE
    } else {
        VECTORIZATION_DUAL
    };
    FeeLine::new("Vectorization", amount)
}

pub fn plate_setup_fee() -> FeeLine {
    FeeLine::new("Plate setup", PLATE_SETUP)
}

pub fn complexity_surcharge() -> FeeLine {
    FeeLine::new("Complex design surcharge", COMPLEXITY_SURCHARGE)
}

/// The checkout fee list for a validated design.
pub fn quote_fees(color_count: usize, first_time: bool) -> Vec<FeeLine> {
    let mut fees = vec![vectorization_fee(color_count)];
    if first_time {
        fees.push(plate_setup_fee());
    }
    fees
}

/// Sum of a fee list.
pub fn total(fees: &[FeeLine]) -> Money {
    fees.iter().map(|fee| fee.amount).sum()
}
