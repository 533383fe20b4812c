//! Date units of a rule system.
//!
//! A [`Unit`] is one of `day`, `month`, `year` or `eternity`. Each unit carries
//! a key and a weight, and units are totally ordered by weight:
//! `Day < Month < Year < Eternity`.
//!
//! Units compare transparently against their spellings, in any case:
//! ```
//! use fiscalis::unit::Unit;
//! assert!(Unit::Day == "DAY");
//! assert!("day" < Unit::Month);
//! assert_eq!(Unit::lookup("Year").unwrap(), Unit::Year);
//! ```

// custom made ordering for units
use std::cmp::Ordering;
// used to print out readable forms of a unit
use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::{FiscalisError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Day,
    Month,
    Year,
    Eternity,
}

impl Unit {
    /// Every unit, in increasing weight.
    pub const ALL: [Unit; 4] = [Unit::Day, Unit::Month, Unit::Year, Unit::Eternity];

    pub fn key(&self) -> &'static str {
        match self {
            Unit::Day => "day",
            Unit::Month => "month",
            Unit::Year => "year",
            Unit::Eternity => "eternity",
        }
    }
    pub fn weight(&self) -> u32 {
        match self {
            Unit::Day => 100,
            Unit::Month => 200,
            Unit::Year => 300,
            Unit::Eternity => 400,
        }
    }
    /// Finds a unit from another unit or from any casing of its key.
    pub fn lookup<U: IntoUnit>(value: U) -> Result<Unit> {
        value.into_unit()
    }
    pub fn contains<U: IntoUnit>(value: U) -> bool {
        value.into_unit().is_ok()
    }
    pub fn weight_of<U: IntoUnit>(value: U) -> Result<u32> {
        Ok(value.into_unit()?.weight())
    }
    /// Compares against a unit or a unit spelling, by weight only.
    pub fn compare<U: IntoUnit>(&self, other: U) -> Result<Ordering> {
        Ok(self.weight().cmp(&other.into_unit()?.weight()))
    }
    pub fn is_ethereal(&self) -> bool {
        *self != Unit::Eternity
    }
    pub fn keys() -> Vec<&'static str> {
        Unit::ALL.iter().map(Unit::key).collect()
    }
    /// The keys of day, month and year, in increasing weight.
    pub fn ethereal_keys() -> Vec<&'static str> {
        Unit::ALL.iter().filter(|u| u.is_ethereal()).map(Unit::key).collect()
    }
    pub fn eternal_keys() -> Vec<&'static str> {
        Unit::ALL.iter().filter(|u| !u.is_ethereal()).map(Unit::key).collect()
    }
    pub fn weights() -> Vec<(&'static str, u32)> {
        Unit::ALL.iter().map(|u| (u.key(), u.weight())).collect()
    }
    pub fn upper(&self) -> String {
        self.key().to_uppercase()
    }
    pub fn lower(&self) -> &'static str {
        self.key()
    }
}

// ------------- Conversions -------------
/// Anything that may name a unit: a unit itself or one of its spellings.
pub trait IntoUnit {
    fn into_unit(self) -> Result<Unit>;
}
impl IntoUnit for Unit {
    fn into_unit(self) -> Result<Unit> {
        Ok(self)
    }
}
impl IntoUnit for &Unit {
    fn into_unit(self) -> Result<Unit> {
        Ok(*self)
    }
}
impl IntoUnit for &str {
    fn into_unit(self) -> Result<Unit> {
        Unit::ALL
            .iter()
            .find(|u| u.key().eq_ignore_ascii_case(self))
            .copied()
            .ok_or_else(|| FiscalisError::InvalidUnit(self.to_owned()))
    }
}
impl IntoUnit for &String {
    fn into_unit(self) -> Result<Unit> {
        self.as_str().into_unit()
    }
}
impl IntoUnit for String {
    fn into_unit(self) -> Result<Unit> {
        self.as_str().into_unit()
    }
}

impl FromStr for Unit {
    type Err = FiscalisError;
    fn from_str(s: &str) -> Result<Self> {
        s.into_unit()
    }
}
impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ------------- Ordering -------------
impl Ord for Unit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight().cmp(&other.weight())
    }
}
impl PartialOrd for Unit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Unknown spellings are neither equal nor ordered.
impl PartialEq<str> for Unit {
    fn eq(&self, other: &str) -> bool {
        self.key().eq_ignore_ascii_case(other)
    }
}
impl PartialEq<&str> for Unit {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
impl PartialEq<Unit> for str {
    fn eq(&self, other: &Unit) -> bool {
        other == self
    }
}
impl PartialEq<Unit> for &str {
    fn eq(&self, other: &Unit) -> bool {
        other == *self
    }
}
impl PartialOrd<str> for Unit {
    fn partial_cmp(&self, other: &str) -> Option<Ordering> {
        self.compare(other).ok()
    }
}
impl PartialOrd<&str> for Unit {
    fn partial_cmp(&self, other: &&str) -> Option<Ordering> {
        self.compare(*other).ok()
    }
}
impl PartialOrd<Unit> for str {
    fn partial_cmp(&self, other: &Unit) -> Option<Ordering> {
        other.compare(self).ok().map(Ordering::reverse)
    }
}
impl PartialOrd<Unit> for &str {
    fn partial_cmp(&self, other: &Unit) -> Option<Ordering> {
        other.compare(*self).ok().map(Ordering::reverse)
    }
}

// ------------- Deprecated -------------
#[deprecated(since = "0.1.0", note = "use `Unit::weights` instead")]
pub fn unit_weights() -> Vec<(&'static str, u32)> {
    warn!("unit_weights is deprecated, use Unit::weights");
    Unit::weights()
}

#[deprecated(since = "0.1.0", note = "use `Unit::weight` instead")]
pub fn unit_weight<U: IntoUnit>(unit: U) -> Result<u32> {
    warn!("unit_weight is deprecated, use Unit::weight");
    Unit::weight_of(unit)
}
