//! Instants: the indivisible day dates of a rule system.
//!
//! An [`Instant`] is an immutable `(year, month, day)` triple. It is not
//! validated on construction; an impossible triple surfaces as
//! [`FiscalisError::InvalidDate`] once it is converted with [`Instant::as_date`]
//! or shifted with [`Instant::offset`].
//!
//! Conversions to [`NaiveDate`] and to the ISO string form are pure, so both
//! are memoized process wide, keyed by the instant itself.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

// used for the calendar date behind an instant
use chrono::{Datelike, NaiveDate};
// other keepers use HashMap with a fast hasher
use core::hash::BuildHasherDefault;
use seahash::SeaHasher;

use lazy_static::lazy_static;
use tracing::{debug, trace};

use crate::error::{FiscalisError, Result};
use crate::period::{Period, PeriodSize};
use crate::unit::{IntoUnit, Unit};

pub type InstantHasher = BuildHasherDefault<SeaHasher>;

// ------------- Memo -------------
// Insert-once table of values derived from instants. Entries are never
// invalidated since the same instant always derives the same value.
struct Memo<V> {
    kept: RwLock<HashMap<Instant, V, InstantHasher>>,
}
impl<V: Clone> Memo<V> {
    fn new() -> Self {
        Self {
            kept: RwLock::new(HashMap::default()),
        }
    }
    fn get(&self, instant: &Instant) -> Option<V> {
        let kept = self
            .kept
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(instant)
            .cloned();
        if kept.is_some() {
            trace!(year = instant.year, month = instant.month, day = instant.day, "memo hit");
        }
        kept
    }
    fn keep(&self, instant: Instant, value: V) -> V {
        debug!(year = instant.year, month = instant.month, day = instant.day, "memo insert");
        self.kept
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(instant)
            .or_insert(value)
            .clone()
    }
}

lazy_static! {
    static ref DATE_BY_INSTANT: Memo<NaiveDate> = Memo::new();
    static ref STR_BY_INSTANT: Memo<Arc<str>> = Memo::new();
}

// ------------- Offset -------------
/// How far to move an instant: a signed number of units, or an anchor to
/// the first or last day of the enclosing unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Offset {
    By(i32),
    FirstOf,
    LastOf,
}
impl From<i32> for Offset {
    fn from(amount: i32) -> Self {
        Offset::By(amount)
    }
}
impl FromStr for Offset {
    type Err = FiscalisError;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "first-of" => Ok(Offset::FirstOf),
            "last-of" => Ok(Offset::LastOf),
            _ => s
                .parse::<i32>()
                .map(Offset::By)
                .map_err(|_| FiscalisError::InvalidOffset(s.to_owned())),
        }
    }
}
impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Offset::By(amount) => write!(f, "{}", amount),
            Offset::FirstOf => write!(f, "first-of"),
            Offset::LastOf => write!(f, "last-of"),
        }
    }
}

// ------------- Calendar -------------
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in a month; `month` must lie in `1..=12`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

// ------------- Instant -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant {
    year: i32,
    month: u32,
    day: u32,
}

impl Instant {
    /// The earliest instant, where eternity starts.
    pub const MIN: Instant = Instant {
        year: 1,
        month: 1,
        day: 1,
    };
    /// Stands for the unreachable end of eternity.
    pub const MAX: Instant = Instant {
        year: i32::MAX,
        month: 12,
        day: 31,
    };

    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
    pub fn year(&self) -> i32 {
        self.year
    }
    pub fn month(&self) -> u32 {
        self.month
    }
    pub fn day(&self) -> u32 {
        self.day
    }
    fn invalid(&self) -> FiscalisError {
        FiscalisError::InvalidDate {
            year: self.year,
            month: self.month,
            day: self.day,
        }
    }
    pub fn as_date(&self) -> Result<NaiveDate> {
        if let Some(date) = DATE_BY_INSTANT.get(self) {
            return Ok(date);
        }
        let date = NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .ok_or_else(|| self.invalid())?;
        Ok(DATE_BY_INSTANT.keep(*self, date))
    }
    pub fn period(&self, unit: impl IntoUnit, size: i64) -> Result<Period> {
        let unit = unit.into_unit()?;
        let size = u32::try_from(size)
            .ok()
            .filter(|s| *s >= 1)
            .ok_or(FiscalisError::InvalidSize(size))?;
        Ok(Period::new(unit, *self, PeriodSize::Finite(size)))
    }
    /// Shifts this instant by a number of days, months or years, or anchors
    /// it to the first or last day of its month or year.
    ///
    /// Month and year shifts clamp the day to the length of the month they
    /// land in, so `2021-01-31` plus one month is `2021-02-28`.
    pub fn offset(&self, offset: impl Into<Offset>, unit: impl IntoUnit) -> Result<Instant> {
        let unit = unit.into_unit()?;
        if !unit.is_ethereal() {
            return Err(FiscalisError::InvalidUnit(unit.key().to_owned()));
        }
        self.as_date()?;
        let Instant {
            mut year,
            mut month,
            mut day,
        } = *self;
        match (offset.into(), unit) {
            (Offset::FirstOf, Unit::Month) => day = 1,
            (Offset::FirstOf, Unit::Year) => {
                month = 1;
                day = 1;
            }
            (Offset::LastOf, Unit::Month) => day = days_in_month(year, month),
            (Offset::LastOf, Unit::Year) => {
                month = 12;
                day = 31;
            }
            (Offset::FirstOf | Offset::LastOf, _) => (),
            (Offset::By(amount), Unit::Day) => {
                let mut shifted = i64::from(day) + i64::from(amount);
                while shifted < 1 {
                    if month == 1 {
                        year = year.checked_sub(1).ok_or_else(|| self.invalid())?;
                        month = 12;
                    } else {
                        month -= 1;
                    }
                    shifted += i64::from(days_in_month(year, month));
                }
                while shifted > i64::from(days_in_month(year, month)) {
                    shifted -= i64::from(days_in_month(year, month));
                    if month == 12 {
                        year = year.checked_add(1).ok_or_else(|| self.invalid())?;
                        month = 1;
                    } else {
                        month += 1;
                    }
                }
                day = shifted as u32;
            }
            (Offset::By(amount), Unit::Month) => {
                let months = i64::from(year) * 12 + i64::from(month) - 1 + i64::from(amount);
                year = i32::try_from(months.div_euclid(12)).map_err(|_| self.invalid())?;
                month = months.rem_euclid(12) as u32 + 1;
                day = day.min(days_in_month(year, month));
            }
            (Offset::By(amount), _) => {
                year = year.checked_add(amount).ok_or_else(|| self.invalid())?;
                day = day.min(days_in_month(year, month));
            }
        }
        Ok(Instant::new(year, month, day))
    }
    fn iso(&self) -> Arc<str> {
        STR_BY_INSTANT.get(self).unwrap_or_else(|| {
            let iso = format!("{:04}-{:02}-{:02}", self.year, self.month, self.day);
            STR_BY_INSTANT.keep(*self, Arc::from(iso))
        })
    }
}

impl From<NaiveDate> for Instant {
    fn from(date: NaiveDate) -> Self {
        Instant::new(date.year(), date.month(), date.day())
    }
}
impl From<(i32, u32, u32)> for Instant {
    fn from((year, month, day): (i32, u32, u32)) -> Self {
        Instant::new(year, month, day)
    }
}
impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.iso())
    }
}
