//! Periods and the parsing of period-like values.
//!
//! A [`Period`] is a `(unit, start, size)` triple: `size` consecutive units
//! of granularity `unit`, beginning at the instant `start`. Periods are built
//! either by [`Instant::period`] or by [`parse_period`], which understands the
//! strings written in simulation inputs:
//!
//! * `2014`, `2014-02`, `2014-02-03`: one year, month or day;
//! * `month:2014-02`, `year:2014-02:3`: a unit, a start and an optional size;
//! * `ETERNITY`: the whole of time.
//!
//! ```
//! use fiscalis::period::parse_period;
//! use fiscalis::unit::Unit;
//! let period = parse_period("year:2014-2:3").unwrap();
//! assert_eq!(period.unit(), Unit::Year);
//! assert_eq!(period.to_string(), "year:2014-02:3");
//! ```

use std::fmt;

// used to check that a parsed day exists
use chrono::NaiveDate;
use lazy_static::lazy_static;
// the "standard" regular expression package
use regex::Regex;
use tracing::debug;

use crate::error::{FiscalisError, Result};
use crate::instant::{Instant, Offset, days_in_month};
use crate::unit::{IntoUnit, Unit};

const INSTANT_FORMAT: &str = "Instants are described using the 'YYYY-MM-DD' format, for instance '2015-06-15'";

lazy_static! {
    // same shapes as strptime with '%Y', '%Y-%m' and '%Y-%m-%d'
    static ref SIMPLE_PERIOD: Regex = Regex::new(
        r"^(\d{4})(?:-(1[0-2]|0[1-9]|[1-9])(?:-(3[01]|[12]\d|0[1-9]|[1-9]))?)?$"
    ).expect("valid simple period pattern");
    static ref INSTANT_PATTERN: Regex = Regex::new(r"^\d{4}(?:-\d{1,2}){0,2}$")
        .expect("valid instant pattern");
}

// ------------- PeriodSize -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PeriodSize {
    Finite(u32),
    Infinite,
}
impl fmt::Display for PeriodSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PeriodSize::Finite(size) => write!(f, "{}", size),
            PeriodSize::Infinite => write!(f, "inf"),
        }
    }
}

// ------------- Period -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    unit: Unit,
    start: Instant,
    size: PeriodSize,
}

impl Period {
    pub(crate) fn new(unit: Unit, start: Instant, size: PeriodSize) -> Self {
        Self { unit, start, size }
    }
    /// The whole of time, starting at [`Instant::MIN`].
    pub fn eternity() -> Self {
        Self {
            unit: Unit::Eternity,
            start: Instant::MIN,
            size: PeriodSize::Infinite,
        }
    }
    pub fn unit(&self) -> Unit {
        self.unit
    }
    pub fn start(&self) -> Instant {
        self.start
    }
    pub fn size(&self) -> PeriodSize {
        self.size
    }
    /// The last day of the period, or [`Instant::MAX`] for eternity.
    pub fn stop(&self) -> Result<Instant> {
        let size = match (self.unit, self.size) {
            (Unit::Eternity, _) | (_, PeriodSize::Infinite) => return Ok(Instant::MAX),
            (_, PeriodSize::Finite(size)) => i64::from(size),
        };
        self.start.as_date()?;
        let (year, month, day) = (self.start.year(), self.start.month(), self.start.day());
        if self.unit == Unit::Day {
            return self.start.offset(shift(size - 1)?, Unit::Day);
        }
        let months = i64::from(year) * 12 + i64::from(month) - 1
            + if self.unit == Unit::Month { size } else { size * 12 };
        let year = i32::try_from(months.div_euclid(12)).map_err(|_| self.overflow())?;
        let month = months.rem_euclid(12) as u32 + 1;
        // the day before the same day, without clamping the shifted month first
        if day == 1 {
            return Instant::new(year, month, 1).offset(-1, Unit::Day);
        }
        let last = days_in_month(year, month);
        if day - 1 > last {
            Instant::new(year, month, last).offset((day - 1 - last) as i32, Unit::Day)
        } else {
            Ok(Instant::new(year, month, day - 1))
        }
    }
    /// Shifts the start of the period, keeping its unit and size.
    pub fn offset(&self, offset: impl Into<Offset>, unit: impl IntoUnit) -> Result<Period> {
        Ok(Self {
            start: self.start.offset(offset, unit)?,
            ..*self
        })
    }
    /// Whether `other` lies entirely within this period.
    pub fn contains(&self, other: &Period) -> Result<bool> {
        Ok(self.start <= other.start && other.stop()? <= self.stop()?)
    }
    /// Splits the period into consecutive single-unit periods of `unit`,
    /// which must not be coarser than the period's own unit.
    pub fn subperiods(&self, unit: impl IntoUnit) -> Result<Vec<Period>> {
        let unit = unit.into_unit()?;
        if !unit.is_ethereal() || !self.unit.is_ethereal() || unit > self.unit {
            return Err(FiscalisError::InvalidUnit(unit.key().to_owned()));
        }
        let stop = self.stop()?;
        let mut periods = Vec::new();
        let mut start = self.start;
        let mut step: i32 = 0;
        while start <= stop {
            periods.push(Period::new(unit, start, PeriodSize::Finite(1)));
            step = step.checked_add(1).ok_or_else(|| self.overflow())?;
            // months and years step from the start so that clamped days do not drift
            start = match unit {
                Unit::Day => start.offset(1, Unit::Day)?,
                _ => self.start.offset(step, unit)?,
            };
        }
        Ok(periods)
    }
    fn overflow(&self) -> FiscalisError {
        FiscalisError::InvalidDate {
            year: self.start.year(),
            month: self.start.month(),
            day: self.start.day(),
        }
    }
}

fn shift(amount: i64) -> Result<i32> {
    i32::try_from(amount).map_err(|_| FiscalisError::InvalidSize(amount))
}

// Canonical string form, readable again by parse_period.
impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let size = match self.size {
            PeriodSize::Finite(size) if self.unit.is_ethereal() => size,
            _ => return write!(f, "ETERNITY"),
        };
        let (year, month, day) = (self.start.year(), self.start.month(), self.start.day());
        match self.unit {
            Unit::Month if size == 12 => fmt_year(f, year, month, 1),
            Unit::Year => fmt_year(f, year, month, size),
            Unit::Month if size == 1 => write!(f, "{:04}-{:02}", year, month),
            Unit::Month => write!(f, "month:{:04}-{:02}:{}", year, month, size),
            Unit::Day if size == 1 => write!(f, "{:04}-{:02}-{:02}", year, month, day),
            _ => write!(f, "day:{:04}-{:02}-{:02}:{}", year, month, day, size),
        }
    }
}

fn fmt_year(f: &mut fmt::Formatter, year: i32, month: u32, size: u32) -> fmt::Result {
    match (month, size) {
        (1, 1) => write!(f, "{:04}", year),
        (1, _) => write!(f, "year:{:04}:{}", year, size),
        (_, 1) => write!(f, "year:{:04}-{:02}", year, month),
        (_, _) => write!(f, "year:{:04}-{:02}:{}", year, month, size),
    }
}

// ------------- Parsing -------------
/// The values [`parse_period`] understands.
#[derive(Debug, Clone, Copy)]
pub enum PeriodLike<'a> {
    Period(Period),
    Instant(Instant),
    Unit(Unit),
    Year(i32),
    Text(&'a str),
}
impl From<Period> for PeriodLike<'_> {
    fn from(period: Period) -> Self {
        PeriodLike::Period(period)
    }
}
impl From<Instant> for PeriodLike<'_> {
    fn from(instant: Instant) -> Self {
        PeriodLike::Instant(instant)
    }
}
impl From<Unit> for PeriodLike<'_> {
    fn from(unit: Unit) -> Self {
        PeriodLike::Unit(unit)
    }
}
impl From<i32> for PeriodLike<'_> {
    fn from(year: i32) -> Self {
        PeriodLike::Year(year)
    }
}
impl<'a> From<&'a str> for PeriodLike<'a> {
    fn from(text: &'a str) -> Self {
        PeriodLike::Text(text)
    }
}
impl<'a> From<&'a String> for PeriodLike<'a> {
    fn from(text: &'a String) -> Self {
        PeriodLike::Text(text)
    }
}
impl fmt::Display for PeriodLike<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PeriodLike::Period(period) => write!(f, "{}", period),
            PeriodLike::Instant(instant) => write!(f, "{}", instant),
            PeriodLike::Unit(unit) => write!(f, "{}", unit),
            PeriodLike::Year(year) => write!(f, "{}", year),
            PeriodLike::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Normalizes a period-like value into a [`Period`].
pub fn parse_period<'a>(value: impl Into<PeriodLike<'a>>) -> Result<Period> {
    let value = value.into();
    match value {
        PeriodLike::Period(period) => Ok(period),
        PeriodLike::Instant(instant) => Ok(Period::new(Unit::Day, instant, PeriodSize::Finite(1))),
        PeriodLike::Unit(Unit::Eternity) => Ok(Period::eternity()),
        PeriodLike::Unit(_) => Err(reject(&value)),
        PeriodLike::Year(year) => Ok(Period::new(
            Unit::Year,
            Instant::new(year, 1, 1),
            PeriodSize::Finite(1),
        )),
        PeriodLike::Text(text) => parse_text(text),
    }
}

fn reject(value: &dyn fmt::Display) -> FiscalisError {
    debug!(%value, "rejected period");
    FiscalisError::invalid_period(value)
}

fn parse_text(value: &str) -> Result<Period> {
    if Unit::Eternity == value {
        return Ok(Period::eternity());
    }
    if let Some(period) = parse_simple_period(value) {
        return Ok(period);
    }
    // complex periods are "unit:date" or "unit:date:size"
    let components: Vec<&str> = value.split(':').collect();
    if !(2..=3).contains(&components.len()) {
        return Err(reject(&value));
    }
    // case sensitive, unlike unit lookups
    let unit = Unit::ALL
        .into_iter()
        .find(|u| u.is_ethereal() && u.key() == components[0])
        .ok_or_else(|| reject(&value))?;
    let base = parse_simple_period(components[1]).ok_or_else(|| reject(&value))?;
    let size = match components.get(2) {
        None => 1,
        Some(size) => size
            .parse::<u32>()
            .ok()
            .filter(|s| *s >= 1)
            .ok_or_else(|| reject(&value))?,
    };
    // a month anchored on a bare year is ambiguous
    if base.unit > unit {
        return Err(reject(&value));
    }
    Ok(Period::new(unit, base.start, PeriodSize::Finite(size)))
}

// Parses "YYYY", "YYYY-MM" or "YYYY-MM-DD" into a single year, month or day.
fn parse_simple_period(value: &str) -> Option<Period> {
    let captures = SIMPLE_PERIOD.captures(value)?;
    let year = captures.get(1)?.as_str().parse::<i32>().ok().filter(|y| *y >= 1)?;
    let month = captures.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
    let day = captures.get(3).and_then(|d| d.as_str().parse::<u32>().ok());
    let (unit, start) = match (month, day) {
        (None, _) => (Unit::Year, Instant::new(year, 1, 1)),
        (Some(month), None) => (Unit::Month, Instant::new(year, month, 1)),
        (Some(month), Some(day)) => {
            NaiveDate::from_ymd_opt(year, month, day)?;
            (Unit::Day, Instant::new(year, month, day))
        }
    };
    Some(Period::new(unit, start, PeriodSize::Finite(1)))
}

/// Sorting key of a period: its unit weight, then its size, e.g. `"200_2"`.
pub fn sort_key(period: &Period) -> String {
    format!("{}_{}", period.unit.weight(), period.size)
}

// ------------- Instants -------------
/// The values [`parse_instant`] understands.
#[derive(Debug, Clone, Copy)]
pub enum InstantLike<'a> {
    Instant(Instant),
    Period(Period),
    Date(NaiveDate),
    Year(i32),
    Text(&'a str),
}
impl From<Instant> for InstantLike<'_> {
    fn from(instant: Instant) -> Self {
        InstantLike::Instant(instant)
    }
}
impl From<Period> for InstantLike<'_> {
    fn from(period: Period) -> Self {
        InstantLike::Period(period)
    }
}
impl From<NaiveDate> for InstantLike<'_> {
    fn from(date: NaiveDate) -> Self {
        InstantLike::Date(date)
    }
}
impl From<i32> for InstantLike<'_> {
    fn from(year: i32) -> Self {
        InstantLike::Year(year)
    }
}
impl<'a> From<&'a str> for InstantLike<'a> {
    fn from(text: &'a str) -> Self {
        InstantLike::Text(text)
    }
}

/// Normalizes an instant-like value; a missing month or day means the first.
pub fn parse_instant<'a>(value: impl Into<InstantLike<'a>>) -> Result<Instant> {
    match value.into() {
        InstantLike::Instant(instant) => Ok(instant),
        InstantLike::Period(period) => Ok(period.start()),
        InstantLike::Date(date) => Ok(Instant::from(date)),
        InstantLike::Year(year) => Ok(Instant::new(year, 1, 1)),
        InstantLike::Text(text) => {
            let invalid = || {
                debug!(value = text, "rejected instant");
                FiscalisError::InvalidPeriod {
                    value: text.to_owned(),
                    message: String::from(INSTANT_FORMAT),
                }
            };
            if !INSTANT_PATTERN.is_match(text) {
                return Err(invalid());
            }
            let mut fragments = text.split('-');
            let year = fragments.next().and_then(|y| y.parse::<i32>().ok()).ok_or_else(invalid)?;
            let mut next = || -> Result<u32> {
                fragments
                    .next()
                    .map_or(Ok(1), |f| f.parse::<u32>().map_err(|_| invalid()))
            };
            let month = next()?;
            let day = next()?;
            Ok(Instant::new(year, month, day))
        }
    }
}
