//! Fiscalis – the time and subject model of a legislative rule simulator.
//!
//! Rules are evaluated for a *subject* over a *period*:
//! * A [`unit::Unit`] is a date granularity: day, month, year or eternity,
//!   ordered by weight.
//! * An [`instant::Instant`] is a `(year, month, day)` triple, the smallest
//!   step of time a rule can see. Instants shift by days, months or years
//!   with calendar-correct clamping.
//! * A [`period::Period`] is `size` units starting at an instant, e.g. the
//!   three years starting February 2014.
//! * An [`entity::Entity`] is an individual, an [`entity::GroupEntity`] a
//!   group of individuals holding [`entity::Role`]s.
//!
//! ## Modules
//! * [`unit`] – Units, their weights, and comparisons against spellings.
//! * [`instant`] – Instants, offsets and the memoized date conversions.
//! * [`period`] – Periods, [`period::parse_period`] and [`period::sort_key`].
//! * [`entity`] – Entities, roles and the variable lookup they are wired to.
//! * [`settings`] – File and environment configuration.
//!
//! ## Period strings
//! Simulation inputs write periods as text. The accepted forms are
//! `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `unit:YYYY[-MM[-DD]]`,
//! `unit:YYYY[-MM[-DD]]:size` and `ETERNITY`. A compound form is rejected
//! when its unit is finer than its date, such as `month:2014`.
//!
//! ## Quick Start
//! ```
//! use fiscalis::instant::{Instant, Offset};
//! use fiscalis::period::{parse_period, sort_key};
//! use fiscalis::unit::Unit;
//!
//! let period = parse_period("month:2014-2").unwrap();
//! assert_eq!(period.start(), Instant::new(2014, 2, 1));
//! assert_eq!(sort_key(&period), "200_1");
//!
//! let end = Instant::new(2021, 1, 31).offset(1, Unit::Month).unwrap();
//! assert_eq!(end, Instant::new(2021, 2, 28));
//! assert_eq!(end.offset(Offset::FirstOf, "month").unwrap().to_string(), "2021-02-01");
//! ```

pub mod entity;
pub mod error;
pub mod instant;
pub mod period;
pub mod settings;
pub mod unit;

pub use error::{FiscalisError, Result};
