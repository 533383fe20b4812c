use fiscalis::FiscalisError;
use fiscalis::instant::{Instant, Offset, days_in_month, is_leap_year};
use fiscalis::period::PeriodSize;
use fiscalis::unit::Unit;

fn at(year: i32, month: u32, day: u32) -> Instant {
    Instant::new(year, month, day)
}

#[test]
fn accessors_and_display() {
    let instant = at(2021, 9, 13);
    assert_eq!(instant.year(), 2021);
    assert_eq!(instant.month(), 9);
    assert_eq!(instant.day(), 13);
    assert_eq!(instant.to_string(), "2021-09-13");
    // second rendering comes from the memo
    assert_eq!(instant.to_string(), "2021-09-13");
    assert_eq!(at(33, 1, 2).to_string(), "0033-01-02");
}

#[test]
fn as_date_validates_the_calendar() {
    let date = at(2020, 2, 29).as_date().unwrap();
    assert_eq!(date.to_string(), "2020-02-29");
    assert_eq!(
        at(2021, 2, 29).as_date(),
        Err(FiscalisError::InvalidDate { year: 2021, month: 2, day: 29 })
    );
    assert!(at(2021, 13, 1).as_date().is_err());
}

#[test]
fn leap_years() {
    assert!(is_leap_year(2012));
    assert!(is_leap_year(2000));
    assert!(!is_leap_year(1900));
    assert!(!is_leap_year(2021));
    assert_eq!(days_in_month(2012, 2), 29);
    assert_eq!(days_in_month(2011, 2), 28);
    assert_eq!(days_in_month(2011, 4), 30);
    assert_eq!(days_in_month(2011, 12), 31);
}

#[test]
fn forward_offsets() {
    assert_eq!(at(2021, 1, 1).offset(1, Unit::Day).unwrap(), at(2021, 1, 2));
    assert_eq!(at(2021, 1, 1).offset(1, Unit::Month).unwrap(), at(2021, 2, 1));
    assert_eq!(at(2021, 1, 1).offset(1, Unit::Year).unwrap(), at(2022, 1, 1));
    assert_eq!(at(2021, 1, 31).offset(1, "day").unwrap(), at(2021, 2, 1));
    assert_eq!(at(2021, 1, 31).offset(1, "month").unwrap(), at(2021, 2, 28));
    assert_eq!(at(2021, 1, 31).offset(1, "year").unwrap(), at(2022, 1, 31));
    assert_eq!(at(2011, 2, 28).offset(1, "day").unwrap(), at(2011, 3, 1));
    assert_eq!(at(2011, 2, 28).offset(1, "month").unwrap(), at(2011, 3, 28));
    assert_eq!(at(2012, 2, 29).offset(1, "year").unwrap(), at(2013, 2, 28));
    assert_eq!(at(2021, 1, 30).offset(3, "day").unwrap(), at(2021, 2, 2));
    assert_eq!(at(2021, 10, 2).offset(3, "month").unwrap(), at(2022, 1, 2));
    assert_eq!(at(2021, 1, 1).offset(3, "year").unwrap(), at(2024, 1, 1));
    assert_eq!(at(2020, 12, 31).offset(366, "day").unwrap(), at(2022, 1, 1));
}

#[test]
fn backward_offsets() {
    assert_eq!(at(2021, 1, 1).offset(-1, "day").unwrap(), at(2020, 12, 31));
    assert_eq!(at(2021, 1, 1).offset(-1, "month").unwrap(), at(2020, 12, 1));
    assert_eq!(at(2021, 1, 1).offset(-1, "year").unwrap(), at(2020, 1, 1));
    assert_eq!(at(2011, 3, 1).offset(-1, "day").unwrap(), at(2011, 2, 28));
    assert_eq!(at(2011, 3, 31).offset(-1, "month").unwrap(), at(2011, 2, 28));
    assert_eq!(at(2012, 2, 29).offset(-1, "year").unwrap(), at(2011, 2, 28));
    assert_eq!(at(2021, 1, 1).offset(-3, "day").unwrap(), at(2020, 12, 29));
    assert_eq!(at(2021, 1, 1).offset(-3, "month").unwrap(), at(2020, 10, 1));
    assert_eq!(at(2021, 1, 1).offset(-3, "year").unwrap(), at(2018, 1, 1));
    assert_eq!(at(2021, 3, 1).offset(-25, "month").unwrap(), at(2019, 2, 1));
}

#[test]
fn month_end_clamping_breaks_the_inverse() {
    let there = at(2021, 1, 31).offset(1, "month").unwrap();
    assert_eq!(there, at(2021, 2, 28));
    // the clamped day is kept on the way back
    assert_eq!(there.offset(-1, "month").unwrap(), at(2021, 1, 28));
}

#[test]
fn first_of_anchors() {
    assert_eq!(at(2021, 1, 1).offset(Offset::FirstOf, "month").unwrap(), at(2021, 1, 1));
    assert_eq!(at(2021, 2, 1).offset(Offset::FirstOf, "month").unwrap(), at(2021, 2, 1));
    assert_eq!(at(2021, 2, 3).offset(Offset::FirstOf, "month").unwrap(), at(2021, 2, 1));
    assert_eq!(at(2021, 2, 3).offset(Offset::FirstOf, "year").unwrap(), at(2021, 1, 1));
    // a day anchor does nothing
    assert_eq!(at(2021, 2, 3).offset(Offset::FirstOf, "day").unwrap(), at(2021, 2, 3));
}

#[test]
fn last_of_anchors() {
    assert_eq!(at(2021, 1, 1).offset(Offset::LastOf, "month").unwrap(), at(2021, 1, 31));
    assert_eq!(at(2021, 2, 1).offset(Offset::LastOf, "month").unwrap(), at(2021, 2, 28));
    assert_eq!(at(2012, 2, 3).offset(Offset::LastOf, "month").unwrap(), at(2012, 2, 29));
    assert_eq!(at(2021, 2, 3).offset(Offset::LastOf, "year").unwrap(), at(2021, 12, 31));
    assert_eq!(at(2021, 2, 3).offset(Offset::LastOf, "day").unwrap(), at(2021, 2, 3));
}

#[test]
fn offsets_parse_from_text() {
    let first: Offset = "first-of".parse().unwrap();
    let last: Offset = "last-of".parse().unwrap();
    assert_eq!(first, Offset::FirstOf);
    assert_eq!(last, Offset::LastOf);
    assert_eq!("-2".parse::<Offset>().unwrap(), Offset::By(-2));
    assert_eq!(
        "middle-of".parse::<Offset>(),
        Err(FiscalisError::InvalidOffset(String::from("middle-of")))
    );
    assert_eq!(at(2021, 2, 3).offset(last, "month").unwrap(), at(2021, 2, 28));
}

#[test]
fn offset_rejects_eternity_and_bad_dates() {
    assert_eq!(
        at(2021, 1, 1).offset(1, Unit::Eternity),
        Err(FiscalisError::InvalidUnit(String::from("eternity")))
    );
    assert!(matches!(
        at(2021, 1, 1).offset(1, "week"),
        Err(FiscalisError::InvalidUnit(_))
    ));
    assert!(matches!(
        at(2021, 2, 30).offset(1, "day"),
        Err(FiscalisError::InvalidDate { .. })
    ));
}

#[test]
fn period_from_instant() {
    let period = at(2021, 9, 13).period(Unit::Month, 2).unwrap();
    assert_eq!(period.unit(), Unit::Month);
    assert_eq!(period.start(), at(2021, 9, 13));
    assert_eq!(period.size(), PeriodSize::Finite(2));
    assert_eq!(at(2021, 9, 13).period("YEAR", 1).unwrap().unit(), Unit::Year);
    assert_eq!(at(2021, 9, 13).period("day", 0), Err(FiscalisError::InvalidSize(0)));
    assert_eq!(at(2021, 9, 13).period("day", -3), Err(FiscalisError::InvalidSize(-3)));
    assert!(matches!(
        at(2021, 9, 13).period("week", 1),
        Err(FiscalisError::InvalidUnit(_))
    ));
}

#[test]
fn instants_order_chronologically() {
    assert!(at(2020, 12, 31) < at(2021, 1, 1));
    assert!(at(2021, 1, 2) > at(2021, 1, 1));
    assert_eq!(at(2021, 1, 1), Instant::from((2021, 1, 1)));
}
