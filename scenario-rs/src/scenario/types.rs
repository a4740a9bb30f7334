use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date};

use crate::prelude::Real;

/// A plausible range of values, sampled uniformly by the model runner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub begin: Real,
    pub end: Real,
}

impl NumericRange {
    pub fn new(begin: Real, end: Real) -> Self {
        NumericRange { begin, end }
    }

    /// Linear interpolation inside the range, `t` in [0, 1].
    pub fn at(&self, t: Real) -> Real {
        self.begin + (self.end - self.begin) * t
    }

    pub fn is_ordered(&self) -> bool {
        self.begin.is_finite() && self.end.is_finite() && self.begin <= self.end
    }
}

/// An inclusive range of calendar dates, kept in their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub begin: String,
    pub end: String,
}

impl DateRange {
    /// Parsed begin and end dates, or None if any of them is not a date.
    pub fn dates(&self) -> Option<(Date, Date)> {
        Some((parse_date(&self.begin)?, parse_date(&self.end)?))
    }

    /// Return true if the given date is inside the range. Unparseable ranges
    /// contain nothing.
    pub fn contains(&self, date: Date) -> bool {
        match self.dates() {
            Some((begin, end)) => begin <= date && date <= end,
            None => false,
        }
    }
}

/// A time window with an associated reduction of transmission, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MitigationInterval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub time_range: DateRange,
    pub transmission_reduction: NumericRange,
}

/// Parse dates given either as `YYYY-MM-DD` or as an ISO timestamp starting
/// with it.
pub fn parse_date(text: &str) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");
    let day = match text.get(10..) {
        Some("") => text,
        Some(rest) if rest.starts_with('T') => text.get(..10)?,
        _ => return None,
    };
    Date::parse(day, &format).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    #[test]
    fn dates_and_timestamps_are_accepted() {
        let date = Date::from_calendar_date(2020, Month::March, 1).unwrap();
        assert_eq!(parse_date("2020-03-01"), Some(date));
        assert_eq!(parse_date("2020-03-01T00:00:00.000Z"), Some(date));
        assert_eq!(parse_date("03/01/2020"), None);
        assert_eq!(parse_date("2020"), None);
    }

    #[test]
    fn trailing_text_is_rejected() {
        assert_eq!(parse_date("2020-03-01junk"), None);
        assert_eq!(parse_date("2020-03-01 00:00"), None);
        assert!(parse_date("2020-03-01T12:30:00Z").is_some());
    }

    #[test]
    fn range_membership_is_inclusive() {
        let range = DateRange {
            begin: "2020-03-01".into(),
            end: "2020-03-10".into(),
        };
        assert!(range.contains(parse_date("2020-03-01").unwrap()));
        assert!(range.contains(parse_date("2020-03-10").unwrap()));
        assert!(!range.contains(parse_date("2020-03-11").unwrap()));
    }

    #[test]
    fn interpolation() {
        let range = NumericRange::new(1.0, 3.0);
        assert_eq!(range.at(0.0), 1.0);
        assert_eq!(range.at(0.5), 2.0);
        assert!(range.is_ordered());
        assert!(!NumericRange::new(2.0, 1.0).is_ordered());
    }
}
