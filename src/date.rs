use crate::error::{Error, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

lazy_static! {
    static ref DAY_MONTH_YEAR: Regex =
        Regex::new(r"^\s*(\d{1,2})/(\d{1,2})/(\d{4})(?:\D.*)?$").unwrap();
}

/// Date-time layouts tried after RFC 3339 / RFC 2822.
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: [&str; 12] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%d-%m-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%a %b %d %Y",
    "%A, %B %d, %Y",
];

/// How a date text was turned into a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    /// Matched `DD/MM/YYYY`.
    DayMonthYear,
    /// Matched one of the other recognized layouts.
    Generic,
    /// Nothing matched, the resolver's "today" was substituted.
    AssumedToday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedDate {
    pub date: NaiveDate,
    pub source: DateSource,
}

impl ResolvedDate {
    pub fn is_assumed(&self) -> bool {
        self.source == DateSource::AssumedToday
    }
}

/// Turns the date texts stored with purchases into dates.
///
/// Stored dates are not consistent: older entries use `DD/MM/YYYY`, newer ones
/// ISO 8601, some are locale formatted. `DD/MM/YYYY` wins over the US reading
/// of the same text; other layouts are only accepted when the year falls in
/// `min_year..=max_year`.
#[derive(Debug, Clone)]
pub struct DateResolver {
    min_year: i32,
    max_year: i32,
    today: NaiveDate,
}

impl DateResolver {
    pub fn new(min_year: i32, max_year: i32, today: NaiveDate) -> DateResolver {
        DateResolver {
            min_year,
            max_year,
            today,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Strict parse, no fallback.
    pub fn parse(&self, text: &str) -> Result<ResolvedDate> {
        if let Some(date) = self.parse_day_month_year(text) {
            return Ok(ResolvedDate {
                date,
                source: DateSource::DayMonthYear,
            });
        }

        parse_generic(text.trim())
            .filter(|date| self.is_plausible(date.year()))
            .map(|date| ResolvedDate {
                date,
                source: DateSource::Generic,
            })
            .ok_or_else(|| Error::UnrecognizedDate(text.to_string()))
    }

    /// Never fails: unrecognized text resolves to "today".
    pub fn resolve(&self, text: &str) -> ResolvedDate {
        match self.parse(text) {
            Ok(resolved) => resolved,
            Err(_) => {
                warn!(
                    "Unrecognized date {:?}, assuming {}",
                    text,
                    self.today.format("%Y-%m-%d")
                );
                ResolvedDate {
                    date: self.today,
                    source: DateSource::AssumedToday,
                }
            }
        }
    }

    /// Rewrites a recognized date as `DD/MM/YYYY`.
    pub fn normalize(&self, text: &str) -> Option<String> {
        self.parse(text)
            .ok()
            .map(|resolved| format_day_month_year(resolved.date))
    }

    fn parse_day_month_year(&self, text: &str) -> Option<NaiveDate> {
        let caps = DAY_MONTH_YEAR.captures(text)?;
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;

        if !(1..=31).contains(&day) || !(1..=12).contains(&month) || !self.is_plausible(year) {
            return None;
        }

        // 31/02 passes the range checks but is not a calendar date
        NaiveDate::from_ymd_opt(year, month, day)
    }

    fn is_plausible(&self, year: i32) -> bool {
        (self.min_year..=self.max_year).contains(&year)
    }
}

pub fn format_day_month_year(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn parse_generic(text: &str) -> Option<NaiveDate> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.date_naive());
    }
    if let Ok(datetime) = DateTime::parse_from_rfc2822(text) {
        return Some(datetime.date_naive());
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.date());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    // "Mon Jan 15 2024 10:30:00 GMT+0100 (Central European Standard Time)"
    let head: Vec<&str> = text.split_whitespace().take(4).collect();
    if head.len() == 4 {
        if let Ok(date) = NaiveDate::parse_from_str(&head.join(" "), "%a %b %d %Y") {
            return Some(date);
        }
    }

    // "1/15/2024, 10:30:00 AM"
    if let Some(head) = text.split([',', ' ']).next() {
        if head.len() < text.len() {
            if let Ok(date) = NaiveDate::parse_from_str(head, "%m/%d/%Y") {
                return Some(date);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> DateResolver {
        DateResolver::new(1900, 2099, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
    }

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_day_month_year() {
        let resolved = resolver().parse("15/01/2024").unwrap();
        assert_eq!(resolved.date, ymd(2024, 1, 15));
        assert_eq!(resolved.source, DateSource::DayMonthYear);

        assert_eq!(resolver().parse("1/2/2024").unwrap().date, ymd(2024, 2, 1));
        assert_eq!(
            resolver().parse("05/03/2024 14:20").unwrap().date,
            ymd(2024, 3, 5)
        );
    }

    #[test]
    fn test_day_month_year_wins_over_us_reading() {
        assert_eq!(resolver().parse("02/03/2024").unwrap().date, ymd(2024, 3, 2));
    }

    #[test]
    fn test_invalid_month_falls_through_to_us_layout() {
        let resolved = resolver().parse("01/15/2024").unwrap();
        assert_eq!(resolved.date, ymd(2024, 1, 15));
        assert_eq!(resolved.source, DateSource::Generic);
    }

    #[test]
    fn test_iso_and_rfc_layouts() {
        let r = resolver();
        assert_eq!(r.parse("2024-02-10").unwrap().date, ymd(2024, 2, 10));
        assert_eq!(r.parse("2024-02-10T09:15:00.000Z").unwrap().date, ymd(2024, 2, 10));
        assert_eq!(r.parse("2024-02-10T23:30:00-05:00").unwrap().date, ymd(2024, 2, 10));
        assert_eq!(r.parse("2024-02-10T09:15:00").unwrap().date, ymd(2024, 2, 10));
        assert_eq!(
            r.parse("Sat, 10 Feb 2024 09:15:00 +0000").unwrap().date,
            ymd(2024, 2, 10)
        );
    }

    #[test]
    fn test_locale_layouts() {
        let r = resolver();
        assert_eq!(r.parse("10.02.2024").unwrap().date, ymd(2024, 2, 10));
        assert_eq!(r.parse("February 10, 2024").unwrap().date, ymd(2024, 2, 10));
        assert_eq!(r.parse("Feb 10, 2024").unwrap().date, ymd(2024, 2, 10));
        assert_eq!(r.parse("10 February 2024").unwrap().date, ymd(2024, 2, 10));
        assert_eq!(r.parse("Sat Feb 10 2024").unwrap().date, ymd(2024, 2, 10));
        assert_eq!(
            r.parse("Sat Feb 10 2024 09:15:00 GMT+0100 (Central European Standard Time)")
                .unwrap()
                .date,
            ymd(2024, 2, 10)
        );
    }

    #[test]
    fn test_locale_date_time_layouts() {
        let r = resolver();

        let gb = r.resolve("15/01/2024, 10:30:00");
        assert_eq!(gb.date, ymd(2024, 1, 15));
        assert_eq!(gb.source, DateSource::DayMonthYear);

        let us = r.resolve("1/15/2024, 10:30:00 AM");
        assert_eq!(us.date, ymd(2024, 1, 15));
        assert_eq!(us.source, DateSource::Generic);

        assert_eq!(r.parse("12/25/2023 18:45").unwrap().date, ymd(2023, 12, 25));
        assert!(r.parse("1/15/2024, whenever").is_ok());
        assert!(r.parse("13/45/2024, 10:30:00 AM").is_err());
    }

    #[test]
    fn test_implausible_years_are_rejected() {
        let r = resolver();
        assert!(r.parse("01/01/1850").is_err());
        assert!(r.parse("2150-01-01").is_err());
    }

    #[test]
    fn test_non_calendar_day_is_rejected() {
        assert!(resolver().parse("31/02/2024").is_err());
    }

    #[test]
    fn test_resolve_falls_back_to_today() {
        let resolved = resolver().resolve("not-a-date");
        assert_eq!(resolved.date, ymd(2024, 6, 30));
        assert!(resolved.is_assumed());

        assert!(!resolver().resolve("01/01/2024").is_assumed());
    }

    #[test]
    fn test_normalize() {
        let r = resolver();
        assert_eq!(r.normalize("2024-02-10").as_deref(), Some("10/02/2024"));
        assert_eq!(r.normalize("1/2/2024").as_deref(), Some("01/02/2024"));
        assert_eq!(r.normalize("garbage"), None);
    }
}
