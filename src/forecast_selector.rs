use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use crate::errors::SelectorError;

/// How a single sample is chosen to represent a calendar date
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// First sample at the reference hour on the date, else the first sample on the date
    #[default]
    ReferenceHour,
    /// First sample at or after the start of the date
    AtOrAfter,
}

#[derive(Debug, Clone, Copy)]
pub struct SelectionOptions {
    pub policy: SelectionPolicy,
    pub reference_hour: NaiveTime,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            policy: SelectionPolicy::ReferenceHour,
            reference_hour: noon(),
        }
    }
}

/// Returns 12:00:00, the reference hour used when nothing else is configured
pub fn noon() -> NaiveTime {
    NaiveTime::MIN + chrono::TimeDelta::hours(12)
}

/// Picks the sample that represents the given date, or None if no sample qualifies.
///
/// The series must be sorted ascending by timestamp, see `ensure_sorted`. The wall clock
/// of each sample comes from a closure, e.g. to apply the utc offset of the series.
///
/// # Arguments
///
/// * 'series' - forecast samples in ascending time order
/// * 'date' - the calendar date to pick a sample for
/// * 'options' - selection policy and reference hour
/// * 'timestamp' - returns the wall clock time of a sample
pub fn select<'a, T, F>(series: &'a [T], date: NaiveDate, options: &SelectionOptions, timestamp: F) -> Option<&'a T>
where
    F: Fn(&T) -> NaiveDateTime,
{
    match options.policy {
        SelectionPolicy::ReferenceHour => {
            let on_date = |s: &&T| timestamp(*s).date() == date;

            series
                .iter()
                .filter(on_date)
                .find(|s| timestamp(*s).time() == options.reference_hour)
                .or_else(|| series.iter().find(on_date))
        }
        SelectionPolicy::AtOrAfter => {
            let start = date.and_time(NaiveTime::MIN);
            series.iter().find(|s| timestamp(*s) >= start)
        }
    }
}

/// Parses a target date in strict YYYY-MM-DD form
///
/// # Arguments
///
/// * 'date' - the date string as given by the caller
pub fn parse_target_date(date: &str) -> Result<NaiveDate, SelectorError> {
    let date = date.trim();

    // chrono accepts single digit months and days, the wire format does not
    if date.len() != 10 {
        return Err(SelectorError::InvalidDate(date.to_string()));
    }

    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| SelectorError::InvalidDate(date.to_string()))
}

/// Verifies that timestamps never decrease along the series
///
/// # Arguments
///
/// * 'series' - forecast samples
/// * 'timestamp' - returns the wall clock time of a sample
pub fn ensure_sorted<T, F>(series: &[T], timestamp: F) -> Result<(), SelectorError>
where
    F: Fn(&T) -> NaiveDateTime,
{
    match series.windows(2).position(|w| timestamp(&w[0]) > timestamp(&w[1])) {
        Some(i) => Err(SelectorError::Unsorted(i + 1)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Sample {
        at: NaiveDateTime,
        tag: &'static str,
    }

    fn at(s: &Sample) -> NaiveDateTime {
        s.at
    }

    fn sample(at: &str, tag: &'static str) -> Sample {
        Sample {
            at: NaiveDateTime::parse_from_str(at, "%Y-%m-%d %H:%M:%S").unwrap(),
            tag,
        }
    }

    fn date(s: &str) -> NaiveDate {
        parse_target_date(s).unwrap()
    }

    fn at_or_after() -> SelectionOptions {
        SelectionOptions { policy: SelectionPolicy::AtOrAfter, ..Default::default() }
    }

    #[test]
    fn picks_noon_sample() {
        let series = vec![
            sample("2024-06-01 00:00:00", "midnight"),
            sample("2024-06-01 12:00:00", "sunny"),
            sample("2024-06-01 18:00:00", "evening"),
            sample("2024-06-02 12:00:00", "next day"),
        ];

        let picked = select(&series, date("2024-06-01"), &SelectionOptions::default(), at);
        assert_eq!(picked.map(|s| s.tag), Some("sunny"));
    }

    #[test]
    fn falls_back_to_first_sample_of_the_day() {
        let series = vec![
            sample("2024-05-31 21:00:00", "day before"),
            sample("2024-06-01 06:00:00", "cloudy"),
            sample("2024-06-01 18:00:00", "evening"),
        ];

        let picked = select(&series, date("2024-06-01"), &SelectionOptions::default(), at);
        assert_eq!(picked.map(|s| s.tag), Some("cloudy"));
    }

    #[test]
    fn first_sample_wins_among_duplicates() {
        let series = vec![
            sample("2024-06-01 09:00:00", "morning"),
            sample("2024-06-01 12:00:00", "first noon"),
            sample("2024-06-01 12:00:00", "second noon"),
        ];

        let picked = select(&series, date("2024-06-01"), &SelectionOptions::default(), at);
        assert_eq!(picked.map(|s| s.tag), Some("first noon"));
    }

    #[test]
    fn not_found_when_date_is_missing() {
        let series = vec![
            sample("2024-06-02 00:00:00", "a"),
            sample("2024-06-02 12:00:00", "b"),
            sample("2024-06-03 12:00:00", "c"),
        ];

        assert_eq!(select(&series, date("2024-06-01"), &SelectionOptions::default(), at), None);
        assert_eq!(select(&series, date("2024-06-04"), &SelectionOptions::default(), at), None);
    }

    #[test]
    fn empty_series_is_not_found() {
        let series: Vec<Sample> = Vec::new();

        assert_eq!(select(&series, date("2024-06-01"), &SelectionOptions::default(), at), None);
        assert_eq!(select(&series, date("2024-06-01"), &at_or_after(), at), None);
    }

    #[test]
    fn selection_is_repeatable() {
        let series = vec![
            sample("2024-06-01 03:00:00", "a"),
            sample("2024-06-01 12:00:00", "b"),
        ];
        let options = SelectionOptions::default();

        let first = select(&series, date("2024-06-01"), &options, at);
        let second = select(&series, date("2024-06-01"), &options, at);
        assert!(std::ptr::eq(first.unwrap(), second.unwrap()));
    }

    #[test]
    fn custom_reference_hour() {
        let series = vec![
            sample("2024-06-01 09:00:00", "nine"),
            sample("2024-06-01 12:00:00", "noon"),
            sample("2024-06-01 15:00:00", "three"),
        ];
        let options = SelectionOptions {
            reference_hour: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            ..Default::default()
        };

        assert_eq!(select(&series, date("2024-06-01"), &options, at).map(|s| s.tag), Some("three"));
    }

    #[test]
    fn at_or_after_takes_first_sample_from_midnight() {
        let series = vec![
            sample("2024-05-31 21:00:00", "day before"),
            sample("2024-06-01 03:00:00", "early"),
            sample("2024-06-01 12:00:00", "noon"),
        ];

        assert_eq!(select(&series, date("2024-06-01"), &at_or_after(), at).map(|s| s.tag), Some("early"));
    }

    #[test]
    fn at_or_after_may_roll_into_a_later_date() {
        let series = vec![
            sample("2024-06-02 00:00:00", "next"),
            sample("2024-06-02 12:00:00", "next noon"),
        ];

        assert_eq!(select(&series, date("2024-06-01"), &at_or_after(), at).map(|s| s.tag), Some("next"));
        assert_eq!(select(&series, date("2024-06-03"), &at_or_after(), at), None);
    }

    #[test]
    fn target_date_parsing() {
        assert_eq!(parse_target_date("2024-06-01").unwrap(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(parse_target_date(" 2024-06-01 ").unwrap(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert!(parse_target_date("2024-6-1").is_err());
        assert!(parse_target_date("2024-02-30").is_err());
        assert!(parse_target_date("tomorrow").is_err());
        assert!(parse_target_date("").is_err());
    }

    #[test]
    fn sorted_check() {
        let sorted = vec![
            sample("2024-06-01 00:00:00", "a"),
            sample("2024-06-01 03:00:00", "b"),
            sample("2024-06-01 03:00:00", "c"),
        ];
        assert!(ensure_sorted(&sorted, |s| s.at).is_ok());

        let unsorted = vec![
            sample("2024-06-01 03:00:00", "a"),
            sample("2024-06-01 00:00:00", "b"),
        ];
        match ensure_sorted(&unsorted, |s| s.at) {
            Err(SelectorError::Unsorted(1)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
