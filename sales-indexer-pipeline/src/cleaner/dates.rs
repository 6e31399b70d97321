//! Date coercion for the `date` column.
//!
//! Raw dates arrive as text in whatever form the source rendered them. They
//! are parsed into one of three shapes and written back in a single
//! canonical form per column: a plain `YYYY-MM-DD` when every value is a
//! calendar date (or midnight), otherwise full timestamps.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// A successfully parsed date value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParsedDate {
    Date(NaiveDate),
    Naive(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
}

impl ParsedDate {
    /// Parse a raw date. Surrounding whitespace is ignored.
    pub(crate) fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(zoned) = DateTime::parse_from_rfc3339(text) {
            return Some(Self::Zoned(zoned));
        }
        for format in ZONED_FORMATS {
            if let Ok(zoned) = DateTime::parse_from_str(text, format) {
                return Some(Self::Zoned(zoned));
            }
        }
        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
                return Some(Self::Naive(naive));
            }
        }
        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
            .map(Self::Date)
    }

    fn is_calendar_date(&self) -> bool {
        match self {
            Self::Date(_) => true,
            Self::Naive(naive) => naive.time() == NaiveTime::MIN,
            Self::Zoned(_) => false,
        }
    }

    fn render_date(&self) -> String {
        match self {
            Self::Date(date) => date.format("%Y-%m-%d").to_string(),
            Self::Naive(naive) => naive.format("%Y-%m-%d").to_string(),
            Self::Zoned(zoned) => zoned.format("%Y-%m-%d").to_string(),
        }
    }

    fn render_timestamp(&self) -> String {
        match self {
            Self::Date(date) => date
                .and_time(NaiveTime::MIN)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            Self::Naive(naive) => naive.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            Self::Zoned(zoned) => zoned.format("%Y-%m-%d %H:%M:%S%.f%:z").to_string(),
        }
    }
}

/// Render a whole column of parsed dates in one canonical form.
pub(crate) fn canonicalize(values: &[ParsedDate]) -> Vec<String> {
    if values.iter().all(ParsedDate::is_calendar_date) {
        values.iter().map(ParsedDate::render_date).collect()
    } else {
        values.iter().map(ParsedDate::render_timestamp).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(values: &[&str]) -> Vec<ParsedDate> {
        values.iter().map(|v| ParsedDate::parse(v).unwrap()).collect()
    }

    #[test]
    fn test_parse_shapes() {
        assert!(matches!(ParsedDate::parse("2023-05-01"), Some(ParsedDate::Date(_))));
        assert!(matches!(ParsedDate::parse(" 05/01/2023 "), Some(ParsedDate::Date(_))));
        assert!(matches!(
            ParsedDate::parse("2023-05-01 09:10:00"),
            Some(ParsedDate::Naive(_))
        ));
        assert!(matches!(
            ParsedDate::parse("2023-05-01T09:10:00.250"),
            Some(ParsedDate::Naive(_))
        ));
        assert!(matches!(
            ParsedDate::parse("2023-05-01T09:10:00+07:00"),
            Some(ParsedDate::Zoned(_))
        ));
        assert!(matches!(
            ParsedDate::parse("2023-05-01 09:10:00+07:00"),
            Some(ParsedDate::Zoned(_))
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "   ", "yesterday", "2023-13-01", "2023-02-30", "20230501"] {
            assert_eq!(ParsedDate::parse(bad), None, "{bad}");
        }
    }

    #[test]
    fn test_calendar_dates_stay_dates() {
        let values = parse_all(&["2023-05-01", "2023/05/02", "2023-05-03 00:00:00"]);
        assert_eq!(
            canonicalize(&values),
            vec!["2023-05-01", "2023-05-02", "2023-05-03"]
        );
    }

    #[test]
    fn test_any_time_of_day_promotes_column_to_timestamps() {
        let values = parse_all(&["2023-05-01", "2023-05-02 09:10:00", "2023-05-03T09:10:00.5"]);
        assert_eq!(
            canonicalize(&values),
            vec![
                "2023-05-01 00:00:00",
                "2023-05-02 09:10:00",
                "2023-05-03 09:10:00.500"
            ]
        );
    }

    #[test]
    fn test_zoned_values_keep_offset() {
        let values = parse_all(&["2023-05-01T09:10:00+07:00"]);
        assert_eq!(canonicalize(&values), vec!["2023-05-01 09:10:00+07:00"]);
    }
}
