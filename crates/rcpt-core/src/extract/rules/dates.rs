//! Transaction date extraction.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use tracing::debug;

use super::patterns::{
    DATE_DAY_MONTH_NAME, DATE_MONTH_NAME_DAY, DATE_NUMERIC_DAY_FIRST, DATE_NUMERIC_YEAR_FIRST,
};
use super::{first_match, ExtractionMatch, FieldExtractor, Resolution};

/// Formats tried against every matched date substring, in order.
pub const DATE_FORMATS: [&str; 10] = [
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%m.%d.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// A date-shaped pattern and the formats its match is parsed with.
struct DateRule {
    pattern: &'static Regex,
    formats: &'static [&'static str],
}

fn date_rules() -> [DateRule; 4] {
    [
        DateRule { pattern: &DATE_NUMERIC_DAY_FIRST, formats: &DATE_FORMATS },
        DateRule { pattern: &DATE_NUMERIC_YEAR_FIRST, formats: &DATE_FORMATS },
        DateRule { pattern: &DATE_DAY_MONTH_NAME, formats: &DATE_FORMATS },
        DateRule { pattern: &DATE_MONTH_NAME_DAY, formats: &DATE_FORMATS },
    ]
}

/// Date field extractor.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        first_match(date_rules(), |rule| {
            let Some(found) = rule.pattern.find(text) else {
                return Resolution::NoMatch;
            };

            match parse_with_formats(found.as_str(), rule.formats) {
                Some(date) => Resolution::Matched(
                    ExtractionMatch::new(date, 0.9, found.as_str())
                        .with_position(found.start(), found.end()),
                ),
                None => {
                    debug!("Date candidate {:?} matched no known format", found.as_str());
                    Resolution::NoMatch
                }
            }
        })
        .into_option()
    }
}

/// Parse `s` with the first format that consumes it entirely.
pub fn parse_with_formats(s: &str, formats: &[&str]) -> Option<NaiveDate> {
    formats.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(s, fmt)
            .ok()
            .filter(|date| has_four_digit_year(date, fmt))
    })
}

// %Y only stands for a full four-digit year; "24-01-15" is not 15 AD.
fn has_four_digit_year(date: &NaiveDate, fmt: &str) -> bool {
    !fmt.contains("%Y") || (1000..=9999).contains(&date.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_extract_date_day_first() {
        let extractor = DateExtractor::new();

        let result = extractor.extract("Date: 15/01/2024");
        assert_eq!(result.unwrap().value, ymd(2024, 1, 15));

        let result = extractor.extract("15.01.2024");
        assert_eq!(result.unwrap().value, ymd(2024, 1, 15));
    }

    #[test]
    fn test_ambiguous_numeric_date_prefers_day_first() {
        let extractor = DateExtractor::new();
        assert_eq!(extractor.extract("03/04/2024").unwrap().value, ymd(2024, 4, 3));
    }

    #[test]
    fn test_month_first_when_day_first_is_invalid() {
        let extractor = DateExtractor::new();
        assert_eq!(extractor.extract("01/15/2024").unwrap().value, ymd(2024, 1, 15));
    }

    #[test]
    fn test_extract_date_iso() {
        let extractor = DateExtractor::new();

        // The day-first shape matches "24-01-15" first but it has no four-digit year.
        let result = extractor.extract("Issued 2024-01-15 10:32").unwrap();
        assert_eq!(result.value, ymd(2024, 1, 15));
        assert_eq!(result.source, "2024-01-15");
        assert_eq!(result.position, Some((7, 17)));
    }

    #[test]
    fn test_extract_named_month() {
        let extractor = DateExtractor::new();

        assert_eq!(extractor.extract("5 Jan 2024").unwrap().value, ymd(2024, 1, 5));
        assert_eq!(extractor.extract("on 21 March 2023 at").unwrap().value, ymd(2023, 3, 21));
        assert_eq!(extractor.extract("Feb 9, 2024").unwrap().value, ymd(2024, 2, 9));
        assert_eq!(extractor.extract("December 31, 2023").unwrap().value, ymd(2023, 12, 31));
    }

    #[test]
    fn test_two_digit_year_not_accepted() {
        let extractor = DateExtractor::new();
        assert!(extractor.extract("15/01/24").is_none());
    }

    #[test]
    fn test_no_date() {
        let extractor = DateExtractor::new();
        assert!(extractor.extract("TOTAL 12.00").is_none());
        assert!(extractor.extract("99/99/9999").is_none());
    }
}
