//! Parsed command options
//!
//! The CLI fills an [`Options`] bag; commands read the fields they declare.

use chrono::NaiveDate;

use crate::models::Flag;

/// Option values supplied for one command invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// `--task`
    pub task: bool,
    /// `--event`
    pub event: bool,
    /// `--note`
    pub note: bool,
    /// `--done`, listing only
    pub done: bool,
    /// `--collection` as a listing flag
    pub collection: bool,
    /// `--collection <hash>` when committing into a collection
    pub collection_hash: Option<String>,
    /// `--in <hash>`, listing only members of a collection
    pub in_collection: Option<String>,
    /// `--date YYYY-MM-DD`
    pub date: Option<String>,
    /// `--limit <number>`
    pub limit: Option<String>,
    /// Explicit flag, wins over `task`/`event`/`note`
    pub flag: Option<Flag>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw date, empty treated as absent
    pub fn date_str(&self) -> Option<&str> {
        non_empty(&self.date)
    }

    /// Raw limit, empty treated as absent
    pub fn limit_str(&self) -> Option<&str> {
        non_empty(&self.limit)
    }

    /// Raw collection filter, empty treated as absent
    pub fn in_collection_str(&self) -> Option<&str> {
        non_empty(&self.in_collection)
    }

    /// Date as a calendar day, `None` when absent or unparsable
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date_str()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }

    /// Limit as a count; fractions truncate and negatives clamp to zero
    pub fn parsed_limit(&self) -> Option<usize> {
        self.limit_str()
            .and_then(|l| l.trim().parse::<f64>().ok())
            .filter(|l| l.is_finite())
            .map(|l| l as usize)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_are_absent() {
        let options = Options {
            date: Some(String::new()),
            limit: Some(String::new()),
            ..Options::default()
        };
        assert!(options.date_str().is_none());
        assert!(options.limit_str().is_none());
        assert!(options.parsed_limit().is_none());
    }

    #[test]
    fn test_parsed_limit() {
        let mut options = Options::new();
        options.limit = Some("80".into());
        assert_eq!(options.parsed_limit(), Some(80));
        options.limit = Some("12.9".into());
        assert_eq!(options.parsed_limit(), Some(12));
        options.limit = Some("-3".into());
        assert_eq!(options.parsed_limit(), Some(0));
        options.limit = Some("lots".into());
        assert_eq!(options.parsed_limit(), None);
    }

    #[test]
    fn test_parsed_date() {
        let mut options = Options::new();
        options.date = Some("2024-02-29".into());
        assert_eq!(
            options.parsed_date(),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        options.date = Some("2023-02-29".into());
        assert_eq!(options.parsed_date(), None);
    }
}
