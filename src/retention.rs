//! Date-based retention decisions.

use anyhow::{Context, Result};
use chrono::{DateTime, Days, Local, NaiveDate};
use std::time::SystemTime;

/// Days kept when no window (or zero) is given
pub const DEFAULT_DAYS_TO_KEEP: u32 = 7;

/// Length of the `YYYYMMDD` token embedded in dated directory names
pub const DATE_TOKEN_LEN: usize = 8;

const DATE_TOKEN_FORMAT: &str = "%Y%m%d";

/// Source of "today" as a local calendar date
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Reads the local wall clock on every call
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Number of days of dated output to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionWindow {
    days: u32,
}

impl RetentionWindow {
    /// Zero falls back to [`DEFAULT_DAYS_TO_KEEP`]
    pub fn new(days: u32) -> Self {
        let days = if days == 0 { DEFAULT_DAYS_TO_KEEP } else { days };
        RetentionWindow { days }
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// First day that is kept. Anything strictly before it is stale.
    pub fn cutoff(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(u64::from(self.days)))
            .unwrap_or(NaiveDate::MIN)
    }

    /// The cutoff formatted as `YYYYMMDD`
    pub fn cutoff_token(&self, today: NaiveDate) -> String {
        self.cutoff(today).format(DATE_TOKEN_FORMAT).to_string()
    }
}

impl Default for RetentionWindow {
    fn default() -> Self {
        RetentionWindow::new(DEFAULT_DAYS_TO_KEEP)
    }
}

/// Extract the 8-character token starting at the first `'2'` of a directory name.
///
/// Dated folders are assumed to carry a `2xxx` year, so the first `'2'` marks the
/// start of the date. Returns `None` when there is no `'2'` or fewer than eight
/// characters follow it.
pub fn date_token(name: &str) -> Option<&str> {
    let start = name.find('2')?;
    let rest = &name[start..];
    let end = rest
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .nth(DATE_TOKEN_LEN - 1)?;
    Some(&rest[..end])
}

/// Whether a dated directory is older than the cutoff.
///
/// The date token is compared ordinally against `cutoff_token` (`YYYYMMDD`), so
/// `2023-01-01` (token `2023-01-`) sorts before `20230525` and is deleted.
/// Names without a token are kept.
pub fn should_delete_directory(name: &str, cutoff_token: &str) -> bool {
    date_token(name).is_some_and(|token| token < cutoff_token)
}

/// Whether a file last written on `last_write` falls outside the window.
///
/// A file written exactly on the cutoff day is kept.
pub fn should_delete_file(last_write: NaiveDate, today: NaiveDate, window: RetentionWindow) -> bool {
    last_write < window.cutoff(today)
}

/// Local calendar date of a filesystem timestamp
pub fn local_date(time: SystemTime) -> NaiveDate {
    DateTime::<Local>::from(time).date_naive()
}

/// Parse a retention window given as days with an optional unit suffix.
///
/// Supports: d (days), w (weeks), m (months, 30 days). Plain numbers are days.
/// Examples: "7", "7d", "2w", "3m". Zero is accepted and means the default.
pub fn parse_days(days_str: &str) -> Result<u32> {
    let days_str = days_str.trim();

    let (num_str, unit) = match days_str.find(|c: char| c.is_alphabetic()) {
        Some(pos) => {
            let (num, unit) = days_str.split_at(pos);
            (num, Some(unit))
        }
        None => (days_str, None),
    };

    let value: u32 = num_str.trim().parse().with_context(|| {
        format!(
            "Invalid number of days. Expected a number, got: {}",
            num_str
        )
    })?;

    let multiplier = match unit {
        None | Some("d") | Some("D") => 1,
        Some("w") | Some("W") => 7,
        Some("m") | Some("M") => 30,
        Some(unknown) => {
            anyhow::bail!(
                "Invalid unit '{}'. Supported units: d (days), w (weeks), m (months)",
                unknown
            );
        }
    };

    value
        .checked_mul(multiplier)
        .with_context(|| format!("Retention window too large: {}", days_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ============ RetentionWindow tests ============

    #[test]
    fn test_window_zero_uses_default() {
        assert_eq!(RetentionWindow::new(0).days(), 7);
        assert_eq!(RetentionWindow::default().days(), 7);
        assert_eq!(RetentionWindow::new(30).days(), 30);
    }

    #[test]
    fn test_cutoff_token() {
        let window = RetentionWindow::new(7);
        assert_eq!(window.cutoff(date(2023, 6, 1)), date(2023, 5, 25));
        assert_eq!(window.cutoff_token(date(2023, 6, 1)), "20230525");
    }

    #[test]
    fn test_cutoff_crosses_year() {
        let window = RetentionWindow::new(10);
        assert_eq!(window.cutoff_token(date(2024, 1, 5)), "20231226");
    }

    // ============ date token tests ============

    #[test]
    fn test_date_token_from_prefixless_name() {
        assert_eq!(date_token("20230101_run"), Some("20230101"));
    }

    #[test]
    fn test_date_token_after_prefix() {
        assert_eq!(date_token("run_20230101"), Some("20230101"));
        assert_eq!(date_token("build-20221231-1530"), Some("20221231"));
    }

    #[test]
    fn test_date_token_without_two() {
        assert_eq!(date_token("archive"), None);
        assert_eq!(date_token("19991231"), None);
    }

    #[test]
    fn test_date_token_too_short() {
        assert_eq!(date_token("run_2023"), None);
        assert_eq!(date_token("2023010"), None);
    }

    #[test]
    fn test_date_token_multibyte_tail() {
        assert_eq!(date_token("2023010é"), Some("2023010é"));
        assert_eq!(date_token("202301é"), None);
    }

    // ============ should_delete_directory tests ============

    const CUTOFF: &str = "20230525";

    #[test]
    fn test_names_without_two_are_kept() {
        for name in ["logs", "archive", "1999_old", "", "obj", "current"] {
            assert!(!should_delete_directory(name, CUTOFF), "{name} should be kept");
        }
    }

    #[test]
    fn test_stale_directory_deleted() {
        assert!(should_delete_directory("20230101_run", CUTOFF));
        assert!(should_delete_directory("run_20230524", CUTOFF));
        assert!(should_delete_directory("build-20221231-1530", CUTOFF));
    }

    #[test]
    fn test_directory_at_cutoff_kept() {
        assert!(!should_delete_directory("20230525", CUTOFF));
        assert!(!should_delete_directory("20230601_run", CUTOFF));
    }

    #[test]
    fn test_dash_separated_dates_compared_lexically() {
        // '-' sorts before every digit
        assert!(should_delete_directory("2023-01-01", CUTOFF));
        assert!(should_delete_directory("run_2023-06-01", CUTOFF));
        assert!(should_delete_directory("2022-12-31_nightly", CUTOFF));
    }

    #[test]
    fn test_non_date_tokens_follow_ordinal_order() {
        // '_' sorts after every digit
        assert!(!should_delete_directory("2023_01_01", CUTOFF));
        assert!(!should_delete_directory("20231301_run", CUTOFF));
        assert!(should_delete_directory("2000abcd", CUTOFF));
    }

    #[test]
    fn test_cutoff_token_drives_directory_decision() {
        let token = RetentionWindow::new(7).cutoff_token(date(2023, 6, 1));
        assert!(should_delete_directory("20230524", &token));
        assert!(!should_delete_directory("20230525", &token));
        assert!(should_delete_directory("2023-05-25", &token));
    }

    // ============ should_delete_file tests ============

    #[test]
    fn test_file_boundary_is_kept() {
        let today = date(2023, 6, 1);
        let window = RetentionWindow::new(7);
        assert!(!should_delete_file(date(2023, 5, 25), today, window));
        assert!(should_delete_file(date(2023, 5, 24), today, window));
        assert!(!should_delete_file(today, today, window));
    }

    #[test]
    fn test_file_ten_days_old_deleted() {
        let today = date(2023, 6, 1);
        let window = RetentionWindow::new(7);
        assert!(should_delete_file(date(2023, 5, 22), today, window));
        assert!(!should_delete_file(date(2023, 5, 29), today, window));
    }

    // ============ parse_days tests ============

    #[test]
    fn test_parse_days_plain() {
        assert_eq!(parse_days("15").unwrap(), 15);
        assert_eq!(parse_days("0").unwrap(), 0);
    }

    #[test]
    fn test_parse_days_units() {
        assert_eq!(parse_days("15d").unwrap(), 15);
        assert_eq!(parse_days("2w").unwrap(), 14);
        assert_eq!(parse_days("2W").unwrap(), 14);
        assert_eq!(parse_days("3m").unwrap(), 90);
    }

    #[test]
    fn test_parse_days_with_whitespace() {
        assert_eq!(parse_days("  10d  ").unwrap(), 10);
    }

    #[test]
    fn test_parse_days_invalid_unit() {
        let result = parse_days("15h");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid unit"));
    }

    #[test]
    fn test_parse_days_invalid_number() {
        let result = parse_days("abc");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Expected a number"));
    }

    #[test]
    fn test_parse_days_negative_rejected() {
        assert!(parse_days("-3").is_err());
    }
}
