//! Date helpers for reports
//!
//! Date → timestamp conversion happens in the handler layer; repositories
//! only see `i64` Unix millis. Days are UTC days.

use chrono::{Duration, NaiveDate, Utc};

use super::{AppError, AppResult};

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {date} (expected YYYY-MM-DD)")))
}

/// Day start (00:00:00 UTC) in millis
pub fn day_start_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default()
}

/// Next day 00:00:00 UTC in millis; callers use `< end`
pub fn day_end_millis(date: NaiveDate) -> i64 {
    day_start_millis(date + Duration::days(1))
}

/// Resolve an optional `from`/`to` pair into `[start, end)` millis
///
/// Missing bounds default to today; `from` after `to` is rejected.
pub fn date_range(from: Option<&str>, to: Option<&str>) -> AppResult<(NaiveDate, NaiveDate, i64, i64)> {
    let today = Utc::now().date_naive();
    let from = from.map(parse_date).transpose()?.unwrap_or(today);
    let to = to.map(parse_date).transpose()?.unwrap_or(today);
    if from > to {
        return Err(AppError::validation(format!(
            "from ({from}) must not be after to ({to})"
        )));
    }
    Ok((from, to, day_start_millis(from), day_end_millis(to)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let d = parse_date("2025-03-14").unwrap();
        assert_eq!(d.to_string(), "2025-03-14");
        assert!(parse_date("14/03/2025").is_err());
    }

    #[test]
    fn test_day_bounds() {
        let d = parse_date("2025-01-01").unwrap();
        assert_eq!(day_start_millis(d), 1_735_689_600_000);
        assert_eq!(day_end_millis(d) - day_start_millis(d), 86_400_000);
    }

    #[test]
    fn test_date_range() {
        let (from, to, start, end) = date_range(Some("2025-01-01"), Some("2025-01-31")).unwrap();
        assert_eq!(from.to_string(), "2025-01-01");
        assert_eq!(to.to_string(), "2025-01-31");
        assert_eq!(end - start, 31 * 86_400_000);
        assert!(date_range(Some("2025-02-01"), Some("2025-01-01")).is_err());
    }
}
