//! Wall-clock helpers

use chrono::{DateTime, Local, TimeZone};

/// Date format used in highscore records (day.month.year, no zero padding)
pub const DATE_FORMAT: &str = "%-d.%-m.%Y";

/// Today's local date, e.g. "16.10.2026" or "7.3.2026"
pub fn today() -> String {
    format_date(&Local::now())
}

pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap();
        assert_eq!(format_date(&date), "7.3.2026");
        let date = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        assert_eq!(format_date(&date), "16.10.2026");
    }

    #[test]
    fn test_today_shape() {
        let s = today();
        let parts: Vec<&str> = s.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert!(!parts[0].starts_with('0') && !parts[1].starts_with('0'));
        assert_eq!(parts[2].len(), 4);
    }
}
