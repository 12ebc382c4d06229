//! SerpAPI `operating_hours` to `location_hours` rows

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use ventdir_core::ClockTime;

static RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?::\d+)?)\s*(am|pm)\s*[–-]\s*(\d+(?::\d+)?)\s*(am|pm)")
        .expect("invalid hours range regex")
});

/// Stored open/close times for "Open 24 hours"
const ALL_DAY: (&str, &str) = ("12:00 AM", "11:59 PM");

/// One parsed day; `day_of_week` is 0 for Sunday through 6 for Saturday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedHours {
    pub day_of_week: i16,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub is_closed: bool,
}

fn day_number(day: &str) -> Option<i16> {
    match day.to_ascii_lowercase().as_str() {
        "sunday" => Some(0),
        "monday" => Some(1),
        "tuesday" => Some(2),
        "wednesday" => Some(3),
        "thursday" => Some(4),
        "friday" => Some(5),
        "saturday" => Some(6),
        _ => None,
    }
}

fn storage_time(time: &str, period: &str) -> Option<String> {
    ClockTime::parse(&format!("{time} {period}"))
        .ok()
        .map(|t| t.to_storage())
}

/// Parse one day's text: `"7 am–9 pm"`, `"Closed"` or `"Open 24 hours"`.
///
/// Text that matches none of these keeps the day with no times.
pub fn parse_day(day_of_week: i16, text: &str) -> ImportedHours {
    let mut row = ImportedHours {
        day_of_week,
        open_time: None,
        close_time: None,
        is_closed: false,
    };

    match text.trim() {
        "Closed" => row.is_closed = true,
        "Open 24 hours" => {
            row.open_time = Some(ALL_DAY.0.to_string());
            row.close_time = Some(ALL_DAY.1.to_string());
        }
        other => {
            if let Some(caps) = RANGE.captures(other) {
                row.open_time = storage_time(&caps[1], &caps[2]);
                row.close_time = storage_time(&caps[3], &caps[4]);
            }
        }
    }
    row
}

/// Parse the whole `operating_hours` object, ordered Sunday first.
/// Unknown keys and non-string values are skipped.
pub fn parse_operating_hours(hours: &Map<String, Value>) -> Vec<ImportedHours> {
    let mut rows: Vec<ImportedHours> = hours
        .iter()
        .filter_map(|(day, text)| Some(parse_day(day_number(day)?, text.as_str()?)))
        .collect();
    rows.sort_by_key(|r| r.day_of_week);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn range_with_en_dash() {
        let row = parse_day(1, "7 am–9 pm");
        assert_eq!(row.open_time.as_deref(), Some("07:00 AM"));
        assert_eq!(row.close_time.as_deref(), Some("09:00 PM"));
        assert!(!row.is_closed);
    }

    #[test]
    fn range_with_minutes_and_hyphen() {
        let row = parse_day(2, "8:30 AM - 5:15 PM");
        assert_eq!(row.open_time.as_deref(), Some("08:30 AM"));
        assert_eq!(row.close_time.as_deref(), Some("05:15 PM"));
    }

    #[test]
    fn closed_and_all_day() {
        assert!(parse_day(0, "Closed").is_closed);
        let all_day = parse_day(3, "Open 24 hours");
        assert_eq!(all_day.open_time.as_deref(), Some("12:00 AM"));
        assert_eq!(all_day.close_time.as_deref(), Some("11:59 PM"));
    }

    #[test]
    fn unrecognized_text_has_no_times() {
        let row = parse_day(4, "By appointment");
        assert_eq!(row.open_time, None);
        assert!(!row.is_closed);
    }

    #[test]
    fn sunday_is_zero_and_rows_sorted() {
        let hours = json!({
            "saturday": "Closed",
            "sunday": "Closed",
            "monday": "7 am–9 pm",
            "holiday": "Closed"
        });
        let rows = parse_operating_hours(hours.as_object().unwrap());
        let days: Vec<i16> = rows.iter().map(|r| r.day_of_week).collect();
        assert_eq!(days, vec![0, 1, 6]);
    }
}
