//! Open-hours logic
//!
//! Weekly schedules are stored as one row per day with 12-hour clock strings
//! ("07:00 PM"). Everything here is a pure function of the schedule, the
//! location's time zone and an injected `now`, so callers decide the clock.
//!
//! Day numbering: 1..=6 are Monday..Saturday, and both 0 and 7 mean Sunday.
//! The importer writes Sunday as 0 while the site has always read it as 7.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DirectoryError, Result};
use crate::location::BusinessStatus;
use crate::states::state_time_zone_name;

const MINUTES_PER_DAY: u16 = 24 * 60;

static CLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d{1,2})(?::(\d{2}))?\s*([ap]\.?m\.?)?$").expect("valid clock regex")
});

/// Minutes since local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);
    pub const LAST_MINUTE: ClockTime = ClockTime(MINUTES_PER_DAY - 1);

    pub fn from_hm(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(DirectoryError::invalid_time(
                format!("{hour:02}:{minute:02}"),
                "out of range",
            ));
        }
        Ok(Self((hour * 60 + minute) as u16))
    }

    /// Parse `"07:00 PM"`, `"7 pm"`, `"7:30am"` or 24-hour `"19:00"`.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let caps = CLOCK_RE
            .captures(trimmed)
            .ok_or_else(|| DirectoryError::invalid_time(value, "unrecognized format"))?;

        let hour: u32 = caps[1]
            .parse()
            .map_err(|_| DirectoryError::invalid_time(value, "bad hour"))?;
        let minute: u32 = match caps.get(2) {
            Some(m) => m
                .as_str()
                .parse()
                .map_err(|_| DirectoryError::invalid_time(value, "bad minute"))?,
            None => 0,
        };

        let hour = match caps.get(3) {
            Some(period) => {
                if !(1..=12).contains(&hour) {
                    return Err(DirectoryError::invalid_time(value, "12-hour clock out of range"));
                }
                let pm = period.as_str().to_ascii_lowercase().starts_with('p');
                match (hour, pm) {
                    (12, false) => 0,
                    (12, true) => 12,
                    (h, true) => h + 12,
                    (h, false) => h,
                }
            }
            None => {
                if caps.get(2).is_none() {
                    return Err(DirectoryError::invalid_time(value, "missing minutes or AM/PM"));
                }
                hour
            }
        };

        Self::from_hm(hour, minute).map_err(|_| DirectoryError::invalid_time(value, "out of range"))
    }

    pub fn minutes(&self) -> u16 {
        self.0
    }

    pub fn hour(&self) -> u32 {
        u32::from(self.0 / 60)
    }

    pub fn minute(&self) -> u32 {
        u32::from(self.0 % 60)
    }

    fn hour12(&self) -> (u32, &'static str) {
        let h = self.hour();
        let period = if h < 12 { "AM" } else { "PM" };
        let h12 = match h % 12 {
            0 => 12,
            other => other,
        };
        (h12, period)
    }

    /// Display form: `7:00 PM`.
    pub fn to_display(&self) -> String {
        let (h, period) = self.hour12();
        format!("{}:{:02} {}", h, self.minute(), period)
    }

    /// Storage form written by the importer: `07:00 PM`.
    pub fn to_storage(&self) -> String {
        let (h, period) = self.hour12();
        format!("{:02}:{:02} {}", h, self.minute(), period)
    }
}

/// One stored schedule row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub day_of_week: i16,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    #[serde(default)]
    pub is_closed: bool,
}

impl DayHours {
    pub fn weekday(&self) -> Option<Weekday> {
        weekday_from_db(self.day_of_week)
    }
}

/// Interpretation of a single day's row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySchedule {
    Closed,
    AllDay,
    /// `close <= open` means the range runs past midnight.
    Range { open: ClockTime, close: ClockTime },
}

impl DaySchedule {
    pub fn from_row(row: &DayHours) -> Self {
        if row.is_closed {
            return Self::Closed;
        }
        let open = row.open_time.as_deref().map(ClockTime::parse);
        let close = row.close_time.as_deref().map(ClockTime::parse);
        match (open, close) {
            (Some(Ok(open)), Some(Ok(close))) => {
                if open == ClockTime::MIDNIGHT
                    && (close == ClockTime::LAST_MINUTE || close == ClockTime::MIDNIGHT)
                {
                    Self::AllDay
                } else {
                    Self::Range { open, close }
                }
            }
            _ => Self::Closed,
        }
    }

    fn opening(&self) -> Option<ClockTime> {
        match self {
            Self::Closed => None,
            Self::AllDay => Some(ClockTime::MIDNIGHT),
            Self::Range { open, .. } => Some(*open),
        }
    }

    fn is_overnight(&self) -> bool {
        matches!(self, Self::Range { open, close } if close <= open)
    }
}

/// Map a stored `day_of_week` to a weekday.
pub fn weekday_from_db(day: i16) -> Option<Weekday> {
    match day {
        0 | 7 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// True for a row covering the whole day (`12:00 AM` to `11:59 PM`/`12:00 AM`).
pub fn is_open_24_hours(row: &DayHours) -> bool {
    DaySchedule::from_row(row) == DaySchedule::AllDay
}

fn schedule_for(hours: &[DayHours], day: Weekday) -> DaySchedule {
    hours
        .iter()
        .find(|row| row.weekday() == Some(day))
        .map(DaySchedule::from_row)
        .unwrap_or(DaySchedule::Closed)
}

/// Result of evaluating a schedule at an instant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct OpenStatus {
    pub is_open: bool,
    pub next_open: Option<String>,
    pub is_temporarily_closed: bool,
}

/// Whether the business is open at `now`, and when it opens next if not.
///
/// An empty schedule is treated as open around the clock.
pub fn open_status(hours: &[DayHours], tz: Tz, now: DateTime<Utc>) -> OpenStatus {
    if hours.is_empty() {
        return OpenStatus {
            is_open: true,
            ..Default::default()
        };
    }

    let is_open = is_open_at(hours, tz, now);
    OpenStatus {
        is_open,
        next_open: if is_open { None } else { next_open_time(hours, tz, now) },
        is_temporarily_closed: false,
    }
}

/// `open_status` with the business status applied first.
pub fn business_hours_status(
    status: BusinessStatus,
    hours: &[DayHours],
    tz: Tz,
    now: DateTime<Utc>,
) -> OpenStatus {
    if status == BusinessStatus::ClosedTemporarily {
        return OpenStatus {
            is_open: false,
            next_open: None,
            is_temporarily_closed: true,
        };
    }
    open_status(hours, tz, now)
}

fn is_open_at(hours: &[DayHours], tz: Tz, now: DateTime<Utc>) -> bool {
    let local = now.with_timezone(&tz);
    let minute = (local.hour() * 60 + local.minute()) as u16;
    let today = local.weekday();

    let open_today = match schedule_for(hours, today) {
        DaySchedule::Closed => false,
        DaySchedule::AllDay => true,
        DaySchedule::Range { open, close } if close > open => {
            open.minutes() <= minute && minute < close.minutes()
        }
        DaySchedule::Range { open, .. } => minute >= open.minutes(),
    };
    if open_today {
        return true;
    }

    // Yesterday's overnight range may still be running.
    match schedule_for(hours, today.pred()) {
        schedule @ DaySchedule::Range { close, .. } if schedule.is_overnight() => {
            minute < close.minutes()
        }
        _ => false,
    }
}

/// Human label for the next opening: `"9:00 AM"` (later today),
/// `"Tomorrow 9:00 AM"` or `"Monday 9:00 AM"`. `None` if no day opens.
pub fn next_open_time(hours: &[DayHours], tz: Tz, now: DateTime<Utc>) -> Option<String> {
    let local = now.with_timezone(&tz);
    let minute = (local.hour() * 60 + local.minute()) as u16;
    let mut day = local.weekday();

    for offset in 0..=7u8 {
        if let Some(opening) = schedule_for(hours, day).opening() {
            let later = offset > 0 || opening.minutes() > minute;
            if later {
                let time = opening.to_display();
                return Some(match offset {
                    0 => time,
                    1 => format!("Tomorrow {time}"),
                    _ => format!("{} {time}", weekday_name(day)),
                });
            }
        }
        day = day.succ();
    }
    None
}

/// Reformat a stored time for display (`"07:00 PM"` -> `"7:00 PM"`).
/// Unparseable input is returned unchanged.
pub fn format_time(value: &str) -> String {
    ClockTime::parse(value)
        .map(|t| t.to_display())
        .unwrap_or_else(|_| value.to_string())
}

/// Time zone for a full state name, defaulting to US Eastern.
pub fn state_timezone(state: &str) -> Tz {
    state_time_zone_name(state)
        .parse::<Tz>()
        .unwrap_or(chrono_tz::America::New_York)
}

/// Abbreviation in effect for the state at `now` (`EST`, `PDT`, `HST`...).
pub fn timezone_abbreviation(state: &str, now: DateTime<Utc>) -> String {
    now.with_timezone(&state_timezone(state))
        .format("%Z")
        .to_string()
}

/// Local wall-clock time for display (`"3:07 PM"`).
pub fn local_time_display(state: &str, now: DateTime<Utc>) -> String {
    let local = now.with_timezone(&state_timezone(state));
    let (h, period) = ClockTime((local.hour() * 60 + local.minute()) as u16).hour12();
    format!("{}:{:02} {}", h, local.minute(), period)
}

/// One line of the Monday-first weekly hours list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleLine {
    pub day: &'static str,
    pub label: String,
    pub is_today: bool,
}

/// Display form of a weekly schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklySchedule {
    pub lines: Vec<ScheduleLine>,
    /// Every stored row is open all day; the list is usually hidden then.
    pub all_day_every_day: bool,
}

const DISPLAY_ORDER: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn weekly_schedule(hours: &[DayHours], tz: Tz, now: DateTime<Utc>) -> WeeklySchedule {
    let today = now.with_timezone(&tz).weekday();
    let lines = DISPLAY_ORDER
        .iter()
        .map(|&day| {
            let label = match schedule_for(hours, day) {
                DaySchedule::Closed => "Closed".to_string(),
                DaySchedule::AllDay => "24h".to_string(),
                DaySchedule::Range { open, close } => {
                    format!("{}-{}", open.to_display(), close.to_display())
                }
            };
            ScheduleLine {
                day: short_weekday_name(day),
                label,
                is_today: day == today,
            }
        })
        .collect();

    WeeklySchedule {
        lines,
        all_day_every_day: !hours.is_empty() && hours.iter().all(is_open_24_hours),
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn short_weekday_name(day: Weekday) -> &'static str {
    &weekday_name(day)[..3]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::{Chicago, New_York};

    fn row(day: i16, open: &str, close: &str) -> DayHours {
        DayHours {
            day_of_week: day,
            open_time: Some(open.to_string()),
            close_time: Some(close.to_string()),
            is_closed: false,
        }
    }

    fn closed(day: i16) -> DayHours {
        DayHours {
            day_of_week: day,
            open_time: None,
            close_time: None,
            is_closed: true,
        }
    }

    /// Monday-Friday 9-5, weekend closed (Sunday stored as 0).
    fn office_hours() -> Vec<DayHours> {
        let mut hours: Vec<DayHours> = (1..=5).map(|d| row(d, "09:00 AM", "05:00 PM")).collect();
        hours.push(closed(6));
        hours.push(closed(0));
        hours
    }

    /// Local New York wall clock -> UTC instant.
    fn ny(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        New_York
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn parses_clock_formats() {
        assert_eq!(ClockTime::parse("07:00 PM").unwrap().minutes(), 19 * 60);
        assert_eq!(ClockTime::parse("7 pm").unwrap().minutes(), 19 * 60);
        assert_eq!(ClockTime::parse("7:30am").unwrap().minutes(), 7 * 60 + 30);
        assert_eq!(ClockTime::parse("12:00 AM").unwrap(), ClockTime::MIDNIGHT);
        assert_eq!(ClockTime::parse("12:15 PM").unwrap().minutes(), 12 * 60 + 15);
        assert_eq!(ClockTime::parse("23:59").unwrap(), ClockTime::LAST_MINUTE);
    }

    #[test]
    fn rejects_bad_clock_strings() {
        assert!(ClockTime::parse("13:00 PM").is_err());
        assert!(ClockTime::parse("24:00").is_err());
        assert!(ClockTime::parse("noon").is_err());
        assert!(ClockTime::parse("7").is_err());
    }

    #[test]
    fn format_time_strips_padding() {
        assert_eq!(format_time("07:00 PM"), "7:00 PM");
        assert_eq!(format_time("12:30 AM"), "12:30 AM");
        assert_eq!(format_time("whenever"), "whenever");
    }

    #[test]
    fn sunday_is_zero_or_seven() {
        assert_eq!(weekday_from_db(0), Some(Weekday::Sun));
        assert_eq!(weekday_from_db(7), Some(Weekday::Sun));
        assert_eq!(weekday_from_db(8), None);
    }

    #[test]
    fn detects_24_hour_rows() {
        assert!(is_open_24_hours(&row(1, "12:00 AM", "11:59 PM")));
        assert!(is_open_24_hours(&row(1, "12:00 AM", "12:00 AM")));
        assert!(!is_open_24_hours(&row(1, "12:00 AM", "11:00 PM")));
        let mut closed_all_day = row(1, "12:00 AM", "11:59 PM");
        closed_all_day.is_closed = true;
        assert!(!is_open_24_hours(&closed_all_day));
    }

    #[test]
    fn open_during_business_hours() {
        // Wednesday 2024-01-10 10:30 local
        let status = open_status(&office_hours(), New_York, ny(2024, 1, 10, 10, 30));
        assert!(status.is_open);
        assert_eq!(status.next_open, None);
    }

    #[test]
    fn closed_before_opening_reports_today() {
        let status = open_status(&office_hours(), New_York, ny(2024, 1, 10, 7, 45));
        assert!(!status.is_open);
        assert_eq!(status.next_open.as_deref(), Some("9:00 AM"));
    }

    #[test]
    fn closing_time_is_exclusive() {
        let status = open_status(&office_hours(), New_York, ny(2024, 1, 10, 17, 0));
        assert!(!status.is_open);
        assert_eq!(status.next_open.as_deref(), Some("Tomorrow 9:00 AM"));
    }

    #[test]
    fn weekend_rolls_to_monday() {
        // Saturday 2024-01-13 noon
        let status = open_status(&office_hours(), New_York, ny(2024, 1, 13, 12, 0));
        assert!(!status.is_open);
        assert_eq!(status.next_open.as_deref(), Some("Monday 9:00 AM"));
    }

    #[test]
    fn evaluates_in_the_location_zone() {
        // 9:30 in New York is 8:30 in Chicago
        let now = ny(2024, 1, 10, 9, 30);
        assert!(open_status(&office_hours(), New_York, now).is_open);
        let chicago = open_status(&office_hours(), Chicago, now);
        assert!(!chicago.is_open);
        assert_eq!(chicago.next_open.as_deref(), Some("9:00 AM"));
    }

    #[test]
    fn overnight_range_spills_into_next_day() {
        // Friday 6 PM - 2 AM
        let hours = vec![row(5, "06:00 PM", "02:00 AM")];
        assert!(open_status(&hours, New_York, ny(2024, 1, 12, 23, 0)).is_open);
        // Saturday 1 AM is still Friday night
        assert!(open_status(&hours, New_York, ny(2024, 1, 13, 1, 0)).is_open);
        let late = open_status(&hours, New_York, ny(2024, 1, 13, 2, 0));
        assert!(!late.is_open);
        assert_eq!(late.next_open.as_deref(), Some("Friday 6:00 PM"));
    }

    #[test]
    fn empty_schedule_means_always_open() {
        let status = open_status(&[], New_York, ny(2024, 1, 10, 3, 0));
        assert!(status.is_open);
        assert_eq!(status.next_open, None);
    }

    #[test]
    fn all_closed_has_no_next_open() {
        let hours: Vec<DayHours> = (0..=6).map(closed).collect();
        let status = open_status(&hours, New_York, ny(2024, 1, 10, 12, 0));
        assert!(!status.is_open);
        assert_eq!(status.next_open, None);
    }

    #[test]
    fn temporarily_closed_short_circuits() {
        let status = business_hours_status(
            BusinessStatus::ClosedTemporarily,
            &office_hours(),
            New_York,
            ny(2024, 1, 10, 10, 0),
        );
        assert!(status.is_temporarily_closed);
        assert!(!status.is_open);
    }

    #[test]
    fn unparseable_times_count_as_closed() {
        let hours = vec![DayHours {
            day_of_week: 3,
            open_time: None,
            close_time: None,
            is_closed: false,
        }];
        assert!(!open_status(&hours, New_York, ny(2024, 1, 10, 12, 0)).is_open);
    }

    #[test]
    fn weekly_schedule_is_monday_first() {
        let schedule = weekly_schedule(&office_hours(), New_York, ny(2024, 1, 10, 12, 0));
        let days: Vec<_> = schedule.lines.iter().map(|l| l.day).collect();
        assert_eq!(days, ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
        assert_eq!(schedule.lines[0].label, "9:00 AM-5:00 PM");
        assert_eq!(schedule.lines[6].label, "Closed");
        assert!(schedule.lines[2].is_today);
        assert!(!schedule.all_day_every_day);
    }

    #[test]
    fn weekly_schedule_flags_round_the_clock() {
        let hours: Vec<DayHours> = (1..=7).map(|d| row(d, "12:00 AM", "11:59 PM")).collect();
        let schedule = weekly_schedule(&hours, New_York, ny(2024, 1, 10, 12, 0));
        assert!(schedule.all_day_every_day);
        assert!(schedule.lines.iter().all(|l| l.label == "24h"));
    }

    #[test]
    fn timezone_helpers() {
        let winter = ny(2024, 1, 10, 15, 7);
        assert_eq!(timezone_abbreviation("Indiana", winter), "EST");
        assert_eq!(timezone_abbreviation("California", winter), "PST");
        assert_eq!(local_time_display("Texas", winter), "2:07 PM");
        assert_eq!(state_timezone("Nowhere"), New_York);
    }
}
