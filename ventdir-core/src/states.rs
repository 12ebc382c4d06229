//! US state names, abbreviations and their display time zones

/// Two-letter postal abbreviation to full state name.
const STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("DC", "District of Columbia"),
];

/// Time zone used when displaying hours for a state. States spanning
/// several zones use the zone covering most of their population.
const STATE_TIME_ZONES: &[(&str, &str)] = &[
    ("Alabama", "America/Chicago"),
    ("Connecticut", "America/New_York"),
    ("Delaware", "America/New_York"),
    ("District of Columbia", "America/New_York"),
    ("Florida", "America/New_York"),
    ("Georgia", "America/New_York"),
    ("Indiana", "America/New_York"),
    ("Kentucky", "America/New_York"),
    ("Maine", "America/New_York"),
    ("Maryland", "America/New_York"),
    ("Massachusetts", "America/New_York"),
    ("Michigan", "America/New_York"),
    ("New Hampshire", "America/New_York"),
    ("New Jersey", "America/New_York"),
    ("New York", "America/New_York"),
    ("North Carolina", "America/New_York"),
    ("Ohio", "America/New_York"),
    ("Pennsylvania", "America/New_York"),
    ("Rhode Island", "America/New_York"),
    ("South Carolina", "America/New_York"),
    ("Tennessee", "America/Chicago"),
    ("Vermont", "America/New_York"),
    ("Virginia", "America/New_York"),
    ("West Virginia", "America/New_York"),
    ("Arkansas", "America/Chicago"),
    ("Illinois", "America/Chicago"),
    ("Iowa", "America/Chicago"),
    ("Kansas", "America/Chicago"),
    ("Louisiana", "America/Chicago"),
    ("Minnesota", "America/Chicago"),
    ("Mississippi", "America/Chicago"),
    ("Missouri", "America/Chicago"),
    ("Nebraska", "America/Chicago"),
    ("North Dakota", "America/Chicago"),
    ("Oklahoma", "America/Chicago"),
    ("South Dakota", "America/Chicago"),
    ("Texas", "America/Chicago"),
    ("Wisconsin", "America/Chicago"),
    ("Arizona", "America/Phoenix"),
    ("Colorado", "America/Denver"),
    ("Idaho", "America/Denver"),
    ("Montana", "America/Denver"),
    ("New Mexico", "America/Denver"),
    ("Utah", "America/Denver"),
    ("Wyoming", "America/Denver"),
    ("Alaska", "America/Anchorage"),
    ("California", "America/Los_Angeles"),
    ("Nevada", "America/Los_Angeles"),
    ("Oregon", "America/Los_Angeles"),
    ("Washington", "America/Los_Angeles"),
    ("Hawaii", "Pacific/Honolulu"),
];

/// Zone used for unknown or missing states.
pub const DEFAULT_TIME_ZONE: &str = "America/New_York";

/// Full state name for a postal abbreviation (case-insensitive).
/// Unknown abbreviations are returned unchanged.
pub fn state_name(abbr: &str) -> String {
    let upper = abbr.trim().to_ascii_uppercase();
    STATES
        .iter()
        .find(|(code, _)| *code == upper)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| abbr.to_string())
}

/// Postal abbreviation for a full state name (case-insensitive).
pub fn state_abbreviation(name: &str) -> Option<&'static str> {
    let name = name.trim();
    STATES
        .iter()
        .find(|(_, full)| full.eq_ignore_ascii_case(name))
        .map(|(code, _)| *code)
}

/// IANA zone name for a full state name.
pub fn state_time_zone_name(state: &str) -> &'static str {
    let state = state.trim();
    STATE_TIME_ZONES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(state))
        .map(|(_, tz)| *tz)
        .unwrap_or(DEFAULT_TIME_ZONE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviation_round_trip() {
        assert_eq!(state_name("in"), "Indiana");
        assert_eq!(state_name("DC"), "District of Columbia");
        assert_eq!(state_abbreviation("north carolina"), Some("NC"));
    }

    #[test]
    fn unknown_abbreviation_is_passed_through() {
        assert_eq!(state_name("ZZ"), "ZZ");
        assert_eq!(state_abbreviation("Atlantis"), None);
    }

    #[test]
    fn every_state_has_a_zone() {
        for (_, name) in STATES {
            assert!(
                STATE_TIME_ZONES.iter().any(|(s, _)| s == name),
                "{name} missing a time zone"
            );
        }
    }

    #[test]
    fn zone_lookup_defaults_to_eastern() {
        assert_eq!(state_time_zone_name("Arizona"), "America/Phoenix");
        assert_eq!(state_time_zone_name("texas"), "America/Chicago");
        assert_eq!(state_time_zone_name("Puerto Rico"), DEFAULT_TIME_ZONE);
    }
}
