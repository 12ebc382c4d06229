//! Google Maps address strings to location columns

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use ventdir_core::states::state_name;

static STATE_ZIP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]{2})\s+(\d{5}(?:-\d{4})?)$").expect("invalid state/zip regex"));

const COUNTRY_SUFFIX: &str = ", United States";

/// Address columns of a `locations` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedAddress {
    /// Full address with the state spelled out
    pub street_address: String,
    pub city: String,
    /// Full state name
    pub state: String,
    pub postal_code: String,
}

impl ParsedAddress {
    /// Service-area style address when there is no street part.
    pub fn city_only(city: &str, state: &str, postal_code: &str) -> Self {
        let street_address = if postal_code.is_empty() {
            format!("{city}, {state}")
        } else {
            format!("{city}, {state} {postal_code}")
        };
        Self {
            street_address,
            city: city.to_string(),
            state: state.to_string(),
            postal_code: postal_code.to_string(),
        }
    }
}

/// Parse `"8 N Grant St, Brownsburg, IN 46112, United States"`.
///
/// The last comma part must be `ST 12345` (or ZIP+4) and the one before it
/// is the city; anything earlier is the street.
pub fn parse_address(raw: &str) -> Option<ParsedAddress> {
    let cleaned = raw.trim();
    let cleaned = cleaned.strip_suffix(COUNTRY_SUFFIX).unwrap_or(cleaned).trim();

    let parts: Vec<&str> = cleaned.split(',').map(str::trim).collect();
    if parts.len() < 2 {
        return None;
    }

    let caps = STATE_ZIP.captures(parts[parts.len() - 1])?;
    let state = state_name(&caps[1]);
    let postal_code = &caps[2];
    let city = parts[parts.len() - 2];

    if parts.len() == 2 {
        return Some(ParsedAddress::city_only(city, &state, postal_code));
    }

    let street = parts[..parts.len() - 2].join(", ");
    Some(ParsedAddress {
        street_address: format!("{street}, {city}, {state} {postal_code}"),
        city: city.to_string(),
        state,
        postal_code: postal_code.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_address() {
        let parsed = parse_address("8 N Grant St, Brownsburg, IN 46112, United States").unwrap();
        assert_eq!(parsed.street_address, "8 N Grant St, Brownsburg, Indiana 46112");
        assert_eq!(parsed.city, "Brownsburg");
        assert_eq!(parsed.state, "Indiana");
        assert_eq!(parsed.postal_code, "46112");
    }

    #[test]
    fn multi_part_street_and_zip_plus_four() {
        let parsed = parse_address("Suite 200, 55 Main St, Dayton, OH 45402-1234").unwrap();
        assert_eq!(parsed.street_address, "Suite 200, 55 Main St, Dayton, Ohio 45402-1234");
        assert_eq!(parsed.postal_code, "45402-1234");
    }

    #[test]
    fn city_and_state_only() {
        let parsed = parse_address("Carmel, IN 46032").unwrap();
        assert_eq!(parsed.street_address, "Carmel, Indiana 46032");
    }

    #[test]
    fn rejects_unparseable() {
        assert_eq!(parse_address(""), None);
        assert_eq!(parse_address("Indianapolis"), None);
        assert_eq!(parse_address("Main St, Indianapolis, Indiana"), None);
        assert_eq!(parse_address("Main St, Indianapolis, in 46204"), None);
    }
}
