//! Location row enums shared by the server and the ETL scripts

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DirectoryError;

/// Business statuses a location must have to be publicly listed.
pub const VISIBLE_BUSINESS_STATUSES: [&str; 2] = ["OPERATIONAL", "CLOSED_TEMPORARILY"];

/// Operating status as reported by Google Maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusinessStatus {
    #[default]
    Operational,
    ClosedTemporarily,
    ClosedPermanently,
}

impl BusinessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operational => "OPERATIONAL",
            Self::ClosedTemporarily => "CLOSED_TEMPORARILY",
            Self::ClosedPermanently => "CLOSED_PERMANENTLY",
        }
    }

    /// Whether locations with this status appear in listings and sitemaps.
    pub fn is_listed(&self) -> bool {
        !matches!(self, Self::ClosedPermanently)
    }

    /// Map a scraped "open state" string ("Temporarily closed", "Closes at 5 PM")
    /// to a status. Anything that is not explicitly closed is operational.
    pub fn from_open_state(open_state: Option<&str>) -> Self {
        let Some(state) = open_state else {
            return Self::Operational;
        };
        let state = state.to_lowercase();
        if state.contains("permanently close") {
            Self::ClosedPermanently
        } else if state.contains("temporarily close") {
            Self::ClosedTemporarily
        } else {
            Self::Operational
        }
    }
}

impl fmt::Display for BusinessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BusinessStatus {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPERATIONAL" => Ok(Self::Operational),
            "CLOSED_TEMPORARILY" => Ok(Self::ClosedTemporarily),
            "CLOSED_PERMANENTLY" => Ok(Self::ClosedPermanently),
            other => Err(DirectoryError::invalid_variant("business_status", other)),
        }
    }
}

/// Moderation state of a listing (and of `open_24_hour_locations` entries).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(DirectoryError::invalid_variant("review_status", other)),
        }
    }
}

/// One amenity attached to a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amenity {
    pub name: String,
    pub category: String,
}

/// Group amenities by category, names sorted alphabetically within a category.
pub fn group_amenities(amenities: &[Amenity]) -> std::collections::BTreeMap<String, Vec<String>> {
    let mut grouped: std::collections::BTreeMap<String, Vec<String>> = Default::default();
    for amenity in amenities {
        grouped
            .entry(amenity.category.clone())
            .or_default()
            .push(amenity.name.clone());
    }
    for names in grouped.values_mut() {
        names.sort();
    }
    grouped
}
