pub mod config;
pub mod error;
pub mod geo;
pub mod hours;
pub mod images;
pub mod location;
pub mod sitemap;
pub mod slug;
pub mod states;

pub use config::SiteConfig;
pub use error::{DirectoryError, Result};
pub use geo::{haversine_miles, is_zip_code, Coordinates, RadiusQuery, SearchInput};
pub use hours::{
    business_hours_status, format_time, is_open_24_hours, next_open_time, open_status,
    state_timezone, timezone_abbreviation, weekly_schedule, ClockTime, DayHours, OpenStatus,
    WeeklySchedule,
};
pub use images::{ImageType, ImageVariant, LocationImage};
pub use location::{Amenity, BusinessStatus, ReviewStatus, VISIBLE_BUSINESS_STATUSES};
pub use slug::slugify;
