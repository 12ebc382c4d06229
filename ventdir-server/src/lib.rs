//! ventdir-server: HTTP API for the directory site
//!
//! JSON endpoints for search, nearby results, listings, reviews, claims and
//! feedback, plus the XML sitemaps. Data lives in Postgres; radius math and
//! aggregate queries are stored functions called by name.

pub mod db;
pub mod geocode;
pub mod http;
pub mod models;
pub mod search;

pub use geocode::{Geocoder, ZippopotamGeocoder};
pub use http::{run_server, AppState, ServerConfig};
