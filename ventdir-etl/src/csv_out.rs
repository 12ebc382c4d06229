//! Import CSVs in the column layout the database loader expects.
//! Every field is quoted; newlines inside values become spaces.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::{QuoteStyle, WriterBuilder};

pub const LOCATIONS_FILE: &str = "locations.csv";
pub const HOURS_FILE: &str = "location_hours.csv";
pub const AMENITIES_FILE: &str = "location_amenities.csv";

pub const LOCATION_COLUMNS: [&str; 36] = [
    "id",
    "name",
    "slug",
    "city_slug",
    "website_url",
    "phone",
    "email",
    "street_address",
    "city",
    "state",
    "postal_code",
    "country",
    "latitude",
    "longitude",
    "description",
    "business_type",
    "business_types",
    "business_status",
    "google_rating",
    "review_count",
    "reviews_tags",
    "working_hours",
    "price_level",
    "photo_url",
    "logo_url",
    "street_view_url",
    "reservation_urls",
    "booking_appointment_url",
    "menu_url",
    "order_urls",
    "location_url",
    "google_place_id",
    "google_id",
    "google_verified",
    "updated_at",
    "serp_payload",
];

pub const HOURS_COLUMNS: [&str; 5] = [
    "location_id",
    "day_of_week",
    "open_time",
    "close_time",
    "is_closed",
];

pub const AMENITY_COLUMNS: [&str; 3] = ["location_id", "amenity_name", "amenity_category"];

/// A row that knows its CSV column values, in header order.
pub trait CsvRow {
    fn fields(&self) -> Vec<String>;
}

fn clean(field: &str) -> String {
    field.replace('\n', " ").replace('\r', "")
}

/// Write `header` plus one record per row, overwriting `path`.
pub fn write_csv<R: CsvRow>(path: &Path, header: &[&str], rows: &[R]) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    wtr.write_record(header)?;
    for row in rows {
        wtr.write_record(row.fields().iter().map(|f| clean(f)))?;
    }
    wtr.flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

/// Files written by one [`save_import`] call
#[derive(Debug, Default)]
pub struct SavedFiles {
    pub locations: PathBuf,
    pub hours: Option<PathBuf>,
    pub amenities: Option<PathBuf>,
}

/// Write the three import files into `dir`, creating it if needed.
/// Hours and amenities files are only written when they have rows.
pub fn save_import<L, H, A>(dir: &Path, locations: &[L], hours: &[H], amenities: &[A]) -> Result<SavedFiles>
where
    L: CsvRow,
    H: CsvRow,
    A: CsvRow,
{
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let mut saved = SavedFiles {
        locations: dir.join(LOCATIONS_FILE),
        ..Default::default()
    };
    write_csv(&saved.locations, &LOCATION_COLUMNS, locations)?;

    if !amenities.is_empty() {
        let path = dir.join(AMENITIES_FILE);
        write_csv(&path, &AMENITY_COLUMNS, amenities)?;
        saved.amenities = Some(path);
    }
    if !hours.is_empty() {
        let path = dir.join(HOURS_FILE);
        write_csv(&path, &HOURS_COLUMNS, hours)?;
        saved.hours = Some(path);
    }
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair(&'static str, &'static str);

    impl CsvRow for Pair {
        fn fields(&self) -> Vec<String> {
            vec![self.0.to_string(), self.1.to_string()]
        }
    }

    /// Row of `n` empty fields
    struct Blank(usize);

    impl CsvRow for Blank {
        fn fields(&self) -> Vec<String> {
            vec![String::new(); self.0]
        }
    }

    #[test]
    fn quotes_everything_and_flattens_newlines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&path, &["a", "b"], &[Pair("one\ntwo\r", "say \"hi\""), Pair("", "3")]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], r#""a","b""#);
        assert_eq!(lines[1], r#""one two","say ""hi""""#);
        assert_eq!(lines[2], r#""","3""#);
    }

    #[test]
    fn empty_hours_and_amenities_are_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("indiana-united-states");
        let none: [Blank; 0] = [];
        let location = Blank(LOCATION_COLUMNS.len());
        let saved = save_import(&target, &[location], &none, &none).unwrap();

        assert!(saved.locations.exists());
        assert!(saved.hours.is_none());
        assert!(saved.amenities.is_none());
        assert!(!target.join(HOURS_FILE).exists());
        assert!(!target.join(AMENITIES_FILE).exists());
        assert_eq!(fs::read_to_string(&saved.locations).unwrap().lines().count(), 2);
    }

    #[test]
    fn non_empty_hours_and_amenities_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let saved = save_import(
            dir.path(),
            &[Blank(LOCATION_COLUMNS.len())],
            &[Blank(HOURS_COLUMNS.len()), Blank(HOURS_COLUMNS.len())],
            &[Blank(AMENITY_COLUMNS.len())],
        )
        .unwrap();

        let hours = saved.hours.unwrap();
        assert_eq!(hours, dir.path().join(HOURS_FILE));
        assert_eq!(fs::read_to_string(&hours).unwrap().lines().count(), 3);
        assert!(saved.amenities.unwrap().exists());
    }
}
