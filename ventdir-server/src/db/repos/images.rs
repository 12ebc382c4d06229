//! Location image repository

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use ventdir_core::{ImageType, LocationImage};

use super::DbError;

/// `location_images` row as returned to clients
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImageRow {
    pub location_id: Uuid,
    pub cf_image_id: String,
    pub image_type: String,
    pub is_primary: bool,
}

impl ImageRow {
    /// Typed form for URL helpers. Rows with an unknown `image_type` are skipped.
    pub fn to_location_image(&self) -> Option<LocationImage> {
        let image_type: ImageType = self.image_type.parse().ok()?;
        Some(LocationImage {
            cf_image_id: self.cf_image_id.clone(),
            image_type,
            is_primary: self.is_primary,
        })
    }
}

/// Image repository
pub struct ImageRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ImageRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All images for a set of locations in one query.
    pub async fn for_locations(&self, location_ids: &[Uuid]) -> Result<Vec<ImageRow>, DbError> {
        if location_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, ImageRow>(
            r#"
            SELECT location_id, cf_image_id, image_type, COALESCE(is_primary, false) AS is_primary
            FROM location_images
            WHERE location_id = ANY($1)
            ORDER BY location_id, is_primary DESC
            "#,
        )
        .bind(location_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_image_types_are_skipped() {
        let row = ImageRow {
            location_id: Uuid::nil(),
            cf_image_id: "abc".into(),
            image_type: "banner".into(),
            is_primary: true,
        };
        assert!(row.to_location_image().is_none());

        let row = ImageRow {
            image_type: "street_view".into(),
            ..row
        };
        let image = row.to_location_image().unwrap();
        assert_eq!(image.image_type, ImageType::StreetView);
        assert!(image.is_primary);
    }
}
