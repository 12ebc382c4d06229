//! Queries used by the migration jobs

use std::collections::HashSet;

use anyhow::{Context, Result};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use ventdir_core::{ImageType, SiteConfig};

pub async fn connect(config: &SiteConfig) -> Result<PgPool> {
    let url = config.database_url()?;
    PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(url)
        .await
        .context("failed to connect to database")
}

/// Location with Google-hosted images still to move
#[derive(Debug, Clone, FromRow)]
pub struct ImageSource {
    pub id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub photo_url: Option<String>,
    pub street_view_url: Option<String>,
}

/// Location with a stored SerpAPI result
#[derive(Debug, Clone, FromRow)]
pub struct PayloadSource {
    pub id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub serp_payload: Option<Value>,
}

impl PayloadSource {
    /// `photos_link` from the payload, which may be stored as a JSON string.
    pub fn photos_link(&self) -> Option<String> {
        let payload = match self.serp_payload.as_ref()? {
            Value::String(text) => serde_json::from_str::<Value>(text).ok()?,
            other => other.clone(),
        };
        payload
            .get("photos_link")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// `location_images` insert
#[derive(Debug, Clone)]
pub struct NewImage<'a> {
    pub location_id: Uuid,
    pub cf_image_id: &'a str,
    pub image_type: ImageType,
    pub is_primary: bool,
    pub uploaded_by: &'a str,
    pub source_url: &'a str,
}

pub async fn locations_with_images(pool: &PgPool, start_after: Option<Uuid>) -> Result<Vec<ImageSource>> {
    sqlx::query_as::<_, ImageSource>(
        r#"
        SELECT id, name, city, state, photo_url, street_view_url
        FROM locations
        WHERE (photo_url IS NOT NULL OR street_view_url IS NOT NULL)
          AND ($1::uuid IS NULL OR id > $1)
        ORDER BY id
        "#,
    )
    .bind(start_after)
    .fetch_all(pool)
    .await
    .context("failed to fetch locations with images")
}

pub async fn locations_with_payload(pool: &PgPool, start_after: Option<Uuid>) -> Result<Vec<PayloadSource>> {
    sqlx::query_as::<_, PayloadSource>(
        r#"
        SELECT id, name, city, state, to_jsonb(serp_payload) AS serp_payload
        FROM locations
        WHERE serp_payload IS NOT NULL
          AND ($1::uuid IS NULL OR id > $1)
        ORDER BY id
        "#,
    )
    .bind(start_after)
    .fetch_all(pool)
    .await
    .context("failed to fetch locations with SerpAPI payloads")
}

/// Locations that already have at least one image row.
pub async fn locations_with_any_image(pool: &PgPool) -> Result<HashSet<Uuid>> {
    let ids: Vec<Uuid> = sqlx::query_scalar("SELECT DISTINCT location_id FROM location_images")
        .fetch_all(pool)
        .await
        .context("failed to fetch migrated location ids")?;
    Ok(ids.into_iter().collect())
}

pub async fn has_any_image(pool: &PgPool, location_id: Uuid) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM location_images WHERE location_id = $1)",
    )
    .bind(location_id)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

pub async fn has_primary_image(pool: &PgPool, location_id: Uuid, image_type: ImageType) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM location_images
            WHERE location_id = $1 AND image_type = $2 AND is_primary = true
        )
        "#,
    )
    .bind(location_id)
    .bind(image_type.as_str())
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

pub async fn insert_image(pool: &PgPool, image: &NewImage<'_>) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO location_images
            (location_id, cf_image_id, image_type, is_primary, uploaded_by, source_url)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(image.location_id)
    .bind(image.cf_image_id)
    .bind(image.image_type.as_str())
    .bind(image.is_primary)
    .bind(image.uploaded_by)
    .bind(image.source_url)
    .execute(pool)
    .await
    .context("database insert failed")?;
    Ok(())
}
