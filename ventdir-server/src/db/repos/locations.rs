//! Location repository
//!
//! Listing rows are returned as JSON objects (`to_jsonb(l)`) so the API
//! passes through whatever columns the site schema carries; the few
//! fields the server computes with are selected alongside as typed columns.

use serde::Serialize;
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;
use ventdir_core::{slugify, Amenity, DayHours, RadiusQuery};

use super::{ilike_pattern, visible_statuses, DbError};

/// Compact row for the header search box
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SearchHit {
    pub id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub slug: String,
    pub city_slug: Option<String>,
    pub google_rating: Option<f64>,
    pub description: Option<String>,
    pub review_count: Option<i64>,
}

/// `location_hours` row
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HoursRow {
    pub location_id: Uuid,
    pub day_of_week: i16,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub is_closed: bool,
}

impl From<&HoursRow> for DayHours {
    fn from(row: &HoursRow) -> Self {
        DayHours {
            day_of_week: row.day_of_week,
            open_time: row.open_time.clone(),
            close_time: row.close_time.clone(),
            is_closed: row.is_closed,
        }
    }
}

/// A single listing: the full row plus typed fields used server-side
#[derive(Debug, Clone)]
pub struct LocationRecord {
    pub id: Uuid,
    pub state: String,
    pub business_status: Option<String>,
    pub row: Value,
}

/// Filters for the moderation listing
#[derive(Debug, Clone)]
pub struct AdminFilter {
    pub review_status: String,
    pub search: Option<String>,
    /// Filter on the `open_24_hour_locations` review instead of the listing's
    pub only_24_hours: bool,
    pub limit: i64,
    pub offset: i64,
}

/// Location repository
pub struct LocationRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> LocationRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Call `locations_within_radius`, preserving the function's ordering.
    pub async fn within_radius(&self, query: &RadiusQuery) -> Result<Vec<Value>, DbError> {
        let rows: Vec<(Value,)> = sqlx::query_as(
            r#"
            SELECT to_jsonb(r)
            FROM locations_within_radius(
                search_lat => $1,
                search_lng => $2,
                radius_miles => $3,
                exclude_ids => $4
            ) AS r
            "#,
        )
        .bind(query.search_lat)
        .bind(query.search_lng)
        .bind(query.radius_miles)
        .bind(query.exclude_ids.as_slice())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|(v,)| v).collect())
    }

    /// Free-text search over visible listings, most reviewed first.
    pub async fn text_search(&self, term: &str, limit: i64) -> Result<Vec<SearchHit>, DbError> {
        let rows = sqlx::query_as::<_, SearchHit>(
            r#"
            SELECT
                id, name, city, state, slug, city_slug,
                google_rating::float8 AS google_rating,
                description,
                review_count::int8 AS review_count
            FROM locations
            WHERE business_status = ANY($1)
              AND review_status = 'approved'
              AND (name ILIKE $2 OR city ILIKE $2 OR state ILIKE $2 OR description ILIKE $2)
            ORDER BY review_count DESC NULLS LAST
            LIMIT $3
            "#,
        )
        .bind(visible_statuses())
        .bind(ilike_pattern(term))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Find a visible listing by its public URL parts.
    ///
    /// Candidates are narrowed in SQL by city slug, slug and a loose state
    /// match; the exact state comparison is done on the slugified name.
    pub async fn find_visible(
        &self,
        state_slug: &str,
        city_slug: &str,
        slug: &str,
    ) -> Result<LocationRecord, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT to_jsonb(l) AS row, l.id, l.state, l.business_status
            FROM locations l
            WHERE l.review_status = 'approved'
              AND l.business_status = ANY($1)
              AND l.city_slug = $2
              AND l.slug = $3
              AND l.state ILIKE $4
            "#,
        )
        .bind(visible_statuses())
        .bind(city_slug)
        .bind(slug)
        .bind(ilike_pattern(&ventdir_core::slug::unslug_state(state_slug)))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| LocationRecord {
                id: r.get("id"),
                state: r.get::<Option<String>, _>("state").unwrap_or_default(),
                business_status: r.get("business_status"),
                row: r.get("row"),
            })
            .find(|rec| slugify(&rec.state) == state_slug)
            .ok_or_else(|| DbError::NotFound {
                resource: "location",
                id: format!("{state_slug}/{city_slug}/{slug}"),
            })
    }

    /// `get_featured_locations(limit_count)`
    pub async fn featured(&self, limit: i32) -> Result<Vec<Value>, DbError> {
        let rows: Vec<(Value,)> = sqlx::query_as(
            "SELECT to_jsonb(f) FROM get_featured_locations(limit_count => $1) AS f",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|(v,)| v).collect())
    }

    /// Hours for a set of locations in one query.
    pub async fn hours_for(&self, location_ids: &[Uuid]) -> Result<Vec<HoursRow>, DbError> {
        if location_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, HoursRow>(
            r#"
            SELECT
                location_id,
                day_of_week::int2 AS day_of_week,
                open_time,
                close_time,
                COALESCE(is_closed, false) AS is_closed
            FROM location_hours
            WHERE location_id = ANY($1)
            ORDER BY location_id, day_of_week
            "#,
        )
        .bind(location_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn amenities_for(&self, location_id: Uuid) -> Result<Vec<Amenity>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT amenity_name, amenity_category
            FROM location_amenities
            WHERE location_id = $1
            "#,
        )
        .bind(location_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Amenity {
                name: r.get("amenity_name"),
                category: r.get::<Option<String>, _>("amenity_category").unwrap_or_default(),
            })
            .collect())
    }

    /// Moderation listing with hours and images embedded, newest first.
    ///
    /// Returns the page plus the total number of matching rows, which is
    /// counted separately so a page past the end still reports it.
    pub async fn admin_list(&self, filter: &AdminFilter) -> Result<(Vec<Value>, i64), DbError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT
                to_jsonb(l) || jsonb_build_object(
                    'location_hours', COALESCE(
                        (SELECT jsonb_agg(to_jsonb(h)) FROM location_hours h WHERE h.location_id = l.id),
                        '[]'::jsonb),
                    'location_images', COALESCE(
                        (SELECT jsonb_agg(jsonb_build_object(
                            'cf_image_id', i.cf_image_id,
                            'image_type', i.image_type,
                            'is_primary', i.is_primary))
                         FROM location_images i WHERE i.location_id = l.id),
                        '[]'::jsonb)
            "#,
        );
        if filter.only_24_hours {
            qb.push(
                r#",
                    'open_24_hour_locations', jsonb_build_object(
                        'location_id', o.location_id,
                        'review_status', o.review_status)
            "#,
            );
        }
        qb.push(") AS row");
        push_admin_filter(&mut qb, filter);
        qb.push(" ORDER BY l.created_at DESC, l.id DESC LIMIT ");
        qb.push_bind(filter.limit);
        qb.push(" OFFSET ");
        qb.push_bind(filter.offset);

        let data = qb
            .build()
            .fetch_all(self.pool)
            .await?
            .into_iter()
            .map(|r| r.get::<Value, _>("row"))
            .collect();

        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*)");
        push_admin_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        Ok((data, total))
    }

    /// Flag a listing as having a pending ownership claim.
    pub async fn mark_claim_pending(&self, location_id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE locations SET claimed_status = 'pending' WHERE id = $1")
            .bind(location_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "location",
                id: location_id.to_string(),
            });
        }
        Ok(())
    }
}

/// `FROM ... WHERE ...` shared by the admin page and its count.
fn push_admin_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &AdminFilter) {
    if filter.only_24_hours {
        qb.push(
            " FROM locations l JOIN open_24_hour_locations o ON o.location_id = l.id \
             WHERE o.review_status = ",
        );
    } else {
        qb.push(" FROM locations l WHERE l.review_status = ");
    }
    qb.push_bind(filter.review_status.clone());

    if let Some(term) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = ilike_pattern(term);
        qb.push(" AND (l.name ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR l.description ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR l.state ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR l.city ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_row_converts_to_day_hours() {
        let row = HoursRow {
            location_id: Uuid::nil(),
            day_of_week: 0,
            open_time: Some("08:00 AM".into()),
            close_time: Some("05:00 PM".into()),
            is_closed: false,
        };
        let day = DayHours::from(&row);
        assert_eq!(day.weekday(), Some(chrono::Weekday::Sun));
        assert_eq!(day.open_time.as_deref(), Some("08:00 AM"));
    }

    // Run with: DATABASE_URL=postgres://... cargo test -p ventdir-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn radius_search_returns_objects() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool creation failed");
        let query = RadiusQuery::around(ventdir_core::Coordinates::new(39.7684, -86.1581));
        let rows = LocationRepo::new(&pool).within_radius(&query).await.expect("rpc failed");
        assert!(rows.iter().all(Value::is_object));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn admin_list_counts_match_page() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool creation failed");
        let filter = AdminFilter {
            review_status: "pending".into(),
            search: None,
            only_24_hours: false,
            limit: 5,
            offset: 0,
        };
        let (data, total) = LocationRepo::new(&pool).admin_list(&filter).await.expect("query failed");
        assert!(data.len() <= 5);
        assert!(total >= data.len() as i64);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn admin_list_reports_total_past_last_page() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool creation failed");
        let repo = LocationRepo::new(&pool);
        let mut filter = AdminFilter {
            review_status: "approved".into(),
            search: None,
            only_24_hours: false,
            limit: 1,
            offset: 0,
        };
        let (_, total) = repo.admin_list(&filter).await.expect("query failed");

        filter.offset = total + 1000;
        let (data, past_end) = repo.admin_list(&filter).await.expect("query failed");
        assert!(data.is_empty());
        assert_eq!(past_end, total);
    }

    #[test]
    fn admin_filter_sql_is_shared() {
        let filter = AdminFilter {
            review_status: "pending".into(),
            search: Some("vent".into()),
            only_24_hours: true,
            limit: 10,
            offset: 0,
        };
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*)");
        push_admin_filter(&mut qb, &filter);
        let sql = qb.sql().to_string();
        assert!(sql.contains("JOIN open_24_hour_locations o"));
        assert!(sql.contains("o.review_status = $1"));
        assert!(sql.contains("l.city ILIKE $5"));
        assert!(!sql.contains("LIMIT"));
    }
}
