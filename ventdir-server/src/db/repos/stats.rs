//! Aggregate and sitemap queries

use serde::Serialize;
use serde_json::Value;
use sqlx::{FromRow, PgPool};

use super::{visible_statuses, DbError};

/// Home page counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SiteStats {
    pub total_locations: i64,
    pub high_rated_count: i64,
    /// `high_rated_count / total_locations`, rounded to a whole percent
    pub high_rated_percent: i64,
    pub open_24_hours_count: i64,
}

impl SiteStats {
    pub fn new(total_locations: i64, high_rated_count: i64, open_24_hours_count: i64) -> Self {
        let high_rated_percent = if total_locations > 0 {
            ((high_rated_count as f64 / total_locations as f64) * 100.0).round() as i64
        } else {
            0
        };
        Self {
            total_locations,
            high_rated_count,
            high_rated_percent,
            open_24_hours_count,
        }
    }
}

/// Row of `get_distinct_cities()`
#[derive(Debug, Clone, FromRow)]
pub struct CityRow {
    pub city_slug: String,
    pub state: String,
}

/// Fields needed to build a listing URL
#[derive(Debug, Clone, FromRow)]
pub struct SitemapLocation {
    pub slug: String,
    pub state: String,
    pub city_slug: String,
}

/// Stats repository
pub struct StatsRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count of publicly visible listings.
    pub async fn visible_count(&self) -> Result<i64, DbError> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM locations
            WHERE business_status = ANY($1) AND review_status = 'approved'
            "#,
        )
        .bind(visible_statuses())
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Totals for the home page, computed in one round trip.
    pub async fn site_stats(&self) -> Result<SiteStats, DbError> {
        let (total, high_rated, open_24): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE l.google_rating >= 4.0),
                COUNT(*) FILTER (WHERE EXISTS (
                    SELECT 1 FROM open_24_hour_locations o
                    WHERE o.location_id = l.id AND o.review_status = 'approved'))
            FROM locations l
            WHERE l.business_status = ANY($1) AND l.review_status = 'approved'
            "#,
        )
        .bind(visible_statuses())
        .fetch_one(self.pool)
        .await?;

        Ok(SiteStats::new(total, high_rated, open_24))
    }

    /// `get_popular_states(limit_count)`
    pub async fn popular_states(&self, limit: i32) -> Result<Vec<Value>, DbError> {
        self.rpc_rows("SELECT to_jsonb(s) FROM get_popular_states(limit_count => $1) AS s", limit)
            .await
    }

    /// `get_popular_cities(limit_count)`
    pub async fn popular_cities(&self, limit: i32) -> Result<Vec<Value>, DbError> {
        self.rpc_rows("SELECT to_jsonb(c) FROM get_popular_cities(limit_count => $1) AS c", limit)
            .await
    }

    async fn rpc_rows(&self, sql: &'static str, limit: i32) -> Result<Vec<Value>, DbError> {
        let rows: Vec<(Value,)> = sqlx::query_as(sql)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(|(v,)| v).collect())
    }

    /// `get_distinct_cities()`
    pub async fn distinct_cities(&self) -> Result<Vec<CityRow>, DbError> {
        let rows = sqlx::query_as::<_, CityRow>(
            "SELECT city_slug, state FROM get_distinct_cities() WHERE city_slug IS NOT NULL AND state IS NOT NULL",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// One page of visible listings for the location sitemap, in id order
    /// so batches are stable between requests.
    pub async fn sitemap_locations(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<SitemapLocation>, DbError> {
        let rows = sqlx::query_as::<_, SitemapLocation>(
            r#"
            SELECT slug, state, city_slug
            FROM locations
            WHERE business_status = ANY($1)
              AND review_status = 'approved'
              AND slug IS NOT NULL AND state IS NOT NULL AND city_slug IS NOT NULL
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(visible_statuses())
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_rounded() {
        let stats = SiteStats::new(3, 2, 1);
        assert_eq!(stats.high_rated_percent, 67);
        assert_eq!(SiteStats::new(0, 0, 0).high_rated_percent, 0);
        assert_eq!(SiteStats::new(8, 1, 0).high_rated_percent, 13);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn visible_count_matches_site_stats() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool creation failed");
        let repo = StatsRepo::new(&pool);
        let count = repo.visible_count().await.expect("count failed");
        let stats = repo.site_stats().await.expect("stats failed");
        assert_eq!(count, stats.total_locations);
    }
}
