//! PostGIS track store.
//!
//! Tracks are `LineString` geometries (SRID 4326) next to a `cruises` table
//! holding the descriptive record and the cruise dates. The coarse spatial
//! filter is the bounding-box operator `&&`, answered by a GiST index on
//! `tracks.geometry`.
//!
//! Calls run on the blocking pool under a [`RetryPolicy`] built from
//! [`PostgresConfig`]; transient failures are retried with backoff until the
//! retry budget is spent. Pending migrations run when the store is opened.

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::sql_types::{Array, Date, Text};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::api::{CruiseId, CruiseMetadata};
use crate::db::repo_config::PostgresConfig;
use crate::db::repository::{
    CruiseMetadataRepository, ErrorContext, RepositoryError, RepositoryResult, TrackStore,
};
use crate::db::retry::RetryPolicy;
use crate::models::{BoundingBox, TimeWindow, Track, TrackCandidate};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PostgresRepository {
    /// Open the pool and apply pending migrations. Blocking.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let pool = Pool::builder()
            .max_size(config.max_connections)
            .min_idle(Some(config.min_connections))
            .connection_timeout(Duration::from_secs(config.connect_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(ConnectionManager::<PgConnection>::new(&config.database_url))
            .map_err(|e| {
                RepositoryError::connection(e.to_string()).at(
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_connections={}", config.max_connections)),
                )
            })?;

        let mut conn = pool
            .get()
            .map_err(|e| RepositoryError::from(e).with_operation("migrate"))?;
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal(format!("Migration failed: {}", e))
                .at(ErrorContext::new("migrate"))
        })?;
        drop(conn);

        let retry = RetryPolicy::from(&config);
        log::info!(
            "Postgres track store ready (pool {}..{}, {} retries within {:?})",
            config.min_connections,
            config.max_connections,
            retry.max_retries,
            retry.budget
        );
        Ok(Self { pool, retry })
    }

    /// Run `f` on a pooled connection on the blocking pool, retrying
    /// transient failures under the store's [`RetryPolicy`].
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: Fn(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let retry = self.retry;

        task::spawn_blocking(move || {
            retry.run(|_attempt| {
                let mut conn = pool.get()?;
                f(&mut conn)
            })
        })
        .await
        .map_err(|e| {
            RepositoryError::internal(format!("Task join error: {}", e))
                .at(ErrorContext::new("spawn_blocking"))
        })?
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

const TRACK_COLUMNS: &str = "SELECT t.track_id, t.cruise_id, ST_AsGeoJSON(t.geometry) AS geojson, \
     c.begin_date, c.end_date \
     FROM tracks t JOIN cruises c ON c.cruise_id = t.cruise_id";

/// Escape `ILIKE` wildcards so user input matches literally.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn rows_to_tracks(rows: Vec<TrackRow>) -> RepositoryResult<Vec<Track>> {
    rows.into_iter().map(TrackRow::into_track).collect()
}

#[async_trait]
impl TrackStore for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn find_candidates(
        &self,
        bounds: &BoundingBox,
        window: &TimeWindow,
    ) -> RepositoryResult<Vec<TrackCandidate>> {
        if window.is_empty() {
            return Ok(Vec::new());
        }

        let wkt = bounds.to_wkt_polygon();
        let window_end = window.end();
        let window_start = window.start();

        // LEAST/GREATEST skip NULLs, so a cruise with one date is compared on
        // that date alone and a cruise with none is filtered out.
        let rows = self
            .with_conn(move |conn| {
                sql_query(format!(
                    "{TRACK_COLUMNS} \
                     WHERE t.geometry && ST_GeomFromText($1, 4326) \
                     AND LEAST(c.begin_date, c.end_date) < $2 \
                     AND GREATEST(c.begin_date, c.end_date) >= $3"
                ))
                .bind::<Text, _>(&wkt)
                .bind::<Date, _>(window_end)
                .bind::<Date, _>(window_start)
                .load::<TrackRow>(conn)
                .map_err(|e| map_diesel_error(e).with_operation("find_candidates"))
            })
            .await?;

        log::debug!("find_candidates: {} rows for {}", rows.len(), bounds.to_wkt_polygon());
        rows_to_tracks(rows)
    }

    async fn find_by_identifiers(&self, ids: &[CruiseId]) -> RepositoryResult<Vec<Track>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();

        let rows = self
            .with_conn(move |conn| {
                sql_query(format!("{TRACK_COLUMNS} WHERE t.cruise_id = ANY($1)"))
                    .bind::<Array<Text>, _>(&ids)
                    .load::<TrackRow>(conn)
                    .map_err(|e| map_diesel_error(e).with_operation("find_by_identifiers"))
            })
            .await?;

        rows_to_tracks(rows)
    }

    async fn text_search(&self, query: &str) -> RepositoryResult<Vec<Vec<CruiseId>>> {
        let needle = query.trim();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = like_pattern(needle);

        let rows = self
            .with_conn(move |conn| {
                sql_query(
                    "SELECT cruise_id, \
                     CASE WHEN cruise_id ILIKE $1 OR name ILIKE $1 THEN 0 ELSE 1 END AS rank \
                     FROM cruises \
                     WHERE cruise_id ILIKE $1 OR name ILIKE $1 OR line ILIKE $1 \
                     OR chief_scientist ILIKE $1 OR ship ILIKE $1 \
                     ORDER BY rank, cruise_id",
                )
                .bind::<Text, _>(&pattern)
                .load::<RankedCruiseRow>(conn)
                .map_err(|e| map_diesel_error(e).with_operation("text_search"))
            })
            .await?;

        let mut groups: Vec<Vec<CruiseId>> = Vec::new();
        let mut current_rank = None;
        for row in rows {
            if current_rank != Some(row.rank) {
                groups.push(Vec::new());
                current_rank = Some(row.rank);
            }
            if let Some(group) = groups.last_mut() {
                group.push(CruiseId::new(row.cruise_id));
            }
        }
        Ok(groups)
    }
}

#[async_trait]
impl CruiseMetadataRepository for PostgresRepository {
    async fn lookup_metadata(
        &self,
        cruise_id: &CruiseId,
    ) -> RepositoryResult<Option<CruiseMetadata>> {
        let id = cruise_id.as_str().to_string();
        let row = self
            .with_conn(move |conn| {
                cruises::table
                    .find(&id)
                    .select(CruiseRow::as_select())
                    .first::<CruiseRow>(conn)
                    .optional()
                    .map_err(|e| map_diesel_error(e).with_operation("lookup_metadata"))
            })
            .await?;

        Ok(row.map(CruiseMetadata::from))
    }
}
