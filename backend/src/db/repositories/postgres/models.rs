use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Date, Integer, Nullable, Text};
use serde::Deserialize;

use super::schema::cruises;
use crate::api::{CruiseId, CruiseMetadata, TrackId};
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::models::{Point, Track};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cruises)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CruiseRow {
    pub cruise_id: String,
    pub name: String,
    pub line: Option<String>,
    pub chief_scientist: Option<String>,
    pub ship: Option<String>,
    pub begin_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<CruiseRow> for CruiseMetadata {
    fn from(row: CruiseRow) -> Self {
        CruiseMetadata {
            name: row.name,
            line: row.line,
            chief_scientist: row.chief_scientist,
            ship: row.ship,
            begin_date: row.begin_date,
            end_date: row.end_date,
        }
    }
}

/// Track joined with its cruise dates; geometry comes back as GeoJSON text.
#[derive(Debug, Clone, QueryableByName)]
pub struct TrackRow {
    #[diesel(sql_type = BigInt)]
    pub track_id: i64,
    #[diesel(sql_type = Text)]
    pub cruise_id: String,
    #[diesel(sql_type = Text)]
    pub geojson: String,
    #[diesel(sql_type = Nullable<Date>)]
    pub begin_date: Option<NaiveDate>,
    #[diesel(sql_type = Nullable<Date>)]
    pub end_date: Option<NaiveDate>,
}

impl TrackRow {
    pub fn into_track(self) -> RepositoryResult<Track> {
        let points = decode_geojson_points(&self.geojson).map_err(|reason| {
            RepositoryError::decode(reason).at(
                ErrorContext::new("decode_track").with_details(format!("track_id={}", self.track_id)),
            )
        })?;

        Ok(Track {
            id: TrackId::new(self.track_id),
            cruise_id: CruiseId::new(self.cruise_id),
            points,
            begin_date: self.begin_date,
            end_date: self.end_date,
        })
    }
}

/// Free-text hit; rank 0 for identifier or name matches, 1 otherwise.
#[derive(Debug, Clone, QueryableByName)]
pub struct RankedCruiseRow {
    #[diesel(sql_type = Text)]
    pub cruise_id: String,
    #[diesel(sql_type = Integer)]
    pub rank: i32,
}

#[derive(Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum GeoJsonGeometry {
    LineString(Vec<[f64; 2]>),
    MultiLineString(Vec<Vec<[f64; 2]>>),
    Point([f64; 2]),
}

/// Decode the output of `ST_AsGeoJSON` into track positions.
pub fn decode_geojson_points(geojson: &str) -> Result<Vec<Point>, String> {
    let geometry: GeoJsonGeometry = serde_json::from_str(geojson)
        .map_err(|e| format!("Failed to parse track geometry: {e}"))?;

    let pairs = match geometry {
        GeoJsonGeometry::LineString(coords) => coords,
        GeoJsonGeometry::MultiLineString(lines) => lines.into_iter().flatten().collect(),
        GeoJsonGeometry::Point(coord) => vec![coord],
    };
    Ok(pairs.into_iter().map(|[x, y]| Point::new(x, y)).collect())
}
