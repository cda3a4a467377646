//! Builds the client response from matched cruises.

use std::collections::BTreeMap;

use futures::future::join_all;
use log::warn;

use super::search::SearchMatches;
use crate::algorithms::simplify_to_pairs;
use crate::api::{CruiseId, CruiseMetadata, SearchResponse, SearchWarning, WarningKind};
use crate::db::repository::CruiseMetadataRepository;

/// Look up metadata for every matched cruise and build the response.
///
/// Metadata lookups run concurrently. A failed lookup leaves the cruise in
/// the response with its track but no `i` entry, and adds a
/// `metadata_unavailable` warning naming the cruise.
pub async fn assemble<R: CruiseMetadataRepository + ?Sized>(
    repo: &R,
    matches: SearchMatches,
    max_coords: usize,
) -> SearchResponse {
    let ids: Vec<&CruiseId> = matches.tracks.keys().collect();
    let lookups = join_all(ids.iter().map(|id| repo.lookup_metadata(id))).await;

    let mut metadata = BTreeMap::new();
    let mut failures = Vec::new();
    for (id, result) in ids.into_iter().zip(lookups) {
        match result {
            Ok(Some(record)) => {
                metadata.insert(id.clone(), record);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("metadata lookup for {} failed: {}", id, e);
                failures.push(SearchWarning::for_cruise(
                    id.clone(),
                    WarningKind::MetadataUnavailable,
                    format!("metadata lookup failed: {}", e),
                ));
            }
        }
    }

    let mut response = build_response(matches, metadata, max_coords);
    response.warnings.extend(failures);
    response
}

/// Combine matches and already-fetched metadata.
///
/// `id_t` gets an entry for every matched cruise. `i` only holds cruises
/// present in `metadata`, and `t` only cruises that have a track.
pub fn build_response(
    matches: SearchMatches,
    mut metadata: BTreeMap<CruiseId, CruiseMetadata>,
    max_coords: usize,
) -> SearchResponse {
    let mut response = SearchResponse {
        warnings: matches.warnings,
        ..Default::default()
    };

    for (cruise_id, track) in matches.tracks {
        if let Some(record) = metadata.remove(&cruise_id) {
            response.i.insert(cruise_id.clone(), record);
        }
        match track {
            Some(track) => {
                response.id_t.insert(cruise_id.clone(), Some(track.id));
                response
                    .t
                    .insert(cruise_id, simplify_to_pairs(&track.points, max_coords));
            }
            None => {
                response.id_t.insert(cruise_id, None);
            }
        }
    }

    response
}

#[cfg(test)]
#[path = "assembler_tests.rs"]
mod assembler_tests;
