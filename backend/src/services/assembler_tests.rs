#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use crate::api::{CruiseId, CruiseMetadata, SearchWarning, TrackId, WarningKind};
    use crate::db::repositories::LocalRepository;
    use crate::models::{Point, Track};
    use crate::services::assembler::{assemble, build_response};
    use crate::services::SearchMatches;

    fn track(id: i64, cruise: &str, n: usize) -> Track {
        let points = (0..n).map(|i| Point::new(i as f64, 0.5 * i as f64)).collect();
        Track::new(TrackId::new(id), cruise, points)
    }

    fn matches_of(entries: Vec<(&str, Option<Track>)>) -> SearchMatches {
        SearchMatches {
            tracks: entries
                .into_iter()
                .map(|(id, t)| (CruiseId::new(id), t))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_single_point_track_serializes_as_nested_pair() {
        let matches = matches_of(vec![(
            "33RR20160208",
            Some(Track::new(
                TrackId::new(7),
                "33RR20160208",
                vec![Point::new(-70.5, 35.3)],
            )),
        )]);
        let response = build_response(matches, BTreeMap::new(), 50);

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "id_t": {"33RR20160208": 7},
                "i": {},
                "t": {"33RR20160208": [[-70.5, 35.3]]}
            })
        );
    }

    #[test]
    fn test_cruise_without_track_has_null_id_and_no_coordinates() {
        let matches = matches_of(vec![("NOTRACK", None)]);
        let mut metadata = BTreeMap::new();
        metadata.insert(CruiseId::new("NOTRACK"), CruiseMetadata::named("P16N"));

        let response = build_response(matches, metadata, 50);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["id_t"]["NOTRACK"], serde_json::Value::Null);
        assert_eq!(value["i"]["NOTRACK"]["name"], "P16N");
        assert!(value["t"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_tracks_are_simplified() {
        let matches = matches_of(vec![("LONG", Some(track(1, "LONG", 100)))]);
        let response = build_response(matches, BTreeMap::new(), 50);

        let coords = &response.t[&CruiseId::new("LONG")];
        assert_eq!(coords.len(), 50);
        assert_eq!(coords[0], [0.0, 0.0]);
        assert_eq!(coords[1], [2.0, 1.0]);
    }

    #[test]
    fn test_metadata_only_for_matched_cruises() {
        let matches = matches_of(vec![("A", Some(track(1, "A", 3)))]);
        let mut metadata = BTreeMap::new();
        metadata.insert(CruiseId::new("A"), CruiseMetadata::named("I08S"));
        metadata.insert(CruiseId::new("UNRELATED"), CruiseMetadata::named("P16N"));

        let response = build_response(matches, metadata, 50);
        assert_eq!(response.i.len(), 1);
        assert!(response.contains(&CruiseId::new("A")));
        assert!(!response.contains(&CruiseId::new("UNRELATED")));
    }

    #[test]
    fn test_warnings_are_carried_over() {
        let mut matches = matches_of(vec![]);
        matches.warnings.push(SearchWarning::for_shape(
            1,
            "circle:0,0_-1",
            WarningKind::InvalidShapeEncoding,
            "circle radius must be positive",
        ));

        let response = build_response(matches, BTreeMap::new(), 50);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["warnings"][0]["kind"], "invalid_shape_encoding");
        assert_eq!(value["warnings"][0]["shape_index"], 1);
        assert!(value["warnings"][0].get("cruise_id").is_none());
    }

    #[tokio::test]
    async fn test_assemble_joins_store_metadata() {
        let repo = LocalRepository::new();
        let mut record = CruiseMetadata::named("I08S");
        record.ship = Some("Roger Revelle".to_string());
        repo.insert_cruise(CruiseId::new("A"), record.clone());

        let matches = matches_of(vec![
            ("A", Some(track(1, "A", 4))),
            ("B", Some(track(2, "B", 4))),
        ]);
        let response = assemble(&repo, matches, 50).await;

        assert_eq!(response.len(), 2);
        assert_eq!(response.i.get(&CruiseId::new("A")), Some(&record));
        assert!(!response.i.contains_key(&CruiseId::new("B")));
        assert_eq!(response.t[&CruiseId::new("B")].len(), 4);
    }

    #[tokio::test]
    async fn test_assemble_survives_metadata_failures() {
        let repo = LocalRepository::new();
        repo.insert_cruise(CruiseId::new("A"), CruiseMetadata::named("I08S"));
        repo.set_healthy(false);

        let matches = matches_of(vec![("A", Some(track(1, "A", 2)))]);
        let response = assemble(&repo, matches, 50).await;

        assert!(response.contains(&CruiseId::new("A")));
        assert!(response.i.is_empty());
        assert_eq!(response.t[&CruiseId::new("A")].len(), 2);

        assert_eq!(response.warnings.len(), 1);
        let warning = &response.warnings[0];
        assert_eq!(warning.kind, WarningKind::MetadataUnavailable);
        assert_eq!(warning.cruise_id, Some(CruiseId::new("A")));
        assert_eq!(warning.shape_index, None);

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["warnings"][0]["kind"], "metadata_unavailable");
        assert_eq!(value["warnings"][0]["cruise_id"], "A");
        assert!(value["warnings"][0].get("shape_index").is_none());
    }

    #[tokio::test]
    async fn test_missing_metadata_is_not_a_warning() {
        let repo = LocalRepository::new();
        let matches = matches_of(vec![("NO_RECORD", Some(track(1, "NO_RECORD", 2)))]);
        let response = assemble(&repo, matches, 50).await;

        assert!(response.contains(&CruiseId::new("NO_RECORD")));
        assert!(response.warnings.is_empty());
    }
}
