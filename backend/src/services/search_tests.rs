#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::NaiveDate;

    use crate::api::{CruiseId, CruiseMetadata, WarningKind};
    use crate::config::SearchConfig;
    use crate::db::repositories::LocalRepository;
    use crate::models::{BoundingBox, Point, QueryShape, TimeWindow};
    use crate::services::search::{SearchMode, SearchRequest, SpatialQueryEngine};
    use crate::services::SearchError;

    fn date(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 3, 1).unwrap()
    }

    fn add_cruise(repo: &LocalRepository, id: &str, year: i32, points: &[(f64, f64)]) {
        let mut metadata = CruiseMetadata::named(id);
        metadata.begin_date = Some(date(year));
        metadata.end_date = Some(date(year) + chrono::Duration::days(30));
        repo.insert_cruise(CruiseId::new(id), metadata);
        if !points.is_empty() {
            repo.insert_track(
                CruiseId::new(id),
                points.iter().map(|&p| Point::from(p)).collect(),
            );
        }
    }

    fn engine(repo: &LocalRepository) -> SpatialQueryEngine {
        engine_with(repo, SearchConfig::default())
    }

    fn engine_with(repo: &LocalRepository, config: SearchConfig) -> SpatialQueryEngine {
        SpatialQueryEngine::new(Arc::new(repo.clone()), config)
    }

    fn window() -> TimeWindow {
        TimeWindow::new(1967, 2030)
    }

    fn ids(matches: &crate::services::SearchMatches) -> Vec<&str> {
        matches.cruise_ids().map(|id| id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_rectangle_keeps_only_tracks_with_inside_vertex() {
        let repo = LocalRepository::new();
        add_cruise(&repo, "T1", 2000, &[(5.0, 5.0)]);
        add_cruise(&repo, "T2", 2000, &[(50.0, 50.0)]);

        let shape = QueryShape::rectangle(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let matches = engine(&repo).search(&[shape], &window()).await;

        assert_eq!(ids(&matches), vec!["T1"]);
        assert!(matches.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_coarse_candidate_rejected_by_refinement() {
        let repo = LocalRepository::new();
        // Bounding box overlaps the triangle's, but no vertex is inside it.
        add_cruise(&repo, "CORNER", 2000, &[(9.0, 9.0), (9.5, 8.0)]);
        add_cruise(&repo, "INSIDE", 2000, &[(1.0, 1.0)]);

        let triangle = QueryShape::polygon(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        ]);
        let matches = engine(&repo).search(&[triangle], &window()).await;

        assert_eq!(ids(&matches), vec!["INSIDE"]);
        assert_eq!(matches.stats[0].candidates, 2);
        assert_eq!(matches.stats[0].matches, 1);
    }

    #[tokio::test]
    async fn test_disjoint_shapes_union_in_any_order() {
        let repo = LocalRepository::new();
        add_cruise(&repo, "WEST", 1990, &[(-50.0, 10.0), (-49.0, 11.0)]);
        add_cruise(&repo, "EAST", 1995, &[(50.0, 10.0)]);
        add_cruise(&repo, "BOTH", 2001, &[(-50.5, 10.5), (50.5, 10.5)]);

        let west = QueryShape::rectangle(Point::new(-55.0, 5.0), Point::new(-45.0, 15.0));
        let east = QueryShape::rectangle(Point::new(45.0, 5.0), Point::new(55.0, 15.0));

        let engine = engine(&repo);
        let forward = engine.search(&[west.clone(), east.clone()], &window()).await;
        let backward = engine.search(&[east.clone(), west.clone()], &window()).await;
        let repeated = engine.search(&[west.clone(), east, west], &window()).await;

        assert_eq!(ids(&forward), vec!["BOTH", "EAST", "WEST"]);
        assert_eq!(forward.tracks, backward.tracks);
        assert_eq!(forward.tracks, repeated.tracks);
    }

    #[tokio::test]
    async fn test_sequential_and_parallel_agree() {
        let repo = LocalRepository::new();
        add_cruise(&repo, "A", 1990, &[(1.0, 1.0)]);
        add_cruise(&repo, "B", 1990, &[(20.0, 20.0)]);

        let shapes = [
            QueryShape::rectangle(Point::new(0.0, 0.0), Point::new(5.0, 5.0)),
            QueryShape::circle(Point::new(20.0, 20.0), 2.0),
        ];
        let parallel = engine(&repo).search(&shapes, &window()).await;
        let sequential = engine_with(
            &repo,
            SearchConfig {
                parallel_shapes: false,
                ..Default::default()
            },
        )
        .search(&shapes, &window())
        .await;

        assert_eq!(parallel, sequential);
        assert_eq!(parallel.len(), 2);
    }

    #[tokio::test]
    async fn test_store_failure_is_isolated_to_one_shape() {
        let repo = LocalRepository::new();
        add_cruise(&repo, "A", 2000, &[(5.0, 5.0)]);
        add_cruise(&repo, "B", 2000, &[(105.0, 5.0)]);
        repo.fail_candidates_in(BoundingBox::new(-1.0, -1.0, 11.0, 11.0));

        let encoded = vec![
            "rectangle:0,0_10,10".to_string(),
            "rectangle:100,0_110,10".to_string(),
        ];
        let matches = engine(&repo).search_encoded(&encoded, &window()).await;

        assert_eq!(ids(&matches), vec!["B"]);
        assert_eq!(matches.warnings.len(), 1);
        assert_eq!(matches.warnings[0].shape_index, Some(0));
        assert_eq!(matches.warnings[0].kind, WarningKind::StoreUnavailable);
        assert_eq!(matches.stats.len(), 1);
        assert_eq!(matches.stats[0].shape_index, 1);
    }

    #[tokio::test]
    async fn test_slow_store_times_out_per_shape() {
        let repo = LocalRepository::new();
        add_cruise(&repo, "A", 2000, &[(5.0, 5.0)]);
        repo.set_candidate_delay(Some(Duration::from_millis(500)));

        let config = SearchConfig {
            store_timeout_ms: 20,
            ..Default::default()
        };
        let shape = QueryShape::rectangle(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let matches = engine_with(&repo, config).search(&[shape], &window()).await;

        assert!(matches.is_empty());
        assert_eq!(matches.warnings[0].kind, WarningKind::StoreUnavailable);
        assert!(matches.warnings[0].message.contains("Timeout"));
    }

    #[tokio::test]
    async fn test_invalid_encoding_keeps_position_and_other_shapes() {
        let repo = LocalRepository::new();
        add_cruise(&repo, "A", 2000, &[(5.0, 5.0)]);

        let encoded = vec![
            "hexagon:1,2_3,4".to_string(),
            "rectangle:0,0_10,10".to_string(),
            "polygon:1,x_2,2_3,3".to_string(),
        ];
        let matches = engine(&repo).search_encoded(&encoded, &window()).await;

        assert_eq!(ids(&matches), vec!["A"]);
        let positions: Vec<Option<usize>> =
            matches.warnings.iter().map(|w| w.shape_index).collect();
        assert_eq!(positions, vec![Some(0), Some(2)]);
        assert!(matches
            .warnings
            .iter()
            .all(|w| w.kind == WarningKind::InvalidShapeEncoding));
        assert_eq!(matches.warnings[0].shape.as_deref(), Some("hexagon:1,2_3,4"));
    }

    #[tokio::test]
    async fn test_non_finite_shapes_are_warned_and_skip_store() {
        let repo = LocalRepository::new();
        add_cruise(&repo, "A", 2000, &[(5.0, 5.0)]);
        repo.set_healthy(false);

        let shapes = [
            QueryShape::circle(Point::new(5.0, 5.0), f64::NAN),
            QueryShape::polygon(vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, f64::NAN),
                Point::new(10.0, 10.0),
            ]),
        ];
        let matches = engine(&repo).search(&shapes, &window()).await;

        assert!(matches.is_empty());
        assert!(matches.stats.is_empty());
        assert_eq!(matches.warnings.len(), 2);
        assert!(matches
            .warnings
            .iter()
            .all(|w| w.kind == WarningKind::InvalidShapeEncoding));
        let positions: Vec<Option<usize>> =
            matches.warnings.iter().map(|w| w.shape_index).collect();
        assert_eq!(positions, vec![Some(0), Some(1)]);
    }

    #[tokio::test]
    async fn test_degenerate_shape_skips_store() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);

        let line = QueryShape::polygon(vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)]);
        let matches = engine(&repo).search(&[line], &window()).await;

        assert!(matches.is_empty());
        assert_eq!(matches.warnings[0].kind, WarningKind::DegenerateGeometry);
    }

    #[tokio::test]
    async fn test_time_window_filters_cruises() {
        let repo = LocalRepository::new();
        add_cruise(&repo, "OLD", 1975, &[(5.0, 5.0)]);
        add_cruise(&repo, "NEW", 2005, &[(6.0, 6.0)]);

        let shape = QueryShape::rectangle(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let engine = engine(&repo);

        let recent = engine.search(&[shape.clone()], &TimeWindow::new(2000, 2010)).await;
        assert_eq!(ids(&recent), vec!["NEW"]);

        let boundary = engine.search(&[shape.clone()], &TimeWindow::new(1960, 1975)).await;
        assert_eq!(ids(&boundary), vec!["OLD"]);

        let inverted = engine.search(&[shape], &TimeWindow::new(2010, 2000)).await;
        assert!(inverted.is_empty());
    }

    #[tokio::test]
    async fn test_cruise_without_dates_never_matches() {
        let repo = LocalRepository::new();
        repo.insert_cruise(CruiseId::new("UNDATED"), CruiseMetadata::named("UNDATED"));
        repo.insert_track(CruiseId::new("UNDATED"), vec![Point::new(5.0, 5.0)]);

        let shape = QueryShape::rectangle(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let matches = engine(&repo).search(&[shape], &window()).await;
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_geodesic_circle_widens_match_at_high_latitude() {
        let repo = LocalRepository::new();
        // 1.5 degrees of longitude at 60N is about 0.75 degrees of arc.
        add_cruise(&repo, "NORTH", 2000, &[(1.5, 60.0)]);
        let circle = QueryShape::circle(Point::new(0.0, 60.0), 1.0);

        let planar = engine(&repo).search(&[circle.clone()], &window()).await;
        assert!(planar.is_empty());

        let geodesic = engine_with(
            &repo,
            SearchConfig {
                geodesic_circles: true,
                ..Default::default()
            },
        )
        .search(&[circle], &window())
        .await;
        assert_eq!(ids(&geodesic), vec!["NORTH"]);
    }

    #[tokio::test]
    async fn test_lookup_ids_keeps_unknown_cruises() {
        let repo = LocalRepository::new();
        add_cruise(&repo, "A", 2000, &[(5.0, 5.0)]);
        add_cruise(&repo, "NOTRACK", 2000, &[]);

        let matches = engine(&repo)
            .lookup_ids(&[
                CruiseId::new("NOTRACK"),
                CruiseId::new("A"),
                CruiseId::new("MISSING"),
                CruiseId::new("A"),
            ])
            .await
            .unwrap();

        assert_eq!(ids(&matches), vec!["A", "MISSING", "NOTRACK"]);
        assert!(matches.tracks[&CruiseId::new("A")].is_some());
        assert!(matches.tracks[&CruiseId::new("MISSING")].is_none());
        assert!(matches.tracks[&CruiseId::new("NOTRACK")].is_none());
    }

    #[tokio::test]
    async fn test_lookup_ids_fails_when_store_is_down() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);
        let err = engine(&repo)
            .lookup_ids(&[CruiseId::new("A")])
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_text_query_uses_best_group() {
        let repo = LocalRepository::new();
        add_cruise(&repo, "33RR20160208", 2016, &[(80.0, -40.0)]);
        let mut other = CruiseMetadata::named("P16N");
        other.line = Some("33RR".to_string());
        repo.insert_cruise(CruiseId::new("325020150225"), other);

        let matches = engine(&repo).text_query("33rr").await.unwrap();
        assert_eq!(ids(&matches), vec!["33RR20160208"]);

        let none = engine(&repo).text_query("nothing like this").await.unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_request_mode_priority() {
        let mut request = SearchRequest {
            shapes: vec!["rectangle:0,0_1,1".to_string()],
            ids: vec![CruiseId::new("A")],
            q: Some("I08S".to_string()),
            ..Default::default()
        };
        assert!(matches!(request.mode(), SearchMode::Shapes(_)));

        request.shapes.clear();
        assert_eq!(request.mode(), SearchMode::Ids(vec![CruiseId::new("A")]));

        request.ids.clear();
        assert_eq!(request.mode(), SearchMode::Text("I08S".to_string()));

        request.q = Some("  ".to_string());
        assert_eq!(request.mode(), SearchMode::Empty);
    }

    #[tokio::test]
    async fn test_run_uses_configured_window() {
        let repo = LocalRepository::new();
        add_cruise(&repo, "OLD", 1970, &[(5.0, 5.0)]);

        let config = SearchConfig {
            min_time: 1990,
            ..Default::default()
        };
        let request = SearchRequest {
            shapes: vec!["rectangle:0,0_10,10".to_string()],
            ..Default::default()
        };
        let engine = engine_with(&repo, config);
        assert!(engine.run(&request).await.unwrap().is_empty());

        let widened = SearchRequest {
            min_time: Some(1960),
            ..request
        };
        assert_eq!(engine.run(&widened).await.unwrap().len(), 1);
    }
}
