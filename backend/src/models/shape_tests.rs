#[cfg(test)]
mod tests {
    use crate::models::geometry::Point;
    use crate::models::shape::{GeometryError, QueryShape, DEFAULT_CIRCLE_STEPS};

    #[test]
    fn test_parse_polygon() {
        let shape: QueryShape = "polygon:0,0_0,10_10,10_10,0".parse().unwrap();
        match &shape {
            QueryShape::Polygon(ring) => {
                assert_eq!(ring.len(), 4);
                assert_eq!(ring.points()[2], Point::new(10.0, 10.0));
            }
            other => panic!("expected polygon, got {:?}", other),
        }
        assert_eq!(shape.kind(), "polygon");
    }

    #[test]
    fn test_parse_negative_and_fractional_coordinates() {
        let shape: QueryShape = "polygon:-70.5,35.3_-60.25,35.3_-65,40".parse().unwrap();
        let QueryShape::Polygon(ring) = shape else {
            panic!("expected polygon");
        };
        assert_eq!(ring.points()[0], Point::new(-70.5, 35.3));
        assert_eq!(ring.points()[1], Point::new(-60.25, 35.3));
    }

    #[test]
    fn test_parse_kind_is_case_insensitive() {
        let shape: QueryShape = "Rectangle:0,0_10,10".parse().unwrap();
        assert_eq!(shape.kind(), "rectangle");
    }

    #[test]
    fn test_parse_rectangle_normalizes_corners() {
        // North-west then south-east, as some map widgets emit it.
        let shape: QueryShape = "rectangle:0,10_10,0".parse().unwrap();
        assert_eq!(
            shape,
            QueryShape::Rectangle {
                southwest: Point::new(0.0, 0.0),
                northeast: Point::new(10.0, 10.0),
            }
        );
    }

    #[test]
    fn test_parse_rectangle_with_four_corners() {
        let shape: QueryShape = "rectangle:10,0_10,10_0,10_0,0".parse().unwrap();
        assert_eq!(shape, QueryShape::rectangle(Point::new(0.0, 0.0), Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_parse_circle() {
        let shape: QueryShape = "circle:-70,35_2.5".parse().unwrap();
        assert_eq!(shape, QueryShape::circle(Point::new(-70.0, 35.0), 2.5));
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        let err = "polygon:0,0_a,10_10,10".parse::<QueryShape>().unwrap_err();
        assert!(matches!(err, GeometryError::InvalidShapeEncoding { .. }));
        assert!(err.to_string().contains("'a' is not a number"));
    }

    #[test]
    fn test_parse_rejects_non_finite() {
        let err = "polygon:0,0_NaN,10_10,10".parse::<QueryShape>().unwrap_err();
        assert!(matches!(err, GeometryError::InvalidShapeEncoding { .. }));
    }

    #[test]
    fn test_parse_rejects_odd_coordinate_count() {
        let err = "polygon:0,0_10_10,10".parse::<QueryShape>().unwrap_err();
        assert!(err.to_string().contains("expected an x,y pair"));
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let err = "hexagon:0,0_1,1_2,2".parse::<QueryShape>().unwrap_err();
        assert!(err.to_string().contains("unknown shape kind"));
    }

    #[test]
    fn test_parse_rejects_missing_prefix() {
        assert!("0,0_1,1_2,2".parse::<QueryShape>().is_err());
    }

    #[test]
    fn test_parse_rejects_bad_circle() {
        assert!("circle:0,0".parse::<QueryShape>().is_err());
        assert!("circle:0,0_1,2".parse::<QueryShape>().is_err());
        assert!("circle:0,0_-1".parse::<QueryShape>().is_err());
    }

    #[test]
    fn test_display_round_trips_encoding() {
        for encoded in [
            "polygon:0,0_0,10_10,10",
            "rectangle:-10,-5_10,5",
            "circle:1.5,2_0.25",
        ] {
            let shape: QueryShape = encoded.parse().unwrap();
            assert_eq!(shape.to_string(), encoded);
        }
    }

    #[test]
    fn test_normalize_rectangle_starts_at_southwest() {
        let shape = QueryShape::rectangle(Point::new(10.0, 0.0), Point::new(0.0, 10.0));
        let polygon = shape.normalize(DEFAULT_CIRCLE_STEPS).unwrap();
        let ring = polygon.exterior().points();
        assert_eq!(ring.len(), 4);
        assert_eq!(ring[0], Point::new(0.0, 0.0));
        assert_eq!(ring[2], Point::new(10.0, 10.0));
    }

    #[test]
    fn test_normalize_flat_rectangle_is_degenerate() {
        let shape = QueryShape::rectangle(Point::new(0.0, 5.0), Point::new(10.0, 5.0));
        let err = shape.normalize(DEFAULT_CIRCLE_STEPS).unwrap_err();
        assert_eq!(err, GeometryError::DegenerateGeometry { distinct_vertices: 2 });
    }

    #[test]
    fn test_normalize_circle_vertices() {
        let shape = QueryShape::circle(Point::new(10.0, 20.0), 2.0);
        let polygon = shape.normalize(DEFAULT_CIRCLE_STEPS).unwrap();
        let ring = polygon.exterior().points();
        assert_eq!(ring.len(), 25);

        // theta = 0 lands due north of the center.
        assert!((ring[0].x - 10.0).abs() < 1e-12);
        assert!((ring[0].y - 22.0).abs() < 1e-12);

        for p in ring {
            let r = ((p.x - 10.0).powi(2) + (p.y - 20.0).powi(2)).sqrt();
            assert!((r - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_normalize_circle_uses_at_least_three_steps() {
        let shape = QueryShape::circle(Point::new(0.0, 0.0), 1.0);
        let polygon = shape.normalize(1).unwrap();
        assert_eq!(polygon.exterior().len(), 3);
    }

    #[test]
    fn test_normalize_two_point_polygon_is_degenerate() {
        let shape = QueryShape::polygon(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        assert!(matches!(
            shape.normalize(DEFAULT_CIRCLE_STEPS),
            Err(GeometryError::DegenerateGeometry { .. })
        ));
    }

    fn assert_rejected(shape: QueryShape, expected_reason: &str) {
        match shape.normalize(DEFAULT_CIRCLE_STEPS) {
            Err(GeometryError::InvalidShapeEncoding { reason, .. }) => {
                assert_eq!(reason, expected_reason)
            }
            other => panic!("expected an invalid shape, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_rejects_nan_circle_radius() {
        assert_rejected(
            QueryShape::circle(Point::new(0.0, 0.0), f64::NAN),
            "circle radius must be positive",
        );
    }

    #[test]
    fn test_normalize_rejects_non_positive_circle_radius() {
        for radius in [-1.0, 0.0, f64::INFINITY] {
            assert_rejected(
                QueryShape::circle(Point::new(0.0, 0.0), radius),
                "circle radius must be positive",
            );
        }
    }

    #[test]
    fn test_normalize_rejects_non_finite_vertices() {
        assert_rejected(
            QueryShape::polygon(vec![
                Point::new(0.0, 0.0),
                Point::new(f64::NAN, 10.0),
                Point::new(10.0, 10.0),
                Point::new(10.0, 0.0),
            ]),
            "non-finite coordinate",
        );
        assert_rejected(
            QueryShape::circle(Point::new(f64::INFINITY, 0.0), 1.0),
            "non-finite coordinate",
        );
        // min/max would silently drop a NaN corner.
        assert_rejected(
            QueryShape::Rectangle {
                southwest: Point::new(f64::NAN, 0.0),
                northeast: Point::new(10.0, 10.0),
            },
            "non-finite coordinate",
        );
    }

    #[test]
    fn test_normalize_rejects_overflowing_circle() {
        assert_rejected(
            QueryShape::circle(Point::new(f64::MAX, 0.0), f64::MAX),
            "vertex coordinates overflow",
        );
    }
}
