//! Unit tests for dt-core primitives.

#[cfg(test)]
mod ids {
    use std::collections::HashMap;

    use crate::EntityId;

    #[test]
    fn equal_names_are_equal_ids() {
        assert_eq!(EntityId::from("n1"), EntityId::new("n1"));
        assert_ne!(EntityId::from("n1"), EntityId::from("n2"));
    }

    #[test]
    fn ordering_is_lexicographic() {
        assert!(EntityId::from("a") < EntityId::from("b"));
        assert!(EntityId::from("n10") < EntityId::from("n9"));
    }

    #[test]
    fn map_lookup_by_str() {
        let mut positions = HashMap::new();
        positions.insert(EntityId::from("bus_4"), 1);
        assert_eq!(positions.get("bus_4"), Some(&1));
        assert_eq!(positions.get("bus_5"), None);
    }

    #[test]
    fn display() {
        assert_eq!(EntityId::from(String::from("A")).to_string(), "A");
    }
}

#[cfg(test)]
mod geo {
    use crate::Coord;

    #[test]
    fn shifted_subtracts_minimums() {
        let c = Coord::new(12.0, 11.0).shifted(2.0, 1.0);
        assert_eq!(c, Coord::new(10.0, 10.0));
    }

    #[test]
    fn shift_by_zero_is_identity() {
        let c = Coord::new(-3.25, 7.5);
        assert_eq!(c.shifted(0.0, 0.0), c);
    }

    #[test]
    fn distance_three_four_five() {
        let d = Coord::ORIGIN.distance(Coord::new(3.0, 4.0));
        assert!((d - 5.0).abs() < 1e-12, "got {d}");
    }

    #[test]
    fn bbox_fold() {
        let pts = [Coord::new(1.0, 5.0), Coord::new(-2.0, 3.0), Coord::new(4.0, -1.0)];
        let lo = pts.iter().copied().fold(pts[0], Coord::min);
        let hi = pts.iter().copied().fold(pts[0], Coord::max);
        assert_eq!(lo, Coord::new(-2.0, -1.0));
        assert_eq!(hi, Coord::new(4.0, 5.0));
    }

    #[test]
    fn display_two_decimals() {
        assert_eq!(Coord::new(1.0, 2.5).to_string(), "(1.00, 2.50)");
    }
}
