//! Partitioning properties of data spaces

use datafit::data::{Axis, DataSpace, PointKind, SourceData};
use datafit::FitError;

use crate::test_helpers::collection;

#[test]
fn test_global_is_one_range_for_every_window() {
    let data = collection("grid", 6, &[0.0, 1.0, 2.0, 3.0], |x, z| x + z);
    for x_min in 0..6 {
        for x_max in x_min..6 {
            for z_min in 0..4 {
                for z_max in z_min..4 {
                    let mut space = DataSpace::new();
                    space
                        .initialise(&data, x_min, x_max, z_min, z_max, false, true)
                        .unwrap();
                    assert_eq!(space.n_ranges(), 1);
                    let range = &space.ranges()[0];
                    assert_eq!((range.x_start(), range.x_end()), (x_min, x_max));
                    assert_eq!((range.z_start(), range.z_end()), (z_min, z_max));
                }
            }
        }
    }
}

#[test]
fn test_normal_is_one_range_per_slice() {
    let data = collection("grid", 6, &[0.0, 1.0, 2.0, 3.0], |x, z| x + z);
    for z_min in 0..4 {
        for z_max in z_min..4 {
            let mut space = DataSpace::new();
            space.initialise(&data, 1, 4, z_min, z_max, false, false).unwrap();
            assert_eq!(space.n_ranges(), z_max - z_min + 1);
            for (n, range) in space.ranges().iter().enumerate() {
                assert_eq!(range.z_start(), z_min + n);
                assert_eq!(range.n_slices(), 1);
                assert_eq!((range.x_start(), range.x_end()), (1, 4));
                assert_eq!(range.x(), &[1.0, 2.0, 3.0, 4.0]);
            }
        }
    }
}

#[test]
fn test_orthogonal_is_one_range_per_point() {
    let data = collection("grid", 5, &[0.0, 0.5, 1.0], |x, z| x * z);
    let mut space = DataSpace::new();
    space.initialise(&data, 1, 3, 0, 2, true, false).unwrap();
    assert_eq!(space.n_ranges(), 3);
    let range = &space.ranges()[2];
    assert_eq!(range.n_points(), 1);
    assert_eq!(range.z(), &[0.0, 0.5, 1.0]);
    assert_eq!(range.reference_y(0, 2), 3.0);
}

#[test]
fn test_range_errors() {
    let data = collection("grid", 4, &[0.0, 1.0], |x, _| x);
    let mut space = DataSpace::new();

    let cases = [
        ((0, 4, 0, 1), Axis::X),
        ((3, 2, 0, 1), Axis::X),
        ((0, 3, 0, 2), Axis::Z),
        ((0, 3, 1, 0), Axis::Z),
    ];
    for ((x_min, x_max, z_min, z_max), expected) in cases {
        match space.initialise(&data, x_min, x_max, z_min, z_max, false, false) {
            Err(FitError::RangeError { axis, .. }) => assert_eq!(axis, expected),
            other => panic!("Expected RangeError, got {:?}", other),
        }
    }
    assert_eq!(space.n_ranges(), 0);
}

#[test]
fn test_shrink_and_grow_preserves_untouched_ranges() {
    let data = collection("grid", 4, &[0.0, 1.0, 2.0, 3.0, 4.0], |x, z| x * z);
    let mut space = DataSpace::new();
    space.initialise(&data, 0, 3, 0, 4, false, false).unwrap();
    for (n, range) in space.ranges_mut().iter_mut().enumerate() {
        range.set_fitted_value("k", n as f64);
    }

    space.initialise(&data, 0, 3, 2, 3, false, false).unwrap();
    let kept: Vec<Option<f64>> = space.ranges().iter().map(|r| r.fitted_value("k")).collect();
    assert_eq!(kept, vec![Some(2.0), Some(3.0)]);

    space.initialise(&data, 0, 3, 1, 4, false, false).unwrap();
    let kept: Vec<Option<f64>> = space.ranges().iter().map(|r| r.fitted_value("k")).collect();
    assert_eq!(kept, vec![None, Some(2.0), Some(3.0), None]);

    // Switching to orthogonal rebuilds from scratch
    space.initialise(&data, 0, 3, 1, 4, true, false).unwrap();
    assert!(space.ranges().iter().all(|r| r.fitted_values().is_empty()));
}

#[test]
fn test_calculated_collection_names_slices() {
    let mut data = collection("grid", 3, &[0.0, 1.0], |x, z| x + z);
    data.set_point_kind(0, 0, PointKind::Missing).unwrap();
    let mut space = DataSpace::new();
    space.initialise(&data, 0, 2, 0, 1, false, true).unwrap();

    let output = space.calculated_collection(&data).unwrap();
    assert_eq!(output.id(), "grid (fit)");
    let names: Vec<&str> = output.slices().iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["Fit to: slice0", "Fit to: slice1"]);
    assert_eq!(output.slices()[0].point_kind()[0], PointKind::Missing);
    assert_eq!(output.slices()[1].z(), 1.0);
}
