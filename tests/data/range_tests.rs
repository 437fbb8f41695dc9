//! Error computation and reference copying on single ranges

use std::collections::HashMap;

use datafit::data::{DataSpaceRange, IndexingPolicy, PointKind};
use datafit::equation::Expression;

use crate::test_helpers::collection;

#[test]
fn test_identity_copy_has_zero_error() {
    let data = collection("grid", 5, &[0.0, 1.0, 2.0], |x, z| x * x - z);
    let mut range = DataSpaceRange::new(&data, 0, 4, 0, 2, false).unwrap();
    for x_policy in [IndexingPolicy::Normal, IndexingPolicy::Fixed(2)] {
        let mut reference = DataSpaceRange::new(&data, 0, 4, 0, 2, true).unwrap();
        assert_eq!(reference.copy_values(&data, x_policy, IndexingPolicy::Normal), 0);

        // Equation returning the reference value itself
        let equation = Expression::parse("R").unwrap();
        range
            .calculate_values(
                &equation,
                &mut HashMap::new(),
                &[datafit::data::ReferenceSample {
                    name: "R",
                    range: &reference,
                }],
            )
            .unwrap();
        if x_policy == IndexingPolicy::Normal {
            assert_eq!(range.sum_squared_error(), 0.0);
            assert_eq!(range.root_mean_squared_error(), 0.0);
        } else {
            assert!(range.sum_squared_error() > 0.0);
        }
    }
}

#[test]
fn test_all_missing_range() {
    let mut data = collection("grid", 3, &[0.0], |x, _| x);
    for i in 0..3 {
        data.set_point_kind(0, i, PointKind::Missing).unwrap();
    }
    let mut range = DataSpaceRange::new(&data, 0, 2, 0, 0, false).unwrap();
    let equation = Expression::parse("100*x").unwrap();
    range
        .calculate_values(&equation, &mut HashMap::new(), &[])
        .unwrap();

    assert_eq!(range.cell_count(), 0);
    assert_eq!(range.sum_squared_error(), 0.0);
    let rmse = range.root_mean_squared_error();
    assert!(!rmse.is_nan());
    assert_eq!(rmse, 0.0);
    // Missing cells are never written
    assert_eq!(range.calculated_y(1, 0), 0.0);
}

#[test]
fn test_missing_cells_are_skipped_by_the_evaluator() {
    let mut data = collection("grid", 3, &[0.0], |x, _| x);
    data.set_point_kind(0, 0, PointKind::Missing).unwrap();
    let mut range = DataSpaceRange::new(&data, 0, 2, 0, 0, false).unwrap();

    // Division by zero at the missing point would abort the calculation
    let equation = Expression::parse("x / x * x").unwrap();
    range
        .calculate_values(&equation, &mut HashMap::new(), &[])
        .unwrap();
    assert_eq!(range.cell_count(), 2);
    assert!(range.sum_squared_error() < 1e-20);
}

#[test]
fn test_fixed_and_relative_slice_policies() {
    let data = collection("grid", 3, &[0.0, 10.0, 20.0], |x, z| x + z);
    let mut reference = DataSpaceRange::new(&data, 0, 2, 1, 2, true).unwrap();

    assert_eq!(reference.copy_values(&data, IndexingPolicy::Normal, IndexingPolicy::Fixed(0)), 0);
    assert_eq!(reference.reference_y(2, 1), 2.0);

    assert_eq!(
        reference.copy_values(&data, IndexingPolicy::Normal, IndexingPolicy::Relative(-1)),
        0
    );
    assert_eq!(reference.reference_y(0, 0), 0.0);
    assert_eq!(reference.reference_y(0, 1), 10.0);

    // One slice past the end contributes zero for every point
    assert_eq!(
        reference.copy_values(&data, IndexingPolicy::Normal, IndexingPolicy::Relative(1)),
        3
    );
    assert_eq!(reference.reference_y(1, 0), 21.0);
    assert_eq!(reference.reference_y(1, 1), 0.0);
}
