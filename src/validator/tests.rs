use super::*;
use crate::batch::{FieldArray, FieldMapping};
use ndarray::{Array1, Array2, Array3};
use proptest::prelude::*;

fn mapping() -> FieldMapping {
    FieldMapping::new([("data", "image"), ("timestamp", "timestamp"), ("energy", "energy")])
        .unwrap()
}

#[test]
fn test_consistent_batch() {
    let batch = Batch::new()
        .with_field("data", Array3::<f32>::zeros((3, 4, 4)))
        .with_field("timestamp", Array1::<f64>::zeros(3));

    assert_eq!(validate_batch(&batch, &mapping()), Ok(3));
}

#[test]
fn test_inconsistent_depth() {
    let batch = Batch::new()
        .with_field("data", Array2::<f32>::zeros((3, 2)))
        .with_field("timestamp", Array1::<f64>::zeros(4));

    assert_eq!(
        validate_batch(&batch, &mapping()),
        Err(ValidationError::InconsistentDepth { depths: vec![3, 4] })
    );
}

#[test]
fn test_unmapped_field() {
    let batch = Batch::new()
        .with_field("data", Array2::<f32>::zeros((2, 2)))
        .with_field("foo", Array1::<i32>::zeros(2));

    assert_eq!(
        validate_batch(&batch, &mapping()),
        Err(ValidationError::UnmappedFields(vec!["foo".to_string()]))
    );
}

#[test]
fn test_unmapped_absent_field() {
    // An absent entry still has to be known to the mapping
    let batch = Batch::new()
        .with_field("data", Array2::<f32>::zeros((2, 2)))
        .with_absent("zzz")
        .with_absent("aaa");

    let err = validate_batch(&batch, &mapping()).unwrap_err();
    assert_eq!(
        err,
        ValidationError::UnmappedFields(vec!["aaa".to_string(), "zzz".to_string()])
    );
    assert!(err.to_string().contains("aaa, zzz"));
}

#[test]
fn test_depth_checked_before_mapping() {
    let batch = Batch::new()
        .with_field("data", Array1::<f32>::zeros(2))
        .with_field("foo", Array1::<f32>::zeros(5));

    assert!(matches!(
        validate_batch(&batch, &mapping()),
        Err(ValidationError::InconsistentDepth { .. })
    ));
}

#[test]
fn test_absent_field_is_legal() {
    let batch = Batch::new()
        .with_field("data", Array3::<u16>::zeros((2, 3, 3)))
        .with_absent("timestamp")
        .with_field("energy", Array1::<f64>::zeros(2));

    assert_eq!(validate_batch(&batch, &mapping()), Ok(2));
}

#[test]
fn test_empty_batch_rejected() {
    assert_eq!(
        validate_batch(&Batch::new(), &mapping()),
        Err(ValidationError::EmptyBatch)
    );

    let all_absent = Batch::new().with_absent("data").with_absent("timestamp");
    assert_eq!(
        validate_batch(&all_absent, &mapping()),
        Err(ValidationError::EmptyBatch)
    );
}

#[test]
fn test_scalar_field_rejected() {
    let scalar = FieldArray::from_shape_vec(&[], vec![1.0f64]).unwrap();
    let mut batch = Batch::new().with_field("data", Array1::<f64>::zeros(1));
    batch.insert("energy", Some(scalar));

    assert_eq!(
        validate_batch(&batch, &mapping()),
        Err(ValidationError::MissingRecordAxis {
            field: "energy".to_string()
        })
    );
}

#[test]
fn test_zero_depth_rejected() {
    let batch = Batch::new()
        .with_field("data", Array2::<f32>::zeros((0, 4)))
        .with_field("timestamp", Array1::<f64>::zeros(0));

    assert_eq!(
        validate_batch(&batch, &mapping()),
        Err(ValidationError::ZeroSizedField {
            field: "data".to_string(),
            shape: vec![0, 4]
        })
    );
}

#[test]
fn test_empty_records_rejected() {
    let batch = Batch::new()
        .with_field("data", Array3::<u16>::zeros((2, 3, 0)))
        .with_field("timestamp", Array1::<f64>::zeros(2));

    assert_eq!(
        batch_depth(&batch),
        Err(ValidationError::ZeroSizedField {
            field: "data".to_string(),
            shape: vec![2, 3, 0]
        })
    );
}

proptest! {
    #[test]
    fn prop_equal_depths_validate(depth in 1usize..16, width in 1usize..8) {
        let batch = Batch::new()
            .with_field("data", Array2::<i32>::zeros((depth, width)))
            .with_field("timestamp", Array1::<f64>::zeros(depth));

        prop_assert_eq!(validate_batch(&batch, &mapping()), Ok(depth));
    }

    #[test]
    fn prop_different_depths_fail(a in 1usize..16, b in 1usize..16) {
        prop_assume!(a != b);
        let batch = Batch::new()
            .with_field("data", Array1::<i32>::zeros(a))
            .with_field("energy", Array1::<f64>::zeros(b));

        let expected = vec![a.min(b), a.max(b)];
        prop_assert_eq!(
            batch_depth(&batch),
            Err(ValidationError::InconsistentDepth { depths: expected })
        );
    }
}
