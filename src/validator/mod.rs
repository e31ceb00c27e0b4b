//! # Batch Validation
//!
//! Structural checks run on every batch before any container bytes are
//! produced:
//!
//! 1. **Record axis**: every present array has at least one dimension
//! 2. **Extent**: no present array has a zero-length axis, so there is at least
//!    one record and every record holds data
//! 3. **Depth**: all present arrays have the same length along axis 0
//! 4. **Mapping**: every field name in the batch is part of the field mapping
//!
//! A batch without any present field is rejected: there is no depth to agree
//! on and nothing to write.
//!
//! ```rust
//! use h5blob::batch::{Batch, FieldMapping};
//! use h5blob::validator::validate_batch;
//! use ndarray::Array2;
//!
//! let fields = FieldMapping::new([("data", "image")])?;
//! let batch = Batch::new().with_field("data", Array2::<f32>::zeros((2, 4)));
//!
//! assert_eq!(validate_batch(&batch, &fields), Ok(2));
//! # Ok::<(), h5blob::writer::ConfigurationError>(())
//! ```

mod error;

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;

use crate::batch::{Batch, FieldMapping};

pub use error::ValidationError;

/// Validate a batch against the field mapping.
///
/// Returns the shared depth of the present fields.
pub fn validate_batch(batch: &Batch, fields: &FieldMapping) -> Result<usize, ValidationError> {
    let depth = batch_depth(batch)?;

    let unmapped: Vec<String> = batch
        .names()
        .filter(|name| !fields.contains(name))
        .map(str::to_string)
        .collect();

    if !unmapped.is_empty() {
        return Err(ValidationError::UnmappedFields(unmapped));
    }

    Ok(depth)
}

/// Shared depth of the present fields of a batch
pub fn batch_depth(batch: &Batch) -> Result<usize, ValidationError> {
    let mut depths = BTreeSet::new();

    for (name, array) in batch.present() {
        let depth = array
            .depth()
            .ok_or_else(|| ValidationError::MissingRecordAxis {
                field: name.to_string(),
            })?;
        if array.shape().contains(&0) {
            return Err(ValidationError::ZeroSizedField {
                field: name.to_string(),
                shape: array.shape().to_vec(),
            });
        }
        depths.insert(depth);
    }

    let mut iter = depths.iter();
    match (iter.next(), iter.next()) {
        (None, _) => Err(ValidationError::EmptyBatch),
        (Some(depth), None) => Ok(*depth),
        (Some(_), Some(_)) => Err(ValidationError::InconsistentDepth {
            depths: depths.into_iter().collect(),
        }),
    }
}
