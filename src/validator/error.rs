/// Structural problems found in a batch before anything is written
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Present fields disagree on the number of records
    #[error("The data blocks in the batch have different depths: {depths:?}")]
    InconsistentDepth {
        /// Distinct depths found, in ascending order
        depths: Vec<usize>,
    },

    /// The batch carries fields that are not in the field mapping
    #[error("The batch contains fields that are not in the field mapping: {}", .0.join(", "))]
    UnmappedFields(Vec<String>),

    /// The batch has no present fields
    #[error("The batch contains no data")]
    EmptyBatch,

    /// A present field is a scalar and has no record axis
    #[error("Field '{field}' is zero-dimensional and has no record axis")]
    MissingRecordAxis {
        /// Field name
        field: String,
    },

    /// A present field has no records or records with no elements
    #[error("Field '{field}' has zero-sized shape {shape:?}")]
    ZeroSizedField {
        /// Field name
        field: String,
        /// Full shape, record axis first
        shape: Vec<usize>,
    },
}
