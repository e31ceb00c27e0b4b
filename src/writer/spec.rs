use crate::batch::{ElementType, FieldArray};
use crate::compression::CompressionDescriptor;

/// Layout of one dataset in a container.
///
/// Each chunk holds exactly one record, so a reader can fetch and decompress
/// any single record without touching the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSpec {
    /// Output dataset name
    pub name: String,
    /// Full dataset shape, records first
    pub shape: Vec<usize>,
    /// Shape of one record
    pub element_shape: Vec<usize>,
    /// Element type
    pub dtype: ElementType,
    /// Chunk shape: `(1, *element_shape)`
    pub chunk: Vec<usize>,
    /// Filter pipeline applied to every chunk
    pub compression: CompressionDescriptor,
}

impl DatasetSpec {
    /// Derive the layout of a dataset from the array that fills it
    pub fn new(
        name: impl Into<String>,
        array: &FieldArray,
        compression: &CompressionDescriptor,
    ) -> Self {
        let element_shape = array.element_shape().to_vec();
        let chunk = std::iter::once(1)
            .chain(element_shape.iter().copied())
            .collect();

        Self {
            name: name.into(),
            shape: array.shape().to_vec(),
            element_shape,
            dtype: array.dtype(),
            chunk,
            compression: compression.clone(),
        }
    }

    /// Number of records
    pub fn records(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }
}
