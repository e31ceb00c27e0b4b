use crate::validator::ValidationError;

/// Errors raised while building a serializer from its configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// The serializer section is absent from the configuration
    #[error("No configuration parameters found for the HDF5 binary serializer")]
    MissingSection,

    /// The compression option is not one of the supported names
    #[error("Unknown compression option '{0}'. Valid options: none, gzip, gzip_with_shuffle, bitshuffle_with_lz4, bitshuffle_with_zstd, zfp")]
    UnknownCompression(String),

    /// The compression level is outside the range of the selected algorithm
    #[error("Compression level {level} is out of range for '{option}' (expected {min}..={max})")]
    InvalidLevel {
        /// Compression option the level was given for
        option: String,
        /// Rejected level
        level: i32,
        /// Smallest accepted level
        min: i32,
        /// Largest accepted level
        max: i32,
    },

    /// The field mapping has no entries
    #[error("The field mapping is empty")]
    EmptyFieldMapping,

    /// A field or dataset name is empty
    #[error("Empty name in field mapping (field '{0}')")]
    EmptyName(String),

    /// A logical field name appears more than once
    #[error("Field '{0}' is mapped more than once")]
    DuplicateField(String),

    /// Two fields would be written to the same dataset
    #[error("Dataset '{dataset}' is the target of both '{first}' and '{second}'")]
    DuplicateDataset {
        /// Dataset name
        dataset: String,
        /// First field mapped to it
        first: String,
        /// Second field mapped to it
        second: String,
    },
}

/// Errors raised while building a container for a batch
#[derive(Debug, thiserror::Error)]
pub enum ContainerWriteError {
    /// A filter of the compression pipeline cannot be loaded by HDF5
    #[error("HDF5 filter {id} ({descriptor}) is not available")]
    FilterUnavailable {
        /// HDF5 filter id
        id: i32,
        /// Descriptor the filter belongs to
        descriptor: String,
    },

    /// The in-memory container could not be created
    #[error("Failed to create in-memory container: {0}")]
    Create(#[source] hdf5::Error),

    /// A dataset could not be created or written
    #[error("Failed to write dataset '{dataset}': {source}")]
    Dataset {
        /// Output dataset name
        dataset: String,
        /// Underlying HDF5 error
        #[source]
        source: hdf5::Error,
    },

    /// Flushing the container metadata failed
    #[error("Failed to finalize container: {0}")]
    Finalize(#[source] hdf5::Error),

    /// The container image could not be copied out of HDF5
    #[error("Failed to capture container image: {0}")]
    Image(String),
}

/// Any error surfaced by the serializer
#[derive(Debug, thiserror::Error)]
pub enum SerializerError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A batch failed validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A container could not be written
    #[error("Container write error: {0}")]
    ContainerWrite(#[from] ContainerWriteError),
}
