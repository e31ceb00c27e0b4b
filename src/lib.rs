//! # h5blob - Streaming HDF5 Serialization
//!
//! `h5blob` turns a stream of batches of named N-dimensional arrays into a
//! stream of self-contained HDF5 containers, one per batch, built entirely in
//! memory.
//!
//! ## Key Features
//!
//! - **Memory-Only Containers**: Each container is built with the HDF5 core
//!   driver and handed off as bytes, ready for a socket or a file.
//!
//! - **Record-Level Chunking**: Every dataset is chunked one record at a time,
//!   so readers can decompress individual records.
//!
//! - **Configurable Compression**: Deflate with or without byte shuffling,
//!   bitshuffle with LZ4 or Zstandard, and ZFP, all through the standard HDF5
//!   filter pipeline.
//!
//! - **Upfront Validation**: Batches are checked for consistent record counts
//!   and unknown fields before any bytes are written.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use h5blob::prelude::*;
//! use ndarray::Array2;
//!
//! let config: SerializerConfig = toml::from_str(r#"
//!     compression = "bitshuffle_with_lz4"
//!     compression_level = 5
//!
//!     [fields]
//!     a = "alpha"
//! "#)?;
//!
//! let mut serializer = Hdf5BinarySerializer::from_config(&config)?;
//! let batch = Batch::new().with_field("a", Array2::<i32>::zeros((1, 8)));
//!
//! for blob in serializer.serialize([batch]) {
//!     let blob = blob?;
//!     assert!(blob.as_bytes().starts_with(HDF5_SIGNATURE));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`compression`]: compression options and the resolved HDF5 filter pipeline
//! - [`batch`]: typed field arrays, batches and the field mapping
//! - [`validator`]: structural checks run on every batch
//! - [`writer`]: in-memory container writer and the serializer pipeline
//!
//! ## Failure Handling
//!
//! The library never terminates the process. Configuration problems surface as
//! [`writer::ConfigurationError`] at construction; a failing batch surfaces as
//! a [`writer::SerializerError`] from the stream, which then stops (or skips the
//! batch, if configured to).

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod batch;
pub mod compression;
pub mod validator;
pub mod writer;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::batch::{Batch, Element, ElementType, FieldArray, FieldMapping};
    pub use crate::compression::{BitshuffleCodec, CompressionDescriptor, CompressionOption};
    pub use crate::validator::{validate_batch, ValidationError};
    pub use crate::writer::{
        ConfigurationError, ContainerWriteError, ContainerWriter, DataSerializerParameters,
        DatasetSpec, ErrorPolicy, Hdf5BinarySerializer, SerializedBlob, SerializerConfig,
        SerializerError, SerializerStats, HDF5_SIGNATURE,
    };
}
