//! # HDF5 Container Writer
//!
//! This module turns validated batches into in-memory HDF5 containers and
//! drives the per-batch pipeline.
//!
//! ## Design Principles
//!
//! 1. **One Container per Batch**: Every batch becomes a complete HDF5 file image
//!    of its own. No buffer or handle outlives the batch it was built for.
//!
//! 2. **Memory Only**: Containers are built with the HDF5 core driver without a
//!    backing store; the filesystem is never touched.
//!
//! 3. **One Record per Chunk**: Datasets are chunked as `(1, *record_shape)` so
//!    records can be read and decompressed individually.
//!
//! 4. **Uniform Compression**: The filter pipeline is resolved once and applied
//!    to every dataset.
//!
//! ```rust,no_run
//! use h5blob::batch::{Batch, FieldMapping};
//! use h5blob::compression::{CompressionDescriptor, CompressionOption};
//! use h5blob::writer::Hdf5BinarySerializer;
//! use ndarray::Array3;
//!
//! let fields = FieldMapping::new([("data", "image")])?;
//! let compression = CompressionDescriptor::resolve(CompressionOption::GzipWithShuffle, 4)?;
//! let mut serializer = Hdf5BinarySerializer::with_parts(fields, compression);
//!
//! let batches = (0..3).map(|_| Batch::new().with_field("data", Array3::<f32>::zeros((2, 4, 4))));
//! for blob in serializer.serialize(batches) {
//!     let blob = blob?;
//!     println!("{} bytes", blob.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod blob;
mod config;
mod container;
mod error;
mod serializer;
mod spec;
mod stats;


pub use blob::{SerializedBlob, HDF5_SIGNATURE};
pub use config::{DataSerializerParameters, ErrorPolicy, SerializerConfig, DEFAULT_COMPRESSION_LEVEL};
pub use container::ContainerWriter;
pub use error::{ConfigurationError, ContainerWriteError, SerializerError};
pub use serializer::{Hdf5BinarySerializer, SerializeStream};
pub use spec::DatasetSpec;
pub use stats::SerializerStats;
