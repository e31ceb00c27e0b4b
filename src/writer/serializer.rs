use log::{debug, error, info, warn};

use crate::batch::{Batch, FieldMapping};
use crate::compression::CompressionDescriptor;
use crate::validator::validate_batch;

use super::blob::SerializedBlob;
use super::config::{DataSerializerParameters, ErrorPolicy, SerializerConfig};
use super::container::ContainerWriter;
use super::error::{ConfigurationError, SerializerError};
use super::stats::SerializerStats;

/// Turns batches into self-contained HDF5 blobs.
///
/// The compression descriptor and field mapping are fixed at construction and
/// shared by every batch; nothing else carries over from one batch to the next.
#[derive(Debug)]
pub struct Hdf5BinarySerializer {
    compression: CompressionDescriptor,
    fields: FieldMapping,
    on_error: ErrorPolicy,
    stats: SerializerStats,
}

impl Hdf5BinarySerializer {
    /// Build the serializer from the data serializer section of a configuration
    pub fn new(parameters: &DataSerializerParameters) -> Result<Self, ConfigurationError> {
        Self::from_config(parameters.hdf5_binary_serializer()?)
    }

    /// Build the serializer from its own configuration record
    pub fn from_config(config: &SerializerConfig) -> Result<Self, ConfigurationError> {
        let compression = config.resolve_compression()?;
        Ok(Self::with_parts(config.fields.clone(), compression).with_error_policy(config.on_error))
    }

    /// Build the serializer from an already resolved mapping and descriptor
    pub fn with_parts(fields: FieldMapping, compression: CompressionDescriptor) -> Self {
        info!(
            "HDF5 serializer: {} fields, {}",
            fields.len(),
            compression
        );
        for id in compression.unavailable_filters() {
            warn!(
                "HDF5 filter {} is not available yet; containers cannot be written until it is",
                id
            );
        }

        Self {
            compression,
            fields,
            on_error: ErrorPolicy::default(),
            stats: SerializerStats::default(),
        }
    }

    /// Set the failure policy
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }

    /// Compression applied to every dataset
    pub fn compression(&self) -> &CompressionDescriptor {
        &self.compression
    }

    /// Field mapping
    pub fn fields(&self) -> &FieldMapping {
        &self.fields
    }

    /// Failure policy
    pub fn error_policy(&self) -> ErrorPolicy {
        self.on_error
    }

    /// Totals so far
    pub fn stats(&self) -> &SerializerStats {
        &self.stats
    }

    /// Validate and serialize a single batch
    pub fn serialize_batch(&mut self, batch: &Batch) -> Result<SerializedBlob, SerializerError> {
        let depth = validate_batch(batch, &self.fields)?;

        let blob = ContainerWriter::new(&self.fields, &self.compression).write(batch)?;

        debug!(
            "Serialized batch of depth {} into {} bytes",
            depth,
            blob.len()
        );
        self.stats.record_blob(blob.datasets(), blob.len());

        Ok(blob)
    }

    /// Lazily serialize a stream of batches.
    ///
    /// One batch is pulled per blob. Under [`ErrorPolicy::FailFast`] the first
    /// error is yielded and the stream ends; under [`ErrorPolicy::SkipBatch`]
    /// failing batches are logged and dropped.
    pub fn serialize<I>(&mut self, batches: I) -> SerializeStream<'_, I::IntoIter>
    where
        I: IntoIterator<Item = Batch>,
    {
        SerializeStream {
            serializer: self,
            batches: batches.into_iter(),
            halted: false,
        }
    }
}

/// Iterator of blobs produced by [`Hdf5BinarySerializer::serialize`]
#[derive(Debug)]
pub struct SerializeStream<'s, I> {
    serializer: &'s mut Hdf5BinarySerializer,
    batches: I,
    halted: bool,
}

impl<I> SerializeStream<'_, I> {
    /// Whether the stream stopped on an error
    pub fn is_halted(&self) -> bool {
        self.halted
    }
}

impl<I> Iterator for SerializeStream<'_, I>
where
    I: Iterator<Item = Batch>,
{
    type Item = Result<SerializedBlob, SerializerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted {
            return None;
        }

        loop {
            let batch = self.batches.next()?;

            match self.serializer.serialize_batch(&batch) {
                Ok(blob) => return Some(Ok(blob)),
                Err(e) => match self.serializer.on_error {
                    ErrorPolicy::FailFast => {
                        error!("Stopping serialization: {}", e);
                        self.halted = true;
                        return Some(Err(e));
                    }
                    ErrorPolicy::SkipBatch => {
                        warn!("Skipping batch: {}", e);
                        self.serializer.stats.record_skip();
                    }
                },
            }
        }
    }
}

impl<I> std::iter::FusedIterator for SerializeStream<'_, I> where
    I: std::iter::FusedIterator<Item = Batch>
{
}
