use serde::{Deserialize, Serialize};

use crate::batch::FieldMapping;
use crate::compression::{CompressionDescriptor, CompressionOption};

use super::error::ConfigurationError;

/// Compression level used when the configuration does not give one
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

fn default_compression_level() -> i32 {
    DEFAULT_COMPRESSION_LEVEL
}

/// What the serializer does when a batch cannot be serialized
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Yield the error and stop the stream (default)
    #[default]
    FailFast,
    /// Log the error, drop the batch and continue with the next one
    SkipBatch,
}

/// Configuration record of the HDF5 binary serializer.
///
/// ```toml
/// compression = "gzip_with_shuffle"
/// compression_level = 4
/// on_error = "fail_fast"
///
/// [fields]
/// detector_data = "data"
/// timestamp = "timestamp"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SerializerConfig {
    /// Compression option name; absent means no compression
    #[serde(default)]
    pub compression: Option<String>,

    /// Compression level, used by levelled algorithms only
    #[serde(default = "default_compression_level")]
    pub compression_level: i32,

    /// Logical field name to dataset name
    pub fields: FieldMapping,

    /// Failure handling for individual batches
    #[serde(default)]
    pub on_error: ErrorPolicy,
}

impl SerializerConfig {
    /// Uncompressed, fail-fast configuration for the given mapping
    pub fn new(fields: FieldMapping) -> Self {
        Self {
            compression: None,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            fields,
            on_error: ErrorPolicy::default(),
        }
    }

    /// Select a compression option and level
    pub fn with_compression(mut self, option: CompressionOption, level: i32) -> Self {
        self.compression = Some(option.to_string());
        self.compression_level = level;
        self
    }

    /// Select the failure policy
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }

    /// Parsed compression option
    pub fn compression_option(&self) -> Result<CompressionOption, ConfigurationError> {
        CompressionOption::from_config(self.compression.as_deref())
    }

    /// Resolved compression descriptor
    pub fn resolve_compression(&self) -> Result<CompressionDescriptor, ConfigurationError> {
        CompressionDescriptor::resolve(self.compression_option()?, self.compression_level)
    }
}

/// Parameters of all data serializers, as found in a configuration file.
///
/// Only the HDF5 binary serializer is provided by this crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataSerializerParameters {
    /// HDF5 binary serializer section
    #[serde(default, alias = "Hdf5BinarySerializer")]
    pub hdf5_binary_serializer: Option<SerializerConfig>,
}

impl DataSerializerParameters {
    /// Wrap a serializer configuration
    pub fn new(config: SerializerConfig) -> Self {
        Self {
            hdf5_binary_serializer: Some(config),
        }
    }

    /// The HDF5 binary serializer section, which must be present
    pub fn hdf5_binary_serializer(&self) -> Result<&SerializerConfig, ConfigurationError> {
        self.hdf5_binary_serializer
            .as_ref()
            .ok_or(ConfigurationError::MissingSection)
    }
}
