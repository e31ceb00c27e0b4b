use std::fmt;
use std::str::FromStr;

use crate::writer::ConfigurationError;

/// Compression strategies accepted in serializer configuration.
///
/// This is the closed set of names a configuration file may use. Each option is
/// resolved once into a [`CompressionDescriptor`](super::CompressionDescriptor)
/// when the serializer is built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CompressionOption {
    /// Store datasets uncompressed
    #[default]
    None,
    /// Deflate (gzip) at the configured level
    Gzip,
    /// Byte shuffle followed by deflate at the configured level
    GzipWithShuffle,
    /// Bit shuffle followed by LZ4
    BitshuffleWithLz4,
    /// Bit shuffle followed by Zstandard at the configured level
    BitshuffleWithZstd,
    /// ZFP floating-point codec with its default parameters
    Zfp,
}

impl CompressionOption {
    /// Returns all accepted option names.
    pub fn variants() -> &'static [&'static str] {
        &[
            "none",
            "gzip",
            "gzip_with_shuffle",
            "bitshuffle_with_lz4",
            "bitshuffle_with_zstd",
            "zfp",
        ]
    }

    /// Parse an optional configuration value; an absent value means no compression.
    pub fn from_config(value: Option<&str>) -> Result<Self, ConfigurationError> {
        value.map_or(Ok(CompressionOption::None), |name| name.parse())
    }

    /// Whether the compression level takes part in the filter parameters.
    pub fn is_levelled(&self) -> bool {
        matches!(
            self,
            CompressionOption::Gzip
                | CompressionOption::GzipWithShuffle
                | CompressionOption::BitshuffleWithLz4
                | CompressionOption::BitshuffleWithZstd
        )
    }
}

impl fmt::Display for CompressionOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompressionOption::None => "none",
            CompressionOption::Gzip => "gzip",
            CompressionOption::GzipWithShuffle => "gzip_with_shuffle",
            CompressionOption::BitshuffleWithLz4 => "bitshuffle_with_lz4",
            CompressionOption::BitshuffleWithZstd => "bitshuffle_with_zstd",
            CompressionOption::Zfp => "zfp",
        };
        f.write_str(name)
    }
}

impl FromStr for CompressionOption {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(CompressionOption::None),
            "gzip" => Ok(CompressionOption::Gzip),
            "gzip_with_shuffle" => Ok(CompressionOption::GzipWithShuffle),
            "bitshuffle_with_lz4" => Ok(CompressionOption::BitshuffleWithLz4),
            "bitshuffle_with_zstd" => Ok(CompressionOption::BitshuffleWithZstd),
            "zfp" => Ok(CompressionOption::Zfp),
            _ => Err(ConfigurationError::UnknownCompression(s.to_string())),
        }
    }
}
