use std::fmt;
use std::os::raw::c_uint;

use hdf5::DatasetBuilder;
use hdf5_sys::h5z::{H5Z_filter_t, H5Zfilter_avail, H5Z_FILTER_DEFLATE, H5Z_FILTER_SHUFFLE};
use serde::Serialize;

use crate::writer::ConfigurationError;

use super::{bitshuffle, CompressionOption};

/// Registered HDF5 filter id of bitshuffle
pub const BITSHUFFLE_FILTER_ID: H5Z_filter_t = 32008;

/// Registered HDF5 filter id of the ZFP plugin
pub const ZFP_FILTER_ID: H5Z_filter_t = 32013;

/// Bitshuffle block size; zero lets the filter pick one from the element size
const BITSHUFFLE_BLOCK_SIZE: c_uint = 0;

const DEFLATE_LEVELS: (i32, i32) = (0, 9);
const ZSTD_LEVELS: (i32, i32) = (1, 22);
const LZ4_LEVELS: (i32, i32) = (0, i32::MAX);

/// Codec applied by the bitshuffle filter after the bit transposition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BitshuffleCodec {
    /// LZ4 block compression
    Lz4,
    /// Zstandard compression
    Zstd,
}

impl BitshuffleCodec {
    /// Codec selector understood by the bitshuffle filter
    pub fn filter_code(&self) -> c_uint {
        match self {
            BitshuffleCodec::Lz4 => 2,
            BitshuffleCodec::Zstd => 3,
        }
    }

    /// Codec name as used in configuration
    pub fn name(&self) -> &'static str {
        match self {
            BitshuffleCodec::Lz4 => "lz4",
            BitshuffleCodec::Zstd => "zstd",
        }
    }
}

/// Fully resolved compression settings.
///
/// A descriptor is produced once per serializer from a [`CompressionOption`] and
/// a level, and the same filter pipeline is then applied to every dataset that
/// serializer writes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum CompressionDescriptor {
    /// No filter pipeline
    #[default]
    None,
    /// Deflate, optionally preceded by the byte shuffle filter
    Deflate {
        /// Deflate level (0-9)
        level: u8,
        /// Apply byte shuffling before deflate
        shuffle: bool,
    },
    /// Bit shuffle followed by a fast codec
    Bitshuffle {
        /// Codec applied after the shuffle
        codec: BitshuffleCodec,
        /// Codec level
        level: u32,
    },
    /// ZFP with the plugin's default parameters
    Zfp,
}

impl CompressionDescriptor {
    /// Resolve a compression option and level into a descriptor.
    ///
    /// The level is checked against the range of the selected algorithm. Options
    /// that do not take a level (`none`, `zfp`) accept any value.
    pub fn resolve(option: CompressionOption, level: i32) -> Result<Self, ConfigurationError> {
        match option {
            CompressionOption::None => Ok(Self::None),
            CompressionOption::Gzip => Ok(Self::Deflate {
                level: checked_level(option, level, DEFLATE_LEVELS)? as u8,
                shuffle: false,
            }),
            CompressionOption::GzipWithShuffle => Ok(Self::Deflate {
                level: checked_level(option, level, DEFLATE_LEVELS)? as u8,
                shuffle: true,
            }),
            CompressionOption::BitshuffleWithLz4 => Ok(Self::Bitshuffle {
                codec: BitshuffleCodec::Lz4,
                level: checked_level(option, level, LZ4_LEVELS)? as u32,
            }),
            CompressionOption::BitshuffleWithZstd => Ok(Self::Bitshuffle {
                codec: BitshuffleCodec::Zstd,
                level: checked_level(option, level, ZSTD_LEVELS)? as u32,
            }),
            CompressionOption::Zfp => Ok(Self::Zfp),
        }
    }

    /// Resolve a compression option given by its configuration name.
    pub fn resolve_named(name: Option<&str>, level: i32) -> Result<Self, ConfigurationError> {
        Self::resolve(CompressionOption::from_config(name)?, level)
    }

    /// Whether any filter is applied
    pub fn is_compressed(&self) -> bool {
        !matches!(self, CompressionDescriptor::None)
    }

    /// HDF5 filter ids in pipeline order
    pub fn filter_ids(&self) -> Vec<H5Z_filter_t> {
        match self {
            CompressionDescriptor::None => Vec::new(),
            CompressionDescriptor::Deflate { shuffle: true, .. } => {
                vec![H5Z_FILTER_SHUFFLE, H5Z_FILTER_DEFLATE]
            }
            CompressionDescriptor::Deflate { shuffle: false, .. } => vec![H5Z_FILTER_DEFLATE],
            CompressionDescriptor::Bitshuffle { .. } => vec![BITSHUFFLE_FILTER_ID],
            CompressionDescriptor::Zfp => vec![ZFP_FILTER_ID],
        }
    }

    /// Client data passed to a third-party filter.
    ///
    /// Bitshuffle takes block size, codec and level; when the filter is attached
    /// to a dataset it prepends its version and the element size.
    /// Built-in filters and ZFP return an empty list.
    pub fn filter_params(&self) -> Vec<c_uint> {
        match self {
            CompressionDescriptor::Bitshuffle { codec, level } => {
                vec![BITSHUFFLE_BLOCK_SIZE, codec.filter_code(), *level]
            }
            _ => Vec::new(),
        }
    }

    /// Filters of this pipeline that HDF5 cannot currently load
    pub fn unavailable_filters(&self) -> Vec<H5Z_filter_t> {
        self.filter_ids()
            .into_iter()
            .filter(|id| !filter_available(*id))
            .collect()
    }

    /// Attach this filter pipeline to a dataset builder
    pub(crate) fn configure(&self, builder: DatasetBuilder) -> DatasetBuilder {
        match self {
            CompressionDescriptor::None => builder,
            CompressionDescriptor::Deflate { level, shuffle } => {
                if *shuffle {
                    builder.shuffle().deflate(*level)
                } else {
                    builder.deflate(*level)
                }
            }
            CompressionDescriptor::Bitshuffle { .. } => {
                builder.add_filter(BITSHUFFLE_FILTER_ID, &self.filter_params())
            }
            CompressionDescriptor::Zfp => builder.add_filter(ZFP_FILTER_ID, &[]),
        }
    }
}

impl fmt::Display for CompressionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionDescriptor::None => write!(f, "uncompressed"),
            CompressionDescriptor::Deflate { level, shuffle: false } => {
                write!(f, "deflate (level {})", level)
            }
            CompressionDescriptor::Deflate { level, shuffle: true } => {
                write!(f, "shuffle + deflate (level {})", level)
            }
            CompressionDescriptor::Bitshuffle { codec, level } => {
                write!(f, "bitshuffle + {} (level {})", codec.name(), level)
            }
            CompressionDescriptor::Zfp => write!(f, "zfp"),
        }
    }
}

/// Whether HDF5 can load the filter with the given id.
///
/// The in-process filters are registered first. Plugin filters are searched
/// for on the HDF5 plugin path on first use.
pub fn filter_available(id: H5Z_filter_t) -> bool {
    register_filters();
    // SAFETY: H5Zfilter_avail only reads the filter registry and takes a plain id.
    hdf5::sync::sync(|| unsafe { H5Zfilter_avail(id) > 0 })
}

/// Register the filters this crate implements in-process (bitshuffle).
///
/// Safe to call any number of times. Readers decoding bitshuffle datasets in a
/// process that has not built a serializer call this before opening them.
pub fn register_filters() -> bool {
    bitshuffle::register()
}

fn checked_level(
    option: CompressionOption,
    level: i32,
    (min, max): (i32, i32),
) -> Result<i32, ConfigurationError> {
    if (min..=max).contains(&level) {
        Ok(level)
    } else {
        Err(ConfigurationError::InvalidLevel {
            option: option.to_string(),
            level,
            min,
            max,
        })
    }
}
