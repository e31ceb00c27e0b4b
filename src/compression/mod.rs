//! # Compression Policy
//!
//! Maps the configured compression option onto the HDF5 filter pipeline used
//! for every dataset of a serializer.
//!
//! | Option | Filter pipeline |
//! |--------|-----------------|
//! | `none` | none |
//! | `gzip` | deflate (level) |
//! | `gzip_with_shuffle` | shuffle, deflate (level) |
//! | `bitshuffle_with_lz4` | bitshuffle + LZ4 |
//! | `bitshuffle_with_zstd` | bitshuffle + Zstandard (level) |
//! | `zfp` | ZFP, plugin defaults |
//!
//! Deflate and shuffle are built into HDF5. Bitshuffle is registered with HDF5
//! in-process ([`register_filters`]) using chunks compatible with the bitshuffle
//! plugin. ZFP is an external plugin that HDF5 must be able to load when a
//! container is written.

mod bitshuffle;
mod descriptor;
mod option;

#[cfg(test)]
mod tests;

pub use descriptor::{
    filter_available, register_filters, BitshuffleCodec, CompressionDescriptor,
    BITSHUFFLE_FILTER_ID, ZFP_FILTER_ID,
};
pub use option::CompressionOption;
