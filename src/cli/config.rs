//! TOML configuration file support.
//!
//! ```toml
//! # h5blob.toml
//! [data_serializer.hdf5_binary_serializer]
//! compression = "gzip_with_shuffle"
//! compression_level = 4
//!
//! [data_serializer.hdf5_binary_serializer.fields]
//! timestamp = "timestamp"
//! detector_data = "data"
//!
//! [output]
//! directory = "out"
//! prefix = "run0001_"
//! suffix = "h5"
//! ```

use anyhow::{Context, Result};
use h5blob::writer::DataSerializerParameters;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration structure for h5blob.toml files.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Data serializer sections.
    pub data_serializer: DataSerializerParameters,

    /// Where demo blobs are written.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Settings of the file-writing blob handler.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory the files are written to (default: current directory).
    pub directory: Option<PathBuf>,

    /// File name prefix (default: empty).
    pub prefix: Option<String>,

    /// File name suffix, without the dot (default: `h5`).
    pub suffix: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [data_serializer.hdf5_binary_serializer]
            compression = "bitshuffle_with_zstd"
            compression_level = 9

            [data_serializer.hdf5_binary_serializer.fields]
            timestamp = "timestamp"
            detector_data = "data"

            [output]
            directory = "/tmp/blobs"
            prefix = "run_"
        "#;

        let config = Config::from_str(toml).unwrap();
        let serializer = config.data_serializer.hdf5_binary_serializer().unwrap();
        assert_eq!(serializer.compression.as_deref(), Some("bitshuffle_with_zstd"));
        assert_eq!(serializer.compression_level, 9);
        assert_eq!(serializer.fields.dataset_name("detector_data"), Some("data"));
        assert_eq!(config.output.directory, Some(PathBuf::from("/tmp/blobs")));
        assert_eq!(config.output.prefix.as_deref(), Some("run_"));
        assert_eq!(config.output.suffix, None);
    }

    #[test]
    fn test_section_alias() {
        let toml = r#"
            [data_serializer.Hdf5BinarySerializer.fields]
            a = "alpha"
        "#;

        let config = Config::from_str(toml).unwrap();
        assert!(config.data_serializer.hdf5_binary_serializer().is_ok());
        assert!(config.output.directory.is_none());
    }

    #[test]
    fn test_missing_serializer_section() {
        let config = Config::from_str("[data_serializer]").unwrap();
        assert!(config.data_serializer.hdf5_binary_serializer().is_err());
        assert!(Config::from_str("").is_err());
    }

    #[test]
    fn test_unknown_section_rejected() {
        let toml = r#"
            [data_serializer.hdf5_binary_serializer.fields]
            a = "alpha"

            [outptu]
            prefix = "x"
        "#;
        assert!(Config::from_str(toml).is_err());
    }
}
