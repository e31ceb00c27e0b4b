use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info};
use ndarray::{Array, Array1};
use std::fs;
use std::path::{Path, PathBuf};

use h5blob::batch::{Batch, FieldArray, FieldMapping};
use h5blob::writer::{Hdf5BinarySerializer, SerializedBlob};

use super::config::Config;

/// Side length of the synthetic detector frames
const FRAME_SIZE: usize = 32;

/// Default file suffix of written blobs
const DEFAULT_SUFFIX: &str = "h5";

/// Command line overrides of the `[output]` section
pub struct OutputArgs {
    /// Directory override
    pub directory: Option<PathBuf>,
    /// Prefix override
    pub prefix: Option<String>,
    /// Suffix override
    pub suffix: Option<String>,
}

/// Serialize synthetic detector batches and write one file per blob
pub fn run(config_path: PathBuf, batches: usize, depth: usize, output: OutputArgs) -> Result<()> {
    if depth == 0 {
        anyhow::bail!("Batch depth must be at least 1");
    }

    let config = Config::from_file(&config_path)?;
    let mut serializer = Hdf5BinarySerializer::new(&config.data_serializer)
        .context("Invalid serializer configuration")?;

    let mut writer = BlobFileWriter::new(
        output
            .directory
            .or(config.output.directory)
            .unwrap_or_else(|| PathBuf::from(".")),
        output.prefix.or(config.output.prefix).unwrap_or_default(),
        output
            .suffix
            .or(config.output.suffix)
            .unwrap_or_else(|| DEFAULT_SUFFIX.to_string()),
    )?;

    info!("h5blob demo");
    info!("===========");
    info!("Config: {}", config_path.display());
    info!("Compression: {}", serializer.compression());
    info!("Fields: {}", serializer.fields());
    info!("Batches: {} x {} records", batches, depth);

    let source = SyntheticSource::new(serializer.fields().clone(), batches, depth);
    for blob in serializer.serialize(source) {
        let blob = blob.context("Serialization failed")?;
        let path = writer.write(&blob)?;
        debug!("Wrote {} ({} bytes)", path.display(), blob.len());
    }

    let stats = serializer.stats();
    info!("Done: {}", stats);

    #[cfg(feature = "colorized_output")]
    {
        use console::style;
        println!("{} {}", style("✓").green().bold(), stats);
        println!("  {}: {}", style("Output").bold(), writer.directory.display());
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!("{}", stats);
        println!("  Output: {}", writer.directory.display());
    }

    Ok(())
}

/// Writes every blob to `<directory>/<prefix><index:06>.<suffix>`
struct BlobFileWriter {
    directory: PathBuf,
    prefix: String,
    suffix: String,
    written: usize,
}

impl BlobFileWriter {
    fn new(directory: PathBuf, prefix: String, suffix: String) -> Result<Self> {
        fs::create_dir_all(&directory)
            .with_context(|| format!("Failed to create output directory: {}", directory.display()))?;

        Ok(Self {
            directory,
            prefix,
            suffix,
            written: 0,
        })
    }

    fn path_for(&self, index: usize) -> PathBuf {
        self.directory
            .join(format!("{}{:06}.{}", self.prefix, index, self.suffix))
    }

    fn write(&mut self, blob: &SerializedBlob) -> Result<PathBuf> {
        let path = self.path_for(self.written);
        write_file(&path, blob)?;
        self.written += 1;
        Ok(path)
    }
}

fn write_file(path: &Path, blob: &SerializedBlob) -> Result<()> {
    fs::write(path, blob.as_bytes())
        .with_context(|| format!("Failed to write blob: {}", path.display()))
}

/// Generates detector-like batches for the mapped fields it knows.
///
/// Known fields are `timestamp`, `detector_data` and `photon_wavelength`;
/// any other mapped field is emitted as absent.
struct SyntheticSource {
    fields: FieldMapping,
    remaining: usize,
    depth: usize,
    event: usize,
}

impl SyntheticSource {
    fn new(fields: FieldMapping, batches: usize, depth: usize) -> Self {
        Self {
            fields,
            remaining: batches,
            depth,
            event: 0,
        }
    }

    fn generate(&self, field: &str) -> Option<FieldArray> {
        let depth = self.depth;
        let first = self.event;

        match field {
            "timestamp" => {
                let now = Utc::now().timestamp_micros() as f64 / 1e6;
                Some(Array1::from_shape_fn(depth, |i| now + i as f64 * 1e-3).into())
            }
            "detector_data" => Some(
                Array::from_shape_fn((depth, FRAME_SIZE, FRAME_SIZE), |(r, y, x)| {
                    let phase = (first + r) as f32 * 0.1;
                    ((x as f32 * 0.2 + phase).sin() * (y as f32 * 0.2).cos() * 100.0).abs()
                })
                .into(),
            ),
            "photon_wavelength" => Some(
                Array1::from_shape_fn(depth, |i| 1.3e-10 + ((first + i) % 10) as f64 * 1e-13)
                    .into(),
            ),
            _ => None,
        }
    }
}

impl Iterator for SyntheticSource {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.remaining == 0 {
            return None;
        }

        let batch = self
            .fields
            .fields()
            .map(|field| (field.to_string(), self.generate(field)))
            .collect();

        self.remaining -= 1;
        self.event += self.depth;
        Some(batch)
    }
}
