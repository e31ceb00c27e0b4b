use anyhow::{Context, Result};
use std::path::PathBuf;

use h5blob::writer::Hdf5BinarySerializer;

use super::config::Config;

/// Load a configuration file and print what the serializer resolves it to
pub fn run(file: PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("Config file does not exist: {}", file.display());
    }

    let config = Config::from_file(&file)?;
    let serializer = Hdf5BinarySerializer::new(&config.data_serializer)
        .context("Invalid serializer configuration")?;

    let compression = serializer.compression();
    let descriptor =
        serde_json::to_string_pretty(compression).context("Failed to render descriptor")?;
    let unavailable = compression.unavailable_filters();

    #[cfg(feature = "colorized_output")]
    {
        use console::style;

        println!("{}", style("h5blob Configuration").bold().cyan());
        println!("{}", style("====================").cyan());
        println!("{}: {}\n", style("File").bold(), file.display());
        println!("{}: {}", style("Compression").bold(), compression);
        println!("{}\n", descriptor);
        println!("{}:", style("Fields").bold());
        for (field, dataset) in serializer.fields().iter() {
            println!("  {} -> {}", field, style(dataset).green());
        }
        println!("\n{}: {:?}", style("On error").bold(), serializer.error_policy());
        for id in &unavailable {
            println!(
                "{}: HDF5 filter {} is not available",
                style("WARNING").yellow().bold(),
                id
            );
        }
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!("h5blob Configuration");
        println!("====================");
        println!("File: {}\n", file.display());
        println!("Compression: {}", compression);
        println!("{}\n", descriptor);
        println!("Fields:");
        for (field, dataset) in serializer.fields().iter() {
            println!("  {} -> {}", field, dataset);
        }
        println!("\nOn error: {:?}", serializer.error_policy());
        for id in &unavailable {
            println!("WARNING: HDF5 filter {} is not available", id);
        }
    }

    Ok(())
}
