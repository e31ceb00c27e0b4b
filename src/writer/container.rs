use std::ptr;

use hdf5::{File, H5Type};
use hdf5_sys::h5f::H5Fget_file_image;
use log::debug;
use ndarray::ArrayD;
use uuid::Uuid;

use crate::batch::{with_field_array, Batch, FieldArray, FieldMapping};
use crate::compression::CompressionDescriptor;

use super::blob::SerializedBlob;
use super::error::ContainerWriteError;
use super::spec::DatasetSpec;

/// Growth step of the in-memory file buffer
const CORE_INCREMENT: usize = 1024 * 1024;

/// Builds one in-memory HDF5 container per batch.
///
/// The container is created with the HDF5 core driver and no backing store, so
/// nothing touches the filesystem. Once every dataset is written the file is
/// flushed, its image is copied into a new buffer and the HDF5 handle is
/// released. Raw HDF5 calls hold the library lock shared with the `hdf5` crate.
#[derive(Debug, Clone, Copy)]
pub struct ContainerWriter<'a> {
    fields: &'a FieldMapping,
    compression: &'a CompressionDescriptor,
}

impl<'a> ContainerWriter<'a> {
    /// Writer for the given mapping and compression
    pub fn new(fields: &'a FieldMapping, compression: &'a CompressionDescriptor) -> Self {
        Self { fields, compression }
    }

    /// Datasets a batch produces, in field mapping order.
    ///
    /// Absent fields and fields outside the mapping are left out.
    pub fn plan<'b>(&self, batch: &'b Batch) -> Vec<(DatasetSpec, &'b FieldArray)> {
        self.fields
            .iter()
            .filter_map(|(field, dataset)| {
                batch
                    .get(field)
                    .map(|array| (DatasetSpec::new(dataset, array, self.compression), array))
            })
            .collect()
    }

    /// Serialize a batch into a fresh container.
    ///
    /// The batch is expected to be validated already. The blob records how many
    /// datasets were written.
    pub fn write(&self, batch: &Batch) -> Result<SerializedBlob, ContainerWriteError> {
        self.check_filters()?;

        let planned = self.plan(batch);
        let file = create_in_memory()?;

        for (spec, array) in &planned {
            write_dataset(&file, spec, array)?;
        }

        file.flush().map_err(ContainerWriteError::Finalize)?;
        let image = file_image(&file)?;
        drop(file);

        debug!(
            "Built container with {} datasets ({} bytes, {})",
            planned.len(),
            image.len(),
            self.compression
        );

        Ok(SerializedBlob::new(image, planned.len()))
    }

    fn check_filters(&self) -> Result<(), ContainerWriteError> {
        match self.compression.unavailable_filters().first() {
            Some(id) => Err(ContainerWriteError::FilterUnavailable {
                id: *id,
                descriptor: self.compression.to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn create_in_memory() -> Result<File, ContainerWriteError> {
    // The name only identifies the file inside HDF5; no file is created on disk
    let name = format!("{}.h5", Uuid::new_v4());
    File::with_options()
        .with_fapl(|fapl| fapl.core_options(CORE_INCREMENT, false))
        .create(&name)
        .map_err(ContainerWriteError::Create)
}

fn write_dataset(
    file: &File,
    spec: &DatasetSpec,
    array: &FieldArray,
) -> Result<(), ContainerWriteError> {
    with_field_array!(array, data => write_typed(file, spec, data)).map_err(|source| {
        ContainerWriteError::Dataset {
            dataset: spec.name.clone(),
            source,
        }
    })
}

fn write_typed<T: H5Type + Clone>(file: &File, spec: &DatasetSpec, data: &ArrayD<T>) -> hdf5::Result<()> {
    // Transposed and sliced views are copied into row-major order first
    let data = data.as_standard_layout();
    spec.compression
        .configure(file.new_dataset_builder())
        .with_data(&data)
        .chunk(spec.chunk.clone())
        .create(spec.name.as_str())?;
    Ok(())
}

/// Copy the file image out under the HDF5 library lock
fn file_image(file: &File) -> Result<Vec<u8>, ContainerWriteError> {
    let id = file.id();

    hdf5::sync::sync(|| {
        // SAFETY: a null buffer of length zero only asks HDF5 for the image size.
        let size = unsafe { H5Fget_file_image(id, ptr::null_mut(), 0) };
        let size = usize::try_from(size)
            .map_err(|_| ContainerWriteError::Image("HDF5 did not report an image size".into()))?;

        let mut image = vec![0u8; size];
        // SAFETY: `image` is an owned, writable allocation of exactly `size` bytes.
        let copied = unsafe { H5Fget_file_image(id, image.as_mut_ptr().cast(), image.len()) };
        if usize::try_from(copied).ok() != Some(size) {
            return Err(ContainerWriteError::Image(format!(
                "copied {} of {} bytes",
                copied, size
            )));
        }

        Ok(image)
    })
}
