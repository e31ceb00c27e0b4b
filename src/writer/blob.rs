use std::ops::Deref;

use bytes::Bytes;

/// Signature found at offset 0 of every HDF5 file image
pub const HDF5_SIGNATURE: &[u8; 8] = b"\x89HDF\r\n\x1a\n";

/// A complete, self-contained HDF5 container for one batch.
///
/// The bytes are an independent file image: they share nothing with the
/// containers of other batches and can be decoded by any HDF5 reader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializedBlob {
    bytes: Bytes,
    datasets: usize,
}

impl SerializedBlob {
    pub(crate) fn new(image: Vec<u8>, datasets: usize) -> Self {
        Self {
            bytes: Bytes::from(image),
            datasets,
        }
    }

    /// Number of datasets in the container
    pub fn datasets(&self) -> usize {
        self.datasets
    }

    /// Container bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the blob holds no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Hand the bytes off without copying
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl AsRef<[u8]> for SerializedBlob {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl Deref for SerializedBlob {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<SerializedBlob> for Bytes {
    fn from(blob: SerializedBlob) -> Self {
        blob.bytes
    }
}
