use std::fmt;

/// Running totals of a serializer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerializerStats {
    /// Batches turned into blobs
    pub batches_serialized: usize,
    /// Batches dropped under the skip-batch policy
    pub batches_skipped: usize,
    /// Datasets written across all blobs
    pub datasets_written: usize,
    /// Total size of all blobs in bytes
    pub bytes_emitted: u64,
}

impl SerializerStats {
    pub(super) fn record_blob(&mut self, datasets: usize, bytes: usize) {
        self.batches_serialized += 1;
        self.datasets_written += datasets;
        self.bytes_emitted += bytes as u64;
    }

    pub(super) fn record_skip(&mut self) {
        self.batches_skipped += 1;
    }
}

impl fmt::Display for SerializerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Serialized {} batches ({} datasets, {} bytes), skipped {}",
            self.batches_serialized, self.datasets_written, self.bytes_emitted, self.batches_skipped
        )
    }
}
