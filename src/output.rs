//! Append-only CSV sink for accepted records.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use tracing::debug;

use crate::error::StorageError;
use crate::record::JobRecord;

pub struct JobCsvWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
    written: usize,
}

impl JobCsvWriter {
    /// Opens `path` for appending. The header row is written with the first
    /// record, and only when the file was missing or empty before this call.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let needs_header = match std::fs::metadata(&path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| StorageError::OpenOutput {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), needs_header, "opened job output");
        let writer = WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        Ok(Self {
            path,
            writer,
            written: 0,
        })
    }

    pub fn write(&mut self, job: &JobRecord) -> Result<(), StorageError> {
        self.writer.serialize(job)?;
        self.written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), StorageError> {
        self.writer.flush().map_err(StorageError::Flush)
    }

    /// Rows written through this handle.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
