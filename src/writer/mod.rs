//! Dataset persistence
//!
//! The labeled sequences are written as one Parquet part file inside a
//! staging directory next to the target, which is then renamed into place.
//! An existing dataset is only replaced once the new one is complete.

pub mod join;
pub mod schema;

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::error::{Error, Result};
use crate::models::SequenceRecord;
use crate::utils::DEFAULT_BATCH_SIZE;

pub use join::join_labels;
pub use schema::{
    dataset_schema, read_dataset, record_batch_to_sequences, sequences_to_record_batch,
};

/// File name of the single part file
pub const PART_FILE_NAME: &str = "part-00000.parquet";

/// Removes a directory on drop unless disarmed
struct StagingGuard {
    path: PathBuf,
    armed: bool,
}

impl StagingGuard {
    fn create(path: PathBuf) -> Result<Self> {
        if path.exists() {
            fs::remove_dir_all(&path)?;
        }
        fs::create_dir_all(&path)?;
        Ok(Self { path, armed: true })
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for StagingGuard {
    fn drop(&mut self) {
        if self.armed && self.path.exists() {
            if let Err(e) = fs::remove_dir_all(&self.path) {
                log::warn!(
                    "Failed to remove staging directory {}: {e}",
                    self.path.display()
                );
            }
        }
    }
}

/// Writes the labeled dataset to `<output_folder>/<dataset_name>`
#[derive(Debug, Clone)]
pub struct DatasetWriter {
    output_folder: PathBuf,
    dataset_name: String,
    chunk_size: usize,
}

impl DatasetWriter {
    /// Create a writer for the given location
    pub fn new(output_folder: impl Into<PathBuf>, dataset_name: impl Into<String>) -> Self {
        Self {
            output_folder: output_folder.into(),
            dataset_name: dataset_name.into(),
            chunk_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the number of sequences encoded per record batch
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Final location of the dataset
    #[must_use]
    pub fn dataset_path(&self) -> PathBuf {
        self.output_folder.join(&self.dataset_name)
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        self.output_folder.join(format!(".{}.{suffix}", self.dataset_name))
    }

    /// Write `sequences` and move them into place
    ///
    /// Returns the number of rows written.
    ///
    /// # Errors
    /// Returns an error if encoding or any filesystem step fails; the previous
    /// dataset, if any, is then left in place
    pub fn write(&self, sequences: &[SequenceRecord]) -> Result<usize> {
        fs::create_dir_all(&self.output_folder)?;

        let mut staging = StagingGuard::create(self.sibling("staging"))?;
        write_part_file(
            &staging.path.join(PART_FILE_NAME),
            sequences,
            self.chunk_size,
        )?;
        self.publish(&staging.path)?;
        staging.disarm();

        log::info!(
            "Wrote {} sequences to {}",
            sequences.len(),
            self.dataset_path().display()
        );
        Ok(sequences.len())
    }

    fn publish(&self, staging: &Path) -> Result<()> {
        let target = self.dataset_path();
        if !target.exists() {
            fs::rename(staging, &target)?;
            return Ok(());
        }

        let backup = self.sibling("previous");
        if backup.exists() {
            fs::remove_dir_all(&backup)?;
        }
        fs::rename(&target, &backup)?;

        if let Err(e) = fs::rename(staging, &target) {
            fs::rename(&backup, &target)?;
            return Err(Error::Io(e));
        }

        if let Err(e) = fs::remove_dir_all(&backup) {
            log::warn!("Failed to remove previous dataset {}: {e}", backup.display());
        }
        Ok(())
    }
}

// Chunk boundaries depend only on the input, so the file stays byte-stable
fn write_part_file(path: &Path, sequences: &[SequenceRecord], chunk_size: usize) -> Result<()> {
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, dataset_schema(), Some(props))?;
    for chunk in sequences.chunks(chunk_size) {
        writer.write(&sequences_to_record_batch(chunk)?)?;
    }
    writer.close()?;
    Ok(())
}
