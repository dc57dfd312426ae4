//! Sequential writer for `.part` download files.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::temp_path;

/// Writer for one in-progress download. Bytes go to `<final>.part`;
/// `finalize` syncs and renames onto the final path.
pub struct StorageWriter {
    file: BufWriter<File>,
    temp_path: PathBuf,
    final_path: PathBuf,
    written: u64,
}

impl StorageWriter {
    /// Create (or truncate) the temp file for `final_path`.
    pub fn create(final_path: &Path) -> io::Result<Self> {
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        Ok(StorageWriter {
            file: BufWriter::new(file),
            temp_path,
            final_path: final_path.to_path_buf(),
            written: 0,
        })
    }

    /// Append a chunk of the response body.
    pub fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Path to the current temp file.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flush, sync and rename the temp file onto the final path. Returns the
    /// number of bytes written. Consumes the writer and closes the file.
    pub fn finalize(self) -> io::Result<u64> {
        let StorageWriter {
            file,
            temp_path,
            final_path,
            written,
        } = self;
        let file = file.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&temp_path, &final_path)?;
        Ok(written)
    }

    /// Drop the temp file without touching the final path.
    pub fn discard(self) {
        let temp_path = self.temp_path.clone();
        drop(self.file);
        if let Err(e) = std::fs::remove_file(&temp_path) {
            tracing::debug!("could not remove {}: {}", temp_path.display(), e);
        }
    }
}
