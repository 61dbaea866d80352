//! Sequential temp-file writer used by streaming output.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::target::StreamWriter;
use super::temp_path;

/// Appends chunks to `<final>.part`; `close` flushes, syncs and renames
/// the file to its final name.
pub struct FileStreamWriter {
    file: BufWriter<File>,
    temp_path: PathBuf,
    final_path: PathBuf,
    written: u64,
}

impl FileStreamWriter {
    /// Creates (truncating) the temp file for `final_path`.
    pub fn create(final_path: &Path) -> io::Result<Self> {
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        tracing::debug!(path = %temp_path.display(), "opened stream writer");
        Ok(FileStreamWriter {
            file: BufWriter::new(file),
            temp_path,
            final_path: final_path.to_path_buf(),
            written: 0,
        })
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl StreamWriter for FileStreamWriter {
    fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        let FileStreamWriter {
            file,
            temp_path,
            final_path,
            written,
        } = *self;
        let file = file.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&temp_path, &final_path)?;
        tracing::info!(path = %final_path.display(), bytes = written, "stream finalized");
        Ok(())
    }
}
