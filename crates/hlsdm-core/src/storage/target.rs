//! Where finished output goes.

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;

use super::writer::FileStreamWriter;
use super::temp_path;

/// Incremental sink for streaming mode.
pub trait StreamWriter: Send {
    fn write_chunk(&mut self, data: &[u8]) -> io::Result<()>;

    /// Finishes the stream; what was written so far becomes the artifact.
    fn close(self: Box<Self>) -> io::Result<()>;
}

/// A whole output file assembled in buffered mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub file_name: String,
    /// `video/MP2T` or `video/mp4`.
    pub media_type: &'static str,
    pub bytes: Bytes,
}

/// Download-trigger collaborator: receives buffered artifacts and opens
/// stream writers.
pub trait OutputTarget: Send + Sync {
    fn open_stream(&self, file_name: &str) -> io::Result<Box<dyn StreamWriter>>;

    fn deliver(&self, artifact: &OutputArtifact) -> io::Result<()>;

    /// True if `file_name` is already taken, finished or in progress.
    fn exists(&self, file_name: &str) -> bool;
}

/// Writes artifacts into a directory.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: PathBuf,
}

impl DirectoryTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectoryTarget { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }
}

impl OutputTarget for DirectoryTarget {
    fn open_stream(&self, file_name: &str) -> io::Result<Box<dyn StreamWriter>> {
        self.ensure_dir()?;
        Ok(Box::new(FileStreamWriter::create(&self.dir.join(file_name))?))
    }

    fn deliver(&self, artifact: &OutputArtifact) -> io::Result<()> {
        self.ensure_dir()?;
        let final_path = self.dir.join(&artifact.file_name);
        let tp = temp_path(&final_path);
        std::fs::write(&tp, &artifact.bytes)?;
        std::fs::rename(&tp, &final_path)?;
        tracing::info!(
            path = %final_path.display(),
            media_type = artifact.media_type,
            bytes = artifact.bytes.len(),
            "artifact delivered"
        );
        Ok(())
    }

    fn exists(&self, file_name: &str) -> bool {
        let p = self.dir.join(file_name);
        p.exists() || temp_path(&p).exists()
    }
}
