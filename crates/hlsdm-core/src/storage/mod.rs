//! Output assembly and file lifecycle.
//!
//! [`OutputSink`] orders transcoded segment buffers; an [`OutputTarget`]
//! decides where bytes end up. Streaming writes go to a `.part` file that
//! is renamed into place on close.

mod sink;
mod target;
mod writer;

pub use sink::OutputSink;
pub use target::{DirectoryTarget, OutputArtifact, OutputTarget, StreamWriter};
pub use writer::FileStreamWriter;

use std::path::{Path, PathBuf};

/// Temporary file suffix used before the final rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.ts` → `a.ts.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}
