use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the import pipeline.
///
/// The first two abort a run before any file is touched. The rest are
/// per-file or per-target: the copy loop counts them and moves on
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("source folder is not an existing directory: {}", .0.display())]
    InvalidSource(PathBuf),

    #[error("could not create target folder {}: {}", .path.display(), .source)]
    CreateTargetDir { path: PathBuf, source: io::Error },

    #[error("could not read name or size of {}: {}", .path.display(), .source)]
    ReadSource { path: PathBuf, source: io::Error },

    #[error("could not hash {}: {}", .path.display(), .source)]
    Hash { path: PathBuf, source: io::Error },

    #[error("could not copy {} to {}: {}", .source_path.display(), .target_path.display(), .source)]
    Copy {
        source_path: PathBuf,
        target_path: PathBuf,
        source: io::Error,
    },
}
