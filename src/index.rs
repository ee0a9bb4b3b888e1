use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::config::has_supported_extension;
use crate::error::ImportError;

const HASH_CHUNK_SIZE: usize = 1024 * 1024;

/// The cheap pre-filter key for duplicate lookups: lowercase file name
/// plus byte size. Lowercase keeps the check stable across FAT cards
/// and case-insensitive mounts
pub type FileSignature = (String, u64);

pub fn signature_for(file_name: &str, size: u64) -> FileSignature {
    (file_name.to_lowercase(), size)
}

/// Per-target lookup of existing files by signature.
///
/// Built once from a full scan of the target root before copying
/// starts, then kept current via [TargetIndex::record_copied] as new
/// files arrive during the run. Each target root owns its own index;
/// duplicate state never crosses targets
#[derive(Debug)]
pub struct TargetIndex {
    entries: HashMap<FileSignature, Vec<PathBuf>>,
}

impl TargetIndex {
    /// Scan all supported files under the root. Entries whose metadata
    /// cannot be read are left out: a missed duplicate costs one
    /// redundant copy, a false positive would silently drop a new file
    pub fn build(root: &Path) -> TargetIndex {
        let mut entries: HashMap<FileSignature, Vec<PathBuf>> = HashMap::new();

        if root.is_dir() {
            let supported_files = WalkDir::new(root)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .filter(|entry| has_supported_extension(entry.path()));

            for entry in supported_files {
                let file_name = match entry.file_name().to_str() {
                    Some(file_name) => file_name.to_string(),
                    None => continue,
                };
                let size = match entry.metadata() {
                    Ok(metadata) => metadata.len(),
                    Err(_) => continue,
                };

                entries
                    .entry(signature_for(&file_name, size))
                    .or_insert_with(Vec::new)
                    .push(entry.into_path());
            }
        }

        TargetIndex { entries }
    }

    /// Number of indexed files
    pub fn len(&self) -> usize {
        self.entries.values().map(|candidates| candidates.len()).sum()
    }

    /// Check whether the source file already exists somewhere under
    /// this target.
    ///
    /// An empty candidate list is a conclusive cheap negative and no
    /// hash is computed. Otherwise the source's content hash (reusing
    /// `precomputed_hash` when a check against another target already
    /// paid for it) is compared against each candidate in list order.
    /// Candidates that cannot be hashed are treated as non-matches.
    ///
    /// Returns the verdict plus whichever source hash was used, so the
    /// caller can carry it to the next target
    pub fn is_duplicate(
        &self,
        source_path: &Path,
        signature: &FileSignature,
        precomputed_hash: Option<String>,
    ) -> (bool, Option<String>) {
        let candidates = match self.entries.get(signature) {
            Some(candidates) if !candidates.is_empty() => candidates,
            _ => return (false, precomputed_hash),
        };

        let source_hash = match precomputed_hash {
            Some(hash) => hash,
            None => match hash_file(source_path) {
                Ok(hash) => hash,
                // A source that cannot be read cannot be confirmed as
                // a duplicate either
                Err(_) => return (false, None),
            },
        };

        for candidate in candidates {
            if let Ok(candidate_hash) = hash_file(candidate) {
                if candidate_hash == source_hash {
                    return (true, Some(source_hash));
                }
            }
        }

        (false, Some(source_hash))
    }

    /// Register a freshly copied file so later files in the same run
    /// see it as a duplicate candidate
    pub fn record_copied(&mut self, path: &Path, size: u64) {
        if let Some(file_name) = path.file_name().and_then(|os| os.to_str()) {
            self.entries
                .entry(signature_for(file_name, size))
                .or_insert_with(Vec::new)
                .push(path.to_path_buf());
        }
    }
}

/// SHA-256 over the full file contents, streamed in 1 MiB chunks to
/// bound memory use on large raw files
pub fn hash_file(path: &Path) -> Result<String, ImportError> {
    let map_err = |source| ImportError::Hash {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(map_err)?;
    let mut hasher = Sha256::new();
    let mut chunk = vec![0u8; HASH_CHUNK_SIZE];

    loop {
        let read = file.read(&mut chunk).map_err(map_err)?;
        if read == 0 {
            break;
        }
        hasher.update(&chunk[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
