use std::path::PathBuf;

use crate::copier::ImportTally;
use crate::utils::*;

/// One event per notable step of an import run.
///
/// Events are plain owned values: the worker builds them, the sink
/// consumes them, nothing borrowed crosses the thread boundary
#[derive(Debug, Clone)]
pub enum ImportEvent {
    /// The source scan finished
    ScanCompleted {
        files: usize,
        total_bytes: u64,
        /// Per-extension counts, largest group first
        by_extension: Vec<(String, usize)>,
    },
    /// A target's duplicate index is ready
    IndexBuilt { target_no: usize, entries: usize },
    /// The source scan turned up no supported files
    NothingToImport,
    /// One file landed in one target
    FileCopied {
        source: PathBuf,
        target_no: usize,
        relative_dir: PathBuf,
    },
    /// One file was skipped for one target because the target already
    /// holds its content
    FileSkipped { source: PathBuf, target_no: usize },
    /// One file failed for one target, or could not be read at all
    /// (no target assigned yet)
    FileErrored {
        source: PathBuf,
        target_no: Option<usize>,
        message: String,
    },
    /// Running totals, emitted once per processed source file
    Progress(ProgressSnapshot),
    /// Final totals
    RunCompleted(ImportTally),
}

#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    pub processed: usize,
    pub total: usize,
    pub tally: ImportTally,
}

impl ProgressSnapshot {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }
}

/// Sink for import events. The worker is the sole producer and calls
/// this inline between files, so implementations must return quickly
pub trait ProgressSink: Send + Sync {
    fn post(&self, event: ImportEvent);
}

/// Renders events as colored console lines. The per-file lines only
/// appear in verbose mode; the running status line is always shown
pub struct ConsoleSink {
    pub verbose: bool,
}

impl ProgressSink for ConsoleSink {
    fn post(&self, event: ImportEvent) {
        match event {
            ImportEvent::ScanCompleted { files, total_bytes, by_extension } => {
                println!(
                    "Found {} supported files ({})",
                    files,
                    get_file_size_string(total_bytes)
                );
                if self.verbose {
                    for (extension, count) in by_extension {
                        println!(" └── {}: {}", extension, count);
                    }
                }
            }

            ImportEvent::IndexBuilt { target_no, entries } => {
                println!(
                    "Duplicate index for target {}: {} existing files",
                    target_no, entries
                );
            }

            ImportEvent::NothingToImport => {
                println!("{}", ColoredString::orange("No supported image files found."));
            }

            ImportEvent::FileCopied { source, target_no, relative_dir } => {
                if self.verbose {
                    println!(
                        "{} {} {} {}",
                        ColoredString::green("copied"),
                        source.display(),
                        format!("──> target {}", target_no),
                        relative_dir.display()
                    );
                }
            }

            ImportEvent::FileSkipped { source, target_no } => {
                if self.verbose {
                    println!(
                        "{} {} (already in target {})",
                        ColoredString::orange("skipped"),
                        source.display(),
                        target_no
                    );
                }
            }

            ImportEvent::FileErrored { source, target_no, message } => {
                let location = match target_no {
                    Some(target_no) => format!(" (target {})", target_no),
                    None => String::new(),
                };
                println!(
                    "{} {}{}: {}",
                    ColoredString::red("error"),
                    source.display(),
                    location,
                    message
                );
            }

            ImportEvent::Progress(snapshot) => {
                print_progress(format!(
                    "\r{}/{} files ({:.0}%) | copied {} | skipped {} | errors {}   ",
                    snapshot.processed,
                    snapshot.total,
                    snapshot.fraction() * 100.0,
                    snapshot.tally.copied(),
                    snapshot.tally.skipped(),
                    snapshot.tally.errored()
                ));
            }

            ImportEvent::RunCompleted(_) => {
                // Terminate the \r status line; the final tally is
                // printed by the caller
                println!();
            }
        }
    }
}
