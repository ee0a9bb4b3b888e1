use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use std::{fs, thread};

use chrono::NaiveDateTime;
use filesize::PathExt;
use itertools::Itertools;
use walkdir::WalkDir;

use crate::config::has_supported_extension;
use crate::error::ImportError;
use crate::exif::{read_capture_info, CaptureInfo};
use crate::index::{signature_for, FileSignature, TargetIndex};
use crate::planner::{plan_target_path, relative_dir};
use crate::progress::{ImportEvent, ProgressSink, ProgressSnapshot};

const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Shared run-control flags: the control thread writes, the worker
/// polls once per file. One instance is passed into each run
/// invocation; the flags are reset when the run starts
#[derive(Debug, Default)]
pub struct RunControl {
    paused: AtomicBool,
    cancelled: AtomicBool,
    running: AtomicBool,
}

impl RunControl {
    pub fn new() -> RunControl {
        RunControl::default()
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::SeqCst);
    }

    /// Flip the pause flag and return the new state
    pub fn toggle_paused(&self) -> bool {
        !self.paused.fetch_xor(true, Ordering::SeqCst)
    }

    /// Request cancellation. Also lifts a pause so the worker can
    /// observe the request instead of sleeping on a dead run
    pub fn request_cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.set_paused(false);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

/// Keeps the running flag honest: set on entry, cleared when the run
/// leaves scope on any path, including early validation errors
struct RunningGuard<'a> {
    control: &'a RunControl,
}

impl<'a> RunningGuard<'a> {
    fn acquire(control: &'a RunControl) -> RunningGuard<'a> {
        control.running.store(true, Ordering::SeqCst);
        RunningGuard { control }
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.control.running.store(false, Ordering::SeqCst);
    }
}

/// One folder tree receiving organized copies
#[derive(Debug, Clone)]
pub struct TargetRoot {
    pub path: PathBuf,
    /// 1-based position, used for event labelling
    pub ordinal: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TargetTally {
    pub copied: u32,
    pub skipped: u32,
    pub errored: u32,
}

/// Counters for one run, accumulated monotonically and discarded with
/// the run. Cloned into progress events as a snapshot
#[derive(Debug, Clone, Default)]
pub struct ImportTally {
    /// One entry per enabled target, in target order
    pub targets: Vec<TargetTally>,
    /// Files whose name or size could not be read at all, before any
    /// per-target attempt
    pub read_errors: u32,
    pub processed: usize,
    pub total: usize,
}

impl ImportTally {
    fn new(target_count: usize, total: usize) -> ImportTally {
        ImportTally {
            targets: vec![TargetTally::default(); target_count],
            read_errors: 0,
            processed: 0,
            total,
        }
    }

    pub fn copied(&self) -> u32 {
        self.targets.iter().map(|tally| tally.copied).sum()
    }

    pub fn skipped(&self) -> u32 {
        self.targets.iter().map(|tally| tally.skipped).sum()
    }

    pub fn errored(&self) -> u32 {
        self.targets.iter().map(|tally| tally.errored).sum::<u32>() + self.read_errors
    }
}

/// A single source file picked up by the scan
#[derive(Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
}

impl SourceFile {
    /// Read name and size for one scanned path. A failure here means
    /// the file cannot take part in any duplicate check and is counted
    /// as a read error
    fn read(path: &Path) -> Result<SourceFile, ImportError> {
        let file_name = path
            .file_name()
            .and_then(|os| os.to_str())
            .map(String::from)
            .ok_or_else(|| ImportError::ReadSource {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidData, "file name is not valid unicode"),
            })?;

        let size = fs::metadata(path)
            .map_err(|source| ImportError::ReadSource {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        Ok(SourceFile {
            path: path.to_path_buf(),
            file_name,
            size,
        })
    }

    pub fn signature(&self) -> FileSignature {
        signature_for(&self.file_name, self.size)
    }
}

/// Collect supported files under the source root, in directory order
pub fn scan_source_files(source_root: &Path) -> Vec<PathBuf> {
    WalkDir::new(source_root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| has_supported_extension(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// Total size of the scanned files as allocated on disk, for display
pub fn scan_size_on_disk(files: &[PathBuf]) -> u64 {
    files
        .iter()
        .filter_map(|path| {
            fs::metadata(path)
                .ok()
                .and_then(|metadata| path.size_on_disk_fast(&metadata).ok())
        })
        .sum()
}

/// Per-extension counts for the scan summary, largest group first
pub fn extension_summary(files: &[PathBuf]) -> Vec<(String, usize)> {
    files
        .iter()
        .map(|path| {
            path.extension()
                .and_then(|os| os.to_str())
                .map(|extension| extension.to_uppercase())
                .unwrap_or_else(|| String::from("?"))
        })
        .counts()
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)))
        .collect()
}

/// Run one import: scan the source, build a duplicate index per
/// target, then copy or skip each file per target in scan order.
///
/// Only configuration problems (missing source, target roots that
/// cannot be created) abort the run. Everything else is counted per
/// file and per target, reported through the sink, and the loop moves
/// on. Cancellation exits between files; a pause holds the loop
/// between files until lifted
pub fn run_import(
    source_root: &Path,
    targets: &[TargetRoot],
    control: &RunControl,
    sink: &dyn ProgressSink,
) -> Result<ImportTally, ImportError> {
    control.reset();
    let _running = RunningGuard::acquire(control);

    if !source_root.is_dir() {
        return Err(ImportError::InvalidSource(source_root.to_path_buf()));
    }

    for target in targets {
        fs::create_dir_all(&target.path).map_err(|source| ImportError::CreateTargetDir {
            path: target.path.clone(),
            source,
        })?;
    }

    let files = scan_source_files(source_root);
    if files.is_empty() {
        sink.post(ImportEvent::NothingToImport);
        return Ok(ImportTally::new(targets.len(), 0));
    }

    sink.post(ImportEvent::ScanCompleted {
        files: files.len(),
        total_bytes: scan_size_on_disk(&files),
        by_extension: extension_summary(&files),
    });

    let mut indices: Vec<TargetIndex> = targets
        .iter()
        .map(|target| {
            let index = TargetIndex::build(&target.path);
            sink.post(ImportEvent::IndexBuilt {
                target_no: target.ordinal,
                entries: index.len(),
            });
            index
        })
        .collect();

    let mut tally = ImportTally::new(targets.len(), files.len());

    'files: for path in &files {
        if control.is_cancelled() {
            break;
        }

        // Hold here while paused; the file is not consumed.
        // Cancelling must still get through
        while control.is_paused() {
            if control.is_cancelled() {
                break 'files;
            }
            thread::sleep(PAUSE_POLL_INTERVAL);
        }

        match SourceFile::read(path) {
            Ok(source) => {
                let signature = source.signature();
                // The content hash is computed at most once per file,
                // on the first signature match, and carried to the
                // other target from there
                let mut source_hash: Option<String> = None;
                // Same for the capture metadata, read on the first copy
                let mut capture_info: Option<CaptureInfo> = None;

                for (slot, target) in targets.iter().enumerate() {
                    let index = &mut indices[slot];

                    let (is_duplicate, hash_used) =
                        index.is_duplicate(&source.path, &signature, source_hash.take());
                    source_hash = hash_used;

                    if is_duplicate {
                        tally.targets[slot].skipped += 1;
                        sink.post(ImportEvent::FileSkipped {
                            source: source.path.clone(),
                            target_no: target.ordinal,
                        });
                        continue;
                    }

                    let info = capture_info
                        .get_or_insert_with(|| read_capture_info(&source.path));

                    match copy_to_target(&source, info, target, index) {
                        Ok(relative_dir) => {
                            tally.targets[slot].copied += 1;
                            sink.post(ImportEvent::FileCopied {
                                source: source.path.clone(),
                                target_no: target.ordinal,
                                relative_dir,
                            });
                        }
                        Err(err) => {
                            tally.targets[slot].errored += 1;
                            sink.post(ImportEvent::FileErrored {
                                source: source.path.clone(),
                                target_no: Some(target.ordinal),
                                message: err.to_string(),
                            });
                        }
                    }
                }
            }

            Err(err) => {
                tally.read_errors += 1;
                sink.post(ImportEvent::FileErrored {
                    source: path.clone(),
                    target_no: None,
                    message: err.to_string(),
                });
            }
        }

        tally.processed += 1;
        sink.post(ImportEvent::Progress(ProgressSnapshot {
            processed: tally.processed,
            total: tally.total,
            tally: tally.clone(),
        }));
    }

    sink.post(ImportEvent::RunCompleted(tally.clone()));
    Ok(tally)
}

/// Plan the destination, resolve name collisions against the live
/// target state, copy with timestamps, register the result in the
/// target's index. Returns the target-relative directory
fn copy_to_target(
    source: &SourceFile,
    info: &CaptureInfo,
    target: &TargetRoot,
    index: &mut TargetIndex,
) -> Result<PathBuf, ImportError> {
    let planned = plan_target_path(&target.path, &source.path, info)?;
    let destination = resolve_collision(&planned.file_path);

    copy_preserving_times(&source.path, &destination)?;
    index.record_copied(&destination, source.size);

    Ok(planned.relative_dir)
}

/// First free name wins: `IMG_0001.JPG`, then `IMG_0001_1.JPG`,
/// `IMG_0001_2.JPG` and so on. The suffix goes before the extension
fn resolve_collision(planned: &Path) -> PathBuf {
    if !planned.exists() {
        return planned.to_path_buf();
    }

    let stem = planned
        .file_stem()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_string();
    let extension = planned.extension().and_then(|os| os.to_str());

    let mut counter = 1;
    loop {
        let candidate_name = match extension {
            Some(extension) => format!("{}_{}.{}", stem, counter, extension),
            None => format!("{}_{}", stem, counter),
        };
        let candidate = planned.with_file_name(candidate_name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Copy and carry the source's modified and accessed times over to the
/// destination, the way a camera import is expected to behave
fn copy_preserving_times(source: &Path, destination: &Path) -> Result<u64, ImportError> {
    let copy_err = |source_err| ImportError::Copy {
        source_path: source.to_path_buf(),
        target_path: destination.to_path_buf(),
        source: source_err,
    };

    let bytes = fs::copy(source, destination).map_err(copy_err)?;

    let metadata = fs::metadata(source).map_err(copy_err)?;
    let mut times = fs::FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }

    let destination_file = fs::File::options()
        .write(true)
        .open(destination)
        .map_err(copy_err)?;
    destination_file.set_times(times).map_err(copy_err)?;

    Ok(bytes)
}

/// One row of the dry-run preview
#[derive(Debug)]
pub struct PreviewEntry {
    pub source: PathBuf,
    pub relative_dir: PathBuf,
    pub maker: String,
    pub model: String,
    pub timestamp: NaiveDateTime,
}

/// Plan the layout for already-scanned files without touching any
/// target: no directories are created and no duplicate checks run.
/// Capped because the preview is for eyeballing the layout, not a
/// full report
pub fn preview_entries(files: &[PathBuf], limit: usize) -> Vec<PreviewEntry> {
    files
        .iter()
        .take(limit)
        .map(|path| {
            let info = read_capture_info(path);
            PreviewEntry {
                source: path.clone(),
                relative_dir: relative_dir(&info, path),
                maker: info.maker,
                model: info.model,
                timestamp: info.timestamp,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<ImportEvent>>,
    }

    impl RecordingSink {
        fn events(&self) -> Vec<ImportEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ProgressSink for RecordingSink {
        fn post(&self, event: ImportEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    /// Requests cancellation once the given number of files has been
    /// fully processed
    struct CancelAfterSink {
        control: Arc<RunControl>,
        after: usize,
    }

    impl ProgressSink for CancelAfterSink {
        fn post(&self, event: ImportEvent) {
            if let ImportEvent::Progress(snapshot) = &event {
                if snapshot.processed >= self.after {
                    self.control.request_cancel();
                }
            }
        }
    }

    /// Pauses after the first processed file and records how far the
    /// worker got
    struct PauseAfterFirstSink {
        control: Arc<RunControl>,
        last_processed: AtomicUsize,
    }

    impl ProgressSink for PauseAfterFirstSink {
        fn post(&self, event: ImportEvent) {
            if let ImportEvent::Progress(snapshot) = &event {
                self.last_processed.store(snapshot.processed, Ordering::SeqCst);
                if snapshot.processed == 1 {
                    self.control.set_paused(true);
                }
            }
        }
    }

    fn write_source_file(root: &Path, relative: &str, contents: &[u8]) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    fn single_target(path: &Path) -> Vec<TargetRoot> {
        vec![TargetRoot { path: path.to_path_buf(), ordinal: 1 }]
    }

    #[test]
    fn collision_suffix_takes_first_free_name() {
        let dir = tempfile::tempdir().unwrap();
        let planned = dir.path().join("IMG_0001.JPG");

        assert_eq!(resolve_collision(&planned), planned);

        fs::write(&planned, b"first").unwrap();
        assert_eq!(resolve_collision(&planned), dir.path().join("IMG_0001_1.JPG"));

        fs::write(dir.path().join("IMG_0001_1.JPG"), b"second").unwrap();
        assert_eq!(resolve_collision(&planned), dir.path().join("IMG_0001_2.JPG"));
    }

    #[test]
    fn collision_suffix_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let planned = dir.path().join("scan0001");
        fs::write(&planned, b"first").unwrap();

        assert_eq!(resolve_collision(&planned), dir.path().join("scan0001_1"));
    }

    #[test]
    fn copy_keeps_the_modification_time() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source_file(dir.path(), "src/IMG_0001.JPG", b"pixels");
        let destination = dir.path().join("IMG_0001.JPG");

        copy_preserving_times(&source, &destination).unwrap();

        let source_modified = fs::metadata(&source).unwrap().modified().unwrap();
        let destination_modified = fs::metadata(&destination).unwrap().modified().unwrap();
        assert_eq!(source_modified, destination_modified);
    }

    #[test]
    fn run_copies_everything_on_first_pass() {
        let source_root = tempfile::tempdir().unwrap();
        let target_root = tempfile::tempdir().unwrap();
        write_source_file(source_root.path(), "DCIM/IMG_0001.JPG", b"one");
        write_source_file(source_root.path(), "DCIM/P1010001.ORF", b"two bytes");

        let control = RunControl::new();
        let sink = RecordingSink::default();
        let tally = run_import(
            source_root.path(),
            &single_target(target_root.path()),
            &control,
            &sink,
        )
        .unwrap();

        assert_eq!(tally.copied(), 2);
        assert_eq!(tally.skipped(), 0);
        assert_eq!(tally.errored(), 0);
        assert_eq!(tally.processed, 2);
        assert_eq!(scan_source_files(target_root.path()).len(), 2);
        assert!(!control.is_running());
    }

    #[test]
    fn second_run_skips_everything() {
        let source_root = tempfile::tempdir().unwrap();
        let target_root = tempfile::tempdir().unwrap();
        write_source_file(source_root.path(), "DCIM/IMG_0001.JPG", b"one");
        write_source_file(source_root.path(), "DCIM/P1010001.ORF", b"two bytes");

        let control = RunControl::new();
        let targets = single_target(target_root.path());

        run_import(source_root.path(), &targets, &control, &RecordingSink::default()).unwrap();
        let file_count = scan_source_files(target_root.path()).len();

        let second =
            run_import(source_root.path(), &targets, &control, &RecordingSink::default()).unwrap();

        assert_eq!(second.copied(), 0);
        assert_eq!(second.skipped(), 2);
        // The target tree is unchanged
        assert_eq!(scan_source_files(target_root.path()).len(), file_count);
    }

    #[test]
    fn same_name_same_size_different_content_gets_suffixed() {
        let source_root = tempfile::tempdir().unwrap();
        let target_root = tempfile::tempdir().unwrap();
        let first = write_source_file(source_root.path(), "a/IMG_0001.JPG", b"aaaa");
        write_source_file(source_root.path(), "b/IMG_0001.JPG", b"bbbb");

        let control = RunControl::new();
        let tally = run_import(
            source_root.path(),
            &single_target(target_root.path()),
            &control,
            &RecordingSink::default(),
        )
        .unwrap();

        assert_eq!(tally.copied(), 2);
        assert_eq!(tally.skipped(), 0);

        let planned_dir = target_root
            .path()
            .join(relative_dir(&read_capture_info(&first), &first));
        assert!(planned_dir.join("IMG_0001.JPG").is_file());
        assert!(planned_dir.join("IMG_0001_1.JPG").is_file());
    }

    #[test]
    fn identical_content_within_one_run_is_skipped() {
        let source_root = tempfile::tempdir().unwrap();
        let target_root = tempfile::tempdir().unwrap();
        write_source_file(source_root.path(), "a/IMG_0002.JPG", b"same pixels");
        write_source_file(source_root.path(), "b/IMG_0002.JPG", b"same pixels");

        let control = RunControl::new();
        let tally = run_import(
            source_root.path(),
            &single_target(target_root.path()),
            &control,
            &RecordingSink::default(),
        )
        .unwrap();

        assert_eq!(tally.copied(), 1);
        assert_eq!(tally.skipped(), 1);
        assert_eq!(scan_source_files(target_root.path()).len(), 1);
    }

    #[test]
    fn targets_keep_independent_duplicate_state() {
        let source_root = tempfile::tempdir().unwrap();
        let target_one = tempfile::tempdir().unwrap();
        let target_two = tempfile::tempdir().unwrap();
        write_source_file(source_root.path(), "DCIM/IMG_0001.JPG", b"one");
        write_source_file(source_root.path(), "DCIM/IMG_0002.JPG", b"two");

        let control = RunControl::new();

        // Fill only the first target
        run_import(
            source_root.path(),
            &single_target(target_one.path()),
            &control,
            &RecordingSink::default(),
        )
        .unwrap();

        // A run against both targets: duplicates in one, fresh in two
        let targets = vec![
            TargetRoot { path: target_one.path().to_path_buf(), ordinal: 1 },
            TargetRoot { path: target_two.path().to_path_buf(), ordinal: 2 },
        ];
        let tally = run_import(
            source_root.path(),
            &targets,
            &control,
            &RecordingSink::default(),
        )
        .unwrap();

        assert_eq!(tally.targets[0].copied, 0);
        assert_eq!(tally.targets[0].skipped, 2);
        assert_eq!(tally.targets[1].copied, 2);
        assert_eq!(tally.targets[1].skipped, 0);
    }

    #[test]
    fn cancellation_stops_between_files() {
        let source_root = tempfile::tempdir().unwrap();
        let target_root = tempfile::tempdir().unwrap();
        write_source_file(source_root.path(), "DCIM/IMG_0001.JPG", b"one");
        write_source_file(source_root.path(), "DCIM/IMG_0002.JPG", b"two");
        write_source_file(source_root.path(), "DCIM/IMG_0003.JPG", b"three");

        let control = Arc::new(RunControl::new());
        let sink = CancelAfterSink { control: Arc::clone(&control), after: 1 };

        let tally = run_import(
            source_root.path(),
            &single_target(target_root.path()),
            &control,
            &sink,
        )
        .unwrap();

        assert_eq!(tally.processed, 1);
        assert_eq!(tally.copied() + tally.skipped() + tally.errored(), 1);
        // No file beyond the first was touched
        assert_eq!(scan_source_files(target_root.path()).len(), 1);
        assert!(!control.is_running());
    }

    #[test]
    fn pause_holds_the_loop_until_lifted() {
        let source_root = tempfile::tempdir().unwrap();
        let target_root = tempfile::tempdir().unwrap();
        write_source_file(source_root.path(), "DCIM/IMG_0001.JPG", b"one");
        write_source_file(source_root.path(), "DCIM/IMG_0002.JPG", b"two");
        write_source_file(source_root.path(), "DCIM/IMG_0003.JPG", b"three");

        let control = Arc::new(RunControl::new());
        let sink = Arc::new(PauseAfterFirstSink {
            control: Arc::clone(&control),
            last_processed: AtomicUsize::new(0),
        });

        let worker = {
            let control = Arc::clone(&control);
            let sink = Arc::clone(&sink);
            let source_path = source_root.path().to_path_buf();
            let targets = single_target(target_root.path());
            thread::spawn(move || run_import(&source_path, &targets, &control, sink.as_ref()))
        };

        // Wait for the worker to reach the pause
        let deadline = Instant::now() + Duration::from_secs(5);
        while sink.last_processed.load(Ordering::SeqCst) < 1 {
            assert!(Instant::now() < deadline, "worker never processed the first file");
            thread::sleep(Duration::from_millis(10));
        }

        // While paused, no further file is consumed
        thread::sleep(Duration::from_millis(300));
        assert_eq!(sink.last_processed.load(Ordering::SeqCst), 1);

        control.set_paused(false);
        let tally = worker.join().unwrap().unwrap();
        assert_eq!(tally.processed, 3);
        assert_eq!(tally.copied(), 3);
    }

    #[test]
    fn empty_source_is_not_an_error() {
        let source_root = tempfile::tempdir().unwrap();
        let target_root = tempfile::tempdir().unwrap();

        let control = RunControl::new();
        let sink = RecordingSink::default();
        let tally = run_import(
            source_root.path(),
            &single_target(target_root.path()),
            &control,
            &sink,
        )
        .unwrap();

        assert_eq!(tally.total, 0);
        assert!(sink
            .events()
            .iter()
            .any(|event| matches!(event, ImportEvent::NothingToImport)));
    }

    #[test]
    fn missing_source_aborts_before_the_loop() {
        let target_root = tempfile::tempdir().unwrap();
        let control = RunControl::new();

        let result = run_import(
            Path::new("/no/such/card"),
            &single_target(target_root.path()),
            &control,
            &RecordingSink::default(),
        );

        assert!(matches!(result, Err(ImportError::InvalidSource(_))));
        assert!(!control.is_running());
    }

    #[test]
    fn fallback_metadata_places_by_mtime_and_extension() {
        let source_root = tempfile::tempdir().unwrap();
        let target_root = tempfile::tempdir().unwrap();
        let source = write_source_file(source_root.path(), "DCIM/P1010001.ORF", b"no metadata here");

        let control = RunControl::new();
        run_import(
            source_root.path(),
            &single_target(target_root.path()),
            &control,
            &RecordingSink::default(),
        )
        .unwrap();

        let info = read_capture_info(&source);
        let expected = target_root
            .path()
            .join(info.timestamp.format("%Y").to_string())
            .join(info.timestamp.format("%Y-%m-%d").to_string())
            .join("Olympus")
            .join("ORF")
            .join("P1010001.ORF");
        assert!(expected.is_file());
    }

    #[test]
    fn preview_plans_without_writing() {
        let source_root = tempfile::tempdir().unwrap();
        write_source_file(source_root.path(), "DCIM/IMG_0001.JPG", b"one");
        write_source_file(source_root.path(), "DCIM/IMG_0002.JPG", b"two");
        write_source_file(source_root.path(), "DCIM/IMG_0003.JPG", b"three");

        let files = scan_source_files(source_root.path());
        let entries = preview_entries(&files, 2);

        assert_eq!(entries.len(), 2);
        for entry in &entries {
            assert_eq!(entry.relative_dir.components().count(), 4);
            assert_eq!(entry.maker, "Olympus");
        }
    }

    #[test]
    fn extension_summary_groups_and_sorts() {
        let files = vec![
            PathBuf::from("a.jpg"),
            PathBuf::from("b.JPG"),
            PathBuf::from("c.orf"),
        ];
        let summary = extension_summary(&files);
        assert_eq!(summary[0], (String::from("JPG"), 2));
        assert_eq!(summary[1], (String::from("ORF"), 1));
    }
}
