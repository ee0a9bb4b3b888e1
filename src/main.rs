use std::path::Path;
use std::process;
use std::sync::Arc;
use std::thread;

mod config;
mod copier;
mod error;
mod exif;
mod index;
mod planner;
mod progress;
mod utils;

use config::{Args, DEFAULT_CONFIG_FILE};
use copier::{
    extension_summary, preview_entries, run_import, scan_size_on_disk, scan_source_files,
    ImportTally, RunControl, TargetRoot,
};
use progress::ConsoleSink;
use utils::*;

const PREVIEW_LIMIT: usize = 100;

fn main() {
    let args = match Args::new_from_toml(DEFAULT_CONFIG_FILE) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{}", ColoredString::red(
                format!("Could not read configuration: {}", err).as_str()));
            process::exit(1);
        }
    };

    if !args.source_dir.is_dir() {
        println!("{}", ColoredString::red(format!(
            "Source folder is not a directory: {}", args.source_dir.display()).as_str()));
        process::exit(2);
    }

    let target_dir = match &args.target_dir {
        Some(target_dir) => target_dir.clone(),
        None => {
            println!("{}", ColoredString::red(
                "No target folder configured. Set target_dir under [folders] in fotoimport.toml."));
            process::exit(2);
        }
    };

    let mut targets = vec![TargetRoot { path: target_dir, ordinal: 1 }];
    if args.second_target_enabled {
        match &args.second_target_dir {
            Some(second_target) =>
                targets.push(TargetRoot { path: second_target.clone(), ordinal: 2 }),
            None =>
                println!("{}", ColoredString::orange(
                    "Second target is enabled but no folder is configured; ignoring it.")),
        }
    }

    if args.debug {
        dbg!(&args);
    }

    print_banner(&args.cwd, &args.source_dir, &targets);

    if args.dry_run {
        run_preview(&args.source_dir);
        return;
    }

    if !args.silent && !confirm_start() {
        println!("Aborted.");
        return;
    }

    println!("Keys: p + Enter pauses or resumes, c + Enter cancels.");

    let control = Arc::new(RunControl::new());
    let sink = Arc::new(ConsoleSink { verbose: args.verbose });

    // The control thread maps console input to the run flags. It dies
    // with the process once the worker is done and main returns
    {
        let control = Arc::clone(&control);
        thread::spawn(move || control_loop(&control));
    }

    let worker = {
        let control = Arc::clone(&control);
        let sink = Arc::clone(&sink);
        let source_dir = args.source_dir.clone();
        let targets = targets.clone();
        thread::spawn(move || run_import(&source_dir, &targets, &control, sink.as_ref()))
    };

    match worker.join() {
        Ok(Ok(tally)) =>
            print_final_tally(&targets, &tally, control.is_cancelled()),
        Ok(Err(err)) => {
            println!("{}", ColoredString::red(
                format!("Import did not start: {}", err).as_str()));
            process::exit(1);
        }
        Err(_) => {
            println!("{}", ColoredString::red("The import worker stopped unexpectedly."));
            process::exit(1);
        }
    }
}

fn print_banner(cwd: &Path, source_dir: &Path, targets: &[TargetRoot]) {
    println!("====================================================================");
    println!("Current working directory is {}", cwd.display());
    println!("Source directory is {}", source_dir.display());
    for target in targets {
        println!("Target directory {} is {}", target.ordinal, target.path.display());
    }
    println!("====================================================================");
}

/// Scan, plan, and print the would-be layout without copying anything
fn run_preview(source_dir: &Path) {
    let files = scan_source_files(source_dir);
    if files.is_empty() {
        println!("{}", ColoredString::orange("No supported image files found."));
        return;
    }

    println!(
        "Found {} supported files ({})",
        files.len(),
        get_file_size_string(scan_size_on_disk(&files))
    );
    for (extension, count) in extension_summary(&files) {
        println!(" └── {}: {}", extension, count);
    }
    println!();

    let entries = preview_entries(&files, PREVIEW_LIMIT);
    println!("Planned layout for the first {} file(s):", entries.len());

    let name_width = entries
        .iter()
        .filter_map(|entry| entry.source.file_name().and_then(|os| os.to_str()))
        .map(|name| name.chars().count())
        .max()
        .unwrap_or(0) + 4;
    let dir_width = entries
        .iter()
        .map(|entry| entry.relative_dir.display().to_string().chars().count())
        .max()
        .unwrap_or(0) + 3;

    for entry in &entries {
        let file_name = entry
            .source
            .file_name()
            .and_then(|os| os.to_str())
            .unwrap_or("?")
            .to_string();
        let camera = format!("{} {}", entry.maker, entry.model);

        println!(
            " └── {} {} {}  {}",
            RightPadding::dot(file_name, name_width),
            RightPadding::space(entry.relative_dir.display().to_string(), dir_width),
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            camera.trim()
        );
    }
}

fn confirm_start() -> bool {
    print_progress(String::from("Start copying? [Y/n] "));

    let mut answer = String::new();
    match std::io::stdin().read_line(&mut answer) {
        Ok(_) => {
            let answer = answer.trim().to_lowercase();
            answer.is_empty() || answer == "y" || answer == "yes"
        }
        Err(_) => false,
    }
}

/// Map console input to the shared run flags until the run is over
fn control_loop(control: &RunControl) {
    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => return,
            Ok(_) => (),
        }

        match line.trim() {
            "p" => {
                if control.toggle_paused() {
                    println!("{}", ColoredString::orange("Paused. p + Enter resumes."));
                } else {
                    println!("Resuming.");
                }
            }
            "c" => {
                control.request_cancel();
                println!("{}", ColoredString::orange("Cancelling after the current file..."));
                return;
            }
            _ => (),
        }

        if !control.is_running() {
            return;
        }
    }
}

fn print_final_tally(targets: &[TargetRoot], tally: &ImportTally, cancelled: bool) {
    println!("====================================================================");
    if cancelled {
        println!("{}", ColoredString::orange(format!(
            "Import cancelled after {} of {} files.", tally.processed, tally.total).as_str()));
    }

    for (slot, target) in targets.iter().enumerate() {
        if let Some(target_tally) = tally.targets.get(slot) {
            println!(
                "Target {} ({}): copied {}, skipped {} duplicate(s), {} error(s)",
                target.ordinal,
                target.path.display(),
                target_tally.copied,
                target_tally.skipped,
                target_tally.errored
            );
        }
    }

    if tally.read_errors > 0 {
        println!("{}", ColoredString::red(format!(
            "{} file(s) could not be read at all", tally.read_errors).as_str()));
    }

    println!("{}", ColoredString::bold_white(format!(
        "Done. Copied: {}, Skipped: {}, Errors: {}",
        tally.copied(),
        tally.skipped(),
        tally.errored()).as_str()));
}
