use std::path::{Path, PathBuf};
use std::{env, fs};

use toml::Value;

use crate::utils::*;

// Config defaults
const DEFAULT_SECOND_TARGET_ENABLED: bool = false;
const DEFAULT_DRY_RUN: bool = false;
const DEFAULT_SILENT: bool = false;
const DEFAULT_VERBOSE: bool = false;

// Unexposed defaults
const DBG_ON: bool = false;

pub const DEFAULT_CONFIG_FILE: &str = "fotoimport.toml";

/// Extensions of files eligible for import, lowercase. Common photo
/// formats plus the raw formats written by the cameras this tool is
/// pointed at
pub const SUPPORTED_EXTENSIONS: [&str; 12] = [
    "jpg", "jpeg", "png",
    "cr2", "cr3", "nef", "arw",
    "rw2", "orf", "raf", "dng",
    "hif",
];

pub fn is_supported_extension(extension: &str) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension.to_lowercase().as_str())
}

pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|os| os.to_str())
        .map_or(false, is_supported_extension)
}

#[derive(Debug)]
pub struct Args {
    /// The directory where new images are read from, typically the
    /// mount point of a memory card.
    /// If not provided, the current working dir will be used
    pub source_dir: PathBuf,

    /// Set to true only if we received a source_dir from the CLI
    /// Not exposed in config, only used during config parsing
    using_cli_source: bool,

    /// The primary folder tree receiving organized copies. Mandatory:
    /// a run will not start without it
    pub target_dir: Option<PathBuf>,

    /// An optional second target tree, e.g. a NAS mount, receiving
    /// its own independent set of copies
    pub second_target_dir: Option<PathBuf>,

    /// Whether the second target receives copies too
    pub second_target_enabled: bool,

    /// Scan and plan only; print the planned layout and copy nothing
    pub dry_run: bool,

    /// Whether to skip the confirmation prompt before copying
    pub silent: bool,

    /// Whether to print additional information during processing
    pub verbose: bool,

    /// Whether to print much more additional information during processing
    /// Not exposed in config, for dev-only
    pub debug: bool,

    /// The current working directory
    pub cwd: PathBuf,
}

impl Args {
    /// Simple constructor using defaults: the CWD is the source
    /// directory and no targets are set
    pub fn new() -> Result<Args, std::io::Error> {
        let cwd = env::current_dir()?;

        Ok(Args {
            source_dir: cwd.clone(),
            using_cli_source: false,
            target_dir: None,
            second_target_dir: None,
            second_target_enabled: DEFAULT_SECOND_TARGET_ENABLED,
            dry_run: DEFAULT_DRY_RUN,
            silent: DEFAULT_SILENT,
            verbose: DEFAULT_VERBOSE,
            debug: DBG_ON,
            cwd,
        })
    }

    /// Read the configuration file, falling back to preset defaults for
    /// any key that is missing or invalid. The config file is read from
    /// the executable location if present, otherwise from the relative
    /// path (which should only work for debug builds in an IDE).
    /// A source path received over the CLI overrides the configured one
    pub fn new_from_toml(config_file: &str) -> Result<Args, std::io::Error> {
        let mut args = Args::new()?;

        // Temporarily store missing keys and other errors so we can print them
        // once we've checked all config values and determined verbosity option
        let mut verbose_messages: Vec<String> = Vec::new();
        let mut missing_vals: Vec<String> = Vec::new();

        let (config_file_path, message) = get_config_file_path(config_file);
        verbose_messages.push(message);

        // The program can receive a source path from the CLI, either a path
        // directly provided by the user or the current working directory from
        // the system when launched from a file manager context menu.
        // If we receive one, toggle the [using_cli_source] flag to skip
        // reading the source value from config
        if let Some(cli_source) = get_cli_source_path() {
            let cli_path = PathBuf::from(&cli_source);
            if cli_path.is_dir() {
                println!("Using source path at: {}", &cli_source);
                args.source_dir = cli_path;
                args.using_cli_source = true;
            } else {
                verbose_messages.push(ColoredString::orange(
                    format!("User provided path is not valid: {}", &cli_source).as_str()));
            }
        }

        type TomlMap = toml::map::Map<String, toml::Value>;

        fn get_boolean_value(toml_table: &TomlMap, key: &str, missing_vals: &mut Vec<String>) -> Option<bool> {
            let bool_opt = toml_table
                .get(key)
                .and_then(|toml_value| toml_value.as_bool());

            if bool_opt.is_none() { missing_vals.push(String::from(key)) };
            bool_opt
        }

        // Same as [get_boolean_value], but don't print if missing.
        // Used for unexposed config values
        fn get_boolean_value_silent(toml_table: &TomlMap, key: &str) -> Option<bool> {
            toml_table
                .get(key)
                .and_then(|toml_value| toml_value.as_bool())
        }

        fn get_string_value(toml_table: &TomlMap, key: &str, missing_vals: &mut Vec<String>) -> Option<String> {
            let string_opt = toml_table
                .get(key)
                .and_then(|toml_value| toml_value.as_str())
                .filter(|s| !s.is_empty())
                .map(String::from);

            if string_opt.is_none() { missing_vals.push(String::from(key)) };
            string_opt
        }

        match fs::read_to_string(&config_file_path) {
            Ok(file_contents) => {
                println!("Using config file at: {}", &config_file_path.display().to_string());
                match file_contents.parse::<Value>() {
                    Ok(raw_toml) => {
                        match raw_toml.as_table() {
                            Some(toml_content) => {

                                /* --- Parse source/target folders --- */

                                match toml_content.get("folders") {
                                    Some(folders_opt) => {
                                        if let Some(folders) = folders_opt.as_table() {

                                            // Use the config source path only if we didn't receive a CLI override
                                            if !args.using_cli_source {
                                                if let Some(source_dir) = get_string_value(folders, "source_dir", &mut missing_vals) {
                                                    let source_path = PathBuf::from(&source_dir);
                                                    if source_path.is_dir() {
                                                        args.source_dir = source_path;
                                                    } else {
                                                        println!("{}", ColoredString::orange(format!(
                                                            "Configured source folder is not a directory: {}", source_dir).as_str()));
                                                        println!("Using current working directory for now: {}", args.source_dir.display());
                                                    }
                                                }
                                            } // end if !args.using_cli_source

                                            if let Some(target_dir) = get_string_value(folders, "target_dir", &mut missing_vals) {
                                                args.target_dir = Some(PathBuf::from(target_dir));
                                            }

                                            if let Some(second_target_dir) = get_string_value(folders, "second_target_dir", &mut missing_vals) {
                                                args.second_target_dir = Some(PathBuf::from(second_target_dir));
                                            }
                                        } // end if let Some(folders)
                                    } // end Some(folders_opt)
                                    None =>
                                        missing_vals.push(String::from("folders"))
                                } // end config folders

                                /* --- Parse options --- */

                                match toml_content.get("options") {
                                    Some(options_opt) => {
                                        if let Some(options) = options_opt.as_table() {

                                            // Not exposed in config; use for dev only
                                            // debug = true
                                            if let Some(debug_on) = get_boolean_value_silent(options, "debug") {
                                                args.debug = debug_on;
                                                args.verbose = debug_on;
                                            } else if let Some(verbose) = get_boolean_value(options, "verbose", &mut missing_vals) {
                                                args.verbose = verbose;
                                            }

                                            if let Some(second_target_enabled) = get_boolean_value(options, "second_target_enabled", &mut missing_vals) {
                                                args.second_target_enabled = second_target_enabled;
                                            }

                                            if let Some(dry_run) = get_boolean_value(options, "dry_run", &mut missing_vals) {
                                                args.dry_run = dry_run;
                                            }

                                            if let Some(silent) = get_boolean_value(options, "silent", &mut missing_vals) {
                                                args.silent = silent;
                                            }
                                        }
                                    }
                                    None =>
                                        missing_vals.push(String::from("options")),
                                } // end config options
                            }
                            None => {
                                println!("Could not parse TOML into a key-value object");
                            }
                        } // end reading raw toml data
                    }
                    Err(err) => {
                        println!("{}", ColoredString::red(format!("Error: {}", err).as_str()));
                        println!("{}", ColoredString::red(
                            "Could not parse config file, continuing with defaults."));
                    }
                } // end reading config file contents
            }
            Err(e) => {
                println!("{}", ColoredString::orange(format!(
                        "Could not read config file at {}. Continuing with defaults.",
                        &config_file_path.display().to_string())
                    .as_str()));
                if args.verbose {
                    eprintln!("{}", e);
                }
            }
        };

        // Print missing and invalid values
        if args.verbose {
            verbose_messages.iter().for_each(|message|
                println!("{} {}", ColoredString::warn_arrow(), message)
            );

            missing_vals.iter().for_each(|key|
                println!("> Config key '{}' is empty, invalid or missing. Using preset default.", key)
            );
        }

        Ok(args)
    }
}

fn get_config_file_path(config_file_name: &str) -> (PathBuf, String) {
    let cfg_relative_path = PathBuf::from(config_file_name);

    match get_program_executable_path() {
        Ok(path) => {
            let config_path = path.join(config_file_name);
            if config_path.exists() {
                let message = format!("Found config file at: {}", &path.display().to_string());
                (config_path, message)
            } else {
                let message = ColoredString::orange(format!(
                    "Trying relative path. Config file not found at: {}.", &path.display().to_string()).as_str());
                (cfg_relative_path, message)
            }
        }
        Err(path_reading_err) => {
            (cfg_relative_path, path_reading_err)
        }
    }
}

fn get_cli_source_path() -> Option<String> {
    let cli_args: Vec<String> = env::args().collect();

    cli_args
        .get(1)
        .cloned()
}

fn get_program_executable_path() -> Result<PathBuf, String> {
    match std::env::current_exe() {
        Ok(executable_path) => {
            match executable_path.parent() {
                Some(path) =>
                    Ok(path.to_path_buf()),
                None => {
                    Err(ColoredString::red("Could not extract program path."))
                }
            }
        },
        Err(e) => {
            eprintln!("{}", e);
            Err(ColoredString::red("Could not read path for program executable."))
        },
    }
}
