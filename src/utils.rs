use std::io::Write;

pub struct ColoredString;

/// Provides static methods for formatting colored text based on ANSI codes
/// Taken from the following SO answers:
/// * [https://stackoverflow.com/questions/69981449/how-do-i-print-colored-text-to-the-terminal-in-rust]
/// * [https://stackoverflow.com/questions/287871/how-to-print-colored-text-to-the-terminal/287944#287944]
impl ColoredString {

    // Color codes:
    // * GREEN     = '\x1b[92m'
    // * ORANGE    = '\x1b[93m'
    // * RED       = '\x1b[91m'
    // * NO_COLOR  = '\x1b[0m'
    // * BOLD      = '\x1b[1m'

    pub fn green(s: &str) -> String { format!("\x1b[92m{}\x1b[0m", s) }
    pub fn red(s: &str) -> String { format!("\x1b[91m{}\x1b[0m", s) }
    pub fn orange(s: &str) -> String { format!("\x1b[93m{}\x1b[0m", s) }
    pub fn bold_white(s: &str) -> String { format!("\x1b[1m{}\x1b[0m", s) }

    pub fn warn_arrow() -> String { Self::orange(">") }
}

pub struct RightPadding;

impl RightPadding {
    pub fn space(str: String, pad_width: usize) -> String {
        format!("{:<width$}", str, width=pad_width)
    }

    pub fn dot(str: String, pad_width: usize) -> String {
        format!("{:.<width$}", str, width=pad_width)
    }
}

/// Print without a trailing newline so a following `\r` can overwrite
/// the line, as used for the single-line progress display
pub fn print_progress(msg: String) {
    print!("{}", msg);
    let _ = std::io::stdout().flush();
}

/// Convert bytes to an appropriate multiple (MB or GB) and append its unit
pub fn get_file_size_string(filesize: u64) -> String {
    match filesize {
        size if size == 0 =>
            String::from("unknown"),
        size if size < 1024u64.pow(3) =>
            format!("{:.2} MB", (size as f64 / 1024u64.pow(2) as f64)),
        size =>
            format!("{:.2} GB", (size as f64 / 1024u64.pow(3) as f64))
    }
}
