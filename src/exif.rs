use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDateTime};
use exif::{In, Tag};
use rexif::ExifTag;

const REXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";
const KAMADAK_EXIF_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const UNKNOWN_MAKER: &str = "Unknown";

/// Capture metadata for a single source file.
///
/// All fields are always populated: a missing or unreadable tag
/// degrades to its fallback value instead of an error, so callers
/// never have to deal with absent data. The model may be empty
#[derive(Debug, Clone)]
pub struct CaptureInfo {
    pub timestamp: NaiveDateTime,
    pub maker: String,
    pub model: String,
}

/// Tag values as found in the file, before any fallback is applied
#[derive(Debug, Default)]
struct EmbeddedTags {
    date: Option<String>,
    maker: Option<String>,
    model: Option<String>,
}

impl EmbeddedTags {
    fn is_empty(&self) -> bool {
        self.date.is_none() && self.maker.is_none() && self.model.is_none()
    }
}

/// Read the capture timestamp and camera identity for one file.
///
/// Resolution order:
/// * timestamp: embedded capture date (two accepted formats), else the
///   file's last-modification time
/// * maker: embedded Make tag, else guessed from the file extension,
///   else "Unknown"
/// * model: embedded Model tag, else empty
pub fn read_capture_info(path: &Path) -> CaptureInfo {
    let tags = read_embedded_tags(path);

    let timestamp = tags.date
        .as_deref()
        .and_then(parse_exif_timestamp)
        .unwrap_or_else(|| modified_time_fallback(path));

    let maker = match tags.maker {
        Some(maker) if !maker.is_empty() => maker,
        _ => maker_from_extension(path),
    };

    let model = tags.model.unwrap_or_default();

    CaptureInfo { timestamp, maker, model }
}

/// Try the kamadak-exif reader first; when it rejects the container or
/// finds nothing, retry with rexif, which accepts some files the other
/// reader does not
fn read_embedded_tags(path: &Path) -> EmbeddedTags {
    match read_kamadak_tags(path) {
        Some(tags) if !tags.is_empty() => tags,
        _ => read_rexif_tags(path),
    }
}

fn read_kamadak_tags(path: &Path) -> Option<EmbeddedTags> {
    let file = File::open(path).ok()?;
    let mut bufreader = BufReader::new(&file);
    let exif = exif::Reader::new().read_from_container(&mut bufreader).ok()?;

    let mut tags = EmbeddedTags::default();

    tags.maker = exif
        .get_field(Tag::Make, In::PRIMARY)
        .map(|camera_make| clean_tag_value(&camera_make.display_value().to_string()));

    tags.model = exif
        .get_field(Tag::Model, In::PRIMARY)
        .map(|camera_model| clean_tag_value(&camera_model.display_value().to_string()));

    // EXIF:DateTimeOriginal: When the shutter was clicked.
    // Prefer this over DateTime, which is updated whenever photo
    // software touches the image or its metadata.
    // The display value of the string returned by kamadak-exif has the
    // format "YYYY-MM-DD HH:MM:SS"
    if let Some(date) = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY) {
        tags.date = Some(date.display_value().to_string());
    } else if let Some(date) = exif.get_field(Tag::DateTime, In::PRIMARY) {
        tags.date = Some(date.display_value().to_string());
    };

    Some(tags)
}

/// Parse the whole file through rexif's quiet buffer entry point,
/// which skips the warnings `rexif::parse_file` prints to stderr.
/// The date strings returned here have the standard EXIF format
/// "YYYY:MM:DD HH:MM:SS"
fn read_rexif_tags(path: &Path) -> EmbeddedTags {
    let mut tags = EmbeddedTags::default();

    let contents = match fs::read(path) {
        Ok(contents) => contents,
        Err(_) => return tags,
    };

    let (result, _warnings) = rexif::parse_buffer_quiet(&contents);
    if let Ok(exif) = result {
        for entry in &exif.entries {
            match entry.tag {
                ExifTag::Make => {
                    tags.maker = Some(clean_tag_value(&entry.value.to_string()))
                }

                ExifTag::Model => {
                    tags.model = Some(clean_tag_value(&entry.value.to_string()))
                }

                ExifTag::DateTimeOriginal => {
                    tags.date = Some(entry.value.to_string())
                }

                ExifTag::DateTime => {
                    // Only use this if DateTimeOriginal was not found
                    if tags.date.is_none() {
                        tags.date = Some(entry.value.to_string());
                    }
                }

                // Ignore other EXIF tags
                _ => (),
            }
        }
    }

    tags
}

// Some makes and models are retrieved with extra characters which
// require removal, e.g.: "HUAWEI CAN-L11", ""
// or: "ALLVIEW P5 camera              "  // <-- yes, lots of extra spaces
fn clean_tag_value(tag_value: &str) -> String {
    tag_value
        .replace('"', "")
        .replace(',', "")
        .trim()
        .to_string()
}

/// Parse an embedded date string against the two formats seen in the
/// wild: "YYYY:MM:DD HH:MM:SS" and "YYYY-MM-DD HH:MM:SS"
fn parse_exif_timestamp(date_str: &str) -> Option<NaiveDateTime> {
    [REXIF_DATE_FORMAT, KAMADAK_EXIF_DATE_FORMAT]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(date_str.trim(), format).ok())
}

/// The file's last-modification time as local naive time. When even
/// that cannot be read, fall back to the current time so the contract
/// of always returning a timestamp holds
fn modified_time_fallback(path: &Path) -> NaiveDateTime {
    let modified = fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .unwrap_or_else(|_| SystemTime::now());

    let datetime: DateTime<Local> = modified.into();
    datetime.naive_local()
}

/// Guess the manufacturer from the file extension when the file
/// carries no Make tag. Raw extensions are vendor specific, and the
/// plain photo formats default to the camera this tool grew up with
fn maker_from_extension(path: &Path) -> String {
    let extension = path
        .extension()
        .and_then(|os| os.to_str())
        .map(|s| s.to_lowercase());

    match extension.as_deref() {
        Some("arw") | Some("hif") => String::from("Sony"),
        Some("orf") | Some("jpg") | Some("jpeg") => String::from("Olympus"),
        _ => String::from(UNKNOWN_MAKER),
    }
}
