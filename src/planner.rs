use std::fs::DirBuilder;
use std::path::{Path, PathBuf};

use crate::error::ImportError;
use crate::exif::CaptureInfo;

const DAY_DIR_FORMAT: &str = "%Y-%m-%d";
const NO_EXTENSION_DIR: &str = "UNKNOWN";

/// Long-form manufacturer names as they appear in Make tags, mapped to
/// the short form used for directory names. Matching is done on an
/// uppercased substring, so "OLYMPUS_CORPORATION", "OLYMPUS IMAGING
/// CORP." and plain "OLYMPUS" all collapse to "Olympus"
const MAKER_SHORT_FORMS: [(&str, &str); 6] = [
    ("OLYMPUS", "Olympus"),
    ("SONY", "Sony"),
    ("CANON", "Canon"),
    ("NIKON", "Nikon"),
    ("PANASONIC", "Panasonic"),
    ("FUJIFILM", "Fujifilm"),
];

/// The planned location of one source file inside a target root,
/// before any collision suffix is applied
#[derive(Debug)]
pub struct PlannedPath {
    pub file_path: PathBuf,
    /// Directory part relative to the target root
    pub relative_dir: PathBuf,
}

/// Collapse verbose Make values to the plain brand name, then replace
/// the characters which make for awkward directory names
pub fn normalize_maker(maker: &str) -> String {
    let upper = maker.to_uppercase();

    let collapsed = MAKER_SHORT_FORMS
        .iter()
        .find(|(long_form, _)| upper.contains(long_form))
        .map(|(_, short_form)| String::from(*short_form))
        .unwrap_or_else(|| String::from(maker));

    collapsed.replace(' ', "_").replace('.', "_")
}

/// Directory layout under a target root: four-digit year, day, maker,
/// uppercased extension. Files without an extension land in UNKNOWN
pub fn relative_dir(info: &CaptureInfo, source_path: &Path) -> PathBuf {
    let year = info.timestamp.format("%Y").to_string();
    let day = info.timestamp.format(DAY_DIR_FORMAT).to_string();
    let maker = normalize_maker(&info.maker);

    let extension_dir = source_path
        .extension()
        .and_then(|os| os.to_str())
        .map(|extension| extension.to_uppercase())
        .unwrap_or_else(|| String::from(NO_EXTENSION_DIR));

    [year, day, maker, extension_dir].iter().collect()
}

/// Derive the destination for one source file and make sure the
/// directory exists (created recursively, idempotent). The returned
/// file path still carries the source's base name unchanged; collision
/// suffixing happens at copy time against the live target state
pub fn plan_target_path(
    target_root: &Path,
    source_path: &Path,
    info: &CaptureInfo,
) -> Result<PlannedPath, ImportError> {
    let relative_dir = relative_dir(info, source_path);
    let target_dir = target_root.join(&relative_dir);

    DirBuilder::new()
        // create subdirs if necessary; don't return Err if the dir exists
        .recursive(true)
        .create(&target_dir)
        .map_err(|source| ImportError::CreateTargetDir {
            path: target_dir.clone(),
            source,
        })?;

    let file_name = source_path.file_name().unwrap_or_default();

    Ok(PlannedPath {
        file_path: target_dir.join(file_name),
        relative_dir,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn capture_info(maker: &str) -> CaptureInfo {
        CaptureInfo {
            timestamp: NaiveDate::from_ymd_opt(2023, 5, 17)
                .unwrap()
                .and_hms_opt(10, 22, 3)
                .unwrap(),
            maker: String::from(maker),
            model: String::new(),
        }
    }

    #[test]
    fn maker_long_forms_collapse() {
        assert_eq!(normalize_maker("OLYMPUS_CORPORATION"), "Olympus");
        assert_eq!(normalize_maker("OLYMPUS IMAGING CORP."), "Olympus");
        assert_eq!(normalize_maker("NIKON CORPORATION"), "Nikon");
        assert_eq!(normalize_maker("SONY"), "Sony");
    }

    #[test]
    fn unlisted_makers_only_get_cleaned() {
        assert_eq!(normalize_maker("My Weird.Cam"), "My_Weird_Cam");
        assert_eq!(normalize_maker("HUAWEI"), "HUAWEI");
        assert_eq!(normalize_maker("Unknown"), "Unknown");
    }

    #[test]
    fn layout_is_year_day_maker_extension() {
        let dir = relative_dir(
            &capture_info("OLYMPUS_CORPORATION"),
            Path::new("/sd/DCIM/100OLYMP/P1010001.ORF"),
        );
        assert_eq!(dir, PathBuf::from("2023/2023-05-17/Olympus/ORF"));
    }

    #[test]
    fn missing_extension_lands_in_unknown_dir() {
        let dir = relative_dir(&capture_info("Sony"), Path::new("/sd/scan0001"));
        assert_eq!(dir, PathBuf::from("2023/2023-05-17/Sony/UNKNOWN"));
    }

    #[test]
    fn planning_creates_the_directory() {
        let target_root = tempfile::tempdir().unwrap();
        let info = capture_info("OLYMPUS_CORPORATION");
        let source_path = Path::new("/sd/DCIM/100OLYMP/P1010001.ORF");

        let planned = plan_target_path(target_root.path(), source_path, &info).unwrap();

        let expected_dir = target_root.path().join("2023/2023-05-17/Olympus/ORF");
        assert!(expected_dir.is_dir());
        assert_eq!(planned.file_path, expected_dir.join("P1010001.ORF"));
        assert_eq!(planned.relative_dir, PathBuf::from("2023/2023-05-17/Olympus/ORF"));

        // Planning again is idempotent
        plan_target_path(target_root.path(), source_path, &info).unwrap();
    }
}
