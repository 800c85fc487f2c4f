//! Image captions
//!
//! A caption is the image's file stem with `_` and `-` read as spaces,
//! followed by the file's modification time.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};

use crate::error::{Error, Result};

/// Timestamp layout used in captions
pub const CAPTION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Human-readable name for an image file
pub fn image_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace(['_', '-'], " "))
        .unwrap_or_default()
}

/// Caption for an image on disk. The file must exist.
pub fn image_caption(path: &Path) -> Result<String> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => metadata,
        _ => return Err(Error::ImageNotFound(path.to_path_buf())),
    };
    let modified: DateTime<Local> = metadata.modified()?.into();
    Ok(format!(
        "{}: {}",
        image_name(path),
        modified.format(CAPTION_TIME_FORMAT)
    ))
}

/// Write a markdown image on its own line.
///
/// `reference` is written as it appears in the document; `path` is where
/// the file is looked up.
pub fn write_image<W: Write + ?Sized>(out: &mut W, reference: &str, path: &Path) -> Result<()> {
    let caption = image_caption(path)?;
    write!(out, "\n![{}]({})\n", caption, reference)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_name() {
        assert_eq!(image_name(Path::new("art/Giant_silhouette-2.png")), "Giant silhouette 2");
        assert_eq!(image_name(Path::new("cover")), "cover");
        assert_eq!(image_name(Path::new("")), "");
    }

    #[test]
    fn test_caption_has_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map_of-town.jpg");
        std::fs::write(&path, b"jpg").unwrap();

        let caption = image_caption(&path).unwrap();
        let (name, time) = caption.split_once(": ").unwrap();
        assert_eq!(name, "map of town");
        assert!(chrono::NaiveDateTime::parse_from_str(time, CAPTION_TIME_FORMAT).is_ok());
    }

    #[test]
    fn test_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.png");
        match image_caption(&path) {
            Err(Error::ImageNotFound(p)) => assert_eq!(p, path),
            other => panic!("unexpected result: {:?}", other),
        }
        // A directory is not an image either
        assert!(matches!(image_caption(dir.path()), Err(Error::ImageNotFound(_))));
    }

    #[test]
    fn test_write_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, b"png").unwrap();

        let mut out = Vec::new();
        write_image(&mut out, "a.png", &path).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\n![a: "));
        assert!(text.ends_with("](a.png)\n"));
    }
}
