//! Scribus project files
//!
//! Loads an `.sla` file from disk and keeps its path, so relative image
//! references resolve against the project directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::LayoutConfig;
use crate::core::{decode_source, Lexer, ProgressCallback};
use crate::dom::{Document, NodeRecord};
use crate::error::Result;

/// A parsed project file
#[derive(Debug)]
pub struct ScribusProject {
    path: PathBuf,
    document: Document,
    config: LayoutConfig,
}

impl ScribusProject {
    /// Open with the default Scribus configuration
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, LayoutConfig::default())
    }

    /// Open with a custom configuration.
    ///
    /// If `config.dump.image_base` is unset it becomes the project's directory.
    pub fn open_with(path: impl AsRef<Path>, config: LayoutConfig) -> Result<Self> {
        Self::open_inner(path.as_ref(), config, None)
    }

    /// Open with a custom configuration, reporting lexing progress
    pub fn open_with_progress(
        path: impl AsRef<Path>,
        config: LayoutConfig,
        progress: ProgressCallback,
    ) -> Result<Self> {
        Self::open_inner(path.as_ref(), config, Some(progress))
    }

    fn open_inner(
        path: &Path,
        mut config: LayoutConfig,
        progress: Option<ProgressCallback>,
    ) -> Result<Self> {
        if config.dump.image_base.is_none() {
            config.dump.image_base = path.parent().map(Path::to_path_buf);
        }
        let document = Self::load(path, &config, progress)?;
        Ok(ScribusProject {
            path: path.to_path_buf(),
            document,
            config,
        })
    }

    fn load(
        path: &Path,
        config: &LayoutConfig,
        progress: Option<ProgressCallback>,
    ) -> Result<Document> {
        log::info!("Loading {}", path.display());
        let bytes = std::fs::read(path)?;
        let mut lexer = Lexer::new(decode_source(&bytes)?, config.lexer);
        if let Some(progress) = progress {
            lexer = lexer.with_progress(progress);
        }
        let document = Document::from_lexer(lexer)?;
        let (elements, texts, comments) = document.kind_counts();
        log::debug!(
            "{}: {} elements, {} text nodes, {} comments",
            path.display(),
            elements,
            texts,
            comments
        );
        Ok(document)
    }

    /// Parse the file again, dropping edits and collected pages
    pub fn reload(&mut self) -> Result<()> {
        self.document = Self::load(&self.path, &self.config, None)?;
        Ok(())
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[inline]
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    #[inline]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Title of the document body, if any
    pub fn title(&self) -> Option<&str> {
        self.document.title(&self.config.geometry)
    }

    pub fn to_record(&self, include_locations: bool) -> NodeRecord {
        self.document.to_record(include_locations)
    }

    /// Spatially sorted text dump. Returns the number of pages written.
    pub fn dump_text<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<usize> {
        self.document.dump_text(out, &self.config)
    }

    /// Text dump in document order
    pub fn dump_text_unsorted<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        self.document.dump_text_unsorted(out, &self.config)
    }

    /// Write the sorted dump to `destination`.
    ///
    /// The text goes to a temporary file in the same directory first, so an
    /// error leaves any existing file untouched.
    pub fn dump_to_file(&mut self, destination: impl AsRef<Path>) -> Result<usize> {
        let destination = destination.as_ref();
        let dir = match destination.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        let count = {
            let mut out = std::io::BufWriter::new(file.as_file_mut());
            let count = self.dump_text(&mut out)?;
            out.flush()?;
            count
        };
        file.persist(destination).map_err(|e| e.error)?;
        log::info!("Wrote {} pages to {}", count, destination.display());
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const PROJECT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<SCRIBUSUTF8NEW Version="1.5.8">
    <DOCUMENT TITLE="Atlas" PAGEWIDTH="200" BORDERLEFT="0" BORDERRIGHT="0">
        <PAGEOBJECT OwnPage="0" XPOS="0" YPOS="0" WIDTH="200" PFILE="images/cover_art.png"/>
        <PAGEOBJECT OwnPage="0" XPOS="0" YPOS="50" WIDTH="90">
            <StoryText>
                <ITEXT CH="Welcome"/>
            </StoryText>
        </PAGEOBJECT>
    </DOCUMENT>
</SCRIBUSUTF8NEW>
"#;

    fn write_project(dir: &Path) -> PathBuf {
        std::fs::create_dir(dir.join("images")).unwrap();
        std::fs::write(dir.join("images/cover_art.png"), b"png").unwrap();
        let path = dir.join("atlas.sla");
        std::fs::write(&path, PROJECT).unwrap();
        path
    }

    #[test]
    fn test_open_resolves_images_next_to_project() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_project(dir.path());

        let mut project = ScribusProject::open(&path).unwrap();
        assert_eq!(project.path(), path);
        assert_eq!(project.title(), Some("Atlas"));
        assert_eq!(project.config().dump.image_base.as_deref(), Some(dir.path()));

        let mut out = Vec::new();
        assert_eq!(project.dump_text(&mut out).unwrap(), 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("![cover art: "));
        assert!(text.contains("](images/cover_art.png)\n"));
        assert!(text.find("cover art").unwrap() < text.find("Welcome").unwrap());
    }

    #[test]
    fn test_reload_resets_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_project(dir.path());

        let mut project = ScribusProject::open(&path).unwrap();
        project.dump_text(&mut Vec::new()).unwrap();
        assert!(matches!(
            project.dump_text(&mut Vec::new()),
            Err(Error::PagesAlreadyCollected)
        ));
        project.reload().unwrap();
        assert!(project.dump_text(&mut Vec::new()).is_ok());
    }

    #[test]
    fn test_dump_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_project(dir.path());
        let output = dir.path().join("atlas.md");

        let mut project = ScribusProject::open(&path).unwrap();
        assert_eq!(project.dump_to_file(&output).unwrap(), 1);
        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("\n\n# Atlas\n"));
    }

    #[test]
    fn test_failed_dump_keeps_old_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_project(dir.path());
        std::fs::remove_file(dir.path().join("images/cover_art.png")).unwrap();
        let output = dir.path().join("atlas.md");
        std::fs::write(&output, "old").unwrap();

        let mut project = ScribusProject::open(&path).unwrap();
        assert!(matches!(project.dump_to_file(&output), Err(Error::ImageNotFound(_))));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "old");
    }

    #[test]
    fn test_open_utf16() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.sla");
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "<SCRIBUSUTF8NEW><DOCUMENT TITLE=\"Wide\"/></SCRIBUSUTF8NEW>".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        std::fs::write(&path, bytes).unwrap();

        let project = ScribusProject::open(&path).unwrap();
        assert_eq!(project.title(), Some("Wide"));
    }

    #[test]
    fn test_progress_reaches_end() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let dir = tempfile::tempdir().unwrap();
        let path = write_project(dir.path());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        ScribusProject::open_with_progress(
            &path,
            LayoutConfig::default(),
            Box::new(move |ratio| sink.borrow_mut().push(ratio)),
        )
        .unwrap();
        let seen = seen.borrow();
        assert_eq!(seen.last(), Some(&1.0));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScribusProject::open(dir.path().join("none.sla")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
