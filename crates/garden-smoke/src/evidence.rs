//! Evidence capture: viewport screenshots written for human review.

use crate::result::SmokeResult;
use crate::view::View;
use console::Term;
use std::path::{Path, PathBuf};

/// Image extension for evidence files
pub const EVIDENCE_EXTENSION: &str = "png";

/// Writes `<output_dir>/<name>.png` snapshots of a view
#[derive(Debug, Clone)]
pub struct EvidenceCapturer {
    output_dir: PathBuf,
    echo: bool,
}

impl EvidenceCapturer {
    /// Create a capturer writing into `output_dir`
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            echo: true,
        }
    }

    /// Enable or disable the `screenshot -> path` line
    #[must_use]
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Destination directory
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path a named snapshot is written to
    #[must_use]
    pub fn evidence_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{name}.{EVIDENCE_EXTENSION}"))
    }

    /// Snapshot the visible viewport of `view` as `name`.
    ///
    /// The output directory is created on demand; an existing directory is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the screenshot fails or the file cannot be written
    pub async fn capture(&self, view: &dyn View, name: &str) -> SmokeResult<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let bytes = view.screenshot().await?;
        let path = self.evidence_path(name);
        tokio::fs::write(&path, &bytes).await?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "evidence written");
        if self.echo {
            let _ = Term::stdout().write_line(&format!("         screenshot -> {}", path.display()));
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockPage, MockView};
    use crate::result::SmokeError;

    fn view() -> MockView {
        let mut view = MockView::new("http://garden.test").with_page("/posts", MockPage::new());
        view.set_current("/posts");
        view
    }

    #[test]
    fn test_evidence_path() {
        let capturer = EvidenceCapturer::new("shots");
        assert_eq!(
            capturer.evidence_path("03_posts_page"),
            PathBuf::from("shots/03_posts_page.png")
        );
    }

    #[tokio::test]
    async fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("shots");
        let capturer = EvidenceCapturer::new(&out).with_echo(false);

        let path = capturer.capture(&view(), "01_welcome").await.unwrap();

        assert_eq!(path, out.join("01_welcome.png"));
        assert!(path.exists());
        assert!(std::fs::read(&path).unwrap().starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[tokio::test]
    async fn test_existing_directory_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let capturer = EvidenceCapturer::new(dir.path()).with_echo(false);
        capturer.capture(&view(), "a").await.unwrap();
        capturer.capture(&view(), "b").await.unwrap();
        assert!(dir.path().join("a.png").exists());
        assert!(dir.path().join("b.png").exists());
    }

    #[tokio::test]
    async fn test_unwritable_destination_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let capturer = EvidenceCapturer::new(blocker.join("shots")).with_echo(false);

        let err = capturer.capture(&view(), "x").await.unwrap_err();
        assert!(matches!(err, SmokeError::Io(_)));
    }
}
