//! Output writer for report artifacts.
//!
//! Each selected format lands in its own file in the output directory:
//! - report.txt - plain-text report
//! - report.html - HTML report
//! - report.table.txt - console table
//! - summary.json - machine-readable summary

use std::path::{Path, PathBuf};

use fleet_fs::{Filesystem, FsError};
use fleet_reconciler::report::{ReportContext, ReportRenderer};
use fleet_reconciler::summary::Summary;
use thiserror::Error;

/// File name of the machine-readable summary.
pub const SUMMARY_FILE: &str = "summary.json";

/// Errors from output writing.
#[derive(Debug, Error)]
pub enum OutputWriterError {
    #[error("failed to create output directory: {0}")]
    CreateDir(#[source] FsError),

    #[error("failed to write {file}: {source}")]
    Write {
        file: String,
        #[source]
        source: FsError,
    },
}

/// Paths written by one run, in write order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenFiles {
    pub paths: Vec<PathBuf>,
}

/// Writes artifacts into a directory.
pub struct OutputWriter<'a, F: Filesystem> {
    fs: &'a F,
    out_dir: &'a Path,
}

impl<'a, F: Filesystem> OutputWriter<'a, F> {
    pub fn new(fs: &'a F, out_dir: &'a Path) -> Self {
        Self { fs, out_dir }
    }

    /// Ensure the output directory exists.
    pub fn ensure_dir(&self) -> Result<(), OutputWriterError> {
        if self.fs.exists(self.out_dir) {
            return Ok(());
        }
        self.fs
            .create_dir_all(self.out_dir)
            .map_err(OutputWriterError::CreateDir)
    }

    /// Write every rendering, then the summary if given.
    pub fn write_all(
        &self,
        ctx: &ReportContext<'_>,
        renderers: &[&dyn ReportRenderer],
        summary: Option<&Summary>,
    ) -> Result<WrittenFiles, OutputWriterError> {
        self.ensure_dir()?;

        let mut written = WrittenFiles::default();
        for renderer in renderers {
            written.paths.push(self.write_report(ctx, *renderer)?);
        }
        if let Some(summary) = summary {
            written.paths.push(self.write_summary(summary)?);
        }
        Ok(written)
    }

    /// Render one report into its file.
    pub fn write_report(
        &self,
        ctx: &ReportContext<'_>,
        renderer: &dyn ReportRenderer,
    ) -> Result<PathBuf, OutputWriterError> {
        self.write(renderer.file_name(), &renderer.render(ctx))
    }

    /// Write summary.json.
    pub fn write_summary(&self, summary: &Summary) -> Result<PathBuf, OutputWriterError> {
        self.write(SUMMARY_FILE, &summary.to_json())
    }

    fn write(&self, file: &str, content: &str) -> Result<PathBuf, OutputWriterError> {
        let path = self.out_dir.join(file);
        self.fs
            .write_atomic(&path, content.as_bytes())
            .map_err(|source| OutputWriterError::Write {
                file: file.to_string(),
                source,
            })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_fs::MockFilesystem;
    use fleet_reconciler::summary::summarize;
    use fleet_reconciler::{Clock, HtmlRenderer, MockClock, Reconciliation, TextRenderer};

    fn context(reconciliation: &Reconciliation) -> ReportContext<'_> {
        ReportContext::new(reconciliation, "reg.csv", "inv.yaml", MockClock::from_unix(0).now())
    }

    #[test]
    fn test_write_all_creates_files() {
        let fs = MockFilesystem::new();
        let out = Path::new("/out/run1");
        let reconciliation = Reconciliation::default();
        let ctx = context(&reconciliation);
        let summary = summarize(&ctx);
        let renderers: [&dyn ReportRenderer; 2] = [&TextRenderer, &HtmlRenderer];

        let written = OutputWriter::new(&fs, out)
            .write_all(&ctx, &renderers, Some(&summary))
            .unwrap();

        assert_eq!(
            written.paths,
            vec![
                out.join("report.txt"),
                out.join("report.html"),
                out.join("summary.json"),
            ]
        );
        assert!(fs.exists(out));
        let text = fs.get_text(&out.join("report.txt")).unwrap();
        assert!(text.contains("CLEAN"));
        let json = fs.get_text(&out.join("summary.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["clean"], true);
    }

    #[test]
    fn test_write_all_without_summary() {
        let fs = MockFilesystem::new();
        let reconciliation = Reconciliation::default();
        let renderers: [&dyn ReportRenderer; 1] = [&TextRenderer];
        let written = OutputWriter::new(&fs, Path::new("/out"))
            .write_all(&context(&reconciliation), &renderers, None)
            .unwrap();
        assert_eq!(written.paths.len(), 1);
        assert!(fs.get_file(Path::new("/out/summary.json")).is_none());
    }

    #[test]
    fn test_write_all_into_existing_dir() {
        let fs = MockFilesystem::new();
        fs.create_dir_all(Path::new("/out")).unwrap();
        fs.add_file("/out/notes.txt", "keep");
        let reconciliation = Reconciliation::default();
        let renderers: [&dyn ReportRenderer; 1] = [&TextRenderer];

        OutputWriter::new(&fs, Path::new("/out"))
            .write_all(&context(&reconciliation), &renderers, None)
            .unwrap();
        assert_eq!(fs.get_text(Path::new("/out/notes.txt")).as_deref(), Some("keep"));
        assert!(fs.exists(Path::new("/out/report.txt")));
    }

    #[test]
    fn test_write_real_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports");
        let fs = fleet_fs::RealFilesystem;
        let reconciliation = Reconciliation::default();
        let renderers: [&dyn ReportRenderer; 1] = [&HtmlRenderer];

        OutputWriter::new(&fs, &out)
            .write_all(&context(&reconciliation), &renderers, None)
            .unwrap();
        let html = std::fs::read_to_string(out.join("report.html")).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
    }
}
