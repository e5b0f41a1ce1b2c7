//! Filesystem trait with real and in-memory implementations.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use thiserror::Error;

/// Errors from filesystem operations.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("path error: {0}")]
    Path(String),
}

impl FsError {
    /// True when the underlying error is a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::Io(e) if e.kind() == io::ErrorKind::NotFound)
    }
}

/// Trait for filesystem operations.
/// Abstracted so command orchestration can be tested without touching disk.
pub trait Filesystem: Send + Sync {
    /// Write data atomically to a path (write to temp, then rename).
    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), FsError>;

    /// Read file contents as a string.
    fn read_file(&self, path: &Path) -> Result<String, FsError>;

    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and parents if needed.
    fn create_dir_all(&self, path: &Path) -> Result<(), FsError>;
}

/// Real filesystem implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFilesystem;

impl Filesystem for RealFilesystem {
    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| FsError::Path(format!("not a file path: {}", path.display())))?;

        // Sibling temp file so the rename stays on one filesystem
        let mut temp_name = file_name.to_os_string();
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);

        fs::write(&temp_path, data)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    fn read_file(&self, path: &Path) -> Result<String, FsError> {
        Ok(fs::read_to_string(path)?)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
        fs::create_dir_all(path)?;
        Ok(())
    }
}

/// Mock filesystem for testing.
/// Cloning creates a new handle to the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct MockFilesystem {
    files: Arc<RwLock<HashMap<PathBuf, Vec<u8>>>>,
    dirs: Arc<RwLock<HashSet<PathBuf>>>,
}

impl MockFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all files in the mock filesystem.
    pub fn files(&self) -> HashMap<PathBuf, Vec<u8>> {
        self.files.read().unwrap().clone()
    }

    /// Get content of a specific file.
    pub fn get_file(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.read().unwrap().get(path).cloned()
    }

    /// Get content of a specific file as UTF-8 text.
    pub fn get_text(&self, path: &Path) -> Option<String> {
        self.get_file(path)
            .map(|data| String::from_utf8_lossy(&data).into_owned())
    }

    /// Add a file directly (for test setup).
    pub fn add_file(&self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        self.files.write().unwrap().insert(path.into(), data.into());
    }
}

impl Filesystem for MockFilesystem {
    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        self.files
            .write()
            .unwrap()
            .insert(path.to_path_buf(), data.to_vec());
        Ok(())
    }

    fn read_file(&self, path: &Path) -> Result<String, FsError> {
        let files = self.files.read().unwrap();
        match files.get(path) {
            Some(data) => String::from_utf8(data.clone())
                .map_err(|e| FsError::Path(format!("invalid utf8: {}", e))),
            None => Err(FsError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {}", path.display()),
            ))),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path) || self.dirs.read().unwrap().contains(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
        let mut dirs = self.dirs.write().unwrap();
        for ancestor in path.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                dirs.insert(ancestor.to_path_buf());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // ===========================================
    // MockFilesystem Tests
    // ===========================================

    #[test]
    fn test_mock_write_atomic() {
        let fs = MockFilesystem::new();
        let path = PathBuf::from("/out/report.txt");

        fs.write_atomic(&path, b"hello").unwrap();

        assert_eq!(fs.get_file(&path), Some(b"hello".to_vec()));
    }

    #[test]
    fn test_mock_write_atomic_overwrites() {
        let fs = MockFilesystem::new();
        let path = PathBuf::from("/out/report.txt");

        fs.write_atomic(&path, b"first").unwrap();
        fs.write_atomic(&path, b"second").unwrap();

        assert_eq!(fs.get_text(&path).as_deref(), Some("second"));
    }

    #[test]
    fn test_mock_read_file() {
        let fs = MockFilesystem::new();
        fs.add_file("/in/registry.csv", "s1,cell1,dev\n");

        let content = fs.read_file(Path::new("/in/registry.csv")).unwrap();
        assert_eq!(content, "s1,cell1,dev\n");
    }

    #[test]
    fn test_mock_read_file_not_found() {
        let fs = MockFilesystem::new();
        let err = fs.read_file(Path::new("/missing.yaml")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_mock_read_file_invalid_utf8() {
        let fs = MockFilesystem::new();
        fs.add_file("/bin.dat", vec![0xff, 0xfe]);

        let err = fs.read_file(Path::new("/bin.dat")).unwrap_err();
        assert!(matches!(err, FsError::Path(_)));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_mock_exists() {
        let fs = MockFilesystem::new();
        fs.add_file("/in/inventory.yaml", "all: {}");
        fs.create_dir_all(Path::new("/out/reports")).unwrap();

        assert!(fs.exists(Path::new("/in/inventory.yaml")));
        assert!(fs.exists(Path::new("/out/reports")));
        assert!(fs.exists(Path::new("/out")));
        assert!(!fs.exists(Path::new("/nope")));
    }

    #[test]
    fn test_mock_clone_shares_state() {
        let fs = MockFilesystem::new();
        let handle = fs.clone();
        handle.add_file("/a", "x");
        assert!(fs.exists(Path::new("/a")));
    }

    // ===========================================
    // RealFilesystem Tests
    // ===========================================

    #[test]
    fn test_real_write_atomic_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let fs = RealFilesystem;

        fs.write_atomic(&path, b"{}").unwrap();

        assert_eq!(fs.read_file(&path).unwrap(), "{}");
        assert!(!dir.path().join("summary.json.tmp").exists());
    }

    #[test]
    fn test_real_write_atomic_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.txt");
        let fs = RealFilesystem;

        fs.write_atomic(&path, b"old").unwrap();
        fs.write_atomic(&path, b"new").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_real_create_dir_all_and_exists() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let fs = RealFilesystem;

        assert!(!fs.exists(&nested));
        fs.create_dir_all(&nested).unwrap();
        assert!(fs.exists(&nested));
    }

    #[test]
    fn test_real_read_missing_file() {
        let dir = tempdir().unwrap();
        let err = RealFilesystem.read_file(&dir.path().join("nope")).unwrap_err();
        assert!(err.is_not_found());
    }
}
