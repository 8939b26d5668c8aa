use glob::{MatchOptions, Pattern};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/*
 * This module provides the raw file system reads the rest of the core depends on:
 * listing the immediate subdirectories of a folder, listing the files of a folder
 * that match a name pattern, and checking whether a folder or file exists. It
 * defines errors specific to these operations, a trait `FileSystemReaderOperations`
 * so the indexer and the selection dispatcher can be exercised against mocks, and
 * the concrete `CoreFileSystemReader` built on `walkdir` and `glob`.
 */

/*
 * Defines custom error types for file system operations.
 * `Io` carries the underlying error so callers can tell a permission problem
 * (which the indexer tolerates) from every other failure.
 */
#[derive(Debug)]
pub enum FileSystemError {
    Io(io::Error),
    InvalidPath(PathBuf),
    InvalidPattern(String),
}

impl FileSystemError {
    /* True when the operating system refused access to the entry being listed. */
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, FileSystemError::Io(e) if e.kind() == io::ErrorKind::PermissionDenied)
    }
}

impl From<io::Error> for FileSystemError {
    fn from(err: io::Error) -> Self {
        FileSystemError::Io(err)
    }
}

impl From<walkdir::Error> for FileSystemError {
    fn from(err: walkdir::Error) -> Self {
        // walkdir keeps the io::ErrorKind of the underlying failure when converting.
        FileSystemError::Io(err.into())
    }
}

impl std::fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileSystemError::Io(e) => write!(f, "I/O error: {e}"),
            FileSystemError::InvalidPath(p) => write!(f, "Invalid path: {p:?}"),
            FileSystemError::InvalidPattern(p) => write!(f, "Invalid file name pattern: {p}"),
        }
    }
}

impl std::error::Error for FileSystemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileSystemError::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FileSystemError>;

/*
 * Defines the read-only file system operations used by the indexer and the
 * selection dispatcher. Listings return full paths in a deterministic order.
 */
pub trait FileSystemReaderOperations: Send + Sync {
    /* Lists the immediate subdirectories of `dir_path`. */
    fn list_subdirectories(&self, dir_path: &Path) -> Result<Vec<PathBuf>>;

    /*
     * Lists the regular files directly inside `dir_path` whose file name matches
     * the glob `pattern`, compared case-insensitively.
     */
    fn list_files(&self, dir_path: &Path, pattern: &str) -> Result<Vec<PathBuf>>;

    fn directory_exists(&self, path: &Path) -> bool;

    fn file_exists(&self, path: &Path) -> bool;
}

/*
 * The core implementation of `FileSystemReaderOperations`.
 * Each listing is a single-level `walkdir` walk sorted by file name, so the
 * enumeration order is the same on every platform. Symbolic links to directories
 * are never reported as subdirectories, which keeps recursive callers on a tree.
 */
pub struct CoreFileSystemReader {}

impl CoreFileSystemReader {
    pub fn new() -> Self {
        CoreFileSystemReader {}
    }

    fn read_immediate_entries(dir_path: &Path) -> Result<Vec<DirEntry>> {
        let walker = WalkDir::new(dir_path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        let mut entries = Vec::new();
        for entry_result in walker {
            entries.push(entry_result?); // Converted by From<walkdir::Error>
        }
        Ok(entries)
    }

    fn is_regular_or_linked_file(entry: &DirEntry) -> bool {
        let file_type = entry.file_type();
        file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
    }
}

impl Default for CoreFileSystemReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystemReaderOperations for CoreFileSystemReader {
    fn list_subdirectories(&self, dir_path: &Path) -> Result<Vec<PathBuf>> {
        let subdirectories: Vec<PathBuf> = Self::read_immediate_entries(dir_path)?
            .into_iter()
            .filter(|entry| entry.file_type().is_dir())
            .map(DirEntry::into_path)
            .collect();
        log::trace!(
            "FileSystemReader: {} subdirectories in {dir_path:?}",
            subdirectories.len()
        );
        Ok(subdirectories)
    }

    fn list_files(&self, dir_path: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        let matcher =
            Pattern::new(pattern).map_err(|e| FileSystemError::InvalidPattern(e.to_string()))?;
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        let files: Vec<PathBuf> = Self::read_immediate_entries(dir_path)?
            .into_iter()
            .filter(Self::is_regular_or_linked_file)
            .filter(|entry| matcher.matches_with(&entry.file_name().to_string_lossy(), options))
            .map(DirEntry::into_path)
            .collect();
        log::trace!(
            "FileSystemReader: {} files matching '{pattern}' in {dir_path:?}",
            files.len()
        );
        Ok(files)
    }

    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn file_names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_list_subdirectories_sorted_and_excludes_files() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("zeta"))?;
        fs::create_dir(dir.path().join("alpha"))?;
        fs::create_dir_all(dir.path().join("mid").join("nested"))?;
        File::create(dir.path().join("file.pdf"))?.sync_all()?;
        let reader = CoreFileSystemReader::new();

        let subdirectories = reader.list_subdirectories(dir.path())?;

        assert_eq!(file_names(&subdirectories), vec!["alpha", "mid", "zeta"]);
        assert!(subdirectories.iter().all(|p| p.is_absolute()));
        Ok(())
    }

    #[test]
    fn test_list_files_matches_extension_case_insensitively() -> Result<()> {
        let dir = tempdir()?;
        File::create(dir.path().join("b.pdf"))?.sync_all()?;
        File::create(dir.path().join("A.PDF"))?.sync_all()?;
        File::create(dir.path().join("notes.txt"))?.sync_all()?;
        File::create(dir.path().join("archive.pdfx"))?.sync_all()?;
        File::create(dir.path().join("pdf"))?.sync_all()?;
        fs::create_dir(dir.path().join("folder.pdf"))?;
        let reader = CoreFileSystemReader::new();

        let files = reader.list_files(dir.path(), "*.pdf")?;

        assert_eq!(file_names(&files), vec!["A.PDF", "b.pdf"]);
        Ok(())
    }

    #[test]
    fn test_list_files_in_empty_directory() -> Result<()> {
        let dir = tempdir()?;
        let reader = CoreFileSystemReader::new();
        assert!(reader.list_files(dir.path(), "*.pdf")?.is_empty());
        assert!(reader.list_subdirectories(dir.path())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_listing_missing_directory_is_io_error() {
        let reader = CoreFileSystemReader::new();
        let result = reader.list_subdirectories(Path::new("this_path_does_not_exist_hopefully"));
        match result {
            Err(FileSystemError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("Expected an I/O error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_pattern_is_reported() -> Result<()> {
        let dir = tempdir()?;
        let reader = CoreFileSystemReader::new();
        let result = reader.list_files(dir.path(), "[*.pdf");
        assert!(matches!(result, Err(FileSystemError::InvalidPattern(_))));
        Ok(())
    }

    #[test]
    fn test_exists_checks_distinguish_files_and_directories() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("doc.pdf");
        File::create(&file_path)?.sync_all()?;
        let reader = CoreFileSystemReader::new();

        assert!(reader.directory_exists(dir.path()));
        assert!(!reader.directory_exists(&file_path));
        assert!(reader.file_exists(&file_path));
        assert!(!reader.file_exists(dir.path()));

        fs::remove_file(&file_path)?;
        assert!(!reader.file_exists(&file_path));
        Ok(())
    }

    #[test]
    fn test_permission_denied_classification() {
        let denied = FileSystemError::from(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "access is denied",
        ));
        let missing = FileSystemError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(denied.is_permission_denied());
        assert!(!missing.is_permission_denied());
        assert!(!FileSystemError::InvalidPath(PathBuf::from("x")).is_permission_denied());
    }
}
