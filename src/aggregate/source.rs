//! Where metric files come from.
//!
//! The engine only ever talks to a [`FileSource`]: it asks for the candidate
//! paths matching a pattern-set and then loads each candidate's contents.

use std::io;
use std::path::Path;
use std::path::PathBuf;

use futures::future::BoxFuture;
use futures::FutureExt;
use regex::RegexSet;
use tracing::debug;
use tracing::warn;
use walkdir::WalkDir;

/// A provider of metric files.
pub trait FileSource: Send + Sync {
    /// Lists the candidate paths whose file name matches any of the patterns,
    /// in a stable order.
    fn list(&self, patterns: &RegexSet) -> io::Result<Vec<PathBuf>>;

    /// Loads the contents of one candidate.
    fn load(&self, path: &Path) -> BoxFuture<'static, io::Result<String>>;
}

fn file_name_matches(path: &Path, patterns: &RegexSet) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| patterns.is_match(name))
        .unwrap_or(false)
}

//==================//
// Directory source //
//==================//

/// Recursively walks a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    follow_links: bool,
}

impl DirectorySource {
    /// Creates a source rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            follow_links: false,
        }
    }

    /// Whether symbolic links are followed while walking.
    pub fn follow_links(mut self, yes: bool) -> Self {
        self.follow_links = yes;
        self
    }
}

impl FileSource for DirectorySource {
    fn list(&self, patterns: &RegexSet) -> io::Result<Vec<PathBuf>> {
        let walker = WalkDir::new(&self.root)
            .follow_links(self.follow_links)
            .sort_by_file_name();

        let mut paths = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                // The root itself being unreadable is fatal for the listing.
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    warn!("Skipping unreadable entry while listing files: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_file() && file_name_matches(entry.path(), patterns) {
                paths.push(entry.into_path());
            }
        }

        debug!(
            "  [*] Found {} candidate files under {}.",
            paths.len(),
            self.root.display()
        );

        Ok(paths)
    }

    fn load(&self, path: &Path) -> BoxFuture<'static, io::Result<String>> {
        let path = path.to_path_buf();
        async move { tokio::fs::read_to_string(path).await }.boxed()
    }
}

//===============//
// Memory source //
//===============//

/// Files held in memory, listed in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: Vec<(PathBuf, String)>,
}

impl MemorySource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file.
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files.push((path.into(), contents.into()));
        self
    }
}

impl FileSource for MemorySource {
    fn list(&self, patterns: &RegexSet) -> io::Result<Vec<PathBuf>> {
        Ok(self
            .files
            .iter()
            .map(|(path, _)| path)
            .filter(|path| file_name_matches(path, patterns))
            .cloned()
            .collect())
    }

    fn load(&self, path: &Path) -> BoxFuture<'static, io::Result<String>> {
        let result = self
            .files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, contents)| contents.clone())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no such file: {}", path.display()),
                )
            });

        futures::future::ready(result).boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn patterns() -> RegexSet {
        RegexSet::new([r"\.mapping_metrics\.csv$"]).unwrap()
    }

    #[test]
    fn test_directory_source_walks_recursively_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("run2")).unwrap();
        fs::create_dir_all(dir.path().join("run1")).unwrap();
        fs::write(dir.path().join("run2/a.mapping_metrics.csv"), "x").unwrap();
        fs::write(dir.path().join("run1/a.mapping_metrics.csv"), "x").unwrap();
        fs::write(dir.path().join("run1/a.bam"), "x").unwrap();

        let source = DirectorySource::new(dir.path());
        let paths = source.list(&patterns()).unwrap();

        assert_eq!(
            paths,
            [
                dir.path().join("run1/a.mapping_metrics.csv"),
                dir.path().join("run2/a.mapping_metrics.csv"),
            ]
        );
    }

    #[test]
    fn test_directory_source_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path().join("nope"));
        assert!(source.list(&patterns()).is_err());
    }

    #[tokio::test]
    async fn test_directory_source_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.mapping_metrics.csv");
        fs::write(&path, "a,1\n").unwrap();

        let contents = DirectorySource::new(dir.path()).load(&path).await.unwrap();
        assert_eq!(contents, "a,1\n");
    }

    #[tokio::test]
    async fn test_memory_source() {
        let source = MemorySource::new()
            .with_file("b.mapping_metrics.csv", "b")
            .with_file("notes.txt", "n")
            .with_file("a.mapping_metrics.csv", "a");

        let paths = source.list(&patterns()).unwrap();
        assert_eq!(
            paths,
            [
                PathBuf::from("b.mapping_metrics.csv"),
                PathBuf::from("a.mapping_metrics.csv")
            ]
        );

        assert_eq!(source.load(&paths[1]).await.unwrap(), "a");
        let err = source.load(Path::new("c.csv")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
