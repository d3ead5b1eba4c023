use std::collections::BTreeMap;
use std::path::{Component, Path};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{Error, FileReader, FileTree, Result, TreeEntry};

/// An entry in the in-memory filesystem.
#[derive(Debug, Clone)]
pub enum MemoryFsEntry {
    /// A directory containing other entries.
    Directory(BTreeMap<String, MemoryFsEntry>),
    /// A file with explicit contents.
    File { contents: Vec<u8> },
    /// A file filled with repeated content to a given size.
    RepeatedFile { pattern: Vec<u8>, size: u64 },
}

impl MemoryFsEntry {
    /// Create an empty directory.
    pub fn dir() -> Self {
        MemoryFsEntry::Directory(BTreeMap::new())
    }

    /// Create a file with the given contents.
    pub fn file(contents: impl Into<Vec<u8>>) -> Self {
        MemoryFsEntry::File {
            contents: contents.into(),
        }
    }

    /// Create a file filled with repeated content.
    pub fn repeated(pattern: impl Into<Vec<u8>>, size: u64) -> Self {
        MemoryFsEntry::RepeatedFile {
            pattern: pattern.into(),
            size,
        }
    }

    /// Materialize the bytes of a file entry.
    fn contents(&self) -> Option<Vec<u8>> {
        match self {
            MemoryFsEntry::Directory(_) => None,
            MemoryFsEntry::File { contents } => Some(contents.clone()),
            MemoryFsEntry::RepeatedFile { pattern, size } => {
                let size = *size as usize;
                if pattern.is_empty() {
                    return Some(vec![0u8; size]);
                }
                Some(pattern.iter().copied().cycle().take(size).collect())
            }
        }
    }
}

/// Builder for constructing a MemoryFileTree.
pub struct MemoryFileTreeBuilder {
    root: BTreeMap<String, MemoryFsEntry>,
}

impl Default for MemoryFileTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFileTreeBuilder {
    pub fn new() -> Self {
        Self {
            root: BTreeMap::new(),
        }
    }

    /// Add an entry at the given path.
    ///
    /// Path components are separated by '/'. Parent directories are created automatically.
    pub fn add(mut self, path: &str, entry: MemoryFsEntry) -> Self {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if parts.is_empty() {
            return self;
        }

        Self::add_at_path(&mut self.root, &parts, entry);
        self
    }

    fn add_at_path(
        current: &mut BTreeMap<String, MemoryFsEntry>,
        parts: &[&str],
        entry: MemoryFsEntry,
    ) {
        if parts.len() == 1 {
            current.insert(parts[0].to_string(), entry);
            return;
        }

        let child = current
            .entry(parts[0].to_string())
            .or_insert_with(MemoryFsEntry::dir);

        if let MemoryFsEntry::Directory(children) = child {
            Self::add_at_path(children, &parts[1..], entry);
        }
    }

    pub fn build(self) -> MemoryFileTree {
        MemoryFileTree {
            root: Arc::new(MemoryFsEntry::Directory(self.root)),
            read_dir_calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

/// An in-memory implementation of FileTree for testing.
///
/// Paths are interpreted relative to the tree's root; a leading `/`, `.` and
/// the empty path all name the root.
#[derive(Clone)]
pub struct MemoryFileTree {
    root: Arc<MemoryFsEntry>,
    read_dir_calls: Arc<AtomicUsize>,
}

impl MemoryFileTree {
    /// Number of `read_dir` calls made so far.
    pub fn read_dir_calls(&self) -> usize {
        self.read_dir_calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, path: &Path) -> Option<&MemoryFsEntry> {
        let mut current = self.root.as_ref();
        for component in path.components() {
            let name = match component {
                Component::Normal(name) => name.to_string_lossy(),
                _ => continue,
            };
            match current {
                MemoryFsEntry::Directory(children) => current = children.get(&*name)?,
                _ => return None,
            }
        }
        Some(current)
    }
}

#[async_trait]
impl FileTree for MemoryFileTree {
    async fn read_dir(&self, path: &Path) -> Result<Vec<TreeEntry>> {
        self.read_dir_calls.fetch_add(1, Ordering::SeqCst);

        match self.lookup(path) {
            None => Err(Error::NotFound(path.to_string_lossy().into_owned())),
            Some(MemoryFsEntry::Directory(children)) => Ok(children
                .iter()
                .map(|(name, entry)| match entry {
                    MemoryFsEntry::Directory(_) => TreeEntry::dir(name.clone()),
                    _ => TreeEntry::file(name.clone()),
                })
                .collect()),
            Some(_) => Err(Error::NotADirectory(path.to_string_lossy().into_owned())),
        }
    }

    async fn open(&self, path: &Path) -> Result<FileReader> {
        let entry = self
            .lookup(path)
            .ok_or_else(|| Error::NotFound(path.to_string_lossy().into_owned()))?;
        let contents = entry
            .contents()
            .ok_or_else(|| Error::NotAFile(path.to_string_lossy().into_owned()))?;
        Ok(Box::pin(std::io::Cursor::new(contents)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    async fn read_all(tree: &MemoryFileTree, path: &str) -> Vec<u8> {
        let mut reader = tree.open(Path::new(path)).await.unwrap();
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await.unwrap();
        buf
    }

    #[tokio::test]
    async fn test_read_dir_and_open() {
        let tree = MemoryFileTreeBuilder::new()
            .add("docs/readme.md", MemoryFsEntry::file("hello"))
            .add("docs/img", MemoryFsEntry::dir())
            .build();

        let mut entries = tree.read_dir(Path::new("/docs")).await.unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(
            entries,
            vec![TreeEntry::dir("img"), TreeEntry::file("readme.md")]
        );

        assert_eq!(read_all(&tree, "docs/readme.md").await, b"hello");
    }

    #[tokio::test]
    async fn test_repeated_file_contents() {
        let tree = MemoryFileTreeBuilder::new()
            .add("big.bin", MemoryFsEntry::repeated("abc", 7))
            .build();

        assert_eq!(read_all(&tree, "big.bin").await, b"abcabca");
    }

    #[tokio::test]
    async fn test_errors() {
        let tree = MemoryFileTreeBuilder::new()
            .add("f.txt", MemoryFsEntry::file("x"))
            .build();

        assert!(matches!(
            tree.read_dir(Path::new("f.txt")).await,
            Err(Error::NotADirectory(_))
        ));
        assert!(matches!(
            tree.open(Path::new("missing")).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(tree.open(Path::new("")).await, Err(Error::NotAFile(_))));
    }
}
