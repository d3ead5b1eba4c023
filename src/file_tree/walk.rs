//! Lazy depth-first walk over a [`FileTree`].

use std::borrow::Cow;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use futures::stream;

use super::{EntryKind, FileTree, Result, TreeEntry};

/// A regular file found by [`walk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path of the file: the walk root joined with `relative_path`.
    pub path: PathBuf,
    /// Path of the file relative to the walk root.
    pub relative_path: PathBuf,
    /// Base name of the file.
    pub name: OsString,
}

impl WalkEntry {
    /// The base name as text, with invalid UTF-8 replaced.
    pub fn name_lossy(&self) -> Cow<'_, str> {
        self.name.to_string_lossy()
    }

    /// The relative path with components joined by `/`, whatever the host
    /// separator is.
    pub fn relative_slash_path(&self) -> String {
        self.relative_path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Async iterator over walked files.
pub type WalkEntries<'a> = Pin<Box<dyn futures::Stream<Item = Result<WalkEntry>> + Send + 'a>>;

/// Walk every regular file under `root`, depth-first.
///
/// Entries within a directory are visited in lexicographic name order and a
/// directory is only listed once the stream reaches it. Listing errors,
/// including a missing root, are yielded as stream items.
pub fn walk<'a>(tree: &'a dyn FileTree, root: &Path) -> WalkEntries<'a> {
    let state = WalkState {
        tree,
        root: root.to_path_buf(),
        stack: Vec::new(),
        started: false,
    };

    Box::pin(stream::try_unfold(state, |mut state| async move {
        let next = state.next_file().await?;
        Ok(next.map(|entry| (entry, state)))
    }))
}

// =============================================================================
// Walk State
// =============================================================================

/// A directory whose entries are partly consumed.
struct DirFrame {
    relative: PathBuf,
    entries: std::vec::IntoIter<TreeEntry>,
}

struct WalkState<'a> {
    tree: &'a dyn FileTree,
    root: PathBuf,
    stack: Vec<DirFrame>,
    started: bool,
}

impl WalkState<'_> {
    async fn next_file(&mut self) -> Result<Option<WalkEntry>> {
        if !self.started {
            self.started = true;
            self.push_dir(PathBuf::new()).await?;
        }

        loop {
            let Some(frame) = self.stack.last_mut() else {
                return Ok(None);
            };
            let Some(entry) = frame.entries.next() else {
                self.stack.pop();
                continue;
            };
            let relative_path = frame.relative.join(&entry.name);

            match entry.kind {
                EntryKind::File => {
                    return Ok(Some(WalkEntry {
                        path: self.root.join(&relative_path),
                        relative_path,
                        name: entry.name,
                    }));
                }
                EntryKind::Directory => self.push_dir(relative_path).await?,
                EntryKind::Other => {}
            }
        }
    }

    async fn push_dir(&mut self, relative: PathBuf) -> Result<()> {
        let dir = if relative.as_os_str().is_empty() {
            self.root.clone()
        } else {
            self.root.join(&relative)
        };

        let mut entries = self.tree.read_dir(&dir).await?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        self.stack.push(DirFrame {
            relative,
            entries: entries.into_iter(),
        });
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
