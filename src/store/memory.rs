//! In-memory note store.
//!
//! Used for `--ephemeral` runs and for tests. Everything is lost when dropped.

use super::{normalize, BackingStore, EntryHandle, EntryKind};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone)]
enum Entry {
    File(Vec<u8>),
    Directory,
}

impl Entry {
    fn kind(&self) -> EntryKind {
        match self {
            Entry::File(_) => EntryKind::File,
            Entry::Directory => EntryKind::Directory,
        }
    }
}

/// Thread-safe via an internal `RwLock`. The store root (the empty path)
/// always exists and is never stored as an entry.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<PathBuf, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_entries(&self) -> io::Result<RwLockReadGuard<'_, BTreeMap<PathBuf, Entry>>> {
        self.entries
            .read()
            .map_err(|_| io::Error::other("lock poisoned"))
    }

    fn write_entries(&self) -> io::Result<RwLockWriteGuard<'_, BTreeMap<PathBuf, Entry>>> {
        self.entries
            .write()
            .map_err(|_| io::Error::other("lock poisoned"))
    }

    /// Create every missing ancestor of `path` as a directory.
    fn ensure_parents(entries: &mut BTreeMap<PathBuf, Entry>, path: &Path) -> io::Result<()> {
        let mut current = PathBuf::new();
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        for component in parent.components() {
            current.push(component);
            match entries.get(&current) {
                Some(Entry::Directory) => {}
                Some(Entry::File(_)) => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("not a directory: {}", current.display()),
                    ))
                }
                None => {
                    entries.insert(current.clone(), Entry::Directory);
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BackingStore for MemoryStore {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        let normalized = normalize(path)?;
        if normalized.as_os_str().is_empty() {
            return Ok(true);
        }
        Ok(self.read_entries()?.contains_key(&normalized))
    }

    async fn create_dir(&self, path: &Path) -> io::Result<EntryHandle> {
        let normalized = normalize(path)?;
        if normalized.as_os_str().is_empty() {
            return Ok(EntryHandle::new(normalized, EntryKind::Directory));
        }
        let mut entries = self.write_entries()?;
        Self::ensure_parents(&mut entries, &normalized)?;

        match entries.get(&normalized) {
            Some(Entry::File(_)) => {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("file exists: {}", path.display()),
                ))
            }
            Some(Entry::Directory) => {}
            None => {
                entries.insert(normalized.clone(), Entry::Directory);
            }
        }
        Ok(EntryHandle::new(normalized, EntryKind::Directory))
    }

    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<EntryHandle> {
        let normalized = normalize(path)?;
        if normalized.as_os_str().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot write to the store root",
            ));
        }
        let mut entries = self.write_entries()?;
        Self::ensure_parents(&mut entries, &normalized)?;

        if let Some(Entry::Directory) = entries.get(&normalized) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("is a directory: {}", path.display()),
            ));
        }
        entries.insert(normalized.clone(), Entry::File(data.to_vec()));
        Ok(EntryHandle::new(normalized, EntryKind::File))
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let normalized = normalize(path)?;
        match self.read_entries()?.get(&normalized) {
            Some(Entry::File(data)) => Ok(data.clone()),
            Some(Entry::Directory) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("is a directory: {}", path.display()),
            )),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not found: {}", path.display()),
            )),
        }
    }

    async fn children(&self, dir: &EntryHandle) -> io::Result<Vec<EntryHandle>> {
        let normalized = normalize(dir.path())?;
        let entries = self.read_entries()?;

        if !normalized.as_os_str().is_empty() {
            match entries.get(&normalized) {
                Some(Entry::Directory) => {}
                Some(Entry::File(_)) => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("not a directory: {}", dir.path().display()),
                    ))
                }
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("not found: {}", dir.path().display()),
                    ))
                }
            }
        }

        let mut children: Vec<EntryHandle> = entries
            .iter()
            .filter(|(path, _)| path.parent() == Some(normalized.as_path()))
            .map(|(path, entry)| EntryHandle::new(path.clone(), entry.kind()))
            .collect();
        children.sort_by_key(|child| child.name());
        Ok(children)
    }

    async fn move_to(&self, handle: &EntryHandle, dest: &Path) -> io::Result<EntryHandle> {
        let source = normalize(handle.path())?;
        let dest = normalize(dest)?;
        let mut entries = self.write_entries()?;

        let Some(entry) = entries.get(&source) else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not found: {}", source.display()),
            ));
        };
        let kind = entry.kind();
        if entries.contains_key(&dest) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("destination exists: {}", dest.display()),
            ));
        }
        if dest.starts_with(&source) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cannot move {} into itself", source.display()),
            ));
        }
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !matches!(entries.get(parent), Some(Entry::Directory)) {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("destination directory not found: {}", parent.display()),
                ));
            }
        }

        let moved: Vec<PathBuf> = entries
            .keys()
            .filter(|path| path.starts_with(&source))
            .cloned()
            .collect();
        for old_path in moved {
            if let Some(entry) = entries.remove(&old_path) {
                let suffix = old_path.strip_prefix(&source).unwrap_or(Path::new(""));
                let new_path = if suffix.as_os_str().is_empty() {
                    dest.clone()
                } else {
                    dest.join(suffix)
                };
                entries.insert(new_path, entry);
            }
        }
        Ok(EntryHandle::new(dest, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_creates_parents() {
        let store = MemoryStore::new();
        store
            .write(Path::new("yanta-notes/journal/today.md"), b"hello")
            .await
            .unwrap();

        assert!(store.exists(Path::new("yanta-notes")).await.unwrap());
        assert!(store.exists(Path::new("yanta-notes/journal")).await.unwrap());
        let data = store
            .read(Path::new("yanta-notes/journal/today.md"))
            .await
            .unwrap();
        assert_eq!(data, b"hello");
    }

    #[tokio::test]
    async fn children_are_direct_and_sorted() {
        let store = MemoryStore::new();
        let root = store.create_dir(Path::new("notes")).await.unwrap();
        store.write(Path::new("notes/b.md"), b"").await.unwrap();
        store.write(Path::new("notes/a.md"), b"").await.unwrap();
        store.write(Path::new("notes/sub/deep.md"), b"").await.unwrap();

        let children = store.children(&root).await.unwrap();
        let names: Vec<String> = children.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["a.md", "b.md", "sub"]);
        assert!(children[2].is_dir());
    }

    #[tokio::test]
    async fn move_carries_descendants() {
        let store = MemoryStore::new();
        let dir = store.create_dir(Path::new("notes/old")).await.unwrap();
        store.write(Path::new("notes/old/inner.md"), b"x").await.unwrap();

        let moved = store.move_to(&dir, Path::new("notes/new")).await.unwrap();
        assert_eq!(moved.path(), Path::new("notes/new"));
        assert!(!store.exists(Path::new("notes/old")).await.unwrap());
        assert_eq!(
            store.read(Path::new("notes/new/inner.md")).await.unwrap(),
            b"x"
        );
    }

    #[tokio::test]
    async fn move_onto_existing_entry_fails() {
        let store = MemoryStore::new();
        let a = store.write(Path::new("notes/a.md"), b"").await.unwrap();
        store.create_dir(Path::new("notes/b.md")).await.unwrap();

        let err = store.move_to(&a, Path::new("notes/b.md")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert!(store.exists(Path::new("notes/a.md")).await.unwrap());
    }

    #[tokio::test]
    async fn create_dir_over_file_fails() {
        let store = MemoryStore::new();
        store.write(Path::new("notes/plan"), b"").await.unwrap();
        let err = store.create_dir(Path::new("notes/plan")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }
}
