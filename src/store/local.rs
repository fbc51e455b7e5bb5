//! Note store on the local disk.

use super::{normalize, BackingStore, EntryHandle, EntryKind};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::instrument;

/// All operations are relative to `root`: with `root` set to
/// `/home/amy/.local/share/yanta`, `read("yanta-notes/a.md")` reads
/// `/home/amy/.local/share/yanta/yanta-notes/a.md`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        Ok(self.root.join(normalize(path)?))
    }

    async fn kind_of(full_path: &Path) -> io::Result<EntryKind> {
        let meta = fs::metadata(full_path).await?;
        if meta.is_dir() {
            Ok(EntryKind::Directory)
        } else {
            Ok(EntryKind::File)
        }
    }
}

#[async_trait]
impl BackingStore for LocalStore {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        let full_path = self.resolve(path)?;
        fs::try_exists(&full_path).await
    }

    #[instrument(skip(self))]
    async fn create_dir(&self, path: &Path) -> io::Result<EntryHandle> {
        let full_path = self.resolve(path)?;
        fs::create_dir_all(&full_path).await?;
        Ok(EntryHandle::new(normalize(path)?, EntryKind::Directory))
    }

    #[instrument(skip(self, data), fields(bytes = data.len()))]
    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<EntryHandle> {
        let full_path = self.resolve(path)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&full_path, data).await?;
        Ok(EntryHandle::new(normalize(path)?, EntryKind::File))
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let full_path = self.resolve(path)?;
        fs::read(&full_path).await
    }

    async fn children(&self, dir: &EntryHandle) -> io::Result<Vec<EntryHandle>> {
        let relative = normalize(dir.path())?;
        let mut reader = fs::read_dir(self.root.join(&relative)).await?;
        let mut children = Vec::new();

        while let Some(entry) = reader.next_entry().await? {
            let file_type = entry.file_type().await?;
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            children.push(EntryHandle::new(relative.join(entry.file_name()), kind));
        }

        children.sort_by_key(|child| child.name());
        Ok(children)
    }

    #[instrument(skip(self))]
    async fn move_to(&self, handle: &EntryHandle, dest: &Path) -> io::Result<EntryHandle> {
        let source = self.resolve(handle.path())?;
        let target = self.resolve(dest)?;
        let kind = Self::kind_of(&source).await?;

        // rename(2) silently replaces files, so occupancy is checked first
        if fs::try_exists(&target).await? {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("destination exists: {}", dest.display()),
            ));
        }
        fs::rename(&source, &target).await?;
        Ok(EntryHandle::new(normalize(dest)?, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (LocalStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (LocalStore::new(dir.path()), dir)
    }

    #[tokio::test]
    async fn write_and_read() {
        let (store, _dir) = setup();

        let handle = store
            .write(Path::new("yanta-notes/a.md"), b"# title")
            .await
            .unwrap();
        assert_eq!(handle.path(), Path::new("yanta-notes/a.md"));
        assert_eq!(handle.kind(), EntryKind::File);

        let data = store.read(Path::new("yanta-notes/a.md")).await.unwrap();
        assert_eq!(data, b"# title");
    }

    #[tokio::test]
    async fn children_are_relative_and_sorted() {
        let (store, _dir) = setup();
        let root = store.create_dir(Path::new("yanta-notes")).await.unwrap();
        store.write(Path::new("yanta-notes/z.md"), b"").await.unwrap();
        store.create_dir(Path::new("yanta-notes/drafts")).await.unwrap();

        let children = store.children(&root).await.unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].path(), Path::new("yanta-notes/drafts"));
        assert!(children[0].is_dir());
        assert_eq!(children[1].name(), "z.md");
    }

    #[tokio::test]
    async fn move_refuses_to_overwrite() {
        let (store, _dir) = setup();
        let a = store.write(Path::new("notes/a.md"), b"a").await.unwrap();
        store.write(Path::new("notes/b.md"), b"b").await.unwrap();

        let err = store.move_to(&a, Path::new("notes/b.md")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(store.read(Path::new("notes/b.md")).await.unwrap(), b"b");

        let moved = store.move_to(&a, Path::new("notes/c.md")).await.unwrap();
        assert_eq!(moved.name(), "c.md");
        assert!(!store.exists(Path::new("notes/a.md")).await.unwrap());
    }

    #[tokio::test]
    async fn path_escape_blocked() {
        let (store, _dir) = setup();
        let result = store.read(Path::new("../../../etc/passwd")).await;
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::InvalidInput);
    }
}
