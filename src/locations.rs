use directories::{BaseDirs, UserDirs};
use std::io;
use std::path::PathBuf;

const APP_DIR: &str = "yanta";
const SOCKET_NAME: &str = ".yanta.sock";

fn base_dirs() -> io::Result<BaseDirs> {
    BaseDirs::new().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "Unable to determine the home directory",
        )
    })
}

/// Directory the note store lives in, created on first use.
pub fn get_default_storage_dir() -> io::Result<PathBuf> {
    let base_dirs = base_dirs()?;
    let storage_dir = base_dirs.data_dir().join(APP_DIR);
    if !storage_dir.exists() {
        std::fs::create_dir_all(&storage_dir)?;
    }
    Ok(storage_dir)
}

pub fn get_log_dir(storage_dir: &std::path::Path) -> io::Result<PathBuf> {
    let log_dir = storage_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    Ok(log_dir)
}

pub fn get_default_socket_path() -> io::Result<PathBuf> {
    let user_dirs = UserDirs::new().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "Unable to determine the home directory",
        )
    })?;
    Ok(user_dirs.home_dir().join(SOCKET_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_dir_is_created_under_storage() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = get_log_dir(dir.path()).unwrap();
        assert_eq!(log_dir, dir.path().join("logs"));
        assert!(log_dir.is_dir());
    }
}
