use crate::locations::{get_default_socket_path, get_default_storage_dir, get_log_dir};
use crate::provider::{validate_name, DEFAULT_BASE_DIR};
use clap::Parser;
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(about = "Serve the yanta notes tree to a tree-view client")]
pub struct Opts {
    /// Print the version and exit
    #[clap(short, long)]
    pub version: bool,
    /// Log at debug level
    #[clap(short, long)]
    pub debug: bool,
    /// Unix socket to listen on
    #[clap(short, long)]
    pub socket: Option<PathBuf>,
    /// Directory holding the note store
    #[clap(long)]
    pub storage_dir: Option<PathBuf>,
    /// Name of the note directory inside the store
    #[clap(long, default_value = DEFAULT_BASE_DIR)]
    pub base_dir: String,
    /// Keep notes in memory only
    #[clap(long)]
    pub ephemeral: bool,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub storage_dir: PathBuf,
    pub log_dir: PathBuf,
    pub socket: PathBuf,
    pub base_dir: String,
    pub debug: bool,
    pub ephemeral: bool,
}

impl Config {
    pub fn from_opts(opts: Opts) -> io::Result<Config> {
        // The base directory is also the root item's id, so it must be one path component
        validate_name(&opts.base_dir).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid --base-dir: {}", e),
            )
        })?;
        let storage_dir = match opts.storage_dir {
            Some(dir) => {
                std::fs::create_dir_all(&dir)?;
                dir
            }
            None => get_default_storage_dir()?,
        };
        let socket = match opts.socket {
            Some(socket) => socket,
            None => get_default_socket_path()?,
        };
        let log_dir = get_log_dir(&storage_dir)?;
        Ok(Config {
            storage_dir,
            log_dir,
            socket,
            base_dir: opts.base_dir,
            debug: opts.debug,
            ephemeral: opts.ephemeral,
        })
    }
}
