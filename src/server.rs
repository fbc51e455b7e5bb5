use crate::config::Config;
use crate::provider::{SharedProvider, VirtualFileTreeProvider};
use crate::routes;
use crate::store::{BackingStore, LocalStore, MemoryStore};

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::Mutex;
use tokio_stream::wrappers::UnixListenerStream;

pub struct Server {
    provider: SharedProvider,
    socket: PathBuf,
}

impl Server {
    pub fn provider(&self) -> SharedProvider {
        self.provider.clone()
    }

    /// Serve until Ctrl-C.
    pub async fn start(&self) -> io::Result<()> {
        if tokio::fs::try_exists(&self.socket).await? {
            tracing::warn!("Removing stale socket at {}", self.socket.display());
            tokio::fs::remove_file(&self.socket).await?;
        }
        let listener = tokio::net::UnixListener::bind(&self.socket)?;
        tracing::info!("Listening on {}", self.socket.display());
        let incoming = UnixListenerStream::new(listener);
        let server = warp::serve(routes::routes(self.provider.clone()))
            .serve_incoming_with_graceful_shutdown(incoming, async {
                if let Err(e) = signal::ctrl_c().await {
                    tracing::error!("Failed to listen for Ctrl-C: {}", e);
                }
            });
        server.await;
        tracing::info!("Server stopped");
        Ok(())
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        println!("Shutting down server...");
        if let Err(e) = std::fs::remove_file(&self.socket) {
            tracing::debug!("Socket {} not removed: {}", self.socket.display(), e);
        }
    }
}

pub fn get_server(config: &Config) -> Server {
    let store: Arc<dyn BackingStore> = if config.ephemeral {
        tracing::info!("Using an in-memory note store");
        Arc::new(MemoryStore::new())
    } else {
        tracing::info!("Using the note store at {}", config.storage_dir.display());
        Arc::new(LocalStore::new(&config.storage_dir))
    };
    let provider = VirtualFileTreeProvider::with_base_dir(store, &config.base_dir);
    Server {
        provider: Arc::new(Mutex::new(provider)),
        socket: config.socket.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn server_uses_the_configured_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            storage_dir: dir.path().to_path_buf(),
            log_dir: dir.path().join("logs"),
            socket: dir.path().join("test.sock"),
            base_dir: "journal".to_string(),
            debug: false,
            ephemeral: false,
        };
        let server = get_server(&config);
        let provider = server.provider();
        let root = provider.lock().await.get_tree_item("journal").await.unwrap();
        assert!(root.is_folder());
        assert!(dir.path().join("journal").is_dir());
    }
}
