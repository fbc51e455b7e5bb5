pub mod config;
pub mod errors;
pub mod listeners;
pub mod locations;
pub mod log;
pub mod provider;
pub mod routes;
pub mod server;
pub mod store;
pub mod tree;

mod handlers;

pub use errors::{Result, TreeError, TreeErrorType};
pub use listeners::Subscription;
pub use provider::{ProviderState, SharedProvider, VirtualFileTreeProvider, DEFAULT_BASE_DIR};
pub use store::{BackingStore, EntryHandle, EntryKind, LocalStore, MemoryStore};
pub use tree::{TreeIndex, TreeItemId, TreeNode, TreeNodeKind};
