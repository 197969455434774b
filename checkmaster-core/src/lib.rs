pub mod config;
pub mod product;
pub mod snapshot;
pub mod source;
pub mod store;

pub use config::Config;
pub use product::{Product, ProductId, ReviewStatus};
pub use snapshot::{InMemorySlot, SnapshotError, SnapshotSlot, SnapshotStore, SqliteSlot};
pub use source::{HttpProductSource, ProductSource, SourceError, StaticProductSource};
pub use store::{
    Action, FetchKind, FetchReport, FetchRequest, Paginator, ProductState, ProductStore,
};

mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Short revision identifier for display, or the package version when no
/// revision is known.
pub fn get_version() -> String {
    // Explicit override from the release pipeline wins over git detection
    if let Some(git_hash) = option_env!("CHECKMASTER_GIT_HASH") {
        return short_hash(git_hash);
    }
    match built_info::GIT_COMMIT_HASH {
        Some(git_hash) => short_hash(git_hash),
        None => built_info::PKG_VERSION.to_string(),
    }
}

fn short_hash(hash: &str) -> String {
    if hash.len() >= 8 {
        hash[..8].to_string()
    } else {
        hash.to_string()
    }
}
