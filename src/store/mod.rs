// Storage backends for the release catalog

use crate::catalog::{Application, Release, ReleaseFilter, ReleaseKey};
use crate::config::{Config, StoreKind};
use crate::error::Result;
use std::sync::Arc;

pub mod catalog;
pub mod file;
pub mod memory;
pub mod query;

pub use catalog::Catalog;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Catalog access used by the update service.
///
/// Implementations must tolerate concurrent readers and must reject a
/// duplicate release key on save atomically, reporting it as a conflict.
#[async_trait::async_trait]
pub trait ReleaseStore: Send + Sync {
    /// Backend name for logs (e.g., "memory", "file")
    fn name(&self) -> &'static str;

    /// Releases matching a validated, normalized filter, already sorted and
    /// paginated, together with the total number of matches.
    async fn find_releases(&self, filter: &ReleaseFilter) -> Result<(Vec<Release>, usize)>;

    async fn get_release(&self, key: &ReleaseKey) -> Result<Release>;

    /// Insert a new release. Fails with a conflict if the key exists.
    async fn save_release(&self, release: &Release) -> Result<()>;

    /// Replace an existing release. Fails with not-found if absent.
    async fn update_release(&self, release: &Release) -> Result<()>;

    async fn delete_release(&self, key: &ReleaseKey) -> Result<()>;

    async fn get_application(&self, id: &str) -> Result<Application>;

    /// Insert a new application. Fails with a conflict if the id exists.
    async fn save_application(&self, application: &Application) -> Result<()>;

    async fn list_applications(&self) -> Result<Vec<Application>>;
}

/// Build the store backend selected by `config`
pub fn open_store(config: &Config) -> Arc<dyn ReleaseStore> {
    match config.store {
        StoreKind::File => Arc::new(FileStore::new(config.catalog_path())),
        StoreKind::Memory => Arc::new(MemoryStore::new()),
    }
}
