// In-memory catalog store

use crate::catalog::{Application, Release, ReleaseFilter, ReleaseKey};
use crate::error::Result;
use crate::store::{Catalog, ReleaseStore};
use tokio::sync::RwLock;

/// Keeps the whole catalog behind a lock. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    catalog: RwLock<Catalog>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            catalog: RwLock::new(catalog),
        }
    }
}

#[async_trait::async_trait]
impl ReleaseStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn find_releases(&self, filter: &ReleaseFilter) -> Result<(Vec<Release>, usize)> {
        Ok(self.catalog.read().await.find_releases(filter))
    }

    async fn get_release(&self, key: &ReleaseKey) -> Result<Release> {
        self.catalog.read().await.get_release(key)
    }

    async fn save_release(&self, release: &Release) -> Result<()> {
        self.catalog.write().await.insert_release(release)
    }

    async fn update_release(&self, release: &Release) -> Result<()> {
        self.catalog.write().await.replace_release(release)
    }

    async fn delete_release(&self, key: &ReleaseKey) -> Result<()> {
        self.catalog.write().await.remove_release(key)
    }

    async fn get_application(&self, id: &str) -> Result<Application> {
        self.catalog.read().await.get_application(id)
    }

    async fn save_application(&self, application: &Application) -> Result<()> {
        self.catalog.write().await.insert_application(application)
    }

    async fn list_applications(&self) -> Result<Vec<Application>> {
        Ok(self.catalog.read().await.applications.clone())
    }
}
