// File-backed catalog store (TOML)

use crate::catalog::{Application, Release, ReleaseFilter, ReleaseKey};
use crate::constants::CATALOG_LOCK_TIMEOUT_MS;
use crate::error::{Error, Result};
use crate::store::{Catalog, ReleaseStore};
use log::{debug, warn};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const LOCK_POLL: Duration = Duration::from_millis(25);

/// Reads the catalog file on every call and rewrites it on every mutation.
///
/// Each mutation holds `catalog.toml.lock` (created exclusively) from load to
/// rename, so writers in separate processes cannot lose each other's
/// changes. Within one process a mutex queues writers ahead of the lock
/// file. Files are replaced with a rename, so readers never observe a
/// half-written catalog. A lock file left by a crashed process must be
/// removed by hand.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    writer: Mutex<()>,
    lock_timeout: Duration,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(()),
            lock_timeout: Duration::from_millis(CATALOG_LOCK_TIMEOUT_MS),
        }
    }

    /// How long a mutation waits for a lock held by another process
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn lock_path(&self) -> PathBuf {
        self.path.with_extension("toml.lock")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty catalog file. Returns false if one already exists.
    pub fn init(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| Error::storage_from("init", e))?;
        }
        self.write(&Catalog::default())?;
        Ok(true)
    }

    fn load(&self) -> Result<Catalog> {
        if !self.path.exists() {
            return Err(Error::storage(
                "load catalog",
                format!(
                    "{} not found. Run 'updraft init' first.",
                    self.path.display()
                ),
            ));
        }
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::storage_from("load catalog", e))?;
        toml::from_str(&text).map_err(|e| {
            Error::storage(
                "load catalog",
                format!("{} is not a valid catalog: {}", self.path.display(), e),
            )
        })
    }

    fn write(&self, catalog: &Catalog) -> Result<()> {
        let text = toml::to_string_pretty(catalog)
            .map_err(|e| Error::storage_from("save catalog", e))?;
        let staging = self.path.with_extension("toml.tmp");
        std::fs::write(&staging, text).map_err(|e| Error::storage_from("save catalog", e))?;
        std::fs::rename(&staging, &self.path)
            .map_err(|e| Error::storage_from("save catalog", e))?;
        debug!("Wrote catalog to {}", self.path.display());
        Ok(())
    }

    async fn mutate<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut Catalog) -> Result<()> + Send,
    {
        let _guard = self.writer.lock().await;
        let _lock = LockFile::acquire(self.lock_path(), self.lock_timeout).await?;
        let mut catalog = self.load()?;
        change(&mut catalog)?;
        self.write(&catalog)
    }
}

/// Exclusive lock file, removed when dropped
#[derive(Debug)]
struct LockFile {
    path: PathBuf,
}

impl LockFile {
    async fn acquire(path: PathBuf, timeout: Duration) -> Result<Self> {
        let deadline = Instant::now() + timeout;
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    // Owner pid helps when cleaning up after a crash
                    let _ = writeln!(file, "{}", std::process::id());
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if Instant::now() >= deadline {
                        return Err(Error::storage(
                            "lock catalog",
                            format!(
                                "{} is held by another writer. Remove it if no updraft process is running.",
                                path.display()
                            ),
                        ));
                    }
                    debug!("Waiting for {}", path.display());
                    tokio::time::sleep(LOCK_POLL).await;
                }
                Err(e) => return Err(Error::storage_from("lock catalog", e)),
            }
        }
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("Failed to remove {}: {}", self.path.display(), e);
        }
    }
}

#[async_trait::async_trait]
impl ReleaseStore for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn find_releases(&self, filter: &ReleaseFilter) -> Result<(Vec<Release>, usize)> {
        Ok(self.load()?.find_releases(filter))
    }

    async fn get_release(&self, key: &ReleaseKey) -> Result<Release> {
        self.load()?.get_release(key)
    }

    async fn save_release(&self, release: &Release) -> Result<()> {
        self.mutate(|catalog| catalog.insert_release(release)).await
    }

    async fn update_release(&self, release: &Release) -> Result<()> {
        self.mutate(|catalog| catalog.replace_release(release)).await
    }

    async fn delete_release(&self, key: &ReleaseKey) -> Result<()> {
        self.mutate(|catalog| catalog.remove_release(key)).await
    }

    async fn get_application(&self, id: &str) -> Result<Application> {
        self.load()?.get_application(id)
    }

    async fn save_application(&self, application: &Application) -> Result<()> {
        self.mutate(|catalog| catalog.insert_application(application)).await
    }

    async fn list_applications(&self) -> Result<Vec<Application>> {
        Ok(self.load()?.applications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Platform;
    use crate::catalog::release::tests::sample_release;
    use crate::catalog::ChecksumAlgorithm;
    use crate::error::ErrorKind;

    fn store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("catalog.toml"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_missing_catalog_is_storage_error() {
        let (_dir, store) = store();
        let err = store
            .find_releases(&ReleaseFilter::for_application("acme"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageError);
        assert!(err.to_string().contains("updraft init"));
    }

    #[tokio::test]
    async fn test_init_only_once() {
        let (_dir, store) = store();
        assert!(store.init().unwrap());
        assert!(!store.init().unwrap());
        assert!(store.list_applications().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_changes_persist_across_instances() {
        let (dir, store) = store();
        store.init().unwrap();
        store
            .save_application(&Application::new("acme", "Acme", vec![Platform::Linux]))
            .await
            .unwrap();
        store.save_release(&sample_release("1.5.0")).await.unwrap();

        let reopened = FileStore::new(dir.path().join("catalog.toml"));
        let release = reopened
            .get_release(&sample_release("1.5.0").key())
            .await
            .unwrap();
        assert_eq!(release, sample_release("1.5.0"));
        assert_eq!(reopened.get_application("acme").await.unwrap().name, "Acme");

        let err = reopened
            .save_release(&sample_release("1.5.0"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(!dir.path().join("catalog.toml.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_catalog_reports_path() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("catalog.toml"), "release = 5").unwrap();
        let err = store.list_applications().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageError);
        assert!(err.to_string().contains("not a valid catalog"));
    }

    #[tokio::test]
    async fn test_unknown_stored_checksum_tag_loads_as_sha256() {
        let (dir, store) = store();
        store.init().unwrap();
        store
            .save_application(&Application::new("acme", "Acme", vec![Platform::Linux]))
            .await
            .unwrap();
        let mut release = sample_release("1.5.0");
        release.checksum_type = ChecksumAlgorithm::Sha1;
        store.save_release(&release).await.unwrap();

        let path = dir.path().join("catalog.toml");
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("checksum_type = \"sha1\""));
        std::fs::write(&path, text.replace("\"sha1\"", "\"blake3\"")).unwrap();

        let loaded = store.get_release(&release.key()).await.unwrap();
        assert_eq!(loaded.checksum_type, ChecksumAlgorithm::Sha256);
        assert!(loaded.verify_checksum(b"1.5.0"));
        assert_eq!(store.get_application("acme").await.unwrap().name, "Acme");
        store.save_release(&sample_release("1.6.0")).await.unwrap();
    }

    #[tokio::test]
    async fn test_held_lock_blocks_writers_until_released() {
        let (dir, store) = store();
        store.init().unwrap();
        let store = store.with_lock_timeout(Duration::from_millis(100));
        let lock = dir.path().join("catalog.toml.lock");
        assert_eq!(store.lock_path(), lock);

        std::fs::write(&lock, "4242").unwrap();
        let err = store
            .save_release(&sample_release("1.0.0"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageError);
        assert!(err.to_string().contains("held by another writer"));
        assert!(lock.exists());

        std::fs::remove_file(&lock).unwrap();
        store.save_release(&sample_release("1.0.0")).await.unwrap();
        assert!(!lock.exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_separate_instances_do_not_lose_writes() {
        let (dir, store) = store();
        store.init().unwrap();
        let path = dir.path().join("catalog.toml");

        let mut handles = Vec::new();
        for i in 0..8 {
            // one store per writer, as separate processes would have
            let writer = FileStore::new(&path);
            handles.push(tokio::spawn(async move {
                let shared = writer.save_release(&sample_release("2.0.0")).await;
                let own = writer
                    .save_release(&sample_release(&format!("1.{i}.0")))
                    .await;
                (shared, own)
            }));
        }

        let mut saved = 0;
        for handle in handles {
            let (shared, own) = handle.await.unwrap();
            own.unwrap();
            match shared {
                Ok(()) => saved += 1,
                Err(e) => assert_eq!(e.kind(), ErrorKind::Conflict),
            }
        }
        assert_eq!(saved, 1);

        let mut filter = ReleaseFilter::for_application("acme");
        filter.normalize();
        let (releases, total) = store.find_releases(&filter).await.unwrap();
        assert_eq!(total, 9);
        assert_eq!(releases.len(), 9);
        assert!(!dir.path().join("catalog.toml.lock").exists());
    }
}
