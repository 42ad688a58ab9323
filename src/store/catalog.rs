// Catalog document shared by the in-memory and file-backed stores

use crate::catalog::{Application, Release, ReleaseFilter, ReleaseKey};
use crate::constants::SCHEMA_VERSION;
use crate::error::{Error, Result};
use crate::store::query;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default = "current_schema")]
    pub schema_version: u32,
    #[serde(default, rename = "application")]
    pub applications: Vec<Application>,
    #[serde(default, rename = "release")]
    pub releases: Vec<Release>,
}

fn current_schema() -> u32 {
    SCHEMA_VERSION
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            applications: Vec::new(),
            releases: Vec::new(),
        }
    }
}

impl Catalog {
    pub fn find_releases(&self, filter: &ReleaseFilter) -> (Vec<Release>, usize) {
        query::apply(&self.releases, filter)
    }

    fn position(&self, key: &ReleaseKey) -> Option<usize> {
        self.releases.iter().position(|r| &r.key() == key)
    }

    pub fn get_release(&self, key: &ReleaseKey) -> Result<Release> {
        self.position(key)
            .map(|i| self.releases[i].clone())
            .ok_or_else(|| Error::not_found("release", key.to_string()))
    }

    pub fn insert_release(&mut self, release: &Release) -> Result<()> {
        let key = release.key();
        if self.position(&key).is_some() {
            return Err(Error::conflict("release", key.to_string()));
        }
        self.releases.push(release.clone());
        Ok(())
    }

    pub fn replace_release(&mut self, release: &Release) -> Result<()> {
        let key = release.key();
        let index = self
            .position(&key)
            .ok_or_else(|| Error::not_found("release", key.to_string()))?;
        self.releases[index] = release.clone();
        Ok(())
    }

    pub fn remove_release(&mut self, key: &ReleaseKey) -> Result<()> {
        let index = self
            .position(key)
            .ok_or_else(|| Error::not_found("release", key.to_string()))?;
        self.releases.remove(index);
        Ok(())
    }

    pub fn get_application(&self, id: &str) -> Result<Application> {
        self.applications
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| Error::not_found("application", id))
    }

    pub fn insert_application(&mut self, application: &Application) -> Result<()> {
        if self.applications.iter().any(|a| a.id == application.id) {
            return Err(Error::conflict("application", application.id.clone()));
        }
        self.applications.push(application.clone());
        self.applications.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Platform;
    use crate::catalog::release::tests::sample_release;
    use crate::error::ErrorKind;

    #[test]
    fn test_duplicate_release_conflicts() {
        let mut catalog = Catalog::default();
        catalog.insert_release(&sample_release("1.0.0")).unwrap();
        let err = catalog.insert_release(&sample_release("1.0.0")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let mut windows = sample_release("1.0.0");
        windows.platform = Platform::Windows;
        assert!(catalog.insert_release(&windows).is_ok());
    }

    #[test]
    fn test_replace_and_remove_require_existing() {
        let mut catalog = Catalog::default();
        let release = sample_release("1.0.0");
        assert_eq!(
            catalog.replace_release(&release).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        catalog.insert_release(&release).unwrap();

        let mut edited = release.clone();
        edited.release_notes = "notes".to_string();
        catalog.replace_release(&edited).unwrap();
        assert_eq!(catalog.get_release(&release.key()).unwrap().release_notes, "notes");

        catalog.remove_release(&release.key()).unwrap();
        assert_eq!(
            catalog.remove_release(&release.key()).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_applications_unique_and_sorted() {
        let mut catalog = Catalog::default();
        catalog
            .insert_application(&Application::new("zeta", "Zeta", vec![Platform::Linux]))
            .unwrap();
        catalog
            .insert_application(&Application::new("alpha", "Alpha", vec![Platform::Linux]))
            .unwrap();
        let err = catalog
            .insert_application(&Application::new("alpha", "Again", vec![Platform::Ios]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(catalog.applications[0].id, "alpha");
        assert_eq!(
            catalog.get_application("nope").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_toml_round_trip() {
        let mut catalog = Catalog::default();
        catalog
            .insert_application(&Application::new("acme", "Acme", vec![Platform::Linux]))
            .unwrap();
        let mut release = sample_release("1.5.0");
        release.minimum_version = Some("1.0.0".to_string());
        release.metadata.insert("channel".to_string(), "stable".to_string());
        catalog.insert_release(&release).unwrap();

        let text = toml::to_string_pretty(&catalog).unwrap();
        assert!(text.contains("[[release]]"));
        assert!(text.contains("[[application]]"));
        let back: Catalog = toml::from_str(&text).unwrap();
        assert_eq!(back.releases, vec![release]);
        assert_eq!(back.schema_version, SCHEMA_VERSION);
    }
}
