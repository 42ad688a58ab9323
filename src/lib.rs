// Update determination core: versions, release catalog, stores and the update service

pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod service;
pub mod store;
pub mod version;

pub use catalog::{
    Application, ApplicationPolicy, Architecture, ChecksumAlgorithm, Page, Platform,
    RegisterReleaseRequest, Release, ReleaseEdit, ReleaseFilter, ReleaseKey,
};
pub use error::{Error, ErrorBody, ErrorKind, Result};
pub use service::{
    LatestRequest, LatestVersion, ReleaseSummary, UpdateDecision, UpdateRequest, UpdateService,
};
pub use store::{FileStore, MemoryStore, ReleaseStore, open_store};
pub use version::{Version, VersionError};
