// Catalog entities and their validation rules

pub mod application;
pub mod checksum;
pub mod filter;
pub mod platform;
pub mod registration;
pub mod release;

pub use application::{Application, ApplicationPolicy};
pub use checksum::{ChecksumAlgorithm, compute_checksum, verify_checksum};
pub use filter::{Page, ReleaseFilter, SortField, SortOrder};
pub use platform::{Architecture, Platform};
pub use registration::{RegisterReleaseRequest, ReleaseEdit};
pub use release::{Release, ReleaseKey};
