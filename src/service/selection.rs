// Candidate selection for update determination

use crate::catalog::{ApplicationPolicy, Release};
use crate::error::Result;
use crate::version::Version;
use log::{debug, warn};
use std::cmp::Ordering;

/// A release together with its parsed version
#[derive(Debug, Clone)]
pub struct Candidate {
    pub release: Release,
    pub version: Version,
}

/// Options narrowing which releases may be offered
#[derive(Debug, Clone, Copy)]
pub struct SelectionConfig<'a> {
    pub allow_prerelease: bool,
    pub policy: Option<&'a ApplicationPolicy>,
}

impl<'a> SelectionConfig<'a> {
    pub fn new(allow_prerelease: bool) -> Self {
        Self {
            allow_prerelease,
            policy: None,
        }
    }

    pub fn with_policy(mut self, policy: &'a ApplicationPolicy) -> Self {
        self.policy = Some(policy);
        self
    }
}

/// Pick the highest-precedence release.
///
/// Handles:
/// - Skipping releases whose version does not parse
/// - Dropping pre-releases unless allowed
/// - Dropping versions outside the application's bounds
/// - Ties on version going to the later release date, then catalog order
pub fn select_latest(
    releases: Vec<Release>,
    config: &SelectionConfig<'_>,
) -> Result<Option<Candidate>> {
    let mut best: Option<Candidate> = None;

    for release in releases {
        let version = match release.parsed_version() {
            Ok(version) => version,
            Err(e) => {
                warn!("Skipping release {} with unparseable version: {}", release.id(), e);
                continue;
            }
        };

        if version.is_prerelease() && !config.allow_prerelease {
            continue;
        }
        if let Some(policy) = config.policy
            && !policy.permits(&version)?
        {
            debug!("Release {} is outside the application's version bounds", release.id());
            continue;
        }

        let candidate = Candidate { release, version };
        best = match best {
            Some(current) if !outranks(&candidate, &current) => Some(current),
            _ => Some(candidate),
        };
    }

    if let Some(selected) = &best {
        debug!("Selected release {}", selected.release.id());
    }
    Ok(best)
}

fn outranks(challenger: &Candidate, incumbent: &Candidate) -> bool {
    match challenger.version.compare(&incumbent.version) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => challenger.release.release_date > incumbent.release.release_date,
    }
}
