//! Digest-based platform resolution.

use tracing::{debug, warn};

use super::{Installation, PlatformIdentity, identity_for_digest};
use crate::config::UnknownPlatformPolicy;
use crate::error::{DeployError, Result};
use crate::fs::ContentHasher;

/// Platform identity plus the digest it was derived from.
///
/// The digest doubles as the game identity pinned in the cache manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlatform {
    pub identity: PlatformIdentity,
    pub digest: String,
}

/// Maps an installation's identity file to a [`PlatformIdentity`].
#[derive(Debug, Clone, Copy)]
pub struct PlatformIdentityResolver {
    policy: UnknownPlatformPolicy,
}

impl PlatformIdentityResolver {
    pub fn new(policy: UnknownPlatformPolicy) -> Self {
        Self { policy }
    }

    /// Hash the identity file and look it up.
    ///
    /// An unrecognized digest resolves to [`PlatformIdentity::Unknown`];
    /// whether that stops the run is decided by the configured policy.
    pub fn resolve(&self, installation: &Installation) -> Result<ResolvedPlatform> {
        let digest = ContentHasher::strong_fingerprint(installation.identity_file())?;
        let identity = identity_for_digest(&digest);
        debug!(%identity, %digest, "Resolved platform");

        if !identity.is_known() {
            match self.policy {
                UnknownPlatformPolicy::Allow => warn!(
                    %digest,
                    "Unknown game version. If the game has recently updated, the framework will \
                     need to be patched by its developers. Continuing without a platform."
                ),
                UnknownPlatformPolicy::Deny => {
                    return Err(DeployError::UnknownPlatform { digest });
                }
            }
        }

        Ok(ResolvedPlatform { identity, digest })
    }
}
