//! Platform identity detection.
//!
//! The distribution channel is inferred by hashing an installation file and
//! looking the digest up in a fixed table. Which file gets hashed depends on
//! the installation layout (see [`install`]).

pub mod install;
pub mod resolver;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use install::{Installation, Layout};
pub use resolver::{PlatformIdentityResolver, ResolvedPlatform};

/// Distribution channel of the installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformIdentity {
    Epic,
    Steam,
    Microsoft,
    /// Digest not in the table: a new game patch, or a modified executable.
    Unknown,
}

impl PlatformIdentity {
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }
}

impl fmt::Display for PlatformIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Epic => "epic",
            Self::Steam => "steam",
            Self::Microsoft => "microsoft",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// MD5 digests of known identity files.
pub const KNOWN_DIGESTS: &[(&str, PlatformIdentity)] = &[
    // Epic executable: base, camera unlock, no collision, both
    ("7ece206ec0cf963b6fb4174e682e34c7", PlatformIdentity::Epic),
    ("fca4ea3830d30a486eb4fed444557827", PlatformIdentity::Epic),
    ("56130f7cb3df6c7e313a10a8c9050759", PlatformIdentity::Epic),
    ("ed959d30a4701d9df58f162b3c15dc47", PlatformIdentity::Epic),
    // Steam executable: base, camera unlock, no collision, both
    ("89fad9435f2c22b06ff977189b198596", PlatformIdentity::Steam),
    ("b08c8bef3f5c3b28d9ca81e537e0fc5d", PlatformIdentity::Steam),
    ("368df1a22ca8362e713aba745e2af94f", PlatformIdentity::Steam),
    ("7fd58f4b28b45dc78bcea600a314cdd0", PlatformIdentity::Steam),
    // Microsoft store config; the packaged executable can't be read
    ("f610f65c81a20c1f19f9caf96a63b286", PlatformIdentity::Microsoft),
];

/// Look a digest up in [`KNOWN_DIGESTS`]. Case-insensitive.
pub fn identity_for_digest(digest: &str) -> PlatformIdentity {
    KNOWN_DIGESTS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(digest))
        .map(|(_, identity)| *identity)
        .unwrap_or(PlatformIdentity::Unknown)
}
