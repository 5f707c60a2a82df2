//! Content hashing for cache keys and installation identity.
//!
//! Two hash families with different jobs:
//! - XXH3-64 for source fingerprints. Fast, non-cryptographic, only ever
//!   compared against the previous run's map.
//! - MD5 for installation identity. The known-digest table in
//!   [`crate::platform`] is expressed in MD5, so this one is fixed by data.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use md5::{Digest, Md5};
use xxhash_rust::xxh3::{Xxh3, xxh3_64};

use crate::error::{DeployError, Result};
use crate::types::Fingerprint;

/// 256 KB buffer, matching the reads done for large archive-adjacent files.
const READ_BUFFER: usize = 256 * 1024;

/// Stateless hashing facade.
pub struct ContentHasher;

impl ContentHasher {
    /// Fingerprint a byte slice with XXH3-64.
    pub fn fingerprint(data: &[u8]) -> Fingerprint {
        Fingerprint::new(format!("{:016x}", xxh3_64(data)))
    }

    /// Stream a file through XXH3-64.
    pub fn fingerprint_file(path: &Path) -> Result<Fingerprint> {
        let mut hasher = Xxh3::new();
        stream_file(path, |chunk| hasher.update(chunk))?;
        Ok(Fingerprint::new(format!("{:016x}", hasher.digest())))
    }

    /// Stream a file through MD5 and return the lowercase hex digest.
    pub fn strong_fingerprint(path: &Path) -> Result<String> {
        let mut hasher = Md5::new();
        stream_file(path, |chunk| hasher.update(chunk))?;
        Ok(hex::encode(hasher.finalize()))
    }
}

fn stream_file(path: &Path, mut sink: impl FnMut(&[u8])) -> Result<()> {
    let file = File::open(path).map_err(|e| DeployError::io(path, e))?;
    let mut reader = BufReader::with_capacity(READ_BUFFER, file);
    let mut buffer = vec![0u8; READ_BUFFER];
    loop {
        let read = reader
            .read(&mut buffer)
            .map_err(|e| DeployError::io(path, e))?;
        if read == 0 {
            break;
        }
        sink(&buffer[..read]);
    }
    Ok(())
}
