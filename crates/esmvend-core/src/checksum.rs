//! SHA-256 helpers: short digests for generated filenames and whole-file
//! digests for `esmvend verify`.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Lowercase hex of the first `prefix_bytes` bytes of SHA-256(`data`).
/// `prefix_bytes` is clamped to the digest length (32).
pub fn sha256_prefix_hex(data: &[u8], prefix_bytes: usize) -> String {
    let digest = Sha256::digest(data);
    let take = prefix_bytes.min(digest.len());
    hex::encode(&digest[..take])
}

/// Compute SHA-256 of a file and return the digest as lowercase hex.
pub fn sha256_path(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
