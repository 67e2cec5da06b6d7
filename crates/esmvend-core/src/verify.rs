//! Checks a vendored directory against its `importmap.json`.

use anyhow::{bail, Context, Result};
use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};

use crate::checksum;
use crate::import_map::{ImportMap, IMPORT_MAP_FILE};

/// One import map entry whose file exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedModule {
    pub specifier: String,
    pub path: PathBuf,
    pub sha256: String,
}

/// Every import map address must start with `base` and name a file inside
/// `dir`. Addresses are percent-decoded before the lookup, as a static
/// server would. Results follow import map key order.
pub fn verify_output(dir: &Path, base: &str) -> Result<Vec<VerifiedModule>> {
    let map = ImportMap::load(&dir.join(IMPORT_MAP_FILE))?;
    let mut out = Vec::with_capacity(map.len());
    for (specifier, address) in &map.imports {
        let rel = address
            .strip_prefix(base)
            .with_context(|| format!("{specifier}: address {address:?} does not start with {base:?}"))?;
        let rel = percent_decode_str(rel.trim_start_matches('/')).decode_utf8_lossy();
        let rel: &str = &rel;
        if !is_contained(Path::new(rel)) {
            bail!("{specifier}: address {address:?} escapes the output directory");
        }
        let path = dir.join(rel);
        if !path.is_file() {
            bail!("{specifier}: missing file {}", path.display());
        }
        let sha256 = checksum::sha256_path(&path)?;
        tracing::debug!(specifier = specifier.as_str(), path = %path.display(), "verified");
        out.push(VerifiedModule {
            specifier: specifier.clone(),
            path,
            sha256,
        });
    }
    Ok(out)
}

fn is_contained(rel: &Path) -> bool {
    rel.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
