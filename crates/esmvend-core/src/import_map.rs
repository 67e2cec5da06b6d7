//! Import map synthesis (`{"imports": {...}}`) from the module table.

use anyhow::{Context, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::VendorError;
use crate::module_table::ModuleEntry;
use crate::storage;

/// File name of the import map inside the output directory.
pub const IMPORT_MAP_FILE: &str = "importmap.json";

/// Characters escaped in an address path segment: everything a URL parser
/// would treat as a delimiter or reject.
const ADDRESS_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Browser import map document. Keys are sorted so output is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportMap {
    pub imports: BTreeMap<String, String>,
}

impl ImportMap {
    /// One entry per stored module: canonical URL → `base` + local path.
    pub fn from_entries(entries: &[ModuleEntry], base: &str) -> Self {
        let imports = entries
            .iter()
            .map(|e| (e.url.clone(), address_for(base, &e.local_path)))
            .collect();
        Self { imports }
    }

    pub fn insert(&mut self, specifier: impl Into<String>, address: impl Into<String>) {
        self.imports.insert(specifier.into(), address.into());
    }

    pub fn get(&self, specifier: &str) -> Option<&str> {
        self.imports.get(specifier).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// Two-space indented JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }

    /// Serializes fully in memory, then writes atomically.
    pub fn write_to(&self, path: &Path) -> Result<(), VendorError> {
        let json = self.to_json()?;
        storage::write_atomic(path, json.as_bytes())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("read import map {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("parse import map {}", path.display()))
    }
}

/// Import map address for a local path. Each segment is percent-encoded
/// where needed. An empty base yields the bare encoded path; otherwise the
/// base is joined with exactly one `/`.
pub fn address_for(base: &str, local_path: &str) -> String {
    let encoded = local_path
        .split('/')
        .map(|seg| utf8_percent_encode(seg, ADDRESS_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/");
    if base.is_empty() {
        encoded
    } else if base.ends_with('/') {
        format!("{base}{encoded}")
    } else {
        format!("{base}/{encoded}")
    }
}
