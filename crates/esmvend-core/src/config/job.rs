//! Per-job files (`url`, `output`, `importName`) in JSON, YAML or TOML.
//!
//! YAML documents nest the fields under a top-level `vendor:` key; a flat
//! YAML document is accepted as well. JSON and TOML are flat.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::VendorConfig;
use crate::driver::VendorOptions;
use crate::error::VendorError;

/// One entry URL or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EntryUrls {
    One(String),
    Many(Vec<String>),
}

impl EntryUrls {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            EntryUrls::One(u) => vec![u],
            EntryUrls::Many(v) => v,
        }
    }
}

/// Job fields from a config file or from CLI flags. Every field is optional
/// here; [`JobFile::into_options`] enforces what a run needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFile {
    #[serde(default)]
    pub url: Option<EntryUrls>,
    #[serde(default, alias = "outputDir", alias = "output_dir")]
    pub output: Option<PathBuf>,
    #[serde(default, alias = "import_name")]
    pub import_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum YamlJobDocument {
    Nested { vendor: JobFile },
    Flat(JobFile),
}

impl JobFile {
    /// Fields set in `self` win; unset fields fall back to `base`.
    pub fn overlay(self, base: JobFile) -> JobFile {
        JobFile {
            url: self.url.or(base.url),
            output: self.output.or(base.output),
            import_name: self.import_name.or(base.import_name),
        }
    }

    /// Validates the merged job and builds run options. Fails before any
    /// network activity when the entry URL or output directory is missing.
    pub fn into_options(self, cfg: &VendorConfig) -> Result<VendorOptions, VendorError> {
        let entry_points: Vec<String> = self
            .url
            .map(EntryUrls::into_vec)
            .unwrap_or_default()
            .into_iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();
        if entry_points.is_empty() {
            return Err(VendorError::Config(
                "missing entry URL (use --url or set `url` in the config file)".to_string(),
            ));
        }
        for entry in &entry_points {
            if !is_remote_entry(entry) && !Path::new(entry).is_file() {
                return Err(VendorError::Config(format!(
                    "entry {entry:?} is neither an http(s) URL nor an existing file"
                )));
            }
        }
        let output_dir = self.output.ok_or_else(|| {
            VendorError::Config(
                "missing output directory (use --output or set `output` in the config file)"
                    .to_string(),
            )
        })?;
        let import_name = self.import_name.filter(|n| !n.trim().is_empty());

        Ok(VendorOptions {
            entry_points,
            output_dir,
            import_name,
            max_concurrent_loads: cfg.max_concurrent_loads.max(1),
            import_map_base: cfg.import_map_base.clone(),
        })
    }
}

fn is_remote_entry(entry: &str) -> bool {
    url::Url::parse(entry)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Loads a job file, picking the format from the extension
/// (`.json`, `.yaml`/`.yml`, `.toml`). Unknown extensions try JSON, then YAML.
pub fn load_job_file(path: &Path) -> Result<JobFile> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let job = match ext.as_deref() {
        Some("json") => parse_json(&data),
        Some("yaml") | Some("yml") => parse_yaml(&data),
        Some("toml") => toml::from_str(&data).context("parse TOML"),
        _ => parse_json(&data).or_else(|_| parse_yaml(&data)),
    };
    job.with_context(|| format!("invalid config {}", path.display()))
}

fn parse_json(data: &str) -> Result<JobFile> {
    serde_json::from_str(data).context("parse JSON")
}

fn parse_yaml(data: &str) -> Result<JobFile> {
    let doc: YamlJobDocument = serde_yaml::from_str(data).context("parse YAML")?;
    Ok(match doc {
        YamlJobDocument::Nested { vendor } => vendor,
        YamlJobDocument::Flat(job) => job,
    })
}
