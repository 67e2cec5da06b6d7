//! Local relative path derivation from a canonical module URL.

use url::Url;

use super::sanitize::sanitize_segment;
use crate::checksum::sha256_prefix_hex;

/// Extensions a mapped path may already end with; anything else gets `.js`.
pub const SCRIPT_EXTENSIONS: [&str; 2] = [".mjs", ".js"];

/// Prefix of the fallback name used for URLs that cannot be mirrored.
pub const INVALID_PREFIX: &str = "invalid-";

const DEFAULT_EXTENSION: &str = ".js";
const INDEX_STEM: &str = "index";
const DIRECTORY_MARK: char = '_';

/// Maps a canonical module URL to a relative file path under the output
/// directory, e.g. `https://esm.sh/react@18/index.js` → `esm.sh/react@18/index.js`.
///
/// Pure and deterministic. A URL that does not parse, or has no host, maps to
/// `invalid-<sha256 prefix>.js` instead of failing.
///
/// Files always end in a script extension and directories never do (a
/// directory segment like `chart.js` becomes `chart.js_`), so one URL's file
/// can never be another URL's directory.
pub fn url_to_local_path(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) => match url.host_str() {
            Some(host) if !host.is_empty() => mirrored_path(&url, host),
            _ => invalid_url_name(raw),
        },
        Err(_) => invalid_url_name(raw),
    }
}

/// Inserts `.<digest of seed>` before the script extension of `local_path`.
/// Used to give a second URL a distinct name when two URLs map to one path.
pub fn with_digest_suffix(local_path: &str, seed: &str) -> String {
    let (stem, ext) = split_script_extension(local_path);
    format!("{}.{}{}", stem, sha256_prefix_hex(seed.as_bytes(), 4), ext)
}

fn mirrored_path(url: &Url, host: &str) -> String {
    let mut root = directory_name(sanitize_segment(host));
    if let Some(port) = url.port() {
        // `host:port/...` would parse as a URL scheme in an import map address.
        root.push('_');
        root.push_str(&port.to_string());
    }

    let mut segments: Vec<String> = url
        .path_segments()
        .map(|parts| {
            parts
                .filter(|s| !s.is_empty())
                .map(sanitize_segment)
                .collect()
        })
        .unwrap_or_default();
    if url.path().ends_with('/') || segments.is_empty() {
        segments.push(INDEX_STEM.to_string());
    }
    let file = segments.pop().unwrap_or_else(|| INDEX_STEM.to_string());

    let (stem, ext) = split_script_extension(&file);
    let mut name = stem.to_string();
    if let Some(query) = url.query() {
        name.push('.');
        name.push_str(&sha256_prefix_hex(query.as_bytes(), 4));
    }
    name.push_str(ext);

    let mut out = root;
    for seg in segments {
        out.push('/');
        out.push_str(&directory_name(seg));
    }
    out.push('/');
    out.push_str(&name);
    out
}

/// Directory form of a segment: anything a file name could end with gets a
/// trailing `_`.
fn directory_name(mut segment: String) -> String {
    if SCRIPT_EXTENSIONS.iter().any(|ext| segment.ends_with(ext)) {
        segment.push(DIRECTORY_MARK);
    }
    segment
}

/// Splits a trailing `.js`/`.mjs`; names without one get `.js` as extension.
fn split_script_extension(name: &str) -> (&str, &'static str) {
    for ext in SCRIPT_EXTENSIONS {
        if let Some(stem) = name.strip_suffix(ext) {
            return (stem, ext);
        }
    }
    (name, DEFAULT_EXTENSION)
}

fn invalid_url_name(raw: &str) -> String {
    format!(
        "{}{}{}",
        INVALID_PREFIX,
        sha256_prefix_hex(raw.as_bytes(), 8),
        DEFAULT_EXTENSION
    )
}
