//! Minimal plugin-driven module graph walker.
//!
//! The bundler owns traversal order and concurrency; everything it knows
//! about remote modules comes through [`Plugin`] hooks, in the style of
//! esbuild's `onResolve` / `onLoad`. Modules no plugin claims fall back to
//! plain filesystem resolution in the `file` namespace.
//!
//! Hooks are invoked from blocking worker threads, possibly several at once.

mod graph;
mod scan;

pub use graph::{BuildOptions, BuildOutcome, Bundler};
pub use scan::{scan_imports, ImportKind, ImportRecord, ScanError};

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Namespace of modules resolved and loaded from the local filesystem.
pub const FILE_NAMESPACE: &str = "file";

/// Identity of a module in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId {
    pub namespace: String,
    pub path: String,
}

impl ModuleId {
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            path: path.into(),
        }
    }

    pub fn file(path: PathBuf) -> Self {
        Self::new(FILE_NAMESPACE, path.to_string_lossy().into_owned())
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

/// How loaded contents are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loader {
    Js,
}

/// Input to [`Plugin::on_resolve`].
#[derive(Debug, Clone, Copy)]
pub struct ResolveArgs<'a> {
    pub specifier: &'a str,
    /// Importing module; `None` for entry points.
    pub importer: Option<&'a ModuleId>,
    pub kind: ImportKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveResult {
    pub path: String,
    pub namespace: String,
}

/// Input to [`Plugin::on_load`].
#[derive(Debug, Clone, Copy)]
pub struct LoadArgs<'a> {
    pub path: &'a str,
    pub namespace: &'a str,
}

#[derive(Debug, Clone)]
pub struct LoadResult {
    pub contents: Arc<str>,
    pub loader: Loader,
}

/// Resolve/load hooks. Returning `Ok(None)` means "not handled"; the next
/// plugin (or the default behavior) gets a turn. An `Err` becomes a build
/// diagnostic.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn on_resolve(&self, args: &ResolveArgs<'_>) -> anyhow::Result<Option<ResolveResult>>;

    fn on_load(&self, args: &LoadArgs<'_>) -> anyhow::Result<Option<LoadResult>>;
}

/// One build error. `module` is the module being loaded, or the importer of
/// the specifier that failed to resolve.
#[derive(Debug)]
pub struct Diagnostic {
    pub text: String,
    pub module: Option<ModuleId>,
    /// Hook error behind this diagnostic, kept for downcasting.
    pub error: Option<anyhow::Error>,
}

impl Diagnostic {
    pub fn new(text: impl Into<String>, module: Option<ModuleId>) -> Self {
        Self {
            text: text.into(),
            module,
            error: None,
        }
    }

    pub fn from_error(plugin: &str, error: anyhow::Error, module: Option<ModuleId>) -> Self {
        Self {
            text: format!("[plugin {plugin}] {error:#}"),
            module,
            error: Some(error),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.module {
            Some(m) => write!(f, "{}: {}", m.path, self.text),
            None => write!(f, "{}", self.text),
        }
    }
}
