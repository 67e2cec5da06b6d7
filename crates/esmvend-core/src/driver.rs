//! One vendoring run: bundle from the entry points, write every fetched
//! module, then emit the import map.
//!
//! Nothing is written to the output directory (other than creating it)
//! unless the build succeeds.

use std::path::PathBuf;
use std::sync::Arc;

use crate::bundler::{
    BuildOptions, Bundler, Diagnostic, LoadArgs, LoadResult, Loader, Plugin, ResolveArgs,
    ResolveResult,
};
use crate::error::{FetchError, VendorError};
use crate::fetch::Fetch;
use crate::import_map::{ImportMap, IMPORT_MAP_FILE};
use crate::module_table::ModuleTable;
use crate::resolver::{self, Resolution};
use crate::storage;

/// Bundler namespace of remote modules. Paths in it are canonical URLs.
pub const HTTP_NAMESPACE: &str = "http";

/// Validated inputs of a run (see [`crate::config::JobFile::into_options`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorOptions {
    /// Entry URLs or local files, in the order given.
    pub entry_points: Vec<String>,
    pub output_dir: PathBuf,
    /// Extra import map key aliasing the first entry URL.
    pub import_name: Option<String>,
    pub max_concurrent_loads: usize,
    pub import_map_base: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorReport {
    /// Number of module files written.
    pub modules: usize,
    pub import_map_path: PathBuf,
}

/// Bundler plugin that routes remote specifiers to the module table.
pub struct HttpPlugin {
    table: Arc<ModuleTable>,
    fetcher: Arc<dyn Fetch>,
}

impl HttpPlugin {
    pub fn new(table: Arc<ModuleTable>, fetcher: Arc<dyn Fetch>) -> Self {
        Self { table, fetcher }
    }
}

impl Plugin for HttpPlugin {
    fn name(&self) -> &str {
        "esmvend-http"
    }

    fn on_resolve(&self, args: &ResolveArgs<'_>) -> anyhow::Result<Option<ResolveResult>> {
        let importer = args.importer.map(|m| m.path.as_str());
        Ok(match resolver::resolve(args.specifier, importer) {
            Resolution::Remote(url) => Some(ResolveResult {
                path: url,
                namespace: HTTP_NAMESPACE.to_string(),
            }),
            Resolution::Declined => None,
        })
    }

    fn on_load(&self, args: &LoadArgs<'_>) -> anyhow::Result<Option<LoadResult>> {
        if args.namespace != HTTP_NAMESPACE {
            return Ok(None);
        }
        let contents = self.table.get_or_load(args.path, self.fetcher.as_ref())?;
        Ok(Some(LoadResult {
            contents,
            loader: Loader::Js,
        }))
    }
}

/// Runs one vendoring job with a fresh module table.
pub async fn vendor(opts: &VendorOptions, fetcher: Arc<dyn Fetch>) -> Result<VendorReport, VendorError> {
    storage::ensure_dir(&opts.output_dir)?;

    let table = Arc::new(ModuleTable::new());
    let plugin = Arc::new(HttpPlugin::new(Arc::clone(&table), fetcher));
    let bundler = Bundler::new(BuildOptions {
        entry_points: opts.entry_points.clone(),
        max_concurrent: opts.max_concurrent_loads,
    })
    .with_plugin(plugin);

    tracing::info!(entries = ?opts.entry_points, output = %opts.output_dir.display(), "vendoring");
    let outcome = bundler.build().await;
    if !outcome.is_ok() {
        return Err(build_failure(outcome.errors));
    }

    let entries = table.entries();
    let modules = storage::write_modules(&opts.output_dir, &entries)?;

    let mut map = ImportMap::from_entries(&entries, &opts.import_map_base);
    if let Some(name) = &opts.import_name {
        let first_address = opts
            .entry_points
            .first()
            .and_then(|e| resolver::resolve(e, None).remote_url().map(str::to_string))
            .and_then(|url| map.get(&url).map(str::to_string));
        match first_address {
            Some(address) => map.insert(name.clone(), address),
            None => tracing::warn!(name = name.as_str(), "import name ignored: first entry is not a remote module"),
        }
    }

    let import_map_path = opts.output_dir.join(IMPORT_MAP_FILE);
    map.write_to(&import_map_path)?;
    tracing::info!(
        modules,
        import_map = %import_map_path.display(),
        "vendoring complete"
    );

    Ok(VendorReport {
        modules,
        import_map_path,
    })
}

/// Logs every diagnostic. A failed fetch becomes [`VendorError::Fetch`] so
/// callers can see the URL and status; anything else is a bundle failure.
fn build_failure(errors: Vec<Diagnostic>) -> VendorError {
    for d in &errors {
        tracing::error!(module = ?d.module.as_ref().map(|m| m.to_string()), "{}", d.text);
    }
    let mut diagnostics = Vec::with_capacity(errors.len());
    let mut fetch_error: Option<FetchError> = None;
    for d in errors {
        diagnostics.push(d.to_string());
        if fetch_error.is_none() {
            if let Some(e) = d.error {
                fetch_error = e.downcast::<FetchError>().ok();
            }
        }
    }
    match fetch_error {
        Some(e) => VendorError::Fetch(e),
        None => VendorError::Bundle { diagnostics },
    }
}
