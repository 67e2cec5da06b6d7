//! Graph traversal: visit each module once, up to `max_concurrent` at a time.
//!
//! A visit loads the module, scans its imports and resolves each of them, all
//! on a tokio blocking thread since plugin hooks may block on the network.
//! The first error stops new visits from being scheduled; visits already in
//! flight run to completion and their diagnostics are kept.

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinSet;

use super::scan::{scan_imports, ImportKind};
use super::{Diagnostic, LoadArgs, LoadResult, Loader, ModuleId, Plugin, ResolveArgs, FILE_NAMESPACE};

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Entry specifiers, resolved with no importer.
    pub entry_points: Vec<String>,
    /// Maximum visits in flight.
    pub max_concurrent: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            entry_points: Vec::new(),
            max_concurrent: 8,
        }
    }
}

/// Result of a build: every module visited (sorted) and every diagnostic.
#[derive(Debug, Default)]
pub struct BuildOutcome {
    pub modules: Vec<ModuleId>,
    pub errors: Vec<Diagnostic>,
}

impl BuildOutcome {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct Bundler {
    options: BuildOptions,
    plugins: Vec<Arc<dyn Plugin>>,
}

struct Visit {
    module: ModuleId,
    deps: Vec<ModuleId>,
    errors: Vec<Diagnostic>,
}

impl Bundler {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            plugins: Vec::new(),
        }
    }

    /// Registers a plugin. Plugins are consulted in registration order.
    pub fn with_plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub async fn build(&self) -> BuildOutcome {
        let plugins: Arc<[Arc<dyn Plugin>]> = self.plugins.iter().cloned().collect();
        let max_concurrent = self.options.max_concurrent.max(1);

        let mut seen: HashSet<ModuleId> = HashSet::new();
        let mut queue: VecDeque<ModuleId> = VecDeque::new();
        let mut modules = Vec::new();
        let mut errors = Vec::new();

        for entry in &self.options.entry_points {
            match resolve_with(&plugins, entry, None, ImportKind::Entry) {
                Ok(id) => {
                    if seen.insert(id.clone()) {
                        queue.push_back(id);
                    }
                }
                Err(d) => errors.push(d),
            }
        }

        let mut join_set: JoinSet<Visit> = JoinSet::new();
        loop {
            while errors.is_empty() && join_set.len() < max_concurrent {
                let Some(module) = queue.pop_front() else {
                    break;
                };
                let plugins = Arc::clone(&plugins);
                join_set.spawn_blocking(move || visit(&plugins, module));
            }

            let Some(joined) = join_set.join_next().await else {
                break;
            };
            match joined {
                Ok(visit) => {
                    tracing::debug!(
                        module = %visit.module,
                        deps = visit.deps.len(),
                        "module visited"
                    );
                    for dep in visit.deps {
                        if seen.insert(dep.clone()) {
                            queue.push_back(dep);
                        }
                    }
                    modules.push(visit.module);
                    errors.extend(visit.errors);
                }
                Err(e) => errors.push(Diagnostic::new(format!("module task failed: {e}"), None)),
            }
        }

        modules.sort();
        BuildOutcome { modules, errors }
    }
}

fn visit(plugins: &[Arc<dyn Plugin>], module: ModuleId) -> Visit {
    let loaded = match load_with(plugins, &module) {
        Ok(loaded) => loaded,
        Err(d) => {
            return Visit {
                module,
                deps: Vec::new(),
                errors: vec![d],
            }
        }
    };

    let mut deps = Vec::new();
    let mut errors = Vec::new();
    match loaded.loader {
        Loader::Js => match scan_imports(&loaded.contents) {
            Ok(records) => {
                for record in records {
                    match resolve_with(plugins, &record.specifier, Some(&module), record.kind) {
                        Ok(id) => deps.push(id),
                        Err(d) => errors.push(d),
                    }
                }
            }
            Err(e) => errors.push(Diagnostic::new(e.to_string(), Some(module.clone()))),
        },
    }
    Visit {
        module,
        deps,
        errors,
    }
}

fn resolve_with(
    plugins: &[Arc<dyn Plugin>],
    specifier: &str,
    importer: Option<&ModuleId>,
    kind: ImportKind,
) -> Result<ModuleId, Diagnostic> {
    let args = ResolveArgs {
        specifier,
        importer,
        kind,
    };
    for plugin in plugins {
        match plugin.on_resolve(&args) {
            Ok(Some(r)) => return Ok(ModuleId::new(r.namespace, r.path)),
            Ok(None) => continue,
            Err(e) => return Err(Diagnostic::from_error(plugin.name(), e, importer.cloned())),
        }
    }
    default_resolve(specifier, importer)
}

fn load_with(plugins: &[Arc<dyn Plugin>], module: &ModuleId) -> Result<LoadResult, Diagnostic> {
    let args = LoadArgs {
        path: &module.path,
        namespace: &module.namespace,
    };
    for plugin in plugins {
        match plugin.on_load(&args) {
            Ok(Some(r)) => return Ok(r),
            Ok(None) => continue,
            Err(e) => return Err(Diagnostic::from_error(plugin.name(), e, Some(module.clone()))),
        }
    }
    default_load(module)
}

/// Filesystem resolution: entry points are paths; from `file` modules only
/// `./`, `../` and `/` specifiers resolve. Bare names are not looked up.
fn default_resolve(specifier: &str, importer: Option<&ModuleId>) -> Result<ModuleId, Diagnostic> {
    let candidate: Option<PathBuf> = match importer {
        None => Some(PathBuf::from(specifier)),
        Some(m) if m.namespace == FILE_NAMESPACE && is_path_like(specifier) => {
            Path::new(&m.path).parent().map(|dir| dir.join(specifier))
        }
        Some(_) => None,
    };
    candidate
        .and_then(|p| fs::canonicalize(p).ok())
        .filter(|p| p.is_file())
        .map(ModuleId::file)
        .ok_or_else(|| Diagnostic::new(format!("Could not resolve {specifier:?}"), importer.cloned()))
}

fn default_load(module: &ModuleId) -> Result<LoadResult, Diagnostic> {
    if module.namespace != FILE_NAMESPACE {
        return Err(Diagnostic::new(
            format!("No loader is configured for namespace {:?}", module.namespace),
            Some(module.clone()),
        ));
    }
    fs::read_to_string(&module.path)
        .map(|s| LoadResult {
            contents: Arc::from(s),
            loader: Loader::Js,
        })
        .map_err(|e| Diagnostic::new(format!("Could not read file: {e}"), Some(module.clone())))
}

fn is_path_like(specifier: &str) -> bool {
    specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
        || specifier == "."
        || specifier == ".."
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::ResolveResult;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const MEM: &str = "mem";

    /// Serves in-memory modules; specifiers are module names.
    struct MemPlugin {
        files: HashMap<&'static str, &'static str>,
        loads: Mutex<HashMap<String, usize>>,
    }

    impl MemPlugin {
        fn new(files: &[(&'static str, &'static str)]) -> Self {
            Self {
                files: files.iter().copied().collect(),
                loads: Mutex::new(HashMap::new()),
            }
        }

        fn loads(&self, name: &str) -> usize {
            self.loads.lock().unwrap().get(name).copied().unwrap_or(0)
        }
    }

    impl Plugin for MemPlugin {
        fn name(&self) -> &str {
            "mem"
        }

        fn on_resolve(&self, args: &ResolveArgs<'_>) -> anyhow::Result<Option<ResolveResult>> {
            if args.specifier == "boom" {
                anyhow::bail!("resolver exploded");
            }
            Ok(self.files.contains_key(args.specifier).then(|| ResolveResult {
                path: args.specifier.to_string(),
                namespace: MEM.to_string(),
            }))
        }

        fn on_load(&self, args: &LoadArgs<'_>) -> anyhow::Result<Option<LoadResult>> {
            if args.namespace != MEM {
                return Ok(None);
            }
            *self.loads.lock().unwrap().entry(args.path.to_string()).or_default() += 1;
            match self.files.get(args.path) {
                Some(src) => Ok(Some(LoadResult {
                    contents: Arc::from(*src),
                    loader: Loader::Js,
                })),
                None => anyhow::bail!("no such module {}", args.path),
            }
        }
    }

    fn bundler(entries: &[&str], plugin: Arc<MemPlugin>) -> Bundler {
        Bundler::new(BuildOptions {
            entry_points: entries.iter().map(|s| s.to_string()).collect(),
            max_concurrent: 4,
        })
        .with_plugin(plugin)
    }

    #[tokio::test]
    async fn diamond_graph_visits_shared_module_once() {
        let plugin = Arc::new(MemPlugin::new(&[
            ("a", r#"import "b"; import "c";"#),
            ("b", r#"import "d"; export const b = 1;"#),
            ("c", r#"export * from "d";"#),
            ("d", "export const d = 1;"),
        ]));
        let outcome = bundler(&["a"], Arc::clone(&plugin)).build().await;
        assert!(outcome.is_ok(), "{:?}", outcome.errors);
        let paths: Vec<&str> = outcome.modules.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["a", "b", "c", "d"]);
        assert_eq!(plugin.loads("d"), 1);
    }

    #[tokio::test]
    async fn unresolvable_import_is_reported() {
        let plugin = Arc::new(MemPlugin::new(&[("a", r#"import "lodash";"#)]));
        let outcome = bundler(&["a"], plugin).build().await;
        assert_eq!(outcome.errors.len(), 1);
        let d = &outcome.errors[0];
        assert_eq!(d.text, "Could not resolve \"lodash\"");
        assert_eq!(d.module.as_ref().map(|m| m.path.as_str()), Some("a"));
        assert_eq!(d.to_string(), "a: Could not resolve \"lodash\"");
    }

    #[tokio::test]
    async fn hook_errors_keep_their_source() {
        let plugin = Arc::new(MemPlugin::new(&[("a", r#"import "boom";"#)]));
        let outcome = bundler(&["a"], plugin).build().await;
        assert_eq!(outcome.errors.len(), 1);
        let d = &outcome.errors[0];
        assert!(d.text.contains("resolver exploded"));
        assert!(d.error.is_some());
    }

    #[tokio::test]
    async fn syntax_error_is_a_diagnostic_on_the_module() {
        let plugin = Arc::new(MemPlugin::new(&[
            ("a", r#"import "b";"#),
            ("b", "export const = ;"),
        ]));
        let outcome = bundler(&["a"], plugin).build().await;
        assert_eq!(outcome.errors.len(), 1);
        let d = &outcome.errors[0];
        assert_eq!(d.module.as_ref().map(|m| m.path.as_str()), Some("b"));
        assert!(d.text.starts_with("syntax error:"), "{}", d.text);
    }

    #[tokio::test]
    async fn unknown_entry_is_reported_without_visits() {
        let plugin = Arc::new(MemPlugin::new(&[]));
        let outcome = bundler(&["definitely/not/here.js"], plugin).build().await;
        assert!(outcome.modules.is_empty());
        assert_eq!(outcome.errors.len(), 1);
    }

    #[tokio::test]
    async fn filesystem_modules_resolve_relative_to_importer() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.js"), "import './lib/dep.js';").unwrap();
        fs::create_dir(dir.path().join("lib")).unwrap();
        fs::write(dir.path().join("lib/dep.js"), "export default 1;").unwrap();

        let entry = dir.path().join("main.js").to_string_lossy().into_owned();
        let outcome = Bundler::new(BuildOptions {
            entry_points: vec![entry],
            max_concurrent: 2,
        })
        .build()
        .await;
        assert!(outcome.is_ok(), "{:?}", outcome.errors);
        assert_eq!(outcome.modules.len(), 2);
        assert!(outcome.modules.iter().all(|m| m.namespace == FILE_NAMESPACE));
        assert!(outcome.modules.iter().any(|m| m.path.ends_with("dep.js")));
    }

    #[test]
    fn path_like_specifiers() {
        assert!(is_path_like("./a.js"));
        assert!(is_path_like("../a.js"));
        assert!(is_path_like("/a.js"));
        assert!(!is_path_like("a.js"));
        assert!(!is_path_like("lodash"));
    }
}
