//! Dynamic loader and linker
//!
//! Evaluates an artifact's entry file depth-first. Each import resolves, in
//! source order, to:
//! - a sibling file of the same [`VirtualFileSet`], evaluated at most once
//!   per load through the module cache
//! - a module from the target's [`ModuleRegistry`]
//!
//! Anything else aborts the load with [`LoadError::ModuleNotFound`].
//!
//! A sibling gets its cache entry before its body runs, so an import cycle
//! observes the partially populated namespace instead of re-evaluating.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use mirage_script::builtins::from_json;
use mirage_script::{
    ElementKind, Interpreter, ModuleHost, ModuleImport, ModuleNamespace, ScriptError,
    ScriptResult, Value, evaluate_module, parse, render_to_string,
};
use tracing::{debug, info, info_span};

use crate::error::{LoadError, LoadResult};
use crate::registry::ModuleRegistry;
use crate::vfs::{DEFAULT_EXTENSIONS, VirtualFileSet};

/// Module loader configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Extensions probed for extension-less sibling imports, in order
    pub extensions: Vec<String>,

    /// Nesting at which component code fails with a `RangeError`
    pub max_call_depth: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            max_call_depth: mirage_script::DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    /// Body is running; importers see a partial namespace
    Evaluating,
    Evaluated,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    namespace: Arc<ModuleNamespace>,
    state: ModuleState,
}

/// Loads artifacts against one target registry
#[derive(Debug, Clone)]
pub struct ModuleLoader {
    registry: Arc<ModuleRegistry>,
    config: LoaderConfig,
}

impl ModuleLoader {
    pub fn new(registry: Arc<ModuleRegistry>, config: LoaderConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// Get the loader configuration
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Evaluate `files` from its entry. Any failure aborts the whole load and
    /// is attributed to the file it originated in.
    pub fn load(&self, files: &VirtualFileSet) -> LoadResult<LoadedArtifact> {
        on_evaluation_stack(|| self.load_here(files)).unwrap_or_else(|err| {
            Err(LoadError::Evaluation {
                path: files.entry().to_string(),
                message: format!("failed to start evaluation thread: {}", err),
            })
        })
    }

    fn load_here(&self, files: &VirtualFileSet) -> LoadResult<LoadedArtifact> {
        let _span = info_span!("load", entry = files.entry(), files = files.len()).entered();
        let mut interp = Interpreter::with_max_depth(self.config.max_call_depth);
        let mut linker = Linker {
            files,
            registry: &self.registry,
            config: &self.config,
            cache: IndexMap::new(),
            registry_modules: HashMap::new(),
            importers: Vec::new(),
            order: Vec::new(),
            failure: None,
        };

        match linker.evaluate(files.entry(), &mut interp) {
            Ok(namespace) => {
                info!(modules = linker.order.len(), "artifact loaded");
                let modules = linker
                    .cache
                    .into_iter()
                    .map(|(path, entry)| (path, entry.namespace))
                    .collect();
                Ok(LoadedArtifact {
                    entry: files.entry().to_string(),
                    namespace,
                    modules,
                    order: linker.order,
                    interp,
                })
            }
            Err(err) => Err(linker.failure.take().unwrap_or_else(|| LoadError::Evaluation {
                path: files.entry().to_string(),
                message: err.to_string(),
            })),
        }
    }
}

/// Stack reserved for evaluating and rendering artifact code
pub const EVALUATION_STACK_SIZE: usize = 64 * 1024 * 1024; // 64 MB

/// Run `work` on a thread with [`EVALUATION_STACK_SIZE`] bytes of stack, so
/// the interpreter's call depth limit trips before the native stack runs out.
/// A panic in `work` resumes on the calling thread.
pub fn on_evaluation_stack<T, F>(work: F) -> std::io::Result<T>
where
    F: FnOnce() -> T + Send,
    T: Send,
{
    let parent = tracing::Span::current();
    std::thread::scope(|scope| {
        let handle = std::thread::Builder::new()
            .name("mirage-eval".into())
            .stack_size(EVALUATION_STACK_SIZE)
            .spawn_scoped(scope, move || {
                let _entered = parent.enter();
                work()
            })?;
        match handle.join() {
            Ok(value) => Ok(value),
            Err(payload) => std::panic::resume_unwind(payload),
        }
    })
}

/// Per-load linking state; serves imports for every file being evaluated
struct Linker<'a> {
    files: &'a VirtualFileSet,
    registry: &'a ModuleRegistry,
    config: &'a LoaderConfig,
    cache: IndexMap<String, CacheEntry>,
    /// One namespace per registry specifier for the duration of the load
    registry_modules: HashMap<String, Arc<ModuleNamespace>>,
    /// Files currently evaluating, innermost last
    importers: Vec<String>,
    order: Vec<String>,
    /// First (innermost) failure, reported instead of the unwound script error
    failure: Option<LoadError>,
}

impl Linker<'_> {
    fn fail(&mut self, error: LoadError) {
        if self.failure.is_none() {
            self.failure = Some(error);
        }
    }

    fn evaluate(
        &mut self,
        path: &str,
        interp: &mut Interpreter,
    ) -> ScriptResult<Arc<ModuleNamespace>> {
        let files = self.files;
        let Some(source) = files.source(path) else {
            self.fail(LoadError::MissingEntry(path.to_string()));
            return Err(ScriptError::Import(path.to_string()));
        };

        let namespace = Arc::new(ModuleNamespace::new());
        self.cache.insert(
            path.to_string(),
            CacheEntry {
                namespace: Arc::clone(&namespace),
                state: ModuleState::Evaluating,
            },
        );
        debug!(path, "evaluating module");

        self.importers.push(path.to_string());
        let result = match AssetKind::of(path) {
            Some(kind) => kind.populate(source, &namespace),
            None => parse(source)
                .and_then(|program| evaluate_module(&program, &namespace, self, interp)),
        };
        self.importers.pop();

        match result {
            Ok(()) => {
                if let Some(entry) = self.cache.get_mut(path) {
                    entry.state = ModuleState::Evaluated;
                }
                self.order.push(path.to_string());
                Ok(namespace)
            }
            Err(err) => {
                debug!(path, error = %err, "module evaluation failed");
                self.fail(LoadError::Evaluation {
                    path: path.to_string(),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    fn registry_module(&mut self, specifier: &str) -> Option<Arc<ModuleNamespace>> {
        if let Some(namespace) = self.registry_modules.get(specifier) {
            return Some(Arc::clone(namespace));
        }
        let namespace = self.registry.resolve(specifier).ok()?;
        self.registry_modules
            .insert(specifier.to_string(), Arc::clone(&namespace));
        Some(namespace)
    }
}

/// Non-script siblings an artifact may import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AssetKind {
    /// Side-effect only; the page styles are not part of the preview
    Style,
    /// Parsed into a `default` export
    Json,
}

impl AssetKind {
    pub(crate) fn of(path: &str) -> Option<Self> {
        let (_, ext) = path.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "css" | "scss" | "sass" | "less" => Some(Self::Style),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    fn populate(self, source: &str, namespace: &ModuleNamespace) -> ScriptResult<()> {
        match self {
            Self::Style => Ok(()),
            Self::Json => {
                let json: serde_json::Value = serde_json::from_str(source).map_err(|err| {
                    ScriptError::syntax(
                        format!("Invalid JSON: {:?}", err.classify()),
                        err.line() as u32,
                        err.column() as u32,
                    )
                })?;
                namespace.set("default", from_json(&json));
                Ok(())
            }
        }
    }
}

impl ModuleHost for Linker<'_> {
    fn import(&mut self, specifier: &str, interp: &mut Interpreter) -> ScriptResult<ModuleImport> {
        let importer = self.importers.last().cloned().unwrap_or_default();

        let files = self.files;
        if let Some(path) = files.resolve(specifier, &importer, &self.config.extensions) {
            if let Some(entry) = self.cache.get(path) {
                debug!(specifier, path, state = ?entry.state, "sibling from module cache");
                return Ok(ModuleImport {
                    namespace: Arc::clone(&entry.namespace),
                    complete: entry.state == ModuleState::Evaluated,
                });
            }
            let namespace = self.evaluate(path, interp)?;
            return Ok(ModuleImport {
                namespace,
                complete: true,
            });
        }

        if let Some(namespace) = self.registry_module(specifier) {
            return Ok(ModuleImport {
                namespace,
                complete: true,
            });
        }

        self.fail(LoadError::ModuleNotFound {
            specifier: specifier.to_string(),
            importer,
        });
        Err(ScriptError::Import(specifier.to_string()))
    }
}

/// A successfully loaded artifact
pub struct LoadedArtifact {
    entry: String,
    namespace: Arc<ModuleNamespace>,
    modules: IndexMap<String, Arc<ModuleNamespace>>,
    order: Vec<String>,
    interp: Interpreter,
}

impl LoadedArtifact {
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Entry file's export bag
    pub fn exports(&self) -> &Arc<ModuleNamespace> {
        &self.namespace
    }

    /// Entry file's default export; `undefined` when there is none
    pub fn default_export(&self) -> Value {
        self.namespace.get("default").unwrap_or_default()
    }

    /// Export bag of any file evaluated during the load
    pub fn module(&self, path: &str) -> Option<&Arc<ModuleNamespace>> {
        self.modules.get(path)
    }

    /// Paths in the order their evaluation completed
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Mount the default export as a component with no props and render it
    /// to HTML.
    pub fn render(&mut self) -> ScriptResult<String> {
        on_evaluation_stack(|| self.render_here()).unwrap_or_else(|err| {
            Err(ScriptError::Thrown(format!(
                "Error: failed to start render thread: {}",
                err
            )))
        })
    }

    fn render_here(&mut self) -> ScriptResult<String> {
        let root = Value::element(
            ElementKind::Component(self.default_export()),
            IndexMap::new(),
            Vec::new(),
        );
        render_to_string(&mut self.interp, &root)
    }
}

impl std::fmt::Debug for LoadedArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedArtifact")
            .field("entry", &self.entry)
            .field("exports", &self.namespace.keys())
            .field("order", &self.order)
            .finish()
    }
}
