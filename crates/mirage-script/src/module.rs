//! Module namespaces and module evaluation
//!
//! Evaluation links every import and re-export before any statement runs,
//! so a missing export fails the module without side effects. Imports are
//! live bindings into the exporting module's namespace.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::ast::{ExportDecl, ImportSpecifier, Program, Stmt};
use crate::error::{ScriptError, ScriptResult};
use crate::interpreter::Interpreter;
use crate::scope::Scope;
use crate::value::Value;

/// Resolves export names a namespace does not list explicitly
pub type ExportFallback = Arc<dyn Fn(&str) -> Option<Value> + Send + Sync>;

/// Exports of one module
pub struct ModuleNamespace {
    exports: RwLock<IndexMap<String, Value>>,
    fallback: Option<ExportFallback>,
}

impl ModuleNamespace {
    /// Create an empty namespace
    pub fn new() -> Self {
        Self {
            exports: RwLock::new(IndexMap::new()),
            fallback: None,
        }
    }

    /// Create a namespace with a fixed export list
    pub fn with_exports(exports: IndexMap<String, Value>) -> Self {
        Self {
            exports: RwLock::new(exports),
            fallback: None,
        }
    }

    /// Create a namespace that synthesizes unknown exports on first access
    pub fn with_fallback(exports: IndexMap<String, Value>, fallback: ExportFallback) -> Self {
        Self {
            exports: RwLock::new(exports),
            fallback: Some(fallback),
        }
    }

    /// Get an export value
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.exports.read().get(name) {
            return Some(value.clone());
        }
        let value = (self.fallback.as_ref()?)(name)?;
        Some(
            self.exports
                .write()
                .entry(name.to_string())
                .or_insert(value)
                .clone(),
        )
    }

    /// Set an export value
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.exports.write().insert(name.into(), value);
    }

    /// Check whether an export exists
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Whether unknown names may still resolve through a fallback
    pub fn is_open(&self) -> bool {
        self.fallback.is_some()
    }

    /// Export names materialized so far, in insertion order
    pub fn keys(&self) -> Vec<String> {
        self.exports.read().keys().cloned().collect()
    }

    /// Export entries materialized so far
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.exports
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl Default for ModuleNamespace {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModuleNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleNamespace")
            .field("exports", &self.keys())
            .field("open", &self.is_open())
            .finish()
    }
}

/// Namespace handed back by a [`ModuleHost`]
#[derive(Debug, Clone)]
pub struct ModuleImport {
    pub namespace: Arc<ModuleNamespace>,
    /// False while the module is still evaluating (import cycle). Export
    /// names are only checked against complete namespaces.
    pub complete: bool,
}

/// Supplies the namespaces a module imports
pub trait ModuleHost {
    /// Resolve `specifier`. Hosts that evaluate the imported module on
    /// demand do so with `interp`.
    fn import(&mut self, specifier: &str, interp: &mut Interpreter) -> ScriptResult<ModuleImport>;
}

fn require_export(import: &ModuleImport, specifier: &str, name: &str) -> ScriptResult<()> {
    if import.complete && !import.namespace.has(name) {
        return Err(ScriptError::MissingExport {
            module: specifier.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}

enum ReExport {
    Named {
        namespace: Arc<ModuleNamespace>,
        local: String,
        exported: String,
    },
    All(Arc<ModuleNamespace>),
}

impl ReExport {
    fn apply(&self, target: &ModuleNamespace) {
        match self {
            ReExport::Named {
                namespace,
                local,
                exported,
            } => {
                if let Some(value) = namespace.get(local) {
                    target.set(exported.clone(), value);
                }
            }
            ReExport::All(namespace) => {
                for (name, value) in namespace.entries() {
                    if name != "default" && !target.exports.read().contains_key(&name) {
                        target.set(name, value);
                    }
                }
            }
        }
    }
}

/// Local bindings a module exports, as `(local, exported)` pairs
fn local_exports(program: &Program) -> Vec<(&str, &str)> {
    let mut exports = Vec::new();
    for stmt in &program.body {
        match stmt {
            Stmt::Export(ExportDecl::Var(decl)) => {
                for (pattern, _) in &decl.declarations {
                    exports.extend(pattern.bound_names().into_iter().map(|name| (name, name)));
                }
            }
            Stmt::Export(ExportDecl::Named(specifiers)) => {
                exports.extend(
                    specifiers
                        .iter()
                        .map(|specifier| (specifier.local.as_str(), specifier.exported.as_str())),
                );
            }
            _ => {}
        }
    }
    exports
}

/// Copy every initialized local export into `namespace`
fn publish(exports: &[(&str, &str)], scope: &Scope, namespace: &ModuleNamespace) {
    for (local, exported) in exports {
        if scope.has_own(local)
            && let Ok(value) = scope.lookup(local)
        {
            namespace.set(*exported, value);
        }
    }
}

/// Evaluate `program` as a module, writing its exports into `namespace`.
pub fn evaluate_module(
    program: &Program,
    namespace: &Arc<ModuleNamespace>,
    host: &mut dyn ModuleHost,
    interp: &mut Interpreter,
) -> ScriptResult<()> {
    let scope = Scope::child(interp.globals());
    let mut re_exports = Vec::new();

    // Hoist function declarations before linking so cyclic importers see them
    for stmt in &program.body {
        match stmt {
            Stmt::Function(function) | Stmt::Export(ExportDecl::Function(function)) => {
                if let Some(name) = &function.name {
                    let closure = interp.make_closure(function, &scope);
                    scope.declare(name, closure.clone(), true);
                    if matches!(stmt, Stmt::Export(_)) {
                        namespace.set(name, closure);
                    }
                }
            }
            Stmt::Export(ExportDecl::DefaultFunction(function)) => {
                let closure = interp.make_closure(function, &scope);
                if let Some(name) = &function.name {
                    scope.declare(name, closure.clone(), true);
                }
                namespace.set("default", closure);
            }
            _ => {}
        }
    }
    let local_exports = local_exports(program);
    publish(&local_exports, &scope, namespace);

    // Link
    for stmt in &program.body {
        match stmt {
            Stmt::Import(decl) => {
                let import = host.import(&decl.source, interp)?;
                for specifier in &decl.specifiers {
                    match specifier {
                        ImportSpecifier::Default(local) => {
                            require_export(&import, &decl.source, "default")?;
                            scope.bind_import(local, Arc::clone(&import.namespace), "default");
                        }
                        ImportSpecifier::Namespace(local) => {
                            let namespace = Value::Namespace(Arc::clone(&import.namespace));
                            scope.declare(local, namespace, false);
                        }
                        ImportSpecifier::Named { imported, local } => {
                            require_export(&import, &decl.source, imported)?;
                            scope.bind_import(local, Arc::clone(&import.namespace), imported);
                        }
                    }
                }
            }
            Stmt::Export(ExportDecl::From { source, specifiers }) => {
                let import = host.import(source, interp)?;
                for specifier in specifiers {
                    require_export(&import, source, &specifier.local)?;
                    re_exports.push(ReExport::Named {
                        namespace: Arc::clone(&import.namespace),
                        local: specifier.local.clone(),
                        exported: specifier.exported.clone(),
                    });
                }
            }
            Stmt::Export(ExportDecl::All { source }) => {
                let import = host.import(source, interp)?;
                re_exports.push(ReExport::All(import.namespace));
            }
            _ => {}
        }
    }
    for re_export in &re_exports {
        re_export.apply(namespace);
    }

    // Execute. Local exports are published once initialized so cyclic
    // importers can read them before the body finishes.
    for stmt in &program.body {
        match stmt {
            Stmt::Export(ExportDecl::Var(decl)) => {
                interp.exec_var(decl, &scope)?;
            }
            Stmt::Export(ExportDecl::Default(expr)) => {
                let value = interp.eval_expr(expr, &scope)?;
                namespace.set("default", value);
            }
            Stmt::Import(_) | Stmt::Function(_) | Stmt::Export(_) => continue,
            other => {
                interp.exec_stmt(other, &scope)?;
            }
        }
        publish(&local_exports, &scope, namespace);
    }

    for (local, exported) in &local_exports {
        namespace.set(*exported, scope.lookup(local)?);
    }
    for re_export in &re_exports {
        re_export.apply(namespace);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::parser::parse;

    #[derive(Default)]
    struct MapHost {
        modules: HashMap<String, ModuleImport>,
        requested: Vec<String>,
    }

    impl MapHost {
        fn provide(&mut self, specifier: &str, exports: &[(&str, Value)]) {
            let exports = exports
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect();
            self.modules.insert(specifier.to_string(), ModuleImport {
                namespace: Arc::new(ModuleNamespace::with_exports(exports)),
                complete: true,
            });
        }
    }

    impl ModuleHost for MapHost {
        fn import(&mut self, specifier: &str, _: &mut Interpreter) -> ScriptResult<ModuleImport> {
            self.requested.push(specifier.to_string());
            self.modules
                .get(specifier)
                .cloned()
                .ok_or_else(|| ScriptError::Import(specifier.to_string()))
        }
    }

    fn run(source: &str, host: &mut MapHost) -> ScriptResult<Arc<ModuleNamespace>> {
        let program = parse(source)?;
        let namespace = Arc::new(ModuleNamespace::new());
        let mut interp = Interpreter::new();
        evaluate_module(&program, &namespace, host, &mut interp)?;
        Ok(namespace)
    }

    #[test]
    fn test_exports_are_collected() {
        let mut host = MapHost::default();
        host.provide("./math", &[("double", Value::native("double", |_, args| {
            Ok(Value::Number(args[0].to_number() * 2.0))
        }))]);
        let namespace = run(
            r#"
            import { double } from "./math";
            export const four = double(2);
            let counter = 1;
            counter += 1;
            export { counter as count };
            export default function main() { return helper(); }
            function helper() { return "ok"; }
            "#,
            &mut host,
        )
        .unwrap();
        assert!(matches!(namespace.get("four"), Some(Value::Number(n)) if n == 4.0));
        assert!(matches!(namespace.get("count"), Some(Value::Number(n)) if n == 2.0));
        assert!(matches!(namespace.get("default"), Some(Value::Function(_))));
        assert_eq!(namespace.keys(), vec!["default", "four", "count"]);
    }

    #[test]
    fn test_missing_export_fails_before_execution() {
        let mut host = MapHost::default();
        host.provide("lib", &[("present", Value::Null)]);
        let err = run(
            r#"
            export const early = 1;
            import { absent } from "lib";
            "#,
            &mut host,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScriptError::MissingExport { ref module, ref name } if module == "lib" && name == "absent"
        ));
    }

    #[test]
    fn test_incomplete_namespace_defers_check() {
        let mut host = MapHost::default();
        host.modules.insert("./cycle".into(), ModuleImport {
            namespace: Arc::new(ModuleNamespace::new()),
            complete: false,
        });
        let namespace = run(
            r#"
            import { later } from "./cycle";
            export function use() { return later; }
            "#,
            &mut host,
        )
        .unwrap();
        assert!(namespace.has("use"));
    }

    #[test]
    fn test_re_exports() {
        let mut host = MapHost::default();
        host.provide("./a", &[("x", Value::Number(1.0)), ("default", Value::Null)]);
        host.provide("./b", &[("y", Value::Number(2.0)), ("default", Value::Null)]);
        let namespace = run(
            r#"
            export { x as renamed } from "./a";
            export * from "./b";
            "#,
            &mut host,
        )
        .unwrap();
        assert!(namespace.has("renamed"));
        assert!(namespace.has("y"));
        assert!(!namespace.has("default"));
        assert_eq!(host.requested, vec!["./a", "./b"]);
    }

    #[test]
    fn test_fallback_namespace() {
        let fallback: ExportFallback = Arc::new(|name: &str| {
            name.ends_with("Icon").then(|| Value::string(name))
        });
        let namespace = ModuleNamespace::with_fallback(IndexMap::new(), fallback);
        assert!(namespace.has("SearchIcon"));
        assert!(!namespace.has("search"));
        assert_eq!(namespace.keys(), vec!["SearchIcon"]);
    }
}
