//! Lexical environments

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{ScriptError, ScriptResult};
use crate::module::ModuleNamespace;
use crate::value::Value;

/// A variable binding
#[derive(Debug, Clone)]
enum Binding {
    Value { value: Value, mutable: bool },
    /// Live view of another module's export
    Import {
        namespace: Arc<ModuleNamespace>,
        name: String,
    },
}

/// One environment in a scope chain
#[derive(Debug, Default)]
pub struct Scope {
    parent: Option<Arc<Scope>>,
    bindings: RwLock<HashMap<String, Binding>>,
}

impl Scope {
    /// Create a root scope
    pub fn root() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create a scope nested in `parent`
    pub fn child(parent: &Arc<Scope>) -> Arc<Self> {
        Arc::new(Self {
            parent: Some(Arc::clone(parent)),
            bindings: RwLock::new(HashMap::new()),
        })
    }

    /// Declare (or redeclare) a name in this scope
    pub fn declare(&self, name: impl Into<String>, value: Value, mutable: bool) {
        self.bindings
            .write()
            .insert(name.into(), Binding::Value { value, mutable });
    }

    /// Bind `local` to the export `name` of `namespace`
    pub fn bind_import(
        &self,
        local: impl Into<String>,
        namespace: Arc<ModuleNamespace>,
        name: &str,
    ) {
        self.bindings.write().insert(
            local.into(),
            Binding::Import {
                namespace,
                name: name.to_string(),
            },
        );
    }

    /// Whether this scope itself binds `name`
    pub fn has_own(&self, name: &str) -> bool {
        self.bindings.read().contains_key(name)
    }

    /// Resolve a name through the chain
    pub fn lookup(&self, name: &str) -> ScriptResult<Value> {
        let mut scope = self;
        loop {
            if let Some(binding) = scope.bindings.read().get(name) {
                return match binding {
                    Binding::Value { value, .. } => Ok(value.clone()),
                    Binding::Import {
                        namespace,
                        name: export,
                    } => namespace.get(export).ok_or_else(|| {
                        ScriptError::Reference(format!(
                            "Cannot access '{}' before initialization",
                            name
                        ))
                    }),
                };
            }
            match &scope.parent {
                Some(parent) => scope = parent.as_ref(),
                None => return Err(ScriptError::not_defined(name)),
            }
        }
    }

    /// Update an existing binding
    pub fn assign(&self, name: &str, value: Value) -> ScriptResult<()> {
        let mut scope = self;
        loop {
            {
                let mut bindings = scope.bindings.write();
                if let Some(binding) = bindings.get_mut(name) {
                    return match binding {
                        Binding::Value {
                            value: slot,
                            mutable: true,
                        } => {
                            *slot = value;
                            Ok(())
                        }
                        _ => Err(ScriptError::type_error("Assignment to constant variable.")),
                    };
                }
            }
            match &scope.parent {
                Some(parent) => scope = parent.as_ref(),
                None => return Err(ScriptError::not_defined(name)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_parents() {
        let root = Scope::root();
        root.declare("a", Value::Number(1.0), false);
        let inner = Scope::child(&root);
        inner.declare("b", Value::Number(2.0), true);
        assert!(matches!(inner.lookup("a"), Ok(Value::Number(n)) if n == 1.0));
        assert!(matches!(inner.lookup("b"), Ok(Value::Number(n)) if n == 2.0));
        assert!(matches!(root.lookup("b"), Err(ScriptError::Reference(_))));
    }

    #[test]
    fn test_assign_const_fails() {
        let root = Scope::root();
        root.declare("fixed", Value::Null, false);
        root.declare("open", Value::Null, true);
        let inner = Scope::child(&root);
        assert!(matches!(inner.assign("fixed", Value::Bool(true)), Err(ScriptError::Type(_))));
        inner.assign("open", Value::Bool(true)).unwrap();
        assert!(matches!(root.lookup("open"), Ok(Value::Bool(true))));
    }

    #[test]
    fn test_import_binding_is_live() {
        let namespace = Arc::new(ModuleNamespace::new());
        let scope = Scope::root();
        scope.bind_import("answer", Arc::clone(&namespace), "default");
        assert!(matches!(scope.lookup("answer"), Err(ScriptError::Reference(_))));
        namespace.set("default", Value::Number(42.0));
        assert!(matches!(scope.lookup("answer"), Ok(Value::Number(n)) if n == 42.0));
    }
}
