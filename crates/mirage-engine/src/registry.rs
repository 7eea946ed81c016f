//! Module registry
//!
//! Maps import specifiers to export bags for one target. Lookup is two-tier:
//! an exact table, then prefix rules tried from the longest prefix down.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use mirage_script::{ModuleNamespace, Value};
use tracing::debug;

use crate::error::ModuleNotFoundError;

/// Resolves the residual path after a matched prefix. `None` lets shorter
/// prefixes try.
pub type PrefixResolver = Arc<dyn Fn(&str) -> Option<Arc<ModuleNamespace>> + Send + Sync>;

struct PrefixRule {
    prefix: String,
    resolver: PrefixResolver,
}

/// Immutable specifier table for one target
#[derive(Default)]
pub struct ModuleRegistry {
    exact: HashMap<String, Arc<ModuleNamespace>>,
    /// Sorted by descending prefix length
    prefixes: Vec<PrefixRule>,
}

impl ModuleRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Resolve a specifier to its export bag
    pub fn resolve(&self, specifier: &str) -> Result<Arc<ModuleNamespace>, ModuleNotFoundError> {
        if let Some(namespace) = self.exact.get(specifier) {
            debug!(specifier, "resolved exact registry module");
            return Ok(Arc::clone(namespace));
        }
        for rule in &self.prefixes {
            if let Some(residual) = specifier.strip_prefix(rule.prefix.as_str())
                && let Some(namespace) = (rule.resolver)(residual)
            {
                debug!(specifier, prefix = %rule.prefix, "resolved registry prefix");
                return Ok(namespace);
            }
        }
        Err(ModuleNotFoundError {
            specifier: specifier.to_string(),
        })
    }

    pub fn contains(&self, specifier: &str) -> bool {
        self.resolve(specifier).is_ok()
    }

    /// Exactly registered specifiers, sorted
    pub fn specifiers(&self) -> Vec<&str> {
        let mut specifiers: Vec<&str> = self.exact.keys().map(String::as_str).collect();
        specifiers.sort_unstable();
        specifiers
    }

    /// Registered prefixes, longest first
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(|rule| rule.prefix.as_str())
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("exact", &self.specifiers())
            .field("prefixes", &self.prefixes().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`ModuleRegistry`]
#[derive(Default)]
pub struct RegistryBuilder {
    exact: HashMap<String, Arc<ModuleNamespace>>,
    prefixes: Vec<PrefixRule>,
}

impl RegistryBuilder {
    /// Register an export bag under an exact specifier. A later registration
    /// of the same specifier replaces the earlier one.
    pub fn module(mut self, specifier: impl Into<String>, namespace: Arc<ModuleNamespace>) -> Self {
        self.exact.insert(specifier.into(), namespace);
        self
    }

    /// Register a fixed set of named exports under an exact specifier
    pub fn exports<I, K>(self, specifier: impl Into<String>, exports: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let exports: IndexMap<String, Value> = exports
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect();
        self.module(specifier, Arc::new(ModuleNamespace::with_exports(exports)))
    }

    /// Register a resolver for every specifier starting with `prefix`
    pub fn prefix<F>(mut self, prefix: impl Into<String>, resolver: F) -> Self
    where
        F: Fn(&str) -> Option<Arc<ModuleNamespace>> + Send + Sync + 'static,
    {
        self.prefixes.push(PrefixRule {
            prefix: prefix.into(),
            resolver: Arc::new(resolver),
        });
        self
    }

    pub fn build(mut self) -> ModuleRegistry {
        // Stable sort keeps registration order among equal lengths
        self.prefixes.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        ModuleRegistry {
            exact: self.exact,
            prefixes: self.prefixes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(tag: &str) -> Arc<ModuleNamespace> {
        let mut exports = IndexMap::new();
        exports.insert("tag".to_string(), Value::from(tag));
        Arc::new(ModuleNamespace::with_exports(exports))
    }

    fn tag(namespace: &ModuleNamespace) -> String {
        namespace
            .get("tag")
            .map(|value| value.to_display_string())
            .unwrap_or_default()
    }

    fn registry() -> ModuleRegistry {
        ModuleRegistry::builder()
            .module("@ui/kit", bag("kit"))
            .module("@ui/kit/button", bag("exact-button"))
            .prefix("@ui/", |residual| Some(bag(&format!("ui:{}", residual))))
            .prefix("@ui/kit/", |residual| {
                (residual != "skip").then(|| bag(&format!("kit:{}", residual)))
            })
            .build()
    }

    #[test]
    fn test_exact_beats_prefix() {
        let registry = registry();
        assert_eq!(tag(&registry.resolve("@ui/kit/button").unwrap()), "exact-button");
        assert_eq!(tag(&registry.resolve("@ui/kit").unwrap()), "kit");
    }

    #[test]
    fn test_longest_prefix_wins() {
        let registry = registry();
        assert_eq!(tag(&registry.resolve("@ui/kit/card").unwrap()), "kit:card");
        assert_eq!(tag(&registry.resolve("@ui/other").unwrap()), "ui:other");
    }

    #[test]
    fn test_declined_prefix_falls_through() {
        let registry = registry();
        assert_eq!(tag(&registry.resolve("@ui/kit/skip").unwrap()), "ui:kit/skip");
    }

    #[test]
    fn test_unmatched_specifier_fails() {
        let err = registry().resolve("unknown-pkg").unwrap_err();
        assert_eq!(err.specifier, "unknown-pkg");
        assert_eq!(err.to_string(), "Cannot find module 'unknown-pkg'");
    }

    #[test]
    fn test_listing() {
        let registry = registry();
        assert_eq!(registry.specifiers(), vec!["@ui/kit", "@ui/kit/button"]);
        assert_eq!(registry.prefixes().collect::<Vec<_>>(), vec!["@ui/kit/", "@ui/"]);
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ModuleRegistry>();
    }
}
