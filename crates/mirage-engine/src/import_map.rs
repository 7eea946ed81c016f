//! Import maps for browser-native ESM targets

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ManifestConflictError;

/// One externally hosted package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifestEntry {
    /// Bare specifier the package is imported by
    pub name: String,
    /// Path of the package's ESM bundle under the CDN origin
    #[serde(alias = "versionedPath")]
    pub path: String,
}

impl PackageManifestEntry {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Parse a manifest file: a JSON array of `{ "name", "path" }` records
pub fn parse_manifest(json: &str) -> serde_json::Result<Vec<PackageManifestEntry>> {
    serde_json::from_str(json)
}

/// Browser import map (`{"imports": {...}}`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportMap {
    pub imports: IndexMap<String, String>,
}

impl ImportMap {
    /// Map each manifest entry's name to `origin/path`, keeping manifest
    /// order. A repeated name fails instead of overwriting.
    pub fn build(
        manifest: &[PackageManifestEntry],
        origin: &str,
    ) -> Result<Self, ManifestConflictError> {
        let mut imports = IndexMap::with_capacity(manifest.len());
        for entry in manifest {
            if imports.contains_key(&entry.name) {
                return Err(ManifestConflictError {
                    name: entry.name.clone(),
                });
            }
            imports.insert(entry.name.clone(), join_url(origin, &entry.path));
        }
        Ok(Self { imports })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.imports.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// `<script type="importmap">` element carrying this map
    pub fn to_script_tag(&self) -> serde_json::Result<String> {
        Ok(format!(
            "<script type=\"importmap\">\n{}\n</script>",
            escape_script(&self.to_json()?)
        ))
    }
}

/// Join an origin and a relative path with exactly one `/` between them.
/// Only one trailing slash on the origin and one leading slash on the path
/// are absorbed.
pub fn join_url(origin: &str, path: &str) -> String {
    let origin = origin.strip_suffix('/').unwrap_or(origin);
    let path = path.strip_prefix('/').unwrap_or(path);
    format!("{}/{}", origin, path)
}

/// Keep inline script content from closing its own element
pub(crate) fn escape_script(content: &str) -> String {
    content.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> Vec<PackageManifestEntry> {
        vec![
            PackageManifestEntry::new("vue", "vue@3.4.21/dist/vue.esm-browser.prod.js"),
            PackageManifestEntry::new("vuetify", "/vuetify@3.5.8/dist/vuetify.esm.js"),
            PackageManifestEntry::new("@vue/shared", "@vue/shared@3.4.21/dist/shared.esm-bundler.js"),
        ]
    }

    #[test]
    fn test_build_preserves_order() {
        let map = ImportMap::build(&manifest(), "https://cdn.example.com/").unwrap();
        let keys: Vec<_> = map.imports.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["vue", "vuetify", "@vue/shared"]);
        assert_eq!(
            map.get("vue"),
            Some("https://cdn.example.com/vue@3.4.21/dist/vue.esm-browser.prod.js")
        );
        assert_eq!(
            map.get("vuetify"),
            Some("https://cdn.example.com/vuetify@3.5.8/dist/vuetify.esm.js")
        );
    }

    #[test]
    fn test_duplicate_name_fails() {
        let mut entries = manifest();
        entries.push(PackageManifestEntry::new("vue", "vue@2/dist/vue.js"));
        let err = ImportMap::build(&entries, "https://cdn.example.com").unwrap_err();
        assert_eq!(err.name, "vue");
    }

    #[test]
    fn test_join_url_absorbs_one_slash() {
        assert_eq!(join_url("https://cdn", "a.js"), "https://cdn/a.js");
        assert_eq!(join_url("https://cdn/", "/a.js"), "https://cdn/a.js");
        assert_eq!(join_url("https://cdn//", "a.js"), "https://cdn//a.js");
        assert_eq!(join_url("", "a.js"), "/a.js");
    }

    #[test]
    fn test_manifest_accepts_versioned_path() {
        let entries = parse_manifest(
            r#"[{ "name": "vue", "path": "vue.js" }, { "name": "element-plus", "versionedPath": "ep@2/index.mjs" }]"#,
        )
        .unwrap();
        assert_eq!(entries[1], PackageManifestEntry::new("element-plus", "ep@2/index.mjs"));
    }

    #[test]
    fn test_serialized_form() {
        let map = ImportMap::build(&manifest()[..1], "https://cdn").unwrap();
        let json: serde_json::Value = serde_json::from_str(&map.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "imports": { "vue": "https://cdn/vue@3.4.21/dist/vue.esm-browser.prod.js" } })
        );
        let tag = map.to_script_tag().unwrap();
        assert!(tag.starts_with("<script type=\"importmap\">"));
        assert!(tag.ends_with("</script>"));
    }
}
