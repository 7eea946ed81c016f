//! In-memory artifact files
//!
//! A [`VirtualFileSet`] is one artifact: a map from logical path to source
//! text plus the path of the entry file. Sets are immutable; a source change
//! produces a new set with a new [`VirtualFileSet::identity`].

use std::collections::BTreeMap;

use crate::error::FileSetError;

/// Extensions probed when an import omits one, in priority order
pub const DEFAULT_EXTENSIONS: &[&str] = &[".tsx", ".ts", ".jsx", ".js"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFileSet {
    files: BTreeMap<String, String>,
    entry: String,
}

impl VirtualFileSet {
    /// Build a file set. Paths are normalized (`./`, `..` and leading `/`
    /// removed); the entry must name one of the files after normalization.
    pub fn new<I, P, S>(files: I, entry: &str) -> Result<Self, FileSetError>
    where
        I: IntoIterator<Item = (P, S)>,
        P: AsRef<str>,
        S: Into<String>,
    {
        let files: BTreeMap<String, String> = files
            .into_iter()
            .map(|(path, source)| (normalize_path(path.as_ref()), source.into()))
            .collect();
        if files.is_empty() {
            return Err(FileSetError::Empty);
        }
        let entry = normalize_path(entry);
        if !files.contains_key(&entry) {
            return Err(FileSetError::MissingEntry(entry));
        }
        Ok(Self { files, entry })
    }

    /// Single-file artifact
    pub fn single(path: &str, source: impl Into<String>) -> Result<Self, FileSetError> {
        Self::new([(path, source.into())], path)
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn source(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Paths in sorted order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(path, source)| (path.as_str(), source.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Stable digest of the files and the entry path, used as the render
    /// boundary identity.
    pub fn identity(&self) -> String {
        let mut buffer = Vec::new();
        for (path, source) in &self.files {
            buffer.extend_from_slice(path.as_bytes());
            buffer.push(0);
            buffer.extend_from_slice(source.as_bytes());
            buffer.push(0);
        }
        buffer.push(0xff);
        buffer.extend_from_slice(self.entry.as_bytes());
        format!("{:x}", md5::compute(&buffer))
    }

    /// Resolve `specifier`, imported from `importer`, to a sibling file.
    ///
    /// Exact keys win. Relative (`./`, `../`) and root (`/`) specifiers are
    /// then normalized against the importer's directory and probed with each
    /// of `extensions` and as a directory `index` file.
    pub fn resolve(&self, specifier: &str, importer: &str, extensions: &[String]) -> Option<&str> {
        if let Some((path, _)) = self.files.get_key_value(specifier) {
            return Some(path);
        }
        let base = if specifier.starts_with("./") || specifier.starts_with("../") {
            match importer.rsplit_once('/') {
                Some((dir, _)) => normalize_path(&format!("{}/{}", dir, specifier)),
                None => normalize_path(specifier),
            }
        } else if let Some(rooted) = specifier.strip_prefix('/') {
            normalize_path(rooted)
        } else {
            return None;
        };

        let index = if base.is_empty() {
            "index".to_string()
        } else {
            format!("{}/index", base)
        };
        std::iter::once(base.clone())
            .chain(extensions.iter().map(|ext| format!("{}{}", base, ext)))
            .chain(extensions.iter().map(|ext| format!("{}{}", index, ext)))
            .find_map(|candidate| {
                self.files
                    .get_key_value(&candidate)
                    .map(|(path, _)| path.as_str())
            })
    }
}

/// Collapse `.` and `..` segments and strip leading and duplicate slashes.
/// `..` above the root is dropped.
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extensions() -> Vec<String> {
        DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
    }

    fn files() -> VirtualFileSet {
        VirtualFileSet::new(
            [
                ("App.tsx", "export default 1"),
                ("./components/Card.tsx", "export default 2"),
                ("components/index.ts", "export {}"),
                ("/lib/format.js", "export {}"),
                ("data.json", "{}"),
            ],
            "App.tsx",
        )
        .unwrap()
    }

    #[test]
    fn test_entry_must_exist() {
        let err = VirtualFileSet::new([("a.tsx", "")], "b.tsx").unwrap_err();
        assert_eq!(err, FileSetError::MissingEntry("b.tsx".to_string()));

        let err = VirtualFileSet::new(Vec::<(&str, &str)>::new(), "a.tsx").unwrap_err();
        assert_eq!(err, FileSetError::Empty);
    }

    #[test]
    fn test_paths_are_normalized() {
        let set = files();
        let paths: Vec<_> = set.paths().collect();
        assert_eq!(
            paths,
            vec!["App.tsx", "components/Card.tsx", "components/index.ts", "data.json", "lib/format.js"]
        );
        let entry_with_dot = VirtualFileSet::new([("./App.tsx", "")], "/App.tsx").unwrap();
        assert_eq!(entry_with_dot.entry(), "App.tsx");
    }

    #[test]
    fn test_resolve_siblings() {
        let set = files();
        let ext = extensions();
        assert_eq!(set.resolve("./components/Card", "App.tsx", &ext), Some("components/Card.tsx"));
        assert_eq!(set.resolve("./Card", "components/index.ts", &ext), Some("components/Card.tsx"));
        assert_eq!(set.resolve("../lib/format", "components/Card.tsx", &ext), Some("lib/format.js"));
        assert_eq!(set.resolve("./components", "App.tsx", &ext), Some("components/index.ts"));
        assert_eq!(set.resolve("/lib/format.js", "components/Card.tsx", &ext), Some("lib/format.js"));
        assert_eq!(set.resolve("./data.json", "App.tsx", &ext), Some("data.json"));
        assert_eq!(set.resolve("data.json", "components/Card.tsx", &ext), Some("data.json"));
    }

    #[test]
    fn test_bare_specifiers_are_not_probed() {
        let set = VirtualFileSet::new([("App.tsx", ""), ("react.tsx", "")], "App.tsx").unwrap();
        assert_eq!(set.resolve("react", "App.tsx", &extensions()), None);
        assert_eq!(set.resolve("./missing", "App.tsx", &extensions()), None);
    }

    #[test]
    fn test_identity_tracks_content_and_entry() {
        let a = VirtualFileSet::new([("a.tsx", "1"), ("b.tsx", "2")], "a.tsx").unwrap();
        let same = VirtualFileSet::new([("b.tsx", "2"), ("a.tsx", "1")], "a.tsx").unwrap();
        let other_entry = VirtualFileSet::new([("a.tsx", "1"), ("b.tsx", "2")], "b.tsx").unwrap();
        let edited = VirtualFileSet::new([("a.tsx", "1 "), ("b.tsx", "2")], "a.tsx").unwrap();

        assert_eq!(a.identity(), same.identity());
        assert_ne!(a.identity(), other_entry.identity());
        assert_ne!(a.identity(), edited.identity());
        assert_eq!(a.identity().len(), 32);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("./a/./b/../c.ts"), "a/c.ts");
        assert_eq!(normalize_path("//a//b"), "a/b");
        assert_eq!(normalize_path("../../x"), "x");
    }
}
