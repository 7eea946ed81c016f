//! Reading artifacts from disk.
//!
//! An input is either a directory (every source file, keyed by its path
//! relative to the directory), a JSON share-state document, or a single
//! source file.

use anyhow::{Context, Result};
use mirage_engine::{ShareState, Target, VirtualFileSet};
use std::path::Path;
use walkdir::WalkDir;

/// Entry candidates tried when neither flags nor config name one
const DEFAULT_ENTRIES: &[&str] = &[
    "App.tsx", "App.jsx", "App.ts", "App.js", "index.tsx", "index.jsx", "main.ts", "main.js",
];

/// Extensions collected from directory inputs
const SOURCE_EXTENSIONS: &[&str] = &["tsx", "ts", "jsx", "js", "mjs", "vue", "css"];

/// An artifact read from disk
#[derive(Debug)]
pub struct Artifact {
    pub files: VirtualFileSet,
    /// Target recorded in a share-state document
    pub target: Option<Target>,
}

/// Read `path` as an artifact. `entry` overrides the entry of directory
/// and share-state inputs.
pub fn read_artifact(path: &Path, entry: Option<&str>) -> Result<Artifact> {
    if path.is_dir() {
        let files = collect_dir(path)?;
        let entry = match entry {
            Some(entry) => entry.to_string(),
            None => default_entry(files.iter().map(|(path, _)| path.as_str()))
                .with_context(|| {
                    format!(
                        "No entry file found in {} (pass --entry)",
                        path.display()
                    )
                })?,
        };
        tracing::debug!(files = files.len(), %entry, "read artifact directory");
        let files = VirtualFileSet::new(files, &entry)
            .with_context(|| format!("Invalid artifact in {}", path.display()))?;
        return Ok(Artifact { files, target: None });
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "json") {
        let mut state: ShareState = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse share state {}", path.display()))?;
        if let Some(entry) = entry {
            state.entry = entry.to_string();
        }
        let files = state
            .file_set()
            .with_context(|| format!("Invalid share state {}", path.display()))?;
        return Ok(Artifact {
            files,
            target: state.target,
        });
    }

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} is not a file", path.display()))?;
    Ok(Artifact {
        files: VirtualFileSet::single(&name, content)?,
        target: None,
    })
}

/// Collect source files under `root`, keyed by `/`-separated relative path.
/// Hidden entries and `node_modules` are skipped.
fn collect_dir(root: &Path) -> Result<Vec<(String, String)>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_ignored(&e.file_name().to_string_lossy()));

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let is_source = path
            .extension()
            .is_some_and(|ext| SOURCE_EXTENSIONS.iter().any(|known| ext == *known));
        if !is_source {
            continue;
        }
        let relative = path
            .strip_prefix(root)
            .with_context(|| format!("{} is outside {}", path.display(), root.display()))?;
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        files.push((key, source));
    }
    Ok(files)
}

fn is_ignored(name: &str) -> bool {
    name.starts_with('.') || name == "node_modules"
}

fn default_entry<'a>(mut paths: impl Iterator<Item = &'a str> + Clone) -> Option<String> {
    DEFAULT_ENTRIES
        .iter()
        .find(|candidate| paths.clone().any(|path| path == **candidate))
        .map(|entry| entry.to_string())
        .or_else(|| {
            // A lone file is its own entry
            let first = paths.next()?;
            paths.next().is_none().then(|| first.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_read_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("components")).unwrap();
        fs::create_dir_all(dir.path().join("node_modules/react")).unwrap();
        fs::write(dir.path().join("App.tsx"), "export default 1;").unwrap();
        fs::write(dir.path().join("components/Card.tsx"), "export default 2;").unwrap();
        fs::write(dir.path().join("node_modules/react/index.js"), "").unwrap();
        fs::write(dir.path().join("README.md"), "# notes").unwrap();
        fs::write(dir.path().join(".env.js"), "").unwrap();

        let artifact = read_artifact(dir.path(), None).unwrap();
        assert_eq!(artifact.files.entry(), "App.tsx");
        let paths: Vec<_> = artifact.files.paths().collect();
        assert_eq!(paths, vec!["App.tsx", "components/Card.tsx"]);
    }

    #[test]
    fn test_directory_without_entry_needs_flag() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Widget.tsx"), "").unwrap();
        fs::write(dir.path().join("util.ts"), "").unwrap();

        assert!(read_artifact(dir.path(), None).is_err());
        let artifact = read_artifact(dir.path(), Some("Widget.tsx")).unwrap();
        assert_eq!(artifact.files.entry(), "Widget.tsx");
    }

    #[test]
    fn test_read_share_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.json");
        fs::write(
            &path,
            r#"{"target":"element-plus","entry":"main.js","files":{"main.js":"export default {};"}}"#,
        )
        .unwrap();

        let artifact = read_artifact(&path, None).unwrap();
        assert_eq!(artifact.target, Some(Target::ElementPlus));
        assert_eq!(artifact.files.entry(), "main.js");
    }

    #[test]
    fn test_read_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Hero.jsx");
        fs::write(&path, "export default () => <h1>Hi</h1>;").unwrap();

        let artifact = read_artifact(&path, None).unwrap();
        assert_eq!(artifact.files.entry(), "Hero.jsx");
        assert_eq!(artifact.files.len(), 1);
    }
}
