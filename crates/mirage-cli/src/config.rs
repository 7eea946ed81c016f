//! Configuration file parsing for mirage.toml.

use anyhow::Context;
use mirage_engine::{LoaderConfig, Target};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file names to search for, in priority order
const CONFIG_NAMES: &[&str] = &["mirage.toml", ".miragerc.toml"];

/// Main configuration structure.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Preview defaults
    #[serde(default)]
    pub preview: PreviewConfig,

    /// CDN used by native-ESM targets
    #[serde(default)]
    pub cdn: CdnConfig,

    /// Loader settings
    #[serde(default)]
    pub loader: LoaderSection,

    /// Directory of the config file; relative paths resolve against it
    #[serde(skip)]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewConfig {
    pub target: Option<Target>,
    pub entry: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CdnConfig {
    pub origin: Option<String>,

    /// Package manifest (JSON array of `{ name, path }`)
    pub manifest: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoaderSection {
    pub extensions: Option<Vec<String>>,
    pub max_call_depth: Option<usize>,
}

impl Config {
    /// Loader configuration with unset fields defaulted
    pub fn loader_config(&self) -> LoaderConfig {
        let mut config = LoaderConfig::default();
        if let Some(extensions) = &self.loader.extensions {
            config.extensions = extensions.clone();
        }
        if let Some(depth) = self.loader.max_call_depth {
            config.max_call_depth = depth;
        }
        config
    }

    /// Manifest path from the config, resolved against the config directory
    pub fn manifest_path(&self) -> Option<PathBuf> {
        let manifest = self.cdn.manifest.as_ref()?;
        Some(match &self.root {
            Some(root) if manifest.is_relative() => root.join(manifest),
            _ => manifest.clone(),
        })
    }
}

/// Load configuration from a file or search for default config files.
///
/// An explicit `path` must exist; without one, a missing config yields the
/// defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config_path = match path {
        Some(path) if !path.exists() => {
            anyhow::bail!("Config file {} does not exist", path.display())
        }
        Some(path) => Some(path.to_path_buf()),
        None => std::env::current_dir()
            .ok()
            .and_then(|cwd| find_config_file(&cwd)),
    };

    let Some(path) = config_path else {
        return Ok(Config::default());
    };
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut config: Config = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
    config.root = path.parent().map(Path::to_path_buf);
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Search for a configuration file in `start` and its ancestors.
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        for name in CONFIG_NAMES {
            let path = current.join(name);
            if path.exists() {
                return Some(path);
            }
        }
        dir = current.parent();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.preview.target.is_none());
        assert_eq!(config.loader_config(), LoaderConfig::default());
        assert!(config.manifest_path().is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[preview]
target = "tailwind"
entry = "src/App.tsx"

[cdn]
origin = "https://cdn.example.com"
manifest = "packages.json"

[loader]
extensions = [".tsx", ".js"]
max_call_depth = 48
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.preview.target, Some(Target::Tailwind));
        assert_eq!(config.preview.entry.as_deref(), Some("src/App.tsx"));
        assert_eq!(config.cdn.origin.as_deref(), Some("https://cdn.example.com"));

        let loader = config.loader_config();
        assert_eq!(loader.extensions, vec![".tsx", ".js"]);
        assert_eq!(loader.max_call_depth, 48);
    }

    #[test]
    fn test_unknown_target_is_rejected() {
        let err = toml::from_str::<Config>("[preview]\ntarget = \"svelte\"\n").unwrap_err();
        assert!(err.to_string().contains("svelte"), "{}", err);
    }

    #[test]
    fn test_find_config_in_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".miragerc.toml"),
            "[cdn]\nmanifest = \"cdn/packages.json\"\n",
        )
        .unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(found, dir.path().join(".miragerc.toml"));

        let config = load_config(Some(&found)).unwrap();
        assert_eq!(
            config.manifest_path(),
            Some(dir.path().join("cdn").join("packages.json"))
        );
    }

    #[test]
    fn test_mirage_toml_wins_over_rc() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mirage.toml"), "").unwrap();
        std::fs::write(dir.path().join(".miragerc.toml"), "").unwrap();
        assert_eq!(
            find_config_file(dir.path()),
            Some(dir.path().join("mirage.toml"))
        );
    }

    #[test]
    fn test_explicit_missing_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_config(Some(&missing)).is_err());
    }
}
