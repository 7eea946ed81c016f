//! CLI command implementations.

pub mod bootstrap;
pub mod check;
pub mod import_map;
pub mod render;
pub mod share;

use anyhow::{Context, Result};
use mirage_engine::{ImportMap, PackageManifestEntry, Target, parse_manifest};
use std::path::Path;

use crate::config::Config;

/// CDN origin used when neither flags nor config provide one
pub const DEFAULT_CDN_ORIGIN: &str = "https://cdn.jsdelivr.net/npm";

/// Target precedence: flag, then the artifact's own, then config, then Material
pub fn pick_target(flag: Option<Target>, artifact: Option<Target>, config: &Config) -> Target {
    flag.or(artifact)
        .or(config.preview.target)
        .unwrap_or(Target::Material)
}

pub fn pick_origin<'a>(flag: Option<&'a str>, config: &'a Config) -> &'a str {
    flag.or(config.cdn.origin.as_deref())
        .unwrap_or(DEFAULT_CDN_ORIGIN)
}

pub fn read_manifest(path: &Path) -> Result<Vec<PackageManifestEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    parse_manifest(&content).with_context(|| format!("Failed to parse manifest {}", path.display()))
}

pub fn build_import_map(manifest: &[PackageManifestEntry], origin: &str) -> Result<ImportMap> {
    Ok(ImportMap::build(manifest, origin)?)
}

/// Write `content` to `out`, or stdout when absent
pub fn emit(content: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}
