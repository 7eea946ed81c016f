//! Bootstrap command - build the browser document for a native-ESM target.

use anyhow::{Context, Result};
use clap::Args;
use mirage_engine::{BootstrapDescriptor, Target, render_bootstrap};
use std::path::PathBuf;

use super::{build_import_map, emit, pick_origin, pick_target, read_manifest};
use crate::config::Config;
use crate::input::read_artifact;

#[derive(Args)]
pub struct BootstrapCommand {
    /// Artifact directory, share-state JSON, or single source file
    pub input: PathBuf,

    /// Native-ESM target (vuetify or element-plus)
    #[arg(long, short)]
    pub target: Option<Target>,

    /// Entry file, relative to the artifact
    #[arg(long)]
    pub entry: Option<String>,

    /// Package manifest; defaults to the target's pinned packages
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// CDN origin packages are served from
    #[arg(long)]
    pub origin: Option<String>,

    /// Write HTML here instead of stdout
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

impl BootstrapCommand {
    pub fn run(&self, config: &Config) -> Result<()> {
        let entry = self.entry.as_deref().or(config.preview.entry.as_deref());
        let artifact = read_artifact(&self.input, entry)?;
        let target = pick_target(self.target, artifact.target, config);
        let descriptor = BootstrapDescriptor::for_target(target).with_context(|| {
            format!("Target '{}' renders in-process; use `mirage render`", target)
        })?;

        let manifest = match self.manifest.clone().or_else(|| config.manifest_path()) {
            Some(path) => read_manifest(&path)?,
            None => descriptor.packages.clone(),
        };
        let origin = pick_origin(self.origin.as_deref(), config);
        let import_map = build_import_map(&manifest, origin)?;

        let html = render_bootstrap(&descriptor, &import_map, &artifact.files, origin)
            .context("Failed to serialize bootstrap document")?;
        emit(&html, self.out.as_deref())
    }
}
