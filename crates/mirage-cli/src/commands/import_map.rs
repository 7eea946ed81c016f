//! Import-map command - turn a package manifest into a browser import map.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::{build_import_map, emit, pick_origin, read_manifest};
use crate::config::Config;

#[derive(Args)]
pub struct ImportMapCommand {
    /// Package manifest (JSON array of `{ "name", "path" }`); defaults to
    /// the config's `cdn.manifest`
    pub manifest: Option<PathBuf>,

    /// CDN origin packages are served from
    #[arg(long)]
    pub origin: Option<String>,

    /// Emit a `<script type="importmap">` tag instead of bare JSON
    #[arg(long)]
    pub script: bool,

    /// Write output here instead of stdout
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

impl ImportMapCommand {
    pub fn run(&self, config: &Config) -> Result<()> {
        let Some(path) = self.manifest.clone().or_else(|| config.manifest_path()) else {
            anyhow::bail!("No manifest given and no `cdn.manifest` configured");
        };
        let manifest = read_manifest(&path)?;
        let map = build_import_map(&manifest, pick_origin(self.origin.as_deref(), config))?;
        let output = if self.script {
            map.to_script_tag()?
        } else {
            map.to_json()?
        };
        emit(&output, self.out.as_deref())
    }
}
