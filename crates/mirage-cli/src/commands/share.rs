//! Share command - encode artifacts to share tokens and back.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use mirage_engine::{ShareState, Target};
use std::path::PathBuf;

use super::emit;
use crate::config::Config;
use crate::input::read_artifact;

#[derive(Args)]
pub struct ShareCommand {
    #[command(subcommand)]
    pub action: ShareAction,
}

#[derive(Subcommand)]
pub enum ShareAction {
    /// Encode an artifact into a URL-safe token
    Encode {
        /// Artifact directory, share-state JSON, or single source file
        input: PathBuf,

        /// Target recorded in the token
        #[arg(long, short)]
        target: Option<Target>,

        /// Entry file, relative to the artifact
        #[arg(long)]
        entry: Option<String>,
    },
    /// Decode a token into share-state JSON
    Decode {
        /// Token printed by `share encode`
        #[arg(allow_hyphen_values = true)]
        token: String,

        /// Write the files into this directory instead of printing JSON
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
}

impl ShareCommand {
    pub fn run(&self, config: &Config) -> Result<()> {
        match &self.action {
            ShareAction::Encode {
                input,
                target,
                entry,
            } => {
                let entry = entry.as_deref().or(config.preview.entry.as_deref());
                let artifact = read_artifact(input, entry)?;
                let target = target.or(artifact.target).or(config.preview.target);
                let state = ShareState::from_files(target, &artifact.files);
                emit(&state.to_token()?, None)
            }
            ShareAction::Decode { token, out } => {
                let state = ShareState::from_token(token).context("Invalid share token")?;
                match out {
                    Some(dir) => write_files(&state, dir),
                    None => emit(&serde_json::to_string_pretty(&state)?, None),
                }
            }
        }
    }
}

/// Materialize a share state as files under `dir`
fn write_files(state: &ShareState, dir: &std::path::Path) -> Result<()> {
    let files = state.file_set()?;
    for (path, source) in files.iter() {
        let target = dir.join(path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&target, source)
            .with_context(|| format!("Failed to write {}", target.display()))?;
    }
    tracing::info!(files = files.len(), dir = %dir.display(), "wrote shared artifact");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirage_engine::VirtualFileSet;

    #[test]
    fn test_write_files_round_trip() {
        let files = VirtualFileSet::new(
            [("App.tsx", "export default 1;"), ("ui/Card.tsx", "export default 2;")],
            "App.tsx",
        )
        .unwrap();
        let state = ShareState::from_files(Some(Target::Material), &files);
        let dir = tempfile::tempdir().unwrap();

        write_files(&state, dir.path()).unwrap();
        let artifact = read_artifact(dir.path(), None).unwrap();
        assert_eq!(artifact.files, files);
    }
}
