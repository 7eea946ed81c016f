//! Render command - evaluate an artifact and print its HTML.

use anyhow::Result;
use clap::Args;
use mirage_engine::{Callbacks, ErrorBoundary, Mount, Previewer, Runtime, Target};
use std::path::PathBuf;

use super::{bootstrap::BootstrapCommand, emit, pick_target};
use crate::config::Config;
use crate::input::read_artifact;

#[derive(Args)]
pub struct RenderCommand {
    /// Artifact directory, share-state JSON, or single source file
    pub input: PathBuf,

    /// Preview target
    #[arg(long, short)]
    pub target: Option<Target>,

    /// Entry file, relative to the artifact
    #[arg(long)]
    pub entry: Option<String>,

    /// Write HTML here instead of stdout
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Print the error fallback markup instead of failing
    #[arg(long)]
    pub fallback: bool,
}

impl RenderCommand {
    pub fn run(&self, config: &Config) -> Result<()> {
        let entry = self.entry.as_deref().or(config.preview.entry.as_deref());
        let artifact = read_artifact(&self.input, entry)?;
        let target = pick_target(self.target, artifact.target, config);

        if target.runtime() == Runtime::NativeEsm {
            tracing::info!("{} renders in the browser; emitting bootstrap document", target);
            let bootstrap = BootstrapCommand {
                input: self.input.clone(),
                target: Some(target),
                entry: self.entry.clone(),
                manifest: None,
                origin: None,
                out: self.out.clone(),
            };
            return bootstrap.run(config);
        }

        let previewer = Previewer::new(target, config.loader_config());
        if !self.fallback {
            let html = previewer.render(&artifact.files)?;
            return emit(&html, self.out.as_deref());
        }

        let mut boundary = ErrorBoundary::new(Callbacks::new(
            |message: &str| eprintln!("error: {}", message),
            || tracing::debug!("render succeeded"),
        ));
        let mount = previewer.preview(&artifact.files, &mut boundary);
        emit(mount.html(), self.out.as_deref())?;
        match mount {
            Mount::Rendered(_) => Ok(()),
            Mount::Fallback(_) => anyhow::bail!("Preview of {} failed", self.input.display()),
        }
    }
}
