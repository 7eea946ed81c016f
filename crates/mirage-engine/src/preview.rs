//! Preview pipeline: load an artifact and render it inside a boundary

use std::sync::Arc;

use tracing::debug;

use crate::boundary::{BoundaryHost, ErrorBoundary, RenderFailure, fallback_html};
use crate::error::{LoadError, LoadResult};
use crate::loader::{LoadedArtifact, LoaderConfig, ModuleLoader};
use crate::registry::ModuleRegistry;
use crate::targets::{Target, registry_for};
use crate::vfs::VirtualFileSet;

/// Outcome of a preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mount {
    /// Markup produced by the artifact
    Rendered(String),
    /// Fallback markup describing the failure
    Fallback(String),
}

impl Mount {
    pub fn html(&self) -> &str {
        match self {
            Mount::Rendered(html) | Mount::Fallback(html) => html,
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, Mount::Rendered(_))
    }
}

/// Renders artifacts for one target
#[derive(Debug, Clone)]
pub struct Previewer {
    target: Target,
    loader: Option<ModuleLoader>,
}

impl Previewer {
    pub fn new(target: Target, config: LoaderConfig) -> Self {
        let loader =
            registry_for(target).map(|registry| ModuleLoader::new(Arc::new(registry), config));
        Self { target, loader }
    }

    /// Preview against a caller-supplied registry
    pub fn with_registry(
        target: Target,
        registry: Arc<ModuleRegistry>,
        config: LoaderConfig,
    ) -> Self {
        Self {
            target,
            loader: Some(ModuleLoader::new(registry, config)),
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn loader(&self) -> Option<&ModuleLoader> {
        self.loader.as_ref()
    }

    /// Load without rendering
    pub fn load(&self, files: &VirtualFileSet) -> LoadResult<LoadedArtifact> {
        match &self.loader {
            Some(loader) => loader.load(files),
            None => Err(LoadError::Unsupported(self.target.to_string())),
        }
    }

    /// Load and render to HTML, outside any boundary
    pub fn render(&self, files: &VirtualFileSet) -> Result<String, RenderFailure> {
        let mut artifact = self.load(files)?;
        artifact.render().map_err(|error| {
            let mut failure = RenderFailure::from(error);
            if let Some(detail) = failure.detail.as_mut() {
                detail.path = Some(files.entry().to_string());
            }
            failure
        })
    }

    /// Render `files` inside `boundary`, keyed by the file set's identity
    pub fn preview<H: BoundaryHost>(
        &self,
        files: &VirtualFileSet,
        boundary: &mut ErrorBoundary<H>,
    ) -> Mount {
        self.preview_as(files, &files.identity(), boundary)
    }

    /// Render `files` inside `boundary` under a caller-chosen identity. A
    /// faulted boundary stays faulted while `identity` is unchanged.
    pub fn preview_as<H: BoundaryHost>(
        &self,
        files: &VirtualFileSet,
        identity: &str,
        boundary: &mut ErrorBoundary<H>,
    ) -> Mount {
        debug!(identity, "previewing {} artifact", self.target);
        match boundary.render(identity, || self.render(files)) {
            Ok(html) => Mount::Rendered(html),
            Err(failure) => Mount::Fallback(fallback_html(failure)),
        }
    }
}
