//! Mirage engine core.
//!
//! This crate provides the artifact runtime behind live previews of
//! generated UI source.
//!
//! # Features
//!
//! - **Module Registry**: Per-target exact and longest-prefix specifier tables
//! - **Loader/Linker**: Evaluates in-memory files, tolerating import cycles
//! - **Isolation**: An error boundary that contains evaluation and render faults
//! - **Import Maps**: Manifest-driven maps and bootstrap documents for Vue targets
//! - **Sharing**: A compact, URL-safe encoding of a whole artifact
//!
//! # Example
//!
//! ```no_run
//! use mirage_engine::{
//!     Callbacks, ErrorBoundary, LoaderConfig, Previewer, Target, VirtualFileSet,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let files = VirtualFileSet::single(
//!         "App.tsx",
//!         "import { Button } from '@mui/material';\n\
//!          export default () => <Button variant=\"contained\">Save</Button>;",
//!     )?;
//!     let previewer = Previewer::new(Target::Material, LoaderConfig::default());
//!     let mut boundary = ErrorBoundary::new(Callbacks::new(
//!         |message: &str| eprintln!("preview failed: {}", message),
//!         || eprintln!("preview ready"),
//!     ));
//!
//!     println!("{}", previewer.preview(&files, &mut boundary).html());
//!     Ok(())
//! }
//! ```

pub mod bootstrap;
pub mod boundary;
pub mod error;
pub mod graph;
pub mod import_map;
pub mod loader;
pub mod preview;
pub mod registry;
pub mod share;
pub mod targets;
pub mod vfs;

pub use bootstrap::{BootstrapDescriptor, CDN_ORIGIN_PLACEHOLDER, ModuleBinding, render_bootstrap};
pub use boundary::{
    BoundaryHost, BoundaryState, Callbacks, ErrorBoundary, FailureDetail, FailureKind,
    RenderFailure, fallback_html,
};
pub use error::{
    DecodeError, FileSetError, LoadError, LoadResult, ManifestConflictError, ModuleNotFoundError,
    ShareError, UnknownTargetError,
};
pub use graph::{ImportReport, Resolution, check_imports, scan_imports};
pub use import_map::{ImportMap, PackageManifestEntry, join_url, parse_manifest};
pub use loader::{
    EVALUATION_STACK_SIZE, LoadedArtifact, LoaderConfig, ModuleLoader, ModuleState,
    on_evaluation_stack,
};
pub use preview::{Mount, Previewer};
pub use registry::{ModuleRegistry, PrefixResolver, RegistryBuilder};
pub use share::{ShareState, decode, encode};
pub use targets::{Runtime, Target, registry_for};
pub use vfs::{DEFAULT_EXTENSIONS, VirtualFileSet};

// Re-export the script layer for hosts that build their own registries
pub use mirage_script::{ModuleNamespace, Value};
