//! Error types for mirage-engine

use thiserror::Error;

/// A specifier matched neither an exact nor a prefix rule of a registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot find module '{specifier}'")]
pub struct ModuleNotFoundError {
    pub specifier: String,
}

/// Loading an artifact failed; no exports are exposed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Import resolved to neither a sibling file nor a registry module
    #[error("Cannot find module '{specifier}' imported from '{importer}'")]
    ModuleNotFound { specifier: String, importer: String },

    /// A file failed to parse, link or run its top-level code
    #[error("Error evaluating '{path}': {message}")]
    Evaluation { path: String, message: String },

    /// Target has no in-process loader
    #[error("Target '{0}' runs in the browser; build a bootstrap document instead")]
    Unsupported(String),

    /// Entry path disappeared from the file set
    #[error("Entry file '{0}' not found")]
    MissingEntry(String),
}

impl LoadError {
    /// Path of the file the failure is attributed to
    pub fn path(&self) -> Option<&str> {
        match self {
            LoadError::ModuleNotFound { importer, .. } => Some(importer),
            LoadError::Evaluation { path, .. } => Some(path),
            LoadError::MissingEntry(path) => Some(path),
            LoadError::Unsupported(_) => None,
        }
    }

    /// Unresolved specifier, when the failure is a resolution failure
    pub fn specifier(&self) -> Option<&str> {
        match self {
            LoadError::ModuleNotFound { specifier, .. } => Some(specifier),
            _ => None,
        }
    }
}

/// Invalid virtual file set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileSetError {
    #[error("Entry '{0}' is not one of the artifact's files")]
    MissingEntry(String),

    #[error("Artifact has no files")]
    Empty,
}

/// Unrecognized target name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown target '{0}' (expected material, tailwind, html, vuetify or element-plus)")]
pub struct UnknownTargetError(pub String);

/// Two manifest entries share a package name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Package '{name}' appears more than once in the manifest")]
pub struct ManifestConflictError {
    pub name: String,
}

/// Malformed share token
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Share token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Share token is not a valid deflate stream: {0}")]
    Inflate(#[source] std::io::Error),

    #[error("Share token does not contain UTF-8 text: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Failure restoring a [`ShareState`](crate::share::ShareState) from a token
#[derive(Debug, Error)]
pub enum ShareError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Share state is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    FileSet(#[from] FileSetError),
}

/// Result type using LoadError
pub type LoadResult<T> = Result<T, LoadError>;
