//! Script errors

use thiserror::Error;

/// Errors raised while parsing or evaluating artifact source.
#[derive(Debug, Clone, Error)]
pub enum ScriptError {
    /// Source text could not be parsed
    #[error("SyntaxError: {message} ({line}:{column})")]
    Syntax {
        /// Error message
        message: String,
        /// 1-based line
        line: u32,
        /// 1-based column
        column: u32,
    },

    /// Reference to an unbound identifier
    #[error("ReferenceError: {0}")]
    Reference(String),

    /// Operation applied to a value of the wrong type
    #[error("TypeError: {0}")]
    Type(String),

    /// Value out of range, including call stack exhaustion
    #[error("RangeError: {0}")]
    Range(String),

    /// Value thrown by artifact code
    #[error("{0}")]
    Thrown(String),

    /// Named import that the exporting module does not provide
    #[error("SyntaxError: module '{module}' has no export named '{name}'")]
    MissingExport {
        /// Import specifier
        module: String,
        /// Requested export
        name: String,
    },

    /// The module host refused or failed an import
    #[error("Failed to import '{0}'")]
    Import(String),
}

impl ScriptError {
    /// Create a syntax error at a source position
    pub fn syntax(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::Syntax {
            message: message.into(),
            line,
            column,
        }
    }

    /// Create a type error
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Type(message.into())
    }

    /// Create a reference error for an unbound name
    pub fn not_defined(name: &str) -> Self {
        Self::Reference(format!("{} is not defined", name))
    }

    /// Create the error raised when the call depth limit is hit
    pub fn stack_overflow() -> Self {
        Self::Range("Maximum call stack size exceeded".to_string())
    }

    pub fn invalid_array_length() -> Self {
        Self::Range("Invalid array length".to_string())
    }

    pub fn invalid_string_length() -> Self {
        Self::Range("Invalid string length".to_string())
    }
}

/// Longest string artifact code may build, in bytes
pub const MAX_STRING_LENGTH: usize = 1 << 28;

/// Most elements artifact code may put in one array. Lower than the
/// language's `2^32 - 1` so a runaway artifact fails before exhausting memory.
pub const MAX_ARRAY_LENGTH: usize = 1 << 22;

/// Fail unless a string of `len` bytes may be allocated
pub fn check_string_length(len: usize) -> ScriptResult<()> {
    if len > MAX_STRING_LENGTH {
        return Err(ScriptError::invalid_string_length());
    }
    Ok(())
}

/// Fail unless an array of `len` elements may be allocated
pub fn check_array_length(len: usize) -> ScriptResult<()> {
    if len > MAX_ARRAY_LENGTH {
        return Err(ScriptError::invalid_array_length());
    }
    Ok(())
}

/// Validate a script-supplied array length (`Array.from({ length })`)
pub fn array_length(length: f64) -> ScriptResult<usize> {
    if length.is_nan() || length <= 0.0 {
        return Ok(0);
    }
    let length = length.trunc();
    if length > u32::MAX as f64 {
        return Err(ScriptError::invalid_array_length());
    }
    let length = length as usize;
    check_array_length(length)?;
    Ok(length)
}

/// Result type for script operations
pub type ScriptResult<T> = Result<T, ScriptError>;
