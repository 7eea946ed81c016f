//! # Mirage Script
//!
//! Interpreter for the subset of ES modules and JSX that generated UI
//! artifacts are written in.
//!
//! ## Pipeline
//!
//! 1. Parse source into a [`Program`]
//! 2. Link imports through a [`ModuleHost`] and evaluate with [`evaluate_module`]
//! 3. Render the default export to host nodes with [`render()`]

#![warn(clippy::all)]

pub mod ast;
pub mod builtins;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod module;
pub mod parser;
pub mod render;
pub mod scope;
pub mod value;

pub use ast::Program;
pub use error::{MAX_ARRAY_LENGTH, MAX_STRING_LENGTH, ScriptError, ScriptResult};
pub use interpreter::{DEFAULT_MAX_CALL_DEPTH, Interpreter, eval_source};
pub use module::{ExportFallback, ModuleHost, ModuleImport, ModuleNamespace, evaluate_module};
pub use parser::{parse, parse_expression};
pub use render::{Node, render, render_to_string, text_content, to_html};
pub use value::{Element, ElementKind, Properties, Value};
