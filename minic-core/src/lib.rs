//! Core compiler pipeline for the minic language.
//!
//! minic is a small C-like language. The pipeline is:
//!
//!   source text
//!     -> lexer     (tokens)
//!     -> parser    (AST, recursive descent)
//!     -> semantic  (scopes, symbol table, diagnostics)
//!     -> codegen   (three-address IR)
//!
//! Semantic analysis and code generation both read the same AST and are
//! independent of each other. No stage fails on malformed source: the
//! lexer and parser are lenient and semantic problems come back as
//! diagnostics.
//!
//! Higher-level tools (the CLI, editors, exporters) should depend on this
//! crate rather than reimplementing the pipeline.

extern crate alloc;

// ---------------------------------------------------------------------
// Error handling and diagnostics
// ---------------------------------------------------------------------

pub mod span;
pub mod diagnostic;
pub mod error;

// ---------------------------------------------------------------------
// Front-end: lexing and parsing
// ---------------------------------------------------------------------

pub mod lexer;
pub mod parser;
pub mod ast;

// ---------------------------------------------------------------------
// Semantic layers: types, scopes, analysis
// ---------------------------------------------------------------------

pub mod types;
pub mod scope;
pub mod semantic;

// ---------------------------------------------------------------------
// Back-end: code generation and compiler orchestration
// ---------------------------------------------------------------------

pub mod ir;
pub mod codegen;
pub mod compiler;
pub mod sources;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use codegen::generate;
pub use compiler::{Compilation, EmitFormat, Pipeline, compile, render_listing};
pub use error::CoreError;
pub use lexer::tokenize;
pub use parser::parse;
pub use semantic::analyze;
