//! Asthra compiler front end
//!
//! - `lexer`: tokenization of source code
//! - `parser`: parsing tokens into an AST
//! - `ast`: abstract syntax tree definitions
//! - `diagnostics`: error taxonomy and rendering
//! - `intern`: concurrent identifier/string interning
//! - `module`: source modules and import path classification
//! - `resolver`: import graph, cycle detection, and analysis waves
//! - `symbols`: symbol table, scopes, and resolved types
//! - `analyzer`: semantic analysis of one module
//! - `pipeline`: the multi-module driver tying the phases together

// Syntax components are provided by the shared asthra_syntax crate.
pub use asthra_syntax::{ast, diagnostics, lexer, parser};

pub mod analyzer;
pub mod intern;
pub mod module;
pub mod pipeline;
pub mod resolver;
pub mod symbols;
