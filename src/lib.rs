#![forbid(unsafe_code)]
//! Asthra compiler front end
//!
//! Turns Asthra source text into a validated, fully resolved program: lexer, parser, module resolver, and semantic
//! analyzer, plus the `asthra` command-line driver. Code generation consumes the [`frontend::analyzer::AnalyzedModule`]
//! side tables this crate produces.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. Problems in the program being
//!   compiled are never panics; they are [`diagnostics::CompileError`] values collected per module. The `cli` module
//!   enforces `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents a compiler bug (logic error), use `.expect("INVARIANT: reason")` with a
//!   clear explanation.

pub mod cli;
pub mod config;
pub mod frontend;

pub use frontend::analyzer;
pub use frontend::ast;
pub use frontend::diagnostics;
pub use frontend::lexer;
pub use frontend::parser;
pub use frontend::pipeline;
pub use frontend::symbols;

pub use config::AnalyzerConfig;
