//! Provide the canonical language vocabulary for the Asthra compiler front end and its consumers.
//!
//! This crate is intentionally small and dependency-free. It holds the tables that both the syntax crate (lexer,
//! parser) and the semantic analyzer agree on, so spellings never drift between phases:
//! - reserved keywords, operators, punctuation, primitive types ([`lang`])
//! - predeclared functions and their signatures ([`lang::predeclared`])
//! - the annotation vocabulary with placement rules ([`lang::annotations`])
//! - the runtime ABI symbols that code generation lowers validated constructs to ([`abi`])
//!
//! ## Notes
//!
//! - This is a “vocabulary” crate: **no IO**, no global state, and no AST types.

#![forbid(unsafe_code)]

pub mod abi;
pub mod lang;
