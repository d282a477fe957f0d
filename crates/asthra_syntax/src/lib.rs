//! Shared syntax frontend for the Asthra language: lexer, parser, AST, diagnostics.
//!
//! This crate is dependency-light and reused by the semantic analyzer, the CLI, and the fuzz target.
//!
//! ## Notes
//! - This crate is “syntax-only”: it does not do name resolution or type checking.
//! - Vocabulary identity (keywords/operators/punctuation/primitive types) comes from `asthra_core::lang` registries.
//! - Neither the lexer nor the parser stops at the first error; both return their output together with every
//!   diagnostic they collected.
//!
//! ## Examples
//! ```rust,no_run
//! use asthra_syntax::{lexer, parser};
//!
//! let lexed = lexer::lex("package demo;\npriv const ANSWER: i32 = 42;\n");
//! let parsed = parser::parse(&lexed.tokens);
//! assert_eq!(parsed.program.declarations.len(), 1);
//! ```
//!
//! ## See also
//! - `asthra_core::lang` for registry-backed language vocabulary.

#![forbid(unsafe_code)]

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod token_helpers;
