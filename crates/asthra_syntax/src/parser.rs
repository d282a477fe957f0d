//! Parser for the Asthra programming language
//!
//! Converts a token stream into an AST with source spans. Parsing never aborts on the first syntax error: each
//! failure is recorded, the parser resynchronizes at a statement or declaration boundary, and parsing resumes.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use asthra_syntax::{lexer, parser};
//!
//! let source = "package demo;\npub fn answer(none) -> i32 { return 42; }\n";
//! let lexed = lexer::lex(source);
//! let parsed = parser::parse(&lexed.tokens);
//! assert!(parsed.errors.is_empty());
//! assert_eq!(parsed.program.declarations.len(), 1);
//! ```

use crate::ast::*;
use crate::diagnostics::{CompileError, errors};
use crate::lexer::{Token, TokenKind};
use asthra_core::lang::keywords::{self, KeywordId};
use asthra_core::lang::operators::{self, OperatorId};
use asthra_core::lang::punctuation::PunctuationId;
use asthra_core::lang::types::PrimitiveId;

// NOTE: This module is split across multiple files using `include!` to keep all parser
// methods in the same Rust module (preserving privacy + call patterns) while avoiding
// a single large source file.

include!("parser/core.rs");
include!("parser/helpers.rs");
include!("parser/annotations.rs");
include!("parser/decl.rs");
include!("parser/types.rs");
include!("parser/stmts.rs");
include!("parser/expr.rs");
include!("parser/patterns.rs");
include!("parser/util.rs");
include!("parser/api.rs");
include!("parser/tests.rs");
