//! Asthra language vocabulary registries.
//!
//! This module is the “front door” for language-level vocabulary: reserved keywords, operators, punctuation,
//! primitive types, predeclared functions, and annotations.
//!
//! Callers work with **stable IDs** (e.g. `KeywordId`, `OperatorId`) and look up spellings/metadata via registry
//! tables instead of comparing strings throughout the compiler.
//!
//! ## Notes
//! - Registries are **pure**: no AST types, no IO, no side effects.
//! - The lexer/parser enforce syntax; registries provide spellings and metadata for shared use (diagnostics,
//!   resynchronization points, analyzer seeding).
//!
//! ## Examples
//! ```rust
//! use asthra_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("spawn_with_handle"), Some(KeywordId::SpawnWithHandle));
//! assert_eq!(keywords::as_str(KeywordId::Priv), "priv");
//! ```

pub mod annotations;
pub mod keywords;
pub mod operators;
pub mod predeclared;
pub mod punctuation;
pub mod types;
