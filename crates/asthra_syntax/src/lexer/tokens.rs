//! Token types for the Asthra lexer.
//!
//! The lexer uses **registry-backed IDs** for language vocabulary:
//! - `Keyword(KeywordId)` for reserved words
//! - `Primitive(PrimitiveId)` for primitive type names
//! - `Operator(OperatorId)` for operators
//! - `Punctuation(PunctuationId)` for punctuation tokens
//!
//! ## Notes
//! - Every token keeps its raw lexeme; `source[span.start..span.end] == lexeme` always holds.
//! - Use `crate::token_helpers` for ergonomic token matching at call sites.

use asthra_core::lang::keywords::{self, KeywordId};
use asthra_core::lang::operators::OperatorId;
use asthra_core::lang::punctuation::PunctuationId;
use asthra_core::lang::types::{self, PrimitiveId};

use crate::ast::Span;

// ============================================================================
// TOKEN TYPES
// ============================================================================

/// Radix an integer literal was written in; fixed by its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntBase {
    Decimal,
    /// `0x` / `0X`
    Hex,
    /// `0b` / `0B`
    Binary,
    /// `0o`
    Octal,
}

impl IntBase {
    pub fn radix(self) -> u32 {
        match self {
            IntBase::Decimal => 10,
            IntBase::Hex => 16,
            IntBase::Binary => 2,
            IntBase::Octal => 8,
        }
    }
}

/// Which string syntax produced a string token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringForm {
    /// `"..."`, single line, escapes processed
    Regular,
    /// `"""..."""`, multi-line, escapes processed
    Processed,
    /// `r"""..."""`, multi-line, no escape processing
    Raw,
}

/// Kind of token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ========== Keyword / operator / punctuation (ID-based) ==========
    Keyword(KeywordId),
    Primitive(PrimitiveId),
    Operator(OperatorId),
    Punctuation(PunctuationId),

    // ========== Identifiers and Literals ==========
    Ident(String),
    Int { value: u128, base: IntBase },
    Float(f64),
    String { value: String, form: StringForm },
    Char(char),

    // ========== Special ==========
    Eof,
}

impl TokenKind {
    /// Short description for "expected X, found Y" diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Keyword(k) => format!("keyword '{}'", keywords::as_str(*k)),
            TokenKind::Primitive(p) => format!("type '{}'", types::as_str(*p)),
            TokenKind::Operator(o) => format!("'{}'", asthra_core::lang::operators::as_str(*o)),
            TokenKind::Punctuation(p) => format!("'{}'", asthra_core::lang::punctuation::as_str(*p)),
            TokenKind::Ident(name) => format!("identifier '{}'", name),
            TokenKind::Int { .. } => "integer literal".to_string(),
            TokenKind::Float(_) => "float literal".to_string(),
            TokenKind::String { .. } => "string literal".to_string(),
            TokenKind::Char(_) => "character literal".to_string(),
            TokenKind::Eof => "end of file".to_string(),
        }
    }
}

/// A token with its kind, raw lexeme, and source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    /// Construct a new token.
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }
}

/// Resolve an identifier spelling to a keyword id, if reserved.
pub fn keyword_id(name: &str) -> Option<KeywordId> {
    keywords::from_str(name)
}

/// Resolve an identifier spelling to a primitive type id, if reserved.
pub fn primitive_id(name: &str) -> Option<PrimitiveId> {
    types::from_str(name)
}
