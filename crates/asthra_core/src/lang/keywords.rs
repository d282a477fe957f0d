//! Define the reserved keyword vocabulary for the Asthra language.
//!
//! This module is the single source of truth for reserved words: a stable identifier ([`KeywordId`]) plus a const
//! metadata table ([`KEYWORDS`]) that records canonical spellings, categories, and usage context.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **exact and case-sensitive**; there are no aliases.
//! - Predeclared function names (`log`, `range`, ...) are deliberately **not** keywords. They are ordinary
//!   identifiers resolved by scope lookup; see [`crate::lang::predeclared`].
//! - Primitive type names live in [`crate::lang::types`]; the generic wrappers `Result`, `Option` and
//!   `TaskHandle` are keywords because they also head enum-construction and pattern forms.
//!
//! ## Examples
//! ```rust
//! use asthra_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("fn"), Some(KeywordId::Fn));
//! assert_eq!(keywords::from_str("log"), None);
//! assert_eq!(keywords::as_str(KeywordId::SelfKw), "self");
//! ```

/// Stable identifier for every reserved keyword.
///
/// ## Notes
/// - Variant order matches [`KEYWORDS`] order; [`info_for`] indexes the table by discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeywordId {
    // Modules / imports
    Package,
    Import,
    As,

    // Declarations / visibility
    Pub,
    Priv,
    Fn,
    Struct,
    Enum,
    Extern,
    Impl,
    Const,

    // Bindings / receivers
    Let,
    Mut,
    SelfKw,

    // Control flow / statements
    If,
    Else,
    For,
    In,
    Return,
    Match,
    Break,
    Continue,
    Unsafe,

    // Tier-1 concurrency
    Spawn,
    SpawnWithHandle,
    Await,

    // Expression forms
    Sizeof,

    // Literals / structural markers
    True,
    False,
    None,

    // Builtin generic type constructors
    Result,
    Option,
    TaskHandle,
}

/// High-level grouping for documentation and tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    Module,
    Declaration,
    Binding,
    ControlFlow,
    Concurrency,
    Expression,
    Literal,
    Type,
}

/// Usage context hints.
///
/// ## Notes
/// - The parser uses [`KeywordUsage::Declaration`] and [`KeywordUsage::Statement`] keywords as
///   resynchronization points after a syntax error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordUsage {
    /// Starts a top-level production (`fn`, `struct`, `import`, ...).
    Declaration,
    /// Starts a statement (`let`, `return`, `spawn`, ...).
    Statement,
    /// Appears inside expressions (`await`, `sizeof`, `true`, ...).
    Expression,
    /// Qualifies another production (`pub`, `mut`, `else`, ...).
    Modifier,
    /// Names a builtin generic type.
    Type,
    /// Structural absence marker (`none`).
    Marker,
}

/// Metadata for a keyword.
#[derive(Debug, Clone, Copy)]
pub struct KeywordInfo {
    pub id: KeywordId,
    pub canonical: &'static str,
    pub category: KeywordCategory,
    pub usage: KeywordUsage,
}

/// Registry of all keywords, in [`KeywordId`] declaration order.
pub const KEYWORDS: &[KeywordInfo] = &[
    // Modules / imports
    info(KeywordId::Package, "package", KeywordCategory::Module, KeywordUsage::Declaration),
    info(KeywordId::Import, "import", KeywordCategory::Module, KeywordUsage::Declaration),
    info(KeywordId::As, "as", KeywordCategory::Module, KeywordUsage::Modifier),
    // Declarations / visibility
    info(KeywordId::Pub, "pub", KeywordCategory::Declaration, KeywordUsage::Modifier),
    info(KeywordId::Priv, "priv", KeywordCategory::Declaration, KeywordUsage::Modifier),
    info(KeywordId::Fn, "fn", KeywordCategory::Declaration, KeywordUsage::Declaration),
    info(KeywordId::Struct, "struct", KeywordCategory::Declaration, KeywordUsage::Declaration),
    info(KeywordId::Enum, "enum", KeywordCategory::Declaration, KeywordUsage::Declaration),
    info(KeywordId::Extern, "extern", KeywordCategory::Declaration, KeywordUsage::Declaration),
    info(KeywordId::Impl, "impl", KeywordCategory::Declaration, KeywordUsage::Declaration),
    info(KeywordId::Const, "const", KeywordCategory::Declaration, KeywordUsage::Declaration),
    // Bindings / receivers
    info(KeywordId::Let, "let", KeywordCategory::Binding, KeywordUsage::Statement),
    info(KeywordId::Mut, "mut", KeywordCategory::Binding, KeywordUsage::Modifier),
    info(KeywordId::SelfKw, "self", KeywordCategory::Binding, KeywordUsage::Expression),
    // Control flow / statements
    info(KeywordId::If, "if", KeywordCategory::ControlFlow, KeywordUsage::Statement),
    info(KeywordId::Else, "else", KeywordCategory::ControlFlow, KeywordUsage::Modifier),
    info(KeywordId::For, "for", KeywordCategory::ControlFlow, KeywordUsage::Statement),
    info(KeywordId::In, "in", KeywordCategory::ControlFlow, KeywordUsage::Modifier),
    info(KeywordId::Return, "return", KeywordCategory::ControlFlow, KeywordUsage::Statement),
    info(KeywordId::Match, "match", KeywordCategory::ControlFlow, KeywordUsage::Statement),
    info(KeywordId::Break, "break", KeywordCategory::ControlFlow, KeywordUsage::Statement),
    info(KeywordId::Continue, "continue", KeywordCategory::ControlFlow, KeywordUsage::Statement),
    info(KeywordId::Unsafe, "unsafe", KeywordCategory::ControlFlow, KeywordUsage::Statement),
    // Tier-1 concurrency
    info(KeywordId::Spawn, "spawn", KeywordCategory::Concurrency, KeywordUsage::Statement),
    info(KeywordId::SpawnWithHandle, "spawn_with_handle", KeywordCategory::Concurrency, KeywordUsage::Statement),
    info(KeywordId::Await, "await", KeywordCategory::Concurrency, KeywordUsage::Expression),
    // Expression forms
    info(KeywordId::Sizeof, "sizeof", KeywordCategory::Expression, KeywordUsage::Expression),
    // Literals / structural markers
    info(KeywordId::True, "true", KeywordCategory::Literal, KeywordUsage::Expression),
    info(KeywordId::False, "false", KeywordCategory::Literal, KeywordUsage::Expression),
    info(KeywordId::None, "none", KeywordCategory::Literal, KeywordUsage::Marker),
    // Builtin generic type constructors
    info(KeywordId::Result, "Result", KeywordCategory::Type, KeywordUsage::Type),
    info(KeywordId::Option, "Option", KeywordCategory::Type, KeywordUsage::Type),
    info(KeywordId::TaskHandle, "TaskHandle", KeywordCategory::Type, KeywordUsage::Type),
];

/// Canonical spelling.
///
/// ## Parameters
/// - `id`: Keyword identifier.
///
/// ## Returns
/// - The canonical spelling for `id`.
pub fn as_str(id: KeywordId) -> &'static str {
    info_for(id).canonical
}

/// Category.
pub fn category(id: KeywordId) -> KeywordCategory {
    info_for(id).category
}

/// Usage hint.
pub fn usage(id: KeywordId) -> KeywordUsage {
    info_for(id).usage
}

/// Whether the keyword begins a declaration or statement production.
///
/// ## Notes
/// - Used by the parser to find a safe point to resume after a syntax error.
pub fn is_sync_point(id: KeywordId) -> bool {
    matches!(usage(id), KeywordUsage::Declaration | KeywordUsage::Statement)
        || matches!(id, KeywordId::Pub | KeywordId::Priv)
}

/// Full metadata.
///
/// ## Parameters
/// - `id`: Keyword identifier.
///
/// ## Returns
/// - The associated [`KeywordInfo`] from [`KEYWORDS`].
///
/// ## Notes
/// - The table is kept in discriminant order (guarded by `tests/lang_registry_guardrails.rs`).
pub fn info_for(id: KeywordId) -> &'static KeywordInfo {
    &KEYWORDS[id as usize]
}

/// Lookup by spelling.
///
/// ## Returns
/// - `Some(KeywordId)` if `s` is exactly a reserved word, `None` otherwise.
pub fn from_str(s: &str) -> Option<KeywordId> {
    KEYWORDS.iter().find(|k| k.canonical == s).map(|k| k.id)
}

// --- helpers -----------------------------------------------------------------

const fn info(id: KeywordId, canonical: &'static str, category: KeywordCategory, usage: KeywordUsage) -> KeywordInfo {
    KeywordInfo {
        id,
        canonical,
        category,
        usage,
    }
}
