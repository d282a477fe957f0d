//! Operator vocabulary.
//!
//! This module defines the canonical operator set along with precedence, associativity, and fixity metadata.
//! The precedence scale mirrors the ten expression tiers of the grammar:
//!
//! | Level | Tier | Operators |
//! | --- | --- | --- |
//! | 1 | logical-or | `\|\|` |
//! | 2 | logical-and | `&&` |
//! | 3 | bitwise | `\|` `^` `&` |
//! | 4 | equality | `==` `!=` |
//! | 5 | relational | `<` `<=` `>` `>=` |
//! | 6 | shift | `<<` `>>` |
//! | 7 | additive | `+` `-` |
//! | 8 | multiplicative | `*` `/` `%` |
//! | 9 | unary prefix | `!` `-` `~` `*` `&` |
//! | 10 | postfix | call, field, index, slice |
//!
//! ## Notes
//! - Shift sits between relational and additive (not above multiplicative).
//! - `-`, `*` and `&` are both infix and prefix; the parser decides by position. Their registry entry records the
//!   infix role; [`prefix_role`] answers the prefix question.
//! - Assignment (`=`) is a statement form and has precedence 0.
//!
//! ## Examples
//! ```rust
//! use asthra_core::lang::operators::{self, OperatorId};
//!
//! assert_eq!(operators::from_str("<<"), Some(OperatorId::Shl));
//! assert!(operators::precedence(OperatorId::Shl) > operators::precedence(OperatorId::Lt));
//! assert!(operators::precedence(OperatorId::Shl) < operators::precedence(OperatorId::Plus));
//! ```

/// Precedence of the unary prefix tier.
pub const UNARY_PRECEDENCE: u8 = 9;
/// Precedence of the postfix tier.
pub const POSTFIX_PRECEDENCE: u8 = 10;

/// Define how operators associate when chained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
    None,
}

/// Define whether an operator is infix (binary) or prefix (unary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    Infix,
    Prefix,
}

/// The two prefix slots of a unary expression.
///
/// A unary expression may carry at most one operator from each slot, logical first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixRole {
    /// `!`, `-`, `~`
    Logical,
    /// `*` (dereference), `&` (address-of)
    Pointer,
}

/// Stable identifier for every operator.
///
/// ## Notes
/// - Variant order matches [`OPERATORS`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorId {
    // Logical
    OrOr,
    AndAnd,

    // Bitwise
    Pipe,
    Caret,
    Amp,

    // Equality
    EqEq,
    NotEq,

    // Relational
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Shift
    Shl,
    Shr,

    // Additive
    Plus,
    Minus,

    // Multiplicative
    Star,
    Slash,
    Percent,

    // Prefix-only
    Bang,
    Tilde,

    // Assignment
    Eq,
}

/// Metadata for an operator.
#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
    pub id: OperatorId,
    pub spelling: &'static str,
    pub precedence: u8,
    pub associativity: Associativity,
    pub fixity: Fixity,
}

/// Registry of all operators, in [`OperatorId`] declaration order.
pub const OPERATORS: &[OperatorInfo] = &[
    // Logical
    op(OperatorId::OrOr, "||", 1, Fixity::Infix),
    op(OperatorId::AndAnd, "&&", 2, Fixity::Infix),
    // Bitwise
    op(OperatorId::Pipe, "|", 3, Fixity::Infix),
    op(OperatorId::Caret, "^", 3, Fixity::Infix),
    op(OperatorId::Amp, "&", 3, Fixity::Infix),
    // Equality
    op(OperatorId::EqEq, "==", 4, Fixity::Infix),
    op(OperatorId::NotEq, "!=", 4, Fixity::Infix),
    // Relational
    op(OperatorId::Lt, "<", 5, Fixity::Infix),
    op(OperatorId::LtEq, "<=", 5, Fixity::Infix),
    op(OperatorId::Gt, ">", 5, Fixity::Infix),
    op(OperatorId::GtEq, ">=", 5, Fixity::Infix),
    // Shift
    op(OperatorId::Shl, "<<", 6, Fixity::Infix),
    op(OperatorId::Shr, ">>", 6, Fixity::Infix),
    // Additive
    op(OperatorId::Plus, "+", 7, Fixity::Infix),
    op(OperatorId::Minus, "-", 7, Fixity::Infix),
    // Multiplicative
    op(OperatorId::Star, "*", 8, Fixity::Infix),
    op(OperatorId::Slash, "/", 8, Fixity::Infix),
    op(OperatorId::Percent, "%", 8, Fixity::Infix),
    // Prefix-only
    op(OperatorId::Bang, "!", UNARY_PRECEDENCE, Fixity::Prefix),
    op(OperatorId::Tilde, "~", UNARY_PRECEDENCE, Fixity::Prefix),
    // Assignment
    OperatorInfo {
        id: OperatorId::Eq,
        spelling: "=",
        precedence: 0,
        associativity: Associativity::Right,
        fixity: Fixity::Infix,
    },
];

/// Canonical spelling.
pub fn as_str(id: OperatorId) -> &'static str {
    info_for(id).spelling
}

/// Binding power of the infix form (or of the prefix tier for prefix-only operators).
pub fn precedence(id: OperatorId) -> u8 {
    info_for(id).precedence
}

/// Which prefix slot an operator occupies when used in prefix position.
///
/// ## Returns
/// - `None` for operators that have no prefix form.
pub fn prefix_role(id: OperatorId) -> Option<PrefixRole> {
    match id {
        OperatorId::Bang | OperatorId::Minus | OperatorId::Tilde => Some(PrefixRole::Logical),
        OperatorId::Star | OperatorId::Amp => Some(PrefixRole::Pointer),
        _ => None,
    }
}

/// Full metadata.
pub fn info_for(id: OperatorId) -> &'static OperatorInfo {
    &OPERATORS[id as usize]
}

/// Lookup by spelling.
pub fn from_str(s: &str) -> Option<OperatorId> {
    OPERATORS.iter().find(|o| o.spelling == s).map(|o| o.id)
}

// --- helpers -----------------------------------------------------------------

const fn op(id: OperatorId, spelling: &'static str, precedence: u8, fixity: Fixity) -> OperatorInfo {
    OperatorInfo {
        id,
        spelling,
        precedence,
        associativity: Associativity::Left,
        fixity,
    }
}
