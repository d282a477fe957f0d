//! Predeclared function vocabulary.
//!
//! Predeclared names are **not keywords**: the analyzer seeds them into a root scope that sits beneath every
//! module's global scope, so a user declaration with the same name shadows them through ordinary lookup.
//!
//! A name may carry several signatures (`range(end)` and `range(start, end)`); call sites pick one by argument count.
//!
//! ## Examples
//! ```rust
//! use asthra_core::lang::predeclared::{self, PredeclaredId};
//!
//! assert_eq!(predeclared::from_str("range"), Some(PredeclaredId::Range));
//! assert_eq!(predeclared::info_for(PredeclaredId::Range).signatures.len(), 2);
//! ```

use super::types::PrimitiveId;

/// Stable identifier for every predeclared function.
///
/// ## Notes
/// - Variant order matches [`PREDECLARED`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredeclaredId {
    Log,
    Range,
    Panic,
    Exit,
    Args,
    Len,
    Infinite,
}

/// Shape of a parameter or return type in a predeclared signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeShape {
    Primitive(PrimitiveId),
    /// `[]T` for a concrete primitive `T`.
    SliceOf(PrimitiveId),
    /// `[]T` for any element type (generic over `T`).
    AnySlice,
    /// The endless iterator produced by `infinite()`.
    InfiniteIterator,
}

/// One overload of a predeclared function.
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub params: &'static [(&'static str, TypeShape)],
    pub returns: TypeShape,
}

/// Metadata for a predeclared function.
#[derive(Debug, Clone, Copy)]
pub struct PredeclaredInfo {
    pub id: PredeclaredId,
    pub canonical: &'static str,
    pub signatures: &'static [Signature],
    pub description: &'static str,
}

/// Registry of predeclared functions, in [`PredeclaredId`] declaration order.
pub const PREDECLARED: &[PredeclaredInfo] = &[
    PredeclaredInfo {
        id: PredeclaredId::Log,
        canonical: "log",
        signatures: &[Signature {
            params: &[("message", TypeShape::Primitive(PrimitiveId::String))],
            returns: TypeShape::Primitive(PrimitiveId::Void),
        }],
        description: "Write a message to the runtime log.",
    },
    PredeclaredInfo {
        id: PredeclaredId::Range,
        canonical: "range",
        signatures: &[
            Signature {
                params: &[("end", TypeShape::Primitive(PrimitiveId::I32))],
                returns: TypeShape::SliceOf(PrimitiveId::I32),
            },
            Signature {
                params: &[
                    ("start", TypeShape::Primitive(PrimitiveId::I32)),
                    ("end", TypeShape::Primitive(PrimitiveId::I32)),
                ],
                returns: TypeShape::SliceOf(PrimitiveId::I32),
            },
        ],
        description: "Produce the integers of a half-open interval.",
    },
    PredeclaredInfo {
        id: PredeclaredId::Panic,
        canonical: "panic",
        signatures: &[Signature {
            params: &[("message", TypeShape::Primitive(PrimitiveId::String))],
            returns: TypeShape::Primitive(PrimitiveId::Never),
        }],
        description: "Abort the program with a message.",
    },
    PredeclaredInfo {
        id: PredeclaredId::Exit,
        canonical: "exit",
        signatures: &[Signature {
            params: &[("status", TypeShape::Primitive(PrimitiveId::I32))],
            returns: TypeShape::Primitive(PrimitiveId::Never),
        }],
        description: "Terminate the program with a status code.",
    },
    PredeclaredInfo {
        id: PredeclaredId::Args,
        canonical: "args",
        signatures: &[Signature {
            params: &[],
            returns: TypeShape::SliceOf(PrimitiveId::String),
        }],
        description: "Command-line arguments of the running program.",
    },
    PredeclaredInfo {
        id: PredeclaredId::Len,
        canonical: "len",
        signatures: &[Signature {
            params: &[("slice", TypeShape::AnySlice)],
            returns: TypeShape::Primitive(PrimitiveId::Usize),
        }],
        description: "Number of elements in a slice or fixed array.",
    },
    PredeclaredInfo {
        id: PredeclaredId::Infinite,
        canonical: "infinite",
        signatures: &[Signature {
            params: &[],
            returns: TypeShape::InfiniteIterator,
        }],
        description: "An endless iterator for `for` loops.",
    },
];

/// Canonical spelling.
pub fn as_str(id: PredeclaredId) -> &'static str {
    info_for(id).canonical
}

/// Full metadata.
pub fn info_for(id: PredeclaredId) -> &'static PredeclaredInfo {
    &PREDECLARED[id as usize]
}

/// Lookup by spelling.
pub fn from_str(s: &str) -> Option<PredeclaredId> {
    PREDECLARED.iter().find(|p| p.canonical == s).map(|p| p.id)
}
