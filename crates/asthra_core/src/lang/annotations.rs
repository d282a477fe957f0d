//! Annotation vocabulary.
//!
//! Annotations are written `#[name]`, `#[name(value)]` or `#[name(key = value, ...)]` and attach to the next
//! declaration, field, or parameter. The parser accepts any well-bracketed annotation; this registry tells the
//! analyzer what each recognised name means, which placements are legal, and which argument values it accepts.
//!
//! ## Notes
//! - Names not listed here are **generic semantic tags**: kept on the AST, never rejected.
//! - Within one [`AnnotationCategory::Ownership`] or [`AnnotationCategory::FfiTransfer`] group, at most one
//!   annotation may appear on a single target.
//!
//! ## Examples
//! ```rust
//! use asthra_core::lang::annotations::{self, AnnotationCategory, AnnotationId, AnnotationTarget};
//!
//! let borrowed = annotations::info_for(AnnotationId::Borrowed);
//! assert_eq!(borrowed.category, AnnotationCategory::FfiTransfer);
//! assert!(annotations::allowed_on(AnnotationId::Borrowed, AnnotationTarget::ExternParam));
//! assert!(!annotations::allowed_on(AnnotationId::Borrowed, AnnotationTarget::ExternReturn));
//! ```

/// Stable identifier for every recognised annotation.
///
/// ## Notes
/// - Variant order matches [`ANNOTATIONS`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationId {
    Ownership,
    TransferFull,
    TransferNone,
    Borrowed,
    ConstantTime,
    VolatileMemory,
    HumanReview,
    NonDeterministic,
    Deprecated,
    Doc,
}

/// Semantic grouping; annotations of an exclusive group conflict with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationCategory {
    /// Memory strategy of an allocating declaration (`gc`, `c`, `pinned`).
    Ownership,
    /// Ownership transfer across an FFI boundary.
    FfiTransfer,
    /// Side-channel / memory-access guarantees.
    Security,
    /// Human review requests.
    Review,
    /// Descriptive tags with no checked semantics.
    Semantic,
}

impl AnnotationCategory {
    /// Whether two annotations of this category on one target are a conflict.
    pub fn is_exclusive(self) -> bool {
        matches!(self, AnnotationCategory::Ownership | AnnotationCategory::FfiTransfer)
    }
}

/// A place an annotation can be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationTarget {
    Function,
    Method,
    ExternFunction,
    Struct,
    Enum,
    Const,
    /// A `let` binding.
    Variable,
    Field,
    /// A parameter of a function with a body.
    Param,
    /// A parameter of an `extern` declaration.
    ExternParam,
    /// The return type of an `extern` declaration.
    ExternReturn,
}

impl AnnotationTarget {
    /// Human-readable name used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            AnnotationTarget::Function => "function",
            AnnotationTarget::Method => "method",
            AnnotationTarget::ExternFunction => "extern function",
            AnnotationTarget::Struct => "struct",
            AnnotationTarget::Enum => "enum",
            AnnotationTarget::Const => "const",
            AnnotationTarget::Variable => "variable",
            AnnotationTarget::Field => "field",
            AnnotationTarget::Param => "parameter",
            AnnotationTarget::ExternParam => "extern parameter",
            AnnotationTarget::ExternReturn => "extern return type",
        }
    }
}

/// Accepted argument shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentForm {
    /// `#[name]` or `#[name(none)]`.
    Flag,
    /// `#[name(value)]` where `value` is one of the listed words.
    OneOf(&'static [&'static str]),
    /// Free-form `#[name(...)]`.
    Any,
}

/// Memory strategies accepted by `#[ownership(...)]`.
pub const OWNERSHIP_MODES: &[&str] = &["gc", "c", "pinned"];

/// Priorities accepted by `#[human_review(...)]`.
pub const REVIEW_PRIORITIES: &[&str] = &["low", "medium", "high"];

const DECLARATIONS: &[AnnotationTarget] = &[
    AnnotationTarget::Function,
    AnnotationTarget::Method,
    AnnotationTarget::ExternFunction,
    AnnotationTarget::Struct,
    AnnotationTarget::Enum,
    AnnotationTarget::Const,
];

const EVERYWHERE: &[AnnotationTarget] = &[
    AnnotationTarget::Function,
    AnnotationTarget::Method,
    AnnotationTarget::ExternFunction,
    AnnotationTarget::Struct,
    AnnotationTarget::Enum,
    AnnotationTarget::Const,
    AnnotationTarget::Variable,
    AnnotationTarget::Field,
    AnnotationTarget::Param,
    AnnotationTarget::ExternParam,
    AnnotationTarget::ExternReturn,
];

/// Metadata for an annotation.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationInfo {
    pub id: AnnotationId,
    pub canonical: &'static str,
    pub category: AnnotationCategory,
    pub targets: &'static [AnnotationTarget],
    pub arguments: ArgumentForm,
}

/// Registry of recognised annotations, in [`AnnotationId`] declaration order.
pub const ANNOTATIONS: &[AnnotationInfo] = &[
    AnnotationInfo {
        id: AnnotationId::Ownership,
        canonical: "ownership",
        category: AnnotationCategory::Ownership,
        targets: &[AnnotationTarget::Struct, AnnotationTarget::Enum, AnnotationTarget::Variable],
        arguments: ArgumentForm::OneOf(OWNERSHIP_MODES),
    },
    AnnotationInfo {
        id: AnnotationId::TransferFull,
        canonical: "transfer_full",
        category: AnnotationCategory::FfiTransfer,
        targets: &[
            AnnotationTarget::Param,
            AnnotationTarget::ExternParam,
            AnnotationTarget::ExternReturn,
        ],
        arguments: ArgumentForm::Flag,
    },
    AnnotationInfo {
        id: AnnotationId::TransferNone,
        canonical: "transfer_none",
        category: AnnotationCategory::FfiTransfer,
        targets: &[
            AnnotationTarget::Param,
            AnnotationTarget::ExternParam,
            AnnotationTarget::ExternReturn,
        ],
        arguments: ArgumentForm::Flag,
    },
    AnnotationInfo {
        id: AnnotationId::Borrowed,
        canonical: "borrowed",
        category: AnnotationCategory::FfiTransfer,
        targets: &[AnnotationTarget::ExternParam],
        arguments: ArgumentForm::Flag,
    },
    AnnotationInfo {
        id: AnnotationId::ConstantTime,
        canonical: "constant_time",
        category: AnnotationCategory::Security,
        targets: &[AnnotationTarget::Function, AnnotationTarget::Method],
        arguments: ArgumentForm::Flag,
    },
    AnnotationInfo {
        id: AnnotationId::VolatileMemory,
        canonical: "volatile_memory",
        category: AnnotationCategory::Security,
        targets: &[
            AnnotationTarget::Variable,
            AnnotationTarget::Field,
            AnnotationTarget::Param,
            AnnotationTarget::ExternParam,
        ],
        arguments: ArgumentForm::Flag,
    },
    AnnotationInfo {
        id: AnnotationId::HumanReview,
        canonical: "human_review",
        category: AnnotationCategory::Review,
        targets: DECLARATIONS,
        arguments: ArgumentForm::OneOf(REVIEW_PRIORITIES),
    },
    AnnotationInfo {
        id: AnnotationId::NonDeterministic,
        canonical: "non_deterministic",
        category: AnnotationCategory::Semantic,
        targets: &[
            AnnotationTarget::Function,
            AnnotationTarget::Method,
            AnnotationTarget::ExternFunction,
        ],
        arguments: ArgumentForm::Flag,
    },
    AnnotationInfo {
        id: AnnotationId::Deprecated,
        canonical: "deprecated",
        category: AnnotationCategory::Semantic,
        targets: EVERYWHERE,
        arguments: ArgumentForm::Any,
    },
    AnnotationInfo {
        id: AnnotationId::Doc,
        canonical: "doc",
        category: AnnotationCategory::Semantic,
        targets: EVERYWHERE,
        arguments: ArgumentForm::Any,
    },
];

/// Canonical spelling.
pub fn as_str(id: AnnotationId) -> &'static str {
    info_for(id).canonical
}

/// Whether `id` may be written on `target`.
pub fn allowed_on(id: AnnotationId, target: AnnotationTarget) -> bool {
    info_for(id).targets.contains(&target)
}

/// Full metadata.
pub fn info_for(id: AnnotationId) -> &'static AnnotationInfo {
    &ANNOTATIONS[id as usize]
}

/// Lookup by spelling.
///
/// ## Returns
/// - `None` for generic semantic tags.
pub fn from_str(s: &str) -> Option<AnnotationId> {
    ANNOTATIONS.iter().find(|a| a.canonical == s).map(|a| a.id)
}
