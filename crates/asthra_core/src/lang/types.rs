//! Primitive type vocabulary.
//!
//! Primitive type names are reserved: the lexer turns them into dedicated tokens so they can never be shadowed by
//! user declarations. Each entry records its numeric class and storage size, which the analyzer uses for literal
//! adoption (`let x: u8 = 1;`) and `sizeof` folding.
//!
//! ## Notes
//! - `int` and `float` are the default literal types; they behave as `i64` and `f64` for sizing.
//! - `string` is sized as a pointer-plus-length pair.
//! - `Never` has no size: `sizeof(Never)` is a const-eval error.
//!
//! ## Examples
//! ```rust
//! use asthra_core::lang::types::{self, PrimitiveId, NumericClass};
//!
//! assert_eq!(types::from_str("u8"), Some(PrimitiveId::U8));
//! assert_eq!(types::info_for(PrimitiveId::U8).size_bytes, Some(1));
//! assert_eq!(types::numeric_class(PrimitiveId::F32), Some(NumericClass::Float));
//! ```

/// Stable identifier for every primitive type.
///
/// ## Notes
/// - Variant order matches [`PRIMITIVES`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveId {
    Int,
    Float,
    Bool,
    String,
    Void,
    Usize,
    Isize,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    U128,
    I128,
    F32,
    F64,
    Char,
    Never,
}

/// Arithmetic class of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericClass {
    SignedInt,
    UnsignedInt,
    Float,
}

/// Metadata for a primitive type.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveInfo {
    pub id: PrimitiveId,
    pub canonical: &'static str,
    pub numeric: Option<NumericClass>,
    /// Storage size in bytes, `None` for uninhabited types.
    pub size_bytes: Option<u64>,
}

/// Registry of all primitive types, in [`PrimitiveId`] declaration order.
pub const PRIMITIVES: &[PrimitiveInfo] = &[
    prim(PrimitiveId::Int, "int", Some(NumericClass::SignedInt), Some(8)),
    prim(PrimitiveId::Float, "float", Some(NumericClass::Float), Some(8)),
    prim(PrimitiveId::Bool, "bool", None, Some(1)),
    prim(PrimitiveId::String, "string", None, Some(16)),
    prim(PrimitiveId::Void, "void", None, Some(0)),
    prim(PrimitiveId::Usize, "usize", Some(NumericClass::UnsignedInt), Some(8)),
    prim(PrimitiveId::Isize, "isize", Some(NumericClass::SignedInt), Some(8)),
    prim(PrimitiveId::U8, "u8", Some(NumericClass::UnsignedInt), Some(1)),
    prim(PrimitiveId::I8, "i8", Some(NumericClass::SignedInt), Some(1)),
    prim(PrimitiveId::U16, "u16", Some(NumericClass::UnsignedInt), Some(2)),
    prim(PrimitiveId::I16, "i16", Some(NumericClass::SignedInt), Some(2)),
    prim(PrimitiveId::U32, "u32", Some(NumericClass::UnsignedInt), Some(4)),
    prim(PrimitiveId::I32, "i32", Some(NumericClass::SignedInt), Some(4)),
    prim(PrimitiveId::U64, "u64", Some(NumericClass::UnsignedInt), Some(8)),
    prim(PrimitiveId::I64, "i64", Some(NumericClass::SignedInt), Some(8)),
    prim(PrimitiveId::U128, "u128", Some(NumericClass::UnsignedInt), Some(16)),
    prim(PrimitiveId::I128, "i128", Some(NumericClass::SignedInt), Some(16)),
    prim(PrimitiveId::F32, "f32", Some(NumericClass::Float), Some(4)),
    prim(PrimitiveId::F64, "f64", Some(NumericClass::Float), Some(8)),
    prim(PrimitiveId::Char, "char", None, Some(4)),
    prim(PrimitiveId::Never, "Never", None, None),
];

/// Canonical spelling.
pub fn as_str(id: PrimitiveId) -> &'static str {
    info_for(id).canonical
}

/// Numeric class, if the primitive is numeric.
pub fn numeric_class(id: PrimitiveId) -> Option<NumericClass> {
    info_for(id).numeric
}

/// Whether the primitive is an integer type (signed or unsigned).
pub fn is_integer(id: PrimitiveId) -> bool {
    matches!(
        numeric_class(id),
        Some(NumericClass::SignedInt | NumericClass::UnsignedInt)
    )
}

/// Whether the primitive is a floating point type.
pub fn is_float(id: PrimitiveId) -> bool {
    numeric_class(id) == Some(NumericClass::Float)
}

/// Full metadata.
pub fn info_for(id: PrimitiveId) -> &'static PrimitiveInfo {
    &PRIMITIVES[id as usize]
}

/// Lookup by spelling.
pub fn from_str(s: &str) -> Option<PrimitiveId> {
    PRIMITIVES.iter().find(|p| p.canonical == s).map(|p| p.id)
}

// --- helpers -----------------------------------------------------------------

const fn prim(
    id: PrimitiveId,
    canonical: &'static str,
    numeric: Option<NumericClass>,
    size_bytes: Option<u64>,
) -> PrimitiveInfo {
    PrimitiveInfo {
        id,
        canonical,
        numeric,
        size_bytes,
    }
}
