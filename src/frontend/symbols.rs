//! Symbol table, scopes, and resolved types for the semantic analyzer.
//!
//! Scopes form a tree stored in one vector: scope 0 is the **root** scope holding the predeclared functions (`log`,
//! `range`, `panic`, ...), scope 1 is the module's global scope, and every function, method, and block gets a child
//! scope. Lookup walks outward through parents, so a user declaration named `log` shadows the predeclared one without
//! any special-casing.
//!
//! ## Notes
//! - A function symbol stores every overload under one name; call sites choose by argument count.
//! - Nominal types (structs, enums) are identified by module and name, so two modules may each declare a `Point`.
//! - Scopes are never discarded: after analysis the table keeps every block scope for code generation.

use std::collections::HashMap;
use std::fmt;

use asthra_core::lang::predeclared::{self, TypeShape};
use asthra_core::lang::types::{self, PrimitiveId};

use crate::frontend::ast::{PointerMutability, Span, Visibility};

pub type SymbolId = usize;
pub type ScopeId = usize;

/// Scope holding the predeclared functions.
pub const ROOT_SCOPE: ScopeId = 0;
/// A module's global scope.
pub const MODULE_SCOPE: ScopeId = 1;

// ============================================================================
// Resolved types
// ============================================================================

/// Identity of a struct or enum: declaring module plus name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NominalRef {
    pub module: String,
    pub name: String,
}

impl NominalRef {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }
}

/// A fully resolved type.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedType {
    Primitive(PrimitiveId),
    Slice(Box<ResolvedType>),
    /// `[N]T`; the size is `None` when it could not be folded.
    FixedArray(Box<ResolvedType>, Option<u64>),
    Pointer(PointerMutability, Box<ResolvedType>),
    Result(Box<ResolvedType>, Box<ResolvedType>),
    Option(Box<ResolvedType>),
    TaskHandle(Box<ResolvedType>),
    Tuple(Vec<ResolvedType>),
    Struct(NominalRef, Vec<ResolvedType>),
    Enum(NominalRef, Vec<ResolvedType>),
    /// A generic parameter inside its declaration.
    TypeParam(String),
    /// Produced by `infinite()`; only usable as a `for` iterable.
    InfiniteIterator,
    /// Error recovery and opaque external members; compatible with everything.
    Unknown,
}

impl ResolvedType {
    pub const VOID: ResolvedType = ResolvedType::Primitive(PrimitiveId::Void);
    pub const NEVER: ResolvedType = ResolvedType::Primitive(PrimitiveId::Never);
    pub const BOOL: ResolvedType = ResolvedType::Primitive(PrimitiveId::Bool);
    pub const USIZE: ResolvedType = ResolvedType::Primitive(PrimitiveId::Usize);

    pub fn primitive(&self) -> Option<PrimitiveId> {
        match self {
            ResolvedType::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ResolvedType::Unknown)
    }

    pub fn is_never(&self) -> bool {
        matches!(self, ResolvedType::Primitive(PrimitiveId::Never))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, ResolvedType::Primitive(PrimitiveId::Void))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, ResolvedType::Primitive(PrimitiveId::Bool))
    }

    pub fn is_integer(&self) -> bool {
        self.primitive().is_some_and(types::is_integer)
    }

    pub fn is_float(&self) -> bool {
        self.primitive().is_some_and(types::is_float)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Element type of something a `for` loop or an index can walk.
    pub fn element_type(&self) -> Option<&ResolvedType> {
        match self {
            ResolvedType::Slice(inner) | ResolvedType::FixedArray(inner, _) => Some(inner),
            _ => None,
        }
    }

    /// Whether any generic parameter remains inside.
    pub fn has_type_params(&self) -> bool {
        match self {
            ResolvedType::TypeParam(_) => true,
            ResolvedType::Slice(t)
            | ResolvedType::FixedArray(t, _)
            | ResolvedType::Pointer(_, t)
            | ResolvedType::Option(t)
            | ResolvedType::TaskHandle(t) => t.has_type_params(),
            ResolvedType::Result(a, b) => a.has_type_params() || b.has_type_params(),
            ResolvedType::Tuple(ts) | ResolvedType::Struct(_, ts) | ResolvedType::Enum(_, ts) => {
                ts.iter().any(ResolvedType::has_type_params)
            }
            ResolvedType::Primitive(_) | ResolvedType::InfiniteIterator | ResolvedType::Unknown => false,
        }
    }

    /// Replace generic parameters by their bindings; unbound parameters stay as they are.
    pub fn substitute(&self, bindings: &HashMap<String, ResolvedType>) -> ResolvedType {
        let sub = |t: &ResolvedType| Box::new(t.substitute(bindings));
        match self {
            ResolvedType::TypeParam(name) => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
            ResolvedType::Slice(t) => ResolvedType::Slice(sub(t)),
            ResolvedType::FixedArray(t, n) => ResolvedType::FixedArray(sub(t), *n),
            ResolvedType::Pointer(m, t) => ResolvedType::Pointer(*m, sub(t)),
            ResolvedType::Result(a, b) => ResolvedType::Result(sub(a), sub(b)),
            ResolvedType::Option(t) => ResolvedType::Option(sub(t)),
            ResolvedType::TaskHandle(t) => ResolvedType::TaskHandle(sub(t)),
            ResolvedType::Tuple(ts) => ResolvedType::Tuple(ts.iter().map(|t| t.substitute(bindings)).collect()),
            ResolvedType::Struct(r, ts) => {
                ResolvedType::Struct(r.clone(), ts.iter().map(|t| t.substitute(bindings)).collect())
            }
            ResolvedType::Enum(r, ts) => {
                ResolvedType::Enum(r.clone(), ts.iter().map(|t| t.substitute(bindings)).collect())
            }
            ResolvedType::Primitive(_) | ResolvedType::InfiniteIterator | ResolvedType::Unknown => self.clone(),
        }
    }
}

impl ResolvedType {
    /// Substitute, then turn the parameters in `params` that stayed unbound into `Unknown`.
    pub fn instantiate(&self, params: &[String], bindings: &HashMap<String, ResolvedType>) -> ResolvedType {
        let mut full = bindings.clone();
        for p in params {
            full.entry(p.clone()).or_insert(ResolvedType::Unknown);
        }
        self.substitute(&full)
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, ts: &[ResolvedType]) -> fmt::Result {
            for (i, t) in ts.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", t)?;
            }
            Ok(())
        }

        match self {
            ResolvedType::Primitive(p) => write!(f, "{}", types::as_str(*p)),
            ResolvedType::Slice(t) => write!(f, "[]{}", t),
            ResolvedType::FixedArray(t, Some(n)) => write!(f, "[{}]{}", n, t),
            ResolvedType::FixedArray(t, None) => write!(f, "[_]{}", t),
            ResolvedType::Pointer(PointerMutability::Mut, t) => write!(f, "*mut {}", t),
            ResolvedType::Pointer(PointerMutability::Const, t) => write!(f, "*const {}", t),
            ResolvedType::Result(a, b) => write!(f, "Result<{}, {}>", a, b),
            ResolvedType::Option(t) => write!(f, "Option<{}>", t),
            ResolvedType::TaskHandle(t) => write!(f, "TaskHandle<{}>", t),
            ResolvedType::Tuple(ts) => {
                write!(f, "(")?;
                list(f, ts)?;
                write!(f, ")")
            }
            ResolvedType::Struct(r, args) | ResolvedType::Enum(r, args) => {
                write!(f, "{}", r.name)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    list(f, args)?;
                    write!(f, ">")?;
                }
                Ok(())
            }
            ResolvedType::TypeParam(name) => write!(f, "{}", name),
            ResolvedType::InfiniteIterator => write!(f, "InfiniteIterator"),
            ResolvedType::Unknown => write!(f, "{{unknown}}"),
        }
    }
}

/// Whether a value of type `actual` may be used where `expected` is required.
///
/// ## Notes
/// - `int` is compatible with every integer type and `float` with every float type.
/// - `Never` fits anywhere; `Unknown` is accepted to avoid cascading errors.
/// - A type parameter only fits itself. Call sites substitute inferred bindings before asking.
/// - A fixed array fits a slice of the same element type, and `*mut T` fits `*const T`.
pub fn is_assignable(actual: &ResolvedType, expected: &ResolvedType) -> bool {
    use ResolvedType as T;

    if actual == expected {
        return true;
    }
    match (actual, expected) {
        (T::Unknown, _) | (_, T::Unknown) => true,
        (a, _) if a.is_never() => true,
        (T::Primitive(a), T::Primitive(b)) => {
            (types::is_integer(*a) && types::is_integer(*b) && (*a == PrimitiveId::Int || *b == PrimitiveId::Int))
                || (types::is_float(*a) && types::is_float(*b) && (*a == PrimitiveId::Float || *b == PrimitiveId::Float))
        }
        (T::Slice(a), T::Slice(b)) => is_assignable(a, b),
        (T::FixedArray(a, _), T::Slice(b)) => is_assignable(a, b),
        (T::FixedArray(a, n), T::FixedArray(b, m)) => {
            is_assignable(a, b) && (n.is_none() || m.is_none() || n == m)
        }
        (T::Pointer(ma, a), T::Pointer(mb, b)) => {
            (ma == mb || *mb == PointerMutability::Const) && is_assignable(a, b)
        }
        (T::Result(a1, a2), T::Result(b1, b2)) => is_assignable(a1, b1) && is_assignable(a2, b2),
        (T::Option(a), T::Option(b)) | (T::TaskHandle(a), T::TaskHandle(b)) => is_assignable(a, b),
        (T::Tuple(a), T::Tuple(b)) => a.len() == b.len() && a.iter().zip(b).all(|(x, y)| is_assignable(x, y)),
        (T::Struct(ra, a), T::Struct(rb, b)) | (T::Enum(ra, a), T::Enum(rb, b)) => {
            ra == rb && a.len() == b.len() && a.iter().zip(b).all(|(x, y)| is_assignable(x, y))
        }
        _ => false,
    }
}

/// Storage size and alignment in bytes, following C layout rules.
///
/// `None` for types without a size (`Never`, unresolved types, generic parameters), for structs and enums that
/// contain themselves by value, and for sizes that overflow `u64`.
pub fn layout(ty: &ResolvedType, lookup: &dyn Fn(&NominalRef) -> Option<Vec<ResolvedType>>) -> Option<(u64, u64)> {
    layout_in(ty, lookup, &mut Vec::new())
}

fn aggregate(fields: &[(u64, u64)]) -> Option<(u64, u64)> {
    let mut size = 0u64;
    let mut align = 1u64;
    for &(s, a) in fields {
        size = size.div_ceil(a).checked_mul(a)?.checked_add(s)?;
        align = align.max(a);
    }
    Some((size.div_ceil(align).checked_mul(align)?, align))
}

fn layout_in(
    ty: &ResolvedType,
    lookup: &dyn Fn(&NominalRef) -> Option<Vec<ResolvedType>>,
    visiting: &mut Vec<NominalRef>,
) -> Option<(u64, u64)> {
    match ty {
        ResolvedType::Primitive(p) => {
            let size = types::info_for(*p).size_bytes?;
            Some((size, size.clamp(1, 8)))
        }
        ResolvedType::Pointer(..) | ResolvedType::TaskHandle(_) => Some((8, 8)),
        ResolvedType::Slice(_) => Some((16, 8)),
        ResolvedType::FixedArray(elem, n) => {
            let (size, align) = layout_in(elem, lookup, visiting)?;
            Some((size.checked_mul((*n)?)?, align))
        }
        ResolvedType::Tuple(elems) => {
            let fields = elems
                .iter()
                .map(|e| layout_in(e, lookup, visiting))
                .collect::<Option<Vec<_>>>()?;
            aggregate(&fields)
        }
        ResolvedType::Option(inner) => {
            let payload = layout_in(inner, lookup, visiting)?;
            aggregate(&[(4, 4), payload])
        }
        ResolvedType::Result(ok, err) => {
            let (os, oa) = layout_in(ok, lookup, visiting)?;
            let (es, ea) = layout_in(err, lookup, visiting)?;
            aggregate(&[(4, 4), (os.max(es), oa.max(ea))])
        }
        ResolvedType::Struct(r, _) | ResolvedType::Enum(r, _) => {
            if visiting.contains(r) {
                return None;
            }
            let members = lookup(r)?;
            visiting.push(r.clone());
            let laid_out = members
                .iter()
                .map(|m| layout_in(m, lookup, visiting))
                .collect::<Option<Vec<_>>>();
            visiting.pop();
            let laid_out = laid_out?;
            if matches!(ty, ResolvedType::Struct(..)) {
                aggregate(&laid_out)
            } else {
                let widest = laid_out
                    .iter()
                    .fold((0u64, 1u64), |(s, a), &(ms, ma)| (s.max(ms), a.max(ma)));
                aggregate(&[(4, 4), widest])
            }
        }
        ResolvedType::TypeParam(_) | ResolvedType::InfiniteIterator | ResolvedType::Unknown => None,
    }
}

// ============================================================================
// Const values
// ============================================================================

/// A folded constant.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Int(i128),
    Float(f64),
    Bool(bool),
    Str(String),
    Char(char),
}

impl ConstValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ConstValue::Int(_) => "int",
            ConstValue::Float(_) => "float",
            ConstValue::Bool(_) => "bool",
            ConstValue::Str(_) => "string",
            ConstValue::Char(_) => "char",
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(n) => write!(f, "{}", n),
            ConstValue::Float(x) => write!(f, "{}", x),
            ConstValue::Bool(b) => write!(f, "{}", b),
            ConstValue::Str(s) => write!(f, "{:?}", s),
            ConstValue::Char(c) => write!(f, "{:?}", c),
        }
    }
}

// ============================================================================
// Symbols
// ============================================================================

/// A named entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Span of the declaring node (default for predeclared symbols).
    pub span: Span,
    pub scope: ScopeId,
    /// `None` for locals and predeclared functions.
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Variable(VariableInfo),
    Function(FunctionInfo),
    Struct(StructInfo),
    Enum(EnumInfo),
    Const(ConstInfo),
    TypeParam,
    /// An import binding.
    Module(ModuleBinding),
}

impl SymbolKind {
    /// Noun used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            SymbolKind::Variable(_) => "variable",
            SymbolKind::Function(_) => "function",
            SymbolKind::Struct(_) => "struct",
            SymbolKind::Enum(_) => "enum",
            SymbolKind::Const(_) => "constant",
            SymbolKind::TypeParam => "type parameter",
            SymbolKind::Module(_) => "module",
        }
    }
}

/// How a variable came into scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingOrigin {
    Let,
    Param,
    /// The `self` receiver.
    SelfParam,
    Pattern,
    ForLoop,
    /// A `spawn_with_handle` handle.
    TaskHandle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableInfo {
    pub ty: ResolvedType,
    pub mutable: bool,
    pub origin: BindingOrigin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamInfo {
    pub name: String,
    pub ty: ResolvedType,
}

/// One callable signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub type_params: Vec<String>,
    pub params: Vec<ParamInfo>,
    pub return_type: ResolvedType,
}

impl Signature {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    /// Overloads, distinguished by parameter count.
    pub signatures: Vec<Signature>,
    pub is_extern: bool,
    pub is_predeclared: bool,
}

impl FunctionInfo {
    /// Overload taking `arg_count` arguments.
    pub fn overload(&self, arg_count: usize) -> Option<(usize, &Signature)> {
        self.signatures.iter().enumerate().find(|(_, s)| s.arity() == arg_count)
    }

    /// Accepted argument counts, e.g. `1 or 2`.
    pub fn arities(&self) -> String {
        let counts: Vec<String> = self.signatures.iter().map(|s| s.arity().to_string()).collect();
        counts.join(" or ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub name: String,
    pub ty: ResolvedType,
    pub visibility: Visibility,
    pub span: Span,
}

/// A method or associated function from an `impl` block.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub signature: Signature,
    pub has_self: bool,
    pub visibility: Visibility,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructInfo {
    pub nominal: NominalRef,
    pub type_params: Vec<String>,
    pub fields: Vec<FieldInfo>,
    pub methods: HashMap<String, MethodInfo>,
    /// Memory strategy from `#[ownership(...)]`.
    pub ownership: Option<String>,
}

impl StructInfo {
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantInfo {
    pub name: String,
    pub payload: Vec<ResolvedType>,
    pub discriminant: Option<i128>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumInfo {
    pub nominal: NominalRef,
    pub type_params: Vec<String>,
    pub variants: Vec<VariantInfo>,
    pub methods: HashMap<String, MethodInfo>,
    pub ownership: Option<String>,
}

impl EnumInfo {
    pub fn variant(&self, name: &str) -> Option<&VariantInfo> {
        self.variants.iter().find(|v| v.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstInfo {
    pub ty: ResolvedType,
    /// `None` until folded, or when folding failed.
    pub value: Option<ConstValue>,
}

/// What an import binding refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleBinding {
    pub path: String,
    /// Name of the imported module, or `None` for an opaque external package.
    pub module: Option<String>,
}

// ============================================================================
// Scopes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Root,
    Module,
    Function,
    Method,
    Block,
    Unsafe,
    Loop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    pub symbols: HashMap<String, SymbolId>,
}

impl Scope {
    pub fn new(parent: Option<ScopeId>, kind: ScopeKind) -> Self {
        Self {
            parent,
            kind,
            symbols: HashMap::new(),
        }
    }
}

/// All symbols and scopes of one module.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl SymbolTable {
    /// A table with the predeclared root scope and an empty module scope (the current scope).
    pub fn new() -> Self {
        let mut table = Self {
            symbols: Vec::new(),
            scopes: vec![Scope::new(None, ScopeKind::Root)],
            current: ROOT_SCOPE,
        };
        table.seed_predeclared();
        table.scopes.push(Scope::new(Some(ROOT_SCOPE), ScopeKind::Module));
        table.current = MODULE_SCOPE;
        table
    }

    fn seed_predeclared(&mut self) {
        for info in predeclared::PREDECLARED {
            let signatures = info
                .signatures
                .iter()
                .map(|sig| {
                    let generic = sig.params.iter().any(|(_, shape)| *shape == TypeShape::AnySlice);
                    Signature {
                        type_params: if generic { vec!["T".to_string()] } else { Vec::new() },
                        params: sig
                            .params
                            .iter()
                            .map(|(name, shape)| ParamInfo {
                                name: name.to_string(),
                                ty: shape_type(*shape),
                            })
                            .collect(),
                        return_type: shape_type(sig.returns),
                    }
                })
                .collect();
            let symbol = Symbol {
                name: info.canonical.to_string(),
                kind: SymbolKind::Function(FunctionInfo {
                    signatures,
                    is_extern: false,
                    is_predeclared: true,
                }),
                span: Span::default(),
                scope: ROOT_SCOPE,
                visibility: None,
            };
            // Root names are unique by construction of the registry.
            let _ = self.define(symbol);
        }
    }

    pub fn current_scope(&self) -> ScopeId {
        self.current
    }

    pub fn current_scope_kind(&self) -> ScopeKind {
        self.scopes[self.current].kind
    }

    pub fn enter_scope(&mut self, kind: ScopeKind) -> ScopeId {
        self.scopes.push(Scope::new(Some(self.current), kind));
        self.current = self.scopes.len() - 1;
        self.current
    }

    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current].parent {
            self.current = parent;
        }
    }

    /// Define `symbol` in the current scope.
    ///
    /// ## Errors
    /// - The span of the earlier declaration when the name is already taken in this scope.
    pub fn define(&mut self, mut symbol: Symbol) -> Result<SymbolId, Span> {
        if let Some(&existing) = self.scopes[self.current].symbols.get(&symbol.name) {
            return Err(self.symbols[existing].span);
        }
        symbol.scope = self.current;
        let id = self.symbols.len();
        self.scopes[self.current].symbols.insert(symbol.name.clone(), id);
        self.symbols.push(symbol);
        Ok(id)
    }

    /// Look up `name` through the current scope chain.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        let mut scope = Some(self.current);
        while let Some(idx) = scope {
            if let Some(&id) = self.scopes[idx].symbols.get(name) {
                return Some(id);
            }
            scope = self.scopes[idx].parent;
        }
        None
    }

    /// Look up `name` in the current scope only.
    pub fn lookup_local(&self, name: &str) -> Option<SymbolId> {
        self.scopes[self.current].symbols.get(name).copied()
    }

    /// Look up a module-level declaration.
    pub fn lookup_global(&self, name: &str) -> Option<SymbolId> {
        self.scopes.get(MODULE_SCOPE)?.symbols.get(name).copied()
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id)
    }

    /// Whether the current scope is nested in a scope of `kind`.
    pub fn inside(&self, kind: ScopeKind) -> bool {
        let mut scope = Some(self.current);
        while let Some(idx) = scope {
            match self.scopes[idx].kind {
                k if k == kind => return true,
                ScopeKind::Function | ScopeKind::Method if kind != ScopeKind::Module => return false,
                _ => {}
            }
            scope = self.scopes[idx].parent;
        }
        false
    }

    /// Module-level symbols, in declaration order.
    pub fn globals(&self) -> impl Iterator<Item = &Symbol> {
        let mut ids: Vec<SymbolId> = self
            .scopes
            .get(MODULE_SCOPE)
            .map(|s| s.symbols.values().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids.into_iter().filter_map(|id| self.symbols.get(id))
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

fn shape_type(shape: TypeShape) -> ResolvedType {
    match shape {
        TypeShape::Primitive(p) => ResolvedType::Primitive(p),
        TypeShape::SliceOf(p) => ResolvedType::Slice(Box::new(ResolvedType::Primitive(p))),
        TypeShape::AnySlice => ResolvedType::Slice(Box::new(ResolvedType::TypeParam("T".to_string()))),
        TypeShape::InfiniteIterator => ResolvedType::InfiniteIterator,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(p: PrimitiveId) -> ResolvedType {
        ResolvedType::Primitive(p)
    }

    #[test]
    fn test_predeclared_seeded_in_root() {
        let table = SymbolTable::new();
        let id = table.lookup("range").expect("range is predeclared");
        let sym = table.get(id).expect("symbol");
        assert_eq!(sym.scope, ROOT_SCOPE);
        let SymbolKind::Function(info) = &sym.kind else {
            panic!("range should be a function");
        };
        assert!(info.is_predeclared);
        assert_eq!(info.arities(), "1 or 2");
        assert_eq!(table.current_scope(), MODULE_SCOPE);
    }

    #[test]
    fn test_module_declaration_shadows_predeclared() {
        let mut table = SymbolTable::new();
        let user = table
            .define(Symbol {
                name: "log".to_string(),
                kind: SymbolKind::Const(ConstInfo {
                    ty: ResolvedType::VOID,
                    value: None,
                }),
                span: Span::new(5, 8),
                scope: 0,
                visibility: Some(Visibility::Public),
            })
            .expect("module scope accepts a shadowing name");
        assert_eq!(table.lookup("log"), Some(user));
    }

    #[test]
    fn test_duplicate_in_same_scope_rejected() {
        let mut table = SymbolTable::new();
        let var = |span| Symbol {
            name: "x".to_string(),
            kind: SymbolKind::Variable(VariableInfo {
                ty: ResolvedType::BOOL,
                mutable: false,
                origin: BindingOrigin::Let,
            }),
            span,
            scope: 0,
            visibility: None,
        };
        table.enter_scope(ScopeKind::Function);
        assert!(table.define(var(Span::new(0, 1))).is_ok());
        assert_eq!(table.define(var(Span::new(4, 5))), Err(Span::new(0, 1)));
        table.enter_scope(ScopeKind::Block);
        assert!(table.define(var(Span::new(9, 10))).is_ok());
        table.exit_scope();
        table.exit_scope();
        assert_eq!(table.lookup("x"), None);
    }

    #[test]
    fn test_assignability() {
        use PrimitiveId::*;
        assert!(is_assignable(&int(Int), &int(U8)));
        assert!(is_assignable(&int(I32), &int(Int)));
        assert!(!is_assignable(&int(I32), &int(I64)));
        assert!(is_assignable(&int(Float), &int(F32)));
        assert!(!is_assignable(&int(Int), &int(F64)));
        assert!(is_assignable(&ResolvedType::NEVER, &int(String)));

        let arr = ResolvedType::FixedArray(Box::new(int(I32)), Some(3));
        let slice = ResolvedType::Slice(Box::new(int(I32)));
        assert!(is_assignable(&arr, &slice));
        assert!(!is_assignable(&slice, &arr));

        let mut_ptr = ResolvedType::Pointer(PointerMutability::Mut, Box::new(int(U8)));
        let const_ptr = ResolvedType::Pointer(PointerMutability::Const, Box::new(int(U8)));
        assert!(is_assignable(&mut_ptr, &const_ptr));
        assert!(!is_assignable(&const_ptr, &mut_ptr));

        let a = ResolvedType::Struct(NominalRef::new("a", "Point"), vec![]);
        let b = ResolvedType::Struct(NominalRef::new("b", "Point"), vec![]);
        assert!(!is_assignable(&a, &b));

        let opt = ResolvedType::Option(Box::new(int(I32)));
        assert!(!is_assignable(&opt, &int(I32)));
    }

    #[test]
    fn test_display_and_substitute() {
        let generic = ResolvedType::Result(
            Box::new(ResolvedType::TypeParam("T".to_string())),
            Box::new(ResolvedType::Primitive(PrimitiveId::String)),
        );
        assert_eq!(generic.to_string(), "Result<T, string>");
        let bindings = HashMap::from([("T".to_string(), ResolvedType::Primitive(PrimitiveId::I32))]);
        assert_eq!(generic.substitute(&bindings).to_string(), "Result<i32, string>");
        assert!(generic.has_type_params());
        assert_eq!(generic.substitute(&HashMap::new()), generic);
        let erased = generic.instantiate(&["T".to_string()], &HashMap::new());
        assert_eq!(erased.to_string(), "Result<{unknown}, string>");
    }

    #[test]
    fn test_layout_uses_c_rules() {
        let none = |_: &NominalRef| None;
        let tuple = ResolvedType::Tuple(vec![int(PrimitiveId::U8), int(PrimitiveId::I32)]);
        assert_eq!(layout(&tuple, &none), Some((8, 4)));
        let arr = ResolvedType::FixedArray(Box::new(int(PrimitiveId::U16)), Some(5));
        assert_eq!(layout(&arr, &none), Some((10, 2)));
        assert_eq!(layout(&ResolvedType::NEVER, &none), None);
    }

    #[test]
    fn test_layout_of_self_containing_struct_is_none() {
        let a = NominalRef::new("m", "A");
        let a_ty = ResolvedType::Struct(a.clone(), vec![]);
        let lookup = |r: &NominalRef| (*r == a).then(|| vec![ResolvedType::Struct(a.clone(), vec![])]);
        assert_eq!(layout(&a_ty, &lookup), None);

        // Behind a pointer the same struct has a size.
        let boxed = |_: &NominalRef| Some(vec![ResolvedType::Pointer(PointerMutability::Mut, Box::new(a_ty.clone()))]);
        assert_eq!(layout(&a_ty, &boxed), Some((8, 8)));
    }

    #[test]
    fn test_layout_overflow_is_none() {
        let none = |_: &NominalRef| None;
        let huge = ResolvedType::FixedArray(Box::new(int(PrimitiveId::U64)), Some(u64::MAX / 8));
        let pair = ResolvedType::Tuple(vec![huge.clone(), huge]);
        assert_eq!(layout(&pair, &none), None);
    }
}
