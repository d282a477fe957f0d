//! Abstract Syntax Tree definitions for Asthra.
//!
//! The tree is closed: every category (declaration, statement, expression, type, pattern) is a fixed enum, and every
//! node owns its children outright. Nodes carry their source location through [`Spanned`].
//!
//! ## Notes
//! - `none` never appears as a node. Where the grammar accepts "empty list or `none`", the parsed list is simply
//!   empty.
//! - Named types (`Point`, `Maybe<T>`, `T`) stay unresolved here; the analyzer decides whether a name is a struct,
//!   an enum, or a type parameter.
//! - `Ident.Ident` is parsed as [`Expr::EnumConstructor`]. When the head resolves to a value instead of an enum, the
//!   analyzer reads the same node as field access or a method call.

use std::fmt;

use asthra_core::lang::types::{self, PrimitiveId};

// ============================================================================
// Source locations
// ============================================================================

/// Identifies a source file within one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FileId(pub u32);

/// Source location span: byte offsets plus the 1-based line/column of `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub file: FileId,
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub col: u32,
}

impl Span {
    /// A span with byte offsets only (line/column unknown).
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            file: FileId::default(),
            start,
            end,
            line: 0,
            col: 0,
        }
    }

    /// A span with byte offsets and the position of `start`.
    pub fn at(start: usize, end: usize, line: u32, col: u32) -> Self {
        Self {
            file: FileId::default(),
            start,
            end,
            line,
            col,
        }
    }

    pub fn with_file(mut self, file: FileId) -> Self {
        self.file = file;
        self
    }

    /// Smallest span covering both; position information comes from whichever starts first.
    pub fn merge(self, other: Span) -> Span {
        let (first, _) = if self.start <= other.start { (self, other) } else { (other, self) };
        Span {
            file: self.file,
            start: first.start,
            end: self.end.max(other.end),
            line: first.line,
            col: first.col,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

pub type Ident = String;

/// A braced statement list.
pub type Block = Vec<Spanned<Statement>>;

// ============================================================================
// Program / modules
// ============================================================================

/// One translation unit: `package name;`, imports, then declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub package: Spanned<Ident>,
    pub imports: Vec<Spanned<ImportDecl>>,
    pub declarations: Vec<Spanned<Declaration>>,
}

/// `import "path" as alias;`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub path: String,
    pub alias: Option<Spanned<Ident>>,
}

// ============================================================================
// Annotations
// ============================================================================

/// `#[name]`, `#[name(none)]`, `#[name(value, ...)]` or `#[name(key = value, ...)]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: Ident,
    pub args: AnnotationArgs,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationArgs {
    /// `#[name]` or `#[name(none)]`
    Empty,
    /// `#[name(a, b)]`
    Values(Vec<AnnotationValue>),
    /// `#[name(key = value, ...)]`
    Named(Vec<(Ident, AnnotationValue)>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Str(String),
    Ident(Ident),
    Int(u128),
    Bool(bool),
}

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationValue::Str(s) => write!(f, "\"{}\"", s),
            AnnotationValue::Ident(i) => write!(f, "{}", i),
            AnnotationValue::Int(n) => write!(f, "{}", n),
            AnnotationValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl Annotation {
    /// First positional argument rendered as a word, if any.
    pub fn first_word(&self) -> Option<String> {
        match &self.args {
            AnnotationArgs::Values(values) => values.first().map(|v| match v {
                AnnotationValue::Str(s) => s.clone(),
                other => other.to_string(),
            }),
            _ => None,
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "pub"),
            Visibility::Private => write!(f, "priv"),
        }
    }
}

/// Top-level declarations
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Function(FunctionDecl),
    Struct(StructDecl),
    Enum(EnumDecl),
    Extern(ExternDecl),
    Const(ConstDecl),
    Impl(ImplBlock),
}

impl Declaration {
    /// Declared name (the target type for `impl` blocks).
    pub fn name(&self) -> &Spanned<Ident> {
        match self {
            Declaration::Function(f) => &f.name,
            Declaration::Struct(s) => &s.name,
            Declaration::Enum(e) => &e.name,
            Declaration::Extern(x) => &x.name,
            Declaration::Const(c) => &c.name,
            Declaration::Impl(i) => &i.target,
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        match self {
            Declaration::Function(f) => &f.annotations,
            Declaration::Struct(s) => &s.annotations,
            Declaration::Enum(e) => &e.annotations,
            Declaration::Extern(x) => &x.annotations,
            Declaration::Const(c) => &c.annotations,
            Declaration::Impl(i) => &i.annotations,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub annotations: Vec<Annotation>,
    pub name: Ident,
    pub ty: Spanned<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub annotations: Vec<Annotation>,
    pub visibility: Visibility,
    pub name: Spanned<Ident>,
    pub type_params: Vec<Spanned<Ident>>,
    /// Span of a leading `self` parameter (methods only).
    pub receiver: Option<Span>,
    pub params: Vec<Spanned<Param>>,
    pub return_type: Spanned<Type>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub annotations: Vec<Annotation>,
    pub visibility: Visibility,
    pub name: Spanned<Ident>,
    pub type_params: Vec<Spanned<Ident>>,
    pub fields: Vec<Spanned<FieldDecl>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub annotations: Vec<Annotation>,
    pub visibility: Option<Visibility>,
    pub name: Ident,
    pub ty: Spanned<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub annotations: Vec<Annotation>,
    pub visibility: Visibility,
    pub name: Spanned<Ident>,
    pub type_params: Vec<Spanned<Ident>>,
    pub variants: Vec<Spanned<VariantDecl>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantDecl {
    pub name: Ident,
    /// `Variant(T, U)` payload types; empty for unit variants.
    pub payload: Vec<Spanned<Type>>,
    /// `Variant = value` discriminant.
    pub value: Option<Spanned<Expr>>,
}

/// `extern "lib" fn name(params) -> T;`
#[derive(Debug, Clone, PartialEq)]
pub struct ExternDecl {
    pub annotations: Vec<Annotation>,
    pub visibility: Visibility,
    pub library: Option<String>,
    pub name: Spanned<Ident>,
    pub params: Vec<Spanned<Param>>,
    pub return_annotations: Vec<Annotation>,
    pub return_type: Spanned<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub annotations: Vec<Annotation>,
    pub visibility: Visibility,
    pub name: Spanned<Ident>,
    pub ty: Spanned<Type>,
    pub value: Spanned<Expr>,
}

/// `impl Name { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ImplBlock {
    pub annotations: Vec<Annotation>,
    pub target: Spanned<Ident>,
    pub methods: Vec<Spanned<FunctionDecl>>,
}

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerMutability {
    Mut,
    Const,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Primitive(PrimitiveId),
    /// `[]T`
    Slice(Box<Spanned<Type>>),
    /// `[N]T`, `N` a const expression
    FixedArray(Box<Spanned<Type>>, Box<Spanned<Expr>>),
    /// `*mut T` / `*const T`
    Pointer(PointerMutability, Box<Spanned<Type>>),
    /// `Result<T, E>`
    Result(Box<Spanned<Type>>, Box<Spanned<Type>>),
    /// `Option<T>`
    Option(Box<Spanned<Type>>),
    /// `TaskHandle<T>`
    TaskHandle(Box<Spanned<Type>>),
    /// `(A, B, ...)`, at least two elements
    Tuple(Vec<Spanned<Type>>),
    /// `Name` or `Name<T, ...>`: struct, enum, or type parameter
    Named(Ident, Vec<Spanned<Type>>),
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => write!(f, "{}", types::as_str(*p)),
            Type::Slice(inner) => write!(f, "[]{}", inner.node),
            Type::FixedArray(inner, _) => write!(f, "[_]{}", inner.node),
            Type::Pointer(PointerMutability::Mut, inner) => write!(f, "*mut {}", inner.node),
            Type::Pointer(PointerMutability::Const, inner) => write!(f, "*const {}", inner.node),
            Type::Result(ok, err) => write!(f, "Result<{}, {}>", ok.node, err.node),
            Type::Option(inner) => write!(f, "Option<{}>", inner.node),
            Type::TaskHandle(inner) => write!(f, "TaskHandle<{}>", inner.node),
            Type::Tuple(elems) => {
                write!(f, "(")?;
                for (i, e) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", e.node)?;
                }
                write!(f, ")")
            }
            Type::Named(name, args) => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, a) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", a.node)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `let (mut)? name: T = value;`
    Let(LetStmt),
    /// `target = value;`
    Assign(AssignStmt),
    /// `return value;`
    Return(Spanned<Expr>),
    /// `if cond { } else ...`
    If(IfStmt),
    /// `if let Pattern = value { } else ...`
    IfLet(IfLetStmt),
    /// `for name in iterable { }`
    For(ForStmt),
    /// `match value { arms }`
    Match(MatchStmt),
    /// `spawn call;`
    Spawn(Spanned<Expr>),
    /// `spawn_with_handle handle = call;`
    SpawnWithHandle(SpawnWithHandleStmt),
    /// `unsafe { }`
    Unsafe(Block),
    /// `{ }`
    Block(Block),
    Break,
    Continue,
    /// `expr;`
    Expr(Spanned<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetStmt {
    pub annotations: Vec<Annotation>,
    pub mutable: bool,
    pub name: Spanned<Ident>,
    pub ty: Spanned<Type>,
    pub value: Spanned<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: Spanned<Expr>,
    pub value: Spanned<Expr>,
}

/// The tail of an `if`: either a plain `else { }` or a nested `else if`.
///
/// `else` always attaches to the nearest enclosing `if`.
#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    Block(Block),
    /// An `If` or `IfLet` statement.
    If(Box<Spanned<Statement>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Spanned<Expr>,
    pub then_block: Block,
    pub else_branch: Option<ElseBranch>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfLetStmt {
    pub pattern: Spanned<Pattern>,
    pub value: Spanned<Expr>,
    pub then_block: Block,
    pub else_branch: Option<ElseBranch>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub binding: Spanned<Ident>,
    pub iterable: Spanned<Expr>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchStmt {
    pub scrutinee: Spanned<Expr>,
    pub arms: Vec<Spanned<MatchArm>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    pub pattern: Spanned<Pattern>,
    pub body: MatchBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchBody {
    Block(Block),
    Expr(Spanned<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnWithHandleStmt {
    pub handle: Spanned<Ident>,
    pub call: Spanned<Expr>,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Ident(Ident),
    SelfExpr,
    /// `a op b`
    Binary(Box<Spanned<Expr>>, BinaryOp, Box<Spanned<Expr>>),
    /// At most one logical and one pointer prefix, e.g. `-*p`.
    Unary(UnaryPrefix, Box<Spanned<Expr>>),
    /// `callee(args)`; a method call is a call whose callee is a field access.
    Call(Box<Spanned<Expr>>, Vec<Spanned<Expr>>),
    /// `Name::f(args)` / `Name<T>::f(args)`
    AssociatedCall(AssociatedCall),
    /// `head.Variant` / `head.Variant(args)`
    EnumConstructor(EnumConstructor),
    /// `object.name`
    Field(Box<Spanned<Expr>>, Spanned<Ident>),
    /// `tuple.0`
    TupleIndex(Box<Spanned<Expr>>, usize),
    /// `a[i]`
    Index(Box<Spanned<Expr>>, Box<Spanned<Expr>>),
    /// `a[start:end]`, `a[start:]`, `a[:end]`, `a[:]`
    Slice(Box<Spanned<Expr>>, SliceBounds),
    /// `Name { field: value }` / `Name<T> { ... }`
    StructLiteral(StructLiteral),
    /// `(a, b, ...)`, at least two elements
    Tuple(Vec<Spanned<Expr>>),
    /// `[a, b]` or `[none]`
    Array(Vec<Spanned<Expr>>),
    /// `[value; count]`
    ArrayRepeat(Box<Spanned<Expr>>, Box<Spanned<Expr>>),
    /// `(e)`
    Paren(Box<Spanned<Expr>>),
    /// `sizeof(T)`
    Sizeof(Box<Spanned<Type>>),
    /// `await handle`
    Await(Box<Spanned<Expr>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssociatedCall {
    pub type_name: Spanned<Ident>,
    pub type_args: Vec<Spanned<Type>>,
    pub function: Spanned<Ident>,
    pub args: Vec<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstructor {
    pub head: Spanned<Ident>,
    pub variant: Spanned<Ident>,
    /// `None` without parentheses; `Some(vec![])` for `(none)`.
    pub args: Option<Vec<Spanned<Expr>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructLiteral {
    pub name: Spanned<Ident>,
    pub type_args: Vec<Spanned<Type>>,
    pub fields: Vec<(Spanned<Ident>, Spanned<Expr>)>,
}

/// Bounds of a slice expression; both absent is a full-slice copy.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceBounds {
    pub start: Option<Box<Spanned<Expr>>>,
    pub end: Option<Box<Spanned<Expr>>>,
}

impl SliceBounds {
    pub fn is_full(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(u128),
    Float(f64),
    String(String),
    Char(char),
    Bool(bool),
    /// `()`
    Unit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Shl,
    Shr,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::Or | BinaryOp::And)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq
        )
    }

    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::BitAnd | BinaryOp::Shl | BinaryOp::Shr
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitAnd => "&",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalPrefix {
    /// `!`
    Not,
    /// `-`
    Neg,
    /// `~`
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPrefix {
    /// `*p`
    Deref,
    /// `&x`
    AddressOf,
    /// `&mut x`
    AddressOfMut,
}

/// A unary prefix: logical first, then pointer (`-*p` applies `*` then `-`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnaryPrefix {
    pub logical: Option<LogicalPrefix>,
    pub pointer: Option<PointerPrefix>,
}

// ============================================================================
// Patterns
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// `_`
    Wildcard,
    /// `name` / `mut name`
    Binding { name: Ident, mutable: bool },
    /// `42`, `"text"`, `'c'`, `true`
    Literal(Literal),
    /// `Enum.Variant`, `Enum.Variant(p, ...)`, `Result.Ok(p)`
    EnumVariant {
        enum_name: Ident,
        variant: Ident,
        args: Vec<Spanned<Pattern>>,
    },
    /// `(p, q, ...)`, at least two elements
    Tuple(Vec<Spanned<Pattern>>),
}

impl Pattern {
    /// Whether the pattern matches every value of its type.
    pub fn is_irrefutable(&self) -> bool {
        match self {
            Pattern::Wildcard | Pattern::Binding { .. } => true,
            Pattern::Tuple(elems) => elems.iter().all(|p| p.node.is_irrefutable()),
            Pattern::Literal(_) | Pattern::EnumVariant { .. } => false,
        }
    }
}

// ============================================================================
// Visitor trait for AST traversal
// ============================================================================

/// Visit-by-kind traversal.
///
/// Every method defaults to walking the node's children, so implementors override only the kinds they care about and
/// call the matching `walk_*` function to keep descending.
pub trait Visitor {
    fn visit_program(&mut self, program: &Program) {
        walk_program(self, program);
    }

    fn visit_declaration(&mut self, decl: &Spanned<Declaration>) {
        walk_declaration(self, decl);
    }

    fn visit_function(&mut self, func: &FunctionDecl) {
        walk_function(self, func);
    }

    fn visit_annotation(&mut self, _annotation: &Annotation) {}

    fn visit_statement(&mut self, stmt: &Spanned<Statement>) {
        walk_statement(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) {
        walk_expr(self, expr);
    }

    fn visit_type(&mut self, ty: &Spanned<Type>) {
        walk_type(self, ty);
    }

    fn visit_pattern(&mut self, pat: &Spanned<Pattern>) {
        walk_pattern(self, pat);
    }
}

pub fn walk_program<V: Visitor + ?Sized>(v: &mut V, program: &Program) {
    for decl in &program.declarations {
        v.visit_declaration(decl);
    }
}

pub fn walk_declaration<V: Visitor + ?Sized>(v: &mut V, decl: &Spanned<Declaration>) {
    for a in decl.node.annotations() {
        v.visit_annotation(a);
    }
    match &decl.node {
        Declaration::Function(f) => v.visit_function(f),
        Declaration::Struct(s) => {
            for field in &s.fields {
                for a in &field.node.annotations {
                    v.visit_annotation(a);
                }
                v.visit_type(&field.node.ty);
            }
        }
        Declaration::Enum(e) => {
            for variant in &e.variants {
                for ty in &variant.node.payload {
                    v.visit_type(ty);
                }
                if let Some(value) = &variant.node.value {
                    v.visit_expr(value);
                }
            }
        }
        Declaration::Extern(x) => {
            walk_params(v, &x.params);
            for a in &x.return_annotations {
                v.visit_annotation(a);
            }
            v.visit_type(&x.return_type);
        }
        Declaration::Const(c) => {
            v.visit_type(&c.ty);
            v.visit_expr(&c.value);
        }
        Declaration::Impl(i) => {
            for m in &i.methods {
                for a in &m.node.annotations {
                    v.visit_annotation(a);
                }
                v.visit_function(&m.node);
            }
        }
    }
}

pub fn walk_function<V: Visitor + ?Sized>(v: &mut V, func: &FunctionDecl) {
    walk_params(v, &func.params);
    v.visit_type(&func.return_type);
    walk_block(v, &func.body);
}

fn walk_params<V: Visitor + ?Sized>(v: &mut V, params: &[Spanned<Param>]) {
    for p in params {
        for a in &p.node.annotations {
            v.visit_annotation(a);
        }
        v.visit_type(&p.node.ty);
    }
}

pub fn walk_block<V: Visitor + ?Sized>(v: &mut V, block: &Block) {
    for stmt in block {
        v.visit_statement(stmt);
    }
}

fn walk_else<V: Visitor + ?Sized>(v: &mut V, branch: &Option<ElseBranch>) {
    match branch {
        Some(ElseBranch::Block(b)) => walk_block(v, b),
        Some(ElseBranch::If(stmt)) => v.visit_statement(stmt),
        None => {}
    }
}

pub fn walk_statement<V: Visitor + ?Sized>(v: &mut V, stmt: &Spanned<Statement>) {
    match &stmt.node {
        Statement::Let(l) => {
            for a in &l.annotations {
                v.visit_annotation(a);
            }
            v.visit_type(&l.ty);
            v.visit_expr(&l.value);
        }
        Statement::Assign(a) => {
            v.visit_expr(&a.target);
            v.visit_expr(&a.value);
        }
        Statement::Return(e) | Statement::Spawn(e) | Statement::Expr(e) => v.visit_expr(e),
        Statement::If(i) => {
            v.visit_expr(&i.condition);
            walk_block(v, &i.then_block);
            walk_else(v, &i.else_branch);
        }
        Statement::IfLet(i) => {
            v.visit_pattern(&i.pattern);
            v.visit_expr(&i.value);
            walk_block(v, &i.then_block);
            walk_else(v, &i.else_branch);
        }
        Statement::For(f) => {
            v.visit_expr(&f.iterable);
            walk_block(v, &f.body);
        }
        Statement::Match(m) => {
            v.visit_expr(&m.scrutinee);
            for arm in &m.arms {
                v.visit_pattern(&arm.node.pattern);
                match &arm.node.body {
                    MatchBody::Block(b) => walk_block(v, b),
                    MatchBody::Expr(e) => v.visit_expr(e),
                }
            }
        }
        Statement::SpawnWithHandle(s) => v.visit_expr(&s.call),
        Statement::Unsafe(b) | Statement::Block(b) => walk_block(v, b),
        Statement::Break | Statement::Continue => {}
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, expr: &Spanned<Expr>) {
    match &expr.node {
        Expr::Literal(_) | Expr::Ident(_) | Expr::SelfExpr => {}
        Expr::Binary(l, _, r) | Expr::Index(l, r) | Expr::ArrayRepeat(l, r) => {
            v.visit_expr(l);
            v.visit_expr(r);
        }
        Expr::Unary(_, e)
        | Expr::Field(e, _)
        | Expr::TupleIndex(e, _)
        | Expr::Paren(e)
        | Expr::Await(e) => v.visit_expr(e),
        Expr::Call(callee, args) => {
            v.visit_expr(callee);
            for a in args {
                v.visit_expr(a);
            }
        }
        Expr::AssociatedCall(call) => {
            for t in &call.type_args {
                v.visit_type(t);
            }
            for a in &call.args {
                v.visit_expr(a);
            }
        }
        Expr::EnumConstructor(c) => {
            for a in c.args.iter().flatten() {
                v.visit_expr(a);
            }
        }
        Expr::Slice(base, bounds) => {
            v.visit_expr(base);
            if let Some(s) = &bounds.start {
                v.visit_expr(s);
            }
            if let Some(e) = &bounds.end {
                v.visit_expr(e);
            }
        }
        Expr::StructLiteral(lit) => {
            for t in &lit.type_args {
                v.visit_type(t);
            }
            for (_, value) in &lit.fields {
                v.visit_expr(value);
            }
        }
        Expr::Tuple(elems) | Expr::Array(elems) => {
            for e in elems {
                v.visit_expr(e);
            }
        }
        Expr::Sizeof(ty) => v.visit_type(ty),
    }
}

pub fn walk_type<V: Visitor + ?Sized>(v: &mut V, ty: &Spanned<Type>) {
    match &ty.node {
        Type::Primitive(_) => {}
        Type::Slice(inner) | Type::Pointer(_, inner) | Type::Option(inner) | Type::TaskHandle(inner) => {
            v.visit_type(inner)
        }
        Type::FixedArray(inner, size) => {
            v.visit_type(inner);
            v.visit_expr(size);
        }
        Type::Result(ok, err) => {
            v.visit_type(ok);
            v.visit_type(err);
        }
        Type::Tuple(elems) | Type::Named(_, elems) => {
            for e in elems {
                v.visit_type(e);
            }
        }
    }
}

pub fn walk_pattern<V: Visitor + ?Sized>(v: &mut V, pat: &Spanned<Pattern>) {
    match &pat.node {
        Pattern::EnumVariant { args, .. } | Pattern::Tuple(args) => {
            for p in args {
                v.visit_pattern(p);
            }
        }
        Pattern::Wildcard | Pattern::Binding { .. } | Pattern::Literal(_) => {}
    }
}
