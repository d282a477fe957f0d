//! Expression checking.
//!
//! [`Analyzer::check_expr`] infers the type of an expression, reports what is wrong with it, and records the result in
//! [`TypeInfo::expr_types`](super::TypeInfo). An optional expected type flows inward so that literals adopt the type
//! their context asks for (`let b: u8 = 200;`) and generic calls can be inferred from their use site.

mod access;
mod calls;
mod ops;

use asthra_core::lang::types::PrimitiveId;

use crate::frontend::ast::*;
use crate::frontend::diagnostics::{CompileError, ErrorKind, errors};
use crate::frontend::symbols::*;

use super::Analyzer;
use super::const_eval::int_fits;

impl Analyzer<'_> {
    /// Check `expr` and record its type.
    pub(crate) fn check_expr(&mut self, expr: &Spanned<Expr>, expected: Option<&ResolvedType>) -> ResolvedType {
        let ty = self.infer_expr(expr, expected);
        self.record_type(expr.span, &ty);
        ty
    }

    fn infer_expr(&mut self, expr: &Spanned<Expr>, expected: Option<&ResolvedType>) -> ResolvedType {
        match &expr.node {
            Expr::Literal(Literal::Int(n)) => self.check_int_literal(*n, false, expected, expr.span),
            Expr::Literal(lit) => literal_type(lit, expected),
            Expr::Ident(name) => self.check_ident(name, expr.span),
            Expr::SelfExpr => self.check_self(expr.span),
            Expr::Binary(lhs, op, rhs) => self.check_binary(lhs, *op, rhs, expected, expr.span),
            Expr::Unary(prefix, operand) => self.check_unary(*prefix, operand, expected, expr.span),
            Expr::Call(callee, args) => self.check_call(callee, args, expected, expr.span),
            Expr::AssociatedCall(call) => self.check_associated_call(call, expected, expr.span),
            Expr::EnumConstructor(ctor) => self.check_dotted(ctor, expected, expr.span),
            Expr::Field(base, field) => {
                let base_ty = self.check_expr(base, None);
                self.field_type(&base_ty, field)
            }
            Expr::TupleIndex(base, index) => self.check_tuple_index(base, *index, expr.span),
            Expr::Index(base, index) => self.check_index(base, index),
            Expr::Slice(base, bounds) => self.check_slice(base, bounds),
            Expr::StructLiteral(lit) => self.check_struct_literal(lit, expected, expr.span),
            Expr::Tuple(elems) => self.check_tuple(elems, expected, expr.span),
            Expr::Array(elems) => self.check_array(elems, expected),
            Expr::ArrayRepeat(value, count) => {
                let elem_hint = expected.and_then(ResolvedType::element_type).cloned();
                let elem = self.check_expr(value, elem_hint.as_ref());
                let len = self.eval_array_size(count);
                self.record_type(count.span, &ResolvedType::USIZE);
                ResolvedType::FixedArray(Box::new(elem), len)
            }
            Expr::Paren(inner) => self.check_expr(inner, expected),
            Expr::Sizeof(ty) => {
                self.resolve_type(ty);
                ResolvedType::USIZE
            }
            Expr::Await(handle) => match self.check_expr(handle, None) {
                ResolvedType::TaskHandle(result) => *result,
                ResolvedType::Unknown => ResolvedType::Unknown,
                other => {
                    self.report(errors::await_non_handle(&other.to_string(), handle.span));
                    ResolvedType::Unknown
                }
            },
        }
    }

    /// An integer literal, possibly under a unary minus. It takes the expected integer type when there is one.
    pub(crate) fn check_int_literal(
        &mut self,
        n: u128,
        negative: bool,
        expected: Option<&ResolvedType>,
        span: Span,
    ) -> ResolvedType {
        let target = match expected.and_then(ResolvedType::primitive) {
            Some(p) if asthra_core::lang::types::is_integer(p) => p,
            _ => return ResolvedType::Primitive(PrimitiveId::Int),
        };
        if target == PrimitiveId::Int {
            return ResolvedType::Primitive(target);
        }
        let fits = match i128::try_from(n) {
            Ok(v) => int_fits(target, if negative { -v } else { v }),
            Err(_) => target == PrimitiveId::U128 && !negative,
        };
        if !fits {
            let sign = if negative { "-" } else { "" };
            self.report(
                CompileError::new(
                    ErrorKind::TypeMismatch,
                    format!("Integer literal {}{} does not fit in '{}'", sign, n, ResolvedType::Primitive(target)),
                    span,
                )
                .with_hint("Use a wider integer type"),
            );
        }
        ResolvedType::Primitive(target)
    }

    fn check_ident(&mut self, name: &str, span: Span) -> ResolvedType {
        match self.symbol_kind(name) {
            Some((_, SymbolKind::Variable(var))) => var.ty,
            Some((_, SymbolKind::Const(konst))) => konst.ty,
            Some((_, kind)) => {
                let mut error = CompileError::type_error(
                    format!("'{}' is a {} and cannot be used as a value", name, kind.describe()),
                    span,
                );
                if matches!(kind, SymbolKind::Function(_)) {
                    error = error.with_hint(format!("Call it: {}(...)", name));
                }
                self.report(error);
                ResolvedType::Unknown
            }
            None => {
                self.report(errors::unknown_symbol(name, span));
                ResolvedType::Unknown
            }
        }
    }

    fn check_self(&mut self, span: Span) -> ResolvedType {
        match self.symbol_kind("self") {
            Some((_, SymbolKind::Variable(var))) => var.ty,
            _ => {
                self.report(CompileError::type_error("'self' is only available inside methods", span));
                ResolvedType::Unknown
            }
        }
    }

    fn check_tuple(&mut self, elems: &[Spanned<Expr>], expected: Option<&ResolvedType>, span: Span) -> ResolvedType {
        let hints: Vec<ResolvedType> = match expected {
            Some(ResolvedType::Tuple(ts)) if ts.len() == elems.len() => ts.clone(),
            Some(ResolvedType::Tuple(ts)) => {
                self.report(errors::tuple_arity(ts.len(), elems.len(), span));
                for elem in elems {
                    self.check_expr(elem, None);
                }
                return ResolvedType::Unknown;
            }
            _ => vec![ResolvedType::Unknown; elems.len()],
        };
        let types = elems
            .iter()
            .zip(&hints)
            .map(|(elem, hint)| self.check_expr(elem, Some(hint).filter(|h| !h.is_unknown())))
            .collect();
        ResolvedType::Tuple(types)
    }

    fn check_array(&mut self, elems: &[Spanned<Expr>], expected: Option<&ResolvedType>) -> ResolvedType {
        let mut elem_ty = expected.and_then(ResolvedType::element_type).cloned();
        for elem in elems {
            let ty = self.check_expr(elem, elem_ty.as_ref());
            match &elem_ty {
                Some(want) => self.expect_type(want, &ty, elem.span),
                None => elem_ty = Some(ty),
            }
        }
        ResolvedType::FixedArray(
            Box::new(elem_ty.unwrap_or(ResolvedType::Unknown)),
            Some(elems.len() as u64),
        )
    }

    fn check_tuple_index(&mut self, base: &Spanned<Expr>, index: usize, span: Span) -> ResolvedType {
        match self.check_expr(base, None) {
            ResolvedType::Tuple(elems) => match elems.get(index) {
                Some(ty) => ty.clone(),
                None => {
                    self.report(CompileError::new(
                        ErrorKind::Arity,
                        format!("Tuple of {} elements has no element .{}", elems.len(), index),
                        span,
                    ));
                    ResolvedType::Unknown
                }
            },
            ResolvedType::Unknown => ResolvedType::Unknown,
            other => {
                self.report(CompileError::type_error(format!("'{}' is not a tuple", other), span));
                ResolvedType::Unknown
            }
        }
    }

    fn check_index(&mut self, base: &Spanned<Expr>, index: &Spanned<Expr>) -> ResolvedType {
        let base_ty = self.check_expr(base, None);
        self.check_index_operand(index);

        match base_ty {
            ResolvedType::FixedArray(elem, Some(len)) => {
                if let Expr::Literal(Literal::Int(i)) = index.node {
                    if i >= u128::from(len) {
                        self.report(CompileError::type_error(
                            format!("Index {} is out of bounds for an array of length {}", i, len),
                            index.span,
                        ));
                    }
                }
                *elem
            }
            ResolvedType::Slice(elem) | ResolvedType::FixedArray(elem, None) => *elem,
            ResolvedType::Unknown => ResolvedType::Unknown,
            other => {
                self.report(CompileError::type_error(format!("Cannot index into '{}'", other), base.span));
                ResolvedType::Unknown
            }
        }
    }

    fn check_slice(&mut self, base: &Spanned<Expr>, bounds: &SliceBounds) -> ResolvedType {
        let base_ty = self.check_expr(base, None);
        for bound in [&bounds.start, &bounds.end].into_iter().flatten() {
            self.check_index_operand(bound);
        }
        match base_ty {
            ResolvedType::Slice(elem) | ResolvedType::FixedArray(elem, _) => ResolvedType::Slice(elem),
            ResolvedType::Primitive(PrimitiveId::String) => ResolvedType::Primitive(PrimitiveId::String),
            ResolvedType::Unknown => ResolvedType::Unknown,
            other => {
                self.report(CompileError::type_error(format!("Cannot slice '{}'", other), base.span));
                ResolvedType::Unknown
            }
        }
    }

    fn check_index_operand(&mut self, index: &Spanned<Expr>) {
        let ty = self.check_expr(index, Some(&ResolvedType::USIZE));
        if !ty.is_integer() && !ty.is_unknown() {
            self.report(errors::type_mismatch("an integer", &ty.to_string(), index.span));
        }
    }
}

/// Type of a non-integer literal.
fn literal_type(lit: &Literal, expected: Option<&ResolvedType>) -> ResolvedType {
    match lit {
        Literal::Float(_) => match expected.and_then(ResolvedType::primitive) {
            Some(p @ (PrimitiveId::F32 | PrimitiveId::F64)) => ResolvedType::Primitive(p),
            _ => ResolvedType::Primitive(PrimitiveId::Float),
        },
        Literal::String(_) => ResolvedType::Primitive(PrimitiveId::String),
        Literal::Char(_) => ResolvedType::Primitive(PrimitiveId::Char),
        Literal::Bool(_) => ResolvedType::BOOL,
        Literal::Unit => ResolvedType::VOID,
        Literal::Int(_) => ResolvedType::Primitive(PrimitiveId::Int),
    }
}
