//! Unary and binary operators.

use asthra_core::lang::types::{self, NumericClass, PrimitiveId};

use crate::frontend::ast::*;
use crate::frontend::diagnostics::{CompileError, errors};
use crate::frontend::symbols::*;

use super::super::Analyzer;
use super::super::check_stmt::PlaceUse;

impl Analyzer<'_> {
    pub(super) fn check_unary(
        &mut self,
        prefix: UnaryPrefix,
        operand: &Spanned<Expr>,
        expected: Option<&ResolvedType>,
        span: Span,
    ) -> ResolvedType {
        // `-128` must be range-checked as a negative literal, not as `128` negated.
        if prefix.logical == Some(LogicalPrefix::Neg) && prefix.pointer.is_none() {
            if let Expr::Literal(Literal::Int(n)) = operand.node {
                let ty = self.check_int_literal(n, true, expected, span);
                self.record_type(operand.span, &ty);
                return ty;
            }
        }

        // The pointer prefix binds tighter than the logical one.
        let inner = match prefix.pointer {
            None => self.check_expr(operand, expected),
            Some(PointerPrefix::Deref) => {
                let pointer = self.check_expr(operand, None);
                if !self.symbols.inside(ScopeKind::Unsafe) {
                    self.report(errors::requires_unsafe("Pointer dereference", span));
                }
                match pointer {
                    ResolvedType::Pointer(_, pointee) => *pointee,
                    ResolvedType::Unknown => ResolvedType::Unknown,
                    other => {
                        self.report(CompileError::type_error(
                            format!("Cannot dereference non-pointer type '{}'", other),
                            operand.span,
                        ));
                        ResolvedType::Unknown
                    }
                }
            }
            Some(PointerPrefix::AddressOf) => {
                let hint = match expected {
                    Some(ResolvedType::Pointer(_, pointee)) => Some((**pointee).clone()),
                    _ => None,
                };
                let ty = self.check_expr(operand, hint.as_ref());
                ResolvedType::Pointer(PointerMutability::Const, Box::new(ty))
            }
            Some(PointerPrefix::AddressOfMut) => {
                let ty = self.check_expr(operand, None);
                self.check_place(operand, operand.span, PlaceUse::BorrowMut);
                ResolvedType::Pointer(PointerMutability::Mut, Box::new(ty))
            }
        };

        let Some(logical) = prefix.logical else {
            return inner;
        };
        if inner.is_unknown() {
            return inner;
        }
        match logical {
            LogicalPrefix::Not => {
                if !inner.is_bool() {
                    self.report(errors::type_mismatch("bool", &inner.to_string(), operand.span));
                }
                ResolvedType::BOOL
            }
            LogicalPrefix::Neg => {
                let signed = inner
                    .primitive()
                    .and_then(types::numeric_class)
                    .is_some_and(|class| class != NumericClass::UnsignedInt);
                if !signed {
                    let mut error = CompileError::type_error(format!("Cannot negate a value of type '{}'", inner), span);
                    if inner.is_integer() {
                        error = error.with_note("Unsigned integers have no negative values");
                    }
                    self.report(error);
                    return ResolvedType::Unknown;
                }
                inner
            }
            LogicalPrefix::BitNot => {
                if !inner.is_integer() {
                    self.report(errors::type_mismatch("an integer", &inner.to_string(), operand.span));
                    return ResolvedType::Unknown;
                }
                inner
            }
        }
    }

    pub(super) fn check_binary(
        &mut self,
        lhs: &Spanned<Expr>,
        op: BinaryOp,
        rhs: &Spanned<Expr>,
        expected: Option<&ResolvedType>,
        span: Span,
    ) -> ResolvedType {
        if op.is_logical() {
            for side in [lhs, rhs] {
                let ty = self.check_expr(side, Some(&ResolvedType::BOOL));
                if !ty.is_bool() && !ty.is_unknown() {
                    self.report(errors::type_mismatch("bool", &ty.to_string(), side.span));
                }
            }
            return ResolvedType::BOOL;
        }

        let hint = expected.filter(|t| t.is_numeric()).filter(|_| !op.is_comparison());
        let left = self.check_expr(lhs, hint);
        let right_hint = if left.is_numeric() && left.primitive() != Some(PrimitiveId::Int) {
            Some(&left)
        } else {
            hint
        };
        let right = self.check_expr(rhs, right_hint);
        if left.is_unknown() || right.is_unknown() {
            return if op.is_comparison() { ResolvedType::BOOL } else { ResolvedType::Unknown };
        }

        if op.is_comparison() {
            if !is_assignable(&right, &left) && !is_assignable(&left, &right) {
                self.report(CompileError::type_error(
                    format!("Cannot compare '{}' with '{}'", left, right),
                    span,
                ));
            } else if !matches!(op, BinaryOp::Eq | BinaryOp::NotEq) && !is_ordered(&left) {
                self.report(CompileError::type_error(
                    format!("Operator '{}' needs ordered operands, found '{}'", op, left),
                    span,
                ));
            }
            return ResolvedType::BOOL;
        }

        let result = match op {
            BinaryOp::Shl | BinaryOp::Shr => (left.is_integer() && right.is_integer()).then(|| left.clone()),
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
                if left.is_bool() && right.is_bool() {
                    Some(ResolvedType::BOOL)
                } else {
                    join_numeric(&left, &right).filter(ResolvedType::is_integer)
                }
            }
            BinaryOp::Add if left == ResolvedType::Primitive(PrimitiveId::String) && left == right => Some(left.clone()),
            _ => join_numeric(&left, &right),
        };
        match result {
            Some(ty) => ty,
            None => {
                self.report(CompileError::type_error(
                    format!("Operator '{}' cannot be applied to '{}' and '{}'", op, left, right),
                    span,
                ));
                ResolvedType::Unknown
            }
        }
    }
}

/// The common numeric type of two operands; `int` and `float` adopt the other side's width.
fn join_numeric(a: &ResolvedType, b: &ResolvedType) -> Option<ResolvedType> {
    let (pa, pb) = (a.primitive()?, b.primitive()?);
    if pa == pb {
        return a.is_numeric().then(|| a.clone());
    }
    let joined = match (pa, pb) {
        (PrimitiveId::Int, p) | (p, PrimitiveId::Int) if types::is_integer(p) => p,
        (PrimitiveId::Float, p) | (p, PrimitiveId::Float) if types::is_float(p) => p,
        _ => return None,
    };
    Some(ResolvedType::Primitive(joined))
}

fn is_ordered(ty: &ResolvedType) -> bool {
    ty.is_numeric() || matches!(ty.primitive(), Some(PrimitiveId::Char | PrimitiveId::String))
}
