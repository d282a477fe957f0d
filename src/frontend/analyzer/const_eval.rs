//! Constant-expression folding.
//!
//! Folds `const` initialisers, fixed-array sizes, `[v; N]` counts, and enum discriminants to concrete values.
//! A const may refer to other consts (including public consts of imported modules); references are followed on demand
//! with a state machine that detects cycles, and the number of nested references is bounded by
//! [`AnalyzerConfig::const_eval_depth`](crate::config::AnalyzerConfig::const_eval_depth).

use asthra_core::lang::types::{self, NumericClass, PrimitiveId};

use crate::frontend::ast::*;
use crate::frontend::diagnostics::errors;
use crate::frontend::symbols::*;

use super::Analyzer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstEvalState {
    InProgress,
    Done,
}

impl Analyzer<'_> {
    /// Fold a module-level const and check its value against the declared type.
    pub(crate) fn check_const(&mut self, konst: &ConstDecl) {
        let Some(id) = self.symbols.lookup_global(&konst.name.node) else {
            return;
        };
        // A duplicate declaration never made it into the table; its initialiser is not folded.
        if self.symbols.get(id).map(|s| s.span) != Some(konst.name.span) {
            return;
        }

        let declared = match self.symbols.get(id).map(|s| &s.kind) {
            Some(SymbolKind::Const(info)) => info.ty.clone(),
            _ => return,
        };
        self.record_type(konst.value.span, &declared);

        let value = self.eval_const_by_name(&konst.name.node, konst.name.span, &mut Vec::new());
        let Some(value) = value else {
            return;
        };

        if let Err(reason) = value_fits(&value, &declared) {
            self.report(reason.into_error(&declared, &value, konst.value.span));
            return;
        }

        if let Some(Symbol {
            kind: SymbolKind::Const(info),
            ..
        }) = self.symbols.get_mut(id)
        {
            info.value = Some(value.clone());
        }
        self.info.const_values.insert(konst.name.node.clone(), value);
    }

    /// Fold the const named `name`, following references with cycle detection.
    pub(crate) fn eval_const_by_name(&mut self, name: &str, use_span: Span, stack: &mut Vec<String>) -> Option<ConstValue> {
        match self.const_state.get(name) {
            Some(ConstEvalState::Done) => return self.info.const_values.get(name).cloned(),
            Some(ConstEvalState::InProgress) => {
                let start = stack.iter().position(|n| n == name).unwrap_or(0);
                let mut path: Vec<String> = stack[start..].to_vec();
                path.push(name.to_string());
                let span = self.const_decls.get(name).map(|d| d.name.span).unwrap_or(use_span);
                self.report(errors::const_cycle(&path, span));
                return None;
            }
            None => {}
        }

        if stack.len() >= self.config.const_eval_depth {
            self.report(errors::const_depth_exceeded(self.config.const_eval_depth, use_span));
            return None;
        }

        let konst = self.const_decls.get(name)?.clone();
        self.const_state.insert(name.to_string(), ConstEvalState::InProgress);
        stack.push(name.to_string());
        let value = self.eval_const_expr(&konst.value, stack);
        stack.pop();
        self.const_state.insert(name.to_string(), ConstEvalState::Done);

        if let Some(value) = &value {
            self.info.const_values.insert(name.to_string(), value.clone());
        }
        value
    }

    /// Fold an expression in a const context.
    pub(crate) fn eval_const_expr(&mut self, expr: &Spanned<Expr>, stack: &mut Vec<String>) -> Option<ConstValue> {
        match &expr.node {
            Expr::Literal(lit) => match lit {
                Literal::Int(n) => match i128::try_from(*n) {
                    Ok(n) => Some(ConstValue::Int(n)),
                    Err(_) => self.const_failure("integer literal is too large", expr.span),
                },
                Literal::Float(x) => Some(ConstValue::Float(*x)),
                Literal::Bool(b) => Some(ConstValue::Bool(*b)),
                Literal::String(s) => Some(ConstValue::Str(s.clone())),
                Literal::Char(c) => Some(ConstValue::Char(*c)),
                Literal::Unit => self.const_failure("'()' has no constant value", expr.span),
            },
            Expr::Ident(name) => match self.symbol_kind(name).map(|(_, kind)| kind) {
                Some(SymbolKind::Const(_)) if self.const_decls.contains_key(name) => {
                    self.eval_const_by_name(name, expr.span, stack)
                }
                Some(SymbolKind::Const(info)) => info.value,
                Some(_) => {
                    self.report(errors::non_const_reference(name, expr.span));
                    None
                }
                None => {
                    self.report(errors::unknown_symbol(name, expr.span));
                    None
                }
            },
            Expr::EnumConstructor(ctor) if ctor.args.is_none() => self.eval_imported_const(ctor, expr.span),
            Expr::Paren(inner) => self.eval_const_expr(inner, stack),
            Expr::Unary(prefix, operand) => {
                if prefix.pointer.is_some() {
                    return self.const_failure("pointer operations are not constant", expr.span);
                }
                let value = self.eval_const_expr(operand, stack)?;
                let folded = match (prefix.logical, value) {
                    (None, v) => Ok(v),
                    (Some(LogicalPrefix::Neg), ConstValue::Int(n)) => n.checked_neg().map(ConstValue::Int).ok_or("integer overflow"),
                    (Some(LogicalPrefix::Neg), ConstValue::Float(x)) => Ok(ConstValue::Float(-x)),
                    (Some(LogicalPrefix::Not), ConstValue::Bool(b)) => Ok(ConstValue::Bool(!b)),
                    (Some(LogicalPrefix::BitNot), ConstValue::Int(n)) => Ok(ConstValue::Int(!n)),
                    _ => Err("operator does not apply to this constant"),
                };
                match folded {
                    Ok(v) => Some(v),
                    Err(reason) => self.const_failure(reason, expr.span),
                }
            }
            Expr::Binary(lhs, op, rhs) => {
                let l = self.eval_const_expr(lhs, stack)?;
                let r = self.eval_const_expr(rhs, stack)?;
                match fold_binary(*op, l, r) {
                    Ok(v) => Some(v),
                    Err(reason) => self.const_failure(&reason, expr.span),
                }
            }
            Expr::Sizeof(ty) => {
                let resolved = self.resolve_type(ty);
                let lookup = |nominal: &NominalRef| -> Option<Vec<ResolvedType>> {
                    match self.nominal_kind(nominal)? {
                        SymbolKind::Struct(info) => Some(info.fields.into_iter().map(|f| f.ty).collect()),
                        SymbolKind::Enum(info) => Some(
                            info.variants
                                .into_iter()
                                .map(|v| ResolvedType::Tuple(v.payload))
                                .collect(),
                        ),
                        _ => None,
                    }
                };
                match layout(&resolved, &lookup) {
                    Some((size, _)) => Some(ConstValue::Int(i128::from(size))),
                    None => self.const_failure(&format!("'{}' has no known size", resolved), expr.span),
                }
            }
            other => {
                let what = match other {
                    Expr::Call(..) | Expr::AssociatedCall(_) => "a function call",
                    Expr::EnumConstructor(_) => "an enum constructor",
                    Expr::StructLiteral(_) => "a struct literal",
                    Expr::Await(_) => "'await'",
                    _ => "this expression",
                };
                self.const_failure(&format!("{} is not allowed in a const expression", what), expr.span)
            }
        }
    }

    /// `module.NAME` where `module` is an import binding.
    fn eval_imported_const(&mut self, ctor: &EnumConstructor, span: Span) -> Option<ConstValue> {
        let head = &ctor.head.node;
        let member = &ctor.variant.node;
        let binding = match self.symbol_kind(head).map(|(_, kind)| kind) {
            Some(SymbolKind::Module(binding)) => binding,
            Some(_) => return self.const_failure(&format!("'{}.{}' is not a constant", head, member), span),
            None => {
                self.report(errors::unknown_symbol(head, ctor.head.span));
                return None;
            }
        };
        let module = binding.module?;
        let item = self.deps.get(&module)?.get(member)?.clone();
        if item.visibility == Visibility::Private {
            self.report(errors::private_access(member, &module, ctor.variant.span));
            return None;
        }
        match item.kind {
            SymbolKind::Const(info) => info.value,
            _ => {
                self.report(errors::non_const_reference(&format!("{}.{}", head, member), span));
                None
            }
        }
    }

    /// Fold a fixed-array size or repeat count.
    pub(crate) fn eval_array_size(&mut self, expr: &Spanned<Expr>) -> Option<u64> {
        match self.eval_const_expr(expr, &mut Vec::new())? {
            ConstValue::Int(n) => match u64::try_from(n) {
                Ok(size) => {
                    self.info.array_sizes.insert((expr.span.start, expr.span.end), size);
                    Some(size)
                }
                Err(_) => self.const_failure(&format!("array size {} is negative", n), expr.span),
            },
            other => self.const_failure(
                &format!("array size must be an integer, found {}", other.type_name()),
                expr.span,
            ),
        }
    }

    fn const_failure<T>(&mut self, reason: &str, span: Span) -> Option<T> {
        self.report(errors::const_eval_failed(reason, span));
        None
    }
}

fn fold_binary(op: BinaryOp, l: ConstValue, r: ConstValue) -> Result<ConstValue, String> {
    use ConstValue as V;

    let overflow = || "integer overflow".to_string();
    match (l, r) {
        (V::Int(a), V::Int(b)) => {
            let v = match op {
                BinaryOp::Add => V::Int(a.checked_add(b).ok_or_else(overflow)?),
                BinaryOp::Sub => V::Int(a.checked_sub(b).ok_or_else(overflow)?),
                BinaryOp::Mul => V::Int(a.checked_mul(b).ok_or_else(overflow)?),
                BinaryOp::Div | BinaryOp::Mod if b == 0 => return Err("division by zero".to_string()),
                BinaryOp::Div => V::Int(a.checked_div(b).ok_or_else(overflow)?),
                BinaryOp::Mod => V::Int(a.checked_rem(b).ok_or_else(overflow)?),
                BinaryOp::BitAnd => V::Int(a & b),
                BinaryOp::BitOr => V::Int(a | b),
                BinaryOp::BitXor => V::Int(a ^ b),
                BinaryOp::Shl | BinaryOp::Shr => {
                    let shift = u32::try_from(b).ok().filter(|s| *s < 128).ok_or("shift amount out of range")?;
                    if op == BinaryOp::Shl {
                        V::Int(a.checked_shl(shift).ok_or_else(overflow)?)
                    } else {
                        V::Int(a >> shift)
                    }
                }
                BinaryOp::Eq => V::Bool(a == b),
                BinaryOp::NotEq => V::Bool(a != b),
                BinaryOp::Lt => V::Bool(a < b),
                BinaryOp::LtEq => V::Bool(a <= b),
                BinaryOp::Gt => V::Bool(a > b),
                BinaryOp::GtEq => V::Bool(a >= b),
                BinaryOp::And | BinaryOp::Or => return Err(format!("'{}' requires bool operands", op)),
            };
            Ok(v)
        }
        (V::Float(a), V::Float(b)) => Ok(match op {
            BinaryOp::Add => V::Float(a + b),
            BinaryOp::Sub => V::Float(a - b),
            BinaryOp::Mul => V::Float(a * b),
            BinaryOp::Div => V::Float(a / b),
            BinaryOp::Mod => V::Float(a % b),
            BinaryOp::Eq => V::Bool(a == b),
            BinaryOp::NotEq => V::Bool(a != b),
            BinaryOp::Lt => V::Bool(a < b),
            BinaryOp::LtEq => V::Bool(a <= b),
            BinaryOp::Gt => V::Bool(a > b),
            BinaryOp::GtEq => V::Bool(a >= b),
            _ => return Err(format!("'{}' does not apply to floats", op)),
        }),
        (V::Bool(a), V::Bool(b)) => Ok(match op {
            BinaryOp::And => V::Bool(a && b),
            BinaryOp::Or => V::Bool(a || b),
            BinaryOp::Eq => V::Bool(a == b),
            BinaryOp::NotEq => V::Bool(a != b),
            BinaryOp::BitAnd => V::Bool(a & b),
            BinaryOp::BitOr => V::Bool(a | b),
            BinaryOp::BitXor => V::Bool(a ^ b),
            _ => return Err(format!("'{}' does not apply to bools", op)),
        }),
        (V::Str(a), V::Str(b)) => Ok(match op {
            BinaryOp::Add => V::Str(a + &b),
            BinaryOp::Eq => V::Bool(a == b),
            BinaryOp::NotEq => V::Bool(a != b),
            _ => return Err(format!("'{}' does not apply to strings", op)),
        }),
        (V::Char(a), V::Char(b)) => Ok(match op {
            BinaryOp::Eq => V::Bool(a == b),
            BinaryOp::NotEq => V::Bool(a != b),
            BinaryOp::Lt => V::Bool(a < b),
            BinaryOp::LtEq => V::Bool(a <= b),
            BinaryOp::Gt => V::Bool(a > b),
            BinaryOp::GtEq => V::Bool(a >= b),
            _ => return Err(format!("'{}' does not apply to chars", op)),
        }),
        (l, r) => Err(format!("mismatched operands {} and {}", l.type_name(), r.type_name())),
    }
}

/// Why a folded value does not fit its declared type.
pub(crate) enum Misfit {
    WrongKind,
    OutOfRange,
}

impl Misfit {
    fn into_error(self, declared: &ResolvedType, value: &ConstValue, span: Span) -> crate::frontend::diagnostics::CompileError {
        match self {
            Misfit::WrongKind => errors::type_mismatch(&declared.to_string(), value.type_name(), span),
            Misfit::OutOfRange => errors::type_mismatch(&declared.to_string(), value.type_name(), span)
                .with_note(format!("{} does not fit in '{}'", value, declared)),
        }
    }
}

pub(crate) fn value_fits(value: &ConstValue, declared: &ResolvedType) -> Result<(), Misfit> {
    let Some(prim) = declared.primitive() else {
        return if declared.is_unknown() { Ok(()) } else { Err(Misfit::WrongKind) };
    };
    match value {
        ConstValue::Int(n) if types::is_integer(prim) => {
            if int_fits(prim, *n) {
                Ok(())
            } else {
                Err(Misfit::OutOfRange)
            }
        }
        ConstValue::Float(_) if types::is_float(prim) => Ok(()),
        ConstValue::Bool(_) if prim == PrimitiveId::Bool => Ok(()),
        ConstValue::Str(_) if prim == PrimitiveId::String => Ok(()),
        ConstValue::Char(_) if prim == PrimitiveId::Char => Ok(()),
        _ => Err(Misfit::WrongKind),
    }
}

/// Whether `n` is representable in the integer primitive `prim`.
pub(crate) fn int_fits(prim: PrimitiveId, n: i128) -> bool {
    let Some(size) = types::info_for(prim).size_bytes else {
        return false;
    };
    let bits = (size * 8) as u32;
    match types::numeric_class(prim) {
        Some(NumericClass::UnsignedInt) => n >= 0 && (bits >= 128 || n < (1i128 << bits)),
        Some(NumericClass::SignedInt) => bits >= 128 || (n >= -(1i128 << (bits - 1)) && n < (1i128 << (bits - 1))),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_binary_checks_overflow_and_division() {
        assert_eq!(fold_binary(BinaryOp::Add, ConstValue::Int(2), ConstValue::Int(3)), Ok(ConstValue::Int(5)));
        assert!(fold_binary(BinaryOp::Div, ConstValue::Int(1), ConstValue::Int(0)).is_err());
        assert!(fold_binary(BinaryOp::Mul, ConstValue::Int(i128::MAX), ConstValue::Int(2)).is_err());
        assert_eq!(
            fold_binary(BinaryOp::Add, ConstValue::Str("a".into()), ConstValue::Str("b".into())),
            Ok(ConstValue::Str("ab".into()))
        );
        assert!(fold_binary(BinaryOp::Add, ConstValue::Int(1), ConstValue::Bool(true)).is_err());
    }

    #[test]
    fn test_int_fits_ranges() {
        assert!(int_fits(PrimitiveId::U8, 255));
        assert!(!int_fits(PrimitiveId::U8, 256));
        assert!(!int_fits(PrimitiveId::U8, -1));
        assert!(int_fits(PrimitiveId::I8, -128));
        assert!(!int_fits(PrimitiveId::I8, 128));
        assert!(int_fits(PrimitiveId::I128, i128::MIN));
        assert!(int_fits(PrimitiveId::Int, i128::from(i64::MAX)));
    }
}
