//! Calls: free functions, methods, associated functions, and generic inference.

use std::collections::HashMap;

use crate::frontend::ast::*;
use crate::frontend::diagnostics::{CompileError, ErrorKind, errors};
use crate::frontend::symbols::*;

use super::super::{Analyzer, CallTarget};

impl Analyzer<'_> {
    pub(super) fn check_call(
        &mut self,
        callee: &Spanned<Expr>,
        args: &[Spanned<Expr>],
        expected: Option<&ResolvedType>,
        span: Span,
    ) -> ResolvedType {
        match &callee.node {
            Expr::Ident(name) => self.check_named_call(name, callee.span, args, expected, span),
            Expr::Field(receiver, method) => {
                let receiver_ty = self.check_expr(receiver, None);
                self.check_method_call(&receiver_ty, method, args, expected, span)
            }
            _ => {
                let ty = self.check_expr(callee, None);
                self.check_args_unchecked(args);
                if !ty.is_unknown() {
                    self.report(CompileError::type_error(format!("Type '{}' is not callable", ty), callee.span));
                }
                ResolvedType::Unknown
            }
        }
    }

    fn check_named_call(
        &mut self,
        name: &str,
        name_span: Span,
        args: &[Spanned<Expr>],
        expected: Option<&ResolvedType>,
        span: Span,
    ) -> ResolvedType {
        let info = match self.symbol_kind(name) {
            Some((_, SymbolKind::Function(info))) => info,
            Some((_, kind)) => {
                let mut error = CompileError::type_error(
                    format!("'{}' is a {} and cannot be called", name, kind.describe()),
                    name_span,
                );
                if matches!(kind, SymbolKind::Struct(_)) {
                    error = error.with_hint(format!("Build a value with a struct literal: {} {{ ... }}", name));
                }
                self.report(error);
                self.check_args_unchecked(args);
                return ResolvedType::Unknown;
            }
            None => {
                self.report(errors::unknown_symbol(name, name_span));
                self.check_args_unchecked(args);
                return ResolvedType::Unknown;
            }
        };
        self.call_function(name, None, &info, args, expected, span)
    }

    /// Check a call to a resolved free function, local or imported.
    pub(super) fn call_function(
        &mut self,
        name: &str,
        module: Option<String>,
        info: &FunctionInfo,
        args: &[Spanned<Expr>],
        expected: Option<&ResolvedType>,
        span: Span,
    ) -> ResolvedType {
        let Some((overload, sig)) = info.overload(args.len()) else {
            self.report(errors::argument_count(name, &info.arities(), args.len(), span));
            self.check_args_unchecked(args);
            return ResolvedType::Unknown;
        };
        if info.is_extern && !self.symbols.inside(ScopeKind::Unsafe) {
            self.report(errors::requires_unsafe(&format!("Call to extern function '{}'", name), span));
        }
        self.info.call_targets.insert(
            (span.start, span.end),
            CallTarget::Function {
                module,
                name: name.to_string(),
                overload,
                predeclared: info.is_predeclared,
            },
        );
        let sig = sig.clone();
        self.apply_signature(name, &sig, &sig.type_params, HashMap::new(), args, expected, span)
    }

    /// `value.method(args)`.
    pub(super) fn check_method_call(
        &mut self,
        receiver: &ResolvedType,
        method: &Spanned<Ident>,
        args: &[Spanned<Expr>],
        expected: Option<&ResolvedType>,
        span: Span,
    ) -> ResolvedType {
        let (nominal, type_args) = match receiver {
            ResolvedType::Struct(nominal, type_args) | ResolvedType::Enum(nominal, type_args) => (nominal, type_args),
            ResolvedType::Unknown => {
                self.check_args_unchecked(args);
                return ResolvedType::Unknown;
            }
            other => {
                self.report(CompileError::new(
                    ErrorKind::Unresolved,
                    format!("Type '{}' has no method '{}'", other, method.node),
                    method.span,
                ));
                self.check_args_unchecked(args);
                return ResolvedType::Unknown;
            }
        };
        let Some((type_params, info)) = self.lookup_method(nominal, &method.node, method.span) else {
            self.check_args_unchecked(args);
            return ResolvedType::Unknown;
        };
        if !info.has_self {
            self.report(
                CompileError::type_error(
                    format!("'{}' is an associated function of '{}', not a method", method.node, nominal.name),
                    method.span,
                )
                .with_hint(format!("Call it as {}::{}(...)", nominal.name, method.node)),
            );
        }

        let bindings: HashMap<String, ResolvedType> = type_params.iter().cloned().zip(type_args.iter().cloned()).collect();
        self.info.call_targets.insert(
            (span.start, span.end),
            CallTarget::Method {
                owner: nominal.clone(),
                name: method.node.clone(),
            },
        );
        let sig = info.signature;
        self.apply_signature(&method.node, &sig, &sig.type_params, bindings, args, expected, span)
    }

    /// `Type::function(args)` and `Type::<T>::function(args)`.
    pub(super) fn check_associated_call(
        &mut self,
        call: &AssociatedCall,
        expected: Option<&ResolvedType>,
        span: Span,
    ) -> ResolvedType {
        let type_name = &call.type_name.node;
        let (nominal, type_params) = match self.symbol_kind(type_name) {
            Some((_, SymbolKind::Struct(info))) => (info.nominal, info.type_params),
            Some((_, SymbolKind::Enum(info))) => (info.nominal, info.type_params),
            Some((_, kind)) => {
                self.report(CompileError::type_error(
                    format!("'{}' is a {} and has no associated functions", type_name, kind.describe()),
                    call.type_name.span,
                ));
                self.check_args_unchecked(&call.args);
                return ResolvedType::Unknown;
            }
            None => {
                self.report(errors::unknown_type(type_name, call.type_name.span));
                self.check_args_unchecked(&call.args);
                return ResolvedType::Unknown;
            }
        };

        let mut bindings = HashMap::new();
        let mut generics: Vec<String> = Vec::new();
        if call.type_args.is_empty() {
            generics.extend(type_params.iter().cloned());
        } else {
            let args = self.resolve_type_args(type_name, &type_params, &call.type_args, call.type_name.span);
            bindings.extend(type_params.iter().cloned().zip(args));
        }

        let Some((_, info)) = self.lookup_method(&nominal, &call.function.node, call.function.span) else {
            self.check_args_unchecked(&call.args);
            return ResolvedType::Unknown;
        };
        if info.has_self {
            self.report(
                CompileError::type_error(
                    format!("'{}::{}' takes 'self' and must be called on a value", type_name, call.function.node),
                    call.function.span,
                )
                .with_hint(format!("value.{}(...)", call.function.node)),
            );
        }
        self.info.call_targets.insert(
            (span.start, span.end),
            CallTarget::Method {
                owner: nominal.clone(),
                name: call.function.node.clone(),
            },
        );
        let sig = info.signature;
        generics.extend(sig.type_params.iter().cloned());
        self.apply_signature(&call.function.node, &sig, &generics, bindings, &call.args, expected, span)
    }

    /// A method of `nominal`, with the owner's type parameters. Reports unknown and inaccessible methods.
    fn lookup_method(&mut self, nominal: &NominalRef, name: &str, span: Span) -> Option<(Vec<String>, MethodInfo)> {
        let (type_params, methods) = match self.nominal_kind(nominal)? {
            SymbolKind::Struct(info) => (info.type_params, info.methods),
            SymbolKind::Enum(info) => (info.type_params, info.methods),
            _ => return None,
        };
        let Some(method) = methods.get(name).cloned() else {
            self.report(CompileError::new(
                ErrorKind::Unresolved,
                format!("No method '{}' on type '{}'", name, nominal.name),
                span,
            ));
            return None;
        };
        if nominal.module != self.module && method.visibility == Visibility::Private {
            self.report(errors::private_access(name, &nominal.module, span));
        }
        Some((type_params, method))
    }

    /// Check arguments against `sig`, inferring the parameters in `generics`, and return the call's type.
    pub(super) fn apply_signature(
        &mut self,
        callee: &str,
        sig: &Signature,
        generics: &[String],
        mut bindings: HashMap<String, ResolvedType>,
        args: &[Spanned<Expr>],
        expected: Option<&ResolvedType>,
        span: Span,
    ) -> ResolvedType {
        if args.len() != sig.arity() {
            self.report(errors::argument_count(callee, &sig.arity().to_string(), args.len(), span));
            self.check_args_unchecked(args);
            return sig.return_type.instantiate(generics, &bindings);
        }

        if !generics.is_empty() {
            if let Some(expected) = expected {
                unify(&sig.return_type, expected, &mut bindings);
            }
        }

        for (arg, param) in args.iter().zip(&sig.params) {
            let hint = param.ty.substitute(&bindings);
            let actual = self.check_expr(arg, Some(&hint));
            unify(&param.ty, &actual, &mut bindings);
            let want = param.ty.substitute(&bindings);
            if !is_assignable(&actual, &want) {
                self.report(
                    errors::type_mismatch(&want.to_string(), &actual.to_string(), arg.span)
                        .with_note(format!("for parameter '{}' of '{}'", param.name, callee)),
                );
            }
        }
        sig.return_type.instantiate(generics, &bindings)
    }

    /// Check arguments of a call that could not be resolved, so their own errors are still found.
    pub(super) fn check_args_unchecked(&mut self, args: &[Spanned<Expr>]) {
        for arg in args {
            self.check_expr(arg, None);
        }
    }
}

/// Bind the type parameters in `pattern` by matching it against `actual`. First binding wins.
pub(crate) fn unify(pattern: &ResolvedType, actual: &ResolvedType, bindings: &mut HashMap<String, ResolvedType>) {
    use ResolvedType as T;

    match (pattern, actual) {
        (_, T::Unknown) => {}
        (T::TypeParam(name), _) => {
            bindings.entry(name.clone()).or_insert_with(|| actual.clone());
        }
        (T::Slice(p), T::Slice(a) | T::FixedArray(a, _))
        | (T::FixedArray(p, _), T::FixedArray(a, _))
        | (T::Pointer(_, p), T::Pointer(_, a))
        | (T::Option(p), T::Option(a))
        | (T::TaskHandle(p), T::TaskHandle(a)) => unify(p, a, bindings),
        (T::Result(p1, p2), T::Result(a1, a2)) => {
            unify(p1, a1, bindings);
            unify(p2, a2, bindings);
        }
        (T::Tuple(ps), T::Tuple(as_)) => {
            for (p, a) in ps.iter().zip(as_) {
                unify(p, a, bindings);
            }
        }
        (T::Struct(rp, ps), T::Struct(ra, as_)) | (T::Enum(rp, ps), T::Enum(ra, as_)) if rp == ra => {
            for (p, a) in ps.iter().zip(as_) {
                unify(p, a, bindings);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asthra_core::lang::types::PrimitiveId;

    #[test]
    fn test_unify_binds_nested_parameters() {
        let t = ResolvedType::TypeParam("T".to_string());
        let pattern = ResolvedType::Option(Box::new(ResolvedType::Slice(Box::new(t))));
        let actual = ResolvedType::Option(Box::new(ResolvedType::FixedArray(
            Box::new(ResolvedType::Primitive(PrimitiveId::I32)),
            Some(3),
        )));
        let mut bindings = HashMap::new();
        unify(&pattern, &actual, &mut bindings);
        assert_eq!(bindings.get("T"), Some(&ResolvedType::Primitive(PrimitiveId::I32)));
    }

    #[test]
    fn test_unify_keeps_first_binding_and_ignores_unknown() {
        let t = ResolvedType::TypeParam("T".to_string());
        let pattern = ResolvedType::Tuple(vec![t.clone(), t]);
        let actual = ResolvedType::Tuple(vec![ResolvedType::Unknown, ResolvedType::BOOL]);
        let mut bindings = HashMap::new();
        unify(&pattern, &actual, &mut bindings);
        assert_eq!(bindings.get("T"), Some(&ResolvedType::BOOL));
    }
}
