//! Dotted access and aggregate construction.
//!
//! `a.b` and `a.b(args)` parse as one node whatever `a` is. The head decides the meaning:
//!
//! | head                  | `a.b`                | `a.b(args)`          |
//! |-----------------------|----------------------|----------------------|
//! | `Result` / `Option`   | builtin variant      | builtin variant      |
//! | enum                  | unit variant         | variant with payload |
//! | import binding        | module const         | module function      |
//! | variable or const     | field                | method call          |

use std::collections::{HashMap, HashSet};

use crate::frontend::ast::*;
use crate::frontend::diagnostics::{CompileError, ErrorKind, errors};
use crate::frontend::symbols::*;

use super::super::{Analyzer, CallTarget};
use super::calls::unify;

impl Analyzer<'_> {
    pub(super) fn check_dotted(
        &mut self,
        ctor: &EnumConstructor,
        expected: Option<&ResolvedType>,
        span: Span,
    ) -> ResolvedType {
        let head = ctor.head.node.as_str();
        if head == "Result" || head == "Option" {
            return self.check_builtin_variant(ctor, expected, span);
        }

        match self.symbol_kind(head).map(|(_, kind)| kind) {
            Some(SymbolKind::Enum(info)) => self.check_variant_constructor(&info, ctor, expected, span),
            Some(SymbolKind::Module(binding)) => self.check_module_member(&binding, ctor, expected, span),
            Some(SymbolKind::Variable(VariableInfo { ty, .. }) | SymbolKind::Const(ConstInfo { ty, .. })) => {
                self.record_type(ctor.head.span, &ty);
                match &ctor.args {
                    None => self.field_type(&ty, &ctor.variant),
                    Some(args) => self.check_method_call(&ty, &ctor.variant, args, expected, span),
                }
            }
            Some(SymbolKind::Struct(_)) => {
                self.report(
                    CompileError::type_error(format!("'{}' is a struct and has no members", head), ctor.head.span)
                        .with_hint(format!("Associated functions are called as {}::{}(...)", head, ctor.variant.node)),
                );
                self.check_dotted_args(ctor);
                ResolvedType::Unknown
            }
            Some(kind) => {
                self.report(CompileError::type_error(
                    format!("'{}' is a {} and has no members", head, kind.describe()),
                    ctor.head.span,
                ));
                self.check_dotted_args(ctor);
                ResolvedType::Unknown
            }
            None => {
                self.report(errors::unknown_symbol(head, ctor.head.span));
                self.check_dotted_args(ctor);
                ResolvedType::Unknown
            }
        }
    }

    fn check_dotted_args(&mut self, ctor: &EnumConstructor) {
        if let Some(args) = &ctor.args {
            self.check_args_unchecked(args);
        }
    }

    /// `Result.Ok(v)`, `Result.Err(e)`, `Option.Some(v)`, `Option.None`.
    fn check_builtin_variant(
        &mut self,
        ctor: &EnumConstructor,
        expected: Option<&ResolvedType>,
        span: Span,
    ) -> ResolvedType {
        let head = ctor.head.node.as_str();
        let variant = ctor.variant.node.as_str();
        let (payload_hint, arity) = match (head, variant, expected) {
            ("Result", "Ok", Some(ResolvedType::Result(ok, _))) => (Some((**ok).clone()), 1),
            ("Result", "Err", Some(ResolvedType::Result(_, err))) => (Some((**err).clone()), 1),
            ("Option", "Some", Some(ResolvedType::Option(inner))) => (Some((**inner).clone()), 1),
            ("Result", "Ok" | "Err", _) | ("Option", "Some", _) => (None, 1),
            ("Option", "None", _) => (None, 0),
            _ => {
                self.report(errors::unknown_variant(head, variant, ctor.variant.span));
                self.check_dotted_args(ctor);
                return ResolvedType::Unknown;
            }
        };

        let args = ctor.args.as_deref().unwrap_or_default();
        if args.len() != arity {
            self.report(errors::argument_count(
                &format!("{}.{}", head, variant),
                &arity.to_string(),
                args.len(),
                span,
            ));
            self.check_args_unchecked(args);
            return ResolvedType::Unknown;
        }
        self.info.call_targets.insert(
            (span.start, span.end),
            CallTarget::Variant {
                owner: None,
                name: variant.to_string(),
            },
        );

        let payload = match args.first() {
            Some(arg) => self.check_expr(arg, payload_hint.as_ref()),
            None => ResolvedType::Unknown,
        };
        let (ok, err) = match expected {
            Some(ResolvedType::Result(ok, err)) => ((**ok).clone(), (**err).clone()),
            _ => (ResolvedType::Unknown, ResolvedType::Unknown),
        };
        match variant {
            "Ok" => ResolvedType::Result(Box::new(payload), Box::new(err)),
            "Err" => ResolvedType::Result(Box::new(ok), Box::new(payload)),
            "Some" => ResolvedType::Option(Box::new(payload)),
            _ => match expected {
                Some(option @ ResolvedType::Option(_)) => option.clone(),
                _ => ResolvedType::Option(Box::new(ResolvedType::Unknown)),
            },
        }
    }

    /// `Enum.Variant` or `Enum.Variant(args)` for a user enum.
    fn check_variant_constructor(
        &mut self,
        info: &EnumInfo,
        ctor: &EnumConstructor,
        expected: Option<&ResolvedType>,
        span: Span,
    ) -> ResolvedType {
        let Some(variant) = info.variant(&ctor.variant.node) else {
            let mut error = errors::unknown_variant(&info.nominal.name, &ctor.variant.node, ctor.variant.span);
            if ctor.args.is_some() && info.methods.contains_key(&ctor.variant.node) {
                error = error.with_hint(format!(
                    "'{}' is an associated function: {}::{}(...)",
                    ctor.variant.node, info.nominal.name, ctor.variant.node
                ));
            }
            self.report(error);
            self.check_dotted_args(ctor);
            return ResolvedType::Unknown;
        };

        let args = ctor.args.as_deref().unwrap_or_default();
        if args.len() != variant.payload.len() {
            self.report(errors::argument_count(
                &format!("{}.{}", info.nominal.name, variant.name),
                &variant.payload.len().to_string(),
                args.len(),
                span,
            ));
            self.check_args_unchecked(args);
            return ResolvedType::Enum(info.nominal.clone(), vec![ResolvedType::Unknown; info.type_params.len()]);
        }

        let mut bindings = HashMap::new();
        if let Some(ResolvedType::Enum(nominal, type_args)) = expected {
            if *nominal == info.nominal {
                bindings.extend(info.type_params.iter().cloned().zip(type_args.iter().cloned()));
            }
        }
        for (arg, payload) in args.iter().zip(&variant.payload) {
            let hint = payload.substitute(&bindings);
            let actual = self.check_expr(arg, Some(&hint));
            unify(payload, &actual, &mut bindings);
            let want = payload.substitute(&bindings);
            self.expect_type(&want, &actual, arg.span);
        }

        self.info.call_targets.insert(
            (span.start, span.end),
            CallTarget::Variant {
                owner: Some(info.nominal.clone()),
                name: variant.name.clone(),
            },
        );
        let type_args = info
            .type_params
            .iter()
            .map(|p| bindings.get(p).cloned().unwrap_or(ResolvedType::Unknown))
            .collect();
        ResolvedType::Enum(info.nominal.clone(), type_args)
    }

    /// `module.member` or `module.function(args)` through an import binding.
    fn check_module_member(
        &mut self,
        binding: &ModuleBinding,
        ctor: &EnumConstructor,
        expected: Option<&ResolvedType>,
        span: Span,
    ) -> ResolvedType {
        let member = &ctor.variant.node;
        // External packages, and modules that could not be analysed, are opaque.
        let Some(exports) = binding.module.as_ref().and_then(|m| self.deps.get(m)).cloned() else {
            self.check_dotted_args(ctor);
            return ResolvedType::Unknown;
        };
        let Some(item) = exports.get(member).cloned() else {
            self.report(
                errors::unknown_symbol(&format!("{}.{}", ctor.head.node, member), ctor.variant.span)
                    .with_note(format!("module '{}' has no member '{}'", exports.module, member)),
            );
            self.check_dotted_args(ctor);
            return ResolvedType::Unknown;
        };
        if item.visibility == Visibility::Private {
            self.report(errors::private_access(member, &exports.module, ctor.variant.span));
            self.check_dotted_args(ctor);
            return ResolvedType::Unknown;
        }

        match (&item.kind, &ctor.args) {
            (SymbolKind::Function(info), Some(args)) => {
                self.call_function(member, Some(exports.module.clone()), info, args, expected, span)
            }
            (SymbolKind::Const(konst), None) => konst.ty.clone(),
            (SymbolKind::Function(_), None) => {
                self.report(
                    CompileError::type_error(
                        format!("'{}.{}' is a function and cannot be used as a value", ctor.head.node, member),
                        span,
                    )
                    .with_hint(format!("Call it: {}.{}(...)", ctor.head.node, member)),
                );
                ResolvedType::Unknown
            }
            (kind, _) => {
                self.report(CompileError::type_error(
                    format!("'{}.{}' is a {} and cannot be used here", ctor.head.node, member, kind.describe()),
                    span,
                ));
                self.check_dotted_args(ctor);
                ResolvedType::Unknown
            }
        }
    }

    /// Type of `field` on a value of type `base`.
    pub(super) fn field_type(&mut self, base: &ResolvedType, field: &Spanned<Ident>) -> ResolvedType {
        match base {
            ResolvedType::Struct(nominal, type_args) => {
                let Some(info) = self.struct_info(nominal) else {
                    return ResolvedType::Unknown;
                };
                let Some(found) = info.field(&field.node) else {
                    let mut error = errors::unknown_field(&nominal.name, &field.node, field.span);
                    if info.methods.get(&field.node).is_some_and(|m| m.has_self) {
                        error = error.with_hint(format!("'{}' is a method: call it with {}(...)", field.node, field.node));
                    }
                    self.report(error);
                    return ResolvedType::Unknown;
                };
                if nominal.module != self.module && found.visibility == Visibility::Private {
                    self.report(errors::private_access(&field.node, &nominal.module, field.span));
                }
                let bindings: HashMap<String, ResolvedType> =
                    info.type_params.iter().cloned().zip(type_args.iter().cloned()).collect();
                found.ty.instantiate(&info.type_params, &bindings)
            }
            ResolvedType::Pointer(_, pointee) if matches!(**pointee, ResolvedType::Struct(..)) => {
                self.report(
                    CompileError::type_error(
                        format!("Cannot access field '{}' through pointer type '{}'", field.node, base),
                        field.span,
                    )
                    .with_hint("Dereference first inside an unsafe block: (*p).field"),
                );
                ResolvedType::Unknown
            }
            ResolvedType::Unknown => ResolvedType::Unknown,
            other => {
                self.report(errors::unknown_field(&other.to_string(), &field.node, field.span));
                ResolvedType::Unknown
            }
        }
    }

    /// `Name { field: value, ... }` and `Name<T> { ... }`.
    pub(super) fn check_struct_literal(
        &mut self,
        lit: &StructLiteral,
        expected: Option<&ResolvedType>,
        span: Span,
    ) -> ResolvedType {
        let name = &lit.name.node;
        let info = match self.symbol_kind(name).map(|(_, kind)| kind) {
            Some(SymbolKind::Struct(info)) => info,
            other => {
                let error = match other {
                    Some(kind) => CompileError::type_error(
                        format!("'{}' is a {}, not a struct", name, kind.describe()),
                        lit.name.span,
                    ),
                    None => errors::unknown_type(name, lit.name.span),
                };
                self.report(error);
                for (_, value) in &lit.fields {
                    self.check_expr(value, None);
                }
                return ResolvedType::Unknown;
            }
        };

        let mut bindings = HashMap::new();
        if !lit.type_args.is_empty() {
            let args = self.resolve_type_args(name, &info.type_params, &lit.type_args, lit.name.span);
            bindings.extend(info.type_params.iter().cloned().zip(args));
        } else if let Some(ResolvedType::Struct(nominal, type_args)) = expected {
            if *nominal == info.nominal {
                bindings.extend(info.type_params.iter().cloned().zip(type_args.iter().cloned()));
            }
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for (field_name, value) in &lit.fields {
            if !seen.insert(field_name.node.as_str()) {
                self.report(CompileError::new(
                    ErrorKind::DuplicateDeclaration,
                    format!("Field '{}' is initialised more than once", field_name.node),
                    field_name.span,
                ));
                self.check_expr(value, None);
                continue;
            }
            let Some(field) = info.field(&field_name.node) else {
                self.report(errors::unknown_field(name, &field_name.node, field_name.span));
                self.check_expr(value, None);
                continue;
            };
            if info.nominal.module != self.module && field.visibility == Visibility::Private {
                self.report(errors::private_access(&field_name.node, &info.nominal.module, field_name.span));
            }
            let hint = field.ty.substitute(&bindings);
            let actual = self.check_expr(value, Some(&hint));
            unify(&field.ty, &actual, &mut bindings);
            let want = field.ty.substitute(&bindings);
            self.expect_type(&want, &actual, value.span);
        }

        let missing: Vec<&str> = info
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .filter(|f| !seen.contains(f))
            .collect();
        if !missing.is_empty() {
            self.report(CompileError::type_error(
                format!("Missing field(s) in '{}' literal: {}", name, missing.join(", ")),
                span,
            ));
        }

        let type_args = info
            .type_params
            .iter()
            .map(|p| bindings.get(p).cloned().unwrap_or(ResolvedType::Unknown))
            .collect();
        ResolvedType::Struct(info.nominal.clone(), type_args)
    }
}
