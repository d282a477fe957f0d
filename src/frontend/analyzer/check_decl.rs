//! Second-pass declaration checking: annotations, function and method bodies, the entry point.

use asthra_core::lang::annotations::AnnotationTarget;
use asthra_core::lang::types::PrimitiveId;

use crate::frontend::ast::*;
use crate::frontend::diagnostics::CompileError;
use crate::frontend::symbols::*;

use super::{Analyzer, FnContext};

/// The struct or enum whose `impl` block is being checked.
struct Owner {
    /// The owner type with its own parameters as arguments, i.e. the type of `self`.
    self_type: ResolvedType,
    type_params: Vec<String>,
    methods: std::collections::HashMap<String, MethodInfo>,
}

impl Analyzer<'_> {
    // ========================================================================
    // Second pass: check declarations
    // ========================================================================

    /// Validate a declaration (second pass). Consts go through [`check_const_declaration`](Self::check_const_declaration).
    pub(crate) fn check_declaration(&mut self, decl: &Spanned<Declaration>) {
        match &decl.node {
            Declaration::Function(func) => self.check_function(func),
            Declaration::Extern(ext) => self.check_extern(ext),
            Declaration::Struct(s) => {
                self.validate_annotations(&s.annotations, AnnotationTarget::Struct, None);
                for field in &s.fields {
                    self.validate_annotations(&field.node.annotations, AnnotationTarget::Field, None);
                }
            }
            Declaration::Enum(e) => self.validate_annotations(&e.annotations, AnnotationTarget::Enum, None),
            Declaration::Impl(block) => self.check_impl(block),
            Declaration::Const(konst) => self.check_const_declaration(konst),
        }
    }

    pub(crate) fn check_const_declaration(&mut self, konst: &ConstDecl) {
        self.validate_annotations(&konst.annotations, AnnotationTarget::Const, None);
        self.check_const(konst);
    }

    fn check_function(&mut self, func: &FunctionDecl) {
        self.validate_annotations(&func.annotations, AnnotationTarget::Function, None);
        let Some(sig) = self.declared_signature(&func.name) else {
            return;
        };
        if self.is_entry && func.name.node == "main" {
            self.check_entry_point(func, &sig);
        }
        self.check_function_body(func, &sig, None);
    }

    /// Signature recorded for the declaration named `name`, unless it lost a duplicate-name conflict.
    fn declared_signature(&self, name: &Spanned<Ident>) -> Option<Signature> {
        let sym = self.symbols.get(self.symbols.lookup_global(&name.node)?)?;
        if sym.span != name.span {
            return None;
        }
        match &sym.kind {
            SymbolKind::Function(info) => info.signatures.first().cloned(),
            _ => None,
        }
    }

    fn check_entry_point(&mut self, func: &FunctionDecl, sig: &Signature) {
        let returns_ok = matches!(
            sig.return_type,
            ResolvedType::Primitive(PrimitiveId::I32 | PrimitiveId::Void) | ResolvedType::Unknown
        );
        if !sig.params.is_empty() || !returns_ok || !func.type_params.is_empty() {
            self.report(
                CompileError::type_error(
                    format!(
                        "'main' must be declared as 'fn main(none) -> i32' or 'fn main(none) -> void', found {} parameter(s) returning '{}'",
                        sig.params.len(),
                        sig.return_type
                    ),
                    func.name.span,
                )
                .with_note("Command-line arguments are available through args()"),
            );
        }
    }

    fn check_extern(&mut self, ext: &ExternDecl) {
        self.validate_annotations(&ext.annotations, AnnotationTarget::ExternFunction, None);
        let sig = self.declared_signature(&ext.name);
        for (i, param) in ext.params.iter().enumerate() {
            let ty = sig.as_ref().and_then(|s| s.params.get(i)).map(|p| p.ty.clone());
            self.validate_annotations(&param.node.annotations, AnnotationTarget::ExternParam, ty.as_ref());
        }
        let ret = sig.map(|s| s.return_type);
        self.validate_annotations(&ext.return_annotations, AnnotationTarget::ExternReturn, ret.as_ref());
    }

    fn check_impl(&mut self, block: &ImplBlock) {
        let owner = self.symbols.lookup_global(&block.target.node).and_then(|id| {
            match &self.symbols.get(id)?.kind {
                SymbolKind::Struct(info) => Some(Owner {
                    self_type: ResolvedType::Struct(info.nominal.clone(), type_param_args(&info.type_params)),
                    type_params: info.type_params.clone(),
                    methods: info.methods.clone(),
                }),
                SymbolKind::Enum(info) => Some(Owner {
                    self_type: ResolvedType::Enum(info.nominal.clone(), type_param_args(&info.type_params)),
                    type_params: info.type_params.clone(),
                    methods: info.methods.clone(),
                }),
                _ => None,
            }
        });
        // An unknown target was reported while collecting.
        let Some(owner) = owner else {
            return;
        };

        for method in &block.methods {
            let func = &method.node;
            self.validate_annotations(&func.annotations, AnnotationTarget::Method, None);
            let Some(info) = owner.methods.get(&func.name.node).filter(|m| m.span == func.name.span) else {
                continue;
            };
            let sig = info.signature.clone();
            self.check_function_body(func, &sig, Some(&owner));
        }
    }

    fn check_function_body(&mut self, func: &FunctionDecl, sig: &Signature, owner: Option<&Owner>) {
        let kind = if owner.is_some() { ScopeKind::Method } else { ScopeKind::Function };
        self.symbols.enter_scope(kind);

        if let Some(owner) = owner {
            let params: Vec<(String, Span)> = owner.type_params.iter().map(|p| (p.clone(), func.name.span)).collect();
            self.define_type_params(&params, false);
        }
        self.define_type_params(&super::collect::spanned_names(&func.type_params), false);

        if let Some(receiver) = func.receiver {
            let ty = match owner {
                Some(owner) => owner.self_type.clone(),
                None => {
                    self.report(CompileError::type_error(
                        "'self' parameter is only allowed on methods inside an 'impl' block",
                        receiver,
                    ));
                    ResolvedType::Unknown
                }
            };
            self.define_variable("self", ty, false, BindingOrigin::SelfParam, receiver, false);
        }

        for (param, info) in func.params.iter().zip(&sig.params) {
            self.validate_annotations(&param.node.annotations, AnnotationTarget::Param, Some(&info.ty));
            // Duplicate parameter names were reported with the signature.
            self.define_variable(&info.name, info.ty.clone(), false, BindingOrigin::Param, param.span, false);
        }

        let previous = self.current_fn.replace(FnContext {
            name: func.name.node.clone(),
            return_type: sig.return_type.clone(),
        });
        self.check_statements(&func.body);
        self.current_fn = previous;
        self.symbols.exit_scope();
        self.check_constant_time_body(&func.annotations, &func.body);

        let ret = &sig.return_type;
        if !ret.is_void() && !ret.is_never() && !ret.is_unknown() && !self.block_returns(&func.body) {
            self.report(
                CompileError::type_error(
                    format!(
                        "Function '{}' may finish without returning a value of type '{}'",
                        func.name.node, ret
                    ),
                    func.name.span,
                )
                .with_hint("Add a 'return' statement on every path"),
            );
        }
    }

    /// Define a local variable in the current scope.
    pub(crate) fn define_variable(
        &mut self,
        name: &str,
        ty: ResolvedType,
        mutable: bool,
        origin: BindingOrigin,
        span: Span,
        report_duplicate: bool,
    ) {
        let symbol = Symbol {
            name: name.to_string(),
            kind: SymbolKind::Variable(VariableInfo { ty, mutable, origin }),
            span,
            scope: 0,
            visibility: None,
        };
        if let Err(previous) = self.symbols.define(symbol) {
            if report_duplicate {
                self.report(crate::frontend::diagnostics::errors::duplicate_declaration(name, span, previous));
            }
        }
    }
}

fn type_param_args(params: &[String]) -> Vec<ResolvedType> {
    params.iter().map(|p| ResolvedType::TypeParam(p.clone())).collect()
}
