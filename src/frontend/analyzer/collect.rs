//! First pass: register declarations and resolve their shapes.
//!
//! Runs in three phases so declarations may refer to each other in any order:
//!
//! 1. bind imports and register every top-level name (duplicates are reported here);
//! 2. resolve function and extern signatures, struct fields, enum variants, and const types, then reject structs
//!    and enums that contain themselves by value;
//! 3. attach `impl` methods to their struct or enum.

use std::collections::{HashMap, HashSet};

use asthra_core::lang::annotations::{self, AnnotationId};

use crate::frontend::ast::*;
use crate::frontend::diagnostics::{CompileError, ErrorKind, errors};
use crate::frontend::symbols::*;

use super::{Analyzer, ImportBinding};

impl Analyzer<'_> {
    pub(crate) fn collect_program(&mut self, program: &Program, imports: &[ImportBinding]) {
        for import in imports {
            let symbol = Symbol {
                name: import.binding.clone(),
                kind: SymbolKind::Module(ModuleBinding {
                    path: import.path.clone(),
                    module: import.module.clone(),
                }),
                span: import.span,
                scope: MODULE_SCOPE,
                visibility: None,
            };
            // Colliding import bindings are reported by the module graph.
            let _ = self.symbols.define(symbol);
        }

        let ids: Vec<Option<SymbolId>> = program.declarations.iter().map(|d| self.register_name(d)).collect();

        for (decl, id) in program.declarations.iter().zip(ids) {
            if let Some(id) = id {
                self.resolve_shape(&decl.node, id);
            }
        }
        self.check_infinite_types(program);

        for decl in &program.declarations {
            if let Declaration::Impl(block) = &decl.node {
                self.collect_impl(block);
            }
        }
    }

    fn register_name(&mut self, decl: &Spanned<Declaration>) -> Option<SymbolId> {
        let (kind, visibility) = match &decl.node {
            Declaration::Function(f) => (
                SymbolKind::Function(FunctionInfo {
                    signatures: Vec::new(),
                    is_extern: false,
                    is_predeclared: false,
                }),
                f.visibility,
            ),
            Declaration::Extern(x) => (
                SymbolKind::Function(FunctionInfo {
                    signatures: Vec::new(),
                    is_extern: true,
                    is_predeclared: false,
                }),
                x.visibility,
            ),
            Declaration::Struct(s) => (
                SymbolKind::Struct(StructInfo {
                    nominal: NominalRef::new(&self.module, &s.name.node),
                    type_params: s.type_params.iter().map(|p| p.node.clone()).collect(),
                    fields: Vec::new(),
                    methods: HashMap::new(),
                    ownership: ownership_mode(&s.annotations),
                }),
                s.visibility,
            ),
            Declaration::Enum(e) => (
                SymbolKind::Enum(EnumInfo {
                    nominal: NominalRef::new(&self.module, &e.name.node),
                    type_params: e.type_params.iter().map(|p| p.node.clone()).collect(),
                    variants: Vec::new(),
                    methods: HashMap::new(),
                    ownership: ownership_mode(&e.annotations),
                }),
                e.visibility,
            ),
            Declaration::Const(c) => (
                SymbolKind::Const(ConstInfo {
                    ty: ResolvedType::Unknown,
                    value: None,
                }),
                c.visibility,
            ),
            Declaration::Impl(_) => return None,
        };

        let name = decl.node.name();
        let symbol = Symbol {
            name: name.node.clone(),
            kind,
            span: name.span,
            scope: MODULE_SCOPE,
            visibility: Some(visibility),
        };
        match self.symbols.define(symbol) {
            Ok(id) => {
                if let Declaration::Const(c) = &decl.node {
                    self.const_decls.insert(c.name.node.clone(), c.clone());
                }
                Some(id)
            }
            Err(previous) => {
                self.report(errors::duplicate_declaration(&name.node, name.span, previous));
                None
            }
        }
    }

    fn resolve_shape(&mut self, decl: &Declaration, id: SymbolId) {
        match decl {
            Declaration::Function(f) => {
                let params = spanned_names(&f.type_params);
                let sig = self.with_type_params(&params, true, |this| {
                    this.signature(&f.type_params, &f.params, &f.return_type)
                });
                self.set_signature(id, sig);
            }
            Declaration::Extern(x) => {
                let sig = self.signature(&[], &x.params, &x.return_type);
                self.set_signature(id, sig);
            }
            Declaration::Struct(s) => {
                let params = spanned_names(&s.type_params);
                let fields = self.with_type_params(&params, true, |this| this.resolve_fields(&s.fields));
                if let Some(Symbol {
                    kind: SymbolKind::Struct(info),
                    ..
                }) = self.symbols.get_mut(id)
                {
                    info.fields = fields;
                }
            }
            Declaration::Enum(e) => {
                let params = spanned_names(&e.type_params);
                let variants = self.with_type_params(&params, true, |this| this.resolve_variants(&e.name.node, &e.variants));
                if let Some(Symbol {
                    kind: SymbolKind::Enum(info),
                    ..
                }) = self.symbols.get_mut(id)
                {
                    info.variants = variants;
                }
            }
            Declaration::Const(c) => {
                let ty = self.resolve_type(&c.ty);
                if let Some(Symbol {
                    kind: SymbolKind::Const(info),
                    ..
                }) = self.symbols.get_mut(id)
                {
                    info.ty = ty;
                }
            }
            Declaration::Impl(_) => {}
        }
    }

    fn check_infinite_types(&mut self, program: &Program) {
        for decl in &program.declarations {
            let (name, kind) = match &decl.node {
                Declaration::Struct(s) => (&s.name, "struct"),
                Declaration::Enum(e) => (&e.name, "enum"),
                _ => continue,
            };
            let root = NominalRef::new(&self.module, &name.node);
            let mut seen: HashSet<NominalRef> = HashSet::new();
            let mut pending = self.by_value_members(&root);
            let mut recursive = false;
            while let Some(next) = pending.pop() {
                if next == root {
                    recursive = true;
                    break;
                }
                if seen.insert(next.clone()) {
                    pending.extend(self.by_value_members(&next));
                }
            }
            if recursive {
                self.report(errors::infinite_size(kind, &name.node, name.span));
            }
        }
    }

    /// Structs and enums stored inline in `nominal`'s fields or variant payloads.
    fn by_value_members(&self, nominal: &NominalRef) -> Vec<NominalRef> {
        let members: Vec<ResolvedType> = match self.nominal_kind(nominal) {
            Some(SymbolKind::Struct(info)) => info.fields.into_iter().map(|f| f.ty).collect(),
            Some(SymbolKind::Enum(info)) => info.variants.into_iter().flat_map(|v| v.payload).collect(),
            _ => Vec::new(),
        };
        let mut out = Vec::new();
        for ty in &members {
            inline_nominals(ty, &mut out);
        }
        out
    }

    fn set_signature(&mut self, id: SymbolId, sig: Signature) {
        if let Some(Symbol {
            kind: SymbolKind::Function(info),
            ..
        }) = self.symbols.get_mut(id)
        {
            info.signatures = vec![sig];
        }
    }

    fn resolve_fields(&mut self, fields: &[Spanned<FieldDecl>]) -> Vec<FieldInfo> {
        let mut seen: HashMap<&str, Span> = HashMap::new();
        let mut out = Vec::with_capacity(fields.len());
        for field in fields {
            if let Some(previous) = seen.get(field.node.name.as_str()) {
                self.report(errors::duplicate_declaration(&field.node.name, field.span, *previous));
                continue;
            }
            seen.insert(&field.node.name, field.span);
            let ty = self.resolve_type(&field.node.ty);
            out.push(FieldInfo {
                name: field.node.name.clone(),
                ty,
                // Fields are public unless marked `priv`.
                visibility: field.node.visibility.unwrap_or(Visibility::Public),
                span: field.span,
            });
        }
        out
    }

    fn resolve_variants(&mut self, enum_name: &str, variants: &[Spanned<VariantDecl>]) -> Vec<VariantInfo> {
        let mut seen: HashMap<&str, Span> = HashMap::new();
        let mut out = Vec::with_capacity(variants.len());
        for variant in variants {
            if let Some(previous) = seen.get(variant.node.name.as_str()) {
                self.report(errors::duplicate_declaration(&variant.node.name, variant.span, *previous));
                continue;
            }
            seen.insert(&variant.node.name, variant.span);
            let payload = variant.node.payload.iter().map(|t| self.resolve_type(t)).collect();
            let discriminant = variant.node.value.as_ref().and_then(|value| {
                match self.eval_const_expr(value, &mut Vec::new())? {
                    ConstValue::Int(n) => Some(n),
                    other => {
                        self.report(errors::const_eval_failed(
                            &format!(
                                "discriminant of '{}.{}' must be an integer, found {}",
                                enum_name,
                                variant.node.name,
                                other.type_name()
                            ),
                            value.span,
                        ));
                        None
                    }
                }
            });
            out.push(VariantInfo {
                name: variant.node.name.clone(),
                payload,
                discriminant,
            });
        }
        out
    }

    fn collect_impl(&mut self, block: &ImplBlock) {
        let target = &block.target;
        let owner = self.symbols.lookup_global(&target.node).and_then(|id| {
            let sym = self.symbols.get(id)?;
            match &sym.kind {
                SymbolKind::Struct(info) => Some((id, info.type_params.clone())),
                SymbolKind::Enum(info) => Some((id, info.type_params.clone())),
                _ => None,
            }
        });
        let Some((owner_id, owner_params)) = owner else {
            self.report(
                errors::unknown_type(&target.node, target.span)
                    .with_note("'impl' blocks attach methods to a struct or enum declared in the same module"),
            );
            return;
        };

        let mut methods: HashMap<String, MethodInfo> = HashMap::new();
        for method in &block.methods {
            let func = &method.node;
            if let Some(previous) = methods.get(&func.name.node) {
                self.report(errors::duplicate_declaration(&func.name.node, func.name.span, previous.span));
                continue;
            }
            let mut params: Vec<(String, Span)> = owner_params.iter().map(|p| (p.clone(), target.span)).collect();
            params.extend(spanned_names(&func.type_params));
            let signature =
                self.with_type_params(&params, true, |this| this.signature(&func.type_params, &func.params, &func.return_type));
            methods.insert(
                func.name.node.clone(),
                MethodInfo {
                    signature,
                    has_self: func.receiver.is_some(),
                    visibility: func.visibility,
                    span: func.name.span,
                },
            );
        }

        let existing = match self.symbols.get_mut(owner_id).map(|sym| &mut sym.kind) {
            Some(SymbolKind::Struct(info)) => &mut info.methods,
            Some(SymbolKind::Enum(info)) => &mut info.methods,
            _ => return,
        };
        let mut duplicates = Vec::new();
        for (name, method) in methods {
            match existing.get(&name) {
                Some(previous) => duplicates.push(errors::duplicate_declaration(&name, method.span, previous.span)),
                None => {
                    existing.insert(name, method);
                }
            }
        }
        for error in duplicates {
            self.report(error);
        }
    }

    fn signature(&mut self, type_params: &[Spanned<Ident>], params: &[Spanned<Param>], ret: &Spanned<Type>) -> Signature {
        let mut seen: HashMap<&str, Span> = HashMap::new();
        let mut resolved = Vec::with_capacity(params.len());
        for param in params {
            if let Some(previous) = seen.get(param.node.name.as_str()) {
                self.report(errors::duplicate_declaration(&param.node.name, param.span, *previous));
            }
            seen.insert(&param.node.name, param.span);
            resolved.push(ParamInfo {
                name: param.node.name.clone(),
                ty: self.resolve_type(&param.node.ty),
            });
        }
        Signature {
            type_params: type_params.iter().map(|p| p.node.clone()).collect(),
            params: resolved,
            return_type: self.resolve_type(ret),
        }
    }

    /// Run `f` with the given generic parameters in scope.
    pub(crate) fn with_type_params<R>(
        &mut self,
        params: &[(String, Span)],
        report_duplicates: bool,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        if params.is_empty() {
            return f(self);
        }
        self.symbols.enter_scope(ScopeKind::Block);
        self.define_type_params(params, report_duplicates);
        let result = f(self);
        self.symbols.exit_scope();
        result
    }

    pub(crate) fn define_type_params(&mut self, params: &[(String, Span)], report_duplicates: bool) {
        for (name, span) in params {
            let symbol = Symbol {
                name: name.clone(),
                kind: SymbolKind::TypeParam,
                span: *span,
                scope: 0,
                visibility: None,
            };
            if let Err(previous) = self.symbols.define(symbol) {
                if report_duplicates {
                    self.report(errors::duplicate_declaration(name, *span, previous));
                }
            }
        }
    }

    /// Resolve a written type against the current scope.
    pub(crate) fn resolve_type(&mut self, ty: &Spanned<Type>) -> ResolvedType {
        match &ty.node {
            Type::Primitive(p) => ResolvedType::Primitive(*p),
            Type::Slice(inner) => ResolvedType::Slice(Box::new(self.resolve_type(inner))),
            Type::FixedArray(inner, size) => {
                let elem = self.resolve_type(inner);
                let len = self.eval_array_size(size);
                ResolvedType::FixedArray(Box::new(elem), len)
            }
            Type::Pointer(mutability, inner) => ResolvedType::Pointer(*mutability, Box::new(self.resolve_type(inner))),
            Type::Result(ok, err) => {
                ResolvedType::Result(Box::new(self.resolve_type(ok)), Box::new(self.resolve_type(err)))
            }
            Type::Option(inner) => ResolvedType::Option(Box::new(self.resolve_type(inner))),
            Type::TaskHandle(inner) => ResolvedType::TaskHandle(Box::new(self.resolve_type(inner))),
            Type::Tuple(elems) => ResolvedType::Tuple(elems.iter().map(|e| self.resolve_type(e)).collect()),
            Type::Named(name, args) => self.resolve_named_type(name, args, ty.span),
        }
    }

    fn resolve_named_type(&mut self, name: &str, args: &[Spanned<Type>], span: Span) -> ResolvedType {
        match self.symbol_kind(name).map(|(_, kind)| kind) {
            Some(SymbolKind::TypeParam) => {
                if !args.is_empty() {
                    self.report(errors::generic_arity(name, 0, args.len(), span));
                }
                ResolvedType::TypeParam(name.to_string())
            }
            Some(SymbolKind::Struct(info)) => {
                let args = self.resolve_type_args(name, &info.type_params, args, span);
                ResolvedType::Struct(info.nominal, args)
            }
            Some(SymbolKind::Enum(info)) => {
                let args = self.resolve_type_args(name, &info.type_params, args, span);
                ResolvedType::Enum(info.nominal, args)
            }
            Some(other) => {
                self.report(CompileError::new(
                    ErrorKind::Unresolved,
                    format!("'{}' is a {}, not a type", name, other.describe()),
                    span,
                ));
                ResolvedType::Unknown
            }
            None => {
                self.report(errors::unknown_type(name, span));
                ResolvedType::Unknown
            }
        }
    }

    /// Resolve explicit type arguments; their count must match the declaration exactly.
    pub(crate) fn resolve_type_args(
        &mut self,
        name: &str,
        params: &[String],
        args: &[Spanned<Type>],
        span: Span,
    ) -> Vec<ResolvedType> {
        let resolved: Vec<ResolvedType> = args.iter().map(|a| self.resolve_type(a)).collect();
        if resolved.len() != params.len() {
            self.report(errors::generic_arity(name, params.len(), resolved.len(), span));
            return vec![ResolvedType::Unknown; params.len()];
        }
        resolved
    }
}

/// Nominal types laid out inline in `ty`; pointers, slices, and task handles break the chain.
fn inline_nominals(ty: &ResolvedType, out: &mut Vec<NominalRef>) {
    match ty {
        ResolvedType::Struct(r, _) | ResolvedType::Enum(r, _) => out.push(r.clone()),
        ResolvedType::Tuple(elems) => elems.iter().for_each(|e| inline_nominals(e, out)),
        ResolvedType::FixedArray(inner, _) | ResolvedType::Option(inner) => inline_nominals(inner, out),
        ResolvedType::Result(ok, err) => {
            inline_nominals(ok, out);
            inline_nominals(err, out);
        }
        _ => {}
    }
}

pub(crate) fn spanned_names(params: &[Spanned<Ident>]) -> Vec<(String, Span)> {
    params.iter().map(|p| (p.node.clone(), p.span)).collect()
}

/// Memory strategy named by the first `#[ownership(...)]`.
pub(crate) fn ownership_mode(annotations: &[Annotation]) -> Option<String> {
    annotations
        .iter()
        .find(|a| annotations::from_str(&a.name) == Some(AnnotationId::Ownership))
        .and_then(super::annotations::single_word)
}
