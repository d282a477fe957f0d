//! Annotation validation.
//!
//! Each recognised annotation is checked for placement (the registry's target list), argument shape, and mutual
//! exclusion within its category. Unrecognised names are semantic tags and pass through unchecked.
//!
//! Two annotations also constrain the code they mark: a `#[constant_time]` body may not branch, loop, divide by or
//! index with a non-literal, and an `#[ownership]` binding must be initialised by an allocating expression.

use asthra_core::lang::annotations::{self, AnnotationCategory, AnnotationId, AnnotationTarget, ArgumentForm};

use crate::frontend::ast::{
    self, Annotation, AnnotationArgs, AnnotationValue, BinaryOp, Block, Expr, LetStmt, Literal, Spanned, Statement,
    Visitor,
};
use crate::frontend::diagnostics::{CompileError, ErrorKind, errors};
use crate::frontend::symbols::ResolvedType;

use super::Analyzer;

impl Analyzer<'_> {
    /// Validate the annotations written on one target.
    ///
    /// `ty` is the annotated parameter's type, needed for `#[borrowed]`.
    pub(crate) fn validate_annotations(
        &mut self,
        list: &[Annotation],
        target: AnnotationTarget,
        ty: Option<&ResolvedType>,
    ) {
        let known: Vec<(AnnotationId, &Annotation)> = list
            .iter()
            .filter_map(|a| annotations::from_str(&a.name).map(|id| (id, a)))
            .collect();

        // One diagnostic per conflicting group; its members skip the remaining checks.
        let mut conflicted: Vec<&Annotation> = Vec::new();
        for category in [AnnotationCategory::FfiTransfer, AnnotationCategory::Ownership] {
            let group: Vec<&Annotation> = known
                .iter()
                .filter(|(id, _)| annotations::info_for(*id).category == category)
                .map(|(_, a)| *a)
                .collect();
            if let [first, second, ..] = group.as_slice() {
                let error = if category == AnnotationCategory::Ownership {
                    errors::conflicting_ownership(
                        &single_word(first).unwrap_or_else(|| first.name.clone()),
                        &single_word(second).unwrap_or_else(|| second.name.clone()),
                        second.span,
                    )
                } else {
                    errors::conflicting_ffi_annotations(&first.name, &second.name, second.span)
                };
                self.report(error);
                conflicted.extend(group);
            }
        }

        for (id, annotation) in known {
            if conflicted.iter().any(|c| std::ptr::eq(*c, annotation)) {
                continue;
            }
            let info = annotations::info_for(id);

            if !annotations::allowed_on(id, target) {
                let error = if id == AnnotationId::Borrowed && target == AnnotationTarget::ExternReturn {
                    errors::borrowed_on_return(annotation.span)
                } else {
                    errors::misplaced_annotation(&annotation.name, target.describe(), annotation.span)
                };
                self.report(error);
                continue;
            }

            match info.arguments {
                ArgumentForm::Flag if !takes_no_arguments(annotation) => {
                    self.report(CompileError::new(
                        ErrorKind::AnnotationConflict,
                        format!("Annotation '#[{}]' takes no arguments", annotation.name),
                        annotation.span,
                    ));
                }
                ArgumentForm::OneOf(allowed) => {
                    let valid = single_word(annotation).is_some_and(|word| allowed.contains(&word.as_str()));
                    if !valid {
                        self.report(errors::invalid_annotation_argument(&annotation.name, allowed, annotation.span));
                    }
                }
                _ => {}
            }

            if id == AnnotationId::Borrowed {
                if let Some(ty) = ty {
                    if !matches!(ty, ResolvedType::Pointer(..) | ResolvedType::Unknown) {
                        self.report(errors::borrowed_requires_pointer(&ty.to_string(), annotation.span));
                    }
                }
            }
        }
    }
}

impl Analyzer<'_> {
    /// Report every data-dependent branch or memory access in a `#[constant_time]` body.
    pub(crate) fn check_constant_time_body(&mut self, list: &[Annotation], body: &Block) {
        if !has_annotation(list, AnnotationId::ConstantTime) {
            return;
        }
        let mut scan = ConstantTimeScan::default();
        ast::walk_block(&mut scan, body);
        for error in scan.violations {
            self.report(error);
        }
    }

    pub(crate) fn check_binding_ownership(&mut self, l: &LetStmt) {
        let Some(annotation) = l
            .annotations
            .iter()
            .find(|a| annotations::from_str(&a.name) == Some(AnnotationId::Ownership))
        else {
            return;
        };
        if !allocates(&l.value.node) {
            self.report(errors::ownership_without_allocation(&l.name.node, annotation.span));
        }
    }
}

#[derive(Default)]
struct ConstantTimeScan {
    violations: Vec<CompileError>,
}

impl Visitor for ConstantTimeScan {
    fn visit_statement(&mut self, stmt: &Spanned<Statement>) {
        let construct = match &stmt.node {
            Statement::If(_) => "An 'if' statement",
            Statement::IfLet(_) => "An 'if let' statement",
            Statement::Match(_) => "A 'match' statement",
            Statement::For(_) => "A 'for' loop",
            _ => return ast::walk_statement(self, stmt),
        };
        // The branch bodies are not scanned; the construct itself is the violation.
        self.violations.push(errors::constant_time_violation(construct, stmt.span));
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) {
        let construct = match &expr.node {
            Expr::Binary(_, BinaryOp::Div, rhs) if !is_literal(&rhs.node) => Some("Division by a non-constant value"),
            Expr::Binary(_, BinaryOp::Mod, rhs) if !is_literal(&rhs.node) => Some("Modulo by a non-constant value"),
            Expr::Index(_, index) if !is_literal(&index.node) => Some("Indexing with a non-constant index"),
            _ => None,
        };
        if let Some(construct) = construct {
            self.violations.push(errors::constant_time_violation(construct, expr.span));
        }
        ast::walk_expr(self, expr);
    }
}

fn is_literal(expr: &Expr) -> bool {
    match expr {
        Expr::Literal(Literal::Int(_) | Literal::Float(_)) => true,
        Expr::Paren(inner) => is_literal(&inner.node),
        _ => false,
    }
}

/// Whether evaluating `expr` produces a fresh allocation an ownership strategy can apply to.
fn allocates(expr: &Expr) -> bool {
    match expr {
        Expr::Literal(literal) => matches!(literal, Literal::String(_)),
        Expr::Paren(inner) => allocates(&inner.node),
        Expr::Call(..)
        | Expr::AssociatedCall(_)
        | Expr::EnumConstructor(_)
        | Expr::StructLiteral(_)
        | Expr::Tuple(_)
        | Expr::Array(_)
        | Expr::ArrayRepeat(..)
        | Expr::Slice(..)
        | Expr::Await(_) => true,
        Expr::Ident(_)
        | Expr::SelfExpr
        | Expr::Binary(..)
        | Expr::Unary(..)
        | Expr::Field(..)
        | Expr::TupleIndex(..)
        | Expr::Index(..)
        | Expr::Sizeof(_) => false,
    }
}

fn has_annotation(list: &[Annotation], id: AnnotationId) -> bool {
    list.iter().any(|a| annotations::from_str(&a.name) == Some(id))
}

fn takes_no_arguments(annotation: &Annotation) -> bool {
    match &annotation.args {
        AnnotationArgs::Empty => true,
        AnnotationArgs::Values(values) => values.is_empty(),
        AnnotationArgs::Named(pairs) => pairs.is_empty(),
    }
}

/// The single word argument of `#[name(word)]` or `#[name(key = word)]`.
pub(crate) fn single_word(annotation: &Annotation) -> Option<String> {
    match &annotation.args {
        AnnotationArgs::Values(values) if values.len() == 1 => annotation.first_word(),
        AnnotationArgs::Named(pairs) if pairs.len() == 1 => Some(match &pairs[0].1 {
            AnnotationValue::Str(s) => s.clone(),
            other => other.to_string(),
        }),
        _ => None,
    }
}
