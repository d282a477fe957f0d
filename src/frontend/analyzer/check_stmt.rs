//! Statement checking: bindings, assignments, control flow, concurrency statements.

use crate::frontend::ast::*;
use crate::frontend::diagnostics::{CompileError, ErrorKind, errors};
use crate::frontend::symbols::*;

use asthra_core::lang::annotations::AnnotationTarget;

use super::Analyzer;

/// Why a place expression is being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlaceUse {
    Assign,
    /// Operand of `&mut`.
    BorrowMut,
}

/// What an assignment target ultimately writes to.
enum PlaceRoot<'e> {
    Binding(&'e str),
    SelfValue,
    /// Through the pointer computed by this expression.
    Deref(&'e Spanned<Expr>),
    Invalid,
}

impl Analyzer<'_> {
    // ========================================================================
    // Statements
    // ========================================================================

    /// Check statements in the current scope.
    pub(crate) fn check_statements(&mut self, block: &Block) {
        for stmt in block {
            self.check_statement(stmt);
        }
    }

    /// Check a block in a fresh child scope.
    pub(crate) fn check_block(&mut self, block: &Block, kind: ScopeKind) {
        self.symbols.enter_scope(kind);
        self.check_statements(block);
        self.symbols.exit_scope();
    }

    pub(crate) fn check_statement(&mut self, stmt: &Spanned<Statement>) {
        match &stmt.node {
            Statement::Let(l) => self.check_let(l),
            Statement::Assign(assign) => self.check_assign(assign, stmt.span),
            Statement::Return(expr) => self.check_return(expr),
            Statement::If(if_stmt) => {
                self.check_condition(&if_stmt.condition);
                self.check_block(&if_stmt.then_block, ScopeKind::Block);
                self.check_else(&if_stmt.else_branch);
            }
            Statement::IfLet(if_let) => {
                let value_ty = self.check_expr(&if_let.value, None);
                self.symbols.enter_scope(ScopeKind::Block);
                self.check_pattern(&if_let.pattern, &value_ty);
                self.check_statements(&if_let.then_block);
                self.symbols.exit_scope();
                self.check_else(&if_let.else_branch);
            }
            Statement::For(for_stmt) => self.check_for(for_stmt),
            Statement::Match(match_stmt) => self.check_match(match_stmt, stmt.span),
            Statement::Spawn(call) => {
                if !is_call(&call.node) {
                    self.report(errors::spawn_requires_call(call.span));
                }
                // Any return type is accepted; the spawned task's result is discarded.
                self.check_expr(call, None);
            }
            Statement::SpawnWithHandle(spawn) => {
                if !is_call(&spawn.call.node) {
                    self.report(errors::spawn_requires_call(spawn.call.span));
                }
                let result = self.check_expr(&spawn.call, None);
                self.define_variable(
                    &spawn.handle.node,
                    ResolvedType::TaskHandle(Box::new(result)),
                    false,
                    BindingOrigin::TaskHandle,
                    spawn.handle.span,
                    true,
                );
            }
            Statement::Unsafe(block) => self.check_block(block, ScopeKind::Unsafe),
            Statement::Block(block) => self.check_block(block, ScopeKind::Block),
            Statement::Break | Statement::Continue => {
                if !self.symbols.inside(ScopeKind::Loop) {
                    let keyword = if matches!(stmt.node, Statement::Break) { "break" } else { "continue" };
                    self.report(CompileError::type_error(format!("'{}' outside of a loop", keyword), stmt.span));
                }
            }
            Statement::Expr(expr) => {
                self.check_expr(expr, None);
            }
        }
    }

    fn check_let(&mut self, l: &LetStmt) {
        let ty = self.resolve_type(&l.ty);
        let value_ty = self.check_expr(&l.value, Some(&ty));
        self.expect_type(&ty, &value_ty, l.value.span);
        self.validate_annotations(&l.annotations, AnnotationTarget::Variable, None);
        self.check_binding_ownership(l);
        self.define_variable(&l.name.node, ty, l.mutable, BindingOrigin::Let, l.name.span, true);
    }

    fn check_assign(&mut self, assign: &AssignStmt, span: Span) {
        let target_ty = self.check_expr(&assign.target, None);
        let value_ty = self.check_expr(&assign.value, Some(&target_ty));
        self.expect_type(&target_ty, &value_ty, assign.value.span);
        self.check_place(&assign.target, span, PlaceUse::Assign);
    }

    fn check_return(&mut self, expr: &Spanned<Expr>) {
        let expected = match &self.current_fn {
            Some(ctx) => ctx.return_type.clone(),
            None => ResolvedType::Unknown,
        };
        let actual = self.check_expr(expr, Some(&expected));
        if !is_assignable(&actual, &expected) {
            let name = self.current_fn.as_ref().map(|c| c.name.clone()).unwrap_or_default();
            self.report(
                errors::type_mismatch(&expected.to_string(), &actual.to_string(), expr.span)
                    .with_note(format!("'{}' is declared to return '{}'", name, expected)),
            );
        }
    }

    fn check_condition(&mut self, condition: &Spanned<Expr>) {
        let ty = self.check_expr(condition, Some(&ResolvedType::BOOL));
        if !is_assignable(&ty, &ResolvedType::BOOL) {
            self.report(
                errors::type_mismatch("bool", &ty.to_string(), condition.span)
                    .with_note("Conditions are never converted to bool implicitly"),
            );
        }
    }

    fn check_else(&mut self, branch: &Option<ElseBranch>) {
        match branch {
            Some(ElseBranch::Block(block)) => self.check_block(block, ScopeKind::Block),
            Some(ElseBranch::If(stmt)) => self.check_statement(stmt),
            None => {}
        }
    }

    fn check_for(&mut self, for_stmt: &ForStmt) {
        let iterable = self.check_expr(&for_stmt.iterable, None);
        let binding_ty = match &iterable {
            ResolvedType::Slice(elem) | ResolvedType::FixedArray(elem, _) => (**elem).clone(),
            ResolvedType::InfiniteIterator => ResolvedType::USIZE,
            ResolvedType::Unknown => ResolvedType::Unknown,
            other => {
                self.report(
                    CompileError::type_error(format!("Cannot iterate over '{}'", other), for_stmt.iterable.span)
                        .with_hint("'for' loops iterate slices, fixed arrays, and infinite()"),
                );
                ResolvedType::Unknown
            }
        };

        self.symbols.enter_scope(ScopeKind::Loop);
        self.define_variable(
            &for_stmt.binding.node,
            binding_ty,
            false,
            BindingOrigin::ForLoop,
            for_stmt.binding.span,
            true,
        );
        self.check_statements(&for_stmt.body);
        self.symbols.exit_scope();
    }

    fn check_match(&mut self, m: &MatchStmt, span: Span) {
        let scrutinee = self.check_expr(&m.scrutinee, None);
        let mut patterns_ok = true;
        for arm in &m.arms {
            let before = self.errors.len() + self.suppressed;
            self.symbols.enter_scope(ScopeKind::Block);
            self.check_pattern(&arm.node.pattern, &scrutinee);
            patterns_ok &= self.errors.len() + self.suppressed == before;
            match &arm.node.body {
                MatchBody::Block(block) => self.check_statements(block),
                MatchBody::Expr(expr) => {
                    self.check_expr(expr, None);
                }
            }
            self.symbols.exit_scope();
        }
        if patterns_ok && !scrutinee.is_unknown() {
            self.check_match_coverage(&m.arms, &scrutinee, span);
        }
    }

    pub(crate) fn expect_type(&mut self, expected: &ResolvedType, actual: &ResolvedType, span: Span) {
        if !is_assignable(actual, expected) {
            self.report(errors::type_mismatch(&expected.to_string(), &actual.to_string(), span));
        }
    }

    // ========================================================================
    // Places
    // ========================================================================

    /// Check that `target` denotes writable memory. `span` is where a violation is reported.
    pub(crate) fn check_place(&mut self, target: &Spanned<Expr>, span: Span, usage: PlaceUse) {
        match place_root(target) {
            PlaceRoot::Binding(name) => self.check_binding_place(name, span, usage),
            PlaceRoot::SelfValue => {
                let error = match usage {
                    PlaceUse::Assign => errors::assign_to_self(span),
                    PlaceUse::BorrowMut => CompileError::new(
                        ErrorKind::Mutability,
                        "Cannot take a mutable pointer to 'self' or its fields",
                        span,
                    )
                    .with_note("Method receivers are immutable"),
                };
                self.report(error);
            }
            PlaceRoot::Deref(pointer) => {
                if let Some(ResolvedType::Pointer(PointerMutability::Const, _)) = self.info.expr_type(pointer.span) {
                    self.report(errors::assign_through_const_pointer(span));
                }
            }
            PlaceRoot::Invalid => self.report(errors::invalid_assignment_target(span)),
        }
    }

    fn check_binding_place(&mut self, name: &str, span: Span, usage: PlaceUse) {
        // Unknown names were reported while checking the target expression.
        let Some((_, kind)) = self.symbol_kind(name) else {
            return;
        };
        let error = match kind {
            SymbolKind::Variable(var) => match (var.origin, var.mutable, usage) {
                (BindingOrigin::SelfParam, _, PlaceUse::Assign) => Some(errors::assign_to_self(span)),
                (BindingOrigin::Param, _, PlaceUse::Assign) => Some(errors::assign_to_param(name, span)),
                (_, false, PlaceUse::Assign) => Some(errors::mutation_without_mut(name, span)),
                (_, false, PlaceUse::BorrowMut) => Some(
                    CompileError::new(
                        ErrorKind::Mutability,
                        format!("Cannot take a mutable pointer to immutable binding '{}'", name),
                        span,
                    )
                    .with_hint(format!("Declare with 'mut' to allow mutation: let mut {}: ...", name)),
                ),
                _ => None,
            },
            SymbolKind::Const(_) => Some(CompileError::new(
                ErrorKind::Mutability,
                format!("Cannot assign to constant '{}'", name),
                span,
            )),
            _ => Some(errors::invalid_assignment_target(span)),
        };
        if let Some(error) = error {
            self.report(error);
        }
    }

    // ========================================================================
    // Return analysis
    // ========================================================================

    /// Whether every path through `block` ends in `return` or a `Never` expression.
    pub(crate) fn block_returns(&self, block: &Block) -> bool {
        block.iter().any(|stmt| self.statement_returns(stmt))
    }

    fn statement_returns(&self, stmt: &Spanned<Statement>) -> bool {
        let else_returns = |branch: &Option<ElseBranch>| match branch {
            Some(ElseBranch::Block(block)) => self.block_returns(block),
            Some(ElseBranch::If(stmt)) => self.statement_returns(stmt),
            None => false,
        };
        match &stmt.node {
            Statement::Return(_) => true,
            Statement::Expr(expr) => self.info.expr_type(expr.span).is_some_and(ResolvedType::is_never),
            Statement::If(i) => self.block_returns(&i.then_block) && else_returns(&i.else_branch),
            Statement::IfLet(i) => self.block_returns(&i.then_block) && else_returns(&i.else_branch),
            Statement::Match(m) => {
                !m.arms.is_empty()
                    && m.arms.iter().all(|arm| match &arm.node.body {
                        MatchBody::Block(block) => self.block_returns(block),
                        MatchBody::Expr(expr) => self.info.expr_type(expr.span).is_some_and(ResolvedType::is_never),
                    })
            }
            Statement::Unsafe(block) | Statement::Block(block) => self.block_returns(block),
            _ => false,
        }
    }
}

fn place_root(expr: &Spanned<Expr>) -> PlaceRoot<'_> {
    match &expr.node {
        Expr::Ident(name) => PlaceRoot::Binding(name),
        Expr::SelfExpr => PlaceRoot::SelfValue,
        // `p.x` parses as a dotted pair; as a place it is a field of `p`.
        Expr::EnumConstructor(ctor) if ctor.args.is_none() => PlaceRoot::Binding(&ctor.head.node),
        Expr::Field(base, _) | Expr::TupleIndex(base, _) | Expr::Index(base, _) | Expr::Paren(base) => place_root(base),
        Expr::Unary(
            UnaryPrefix {
                logical: None,
                pointer: Some(PointerPrefix::Deref),
            },
            pointer,
        ) => PlaceRoot::Deref(pointer),
        _ => PlaceRoot::Invalid,
    }
}

fn is_call(expr: &Expr) -> bool {
    match expr {
        Expr::Call(..) | Expr::AssociatedCall(_) => true,
        Expr::EnumConstructor(ctor) => ctor.args.is_some(),
        _ => false,
    }
}
