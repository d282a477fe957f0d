/// Statement parsing methods.
///
/// This chunk parses brace-delimited blocks and every statement form (`let`, assignment, `return`, `if`/`if let`,
/// `for`, `match`, `spawn`, `spawn_with_handle`, `unsafe`, `break`, `continue`, expression statements).
///
/// ## Notes
/// - A failed statement is reported, the parser resynchronizes at the next `;`, `}`, or statement keyword, and the
///   rest of the block is still parsed.
/// - `else` always belongs to the nearest `if`; braces make the nesting explicit.
impl<'a> Parser<'a> {
    // ========================================================================
    // Statements
    // ========================================================================

    /// Parse `{ statement* }`.
    fn block(&mut self) -> Result<Block, CompileError> {
        self.nested(|p| p.block_body())
    }

    fn block_body(&mut self) -> Result<Block, CompileError> {
        self.expect_punct(PunctuationId::LBrace, "'{' to open block")?;
        let mut stmts = Vec::new();
        while !self.check_punct(PunctuationId::RBrace) && !self.is_at_end() {
            let before = self.pos;
            match self.statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    self.report(e);
                    self.synchronize_statement();
                    self.ensure_progress_in_block(before);
                }
            }
        }
        self.expect_punct(PunctuationId::RBrace, "'}' to close block")?;
        Ok(stmts)
    }

    /// Like `ensure_progress`, but never swallows the `}` that closes the current block.
    fn ensure_progress_in_block(&mut self, before: usize) {
        if self.pos == before && !self.check_punct(PunctuationId::RBrace) {
            self.advance();
        }
    }

    fn statement(&mut self) -> Result<Spanned<Statement>, CompileError> {
        let start = self.current_span();

        let stmt = if self.check_punct(PunctuationId::Hash) || self.check_punct(PunctuationId::At) {
            let annotations = self.annotations()?;
            if !self.check_keyword(KeywordId::Let) {
                return Err(self.expected("'let' after statement annotations"));
            }
            self.let_stmt(annotations)?
        } else if self.check_keyword(KeywordId::Let) {
            self.let_stmt(Vec::new())?
        } else if self.check_keyword(KeywordId::Return) {
            self.return_stmt()?
        } else if self.check_keyword(KeywordId::If) {
            self.if_stmt()?
        } else if self.check_keyword(KeywordId::For) {
            self.for_stmt()?
        } else if self.check_keyword(KeywordId::Match) {
            self.match_stmt()?
        } else if self.check_keyword(KeywordId::Spawn) {
            self.advance();
            let call = self.expression()?;
            self.expect_punct(PunctuationId::Semicolon, "';' after spawn")?;
            Statement::Spawn(call)
        } else if self.check_keyword(KeywordId::SpawnWithHandle) {
            self.spawn_with_handle_stmt()?
        } else if self.match_keyword(KeywordId::Unsafe) {
            Statement::Unsafe(self.block()?)
        } else if self.check_punct(PunctuationId::LBrace) {
            Statement::Block(self.block()?)
        } else if self.match_keyword(KeywordId::Break) {
            self.expect_punct(PunctuationId::Semicolon, "';' after 'break'")?;
            Statement::Break
        } else if self.match_keyword(KeywordId::Continue) {
            self.expect_punct(PunctuationId::Semicolon, "';' after 'continue'")?;
            Statement::Continue
        } else {
            self.assignment_or_expr_stmt()?
        };

        Ok(Spanned::new(stmt, self.span_since(start)))
    }

    /// `let (mut)? name: Type = expr;`
    fn let_stmt(&mut self, annotations: Vec<Annotation>) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::Let, "'let'")?;
        let mutable = self.match_keyword(KeywordId::Mut);
        let name = self.identifier_spanned()?;

        if !self.check_punct(PunctuationId::Colon) {
            return Err(CompileError::syntax(
                format!("Missing type annotation for '{}'", name.node),
                self.current_span(),
            )
            .with_hint(format!("Add a type annotation: let {}: Type = value;", name.node)));
        }
        self.advance();
        let ty = self.type_()?;

        self.expect_op(OperatorId::Eq, "'=' and an initial value")?;
        let value = self.expression()?;
        self.expect_punct(PunctuationId::Semicolon, "';' after let statement")?;

        Ok(Statement::Let(LetStmt {
            annotations,
            mutable,
            name,
            ty,
            value,
        }))
    }

    fn return_stmt(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::Return, "'return'")?;
        if self.check_punct(PunctuationId::Semicolon) {
            return Err(CompileError::syntax("'return' requires a value", self.current_span())
                .with_hint("Use 'return ();' to return from a void function"));
        }
        let value = self.expression()?;
        self.expect_punct(PunctuationId::Semicolon, "';' after return value")?;
        Ok(Statement::Return(value))
    }

    fn if_stmt(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::If, "'if'")?;

        if self.match_keyword(KeywordId::Let) {
            let pattern = self.pattern()?;
            self.expect_op(OperatorId::Eq, "'=' in 'if let'")?;
            let value = self.with_struct_literals(false, |p| p.expression())?;
            let then_block = self.block()?;
            let else_branch = self.else_branch()?;
            return Ok(Statement::IfLet(IfLetStmt {
                pattern,
                value,
                then_block,
                else_branch,
            }));
        }

        let condition = self.with_struct_literals(false, |p| p.expression())?;
        let then_block = self.block()?;
        let else_branch = self.else_branch()?;
        Ok(Statement::If(IfStmt {
            condition,
            then_block,
            else_branch,
        }))
    }

    fn else_branch(&mut self) -> Result<Option<ElseBranch>, CompileError> {
        if !self.match_keyword(KeywordId::Else) {
            return Ok(None);
        }
        if self.check_keyword(KeywordId::If) {
            let start = self.current_span();
            let nested = self.nested(|p| p.if_stmt())?;
            return Ok(Some(ElseBranch::If(Box::new(Spanned::new(nested, self.span_since(start))))));
        }
        Ok(Some(ElseBranch::Block(self.block()?)))
    }

    /// `for name in expr { ... }`
    fn for_stmt(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::For, "'for'")?;
        let binding = self.identifier_spanned()?;
        self.expect_keyword(KeywordId::In, "'in' after loop variable")?;
        let iterable = self.with_struct_literals(false, |p| p.expression())?;
        let body = self.block()?;
        Ok(Statement::For(ForStmt {
            binding,
            iterable,
            body,
        }))
    }

    /// `match expr { Pattern => body, ... }`
    fn match_stmt(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::Match, "'match'")?;
        let scrutinee = self.with_struct_literals(false, |p| p.expression())?;
        self.expect_punct(PunctuationId::LBrace, "'{' to open match arms")?;

        let mut arms = Vec::new();
        while !self.check_punct(PunctuationId::RBrace) && !self.is_at_end() {
            let before = self.pos;
            match self.match_arm() {
                Ok(arm) => arms.push(arm),
                Err(e) => {
                    self.report(e);
                    self.synchronize_match_arm();
                    self.ensure_progress_in_block(before);
                }
            }
        }

        self.expect_punct(PunctuationId::RBrace, "'}' to close match")?;
        Ok(Statement::Match(MatchStmt { scrutinee, arms }))
    }

    fn match_arm(&mut self) -> Result<Spanned<MatchArm>, CompileError> {
        let start = self.current_span();
        let pattern = self.pattern()?;
        self.expect_punct(PunctuationId::FatArrow, "'=>' after match pattern")?;

        let body = if self.check_punct(PunctuationId::LBrace) {
            let block = self.block()?;
            self.match_punct(PunctuationId::Comma);
            MatchBody::Block(block)
        } else {
            let expr = self.expression()?;
            if !self.match_punct(PunctuationId::Comma) && !self.check_punct(PunctuationId::RBrace) {
                return Err(self.expected("',' or '}' after match arm"));
            }
            MatchBody::Expr(expr)
        };

        Ok(Spanned::new(MatchArm { pattern, body }, self.span_since(start)))
    }

    /// Skip to the next arm: past a `,` or a braced arm body, or before the closing `}`.
    fn synchronize_match_arm(&mut self) {
        let mut depth = 0usize;
        while !self.is_at_end() {
            if self.check_punct(PunctuationId::LBrace) {
                depth += 1;
            } else if self.check_punct(PunctuationId::RBrace) {
                if depth == 0 {
                    return;
                }
                depth -= 1;
                self.advance();
                if depth == 0 {
                    self.match_punct(PunctuationId::Comma);
                    return;
                }
                continue;
            } else if depth == 0 && self.match_punct(PunctuationId::Comma) {
                return;
            }
            self.advance();
        }
    }

    /// `spawn_with_handle name = call;`
    fn spawn_with_handle_stmt(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::SpawnWithHandle, "'spawn_with_handle'")?;
        let handle = self.identifier_spanned()?;
        self.expect_op(OperatorId::Eq, "'=' after handle name")?;
        let call = self.expression()?;
        self.expect_punct(PunctuationId::Semicolon, "';' after spawn_with_handle")?;
        Ok(Statement::SpawnWithHandle(SpawnWithHandleStmt { handle, call }))
    }

    fn assignment_or_expr_stmt(&mut self) -> Result<Statement, CompileError> {
        let expr = self.expression()?;

        if self.match_op(OperatorId::Eq) {
            let value = self.expression()?;
            self.expect_punct(PunctuationId::Semicolon, "';' after assignment")?;
            return Ok(Statement::Assign(AssignStmt { target: expr, value }));
        }

        self.expect_punct(PunctuationId::Semicolon, "';' after expression")?;
        Ok(Statement::Expr(expr))
    }
}
