/// Token-stream helpers and error recovery.
///
/// This chunk contains the low-level primitives used throughout parsing:
/// - Peeking/consuming tokens (`peek`, `advance`, `previous`)
/// - Matching / expecting keywords, operators, and punctuation
/// - Closing `>` handling for nested type arguments (`>>`)
/// - Error recovery (`synchronize_statement`, `synchronize_declaration`)
impl<'a> Parser<'a> {
    // ========================================================================
    // Helpers
    // ========================================================================

    /// Return `true` if the current token is [`TokenKind::Eof`].
    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    /// Return the current token without consuming it.
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    /// Return the token `n` positions ahead of the current one.
    fn peek_at(&self, n: usize) -> &Token {
        self.tokens.get(self.pos + n).unwrap_or(&self.eof)
    }

    /// Return the token after the current token without consuming it.
    fn peek_next(&self) -> &Token {
        self.peek_at(1)
    }

    /// Return the most recently consumed token.
    fn previous(&self) -> &Token {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .unwrap_or(&self.eof)
    }

    /// Advance to the next token and return the token we just consumed.
    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.pos += 1;
        }
        self.previous()
    }

    /// Return `true` if the current token is the given keyword.
    fn check_keyword(&self, id: KeywordId) -> bool {
        self.peek().kind.is_keyword(id)
    }

    /// Return `true` if the current token is the given punctuation.
    fn check_punct(&self, id: PunctuationId) -> bool {
        self.peek().kind.is_punctuation(id)
    }

    /// Return `true` if the current token is the given operator.
    fn check_op(&self, id: OperatorId) -> bool {
        self.peek().kind.is_operator(id)
    }

    fn check_primitive(&self, id: PrimitiveId) -> bool {
        matches!(self.peek().kind, TokenKind::Primitive(p) if p == id)
    }

    fn match_keyword(&mut self, id: KeywordId) -> bool {
        if self.check_keyword(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_punct(&mut self, id: PunctuationId) -> bool {
        if self.check_punct(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_op(&mut self, id: OperatorId) -> bool {
        if self.check_op(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Build an "Expected X, found Y" error at the current token.
    fn expected(&self, what: &str) -> CompileError {
        errors::expected_token(what, &self.peek().kind.describe(), self.current_span())
    }

    fn expect_keyword(&mut self, id: KeywordId, what: &str) -> Result<Span, CompileError> {
        if self.check_keyword(id) {
            Ok(self.advance().span)
        } else {
            Err(self.expected(what))
        }
    }

    fn expect_punct(&mut self, id: PunctuationId, what: &str) -> Result<Span, CompileError> {
        if self.check_punct(id) {
            Ok(self.advance().span)
        } else {
            Err(self.expected(what))
        }
    }

    fn expect_op(&mut self, id: OperatorId, what: &str) -> Result<Span, CompileError> {
        if self.check_op(id) {
            Ok(self.advance().span)
        } else {
            Err(self.expected(what))
        }
    }

    /// Consume one closing `>` of a type-argument list.
    ///
    /// A `>>` token closes two nested lists: the first call marks it half-consumed, the second call consumes it.
    fn expect_closing_angle(&mut self) -> Result<(), CompileError> {
        if self.split_gt {
            self.split_gt = false;
            self.advance();
            return Ok(());
        }
        if self.match_op(OperatorId::Gt) {
            return Ok(());
        }
        if self.check_op(OperatorId::Shr) {
            self.split_gt = true;
            return Ok(());
        }
        Err(self.expected("'>'"))
    }

    fn current_span(&self) -> Span {
        self.peek().span
    }

    /// Span from `start` through the most recently consumed token.
    fn span_since(&self, start: Span) -> Span {
        let end = self.previous().span;
        if end.end < start.start {
            start
        } else {
            start.merge(end)
        }
    }

    /// Run a recursive production one nesting level deeper.
    ///
    /// At the limit the bracketed group starting here is skipped whole and the production fails.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, CompileError>) -> Result<T, CompileError> {
        if self.depth >= MAX_NESTING_DEPTH {
            let span = self.current_span();
            self.skip_bracketed_group();
            return Err(errors::nesting_too_deep(MAX_NESTING_DEPTH, span));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Record a recoverable error and keep parsing.
    fn report(&mut self, error: CompileError) {
        if errors::is_nesting_too_deep(&error) {
            if self.too_deep {
                return;
            }
            self.too_deep = true;
        }
        self.errors.push(error);
    }

    // ========================================================================
    // Error recovery
    // ========================================================================

    /// Guarantee forward progress after recovery so a stuck token cannot loop forever.
    fn ensure_progress(&mut self, before: usize) {
        if self.pos == before {
            self.advance();
        }
    }

    /// Skip to the next statement boundary: past a `;`, or before a `}` or statement/declaration keyword.
    fn synchronize_statement(&mut self) {
        self.split_gt = false;
        while !self.is_at_end() {
            if self.match_punct(PunctuationId::Semicolon) {
                return;
            }
            if self.check_punct(PunctuationId::RBrace) {
                return;
            }
            if let TokenKind::Keyword(id) = self.peek().kind {
                if keywords::is_sync_point(id) {
                    return;
                }
            }
            self.advance();
        }
    }

    /// Skip tokens through the bracket that closes the first one opened here.
    ///
    /// Stops without consuming at a closing bracket that belongs to an enclosing group.
    fn skip_bracketed_group(&mut self) {
        let mut open = 0usize;
        while !self.is_at_end() {
            let TokenKind::Punctuation(id) = self.peek().kind else {
                self.advance();
                continue;
            };
            match id {
                PunctuationId::LParen | PunctuationId::LBracket | PunctuationId::LBrace => open += 1,
                PunctuationId::RParen | PunctuationId::RBracket | PunctuationId::RBrace => {
                    if open == 0 {
                        return;
                    }
                    open -= 1;
                    if open == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip to the start of the next top-level declaration.
    ///
    /// Braced bodies are skipped as a unit; an unmatched `}` ends the broken item.
    fn synchronize_declaration(&mut self) {
        self.split_gt = false;
        let mut depth = 0usize;
        while !self.is_at_end() {
            if self.check_punct(PunctuationId::RBrace) {
                self.advance();
                if depth <= 1 {
                    return;
                }
                depth -= 1;
                continue;
            }
            if self.check_punct(PunctuationId::LBrace) {
                depth += 1;
            } else if depth == 0 {
                if self.match_punct(PunctuationId::Semicolon) {
                    return;
                }
                if self.check_punct(PunctuationId::Hash) || self.at_declaration_keyword() {
                    return;
                }
            }
            self.advance();
        }
    }

    /// `pub`/`priv`/`impl`/`import`; bare `fn` or `const` also occur inside types and bodies.
    fn at_declaration_keyword(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Keyword(KeywordId::Pub | KeywordId::Priv | KeywordId::Impl | KeywordId::Import)
        )
    }
}
