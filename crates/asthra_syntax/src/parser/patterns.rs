/// Pattern parsing for `match` arms and `if let`.
///
/// ## Notes
/// - Enum variants are written `Enum.Variant`; `Enum::Variant` is reported with a hint and parsed as if `.` had been
///   written.
/// - `(p)` is grouping; tuple patterns need at least two elements.
impl<'a> Parser<'a> {
    // ========================================================================
    // Patterns
    // ========================================================================

    fn pattern(&mut self) -> Result<Spanned<Pattern>, CompileError> {
        self.nested(|p| p.pattern_body())
    }

    fn pattern_body(&mut self) -> Result<Spanned<Pattern>, CompileError> {
        let start = self.current_span();

        let literal = match &self.peek().kind {
            TokenKind::Int { value, .. } => Some(Literal::Int(*value)),
            TokenKind::String { value, .. } => Some(Literal::String(value.clone())),
            TokenKind::Char(c) => Some(Literal::Char(*c)),
            TokenKind::Keyword(KeywordId::True) => Some(Literal::Bool(true)),
            TokenKind::Keyword(KeywordId::False) => Some(Literal::Bool(false)),
            TokenKind::Float(_) => {
                return Err(CompileError::syntax("Float literals cannot be used as patterns", start));
            }
            _ => None,
        };
        if let Some(literal) = literal {
            self.advance();
            return Ok(Spanned::new(Pattern::Literal(literal), start));
        }

        if self.match_keyword(KeywordId::Mut) {
            let name = self.identifier()?;
            return Ok(Spanned::new(Pattern::Binding { name, mutable: true }, self.span_since(start)));
        }

        if self.match_punct(PunctuationId::LParen) {
            let first = self.pattern()?;
            if !self.match_punct(PunctuationId::Comma) {
                self.expect_punct(PunctuationId::RParen, "')' after pattern")?;
                return Ok(first);
            }
            let mut elems = vec![first, self.pattern()?];
            while self.match_punct(PunctuationId::Comma) {
                elems.push(self.pattern()?);
            }
            self.expect_punct(PunctuationId::RParen, "')' after tuple pattern")?;
            return Ok(Spanned::new(Pattern::Tuple(elems), self.span_since(start)));
        }

        let head = if self.check_keyword(KeywordId::Result) || self.check_keyword(KeywordId::Option) {
            Some(self.peek().lexeme.clone())
        } else if let TokenKind::Ident(name) = &self.peek().kind {
            Some(name.clone())
        } else {
            None
        };
        let Some(head) = head else {
            return Err(self.expected("pattern"));
        };
        self.advance();

        if head == "_" {
            return Ok(Spanned::new(Pattern::Wildcard, start));
        }

        if self.check_punct(PunctuationId::ColonColon) {
            let span = self.advance().span;
            self.report(
                CompileError::syntax(format!("'{}::' is not valid in a pattern", head), span)
                    .with_hint("Use '.' instead of '::' for enum variants"),
            );
            return self.variant_pattern(head, start);
        }

        if self.match_punct(PunctuationId::Dot) {
            return self.variant_pattern(head, start);
        }

        if matches!(head.as_str(), "Result" | "Option") {
            return Err(self.expected(&format!("'.' and a variant after '{}'", head)));
        }

        Ok(Spanned::new(
            Pattern::Binding {
                name: head,
                mutable: false,
            },
            start,
        ))
    }

    /// `Variant`, `Variant(none)`, or `Variant(p, ...)` after `Enum.`.
    fn variant_pattern(&mut self, enum_name: Ident, start: Span) -> Result<Spanned<Pattern>, CompileError> {
        let variant = self.identifier()?;

        let mut args = Vec::new();
        if self.match_punct(PunctuationId::LParen) {
            if self.match_keyword(KeywordId::None) {
                // explicitly empty
            } else if self.check_punct(PunctuationId::RParen) {
                self.report(errors::empty_without_none("pattern argument lists", self.current_span()));
            } else {
                args.push(self.pattern()?);
                while self.match_punct(PunctuationId::Comma) {
                    args.push(self.pattern()?);
                }
            }
            self.expect_punct(PunctuationId::RParen, "')' after pattern arguments")?;
        }

        Ok(Spanned::new(
            Pattern::EnumVariant {
                enum_name,
                variant,
                args,
            },
            self.span_since(start),
        ))
    }
}
