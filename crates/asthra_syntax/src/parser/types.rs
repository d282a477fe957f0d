/// Type parsing.
///
/// Primitive names, `[]T`, `[N]T`, `*mut T`/`*const T`, `Result<T, E>`, `Option<T>`, `TaskHandle<T>`, tuples with
/// at least two elements, and named types with optional type arguments.
impl<'a> Parser<'a> {
    // ========================================================================
    // Types
    // ========================================================================

    fn type_(&mut self) -> Result<Spanned<Type>, CompileError> {
        self.nested(|p| p.type_body())
    }

    fn type_body(&mut self) -> Result<Spanned<Type>, CompileError> {
        let start = self.current_span();

        if let TokenKind::Primitive(id) = self.peek().kind {
            self.advance();
            return Ok(Spanned::new(Type::Primitive(id), start));
        }

        // [N]T or []T
        if self.match_punct(PunctuationId::LBracket) {
            if self.match_punct(PunctuationId::RBracket) {
                let elem = self.type_()?;
                return Ok(Spanned::new(Type::Slice(Box::new(elem)), self.span_since(start)));
            }
            let size = self.with_struct_literals(true, |p| p.expression())?;
            self.expect_punct(PunctuationId::RBracket, "']' after array size")?;
            let elem = self.type_()?;
            return Ok(Spanned::new(
                Type::FixedArray(Box::new(elem), Box::new(size)),
                self.span_since(start),
            ));
        }

        // *mut T / *const T
        if self.match_op(OperatorId::Star) {
            let mutability = if self.match_keyword(KeywordId::Mut) {
                PointerMutability::Mut
            } else if self.match_keyword(KeywordId::Const) {
                PointerMutability::Const
            } else {
                return Err(self.expected("'mut' or 'const' after '*' in pointer type"));
            };
            let inner = self.type_()?;
            return Ok(Spanned::new(
                Type::Pointer(mutability, Box::new(inner)),
                self.span_since(start),
            ));
        }

        // (A, B, ...)
        if self.match_punct(PunctuationId::LParen) {
            if self.check_punct(PunctuationId::RParen) {
                self.advance();
                return Err(CompileError::syntax("'()' is not a type", self.span_since(start))
                    .with_hint("Use 'void' for the empty type"));
            }
            let mut elems = vec![self.type_()?];
            while self.match_punct(PunctuationId::Comma) {
                elems.push(self.type_()?);
            }
            self.expect_punct(PunctuationId::RParen, "')' after tuple type")?;
            if elems.len() < 2 {
                return Err(CompileError::syntax("Tuple types need at least two elements", self.span_since(start))
                    .with_hint("Remove the parentheses for a single type"));
            }
            return Ok(Spanned::new(Type::Tuple(elems), self.span_since(start)));
        }

        if self.match_keyword(KeywordId::Result) {
            self.expect_op(OperatorId::Lt, "'<' after Result")?;
            let ok = self.type_()?;
            self.expect_punct(PunctuationId::Comma, "',' between Result type arguments")?;
            let err = self.type_()?;
            self.expect_closing_angle()?;
            return Ok(Spanned::new(
                Type::Result(Box::new(ok), Box::new(err)),
                self.span_since(start),
            ));
        }

        if self.match_keyword(KeywordId::Option) {
            let inner = self.single_type_arg("Option")?;
            return Ok(Spanned::new(Type::Option(Box::new(inner)), self.span_since(start)));
        }

        if self.match_keyword(KeywordId::TaskHandle) {
            let inner = self.single_type_arg("TaskHandle")?;
            return Ok(Spanned::new(Type::TaskHandle(Box::new(inner)), self.span_since(start)));
        }

        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            let args = if self.check_op(OperatorId::Lt) {
                self.type_args()?
            } else {
                Vec::new()
            };
            return Ok(Spanned::new(Type::Named(name, args), self.span_since(start)));
        }

        Err(self.expected("type"))
    }

    fn single_type_arg(&mut self, wrapper: &str) -> Result<Spanned<Type>, CompileError> {
        self.expect_op(OperatorId::Lt, &format!("'<' after {}", wrapper))?;
        let inner = self.type_()?;
        self.expect_closing_angle()?;
        Ok(inner)
    }

    /// Parse `<T, U>` type arguments; the current token must be `<`.
    fn type_args(&mut self) -> Result<Vec<Spanned<Type>>, CompileError> {
        self.expect_op(OperatorId::Lt, "'<'")?;
        let mut args = vec![self.type_()?];
        while self.match_punct(PunctuationId::Comma) {
            args.push(self.type_()?);
        }
        self.expect_closing_angle()?;
        Ok(args)
    }
}
