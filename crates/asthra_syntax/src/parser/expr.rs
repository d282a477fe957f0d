/// Expression parsing methods.
///
/// Binary operators are parsed by precedence climbing over the tiers in `asthra_core::lang::operators`:
/// `||` → `&&` → `| ^ &` → `== !=` → `< <= > >=` → `<< >>` → `+ -` → `* / %`, then the unary prefix tier and the
/// postfix tier (call, field, tuple index, index/slice), then primaries.
///
/// ## Notes
/// - A unary expression carries at most one logical prefix (`!`, `-`, `~`) followed by at most one pointer prefix
///   (`*`, `&`, `&mut`). Repeats such as `!!x` or `**p` are syntax errors.
/// - `Name::f(..)` and `Name<T>::f(..)` are associated calls; `Name<T>` is only taken as type arguments when a `::`
///   or a struct-literal body follows, otherwise `<` is a comparison.
/// - `Ident.Ident` (optionally with arguments) is parsed as enum construction.
impl<'a> Parser<'a> {
    // ========================================================================
    // Expressions
    // ========================================================================

    fn expression(&mut self) -> Result<Spanned<Expr>, CompileError> {
        self.binary_expr(1)
    }

    /// Map the current token to a binary operator, if it is one.
    fn peek_binary_op(&self) -> Option<(OperatorId, BinaryOp)> {
        let id = self.peek().kind.operator_id()?;
        let op = match id {
            OperatorId::OrOr => BinaryOp::Or,
            OperatorId::AndAnd => BinaryOp::And,
            OperatorId::Pipe => BinaryOp::BitOr,
            OperatorId::Caret => BinaryOp::BitXor,
            OperatorId::Amp => BinaryOp::BitAnd,
            OperatorId::EqEq => BinaryOp::Eq,
            OperatorId::NotEq => BinaryOp::NotEq,
            OperatorId::Lt => BinaryOp::Lt,
            OperatorId::LtEq => BinaryOp::LtEq,
            OperatorId::Gt => BinaryOp::Gt,
            OperatorId::GtEq => BinaryOp::GtEq,
            OperatorId::Shl => BinaryOp::Shl,
            OperatorId::Shr => BinaryOp::Shr,
            OperatorId::Plus => BinaryOp::Add,
            OperatorId::Minus => BinaryOp::Sub,
            OperatorId::Star => BinaryOp::Mul,
            OperatorId::Slash => BinaryOp::Div,
            OperatorId::Percent => BinaryOp::Mod,
            OperatorId::Eq | OperatorId::Bang | OperatorId::Tilde => return None,
        };
        Some((id, op))
    }

    /// Left-associative precedence climbing; `min_prec` is the lowest tier this call may consume.
    fn binary_expr(&mut self, min_prec: u8) -> Result<Spanned<Expr>, CompileError> {
        let mut left = self.unary()?;

        while let Some((id, op)) = self.peek_binary_op() {
            let prec = operators::precedence(id);
            if prec < min_prec {
                break;
            }
            self.advance();
            let right = self.binary_expr(prec + 1)?;
            let span = left.span.merge(right.span);
            left = Spanned::new(Expr::Binary(Box::new(left), op, Box::new(right)), span);
        }

        Ok(left)
    }

    fn peek_logical_prefix(&self) -> Option<LogicalPrefix> {
        match self.peek().kind.operator_id()? {
            OperatorId::Bang => Some(LogicalPrefix::Not),
            OperatorId::Minus => Some(LogicalPrefix::Neg),
            OperatorId::Tilde => Some(LogicalPrefix::BitNot),
            _ => None,
        }
    }

    fn at_pointer_prefix(&self) -> bool {
        self.check_op(OperatorId::Star) || self.check_op(OperatorId::Amp) || self.check_op(OperatorId::AndAnd)
    }

    fn unary(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let start = self.current_span();

        let logical = self.peek_logical_prefix();
        if logical.is_some() {
            self.advance();
            if self.peek_logical_prefix().is_some() {
                let repeated = self.peek().lexeme.clone();
                self.report(errors::stuttered_prefix(&repeated, self.current_span()));
                while self.peek_logical_prefix().is_some() {
                    self.advance();
                }
            }
        }

        let pointer = if self.match_op(OperatorId::Star) {
            Some(PointerPrefix::Deref)
        } else if self.match_op(OperatorId::Amp) {
            if self.match_keyword(KeywordId::Mut) {
                Some(PointerPrefix::AddressOfMut)
            } else {
                Some(PointerPrefix::AddressOf)
            }
        } else if self.check_op(OperatorId::AndAnd) {
            // `&&x` lexes as one token but is two address-of prefixes.
            let span = self.advance().span;
            self.report(errors::stuttered_prefix("&", span));
            self.match_keyword(KeywordId::Mut);
            Some(PointerPrefix::AddressOf)
        } else {
            None
        };
        if pointer.is_some() && self.at_pointer_prefix() {
            let repeated = self.peek().lexeme.clone();
            self.report(errors::stuttered_prefix(&repeated, self.current_span()));
            while self.at_pointer_prefix() {
                self.advance();
                self.match_keyword(KeywordId::Mut);
            }
        }

        if logical.is_none() && pointer.is_none() {
            return self.postfix();
        }

        let operand = self.postfix()?;
        let span = start.merge(operand.span);
        Ok(Spanned::new(
            Expr::Unary(UnaryPrefix { logical, pointer }, Box::new(operand)),
            span,
        ))
    }

    fn postfix(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let mut expr = self.primary()?;

        loop {
            if self.check_punct(PunctuationId::LParen) {
                let args = self.call_args()?;
                let span = self.span_since(expr.span);
                expr = Spanned::new(Expr::Call(Box::new(expr), args), span);
            } else if self.match_punct(PunctuationId::Dot) {
                expr = self.member_access(expr)?;
            } else if self.match_punct(PunctuationId::LBracket) {
                let suffix = self.with_struct_literals(true, |p| p.index_or_slice())?;
                self.expect_punct(PunctuationId::RBracket, "']' after index")?;
                let span = self.span_since(expr.span);
                expr = match suffix {
                    IndexOrSlice::Index(index) => Spanned::new(Expr::Index(Box::new(expr), Box::new(index)), span),
                    IndexOrSlice::Slice(bounds) => Spanned::new(Expr::Slice(Box::new(expr), bounds), span),
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Field access or tuple index after a consumed `.`.
    fn member_access(&mut self, base: Spanned<Expr>) -> Result<Spanned<Expr>, CompileError> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let field = Spanned::new(name.clone(), self.current_span());
                self.advance();
                let span = self.span_since(base.span);
                Ok(Spanned::new(Expr::Field(Box::new(base), field), span))
            }
            TokenKind::Int {
                value,
                base: crate::lexer::IntBase::Decimal,
            } => {
                let index = *value as usize;
                self.advance();
                let span = self.span_since(base.span);
                Ok(Spanned::new(Expr::TupleIndex(Box::new(base), index), span))
            }
            TokenKind::Float(_) => {
                // `t.0.1` lexes the `0.1` as a float; split it back into two tuple indexes.
                let lexeme = self.peek().lexeme.clone();
                let float_span = self.current_span();
                let mut parts = lexeme.split('.');
                let first = parts.next().and_then(|s| s.parse::<usize>().ok());
                let second = parts.next().and_then(|s| s.parse::<usize>().ok());
                let (Some(first), Some(second)) = (first, second) else {
                    return Err(CompileError::syntax(format!("Invalid tuple index '{}'", lexeme), float_span));
                };
                self.advance();
                let inner_span = base.span.merge(Span::new(float_span.start, float_span.start + 1));
                let inner = Spanned::new(Expr::TupleIndex(Box::new(base), first), inner_span);
                let span = self.span_since(inner.span);
                Ok(Spanned::new(Expr::TupleIndex(Box::new(inner), second), span))
            }
            _ => Err(self.expected("field name or tuple index after '.'")),
        }
    }

    /// Contents of `[...]` after the `[`: an index, or a slice in one of the four `:` forms.
    fn index_or_slice(&mut self) -> Result<IndexOrSlice, CompileError> {
        if self.match_punct(PunctuationId::Colon) {
            let end = if self.check_punct(PunctuationId::RBracket) {
                None
            } else {
                Some(Box::new(self.expression()?))
            };
            return Ok(IndexOrSlice::Slice(SliceBounds { start: None, end }));
        }

        let first = self.expression()?;
        if self.match_punct(PunctuationId::Colon) {
            let end = if self.check_punct(PunctuationId::RBracket) {
                None
            } else {
                Some(Box::new(self.expression()?))
            };
            return Ok(IndexOrSlice::Slice(SliceBounds {
                start: Some(Box::new(first)),
                end,
            }));
        }
        Ok(IndexOrSlice::Index(first))
    }

    /// `(args)`, `()`, or `(none)`.
    fn call_args(&mut self) -> Result<Vec<Spanned<Expr>>, CompileError> {
        self.expect_punct(PunctuationId::LParen, "'('")?;
        if self.match_punct(PunctuationId::RParen) {
            return Ok(Vec::new());
        }
        if self.match_keyword(KeywordId::None) {
            self.expect_punct(PunctuationId::RParen, "')' after 'none'")?;
            return Ok(Vec::new());
        }
        if self.check_primitive(PrimitiveId::Void) {
            let span = self.advance().span;
            self.report(
                CompileError::syntax("'void' is not an argument list", span)
                    .with_hint("Use 'none' for empty argument lists"),
            );
            self.expect_punct(PunctuationId::RParen, "')' after arguments")?;
            return Ok(Vec::new());
        }

        let args = self.with_struct_literals(true, |p| {
            let mut args = vec![p.expression()?];
            while p.match_punct(PunctuationId::Comma) {
                args.push(p.expression()?);
            }
            Ok(args)
        })?;
        self.expect_punct(PunctuationId::RParen, "')' after arguments")?;
        Ok(args)
    }

    fn primary(&mut self) -> Result<Spanned<Expr>, CompileError> {
        self.nested(|p| p.primary_body())
    }

    fn primary_body(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let start = self.current_span();

        let literal = match &self.peek().kind {
            TokenKind::Int { value, .. } => Some(Literal::Int(*value)),
            TokenKind::Float(value) => Some(Literal::Float(*value)),
            TokenKind::String { value, .. } => Some(Literal::String(value.clone())),
            TokenKind::Char(c) => Some(Literal::Char(*c)),
            TokenKind::Keyword(KeywordId::True) => Some(Literal::Bool(true)),
            TokenKind::Keyword(KeywordId::False) => Some(Literal::Bool(false)),
            _ => None,
        };
        if let Some(literal) = literal {
            self.advance();
            return Ok(Spanned::new(Expr::Literal(literal), start));
        }

        if self.match_keyword(KeywordId::SelfKw) {
            return Ok(Spanned::new(Expr::SelfExpr, start));
        }

        if self.match_keyword(KeywordId::Sizeof) {
            self.expect_punct(PunctuationId::LParen, "'(' after sizeof")?;
            let ty = self.type_()?;
            self.expect_punct(PunctuationId::RParen, "')' after sizeof type")?;
            return Ok(Spanned::new(Expr::Sizeof(Box::new(ty)), self.span_since(start)));
        }

        if self.match_keyword(KeywordId::Await) {
            let handle = self.postfix()?;
            return Ok(Spanned::new(Expr::Await(Box::new(handle)), self.span_since(start)));
        }

        if self.check_punct(PunctuationId::LParen) {
            return self.paren_or_tuple();
        }

        if self.check_punct(PunctuationId::LBracket) {
            return self.array_literal();
        }

        // Result.Ok(x), Option.None, ...
        if self.check_keyword(KeywordId::Result) || self.check_keyword(KeywordId::Option) {
            let head = Spanned::new(self.peek().lexeme.clone(), start);
            self.advance();
            self.expect_punct(PunctuationId::Dot, &format!("'.' and a variant after '{}'", head.node))?;
            return self.enum_constructor(head);
        }

        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = Spanned::new(name.clone(), start);
            return self.identifier_expr(name);
        }

        if self.check_keyword(KeywordId::None) {
            return Err(CompileError::syntax("'none' is not a value", start)
                .with_note("'none' only marks an intentionally empty list (parameters, bodies, arrays, arguments)"));
        }

        Err(self.expected("expression"))
    }

    /// Expressions that start with an identifier. The identifier has not been consumed yet.
    fn identifier_expr(&mut self, name: Spanned<Ident>) -> Result<Spanned<Expr>, CompileError> {
        let start = name.span;

        if self.peek_next().kind.is_punctuation(PunctuationId::ColonColon) {
            self.advance();
            return self.associated_call(name, Vec::new());
        }

        if self.peek_next().kind.is_operator(OperatorId::Lt) {
            self.advance();
            if let Some(type_args) = self.try_generic_suffix() {
                if self.check_punct(PunctuationId::ColonColon) {
                    return self.associated_call(name, type_args);
                }
                return self.struct_literal(name, type_args);
            }
            return Ok(Spanned::new(Expr::Ident(name.node), start));
        }

        if self.peek_next().kind.is_punctuation(PunctuationId::Dot) && self.peek_at(2).kind.is_ident() {
            self.advance();
            self.advance();
            return self.enum_constructor(name);
        }

        self.advance();
        if self.struct_literal_ahead() {
            return self.struct_literal(name, Vec::new());
        }
        Ok(Spanned::new(Expr::Ident(name.node), start))
    }

    /// Speculatively parse `<T, ...>` after a name. Keeps the result only if `::` or a struct body follows;
    /// otherwise rewinds so `<` is parsed as a comparison.
    fn try_generic_suffix(&mut self) -> Option<Vec<Spanned<Type>>> {
        let saved_pos = self.pos;
        let saved_errors = self.errors.len();
        let saved_split = self.split_gt;

        if let Ok(args) = self.type_args() {
            if !self.split_gt
                && (self.check_punct(PunctuationId::ColonColon) || self.struct_literal_ahead())
            {
                return Some(args);
            }
        }

        self.pos = saved_pos;
        self.errors.truncate(saved_errors);
        self.split_gt = saved_split;
        None
    }

    /// `Name::function(args)`; the name (and type arguments) have been consumed.
    fn associated_call(
        &mut self,
        type_name: Spanned<Ident>,
        type_args: Vec<Spanned<Type>>,
    ) -> Result<Spanned<Expr>, CompileError> {
        let start = type_name.span;
        self.expect_punct(PunctuationId::ColonColon, "'::'")?;
        let function = self.identifier_spanned()?;
        if !self.check_punct(PunctuationId::LParen) {
            return Err(self
                .expected("'(' after associated function name")
                .with_hint("Enum variants use '.', e.g. Color.Red"));
        }
        let args = self.call_args()?;
        Ok(Spanned::new(
            Expr::AssociatedCall(AssociatedCall {
                type_name,
                type_args,
                function,
                args,
            }),
            self.span_since(start),
        ))
    }

    /// `Head.Variant` or `Head.Variant(args)`; the head and `.` have been consumed.
    fn enum_constructor(&mut self, head: Spanned<Ident>) -> Result<Spanned<Expr>, CompileError> {
        let start = head.span;
        let variant = self.identifier_spanned()?;
        let args = if self.check_punct(PunctuationId::LParen) {
            Some(self.call_args()?)
        } else {
            None
        };
        Ok(Spanned::new(
            Expr::EnumConstructor(EnumConstructor { head, variant, args }),
            self.span_since(start),
        ))
    }

    /// `{` followed by `}`, `none }`, or `field:` (and struct literals allowed here).
    fn struct_literal_ahead(&self) -> bool {
        if self.no_struct_literal || !self.check_punct(PunctuationId::LBrace) {
            return false;
        }
        let first = &self.peek_at(1).kind;
        first.is_punctuation(PunctuationId::RBrace)
            || (first.is_keyword(KeywordId::None) && self.peek_at(2).kind.is_punctuation(PunctuationId::RBrace))
            || (first.is_ident() && self.peek_at(2).kind.is_punctuation(PunctuationId::Colon))
    }

    /// `Name { field: value, ... }`; the name (and type arguments) have been consumed.
    fn struct_literal(
        &mut self,
        name: Spanned<Ident>,
        type_args: Vec<Spanned<Type>>,
    ) -> Result<Spanned<Expr>, CompileError> {
        let start = name.span;
        self.expect_punct(PunctuationId::LBrace, "'{' to open struct literal")?;

        let mut fields = Vec::new();
        if !self.match_keyword(KeywordId::None) && !self.check_punct(PunctuationId::RBrace) {
            loop {
                let field = self.identifier_spanned()?;
                self.expect_punct(PunctuationId::Colon, "':' after field name")?;
                let value = self.with_struct_literals(true, |p| p.expression())?;
                fields.push((field, value));
                if !self.match_punct(PunctuationId::Comma) || self.check_punct(PunctuationId::RBrace) {
                    break;
                }
            }
        }

        self.expect_punct(PunctuationId::RBrace, "'}' to close struct literal")?;
        Ok(Spanned::new(
            Expr::StructLiteral(StructLiteral {
                name,
                type_args,
                fields,
            }),
            self.span_since(start),
        ))
    }

    /// `()`, `(e)`, or `(a, b, ...)`.
    fn paren_or_tuple(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let start = self.expect_punct(PunctuationId::LParen, "'('")?;
        if self.match_punct(PunctuationId::RParen) {
            return Ok(Spanned::new(Expr::Literal(Literal::Unit), self.span_since(start)));
        }

        self.with_struct_literals(true, |p| {
            let first = p.expression()?;
            if p.match_punct(PunctuationId::Comma) {
                let mut elems = vec![first, p.expression()?];
                while p.match_punct(PunctuationId::Comma) {
                    elems.push(p.expression()?);
                }
                p.expect_punct(PunctuationId::RParen, "')' after tuple elements")?;
                return Ok(Spanned::new(Expr::Tuple(elems), p.span_since(start)));
            }
            p.expect_punct(PunctuationId::RParen, "')'")?;
            Ok(Spanned::new(Expr::Paren(Box::new(first)), p.span_since(start)))
        })
    }

    /// `[none]`, `[a, b, ...]`, or `[value; count]`.
    fn array_literal(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let start = self.expect_punct(PunctuationId::LBracket, "'['")?;

        if self.match_keyword(KeywordId::None) {
            self.expect_punct(PunctuationId::RBracket, "']' after 'none'")?;
            return Ok(Spanned::new(Expr::Array(Vec::new()), self.span_since(start)));
        }
        if self.check_punct(PunctuationId::RBracket) {
            self.report(errors::empty_without_none("array literals", self.current_span()));
            self.advance();
            return Ok(Spanned::new(Expr::Array(Vec::new()), self.span_since(start)));
        }

        self.with_struct_literals(true, |p| {
            let first = p.expression()?;
            if p.match_punct(PunctuationId::Semicolon) {
                let count = p.expression()?;
                p.expect_punct(PunctuationId::RBracket, "']' after repeat count")?;
                return Ok(Spanned::new(
                    Expr::ArrayRepeat(Box::new(first), Box::new(count)),
                    p.span_since(start),
                ));
            }
            let mut elems = vec![first];
            while p.match_punct(PunctuationId::Comma) {
                elems.push(p.expression()?);
            }
            p.expect_punct(PunctuationId::RBracket, "']' after array elements")?;
            Ok(Spanned::new(Expr::Array(elems), p.span_since(start)))
        })
    }
}
