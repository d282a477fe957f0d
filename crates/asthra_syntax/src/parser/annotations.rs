/// Annotation parsing.
///
/// `#[name]`, `#[name(none)]`, `#[name(value, ...)]` and `#[name(key = value, ...)]`. Applicability and mutual
/// exclusivity are checked by the semantic analyzer; here only the bracket/paren syntax is enforced.
impl<'a> Parser<'a> {
    // ========================================================================
    // Annotations
    // ========================================================================

    /// Parse a (possibly empty) run of annotations.
    fn annotations(&mut self) -> Result<Vec<Annotation>, CompileError> {
        let mut annotations = Vec::new();
        loop {
            if self.check_punct(PunctuationId::Hash) {
                annotations.push(self.annotation()?);
            } else if self.check_punct(PunctuationId::At) {
                annotations.push(self.at_annotation()?);
            } else {
                return Ok(annotations);
            }
        }
    }

    fn annotation(&mut self) -> Result<Annotation, CompileError> {
        let start = self.expect_punct(PunctuationId::Hash, "'#'")?;
        self.expect_punct(PunctuationId::LBracket, "'[' after '#'")?;
        let name = self.annotation_name()?;

        let args = if self.match_punct(PunctuationId::LParen) {
            let args = self.annotation_args()?;
            self.expect_punct(PunctuationId::RParen, "')' after annotation arguments")?;
            args
        } else {
            AnnotationArgs::Empty
        };

        self.expect_punct(PunctuationId::RBracket, "']' to close annotation")?;
        Ok(Annotation {
            name,
            args,
            span: self.span_since(start),
        })
    }

    /// `@name` is not Asthra syntax; report it and keep the annotation so later checks still see it.
    fn at_annotation(&mut self) -> Result<Annotation, CompileError> {
        let start = self.expect_punct(PunctuationId::At, "'@'")?;
        let name = self.annotation_name()?;
        let span = self.span_since(start);
        self.report(
            CompileError::syntax(format!("'@{}' is not a valid annotation", name), span)
                .with_hint(format!("Use '#[{}]' annotation syntax", name)),
        );
        Ok(Annotation {
            name,
            args: AnnotationArgs::Empty,
            span,
        })
    }

    fn annotation_name(&mut self) -> Result<Ident, CompileError> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.expected("annotation name")),
        }
    }

    fn annotation_args(&mut self) -> Result<AnnotationArgs, CompileError> {
        if self.match_keyword(KeywordId::None) {
            return Ok(AnnotationArgs::Empty);
        }
        if self.check_punct(PunctuationId::RParen) {
            self.report(errors::empty_without_none("annotation argument lists", self.current_span()));
            return Ok(AnnotationArgs::Empty);
        }

        let named = self.peek().kind.is_ident() && self.peek_next().kind.is_operator(OperatorId::Eq);
        if named {
            let mut pairs = Vec::new();
            loop {
                let key = self.identifier()?;
                self.expect_op(OperatorId::Eq, "'=' in named annotation argument")?;
                pairs.push((key, self.annotation_value()?));
                if !self.match_punct(PunctuationId::Comma) {
                    break;
                }
            }
            Ok(AnnotationArgs::Named(pairs))
        } else {
            let mut values = vec![self.annotation_value()?];
            while self.match_punct(PunctuationId::Comma) {
                values.push(self.annotation_value()?);
            }
            Ok(AnnotationArgs::Values(values))
        }
    }

    fn annotation_value(&mut self) -> Result<AnnotationValue, CompileError> {
        let value = match &self.peek().kind {
            TokenKind::String { value, .. } => AnnotationValue::Str(value.clone()),
            TokenKind::Ident(name) => AnnotationValue::Ident(name.clone()),
            TokenKind::Int { value, .. } => AnnotationValue::Int(*value),
            TokenKind::Keyword(KeywordId::True) => AnnotationValue::Bool(true),
            TokenKind::Keyword(KeywordId::False) => AnnotationValue::Bool(false),
            _ => return Err(self.expected("annotation value (string, identifier, integer, or boolean)")),
        };
        self.advance();
        Ok(value)
    }
}
