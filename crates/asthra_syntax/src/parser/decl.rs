/// Declaration parsing.
///
/// Top-level items: functions, structs, enums, extern functions, consts, and `impl` blocks.
///
/// ## Notes
/// - Visibility (`pub`/`priv`) is mandatory on every item except `impl` blocks. A missing modifier is reported and
///   parsing continues as if `priv` had been written.
/// - Empty parameter lists, struct bodies, and enum bodies must be spelled `none`.
impl<'a> Parser<'a> {
    // ========================================================================
    // Declarations
    // ========================================================================

    fn declaration(&mut self) -> Result<Spanned<Declaration>, CompileError> {
        let start = self.current_span();
        let annotations = self.annotations()?;

        if self.check_keyword(KeywordId::Impl) {
            let block = self.impl_block(annotations)?;
            return Ok(Spanned::new(Declaration::Impl(block), self.span_since(start)));
        }

        if self.check_keyword(KeywordId::Import) {
            return Err(CompileError::syntax("Imports must appear before declarations", self.current_span())
                .with_hint("Move this import directly below the package declaration"));
        }

        let visibility = self.visibility()?;

        let decl = if self.check_keyword(KeywordId::Fn) {
            Declaration::Function(self.function_decl(annotations, visibility, false)?)
        } else if self.check_keyword(KeywordId::Struct) {
            Declaration::Struct(self.struct_decl(annotations, visibility)?)
        } else if self.check_keyword(KeywordId::Enum) {
            Declaration::Enum(self.enum_decl(annotations, visibility)?)
        } else if self.check_keyword(KeywordId::Extern) {
            Declaration::Extern(self.extern_decl(annotations, visibility)?)
        } else if self.check_keyword(KeywordId::Const) {
            Declaration::Const(self.const_decl(annotations, visibility)?)
        } else {
            return Err(self.expected("declaration ('fn', 'struct', 'enum', 'extern', 'const', or 'impl')"));
        };

        Ok(Spanned::new(decl, self.span_since(start)))
    }

    /// Parse the mandatory visibility modifier.
    fn visibility(&mut self) -> Result<Visibility, CompileError> {
        if self.match_keyword(KeywordId::Pub) {
            return Ok(Visibility::Public);
        }
        if self.match_keyword(KeywordId::Priv) {
            return Ok(Visibility::Private);
        }
        let declares = matches!(
            self.peek().kind,
            TokenKind::Keyword(
                KeywordId::Fn | KeywordId::Struct | KeywordId::Enum | KeywordId::Extern | KeywordId::Const
            )
        );
        if declares {
            self.report(errors::missing_visibility(self.current_span()));
            Ok(Visibility::Private)
        } else {
            Err(self.expected("'pub' or 'priv'"))
        }
    }

    /// `fn name<T>(params) -> Type { body }`
    ///
    /// `is_method` permits a leading `self` parameter.
    fn function_decl(
        &mut self,
        annotations: Vec<Annotation>,
        visibility: Visibility,
        is_method: bool,
    ) -> Result<FunctionDecl, CompileError> {
        self.expect_keyword(KeywordId::Fn, "'fn'")?;
        let name = self.identifier_spanned()?;
        let type_params = self.type_params()?;

        self.expect_punct(PunctuationId::LParen, "'(' after function name")?;
        let (receiver, params) = self.param_list(is_method)?;
        self.expect_punct(PunctuationId::RParen, "')' after parameters")?;

        self.expect_punct(PunctuationId::Arrow, "'->' and a return type")?;
        let return_type = self.type_()?;
        let body = self.block()?;

        Ok(FunctionDecl {
            annotations,
            visibility,
            name,
            type_params,
            receiver,
            params,
            return_type,
            body,
        })
    }

    /// Parse `none` or a comma-separated parameter list (the parentheses are handled by the caller).
    fn param_list(&mut self, allow_self: bool) -> Result<(Option<Span>, Vec<Spanned<Param>>), CompileError> {
        if self.match_keyword(KeywordId::None) {
            return Ok((None, Vec::new()));
        }
        if self.check_punct(PunctuationId::RParen) {
            self.report(errors::empty_without_none("parameter lists", self.current_span()));
            return Ok((None, Vec::new()));
        }
        if self.check_primitive(PrimitiveId::Void) {
            self.report(
                CompileError::syntax("'void' is not a parameter list", self.current_span())
                    .with_hint("Use 'none' for empty parameter lists"),
            );
            self.advance();
            return Ok((None, Vec::new()));
        }

        let mut receiver = None;
        let mut params = Vec::new();
        loop {
            if self.check_keyword(KeywordId::SelfKw) {
                let span = self.advance().span;
                if !allow_self {
                    self.report(CompileError::syntax("'self' parameter is only allowed in methods", span));
                } else if receiver.is_some() || !params.is_empty() {
                    self.report(CompileError::syntax("'self' must be the first parameter", span));
                } else {
                    receiver = Some(span);
                }
            } else {
                params.push(self.param()?);
            }
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        Ok((receiver, params))
    }

    fn param(&mut self) -> Result<Spanned<Param>, CompileError> {
        let start = self.current_span();
        let annotations = self.annotations()?;
        let name = self.identifier()?;
        self.expect_punct(PunctuationId::Colon, "':' and a parameter type")?;
        let ty = self.type_()?;
        Ok(Spanned::new(Param { annotations, name, ty }, self.span_since(start)))
    }

    /// Parse optional `<T, U>` type parameters. Bounds (`<T: Bound>`) are rejected.
    fn type_params(&mut self) -> Result<Vec<Spanned<Ident>>, CompileError> {
        if !self.match_op(OperatorId::Lt) {
            return Ok(Vec::new());
        }
        let mut params = Vec::new();
        loop {
            params.push(self.identifier_spanned()?);
            if self.check_punct(PunctuationId::Colon) {
                let span = self.advance().span;
                self.report(
                    CompileError::syntax("Type parameter constraints are not supported", span)
                        .with_note("Generic parameters are unconstrained; write '<T>'"),
                );
                self.type_()?;
            }
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        self.expect_closing_angle()?;
        Ok(params)
    }

    /// `struct Name<T> { field: Type, ... }` or `{ none }`
    fn struct_decl(&mut self, annotations: Vec<Annotation>, visibility: Visibility) -> Result<StructDecl, CompileError> {
        self.expect_keyword(KeywordId::Struct, "'struct'")?;
        let name = self.identifier_spanned()?;
        let type_params = self.type_params()?;
        self.expect_punct(PunctuationId::LBrace, "'{' to open struct body")?;

        let mut fields = Vec::new();
        if self.match_keyword(KeywordId::None) {
            // explicitly empty
        } else if self.check_punct(PunctuationId::RBrace) {
            self.report(errors::empty_without_none("struct bodies", self.current_span()));
        } else {
            loop {
                fields.push(self.field_decl()?);
                if !self.match_punct(PunctuationId::Comma) || self.check_punct(PunctuationId::RBrace) {
                    break;
                }
            }
        }

        self.expect_punct(PunctuationId::RBrace, "'}' to close struct body")?;
        Ok(StructDecl {
            annotations,
            visibility,
            name,
            type_params,
            fields,
        })
    }

    fn field_decl(&mut self) -> Result<Spanned<FieldDecl>, CompileError> {
        let start = self.current_span();
        let annotations = self.annotations()?;
        let visibility = if self.match_keyword(KeywordId::Pub) {
            Some(Visibility::Public)
        } else if self.match_keyword(KeywordId::Priv) {
            Some(Visibility::Private)
        } else {
            None
        };
        let name = self.identifier()?;
        self.expect_punct(PunctuationId::Colon, "':' and a field type")?;
        let ty = self.type_()?;
        Ok(Spanned::new(
            FieldDecl {
                annotations,
                visibility,
                name,
                ty,
            },
            self.span_since(start),
        ))
    }

    /// `enum Name<T> { A, B(Type), C = value }` or `{ none }`
    fn enum_decl(&mut self, annotations: Vec<Annotation>, visibility: Visibility) -> Result<EnumDecl, CompileError> {
        self.expect_keyword(KeywordId::Enum, "'enum'")?;
        let name = self.identifier_spanned()?;
        let type_params = self.type_params()?;
        self.expect_punct(PunctuationId::LBrace, "'{' to open enum body")?;

        let mut variants = Vec::new();
        if self.match_keyword(KeywordId::None) {
            // explicitly empty
        } else if self.check_punct(PunctuationId::RBrace) {
            self.report(errors::empty_without_none("enum bodies", self.current_span()));
        } else {
            loop {
                variants.push(self.variant_decl()?);
                if !self.match_punct(PunctuationId::Comma) || self.check_punct(PunctuationId::RBrace) {
                    break;
                }
            }
        }

        self.expect_punct(PunctuationId::RBrace, "'}' to close enum body")?;
        Ok(EnumDecl {
            annotations,
            visibility,
            name,
            type_params,
            variants,
        })
    }

    fn variant_decl(&mut self) -> Result<Spanned<VariantDecl>, CompileError> {
        let start = self.current_span();
        let name = self.identifier()?;

        let mut payload = Vec::new();
        if self.match_punct(PunctuationId::LParen) {
            if self.check_punct(PunctuationId::RParen) {
                self.report(
                    CompileError::syntax("Empty variant payload", self.current_span())
                        .with_hint(format!("Write the variant without parentheses: {}", name)),
                );
            } else {
                payload.push(self.type_()?);
                while self.match_punct(PunctuationId::Comma) {
                    payload.push(self.type_()?);
                }
            }
            self.expect_punct(PunctuationId::RParen, "')' after variant payload")?;
        }

        let value = if self.match_op(OperatorId::Eq) {
            Some(self.expression()?)
        } else {
            None
        };

        Ok(Spanned::new(VariantDecl { name, payload, value }, self.span_since(start)))
    }

    /// `extern "lib"? fn name(params) -> #[ann]* Type;`
    fn extern_decl(&mut self, annotations: Vec<Annotation>, visibility: Visibility) -> Result<ExternDecl, CompileError> {
        self.expect_keyword(KeywordId::Extern, "'extern'")?;
        let library = match &self.peek().kind {
            TokenKind::String { value, .. } => {
                let library = value.clone();
                self.advance();
                Some(library)
            }
            _ => None,
        };
        self.expect_keyword(KeywordId::Fn, "'fn' after 'extern'")?;
        let name = self.identifier_spanned()?;

        self.expect_punct(PunctuationId::LParen, "'(' after extern function name")?;
        let (_, params) = self.param_list(false)?;
        self.expect_punct(PunctuationId::RParen, "')' after parameters")?;

        self.expect_punct(PunctuationId::Arrow, "'->' and a return type")?;
        let return_annotations = self.annotations()?;
        let return_type = self.type_()?;

        if self.check_punct(PunctuationId::LBrace) {
            return Err(CompileError::syntax("Extern functions cannot have a body", self.current_span())
                .with_hint("End the declaration with ';'"));
        }
        self.expect_punct(PunctuationId::Semicolon, "';' after extern declaration")?;

        Ok(ExternDecl {
            annotations,
            visibility,
            library,
            name,
            params,
            return_annotations,
            return_type,
        })
    }

    /// `const NAME: Type = expr;`
    fn const_decl(&mut self, annotations: Vec<Annotation>, visibility: Visibility) -> Result<ConstDecl, CompileError> {
        self.expect_keyword(KeywordId::Const, "'const'")?;
        let name = self.identifier_spanned()?;
        self.expect_punct(PunctuationId::Colon, "':' and a const type")?;
        let ty = self.type_()?;
        self.expect_op(OperatorId::Eq, "'=' and a const value")?;
        let value = self.expression()?;
        self.expect_punct(PunctuationId::Semicolon, "';' after const declaration")?;
        Ok(ConstDecl {
            annotations,
            visibility,
            name,
            ty,
            value,
        })
    }

    /// `impl Name { <vis> fn ... }`
    fn impl_block(&mut self, annotations: Vec<Annotation>) -> Result<ImplBlock, CompileError> {
        self.expect_keyword(KeywordId::Impl, "'impl'")?;
        let target = self.identifier_spanned()?;
        self.expect_punct(PunctuationId::LBrace, "'{' to open impl block")?;

        let mut methods = Vec::new();
        while !self.check_punct(PunctuationId::RBrace) && !self.is_at_end() {
            let before = self.pos;
            match self.method() {
                Ok(method) => methods.push(method),
                Err(e) => {
                    self.report(e);
                    self.synchronize_method();
                    self.ensure_progress(before);
                }
            }
        }

        self.expect_punct(PunctuationId::RBrace, "'}' to close impl block")?;
        Ok(ImplBlock {
            annotations,
            target,
            methods,
        })
    }

    fn method(&mut self) -> Result<Spanned<FunctionDecl>, CompileError> {
        let start = self.current_span();
        let annotations = self.annotations()?;
        let visibility = self.visibility()?;
        if !self.check_keyword(KeywordId::Fn) {
            return Err(self.expected("'fn' in impl block"));
        }
        let func = self.function_decl(annotations, visibility, true)?;
        Ok(Spanned::new(func, self.span_since(start)))
    }

    /// Skip to the next method inside an impl block, stopping before the block's closing `}`.
    fn synchronize_method(&mut self) {
        let mut depth = 0usize;
        while !self.is_at_end() {
            if self.check_punct(PunctuationId::RBrace) {
                if depth == 0 {
                    return;
                }
                depth -= 1;
                self.advance();
                if depth == 0 {
                    return;
                }
                continue;
            }
            if self.check_punct(PunctuationId::LBrace) {
                depth += 1;
            } else if depth == 0
                && (self.check_punct(PunctuationId::Hash)
                    || self.check_keyword(KeywordId::Pub)
                    || self.check_keyword(KeywordId::Priv))
            {
                return;
            }
            self.advance();
        }
    }
}
