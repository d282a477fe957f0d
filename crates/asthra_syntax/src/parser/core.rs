/// Parser core types and entrypoint.
///
/// This chunk defines the [`Parser`] type, its [`Parsed`] output, and the top-level program production
/// (`package` header, imports, declarations).
///
/// ## Notes
/// - This file is `include!`'d into `crate::parser` to keep all parser methods in a
///   single module while avoiding a single “god file”.

/// Result of parsing `[...]` postfix syntax: either a single index or a slice.
enum IndexOrSlice {
    Index(Spanned<Expr>),
    Slice(SliceBounds),
}

/// Output of one parser run: the (possibly partial) program plus every syntax error found.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub program: Program,
    pub errors: Vec<CompileError>,
}

impl Parsed {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parser state.
///
/// ## Notes
/// - The parser is single-pass and recovers from errors by synchronizing at `;`, `}`, or a keyword that starts a new
///   statement/declaration.
/// - `split_gt` marks a `>>` token whose first `>` already closed a type-argument list.
/// - `no_struct_literal` is set while parsing `if`/`for`/`match` heads, where `Name {` opens the body instead.
/// - `depth` counts nested expressions, types, patterns and blocks; past [`MAX_NESTING_DEPTH`] the production fails
///   instead of recursing, and `too_deep` keeps that error to one report per run.
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    errors: Vec<CompileError>,
    eof: Token,
    split_gt: bool,
    no_struct_literal: bool,
    depth: usize,
    too_deep: bool,
}

/// Deepest recursion the parser allows before reporting a syntax error.
pub const MAX_NESTING_DEPTH: usize = 128;

impl<'a> Parser<'a> {
    /// Create a new parser for a token stream.
    ///
    /// ## Parameters
    /// - `tokens`: Token stream produced by `asthra_syntax::lexer`.
    pub fn new(tokens: &'a [Token]) -> Self {
        let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
        let file = tokens.last().map(|t| t.span.file).unwrap_or_default();
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            eof: Token::new(TokenKind::Eof, "", Span::new(end, end).with_file(file)),
            split_gt: false,
            no_struct_literal: false,
            depth: 0,
            too_deep: false,
        }
    }

    /// Parse the entire token stream into a [`Program`].
    ///
    /// Always yields a program; syntax errors are collected alongside it.
    pub fn parse(mut self) -> Parsed {
        let package = match self.package_decl() {
            Ok(package) => package,
            Err(e) => {
                let span = self.current_span();
                self.report(e);
                self.synchronize_declaration();
                Spanned::new(String::new(), span)
            }
        };

        let mut imports = Vec::new();
        while self.check_keyword(KeywordId::Import) {
            let before = self.pos;
            match self.import_decl() {
                Ok(import) => imports.push(import),
                Err(e) => {
                    self.report(e);
                    self.synchronize_declaration();
                    self.ensure_progress(before);
                }
            }
        }

        let mut declarations = Vec::new();
        while !self.is_at_end() {
            let before = self.pos;
            match self.declaration() {
                Ok(decl) => declarations.push(decl),
                Err(e) => {
                    self.report(e);
                    self.synchronize_declaration();
                    self.ensure_progress(before);
                }
            }
        }

        Parsed {
            program: Program {
                package,
                imports,
                declarations,
            },
            errors: self.errors,
        }
    }

    /// `package name;`
    fn package_decl(&mut self) -> Result<Spanned<Ident>, CompileError> {
        if !self.check_keyword(KeywordId::Package) {
            return Err(CompileError::syntax(
                format!("Expected 'package' declaration, found {}", self.peek().kind.describe()),
                self.current_span(),
            )
            .with_hint("Every file starts with: package name;"));
        }
        self.advance();
        let name = self.identifier_spanned()?;
        self.expect_punct(PunctuationId::Semicolon, "';' after package name")?;
        Ok(name)
    }

    /// `import "path" (as alias)?;`
    fn import_decl(&mut self) -> Result<Spanned<ImportDecl>, CompileError> {
        let start = self.current_span();
        self.expect_keyword(KeywordId::Import, "'import'")?;
        let path = self.string_literal()?;
        let alias = if self.match_keyword(KeywordId::As) {
            Some(self.identifier_spanned()?)
        } else {
            None
        };
        self.expect_punct(PunctuationId::Semicolon, "';' after import")?;
        Ok(Spanned::new(ImportDecl { path, alias }, self.span_since(start)))
    }
}
