//! Lexer for the Asthra programming language
//!
//! Handles tokenization including:
//! - Keywords, primitive type names, and identifiers (predeclared names such as `log` stay identifiers)
//! - Numeric literals with a fixed kind per prefix (`0x`, `0b`, `0o`, decimal, float)
//! - Regular, processed (`"""..."""`) and raw (`r"""..."""`) strings, and character literals
//! - Operators and punctuation
//! - `//` line comments and non-nesting `/* */` block comments (discarded)
//!
//! Lexing never stops at the first problem: a malformed literal or stray character is reported with its span, the
//! lexer skips to the next whitespace boundary, and scanning resumes. A run therefore reports every independent
//! lexical error in the file.
//!
//! ## Module Structure
//!
//! - `tokens` - Token types (TokenKind, Token, IntBase, StringForm)
//! - `strings` - String and character literal scanning
//! - `numbers` - Numeric literal scanning

mod numbers;
mod strings;
pub mod tokens;

pub use tokens::{IntBase, StringForm, Token, TokenKind, keyword_id, primitive_id};

use asthra_core::lang::operators::OperatorId;
use asthra_core::lang::punctuation::PunctuationId;

use crate::ast::{FileId, Span};
use crate::diagnostics::{CompileError, errors};

/// Output of one lexer run: the token stream (always `Eof`-terminated) plus every lexical error found.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub errors: Vec<CompileError>,
}

impl Lexed {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Lexer for Asthra source code.
///
/// Single forward pass: a `Lexer` is consumed by [`Lexer::tokenize`] and cannot be restarted.
pub struct Lexer<'a> {
    source: &'a str,
    file: FileId,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    /// 1-based line of `current_pos`
    line: u32,
    /// Byte offset where the current line begins
    line_start: usize,
    /// Position of the token being scanned
    token_line: u32,
    token_col: u32,
    tokens: Vec<Token>,
    errors: Vec<CompileError>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self::with_file(source, FileId::default())
    }

    /// Create a lexer whose spans are tagged with `file`.
    pub fn with_file(source: &'a str, file: FileId) -> Self {
        Self {
            source,
            file,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            line: 1,
            line_start: 0,
            token_line: 1,
            token_col: 1,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire source code.
    ///
    /// The token stream always ends with an `Eof` token, even when errors were reported.
    pub fn tokenize(mut self) -> Lexed {
        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            self.scan_token();
        }

        let start = self.current_pos;
        self.begin_token(start);
        self.tokens.push(Token::new(TokenKind::Eof, "", self.span_from(start)));

        Lexed {
            tokens: self.tokens,
            errors: self.errors,
        }
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.source[self.current_pos..].chars();
        iter.next();
        iter.next()
    }

    fn rest(&self) -> &'a str {
        &self.source[self.current_pos..]
    }

    fn advance(&mut self) -> Option<char> {
        let (pos, c) = self.chars.next()?;
        self.current_pos = pos + c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.line_start = self.current_pos;
        }
        Some(c)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Error recovery: drop characters up to the next whitespace boundary.
    fn recover_to_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    // ========================================================================
    // Spans and token emission
    // ========================================================================

    fn begin_token(&mut self, start: usize) {
        self.token_line = self.line;
        self.token_col = (start - self.line_start) as u32 + 1;
    }

    fn span_from(&self, start: usize) -> Span {
        Span::at(start, self.current_pos, self.token_line, self.token_col).with_file(self.file)
    }

    fn add_token(&mut self, kind: TokenKind, start: usize) {
        let lexeme = &self.source[start..self.current_pos];
        self.tokens.push(Token::new(kind, lexeme, self.span_from(start)));
    }

    fn add_op(&mut self, id: OperatorId, start: usize) {
        self.add_token(TokenKind::Operator(id), start);
    }

    fn add_punct(&mut self, id: PunctuationId, start: usize) {
        self.add_token(TokenKind::Punctuation(id), start);
    }

    fn error(&mut self, error: CompileError) {
        self.errors.push(error);
    }

    /// Try to match compound operator, fallback to simple.
    fn operator(&mut self, start: usize, simple: OperatorId, compounds: &[(char, OperatorId)]) {
        for (c, id) in compounds {
            if self.match_char(*c) {
                self.add_op(*id, start);
                return;
            }
        }
        self.add_op(simple, start);
    }

    fn previous_ends_operand(&self) -> bool {
        self.tokens.last().is_some_and(|t| t.kind.ends_operand())
    }

    // ========================================================================
    // Main scanning dispatch
    // ========================================================================

    fn scan_token(&mut self) {
        let start = self.current_pos;
        self.begin_token(start);

        let Some(c) = self.advance() else {
            return;
        };

        match c {
            // Comments or division
            '/' => {
                if self.match_char('/') {
                    self.skip_line_comment();
                } else if self.match_char('*') {
                    self.skip_block_comment(start);
                } else {
                    self.add_op(OperatorId::Slash, start);
                }
            }

            // Operators
            '+' => self.add_op(OperatorId::Plus, start),
            '-' => {
                if self.match_char('>') {
                    self.add_punct(PunctuationId::Arrow, start);
                } else {
                    self.add_op(OperatorId::Minus, start);
                }
            }
            '*' => {
                if self.match_char('/') {
                    self.error(
                        CompileError::lexical("Unexpected '*/' outside of a comment", self.span_from(start))
                            .with_note("Block comments do not nest; the first '*/' closes the comment"),
                    );
                } else {
                    self.add_op(OperatorId::Star, start);
                }
            }
            '%' => self.add_op(OperatorId::Percent, start),
            '^' => self.add_op(OperatorId::Caret, start),
            '~' => self.add_op(OperatorId::Tilde, start),
            '&' => self.operator(start, OperatorId::Amp, &[('&', OperatorId::AndAnd)]),
            '|' => self.operator(start, OperatorId::Pipe, &[('|', OperatorId::OrOr)]),
            '!' => self.operator(start, OperatorId::Bang, &[('=', OperatorId::NotEq)]),
            '<' => self.operator(start, OperatorId::Lt, &[('<', OperatorId::Shl), ('=', OperatorId::LtEq)]),
            '>' => self.operator(start, OperatorId::Gt, &[('>', OperatorId::Shr), ('=', OperatorId::GtEq)]),
            '=' => {
                if self.match_char('=') {
                    self.add_op(OperatorId::EqEq, start);
                } else if self.match_char('>') {
                    self.add_punct(PunctuationId::FatArrow, start);
                } else {
                    self.add_op(OperatorId::Eq, start);
                }
            }

            // Punctuation
            ',' => self.add_punct(PunctuationId::Comma, start),
            ';' => self.add_punct(PunctuationId::Semicolon, start),
            '#' => self.add_punct(PunctuationId::Hash, start),
            '@' => self.add_punct(PunctuationId::At, start),
            '(' => self.add_punct(PunctuationId::LParen, start),
            ')' => self.add_punct(PunctuationId::RParen, start),
            '[' => self.add_punct(PunctuationId::LBracket, start),
            ']' => self.add_punct(PunctuationId::RBracket, start),
            '{' => self.add_punct(PunctuationId::LBrace, start),
            '}' => self.add_punct(PunctuationId::RBrace, start),
            ':' => {
                if self.match_char(':') {
                    self.add_punct(PunctuationId::ColonColon, start);
                } else {
                    self.add_punct(PunctuationId::Colon, start);
                }
            }
            '.' => {
                // `.5` is a float, but `t.0` is tuple access.
                if self.peek().is_some_and(|d| d.is_ascii_digit()) && !self.previous_ends_operand() {
                    self.scan_fraction_only(start);
                } else {
                    self.add_punct(PunctuationId::Dot, start);
                }
            }

            // Strings and characters
            '"' => self.scan_string(start),
            'r' if self.rest().starts_with("\"\"\"") => self.scan_raw_string(start),
            '\'' => self.scan_char(start),

            // Numbers
            '0'..='9' => self.scan_number(start, c),

            // Identifiers, keywords, and primitive type names
            _ if is_ident_start(c) => self.scan_identifier(start),

            _ => {
                self.recover_to_whitespace();
                let span = self.span_from(start);
                self.error(errors::unexpected_char(c, span));
            }
        }
    }

    // ========================================================================
    // Comments
    // ========================================================================

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skip a block comment; the first `*/` terminates it (no nesting).
    fn skip_block_comment(&mut self, start: usize) {
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    return;
                }
                Some(_) => {}
                None => {
                    let span = self.span_from(start);
                    self.error(errors::unterminated_comment(span));
                    return;
                }
            }
        }
    }

    // ========================================================================
    // Identifier scanning
    // ========================================================================

    fn scan_identifier(&mut self, start: usize) {
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                self.advance();
            } else {
                break;
            }
        }

        let spelling = &self.source[start..self.current_pos];

        // Reserved words and primitive type names are matched exactly; everything else is an identifier.
        if let Some(id) = keyword_id(spelling) {
            self.add_token(TokenKind::Keyword(id), start);
        } else if let Some(id) = primitive_id(spelling) {
            self.add_token(TokenKind::Primitive(id), start);
        } else {
            self.add_token(TokenKind::Ident(spelling.to_string()), start);
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Check if a character can start an identifier (ASCII-only).
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier (ASCII-only).
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Convenience function to lex a source string.
///
/// This is a shorthand for `Lexer::new(source).tokenize()`.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str) -> Lexed {
    Lexer::new(source).tokenize()
}

/// Lex a source string, tagging every span with `file`.
#[tracing::instrument(skip_all, fields(file = file.0, source_len = source.len()))]
pub fn lex_file(source: &str, file: FileId) -> Lexed {
    let lexed = Lexer::with_file(source, file).tokenize();
    if !lexed.errors.is_empty() {
        tracing::debug!(count = lexed.errors.len(), "lexical errors");
    }
    lexed
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ErrorKind;
    use asthra_core::lang::keywords::{self, KeywordId};
    use asthra_core::lang::types::{self, PrimitiveId};

    fn kinds(source: &str) -> Vec<TokenKind> {
        let lexed = lex(source);
        assert!(lexed.errors.is_empty(), "unexpected errors: {:?}", lexed.errors);
        lexed.tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keyword_registry_parity() {
        for kw in keywords::KEYWORDS {
            let k = kinds(kw.canonical);
            assert_eq!(k[0], TokenKind::Keyword(kw.id), "keyword {:?}", kw.canonical);
        }
    }

    #[test]
    fn test_primitive_registry_parity() {
        for p in types::PRIMITIVES {
            let k = kinds(p.canonical);
            assert_eq!(k[0], TokenKind::Primitive(p.id), "primitive {:?}", p.canonical);
        }
    }

    #[test]
    fn test_operator_registry_parity() {
        for op in asthra_core::lang::operators::OPERATORS {
            let k = kinds(op.spelling);
            assert_eq!(k[0], TokenKind::Operator(op.id), "operator {:?}", op.spelling);
            assert_eq!(k.len(), 2);
        }
    }

    #[test]
    fn test_punctuation_registry_parity() {
        for p in asthra_core::lang::punctuation::PUNCTUATION {
            let k = kinds(p.canonical);
            assert_eq!(k[0], TokenKind::Punctuation(p.id), "punctuation {:?}", p.canonical);
        }
    }

    #[test]
    fn test_predeclared_names_are_identifiers() {
        for name in ["log", "range", "panic", "exit", "args", "len", "infinite"] {
            assert_eq!(kinds(name)[0], TokenKind::Ident(name.to_string()));
        }
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(kinds("Fn")[0], TokenKind::Ident("Fn".to_string()));
        assert_eq!(kinds("NONE")[0], TokenKind::Ident("NONE".to_string()));
        assert_eq!(kinds("none")[0], TokenKind::Keyword(KeywordId::None));
        assert_eq!(kinds("never")[0], TokenKind::Ident("never".to_string()));
        assert_eq!(kinds("Never")[0], TokenKind::Primitive(PrimitiveId::Never));
    }

    #[test]
    fn test_spans_track_lines_and_columns() {
        let lexed = lex("package main;\n  let x");
        let let_tok = &lexed.tokens[3];
        assert_eq!(let_tok.lexeme, "let");
        assert_eq!((let_tok.span.line, let_tok.span.col), (2, 3));
        assert_eq!(let_tok.span.start, 16);
    }

    #[test]
    fn test_comments_are_discarded() {
        let k = kinds("a // line\n/* block\n spanning */ b");
        assert_eq!(
            k,
            vec![TokenKind::Ident("a".into()), TokenKind::Ident("b".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_block_comments_do_not_nest() {
        let lexed = lex("/* outer /* inner */ x */");
        // `x` survives, then the stray `*/` is reported.
        assert!(lexed.tokens.iter().any(|t| t.kind == TokenKind::Ident("x".into())));
        assert_eq!(lexed.errors.len(), 1);
        assert_eq!(lexed.errors[0].kind, ErrorKind::Lexical);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let lexed = lex("a /* never closed");
        assert_eq!(lexed.errors.len(), 1);
        assert!(lexed.errors[0].message.contains("Unterminated block comment"));
    }

    #[test]
    fn test_multiple_errors_reported_with_resync() {
        let lexed = lex("let $x = 1; let y = 0xZZ; let z = `q;");
        assert_eq!(lexed.errors.len(), 3, "{:?}", lexed.errors);
        // Scanning resumed after each error.
        let idents: Vec<_> = lexed
            .tokens
            .iter()
            .filter_map(|t| match &t.kind {
                TokenKind::Ident(n) => Some(n.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(idents, vec!["y", "z"]);
    }

    #[test]
    fn test_shift_and_comparison_tokens() {
        use asthra_core::lang::operators::OperatorId;
        let k = kinds("a << b >= c >> d");
        assert_eq!(k[1], TokenKind::Operator(OperatorId::Shl));
        assert_eq!(k[3], TokenKind::Operator(OperatorId::GtEq));
        assert_eq!(k[5], TokenKind::Operator(OperatorId::Shr));
    }

    #[test]
    fn test_lexemes_cover_source_exactly() {
        let source = "pub fn f(none) -> i32 { return 0x1F + 2; }";
        let lexed = lex(source);
        for tok in &lexed.tokens {
            assert_eq!(&source[tok.span.start..tok.span.end], tok.lexeme);
        }
    }
}
