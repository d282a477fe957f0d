/// Parse a token stream into an AST [`Program`].
///
/// This is the main public entrypoint for parsing.
///
/// ## Parameters
/// - `tokens`: Token stream produced by `asthra_syntax::lexer`.
///
/// ## Returns
/// The parsed program together with every syntax error found; the program is partial when errors were reported.
#[tracing::instrument(skip_all, fields(token_count = tokens.len()))]
pub fn parse(tokens: &[Token]) -> Parsed {
    let parsed = Parser::new(tokens).parse();
    if !parsed.errors.is_empty() {
        tracing::debug!(count = parsed.errors.len(), "syntax errors");
    }
    parsed
}

/// Lex and parse `source` in one step. Lexical errors come first in the returned error list.
pub fn parse_source(source: &str, file: FileId) -> Parsed {
    let lexed = crate::lexer::lex_file(source, file);
    let mut parsed = parse(&lexed.tokens);
    let mut errors = lexed.errors;
    errors.append(&mut parsed.errors);
    parsed.errors = errors;
    parsed
}
