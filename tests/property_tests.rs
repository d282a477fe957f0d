//! Property-based tests for the Asthra front end
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

use asthra::analyzer;
use asthra::config::AnalyzerConfig;
use asthra::frontend::ast::FileId;
use asthra::frontend::lexer::{self, TokenKind};
use asthra::frontend::parser;
use proptest::prelude::*;

// =============================================================================
// Robustness
// =============================================================================

proptest! {
    /// Property: lexing and parsing report problems as diagnostics, never by panicking
    #[test]
    fn arbitrary_input_never_panics(source in "\\PC{0,200}") {
        let lexed = lexer::lex(&source);
        let parsed = parser::parse(&lexed.tokens);
        prop_assert!(parsed.program.declarations.len() <= lexed.tokens.len());
    }

    /// Property: token-shaped noise is also survivable, including unbalanced braces
    #[test]
    fn token_soup_never_panics(
        parts in prop::collection::vec(
            prop::sample::select(vec![
                "fn", "pub", "priv", "let", "mut", "match", "if", "else", "{", "}", "(", ")",
                "[", "]", ";", ":", "->", "=>", "=", ",", ".", "x", "i32", "1", "\"s\"", "#[", "none",
            ]),
            0..60,
        )
    ) {
        let source = parts.join(" ");
        let parsed = parser::parse_source(&source, FileId(0));
        let _ = parsed.errors.len();
    }
}

// =============================================================================
// Lexer
// =============================================================================

fn ident_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,12}".prop_filter("Not reserved", |s| {
        lexer::keyword_id(s).is_none() && lexer::primitive_id(s).is_none()
    })
}

proptest! {
    /// Property: Identifiers remain intact after a trip through the lexer
    #[test]
    fn identifiers_survive_lexing(ident in ident_strategy()) {
        let source = format!("let {} = {};", ident, ident);
        let lexed = lexer::lex(&source);
        prop_assert!(lexed.errors.is_empty());

        let idents: Vec<&str> = lexed
            .tokens
            .iter()
            .filter_map(|t| match &t.kind {
                TokenKind::Ident(name) => Some(name.as_str()),
                _ => None,
            })
            .collect();
        prop_assert_eq!(idents, vec![ident.as_str(), ident.as_str()]);
    }

    /// Property: Token columns point at the token's text
    #[test]
    fn spans_cover_lexemes(ident in ident_strategy(), value in 0u32..100_000) {
        let source = format!("{} = {};", ident, value);
        let lexed = lexer::lex(&source);
        for token in lexed.tokens.iter().filter(|t| t.kind != TokenKind::Eof) {
            prop_assert_eq!(&source[token.span.start..token.span.end], token.lexeme.as_str());
        }
    }
}

// =============================================================================
// Analysis
// =============================================================================

fn function_strategy() -> impl Strategy<Value = String> {
    (ident_strategy(), ident_strategy(), 0i32..1000).prop_map(|(name, param, n)| {
        format!(
            "package gen;\npub fn f_{name}(p_{param}: i32) -> i32 {{ let mut acc: i32 = p_{param}; acc = acc + {n}; return acc; }}\n"
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: Well-typed generated functions analyse cleanly, and analysis is deterministic
    #[test]
    fn generated_functions_analyse_cleanly(source in function_strategy()) {
        let parsed = parser::parse_source(&source, FileId(0));
        prop_assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);

        let config = AnalyzerConfig::default();
        let first = analyzer::analyze(&parsed.program, &config);
        let second = analyzer::analyze(&parsed.program, &config);
        prop_assert!(first.diagnostics.is_empty(), "{:?}", first.diagnostics);
        prop_assert_eq!(&first.diagnostics, &second.diagnostics);
        prop_assert_eq!(&first.runtime, &second.runtime);
    }
}
