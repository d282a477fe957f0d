//! Numeric literal scanning.
//!
//! Literal kind is decided by prefix alone: `0x`/`0X` hexadecimal, `0b`/`0B` binary, `0o` octal, otherwise decimal.
//! A decimal with a `.` is a float. There are no exponents or digit separators.

use super::{Lexer, is_ident_continue, is_ident_start};
use crate::diagnostics::errors;
use crate::lexer::tokens::{IntBase, TokenKind};

impl<'a> Lexer<'a> {
    /// Scan a numeric literal whose first digit has already been consumed.
    pub(super) fn scan_number(&mut self, start: usize, first: char) {
        if first == '0' {
            let base = match self.peek() {
                Some('x' | 'X') => Some(IntBase::Hex),
                Some('b' | 'B') => Some(IntBase::Binary),
                Some('o') => Some(IntBase::Octal),
                _ => None,
            };
            if let Some(base) = base {
                self.advance();
                self.scan_prefixed_int(start, base);
                return;
            }
        }

        self.consume_decimal_digits();

        let mut is_float = false;
        if self.peek() == Some('.') {
            match self.peek_next() {
                Some(d) if d.is_ascii_digit() => {
                    self.advance();
                    self.consume_decimal_digits();
                    is_float = true;
                }
                // `1..` and `1.len` keep the integer; `1.` on its own is a float.
                Some(c) if c == '.' || is_ident_start(c) => {}
                _ => {
                    self.advance();
                    is_float = true;
                }
            }
        }

        if self.reject_trailing_ident(start, if is_float { "float" } else { "integer" }) {
            return;
        }

        let text = &self.source[start..self.current_pos];
        if is_float {
            self.finish_float(start, text);
        } else {
            match text.parse::<u128>() {
                Ok(value) => self.add_token(
                    TokenKind::Int {
                        value,
                        base: IntBase::Decimal,
                    },
                    start,
                ),
                Err(_) => {
                    let span = self.span_from(start);
                    self.error(errors::invalid_number("integer", text, span).with_note("Integer literal out of range"));
                }
            }
        }
    }

    /// Scan `.digits` where the leading `.` has already been consumed.
    pub(super) fn scan_fraction_only(&mut self, start: usize) {
        self.consume_decimal_digits();
        if self.reject_trailing_ident(start, "float") {
            return;
        }
        let text = &self.source[start..self.current_pos];
        self.finish_float(start, text);
    }

    fn scan_prefixed_int(&mut self, start: usize, base: IntBase) {
        let digits_start = self.current_pos;
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                self.advance();
            } else {
                break;
            }
        }

        let digits = &self.source[digits_start..self.current_pos];
        let text = &self.source[start..self.current_pos];
        let kind = match base {
            IntBase::Hex => "hexadecimal",
            IntBase::Binary => "binary",
            IntBase::Octal => "octal",
            IntBase::Decimal => "integer",
        };

        let valid = !digits.is_empty() && digits.chars().all(|c| c.is_digit(base.radix()));
        if !valid {
            self.recover_to_whitespace();
            let span = self.span_from(start);
            let err = if digits.is_empty() {
                errors::invalid_number(kind, text, span).with_note(format!("Expected digits after '{}'", text))
            } else {
                errors::invalid_number(kind, text, span)
            };
            self.error(err);
            return;
        }

        match u128::from_str_radix(digits, base.radix()) {
            Ok(value) => self.add_token(TokenKind::Int { value, base }, start),
            Err(_) => {
                let span = self.span_from(start);
                self.error(errors::invalid_number(kind, text, span).with_note("Integer literal out of range"));
            }
        }
    }

    fn consume_decimal_digits(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// `123abc` is one malformed literal, not a number followed by an identifier.
    fn reject_trailing_ident(&mut self, start: usize, kind: &str) -> bool {
        if !self.peek().is_some_and(is_ident_continue) {
            return false;
        }
        self.recover_to_whitespace();
        let text = &self.source[start..self.current_pos];
        let span = self.span_from(start);
        self.error(errors::invalid_number(kind, text, span));
        true
    }

    fn finish_float(&mut self, start: usize, text: &str) {
        match text.parse::<f64>() {
            Ok(value) => self.add_token(TokenKind::Float(value), start),
            Err(_) => {
                let span = self.span_from(start);
                self.error(errors::invalid_number("float", text, span));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::ErrorKind;
    use crate::lexer::{IntBase, TokenKind, lex};
    use asthra_core::lang::punctuation::PunctuationId;

    fn single(source: &str) -> TokenKind {
        let lexed = lex(source);
        assert!(lexed.errors.is_empty(), "{:?}", lexed.errors);
        assert_eq!(lexed.tokens.len(), 2, "{:?}", lexed.tokens);
        lexed.tokens[0].kind.clone()
    }

    #[test]
    fn test_integer_bases() {
        assert_eq!(single("42"), TokenKind::Int { value: 42, base: IntBase::Decimal });
        assert_eq!(single("0xFF"), TokenKind::Int { value: 255, base: IntBase::Hex });
        assert_eq!(single("0Xff"), TokenKind::Int { value: 255, base: IntBase::Hex });
        assert_eq!(single("0b1010"), TokenKind::Int { value: 10, base: IntBase::Binary });
        assert_eq!(single("0B11"), TokenKind::Int { value: 3, base: IntBase::Binary });
        assert_eq!(single("0o17"), TokenKind::Int { value: 15, base: IntBase::Octal });
        assert_eq!(single("0"), TokenKind::Int { value: 0, base: IntBase::Decimal });
    }

    #[test]
    fn test_floats() {
        assert_eq!(single("3.14"), TokenKind::Float(3.14));
        assert_eq!(single("1."), TokenKind::Float(1.0));
        assert_eq!(single(".5"), TokenKind::Float(0.5));
    }

    #[test]
    fn test_invalid_prefixed_literals() {
        for (src, kind) in [("0x", "hexadecimal"), ("0b102", "binary"), ("0o9", "octal"), ("0xG1", "hexadecimal")] {
            let lexed = lex(src);
            assert_eq!(lexed.errors.len(), 1, "{}", src);
            assert_eq!(lexed.errors[0].kind, ErrorKind::Lexical);
            assert!(
                lexed.errors[0].message.contains(&format!("Invalid {} literal", kind)),
                "{}",
                lexed.errors[0].message
            );
        }
    }

    #[test]
    fn test_number_followed_by_letters_is_one_error() {
        let lexed = lex("123abc next");
        assert_eq!(lexed.errors.len(), 1);
        assert_eq!(lexed.tokens[0].kind, TokenKind::Ident("next".into()));
    }

    #[test]
    fn test_integer_overflow() {
        let lexed = lex("999999999999999999999999999999999999999999");
        assert_eq!(lexed.errors.len(), 1);
    }

    #[test]
    fn test_tuple_index_is_not_a_float() {
        let lexed = lex("t.0");
        assert!(lexed.errors.is_empty());
        let kinds: Vec<_> = lexed.tokens.iter().map(|t| t.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident("t".into()),
                TokenKind::Punctuation(PunctuationId::Dot),
                TokenKind::Int { value: 0, base: IntBase::Decimal },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_integer_method_access_keeps_integer() {
        let lexed = lex("1.len");
        assert!(lexed.errors.is_empty());
        assert_eq!(lexed.tokens[0].kind, TokenKind::Int { value: 1, base: IntBase::Decimal });
        assert_eq!(lexed.tokens[1].kind, TokenKind::Punctuation(PunctuationId::Dot));
    }
}
