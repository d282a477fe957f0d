//! String and character literal scanning.

use super::Lexer;
use crate::diagnostics::errors;
use crate::lexer::tokens::{StringForm, TokenKind};

/// Result of decoding one escape sequence after a backslash.
enum EscapeResult {
    Char(char),
    /// Unknown escape; already reported
    Invalid,
    /// Input ended after the backslash
    Eof,
}

impl<'a> Lexer<'a> {
    /// Scan a string whose opening `"` has already been consumed.
    pub(super) fn scan_string(&mut self, start: usize) {
        if self.rest().starts_with("\"\"") {
            self.advance();
            self.advance();
            self.scan_multiline(start, StringForm::Processed);
            return;
        }

        let mut value = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    let span = self.span_from(start);
                    self.error(errors::unterminated_string(span));
                    return;
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    let esc_start = self.current_pos;
                    self.advance();
                    match self.scan_escape(esc_start) {
                        EscapeResult::Char(c) => value.push(c),
                        EscapeResult::Invalid => {}
                        EscapeResult::Eof => {
                            let span = self.span_from(start);
                            self.error(errors::unterminated_string(span));
                            return;
                        }
                    }
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
            }
        }

        self.add_token(
            TokenKind::String {
                value,
                form: StringForm::Regular,
            },
            start,
        );
    }

    /// Scan `r"""..."""`; only the `r` has been consumed.
    pub(super) fn scan_raw_string(&mut self, start: usize) {
        for _ in 0..3 {
            self.advance();
        }
        self.scan_multiline(start, StringForm::Raw);
    }

    /// Body of a triple-quoted string, after the opening `"""`.
    fn scan_multiline(&mut self, start: usize, form: StringForm) {
        let mut value = String::new();
        loop {
            if self.rest().starts_with("\"\"\"") {
                for _ in 0..3 {
                    self.advance();
                }
                break;
            }
            match self.peek() {
                None => {
                    let span = self.span_from(start);
                    self.error(errors::unterminated_string(span));
                    return;
                }
                Some('\\') if form == StringForm::Processed => {
                    let esc_start = self.current_pos;
                    self.advance();
                    match self.scan_escape(esc_start) {
                        EscapeResult::Char(c) => value.push(c),
                        EscapeResult::Invalid => {}
                        EscapeResult::Eof => {
                            let span = self.span_from(start);
                            self.error(errors::unterminated_string(span));
                            return;
                        }
                    }
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
            }
        }

        self.add_token(TokenKind::String { value, form }, start);
    }

    /// Scan a character literal whose opening `'` has already been consumed.
    pub(super) fn scan_char(&mut self, start: usize) {
        let value = match self.peek() {
            Some('\'') => {
                self.advance();
                let span = self.span_from(start);
                self.error(errors::invalid_char_literal("empty character literal", span));
                return;
            }
            None | Some('\n') => {
                let span = self.span_from(start);
                self.error(errors::invalid_char_literal("unterminated character literal", span));
                return;
            }
            Some('\\') => {
                let esc_start = self.current_pos;
                self.advance();
                match self.scan_escape(esc_start) {
                    EscapeResult::Char(c) => Some(c),
                    EscapeResult::Invalid => None,
                    EscapeResult::Eof => {
                        let span = self.span_from(start);
                        self.error(errors::invalid_char_literal("unterminated character literal", span));
                        return;
                    }
                }
            }
            Some(c) => {
                self.advance();
                Some(c)
            }
        };

        if !self.match_char('\'') {
            // Consume the rest of the would-be literal so scanning resumes after it.
            while let Some(c) = self.peek() {
                if c == '\n' {
                    break;
                }
                self.advance();
                if c == '\'' {
                    break;
                }
            }
            let span = self.span_from(start);
            self.error(
                errors::invalid_char_literal("must contain exactly one character", span)
                    .with_hint("Use double quotes for strings"),
            );
            return;
        }

        if let Some(c) = value {
            self.add_token(TokenKind::Char(c), start);
        }
    }

    /// Decode the escape after a backslash. `esc_start` is the backslash offset.
    fn scan_escape(&mut self, esc_start: usize) -> EscapeResult {
        let Some(c) = self.advance() else {
            return EscapeResult::Eof;
        };
        match c {
            'n' => EscapeResult::Char('\n'),
            't' => EscapeResult::Char('\t'),
            'r' => EscapeResult::Char('\r'),
            '\\' => EscapeResult::Char('\\'),
            '"' => EscapeResult::Char('"'),
            '\'' => EscapeResult::Char('\''),
            '0' => EscapeResult::Char('\0'),
            other => {
                let span = crate::ast::Span::at(esc_start, self.current_pos, self.line, self.escape_col(esc_start))
                    .with_file(self.file);
                self.error(errors::invalid_escape(other, span));
                EscapeResult::Invalid
            }
        }
    }

    fn escape_col(&self, offset: usize) -> u32 {
        (offset.saturating_sub(self.line_start)) as u32 + 1
    }
}
