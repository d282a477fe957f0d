#![no_main]

use asthra_syntax::{lexer, parser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Lexer and parser both recover from errors, so every UTF-8 input must run to completion.
    if let Ok(s) = std::str::from_utf8(data) {
        let lexed = lexer::lex(s);
        let _ = parser::parse(&lexed.tokens);
    }
});
