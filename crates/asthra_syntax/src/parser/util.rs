/// Miscellaneous parser utilities.
///
/// This chunk contains small shared parsing helpers that don’t cleanly fit into
/// “decl”, “stmt”, “expr”, or “types” (identifier and string literal handling, struct-literal context).
impl<'a> Parser<'a> {
    // ========================================================================
    // Utilities
    // ========================================================================

    fn identifier(&mut self) -> Result<Ident, CompileError> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.expected("identifier")),
        }
    }

    fn identifier_spanned(&mut self) -> Result<Spanned<Ident>, CompileError> {
        let span = self.current_span();
        let name = self.identifier()?;
        Ok(Spanned::new(name, span))
    }

    fn string_literal(&mut self) -> Result<String, CompileError> {
        match &self.peek().kind {
            TokenKind::String { value, .. } => {
                let value = value.clone();
                self.advance();
                Ok(value)
            }
            _ => Err(self.expected("string literal")),
        }
    }

    /// Run `f` with struct literals allowed (`true`) or forbidden (`false`), restoring the previous setting.
    fn with_struct_literals<T>(
        &mut self,
        allow: bool,
        f: impl FnOnce(&mut Self) -> Result<T, CompileError>,
    ) -> Result<T, CompileError> {
        let saved = self.no_struct_literal;
        self.no_struct_literal = !allow;
        let result = f(self);
        self.no_struct_literal = saved;
        result
    }
}
