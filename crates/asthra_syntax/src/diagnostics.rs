//! Diagnostics and error reporting for Asthra.
//!
//! Every phase of the front end reports problems as [`CompileError`] values instead of failing fast. Each error
//! carries a [`ErrorKind`] from the fixed taxonomy (lexical, syntax, mutability, ...), a [`Severity`], the source
//! span, and optional notes/hints.
//!
//! ## Notes
//! - Errors are plain data; deciding whether accumulated diagnostics fail a build is a driver-level policy.
//! - [`format_error`] renders through `miette`'s graphical handler for terminal output.
//! - The [`errors`] catalog centralises message wording so tests and tooling can rely on it.

use std::fmt;

use miette::{GraphicalReportHandler, GraphicalTheme, LabeledSpan, MietteDiagnostic, NamedSource, Report};

use crate::ast::Span;

/// A compile-time diagnostic with location information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct CompileError {
    pub message: String,
    pub span: Span,
    pub kind: ErrorKind,
    pub severity: Severity,
    pub notes: Vec<String>,
    pub hints: Vec<String>,
}

impl CompileError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            kind,
            severity: Severity::Error,
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub fn lexical(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Lexical, message, span)
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Syntax, message, span)
    }

    pub fn type_error(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::TypeMismatch, message, span)
    }

    pub fn warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Convert into a `miette` diagnostic labelled at this error's byte range.
    pub fn to_diagnostic(&self) -> MietteDiagnostic {
        let len = self.span.end.saturating_sub(self.span.start);
        let mut help = self.hints.join("\n");
        for note in &self.notes {
            if !help.is_empty() {
                help.push('\n');
            }
            help.push_str("note: ");
            help.push_str(note);
        }
        let mut diag = MietteDiagnostic::new(self.message.clone())
            .with_code(self.kind.code())
            .with_severity(match self.severity {
                Severity::Error => miette::Severity::Error,
                Severity::Warning => miette::Severity::Warning,
            })
            .with_label(LabeledSpan::at(self.span.start..self.span.start + len, self.kind.to_string()));
        if !help.is_empty() {
            diag = diag.with_help(help);
        }
        diag
    }
}

/// Error taxonomy shared by every phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    /// Malformed literal, comment, or string.
    Lexical,
    /// Grammar mismatch (parser resynchronized).
    Syntax,
    /// Import graph is not a DAG.
    ImportCycle,
    /// Same name declared twice in one scope.
    DuplicateDeclaration,
    /// Private symbol accessed from another module.
    Visibility,
    /// Assignment to an immutable binding, parameter, or `self`.
    Mutability,
    /// Incompatible types.
    TypeMismatch,
    /// Generic, tuple, call, or variant argument count mismatch.
    Arity,
    /// `match` does not cover every variant.
    Exhaustiveness,
    /// Misplaced or mutually exclusive annotations.
    AnnotationConflict,
    /// Constant folding failed.
    ConstEval,
    /// Name, type, field, or module that does not exist.
    Unresolved,
}

impl ErrorKind {
    /// Stable diagnostic code, e.g. `asthra::mutability`.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Lexical => "asthra::lexical",
            ErrorKind::Syntax => "asthra::syntax",
            ErrorKind::ImportCycle => "asthra::import_cycle",
            ErrorKind::DuplicateDeclaration => "asthra::duplicate_declaration",
            ErrorKind::Visibility => "asthra::visibility",
            ErrorKind::Mutability => "asthra::mutability",
            ErrorKind::TypeMismatch => "asthra::type_mismatch",
            ErrorKind::Arity => "asthra::arity",
            ErrorKind::Exhaustiveness => "asthra::exhaustiveness",
            ErrorKind::AnnotationConflict => "asthra::annotation_conflict",
            ErrorKind::ConstEval => "asthra::const_eval",
            ErrorKind::Unresolved => "asthra::unresolved",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Lexical => "lexical error",
            ErrorKind::Syntax => "syntax error",
            ErrorKind::ImportCycle => "import cycle",
            ErrorKind::DuplicateDeclaration => "duplicate declaration",
            ErrorKind::Visibility => "visibility error",
            ErrorKind::Mutability => "mutability error",
            ErrorKind::TypeMismatch => "type error",
            ErrorKind::Arity => "arity error",
            ErrorKind::Exhaustiveness => "exhaustiveness error",
            ErrorKind::AnnotationConflict => "annotation error",
            ErrorKind::ConstEval => "const evaluation error",
            ErrorKind::Unresolved => "unresolved name",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Render an error with source context as a string (no ANSI colors).
pub fn format_error(file_name: &str, source: &str, error: &CompileError) -> String {
    render(file_name, source, error, GraphicalTheme::unicode_nocolor())
}

/// Render an error with source context using the terminal's color theme.
pub fn format_error_colored(file_name: &str, source: &str, error: &CompileError) -> String {
    render(file_name, source, error, GraphicalTheme::default())
}

fn render(file_name: &str, source: &str, error: &CompileError, theme: GraphicalTheme) -> String {
    let report = Report::new(error.to_diagnostic())
        .with_source_code(NamedSource::new(file_name, source.to_string()));
    let mut out = String::new();
    let handler = GraphicalReportHandler::new_themed(theme);
    if handler.render_report(&mut out, &*report).is_err() {
        // Fall back to the plain one-line form if the span does not fit the source.
        out = format!(
            "{}: {}\n  --> {}:{}:{}\n",
            error.severity, error, file_name, error.span.line, error.span.col
        );
    }
    out
}

// ============================================================================
// Error catalog
// ============================================================================

/// Constructors for the diagnostics every phase emits.
pub mod errors {
    use super::*;

    // ---- lexical -------------------------------------------------------------

    pub fn unexpected_char(c: char, span: Span) -> CompileError {
        CompileError::lexical(format!("Unexpected character '{}'", c.escape_default()), span)
    }

    pub fn unterminated_string(span: Span) -> CompileError {
        CompileError::lexical("Unterminated string literal", span)
            .with_hint("Close the string with '\"', or use \"\"\"...\"\"\" for multi-line text")
    }

    pub fn unterminated_comment(span: Span) -> CompileError {
        CompileError::lexical("Unterminated block comment", span)
            .with_note("Block comments do not nest; the first '*/' closes the comment")
    }

    pub fn invalid_escape(c: char, span: Span) -> CompileError {
        CompileError::lexical(format!("Invalid escape sequence '\\{}'", c.escape_default()), span)
            .with_hint("Supported escapes: \\n \\t \\r \\\\ \\\" \\' \\0")
    }

    pub fn invalid_number(kind: &str, text: &str, span: Span) -> CompileError {
        CompileError::lexical(format!("Invalid {} literal '{}'", kind, text), span)
    }

    pub fn invalid_char_literal(reason: &str, span: Span) -> CompileError {
        CompileError::lexical(format!("Invalid character literal: {}", reason), span)
    }

    // ---- syntax --------------------------------------------------------------

    pub fn expected_token(expected: &str, found: &str, span: Span) -> CompileError {
        CompileError::syntax(format!("Expected {}, found {}", expected, found), span)
    }

    pub fn missing_visibility(span: Span) -> CompileError {
        CompileError::syntax("Missing visibility modifier", span)
            .with_hint("Add 'pub' or 'priv' before the declaration")
    }

    pub fn empty_without_none(what: &str, span: Span) -> CompileError {
        CompileError::syntax(format!("Empty {} must be written as 'none'", what), span)
            .with_hint(format!("Use 'none' for empty {}", what))
    }

    pub fn stuttered_prefix(op: &str, span: Span) -> CompileError {
        CompileError::syntax(format!("Repeated prefix operator '{}' is not allowed", op), span)
            .with_note("A unary expression takes at most one logical and one pointer prefix")
            .with_hint("Use parentheses if the nesting is intentional")
    }

    pub fn nesting_too_deep(limit: usize, span: Span) -> CompileError {
        CompileError::syntax(format!("Nesting too deep (limit is {} levels)", limit), span)
            .with_hint("Split the expression or block into named helpers")
    }

    pub fn is_nesting_too_deep(error: &CompileError) -> bool {
        error.kind == ErrorKind::Syntax && error.message.starts_with("Nesting too deep")
    }

    // ---- declarations / scopes ----------------------------------------------

    pub fn duplicate_declaration(name: &str, span: Span, previous: Span) -> CompileError {
        CompileError::new(
            ErrorKind::DuplicateDeclaration,
            format!("'{}' is already declared in this scope", name),
            span,
        )
        .with_note(format!("previous declaration at {}:{}", previous.line, previous.col))
    }

    pub fn unknown_symbol(name: &str, span: Span) -> CompileError {
        CompileError::new(ErrorKind::Unresolved, format!("Unknown symbol '{}'", name), span)
            .with_hint("Did you forget to import it or declare it?")
    }

    pub fn unknown_type(name: &str, span: Span) -> CompileError {
        CompileError::new(ErrorKind::Unresolved, format!("Unknown type '{}'", name), span)
    }

    pub fn unknown_field(type_name: &str, field: &str, span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::Unresolved,
            format!("Type '{}' has no field or method '{}'", type_name, field),
            span,
        )
    }

    pub fn unknown_variant(enum_name: &str, variant: &str, span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::Unresolved,
            format!("Enum '{}' has no variant '{}'", enum_name, variant),
            span,
        )
    }

    pub fn private_access(name: &str, module: &str, span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::Visibility,
            format!("'{}' is private to module '{}'", name, module),
            span,
        )
        .with_hint(format!("Declare '{}' with 'pub' to use it from other modules", name))
    }

    // ---- mutability ----------------------------------------------------------

    pub fn mutation_without_mut(name: &str, span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::Mutability,
            format!("Cannot assign to '{}' - binding is immutable", name),
            span,
        )
        .with_hint(format!("Declare with 'mut' to allow mutation: let mut {}: ...", name))
    }

    pub fn assign_to_param(name: &str, span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::Mutability,
            format!("Cannot assign to parameter '{}'", name),
            span,
        )
        .with_hint(format!("Copy it into a local first: let mut {}_copy: ... = {};", name, name))
    }

    pub fn assign_to_self(span: Span) -> CompileError {
        CompileError::new(ErrorKind::Mutability, "Cannot assign to 'self' or its fields", span)
            .with_note("Method receivers are immutable")
    }

    pub fn assign_through_const_pointer(span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::Mutability,
            "Cannot assign through a '*const' pointer",
            span,
        )
        .with_hint("Use a '*mut' pointer for writable memory")
    }

    pub fn invalid_assignment_target(span: Span) -> CompileError {
        CompileError::new(ErrorKind::Mutability, "Invalid assignment target", span)
            .with_note("Only variables, fields, indexed elements, and dereferenced pointers can be assigned")
    }

    // ---- types ---------------------------------------------------------------

    pub fn type_mismatch(expected: &str, found: &str, span: Span) -> CompileError {
        let mut error = CompileError::type_error(
            format!("Type mismatch: expected '{}', found '{}'", expected, found),
            span,
        );
        if found.starts_with("Result<") && !expected.starts_with("Result<") {
            error = error.with_hint("Result is never unwrapped implicitly; use match to extract the value");
        }
        if found.starts_with("Option<") && !expected.starts_with("Option<") {
            error = error.with_hint("Option is never unwrapped implicitly; use match or 'if let'");
        }
        if expected.starts_with("TaskHandle<") || found.starts_with("TaskHandle<") {
            error = error.with_note("Task handles are produced by spawn_with_handle and consumed by await");
        }
        error
    }

    pub fn infinite_size(kind: &str, name: &str, span: Span) -> CompileError {
        CompileError::type_error(
            format!("Recursive {} '{}' contains itself by value and has infinite size", kind, name),
            span,
        )
        .with_hint(format!("Store the recursive member behind a pointer, e.g. '*mut {}'", name))
    }

    pub fn requires_unsafe(what: &str, span: Span) -> CompileError {
        CompileError::type_error(format!("{} requires an unsafe block", what), span)
            .with_hint("Wrap the operation in 'unsafe { ... }'")
    }

    pub fn await_non_handle(found: &str, span: Span) -> CompileError {
        CompileError::type_error(
            format!("'await' requires a task handle, found '{}'", found),
            span,
        )
        .with_hint("Create a handle with: spawn_with_handle h = task(...);")
    }

    pub fn spawn_requires_call(span: Span) -> CompileError {
        CompileError::syntax("spawn requires a function call", span)
    }

    // ---- arity ---------------------------------------------------------------

    pub fn generic_arity(name: &str, expected: usize, found: usize, span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::Arity,
            format!(
                "Type '{}' expects {} type argument(s), found {}",
                name, expected, found
            ),
            span,
        )
    }

    pub fn tuple_arity(expected: usize, found: usize, span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::Arity,
            format!("Tuple arity mismatch: expected {} element(s), found {}", expected, found),
            span,
        )
    }

    pub fn argument_count(name: &str, expected: &str, found: usize, span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::Arity,
            format!("'{}' expects {} argument(s), found {}", name, expected, found),
            span,
        )
    }

    // ---- exhaustiveness ------------------------------------------------------

    pub fn non_exhaustive_match(missing: &[String], span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::Exhaustiveness,
            format!("Non-exhaustive match: missing patterns for {}", missing.join(", ")),
            span,
        )
        .with_hint("Add the missing cases or use '_' as a wildcard")
    }

    pub fn unreachable_pattern(span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::Exhaustiveness,
            "Unreachable pattern: already covered by an earlier arm",
            span,
        )
    }

    // ---- annotations ---------------------------------------------------------

    pub fn conflicting_ffi_annotations(a: &str, b: &str, span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::AnnotationConflict,
            format!(
                "Conflicting FFI annotations: '#[{}]' and '#[{}]' are mutually exclusive. Only one FFI transfer annotation is allowed per declaration.",
                a, b
            ),
            span,
        )
    }

    pub fn conflicting_ownership(a: &str, b: &str, span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::AnnotationConflict,
            format!(
                "Conflicting ownership annotations: '{}' and '{}' are mutually exclusive",
                a, b
            ),
            span,
        )
    }

    pub fn borrowed_on_return(span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::AnnotationConflict,
            "FFI annotation '#[borrowed]' is not allowed on return types.",
            span,
        )
    }

    pub fn misplaced_annotation(name: &str, target: &str, span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::AnnotationConflict,
            format!("Annotation '#[{}]' is not allowed on a {}", name, target),
            span,
        )
    }

    pub fn invalid_annotation_argument(name: &str, expected: &[&str], span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::AnnotationConflict,
            format!(
                "Invalid argument for '#[{}]': expected one of {}",
                name,
                expected.join(", ")
            ),
            span,
        )
    }

    pub fn borrowed_requires_pointer(found: &str, span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::AnnotationConflict,
            format!("'#[borrowed]' requires a pointer parameter, found '{}'", found),
            span,
        )
    }

    pub fn constant_time_violation(construct: &str, span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::AnnotationConflict,
            format!("{} is not allowed in constant-time code", construct),
            span,
        )
        .with_note("'#[constant_time]' bodies run straight-line code with constant divisors and indices")
    }

    pub fn ownership_without_allocation(name: &str, span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::AnnotationConflict,
            format!("Ownership annotation on '{}' requires an allocating initializer", name),
            span,
        )
        .with_note("Struct, enum, tuple, array and string values and call results carry an ownership strategy")
    }

    // ---- const evaluation ----------------------------------------------------

    pub fn const_cycle(path: &[String], span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::ConstEval,
            format!("Const dependency cycle detected: {}", path.join(" -> ")),
            span,
        )
    }

    pub fn non_const_reference(name: &str, span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::ConstEval,
            format!("Non-const name '{}' is not allowed in a const expression", name),
            span,
        )
    }

    pub fn const_depth_exceeded(limit: usize, span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::ConstEval,
            format!("Const evaluation exceeded the maximum depth of {}", limit),
            span,
        )
    }

    pub fn const_eval_failed(reason: &str, span: Span) -> CompileError {
        CompileError::new(ErrorKind::ConstEval, format!("Cannot evaluate const expression: {}", reason), span)
    }

    // ---- modules -------------------------------------------------------------

    pub fn import_cycle(path: &[String], span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::ImportCycle,
            format!("Import cycle detected: {}", path.join(" -> ")),
            span,
        )
    }

    pub fn alias_collision(alias: &str, span: Span) -> CompileError {
        CompileError::new(
            ErrorKind::DuplicateDeclaration,
            format!("Import alias '{}' is already in use", alias),
            span,
        )
        .with_hint("Choose a different alias with: import \"path\" as other_name;")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = CompileError::syntax("Expected ';'", Span::new(0, 1));
        assert_eq!(err.to_string(), "syntax error: Expected ';'");
    }

    #[test]
    fn test_format_error_points_at_line() {
        let source = "package main;\nlet x: i32 = 1;\n";
        let err = errors::mutation_without_mut("x", Span::at(14, 17, 2, 1));
        let rendered = format_error("main.asthra", source, &err);
        assert!(rendered.contains("Cannot assign to 'x'"));
        assert!(rendered.contains("main.asthra"));
        assert!(rendered.contains("let mut x"));
    }

    #[test]
    fn test_conflict_message_wording() {
        let err = errors::conflicting_ffi_annotations("transfer_full", "borrowed", Span::default());
        assert_eq!(err.kind, ErrorKind::AnnotationConflict);
        assert!(err.message.starts_with(
            "Conflicting FFI annotations: '#[transfer_full]' and '#[borrowed]' are mutually exclusive."
        ));
    }
}
