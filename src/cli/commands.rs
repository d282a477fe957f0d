//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::AnalyzerConfig;
use crate::frontend::ast::{Declaration, FileId};
use crate::frontend::diagnostics::{self, CompileError};
use crate::frontend::module::{self, SourceModule};
use crate::frontend::pipeline::{self, Compilation};
use crate::frontend::{lexer, parser};

use super::{CliError, CliResult, ExitCode, OutputFormat};

/// Maximum source file size (100 MB)
///
/// Files larger than this are rejected to prevent out-of-memory conditions
/// during compilation.
const MAX_SOURCE_SIZE: u64 = 100 * 1024 * 1024;

fn read_source(path: &Path) -> CliResult<String> {
    let read_error = |source| CliError::Read {
        path: path.to_path_buf(),
        source,
    };
    let size = fs::metadata(path).map_err(read_error)?.len();
    if size > MAX_SOURCE_SIZE {
        return Err(CliError::TooLarge {
            path: path.to_path_buf(),
            size,
        });
    }
    fs::read_to_string(path).map_err(read_error)
}

// ============================================================================
// JSON output
// ============================================================================

/// Serialized form of one diagnostic.
#[derive(Debug, Serialize, PartialEq)]
pub struct JsonDiagnostic {
    pub file: String,
    pub line: u32,
    pub col: u32,
    pub start: usize,
    pub end: usize,
    pub severity: String,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

impl JsonDiagnostic {
    pub fn new(file: &str, error: &CompileError) -> Self {
        Self {
            file: file.to_string(),
            line: error.span.line,
            col: error.span.col,
            start: error.span.start,
            end: error.span.end,
            severity: error.severity.to_string(),
            code: error.kind.code(),
            message: error.message.clone(),
            notes: error.notes.clone(),
            hints: error.hints.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JsonModule {
    pub name: String,
    pub file: String,
    pub analysed: bool,
    /// Semantic errors dropped by the per-module cap.
    pub suppressed: usize,
}

/// Output of `asthra check --format json`.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub modules: Vec<JsonModule>,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub error_count: usize,
}

impl CheckReport {
    pub fn from_compilation(compilation: &Compilation) -> Self {
        let modules = compilation
            .modules
            .iter()
            .zip(&compilation.analyzed)
            .map(|(m, analyzed)| JsonModule {
                name: m.name.clone(),
                file: m.file_name.clone(),
                analysed: analyzed.is_some(),
                suppressed: analyzed.as_ref().map_or(0, |a| a.suppressed),
            })
            .collect();
        let diagnostics = compilation
            .diagnostics()
            .iter()
            .map(|(index, d)| JsonDiagnostic::new(&compilation.modules[*index].file_name, d))
            .collect();
        Self {
            modules,
            diagnostics,
            error_count: compilation.error_count(),
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_human(file_name: &str, source: &str, errors: &[CompileError]) {
    let colored = std::io::stdout().is_terminal();
    for error in errors {
        let rendered = if colored {
            diagnostics::format_error_colored(file_name, source, error)
        } else {
            diagnostics::format_error(file_name, source, error)
        };
        println!("{}", rendered.trim_end());
    }
}

fn exit_code_for(has_errors: bool) -> ExitCode {
    if has_errors { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// Commands
// ============================================================================

/// Load `files` as modules named relative to their common root and run the whole front end.
pub fn compile_files(files: &[PathBuf], config: &AnalyzerConfig) -> CliResult<Compilation> {
    if files.is_empty() {
        return Err(CliError::NoInput);
    }
    let root = module::common_root(files);
    let sources = files
        .iter()
        .map(|path| {
            let source = read_source(path)?;
            Ok(SourceModule::new(module::module_name_for(&root, path), source)
                .with_file_name(path.display().to_string()))
        })
        .collect::<CliResult<Vec<_>>>()?;
    tracing::debug!(module_count = sources.len(), root = %root.display(), "loaded modules");
    Ok(pipeline::run(sources, config))
}

/// `asthra check`
pub fn check_files(files: &[PathBuf], config: &AnalyzerConfig, format: OutputFormat) -> CliResult<ExitCode> {
    let compilation = compile_files(files, config)?;

    match format {
        OutputFormat::Json => print_json(&CheckReport::from_compilation(&compilation))?,
        OutputFormat::Human => {
            for (index, module) in compilation.modules.iter().enumerate() {
                print_human(&module.file_name, &module.source, &compilation.module_diagnostics(index));
                if let Some(Some(analyzed)) = compilation.analyzed.get(index) {
                    if analyzed.suppressed > 0 {
                        println!(
                            "note: {} more error(s) in '{}' not shown (limit {})",
                            analyzed.suppressed, module.name, config.max_errors_per_module
                        );
                    }
                }
            }
            let errors = compilation.error_count();
            if errors > 0 {
                println!("{} error(s) in {} module(s)", errors, compilation.modules.len());
            } else {
                println!("✓ {} module(s) checked", compilation.modules.len());
            }
        }
    }

    Ok(exit_code_for(compilation.has_errors()))
}

#[derive(Debug, Serialize)]
struct JsonToken {
    line: u32,
    col: u32,
    kind: String,
    lexeme: String,
}

#[derive(Debug, Serialize)]
struct LexReport {
    tokens: Vec<JsonToken>,
    diagnostics: Vec<JsonDiagnostic>,
}

/// `asthra lex`
pub fn lex_file(path: &Path, format: OutputFormat) -> CliResult<ExitCode> {
    let source = read_source(path)?;
    let file_name = path.display().to_string();
    let lexed = lexer::lex_file(&source, FileId(0));

    match format {
        OutputFormat::Json => print_json(&LexReport {
            tokens: lexed
                .tokens
                .iter()
                .map(|t| JsonToken {
                    line: t.span.line,
                    col: t.span.col,
                    kind: format!("{:?}", t.kind),
                    lexeme: t.lexeme.clone(),
                })
                .collect(),
            diagnostics: lexed.errors.iter().map(|e| JsonDiagnostic::new(&file_name, e)).collect(),
        })?,
        OutputFormat::Human => {
            for token in &lexed.tokens {
                println!("{}:{}\t{:?}\t{}", token.span.line, token.span.col, token.kind, token.lexeme);
            }
            print_human(&file_name, &source, &lexed.errors);
        }
    }

    Ok(exit_code_for(!lexed.errors.is_empty()))
}

#[derive(Debug, Serialize)]
struct JsonDeclaration {
    kind: &'static str,
    name: String,
    line: u32,
}

#[derive(Debug, Serialize)]
struct ParseReport {
    package: String,
    imports: Vec<String>,
    declarations: Vec<JsonDeclaration>,
    diagnostics: Vec<JsonDiagnostic>,
}

fn declaration_kind(decl: &Declaration) -> &'static str {
    match decl {
        Declaration::Function(_) => "function",
        Declaration::Struct(_) => "struct",
        Declaration::Enum(_) => "enum",
        Declaration::Extern(_) => "extern",
        Declaration::Const(_) => "const",
        Declaration::Impl(_) => "impl",
    }
}

/// `asthra parse`
pub fn parse_file(path: &Path, format: OutputFormat) -> CliResult<ExitCode> {
    let source = read_source(path)?;
    let file_name = path.display().to_string();
    let parsed = parser::parse_source(&source, FileId(0));

    match format {
        OutputFormat::Json => print_json(&ParseReport {
            package: parsed.program.package.node.clone(),
            imports: parsed.program.imports.iter().map(|i| i.node.path.clone()).collect(),
            declarations: parsed
                .program
                .declarations
                .iter()
                .map(|d| JsonDeclaration {
                    kind: declaration_kind(&d.node),
                    name: d.node.name().node.clone(),
                    line: d.span.line,
                })
                .collect(),
            diagnostics: parsed.errors.iter().map(|e| JsonDiagnostic::new(&file_name, e)).collect(),
        })?,
        OutputFormat::Human => {
            println!("{:#?}", parsed.program);
            print_human(&file_name, &source, &parsed.errors);
        }
    }

    Ok(exit_code_for(!parsed.errors.is_empty()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::frontend::diagnostics::ErrorKind;

    fn temp_project(name: &str, files: &[(&str, &str)]) -> (PathBuf, Vec<PathBuf>) {
        let dir = std::env::temp_dir().join(format!("asthra_cli_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let paths = files
            .iter()
            .map(|(file, source)| {
                let path = dir.join(file);
                fs::write(&path, source).unwrap();
                path
            })
            .collect();
        (dir, paths)
    }

    #[test]
    fn test_json_diagnostic_fields() {
        let mut span = crate::frontend::ast::Span::new(4, 9);
        span.line = 2;
        span.col = 3;
        let error = CompileError::new(ErrorKind::Mutability, "Cannot assign", span).with_hint("use mut");
        let json = serde_json::to_value(JsonDiagnostic::new("a.asthra", &error)).unwrap();
        assert_eq!(json["file"], "a.asthra");
        assert_eq!(json["line"], 2);
        assert_eq!(json["severity"], "error");
        assert_eq!(json["code"], ErrorKind::Mutability.code());
        assert_eq!(json["hints"][0], "use mut");
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn test_compile_files_names_modules_by_relative_path() {
        let (dir, paths) = temp_project(
            "names",
            &[
                ("util.asthra", "package util;\npub fn one(none) -> i32 { return 1; }\n"),
                (
                    "app.asthra",
                    "package app;\nimport \"./util\";\npub fn two(none) -> i32 { return util.one() + 1; }\n",
                ),
            ],
        );
        let compilation = compile_files(&paths, &AnalyzerConfig::default()).unwrap();
        let names: Vec<&str> = compilation.modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["util", "app"]);
        assert!(!compilation.has_errors(), "{:#?}", compilation.diagnostics());

        let report = CheckReport::from_compilation(&compilation);
        assert_eq!(report.error_count, 0);
        assert!(report.modules.iter().all(|m| m.analysed));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_missing_file_is_a_cli_error() {
        let missing = std::env::temp_dir().join("asthra_cli_definitely_missing.asthra");
        let result = compile_files(&[missing], &AnalyzerConfig::default());
        assert!(matches!(result, Err(CliError::Read { .. })));
    }

    #[test]
    fn test_check_exit_code_reflects_errors() {
        let (dir, paths) = temp_project("exit", &[("bad.asthra", "package bad;\npub fn f(none) -> i32 { return x; }\n")]);
        let code = check_files(&paths, &AnalyzerConfig::default(), OutputFormat::Json).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
        let _ = fs::remove_dir_all(dir);
    }
}
