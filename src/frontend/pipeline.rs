//! Multi-module front-end driver.
//!
//! Runs the whole front end over a set of source modules:
//!
//! 1. Lex and parse every module, in parallel when [`AnalyzerConfig::parallel`] is set. Identifiers and string
//!    literals are interned into one shared [`Interner`] as they are lexed.
//! 2. Build the import graph with [`ModuleGraph::build`], collecting resolution problems.
//! 3. Analyse modules wave by wave. A wave only depends on earlier waves, so its modules are analysed in parallel
//!    against the read-only exports of modules already done.
//!
//! Modules with lexical or syntax errors are not analysed, and neither are modules on an import cycle. Their
//! dependents are still analysed; members reached through a skipped import are opaque.
//!
//! ## Examples
//! ```rust
//! use asthra::config::AnalyzerConfig;
//! use asthra::frontend::module::SourceModule;
//! use asthra::frontend::pipeline;
//!
//! let sources = vec![
//!     SourceModule::new("geo", "package geo;\npub fn double(x: i32) -> i32 { return x * 2; }\n"),
//!     SourceModule::new(
//!         "main",
//!         "package main;\nimport \"./geo\";\npub fn main(none) -> i32 { return geo.double(21); }\n",
//!     ),
//! ];
//! let compilation = pipeline::run(sources, &AnalyzerConfig::default());
//! assert!(!compilation.has_errors());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;

use crate::config::AnalyzerConfig;
use crate::frontend::analyzer::{self, AnalyzedModule, ImportBinding, ModuleExports};
use crate::frontend::ast::FileId;
use crate::frontend::diagnostics::{CompileError, ErrorKind};
use crate::frontend::intern::Interner;
use crate::frontend::lexer::{self, TokenKind};
use crate::frontend::module::{ImportTarget, ParsedModule, SourceModule};
use crate::frontend::parser;
use crate::frontend::resolver::{ModuleGraph, ResolveError};

/// Everything the front end produced for one compilation.
#[derive(Debug)]
pub struct Compilation {
    /// Modules in input order; a module's index is its [`FileId`].
    pub modules: Vec<ParsedModule>,
    pub graph: ModuleGraph,
    pub resolve_errors: Vec<ResolveError>,
    /// Analysis results by module index; `None` for modules that were not analysed.
    pub analyzed: Vec<Option<AnalyzedModule>>,
    pub interner: Arc<Interner>,
}

impl Compilation {
    /// All diagnostics of module `index`: lexical and syntax errors, resolution problems, then semantic errors.
    pub fn module_diagnostics(&self, index: usize) -> Vec<CompileError> {
        let mut out: Vec<CompileError> = self
            .modules
            .get(index)
            .map(|m| m.diagnostics.clone())
            .unwrap_or_default();
        out.extend(
            self.resolve_errors
                .iter()
                .filter(|e| e.module() == index)
                .map(ResolveError::to_compile_error),
        );
        if let Some(Some(analyzed)) = self.analyzed.get(index) {
            out.extend(analyzed.diagnostics.iter().cloned());
        }
        out
    }

    /// Diagnostics of every module, paired with the module index.
    pub fn diagnostics(&self) -> Vec<(usize, CompileError)> {
        (0..self.modules.len())
            .flat_map(|index| self.module_diagnostics(index).into_iter().map(move |d| (index, d)))
            .collect()
    }

    /// Error diagnostics, including those dropped by the per-module cap.
    pub fn error_count(&self) -> usize {
        let syntax = self
            .modules
            .iter()
            .flat_map(|m| &m.diagnostics)
            .filter(|d| d.is_error())
            .count();
        let semantic: usize = self.analyzed.iter().flatten().map(AnalyzedModule::error_count).sum();
        syntax + self.resolve_errors.len() + semantic
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn module_index(&self, name: &str) -> Option<usize> {
        self.modules.iter().position(|m| m.name == name)
    }
}

/// Lex and parse `sources` with a private intern table.
pub fn parse_modules(sources: Vec<SourceModule>, parallel: bool) -> Vec<ParsedModule> {
    parse_modules_with(sources, &Interner::new(), parallel)
}

/// Lex and parse `sources`, interning identifiers and string literals into `interner`.
#[tracing::instrument(skip_all, fields(module_count = sources.len(), parallel = parallel))]
pub fn parse_modules_with(sources: Vec<SourceModule>, interner: &Interner, parallel: bool) -> Vec<ParsedModule> {
    let parse_one = |(index, source): (usize, SourceModule)| {
        let file = FileId(u32::try_from(index).unwrap_or(u32::MAX));
        parse_module(source, file, interner)
    };
    if parallel {
        sources.into_par_iter().enumerate().map(parse_one).collect()
    } else {
        sources.into_iter().enumerate().map(parse_one).collect()
    }
}

fn parse_module(source: SourceModule, file: FileId, interner: &Interner) -> ParsedModule {
    let lexed = lexer::lex_file(&source.source, file);
    // Only the shared table is populated here. Tokens keep their text and consumers resolve atoms through
    // `Compilation::interner`, so the returned atoms are dropped.
    for token in &lexed.tokens {
        match &token.kind {
            TokenKind::Ident(name) => {
                interner.intern(name);
            }
            TokenKind::String { value, .. } => {
                interner.intern(value);
            }
            _ => {}
        }
    }
    let parsed = parser::parse(&lexed.tokens);
    let mut diagnostics = lexed.errors;
    diagnostics.extend(parsed.errors);
    ParsedModule {
        name: source.name,
        file,
        file_name: source.file_name,
        source: source.source,
        program: parsed.program,
        diagnostics,
    }
}

/// Run the front end over `sources`.
#[tracing::instrument(skip_all, fields(module_count = sources.len()))]
pub fn run(sources: Vec<SourceModule>, config: &AnalyzerConfig) -> Compilation {
    let interner = Interner::shared();
    let modules = parse_modules_with(sources, &interner, config.parallel);
    let (graph, resolve_errors) = ModuleGraph::build(&modules);
    if !resolve_errors.is_empty() {
        tracing::debug!(count = resolve_errors.len(), "module resolution problems");
    }

    let mut analyzed: Vec<Option<AnalyzedModule>> = (0..modules.len()).map(|_| None).collect();
    let mut exports: HashMap<String, Arc<ModuleExports>> = HashMap::new();

    for (wave_index, wave) in graph.waves().iter().enumerate() {
        let ready: Vec<usize> = wave.iter().copied().filter(|&i| is_analysable(&modules[i])).collect();
        tracing::debug!(wave = wave_index, scheduled = wave.len(), analysed = ready.len(), "analysis wave");

        let analyse_one = |&index: &usize| {
            let module = &modules[index];
            let imports = import_bindings(&modules, &graph, index);
            let result = analyzer::analyze_module(&module.program, &module.name, &imports, &exports, config);
            (index, result)
        };
        let results: Vec<(usize, AnalyzedModule)> = if config.parallel {
            ready.par_iter().map(analyse_one).collect()
        } else {
            ready.iter().map(analyse_one).collect()
        };

        for (index, result) in results {
            exports.insert(result.name.clone(), Arc::clone(&result.exports));
            analyzed[index] = Some(result);
        }
    }

    Compilation {
        modules,
        graph,
        resolve_errors,
        analyzed,
        interner,
    }
}

/// A module with lexical or syntax errors is never analysed.
fn is_analysable(module: &ParsedModule) -> bool {
    !module
        .diagnostics
        .iter()
        .any(|d| d.is_error() && matches!(d.kind, ErrorKind::Lexical | ErrorKind::Syntax))
}

fn import_bindings(modules: &[ParsedModule], graph: &ModuleGraph, index: usize) -> Vec<ImportBinding> {
    graph
        .imports(index)
        .iter()
        .map(|import| ImportBinding {
            binding: import.binding.clone(),
            path: import.path.clone(),
            module: match import.target {
                ImportTarget::Module(target) => modules.get(target).map(|m| m.name.clone()),
                ImportTarget::External => None,
            },
            span: import.span,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(items: &[(&str, &str)]) -> Vec<SourceModule> {
        items.iter().map(|(name, src)| SourceModule::new(*name, *src)).collect()
    }

    #[test]
    fn test_sequential_and_parallel_runs_agree() {
        let input = [
            ("a", "package a;\npub fn one(none) -> i32 { return 1; }\n"),
            ("b", "package b;\nimport \"./a\";\npub fn two(none) -> i32 { return a.one() + 1; }\n"),
            ("c", "package c;\nimport \"./a\";\npub fn bad(none) -> i32 { return missing; }\n"),
        ];
        let parallel = run(sources(&input), &AnalyzerConfig::default());
        let sequential = run(sources(&input), &AnalyzerConfig::default().with_parallel(false));
        assert_eq!(parallel.diagnostics(), sequential.diagnostics());
        assert_eq!(parallel.error_count(), 1);
    }

    #[test]
    fn test_syntax_errors_skip_analysis() {
        let compilation = run(
            sources(&[("a", "package a;\npub fn f(none) -> i32 { return missing }\n")]),
            &AnalyzerConfig::default(),
        );
        assert!(compilation.analyzed[0].is_none());
        assert!(compilation.has_errors());
        assert!(
            compilation
                .module_diagnostics(0)
                .iter()
                .all(|d| d.kind == ErrorKind::Syntax)
        );
    }

    #[test]
    fn test_identifiers_are_interned() {
        let compilation = run(
            sources(&[("a", "package a;\npub fn greet(none) -> void { log(\"hello\"); }\n")]),
            &AnalyzerConfig::default(),
        );
        assert!(compilation.interner.get("greet").is_some());
        assert!(compilation.interner.get("hello").is_some());
        assert!(compilation.interner.get("absent").is_none());
    }
}
