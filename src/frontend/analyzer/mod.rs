//! Semantic analyzer for Asthra modules.
//!
//! Resolves names, checks types, and enforces the language's static rules for one parsed module at a time, against
//! the exports of the modules it imports. The analyzer fills a [`SymbolTable`] and a [`TypeInfo`] side table that
//! code generation consumes instead of re-deriving types from the AST.
//!
//! ## Notes
//!
//! - **Collect, then check**: the first pass ([`collect`]) registers every declaration, resolves signatures, fields,
//!   and variants, and attaches `impl` methods to their type. The second pass checks consts first, then bodies.
//! - **Error accumulation**: diagnostics are collected, never fatal. A failing expression yields
//!   [`ResolvedType::Unknown`], which is compatible with everything, so one mistake does not cascade.
//! - **Error cap**: at most [`AnalyzerConfig::max_errors_per_module`] errors are kept per module; the rest are
//!   counted in [`AnalyzedModule::suppressed`].
//! - **Cross-module access** goes through import bindings: `geo.area(s)` resolves `geo` to a module and checks the
//!   member's visibility. Members of external packages (stdlib, remote) are opaque and typed `Unknown`.
//!
//! ## What is validated
//!
//! - Every referenced symbol, type, field, method, and variant exists
//! - Type compatibility at `let`, assignment, call, return, and operator sites
//! - Mutability of assignment targets and `&mut` operands
//! - `unsafe` for pointer dereference and `extern` calls
//! - Generic and tuple arity, argument counts, overload selection by argument count
//! - Match exhaustiveness and unreachable arms
//! - Annotation placement, arguments, and mutual exclusion
//! - Const folding with cycle and depth detection
//!
//! ## Examples
//!
//! ```rust
//! use asthra::config::AnalyzerConfig;
//! use asthra::frontend::{analyzer, parser};
//! use asthra::frontend::ast::FileId;
//!
//! let source = "package demo;\npub fn main(none) -> i32 { let x: i32 = 1; x = 2; return x; }\n";
//! let parsed = parser::parse_source(source, FileId(0));
//! let analyzed = analyzer::analyze(&parsed.program, &AnalyzerConfig::default());
//! assert_eq!(analyzed.diagnostics.len(), 1);
//! ```
//!
//! ## See also
//!
//! - [`symbols`](super::symbols) for the symbol table and resolved types
//! - [`pipeline`](super::pipeline) for multi-module, wave-parallel analysis

mod annotations;
mod check_decl;
mod check_expr;
mod check_stmt;
mod collect;
mod const_eval;
mod patterns;
mod runtime;

#[cfg(test)]
mod tests;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use asthra_core::abi::RuntimeSymbol;

use crate::config::AnalyzerConfig;
use crate::frontend::ast::*;
use crate::frontend::diagnostics::CompileError;
use crate::frontend::symbols::*;

use const_eval::ConstEvalState;

/// Where a call site resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum CallTarget {
    /// A free function; `overload` indexes its signatures.
    Function {
        module: Option<String>,
        name: String,
        overload: usize,
        predeclared: bool,
    },
    /// A method or associated function of a struct or enum.
    Method { owner: NominalRef, name: String },
    /// An enum variant constructor. `owner` is `None` for `Result` and `Option`.
    Variant { owner: Option<NominalRef>, name: String },
}

/// Analysis output consumed by later stages.
///
/// ## Notes
/// - Keys are `(span.start, span.end)` so lookups need no AST node identity.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TypeInfo {
    /// Expression span -> resolved type.
    pub expr_types: HashMap<(usize, usize), ResolvedType>,
    /// Folded const values, by const name.
    pub const_values: HashMap<String, ConstValue>,
    /// Folded `[N]T` sizes and `[v; N]` counts, keyed by the size expression's span.
    pub array_sizes: HashMap<(usize, usize), u64>,
    /// Call expression span -> resolved callee.
    pub call_targets: HashMap<(usize, usize), CallTarget>,
}

impl TypeInfo {
    pub fn expr_type(&self, span: Span) -> Option<&ResolvedType> {
        self.expr_types.get(&(span.start, span.end))
    }

    pub fn call_target(&self, span: Span) -> Option<&CallTarget> {
        self.call_targets.get(&(span.start, span.end))
    }

    pub fn const_value(&self, name: &str) -> Option<&ConstValue> {
        self.const_values.get(name)
    }
}

/// A module-level declaration visible to importers (subject to its visibility).
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedItem {
    pub kind: SymbolKind,
    pub visibility: Visibility,
    pub span: Span,
}

/// Module-level declarations of one analysed module.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleExports {
    pub module: String,
    pub items: HashMap<String, ExportedItem>,
}

impl ModuleExports {
    fn from_symbols(module: &str, symbols: &SymbolTable) -> Self {
        let items = symbols
            .globals()
            .filter(|sym| !matches!(sym.kind, SymbolKind::Module(_)))
            .filter_map(|sym| {
                let visibility = sym.visibility?;
                Some((
                    sym.name.clone(),
                    ExportedItem {
                        kind: sym.kind.clone(),
                        visibility,
                        span: sym.span,
                    },
                ))
            })
            .collect();
        Self {
            module: module.to_string(),
            items,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ExportedItem> {
        self.items.get(name)
    }
}

/// An import as seen by the importing module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    /// Name bound in the importing module.
    pub binding: String,
    pub path: String,
    /// The imported module when it is part of the compilation.
    pub module: Option<String>,
    pub span: Span,
}

/// Result of analysing one module.
#[derive(Debug, Clone)]
pub struct AnalyzedModule {
    pub name: String,
    pub symbols: SymbolTable,
    pub info: TypeInfo,
    pub exports: Arc<ModuleExports>,
    /// Semantic diagnostics, in discovery order.
    pub diagnostics: Vec<CompileError>,
    /// Errors dropped by the per-module cap.
    pub suppressed: usize,
    /// Runtime entry points the module's constructs lower to.
    pub runtime: BTreeSet<RuntimeSymbol>,
}

impl AnalyzedModule {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count() + self.suppressed
    }
}

/// Per-function checking context.
#[derive(Debug, Clone)]
pub(crate) struct FnContext {
    pub name: String,
    pub return_type: ResolvedType,
}

/// Analyzer state for one module.
pub struct Analyzer<'a> {
    pub(crate) module: String,
    pub(crate) config: &'a AnalyzerConfig,
    /// Exports of already-analysed modules, by module name.
    pub(crate) deps: &'a HashMap<String, Arc<ModuleExports>>,
    pub(crate) symbols: SymbolTable,
    pub(crate) errors: Vec<CompileError>,
    pub(crate) suppressed: usize,
    pub(crate) info: TypeInfo,
    /// Module-level const declarations, for folding on demand.
    pub(crate) const_decls: HashMap<String, ConstDecl>,
    pub(crate) const_state: HashMap<String, ConstEvalState>,
    pub(crate) current_fn: Option<FnContext>,
    pub(crate) is_entry: bool,
}

impl<'a> Analyzer<'a> {
    pub fn new(
        module: impl Into<String>,
        config: &'a AnalyzerConfig,
        deps: &'a HashMap<String, Arc<ModuleExports>>,
    ) -> Self {
        Self {
            module: module.into(),
            config,
            deps,
            symbols: SymbolTable::new(),
            errors: Vec::new(),
            suppressed: 0,
            info: TypeInfo::default(),
            const_decls: HashMap::new(),
            const_state: HashMap::new(),
            current_fn: None,
            is_entry: false,
        }
    }

    /// Record a diagnostic, honouring the per-module error cap.
    pub(crate) fn report(&mut self, error: CompileError) {
        if error.is_error() {
            let kept = self.errors.iter().filter(|e| e.is_error()).count();
            if kept >= self.config.max_errors_per_module {
                self.suppressed += 1;
                return;
            }
        }
        self.errors.push(error);
    }

    pub(crate) fn record_type(&mut self, span: Span, ty: &ResolvedType) {
        self.info.expr_types.insert((span.start, span.end), ty.clone());
    }

    /// Run both passes over `program`.
    pub fn check_program(&mut self, program: &Program, imports: &[ImportBinding]) {
        self.is_entry = match &self.config.entry_module {
            Some(entry) => *entry == self.module,
            None => program.package.node == "main",
        };

        self.collect_program(program, imports);

        for decl in &program.declarations {
            if let Declaration::Const(konst) = &decl.node {
                self.check_const_declaration(konst);
            }
        }
        for decl in &program.declarations {
            if !matches!(decl.node, Declaration::Const(_)) {
                self.check_declaration(decl);
            }
        }
    }

    /// Consume the analyzer into its output.
    pub fn finish(self, program: &Program) -> AnalyzedModule {
        if self.suppressed > 0 {
            tracing::debug!(module = %self.module, suppressed = self.suppressed, "error cap reached");
        }
        let runtime = runtime::requirements(program, &self.module, &self.symbols, &self.info);
        let exports = Arc::new(ModuleExports::from_symbols(&self.module, &self.symbols));
        AnalyzedModule {
            name: self.module,
            symbols: self.symbols,
            info: self.info,
            exports,
            diagnostics: self.errors,
            suppressed: self.suppressed,
            runtime,
        }
    }

    /// Look up a struct or enum by identity, locally or in an analysed dependency.
    pub(crate) fn nominal_kind(&self, nominal: &NominalRef) -> Option<SymbolKind> {
        if nominal.module == self.module {
            let id = self.symbols.lookup_global(&nominal.name)?;
            return self.symbols.get(id).map(|sym| sym.kind.clone());
        }
        let item = self.deps.get(&nominal.module)?.get(&nominal.name)?;
        Some(item.kind.clone())
    }

    pub(crate) fn struct_info(&self, nominal: &NominalRef) -> Option<StructInfo> {
        match self.nominal_kind(nominal)? {
            SymbolKind::Struct(info) => Some(info),
            _ => None,
        }
    }

    pub(crate) fn enum_info(&self, nominal: &NominalRef) -> Option<EnumInfo> {
        match self.nominal_kind(nominal)? {
            SymbolKind::Enum(info) => Some(info),
            _ => None,
        }
    }

    pub(crate) fn symbol_kind(&self, name: &str) -> Option<(SymbolId, SymbolKind)> {
        let id = self.symbols.lookup(name)?;
        self.symbols.get(id).map(|sym| (id, sym.kind.clone()))
    }
}

/// Analyse one module against the exports of the modules it imports.
///
/// ## Parameters
/// - `program`: the parsed module.
/// - `name`: the module's name within the compilation.
/// - `imports`: the module's import bindings, as resolved by the module graph.
/// - `deps`: exports of already-analysed modules, by module name.
#[tracing::instrument(skip_all, fields(module = name, decl_count = program.declarations.len()))]
pub fn analyze_module(
    program: &Program,
    name: &str,
    imports: &[ImportBinding],
    deps: &HashMap<String, Arc<ModuleExports>>,
    config: &AnalyzerConfig,
) -> AnalyzedModule {
    let mut analyzer = Analyzer::new(name, config, deps);
    analyzer.check_program(program, imports);
    let analyzed = analyzer.finish(program);
    if !analyzed.diagnostics.is_empty() {
        tracing::debug!(count = analyzed.diagnostics.len(), "semantic diagnostics");
    }
    analyzed
}

/// Analyse a single module with no imports resolved; the module is named after its package.
pub fn analyze(program: &Program, config: &AnalyzerConfig) -> AnalyzedModule {
    let imports: Vec<ImportBinding> = program
        .imports
        .iter()
        .map(|import| ImportBinding {
            binding: import
                .node
                .alias
                .as_ref()
                .map(|alias| alias.node.clone())
                .unwrap_or_else(|| crate::frontend::module::default_binding(&import.node.path).to_string()),
            path: import.node.path.clone(),
            module: None,
            span: import.span,
        })
        .collect();
    analyze_module(program, &program.package.node, &imports, &HashMap::new(), config)
}
