//! Runtime entry points a validated module lowers to.

use std::collections::BTreeSet;

use asthra_core::abi::RuntimeSymbol;

use crate::frontend::ast::{self, Expr, Literal, Program, Spanned, Visitor};
use crate::frontend::symbols::{SymbolKind, SymbolTable};

use super::{CallTarget, TypeInfo};

/// Collect the runtime symbols `program` needs, using the analysis results to classify calls.
pub(crate) fn requirements(
    program: &Program,
    module: &str,
    symbols: &SymbolTable,
    info: &TypeInfo,
) -> BTreeSet<RuntimeSymbol> {
    let mut scan = RuntimeScan {
        module,
        symbols,
        info,
        found: BTreeSet::new(),
    };
    scan.visit_program(program);
    scan.found
}

struct RuntimeScan<'a> {
    module: &'a str,
    symbols: &'a SymbolTable,
    info: &'a TypeInfo,
    found: BTreeSet<RuntimeSymbol>,
}

impl RuntimeScan<'_> {
    /// Ownership mode of a module-level struct or enum.
    fn ownership(&self, type_name: &str) -> Option<String> {
        let sym = self.symbols.get(self.symbols.lookup_global(type_name)?)?;
        match &sym.kind {
            SymbolKind::Struct(info) => info.ownership.clone(),
            SymbolKind::Enum(info) => info.ownership.clone(),
            _ => None,
        }
    }

    fn allocation(&mut self, ownership: Option<String>) {
        self.found.insert(RuntimeSymbol::Alloc);
        match ownership.as_deref() {
            Some("c") => {
                self.found.insert(RuntimeSymbol::Free);
            }
            // gc (the default) and pinned values are rooted for the collector.
            _ => {
                self.found.insert(RuntimeSymbol::GcRegisterRoot);
                self.found.insert(RuntimeSymbol::GcUnregisterRoot);
            }
        }
    }
}

impl Visitor for RuntimeScan<'_> {
    fn visit_expr(&mut self, expr: &Spanned<Expr>) {
        let info = self.info;
        match &expr.node {
            Expr::Literal(Literal::String(_)) => {
                self.found.insert(RuntimeSymbol::StringCreate);
                self.found.insert(RuntimeSymbol::StringFree);
            }
            Expr::StructLiteral(lit) => {
                let ownership = self.ownership(&lit.name.node);
                self.allocation(ownership);
            }
            Expr::Call(..) | Expr::EnumConstructor(_) => match info.call_target(expr.span) {
                Some(CallTarget::Function {
                    name, predeclared: true, ..
                }) => match name.as_str() {
                    "log" => {
                        self.found.insert(RuntimeSymbol::Log);
                    }
                    "panic" => {
                        self.found.insert(RuntimeSymbol::Panic);
                    }
                    _ => {}
                },
                // Variants with a payload are boxed.
                Some(CallTarget::Variant { owner: Some(owner), .. })
                    if matches!(&expr.node, Expr::EnumConstructor(c) if c.args.as_ref().is_some_and(|a| !a.is_empty())) =>
                {
                    let ownership = if owner.module == self.module {
                        self.ownership(&owner.name)
                    } else {
                        None
                    };
                    self.allocation(ownership);
                }
                _ => {}
            },
            _ => {}
        }
        ast::walk_expr(self, expr);
    }
}
