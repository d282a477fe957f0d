//! Runtime ABI symbols.
//!
//! Code generation lowers every validated construct onto a fixed set of runtime entry points. The front end never
//! calls these, but it records which ones each module needs so the downstream consumer can verify linkage.
//!
//! ## Examples
//! ```rust
//! use asthra_core::abi::{self, RuntimeSymbol};
//!
//! assert_eq!(abi::symbol_name(RuntimeSymbol::Alloc), "asthra_alloc");
//! assert_eq!(abi::RUNTIME_SYMBOLS.len(), 8);
//! ```

/// Stable identifier for every runtime entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuntimeSymbol {
    Alloc,
    Free,
    GcRegisterRoot,
    GcUnregisterRoot,
    Panic,
    Log,
    StringCreate,
    StringFree,
}

/// Metadata for a runtime entry point.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeSymbolInfo {
    pub id: RuntimeSymbol,
    pub name: &'static str,
    pub purpose: &'static str,
}

/// Registry of runtime entry points, in [`RuntimeSymbol`] declaration order.
pub const RUNTIME_SYMBOLS: &[RuntimeSymbolInfo] = &[
    sym(RuntimeSymbol::Alloc, "asthra_alloc", "allocate memory in a region"),
    sym(RuntimeSymbol::Free, "asthra_free", "release manually managed memory"),
    sym(RuntimeSymbol::GcRegisterRoot, "asthra_gc_register_root", "pin a GC-managed value as a root"),
    sym(RuntimeSymbol::GcUnregisterRoot, "asthra_gc_unregister_root", "release a GC root"),
    sym(RuntimeSymbol::Panic, "asthra_panic", "abort with a message"),
    sym(RuntimeSymbol::Log, "asthra_log", "write a log message"),
    sym(RuntimeSymbol::StringCreate, "asthra_string_create", "materialise a string literal"),
    sym(RuntimeSymbol::StringFree, "asthra_string_free", "release a runtime string"),
];

/// Linker-visible symbol name.
pub fn symbol_name(id: RuntimeSymbol) -> &'static str {
    RUNTIME_SYMBOLS[id as usize].name
}

/// Lookup by linker-visible name.
pub fn from_name(name: &str) -> Option<RuntimeSymbol> {
    RUNTIME_SYMBOLS.iter().find(|s| s.name == name).map(|s| s.id)
}

const fn sym(id: RuntimeSymbol, name: &'static str, purpose: &'static str) -> RuntimeSymbolInfo {
    RuntimeSymbolInfo { id, name, purpose }
}
