//! Modules and import paths.
//!
//! A compilation is a set of source modules. Each module has a slash-separated name relative to the project root
//! (`main`, `net/http`), a [`FileId`] for diagnostics, and its source text. Import paths are classified by prefix:
//!
//! | Prefix | Kind | Resolved here? |
//! | --- | --- | --- |
//! | `stdlib/` | [`ImportKind::Stdlib`] | no, external |
//! | `github.com/`, `gitlab.com/`, ... | [`ImportKind::Remote`] | no, external |
//! | `./`, `../` | [`ImportKind::Relative`] | yes, against the module set |
//!
//! Whether an external path exists is the build system's concern; the front end only needs the path string and the
//! alias to build graph edges and bind a name.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::frontend::ast::{FileId, ImportDecl, Program, Span, Spanned};
use crate::frontend::diagnostics::{CompileError, ErrorKind};

/// File extension of Asthra sources.
pub const SOURCE_EXTENSION: &str = "asthra";

/// Hosts accepted as remote package roots.
pub const REMOTE_HOSTS: &[&str] = &["github.com/", "gitlab.com/", "bitbucket.org/", "codeberg.org/", "sr.ht/"];

const STDLIB_PREFIX: &str = "stdlib/";
const INTERNAL_PREFIX: &str = "internal/";

/// Import path classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// `stdlib/io`
    Stdlib,
    /// `github.com/user/repo`
    Remote,
    /// `./utils`, `../shared/math`
    Relative,
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportKind::Stdlib => write!(f, "standard library"),
            ImportKind::Remote => write!(f, "remote"),
            ImportKind::Relative => write!(f, "relative"),
        }
    }
}

/// Why an import path was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPathError {
    Empty,
    Whitespace,
    /// `internal/...` is reserved for the runtime.
    Internal,
    /// `utils` instead of `./utils`.
    BareName,
    /// A path with `/` and no recognised prefix.
    UnknownRoot,
    /// `stdlib/` or a host with nothing after it.
    MissingModule,
}

impl ImportPathError {
    pub fn into_error(self, path: &str, span: Span) -> CompileError {
        let (message, hint) = match self {
            ImportPathError::Empty => ("Import path is empty".to_string(), "Specify a path like \"stdlib/io\"".to_string()),
            ImportPathError::Whitespace => (
                format!("Import path '{}' contains stray whitespace", path),
                "Remove leading, trailing, or repeated spaces".to_string(),
            ),
            ImportPathError::Internal => (
                format!("Import path '{}' refers to an internal runtime package", path),
                "Internal packages cannot be imported by user code".to_string(),
            ),
            ImportPathError::BareName => (
                format!("Import path '{}' has no root", path),
                format!("Use \"./{}\" for a local module or \"stdlib/{}\" for the standard library", path, path),
            ),
            ImportPathError::UnknownRoot => (
                format!("Import path '{}' has an unknown root", path),
                "Use \"./\" for local modules, \"stdlib/\" or a host like \"github.com/user/repo\"".to_string(),
            ),
            ImportPathError::MissingModule => (
                format!("Import path '{}' names no module", path),
                "Add the module name, e.g. \"stdlib/string\" or \"github.com/user/repository\"".to_string(),
            ),
        };
        CompileError::new(ErrorKind::Unresolved, message, span).with_hint(hint)
    }
}

/// Classify an import path by prefix.
///
/// ## Examples
/// ```rust
/// use asthra::frontend::module::{self, ImportKind, ImportPathError};
///
/// assert_eq!(module::classify_import("stdlib/io"), Ok(ImportKind::Stdlib));
/// assert_eq!(module::classify_import("./utils"), Ok(ImportKind::Relative));
/// assert_eq!(module::classify_import("utils"), Err(ImportPathError::BareName));
/// ```
pub fn classify_import(path: &str) -> Result<ImportKind, ImportPathError> {
    if path.is_empty() {
        return Err(ImportPathError::Empty);
    }
    if path.trim() != path || path.contains("  ") {
        return Err(ImportPathError::Whitespace);
    }
    if let Some(rest) = path.strip_prefix(STDLIB_PREFIX) {
        return if rest.is_empty() {
            Err(ImportPathError::MissingModule)
        } else {
            Ok(ImportKind::Stdlib)
        };
    }
    if path.starts_with(INTERNAL_PREFIX) {
        return Err(ImportPathError::Internal);
    }
    if let Some(host) = REMOTE_HOSTS.iter().find(|h| path.contains(*h)) {
        let after = path.split_once(host).map(|(_, rest)| rest).unwrap_or_default();
        return if after.is_empty() {
            Err(ImportPathError::MissingModule)
        } else {
            Ok(ImportKind::Remote)
        };
    }
    if path.starts_with("./") || path.starts_with("../") {
        return Ok(ImportKind::Relative);
    }
    if path.contains('/') {
        Err(ImportPathError::UnknownRoot)
    } else {
        Err(ImportPathError::BareName)
    }
}

/// Resolve a relative import against the importing module's name.
///
/// `./b` from `a/main` is `a/b`; `../c` from `a/main` is `c`. Returns `None` when `..` climbs above the root.
pub fn join_relative(importer: &str, path: &str) -> Option<String> {
    let mut segments: Vec<&str> = importer.split('/').filter(|s| !s.is_empty()).collect();
    segments.pop();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other.strip_suffix(".asthra").unwrap_or(other)),
        }
    }
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// Name an import binds when no alias is given: its last path segment.
pub fn default_binding(path: &str) -> &str {
    let last = path.trim_end_matches('/').rsplit('/').next().unwrap_or(path);
    last.strip_suffix(".asthra").unwrap_or(last)
}

/// One module's source as handed over by the build system.
#[derive(Debug, Clone)]
pub struct SourceModule {
    /// Slash-separated module name, unique within the compilation.
    pub name: String,
    /// Display name for diagnostics (usually the file path).
    pub file_name: String,
    pub source: String,
}

impl SourceModule {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            file_name: format!("{}.{}", name, SOURCE_EXTENSION),
            name,
            source: source.into(),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Read `path`, naming the module by its location under `root`.
    pub fn load(root: &Path, path: &Path) -> std::io::Result<Self> {
        let source = fs::read_to_string(path)?;
        Ok(Self::new(module_name_for(root, path), source).with_file_name(path.display().to_string()))
    }
}

/// `root/net/http.asthra` is `net/http`.
pub fn module_name_for(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let without_ext: PathBuf = relative.with_extension("");
    without_ext
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Deepest directory containing every path; used as the project root for a file list.
pub fn common_root(paths: &[PathBuf]) -> PathBuf {
    let mut iter = paths.iter().filter_map(|p| p.parent());
    let Some(first) = iter.next() else {
        return PathBuf::from(".");
    };
    let mut root = first.to_path_buf();
    for parent in iter {
        while !parent.starts_with(&root) {
            if !root.pop() {
                return PathBuf::new();
            }
        }
    }
    root
}

/// A module after lexing and parsing.
#[derive(Debug, Clone)]
pub struct ParsedModule {
    pub name: String,
    pub file: FileId,
    pub file_name: String,
    pub source: String,
    pub program: Program,
    /// Lexical and syntax errors, in source order.
    pub diagnostics: Vec<CompileError>,
}

impl ParsedModule {
    pub fn imports(&self) -> impl Iterator<Item = &Spanned<ImportDecl>> {
        self.program.imports.iter()
    }
}

/// Where an import points after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportTarget {
    /// Index of another module in the compilation.
    Module(usize),
    /// Outside the compilation (stdlib, remote, or a relative path not supplied); its members are opaque.
    External,
}

/// An import with its classification, binding name, and target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImport {
    pub path: String,
    pub kind: ImportKind,
    /// Name the import binds in the importing module.
    pub binding: String,
    pub target: ImportTarget,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_import_prefixes() {
        assert_eq!(classify_import("stdlib/string"), Ok(ImportKind::Stdlib));
        assert_eq!(classify_import("github.com/user/repo"), Ok(ImportKind::Remote));
        assert_eq!(classify_import("codeberg.org/x/y"), Ok(ImportKind::Remote));
        assert_eq!(classify_import("../shared/math"), Ok(ImportKind::Relative));
    }

    #[test]
    fn test_classify_import_rejections() {
        assert_eq!(classify_import(""), Err(ImportPathError::Empty));
        assert_eq!(classify_import(" stdlib/io"), Err(ImportPathError::Whitespace));
        assert_eq!(classify_import("internal/gc"), Err(ImportPathError::Internal));
        assert_eq!(classify_import("stdlib/"), Err(ImportPathError::MissingModule));
        assert_eq!(classify_import("utils"), Err(ImportPathError::BareName));
        assert_eq!(classify_import("lib/utils"), Err(ImportPathError::UnknownRoot));
    }

    #[test]
    fn test_join_relative() {
        assert_eq!(join_relative("main", "./utils").as_deref(), Some("utils"));
        assert_eq!(join_relative("app/main", "./utils").as_deref(), Some("app/utils"));
        assert_eq!(join_relative("app/main", "../shared/math").as_deref(), Some("shared/math"));
        assert_eq!(join_relative("main", "./utils.asthra").as_deref(), Some("utils"));
        assert_eq!(join_relative("main", "../x"), None);
    }

    #[test]
    fn test_default_binding() {
        assert_eq!(default_binding("stdlib/io"), "io");
        assert_eq!(default_binding("github.com/user/repo"), "repo");
        assert_eq!(default_binding("./utils.asthra"), "utils");
    }

    #[test]
    fn test_module_name_for_nested_file() {
        let root = Path::new("/project");
        assert_eq!(module_name_for(root, Path::new("/project/net/http.asthra")), "net/http");
        assert_eq!(module_name_for(root, Path::new("/project/main.asthra")), "main");
    }

    #[test]
    fn test_common_root() {
        let paths = vec![PathBuf::from("/p/a/main.asthra"), PathBuf::from("/p/b/util.asthra")];
        assert_eq!(common_root(&paths), PathBuf::from("/p"));
        let single = vec![PathBuf::from("/p/main.asthra")];
        assert_eq!(common_root(&single), PathBuf::from("/p"));
    }
}
