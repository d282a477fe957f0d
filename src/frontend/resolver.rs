//! Module resolution: the import graph of a compilation and its analysis order.
//!
//! Every relative import is matched against the module set; `stdlib/` and remote imports stay external. The graph
//! must be a DAG. [`resolve`] is the strict entry point and fails on the first problem; [`ModuleGraph::build`] keeps
//! going, reports every problem, and leaves the members of each import cycle out of the schedule so unrelated modules
//! can still be analysed.
//!
//! ## Usage
//!
//! ```rust
//! use asthra::frontend::module::SourceModule;
//! use asthra::frontend::{pipeline, resolver};
//!
//! let modules = pipeline::parse_modules(
//!     vec![
//!         SourceModule::new("main", "package main; import \"./util\";"),
//!         SourceModule::new("util", "package util;"),
//!     ],
//!     false,
//! );
//! let graph = resolver::resolve(&modules).expect("acyclic");
//! let order: Vec<&str> = graph.order().iter().map(|&i| modules[i].name.as_str()).collect();
//! assert_eq!(order, ["util", "main"]);
//! ```

use std::collections::{BTreeSet, HashMap};

use crate::frontend::ast::Span;
use crate::frontend::diagnostics::{CompileError, ErrorKind, errors};
use crate::frontend::module::{self, ImportKind, ImportTarget, ParsedModule, ResolvedImport};

/// Problems found while building the import graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    /// The import graph is not a DAG; `path` starts and ends with the same module.
    #[error("import cycle detected: {}", path.join(" -> "))]
    CyclicImport { module: usize, path: Vec<String>, span: Span },
    /// Two modules share one name.
    #[error("module '{name}' is defined more than once")]
    DuplicateModule { module: usize, name: String, span: Span },
    /// Two imports of one module bind the same name.
    #[error("import alias '{alias}' is already in use")]
    AliasCollision { module: usize, alias: String, span: Span },
    /// An import path with no valid root.
    #[error("invalid import path '{path}'")]
    InvalidImportPath {
        module: usize,
        path: String,
        reason: module::ImportPathError,
        span: Span,
    },
}

impl ResolveError {
    /// Index of the module the problem is reported in.
    pub fn module(&self) -> usize {
        match self {
            ResolveError::CyclicImport { module, .. }
            | ResolveError::DuplicateModule { module, .. }
            | ResolveError::AliasCollision { module, .. }
            | ResolveError::InvalidImportPath { module, .. } => *module,
        }
    }

    pub fn to_compile_error(&self) -> CompileError {
        match self {
            ResolveError::CyclicImport { path, span, .. } => errors::import_cycle(path, *span)
                .with_note("Modules in an import cycle are not analysed"),
            ResolveError::DuplicateModule { name, span, .. } => CompileError::new(
                ErrorKind::DuplicateDeclaration,
                format!("Module '{}' is defined more than once", name),
                *span,
            ),
            ResolveError::AliasCollision { alias, span, .. } => errors::alias_collision(alias, *span),
            ResolveError::InvalidImportPath { path, reason, span, .. } => reason.into_error(path, *span),
        }
    }
}

/// The resolved import graph.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    /// Per module: its imports, in declaration order.
    imports: Vec<Vec<ResolvedImport>>,
    /// Per module: indices of the modules it depends on.
    deps: Vec<BTreeSet<usize>>,
    /// Modules grouped so every dependency of a wave lies in an earlier wave.
    waves: Vec<Vec<usize>>,
    /// Members of import cycles (never scheduled).
    cyclic: BTreeSet<usize>,
}

impl ModuleGraph {
    /// Build the graph, collecting every problem instead of stopping at the first.
    #[tracing::instrument(skip_all, fields(module_count = modules.len()))]
    pub fn build(modules: &[ParsedModule]) -> (Self, Vec<ResolveError>) {
        let mut problems = Vec::new();

        let mut by_name: HashMap<&str, usize> = HashMap::new();
        for (index, m) in modules.iter().enumerate() {
            if by_name.insert(m.name.as_str(), index).is_some() {
                problems.push(ResolveError::DuplicateModule {
                    module: index,
                    name: m.name.clone(),
                    span: m.program.package.span,
                });
            }
        }
        // First definition wins.
        for (index, m) in modules.iter().enumerate().rev() {
            by_name.insert(m.name.as_str(), index);
        }

        let mut imports = Vec::with_capacity(modules.len());
        let mut deps = vec![BTreeSet::new(); modules.len()];
        for (index, m) in modules.iter().enumerate() {
            let mut resolved = Vec::new();
            let mut bindings: HashMap<String, Span> = HashMap::new();
            for import in m.imports() {
                let path = import.node.path.as_str();
                let kind = match module::classify_import(path) {
                    Ok(kind) => kind,
                    Err(reason) => {
                        problems.push(ResolveError::InvalidImportPath {
                            module: index,
                            path: path.to_string(),
                            reason,
                            span: import.span,
                        });
                        continue;
                    }
                };

                let (binding, binding_span) = match &import.node.alias {
                    Some(alias) => (alias.node.clone(), alias.span),
                    None => (module::default_binding(path).to_string(), import.span),
                };
                if bindings.insert(binding.clone(), binding_span).is_some() {
                    problems.push(ResolveError::AliasCollision {
                        module: index,
                        alias: binding,
                        span: binding_span,
                    });
                    continue;
                }

                let target = match kind {
                    ImportKind::Relative => module::join_relative(&m.name, path)
                        .and_then(|name| by_name.get(name.as_str()).copied())
                        .map_or(ImportTarget::External, ImportTarget::Module),
                    ImportKind::Stdlib | ImportKind::Remote => ImportTarget::External,
                };
                if let ImportTarget::Module(dep) = target {
                    deps[index].insert(dep);
                }
                resolved.push(ResolvedImport {
                    path: path.to_string(),
                    kind,
                    binding,
                    target,
                    span: import.span,
                });
            }
            imports.push(resolved);
        }

        let cyclic = Self::report_cycles(modules, &imports, &deps, &mut problems);
        let waves = Self::schedule(&deps, &cyclic);
        tracing::debug!(waves = waves.len(), cyclic = cyclic.len(), "resolved module graph");

        (
            Self {
                imports,
                deps,
                waves,
                cyclic,
            },
            problems,
        )
    }

    /// Find strongly connected components that form cycles and report one error per member.
    fn report_cycles(
        modules: &[ParsedModule],
        imports: &[Vec<ResolvedImport>],
        deps: &[BTreeSet<usize>],
        problems: &mut Vec<ResolveError>,
    ) -> BTreeSet<usize> {
        let mut cyclic = BTreeSet::new();
        for component in strongly_connected(deps) {
            let is_cycle = component.len() > 1 || component.iter().any(|&m| deps[m].contains(&m));
            if !is_cycle {
                continue;
            }
            let members: BTreeSet<usize> = component.iter().copied().collect();
            for &member in &members {
                let path = cycle_path(member, deps, &members);
                let next = path.get(1).copied().unwrap_or(member);
                let span = imports[member]
                    .iter()
                    .find(|i| i.target == ImportTarget::Module(next))
                    .map(|i| i.span)
                    .unwrap_or(modules[member].program.package.span);
                problems.push(ResolveError::CyclicImport {
                    module: member,
                    path: path.iter().map(|&i| modules[i].name.clone()).collect(),
                    span,
                });
            }
            cyclic.extend(members);
        }
        cyclic
    }

    /// Kahn's algorithm by levels over the acyclic remainder; ties keep input order.
    fn schedule(deps: &[BTreeSet<usize>], cyclic: &BTreeSet<usize>) -> Vec<Vec<usize>> {
        let mut level: Vec<Option<usize>> = vec![None; deps.len()];
        let mut waves: Vec<Vec<usize>> = Vec::new();
        let mut remaining: Vec<usize> = (0..deps.len()).filter(|m| !cyclic.contains(m)).collect();

        while !remaining.is_empty() {
            let wave_index = waves.len();
            let ready: Vec<usize> = remaining
                .iter()
                .copied()
                .filter(|&m| {
                    deps[m]
                        .iter()
                        .filter(|d| !cyclic.contains(*d))
                        .all(|&d| level[d].is_some_and(|l| l < wave_index))
                })
                .collect();
            if ready.is_empty() {
                // Unreachable for an acyclic remainder; bail out instead of spinning.
                break;
            }
            for &m in &ready {
                level[m] = Some(wave_index);
            }
            remaining.retain(|m| level[*m].is_none());
            waves.push(ready);
        }
        waves
    }

    /// Analysis order: dependencies before dependents.
    pub fn order(&self) -> Vec<usize> {
        self.waves.iter().flatten().copied().collect()
    }

    /// Modules grouped into waves with no dependency inside a wave.
    pub fn waves(&self) -> &[Vec<usize>] {
        &self.waves
    }

    pub fn imports(&self, module: usize) -> &[ResolvedImport] {
        self.imports.get(module).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dependencies(&self, module: usize) -> impl Iterator<Item = usize> + '_ {
        self.deps.get(module).into_iter().flatten().copied()
    }

    /// Whether `module` sits on an import cycle and is excluded from analysis.
    pub fn is_cyclic(&self, module: usize) -> bool {
        self.cyclic.contains(&module)
    }
}

/// Resolve the import graph of `modules` into a topological order.
///
/// ## Errors
/// - The first [`ResolveError`] found (an import cycle, a duplicate module, an alias collision, or an invalid path).
#[tracing::instrument(skip_all, fields(module_count = modules.len()))]
pub fn resolve(modules: &[ParsedModule]) -> Result<ModuleGraph, ResolveError> {
    let (graph, mut problems) = ModuleGraph::build(modules);
    if problems.is_empty() {
        Ok(graph)
    } else {
        Err(problems.swap_remove(0))
    }
}

/// Tarjan's algorithm; components come out in reverse topological order.
fn strongly_connected(deps: &[BTreeSet<usize>]) -> Vec<Vec<usize>> {
    struct State<'a> {
        deps: &'a [BTreeSet<usize>],
        index: Vec<Option<usize>>,
        low: Vec<usize>,
        on_stack: Vec<bool>,
        stack: Vec<usize>,
        next: usize,
        components: Vec<Vec<usize>>,
    }

    fn visit(s: &mut State<'_>, v: usize) {
        s.index[v] = Some(s.next);
        s.low[v] = s.next;
        s.next += 1;
        s.stack.push(v);
        s.on_stack[v] = true;

        for &w in s.deps[v].iter() {
            match s.index[w] {
                None => {
                    visit(s, w);
                    s.low[v] = s.low[v].min(s.low[w]);
                }
                Some(w_index) if s.on_stack[w] => s.low[v] = s.low[v].min(w_index),
                Some(_) => {}
            }
        }

        if Some(s.low[v]) == s.index[v] {
            let mut component = Vec::new();
            while let Some(w) = s.stack.pop() {
                s.on_stack[w] = false;
                component.push(w);
                if w == v {
                    break;
                }
            }
            component.sort_unstable();
            s.components.push(component);
        }
    }

    let n = deps.len();
    let mut state = State {
        deps,
        index: vec![None; n],
        low: vec![0; n],
        on_stack: vec![false; n],
        stack: Vec::new(),
        next: 0,
        components: Vec::new(),
    };
    for v in 0..n {
        if state.index[v].is_none() {
            visit(&mut state, v);
        }
    }
    state.components
}

/// A cycle through `start` staying inside `members`, e.g. `[a, b, a]`.
fn cycle_path(start: usize, deps: &[BTreeSet<usize>], members: &BTreeSet<usize>) -> Vec<usize> {
    if deps[start].contains(&start) {
        return vec![start, start];
    }
    // Breadth-first search for the shortest way back to `start`.
    let mut parent: HashMap<usize, usize> = HashMap::new();
    let mut queue = std::collections::VecDeque::from([start]);
    while let Some(v) = queue.pop_front() {
        for &w in deps[v].iter().filter(|w| members.contains(*w)) {
            if w == start {
                let mut path = vec![start];
                let mut cur = v;
                while cur != start {
                    path.push(cur);
                    match parent.get(&cur) {
                        Some(&p) => cur = p,
                        None => break,
                    }
                }
                path[1..].reverse();
                path.push(start);
                return path;
            }
            if w != start && !parent.contains_key(&w) {
                parent.insert(w, v);
                queue.push_back(w);
            }
        }
    }
    vec![start, start]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::module::SourceModule;
    use crate::frontend::pipeline::parse_modules;
    use pretty_assertions::assert_eq;

    fn modules(sources: &[(&str, &str)]) -> Vec<ParsedModule> {
        parse_modules(
            sources
                .iter()
                .map(|(name, src)| SourceModule::new(*name, *src))
                .collect(),
            false,
        )
    }

    fn names(ms: &[ParsedModule], order: &[usize]) -> Vec<String> {
        order.iter().map(|&i| ms[i].name.clone()).collect()
    }

    #[test]
    fn test_dependencies_come_first() {
        let ms = modules(&[
            ("main", "package main; import \"./b\"; import \"./a\";"),
            ("a", "package a; import \"./c\";"),
            ("b", "package b;"),
            ("c", "package c;"),
        ]);
        let graph = resolve(&ms).expect("acyclic");
        assert_eq!(names(&ms, &graph.order()), ["b", "c", "a", "main"]);
        assert_eq!(graph.waves().len(), 3);
        assert_eq!(names(&ms, &graph.waves()[0]), ["b", "c"]);
    }

    #[test]
    fn test_external_imports_add_no_edges() {
        let ms = modules(&[(
            "main",
            "package main; import \"stdlib/io\"; import \"github.com/user/json\" as js;",
        )]);
        let graph = resolve(&ms).expect("acyclic");
        let imports = graph.imports(0);
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].binding, "io");
        assert_eq!(imports[0].kind, ImportKind::Stdlib);
        assert_eq!(imports[1].binding, "js");
        assert_eq!(imports[1].target, ImportTarget::External);
        assert_eq!(graph.dependencies(0).count(), 0);
    }

    #[test]
    fn test_cycle_reports_path() {
        let ms = modules(&[
            ("a", "package a; import \"./b\";"),
            ("b", "package b; import \"./a\";"),
        ]);
        let err = resolve(&ms).unwrap_err();
        match err {
            ResolveError::CyclicImport { path, .. } => assert_eq!(path, ["a", "b", "a"]),
            other => panic!("expected a cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_members_skipped_others_scheduled() {
        let ms = modules(&[
            ("a", "package a; import \"./b\";"),
            ("b", "package b; import \"./c\";"),
            ("c", "package c; import \"./a\";"),
            ("d", "package d;"),
        ]);
        let (graph, problems) = ModuleGraph::build(&ms);
        assert_eq!(problems.len(), 3);
        assert!(problems.iter().all(|p| matches!(p, ResolveError::CyclicImport { .. })));
        assert!(graph.is_cyclic(0) && graph.is_cyclic(1) && graph.is_cyclic(2));
        assert_eq!(names(&ms, &graph.order()), ["d"]);
    }

    #[test]
    fn test_self_import_is_a_cycle() {
        let ms = modules(&[("main", "package main; import \"./main\";")]);
        match resolve(&ms).unwrap_err() {
            ResolveError::CyclicImport { path, .. } => assert_eq!(path, ["main", "main"]),
            other => panic!("expected a cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_alias_collision() {
        let ms = modules(&[(
            "main",
            "package main; import \"stdlib/io\"; import \"github.com/me/io\";",
        )]);
        let err = resolve(&ms).unwrap_err();
        assert!(matches!(err, ResolveError::AliasCollision { ref alias, .. } if alias == "io"));
        assert!(err.to_compile_error().hints[0].contains("as other_name"));
    }

    #[test]
    fn test_duplicate_module_and_bad_path() {
        let ms = modules(&[
            ("util", "package util;"),
            ("util", "package util;"),
            ("main", "package main; import \"util\";"),
        ]);
        let (_, problems) = ModuleGraph::build(&ms);
        assert!(problems.iter().any(|p| matches!(p, ResolveError::DuplicateModule { module: 1, .. })));
        assert!(problems.iter().any(|p| matches!(
            p,
            ResolveError::InvalidImportPath {
                reason: module::ImportPathError::BareName,
                ..
            }
        )));
    }

    #[test]
    fn test_missing_relative_module_is_external() {
        let ms = modules(&[("main", "package main; import \"./missing\";")]);
        let graph = resolve(&ms).expect("no problems");
        assert_eq!(graph.imports(0)[0].target, ImportTarget::External);
    }
}
