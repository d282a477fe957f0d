//! Patterns: binding, type checking, and match coverage.
//!
//! Coverage uses the usefulness algorithm over a pattern matrix. Patterns are first lowered to [`Pat`], a tree of
//! constructors and wildcards; a type's constructors are its enum variants, `true`/`false`, or the single tuple
//! constructor. Types with unbounded value sets (integers, strings, ...) only have literal constructors, so a match
//! over them can never be shown complete and is not checked for exhaustiveness.

use std::collections::HashMap;

use asthra_core::lang::types::PrimitiveId;

use crate::frontend::ast::*;
use crate::frontend::diagnostics::{CompileError, errors};
use crate::frontend::symbols::*;

use super::Analyzer;

#[derive(Debug, Clone, PartialEq)]
enum Ctor {
    /// Rendered `Enum.Variant`.
    Variant(String),
    Bool(bool),
    Tuple(usize),
    /// Rendered literal of a type with unbounded values.
    Literal(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Pat {
    Wild,
    Ctor(Ctor, Vec<Pat>),
}

impl Pat {
    fn render(&self) -> String {
        match self {
            Pat::Wild => "_".to_string(),
            Pat::Ctor(ctor, args) => {
                let args: Vec<String> = args.iter().map(Pat::render).collect();
                match ctor {
                    Ctor::Tuple(_) => format!("({})", args.join(", ")),
                    Ctor::Bool(b) => b.to_string(),
                    Ctor::Literal(text) => text.clone(),
                    Ctor::Variant(name) if args.is_empty() => name.clone(),
                    Ctor::Variant(name) => format!("{}({})", name, args.join(", ")),
                }
            }
        }
    }
}

type Row = Vec<Pat>;

impl Analyzer<'_> {
    // ========================================================================
    // Checking and binding
    // ========================================================================

    /// Check `pat` against the scrutinee type and define its bindings in the current scope.
    pub(crate) fn check_pattern(&mut self, pat: &Spanned<Pattern>, expected: &ResolvedType) {
        match &pat.node {
            Pattern::Wildcard => {}
            Pattern::Binding { name, mutable } => {
                self.define_variable(name, expected.clone(), *mutable, BindingOrigin::Pattern, pat.span, true);
            }
            Pattern::Literal(lit) => {
                let ty = match lit {
                    Literal::Int(n) => self.check_int_literal(*n, false, Some(expected), pat.span),
                    Literal::Float(_) => ResolvedType::Primitive(PrimitiveId::Float),
                    Literal::String(_) => ResolvedType::Primitive(PrimitiveId::String),
                    Literal::Char(_) => ResolvedType::Primitive(PrimitiveId::Char),
                    Literal::Bool(_) => ResolvedType::BOOL,
                    Literal::Unit => ResolvedType::VOID,
                };
                self.expect_type(expected, &ty, pat.span);
            }
            Pattern::Tuple(elems) => match expected {
                ResolvedType::Tuple(types) if types.len() == elems.len() => {
                    for (elem, ty) in elems.iter().zip(types) {
                        self.check_pattern(elem, ty);
                    }
                }
                ResolvedType::Tuple(types) => {
                    self.report(errors::tuple_arity(types.len(), elems.len(), pat.span));
                    self.bind_unknown(elems);
                }
                ResolvedType::Unknown => self.bind_unknown(elems),
                other => {
                    self.report(errors::type_mismatch(&other.to_string(), "a tuple", pat.span));
                    self.bind_unknown(elems);
                }
            },
            Pattern::EnumVariant { enum_name, variant, args } => {
                let Some(payload) = self.variant_payload(enum_name, variant, expected, pat.span) else {
                    self.bind_unknown(args);
                    return;
                };
                // `Enum.Variant` without a list matches any payload.
                if args.is_empty() {
                    return;
                }
                if args.len() != payload.len() {
                    self.report(errors::argument_count(
                        &format!("{}.{}", enum_name, variant),
                        &payload.len().to_string(),
                        args.len(),
                        pat.span,
                    ));
                    self.bind_unknown(args);
                    return;
                }
                for (arg, ty) in args.iter().zip(&payload) {
                    self.check_pattern(arg, ty);
                }
            }
        }
    }

    fn bind_unknown(&mut self, pats: &[Spanned<Pattern>]) {
        for pat in pats {
            self.check_pattern(pat, &ResolvedType::Unknown);
        }
    }

    /// Payload types of `enum_name.variant` as seen from a scrutinee of type `expected`.
    fn variant_payload(
        &mut self,
        enum_name: &str,
        variant: &str,
        expected: &ResolvedType,
        span: Span,
    ) -> Option<Vec<ResolvedType>> {
        let unknown = ResolvedType::Unknown;
        match (enum_name, expected) {
            ("Result", ResolvedType::Result(..) | ResolvedType::Unknown)
            | ("Option", ResolvedType::Option(_) | ResolvedType::Unknown) => {
                let payload = match (variant, expected) {
                    ("Ok", ResolvedType::Result(ok, _)) => vec![(**ok).clone()],
                    ("Err", ResolvedType::Result(_, err)) => vec![(**err).clone()],
                    ("Some", ResolvedType::Option(inner)) => vec![(**inner).clone()],
                    ("Ok" | "Err", _) if enum_name == "Result" => vec![unknown],
                    ("Some", _) if enum_name == "Option" => vec![unknown],
                    ("None", _) if enum_name == "Option" => Vec::new(),
                    _ => {
                        self.report(errors::unknown_variant(enum_name, variant, span));
                        return None;
                    }
                };
                return Some(payload);
            }
            ("Result" | "Option", other) => {
                self.report(errors::type_mismatch(&other.to_string(), enum_name, span));
                return None;
            }
            _ => {}
        }

        let info = match self.symbol_kind(enum_name).map(|(_, kind)| kind) {
            Some(SymbolKind::Enum(info)) => info,
            Some(kind) => {
                self.report(CompileError::type_error(
                    format!("'{}' is a {}, not an enum", enum_name, kind.describe()),
                    span,
                ));
                return None;
            }
            None => {
                self.report(errors::unknown_type(enum_name, span));
                return None;
            }
        };
        let type_args = match expected {
            ResolvedType::Enum(nominal, type_args) if *nominal == info.nominal => type_args.clone(),
            ResolvedType::Unknown => Vec::new(),
            other => {
                self.report(errors::type_mismatch(&other.to_string(), enum_name, span));
                return None;
            }
        };
        let Some(found) = info.variant(variant) else {
            self.report(errors::unknown_variant(enum_name, variant, span));
            return None;
        };
        let bindings: HashMap<String, ResolvedType> = info.type_params.iter().cloned().zip(type_args).collect();
        Some(found.payload.iter().map(|t| t.instantiate(&info.type_params, &bindings)).collect())
    }

    // ========================================================================
    // Coverage
    // ========================================================================

    /// Report unreachable arms and, for types with a closed set of constructors, missing cases.
    pub(crate) fn check_match_coverage(&mut self, arms: &[Spanned<MatchArm>], scrutinee: &ResolvedType, span: Span) {
        let tys = [scrutinee.clone()];
        let mut matrix: Vec<Row> = Vec::new();
        for arm in arms {
            let row = vec![self.lower_pattern(&arm.node.pattern.node, scrutinee)];
            if !self.useful(&matrix, &row, &tys) {
                self.report(errors::unreachable_pattern(arm.node.pattern.span));
            }
            matrix.push(row);
        }

        let Some(all) = self.constructors(scrutinee) else {
            return;
        };
        let mut missing = Vec::new();
        for (ctor, fields) in all {
            let specialized = specialize(&matrix, &ctor, fields.len());
            if let Some(args) = self.witness(&specialized, &fields) {
                missing.push(Pat::Ctor(ctor, args).render());
            }
        }
        if !missing.is_empty() {
            self.report(errors::non_exhaustive_match(&missing, span));
        }
    }

    fn lower_pattern(&self, pat: &Pattern, ty: &ResolvedType) -> Pat {
        match pat {
            Pattern::Wildcard | Pattern::Binding { .. } => Pat::Wild,
            Pattern::Literal(Literal::Bool(b)) => Pat::Ctor(Ctor::Bool(*b), Vec::new()),
            Pattern::Literal(lit) => Pat::Ctor(Ctor::Literal(render_literal(lit)), Vec::new()),
            Pattern::Tuple(elems) => {
                let fields = self.ctor_fields(ty, &Ctor::Tuple(elems.len()), elems.len());
                let args = elems.iter().zip(&fields).map(|(e, t)| self.lower_pattern(&e.node, t)).collect();
                Pat::Ctor(Ctor::Tuple(elems.len()), args)
            }
            Pattern::EnumVariant { enum_name, variant, args } => {
                let ctor = Ctor::Variant(format!("{}.{}", enum_name, variant));
                let fields = self
                    .constructors(ty)
                    .and_then(|all| all.into_iter().find(|(c, _)| *c == ctor))
                    .map(|(_, fields)| fields);
                let args = match fields {
                    Some(fields) if args.is_empty() => vec![Pat::Wild; fields.len()],
                    Some(fields) => args.iter().zip(&fields).map(|(a, t)| self.lower_pattern(&a.node, t)).collect(),
                    None => args
                        .iter()
                        .map(|a| self.lower_pattern(&a.node, &ResolvedType::Unknown))
                        .collect(),
                };
                Pat::Ctor(ctor, args)
            }
        }
    }

    /// The complete constructor set of `ty` with each constructor's field types, if the set is finite.
    fn constructors(&self, ty: &ResolvedType) -> Option<Vec<(Ctor, Vec<ResolvedType>)>> {
        let variant = |name: &str| Ctor::Variant(name.to_string());
        match ty {
            ResolvedType::Primitive(PrimitiveId::Bool) => Some(vec![
                (Ctor::Bool(true), Vec::new()),
                (Ctor::Bool(false), Vec::new()),
            ]),
            ResolvedType::Tuple(types) => Some(vec![(Ctor::Tuple(types.len()), types.clone())]),
            ResolvedType::Result(ok, err) => Some(vec![
                (variant("Result.Ok"), vec![(**ok).clone()]),
                (variant("Result.Err"), vec![(**err).clone()]),
            ]),
            ResolvedType::Option(inner) => Some(vec![
                (variant("Option.Some"), vec![(**inner).clone()]),
                (variant("Option.None"), Vec::new()),
            ]),
            ResolvedType::Enum(nominal, type_args) => {
                let info = self.enum_info(nominal)?;
                let bindings: HashMap<String, ResolvedType> =
                    info.type_params.iter().cloned().zip(type_args.iter().cloned()).collect();
                Some(
                    info.variants
                        .iter()
                        .map(|v| {
                            let fields = v.payload.iter().map(|t| t.instantiate(&info.type_params, &bindings));
                            (variant(&format!("{}.{}", nominal.name, v.name)), fields.collect())
                        })
                        .collect(),
                )
            }
            _ => None,
        }
    }

    fn ctor_fields(&self, ty: &ResolvedType, ctor: &Ctor, arity: usize) -> Vec<ResolvedType> {
        self.constructors(ty)
            .and_then(|all| all.into_iter().find(|(c, _)| c == ctor))
            .map(|(_, fields)| fields)
            .filter(|fields| fields.len() == arity)
            .unwrap_or_else(|| vec![ResolvedType::Unknown; arity])
    }

    /// Whether `row` matches some value that no row of `matrix` matches.
    fn useful(&self, matrix: &[Row], row: &[Pat], tys: &[ResolvedType]) -> bool {
        let Some((head, rest)) = row.split_first() else {
            return matrix.is_empty();
        };
        let ty = tys.first().cloned().unwrap_or(ResolvedType::Unknown);
        let rest_tys = tys.get(1..).unwrap_or_default();

        match head {
            Pat::Ctor(ctor, args) => {
                let fields = self.ctor_fields(&ty, ctor, args.len());
                let row: Row = args.iter().chain(rest).cloned().collect();
                self.useful(&specialize(matrix, ctor, args.len()), &row, &concat(&fields, rest_tys))
            }
            Pat::Wild => match self.constructors(&ty) {
                Some(all) if covers_all(matrix, &all) => all.iter().any(|(ctor, fields)| {
                    let row: Row = std::iter::repeat_n(Pat::Wild, fields.len()).chain(rest.iter().cloned()).collect();
                    self.useful(&specialize(matrix, ctor, fields.len()), &row, &concat(fields, rest_tys))
                }),
                _ => self.useful(&default_rows(matrix), rest, rest_tys),
            },
        }
    }

    /// A row of patterns matching values that no row of `matrix` matches.
    fn witness(&self, matrix: &[Row], tys: &[ResolvedType]) -> Option<Row> {
        let Some((ty, rest_tys)) = tys.split_first() else {
            return matrix.is_empty().then(Vec::new);
        };

        match self.constructors(ty) {
            Some(all) if covers_all(matrix, &all) => all.into_iter().find_map(|(ctor, fields)| {
                let specialized = specialize(matrix, &ctor, fields.len());
                let mut found = self.witness(&specialized, &concat(&fields, rest_tys))?;
                let rest = found.split_off(fields.len());
                let mut row = vec![Pat::Ctor(ctor, found)];
                row.extend(rest);
                Some(row)
            }),
            all => {
                let rest = self.witness(&default_rows(matrix), rest_tys)?;
                let head = all
                    .and_then(|all| {
                        all.into_iter()
                            .find(|(ctor, _)| !heads(matrix).any(|h| h == ctor))
                            .map(|(ctor, fields)| Pat::Ctor(ctor, vec![Pat::Wild; fields.len()]))
                    })
                    .unwrap_or(Pat::Wild);
                let mut row = vec![head];
                row.extend(rest);
                Some(row)
            }
        }
    }
}

fn heads(matrix: &[Row]) -> impl Iterator<Item = &Ctor> {
    matrix.iter().filter_map(|row| match row.first() {
        Some(Pat::Ctor(ctor, _)) => Some(ctor),
        _ => None,
    })
}

fn covers_all(matrix: &[Row], all: &[(Ctor, Vec<ResolvedType>)]) -> bool {
    all.iter().all(|(ctor, _)| heads(matrix).any(|h| h == ctor))
}

/// Rows whose head matches `ctor`, with the head replaced by its `arity` sub-patterns.
fn specialize(matrix: &[Row], ctor: &Ctor, arity: usize) -> Vec<Row> {
    matrix
        .iter()
        .filter_map(|row| {
            let (head, rest) = row.split_first()?;
            let mut out: Row = match head {
                Pat::Ctor(c, args) if c == ctor => args.clone(),
                Pat::Ctor(..) => return None,
                Pat::Wild => vec![Pat::Wild; arity],
            };
            out.extend(rest.iter().cloned());
            Some(out)
        })
        .collect()
}

/// Rows with a wildcard head, minus the head.
fn default_rows(matrix: &[Row]) -> Vec<Row> {
    matrix
        .iter()
        .filter(|row| matches!(row.first(), Some(Pat::Wild)))
        .map(|row| row[1..].to_vec())
        .collect()
}

fn concat(a: &[ResolvedType], b: &[ResolvedType]) -> Vec<ResolvedType> {
    a.iter().chain(b).cloned().collect()
}

fn render_literal(lit: &Literal) -> String {
    match lit {
        Literal::Int(n) => n.to_string(),
        Literal::Float(f) => f.to_string(),
        Literal::String(s) => format!("{:?}", s),
        Literal::Char(c) => format!("{:?}", c),
        Literal::Bool(b) => b.to_string(),
        Literal::Unit => "()".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_nested_witness() {
        let pat = Pat::Ctor(
            Ctor::Tuple(2),
            vec![
                Pat::Ctor(Ctor::Variant("Option.Some".to_string()), vec![Pat::Wild]),
                Pat::Ctor(Ctor::Bool(false), Vec::new()),
            ],
        );
        assert_eq!(pat.render(), "(Option.Some(_), false)");
    }

    #[test]
    fn test_specialize_expands_wildcards() {
        let some = Ctor::Variant("Option.Some".to_string());
        let matrix = vec![
            vec![Pat::Ctor(some.clone(), vec![Pat::Ctor(Ctor::Bool(true), Vec::new())])],
            vec![Pat::Ctor(Ctor::Variant("Option.None".to_string()), Vec::new())],
            vec![Pat::Wild],
        ];
        let specialized = specialize(&matrix, &some, 1);
        assert_eq!(specialized.len(), 2);
        assert_eq!(specialized[1], vec![Pat::Wild]);
    }
}
