use std::collections::HashMap;

use asthra_core::abi;
use asthra_core::lang::annotations;
use asthra_core::lang::keywords;
use asthra_core::lang::operators;
use asthra_core::lang::predeclared;
use asthra_core::lang::punctuation;
use asthra_core::lang::types;

#[test]
fn keywords_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, keywords::KeywordId> = HashMap::new();

    for info in keywords::KEYWORDS {
        assert_eq!(
            keywords::from_str(info.canonical),
            Some(info.id),
            "keyword canonical spelling not resolvable: {}",
            info.canonical
        );
        if let Some(prev) = seen.insert(info.canonical, info.id) {
            panic!("duplicate keyword spelling {:?}: {:?} and {:?}", info.canonical, prev, info.id);
        }
    }
}

// `info_for` indexes each table by discriminant, so table order must follow the enum.
#[test]
fn registries_are_in_discriminant_order() {
    for (i, info) in keywords::KEYWORDS.iter().enumerate() {
        assert_eq!(info.id as usize, i, "keyword table out of order at {:?}", info.id);
    }
    for (i, info) in operators::OPERATORS.iter().enumerate() {
        assert_eq!(info.id as usize, i, "operator table out of order at {:?}", info.id);
    }
    for (i, info) in punctuation::PUNCTUATION.iter().enumerate() {
        assert_eq!(info.id as usize, i, "punctuation table out of order at {:?}", info.id);
    }
    for (i, info) in types::PRIMITIVES.iter().enumerate() {
        assert_eq!(info.id as usize, i, "primitive table out of order at {:?}", info.id);
    }
    for (i, info) in predeclared::PREDECLARED.iter().enumerate() {
        assert_eq!(info.id as usize, i, "predeclared table out of order at {:?}", info.id);
    }
    for (i, info) in annotations::ANNOTATIONS.iter().enumerate() {
        assert_eq!(info.id as usize, i, "annotation table out of order at {:?}", info.id);
    }
    for (i, info) in abi::RUNTIME_SYMBOLS.iter().enumerate() {
        assert_eq!(info.id as usize, i, "runtime symbol table out of order at {:?}", info.id);
    }
}

#[test]
fn vocabularies_do_not_overlap() {
    for p in predeclared::PREDECLARED {
        assert!(
            keywords::from_str(p.canonical).is_none(),
            "predeclared name must not be a keyword: {}",
            p.canonical
        );
        assert!(types::from_str(p.canonical).is_none());
    }
    for t in types::PRIMITIVES {
        assert!(
            keywords::from_str(t.canonical).is_none(),
            "primitive type spelled like a keyword: {}",
            t.canonical
        );
    }
}

#[test]
fn operator_precedence_tiers() {
    use operators::OperatorId::*;

    let p = operators::precedence;
    assert!(p(OrOr) < p(AndAnd));
    assert!(p(AndAnd) < p(Pipe));
    assert_eq!(p(Pipe), p(Amp));
    assert!(p(Amp) < p(EqEq));
    assert!(p(EqEq) < p(Lt), "equality and relational are separate tiers");
    assert!(p(Lt) < p(Shl));
    assert!(p(Shl) < p(Plus));
    assert!(p(Plus) < p(Star));
    assert!(p(Star) < operators::UNARY_PRECEDENCE);
    assert!(operators::UNARY_PRECEDENCE < operators::POSTFIX_PRECEDENCE);
}

#[test]
fn operator_and_punctuation_spellings_are_disjoint() {
    for op in operators::OPERATORS {
        assert!(
            punctuation::from_str(op.spelling).is_none(),
            "operator spelling also registered as punctuation: {}",
            op.spelling
        );
        assert_eq!(operators::from_str(op.spelling), Some(op.id));
    }
    for p in punctuation::PUNCTUATION {
        assert_eq!(punctuation::from_str(p.canonical), Some(p.id));
    }
}

#[test]
fn predeclared_overloads_have_distinct_arity() {
    for p in predeclared::PREDECLARED {
        let mut arities: Vec<usize> = p.signatures.iter().map(|s| s.params.len()).collect();
        arities.sort_unstable();
        arities.dedup();
        assert_eq!(arities.len(), p.signatures.len(), "ambiguous overloads for {}", p.canonical);
    }
}

#[test]
fn exclusive_annotation_groups() {
    use annotations::{AnnotationCategory, AnnotationId};

    let ffi: Vec<_> = annotations::ANNOTATIONS
        .iter()
        .filter(|a| a.category == AnnotationCategory::FfiTransfer)
        .map(|a| a.id)
        .collect();
    assert_eq!(
        ffi,
        vec![AnnotationId::TransferFull, AnnotationId::TransferNone, AnnotationId::Borrowed]
    );
    assert!(AnnotationCategory::FfiTransfer.is_exclusive());
    assert!(AnnotationCategory::Ownership.is_exclusive());
    assert!(!AnnotationCategory::Semantic.is_exclusive());
}

#[test]
fn runtime_symbols_are_prefixed() {
    for s in abi::RUNTIME_SYMBOLS {
        assert!(s.name.starts_with("asthra_"), "unexpected runtime symbol {}", s.name);
        assert_eq!(abi::from_name(s.name), Some(s.id));
    }
}
