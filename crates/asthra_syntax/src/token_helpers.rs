//! Token predicates shared by the lexer and parser.
//!
//! Tokens carry registry ids from `asthra_core`, so call sites compare ids instead of spellings.

use asthra_core::lang::keywords::KeywordId;
use asthra_core::lang::operators::OperatorId;
use asthra_core::lang::punctuation::PunctuationId;

use crate::lexer::TokenKind;

impl TokenKind {
    pub fn is_keyword(&self, id: KeywordId) -> bool {
        matches!(self, TokenKind::Keyword(k) if *k == id)
    }

    /// The operator id, if this is an operator token.
    pub fn operator_id(&self) -> Option<OperatorId> {
        match self {
            TokenKind::Operator(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_operator(&self, id: OperatorId) -> bool {
        matches!(self, TokenKind::Operator(o) if *o == id)
    }

    pub fn is_punctuation(&self, id: PunctuationId) -> bool {
        matches!(self, TokenKind::Punctuation(p) if *p == id)
    }

    pub fn is_ident(&self) -> bool {
        matches!(self, TokenKind::Ident(_))
    }

    /// Whether a token of this kind can end an operand, so that a following `.5` is a tuple index and not a float.
    pub fn ends_operand(&self) -> bool {
        match self {
            TokenKind::Ident(_)
            | TokenKind::Int { .. }
            | TokenKind::Float(_)
            | TokenKind::String { .. }
            | TokenKind::Char(_) => true,
            TokenKind::Keyword(k) => matches!(
                k,
                KeywordId::SelfKw | KeywordId::True | KeywordId::False | KeywordId::Result | KeywordId::Option
            ),
            TokenKind::Punctuation(p) => {
                matches!(p, PunctuationId::RParen | PunctuationId::RBracket | PunctuationId::RBrace)
            }
            _ => false,
        }
    }
}
