//! FEEL expression front end
//!
//! Source text is tokenized once, then handed to the fast path. If the fast
//! path declines, the full grammar parser builds a raw parse tree which the
//! transformer normalizes into an [`Expr`].

pub mod fast_path;
pub mod lexer;
pub mod parse_tree;
pub mod parser;
pub mod transform;

use crate::error::FeelError;
use verdict_core::ast::Expr;

pub use parse_tree::ParseNode;
pub use unary_tests::{compile_unary_test, INPUT_PLACEHOLDER};

/// FEEL expression parser
pub struct FeelParser;

impl FeelParser {
    /// Parse an expression, using the fast path when it applies
    pub fn parse(source: &str) -> Result<Expr, FeelError> {
        let tokens = lexer::tokenize(source)?;
        if let Some(expr) = fast_path::parse_tokens(&tokens) {
            return Ok(expr);
        }
        tracing::trace!(source, "fast path declined, using full grammar");
        let tree = parser::parse_tokens(&tokens)?;
        Ok(transform::transform(&tree)?)
    }

    /// Parse with the full grammar only
    pub fn parse_full(source: &str) -> Result<Expr, FeelError> {
        let tree = parser::parse_tree(source)?;
        Ok(transform::transform(&tree)?)
    }

    /// Parse with the fast path only; `None` when it declines
    pub fn parse_fast(source: &str) -> Option<Expr> {
        let tokens = lexer::tokenize(source).ok()?;
        fast_path::parse_tokens(&tokens)
    }

    /// Raw parse tree, before transformation
    pub fn parse_tree(source: &str) -> Result<ParseNode, FeelError> {
        Ok(parser::parse_tree(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_core::ast::{ArithmeticOp, ComparisonOp};

    #[test]
    fn test_both_paths_agree_on_simple_input() {
        let source = "(a + 2) * b >= 10 and not c";
        assert_eq!(
            FeelParser::parse_fast(source).unwrap(),
            FeelParser::parse_full(source).unwrap()
        );
    }

    #[test]
    fn test_parse_falls_back_to_full_grammar() {
        let expr = FeelParser::parse("count([1, 2]) > 1").unwrap();
        assert_eq!(
            expr,
            Expr::comparison(
                Expr::FunctionCall {
                    name: "count".to_string(),
                    args: vec![Expr::ListLiteral(vec![Expr::number(1), Expr::number(2)])],
                },
                ComparisonOp::Gt,
                Expr::number(1),
            )
        );
    }

    #[test]
    fn test_parenthesized_precedence() {
        assert_eq!(
            FeelParser::parse("(2+3)*4").unwrap(),
            Expr::arithmetic(
                Expr::arithmetic(Expr::number(2), ArithmeticOp::Add, Expr::number(3)),
                ArithmeticOp::Mul,
                Expr::number(4),
            )
        );
    }

    #[test]
    fn test_errors_surface_as_parse_errors() {
        match FeelParser::parse("1 +") {
            Err(FeelError::Parse(err)) => assert_eq!(err.position, 3),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }
}
