//! Parse tree to AST normalization
//!
//! `transform` is total over parser output: every node either converts or
//! yields a [`TransformError`] naming the offending subtree.

use super::parse_tree::{BinaryOp, ChainOp, ContextKey, ParseNode, PostfixOp, UnaryOp};
use crate::error::TransformError;
use std::collections::HashSet;
use verdict_core::ast::{ArithmeticOp, Expr, FeelType};
use verdict_core::FeelNumber;

pub type Result<T> = std::result::Result<T, TransformError>;

/// Normalize a raw parse tree into an `Expr`
pub fn transform(node: &ParseNode) -> Result<Expr> {
    Ok(match node {
        ParseNode::Number(text) => Expr::Number(number_literal(text, node)?),
        ParseNode::String(s) => Expr::String(s.clone()),
        ParseNode::Boolean(b) => Expr::Boolean(*b),
        ParseNode::Null => Expr::Null,
        ParseNode::Name(name) => Expr::Field(name.clone()),
        ParseNode::Group(inner) => transform(inner)?,
        ParseNode::Unary { op, operand } => {
            let operand = transform(operand)?;
            match op {
                UnaryOp::Plus => operand,
                UnaryOp::Minus => negate(operand),
                UnaryOp::Not => Expr::not(operand),
            }
        }
        ParseNode::Binary { op, left, right } => {
            let left = transform(left)?;
            let right = transform(right)?;
            match op {
                BinaryOp::Comparison(op) => Expr::comparison(left, *op, right),
                BinaryOp::Arithmetic(op) => Expr::arithmetic(left, *op, right),
            }
        }
        ParseNode::Chain { op, operands } => {
            let mut operands = operands.iter().map(transform);
            let first = operands
                .next()
                .ok_or_else(|| TransformError::new("empty logical chain", node))??;
            let combine: fn(Expr, Expr) -> Expr = match op {
                ChainOp::And => Expr::and,
                ChainOp::Or => Expr::or,
            };
            operands.try_fold(first, |acc, next| next.map(|right| combine(acc, right)))?
        }
        ParseNode::Between { value, low, high } => Expr::Between {
            value: Box::new(transform(value)?),
            low: Box::new(transform(low)?),
            high: Box::new(transform(high)?),
        },
        ParseNode::In { value, target } => Expr::In {
            value: Box::new(transform(value)?),
            target: Box::new(transform(target)?),
        },
        ParseNode::InstanceOf { value, type_name } => {
            let type_name = FeelType::from_name(type_name).ok_or_else(|| {
                TransformError::new(format!("unknown type '{}' in instance of", type_name), node)
            })?;
            Expr::InstanceOf {
                value: Box::new(transform(value)?),
                type_name,
            }
        }
        ParseNode::List(items) => {
            Expr::ListLiteral(items.iter().map(transform).collect::<Result<Vec<_>>>()?)
        }
        ParseNode::Context(entries) => {
            let mut seen = HashSet::new();
            let mut normalized = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                let key = match key {
                    ContextKey::Name(name) | ContextKey::String(name) => name.clone(),
                };
                if !seen.insert(key.clone()) {
                    return Err(TransformError::new(
                        format!("duplicate context key '{}'", key),
                        node,
                    ));
                }
                normalized.push((key, transform(value)?));
            }
            Expr::ContextLiteral(normalized)
        }
        ParseNode::Range {
            low,
            high,
            low_inclusive,
            high_inclusive,
        } => Expr::Range {
            low: Box::new(transform(low)?),
            high: Box::new(transform(high)?),
            low_inclusive: *low_inclusive,
            high_inclusive: *high_inclusive,
        },
        ParseNode::If {
            condition,
            then_branch,
            else_branch,
        } => Expr::Conditional {
            condition: Box::new(transform(condition)?),
            then_branch: Box::new(transform(then_branch)?),
            else_branch: Box::new(transform(else_branch)?),
        },
        ParseNode::Quantified {
            quantifier,
            variable,
            list,
            condition,
        } => Expr::Quantified {
            quantifier: *quantifier,
            variable: variable.clone(),
            list: Box::new(transform(list)?),
            condition: Box::new(transform(condition)?),
        },
        ParseNode::For {
            variable,
            list,
            body,
        } => Expr::For {
            variable: variable.clone(),
            list: Box::new(transform(list)?),
            body: Box::new(transform(body)?),
        },
        ParseNode::FunctionDef { params, body } => {
            let mut seen = HashSet::new();
            if let Some(dup) = params.iter().find(|p| !seen.insert(p.as_str())) {
                return Err(TransformError::new(
                    format!("duplicate parameter '{}'", dup),
                    node,
                ));
            }
            Expr::FunctionDefinition {
                params: params.clone(),
                body: Box::new(transform(body)?),
            }
        }
        ParseNode::Postfix { base, ops } => {
            let mut current = transform(base)?;
            for op in ops {
                current = match op {
                    PostfixOp::Property(property) => Expr::property(current, property.clone()),
                    PostfixOp::Filter(predicate) => Expr::Filter {
                        target: Box::new(current),
                        predicate: Box::new(transform(predicate)?),
                    },
                    PostfixOp::Call(args) => match current {
                        Expr::Field(name) => Expr::FunctionCall {
                            name,
                            args: args.iter().map(transform).collect::<Result<Vec<_>>>()?,
                        },
                        _ => {
                            return Err(TransformError::new(
                                "only named functions can be called",
                                node,
                            ))
                        }
                    },
                };
            }
            current
        }
    })
}

/// Unary minus; folds directly into number literals
pub(crate) fn negate(operand: Expr) -> Expr {
    match operand {
        Expr::Number(n) => Expr::Number(n.neg()),
        other => Expr::arithmetic(Expr::number(-1), ArithmeticOp::Mul, other),
    }
}

pub(crate) fn number_literal(text: &str, node: &ParseNode) -> Result<FeelNumber> {
    FeelNumber::parse_literal(text).map_err(|e| {
        TransformError::new(format!("invalid number literal '{}'", text), node).with_cause(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feel::parser::parse_tree;
    use verdict_core::ast::ComparisonOp;

    fn parse(source: &str) -> Expr {
        transform(&parse_tree(source).unwrap()).unwrap()
    }

    #[test]
    fn test_groups_are_unwrapped() {
        assert_eq!(parse("((x))"), Expr::field("x"));
    }

    #[test]
    fn test_negative_literal_folding() {
        assert_eq!(parse("-5"), Expr::number(-5));
        assert_eq!(parse("-1.50").to_string_literal(), "-1.50");
        assert_eq!(
            parse("-x"),
            Expr::arithmetic(Expr::number(-1), ArithmeticOp::Mul, Expr::field("x"))
        );
    }

    #[test]
    fn test_chain_left_associates() {
        assert_eq!(
            parse("a or b or c"),
            Expr::or(Expr::or(Expr::field("a"), Expr::field("b")), Expr::field("c"))
        );
    }

    #[test]
    fn test_postfix_threads_left_to_right() {
        assert_eq!(
            parse("a.b.c"),
            Expr::property(Expr::property(Expr::field("a"), "b"), "c")
        );
        assert_eq!(
            parse("max(a, 3)"),
            Expr::FunctionCall {
                name: "max".to_string(),
                args: vec![Expr::field("a"), Expr::number(3)],
            }
        );
    }

    #[test]
    fn test_context_keys_normalized() {
        assert_eq!(
            parse(r#"{a: 1, "b": a > 0}"#),
            Expr::ContextLiteral(vec![
                ("a".to_string(), Expr::number(1)),
                (
                    "b".to_string(),
                    Expr::comparison(Expr::field("a"), ComparisonOp::Gt, Expr::number(0))
                ),
            ])
        );
    }

    #[test]
    fn test_transform_errors() {
        let dup = transform(&parse_tree(r#"{a: 1, "a": 2}"#).unwrap()).unwrap_err();
        assert!(dup.message.contains("duplicate context key"));

        let bad_type = transform(&parse_tree("x instance of widget").unwrap()).unwrap_err();
        assert!(bad_type.message.contains("widget"));

        let bad_call = transform(&parse_tree("(f)(1)").unwrap());
        assert!(bad_call.is_ok(), "group around a name is unwrapped before calling");

        let bad_call = transform(&parse_tree("a.b(1)").unwrap()).unwrap_err();
        assert!(bad_call.subtree.contains("Postfix"));
    }

    trait LiteralText {
        fn to_string_literal(&self) -> String;
    }

    impl LiteralText for Expr {
        fn to_string_literal(&self) -> String {
            match self {
                Expr::Number(n) => n.to_string(),
                other => panic!("Expected number literal, got {:?}", other),
            }
        }
    }
}
