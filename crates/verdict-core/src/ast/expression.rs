//! FEEL expression AST nodes
//!
//! `Expr` is the normalized tree produced by the transformer. It contains no
//! parser scaffolding: groups are unwrapped, postfix chains are nested and
//! negative number literals are folded.

use super::operator::{ArithmeticOp, ComparisonOp, LogicalOp, Quantifier};
use crate::types::{FeelNumber, FeelValue};
use std::collections::BTreeSet;
use std::fmt;

/// Expression AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Number literal
    Number(FeelNumber),

    /// String literal
    String(String),

    /// Boolean literal
    Boolean(bool),

    /// `null`
    Null,

    /// Name reference (e.g., `age`, `?`)
    Field(String),

    /// `[a, b, c]`
    ListLiteral(Vec<Expr>),

    /// `{key: value, ...}`; later entries may refer to earlier keys
    ContextLiteral(Vec<(String, Expr)>),

    /// `[a..b]`, `(a..b)`, `]a..b]` with independent bound inclusivity
    Range {
        low: Box<Expr>,
        high: Box<Expr>,
        low_inclusive: bool,
        high_inclusive: bool,
    },

    Comparison {
        op: ComparisonOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    Arithmetic {
        op: ArithmeticOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `and`/`or` take two operands, `not` takes one
    Logical { op: LogicalOp, operands: Vec<Expr> },

    /// `value between low and high` (inclusive)
    Between {
        value: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },

    /// `value in target` where target is a list, range or single value
    In { value: Box<Expr>, target: Box<Expr> },

    /// `value instance of type`
    InstanceOf { value: Box<Expr>, type_name: FeelType },

    /// `if c then a else b`
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },

    /// `some/every x in list satisfies condition`
    Quantified {
        quantifier: Quantifier,
        variable: String,
        list: Box<Expr>,
        condition: Box<Expr>,
    },

    /// `for x in list return body`
    For {
        variable: String,
        list: Box<Expr>,
        body: Box<Expr>,
    },

    FunctionCall { name: String, args: Vec<Expr> },

    /// `target.property`
    PropertyAccess { target: Box<Expr>, property: String },

    /// `target[predicate]`; a numeric predicate indexes (1-based, negative from the end)
    Filter { target: Box<Expr>, predicate: Box<Expr> },

    /// `function(a, b) body`
    FunctionDefinition { params: Vec<String>, body: Box<Expr> },
}

/// Type names accepted by `instance of`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeelType {
    Number,
    String,
    Boolean,
    List,
    Context,
    Date,
    Time,
    Duration,
}

impl FeelType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "number" => Some(FeelType::Number),
            "string" => Some(FeelType::String),
            "boolean" => Some(FeelType::Boolean),
            "list" => Some(FeelType::List),
            "context" => Some(FeelType::Context),
            "date" => Some(FeelType::Date),
            "time" => Some(FeelType::Time),
            "duration" => Some(FeelType::Duration),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FeelType::Number => "number",
            FeelType::String => "string",
            FeelType::Boolean => "boolean",
            FeelType::List => "list",
            FeelType::Context => "context",
            FeelType::Date => "date",
            FeelType::Time => "time",
            FeelType::Duration => "duration",
        }
    }

    pub fn matches(&self, value: &FeelValue) -> bool {
        value.type_name() == self.name()
    }
}

impl fmt::Display for FeelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Expr {
    pub fn number(value: i64) -> Self {
        Expr::Number(FeelNumber::from_i64(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::String(value.into())
    }

    pub fn field(name: impl Into<String>) -> Self {
        Expr::Field(name.into())
    }

    pub fn comparison(left: Expr, op: ComparisonOp, right: Expr) -> Self {
        Expr::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn arithmetic(left: Expr, op: ArithmeticOp, right: Expr) -> Self {
        Expr::Arithmetic {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::Logical {
            op: LogicalOp::And,
            operands: vec![left, right],
        }
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Logical {
            op: LogicalOp::Or,
            operands: vec![left, right],
        }
    }

    pub fn not(operand: Expr) -> Self {
        Expr::Logical {
            op: LogicalOp::Not,
            operands: vec![operand],
        }
    }

    pub fn property(target: Expr, property: impl Into<String>) -> Self {
        Expr::PropertyAccess {
            target: Box::new(target),
            property: property.into(),
        }
    }

    /// Names referenced but not bound inside the expression.
    ///
    /// Quantifier, `for` and function parameters are bound in their bodies,
    /// and context literal keys are bound for the entries that follow them.
    /// Filter predicates are skipped since they resolve against list items.
    pub fn free_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_free_names(&mut Vec::new(), &mut names);
        names
    }

    fn collect_free_names(&self, bound: &mut Vec<String>, out: &mut BTreeSet<String>) {
        match self {
            Expr::Number(_) | Expr::String(_) | Expr::Boolean(_) | Expr::Null => {}
            Expr::Field(name) => {
                if !bound.iter().any(|b| b == name) {
                    out.insert(name.clone());
                }
            }
            Expr::ListLiteral(items) => {
                for item in items {
                    item.collect_free_names(bound, out);
                }
            }
            Expr::ContextLiteral(entries) => {
                let depth = bound.len();
                for (key, value) in entries {
                    value.collect_free_names(bound, out);
                    bound.push(key.clone());
                }
                bound.truncate(depth);
            }
            Expr::Range { low, high, .. } => {
                low.collect_free_names(bound, out);
                high.collect_free_names(bound, out);
            }
            Expr::Comparison { left, right, .. } | Expr::Arithmetic { left, right, .. } => {
                left.collect_free_names(bound, out);
                right.collect_free_names(bound, out);
            }
            Expr::Logical { operands, .. } => {
                for operand in operands {
                    operand.collect_free_names(bound, out);
                }
            }
            Expr::Between { value, low, high } => {
                value.collect_free_names(bound, out);
                low.collect_free_names(bound, out);
                high.collect_free_names(bound, out);
            }
            Expr::In { value, target } => {
                value.collect_free_names(bound, out);
                target.collect_free_names(bound, out);
            }
            Expr::InstanceOf { value, .. } => value.collect_free_names(bound, out),
            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                condition.collect_free_names(bound, out);
                then_branch.collect_free_names(bound, out);
                else_branch.collect_free_names(bound, out);
            }
            Expr::Quantified {
                variable,
                list,
                condition: body,
                ..
            }
            | Expr::For {
                variable,
                list,
                body,
            } => {
                list.collect_free_names(bound, out);
                bound.push(variable.clone());
                body.collect_free_names(bound, out);
                bound.pop();
            }
            Expr::FunctionCall { args, .. } => {
                for arg in args {
                    arg.collect_free_names(bound, out);
                }
            }
            Expr::PropertyAccess { target, .. } | Expr::Filter { target, .. } => {
                target.collect_free_names(bound, out)
            }
            Expr::FunctionDefinition { params, body } => {
                let depth = bound.len();
                bound.extend(params.iter().cloned());
                body.collect_free_names(bound, out);
                bound.truncate(depth);
            }
        }
    }

    /// Returns true if `name` occurs anywhere as a name reference
    pub fn references(&self, name: &str) -> bool {
        match self {
            Expr::Field(n) => n == name,
            Expr::Number(_) | Expr::String(_) | Expr::Boolean(_) | Expr::Null => false,
            Expr::ListLiteral(items) | Expr::FunctionCall { args: items, .. } => {
                items.iter().any(|e| e.references(name))
            }
            Expr::Logical { operands, .. } => operands.iter().any(|e| e.references(name)),
            Expr::ContextLiteral(entries) => entries.iter().any(|(_, e)| e.references(name)),
            Expr::Range { low, high, .. } => low.references(name) || high.references(name),
            Expr::Comparison { left, right, .. } | Expr::Arithmetic { left, right, .. } => {
                left.references(name) || right.references(name)
            }
            Expr::Between { value, low, high } => {
                value.references(name) || low.references(name) || high.references(name)
            }
            Expr::In { value, target } => value.references(name) || target.references(name),
            Expr::InstanceOf { value, .. } => value.references(name),
            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                condition.references(name)
                    || then_branch.references(name)
                    || else_branch.references(name)
            }
            Expr::Quantified {
                list, condition, ..
            } => list.references(name) || condition.references(name),
            Expr::For { list, body, .. } => list.references(name) || body.references(name),
            Expr::PropertyAccess { target, .. } => target.references(name),
            Expr::Filter { target, predicate } => {
                target.references(name) || predicate.references(name)
            }
            Expr::FunctionDefinition { body, .. } => body.references(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_expression() {
        let expr = Expr::property(Expr::field("user"), "age");
        assert_eq!(
            expr,
            Expr::PropertyAccess {
                target: Box::new(Expr::Field("user".to_string())),
                property: "age".to_string(),
            }
        );
    }

    #[test]
    fn test_free_names_skip_bound_variables() {
        // some x in items satisfies x > limit
        let expr = Expr::Quantified {
            quantifier: Quantifier::Some,
            variable: "x".to_string(),
            list: Box::new(Expr::field("items")),
            condition: Box::new(Expr::comparison(
                Expr::field("x"),
                ComparisonOp::Gt,
                Expr::field("limit"),
            )),
        };
        let names: Vec<_> = expr.free_names().into_iter().collect();
        assert_eq!(names, vec!["items".to_string(), "limit".to_string()]);
    }

    #[test]
    fn test_free_names_context_keys() {
        // {a: 1, b: a + c}
        let expr = Expr::ContextLiteral(vec![
            ("a".to_string(), Expr::number(1)),
            (
                "b".to_string(),
                Expr::arithmetic(Expr::field("a"), ArithmeticOp::Add, Expr::field("c")),
            ),
        ]);
        let names: Vec<_> = expr.free_names().into_iter().collect();
        assert_eq!(names, vec!["c".to_string()]);
    }

    #[test]
    fn test_references_placeholder() {
        let expr = Expr::comparison(Expr::field("?"), ComparisonOp::Lt, Expr::number(10));
        assert!(expr.references("?"));
        assert!(!Expr::number(10).references("?"));
    }

    #[test]
    fn test_feel_type_matches() {
        assert!(FeelType::Number.matches(&FeelValue::from(1_i64)));
        assert!(!FeelType::String.matches(&FeelValue::from(1_i64)));
        assert_eq!(FeelType::from_name("context"), Some(FeelType::Context));
        assert_eq!(FeelType::from_name("range"), None);
    }
}
