//! Tree-walking FEEL evaluator
//!
//! Walks an [`Expr`] against a [`Context`]. Iteration variables, filter items
//! and function parameters are bound in child scopes; the input context is
//! never modified.

use super::arithmetic;
use super::builtins;
use super::scope::Scope;
use crate::context::Context;
use crate::error::{Result, RuntimeError};
use std::sync::Arc;
use verdict_core::ast::{Expr, LogicalOp, Quantifier, UnaryTest};
use verdict_core::{FeelContext, FeelFunction, FeelValue};
use verdict_parser::{FeelParser, INPUT_PLACEHOLDER};

/// FEEL expression evaluator
pub struct FeelEvaluator;

impl FeelEvaluator {
    /// Evaluate an expression against a context
    pub fn evaluate(expr: &Expr, context: &Context) -> Result<FeelValue> {
        eval(expr, &Scope::Root(context.values()))
    }

    /// Parse and evaluate FEEL source
    pub fn evaluate_str(source: &str, context: &Context) -> Result<FeelValue> {
        let expr = FeelParser::parse(source)?;
        Self::evaluate(&expr, context)
    }

    /// Call a user-defined function value
    pub fn invoke(function: &FeelFunction, args: Vec<FeelValue>) -> Result<FeelValue> {
        invoke(function, args)
    }

    /// Test a decision-table input value against a compiled unary test.
    ///
    /// A wildcard matches anything. When the test names something that is
    /// neither `?` nor resolvable in the context, the cell is treated as a
    /// plain value and compared to the input by text.
    pub fn evaluate_unary_test(test: &UnaryTest, input: &FeelValue, context: &Context) -> Result<bool> {
        let Some(expr) = &test.test else {
            return Ok(true);
        };

        let root = Scope::Root(context.values());
        let scope = root.bind(INPUT_PLACEHOLDER, input.clone());

        let unresolved: Vec<String> = expr
            .free_names()
            .into_iter()
            .filter(|name| scope.lookup(name).is_none())
            .collect();
        if !unresolved.is_empty() {
            tracing::debug!(
                "Unary test '{}' references unresolved names {:?}, comparing as text",
                test.source,
                unresolved
            );
            return Ok(matches_source(input, &test.source));
        }

        Ok(matches!(eval(expr, &scope)?, FeelValue::Boolean(true)))
    }
}

fn matches_source(input: &FeelValue, source: &str) -> bool {
    match input {
        FeelValue::String(s) => s == source,
        other => other.to_string() == source,
    }
}

pub(crate) fn eval(expr: &Expr, scope: &Scope<'_>) -> Result<FeelValue> {
    match expr {
        Expr::Number(n) => Ok(FeelValue::Number(*n)),
        Expr::String(s) => Ok(FeelValue::String(s.clone())),
        Expr::Boolean(b) => Ok(FeelValue::Boolean(*b)),
        Expr::Null => Ok(FeelValue::Null),

        Expr::Field(name) => Ok(match scope.lookup(name) {
            Some(value) => value.clone(),
            None => {
                tracing::trace!("Unresolved name '{}', returning null", name);
                FeelValue::Null
            }
        }),

        Expr::ListLiteral(items) => items
            .iter()
            .map(|item| eval(item, scope))
            .collect::<Result<Vec<_>>>()
            .map(FeelValue::list),

        Expr::ContextLiteral(entries) => {
            let mut map = FeelContext::new();
            for (key, value_expr) in entries {
                let value = eval(value_expr, &scope.frame(&map))?;
                map.insert(key.clone(), value);
            }
            Ok(FeelValue::context(map))
        }

        Expr::Range { .. } => Err(RuntimeError::InvalidExpression(
            "a range can only be used as the target of 'in'".to_string(),
        )),

        Expr::Comparison { op, left, right } => {
            let left = eval(left, scope)?;
            let right = eval(right, scope)?;
            Ok(arithmetic::compare(*op, &left, &right))
        }

        Expr::Arithmetic { op, left, right } => {
            let left = eval(left, scope)?;
            let right = eval(right, scope)?;
            Ok(arithmetic::apply(*op, &left, &right))
        }

        Expr::Logical { op, operands } => logical(*op, operands, scope),

        Expr::Between { value, low, high } => {
            let value = eval(value, scope)?;
            let low = eval(low, scope)?;
            let high = eval(high, scope)?;
            Ok(match (value.feel_cmp(&low), value.feel_cmp(&high)) {
                (Some(above), Some(below)) => FeelValue::Boolean(above.is_ge() && below.is_le()),
                _ => FeelValue::Null,
            })
        }

        Expr::In { value, target } => {
            let value = eval(value, scope)?;
            membership(&value, target, scope).map(FeelValue::Boolean)
        }

        Expr::InstanceOf { value, type_name } => {
            Ok(FeelValue::Boolean(type_name.matches(&eval(value, scope)?)))
        }

        Expr::Conditional {
            condition,
            then_branch,
            else_branch,
        } => match eval(condition, scope)? {
            FeelValue::Boolean(true) => eval(then_branch, scope),
            _ => eval(else_branch, scope),
        },

        Expr::Quantified {
            quantifier,
            variable,
            list,
            condition,
        } => {
            let list = eval(list, scope)?;
            let Some(items) = list.as_list() else {
                return Ok(FeelValue::Null);
            };
            let every = *quantifier == Quantifier::Every;
            for item in items {
                let child = scope.bind(variable, item.clone());
                let satisfied = matches!(eval(condition, &child)?, FeelValue::Boolean(true));
                if satisfied != every {
                    // `some` found a witness, or `every` found a counterexample
                    return Ok(FeelValue::Boolean(!every));
                }
            }
            Ok(FeelValue::Boolean(every))
        }

        Expr::For {
            variable,
            list,
            body,
        } => {
            let list = eval(list, scope)?;
            let Some(items) = list.as_list() else {
                return Ok(FeelValue::Null);
            };
            items
                .iter()
                .map(|item| eval(body, &scope.bind(variable, item.clone())))
                .collect::<Result<Vec<_>>>()
                .map(FeelValue::list)
        }

        Expr::FunctionCall { name, args } => {
            let args = args
                .iter()
                .map(|arg| eval(arg, scope))
                .collect::<Result<Vec<_>>>()?;
            match scope.lookup(name) {
                Some(FeelValue::Function(function)) => {
                    let function = Arc::clone(function);
                    invoke(&function, args)
                }
                _ => builtins::call(name, &args),
            }
        }

        Expr::PropertyAccess { target, property } => Ok(property_of(&eval(target, scope)?, property)),

        Expr::Filter { target, predicate } => filter(&eval(target, scope)?, predicate, scope),

        Expr::FunctionDefinition { params, body } => Ok(FeelValue::Function(Arc::new(FeelFunction {
            params: params.clone(),
            body: (**body).clone(),
            captured: scope.flatten(),
        }))),
    }
}

/// Three-valued `and`/`or`/`not`
fn logical(op: LogicalOp, operands: &[Expr], scope: &Scope<'_>) -> Result<FeelValue> {
    match op {
        LogicalOp::Not => {
            let operand = match operands.first() {
                Some(operand) => eval(operand, scope)?,
                None => FeelValue::Null,
            };
            Ok(operand.as_bool().map_or(FeelValue::Null, |b| FeelValue::Boolean(!b)))
        }
        LogicalOp::And | LogicalOp::Or => {
            // `false` decides a conjunction, `true` decides a disjunction
            let decisive = op == LogicalOp::Or;
            let mut unknown = false;
            for operand in operands {
                match eval(operand, scope)? {
                    FeelValue::Boolean(b) if b == decisive => return Ok(FeelValue::Boolean(decisive)),
                    FeelValue::Boolean(_) => {}
                    _ => unknown = true,
                }
            }
            Ok(if unknown {
                FeelValue::Null
            } else {
                FeelValue::Boolean(!decisive)
            })
        }
    }
}

fn membership(value: &FeelValue, target: &Expr, scope: &Scope<'_>) -> Result<bool> {
    match target {
        Expr::Range { .. } => in_range(value, target, scope),
        Expr::ListLiteral(items) => {
            for item in items {
                let found = match item {
                    Expr::Range { .. } => in_range(value, item, scope)?,
                    _ => value.feel_eq(&eval(item, scope)?) == Some(true),
                };
                if found {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => Ok(match eval(target, scope)? {
            FeelValue::List(items) => items.iter().any(|item| value.feel_eq(item) == Some(true)),
            single => value.feel_eq(&single) == Some(true),
        }),
    }
}

fn in_range(value: &FeelValue, range: &Expr, scope: &Scope<'_>) -> Result<bool> {
    let Expr::Range {
        low,
        high,
        low_inclusive,
        high_inclusive,
    } = range
    else {
        return Ok(false);
    };
    let low = eval(low, scope)?;
    let high = eval(high, scope)?;
    let above = match value.feel_cmp(&low) {
        Some(ordering) => ordering.is_gt() || (*low_inclusive && ordering.is_eq()),
        None => false,
    };
    let below = match value.feel_cmp(&high) {
        Some(ordering) => ordering.is_lt() || (*high_inclusive && ordering.is_eq()),
        None => false,
    };
    Ok(above && below)
}

fn invoke(function: &FeelFunction, args: Vec<FeelValue>) -> Result<FeelValue> {
    if args.len() > function.params.len() {
        return Err(RuntimeError::invalid_arguments(
            "function",
            format!(
                "expected at most {} arguments, got {}",
                function.params.len(),
                args.len()
            ),
        ));
    }
    let mut args = args.into_iter();
    let bindings: FeelContext = function
        .params
        .iter()
        .map(|param| (param.clone(), args.next().unwrap_or_default()))
        .collect();
    let root = Scope::Root(&function.captured);
    eval(&function.body, &root.frame(&bindings))
}

fn property_of(target: &FeelValue, property: &str) -> FeelValue {
    let int = |v: i64| FeelValue::from(v);
    match target {
        FeelValue::Context(map) => map.get(property).cloned().unwrap_or_default(),
        FeelValue::List(items) => {
            FeelValue::list(items.iter().map(|item| property_of(item, property)).collect())
        }
        FeelValue::Date(date) => match property {
            "year" => int(date.year() as i64),
            "month" => int(date.month() as i64),
            "day" => int(date.day() as i64),
            "weekday" => int(date.weekday() as i64),
            _ => FeelValue::Null,
        },
        FeelValue::Time(time) => match property {
            "hour" => int(time.hour() as i64),
            "minute" => int(time.minute() as i64),
            "second" => int(time.second() as i64),
            _ => FeelValue::Null,
        },
        FeelValue::Duration(d) => match property {
            "years" => int(d.years),
            "months" => int(d.months),
            "days" => int(d.days),
            "hours" => int(d.hours),
            "minutes" => int(d.minutes),
            "seconds" => FeelValue::from_f64(d.seconds),
            _ => FeelValue::Null,
        },
        _ => FeelValue::Null,
    }
}

/// `list[predicate]`: boolean predicates filter, a numeric predicate indexes
fn filter(target: &FeelValue, predicate: &Expr, scope: &Scope<'_>) -> Result<FeelValue> {
    let single;
    let items: &[FeelValue] = match target {
        FeelValue::Null => return Ok(FeelValue::Null),
        FeelValue::List(items) => items,
        other => {
            single = [other.clone()];
            &single
        }
    };

    let mut kept = Vec::new();
    for (position, item) in items.iter().enumerate() {
        let result = match item {
            FeelValue::Context(map) => {
                let frame = scope.frame(map);
                eval(predicate, &frame.bind("item", item.clone()))?
            }
            _ => eval(predicate, &scope.bind("item", item.clone()))?,
        };
        match result {
            FeelValue::Number(n) if position == 0 => {
                return Ok(n.to_i64().map_or(FeelValue::Null, |index| nth(items, index)));
            }
            FeelValue::Boolean(true) => kept.push(item.clone()),
            _ => {}
        }
    }
    Ok(FeelValue::list(kept))
}

/// 1-based index, negative counts from the end
fn nth(items: &[FeelValue], index: i64) -> FeelValue {
    let len = items.len() as i64;
    let position = match index {
        i if i > 0 && i <= len => i - 1,
        i if i < 0 && -i <= len => len + i,
        _ => return FeelValue::Null,
    };
    items[position as usize].clone()
}
