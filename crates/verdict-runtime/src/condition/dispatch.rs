//! Ordered operator dispatch

use super::cache::ConditionCaches;
use super::operators::{
    basic, collection, date_arithmetic, datetime, financial, geo, math, numeric, string,
};
use verdict_core::FeelValue;

/// Outcome of offering an operator to one category handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The category does not know the operator; try the next one
    NotMine,
    /// The category evaluated the operator
    Handled(bool),
}

/// Operator categories, tried in [`OperatorCategory::DISPATCH_ORDER`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorCategory {
    Basic,
    String,
    Numeric,
    Math,
    DateTime,
    DateArithmetic,
    Collection,
    Geospatial,
    Financial,
}

impl OperatorCategory {
    pub const DISPATCH_ORDER: [OperatorCategory; 9] = [
        OperatorCategory::Basic,
        OperatorCategory::String,
        OperatorCategory::Numeric,
        OperatorCategory::Math,
        OperatorCategory::DateTime,
        OperatorCategory::DateArithmetic,
        OperatorCategory::Collection,
        OperatorCategory::Geospatial,
        OperatorCategory::Financial,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OperatorCategory::Basic => "basic",
            OperatorCategory::String => "string",
            OperatorCategory::Numeric => "numeric",
            OperatorCategory::Math => "math",
            OperatorCategory::DateTime => "datetime",
            OperatorCategory::DateArithmetic => "date_arithmetic",
            OperatorCategory::Collection => "collection",
            OperatorCategory::Geospatial => "geospatial",
            OperatorCategory::Financial => "financial",
        }
    }

    /// Operator names this category evaluates
    pub fn operators(&self) -> &'static [&'static str] {
        match self {
            OperatorCategory::Basic => basic::OPERATORS,
            OperatorCategory::String => string::OPERATORS,
            OperatorCategory::Numeric => numeric::OPERATORS,
            OperatorCategory::Math => math::OPERATORS,
            OperatorCategory::DateTime => datetime::OPERATORS,
            OperatorCategory::DateArithmetic => date_arithmetic::OPERATORS,
            OperatorCategory::Collection => collection::OPERATORS,
            OperatorCategory::Geospatial => geo::OPERATORS,
            OperatorCategory::Financial => financial::OPERATORS,
        }
    }

    /// The first category, in dispatch order, that owns `op`
    pub fn of(op: &str) -> Option<OperatorCategory> {
        Self::DISPATCH_ORDER
            .into_iter()
            .find(|category| category.operators().contains(&op))
    }

    pub fn handle(
        &self,
        op: &str,
        actual: &FeelValue,
        expected: &FeelValue,
        caches: &ConditionCaches,
    ) -> Dispatch {
        match self {
            OperatorCategory::Basic => basic::evaluate(op, actual, expected),
            OperatorCategory::String => string::evaluate(op, actual, expected, caches),
            OperatorCategory::Numeric => numeric::evaluate(op, actual, expected, caches),
            OperatorCategory::Math => math::evaluate(op, actual, expected),
            OperatorCategory::DateTime => datetime::evaluate(op, actual, expected, caches),
            OperatorCategory::DateArithmetic => {
                date_arithmetic::evaluate(op, actual, expected, caches)
            }
            OperatorCategory::Collection => collection::evaluate(op, actual, expected),
            OperatorCategory::Geospatial => geo::evaluate(op, actual, expected, caches),
            OperatorCategory::Financial => financial::evaluate(op, actual, expected),
        }
    }
}

/// Offer `op` to each category in order; `None` when no category owns it
pub(crate) fn dispatch(
    op: &str,
    actual: &FeelValue,
    expected: &FeelValue,
    caches: &ConditionCaches,
) -> Option<(OperatorCategory, bool)> {
    OperatorCategory::DISPATCH_ORDER
        .into_iter()
        .find_map(|category| match category.handle(op, actual, expected, caches) {
            Dispatch::Handled(result) => Some((category, result)),
            Dispatch::NotMine => None,
        })
}
