//! Raw parse tree produced by the grammar parser
//!
//! The tree mirrors the grammar rather than the evaluation model: it keeps
//! parenthesized groups, unary signs, flat `and`/`or` chains and postfix
//! chains. [`crate::feel::transform`] normalizes it into an `Expr`.

use verdict_core::ast::{ArithmeticOp, ComparisonOp, Quantifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,
    Plus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Comparison(ComparisonOp),
    Arithmetic(ArithmeticOp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOp {
    And,
    Or,
}

/// Context literal key as written
#[derive(Debug, Clone, PartialEq)]
pub enum ContextKey {
    Name(String),
    String(String),
}

/// One step of a postfix chain
#[derive(Debug, Clone, PartialEq)]
pub enum PostfixOp {
    Property(String),
    Call(Vec<ParseNode>),
    Filter(ParseNode),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseNode {
    /// Numeric literal text, not yet converted
    Number(String),
    String(String),
    Boolean(bool),
    Null,
    Name(String),
    /// `( expr )`
    Group(Box<ParseNode>),
    Unary {
        op: UnaryOp,
        operand: Box<ParseNode>,
    },
    Binary {
        op: BinaryOp,
        left: Box<ParseNode>,
        right: Box<ParseNode>,
    },
    /// `a and b and c` kept flat
    Chain {
        op: ChainOp,
        operands: Vec<ParseNode>,
    },
    Between {
        value: Box<ParseNode>,
        low: Box<ParseNode>,
        high: Box<ParseNode>,
    },
    In {
        value: Box<ParseNode>,
        target: Box<ParseNode>,
    },
    InstanceOf {
        value: Box<ParseNode>,
        type_name: String,
    },
    List(Vec<ParseNode>),
    Context(Vec<(ContextKey, ParseNode)>),
    Range {
        low: Box<ParseNode>,
        high: Box<ParseNode>,
        low_inclusive: bool,
        high_inclusive: bool,
    },
    If {
        condition: Box<ParseNode>,
        then_branch: Box<ParseNode>,
        else_branch: Box<ParseNode>,
    },
    Quantified {
        quantifier: Quantifier,
        variable: String,
        list: Box<ParseNode>,
        condition: Box<ParseNode>,
    },
    For {
        variable: String,
        list: Box<ParseNode>,
        body: Box<ParseNode>,
    },
    FunctionDef {
        params: Vec<String>,
        body: Box<ParseNode>,
    },
    /// Primary followed by property accesses, calls and filters
    Postfix {
        base: Box<ParseNode>,
        ops: Vec<PostfixOp>,
    },
}
