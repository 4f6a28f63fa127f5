//! Single-pass precedence-climbing parser for simple expressions
//!
//! Handles literals, names, property access, parentheses, unary operators
//! and the binary operators `or`, `and`, comparisons, `+ - * / % **`.
//! Anything else (lists, contexts, ranges, calls, filters and the keyword
//! forms) makes it decline with `None`, and the caller falls back to the
//! full grammar. For every input it accepts it builds the same `Expr` the
//! full parser and transformer would.

use super::lexer::{Keyword, Token, TokenKind};
use super::parser::{comparison_op, MAX_NESTING};
use super::transform::negate;
use verdict_core::ast::{ArithmeticOp, ComparisonOp, Expr};
use verdict_core::FeelNumber;

/// Parse a token stream, or decline
pub fn parse_tokens(tokens: &[Token]) -> Option<Expr> {
    if tokens.iter().any(|t| declines(&t.kind)) {
        return None;
    }
    let mut parser = FastParser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expression(0)?;
    (parser.peek() == &TokenKind::Eof).then_some(expr)
}

fn declines(kind: &TokenKind) -> bool {
    match kind {
        TokenKind::LBracket
        | TokenKind::RBracket
        | TokenKind::LBrace
        | TokenKind::RBrace
        | TokenKind::Comma
        | TokenKind::DotDot
        | TokenKind::Colon => true,
        TokenKind::Keyword(keyword) => !matches!(
            keyword,
            Keyword::And
                | Keyword::Or
                | Keyword::Not
                | Keyword::True
                | Keyword::False
                | Keyword::Null
        ),
        _ => false,
    }
}

#[derive(Clone, Copy)]
enum Infix {
    Or,
    And,
    Comparison(ComparisonOp),
    Arithmetic(ArithmeticOp),
}

impl Infix {
    /// Binding power; higher binds tighter
    fn binding_power(&self) -> u8 {
        match self {
            Infix::Or => 1,
            Infix::And => 2,
            Infix::Comparison(_) => 3,
            Infix::Arithmetic(op) if op.is_additive() => 5,
            Infix::Arithmetic(ArithmeticOp::Pow) => 7,
            Infix::Arithmetic(_) => 6,
        }
    }

    fn apply(self, left: Expr, right: Expr) -> Expr {
        match self {
            Infix::Or => Expr::or(left, right),
            Infix::And => Expr::and(left, right),
            Infix::Comparison(op) => Expr::comparison(left, op, right),
            Infix::Arithmetic(op) => Expr::arithmetic(left, op, right),
        }
    }
}

struct FastParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> FastParser<'a> {
    fn peek(&self) -> &'a TokenKind {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    fn bump(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn infix(&self) -> Option<Infix> {
        let kind = self.peek();
        if let Some(op) = comparison_op(kind) {
            return Some(Infix::Comparison(op));
        }
        Some(match kind {
            TokenKind::Keyword(Keyword::Or) => Infix::Or,
            TokenKind::Keyword(Keyword::And) => Infix::And,
            TokenKind::Plus => Infix::Arithmetic(ArithmeticOp::Add),
            TokenKind::Minus => Infix::Arithmetic(ArithmeticOp::Sub),
            TokenKind::Star => Infix::Arithmetic(ArithmeticOp::Mul),
            TokenKind::Slash => Infix::Arithmetic(ArithmeticOp::Div),
            TokenKind::Percent => Infix::Arithmetic(ArithmeticOp::Mod),
            TokenKind::StarStar => Infix::Arithmetic(ArithmeticOp::Pow),
            _ => return None,
        })
    }

    fn expression(&mut self, min_power: u8) -> Option<Expr> {
        let mut left = self.unary()?;
        while let Some(op) = self.infix() {
            let power = op.binding_power();
            if power < min_power {
                break;
            }
            self.bump();
            let right = self.expression(power + 1)?;
            left = op.apply(left, right);
        }
        Some(left)
    }

    /// Declines past [`MAX_NESTING`] so the full parser reports the error
    fn unary(&mut self) -> Option<Expr> {
        if self.depth >= MAX_NESTING {
            return None;
        }
        self.depth += 1;
        let expr = self.prefixed();
        self.depth -= 1;
        expr
    }

    fn prefixed(&mut self) -> Option<Expr> {
        match self.peek() {
            TokenKind::Minus => {
                self.bump();
                Some(negate(self.unary()?))
            }
            TokenKind::Plus => {
                self.bump();
                self.unary()
            }
            TokenKind::Keyword(Keyword::Not) => {
                self.bump();
                Some(Expr::not(self.unary()?))
            }
            _ => self.postfix(),
        }
    }

    fn postfix(&mut self) -> Option<Expr> {
        let mut expr = self.primary()?;
        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.bump();
                    match self.peek() {
                        TokenKind::Name(name) => {
                            expr = Expr::property(expr, name.clone());
                            self.bump();
                        }
                        _ => return None,
                    }
                }
                // Calls and filters belong to the full grammar
                TokenKind::LParen | TokenKind::LBracket => return None,
                _ => return Some(expr),
            }
        }
    }

    fn primary(&mut self) -> Option<Expr> {
        let expr = match self.peek() {
            TokenKind::Number(text) => Expr::Number(FeelNumber::parse_literal(text).ok()?),
            TokenKind::String(s) => Expr::String(s.clone()),
            TokenKind::Name(name) => Expr::Field(name.clone()),
            TokenKind::Keyword(Keyword::True) => Expr::Boolean(true),
            TokenKind::Keyword(Keyword::False) => Expr::Boolean(false),
            TokenKind::Keyword(Keyword::Null) => Expr::Null,
            TokenKind::LParen => {
                self.bump();
                let inner = self.expression(0)?;
                if self.peek() != &TokenKind::RParen {
                    return None;
                }
                inner
            }
            _ => return None,
        };
        self.bump();
        Some(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feel::lexer::tokenize;

    fn fast(source: &str) -> Option<Expr> {
        parse_tokens(&tokenize(source).unwrap())
    }

    #[test]
    fn test_accepts_simple_arithmetic() {
        assert_eq!(
            fast("2 + 3 * 4").unwrap(),
            Expr::arithmetic(
                Expr::number(2),
                ArithmeticOp::Add,
                Expr::arithmetic(Expr::number(3), ArithmeticOp::Mul, Expr::number(4)),
            )
        );
    }

    #[test]
    fn test_left_associative() {
        assert_eq!(
            fast("8 - 4 - 2").unwrap(),
            Expr::arithmetic(
                Expr::arithmetic(Expr::number(8), ArithmeticOp::Sub, Expr::number(4)),
                ArithmeticOp::Sub,
                Expr::number(2),
            )
        );
    }

    #[test]
    fn test_declines_outside_subset() {
        for source in [
            "[1, 2]",
            "{a: 1}",
            "max(1, 2)",
            "if a then b else c",
            "some x in xs satisfies x",
            "for x in xs return x",
            "x in [1..5]",
            "x between 1 and 2",
            "xs[1]",
            "(1..5)",
            "a b",
        ] {
            assert!(fast(source).is_none(), "{} should be declined", source);
        }
    }

    #[test]
    fn test_property_and_unary() {
        assert_eq!(
            fast("-user.age").unwrap(),
            Expr::arithmetic(
                Expr::number(-1),
                ArithmeticOp::Mul,
                Expr::property(Expr::field("user"), "age"),
            )
        );
        assert_eq!(fast("-(5)").unwrap(), Expr::number(-5));
    }

    #[test]
    fn test_declines_deep_nesting() {
        let nested = |depth: usize| format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(fast(&nested(10)).unwrap(), Expr::field("x"));
        assert!(fast(&nested(10_000)).is_none());
        assert!(fast(&format!("{}1", "not ".repeat(10_000))).is_none());
    }
}
