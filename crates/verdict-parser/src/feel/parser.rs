//! Recursive-descent parser for the full FEEL grammar
//!
//! Precedence, lowest first:
//! `or` < `and` < comparison < `between`/`in`/`instance of` < additive
//! < multiplicative < `**` < unary (`not`, `-`, `+`) < postfix < primary.
//! All binary operators associate to the left.

use super::lexer::{tokenize, Keyword, Token, TokenKind};
use super::parse_tree::{BinaryOp, ChainOp, ContextKey, ParseNode, PostfixOp, UnaryOp};
use crate::error::{ParseError, Result};
use verdict_core::ast::{ArithmeticOp, ComparisonOp, Quantifier};

/// Deepest nesting of sub-expressions and prefix operators accepted
pub const MAX_NESTING: usize = 64;

/// Parse FEEL source into a raw parse tree
pub fn parse_tree(source: &str) -> Result<ParseNode> {
    let tokens = tokenize(source)?;
    parse_tokens(&tokens)
}

/// Parse an already tokenized input
pub fn parse_tokens(tokens: &[Token]) -> Result<ParseNode> {
    let mut parser = GrammarParser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let node = parser.expression()?;
    if !parser.at(&TokenKind::Eof) {
        return Err(parser.unexpected("expected end of input"));
    }
    Ok(node)
}

struct GrammarParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> GrammarParser<'a> {
    fn peek(&self) -> &'a Token {
        // The token stream always ends with Eof and the parser never moves past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &'a TokenKind {
        &self.peek().kind
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn at_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.peek_kind(), TokenKind::Keyword(k) if *k == keyword)
    }

    fn advance(&mut self) -> &'a Token {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.at_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("expected {}", kind)))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("expected '{}'", keyword.as_str())))
        }
    }

    fn expect_name(&mut self) -> Result<String> {
        match self.peek_kind() {
            TokenKind::Name(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("expected a name")),
        }
    }

    fn unexpected(&self, expectation: &str) -> ParseError {
        let token = self.peek();
        ParseError::at(
            format!("{}, found {}", expectation, token.kind),
            token.character,
            token.position,
        )
    }

    fn expression(&mut self) -> Result<ParseNode> {
        self.nested(Self::disjunction)
    }

    /// Run `parse` one nesting level deeper, failing past [`MAX_NESTING`]
    fn nested(&mut self, parse: fn(&mut Self) -> Result<ParseNode>) -> Result<ParseNode> {
        if self.depth >= MAX_NESTING {
            return Err(self.unexpected("expression nested too deeply"));
        }
        self.depth += 1;
        let node = parse(self);
        self.depth -= 1;
        node
    }

    fn disjunction(&mut self) -> Result<ParseNode> {
        let first = self.conjunction()?;
        let mut operands = vec![first];
        while self.eat_keyword(Keyword::Or) {
            operands.push(self.conjunction()?);
        }
        Ok(chain(ChainOp::Or, operands))
    }

    fn conjunction(&mut self) -> Result<ParseNode> {
        let first = self.comparison()?;
        let mut operands = vec![first];
        while self.eat_keyword(Keyword::And) {
            operands.push(self.comparison()?);
        }
        Ok(chain(ChainOp::And, operands))
    }

    fn comparison(&mut self) -> Result<ParseNode> {
        let mut left = self.membership()?;
        while let Some(op) = comparison_op(self.peek_kind()) {
            self.advance();
            let right = self.membership()?;
            left = binary(BinaryOp::Comparison(op), left, right);
        }
        Ok(left)
    }

    fn membership(&mut self) -> Result<ParseNode> {
        let mut value = self.additive()?;
        loop {
            if self.eat_keyword(Keyword::Between) {
                let low = self.additive()?;
                self.expect_keyword(Keyword::And)?;
                let high = self.additive()?;
                value = ParseNode::Between {
                    value: Box::new(value),
                    low: Box::new(low),
                    high: Box::new(high),
                };
            } else if self.eat_keyword(Keyword::In) {
                let target = self.additive()?;
                value = ParseNode::In {
                    value: Box::new(value),
                    target: Box::new(target),
                };
            } else if self.eat_keyword(Keyword::Instance) {
                self.expect_keyword(Keyword::Of)?;
                let type_name = self.expect_name()?;
                value = ParseNode::InstanceOf {
                    value: Box::new(value),
                    type_name,
                };
            } else {
                return Ok(value);
            }
        }
    }

    fn additive(&mut self) -> Result<ParseNode> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => ArithmeticOp::Add,
                TokenKind::Minus => ArithmeticOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.multiplicative()?;
            left = binary(BinaryOp::Arithmetic(op), left, right);
        }
    }

    fn multiplicative(&mut self) -> Result<ParseNode> {
        let mut left = self.exponent()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => ArithmeticOp::Mul,
                TokenKind::Slash => ArithmeticOp::Div,
                TokenKind::Percent => ArithmeticOp::Mod,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.exponent()?;
            left = binary(BinaryOp::Arithmetic(op), left, right);
        }
    }

    fn exponent(&mut self) -> Result<ParseNode> {
        let mut left = self.unary()?;
        while self.eat(&TokenKind::StarStar) {
            let right = self.unary()?;
            left = binary(BinaryOp::Arithmetic(ArithmeticOp::Pow), left, right);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<ParseNode> {
        let op = match self.peek_kind() {
            TokenKind::Minus => UnaryOp::Minus,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Keyword(Keyword::Not) => UnaryOp::Not,
            _ => return self.postfix(),
        };
        self.advance();
        let operand = self.nested(Self::unary)?;
        Ok(ParseNode::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn postfix(&mut self) -> Result<ParseNode> {
        let base = self.primary()?;
        let mut ops = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    ops.push(PostfixOp::Property(self.property_name()?));
                }
                TokenKind::LParen => {
                    self.advance();
                    ops.push(PostfixOp::Call(self.arguments()?));
                }
                TokenKind::LBracket => {
                    self.advance();
                    let predicate = self.expression()?;
                    self.expect(&TokenKind::RBracket)?;
                    ops.push(PostfixOp::Filter(predicate));
                }
                _ => break,
            }
        }

        if ops.is_empty() {
            Ok(base)
        } else {
            Ok(ParseNode::Postfix {
                base: Box::new(base),
                ops,
            })
        }
    }

    /// Property names may be keywords (`x.in` is unusual but harmless)
    fn property_name(&mut self) -> Result<String> {
        match self.peek_kind() {
            TokenKind::Name(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            TokenKind::Keyword(keyword) => {
                let name = keyword.as_str().to_string();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("expected a property name")),
        }
    }

    fn arguments(&mut self) -> Result<Vec<ParseNode>> {
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            if self.eat(&TokenKind::RParen) {
                return Ok(args);
            }
            self.expect(&TokenKind::Comma)?;
        }
    }

    fn primary(&mut self) -> Result<ParseNode> {
        let token = self.peek();
        match &token.kind {
            TokenKind::Number(text) => {
                self.advance();
                Ok(ParseNode::Number(text.clone()))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(ParseNode::String(s.clone()))
            }
            TokenKind::Name(name) => {
                self.advance();
                Ok(ParseNode::Name(name.clone()))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Ok(ParseNode::Boolean(true))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Ok(ParseNode::Boolean(false))
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                Ok(ParseNode::Null)
            }
            TokenKind::LParen => {
                self.advance();
                self.group_or_open_range()
            }
            TokenKind::LBracket => {
                self.advance();
                self.list_or_range()
            }
            TokenKind::RBracket => {
                // `]a..b]` excludes the low bound
                self.advance();
                let low = self.expression()?;
                self.expect(&TokenKind::DotDot)?;
                self.range_tail(low, false)
            }
            TokenKind::LBrace => {
                self.advance();
                self.context()
            }
            TokenKind::Keyword(Keyword::If) => {
                self.advance();
                self.conditional()
            }
            TokenKind::Keyword(Keyword::Some) => {
                self.advance();
                self.quantified(Quantifier::Some)
            }
            TokenKind::Keyword(Keyword::Every) => {
                self.advance();
                self.quantified(Quantifier::Every)
            }
            TokenKind::Keyword(Keyword::For) => {
                self.advance();
                self.for_expression()
            }
            TokenKind::Keyword(Keyword::Function) => {
                self.advance();
                self.function_definition()
            }
            TokenKind::Eof => Err(self.unexpected("unexpected end of input")),
            _ => Err(self.unexpected("expected an expression")),
        }
    }

    fn group_or_open_range(&mut self) -> Result<ParseNode> {
        let inner = self.expression()?;
        if self.eat(&TokenKind::DotDot) {
            return self.range_tail(inner, false);
        }
        self.expect(&TokenKind::RParen)?;
        Ok(ParseNode::Group(Box::new(inner)))
    }

    fn list_or_range(&mut self) -> Result<ParseNode> {
        if self.eat(&TokenKind::RBracket) {
            return Ok(ParseNode::List(Vec::new()));
        }
        let first = self.expression()?;
        if self.eat(&TokenKind::DotDot) {
            return self.range_tail(first, true);
        }

        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            items.push(self.expression()?);
        }
        self.expect(&TokenKind::RBracket)?;
        Ok(ParseNode::List(items))
    }

    /// After `..`: high bound, then `]` (inclusive) or `)` (exclusive)
    fn range_tail(&mut self, low: ParseNode, low_inclusive: bool) -> Result<ParseNode> {
        let high = self.expression()?;
        let high_inclusive = if self.eat(&TokenKind::RBracket) {
            true
        } else if self.eat(&TokenKind::RParen) {
            false
        } else {
            return Err(self.unexpected("expected ']' or ')' to close range"));
        };
        Ok(ParseNode::Range {
            low: Box::new(low),
            high: Box::new(high),
            low_inclusive,
            high_inclusive,
        })
    }

    fn context(&mut self) -> Result<ParseNode> {
        let mut entries = Vec::new();
        if self.eat(&TokenKind::RBrace) {
            return Ok(ParseNode::Context(entries));
        }
        loop {
            let key = match self.peek_kind() {
                TokenKind::Name(name) => ContextKey::Name(name.clone()),
                TokenKind::String(s) => ContextKey::String(s.clone()),
                TokenKind::Keyword(keyword) => ContextKey::Name(keyword.as_str().to_string()),
                _ => return Err(self.unexpected("expected a context key")),
            };
            self.advance();
            self.expect(&TokenKind::Colon)?;
            entries.push((key, self.expression()?));

            if self.eat(&TokenKind::RBrace) {
                return Ok(ParseNode::Context(entries));
            }
            self.expect(&TokenKind::Comma)?;
        }
    }

    fn conditional(&mut self) -> Result<ParseNode> {
        let condition = self.expression()?;
        self.expect_keyword(Keyword::Then)?;
        let then_branch = self.expression()?;
        self.expect_keyword(Keyword::Else)?;
        let else_branch = self.expression()?;
        Ok(ParseNode::If {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    fn quantified(&mut self, quantifier: Quantifier) -> Result<ParseNode> {
        let variable = self.expect_name()?;
        self.expect_keyword(Keyword::In)?;
        let list = self.expression()?;
        self.expect_keyword(Keyword::Satisfies)?;
        let condition = self.expression()?;
        Ok(ParseNode::Quantified {
            quantifier,
            variable,
            list: Box::new(list),
            condition: Box::new(condition),
        })
    }

    fn for_expression(&mut self) -> Result<ParseNode> {
        let variable = self.expect_name()?;
        self.expect_keyword(Keyword::In)?;
        let list = self.expression()?;
        self.expect_keyword(Keyword::Return)?;
        let body = self.expression()?;
        Ok(ParseNode::For {
            variable,
            list: Box::new(list),
            body: Box::new(body),
        })
    }

    fn function_definition(&mut self) -> Result<ParseNode> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.eat(&TokenKind::RParen) {
            loop {
                params.push(self.expect_name()?);
                if self.eat(&TokenKind::RParen) {
                    break;
                }
                self.expect(&TokenKind::Comma)?;
            }
        }
        let body = self.expression()?;
        Ok(ParseNode::FunctionDef {
            params,
            body: Box::new(body),
        })
    }
}

fn chain(op: ChainOp, mut operands: Vec<ParseNode>) -> ParseNode {
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        ParseNode::Chain { op, operands }
    }
}

fn binary(op: BinaryOp, left: ParseNode, right: ParseNode) -> ParseNode {
    ParseNode::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub(crate) fn comparison_op(kind: &TokenKind) -> Option<ComparisonOp> {
    match kind {
        TokenKind::Eq => Some(ComparisonOp::Eq),
        TokenKind::NotEq => Some(ComparisonOp::Ne),
        TokenKind::Lt => Some(ComparisonOp::Lt),
        TokenKind::Le => Some(ComparisonOp::Le),
        TokenKind::Gt => Some(ComparisonOp::Gt),
        TokenKind::Ge => Some(ComparisonOp::Ge),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(n: &str) -> ParseNode {
        ParseNode::Name(n.to_string())
    }

    fn number(n: &str) -> ParseNode {
        ParseNode::Number(n.to_string())
    }

    #[test]
    fn test_precedence_tree() {
        let tree = parse_tree("2 + 3 * 4").unwrap();
        assert_eq!(
            tree,
            binary(
                BinaryOp::Arithmetic(ArithmeticOp::Add),
                number("2"),
                binary(BinaryOp::Arithmetic(ArithmeticOp::Mul), number("3"), number("4")),
            )
        );
    }

    #[test]
    fn test_and_chain_is_flat() {
        let tree = parse_tree("a and b and c").unwrap();
        assert_eq!(
            tree,
            ParseNode::Chain {
                op: ChainOp::And,
                operands: vec![name("a"), name("b"), name("c")],
            }
        );
    }

    #[test]
    fn test_group_is_kept() {
        let tree = parse_tree("(a)").unwrap();
        assert_eq!(tree, ParseNode::Group(Box::new(name("a"))));
    }

    #[test]
    fn test_ranges() {
        match parse_tree("[1..5)").unwrap() {
            ParseNode::Range {
                low_inclusive,
                high_inclusive,
                ..
            } => {
                assert!(low_inclusive);
                assert!(!high_inclusive);
            }
            other => panic!("Expected range, got {:?}", other),
        }
        match parse_tree("]1..5]").unwrap() {
            ParseNode::Range {
                low_inclusive,
                high_inclusive,
                ..
            } => {
                assert!(!low_inclusive);
                assert!(high_inclusive);
            }
            other => panic!("Expected range, got {:?}", other),
        }
        assert!(matches!(parse_tree("(1..5)").unwrap(), ParseNode::Range { .. }));
    }

    #[test]
    fn test_postfix_chain() {
        let tree = parse_tree("orders[amount > 10].id").unwrap();
        match tree {
            ParseNode::Postfix { base, ops } => {
                assert_eq!(*base, name("orders"));
                assert_eq!(ops.len(), 2);
                assert!(matches!(ops[0], PostfixOp::Filter(_)));
                assert_eq!(ops[1], PostfixOp::Property("id".to_string()));
            }
            other => panic!("Expected postfix chain, got {:?}", other),
        }
    }

    #[test]
    fn test_keyword_forms() {
        assert!(matches!(
            parse_tree("if a then 1 else 2").unwrap(),
            ParseNode::If { .. }
        ));
        assert!(matches!(
            parse_tree("some x in [1, 5, 10] satisfies x > 8").unwrap(),
            ParseNode::Quantified {
                quantifier: Quantifier::Some,
                ..
            }
        ));
        assert!(matches!(
            parse_tree("for x in xs return x * 2").unwrap(),
            ParseNode::For { .. }
        ));
        assert!(matches!(
            parse_tree("function(a, b) a + b").unwrap(),
            ParseNode::FunctionDef { .. }
        ));
        assert!(matches!(
            parse_tree("x instance of number").unwrap(),
            ParseNode::InstanceOf { .. }
        ));
    }

    #[test]
    fn test_context_keys() {
        let tree = parse_tree(r#"{a: 1, "b c": 2}"#).unwrap();
        assert_eq!(
            tree,
            ParseNode::Context(vec![
                (ContextKey::Name("a".to_string()), number("1")),
                (ContextKey::String("b c".to_string()), number("2")),
            ])
        );
    }

    #[test]
    fn test_errors_never_drop_tokens() {
        let err = parse_tree("1 + 2 3").unwrap_err();
        assert_eq!(err.position, 6);
        assert_eq!(err.character, Some('3'));

        let err = parse_tree("(1 + 2").unwrap_err();
        assert_eq!(err.character, None);
        assert_eq!(err.position, 6);

        assert!(parse_tree("").is_err());
        assert!(parse_tree("a +").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert!(parse_tree(&nested(MAX_NESTING - 1)).is_ok());

        let err = parse_tree(&nested(10_000)).unwrap_err();
        assert!(err.message.starts_with("expression nested too deeply"));
        assert_eq!(err.position, MAX_NESTING);

        assert!(parse_tree(&format!("{}1", "-".repeat(10_000))).is_err());
        assert!(parse_tree(&format!("{}1{}", "[".repeat(10_000), "]".repeat(10_000))).is_err());
    }
}
