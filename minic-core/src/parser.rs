//! Recursive-descent parser producing the minic AST.
//!
//! The parser never fails. A token it expects but does not find is
//! ignored without advancing, and a token that cannot start a statement
//! is skipped. Every loop either consumes a token or stops, so parsing
//! terminates for any input and always yields a `Program` root.
//!
//! Binary precedence, loosest first:
//!
//!   `||`  ->  `&&`  ->  comparison  ->  `+ -`  ->  `* / %`  ->  primary
//!
//! Every level is left-associative, so `a < b < c` is `(a < b) < c`.
//!
//! Nesting is bounded. Statement bodies deeper than [`MAX_NESTING_DEPTH`]
//! are left unparsed, and an expression stops growing once it holds
//! [`MAX_EXPRESSION_NODES`] operators and parentheses; the remaining tokens
//! are then skipped like any other stray input. This keeps every later
//! tree walk within a fixed recursion depth.

use alloc::boxed::Box;
use alloc::vec::Vec;

use tracing::trace;

use crate::ast::{BinaryOp, Ident, Node, NodeKind};
use crate::lexer::{Token, TokenKind};
use crate::span::Position;
use crate::types::Type;

/// Deepest chain of `if`/`while` bodies the parser descends into.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Most operators plus parentheses a single expression may contain.
pub const MAX_EXPRESSION_NODES: usize = 128;

/// Parse a token sequence into a `Program` node.
pub fn parse(tokens: &[Token]) -> Node {
    Parser::new(tokens).parse_program()
}

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
    expression_nodes: usize,
}

impl Parser {
    /// Build a parser over `tokens` with comments removed.
    pub fn new(tokens: &[Token]) -> Self {
        Parser {
            tokens: tokens
                .iter()
                .filter(|t| t.kind != TokenKind::Comment)
                .cloned()
                .collect(),
            position: 0,
            depth: 0,
            expression_nodes: 0,
        }
    }

    pub fn parse_program(&mut self) -> Node {
        self.position = 0;
        self.depth = 0;
        let mut body = Vec::new();
        while !self.at_end() {
            if let Some(stmt) = self.parse_statement() {
                body.push(stmt);
            }
        }
        Node::program(body)
    }

    fn parse_statement(&mut self) -> Option<Node> {
        let token = self.peek()?;
        let kind = token.kind;
        let text = token.text.clone();
        match (kind, text.as_str()) {
            (TokenKind::Keyword, "int" | "float" | "double" | "char") => self.parse_declaration(),
            (TokenKind::Keyword, "if") => Some(self.parse_if()),
            (TokenKind::Keyword, "while") => Some(self.parse_while()),
            (TokenKind::Keyword, "return") => Some(self.parse_return()),
            (TokenKind::Identifier, _) => {
                let target = self.ident()?;
                Some(self.parse_assignment(target))
            }
            _ => {
                if let Some(skipped) = self.advance() {
                    trace!(token = %skipped.text, line = skipped.line, "skipping token");
                }
                None
            }
        }
    }

    fn parse_declaration(&mut self) -> Option<Node> {
        let type_token = self.advance()?;
        let ty = Type::from_keyword(&type_token.text).unwrap_or(Type::Unknown);
        let position = Some(position_of(&type_token));

        if !self.check(TokenKind::Identifier) {
            // nothing to declare; let the following tokens parse on their own
            return None;
        }
        let name = self.ident()?;

        let init = if self.match_token(TokenKind::Operator, "=") {
            self.parse_expression().map(Box::new)
        } else {
            None
        };
        self.expect(TokenKind::Delimiter, ";");

        Some(Node::new(NodeKind::Declaration { ty, name, init }, position))
    }

    fn parse_if(&mut self) -> Node {
        let (condition, body, position) = self.parse_conditional();
        Node::new(NodeKind::If { condition, body }, position)
    }

    fn parse_while(&mut self) -> Node {
        let (condition, body, position) = self.parse_conditional();
        Node::new(NodeKind::While { condition, body }, position)
    }

    /// Shared shape of `if` and `while`: keyword, parenthesized
    /// condition, then a brace block or a single statement.
    fn parse_conditional(&mut self) -> (Option<Box<Node>>, Option<Box<Node>>, Option<Position>) {
        let position = self.advance().map(|t| position_of(&t));
        self.expect(TokenKind::Delimiter, "(");
        let condition = self.parse_expression().map(Box::new);
        self.expect(TokenKind::Delimiter, ")");

        let body = self.nested(|parser| {
            if parser.check_text(TokenKind::Delimiter, "{") {
                Some(Box::new(parser.parse_block()))
            } else {
                parser.parse_statement().map(Box::new)
            }
        });
        (condition, body, position)
    }

    fn parse_block(&mut self) -> Node {
        let position = self.advance().map(|t| position_of(&t));
        let mut statements = Vec::new();
        while !self.at_end() && !self.check_text(TokenKind::Delimiter, "}") {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
        }
        self.expect(TokenKind::Delimiter, "}");
        Node::new(NodeKind::Block { statements }, position)
    }

    fn parse_return(&mut self) -> Node {
        let position = self.advance().map(|t| position_of(&t));
        let value = if self.check_text(TokenKind::Delimiter, ";") {
            None
        } else {
            self.parse_expression().map(Box::new)
        };
        self.expect(TokenKind::Delimiter, ";");
        Node::new(NodeKind::Return { value }, position)
    }

    fn parse_assignment(&mut self, target: Ident) -> Node {
        let position = target.position;
        self.expect(TokenKind::Operator, "=");
        let value = self.parse_expression().map(Box::new);
        self.expect(TokenKind::Delimiter, ";");
        Node::new(NodeKind::Assignment { target, value }, position)
    }

    /// Parse one complete expression, starting a fresh node budget.
    pub fn parse_expression(&mut self) -> Option<Node> {
        self.expression_nodes = 0;
        self.parse_logical_or()
    }

    fn parse_logical_or(&mut self) -> Option<Node> {
        self.parse_binary_level(&["||"], Self::parse_logical_and)
    }

    fn parse_logical_and(&mut self) -> Option<Node> {
        self.parse_binary_level(&["&&"], Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> Option<Node> {
        self.parse_binary_level(&["==", "!=", "<", ">", "<=", ">="], Self::parse_addition)
    }

    fn parse_addition(&mut self) -> Option<Node> {
        self.parse_binary_level(&["+", "-"], Self::parse_multiplication)
    }

    fn parse_multiplication(&mut self) -> Option<Node> {
        self.parse_binary_level(&["*", "/", "%"], Self::parse_primary)
    }

    /// One left-associative precedence level. A missing right operand
    /// drops the operator and keeps the left side.
    fn parse_binary_level(
        &mut self,
        operators: &[&str],
        next: fn(&mut Self) -> Option<Node>,
    ) -> Option<Node> {
        let mut lhs = next(self)?;
        while let Some(token) = self.peek() {
            if token.kind != TokenKind::Operator || !operators.contains(&token.text.as_str()) {
                break;
            }
            let Some(op) = BinaryOp::from_symbol(&token.text) else {
                break;
            };
            let position = Some(position_of(token));
            if !self.grow_expression() {
                break;
            }
            self.advance();
            match next(self) {
                Some(rhs) => lhs = Node::binary(op, lhs, rhs, position),
                None => break,
            }
        }
        Some(lhs)
    }

    fn parse_primary(&mut self) -> Option<Node> {
        let token = self.peek()?;
        let position = Some(position_of(token));
        match token.kind {
            TokenKind::Literal => {
                let text = token.text.clone();
                self.advance();
                Some(Node::new(NodeKind::Literal(text), position))
            }
            TokenKind::Identifier => {
                let text = token.text.clone();
                self.advance();
                Some(Node::new(NodeKind::Identifier(text), position))
            }
            TokenKind::Delimiter if token.text == "(" => {
                if !self.grow_expression() {
                    return None;
                }
                self.advance();
                let inner = self.parse_logical_or();
                self.expect(TokenKind::Delimiter, ")");
                inner
            }
            _ => None,
        }
    }

    /// Run `f` one statement level deeper, or return `None` without
    /// consuming anything once `MAX_NESTING_DEPTH` is reached.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            trace!(at = self.position, "statement nesting limit reached");
            return None;
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Count one more operator or parenthesis in the current expression.
    fn grow_expression(&mut self) -> bool {
        if self.expression_nodes >= MAX_EXPRESSION_NODES {
            trace!(at = self.position, "expression size limit reached");
            return false;
        }
        self.expression_nodes += 1;
        true
    }

    fn ident(&mut self) -> Option<Ident> {
        if !self.check(TokenKind::Identifier) {
            return None;
        }
        let token = self.advance()?;
        Some(Ident {
            position: Some(position_of(&token)),
            name: token.text,
        })
    }

    /// Consume the token if it matches; otherwise leave the cursor alone.
    fn expect(&mut self, kind: TokenKind, text: &str) {
        if !self.match_token(kind, text) {
            trace!(expected = text, at = self.position, "missing expected token");
        }
    }

    fn match_token(&mut self, kind: TokenKind, text: &str) -> bool {
        if self.check_text(kind, text) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    fn check_text(&self, kind: TokenKind, text: &str) -> bool {
        self.peek().is_some_and(|t| t.is(kind, text))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }
}

fn position_of(token: &Token) -> Position {
    Position::new(token.line, token.column)
}
