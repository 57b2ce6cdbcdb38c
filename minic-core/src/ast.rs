//! Abstract syntax tree for minic.
//!
//! Nodes are tagged variants with a per-kind payload; every child is owned
//! by its parent. Absent sub-expressions (from lenient parsing of broken
//! input) are `None` rather than placeholder nodes.
//!
//! The serialized form is the flat `{type, value?, children?, position?}`
//! shape consumed by external tools.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use crate::span::Position;
use crate::types::Type;

/// Binary operators recognised by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            ">" => BinaryOp::Gt,
            "<=" => BinaryOp::Le,
            ">=" => BinaryOp::Ge,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A name as written in the source, e.g. the target of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Program {
        body: Vec<Node>,
    },
    Declaration {
        ty: Type,
        name: Ident,
        init: Option<Box<Node>>,
    },
    Assignment {
        target: Ident,
        value: Option<Box<Node>>,
    },
    If {
        condition: Option<Box<Node>>,
        body: Option<Box<Node>>,
    },
    While {
        condition: Option<Box<Node>>,
        body: Option<Box<Node>>,
    },
    Return {
        value: Option<Box<Node>>,
    },
    /// Brace-delimited statement list used as an `if`/`while` body.
    Block {
        statements: Vec<Node>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    Identifier(String),
    Literal(String),
}

impl Node {
    pub fn new(kind: NodeKind, position: Option<Position>) -> Self {
        Node { kind, position }
    }

    pub fn program(body: Vec<Node>) -> Self {
        Node::new(NodeKind::Program { body }, None)
    }

    pub fn binary(op: BinaryOp, lhs: Node, rhs: Node, position: Option<Position>) -> Self {
        Node::new(
            NodeKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            position,
        )
    }

    /// Tag used in the external representation.
    pub fn tag(&self) -> &'static str {
        match &self.kind {
            NodeKind::Program { .. } => "Program",
            NodeKind::Declaration { .. } => "Declaration",
            NodeKind::Assignment { .. } => "Assignment",
            NodeKind::If { .. } => "IfStatement",
            NodeKind::While { .. } => "WhileStatement",
            NodeKind::Return { .. } => "ReturnStatement",
            NodeKind::Block { .. } => "Block",
            NodeKind::Binary { .. } => "BinaryExpression",
            NodeKind::Identifier(_) => "Identifier",
            NodeKind::Literal(_) => "Literal",
        }
    }

    pub fn line(&self) -> u32 {
        self.position.map(|p| p.line).unwrap_or(0)
    }

    /// Statements of a `Program` or `Block`; empty for anything else.
    pub fn statements(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Program { body } => body,
            NodeKind::Block { statements } => statements,
            _ => &[],
        }
    }

    /// Child nodes in source order. Names held as `Ident` are not nodes
    /// and are not included.
    pub fn children(&self) -> Vec<&Node> {
        match &self.kind {
            NodeKind::Program { body } => body.iter().collect(),
            NodeKind::Block { statements } => statements.iter().collect(),
            NodeKind::Declaration { init, .. } => init.iter().map(|n| &**n).collect(),
            NodeKind::Assignment { value, .. } | NodeKind::Return { value } => {
                value.iter().map(|n| &**n).collect()
            }
            NodeKind::If { condition, body } | NodeKind::While { condition, body } => condition
                .iter()
                .chain(body.iter())
                .map(|n| &**n)
                .collect(),
            NodeKind::Binary { lhs, rhs, .. } => vec![&**lhs, &**rhs],
            NodeKind::Identifier(_) | NodeKind::Literal(_) => Vec::new(),
        }
    }
}

/// One entry in the serialized tree: a real node, or a leaf synthesized
/// from a name stored inline in its parent.
enum Surface<'a> {
    Node(&'a Node),
    Ident(&'a Ident),
}

impl Serialize for Surface<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Surface::Node(node) => node.serialize(serializer),
            Surface::Ident(ident) => {
                let mut state = serializer.serialize_struct("Node", 3)?;
                state.serialize_field("type", "Identifier")?;
                state.serialize_field("value", &ident.name)?;
                match &ident.position {
                    Some(position) => state.serialize_field("position", position)?,
                    None => state.skip_field("position")?,
                }
                state.end()
            }
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (value, children): (Option<String>, Vec<Surface<'_>>) = match &self.kind {
            NodeKind::Declaration { ty, name, init } => {
                let mut children = vec![Surface::Ident(name)];
                children.extend(init.iter().map(|n| Surface::Node(&**n)));
                (Some(ty.to_string()), children)
            }
            NodeKind::Assignment { target, value } => {
                let mut children = vec![Surface::Ident(target)];
                children.extend(value.iter().map(|n| Surface::Node(&**n)));
                (Some("=".into()), children)
            }
            NodeKind::Binary { op, lhs, rhs } => (
                Some(op.symbol().into()),
                vec![Surface::Node(&**lhs), Surface::Node(&**rhs)],
            ),
            NodeKind::Identifier(text) | NodeKind::Literal(text) => (Some(text.clone()), Vec::new()),
            _ => (None, self.children().into_iter().map(Surface::Node).collect()),
        };

        let mut state = serializer.serialize_struct("Node", 4)?;
        state.serialize_field("type", self.tag())?;
        match &value {
            Some(value) => state.serialize_field("value", value)?,
            None => state.skip_field("value")?,
        }
        if children.is_empty() {
            state.skip_field("children")?;
        } else {
            state.serialize_field("children", &children)?;
        }
        match &self.position {
            Some(position) => state.serialize_field("position", position)?,
            None => state.skip_field("position")?,
        }
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ident(name: &str, line: u32, column: u32) -> Ident {
        Ident {
            name: name.into(),
            position: Some(Position::new(line, column)),
        }
    }

    #[test]
    fn binary_op_round_trips_symbols() {
        for symbol in ["+", "-", "*", "/", "%", "==", "!=", "<", ">", "<=", ">=", "&&", "||"] {
            let op = BinaryOp::from_symbol(symbol).expect("known operator");
            assert_eq!(op.symbol(), symbol);
        }
        assert_eq!(BinaryOp::from_symbol("<<"), None);
    }

    #[test]
    fn children_skip_inline_names() {
        let decl = Node::new(
            NodeKind::Declaration {
                ty: Type::Int,
                name: ident("x", 1, 5),
                init: Some(Box::new(Node::new(NodeKind::Literal("1".into()), None))),
            },
            Some(Position::new(1, 1)),
        );
        let children = decl.children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].tag(), "Literal");
    }

    #[test]
    fn serializes_external_shape() {
        let decl = Node::new(
            NodeKind::Declaration {
                ty: Type::Int,
                name: ident("x", 1, 5),
                init: Some(Box::new(Node::new(
                    NodeKind::Literal("1".into()),
                    Some(Position::new(1, 9)),
                ))),
            },
            Some(Position::new(1, 1)),
        );
        let program = Node::program(vec![decl]);
        let value = serde_json::to_value(&program).expect("serialize");
        assert_eq!(
            value,
            json!({
                "type": "Program",
                "children": [{
                    "type": "Declaration",
                    "value": "int",
                    "children": [
                        {"type": "Identifier", "value": "x", "position": {"line": 1, "column": 5}},
                        {"type": "Literal", "value": "1", "position": {"line": 1, "column": 9}}
                    ],
                    "position": {"line": 1, "column": 1}
                }]
            })
        );
    }
}
