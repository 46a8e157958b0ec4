//! AST node definitions
//!
//! Every node carries a [`Location`] that encloses the locations of all of
//! its children. Nodes are built bottom-up by the parser with [`make_node`]
//! and are immutable afterwards: fields are private and only readable
//! through accessors.

use crate::grammar::ast::sequence::NodeSequence;
use crate::tokens::TokenKind;
use crate::utils::{Location, Spanned};
use serde::Serialize;
use std::fmt;

// === OPERATORS ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl BinaryOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Plus => Self::Add,
            TokenKind::Minus => Self::Subtract,
            TokenKind::Star => Self::Multiply,
            TokenKind::Slash => Self::Divide,
            TokenKind::Percent => Self::Remainder,
            TokenKind::EqualEqual => Self::Equal,
            TokenKind::BangEqual => Self::NotEqual,
            TokenKind::Less => Self::Less,
            TokenKind::LessEqual => Self::LessEqual,
            TokenKind::Greater => Self::Greater,
            TokenKind::GreaterEqual => Self::GreaterEqual,
            TokenKind::AndAnd => Self::And,
            TokenKind::OrOr => Self::Or,
            _ => return None,
        };
        Some(op)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Remainder => "%",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Not,
    Negate,
}

impl UnaryOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Bang => Some(Self::Not),
            TokenKind::Minus => Some(Self::Negate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Negate => "-",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// === NODES ===

/// Node kind together with its payload. Children are owned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum NodeKind {
    Program {
        body: NodeSequence,
    },
    Block {
        statements: NodeSequence,
    },
    Let {
        name: Spanned<String>,
        initializer: Option<Box<Node>>,
    },
    Function {
        name: Spanned<String>,
        /// `Identifier` nodes
        params: NodeSequence,
        body: Box<Node>,
    },
    If {
        condition: Box<Node>,
        then_branch: Box<Node>,
        else_branch: Option<Box<Node>>,
    },
    While {
        condition: Box<Node>,
        body: Box<Node>,
    },
    Return {
        value: Option<Box<Node>>,
    },
    ExpressionStatement {
        expr: Box<Node>,
    },
    Assign {
        target: Spanned<String>,
        value: Box<Node>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Call {
        callee: Box<Node>,
        args: NodeSequence,
    },
    Group {
        inner: Box<Node>,
    },
    Identifier {
        name: String,
    },
    Integer {
        value: i64,
    },
    Float {
        value: f64,
    },
    String {
        value: String,
    },
    Boolean {
        value: bool,
    },
    /// Placeholder for input that could not be parsed
    Error,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Program { .. } => "Program",
            Self::Block { .. } => "Block",
            Self::Let { .. } => "Let",
            Self::Function { .. } => "Function",
            Self::If { .. } => "If",
            Self::While { .. } => "While",
            Self::Return { .. } => "Return",
            Self::ExpressionStatement { .. } => "ExpressionStatement",
            Self::Assign { .. } => "Assign",
            Self::Binary { .. } => "Binary",
            Self::Unary { .. } => "Unary",
            Self::Call { .. } => "Call",
            Self::Group { .. } => "Group",
            Self::Identifier { .. } => "Identifier",
            Self::Integer { .. } => "Integer",
            Self::Float { .. } => "Float",
            Self::String { .. } => "String",
            Self::Boolean { .. } => "Boolean",
            Self::Error => "Error",
        }
    }

    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            Self::Block { .. }
                | Self::Let { .. }
                | Self::Function { .. }
                | Self::If { .. }
                | Self::While { .. }
                | Self::Return { .. }
                | Self::ExpressionStatement { .. }
        )
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::Integer { .. } | Self::Float { .. } | Self::String { .. } | Self::Boolean { .. }
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A syntax tree node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    #[serde(flatten)]
    kind: NodeKind,
    location: Location,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn into_kind(self) -> NodeKind {
        self.kind
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, NodeKind::Error)
    }

    /// Identifier name, if this is an `Identifier` node
    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Identifier { name } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.location)
    }
}

/// Build a node. `location` must enclose every child location; the parser
/// guarantees this by merging child locations into it.
pub fn make_node(kind: NodeKind, location: Location) -> Node {
    Node { kind, location }
}
