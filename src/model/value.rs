//! Runtime values read from mapped elements.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tree::{NodeId, ParseTree, Span, Token};

/// A property value.
///
/// - Computed scalars: Int (source positions), Bool, String
/// - Source-backed: Token (a terminal, or a rule node treated as a token)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Bool(bool),
    Int(i64),
    String(String),
    Token(TokenValue),
}

/// Thin adapter over a terminal: its text and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenValue {
    pub text: String,
    /// Symbolic token type; `None` when the value stands for a whole rule node.
    pub token_type: Option<i32>,
    pub line: usize,
    pub column: usize,
    pub span: Option<Span>,
}

impl TokenValue {
    pub fn from_token(token: &Token) -> Self {
        Self {
            text: token.text.clone(),
            token_type: Some(token.token_type),
            line: token.line,
            column: token.column,
            span: Some(token.span()),
        }
    }

    /// A rule node flattened to its text.
    pub fn from_node(tree: &ParseTree, node: NodeId) -> Self {
        let (line, column) = tree
            .first_token(node)
            .map(|t| (t.line, t.column))
            .unwrap_or((0, 0));
        Self {
            text: tree.text(node),
            token_type: None,
            line,
            column,
            span: tree.node_span(node),
        }
    }
}

// ============================================================================
// Type checking
// ============================================================================

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "BOOLEAN",
            Value::Int(_) => "INTEGER",
            Value::String(_) => "STRING",
            Value::Token(_) => "TOKEN",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Text of a string or token value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Token(t) => Some(&t.text),
            _ => None,
        }
    }

    pub fn as_token(&self) -> Option<&TokenValue> {
        match self {
            Value::Token(t) => Some(t),
            _ => None,
        }
    }

    /// Source span, when the value is backed by source text.
    pub fn span(&self) -> Option<Span> {
        match self {
            Value::Token(t) => t.span,
            _ => None,
        }
    }
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for Value { fn from(v: bool) -> Self { Value::Bool(v) } }
impl From<i64> for Value { fn from(v: i64) -> Self { Value::Int(v) } }
impl From<usize> for Value { fn from(v: usize) -> Self { Value::Int(v as i64) } }
impl From<String> for Value { fn from(v: String) -> Self { Value::String(v) } }
impl From<&str> for Value { fn from(v: &str) -> Self { Value::String(v.to_owned()) } }
impl From<TokenValue> for Value { fn from(v: TokenValue) -> Self { Value::Token(v) } }

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Token(t) => write!(f, "{}", t.text),
        }
    }
}
