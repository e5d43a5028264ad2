//! # Concrete Parse Trees
//!
//! The minimal view of a front-end's parse tree the mapper consumes: rule
//! nodes and tokens held in one arena and addressed by id. Parent links,
//! raw children and label bindings are plain indices, so walking a deep tree
//! never touches reference counts.

pub mod builder;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub use builder::TreeBuilder;

// ============================================================================
// Ids and spans
// ============================================================================

/// Rule node identifier within one `ParseTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Token identifier within one `ParseTree`; equal to the token's stream index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenId(pub u32);

impl NodeId {
    pub fn index(self) -> usize { self.0 as usize }
}

impl TokenId {
    pub fn index(self) -> usize { self.0 as usize }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Half-open source span in byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn starts_after(&self, other: &Span) -> bool {
        self.start > other.start
    }
}

// ============================================================================
// Tokens
// ============================================================================

/// A token as produced by the front-end's lexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub token_type: i32,
    pub text: String,
    /// 1-based line.
    pub line: usize,
    /// 0-based column, in characters.
    pub column: usize,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    /// Position in the token stream.
    pub index: usize,
}

impl Token {
    /// End-of-input sentinel type.
    pub const EOF: i32 = -1;

    pub fn is_eof(&self) -> bool {
        self.token_type == Token::EOF
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// A raw child of a rule node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Child {
    Node(NodeId),
    Token(TokenId),
}

/// The value of a label binding on one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Binding {
    /// `name=child`
    One(Child),
    /// `name+=child`, in match order.
    Many(SmallVec<[Child; 2]>),
}

/// One rule node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData {
    pub kind: String,
    pub parent: Option<NodeId>,
    pub children: Vec<Child>,
    /// First token of the node; for an empty node, the token that follows it.
    pub start: Option<TokenId>,
    /// Last token of the node; `None` for an empty node.
    pub stop: Option<TokenId>,
    pub bindings: HashMap<String, Binding>,
}

/// A concrete parse tree: rule nodes plus the token stream they cover.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseTree {
    nodes: Vec<NodeData>,
    tokens: Vec<Token>,
    root: Option<NodeId>,
}

impl ParseTree {
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Node data. Panics if `id` was not issued by this tree.
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    /// Token data. Panics if `id` was not issued by this tree.
    pub fn token(&self, id: TokenId) -> &Token {
        &self.tokens[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &str {
        &self.node(id).kind
    }

    pub fn children(&self, id: NodeId) -> &[Child] {
        &self.node(id).children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn first_token(&self, id: NodeId) -> Option<&Token> {
        self.node(id).start.map(|t| self.token(t))
    }

    pub fn last_token(&self, id: NodeId) -> Option<&Token> {
        self.node(id).stop.map(|t| self.token(t))
    }

    /// Concatenated text of the tokens the node covers, end-of-input excluded.
    pub fn text(&self, id: NodeId) -> String {
        let node = self.node(id);
        match (node.start, node.stop) {
            (Some(start), Some(stop)) if start <= stop => self.tokens
                [start.index()..=stop.index()]
                .iter()
                .filter(|t| !t.is_eof())
                .map(|t| t.text.as_str())
                .collect(),
            _ => String::new(),
        }
    }

    /// Source span of a node. An empty node is a zero-width span at the
    /// token that follows it; a node with no tokens at all has no span.
    pub fn node_span(&self, id: NodeId) -> Option<Span> {
        let first = self.first_token(id)?;
        Some(match self.last_token(id) {
            Some(last) => Span::new(first.start, last.end.max(first.start)),
            None => Span::new(first.start, first.start),
        })
    }

    pub fn child_span(&self, child: Child) -> Option<Span> {
        match child {
            Child::Node(n) => self.node_span(n),
            Child::Token(t) => Some(self.token(t).span()),
        }
    }
}
