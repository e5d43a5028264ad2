//! Incremental construction of a `ParseTree`.
//!
//! The builder tracks line, column and byte offset from the text it is fed,
//! so callers only supply token types and text:
//!
//! ```text
//! start_node("If_stmt")
//!   token(IF, "if")  hidden(" ")
//!   label("condition") start_node("Test") token(NAME, "x") finish_node()
//!   token(COLON, ":")
//! finish_node()
//! ```

use hashbrown::HashMap;
use smallvec::SmallVec;

use super::{Binding, Child, NodeData, NodeId, ParseTree, Token, TokenId};
use crate::{Error, Result};

enum PendingLabel {
    Assign(String),
    Append(String),
}

/// Builds a `ParseTree` top-down, in source order.
pub struct TreeBuilder {
    tree: ParseTree,
    stack: Vec<NodeId>,
    /// Empty nodes still waiting for the token that follows them.
    awaiting_start: Vec<NodeId>,
    pending_label: Option<PendingLabel>,
    offset: usize,
    line: usize,
    column: usize,
    extra_root: Option<String>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            tree: ParseTree::default(),
            stack: Vec::new(),
            awaiting_start: Vec::new(),
            pending_label: None,
            offset: 0,
            line: 1,
            column: 0,
            extra_root: None,
        }
    }

    /// Open a rule node as a child of the current node.
    pub fn start_node(&mut self, kind: impl Into<String>) -> NodeId {
        let id = NodeId(self.tree.nodes.len() as u32);
        let kind = kind.into();
        let parent = self.stack.last().copied();
        if parent.is_none() {
            match self.tree.root {
                None => self.tree.root = Some(id),
                Some(_) => {
                    self.extra_root.get_or_insert(kind.clone());
                }
            }
        }
        self.tree.nodes.push(NodeData {
            kind,
            parent,
            children: Vec::new(),
            start: None,
            stop: None,
            bindings: HashMap::new(),
        });
        self.attach(Child::Node(id));
        self.stack.push(id);
        id
    }

    /// Close the current rule node.
    pub fn finish_node(&mut self) -> Result<NodeId> {
        let id = self.stack.pop().ok_or_else(|| {
            Error::StructuralMismatch("finish_node called with no open node".into())
        })?;
        if self.tree.nodes[id.index()].start.is_none() {
            self.awaiting_start.push(id);
        }
        Ok(id)
    }

    /// Bind the next child of the current node to `name` (`name=child`).
    pub fn label(&mut self, name: impl Into<String>) -> &mut Self {
        self.pending_label = Some(PendingLabel::Assign(name.into()));
        self
    }

    /// Append the next child of the current node to list label `name`
    /// (`name+=child`).
    pub fn list_label(&mut self, name: impl Into<String>) -> &mut Self {
        self.pending_label = Some(PendingLabel::Append(name.into()));
        self
    }

    /// Append a token to the stream and to the current node.
    pub fn token(&mut self, token_type: i32, text: &str) -> TokenId {
        let id = TokenId(self.tree.tokens.len() as u32);
        let start = self.offset;
        let (line, column) = (self.line, self.column);
        self.advance(text);
        self.tree.tokens.push(Token {
            token_type,
            text: text.to_owned(),
            line,
            column,
            start,
            end: self.offset,
            index: id.index(),
        });

        for node in self.awaiting_start.drain(..) {
            self.tree.nodes[node.index()].start = Some(id);
        }
        for &node in &self.stack {
            let data = &mut self.tree.nodes[node.index()];
            data.start.get_or_insert(id);
            data.stop = Some(id);
        }
        self.attach(Child::Token(id));
        id
    }

    /// End-of-input token: zero width, at the current position.
    pub fn eof(&mut self) -> TokenId {
        self.token(Token::EOF, "")
    }

    /// Text on a hidden channel (whitespace, comments): moves the position,
    /// produces no token.
    pub fn hidden(&mut self, text: &str) {
        self.advance(text);
    }

    pub fn finish(self) -> Result<ParseTree> {
        if let Some(&open) = self.stack.last() {
            return Err(Error::StructuralMismatch(format!(
                "node '{}' was never finished",
                self.tree.nodes[open.index()].kind
            )));
        }
        if let Some(kind) = self.extra_root {
            return Err(Error::StructuralMismatch(format!(
                "second root node '{kind}'"
            )));
        }
        Ok(self.tree)
    }

    fn attach(&mut self, child: Child) {
        let label = self.pending_label.take();
        let Some(&parent) = self.stack.last() else { return };
        let data = &mut self.tree.nodes[parent.index()];
        data.children.push(child);
        match label {
            Some(PendingLabel::Assign(name)) => {
                data.bindings.insert(name, Binding::One(child));
            }
            Some(PendingLabel::Append(name)) => {
                let binding = data
                    .bindings
                    .entry(name)
                    .or_insert_with(|| Binding::Many(SmallVec::new()));
                if let Binding::One(first) = *binding {
                    *binding = Binding::Many(SmallVec::from_slice(&[first, child]));
                } else if let Binding::Many(children) = binding {
                    children.push(child);
                }
            }
            None => {}
        }
    }

    fn advance(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
        self.offset += text.len();
    }
}
