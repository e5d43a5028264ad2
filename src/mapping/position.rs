//! Computed source positions (`startLine`, `endLine`, `startColumn`,
//! `endColumn`). Lines are 1-based, columns 0-based characters.

use crate::model::{END_COLUMN, END_LINE, START_COLUMN, START_LINE};
use crate::tree::{Child, NodeId, ParseTree, Token};
use crate::{Error, Result};

/// Value of positional property `name` for `node`, or `None` when `name` is
/// not a positional property.
pub(super) fn position(tree: &ParseTree, node: NodeId, name: &str) -> Result<Option<i64>> {
    let first = tree.first_token(node).ok_or_else(|| {
        Error::StructuralMismatch(format!("node '{}' has no first token", tree.kind(node)))
    })?;
    let value = match name {
        START_LINE => first.line,
        START_COLUMN => first.column,
        END_LINE => end_of(tree, node, first)?.0,
        END_COLUMN => end_of(tree, node, first)?.1,
        _ => return Ok(None),
    };
    Ok(Some(value as i64))
}

fn end_of(tree: &ParseTree, node: NodeId, first: &Token) -> Result<(usize, usize)> {
    match tree.last_token(node) {
        Some(last) => Ok(token_end(last)),
        // Empty node: zero width at the token that follows it.
        None if !covers_text(tree, node) => Ok((first.line, first.column)),
        None => Err(Error::StructuralMismatch(format!(
            "node '{}' has text but no last token",
            tree.kind(node)
        ))),
    }
}

/// Whether any token below `node` carries text, read from the children
/// rather than the start/stop range.
fn covers_text(tree: &ParseTree, node: NodeId) -> bool {
    tree.children(node).iter().any(|child| match *child {
        Child::Token(t) => {
            let token = tree.token(t);
            !token.is_eof() && !token.text.is_empty()
        }
        Child::Node(n) => covers_text(tree, n),
    })
}

/// Line and column just past the end of `token`.
fn token_end(token: &Token) -> (usize, usize) {
    let newlines = token.text.matches('\n').count();
    let column = if token.is_eof() {
        token.column
    } else if newlines == 0 {
        token.column + token.text.chars().count()
    } else {
        token.text.rsplit('\n').next().map_or(0, |tail| tail.chars().count())
    };
    (token.line + newlines, column)
}
