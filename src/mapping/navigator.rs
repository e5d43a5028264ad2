//! Walking mapped elements.

use super::Element;
use crate::model::EntityId;
use crate::{Error, Result};

/// Depth-first, pre-order visit of the elements below `element` (and
/// `element` itself when `include_self`). Children are visited in
/// `get_all_children` order. Fails with `DepthLimitExceeded` past the
/// configured `max_depth`.
pub fn visit_descendants<F>(element: &Element<'_>, include_self: bool, visitor: &mut F) -> Result<()>
where
    F: FnMut(&Element<'_>) -> Result<()>,
{
    if include_self {
        visitor(element)?;
    }
    let limit = element.mapper().registry().config().max_depth;
    walk(element, 1, limit, visitor)
}

fn walk<F>(element: &Element<'_>, depth: usize, limit: usize, visitor: &mut F) -> Result<()>
where
    F: FnMut(&Element<'_>) -> Result<()>,
{
    for child in element.get_all_children()? {
        if depth > limit {
            return Err(Error::DepthLimitExceeded { limit });
        }
        visitor(&child)?;
        walk(&child, depth + 1, limit, visitor)?;
    }
    Ok(())
}

/// Nearest ancestor of `element` whose entity is `entity` or derives from it.
pub fn find_ancestor<'a>(element: &Element<'a>, entity: EntityId) -> Option<&'a Element<'a>> {
    let registry = element.mapper().registry();
    let mut current = element.get_parent();
    while let Some(ancestor) = current {
        if registry.ancestry(ancestor.entity_id()).contains(&entity) {
            return Some(ancestor);
        }
        current = ancestor.get_parent();
    }
    None
}
