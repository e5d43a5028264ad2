//! Source-order interleaving of an element's values.

use crate::tree::Span;

/// Sort `entries` by span start and drop the spans.
///
/// Entries without a span come first, in the order given. Known spans compare
/// by start offset only; equal starts keep the order given.
pub fn order_by_span<T>(mut entries: Vec<(T, Option<Span>)>) -> Vec<T> {
    // `None < Some(_)`, and the sort is stable.
    entries.sort_by_key(|(_, span)| span.map(|s| s.start));
    entries.into_iter().map(|(value, _)| value).collect()
}
