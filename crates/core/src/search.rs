//! Name search over a fetched document tree.

use crate::document::DesignDocument;

/// Returns the first node, in document order, whose name contains `needle`, ignoring case.
///
/// Traversal is pre-order depth-first: a node is tested before its children, and children are
/// visited in array order. The search stops at the first hit, so a matching ancestor shadows any
/// matching descendant. Leaves (no `children`, or an empty list) just end their branch.
///
/// Uses an explicit stack rather than recursion, so tree depth is bounded by memory only.
pub fn find_component_by_name<'a>(
    root: &'a DesignDocument,
    needle: &str,
) -> Option<&'a DesignDocument> {
    let needle = needle.to_lowercase();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if node.name.to_lowercase().contains(&needle) {
            return Some(node);
        }
        if node.is_leaf() {
            continue;
        }
        // Reversed so the first child is popped next.
        stack.extend(node.children().iter().rev());
    }

    None
}
