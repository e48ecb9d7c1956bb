use std::fmt;

use super::table::{AnchorKind, OrderTable, Placement, Relation};
use super::OrderError;

/// Child-list primitives of a container node.
///
/// Positions are indices into the container's child sequence. A `None` reference follows the
/// usual null-reference convention: `insert_before(node, None)` prepends and
/// `insert_after(node, None)` appends.
pub trait ChildTree<K> {
    type Node;

    /// Index of the first immediate child of the given kind.
    fn first_child_of(&self, kind: AnchorKind<K>) -> Option<usize>;

    fn insert_before(&mut self, node: Self::Node, reference: Option<usize>);

    fn insert_after(&mut self, node: Self::Node, reference: Option<usize>);

    fn append(&mut self, node: Self::Node);

    /// Reject a node whose concrete kind does not correspond to `tag`.
    fn check_node(tag: K, node: &Self::Node) -> Result<(), OrderError>;
}

/// Attach `child` to `container` at the position `table` dictates for `tag`.
///
/// Anchored placements use the first rule whose anchor exists among the container's immediate
/// children. When none does, the final rule is applied with a `None` reference, so a missing
/// data anchor degrades to prepend (`Before`) or append (`After`) instead of failing.
///
/// An appended fallback does not look at append-only tags: on a worksheet without
/// `<sheetData>`, a `pageMargins` inserted after `extLst` lands behind it.
pub fn insert_child<K, T>(
    table: &OrderTable<K>,
    container: &mut T,
    tag: K,
    child: T::Node,
) -> Result<(), OrderError>
where
    K: Copy + PartialEq + fmt::Debug,
    T: ChildTree<K>,
{
    let placement = table.rules_for(tag)?;
    T::check_node(tag, &child)?;

    let rules = match placement {
        Placement::Append => {
            log::debug!("appending {tag:?} as last child");
            container.append(child);
            return Ok(());
        }
        Placement::Anchored(rules) => rules,
    };

    let Some((fallback, preferred)) = rules.split_last() else {
        return Err(OrderError::EmptyRuleChain(format!("{tag:?}")));
    };

    let (rule, reference) = preferred
        .iter()
        .find_map(|rule| {
            container
                .first_child_of(rule.anchor)
                .map(|idx| (rule, Some(idx)))
        })
        .unwrap_or_else(|| (fallback, container.first_child_of(fallback.anchor)));

    match reference {
        Some(idx) => log::debug!(
            "inserting {tag:?} {:?} {:?} at child {idx}",
            rule.relation,
            rule.anchor
        ),
        None => log::debug!(
            "no {:?} anchor for {tag:?}; inserting {:?} with no reference",
            rule.anchor,
            rule.relation
        ),
    }

    match rule.relation {
        Relation::Before => container.insert_before(child, reference),
        Relation::After => container.insert_after(child, reference),
    }
    Ok(())
}
