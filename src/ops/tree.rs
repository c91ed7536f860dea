//! Tree projection over the flat item sequence.
//!
//! Everything here is a pure read: depth, section, and indeterminate state
//! are derived from `parent_id` links and raw `completed` flags on demand,
//! never stored. Document order is assumed to satisfy block contiguity
//! (every item's descendants follow it in one unbroken run).

use std::collections::HashSet;
use std::ops::Range;

use crate::model::{Item, Section};

/// Top-level depth. Depth values are clamped to `[MIN_DEPTH, max_depth]`.
pub const MIN_DEPTH: usize = 0;

fn find(items: &[Item], id: u64) -> Option<&Item> {
    items.iter().find(|i| i.id == id)
}

/// Number of parent hops from `id` to a top-level ancestor.
///
/// Walks `parent_id` links with a visited set so malformed data cannot loop.
/// A detected cycle counts as corruption and yields `MIN_DEPTH`. A dangling
/// ancestor link falls back to the item's stored indent hint.
pub fn depth_of(items: &[Item], id: u64, max_depth: usize) -> usize {
    let Some(item) = find(items, id) else {
        return MIN_DEPTH;
    };
    let mut seen = HashSet::new();
    seen.insert(id);
    let mut depth = 0;
    let mut current = item;
    while let Some(pid) = current.parent_id {
        if !seen.insert(pid) {
            // Cycle: corrupt data, treat as top-level.
            return MIN_DEPTH;
        }
        match find(items, pid) {
            Some(parent) => {
                depth += 1;
                if depth >= max_depth {
                    return max_depth;
                }
                current = parent;
            }
            // Dangling link: trust the stored hint instead of failing.
            None => return item.indent.min(max_depth),
        }
    }
    depth
}

/// Ids of all transitive descendants of `id`, found by following parent
/// back-references with a cycle guard.
pub fn descendant_ids(items: &[Item], id: u64) -> Vec<u64> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    seen.insert(id);
    let mut frontier = vec![id];
    while let Some(current) = frontier.pop() {
        for item in items {
            if item.parent_id == Some(current) && seen.insert(item.id) {
                out.push(item.id);
                frontier.push(item.id);
            }
        }
    }
    out
}

/// Derived section of an item.
///
/// Only immediate relations are consulted: a child is completed iff both it
/// and its direct parent carry the raw flag; a top-level item is completed
/// iff it carries the raw flag and has no raw-active immediate child. The
/// full ancestor chain is deliberately not walked here (toggle propagation
/// is the one place that does).
pub fn section_of(items: &[Item], id: u64) -> Section {
    let Some(item) = find(items, id) else {
        return Section::Active;
    };
    // A dangling parent link degrades to top-level treatment.
    let parent = item.parent_id.and_then(|pid| find(items, pid));
    match parent {
        Some(parent) => {
            if item.completed && parent.completed {
                Section::Completed
            } else {
                Section::Active
            }
        }
        None => {
            if !item.completed {
                return Section::Active;
            }
            // No children, or every immediate child completed.
            if items
                .iter()
                .filter(|i| i.parent_id == Some(id))
                .all(|c| c.completed)
            {
                Section::Completed
            } else {
                Section::Active
            }
        }
    }
}

/// True for a top-level item with at least one child where some but not all
/// immediate children are completed.
pub fn indeterminate_of(items: &[Item], id: u64) -> bool {
    let Some(item) = find(items, id) else {
        return false;
    };
    if item.parent_id.is_some() {
        return false;
    }
    let children: Vec<&Item> = items.iter().filter(|i| i.parent_id == Some(id)).collect();
    if children.is_empty() {
        return false;
    }
    let done = children.iter().filter(|c| c.completed).count();
    done > 0 && done < children.len()
}

/// Nearest preceding item that could serve as parent at `requested_depth`:
/// derived depth must equal `requested_depth - 1` and derived section must
/// match the target's. None if no preceding item satisfies both.
pub fn parent_candidate_for_depth(
    items: &[Item],
    target_id: u64,
    requested_depth: usize,
    max_depth: usize,
) -> Option<u64> {
    let pos = items.iter().position(|i| i.id == target_id)?;
    let want = requested_depth.checked_sub(1)?;
    let section = section_of(items, target_id);
    items[..pos]
        .iter()
        .rev()
        .find(|c| depth_of(items, c.id, max_depth) == want && section_of(items, c.id) == section)
        .map(|c| c.id)
}

/// The contiguous block starting at `start`: the item there plus the full
/// run of its descendants. Computed positionally from the contiguity
/// invariant, which makes block containment a simple range test.
pub fn block_range(items: &[Item], start: usize) -> Range<usize> {
    let mut block_ids = HashSet::new();
    block_ids.insert(items[start].id);
    let mut end = start + 1;
    while end < items.len() {
        match items[end].parent_id {
            Some(pid) if block_ids.contains(&pid) => {
                block_ids.insert(items[end].id);
                end += 1;
            }
            _ => break,
        }
    }
    start..end
}

/// Canonical indices that are visible under the completed-items-hidden
/// setting. View filtering is pure presentation; operations always run on
/// canonical indices, so callers translate through here first.
pub fn visible_indices(items: &[Item], hide_completed: bool) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, i)| !(hide_completed && section_of(items, i.id) == Section::Completed))
        .map(|(idx, _)| idx)
        .collect()
}

/// Translate a visible row back to its canonical index.
pub fn canonical_index(items: &[Item], visible_row: usize, hide_completed: bool) -> Option<usize> {
    visible_indices(items, hide_completed).get(visible_row).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, parent_id: Option<u64>, completed: bool) -> Item {
        Item {
            id,
            text: format!("item {}", id),
            completed,
            parent_id,
            indent: 0,
        }
    }

    // 1
    // ├ 2
    // │ └ 3
    // └ 4
    // 5 (completed)
    // └ 6 (completed)
    fn sample_items() -> Vec<Item> {
        vec![
            item(1, None, false),
            item(2, Some(1), false),
            item(3, Some(2), false),
            item(4, Some(1), false),
            item(5, None, true),
            item(6, Some(5), true),
        ]
    }

    #[test]
    fn depth_follows_parent_links() {
        let items = sample_items();
        assert_eq!(depth_of(&items, 1, 2), 0);
        assert_eq!(depth_of(&items, 2, 2), 1);
        assert_eq!(depth_of(&items, 3, 2), 2);
        assert_eq!(depth_of(&items, 4, 2), 1);
    }

    #[test]
    fn depth_clamps_to_max() {
        let items = sample_items();
        assert_eq!(depth_of(&items, 3, 1), 1);
    }

    #[test]
    fn depth_of_cycle_defaults_to_top_level() {
        let mut items = sample_items();
        items[0].parent_id = Some(3); // 1 → 3 → 2 → 1
        assert_eq!(depth_of(&items, 1, 5), MIN_DEPTH);
    }

    #[test]
    fn depth_of_dangling_link_uses_indent_hint() {
        let mut items = sample_items();
        items[1].parent_id = Some(99);
        items[1].indent = 1;
        assert_eq!(depth_of(&items, 2, 2), 1);
    }

    #[test]
    fn section_requires_both_child_and_parent_completed() {
        let mut items = sample_items();
        assert_eq!(section_of(&items, 6), Section::Completed);
        // Child completed under an active parent stays active.
        items[1].completed = true;
        assert_eq!(section_of(&items, 2), Section::Active);
    }

    #[test]
    fn top_level_with_active_child_is_active_despite_flag() {
        let mut items = sample_items();
        items[0].completed = true;
        // 2 and 4 are still active children.
        assert_eq!(section_of(&items, 1), Section::Active);
        items[1].completed = true;
        items[3].completed = true;
        assert_eq!(section_of(&items, 1), Section::Completed);
    }

    #[test]
    fn top_level_leaf_section_tracks_raw_flag() {
        let items = vec![item(1, None, true)];
        assert_eq!(section_of(&items, 1), Section::Completed);
    }

    #[test]
    fn indeterminate_needs_partial_children() {
        let mut items = sample_items();
        assert!(!indeterminate_of(&items, 1));
        items[1].completed = true;
        assert!(indeterminate_of(&items, 1));
        items[3].completed = true;
        items[2].completed = true;
        assert!(!indeterminate_of(&items, 1));
        // Never indeterminate for children or childless items.
        assert!(!indeterminate_of(&items, 2));
    }

    #[test]
    fn descendants_are_transitive() {
        let items = sample_items();
        let mut ids = descendant_ids(&items, 1);
        ids.sort_unstable();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn descendants_survive_a_cycle() {
        let mut items = sample_items();
        items[0].parent_id = Some(3);
        let ids = descendant_ids(&items, 1);
        assert!(ids.contains(&2) && ids.contains(&3));
    }

    #[test]
    fn block_range_covers_subtree() {
        let items = sample_items();
        assert_eq!(block_range(&items, 0), 0..4);
        assert_eq!(block_range(&items, 1), 1..3);
        assert_eq!(block_range(&items, 4), 4..6);
        assert_eq!(block_range(&items, 5), 5..6);
    }

    #[test]
    fn parent_candidate_scans_backward_matching_depth_and_section() {
        let items = sample_items();
        // Item 4 wants depth 2: nearest preceding depth-1 active item is 2.
        assert_eq!(parent_candidate_for_depth(&items, 4, 2, 2), Some(2));
        // Item 6 is in the completed section; active items don't qualify.
        assert_eq!(parent_candidate_for_depth(&items, 6, 1, 2), Some(5));
        // Depth 0 has no parent.
        assert_eq!(parent_candidate_for_depth(&items, 4, 0, 2), None);
    }

    #[test]
    fn parent_candidate_respects_section_match() {
        let mut items = sample_items();
        items.push(item(7, None, false));
        // 5 is the nearest depth-0 item but sits in the completed section;
        // the scan passes it over and lands on 1.
        assert_eq!(parent_candidate_for_depth(&items, 7, 1, 2), Some(1));
    }

    #[test]
    fn visible_translation_skips_completed_run() {
        let items = sample_items();
        let visible = visible_indices(&items, true);
        assert_eq!(visible, vec![0, 1, 2, 3]);
        assert_eq!(canonical_index(&items, 3, true), Some(3));
        assert_eq!(canonical_index(&items, 4, true), None);
        // With hiding off the translation is the identity.
        assert_eq!(canonical_index(&items, 4, false), Some(4));
    }
}
