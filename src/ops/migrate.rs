//! One-shot repair pass for freshly loaded lists.
//!
//! Legacy rows stored only a visual indent level; this pass rebuilds the
//! `parent_id` links from those hints and then fixes raw completion-state
//! violations. It runs before any derived section can be trusted, so the
//! second pass works on raw flags only.

use crate::model::{EngineConfig, Item, TodoList};
use crate::ops::tree::MIN_DEPTH;

/// Whether a loaded list needs the repair pass: any row that lacked a
/// `parentId` field entirely, or any indented item whose parent link does
/// not resolve.
pub fn needs_migration(items: &[Item], has_legacy_rows: bool) -> bool {
    if has_legacy_rows {
        return true;
    }
    items
        .iter()
        .any(|item| item.indent > MIN_DEPTH && !parent_resolves(items, item))
}

fn parent_resolves(items: &[Item], item: &Item) -> bool {
    match item.parent_id {
        Some(pid) => pid != item.id && items.iter().any(|p| p.id == pid),
        None => false,
    }
}

/// Rebuild every parent link from the indent hints, then enforce the
/// cross-section rule on raw flags. Returns true if anything changed.
pub fn migrate(list: &mut TodoList, config: &EngineConfig) -> bool {
    let before: Vec<(Option<u64>, usize)> =
        list.items.iter().map(|i| (i.parent_id, i.indent)).collect();

    infer_parents(&mut list.items, config.max_depth);
    repair_raw_sections(&mut list.items);

    let after: Vec<(Option<u64>, usize)> =
        list.items.iter().map(|i| (i.parent_id, i.indent)).collect();
    if before != after {
        list.touch();
        true
    } else {
        false
    }
}

/// Every item's parent is the nearest preceding item with strictly smaller
/// hint depth. An indented item with no such predecessor detaches.
fn infer_parents(items: &mut [Item], max_depth: usize) {
    let hints: Vec<usize> = items.iter().map(|i| i.indent.min(max_depth)).collect();
    for idx in 0..items.len() {
        let depth = hints[idx];
        if depth == MIN_DEPTH {
            items[idx].parent_id = None;
            items[idx].indent = MIN_DEPTH;
            continue;
        }
        match (0..idx).rev().find(|&j| hints[j] < depth) {
            Some(j) => {
                items[idx].parent_id = Some(items[j].id);
                items[idx].indent = depth;
            }
            None => {
                items[idx].parent_id = None;
                items[idx].indent = MIN_DEPTH;
            }
        }
    }
}

/// A raw-active item must not hang under a raw-completed parent. Reattach it
/// to the nearest preceding raw-active top-level item, or detach.
fn repair_raw_sections(items: &mut [Item]) {
    for idx in 0..items.len() {
        let Some(pid) = items[idx].parent_id else {
            continue;
        };
        let parent_completed = items.iter().find(|p| p.id == pid).map(|p| p.completed);
        if items[idx].completed || parent_completed != Some(true) {
            continue;
        }
        let anchor = items[..idx]
            .iter()
            .rev()
            .find(|c| c.parent_id.is_none() && !c.completed)
            .map(|c| c.id);
        items[idx].parent_id = anchor;
        items[idx].indent = if anchor.is_some() { 1 } else { MIN_DEPTH };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn legacy_item(id: u64, indent: usize, completed: bool) -> Item {
        Item {
            id,
            text: format!("item {}", id),
            completed,
            parent_id: None,
            indent,
        }
    }

    fn list_of(items: Vec<Item>) -> TodoList {
        let now = Utc::now();
        TodoList::from_items("l", items, 100, now, now)
    }

    #[test]
    fn needs_migration_for_indented_item_without_parent() {
        let items = vec![legacy_item(1, 0, false), legacy_item(2, 1, false)];
        assert!(needs_migration(&items, false));
    }

    #[test]
    fn needs_migration_for_legacy_rows() {
        let items = vec![legacy_item(1, 0, false)];
        assert!(needs_migration(&items, true));
        assert!(!needs_migration(&items, false));
    }

    #[test]
    fn needs_migration_for_dangling_link() {
        let mut items = vec![legacy_item(1, 0, false), legacy_item(2, 1, false)];
        items[1].parent_id = Some(77);
        assert!(needs_migration(&items, false));
    }

    #[test]
    fn infers_parents_from_indent_hints() {
        let mut list = list_of(vec![
            legacy_item(1, 0, false),
            legacy_item(2, 1, false),
            legacy_item(3, 2, false),
            legacy_item(4, 1, false),
            legacy_item(5, 0, false),
        ]);
        assert!(migrate(&mut list, &EngineConfig::default()));
        assert_eq!(list.get(2).unwrap().parent_id, Some(1));
        assert_eq!(list.get(3).unwrap().parent_id, Some(2));
        assert_eq!(list.get(4).unwrap().parent_id, Some(1));
        assert_eq!(list.get(5).unwrap().parent_id, None);
    }

    #[test]
    fn indented_item_with_no_predecessor_detaches() {
        let mut list = list_of(vec![legacy_item(1, 1, false), legacy_item(2, 0, false)]);
        migrate(&mut list, &EngineConfig::default());
        assert_eq!(list.get(1).unwrap().parent_id, None);
        assert_eq!(list.get(1).unwrap().indent, 0);
    }

    #[test]
    fn hints_deeper_than_max_depth_are_clamped() {
        let mut list = list_of(vec![
            legacy_item(1, 0, false),
            legacy_item(2, 1, false),
            legacy_item(3, 5, false),
        ]);
        migrate(&mut list, &EngineConfig::default());
        // Hint 5 clamps to 2, so 3 becomes a child of 2, not of some
        // imaginary deep chain.
        assert_eq!(list.get(3).unwrap().parent_id, Some(2));
        assert_eq!(list.get(3).unwrap().indent, 2);
    }

    #[test]
    fn active_child_of_completed_parent_reattaches() {
        let mut list = list_of(vec![
            legacy_item(9, 0, false),
            legacy_item(1, 0, true),
            legacy_item(2, 1, false),
        ]);
        migrate(&mut list, &EngineConfig::default());
        assert_eq!(list.get(2).unwrap().parent_id, Some(9));
    }

    #[test]
    fn active_child_with_no_active_anchor_detaches() {
        let mut list = list_of(vec![legacy_item(1, 0, true), legacy_item(2, 1, false)]);
        migrate(&mut list, &EngineConfig::default());
        assert_eq!(list.get(2).unwrap().parent_id, None);
        assert_eq!(list.get(2).unwrap().indent, 0);
    }

    #[test]
    fn completed_child_of_completed_parent_is_untouched() {
        let mut list = list_of(vec![legacy_item(1, 0, true), legacy_item(2, 1, true)]);
        migrate(&mut list, &EngineConfig::default());
        assert_eq!(list.get(2).unwrap().parent_id, Some(1));
    }

    #[test]
    fn clean_data_reports_no_change() {
        let mut list = list_of(vec![
            legacy_item(1, 0, false),
            legacy_item(2, 1, false),
        ]);
        migrate(&mut list, &EngineConfig::default());
        assert!(!migrate(&mut list, &EngineConfig::default()));
    }
}
