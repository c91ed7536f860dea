//! The four basic mutations: toggle, indent change, insert, remove.
//!
//! Every operation either leaves the list satisfying all invariants or does
//! nothing at all. Structural failures (unknown id, impossible request) are
//! silent no-ops; callers read "no visible change" as the failure signal.

use crate::model::{EngineConfig, Item, OrphanPolicy, Section, TodoList};
use crate::ops::tree::{self, MIN_DEPTH};

/// Flip the raw completion flag on `id`.
///
/// Toggling a top-level item propagates the same new value to every
/// transitive descendant. This is the one operation that walks the full
/// descendant chain; section derivation never does.
pub fn toggle(list: &mut TodoList, id: u64) -> bool {
    let Some(item) = list.get(id) else {
        return false;
    };
    let new_value = !item.completed;
    let top_level = item.parent_id.is_none();

    if let Some(item) = list.get_mut(id) {
        item.completed = new_value;
    }
    if top_level {
        for did in tree::descendant_ids(&list.items, id) {
            if let Some(descendant) = list.get_mut(did) {
                descendant.completed = new_value;
            }
        }
    }
    list.touch();
    true
}

/// Change an item's indent by `delta` levels, reparenting it to the nearest
/// valid preceding candidate at the new depth.
pub fn change_indent(list: &mut TodoList, id: u64, delta: i64, config: &EngineConfig) -> bool {
    if list.index_of(id).is_none() {
        return false;
    }
    let current = tree::depth_of(&list.items, id, config.max_depth);
    let new_depth =
        (current as i64 + delta).clamp(MIN_DEPTH as i64, config.max_depth as i64) as usize;
    if new_depth == current {
        return false;
    }

    let candidate = tree::parent_candidate_for_depth(&list.items, id, new_depth, config.max_depth);
    match candidate {
        Some(pid) => {
            if let Some(item) = list.get_mut(id) {
                item.parent_id = Some(pid);
                item.indent = new_depth;
            }
        }
        None if new_depth == MIN_DEPTH => {
            if let Some(item) = list.get_mut(id) {
                item.parent_id = None;
                item.indent = MIN_DEPTH;
            }
        }
        None => match config.orphan_policy {
            // No valid parent at that depth and we refuse to fake one.
            OrphanPolicy::Detach => return false,
            OrphanPolicy::Keep => {
                if let Some(item) = list.get_mut(id) {
                    item.parent_id = None;
                    item.indent = new_depth;
                }
            }
        },
    }
    list.touch();
    true
}

/// Insert a new blank-or-text item immediately after `index`, inheriting the
/// anchor's parent so the new item stays inside the anchor's block. Returns
/// the new id, or None on a structural failure.
///
/// An anchor with children is a special case: the only position immediately
/// after it that keeps its block contiguous is first-child position, so the
/// new item attaches to the anchor itself.
pub fn insert_below(list: &mut TodoList, index: usize, text: impl Into<String>) -> Option<u64> {
    if index >= list.items.len() {
        return None;
    }
    let id = list.alloc_id()?;

    let anchor = &list.items[index];
    let anchor_has_children = list.items.iter().any(|i| i.parent_id == Some(anchor.id));
    let (parent_id, indent) = if anchor_has_children {
        (Some(anchor.id), anchor.indent + 1)
    } else {
        (anchor.parent_id, anchor.indent)
    };

    let mut item = Item::new(id, text);
    item.parent_id = parent_id;
    item.indent = indent;
    list.items.insert(index + 1, item);
    list.touch();
    Some(id)
}

/// Delete the item at `index`.
///
/// Former children of a removed top-level item reattach to the top-level
/// item whose block immediately precedes the removal point, provided it is
/// active; otherwise they detach together. Children of a removed child item
/// splice to the removed item's own parent so no link dangles.
pub fn remove_at(list: &mut TodoList, index: usize, config: &EngineConfig) -> bool {
    if index >= list.items.len() {
        return false;
    }
    let removed = list.items.remove(index);

    if removed.parent_id.is_none() {
        // Only the immediately preceding top-level block can absorb the
        // children; reaching past it would split it.
        let anchor = list.items[..index]
            .iter()
            .rev()
            .find(|c| c.parent_id.is_none())
            .filter(|c| tree::section_of(&list.items, c.id) == Section::Active)
            .map(|c| c.id);
        for item in &mut list.items {
            if item.parent_id == Some(removed.id) {
                item.parent_id = anchor;
                item.indent = if anchor.is_some() { 1 } else { MIN_DEPTH };
            }
        }
    } else {
        for item in &mut list.items {
            if item.parent_id == Some(removed.id) {
                item.parent_id = removed.parent_id;
                item.indent = item.indent.saturating_sub(1).min(config.max_depth);
            }
        }
    }

    list.ensure_seeded();
    list.touch();
    true
}
