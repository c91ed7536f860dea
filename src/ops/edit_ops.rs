//! Cursor-driven content editing: split an item in two, or merge it into
//! the nearest preceding visible item.
//!
//! Offsets are byte offsets into the item's text and must land on a
//! grapheme boundary; anything else is a structural no-op. These operations always
//! run on the canonical sequence — visible-row translation happens at the
//! boundary (`tree::canonical_index`), never here.

use crate::model::{EngineConfig, Item, Section, TodoList};
use crate::ops::item_ops;
use crate::ops::tree::{self, MIN_DEPTH};
use crate::util::unicode;

/// Where focus lands after a split or merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditFocus {
    pub id: u64,
    /// Byte offset of the cursor within the focused item's text.
    pub cursor: usize,
}

/// Result of a merge gesture (backspace at offset 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Donor text appended to the target; donor deleted.
    Merged(EditFocus),
    /// Empty item at depth > 0 outdented one level instead.
    Outdented,
    /// Empty item deleted.
    Deleted,
    /// Nothing to do; the caller falls through to plain text editing.
    PassThrough,
}

/// Split the item at the cursor.
///
/// offset 0 keeps the (now empty) item in place and moves the whole text to
/// a new item after it; offset == len appends a new empty item; any interior
/// offset splits the text there. Focus always lands on the new item at
/// cursor 0. Blank items never split.
pub fn split_at(list: &mut TodoList, id: u64, offset: usize) -> Option<EditFocus> {
    let index = list.index_of(id)?;
    let text = list.items[index].text.clone();
    if text.trim().is_empty() {
        return None;
    }
    if !unicode::is_grapheme_boundary(&text, offset) {
        return None;
    }

    let completed = list.items[index].completed;
    let (kept, moved): (&str, &str) = if offset == 0 {
        ("", text.as_str())
    } else {
        text.split_at(offset)
    };

    let new_id = item_ops::insert_below(list, index, moved)?;
    if let Some(item) = list.get_mut(id) {
        item.text = kept.to_string();
    }
    // A split never changes which section the pieces live in.
    if let Some(item) = list.get_mut(new_id) {
        item.completed = completed;
    }
    list.touch();
    Some(EditFocus { id: new_id, cursor: 0 })
}

/// Merge the item into the nearest preceding visible item, or handle the
/// empty-item fallbacks (outdent / delete).
///
/// `hide_completed` mirrors the view setting: when on, effectively-completed
/// items are not merge targets, exactly as they are not visible rows.
pub fn merge_backward(
    list: &mut TodoList,
    id: u64,
    hide_completed: bool,
    config: &EngineConfig,
) -> MergeOutcome {
    let Some(index) = list.index_of(id) else {
        return MergeOutcome::PassThrough;
    };

    if list.items[index].text.is_empty() {
        let depth = tree::depth_of(&list.items, id, config.max_depth);
        if depth > MIN_DEPTH && item_ops::change_indent(list, id, -1, config) {
            return MergeOutcome::Outdented;
        }
        if list.items.len() == 1 {
            return MergeOutcome::PassThrough;
        }
        item_ops::remove_at(list, index, config);
        return MergeOutcome::Deleted;
    }

    let target_id = list.items[..index]
        .iter()
        .rev()
        .map(|i| i.id)
        .find(|&tid| {
            !(hide_completed && tree::section_of(&list.items, tid) == Section::Completed)
        });
    let Some(target_id) = target_id else {
        return MergeOutcome::PassThrough;
    };

    let donor_range = tree::block_range(&list.items, index);
    let mut subtree: Vec<Item> = list.items.drain(donor_range).collect();
    let donor = subtree.remove(0);

    let target_depth = tree::depth_of(&list.items, target_id, config.max_depth);
    for item in &mut subtree {
        if item.parent_id == Some(donor.id) {
            item.parent_id = Some(target_id);
            item.indent = (target_depth + 1).min(config.max_depth);
        }
    }
    // The donor's subtree lands at the end of the target's block; left in
    // place it would be stranded behind whatever separated donor and target.
    if let Some(pos) = list.index_of(target_id) {
        let at = tree::block_range(&list.items, pos).end;
        list.items.splice(at..at, subtree);
    }
    let Some(target) = list.get_mut(target_id) else {
        // Scan found it a moment ago; nothing sane to do if it vanished.
        return MergeOutcome::PassThrough;
    };
    let boundary = target.text.len();
    target.text.push_str(&donor.text);
    list.touch();
    MergeOutcome::Merged(EditFocus {
        id: target_id,
        cursor: boundary,
    })
}
