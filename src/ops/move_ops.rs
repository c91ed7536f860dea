//! Drag-style block reordering.
//!
//! A move extracts a contiguous block (an item plus its descendants),
//! validates the destination, reinserts the block, and repairs the root's
//! parent link. All of it runs over one working copy of the sequence and is
//! committed in a single assignment; a rejected move leaves the list
//! untouched.

use crate::model::{EngineConfig, Item, OrphanPolicy, Section, TodoList};
use crate::ops::tree::{self, MIN_DEPTH};

/// Where a dragged block lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// Immediately before the target item's block.
    Before(u64),
    /// Immediately after the target item's block.
    After(u64),
    /// After the last item of the given section.
    SectionEnd(Section),
}

/// Move the block rooted at `source_id` to `target`. Returns false (and
/// changes nothing) when the request is structurally invalid: unknown ids,
/// a target inside the source's own block, or a cross-section drop.
pub fn move_block(
    list: &mut TodoList,
    source_id: u64,
    target: DropTarget,
    config: &EngineConfig,
) -> bool {
    let Some(src_pos) = list.index_of(source_id) else {
        return false;
    };
    let src_section = tree::section_of(&list.items, source_id);
    let src_depth = tree::depth_of(&list.items, source_id, config.max_depth);
    let src_range = tree::block_range(&list.items, src_pos);

    match target {
        DropTarget::Before(tid) | DropTarget::After(tid) => {
            if tid == source_id {
                return false;
            }
            let Some(t_pos) = list.index_of(tid) else {
                return false;
            };
            // Containment is a positional range test; contiguity makes a
            // parent walk unnecessary.
            if src_range.contains(&t_pos) {
                return false;
            }
            if tree::section_of(&list.items, tid) != src_section {
                return false;
            }
        }
        DropTarget::SectionEnd(section) => {
            if section != src_section {
                return false;
            }
        }
    }

    let mut work = list.items.clone();
    let block: Vec<Item> = work.drain(src_range).collect();
    let block_len = block.len();

    let insert_at = match target {
        DropTarget::Before(tid) => match work.iter().position(|i| i.id == tid) {
            Some(pos) => pos,
            None => return false,
        },
        DropTarget::After(tid) => match work.iter().position(|i| i.id == tid) {
            // After the target's whole block, so the target's own subtree
            // stays contiguous.
            Some(pos) => tree::block_range(&work, pos).end,
            None => return false,
        },
        DropTarget::SectionEnd(section) => work
            .iter()
            .enumerate()
            .filter(|(_, i)| tree::section_of(&work, i.id) == section)
            .map(|(idx, _)| idx + 1)
            .next_back()
            .unwrap_or(work.len()),
    };

    work.splice(insert_at..insert_at, block);

    // An insertion point in the middle of another item's block would split
    // that block, so the moved root joins it as a sibling of the item it
    // displaced.
    let enclosing = work.get(insert_at + block_len).and_then(|next| {
        let pid = next.parent_id?;
        let ppos = work.iter().position(|i| i.id == pid)?;
        (ppos < insert_at).then(|| (pid, tree::depth_of(&work, next.id, config.max_depth)))
    });

    if let Some((pid, depth)) = enclosing {
        if let Some(root) = work.iter_mut().find(|i| i.id == source_id) {
            root.parent_id = Some(pid);
            root.indent = depth;
        }
    } else {
        // The root's old parent may now be anywhere relative to the block,
        // so a nested root reattaches via the same backward scan indent
        // changes use.
        if src_depth > MIN_DEPTH {
            reattach_at_depth(&mut work, source_id, src_depth, config);
        }

        // A block may not gain depth by landing under a shallower
        // predecessor.
        let root_depth = tree::depth_of(&work, source_id, config.max_depth);
        let above_depth = match insert_at {
            0 => None,
            pos => Some(tree::depth_of(&work, work[pos - 1].id, config.max_depth)),
        };
        match above_depth {
            Some(above) if root_depth > above + 1 => {
                reattach_at_depth(&mut work, source_id, above + 1, config);
            }
            None if root_depth > MIN_DEPTH => {
                // Nothing above the block at all: top level is the only
                // depth.
                reattach_at_depth(&mut work, source_id, MIN_DEPTH, config);
            }
            _ => {}
        }
    }

    list.items = work;
    list.touch();
    true
}

/// Point `id` at the backward-scan parent candidate for `depth`, or apply
/// the orphan policy when no candidate exists.
fn reattach_at_depth(items: &mut [Item], id: u64, depth: usize, config: &EngineConfig) {
    let resolved = if depth == MIN_DEPTH {
        None
    } else {
        tree::parent_candidate_for_depth(items, id, depth, config.max_depth)
    };
    let Some(item) = items.iter_mut().find(|i| i.id == id) else {
        return;
    };
    match resolved {
        Some(pid) => {
            item.parent_id = Some(pid);
            item.indent = depth;
        }
        None => {
            item.parent_id = None;
            item.indent = match config.orphan_policy {
                OrphanPolicy::Detach => MIN_DEPTH,
                OrphanPolicy::Keep => depth,
            };
        }
    }
}
