use std::collections::HashSet;

use serde::Serialize;

use crate::model::TodoList;
use crate::ops::tree;

/// Structured result from `sprig check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
}

/// An invariant violation found in a list.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// A parent link points at an id that doesn't exist
    #[serde(rename = "dangling_parent")]
    DanglingParent { item_id: u64, parent_id: u64 },
    /// A parent chain loops back on itself
    #[serde(rename = "parent_cycle")]
    ParentCycle { item_id: u64 },
    /// Two items share an id
    #[serde(rename = "duplicate_id")]
    DuplicateId { item_id: u64 },
    /// An item's descendants are not one unbroken run after it
    #[serde(rename = "broken_block")]
    BrokenBlock { item_id: u64, stray_id: u64 },
    /// The id counter fell behind the highest live id
    #[serde(rename = "counter_behind")]
    CounterBehind { next_id: u64, max_id: u64 },
}

/// Validate a list against the structural invariants.
///
/// This is a read-only operation — it does not modify the list.
///
/// Checks performed:
/// 1. No duplicate ids
/// 2. Every parent link resolves, with no self-reference or cycle
/// 3. Block contiguity: each item's descendants follow it in one run
/// 4. The id counter is strictly ahead of every live id
///
/// Section consistency is deliberately not a state check: toggling one child
/// of a completed parent leaves mixed flags inside the block, and that state
/// is legal (it is what the indeterminate checkbox renders). The section rule
/// binds where attachments are formed and in the load-time migrator.
pub fn check_list(list: &TodoList) -> CheckResult {
    let mut result = CheckResult::default();
    let items = &list.items;

    let mut seen_ids = HashSet::new();
    for item in items {
        if !seen_ids.insert(item.id) {
            result.errors.push(CheckError::DuplicateId { item_id: item.id });
        }
    }

    for item in items {
        if let Some(pid) = item.parent_id {
            if pid == item.id {
                result.errors.push(CheckError::ParentCycle { item_id: item.id });
            } else if !seen_ids.contains(&pid) {
                result.errors.push(CheckError::DanglingParent {
                    item_id: item.id,
                    parent_id: pid,
                });
            }
        }
        if has_cycle(list, item.id) {
            result.errors.push(CheckError::ParentCycle { item_id: item.id });
        }
    }

    check_contiguity(list, &mut result);

    let max_id = items.iter().map(|i| i.id).max().unwrap_or(0);
    if list.next_id <= max_id {
        result.errors.push(CheckError::CounterBehind {
            next_id: list.next_id,
            max_id,
        });
    }

    result.valid = result.errors.is_empty();
    result
}

fn has_cycle(list: &TodoList, id: u64) -> bool {
    let mut seen = HashSet::new();
    seen.insert(id);
    let mut current = list.get(id);
    while let Some(item) = current {
        let Some(pid) = item.parent_id else {
            return false;
        };
        if !seen.insert(pid) {
            return true;
        }
        current = list.get(pid);
    }
    false
}

/// Every descendant of an item must sit inside that item's positional block.
fn check_contiguity(list: &TodoList, result: &mut CheckResult) {
    let items = &list.items;
    for pos in 0..items.len() {
        let id = items[pos].id;
        let range = tree::block_range(items, pos);
        for did in tree::descendant_ids(items, id) {
            if let Some(dpos) = list.index_of(did) {
                if !range.contains(&dpos) {
                    result.errors.push(CheckError::BrokenBlock {
                        item_id: id,
                        stray_id: did,
                    });
                }
            }
        }
    }
}
