use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Derived active/completed partition of an item, distinct from its raw
/// `completed` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Active,
    Completed,
}

/// A single line-item in a todo list.
///
/// Document order is significant: every item's descendant subtree occupies a
/// contiguous run of positions immediately following it. `parent_id` is the
/// single source of truth for hierarchy; `indent` is only a hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique within a list, assigned by the list's monotonic counter.
    pub id: u64,
    #[serde(default)]
    pub text: String,
    /// Raw completion mark set directly by the user on this item.
    #[serde(default)]
    pub completed: bool,
    /// Parent link, or None for a top-level item.
    #[serde(default)]
    pub parent_id: Option<u64>,
    /// Legacy indent level. Fallback when the parent link dangles, and the
    /// depth source for the migrator. Never authoritative otherwise.
    #[serde(default)]
    pub indent: usize,
}

impl Item {
    /// Create a fresh top-level item.
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Item {
            id,
            text: text.into(),
            completed: false,
            parent_id: None,
            indent: 0,
        }
    }
}

/// A named, ordered todo list plus its id counter and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoList {
    pub name: String,
    pub items: Vec<Item>,
    /// Next id to hand out. Must stay strictly ahead of every live id.
    pub next_id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TodoList {
    /// Create an empty list, seeded with a single blank item.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        let mut list = TodoList {
            name: name.into(),
            items: Vec::new(),
            next_id: 1,
            created_at: now,
            updated_at: now,
        };
        list.ensure_seeded();
        list
    }

    /// Rebuild a list from persisted items. The counter is advanced past the
    /// highest id present so reloads never re-mint an id.
    pub fn from_items(
        name: impl Into<String>,
        items: Vec<Item>,
        next_id: u64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let max_id = items.iter().map(|i| i.id).max().unwrap_or(0);
        let mut list = TodoList {
            name: name.into(),
            items,
            next_id: next_id.max(max_id + 1),
            created_at,
            updated_at,
        };
        list.ensure_seeded();
        list
    }

    /// Allocate the next item id.
    ///
    /// A counter that fell behind the highest live id would mint a duplicate;
    /// that is a programming error in dev builds and a skipped operation in
    /// release builds.
    pub fn alloc_id(&mut self) -> Option<u64> {
        let max_id = self.items.iter().map(|i| i.id).max().unwrap_or(0);
        if self.next_id <= max_id {
            debug_assert!(
                false,
                "id counter desync: next_id {} <= max live id {}",
                self.next_id, max_id
            );
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        Some(id)
    }

    /// Position of an item in document order.
    pub fn index_of(&self, id: u64) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    pub fn get(&self, id: u64) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// A list never has zero items: reseed with one blank item if needed.
    pub fn ensure_seeded(&mut self) {
        if self.items.is_empty() {
            if let Some(id) = self.alloc_id() {
                self.items.push(Item::new(id, ""));
            }
        }
    }

    /// Bump the updated timestamp after a mutation.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
