use serde::Serialize;

use crate::model::{EngineConfig, Section, TodoList};
use crate::ops::tree;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ItemJson {
    pub id: u64,
    pub text: String,
    pub completed: bool,
    pub section: Section,
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub indeterminate: bool,
}

#[derive(Serialize)]
pub struct ListJson {
    pub list: String,
    pub items: Vec<ItemJson>,
}

pub fn list_to_json(list: &TodoList, config: &EngineConfig, hide_completed: bool) -> ListJson {
    let items = &list.items;
    ListJson {
        list: list.name.clone(),
        items: tree::visible_indices(items, hide_completed)
            .into_iter()
            .map(|idx| {
                let item = &items[idx];
                ItemJson {
                    id: item.id,
                    text: item.text.clone(),
                    completed: item.completed,
                    section: tree::section_of(items, item.id),
                    depth: tree::depth_of(items, item.id, config.max_depth),
                    parent_id: item.parent_id,
                    indeterminate: tree::indeterminate_of(items, item.id),
                }
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Plain text rendering
// ---------------------------------------------------------------------------

/// The character inside the checkbox: raw flag for leaves, `-` for a
/// partially completed parent.
fn checkbox_char(list: &TodoList, id: u64) -> char {
    if tree::indeterminate_of(&list.items, id) {
        '-'
    } else if list.get(id).is_some_and(|i| i.completed) {
        'x'
    } else {
        ' '
    }
}

/// Render the outline: two spaces per depth level, checkbox, text, id.
pub fn render_outline(list: &TodoList, config: &EngineConfig, hide_completed: bool) -> String {
    let mut out = String::new();
    for idx in tree::visible_indices(&list.items, hide_completed) {
        let item = &list.items[idx];
        let depth = tree::depth_of(&list.items, item.id, config.max_depth);
        out.push_str(&"  ".repeat(depth));
        out.push('[');
        out.push(checkbox_char(list, item.id));
        out.push_str("] ");
        out.push_str(&item.text);
        out.push_str(&format!("  ·{}", item.id));
        out.push('\n');
    }
    out
}
