use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{EngineConfig, Item, TodoList};
use crate::ops::migrate;

/// Error type for list storage
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed list file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("no such list: {0}")]
    NotFound(String),
}

/// Persisted row shape: id, text, completed, nullable parentId, indent.
///
/// `parent_id` is doubly optional so a row written by the legacy depth-only
/// format (no `parentId` field at all) stays distinguishable from an
/// explicit null; that distinction is what triggers the migrator.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemRow {
    id: u64,
    #[serde(default)]
    text: String,
    #[serde(default)]
    completed: bool,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    parent_id: Option<Option<u64>>,
    #[serde(default)]
    indent: usize,
}

/// Map an explicit `null` to `Some(None)` instead of `None`, so only a
/// truly absent field reads as missing.
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<u64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize, Deserialize)]
struct ListFile {
    name: String,
    next_id: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    items: Vec<ItemRow>,
}

/// One JSON document per list under a data directory.
#[derive(Debug, Clone)]
pub struct ListStore {
    dir: PathBuf,
}

impl ListStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::Write {
            path: dir.clone(),
            source: e,
        })?;
        Ok(ListStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    /// Load a list. Legacy rows (missing `parentId`) or unresolvable links
    /// send the items through the one-shot migrator before anything else
    /// sees them.
    pub fn load_list(&self, name: &str, config: &EngineConfig) -> Result<TodoList, StoreError> {
        let path = self.path_for(name);
        if !path.exists() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        let content = fs::read_to_string(&path).map_err(|e| StoreError::Read {
            path: path.clone(),
            source: e,
        })?;
        let file: ListFile =
            serde_json::from_str(&content).map_err(|e| StoreError::Parse { path, source: e })?;

        let has_legacy_rows = file.items.iter().any(|r| r.parent_id.is_none());
        let items: Vec<Item> = file
            .items
            .into_iter()
            .map(|r| Item {
                id: r.id,
                text: r.text,
                completed: r.completed,
                parent_id: r.parent_id.flatten(),
                indent: r.indent,
            })
            .collect();

        let mut list = TodoList::from_items(
            file.name,
            items,
            file.next_id,
            file.created_at,
            file.updated_at,
        );
        if migrate::needs_migration(&list.items, has_legacy_rows) {
            migrate::migrate(&mut list, config);
        }
        Ok(list)
    }

    /// Load a list, creating a freshly seeded one if it doesn't exist yet.
    pub fn load_or_create(
        &self,
        name: &str,
        config: &EngineConfig,
    ) -> Result<TodoList, StoreError> {
        match self.load_list(name, config) {
            Err(StoreError::NotFound(_)) => Ok(TodoList::new(name)),
            other => other,
        }
    }

    /// Write a list atomically: serialize to a temp file in the same
    /// directory, then persist over the target.
    pub fn save_list(&self, list: &TodoList) -> Result<(), StoreError> {
        let path = self.path_for(&list.name);
        let file = ListFile {
            name: list.name.clone(),
            next_id: list.next_id,
            created_at: list.created_at,
            updated_at: list.updated_at,
            items: list
                .items
                .iter()
                .map(|i| ItemRow {
                    id: i.id,
                    text: i.text.clone(),
                    completed: i.completed,
                    // Always written, null for top-level rows.
                    parent_id: Some(i.parent_id),
                    indent: i.indent,
                })
                .collect(),
        };
        let content = serde_json::to_string_pretty(&file).map_err(|e| StoreError::Parse {
            path: path.clone(),
            source: e,
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(|e| StoreError::Write {
            path: path.clone(),
            source: e,
        })?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| StoreError::Write {
                path: path.clone(),
                source: e,
            })?;
        tmp.persist(&path).map_err(|e| StoreError::Write {
            path,
            source: e.error,
        })?;
        Ok(())
    }

    /// Names of all stored lists, sorted.
    pub fn list_names(&self) -> Result<Vec<String>, StoreError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| StoreError::Read {
            path: self.dir.clone(),
            source: e,
        })?;
        let mut names: Vec<String> = entries
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension().and_then(|e| e.to_str()) == Some("json") {
                    path.file_stem()?.to_str().map(String::from)
                } else {
                    None
                }
            })
            .collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = ListStore::open(dir.path()).unwrap();

        let mut list = TodoList::new("home");
        list.items[0].text = "buy milk".into();
        let id = crate::ops::item_ops::insert_below(&mut list, 0, "buy eggs").unwrap();
        crate::ops::item_ops::change_indent(&mut list, id, 1, &config());

        store.save_list(&list).unwrap();
        let loaded = store.load_list("home", &config()).unwrap();

        assert_eq!(loaded.items, list.items);
        assert_eq!(loaded.next_id, list.next_id);
        assert_eq!(loaded.name, "home");
    }

    #[test]
    fn load_missing_list_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = ListStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.load_list("nope", &config()),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn load_or_create_seeds_a_new_list() {
        let dir = TempDir::new().unwrap();
        let store = ListStore::open(dir.path()).unwrap();
        let list = store.load_or_create("fresh", &config()).unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].text, "");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let store = ListStore::open(dir.path()).unwrap();
        fs::write(dir.path().join("bad.json"), "not json {{{").unwrap();
        assert!(matches!(
            store.load_list("bad", &config()),
            Err(StoreError::Parse { .. })
        ));
    }

    #[test]
    fn legacy_rows_without_parent_field_are_migrated() {
        let dir = TempDir::new().unwrap();
        let store = ListStore::open(dir.path()).unwrap();
        // Depth-only rows, as the old format wrote them.
        fs::write(
            dir.path().join("old.json"),
            r#"{
              "name": "old",
              "next_id": 4,
              "created_at": "2021-03-01T00:00:00Z",
              "updated_at": "2021-03-01T00:00:00Z",
              "items": [
                {"id": 1, "text": "parent", "completed": false, "indent": 0},
                {"id": 2, "text": "child", "completed": false, "indent": 1},
                {"id": 3, "text": "grandchild", "completed": false, "indent": 2}
              ]
            }"#,
        )
        .unwrap();

        let list = store.load_list("old", &config()).unwrap();
        assert_eq!(list.get(2).unwrap().parent_id, Some(1));
        assert_eq!(list.get(3).unwrap().parent_id, Some(2));
    }

    #[test]
    fn explicit_null_parent_is_not_legacy() {
        let dir = TempDir::new().unwrap();
        let store = ListStore::open(dir.path()).unwrap();
        fs::write(
            dir.path().join("new.json"),
            r#"{
              "name": "new",
              "next_id": 3,
              "created_at": "2024-01-01T00:00:00Z",
              "updated_at": "2024-01-01T00:00:00Z",
              "items": [
                {"id": 1, "text": "a", "completed": false, "parentId": null, "indent": 0},
                {"id": 2, "text": "b", "completed": false, "parentId": 1, "indent": 1}
              ]
            }"#,
        )
        .unwrap();

        let list = store.load_list("new", &config()).unwrap();
        assert_eq!(list.get(1).unwrap().parent_id, None);
        assert_eq!(list.get(2).unwrap().parent_id, Some(1));
    }

    #[test]
    fn saved_rows_always_carry_parent_id() {
        let dir = TempDir::new().unwrap();
        let store = ListStore::open(dir.path()).unwrap();
        let list = TodoList::new("home");
        store.save_list(&list).unwrap();
        let raw = fs::read_to_string(dir.path().join("home.json")).unwrap();
        assert!(raw.contains("\"parentId\": null"), "raw: {}", raw);
    }

    #[test]
    fn list_names_are_sorted() {
        let dir = TempDir::new().unwrap();
        let store = ListStore::open(dir.path()).unwrap();
        store.save_list(&TodoList::new("zeta")).unwrap();
        store.save_list(&TodoList::new("alpha")).unwrap();
        fs::write(dir.path().join("ignore.txt"), "x").unwrap();
        assert_eq!(store.list_names().unwrap(), vec!["alpha", "zeta"]);
    }
}
