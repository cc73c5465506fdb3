//! Ephemeral presence.
//!
//! Per user, the latest `{displayName, cursor, selection}`. Presence lives
//! and dies with the room: it is never persisted, and a presence failure
//! never touches the document.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEntry {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub cursor: Option<Cursor>,
    #[serde(default)]
    pub selection: Vec<String>,
}

/// Inbound `presence.update` payload. The display name is never taken
/// from the wire; the server stamps it from the authenticated identity.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceUpdate {
    #[serde(default)]
    pub cursor: Option<Cursor>,
    #[serde(default)]
    pub selection: Option<Vec<String>>,
}

/// The room's presence table, keyed by user id.
#[derive(Debug, Default)]
pub struct PresenceTable {
    entries: FxHashMap<String, PresenceEntry>,
}

impl PresenceTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user on join with an empty cursor and selection.
    pub fn join(&mut self, user_id: &str, display_name: &str) -> PresenceEntry {
        let entry = PresenceEntry {
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
            cursor: None,
            selection: Vec::new(),
        };
        self.entries.insert(user_id.to_string(), entry.clone());
        entry
    }

    /// Applies an update, stamping the display name from the identity the
    /// connection authenticated with. Returns the resulting entry.
    pub fn update(
        &mut self,
        user_id: &str,
        display_name: &str,
        update: &PresenceUpdate,
    ) -> PresenceEntry {
        let entry = self
            .entries
            .entry(user_id.to_string())
            .or_insert_with(|| PresenceEntry {
                user_id: user_id.to_string(),
                display_name: display_name.to_string(),
                cursor: None,
                selection: Vec::new(),
            });
        entry.display_name = display_name.to_string();
        entry.cursor = update.cursor;
        if let Some(selection) = &update.selection {
            entry.selection = selection.clone();
        }
        entry.clone()
    }

    pub fn remove(&mut self, user_id: &str) -> Option<PresenceEntry> {
        self.entries.remove(user_id)
    }

    #[must_use]
    pub fn contains(&self, user_id: &str) -> bool {
        self.entries.contains_key(user_id)
    }

    /// Stable snapshot of all entries, sorted by user id.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PresenceEntry> {
        let mut entries: Vec<PresenceEntry> = self.entries.values().cloned().collect();
        entries.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_stamps_display_name() {
        let mut table = PresenceTable::new();
        table.join("user_a", "Ada");
        let entry = table.update("user_a", "Ada Lovelace", &PresenceUpdate {
            cursor: Some(Cursor { x: 4.0, y: 2.0 }),
            selection: Some(vec!["obj_1".into()]),
        });
        assert_eq!(entry.display_name, "Ada Lovelace");
        assert_eq!(entry.cursor, Some(Cursor { x: 4.0, y: 2.0 }));
        assert_eq!(entry.selection, vec!["obj_1".to_string()]);
    }

    #[test]
    fn snapshot_is_sorted() {
        let mut table = PresenceTable::new();
        table.join("user_b", "B");
        table.join("user_a", "A");
        let snapshot = table.snapshot();
        let ids: Vec<&str> = snapshot.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(ids, vec!["user_a", "user_b"]);
    }
}
