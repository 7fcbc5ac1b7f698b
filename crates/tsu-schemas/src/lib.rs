//! Canonical record shapes shared by every tsu crate.
//!
//! Serde field names are the camelCase names used by the score sheet and by
//! the stored snapshot, so a serialized [`PlayerEntity`] is exactly the
//! document the store holds for one player.

use serde::{Deserialize, Serialize};

/// Number of `Entry {i}` / `Points {i}` column pairs a row may carry.
pub const MAX_ENTRY_SLOTS: usize = 40;

/// Group names starting with this literal mark a substitute entry.
pub const SUB_PREFIX: &str = "Sub";

/// One group/score pairing inside a [`PlayerEntity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySlot {
    pub group_name: String,
    pub score: i64,
    pub sub: bool,
}

impl EntrySlot {
    /// Build a slot, deriving `sub` from the group name.
    pub fn new(group_name: impl Into<String>, score: i64) -> Self {
        let group_name = group_name.into();
        let sub = group_name.starts_with(SUB_PREFIX);
        Self {
            group_name,
            score,
            sub,
        }
    }
}

/// Validated representation of one player's tournament participation.
///
/// `player_id` is the store key: a live run upserts on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntity {
    pub player_name: String,
    pub player_id: i64,
    pub total_entries: u32,
    pub entries: Vec<EntrySlot>,
}

impl PlayerEntity {
    /// Up to `n` group names, in slot order. Used by previews.
    pub fn example_groups(&self, n: usize) -> Vec<&str> {
        self.entries
            .iter()
            .take(n)
            .map(|e| e.group_name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_flag_follows_literal_prefix() {
        assert!(EntrySlot::new("Sub Red", 3).sub);
        assert!(!EntrySlot::new("Red Team", 5).sub);
        // Case-sensitive: only the exact literal counts.
        assert!(!EntrySlot::new("sub red", 1).sub);
        assert!(EntrySlot::new("Subway", 0).sub);
    }

    #[test]
    fn serializes_with_sheet_field_names() {
        let p = PlayerEntity {
            player_name: "Alice".to_string(),
            player_id: 1_234_567_890,
            total_entries: 2,
            entries: vec![EntrySlot::new("Red Team", 5)],
        };
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["playerName"], "Alice");
        assert_eq!(v["playerId"], 1_234_567_890_i64);
        assert_eq!(v["totalEntries"], 2);
        assert_eq!(v["entries"][0]["groupName"], "Red Team");
        assert_eq!(v["entries"][0]["score"], 5);
        assert_eq!(v["entries"][0]["sub"], false);
    }

    #[test]
    fn example_groups_caps_at_n() {
        let p = PlayerEntity {
            player_name: "Bob".to_string(),
            player_id: 1,
            total_entries: 4,
            entries: vec![
                EntrySlot::new("A", 1),
                EntrySlot::new("B", 2),
                EntrySlot::new("C", 3),
                EntrySlot::new("D", 4),
            ],
        };
        assert_eq!(p.example_groups(3), vec!["A", "B", "C"]);
        assert!(PlayerEntity { entries: vec![], ..p }.example_groups(3).is_empty());
    }
}
