//! Row validation: turn one [`RawRow`] into a [`PlayerEntity`] or a typed
//! rejection.
//!
//! This module never panics on bad data and never returns `Err`; every
//! expected per-row failure is a [`Validation::Rejected`] value.
//!
//! Rules, in order (first failing rule wins):
//! 1. both `playerId` and `playerName` blank -> [`Validation::Blank`]
//! 2. `playerId` blank -> [`RejectionReason::MissingIdentifier`]
//! 3. `playerId` not an integer -> [`RejectionReason::InvalidIdentifierFormat`]
//! 4. `playerId` shorter than 10 digits -> [`Advisory::ShortIdentifier`], continue
//! 5. `playerName` blank -> [`RejectionReason::InvalidPlayerName`]
//! 6. `totalEntries` negative, above [`MAX_TOTAL_ENTRIES`] or not an integer ->
//!    [`RejectionReason::InvalidTotalEntries`]
//! 7. one [`EntrySlot`] per occupied `Entry {i}`; malformed `Points {i}` -> 0
//!    plus [`Advisory::MalformedPoints`]

use std::fmt;

use tsu_schemas::{EntrySlot, PlayerEntity, MAX_ENTRY_SLOTS};

use crate::source::{RawRow, RawValue};

pub const FIELD_PLAYER_NAME: &str = "playerName";
pub const FIELD_PLAYER_ID: &str = "playerId";
pub const FIELD_TOTAL_ENTRIES: &str = "totalEntries";

/// Ids with fewer digits than this are accepted but flagged.
pub const SHORT_ID_DIGITS: usize = 10;

/// Largest `totalEntries` the store column can hold.
pub const MAX_TOTAL_ENTRIES: u32 = i32::MAX as u32;

pub fn entry_field(slot: usize) -> String {
    format!("Entry {slot}")
}

pub fn points_field(slot: usize) -> String {
    format!("Points {slot}")
}

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    MissingIdentifier,
    InvalidIdentifierFormat,
    InvalidPlayerName,
    InvalidTotalEntries,
}

impl RejectionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectionReason::MissingIdentifier => "MISSING_IDENTIFIER",
            RejectionReason::InvalidIdentifierFormat => "INVALID_IDENTIFIER_FORMAT",
            RejectionReason::InvalidPlayerName => "INVALID_PLAYER_NAME",
            RejectionReason::InvalidTotalEntries => "INVALID_TOTAL_ENTRIES",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row that failed a rule, with enough context for the operator to find it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub reason: RejectionReason,
    /// 1-based data-row index (the header is not counted).
    pub row: usize,
    pub raw_player_id: Option<String>,
    pub detail: String,
    /// Advisories raised by rules that ran before the failing one.
    pub advisories: Vec<Advisory>,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation error (row {}): {}", self.row, self.detail)
    }
}

/// Non-fatal observation about a row; logged whatever the row's outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    ShortIdentifier { player_id: i64 },
    MalformedPoints { slot: usize, raw: String },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::ShortIdentifier { player_id } => write!(
                f,
                "playerId '{player_id}' looks suspiciously short, but will be imported"
            ),
            Advisory::MalformedPoints { slot, raw } => write!(
                f,
                "'Points {slot}' value '{raw}' is not an integer, scored as 0"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedRow {
    pub entity: PlayerEntity,
    pub advisories: Vec<Advisory>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Both identity fields blank; skipped silently, counted nowhere.
    Blank,
    Accepted(AcceptedRow),
    Rejected(Rejection),
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate one row. `row_index` is the 1-based data-row position, used only
/// for rejection context.
pub fn validate(row: &RawRow, row_index: usize) -> Validation {
    let raw_id = row.non_blank(FIELD_PLAYER_ID);
    let raw_name = row.non_blank(FIELD_PLAYER_NAME);

    if raw_id.is_none() && raw_name.is_none() {
        return Validation::Blank;
    }

    let raw_id = match raw_id {
        Some(v) => v,
        None => {
            return reject(
                RejectionReason::MissingIdentifier,
                row_index,
                None,
                "playerId is missing or empty".to_string(),
            )
        }
    };
    let raw_id_text = raw_id.as_text().into_owned();

    let player_id = match raw_id.parse_i64() {
        Some(id) => id,
        None => {
            let detail = format!("playerId '{raw_id_text}' is not a valid integer");
            return reject(
                RejectionReason::InvalidIdentifierFormat,
                row_index,
                Some(raw_id_text),
                detail,
            );
        }
    };

    let mut advisories = Vec::new();
    if digit_count(player_id) < SHORT_ID_DIGITS {
        advisories.push(Advisory::ShortIdentifier { player_id });
    }

    let player_name = match raw_name {
        Some(v) => v.as_text().trim().to_string(),
        None => {
            return reject_with(
                RejectionReason::InvalidPlayerName,
                row_index,
                Some(raw_id_text),
                format!("for playerId {player_id}: playerName must not be empty"),
                advisories,
            )
        }
    };

    let total_entries = match parse_total_entries(row.non_blank(FIELD_TOTAL_ENTRIES)) {
        Ok(n) => n,
        Err(raw) => {
            return reject_with(
                RejectionReason::InvalidTotalEntries,
                row_index,
                Some(raw_id_text),
                format!(
                    "for playerId {player_id}: totalEntries '{raw}' must be an integer \
                     between 0 and {MAX_TOTAL_ENTRIES}"
                ),
                advisories,
            )
        }
    };

    let mut entries = Vec::new();
    for slot in 1..=MAX_ENTRY_SLOTS {
        let group_name = match row.non_blank(&entry_field(slot)) {
            Some(v) => v.as_text().into_owned(),
            None => continue,
        };
        let score = match row.non_blank(&points_field(slot)) {
            None => 0,
            Some(v) => v.parse_i64().unwrap_or_else(|| {
                advisories.push(Advisory::MalformedPoints {
                    slot,
                    raw: v.as_text().into_owned(),
                });
                0
            }),
        };
        entries.push(EntrySlot::new(group_name, score));
    }

    Validation::Accepted(AcceptedRow {
        entity: PlayerEntity {
            player_name,
            player_id,
            total_entries,
            entries,
        },
        advisories,
    })
}

fn reject(
    reason: RejectionReason,
    row: usize,
    raw_player_id: Option<String>,
    detail: String,
) -> Validation {
    reject_with(reason, row, raw_player_id, detail, Vec::new())
}

fn reject_with(
    reason: RejectionReason,
    row: usize,
    raw_player_id: Option<String>,
    detail: String,
    advisories: Vec<Advisory>,
) -> Validation {
    Validation::Rejected(Rejection {
        reason,
        row,
        raw_player_id,
        detail,
        advisories,
    })
}

/// Absent or blank -> 0. `Err` carries the raw text for the rejection.
fn parse_total_entries(raw: Option<&RawValue>) -> Result<u32, String> {
    let Some(v) = raw else {
        return Ok(0);
    };
    v.parse_i64()
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n <= MAX_TOTAL_ENTRIES)
        .ok_or_else(|| v.as_text().into_owned())
}

fn digit_count(id: i64) -> usize {
    let mut n = id.unsigned_abs();
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}
