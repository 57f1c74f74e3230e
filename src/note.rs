//! Note model — the documents the board is made of.
//!
//! DESIGN
//! ======
//! Two shapes share the same fields: `NoteRecord` is the raw stored document
//! whose coordinates may still be absent, `Note` is the canvas-ready record
//! BoardSync produces once every coordinate is resolved. `NoteDraft` and
//! `NotePatch` are the write payloads; a patch only touches fields that are
//! present (merge semantics).

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// COLOR PALETTE
// =============================================================================

/// Fixed six-color sticky-note palette. Serialized as the hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NoteColor {
    #[default]
    #[serde(rename = "#fef08a")]
    Yellow,
    #[serde(rename = "#bae6fd")]
    Blue,
    #[serde(rename = "#bbf7d0")]
    Green,
    #[serde(rename = "#fecaca")]
    Red,
    #[serde(rename = "#ddd6fe")]
    Purple,
    #[serde(rename = "#fbcfe8")]
    Pink,
}

impl NoteColor {
    /// CSS hex value for this palette entry.
    #[must_use]
    pub fn as_hex(self) -> &'static str {
        match self {
            Self::Yellow => "#fef08a",
            Self::Blue => "#bae6fd",
            Self::Green => "#bbf7d0",
            Self::Red => "#fecaca",
            Self::Purple => "#ddd6fe",
            Self::Pink => "#fbcfe8",
        }
    }

    /// Parse a palette hex value. Returns `None` for anything off-palette.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        match hex.to_ascii_lowercase().as_str() {
            "#fef08a" => Some(Self::Yellow),
            "#bae6fd" => Some(Self::Blue),
            "#bbf7d0" => Some(Self::Green),
            "#fecaca" => Some(Self::Red),
            "#ddd6fe" => Some(Self::Purple),
            "#fbcfe8" => Some(Self::Pink),
            _ => None,
        }
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// Raw stored note document. Coordinates are absent until the note has been
/// placed, either by a drag write or an explicit position in its draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: Uuid,
    pub text: String,
    pub color: NoteColor,
    pub x: Option<f64>,
    pub y: Option<f64>,
    /// Milliseconds since Unix epoch. Immutable after creation.
    pub created_at: i64,
}

/// Canvas-ready note with resolved coordinates. Only BoardSync produces these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub text: String,
    pub color: NoteColor,
    pub x: f64,
    pub y: f64,
    pub created_at: i64,
}

// =============================================================================
// WRITE PAYLOADS
// =============================================================================

/// Payload for a create. The store assigns id and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteDraft {
    pub text: String,
    #[serde(default)]
    pub color: NoteColor,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
}

/// Merge-style partial update. Only present fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<NoteColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl NotePatch {
    /// Position-only patch, the shape every drag write takes.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.color.is_none() && self.x.is_none() && self.y.is_none()
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// The full in-memory set of one user's notes at a point in time, in arrival
/// order. Rebuilt wholesale on every store push; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub notes: Vec<Note>,
}

impl BoardSnapshot {
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

// =============================================================================
// TIME
// =============================================================================

/// Current time as milliseconds since Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_default_is_yellow() {
        assert_eq!(NoteColor::default(), NoteColor::Yellow);
        assert_eq!(NoteColor::default().as_hex(), "#fef08a");
    }

    #[test]
    fn color_hex_round_trip() {
        for color in [
            NoteColor::Yellow,
            NoteColor::Blue,
            NoteColor::Green,
            NoteColor::Red,
            NoteColor::Purple,
            NoteColor::Pink,
        ] {
            assert_eq!(NoteColor::from_hex(color.as_hex()), Some(color));
        }
    }

    #[test]
    fn color_from_hex_rejects_off_palette() {
        assert_eq!(NoteColor::from_hex("#ffffff"), None);
        assert_eq!(NoteColor::from_hex(""), None);
    }

    #[test]
    fn color_from_hex_is_case_insensitive() {
        assert_eq!(NoteColor::from_hex("#FEF08A"), Some(NoteColor::Yellow));
    }

    #[test]
    fn color_serializes_as_hex_string() {
        let json = serde_json::to_string(&NoteColor::Pink).unwrap();
        assert_eq!(json, "\"#fbcfe8\"");
        let restored: NoteColor = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, NoteColor::Pink);
    }

    #[test]
    fn record_serde_round_trip() {
        let record = NoteRecord {
            id: Uuid::new_v4(),
            text: "buy milk".into(),
            color: NoteColor::Green,
            x: None,
            y: Some(40.0),
            created_at: 1_700_000_000_000,
        };
        let json = serde_json::to_string(&record).unwrap();
        let restored: NoteRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn patch_position_only_sets_coordinates() {
        let patch = NotePatch::position(12.0, 34.0);
        assert_eq!(patch.x, Some(12.0));
        assert_eq!(patch.y, Some(34.0));
        assert!(patch.text.is_none());
        assert!(patch.color.is_none());
    }

    #[test]
    fn patch_skips_absent_fields_in_json() {
        let json = serde_json::to_string(&NotePatch::position(1.0, 2.0)).unwrap();
        assert!(!json.contains("text"));
        assert!(!json.contains("color"));
    }

    #[test]
    fn empty_patch_is_empty() {
        assert!(NotePatch::default().is_empty());
        assert!(!NotePatch::position(0.0, 0.0).is_empty());
    }

    #[test]
    fn snapshot_lookup_by_id() {
        let note = Note {
            id: Uuid::new_v4(),
            text: "hi".into(),
            color: NoteColor::Yellow,
            x: 20.0,
            y: 20.0,
            created_at: 0,
        };
        let snapshot = BoardSnapshot { notes: vec![note.clone()] };
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get(note.id), Some(&note));
        assert_eq!(snapshot.get(Uuid::new_v4()), None);
    }

    #[test]
    fn now_ms_is_positive() {
        assert!(now_ms() > 0);
    }
}
