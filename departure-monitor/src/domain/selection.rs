//! Persisted line selections.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::line_id::LineId;
use super::stop::LocationResult;

/// Which lines of a stop are tracked.
///
/// Serialized as the string `"all"` or as an array of line identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SelectedLinesRepr", into = "SelectedLinesRepr")]
pub enum SelectedLines {
    /// Every line available at the stop, whatever that is at fetch time.
    All,
    /// A fixed snapshot of identifiers, as they were when saved.
    Explicit(Vec<LineId>),
}

impl SelectedLines {
    /// Whether two selections name the same lines.
    ///
    /// `All` only matches `All`. Explicit sets match when they hold the same
    /// identifiers in any order; identifiers are compared verbatim.
    pub fn equivalent(&self, other: &SelectedLines) -> bool {
        match (self, other) {
            (SelectedLines::All, SelectedLines::All) => true,
            (SelectedLines::Explicit(a), SelectedLines::Explicit(b)) => {
                if a.len() != b.len() {
                    return false;
                }
                let set: HashSet<&LineId> = a.iter().collect();
                b.iter().all(|id| set.contains(id))
            }
            _ => false,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, SelectedLines::All)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SelectedLinesRepr {
    Keyword(String),
    List(Vec<LineId>),
}

impl TryFrom<SelectedLinesRepr> for SelectedLines {
    type Error = String;

    fn try_from(repr: SelectedLinesRepr) -> Result<Self, Self::Error> {
        match repr {
            SelectedLinesRepr::Keyword(k) if k == "all" => Ok(SelectedLines::All),
            SelectedLinesRepr::Keyword(k) => Err(format!("unknown line keyword: {k:?}")),
            SelectedLinesRepr::List(ids) => Ok(SelectedLines::Explicit(ids)),
        }
    }
}

impl From<SelectedLines> for SelectedLinesRepr {
    fn from(lines: SelectedLines) -> Self {
        match lines {
            SelectedLines::All => SelectedLinesRepr::Keyword("all".to_string()),
            SelectedLines::Explicit(ids) => SelectedLinesRepr::List(ids),
        }
    }
}

/// A stop the user tracks, with the lines they picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSelection {
    /// Stop id; at most one selection per id.
    pub id: String,
    pub stop: LocationResult,
    pub lines: SelectedLines,
    pub saved_at: DateTime<Utc>,
}
