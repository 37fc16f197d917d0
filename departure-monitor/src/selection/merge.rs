//! Reconciling line selections with saved state.
//!
//! Line identifiers drift: the provider occasionally bumps the trailing
//! variant segment of a line's id. Everything that asks "is this line
//! selected?" therefore compares [`LineKey`](crate::domain::LineKey)s, while
//! the identifiers that get stored are always the exact ones the provider
//! returned.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{LineId, LineInfo, LocationResult, SavedSelection, SelectedLines};
use crate::mvv::MvvError;
use crate::source::LineSource;

use super::error::SelectionError;

/// What to persist for a stop.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRecord {
    pub stop: LocationResult,
    pub lines: SelectedLines,
}

impl SaveRecord {
    pub fn stop_id(&self) -> &str {
        &self.stop.id
    }
}

/// Result of [`save`].
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The stop was already saved with equivalent lines; nothing to write.
    Unchanged,
    /// An existing entry got new lines, in place.
    Updated(Vec<SavedSelection>),
    /// A new entry was appended.
    Added(Vec<SavedSelection>),
}

impl SaveOutcome {
    /// The new list, if anything changed.
    pub fn into_changed(self) -> Option<Vec<SavedSelection>> {
        match self {
            SaveOutcome::Unchanged => None,
            SaveOutcome::Updated(list) | SaveOutcome::Added(list) => Some(list),
        }
    }

    pub fn is_changed(&self) -> bool {
        !matches!(self, SaveOutcome::Unchanged)
    }
}

/// The line-picking state for one stop.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSelection {
    stop: LocationResult,
    available: Vec<LineInfo>,
    selected: Vec<LineId>,
}

impl LineSelection {
    /// Start from `available`, pre-selecting whatever `saved` tracks.
    pub fn new(stop: LocationResult, available: Vec<LineInfo>, saved: Option<&SelectedLines>) -> Self {
        let selected = hydrate(&available, saved);
        Self {
            stop,
            available,
            selected,
        }
    }

    /// Load the lines serving `stop` and hydrate from its saved entry, if any.
    pub async fn pick_stop<L: LineSource>(
        stop: LocationResult,
        lines: &L,
        saved: &[SavedSelection],
    ) -> Result<Self, MvvError> {
        let available = lines.available_lines(&stop.id).await?;
        let existing = saved.iter().find(|s| s.id == stop.id).map(|s| &s.lines);
        debug!(
            stop = %stop.id,
            available = available.len(),
            saved = existing.is_some(),
            "picked stop"
        );
        Ok(Self::new(stop, available, existing))
    }

    pub fn stop(&self) -> &LocationResult {
        &self.stop
    }

    pub fn available(&self) -> &[LineInfo] {
        &self.available
    }

    pub fn selected(&self) -> &[LineId] {
        &self.selected
    }

    /// Select every available line, or none.
    pub fn toggle_select_all(&mut self, checked: bool) {
        self.selected = if checked {
            self.available.iter().map(|l| l.stateless.clone()).collect()
        } else {
            Vec::new()
        };
    }

    /// Check or uncheck one line.
    ///
    /// Checking keeps `id` verbatim unless a line with the same key is
    /// already selected. Unchecking drops every entry with the same key.
    pub fn toggle_line(&mut self, id: &LineId, checked: bool) {
        if checked {
            if !self.is_checked(id) {
                self.selected.push(id.clone());
            }
        } else {
            self.selected.retain(|s| !s.same_line(id));
        }
    }

    pub fn is_checked(&self, id: &LineId) -> bool {
        self.selected.iter().any(|s| s.same_line(id))
    }

    pub fn is_all_selected(&self) -> bool {
        covers_all(&self.available, &self.selected)
    }

    /// What saving the current state would persist.
    pub fn save_record(&self) -> Result<SaveRecord, SelectionError> {
        compute_save_record(&self.stop, &self.available, &self.selected)
    }
}

/// The identifiers from `available` that `saved` selects.
pub fn hydrate(available: &[LineInfo], saved: Option<&SelectedLines>) -> Vec<LineId> {
    match saved {
        None => Vec::new(),
        Some(SelectedLines::All) => available.iter().map(|l| l.stateless.clone()).collect(),
        Some(SelectedLines::Explicit(ids)) => available
            .iter()
            .filter(|l| ids.iter().any(|id| id.same_line(&l.stateless)))
            .map(|l| l.stateless.clone())
            .collect(),
    }
}

/// Whether `selected` amounts to every line in `available`.
///
/// `selected` is assumed to be drawn from `available`, so equal counts mean
/// every line. A stop with no lines is never fully selected.
pub fn covers_all(available: &[LineInfo], selected: &[LineId]) -> bool {
    !available.is_empty() && selected.len() == available.len()
}

/// Decide what to persist for `stop`.
///
/// Selecting as many lines as are available saves [`SelectedLines::All`] so
/// that lines added later are tracked too.
pub fn compute_save_record(
    stop: &LocationResult,
    available: &[LineInfo],
    selected: &[LineId],
) -> Result<SaveRecord, SelectionError> {
    if stop.id.is_empty() {
        return Err(SelectionError::MissingStopId);
    }
    if selected.is_empty() {
        return Err(SelectionError::NoLinesSelected {
            stop_id: stop.id.clone(),
        });
    }

    let lines = if covers_all(available, selected) {
        SelectedLines::All
    } else {
        SelectedLines::Explicit(selected.to_vec())
    };
    Ok(SaveRecord {
        stop: stop.clone(),
        lines,
    })
}

/// Merge `record` into `existing`.
///
/// An entry for the same stop with equivalent lines is left alone, keeping
/// its timestamp. Otherwise the entry's lines and timestamp are replaced at
/// the same position, or a new entry is appended.
pub fn save(existing: &[SavedSelection], record: SaveRecord, now: DateTime<Utc>) -> SaveOutcome {
    match existing.iter().position(|s| s.id == record.stop.id) {
        Some(idx) if existing[idx].lines.equivalent(&record.lines) => SaveOutcome::Unchanged,
        Some(idx) => {
            let mut list = existing.to_vec();
            list[idx].lines = record.lines;
            list[idx].saved_at = now;
            SaveOutcome::Updated(list)
        }
        None => {
            let mut list = existing.to_vec();
            list.push(SavedSelection {
                id: record.stop.id.clone(),
                stop: record.stop,
                lines: record.lines,
                saved_at: now,
            });
            SaveOutcome::Added(list)
        }
    }
}

/// `existing` without the entry for `stop_id`, or `None` if there is none.
pub fn remove(existing: &[SavedSelection], stop_id: &str) -> Option<Vec<SavedSelection>> {
    existing.iter().any(|s| s.id == stop_id).then(|| {
        existing
            .iter()
            .filter(|s| s.id != stop_id)
            .cloned()
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TransitMode, stop_fixture};
    use crate::mvv::MockMvvClient;
    use chrono::TimeZone;

    const STOP: &str = "de:09162:6";

    fn line(id: &str) -> LineInfo {
        LineInfo {
            number: "1".into(),
            symbol: "1".into(),
            direction: "Somewhere".into(),
            stateless: LineId::new(id),
            name: TransitMode::Bus,
        }
    }

    fn lines(ids: &[&str]) -> Vec<LineInfo> {
        ids.iter().map(|id| line(id)).collect()
    }

    fn ids(ids: &[&str]) -> Vec<LineId> {
        ids.iter().map(|id| LineId::new(*id)).collect()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 15, hour, 0, 0).unwrap()
    }

    fn saved(id: &str, lines: SelectedLines, hour: u32) -> SavedSelection {
        SavedSelection {
            id: id.into(),
            stop: stop_fixture(id, id),
            lines,
            saved_at: at(hour),
        }
    }

    #[test]
    fn hydrate_without_saved_entry_is_empty() {
        let available = lines(&["op:1:B:H:01"]);
        assert!(hydrate(&available, None).is_empty());
    }

    #[test]
    fn hydrate_all_selects_every_current_line() {
        let available = lines(&["op:1:B:H:02", "op:2:B:H:07"]);
        assert_eq!(
            hydrate(&available, Some(&SelectedLines::All)),
            ids(&["op:1:B:H:02", "op:2:B:H:07"])
        );
    }

    #[test]
    fn hydrate_matches_stale_variants_by_key() {
        let available = lines(&["op:1:B:H:02", "op:2:B:H:02", "op:3:B:H:01"]);
        let saved = SelectedLines::Explicit(ids(&["op:1:B:H:01", "op:2:B:H:01"]));

        let selection = LineSelection::new(stop_fixture(STOP, "Hbf"), available, Some(&saved));

        assert_eq!(selection.selected(), ids(&["op:1:B:H:02", "op:2:B:H:02"]));
        assert!(selection.is_checked(&LineId::new("op:1:B:H:02")));
        assert!(selection.is_checked(&LineId::new("op:2:B:H:02")));
        assert!(!selection.is_checked(&LineId::new("op:3:B:H:01")));
    }

    #[test]
    fn hydrate_ignores_lines_no_longer_served() {
        let available = lines(&["op:1:B:H:01"]);
        let saved = SelectedLines::Explicit(ids(&["op:9:B:H:01"]));
        assert!(hydrate(&available, Some(&saved)).is_empty());
    }

    #[test]
    fn toggle_select_all_sets_and_clears() {
        let mut selection =
            LineSelection::new(stop_fixture(STOP, "Hbf"), lines(&["a:1:B:H:1", "a:2:B:H:1"]), None);

        selection.toggle_select_all(true);
        assert!(selection.is_all_selected());
        assert_eq!(selection.selected().len(), 2);

        selection.toggle_select_all(false);
        assert!(selection.selected().is_empty());
        assert!(!selection.is_all_selected());
    }

    #[test]
    fn toggle_line_does_not_duplicate_by_key() {
        let mut selection =
            LineSelection::new(stop_fixture(STOP, "Hbf"), lines(&["a:1:B:H:2"]), None);

        selection.toggle_line(&LineId::new("a:1:B:H:2"), true);
        selection.toggle_line(&LineId::new("a:1:B:H:3"), true);

        assert_eq!(selection.selected(), ids(&["a:1:B:H:2"]));
    }

    #[test]
    fn toggle_line_keeps_exact_id_when_added() {
        let mut selection =
            LineSelection::new(stop_fixture(STOP, "Hbf"), lines(&["a:1:B:H:2"]), None);
        selection.toggle_line(&LineId::new("a:1:B:H:2"), true);
        assert_eq!(selection.selected()[0].as_str(), "a:1:B:H:2");
    }

    #[test]
    fn toggle_line_off_removes_every_variant() {
        let available = lines(&["a:1:B:H:2", "a:2:B:H:1"]);
        let saved = SelectedLines::Explicit(ids(&["a:1:B:H:1", "a:2:B:H:1"]));
        let mut selection = LineSelection::new(stop_fixture(STOP, "Hbf"), available, Some(&saved));

        selection.toggle_line(&LineId::new("a:1:B:H:9"), false);

        assert_eq!(selection.selected(), ids(&["a:2:B:H:1"]));
    }

    #[test]
    fn is_all_selected_needs_available_lines() {
        let selection = LineSelection::new(stop_fixture(STOP, "Hbf"), Vec::new(), None);
        assert!(!selection.is_all_selected());
    }

    #[test]
    fn full_selection_saves_as_all() {
        let available = lines(&["a:1:B:H:1", "a:2:B:H:1"]);
        let record = compute_save_record(
            &stop_fixture(STOP, "Hbf"),
            &available,
            &ids(&["a:2:B:H:1", "a:1:B:H:1"]),
        )
        .unwrap();
        assert_eq!(record.lines, SelectedLines::All);
        assert_eq!(record.stop_id(), STOP);
    }

    #[test]
    fn partial_selection_saves_explicit_ids() {
        let available = lines(&["a:1:B:H:1", "a:2:B:H:1"]);
        let record =
            compute_save_record(&stop_fixture(STOP, "Hbf"), &available, &ids(&["a:2:B:H:1"]))
                .unwrap();
        assert_eq!(record.lines, SelectedLines::Explicit(ids(&["a:2:B:H:1"])));
    }

    #[test]
    fn save_record_validation() {
        let available = lines(&["a:1:B:H:1"]);
        let no_id = compute_save_record(&stop_fixture("", "?"), &available, &ids(&["a:1:B:H:1"]));
        assert!(matches!(no_id, Err(SelectionError::MissingStopId)));

        let nothing = compute_save_record(&stop_fixture(STOP, "Hbf"), &available, &[]);
        assert!(matches!(
            nothing,
            Err(SelectionError::NoLinesSelected { stop_id }) if stop_id == STOP
        ));
    }

    #[test]
    fn save_appends_new_stop() {
        let existing = vec![saved("a", SelectedLines::All, 7)];
        let record = SaveRecord {
            stop: stop_fixture("b", "B"),
            lines: SelectedLines::All,
        };

        let SaveOutcome::Added(list) = save(&existing, record, at(9)) else {
            panic!("expected append");
        };
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].id, "b");
        assert_eq!(list[1].saved_at, at(9));
        assert_eq!(existing.len(), 1);
    }

    #[test]
    fn save_replaces_in_place() {
        let existing = vec![
            saved("a", SelectedLines::All, 7),
            saved("b", SelectedLines::All, 7),
            saved("c", SelectedLines::All, 7),
        ];
        let record = SaveRecord {
            stop: stop_fixture("b", "renamed"),
            lines: SelectedLines::Explicit(ids(&["x:1:B:H:1"])),
        };

        let SaveOutcome::Updated(list) = save(&existing, record, at(9)) else {
            panic!("expected update");
        };
        let order: Vec<_> = list.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, ["a", "b", "c"]);
        assert_eq!(list[1].lines, SelectedLines::Explicit(ids(&["x:1:B:H:1"])));
        assert_eq!(list[1].saved_at, at(9));
        assert_eq!(list[1].stop.name, "b");
        assert_eq!(existing[1].lines, SelectedLines::All);
    }

    #[test]
    fn save_equivalent_lines_is_unchanged() {
        let existing = vec![saved(
            "a",
            SelectedLines::Explicit(ids(&["x:1:B:H:1", "x:2:B:H:1"])),
            7,
        )];
        let record = SaveRecord {
            stop: stop_fixture("a", "A"),
            lines: SelectedLines::Explicit(ids(&["x:2:B:H:1", "x:1:B:H:1"])),
        };
        assert_eq!(save(&existing, record, at(9)), SaveOutcome::Unchanged);
    }

    #[test]
    fn save_twice_second_is_unchanged() {
        let record = SaveRecord {
            stop: stop_fixture("a", "A"),
            lines: SelectedLines::All,
        };
        let first = save(&[], record.clone(), at(7)).into_changed().unwrap();
        let second = save(&first, record, at(9));
        assert!(!second.is_changed());
        assert_eq!(first[0].saved_at, at(7));
    }

    #[test]
    fn remove_drops_only_that_stop() {
        let existing = vec![saved("a", SelectedLines::All, 7), saved("b", SelectedLines::All, 7)];
        let list = remove(&existing, "a").unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "b");
        assert!(remove(&existing, "zzz").is_none());
    }

    #[tokio::test]
    async fn select_all_round_trip_survives_id_drift() {
        let mock = MockMvvClient::new();
        mock.set_lines(STOP, lines(&["op:1:B:H:01", "op:2:B:H:01", "op:3:B:H:01"]));
        let stop = stop_fixture(STOP, "Hauptbahnhof");

        let mut selection = LineSelection::pick_stop(stop.clone(), &mock, &[]).await.unwrap();
        assert!(selection.selected().is_empty());
        selection.toggle_select_all(true);
        let record = selection.save_record().unwrap();
        assert_eq!(record.lines, SelectedLines::All);
        let list = save(&[], record, at(8)).into_changed().unwrap();

        mock.set_lines(STOP, lines(&["op:1:B:H:02", "op:2:B:H:02", "op:3:B:H:02"]));
        let reopened = LineSelection::pick_stop(stop, &mock, &list).await.unwrap();
        assert_eq!(
            reopened.selected(),
            ids(&["op:1:B:H:02", "op:2:B:H:02", "op:3:B:H:02"])
        );
        assert!(reopened.is_all_selected());
    }

    #[tokio::test]
    async fn pick_stop_propagates_line_failure() {
        let mock = MockMvvClient::new();
        mock.fail(STOP);
        let result = LineSelection::pick_stop(stop_fixture(STOP, "Hbf"), &mock, &[]).await;
        assert!(result.is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn line_ids() -> impl Strategy<Value = Vec<String>> {
            prop::collection::vec("[a-z]{1,3}:[0-9]{1,2}:[A-Z]:[HR]:[0-9]{1,2}", 1..6)
        }

        proptest! {
            #[test]
            fn save_is_idempotent(chosen in line_ids(), all in any::<bool>()) {
                let lines = if all {
                    SelectedLines::All
                } else {
                    SelectedLines::Explicit(chosen.iter().map(LineId::new).collect())
                };
                let record = SaveRecord { stop: stop_fixture("s", "S"), lines };

                let first = save(&[], record.clone(), at(7)).into_changed().unwrap();
                prop_assert_eq!(save(&first, record, at(9)), SaveOutcome::Unchanged);
            }

            #[test]
            fn hydrated_selection_is_drawn_from_available(
                available in line_ids(),
                saved_ids in line_ids(),
            ) {
                let available: Vec<LineInfo> = available.iter().map(|id| line(id)).collect();
                let saved = SelectedLines::Explicit(saved_ids.iter().map(LineId::new).collect());
                for id in hydrate(&available, Some(&saved)) {
                    prop_assert!(available.iter().any(|l| l.stateless == id));
                }
            }
        }
    }
}
