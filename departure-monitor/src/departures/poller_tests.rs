//! Timing tests for the departure poller, on a paused clock.

use std::sync::Arc;
use std::time::Duration;

use super::aggregate::departure_fixture;
use super::poller::{DeparturePoller, PollConfig};
use crate::domain::{SelectedLines, stop_fixture};
use crate::failure::RecordingFailureSink;
use crate::mvv::MockMvvClient;
use crate::selection::{MemoryStore, SaveRecord, SavedSelections};

const HBF: &str = "de:09162:6";
const MARIENPLATZ: &str = "de:09162:2";

async fn wait(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

fn mock() -> MockMvvClient {
    let mock = MockMvvClient::new();
    mock.set_departures(
        HBF,
        vec![
            departure_fixture("swm:01002:G:H:020", "08:00", "08:02"),
            departure_fixture("swm:01001:G:H:011", "08:01", ""),
            departure_fixture("swm:01002:G:H:020", "08:10", ""),
        ],
    );
    mock.set_departures(
        MARIENPLATZ,
        vec![departure_fixture("swm:01003:G:H:005", "08:04", "")],
    );
    mock
}

fn selections(ids: &[&str]) -> Arc<SavedSelections> {
    let repo = SavedSelections::load(Arc::new(MemoryStore::new()));
    for id in ids {
        repo.save(SaveRecord {
            stop: stop_fixture(id, id),
            lines: SelectedLines::All,
        })
        .unwrap();
    }
    Arc::new(repo)
}

fn spawn(
    mock: &MockMvvClient,
    repo: &SavedSelections,
    sink: &RecordingFailureSink,
) -> DeparturePoller {
    DeparturePoller::spawn(
        mock.clone(),
        repo.subscribe(),
        PollConfig::default(),
        Arc::new(sink.clone()),
    )
}

fn board_ids(poller: &DeparturePoller) -> Vec<String> {
    poller.boards().into_iter().map(|b| b.stop_id).collect()
}

#[tokio::test(start_paused = true)]
async fn first_refresh_is_immediate() {
    let mock = mock();
    let repo = selections(&[HBF, MARIENPLATZ]);
    let poller = spawn(&mock, &repo, &RecordingFailureSink::new());

    wait(10).await;

    assert_eq!(mock.departure_log().len(), 2);
    assert_eq!(board_ids(&poller), [HBF, MARIENPLATZ]);
    let hbf = &poller.boards()[0];
    assert_eq!(hbf.groups.len(), 2);
    assert_eq!(hbf.groups[0].departures.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn refreshes_every_interval() {
    let mock = mock();
    let repo = selections(&[HBF, MARIENPLATZ]);
    let _poller = spawn(&mock, &repo, &RecordingFailureSink::new());

    wait(10).await;
    assert_eq!(mock.departure_log().len(), 2);
    wait(29_000).await;
    assert_eq!(mock.departure_log().len(), 2);
    wait(1_000).await;
    assert_eq!(mock.departure_log().len(), 4);
    wait(30_000).await;
    assert_eq!(mock.departure_log().len(), 6);
}

#[tokio::test(start_paused = true)]
async fn selection_change_refreshes_and_restarts_interval() {
    let mock = mock();
    let repo = selections(&[HBF]);
    let poller = spawn(&mock, &repo, &RecordingFailureSink::new());
    wait(10_000).await;
    assert_eq!(mock.departure_log().len(), 1);

    repo.save(SaveRecord {
        stop: stop_fixture(MARIENPLATZ, "Marienplatz"),
        lines: SelectedLines::All,
    })
    .unwrap();
    wait(10).await;

    assert_eq!(mock.departure_log().len(), 3);
    assert_eq!(board_ids(&poller), [HBF, MARIENPLATZ]);

    // The next tick is 30s after the change, not 30s after start.
    wait(25_000).await;
    assert_eq!(mock.departure_log().len(), 3);
    wait(5_000).await;
    assert_eq!(mock.departure_log().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn failed_stop_keeps_last_board() {
    let mock = mock();
    let repo = selections(&[HBF, MARIENPLATZ]);
    let sink = RecordingFailureSink::new();
    let poller = spawn(&mock, &repo, &sink);
    wait(10).await;
    let before = poller.boards();

    mock.fail(HBF);
    mock.set_departures(
        MARIENPLATZ,
        vec![departure_fixture("swm:01003:G:H:005", "08:34", "08:40")],
    );
    wait(30_000).await;

    let after = poller.boards();
    assert_eq!(after.len(), 2);
    assert_eq!(after[0], before[0]);
    assert_eq!(
        after[1].groups[0].departures[0].departure_planned,
        "08:34"
    );
    let failures = sink.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "poll departures");
}

#[tokio::test(start_paused = true)]
async fn slow_stop_does_not_hold_back_others() {
    let mock = mock();
    mock.set_departure_delay(HBF, Duration::from_secs(10));
    let repo = selections(&[HBF, MARIENPLATZ]);
    let poller = spawn(&mock, &repo, &RecordingFailureSink::new());

    wait(1_000).await;
    assert_eq!(board_ids(&poller), [MARIENPLATZ]);

    wait(10_000).await;
    assert_eq!(board_ids(&poller), [HBF, MARIENPLATZ]);
}

#[tokio::test(start_paused = true)]
async fn slow_stop_does_not_delay_a_new_selection() {
    let mock = mock();
    mock.set_departure_delay(HBF, Duration::from_secs(25));
    let repo = selections(&[HBF]);
    let poller = spawn(&mock, &repo, &RecordingFailureSink::new());
    wait(1_000).await;

    repo.save(SaveRecord {
        stop: stop_fixture(MARIENPLATZ, "Marienplatz"),
        lines: SelectedLines::All,
    })
    .unwrap();
    wait(1_000).await;

    // Hauptbahnhof is still pending and is not asked again.
    let stops: Vec<_> = mock.departure_log().into_iter().map(|(id, _)| id).collect();
    assert_eq!(stops, [HBF, MARIENPLATZ]);
    assert_eq!(board_ids(&poller), [MARIENPLATZ]);

    wait(24_000).await;
    assert_eq!(board_ids(&poller), [HBF, MARIENPLATZ]);
    assert_eq!(mock.departure_log().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn changed_lines_supersede_pending_request() {
    let mock = mock();
    mock.set_departure_delay(HBF, Duration::from_secs(10));
    let repo = selections(&[HBF]);
    let poller = spawn(&mock, &repo, &RecordingFailureSink::new());
    wait(1_000).await;

    let lines = SelectedLines::Explicit(vec![crate::domain::LineId::new("swm:01002:G:H:020")]);
    repo.save(SaveRecord {
        stop: stop_fixture(HBF, "Hauptbahnhof"),
        lines: lines.clone(),
    })
    .unwrap();

    // The reply for every line lands at 10s and is dropped.
    wait(9_500).await;
    assert!(poller.boards().is_empty());

    wait(1_000).await;
    let boards = poller.boards();
    assert_eq!(boards.len(), 1);
    assert_eq!(boards[0].groups.len(), 1);
    let log = mock.departure_log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].1, lines);
}

#[tokio::test(start_paused = true)]
async fn removed_stop_loses_its_board() {
    let mock = mock();
    let repo = selections(&[HBF, MARIENPLATZ]);
    let poller = spawn(&mock, &repo, &RecordingFailureSink::new());
    wait(10).await;

    assert!(repo.remove(HBF).unwrap());
    wait(10).await;

    assert_eq!(board_ids(&poller), [MARIENPLATZ]);
}

#[tokio::test(start_paused = true)]
async fn explicit_lines_are_passed_through() {
    let mock = mock();
    let repo = selections(&[]);
    let lines = SelectedLines::Explicit(vec![crate::domain::LineId::new("swm:01002:G:H:020")]);
    repo.save(SaveRecord {
        stop: stop_fixture(HBF, "Hauptbahnhof"),
        lines: lines.clone(),
    })
    .unwrap();
    let poller = spawn(&mock, &repo, &RecordingFailureSink::new());
    wait(10).await;

    assert_eq!(mock.departure_log(), vec![(HBF.to_string(), lines)]);
    let boards = poller.boards();
    assert_eq!(boards[0].stop_name, "Hauptbahnhof");
    assert_eq!(boards[0].groups.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_polling() {
    let mock = mock();
    let repo = selections(&[HBF]);
    let poller = spawn(&mock, &repo, &RecordingFailureSink::new());
    wait(10).await;

    poller.shutdown();
    wait(120_000).await;

    assert_eq!(mock.departure_log().len(), 1);
    poller.join().await;
}

#[tokio::test(start_paused = true)]
async fn drop_stops_polling() {
    let mock = mock();
    let repo = selections(&[HBF]);
    let poller = spawn(&mock, &repo, &RecordingFailureSink::new());
    wait(10).await;

    drop(poller);
    wait(120_000).await;

    assert_eq!(mock.departure_log().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn stops_when_selections_are_gone() {
    let mock = mock();
    let repo = selections(&[HBF]);
    let poller = spawn(&mock, &repo, &RecordingFailureSink::new());
    wait(10).await;

    drop(repo);
    poller.join().await;
    wait(60_000).await;

    assert_eq!(mock.departure_log().len(), 1);
}
