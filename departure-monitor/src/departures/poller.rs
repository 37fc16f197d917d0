//! Background polling of departures for every saved selection.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::domain::{Departure, SavedSelection, SelectedLines};
use crate::failure::FailureSink;
use crate::mvv::MvvError;
use crate::source::DepartureSource;

use super::aggregate::{LineGroup, group_by_line};

/// Configuration for the departure poller.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Time between refreshes when the saved selections do not change.
    pub interval: Duration,
}

impl PollConfig {
    /// Set the refresh interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
        }
    }
}

/// Latest departures at one saved stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopBoard {
    pub stop_id: String,
    pub stop_name: String,
    pub groups: Vec<LineGroup>,
    pub fetched_at: DateTime<Utc>,
}

/// Keeps a [`StopBoard`] per saved selection up to date.
///
/// Refreshes whenever the selection list changes and on a fixed interval
/// after that. Each stop is fetched and committed on its own: a slow stop
/// does not hold back the others, and a failed one keeps its previous board.
/// A tick skips stops whose last request is still pending. A change re-asks
/// only stops that are new or whose lines changed, and a reply to a
/// superseded request is dropped. Dropping the poller stops it.
pub struct DeparturePoller {
    boards: watch::Receiver<Vec<StopBoard>>,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl DeparturePoller {
    /// Start polling on the current runtime.
    pub fn spawn<S>(
        source: S,
        selections: watch::Receiver<Vec<SavedSelection>>,
        config: PollConfig,
        sink: Arc<dyn FailureSink>,
    ) -> Self
    where
        S: DepartureSource + 'static,
    {
        let (tx, boards) = watch::channel(Vec::new());
        let token = CancellationToken::new();
        let worker = Worker {
            source,
            sink,
            boards: tx,
        };
        let handle = tokio::spawn(worker.run(selections, config, token.clone()));
        Self {
            boards,
            token,
            handle: Some(handle),
        }
    }

    /// Boards in saved-selection order.
    pub fn boards(&self) -> Vec<StopBoard> {
        self.boards.borrow().clone()
    }

    /// Receive the boards after every commit.
    pub fn subscribe(&self) -> watch::Receiver<Vec<StopBoard>> {
        self.boards.clone()
    }

    /// Stop polling. In-flight fetches are dropped.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Stop polling and wait for the task to finish.
    pub async fn join(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for DeparturePoller {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

struct Worker<S> {
    source: S,
    sink: Arc<dyn FailureSink>,
    boards: watch::Sender<Vec<StopBoard>>,
}

/// A finished departure request.
struct Fetched {
    request: u64,
    selection: SavedSelection,
    result: Result<Vec<Departure>, MvvError>,
}

enum Event {
    Tick,
    Changed,
    Fetched(Fetched),
}

/// Latest request issued per stop and not yet settled.
#[derive(Default)]
struct InFlight {
    next_request: u64,
    stops: HashMap<String, (u64, SelectedLines)>,
}

impl InFlight {
    fn issue(&mut self, selection: &SavedSelection) -> u64 {
        self.next_request += 1;
        self.stops.insert(
            selection.id.clone(),
            (self.next_request, selection.lines.clone()),
        );
        self.next_request
    }

    /// Whether a request for `selection` with its current lines is pending.
    fn covers(&self, selection: &SavedSelection) -> bool {
        self.stops
            .get(&selection.id)
            .is_some_and(|(_, lines)| lines.equivalent(&selection.lines))
    }

    /// Settle `fetched`; false if a newer request for its stop superseded it.
    fn settle(&mut self, fetched: &Fetched) -> bool {
        match self.stops.get(&fetched.selection.id) {
            Some((request, _)) if *request == fetched.request => {
                self.stops.remove(&fetched.selection.id);
                true
            }
            _ => false,
        }
    }
}

impl<S: DepartureSource> Worker<S> {
    async fn run(
        self,
        mut selections: watch::Receiver<Vec<SavedSelection>>,
        config: PollConfig,
        token: CancellationToken,
    ) {
        let mut interval = tokio::time::interval(config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = config.interval.as_secs(), "departure poller started");

        let mut pending = FuturesUnordered::new();
        let mut in_flight = InFlight::default();

        loop {
            let event = tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => Event::Tick,
                changed = selections.changed() => {
                    if changed.is_err() {
                        info!("saved selections closed, stopping poller");
                        break;
                    }
                    Event::Changed
                }
                Some(fetched) = pending.next(), if !pending.is_empty() => Event::Fetched(fetched),
            };

            match event {
                Event::Tick => {
                    let current = selections.borrow().clone();
                    debug!(stops = current.len(), "refreshing departures");
                    // A stop still waiting on its last request is not asked again.
                    for selection in current {
                        if !in_flight.stops.contains_key(&selection.id) {
                            let request = in_flight.issue(&selection);
                            pending.push(self.fetch(request, selection));
                        }
                    }
                }
                Event::Changed => {
                    interval.reset();
                    let current = selections.borrow_and_update().clone();
                    in_flight
                        .stops
                        .retain(|id, _| current.iter().any(|s| s.id == *id));
                    self.prune(&current);
                    debug!(stops = current.len(), "selections changed, refreshing");
                    for selection in current {
                        if !in_flight.covers(&selection) {
                            let request = in_flight.issue(&selection);
                            pending.push(self.fetch(request, selection));
                        }
                    }
                }
                Event::Fetched(fetched) => {
                    if !in_flight.settle(&fetched) {
                        debug!(stop = %fetched.selection.id, "dropping superseded departures");
                        continue;
                    }
                    let order: Vec<String> =
                        selections.borrow().iter().map(|s| s.id.clone()).collect();
                    self.finish(fetched, &order);
                }
            }
        }
        debug!("departure poller stopped");
    }

    async fn fetch(&self, request: u64, selection: SavedSelection) -> Fetched {
        let result = self
            .source
            .departures(&selection.id, &selection.lines, None)
            .await;
        Fetched {
            request,
            selection,
            result,
        }
    }

    fn finish(&self, fetched: Fetched, order: &[String]) {
        match fetched.result {
            Ok(departures) => {
                let board = StopBoard {
                    stop_id: fetched.selection.id,
                    stop_name: fetched.selection.stop.name,
                    groups: group_by_line(departures),
                    fetched_at: Utc::now(),
                };
                self.commit(order, board);
            }
            Err(e) => {
                // The previous board for this stop stays up.
                self.sink.notify_failure("poll departures", &e);
            }
        }
    }

    /// Drop boards of stops that are no longer saved.
    fn prune(&self, selections: &[SavedSelection]) {
        self.boards.send_if_modified(|boards| {
            let before = boards.len();
            boards.retain(|b| selections.iter().any(|s| s.id == b.stop_id));
            boards.len() != before
        });
    }

    fn commit(&self, order: &[String], board: StopBoard) {
        self.boards.send_modify(|boards| {
            match boards.iter_mut().find(|b| b.stop_id == board.stop_id) {
                Some(existing) => *existing = board,
                None => boards.push(board),
            }
            boards.sort_by_key(|b| {
                order
                    .iter()
                    .position(|id| *id == b.stop_id)
                    .unwrap_or(usize::MAX)
            });
        });
    }
}
