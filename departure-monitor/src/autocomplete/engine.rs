//! Debounced, cancelable search input.
//!
//! Every input event bumps a generation number and cancels the token of the
//! previous debounce-then-fetch task. A task commits its result only if its
//! generation is still current when it completes, so at most the latest
//! query ever reaches visible state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::failure::{FailureSink, TracingFailureSink};

use super::config::AutocompleteConfig;
use super::fetch::{Fetch, Suggest};
use super::input::{Bounds, Key, KeyOutcome, Point};

/// Callback invoked with the chosen item and its display value.
pub type OnSelect<T> = Box<dyn Fn(&T, &str) + Send + Sync>;

/// Observable state of an autocomplete.
#[derive(Debug, Clone, PartialEq)]
pub struct AutocompleteState<T> {
    /// Text in the input, updated on every keystroke.
    pub query: String,
    /// Results of the last successful fetch.
    pub results: Vec<T>,
    /// Whether the result panel is shown.
    pub is_open: bool,
    /// Whether a fetch is scheduled or in flight.
    pub is_loading: bool,
    /// Highlighted row; `None` means focus is in the input.
    pub highlighted: Option<usize>,
}

impl<T> Default for AutocompleteState<T> {
    fn default() -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            is_open: false,
            is_loading: false,
            highlighted: None,
        }
    }
}

/// What the result panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Panel {
    Closed,
    /// Open, but the last fetch found nothing.
    NoResults(String),
    Rows(Vec<Row>),
}

/// One row of the result panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub label: String,
    pub highlighted: bool,
}

struct Inner<T> {
    state: AutocompleteState<T>,
    generation: u64,
    /// Token of the current debounce-then-fetch task.
    pending: Option<CancellationToken>,
    bounds: Option<Bounds>,
    disposed: bool,
}

struct Shared<T, F> {
    inner: Mutex<Inner<T>>,
    fetcher: F,
    config: AutocompleteConfig,
    sink: Arc<dyn FailureSink>,
    on_select: Option<OnSelect<T>>,
    snapshots: watch::Sender<AutocompleteState<T>>,
    /// Parent of every task token; cancelled on dispose.
    root: CancellationToken,
}

enum Outcome<T, E> {
    Fetched(Vec<T>),
    Failed(E),
    Cancelled,
}

/// A search input with a debounced, cancelable result panel.
///
/// Input handlers are synchronous and must be called from within a Tokio
/// runtime. Dropping the autocomplete disposes it.
pub struct Autocomplete<T: Suggest, F: Fetch<T>> {
    shared: Arc<Shared<T, F>>,
}

/// Builder for [`Autocomplete`].
pub struct AutocompleteBuilder<T, F> {
    fetcher: F,
    config: AutocompleteConfig,
    sink: Arc<dyn FailureSink>,
    on_select: Option<OnSelect<T>>,
}

impl<T: Suggest, F: Fetch<T>> AutocompleteBuilder<T, F> {
    pub fn config(mut self, config: AutocompleteConfig) -> Self {
        self.config = config;
        self
    }

    /// Where fetch failures are reported. Defaults to [`TracingFailureSink`].
    pub fn failure_sink(mut self, sink: Arc<dyn FailureSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn on_select(mut self, f: impl Fn(&T, &str) + Send + Sync + 'static) -> Self {
        self.on_select = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Autocomplete<T, F> {
        let (snapshots, _) = watch::channel(AutocompleteState::default());
        Autocomplete {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state: AutocompleteState::default(),
                    generation: 0,
                    pending: None,
                    bounds: None,
                    disposed: false,
                }),
                fetcher: self.fetcher,
                config: self.config,
                sink: self.sink,
                on_select: self.on_select,
                snapshots,
                root: CancellationToken::new(),
            }),
        }
    }
}

impl<T: Suggest, F: Fetch<T>> Autocomplete<T, F> {
    pub fn builder(fetcher: F) -> AutocompleteBuilder<T, F> {
        AutocompleteBuilder {
            fetcher,
            config: AutocompleteConfig::default(),
            sink: Arc::new(TracingFailureSink),
            on_select: None,
        }
    }

    pub fn new(fetcher: F, config: AutocompleteConfig) -> Self {
        Self::builder(fetcher).config(config).build()
    }

    /// Current state.
    pub fn state(&self) -> AutocompleteState<T> {
        self.shared.lock().state.clone()
    }

    /// Receive a snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<AutocompleteState<T>> {
        self.shared.snapshots.subscribe()
    }

    /// Contents of the result panel.
    pub fn panel(&self) -> Panel {
        let inner = self.shared.lock();
        let state = &inner.state;
        if !state.is_open {
            return Panel::Closed;
        }
        if state.results.is_empty() {
            return Panel::NoResults(self.shared.config.no_results_text.clone());
        }
        Panel::Rows(
            state
                .results
                .iter()
                .enumerate()
                .map(|(i, item)| Row {
                    label: item.label(),
                    highlighted: state.highlighted == Some(i),
                })
                .collect(),
        )
    }

    /// Handle a change of the input's text.
    pub fn on_input(&self, raw: &str) {
        let mut inner = self.shared.lock();
        if inner.disposed {
            return;
        }

        inner.state.query = raw.to_string();
        inner.generation += 1;
        if let Some(token) = inner.pending.take() {
            token.cancel();
        }

        let query = raw.trim();
        if query.chars().count() < self.shared.config.min_chars {
            inner.state.is_open = false;
            inner.state.is_loading = false;
            self.shared.publish(&inner);
            return;
        }

        inner.state.is_loading = true;
        let token = self.shared.root.child_token();
        inner.pending = Some(token.clone());
        let generation = inner.generation;
        self.shared.publish(&inner);
        drop(inner);

        trace!(query, generation, "scheduling fetch");
        tokio::spawn(Shared::run(
            Arc::clone(&self.shared),
            generation,
            query.to_string(),
            token,
        ));
    }

    /// Choose the result at `index`. Returns false if the panel is closed or
    /// the index is out of range.
    pub fn select(&self, index: usize) -> bool {
        let mut inner = self.shared.lock();
        if inner.disposed || !inner.state.is_open {
            return false;
        }
        let Some(item) = inner.state.results.get(index).cloned() else {
            return false;
        };

        let value = item.display_value();
        inner.state.query = value.clone();
        inner.state.is_open = false;
        inner.state.highlighted = None;
        self.shared.publish(&inner);
        drop(inner);

        if let Some(on_select) = &self.shared.on_select {
            on_select(&item, &value);
        }
        true
    }

    /// Handle a key press in the input.
    pub fn on_key(&self, key: Key) -> KeyOutcome {
        let mut inner = self.shared.lock();
        if inner.disposed || !inner.state.is_open {
            return KeyOutcome::PassThrough;
        }

        // Highlight arithmetic uses -1 for "nothing highlighted".
        let current = inner.state.highlighted.map_or(-1, |i| i as isize);
        let last = inner.state.results.len() as isize - 1;

        match key {
            Key::ArrowDown => {
                inner.state.highlighted = to_highlight((current + 1).min(last));
            }
            Key::ArrowUp => {
                inner.state.highlighted = to_highlight((current - 1).max(-1));
            }
            Key::Enter => {
                if let Some(index) = inner.state.highlighted {
                    drop(inner);
                    self.select(index);
                }
                return KeyOutcome::Handled;
            }
            Key::Escape => {
                inner.state.is_open = false;
                inner.state.highlighted = None;
            }
            Key::Other => return KeyOutcome::PassThrough,
        }

        self.shared.publish(&inner);
        KeyOutcome::Handled
    }

    /// Record where the component is laid out.
    pub fn set_bounds(&self, bounds: Bounds) {
        self.shared.lock().bounds = Some(bounds);
    }

    /// Handle a pointer press anywhere; presses outside the component close
    /// the panel.
    pub fn on_pointer_down(&self, at: Point) {
        let mut inner = self.shared.lock();
        if inner.disposed {
            return;
        }
        let Some(bounds) = inner.bounds else {
            return;
        };
        if bounds.contains(at) {
            return;
        }
        inner.state.is_open = false;
        inner.state.highlighted = None;
        self.shared.publish(&inner);
    }

    /// Cancel any pending timer and in-flight fetch. The state is frozen
    /// afterwards.
    pub fn dispose(&self) {
        let mut inner = self.shared.lock();
        if inner.disposed {
            return;
        }
        inner.disposed = true;
        inner.pending = None;
        self.shared.root.cancel();
        debug!("autocomplete disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.lock().disposed
    }
}

impl<T: Suggest, F: Fetch<T>> Drop for Autocomplete<T, F> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<T: Suggest, F: Fetch<T>> Shared<T, F> {
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner<T>) {
        self.snapshots.send_replace(inner.state.clone());
    }

    /// Wait out the debounce interval, then fetch and commit.
    async fn run(self: Arc<Self>, generation: u64, query: String, token: CancellationToken) {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(self.config.debounce) => {}
        }

        debug!(query = %query, generation, "fetching suggestions");
        let outcome = tokio::select! {
            _ = token.cancelled() => Outcome::Cancelled,
            result = self.fetcher.fetch(&query) => match result {
                Ok(items) => Outcome::Fetched(items),
                Err(e) => Outcome::Failed(e),
            },
        };

        self.commit(generation, outcome);
    }

    fn commit(&self, generation: u64, outcome: Outcome<T, F::Error>) {
        let mut inner = self.lock();
        if inner.disposed || inner.generation != generation {
            trace!(generation, "dropping superseded fetch result");
            return;
        }
        inner.pending = None;

        match outcome {
            Outcome::Cancelled => {}
            Outcome::Fetched(items) => {
                inner.state.results = items;
                inner.state.is_open = true;
                inner.state.highlighted = None;
                inner.state.is_loading = false;
                self.publish(&inner);
            }
            Outcome::Failed(error) => {
                inner.state.is_loading = false;
                self.publish(&inner);
                drop(inner);
                self.sink.notify_failure("autocomplete fetch", &error);
            }
        }
    }
}

fn to_highlight(index: isize) -> Option<usize> {
    usize::try_from(index).ok()
}
