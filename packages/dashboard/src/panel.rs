//! Loading, error, and data state of one fetch group.
//!
//! A [`Panel`] is written only through [`Panel::begin`] and
//! [`Panel::apply`]. Readers subscribe to a `watch` channel and always see
//! whole [`PanelState`] values, never a half-applied update.

use std::sync::{Mutex, PoisonError};

use crime_dashboard_models::{FilterOptions, RequestGeneration};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{DashboardError, ErrorKind};

/// Data a panel can hold.
pub trait PanelData: Default + Clone + Send + Sync + 'static {
    /// Whether the data is a valid result with nothing to show.
    fn is_empty(&self) -> bool;
}

impl<T: Clone + Send + Sync + 'static> PanelData for Vec<T> {
    fn is_empty(&self) -> bool {
        Self::is_empty(self)
    }
}

impl PanelData for FilterOptions {
    fn is_empty(&self) -> bool {
        Self::is_empty(self)
    }
}

/// Snapshot of a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelState<T> {
    /// Last successfully loaded data, or empty after a failure or
    /// cancellation.
    pub data: T,
    /// Whether a request of the current generation is in flight.
    pub loading: bool,
    /// User-facing failure message of the current generation.
    pub error: Option<String>,
    /// Generation the state belongs to.
    pub generation: RequestGeneration,
}

impl<T: Default> Default for PanelState<T> {
    fn default() -> Self {
        Self {
            data: T::default(),
            loading: false,
            error: None,
            generation: RequestGeneration::INITIAL,
        }
    }
}

/// What a renderer should show for a panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelView<'a, T> {
    /// A request is in flight.
    Loading,
    /// The last request failed.
    Failed(&'a str),
    /// The last request succeeded with no data.
    Empty,
    /// Data to render.
    Ready(&'a T),
}

impl<T: PanelData> PanelState<T> {
    /// Classifies the state for rendering.
    #[must_use]
    pub fn view(&self) -> PanelView<'_, T> {
        if self.loading {
            PanelView::Loading
        } else if let Some(message) = &self.error {
            PanelView::Failed(message)
        } else if self.data.is_empty() {
            PanelView::Empty
        } else {
            PanelView::Ready(&self.data)
        }
    }
}

/// Identifies one issued request: its generation and cancellation token.
#[derive(Debug, Clone)]
pub struct Ticket {
    /// Generation assigned when the request was issued.
    pub generation: RequestGeneration,
    /// Cancelled when a newer request supersedes this one.
    pub token: CancellationToken,
}

/// State holder of one fetch group.
#[derive(Debug)]
pub struct Panel<T> {
    name: &'static str,
    failure_message: &'static str,
    state: watch::Sender<PanelState<T>>,
    in_flight: Mutex<Option<CancellationToken>>,
}

impl<T: PanelData> Panel<T> {
    /// Creates an idle panel. `failure_message` is what users see when a
    /// request of this group fails.
    #[must_use]
    pub fn new(name: &'static str, failure_message: &'static str) -> Self {
        Self {
            name,
            failure_message,
            state: watch::Sender::new(PanelState::default()),
            in_flight: Mutex::new(None),
        }
    }

    /// Starts a new generation.
    ///
    /// Bumps the generation, marks the panel loading, clears the error, and
    /// then cancels the previous request. The previous data stays visible to
    /// subscribers until the new result is applied.
    pub fn begin(&self) -> Ticket {
        let token = CancellationToken::new();
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);

        // The generation must move before the old token fires, otherwise the
        // woken task could still pass the generation check in `apply`.
        let mut generation = RequestGeneration::INITIAL;
        self.state.send_modify(|state| {
            state.generation = state.generation.next();
            state.loading = true;
            state.error = None;
            generation = state.generation;
        });

        if let Some(previous) = in_flight.replace(token.clone()) {
            previous.cancel();
        }
        drop(in_flight);

        log::debug!("{}: issued request {generation}", self.name);
        Ticket { generation, token }
    }

    /// Applies the outcome of the request identified by `ticket`.
    ///
    /// Results of superseded generations are discarded without touching the
    /// state. Cancelling the current generation resets the data to empty
    /// without a failure message. Any other error is logged, resets the
    /// data, and sets the failure message.
    ///
    /// Returns whether the state changed.
    pub fn apply(&self, ticket: &Ticket, result: Result<T, DashboardError>) -> bool {
        let name = self.name;
        let failure_message = self.failure_message;

        self.state.send_if_modified(|state| {
            if state.generation != ticket.generation {
                log::debug!(
                    "{name}: discarding result of {} (current {})",
                    ticket.generation,
                    state.generation
                );
                return false;
            }

            match result {
                Ok(data) => {
                    state.data = data;
                    state.error = None;
                }
                Err(e) => match e.kind() {
                    ErrorKind::Cancelled => {
                        log::debug!("{name}: request {} cancelled", ticket.generation);
                        if !state.loading {
                            return false;
                        }
                        state.data = T::default();
                        state.error = None;
                    }
                    kind => {
                        log::error!("{name}: request {} failed ({kind:?}): {e}", ticket.generation);
                        state.data = T::default();
                        state.error = Some(failure_message.to_string());
                    }
                },
            }
            state.loading = false;
            true
        })
    }

    /// Cancels the in-flight request, if any.
    pub fn shutdown(&self) {
        let token = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(token) = token {
            token.cancel();
        }
    }

    /// Subscribes to state replacements.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PanelState<T>> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> PanelState<T> {
        self.state.borrow().clone()
    }
}
