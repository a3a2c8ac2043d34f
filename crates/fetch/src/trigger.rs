//! Re-invocation on parameter change.
//!
//! A [`Trigger`] owns one [`RemoteCall`] strategy and re-runs it whenever the
//! parameters it is given differ from the previous ones. Each cycle starts
//! from a fresh pending [`ResultState`] and publishes exactly one terminal
//! state through a `tokio::sync::watch` channel.
//!
//! A cycle that is superseded before it completes still runs to completion,
//! but its result is discarded: only the latest cycle may publish.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::{RemoteCall, ResultState};

/// Drives a [`RemoteCall`] from a stream of parameter updates.
pub struct Trigger<C: RemoteCall> {
    call: Arc<C>,
    last: Option<C::Params>,
    cycle: Arc<AtomicU64>,
    state: Arc<watch::Sender<ResultState<C::Output>>>,
}

impl<C> Trigger<C>
where
    C: RemoteCall,
    C::Output: Sync,
{
    /// Creates a trigger in the pending state. No cycle runs until the first
    /// [`update`](Self::update).
    pub fn new(call: C) -> Self {
        let (state, _) = watch::channel(ResultState::pending());
        Self {
            call: Arc::new(call),
            last: None,
            cycle: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
        }
    }

    /// Returns a receiver observing every published state.
    pub fn subscribe(&self) -> watch::Receiver<ResultState<C::Output>> {
        self.state.subscribe()
    }

    /// Returns a snapshot of the latest published state.
    pub fn current(&self) -> ResultState<C::Output>
    where
        C::Output: Clone,
    {
        self.state.borrow().clone()
    }

    /// Number of cycles started so far.
    pub fn cycles(&self) -> u64 {
        self.cycle.load(Ordering::SeqCst)
    }

    /// Parameters of the most recent cycle.
    pub fn params(&self) -> Option<&C::Params> {
        self.last.as_ref()
    }

    /// Supplies the current parameters.
    ///
    /// Returns `None` without doing anything when `params` equal those of the
    /// previous cycle. Otherwise resets the state to pending and spawns a new
    /// cycle on the current tokio runtime, returning its handle.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn update(&mut self, params: C::Params) -> Option<JoinHandle<()>> {
        if self.last.as_ref() == Some(&params) {
            return None;
        }

        let cycle = self.cycle.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(ResultState::pending());
        self.last = Some(params.clone());
        debug!(cycle, "parameters changed, starting cycle");

        let call = Arc::clone(&self.call);
        let latest = Arc::clone(&self.cycle);
        let state = Arc::clone(&self.state);

        Some(tokio::spawn(async move {
            let mut outcome = Some(call.invoke(&params).await);
            let published = state.send_if_modified(|current| {
                if latest.load(Ordering::SeqCst) != cycle {
                    return false;
                }
                match outcome.take() {
                    Some(result) => {
                        *current = result;
                        true
                    }
                    None => false,
                }
            });
            if !published {
                debug!(cycle, "discarding result of superseded cycle");
            }
        }))
    }
}

impl<C: RemoteCall> std::fmt::Debug for Trigger<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trigger")
            .field("cycles", &self.cycle.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
