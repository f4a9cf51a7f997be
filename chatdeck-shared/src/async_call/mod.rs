//! # Async call tracking
//!
//! [`AsyncCall`] wraps a caller-supplied asynchronous operation and records its
//! outcome as [`CallState`]: the last produced value, whether an invocation is
//! in flight, and the description of the last failure.
//!
//! Failures never escape [`AsyncCall::execute`]. They are converted into
//! `last_error` and the caller receives `None`, so UI code can branch on state
//! instead of handling errors at every call site.
//!
//! The wrapper targets the browser's single-threaded event loop. Overlapping
//! invocations share one state without a queue; the [`CompletionPolicy`]
//! decides whether stale completions may still write it.

mod failure;
mod state;

pub use failure::{OperationFailure, UNEXPECTED_ERROR_MESSAGE};
pub use state::{CallPhase, CallState, CompletionPolicy};

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// An asynchronous operation taking `Args` (usually a tuple) and producing a
/// value or a displayable error.
///
/// Implemented for every `Fn(Args) -> impl Future<Output = Result<T, E>>`.
pub trait AsyncOperation<Args> {
    /// Value produced on success.
    type Output;
    /// Error produced on failure.
    type Error: fmt::Display;
    /// Future returned by [`AsyncOperation::invoke`].
    type Future: Future<Output = Result<Self::Output, Self::Error>>;

    /// Starts the operation.
    fn invoke(&self, args: Args) -> Self::Future;
}

impl<F, Args, Fut, T, E> AsyncOperation<Args> for F
where
    F: Fn(Args) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    type Output = T;
    type Error = E;
    type Future = Fut;

    fn invoke(&self, args: Args) -> Self::Future {
        self(args)
    }
}

/// Identifier returned by [`AsyncCall::subscribe`].
pub type ObserverId = u64;

type Observer<T> = Rc<dyn Fn(&CallState<T>)>;

struct Shared<T> {
    state: RefCell<CallState<T>>,
    policy: CompletionPolicy,
    pending: Cell<usize>,
    latest_started: Cell<u64>,
    next_invocation: Cell<u64>,
    next_revision: Cell<u64>,
    retired: Cell<bool>,
    observers: RefCell<Vec<(ObserverId, Observer<T>)>>,
    next_observer: Cell<ObserverId>,
}

impl<T: Clone> Shared<T> {
    fn new(policy: CompletionPolicy) -> Self {
        Self {
            state: RefCell::new(CallState::default()),
            policy,
            pending: Cell::new(0),
            latest_started: Cell::new(0),
            next_invocation: Cell::new(0),
            next_revision: Cell::new(0),
            retired: Cell::new(false),
            observers: RefCell::new(Vec::new()),
            next_observer: Cell::new(0),
        }
    }

    fn begin(&self) -> u64 {
        let invocation = self.next_invocation.get() + 1;
        self.next_invocation.set(invocation);
        self.latest_started.set(invocation);
        self.pending.set(self.pending.get() + 1);

        if self.retired.get() {
            trace!(invocation, "async call started after owner retired");
            return invocation;
        }

        {
            let mut state = self.state.borrow_mut();
            state.in_flight = true;
            state.last_error = None;
        }
        debug!(invocation, pending = self.pending.get(), "async call started");
        self.notify();
        invocation
    }

    /// Applies a completion. `None` means the invocation was dropped before
    /// its operation settled.
    fn finish(&self, invocation: u64, outcome: Option<Result<T, String>>) {
        self.pending.set(self.pending.get().saturating_sub(1));

        if self.retired.get() {
            trace!(invocation, "discarding completion for retired owner");
            return;
        }

        let latest = self.latest_started.get();
        if self.policy == CompletionPolicy::LatestStarted && invocation != latest {
            trace!(invocation, latest, "discarding stale completion");
            return;
        }

        {
            let mut state = self.state.borrow_mut();
            match outcome {
                Some(Ok(value)) => state.result = Some(value),
                Some(Err(message)) => state.last_error = Some(message),
                None => debug!(invocation, "async call dropped before settling"),
            }
            state.in_flight = match self.policy {
                CompletionPolicy::LastSettled => self.pending.get() > 0,
                CompletionPolicy::LatestStarted => false,
            };
        }
        self.notify();
    }

    fn notify(&self) {
        let observers: Vec<Observer<T>> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        if observers.is_empty() {
            return;
        }

        let snapshot = self.state.borrow().clone();
        for observer in observers {
            observer(&snapshot);
        }
    }
}

/// Settles an invocation exactly once, including when its future is dropped.
struct Settle<'a, T: Clone> {
    shared: &'a Shared<T>,
    invocation: u64,
    done: bool,
}

impl<T: Clone> Settle<'_, T> {
    fn complete(mut self, outcome: Result<T, String>) {
        self.done = true;
        self.shared.finish(self.invocation, Some(outcome));
    }
}

impl<T: Clone> Drop for Settle<'_, T> {
    fn drop(&mut self) {
        if !self.done {
            self.shared.finish(self.invocation, None);
        }
    }
}

/// Tracks loading, result and error state around an asynchronous operation.
///
/// Clones share the same state and operation. [`AsyncCall::rebind`] produces a
/// handle bound to a different operation that still shares the state.
pub struct AsyncCall<Op, T> {
    op: Rc<Op>,
    revision: u64,
    shared: Rc<Shared<T>>,
}

impl<Op, T> Clone for AsyncCall<Op, T> {
    fn clone(&self) -> Self {
        Self {
            op: Rc::clone(&self.op),
            revision: self.revision,
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<Op, T: fmt::Debug> fmt::Debug for AsyncCall<Op, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncCall")
            .field("revision", &self.revision)
            .field("policy", &self.shared.policy)
            .field("state", &*self.shared.state.borrow())
            .field("retired", &self.shared.retired.get())
            .finish_non_exhaustive()
    }
}

impl<Op, T: Clone> AsyncCall<Op, T> {
    /// Wraps `op` using [`CompletionPolicy::LastSettled`].
    pub fn new(op: Op) -> Self {
        Self::with_policy(op, CompletionPolicy::default())
    }

    /// Wraps `op` using the given completion policy.
    pub fn with_policy(op: Op, policy: CompletionPolicy) -> Self {
        Self {
            op: Rc::new(op),
            revision: 0,
            shared: Rc::new(Shared::new(policy)),
        }
    }

    /// Runs the operation and records its outcome.
    ///
    /// Marks the call in flight and clears `last_error` before invoking the
    /// operation. On success the value is stored and returned. On failure the
    /// error's description is stored in `last_error` and `None` is returned.
    /// The in-flight flag is cleared on both paths, and also when the returned
    /// future is dropped before the operation settles.
    pub async fn execute<Args>(&self, args: Args) -> Option<T>
    where
        Op: AsyncOperation<Args, Output = T>,
    {
        let invocation = self.shared.begin();
        let settle = Settle {
            shared: self.shared.as_ref(),
            invocation,
            done: false,
        };

        match self.op.invoke(args).await {
            Ok(value) => {
                debug!(invocation, "async call succeeded");
                settle.complete(Ok(value.clone()));
                Some(value)
            }
            Err(error) => {
                let failure = OperationFailure::from_display(&error);
                warn!(invocation, error = %failure, "async call failed");
                settle.complete(Err(failure.describe().to_owned()));
                None
            }
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> CallState<T> {
        self.shared.state.borrow().clone()
    }

    /// Last successfully produced value.
    pub fn result(&self) -> Option<T> {
        self.shared.state.borrow().result.clone()
    }

    /// Whether an invocation is awaiting its operation.
    pub fn in_flight(&self) -> bool {
        self.shared.state.borrow().in_flight
    }

    /// Description of the most recent failure.
    pub fn last_error(&self) -> Option<String> {
        self.shared.state.borrow().last_error.clone()
    }

    /// Policy applied to overlapping completions.
    pub fn policy(&self) -> CompletionPolicy {
        self.shared.policy
    }

    /// Revision of the operation binding; bumped by every [`AsyncCall::rebind`].
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// The wrapped operation.
    pub fn operation(&self) -> &Op {
        &self.op
    }

    /// Binds a new operation while keeping the current state, observers and
    /// policy. The returned handle carries a fresh revision.
    pub fn rebind<G>(&self, op: G) -> AsyncCall<G, T> {
        let revision = self.shared.next_revision.get() + 1;
        self.shared.next_revision.set(revision);
        debug!(revision, "async call rebound to new operation");
        AsyncCall {
            op: Rc::new(op),
            revision,
            shared: Rc::clone(&self.shared),
        }
    }

    /// Registers a callback run after every state transition.
    pub fn subscribe(&self, observer: impl Fn(&CallState<T>) + 'static) -> ObserverId {
        let id = self.shared.next_observer.get() + 1;
        self.shared.next_observer.set(id);
        let observer: Observer<T> = Rc::new(observer);
        self.shared.observers.borrow_mut().push((id, observer));
        id
    }

    /// Removes a callback registered with [`AsyncCall::subscribe`].
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.shared.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(observer_id, _)| *observer_id != id);
        observers.len() != before
    }

    /// Marks the owner as torn down. Later transitions leave the state alone
    /// and notify nobody; pending invocations still return their outcome to
    /// whoever awaits them.
    pub fn retire(&self) {
        if !self.shared.retired.replace(true) {
            debug!(
                pending = self.shared.pending.get(),
                "async call owner retired"
            );
        }
    }

    /// Whether [`AsyncCall::retire`] has been called on any shared handle.
    pub fn is_retired(&self) -> bool {
        self.shared.retired.get()
    }
}
