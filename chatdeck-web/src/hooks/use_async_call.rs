use shared::async_call::{AsyncCall, AsyncOperation, CallState, CompletionPolicy};
use std::fmt;
use wasm_bindgen_futures::spawn_local;
use yew::{Callback, hook, use_effect_with, use_force_update, use_mut_ref};

/// Handle returned by [`use_async_call`].
///
/// Holds the wrapper bound to the current operation and the state snapshot
/// taken for this render.
pub struct UseAsyncCallHandle<Op, T> {
    call: AsyncCall<Op, T>,
    state: CallState<T>,
}

impl<Op, T: Clone> Clone for UseAsyncCallHandle<Op, T> {
    fn clone(&self) -> Self {
        Self {
            call: self.call.clone(),
            state: self.state.clone(),
        }
    }
}

impl<Op, T: Clone + fmt::Debug> fmt::Debug for UseAsyncCallHandle<Op, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UseAsyncCallHandle")
            .field("revision", &self.call.revision())
            .field("state", &self.state)
            .finish()
    }
}

impl<Op, T: Clone + PartialEq> PartialEq for UseAsyncCallHandle<Op, T> {
    fn eq(&self, other: &Self) -> bool {
        self.call.revision() == other.call.revision() && self.state == other.state
    }
}

impl<Op: 'static, T: Clone + 'static> UseAsyncCallHandle<Op, T> {
    pub fn state(&self) -> &CallState<T> {
        &self.state
    }

    pub fn result(&self) -> Option<&T> {
        self.state.result.as_ref()
    }

    pub fn in_flight(&self) -> bool {
        self.state.in_flight
    }

    pub fn last_error(&self) -> Option<&str> {
        self.state.last_error.as_deref()
    }

    /// Live state, which may be newer than the snapshot taken for this render.
    pub fn current(&self) -> CallState<T> {
        self.call.state()
    }

    /// Revision of the operation binding; changes when the deps change.
    pub fn revision(&self) -> u64 {
        self.call.revision()
    }

    /// Runs the operation on the browser event loop.
    pub fn run<Args>(&self, args: Args)
    where
        Args: 'static,
        Op: AsyncOperation<Args, Output = T>,
        Op::Future: 'static,
    {
        self.run_then(args, Callback::noop());
    }

    /// Runs the operation and emits its outcome (`None` on failure) once it
    /// settles.
    pub fn run_then<Args>(&self, args: Args, on_settled: Callback<Option<T>>)
    where
        Args: 'static,
        Op: AsyncOperation<Args, Output = T>,
        Op::Future: 'static,
    {
        let call = self.call.clone();
        spawn_local(async move {
            let outcome = call.execute(args).await;
            if !call.is_retired() {
                on_settled.emit(outcome);
            }
        });
    }

    /// A callback that runs the operation with the emitted arguments.
    pub fn callback<Args>(&self) -> Callback<Args>
    where
        Args: 'static,
        Op: AsyncOperation<Args, Output = T>,
        Op::Future: 'static,
    {
        let handle = self.clone();
        Callback::from(move |args: Args| handle.run(args))
    }
}

/// Tracks loading, result and error state of `op`.
///
/// The operation is rebound whenever `deps` change; the state carries over.
/// Settlements after the component unmounts are ignored.
#[hook]
pub fn use_async_call<Args, Op, T, D>(op: Op, deps: D) -> UseAsyncCallHandle<Op, T>
where
    Args: 'static,
    Op: AsyncOperation<Args, Output = T> + 'static,
    T: Clone + 'static,
    D: PartialEq + 'static,
{
    use_async_call_with_policy::<Args, Op, T, D>(op, deps, CompletionPolicy::default())
}

/// [`use_async_call`] with an explicit [`CompletionPolicy`]. The policy is
/// fixed when the component first renders.
#[hook]
pub fn use_async_call_with_policy<Args, Op, T, D>(
    op: Op,
    deps: D,
    policy: CompletionPolicy,
) -> UseAsyncCallHandle<Op, T>
where
    Args: 'static,
    Op: AsyncOperation<Args, Output = T> + 'static,
    T: Clone + 'static,
    D: PartialEq + 'static,
{
    let refresh = use_force_update();
    let slot = use_mut_ref(|| None::<(D, AsyncCall<Op, T>)>);

    let call = {
        let mut slot = slot.borrow_mut();
        let call = match slot.take() {
            Some((current, call)) if current == deps => call,
            Some((_, call)) => call.rebind(op),
            None => {
                let call = AsyncCall::with_policy(op, policy);
                call.subscribe(move |_| refresh.force_update());
                call
            }
        };
        *slot = Some((deps, call.clone()));
        call
    };

    {
        let slot = slot.clone();
        use_effect_with((), move |()| {
            move || {
                if let Some((_, call)) = slot.borrow().as_ref() {
                    call.retire();
                }
            }
        });
    }

    let state = call.state();
    UseAsyncCallHandle { call, state }
}
