use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::client::{ClientResult, ShippingClient};
use crate::error::UsageError;
use crate::provider::{Scope, use_dolivroo};
use crate::state::{Action, AsyncState, CompletionPolicy, reduce};

mod parcels;
mod rates;
mod regions;

pub use parcels::{UseCreateParcel, UseParcel, UseParcels};
pub use rates::{UseCompareRates, UseRates};
pub use regions::UseRegions;

/// Page requested by `UseParcels` when the caller gives none
pub const DEFAULT_PAGE: u32 = 1;
/// Page size requested by `UseParcels` when the caller gives none
pub const DEFAULT_PER_PAGE: u32 = 25;

/// Per-instance hook settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HookOptions {
    /// Which completion settles the state when calls overlap
    pub completion: CompletionPolicy,
}

/// State of one hook instance, shared with its in-flight calls
///
/// Every call takes a ticket when it starts. Under
/// `CompletionPolicy::LatestRequest` only the holder of the newest ticket
/// may settle the state.
pub(crate) struct Shared<T> {
    name: &'static str,
    tx: watch::Sender<AsyncState<T>>,
    issued: AtomicU64,
    policy: CompletionPolicy,
}

impl<T> Shared<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(
        name: &'static str,
        initial: AsyncState<T>,
        options: HookOptions,
    ) -> Arc<Self> {
        let (tx, _) = watch::channel(initial);
        Arc::new(Self {
            name,
            tx,
            issued: AtomicU64::new(0),
            policy: options.completion,
        })
    }

    /// Mark a call as started
    ///
    /// Previous data stays visible while loading. The returned guard must be
    /// settled; dropping it unsettled ends the loading state.
    pub(crate) fn begin(self: &Arc<Self>) -> InFlight<T> {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.tx.send_modify(|state| {
            *state = reduce(state, Action::Start { keep_data: true })
        });
        debug!(hook = self.name, ticket, "request started");
        InFlight {
            shared: self.clone(),
            ticket: Some(ticket),
        }
    }

    /// Apply `action` for the call holding `ticket`
    fn apply(&self, ticket: u64, action: Action<T>) {
        let kind = action.kind();
        let applied = self.tx.send_if_modified(|state| {
            let latest = self.issued.load(Ordering::SeqCst);
            let superseded = ticket != latest;
            // A dropped call only releases `loading` if nothing newer is running.
            if superseded
                && (self.policy == CompletionPolicy::LatestRequest
                    || matches!(action, Action::Cancel))
            {
                return false;
            }
            *state = reduce(state, action);
            true
        });
        if applied {
            debug!(hook = self.name, ticket, outcome = kind, "request settled");
        } else {
            debug!(hook = self.name, ticket, outcome = kind, "discarding stale completion");
        }
    }

    pub(crate) fn state(&self) -> AsyncState<T> {
        self.tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<AsyncState<T>> {
        self.tx.subscribe()
    }
}

impl<T> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("name", &self.name)
            .field("issued", &self.issued.load(Ordering::SeqCst))
            .field("policy", &self.policy)
            .finish()
    }
}

/// Ticket of one outstanding call
///
/// Settling consumes it. If it is dropped first (the caller's future was
/// cancelled, or the task was aborted) the hook leaves the loading state
/// with its data and error untouched.
pub(crate) struct InFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    shared: Arc<Shared<T>>,
    ticket: Option<u64>,
}

impl<T> InFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Apply the outcome of the call
    pub(crate) fn settle(mut self, outcome: ClientResult<T>) {
        if let Some(ticket) = self.ticket.take() {
            let action = match outcome {
                Ok(data) => Action::Succeed(data),
                Err(failure) => Action::Fail(failure),
            };
            self.shared.apply(ticket, action);
        }
    }
}

impl<T> Drop for InFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.shared.apply(ticket, Action::Cancel);
        }
    }
}

/// Starts the client call for `key`
pub(crate) type Fetch<K, T> = fn(Arc<dyn ShippingClient>, K) -> BoxFuture<'static, ClientResult<T>>;

/// Dependencies a query was last rendered with
struct Bound<K> {
    client: Option<Arc<dyn ShippingClient>>,
    client_id: Option<Uuid>,
    key: K,
}

/// Fetch-on-change driver behind every query-style hook
///
/// `render` compares the client identity and the key with the previous
/// render and spawns a fetch when either changed. `required` decides whether
/// the key is complete enough to call the client at all.
pub(crate) struct QueryHook<K, T> {
    shared: Arc<Shared<T>>,
    fetch: Fetch<K, T>,
    required: fn(&K) -> bool,
    bound: Option<Bound<K>>,
}

impl<K, T> QueryHook<K, T>
where
    K: Clone + PartialEq + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn mount(
        scope: &Scope,
        name: &'static str,
        key: K,
        options: HookOptions,
        required: fn(&K) -> bool,
        fetch: Fetch<K, T>,
    ) -> Result<Self, UsageError> {
        use_dolivroo(scope)?;
        // The first render below marks the state as loading if it fetches.
        let mut hook = Self {
            shared: Shared::new(name, AsyncState::initial(false), options),
            fetch,
            required,
            bound: None,
        };
        hook.render(scope, key)?;
        Ok(hook)
    }

    pub(crate) fn render(&mut self, scope: &Scope, key: K) -> Result<AsyncState<T>, UsageError> {
        let handle = use_dolivroo(scope)?;
        let changed = match &self.bound {
            Some(bound) => bound.client_id != handle.instance_id() || bound.key != key,
            None => true,
        };
        if changed {
            self.bound = Some(Bound {
                client: handle.client().cloned(),
                client_id: handle.instance_id(),
                key,
            });
            // Effects run detached; their completion lands in `shared`.
            drop(self.trigger());
        }
        Ok(self.shared.state())
    }

    /// Run the fetch for the bound dependencies unless the guard skips it
    fn trigger(&self) -> Option<JoinHandle<()>> {
        let bound = self.bound.as_ref()?;
        let Some(client) = bound.client.clone() else {
            debug!(hook = self.shared.name, "no client available, skipping fetch");
            return None;
        };
        if !(self.required)(&bound.key) {
            debug!(hook = self.shared.name, "required input missing, skipping fetch");
            return None;
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!(hook = self.shared.name, "no tokio runtime, skipping fetch");
            return None;
        };

        let in_flight = self.shared.begin();
        let call = (self.fetch)(client, bound.key.clone());
        Some(runtime.spawn(async move {
            let outcome = call.await;
            in_flight.settle(outcome);
        }))
    }

    /// Fetch again with the current dependencies and wait for it to settle
    pub(crate) async fn refresh(&self) {
        if let Some(task) = self.trigger() {
            if let Err(e) = task.await {
                warn!(hook = self.shared.name, "refresh task did not complete: {}", e);
            }
        }
    }

    pub(crate) fn state(&self) -> AsyncState<T> {
        self.shared.state()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<AsyncState<T>> {
        self.shared.subscribe()
    }
}

impl<K, T> fmt::Debug for QueryHook<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryHook")
            .field("shared", &self.shared)
            .field("client_id", &self.bound.as_ref().and_then(|b| b.client_id))
            .finish()
    }
}
