use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::client::{ClientResult, ShippingClient};
use crate::error::{MutationError, UsageError};
use crate::hooks::{DEFAULT_PAGE, DEFAULT_PER_PAGE, HookOptions, QueryHook, Shared};
use crate::models::{OrderData, ParcelResponse};
use crate::provider::{ClientHandle, Scope, use_dolivroo};
use crate::state::AsyncState;

/// Creates parcels on demand
///
/// Nothing is sent until [`create_parcel`](Self::create_parcel) is called.
/// The outcome is reported twice: in the hook state and as the call's
/// return value.
#[derive(Debug)]
pub struct UseCreateParcel {
    shared: Arc<Shared<ParcelResponse>>,
    handle: ClientHandle,
}

impl UseCreateParcel {
    /// Mount under `scope` with default options
    pub fn mount(scope: &Scope) -> Result<Self, UsageError> {
        Self::mount_with(scope, HookOptions::default())
    }

    /// Mount under `scope`
    ///
    /// Fails with [`UsageError`] when no provider covers the scope.
    pub fn mount_with(scope: &Scope, options: HookOptions) -> Result<Self, UsageError> {
        let handle = use_dolivroo(scope)?;
        Ok(Self {
            shared: Shared::new("useCreateParcel", AsyncState::initial(false), options),
            handle,
        })
    }

    /// Pick up the client of the current render
    pub fn render(&mut self, scope: &Scope) -> Result<AsyncState<ParcelResponse>, UsageError> {
        self.handle = use_dolivroo(scope)?;
        Ok(self.shared.state())
    }

    /// Create a parcel for `order` with the carrier `company_code`
    ///
    /// Without a client this fails with [`MutationError::NotInitialized`]
    /// and leaves the state alone. Previous data stays visible while the
    /// call is in flight. Dropping the returned future before it completes
    /// ends the loading state without touching data or error.
    pub async fn create_parcel(
        &self,
        company_code: &str,
        order: &OrderData,
    ) -> Result<ParcelResponse, MutationError> {
        let Some(client) = self.handle.client().cloned() else {
            return Err(MutationError::NotInitialized);
        };

        let in_flight = self.shared.begin();
        match client.parcels().create(company_code, order).await {
            Ok(parcel) => {
                in_flight.settle(Ok(parcel.clone()));
                Ok(parcel)
            }
            Err(failure) => {
                debug!("Parcel creation for {} failed: {}", company_code, failure);
                in_flight.settle(Err(failure.clone()));
                Err(MutationError::Operation(failure))
            }
        }
    }

    /// Current state
    pub fn state(&self) -> AsyncState<ParcelResponse> {
        self.shared.state()
    }

    /// Receive every state change from now on
    pub fn subscribe(&self) -> watch::Receiver<AsyncState<ParcelResponse>> {
        self.shared.subscribe()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ParcelKey {
    tracking_id: String,
    company_code: String,
}

fn fetch_parcel(
    client: Arc<dyn ShippingClient>,
    key: ParcelKey,
) -> BoxFuture<'static, ClientResult<ParcelResponse>> {
    async move {
        client
            .parcels()
            .get(&key.tracking_id, &key.company_code)
            .await
    }
    .boxed()
}

/// Tracks one parcel by tracking id
///
/// Skipped while `tracking_id` is empty.
#[derive(Debug)]
pub struct UseParcel {
    query: QueryHook<ParcelKey, ParcelResponse>,
}

impl UseParcel {
    /// Mount under `scope` with default options and start fetching
    ///
    /// Fetches are spawned on the current tokio runtime. Outside of one the
    /// fetch is skipped with a warning and the state stays idle.
    pub fn mount(scope: &Scope, tracking_id: &str, company_code: &str) -> Result<Self, UsageError> {
        Self::mount_with(scope, tracking_id, company_code, HookOptions::default())
    }

    /// Mount under `scope` and start fetching
    pub fn mount_with(
        scope: &Scope,
        tracking_id: &str,
        company_code: &str,
        options: HookOptions,
    ) -> Result<Self, UsageError> {
        let query = QueryHook::mount(
            scope,
            "useParcel",
            ParcelKey::new(tracking_id, company_code),
            options,
            |key| !key.tracking_id.is_empty(),
            fetch_parcel,
        )?;
        Ok(Self { query })
    }

    /// Re-render with the current inputs, refetching if they or the client
    /// changed
    pub fn render(
        &mut self,
        scope: &Scope,
        tracking_id: &str,
        company_code: &str,
    ) -> Result<AsyncState<ParcelResponse>, UsageError> {
        self.query
            .render(scope, ParcelKey::new(tracking_id, company_code))
    }

    /// Fetch the parcel again and wait for the result
    pub async fn refresh(&self) {
        self.query.refresh().await
    }

    /// Current state
    pub fn state(&self) -> AsyncState<ParcelResponse> {
        self.query.state()
    }

    /// Receive every state change from now on
    pub fn subscribe(&self) -> watch::Receiver<AsyncState<ParcelResponse>> {
        self.query.subscribe()
    }
}

impl ParcelKey {
    fn new(tracking_id: &str, company_code: &str) -> Self {
        Self {
            tracking_id: tracking_id.to_string(),
            company_code: company_code.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ParcelPageKey {
    company_code: String,
    page: u32,
    per_page: u32,
}

fn fetch_parcel_page(
    client: Arc<dyn ShippingClient>,
    key: ParcelPageKey,
) -> BoxFuture<'static, ClientResult<ParcelResponse>> {
    async move {
        client
            .parcels()
            .list(&key.company_code, key.page, key.per_page)
            .await
    }
    .boxed()
}

/// Lists a carrier's parcels, one page at a time
///
/// `page` and `per_page` fall back to [`DEFAULT_PAGE`] and
/// [`DEFAULT_PER_PAGE`].
#[derive(Debug)]
pub struct UseParcels {
    query: QueryHook<ParcelPageKey, ParcelResponse>,
}

impl UseParcels {
    /// Mount under `scope` with default options and start fetching
    ///
    /// Must be called inside a tokio runtime for the fetch to run.
    pub fn mount(
        scope: &Scope,
        company_code: &str,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<Self, UsageError> {
        Self::mount_with(scope, company_code, page, per_page, HookOptions::default())
    }

    /// Mount under `scope` and start fetching
    pub fn mount_with(
        scope: &Scope,
        company_code: &str,
        page: Option<u32>,
        per_page: Option<u32>,
        options: HookOptions,
    ) -> Result<Self, UsageError> {
        let query = QueryHook::mount(
            scope,
            "useParcels",
            ParcelPageKey::new(company_code, page, per_page),
            options,
            |_| true,
            fetch_parcel_page,
        )?;
        Ok(Self { query })
    }

    /// Re-render, refetching when the page, the carrier or the client changed
    pub fn render(
        &mut self,
        scope: &Scope,
        company_code: &str,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<AsyncState<ParcelResponse>, UsageError> {
        self.query
            .render(scope, ParcelPageKey::new(company_code, page, per_page))
    }

    /// Fetch the current page again and wait for the result
    pub async fn refresh(&self) {
        self.query.refresh().await
    }

    /// Current state
    pub fn state(&self) -> AsyncState<ParcelResponse> {
        self.query.state()
    }

    /// Receive every state change from now on
    pub fn subscribe(&self) -> watch::Receiver<AsyncState<ParcelResponse>> {
        self.query.subscribe()
    }
}

impl ParcelPageKey {
    fn new(company_code: &str, page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            company_code: company_code.to_string(),
            page: page.unwrap_or(DEFAULT_PAGE),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE),
        }
    }
}
