use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::watch;

use crate::client::{ClientResult, ShippingClient};
use crate::error::UsageError;
use crate::hooks::{HookOptions, QueryHook};
use crate::models::RateResponse;
use crate::provider::Scope;
use crate::state::AsyncState;

#[derive(Debug, Clone, PartialEq)]
struct RateKey {
    company_code: String,
    from_region: String,
    to_region: String,
}

impl RateKey {
    fn has_route(&self) -> bool {
        !self.from_region.is_empty() && !self.to_region.is_empty()
    }
}

fn fetch_rates(
    client: Arc<dyn ShippingClient>,
    key: RateKey,
) -> BoxFuture<'static, ClientResult<RateResponse>> {
    async move {
        client
            .rates()
            .get(&key.company_code, &key.from_region, &key.to_region)
            .await
    }
    .boxed()
}

/// Delivery rates of one carrier between two regions
///
/// Nothing is fetched until both regions are set.
#[derive(Debug)]
pub struct UseRates {
    query: QueryHook<RateKey, RateResponse>,
}

impl UseRates {
    /// Mount under `scope` with default options
    ///
    /// Fetches run on the current tokio runtime; without one they are
    /// skipped.
    pub fn mount(
        scope: &Scope,
        company_code: &str,
        from_region: &str,
        to_region: &str,
    ) -> Result<Self, UsageError> {
        Self::mount_with(scope, company_code, from_region, to_region, HookOptions::default())
    }

    /// Mount under `scope`, fetching right away if both regions are set
    pub fn mount_with(
        scope: &Scope,
        company_code: &str,
        from_region: &str,
        to_region: &str,
        options: HookOptions,
    ) -> Result<Self, UsageError> {
        let key = RateKey {
            company_code: company_code.to_string(),
            from_region: from_region.to_string(),
            to_region: to_region.to_string(),
        };
        let query = QueryHook::mount(scope, "useRates", key, options, RateKey::has_route, fetch_rates)?;
        Ok(Self { query })
    }

    /// Re-render, refetching when an input or the client changed
    pub fn render(
        &mut self,
        scope: &Scope,
        company_code: &str,
        from_region: &str,
        to_region: &str,
    ) -> Result<AsyncState<RateResponse>, UsageError> {
        let key = RateKey {
            company_code: company_code.to_string(),
            from_region: from_region.to_string(),
            to_region: to_region.to_string(),
        };
        self.query.render(scope, key)
    }

    /// Current state
    pub fn state(&self) -> AsyncState<RateResponse> {
        self.query.state()
    }

    /// Receive every state change from now on
    pub fn subscribe(&self) -> watch::Receiver<AsyncState<RateResponse>> {
        self.query.subscribe()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct RouteKey {
    from_region: String,
    to_region: String,
}

impl RouteKey {
    fn new(from_region: &str, to_region: &str) -> Self {
        Self {
            from_region: from_region.to_string(),
            to_region: to_region.to_string(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.from_region.is_empty() && !self.to_region.is_empty()
    }
}

fn fetch_comparison(
    client: Arc<dyn ShippingClient>,
    key: RouteKey,
) -> BoxFuture<'static, ClientResult<RateResponse>> {
    async move {
        client
            .rates()
            .compare(&key.from_region, &key.to_region)
            .await
    }
    .boxed()
}

/// Rates of every carrier between two regions
///
/// Like [`UseRates`], skipped until both regions are set.
#[derive(Debug)]
pub struct UseCompareRates {
    query: QueryHook<RouteKey, RateResponse>,
}

impl UseCompareRates {
    /// Mount under `scope` with default options
    pub fn mount(scope: &Scope, from_region: &str, to_region: &str) -> Result<Self, UsageError> {
        Self::mount_with(scope, from_region, to_region, HookOptions::default())
    }

    /// Mount under `scope`, comparing right away if both regions are set
    ///
    /// Must be called inside a tokio runtime for the comparison to run.
    pub fn mount_with(
        scope: &Scope,
        from_region: &str,
        to_region: &str,
        options: HookOptions,
    ) -> Result<Self, UsageError> {
        let query = QueryHook::mount(
            scope,
            "useCompareRates",
            RouteKey::new(from_region, to_region),
            options,
            RouteKey::is_complete,
            fetch_comparison,
        )?;
        Ok(Self { query })
    }

    /// Re-render, comparing again when the route or the client changed
    pub fn render(
        &mut self,
        scope: &Scope,
        from_region: &str,
        to_region: &str,
    ) -> Result<AsyncState<RateResponse>, UsageError> {
        self.query.render(scope, RouteKey::new(from_region, to_region))
    }

    /// Current state
    pub fn state(&self) -> AsyncState<RateResponse> {
        self.query.state()
    }

    /// Receive every state change from now on
    pub fn subscribe(&self) -> watch::Receiver<AsyncState<RateResponse>> {
        self.query.subscribe()
    }
}
