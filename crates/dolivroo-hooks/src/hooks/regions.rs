use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::watch;

use crate::client::{ClientResult, ShippingClient};
use crate::error::UsageError;
use crate::hooks::{HookOptions, QueryHook};
use crate::models::RegionList;
use crate::provider::Scope;
use crate::state::AsyncState;

fn fetch_regions(
    client: Arc<dyn ShippingClient>,
    company_code: Option<String>,
) -> BoxFuture<'static, ClientResult<RegionList>> {
    async move { client.regions().list(company_code.as_deref()).await }.boxed()
}

/// Regions (wilayas), optionally limited to one carrier's coverage
#[derive(Debug)]
pub struct UseRegions {
    query: QueryHook<Option<String>, RegionList>,
}

impl UseRegions {
    /// Mount under `scope` with default options and start fetching
    ///
    /// Fetches run on the current tokio runtime; without one they are
    /// skipped with a warning.
    pub fn mount(scope: &Scope, company_code: Option<&str>) -> Result<Self, UsageError> {
        Self::mount_with(scope, company_code, HookOptions::default())
    }

    /// Mount under `scope` and start fetching
    pub fn mount_with(
        scope: &Scope,
        company_code: Option<&str>,
        options: HookOptions,
    ) -> Result<Self, UsageError> {
        let query = QueryHook::mount(
            scope,
            "useWilayas",
            company_code.map(str::to_string),
            options,
            |_| true,
            fetch_regions,
        )?;
        Ok(Self { query })
    }

    /// Re-render, refetching when the carrier filter or the client changed
    pub fn render(
        &mut self,
        scope: &Scope,
        company_code: Option<&str>,
    ) -> Result<AsyncState<RegionList>, UsageError> {
        self.query.render(scope, company_code.map(str::to_string))
    }

    /// Current state
    pub fn state(&self) -> AsyncState<RegionList> {
        self.query.state()
    }

    /// Receive every state change from now on
    pub fn subscribe(&self) -> watch::Receiver<AsyncState<RegionList>> {
        self.query.subscribe()
    }
}
