use async_trait::async_trait;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::models::{OrderData, ParcelResponse, RateResponse, RegionList};

/// Error value raised by the shipping client
///
/// Hooks never inspect or wrap it: the same `Arc` ends up in hook state and,
/// for mutations, in the caller's `Err`.
pub type Failure = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Result of a single client operation
pub type ClientResult<T> = Result<T, Failure>;

/// Parcel operations (`client.parcels`)
#[async_trait]
pub trait ParcelsApi: Send + Sync {
    /// Create a parcel for `order` with the given carrier
    async fn create(&self, company_code: &str, order: &OrderData) -> ClientResult<ParcelResponse>;

    /// Look up a single parcel by tracking id
    async fn get(&self, tracking_id: &str, company_code: &str) -> ClientResult<ParcelResponse>;

    /// List parcels for a carrier, one page at a time
    async fn list(&self, company_code: &str, page: u32, per_page: u32)
    -> ClientResult<ParcelResponse>;
}

/// Rate operations (`client.rates`)
#[async_trait]
pub trait RatesApi: Send + Sync {
    /// Delivery rates of one carrier between two regions
    async fn get(
        &self,
        company_code: &str,
        from_region: &str,
        to_region: &str,
    ) -> ClientResult<RateResponse>;

    /// Delivery rates of every carrier between two regions
    async fn compare(&self, from_region: &str, to_region: &str) -> ClientResult<RateResponse>;
}

/// Region operations (`client.wilayas`)
#[async_trait]
pub trait RegionsApi: Send + Sync {
    /// All regions, optionally restricted to those a carrier serves
    async fn list(&self, company_code: Option<&str>) -> ClientResult<RegionList>;
}

/// The external shipping API client, split into its namespaces
pub trait ShippingClient: Send + Sync {
    /// Parcel namespace
    fn parcels(&self) -> &dyn ParcelsApi;
    /// Rate namespace
    fn rates(&self) -> &dyn RatesApi;
    /// Region (wilaya) namespace
    fn regions(&self) -> &dyn RegionsApi;
}

/// Builds a client from a credential and optional config
///
/// Called by the provider during render, so it must not perform I/O or
/// validate the config; a bad config is reported by the client on first use.
pub trait ClientFactory: Send + Sync {
    /// Build a client for `credential`
    fn create(&self, credential: &str, config: Option<&ClientConfig>) -> Arc<dyn ShippingClient>;
}

impl<F> ClientFactory for F
where
    F: Fn(&str, Option<&ClientConfig>) -> Arc<dyn ShippingClient> + Send + Sync,
{
    fn create(&self, credential: &str, config: Option<&ClientConfig>) -> Arc<dyn ShippingClient> {
        self(credential, config)
    }
}
