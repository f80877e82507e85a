//! Async state bindings for the Dolivroo shipping API client.
//!
//! A `DolivrooProvider` owns the client built from a credential and optional
//! config and hands out a `Scope` for its subtree. Hooks read the client from
//! that scope and track one `{data, loading, error}` triple each:
//!
//! ```ignore
//! let mut provider = DolivrooProvider::new(factory);
//! let scope = provider.render("api-key", None);
//! let mut parcel = UseParcel::mount(&scope, "TRK-1", "yalidine")?;
//! let mut updates = parcel.subscribe();
//! ```
//!
//! Query hooks (parcel, parcel list, rates, rate comparison, regions) fetch on
//! mount and whenever their inputs or the client change. `UseCreateParcel`
//! only calls the client when asked to.
//!
//! Query hooks spawn their fetches on the current tokio runtime. Mounted or
//! rendered outside of one, they log a warning and stay idle.

mod client;
mod config;
mod error;
mod hooks;
mod models;
mod provider;
mod state;

#[cfg(test)]
mod testing;

pub use client::{
    ClientFactory, ClientResult, Failure, ParcelsApi, RatesApi, RegionsApi, ShippingClient,
};
pub use config::{ClientConfig, ConfigResult};
pub use error::{ConfigError, MutationError, UsageError};
pub use hooks::{
    DEFAULT_PAGE, DEFAULT_PER_PAGE, HookOptions, UseCompareRates, UseCreateParcel, UseParcel,
    UseParcels, UseRates, UseRegions,
};
pub use models::{OrderData, ParcelResponse, RateResponse, RegionList};
pub use provider::{ClientHandle, DolivrooProvider, Scope, use_dolivroo};
pub use state::{Action, AsyncState, CompletionPolicy, Phase, reduce};
