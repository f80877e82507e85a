// Test doubles for the shipping client.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

use crate::client::{
    ClientFactory, ClientResult, Failure, ParcelsApi, RatesApi, RegionsApi, ShippingClient,
};
use crate::config::ClientConfig;
use crate::models::{OrderData, ParcelResponse, RateResponse, RegionList};
use crate::provider::{DolivrooProvider, Scope};

pub(crate) type Reply = Result<Value, Failure>;

/// One recorded client call
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    CreateParcel { company_code: String, customer: String },
    GetParcel { tracking_id: String, company_code: String },
    ListParcels { company_code: String, page: u32, per_page: u32 },
    GetRates { company_code: String, from: String, to: String },
    CompareRates { from: String, to: String },
    ListRegions { company_code: Option<String> },
}

/// A call waiting for the test to answer it
#[derive(Debug)]
pub(crate) struct Pending {
    pub call: Call,
    pub reply: oneshot::Sender<Reply>,
}

impl Pending {
    pub fn resolve(self, value: Value) {
        let _ = self.reply.send(Ok(value));
    }

    pub fn reject(self, failure: Failure) {
        let _ = self.reply.send(Err(failure));
    }
}

enum Mode {
    Reply(Reply),
    Gated(mpsc::UnboundedSender<Pending>),
}

/// Client that either answers every call with the same reply or hands each
/// call to the test through a channel
pub(crate) struct MockClient {
    calls: Mutex<Vec<Call>>,
    mode: Mode,
}

impl MockClient {
    pub fn replying(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            mode: Mode::Reply(reply),
        })
    }

    pub fn gated() -> (Arc<Self>, mpsc::UnboundedReceiver<Pending>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            mode: Mode::Gated(tx),
        });
        (client, rx)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    async fn respond(&self, call: Call) -> Reply {
        self.calls.lock().unwrap().push(call.clone());
        match &self.mode {
            Mode::Reply(reply) => reply.clone(),
            Mode::Gated(tx) => {
                let (reply, rx) = oneshot::channel();
                tx.send(Pending { call, reply }).unwrap();
                rx.await.unwrap()
            }
        }
    }
}

fn parcel(value: Value) -> ParcelResponse {
    serde_json::from_value(value).unwrap()
}

#[async_trait]
impl ParcelsApi for MockClient {
    async fn create(&self, company_code: &str, order: &OrderData) -> ClientResult<ParcelResponse> {
        let call = Call::CreateParcel {
            company_code: company_code.to_string(),
            customer: order.customer_name.clone(),
        };
        Ok(parcel(self.respond(call).await?))
    }

    async fn get(&self, tracking_id: &str, company_code: &str) -> ClientResult<ParcelResponse> {
        let call = Call::GetParcel {
            tracking_id: tracking_id.to_string(),
            company_code: company_code.to_string(),
        };
        Ok(parcel(self.respond(call).await?))
    }

    async fn list(
        &self,
        company_code: &str,
        page: u32,
        per_page: u32,
    ) -> ClientResult<ParcelResponse> {
        let call = Call::ListParcels {
            company_code: company_code.to_string(),
            page,
            per_page,
        };
        Ok(parcel(self.respond(call).await?))
    }
}

#[async_trait]
impl RatesApi for MockClient {
    async fn get(
        &self,
        company_code: &str,
        from_region: &str,
        to_region: &str,
    ) -> ClientResult<RateResponse> {
        self.respond(Call::GetRates {
            company_code: company_code.to_string(),
            from: from_region.to_string(),
            to: to_region.to_string(),
        })
        .await
    }

    async fn compare(&self, from_region: &str, to_region: &str) -> ClientResult<RateResponse> {
        self.respond(Call::CompareRates {
            from: from_region.to_string(),
            to: to_region.to_string(),
        })
        .await
    }
}

#[async_trait]
impl RegionsApi for MockClient {
    async fn list(&self, company_code: Option<&str>) -> ClientResult<RegionList> {
        self.respond(Call::ListRegions {
            company_code: company_code.map(str::to_string),
        })
        .await
    }
}

impl ShippingClient for MockClient {
    fn parcels(&self) -> &dyn ParcelsApi {
        self
    }

    fn rates(&self) -> &dyn RatesApi {
        self
    }

    fn regions(&self) -> &dyn RegionsApi {
        self
    }
}

/// Factory handing out one shared mock client
struct SharedMock(Arc<MockClient>);

impl ClientFactory for SharedMock {
    fn create(&self, _credential: &str, _config: Option<&ClientConfig>) -> Arc<dyn ShippingClient> {
        self.0.clone()
    }
}

/// Factory that records every construction
#[derive(Clone, Default)]
pub(crate) struct CountingFactory {
    seen: Arc<Mutex<Vec<(String, Option<ClientConfig>)>>>,
}

impl CountingFactory {
    pub fn constructed(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn credentials(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn last_config(&self) -> Option<ClientConfig> {
        self.seen.lock().unwrap().last().and_then(|(_, c)| c.clone())
    }
}

impl ClientFactory for CountingFactory {
    fn create(&self, credential: &str, config: Option<&ClientConfig>) -> Arc<dyn ShippingClient> {
        self.seen
            .lock()
            .unwrap()
            .push((credential.to_string(), config.cloned()));
        MockClient::replying(Ok(json!({})))
    }
}

/// Provider serving `client`, rendered once with a test credential
pub(crate) fn provide(client: &Arc<MockClient>) -> (DolivrooProvider, Scope) {
    let mut provider = DolivrooProvider::new(SharedMock(client.clone()));
    let scope = provider.render("test-key", None);
    (provider, scope)
}

/// Scope of a provider that was given no credential
pub(crate) fn provide_without_client() -> Scope {
    DolivrooProvider::new(CountingFactory::default()).render("", None)
}

pub(crate) fn failure(msg: &str) -> Failure {
    Arc::new(std::io::Error::other(msg.to_string()))
}

/// Let spawned hook effects run until they block
pub(crate) async fn drain() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dolivroo_hooks=debug".into()),
        )
        .with_test_writer()
        .try_init();
}
