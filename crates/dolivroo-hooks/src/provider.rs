use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::client::{ClientFactory, ShippingClient};
use crate::config::ClientConfig;
use crate::error::UsageError;

/// Context value published by a provider: `{client, is_ready}`
///
/// Cloning is cheap and clones share the same value, so two handles taken
/// from renders that did not rebuild anything compare equal with
/// [`ClientHandle::ptr_eq`].
#[derive(Clone)]
pub struct ClientHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    client: Option<Arc<dyn ShippingClient>>,
    instance_id: Option<Uuid>,
}

impl ClientHandle {
    fn new(client: Option<Arc<dyn ShippingClient>>) -> Self {
        let instance_id = client.as_ref().map(|_| Uuid::new_v4());
        Self {
            inner: Arc::new(HandleInner {
                client,
                instance_id,
            }),
        }
    }

    /// The client, absent while no credential is set
    pub fn client(&self) -> Option<&Arc<dyn ShippingClient>> {
        self.inner.client.as_ref()
    }

    /// `true` exactly when a client exists
    pub fn is_ready(&self) -> bool {
        self.inner.client.is_some()
    }

    /// Identity of the client, fresh for every construction
    pub fn instance_id(&self) -> Option<Uuid> {
        self.inner.instance_id
    }

    /// Whether both handles are the same published value
    pub fn ptr_eq(&self, other: &ClientHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHandle")
            .field("is_ready", &self.is_ready())
            .field("instance_id", &self.inner.instance_id)
            .finish()
    }
}

/// What a component can see of the providers above it
///
/// Hooks take the scope on every render. A detached scope belongs to a
/// component that no provider covers.
#[derive(Debug, Clone)]
pub struct Scope {
    handle: Option<ClientHandle>,
}

impl Scope {
    /// Scope outside of any provider
    pub fn detached() -> Self {
        Self { handle: None }
    }

    fn within(handle: ClientHandle) -> Self {
        Self {
            handle: Some(handle),
        }
    }
}

/// Owns the shipping client for a subtree
///
/// The client is rebuilt only when the credential changes value or a
/// different config `Arc` is passed; identical inputs hand back the cached
/// context value.
pub struct DolivrooProvider {
    factory: Arc<dyn ClientFactory>,
    memo: Option<Memo>,
}

struct Memo {
    credential: String,
    config: Option<Arc<ClientConfig>>,
    handle: ClientHandle,
}

impl Memo {
    fn matches(&self, credential: &str, config: &Option<Arc<ClientConfig>>) -> bool {
        let same_config = match (&self.config, config) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        self.credential == credential && same_config
    }
}

impl DolivrooProvider {
    /// Provider that builds its clients with `factory`
    pub fn new(factory: impl ClientFactory + 'static) -> Self {
        Self {
            factory: Arc::new(factory),
            memo: None,
        }
    }

    /// Render the provider with its current props and get the scope its
    /// children see
    pub fn render(&mut self, credential: &str, config: Option<Arc<ClientConfig>>) -> Scope {
        if let Some(memo) = &self.memo {
            if memo.matches(credential, &config) {
                return Scope::within(memo.handle.clone());
            }
        }

        let client = if credential.is_empty() {
            debug!("No credential supplied, client disabled");
            None
        } else {
            Some(self.factory.create(credential, config.as_deref()))
        };

        // No client before and after: keep publishing the same value.
        let handle = match (&self.memo, client) {
            (Some(memo), None) if !memo.handle.is_ready() => memo.handle.clone(),
            (_, client) => {
                let handle = ClientHandle::new(client);
                if let Some(id) = handle.instance_id() {
                    info!("Constructed shipping client {}", id);
                }
                handle
            }
        };

        self.memo = Some(Memo {
            credential: credential.to_string(),
            config,
            handle: handle.clone(),
        });
        Scope::within(handle)
    }
}

impl fmt::Debug for DolivrooProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DolivrooProvider")
            .field("handle", &self.memo.as_ref().map(|m| &m.handle))
            .finish()
    }
}

/// Read the client handle from `scope`
///
/// Fails with [`UsageError`] when no provider covers the scope.
pub fn use_dolivroo(scope: &Scope) -> Result<ClientHandle, UsageError> {
    scope
        .handle
        .clone()
        .ok_or_else(|| UsageError::new("useDolivroo"))
}
