//! Adapter runtime.
//!
//! [`RetroApollo`] owns the execution client, the adapter registry and the
//! method binding cache. It hands out [`ServiceProxy`] instances that route
//! every service call through a cached [`MethodBinding`].
//!
//! # Example
//!
//! ```ignore
//! let runtime = RetroApollo::builder()
//!     .execution_client(client)
//!     .add_call_adapter_factory(Arc::new(MyAdapterFactory))
//!     .build()?;
//!
//! let api: StarWarsApi = runtime.create()?;
//! let hero = api.hero("JEDI".into())?;
//! ```

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::adapter::{AdapterRegistry, CallAdapter, DynCallAdapterFactory};
use crate::binding::MethodBinding;
use crate::client::{DynExecutionClient, ExecutionClient};
use crate::config::RetroApolloConfig;
use crate::error::RetroApolloError;
use crate::proxy::{GraphQLService, ServiceProxy};
use crate::service::{MethodDescriptor, MethodKey, ServiceDescriptor};
use crate::types::TypeDescriptor;

struct RuntimeInner {
    client: DynExecutionClient,
    adapters: AdapterRegistry,
    config: RetroApolloConfig,
    bindings: DashMap<MethodKey, Arc<MethodBinding>>,
    /// One build lock per method identity while a build is in flight, so
    /// misses on different methods never wait on each other.
    build_locks: DashMap<MethodKey, Arc<Mutex<()>>>,
}

/// The adapter runtime.
///
/// Cloning is cheap and yields a handle to the same runtime (same client,
/// adapters and binding cache).
#[derive(Clone)]
pub struct RetroApollo {
    inner: Arc<RuntimeInner>,
}

impl RetroApollo {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> RetroApolloBuilder {
        RetroApolloBuilder::default()
    }

    /// Creates a proxy for the service described by `descriptor`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the descriptor is not a valid service
    /// interface, or, with `validate_eagerly`, if any method cannot be bound.
    pub fn create_service(
        &self,
        descriptor: ServiceDescriptor,
    ) -> Result<ServiceProxy, RetroApolloError> {
        descriptor.validate()?;

        if self.inner.config.validate_eagerly {
            for method in &descriptor.methods {
                self.resolve_binding(descriptor.qualified_name(), method)?;
            }
        }

        debug!(
            service = %descriptor.name,
            methods = descriptor.methods.len(),
            "Created GraphQL service"
        );
        Ok(ServiceProxy::new(self.clone(), descriptor))
    }

    /// Creates a typed service facade.
    ///
    /// # Errors
    ///
    /// Same as [`create_service`](Self::create_service).
    pub fn create<S: GraphQLService>(&self) -> Result<S, RetroApolloError> {
        self.create_service(S::descriptor()).map(S::from_proxy)
    }

    /// Returns the binding for `method`, building it on first use.
    ///
    /// `service` is the service's qualified name (see
    /// [`ServiceDescriptor::qualified_name`]). Concurrent first calls for the
    /// same method build exactly one binding; every caller receives that
    /// binding. A failed build is not cached, so the next call retries it.
    ///
    /// # Errors
    ///
    /// Returns `RetroApolloError::InvalidMethod` if the method cannot be
    /// mapped to an operation.
    pub fn resolve_binding(
        &self,
        service: &str,
        method: &MethodDescriptor,
    ) -> Result<Arc<MethodBinding>, RetroApolloError> {
        let key = MethodKey::new(service, method);

        // Fast path: binding already built
        if let Some(binding) = self.inner.bindings.get(&key) {
            return Ok(Arc::clone(binding.value()));
        }

        let lock = Arc::clone(self.inner.build_locks.entry(key.clone()).or_default().value());
        let _guard = lock.lock();

        // Double-check after acquiring lock
        if let Some(binding) = self.inner.bindings.get(&key) {
            return Ok(Arc::clone(binding.value()));
        }

        let result =
            MethodBinding::build(service, method, &self.inner.adapters, &self.inner.config)
                .map(Arc::new);
        if let Ok(binding) = &result {
            self.inner.bindings.insert(key.clone(), Arc::clone(binding));
        }

        // Waiters still hold the lock; later callers hit the fast path or
        // rebuild a failing method under a fresh lock.
        self.inner.build_locks.remove(&key);
        result
    }

    /// Returns the adapter of the first factory supporting `return_type`.
    #[must_use]
    pub fn resolve_adapter(&self, return_type: &TypeDescriptor) -> Option<Arc<dyn CallAdapter>> {
        self.inner.adapters.resolve(return_type)
    }

    /// Returns the execution client.
    #[must_use]
    pub fn execution_client(&self) -> &dyn ExecutionClient {
        self.inner.client.as_ref()
    }

    /// Returns the runtime configuration.
    #[must_use]
    pub fn config(&self) -> &RetroApolloConfig {
        &self.inner.config
    }

    /// Number of registered adapter factories, the built-in default included.
    #[must_use]
    pub fn adapter_factories(&self) -> usize {
        self.inner.adapters.len()
    }

    /// Number of method bindings built so far.
    #[must_use]
    pub fn cached_bindings(&self) -> usize {
        self.inner.bindings.len()
    }

    pub(crate) fn same_runtime(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for RetroApollo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetroApollo")
            .field("adapters", &self.inner.adapters)
            .field("config", &self.inner.config)
            .field("bindings", &self.inner.bindings.len())
            .finish_non_exhaustive()
    }
}

/// Builder for constructing a [`RetroApollo`] runtime.
///
/// The execution client is required. Adapter factories are optional and are
/// consulted after the built-in default factory, in registration order.
#[derive(Default)]
pub struct RetroApolloBuilder {
    client: Option<DynExecutionClient>,
    factories: Vec<DynCallAdapterFactory>,
    config: Option<RetroApolloConfig>,
}

impl RetroApolloBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the execution client.
    #[must_use]
    pub fn execution_client(mut self, client: DynExecutionClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Appends a call adapter factory.
    #[must_use]
    pub fn add_call_adapter_factory(mut self, factory: DynCallAdapterFactory) -> Self {
        self.factories.push(factory);
        self
    }

    /// Sets the runtime configuration.
    #[must_use]
    pub fn config(mut self, config: RetroApolloConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the runtime.
    ///
    /// # Errors
    ///
    /// Returns `RetroApolloError::MissingField` if no execution client was
    /// set, or `RetroApolloError::InvalidConfig` if the configuration is invalid.
    pub fn build(self) -> Result<RetroApollo, RetroApolloError> {
        let client = self
            .client
            .ok_or(RetroApolloError::MissingField("execution_client"))?;

        let config = self.config.unwrap_or_default();
        config.validate()?;

        let adapters = AdapterRegistry::new(self.factories);
        info!(
            adapter_factories = adapters.len(),
            validate_eagerly = config.validate_eagerly,
            "Built RetroApollo runtime"
        );

        Ok(RetroApollo {
            inner: Arc::new(RuntimeInner {
                client,
                adapters,
                config,
                bindings: DashMap::new(),
                build_locks: DashMap::new(),
            }),
        })
    }
}
