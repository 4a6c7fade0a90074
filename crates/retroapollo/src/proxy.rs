//! Service proxies.
//!
//! A [`ServiceProxy`] is the dynamic-dispatch object behind every service
//! facade. Each call resolves the method's cached binding through the owning
//! runtime, executes the operation and returns the adapted result.
//!
//! Identity, equality, hashing and formatting are answered by the proxy
//! itself and never reach the runtime: those names are reserved and cannot be
//! declared as service methods.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

use crate::error::RetroApolloError;
use crate::runtime::RetroApollo;
use crate::service::ServiceDescriptor;

/// A typed service facade backed by a [`ServiceProxy`].
///
/// Implementations are normally generated by
/// [`graphql_service!`](crate::graphql_service).
pub trait GraphQLService: Sized {
    /// Describes the service interface.
    fn descriptor() -> ServiceDescriptor;

    /// Wraps a proxy created for [`descriptor`](Self::descriptor).
    fn from_proxy(proxy: ServiceProxy) -> Self;

    /// Returns the underlying proxy.
    fn proxy(&self) -> &ServiceProxy;
}

struct ProxyState {
    runtime: RetroApollo,
    descriptor: ServiceDescriptor,
}

/// Dynamic-dispatch implementation of a service interface.
///
/// Clones share identity: a clone compares equal to its original, while two
/// proxies from separate `create_service` calls never do.
#[derive(Clone)]
pub struct ServiceProxy {
    state: Arc<ProxyState>,
}

impl ServiceProxy {
    pub(crate) fn new(runtime: RetroApollo, descriptor: ServiceDescriptor) -> Self {
        Self {
            state: Arc::new(ProxyState {
                runtime,
                descriptor,
            }),
        }
    }

    /// Returns the service name.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.state.descriptor.name
    }

    /// Returns the service descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.state.descriptor
    }

    /// Returns the owning runtime.
    #[must_use]
    pub fn runtime(&self) -> &RetroApollo {
        &self.state.runtime
    }

    /// Dispatches `method` with JSON-encoded arguments and returns the adapted
    /// result.
    ///
    /// # Errors
    ///
    /// Returns `RetroApolloError::UnknownMethod` if the service does not
    /// declare `method`; binding, execution and adapter errors propagate
    /// unchanged.
    pub fn invoke(&self, method: &str, args: Vec<Value>) -> Result<Value, RetroApolloError> {
        let state = &self.state;
        let descriptor = state.descriptor.find(method).ok_or_else(|| {
            RetroApolloError::UnknownMethod {
                service: state.descriptor.name.clone(),
                method: method.to_string(),
            }
        })?;

        trace!(service = %state.descriptor.name, method, "Dispatching service call");
        let binding = state
            .runtime
            .resolve_binding(state.descriptor.qualified_name(), descriptor)?;
        binding.invoke(state.runtime.execution_client(), args)
    }

    /// Dispatches `method` and decodes the adapted result as `R`.
    ///
    /// # Errors
    ///
    /// Same as [`invoke`](Self::invoke), plus `RetroApolloError::Conversion`
    /// if the adapted value does not decode as `R`.
    pub fn call<R: DeserializeOwned>(
        &self,
        method: &str,
        args: Vec<Value>,
    ) -> Result<R, RetroApolloError> {
        let value = self.invoke(method, args)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Returns whether both proxies were created for the same runtime.
    #[must_use]
    pub fn shares_runtime(&self, other: &Self) -> bool {
        self.state.runtime.same_runtime(&other.state.runtime)
    }
}

impl PartialEq for ServiceProxy {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl Eq for ServiceProxy {}

impl Hash for ServiceProxy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.state).hash(state);
    }
}

impl fmt::Display for ServiceProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GraphQL service {}", self.service_name())
    }
}

impl fmt::Debug for ServiceProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let methods: Vec<&str> = self
            .state
            .descriptor
            .methods
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        f.debug_struct("ServiceProxy")
            .field("service", &self.service_name())
            .field("methods", &methods)
            .finish()
    }
}
