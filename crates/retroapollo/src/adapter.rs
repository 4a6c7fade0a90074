//! Call adapters.
//!
//! A call adapter recognizes a declared return type, names the inner type it
//! unwraps to, and transforms the raw execution result into the declared
//! shape. Adapters are produced by [`CallAdapterFactory`] instances held in an
//! [`AdapterRegistry`].
//!
//! ## Priority
//!
//! The registry always starts with the built-in [`DefaultCallAdapterFactory`],
//! followed by user factories in registration order. Lookup is first match
//! wins. The default factory claims only `Call<T>`, so it takes every
//! `Call<T>` request and never shadows any other wrapper type.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::RetroApolloError;
use crate::types::{CALL_TYPE_NAME, TypeDescriptor};

/// Transforms a raw execution result into a method's declared return type.
pub trait CallAdapter: Send + Sync {
    /// Returns the type this adapter unwraps the declared return type to.
    fn response_type(&self) -> &TypeDescriptor;

    /// Converts the raw result into the adapted value.
    ///
    /// # Errors
    ///
    /// Returns `RetroApolloError::Adapter` if the raw result has the wrong shape.
    fn adapt(&self, raw: Value) -> Result<Value, RetroApolloError>;

    /// Name used in logs and errors.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Produces call adapters for the return types it understands.
pub trait CallAdapterFactory: Send + Sync {
    /// Returns an adapter for `return_type`, or `None` if unsupported.
    fn get(&self, return_type: &TypeDescriptor) -> Option<Arc<dyn CallAdapter>>;

    /// Returns whether this factory supports `return_type`.
    fn supports(&self, return_type: &TypeDescriptor) -> bool {
        self.get(return_type).is_some()
    }
}

/// Type alias for a shared adapter factory.
pub type DynCallAdapterFactory = Arc<dyn CallAdapterFactory>;

/// Pass-through adapter for `Call<T>`.
#[derive(Debug)]
pub struct DefaultCallAdapter {
    response_type: TypeDescriptor,
}

impl CallAdapter for DefaultCallAdapter {
    fn response_type(&self) -> &TypeDescriptor {
        &self.response_type
    }

    fn adapt(&self, raw: Value) -> Result<Value, RetroApolloError> {
        Ok(raw)
    }

    fn name(&self) -> &'static str {
        "DefaultCallAdapter"
    }
}

/// Built-in factory for `Call<T>` return types.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCallAdapterFactory;

impl CallAdapterFactory for DefaultCallAdapterFactory {
    fn get(&self, return_type: &TypeDescriptor) -> Option<Arc<dyn CallAdapter>> {
        if !return_type.is_wrapper(CALL_TYPE_NAME) {
            return None;
        }
        let response_type = return_type.inner()?.clone();
        Some(Arc::new(DefaultCallAdapter { response_type }))
    }
}

/// Ordered, immutable list of adapter factories.
#[derive(Clone)]
pub struct AdapterRegistry {
    factories: Arc<[DynCallAdapterFactory]>,
}

impl AdapterRegistry {
    /// Creates a registry with the default factory first, then `user` in order.
    #[must_use]
    pub fn new(user: impl IntoIterator<Item = DynCallAdapterFactory>) -> Self {
        let default: DynCallAdapterFactory = Arc::new(DefaultCallAdapterFactory);
        let factories = std::iter::once(default).chain(user).collect();
        Self { factories }
    }

    /// Returns the adapter of the first factory supporting `return_type`.
    #[must_use]
    pub fn resolve(&self, return_type: &TypeDescriptor) -> Option<Arc<dyn CallAdapter>> {
        self.factories
            .iter()
            .find_map(|factory| factory.get(return_type))
    }

    /// Number of registered factories, the default included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Always `false`: the default factory is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("factories", &self.factories.len())
            .finish()
    }
}
