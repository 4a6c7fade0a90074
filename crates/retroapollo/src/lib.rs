//! # retroapollo
//!
//! Typed GraphQL service facades dispatched through pluggable call adapters.
//!
//! A caller declares a service interface (one method per GraphQL operation)
//! and receives an implementation that routes every call through a chain of
//! call adapters to an injected execution client. The crate does not execute
//! GraphQL itself: transport, serialization and caching belong to the
//! [`ExecutionClient`].
//!
//! ## Overview
//!
//! - [`RetroApollo`] owns the execution client, the adapter registry and the
//!   method binding cache. It is built with [`RetroApolloBuilder`].
//! - [`ServiceProxy`] intercepts calls, resolves the method's
//!   [`MethodBinding`] lazily through the runtime and executes it.
//! - [`MethodBinding`] pairs the adapter chosen for the method's return type
//!   with an operation template. One binding is built per method and reused.
//! - [`AdapterRegistry`] holds the adapter factories: the built-in
//!   [`DefaultCallAdapterFactory`] first, then user factories in
//!   registration order. First match wins.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use retroapollo::{
//!     Call, DynExecutionClient, ExecutionError, Operation, RetroApollo, graphql_service,
//! };
//! use serde_json::{Value, json};
//!
//! graphql_service! {
//!     pub struct ValueApi {
//!         query fn get_value() -> Call<i64> = "query Value { value }";
//!     }
//! }
//!
//! let client: DynExecutionClient =
//!     Arc::new(|_: &Operation| -> Result<Value, ExecutionError> { Ok(json!(42)) });
//! let runtime = RetroApollo::builder().execution_client(client).build()?;
//!
//! let api: ValueApi = runtime.create()?;
//! assert_eq!(api.get_value()?.into_inner(), 42);
//! # Ok::<(), retroapollo::RetroApolloError>(())
//! ```
//!
//! ## Modules
//!
//! - [`adapter`] - Call adapters and the adapter registry
//! - [`binding`] - Per-method bindings
//! - [`client`] - Execution client port
//! - [`config`] - Runtime configuration
//! - [`error`] - Error types
//! - [`proxy`] - Service proxies and the typed facade trait
//! - [`runtime`] - The adapter runtime and its builder
//! - [`service`] - Service interface descriptors
//! - [`types`] - Return type descriptors

pub mod adapter;
pub mod binding;
pub mod client;
pub mod config;
pub mod error;
mod macros;
pub mod proxy;
pub mod runtime;
pub mod service;
pub mod types;

// Re-export main types
pub use adapter::{
    AdapterRegistry, CallAdapter, CallAdapterFactory, DefaultCallAdapter,
    DefaultCallAdapterFactory, DynCallAdapterFactory,
};
pub use binding::MethodBinding;
pub use client::{DynExecutionClient, ExecutionClient, Operation, OperationKind};
pub use config::RetroApolloConfig;
pub use error::{ExecutionError, RetroApolloError};
pub use proxy::{GraphQLService, ServiceProxy};
pub use runtime::{RetroApollo, RetroApolloBuilder};
pub use service::{MethodDescriptor, MethodKey, OperationMeta, ParamDescriptor, ServiceDescriptor};
pub use types::{Call, DescribeType, TypeDescriptor};

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, RetroApolloError>;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
