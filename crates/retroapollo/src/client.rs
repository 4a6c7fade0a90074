//! Execution client port.
//!
//! The runtime does not talk to a GraphQL server itself. It builds an
//! [`Operation`] for every service call and hands it to an injected
//! [`ExecutionClient`], which owns transport, serialization and caching.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ExecutionError;

/// GraphQL operation type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Read-only query.
    #[default]
    Query,
    /// Mutation.
    Mutation,
}

impl OperationKind {
    /// Parses an operation keyword (`query` or `mutation`).
    ///
    /// Subscriptions are not accepted: execution is request/response only.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "query" => Some(Self::Query),
            "mutation" => Some(Self::Mutation),
            _ => None,
        }
    }

    /// Returns the GraphQL keyword for this operation type.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A concrete GraphQL operation ready for execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Operation type. Not part of the request body.
    #[serde(skip)]
    pub kind: OperationKind,
    /// Operation document text.
    pub query: String,
    /// Operation name, if the document declares one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    /// Variables bound from the method arguments.
    #[serde(default)]
    pub variables: Map<String, Value>,
}

impl Operation {
    /// Returns a variable by name.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }
}

/// Capability that executes GraphQL operations.
///
/// Implementations must be thread-safe: a single client is shared by every
/// proxy created from a runtime.
pub trait ExecutionClient: Send + Sync {
    /// Executes the operation synchronously and returns its raw `data` payload.
    ///
    /// # Errors
    ///
    /// Returns an `ExecutionError` for transport, server or decoding failures.
    fn execute(&self, operation: &Operation) -> Result<Value, ExecutionError>;
}

impl<F> ExecutionClient for F
where
    F: Fn(&Operation) -> Result<Value, ExecutionError> + Send + Sync,
{
    fn execute(&self, operation: &Operation) -> Result<Value, ExecutionError> {
        self(operation)
    }
}

/// Type alias for a shared execution client.
pub type DynExecutionClient = Arc<dyn ExecutionClient>;
