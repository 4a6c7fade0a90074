//! Error types for the adapter runtime.
//!
//! Errors fall into three groups: configuration errors raised while building
//! a runtime, validation errors raised while creating a service or building a
//! method binding, and execution errors passed through unchanged from the
//! execution client.

use std::error::Error as StdError;

/// Boxed source error carried by [`ExecutionError`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Failure reported by an execution client.
///
/// The runtime never inspects or retries these; they reach the caller of the
/// service method as [`RetroApolloError::Execution`].
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ExecutionError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ExecutionError {
    /// Creates an execution error with a message only.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an execution error wrapping an underlying cause.
    #[must_use]
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors that can occur while configuring or dispatching GraphQL services.
#[derive(Debug, thiserror::Error)]
pub enum RetroApolloError {
    /// A required builder field was not provided.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The runtime configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The service descriptor is not a valid service interface.
    #[error("Invalid service {service}: {reason}")]
    InvalidService {
        /// Service name as declared.
        service: String,
        /// Why the descriptor was rejected.
        reason: String,
    },

    /// A method cannot be mapped to a GraphQL operation.
    #[error("Invalid method {service}.{method}: {reason}")]
    InvalidMethod {
        /// Owning service.
        service: String,
        /// Method name.
        method: String,
        /// Why the method was rejected.
        reason: String,
    },

    /// The proxy was asked to dispatch a method the service does not declare.
    #[error("Service {service} has no method {method}")]
    UnknownMethod {
        /// Service name.
        service: String,
        /// Requested method name.
        method: String,
    },

    /// A call supplied the wrong number of arguments.
    #[error("{service}.{method} expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        /// Service name.
        service: String,
        /// Method name.
        method: String,
        /// Declared parameter count.
        expected: usize,
        /// Supplied argument count.
        actual: usize,
    },

    /// The execution client failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// A call adapter rejected the raw result.
    #[error("Call adapter {adapter} failed: {message}")]
    Adapter {
        /// Adapter name.
        adapter: String,
        /// Adapter-supplied message.
        message: String,
    },

    /// An argument could not be encoded or a result could not be decoded.
    #[error("Conversion error: {0}")]
    Conversion(#[from] serde_json::Error),
}

impl RetroApolloError {
    pub(crate) fn invalid_service(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidService {
            service: service.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_method(
        service: impl Into<String>,
        method: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidMethod {
            service: service.into(),
            method: method.into(),
            reason: reason.into(),
        }
    }

    /// Creates an adapter failure.
    #[must_use]
    pub fn adapter(adapter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Adapter {
            adapter: adapter.into(),
            message: message.into(),
        }
    }

    /// Returns the stable error code for this error.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidService { .. } => "INVALID_SERVICE",
            Self::InvalidMethod { .. } => "INVALID_METHOD",
            Self::UnknownMethod { .. } => "UNKNOWN_METHOD",
            Self::ArgumentCount { .. } => "ARGUMENT_COUNT",
            Self::Execution(_) => "EXECUTION_ERROR",
            Self::Adapter { .. } => "ADAPTER_ERROR",
            Self::Conversion(_) => "CONVERSION_ERROR",
        }
    }

    /// Returns whether this error was raised while building a runtime.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingField(_) | Self::InvalidConfig(_))
    }

    /// Returns whether this error was raised while validating a service or method.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidService { .. }
                | Self::InvalidMethod { .. }
                | Self::UnknownMethod { .. }
                | Self::ArgumentCount { .. }
        )
    }

    /// Returns whether this error came from the execution client.
    #[must_use]
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }
}
