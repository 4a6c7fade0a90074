//! Method bindings.
//!
//! A [`MethodBinding`] is the immutable, cached result of resolving one
//! service method: the call adapter chosen for its return type (if any) and
//! an operation template derived from its parameters and operation metadata.
//! Bindings are built once per method by the runtime and reused for every
//! call.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::adapter::{AdapterRegistry, CallAdapter};
use crate::client::{ExecutionClient, Operation, OperationKind};
use crate::config::RetroApolloConfig;
use crate::error::RetroApolloError;
use crate::service::{MethodDescriptor, MethodKey, is_identifier};
use crate::types::TypeDescriptor;

/// Everything needed to build a concrete operation at call time.
#[derive(Debug, Clone)]
struct OperationTemplate {
    kind: OperationKind,
    name: Option<String>,
    document: String,
    variables: Vec<String>,
}

/// Resolved adapter + operation pair for one service method.
pub struct MethodBinding {
    key: MethodKey,
    return_type: TypeDescriptor,
    response_type: TypeDescriptor,
    adapter: Option<Arc<dyn CallAdapter>>,
    template: OperationTemplate,
}

impl MethodBinding {
    /// Builds the binding for `method` declared on `service`.
    ///
    /// # Errors
    ///
    /// Returns `RetroApolloError::InvalidMethod` if the method cannot be
    /// mapped to a GraphQL operation.
    pub fn build(
        service: &str,
        method: &MethodDescriptor,
        adapters: &AdapterRegistry,
        config: &RetroApolloConfig,
    ) -> Result<Self, RetroApolloError> {
        let key = MethodKey::new(service, method);
        let template = OperationTemplate::from_method(service, method, config)?;

        let adapter = adapters.resolve(&method.return_type);
        let response_type = adapter
            .as_ref()
            .map_or_else(|| method.return_type.clone(), |a| a.response_type().clone());

        debug!(
            method = %key,
            adapter = adapter.as_ref().map_or("none", |a| a.name()),
            return_type = %method.return_type,
            response_type = %response_type,
            "Built method binding"
        );

        Ok(Self {
            key,
            return_type: method.return_type.clone(),
            response_type,
            adapter,
            template,
        })
    }

    /// Executes the operation with `args` and adapts the raw result.
    ///
    /// # Errors
    ///
    /// Returns `RetroApolloError::ArgumentCount` if `args` does not match the
    /// parameter list, the client's `ExecutionError` unchanged, or an adapter
    /// failure.
    pub fn invoke(
        &self,
        client: &dyn ExecutionClient,
        args: Vec<Value>,
    ) -> Result<Value, RetroApolloError> {
        let operation = self.operation(args)?;
        trace!(method = %self.key, operation = ?operation.operation_name, "Executing operation");

        let raw = client.execute(&operation)?;
        match &self.adapter {
            Some(adapter) => adapter.adapt(raw),
            None => Ok(raw),
        }
    }

    /// Builds the concrete operation for one call.
    ///
    /// # Errors
    ///
    /// Returns `RetroApolloError::ArgumentCount` on an arity mismatch.
    pub fn operation(&self, args: Vec<Value>) -> Result<Operation, RetroApolloError> {
        let template = &self.template;
        if args.len() != template.variables.len() {
            return Err(RetroApolloError::ArgumentCount {
                service: self.key.service().to_string(),
                method: self.key.method().to_string(),
                expected: template.variables.len(),
                actual: args.len(),
            });
        }

        let variables: Map<String, Value> = template.variables.iter().cloned().zip(args).collect();

        Ok(Operation {
            kind: template.kind,
            query: template.document.clone(),
            operation_name: template.name.clone(),
            variables,
        })
    }

    /// Returns the method identity.
    #[must_use]
    pub fn key(&self) -> &MethodKey {
        &self.key
    }

    /// Returns the declared return type.
    #[must_use]
    pub fn return_type(&self) -> &TypeDescriptor {
        &self.return_type
    }

    /// Returns the type the adapter unwraps to, or the declared type when no
    /// adapter was found.
    #[must_use]
    pub fn response_type(&self) -> &TypeDescriptor {
        &self.response_type
    }

    /// Returns the selected adapter's name, if any.
    #[must_use]
    pub fn adapter_name(&self) -> Option<&'static str> {
        self.adapter.as_ref().map(|a| a.name())
    }

    /// Returns the operation type.
    #[must_use]
    pub fn operation_kind(&self) -> OperationKind {
        self.template.kind
    }

    /// Returns the operation name declared in the document.
    #[must_use]
    pub fn operation_name(&self) -> Option<&str> {
        self.template.name.as_deref()
    }
}

impl fmt::Debug for MethodBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodBinding")
            .field("key", &self.key)
            .field("return_type", &self.return_type)
            .field("response_type", &self.response_type)
            .field("adapter", &self.adapter_name())
            .field("operation", &self.template)
            .finish()
    }
}

impl OperationTemplate {
    fn from_method(
        service: &str,
        method: &MethodDescriptor,
        config: &RetroApolloConfig,
    ) -> Result<Self, RetroApolloError> {
        let invalid =
            |reason: String| RetroApolloError::invalid_method(service, &method.name, reason);

        let meta = method
            .operation
            .as_ref()
            .ok_or_else(|| invalid("no operation metadata declared".into()))?;

        let kind = OperationKind::from_keyword(&meta.keyword)
            .ok_or_else(|| invalid(format!("unsupported operation type {:?}", meta.keyword)))?;

        let document = meta.document.trim();
        if document.is_empty() {
            return Err(invalid("operation document is empty".into()));
        }
        let name = parse_header(document, kind).map_err(invalid)?;

        if method.params.len() > config.max_variables {
            return Err(invalid(format!(
                "{} parameters exceed the limit of {}",
                method.params.len(),
                config.max_variables
            )));
        }

        let mut variables: Vec<String> = Vec::with_capacity(method.params.len());
        for param in &method.params {
            if !is_identifier(&param.name) {
                return Err(invalid(format!(
                    "parameter {:?} is not a valid variable name",
                    param.name
                )));
            }
            if variables.contains(&param.name) {
                return Err(invalid(format!("parameter {} is declared twice", param.name)));
            }
            if config.strict_variables && !references_variable(document, &param.name) {
                return Err(invalid(format!(
                    "parameter {} is not referenced as ${} in the document",
                    param.name, param.name
                )));
            }
            variables.push(param.name.clone());
        }

        Ok(Self {
            kind,
            name,
            document: document.to_string(),
            variables,
        })
    }
}

/// Checks the document's leading keyword against `kind` and returns the
/// declared operation name.
fn parse_header(document: &str, kind: OperationKind) -> Result<Option<String>, String> {
    if document.starts_with('{') {
        return match kind {
            OperationKind::Query => Ok(None),
            OperationKind::Mutation => Err("anonymous documents are always queries".into()),
        };
    }

    let rest = document
        .strip_prefix(kind.keyword())
        .filter(|rest| !rest.starts_with(is_name_char))
        .ok_or_else(|| format!("document does not start with `{}`", kind.keyword()))?;

    let name: String = rest.trim_start().chars().take_while(|&c| is_name_char(c)).collect();
    Ok((!name.is_empty()).then_some(name))
}

fn references_variable(document: &str, name: &str) -> bool {
    let needle = format!("${name}");
    document.match_indices(&needle).any(|(at, _)| {
        !document[at + needle.len()..].starts_with(is_name_char)
    })
}

fn is_name_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}
