//! Service interface descriptors.
//!
//! A [`ServiceDescriptor`] is the runtime description of a service interface:
//! its name and one [`MethodDescriptor`] per GraphQL operation. Descriptors
//! are normally generated by [`graphql_service!`](crate::graphql_service) but
//! can be built by hand.

use std::fmt;
use std::sync::Arc;

use crate::error::RetroApolloError;
use crate::types::{DescribeType, TypeDescriptor};

/// Method names reserved for the operations every proxy answers locally.
pub const RESERVED_METHOD_NAMES: &[&str] = &["eq", "ne", "hash", "fmt", "clone", "to_string"];

/// Operation metadata attached to a service method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationMeta {
    /// Operation keyword as declared (`query`, `mutation`).
    pub keyword: String,
    /// GraphQL document text.
    pub document: String,
}

impl OperationMeta {
    /// Creates operation metadata.
    #[must_use]
    pub fn new(keyword: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            document: document.into(),
        }
    }

    /// Shorthand for a query.
    #[must_use]
    pub fn query(document: impl Into<String>) -> Self {
        Self::new("query", document)
    }

    /// Shorthand for a mutation.
    #[must_use]
    pub fn mutation(document: impl Into<String>) -> Self {
        Self::new("mutation", document)
    }
}

/// A method parameter. Its name is the GraphQL variable it binds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamDescriptor {
    /// Parameter (and variable) name.
    pub name: String,
    /// Declared parameter type.
    pub ty: TypeDescriptor,
}

impl ParamDescriptor {
    /// Creates a parameter descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Creates a parameter descriptor from a Rust type.
    #[must_use]
    pub fn of<T: DescribeType + ?Sized>(name: impl Into<String>) -> Self {
        Self::new(name, T::describe())
    }
}

/// One service method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// Method name.
    pub name: String,
    /// Parameters in declaration order.
    pub params: Vec<ParamDescriptor>,
    /// Declared return type.
    pub return_type: TypeDescriptor,
    /// Operation metadata, if declared.
    pub operation: Option<OperationMeta>,
}

impl MethodDescriptor {
    /// Creates a method with no parameters and no operation metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, return_type: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_type,
            operation: None,
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    /// Attaches operation metadata.
    #[must_use]
    pub fn operation(mut self, operation: OperationMeta) -> Self {
        self.operation = Some(operation);
        self
    }
}

/// Description of a service interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Service name.
    pub name: String,
    /// Fully qualified path (`crate::module::Name`), when known. Two services
    /// with the same name in different modules differ only here.
    pub path: Option<String>,
    /// Declared methods.
    pub methods: Vec<MethodDescriptor>,
}

impl ServiceDescriptor {
    /// Creates an empty service descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            methods: Vec::new(),
        }
    }

    /// Sets the fully qualified path of the service.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Returns the name the runtime keys bindings by: the qualified path if
    /// set, the bare name otherwise.
    #[must_use]
    pub fn qualified_name(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.name)
    }

    /// Adds a method.
    #[must_use]
    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// Finds a method by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Checks that this descriptor is a well-formed service interface.
    ///
    /// # Errors
    ///
    /// Returns `RetroApolloError::InvalidService` if the service name or any
    /// method name is not an identifier, the path is not a `::`-separated
    /// path ending in the name, a method name is declared twice, or a method
    /// name is reserved.
    pub fn validate(&self) -> Result<(), RetroApolloError> {
        if !is_identifier(&self.name) {
            return Err(RetroApolloError::invalid_service(
                &self.name,
                "service name must be an identifier",
            ));
        }
        if let Some(path) = &self.path {
            let segments: Vec<&str> = path.split("::").collect();
            let well_formed = segments.iter().all(|s| is_identifier(s));
            if !well_formed || segments.last() != Some(&self.name.as_str()) {
                return Err(RetroApolloError::invalid_service(
                    &self.name,
                    format!("service path {path:?} must be a module path ending in the name"),
                ));
            }
        }

        for (index, method) in self.methods.iter().enumerate() {
            if !is_identifier(&method.name) {
                return Err(RetroApolloError::invalid_service(
                    &self.name,
                    format!("method name {:?} is not an identifier", method.name),
                ));
            }
            if RESERVED_METHOD_NAMES.contains(&method.name.as_str()) {
                return Err(RetroApolloError::invalid_service(
                    &self.name,
                    format!("method name {} is reserved", method.name),
                ));
            }
            if self.methods[..index].iter().any(|m| m.name == method.name) {
                return Err(RetroApolloError::invalid_service(
                    &self.name,
                    format!("method {} is declared more than once", method.name),
                ));
            }
        }

        Ok(())
    }
}

/// Stable identity of a service method.
///
/// Two methods share a key only if they agree on service, method name,
/// parameter types, return type and operation metadata, so a binding built
/// for one is always valid for the other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
    service: Arc<str>,
    method: Arc<str>,
    signature: Arc<[TypeDescriptor]>,
    return_type: TypeDescriptor,
    operation: Option<OperationMeta>,
}

impl MethodKey {
    /// Builds the key for `method` declared on `service`.
    #[must_use]
    pub fn new(service: &str, method: &MethodDescriptor) -> Self {
        Self {
            service: service.into(),
            method: method.name.as_str().into(),
            signature: method.params.iter().map(|p| p.ty.clone()).collect(),
            return_type: method.return_type.clone(),
            operation: method.operation.clone(),
        }
    }

    /// Returns the service name.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Returns the method name.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the parameter types.
    #[must_use]
    pub fn signature(&self) -> &[TypeDescriptor] {
        &self.signature
    }

    /// Returns the declared return type.
    #[must_use]
    pub fn return_type(&self) -> &TypeDescriptor {
        &self.return_type
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.service, self.method)?;
        for (i, ty) in self.signature.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ty}")?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
