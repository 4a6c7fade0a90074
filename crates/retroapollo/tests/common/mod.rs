//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use retroapollo::{
    CallAdapter, CallAdapterFactory, DescribeType, DynExecutionClient, ExecutionClient,
    ExecutionError, Operation, RetroApolloError, TypeDescriptor,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Installs a test log subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("retroapollo=debug")
        .with_test_writer()
        .try_init();
}

// =============================================================================
// Stub execution client
// =============================================================================

/// Execution client returning a fixed value and recording every operation.
pub struct StubClient {
    response: Value,
    executions: AtomicUsize,
    operations: Mutex<Vec<Operation>>,
}

impl StubClient {
    pub fn returning(response: Value) -> Arc<Self> {
        Arc::new(Self {
            response,
            executions: AtomicUsize::new(0),
            operations: Mutex::new(Vec::new()),
        })
    }

    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }

    pub fn last_operation(&self) -> Option<Operation> {
        self.operations.lock().last().cloned()
    }
}

impl ExecutionClient for StubClient {
    fn execute(&self, operation: &Operation) -> Result<Value, ExecutionError> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        self.operations.lock().push(operation.clone());
        Ok(self.response.clone())
    }
}

pub fn as_dyn(client: &Arc<StubClient>) -> DynExecutionClient {
    Arc::clone(client) as DynExecutionClient
}

/// Execution client that always fails.
pub fn failing_client(message: &'static str) -> DynExecutionClient {
    Arc::new(move |_: &Operation| -> Result<Value, ExecutionError> {
        Err(ExecutionError::new(message))
    })
}

// =============================================================================
// Doubling adapter
// =============================================================================

/// Result wrapper whose adapter doubles numeric raw results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Doubled<T>(pub T);

impl<T: DescribeType> DescribeType for Doubled<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::parameterized("Doubled", [T::describe()])
    }
}

pub struct DoublingAdapter {
    response_type: TypeDescriptor,
}

impl CallAdapter for DoublingAdapter {
    fn response_type(&self) -> &TypeDescriptor {
        &self.response_type
    }

    fn adapt(&self, raw: Value) -> Result<Value, RetroApolloError> {
        if let Some(n) = raw.as_i64() {
            return Ok(json!(n * 2));
        }
        if let Some(n) = raw.as_f64() {
            return Ok(json!(n * 2.0));
        }
        Err(RetroApolloError::adapter(self.name(), format!("{raw} is not a number")))
    }

    fn name(&self) -> &'static str {
        "DoublingAdapter"
    }
}

/// Factory for `Doubled<T>` that counts how often it is consulted.
#[derive(Default)]
pub struct DoublingAdapterFactory {
    lookups: AtomicUsize,
}

impl DoublingAdapterFactory {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl CallAdapterFactory for DoublingAdapterFactory {
    fn get(&self, return_type: &TypeDescriptor) -> Option<Arc<dyn CallAdapter>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if !return_type.is_wrapper("Doubled") {
            return None;
        }
        Some(Arc::new(DoublingAdapter {
            response_type: return_type.inner()?.clone(),
        }))
    }
}
