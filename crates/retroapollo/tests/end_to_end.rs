//! End-to-end tests for typed service facades.
//!
//! These tests verify the complete dispatch flow from a generated facade
//! through the runtime and adapters to a stub execution client.

mod common;

use std::sync::Arc;

use common::{Doubled, DoublingAdapterFactory, StubClient, as_dyn, failing_client, init_tracing};
use retroapollo::{
    Call, DescribeType, GraphQLService, OperationKind, RetroApollo, RetroApolloConfig,
    RetroApolloError, graphql_service,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, PartialEq, Deserialize)]
struct Hero {
    name: String,
}

impl DescribeType for Hero {}

#[derive(Debug, PartialEq, Deserialize)]
struct HeroData {
    hero: Hero,
}

impl DescribeType for HeroData {}

graphql_service! {
    /// Minimal service with a single plain-typed query.
    struct ValueService {
        query fn get_value() -> i64 = "query Value { value }";
    }
}

graphql_service! {
    struct DoubledService {
        query fn get_value() -> Doubled<i64> = "query Value { value }";
        query fn get_ratio() -> Doubled<f64> = "query Ratio { ratio }";
        query fn get_name() -> Doubled<String> = "query Name { name }";
    }
}

graphql_service! {
    /// Star Wars API.
    struct StarWarsApi {
        /// Fetches the hero of an episode.
        query fn hero(episode: String) -> Call<HeroData> =
            "query Hero($episode: Episode) { hero(episode: $episode) { name } }";

        mutation fn rate(episode: String, stars: i32) -> Call<i64> =
            "mutation Rate($episode: Episode!, $stars: Int!) { rate(episode: $episode, stars: $stars) }";
    }
}

graphql_service! {
    struct BrokenService {
        query fn works() -> i64 = "query Works { works }";
        query fn unmapped(id: i64) -> i64 = "query Unmapped { unmapped }";
    }
}

#[test]
fn test_fixed_value_without_extra_adapters() {
    init_tracing();
    let client = StubClient::returning(json!(42));
    let runtime = RetroApollo::builder()
        .execution_client(as_dyn(&client))
        .build()
        .unwrap();

    let service: ValueService = runtime.create().unwrap();

    assert_eq!(service.get_value().unwrap(), 42);
    assert_eq!(client.executions(), 1);
    assert_eq!(runtime.adapter_factories(), 1);
}

#[test]
fn test_raw_result_passes_through_when_no_adapter_matches() {
    let client = StubClient::returning(json!(42));
    let runtime = RetroApollo::builder()
        .execution_client(as_dyn(&client))
        .add_call_adapter_factory(Arc::new(DoublingAdapterFactory::default()))
        .build()
        .unwrap();

    let service: ValueService = runtime.create().unwrap();
    assert_eq!(service.get_value().unwrap(), 42);

    let descriptor = ValueService::descriptor();
    let binding = runtime
        .resolve_binding(descriptor.qualified_name(), descriptor.find("get_value").unwrap())
        .unwrap();
    assert_eq!(binding.adapter_name(), None);
    assert_eq!(runtime.cached_bindings(), 1);
}

#[test]
fn test_custom_adapter_doubles_raw_result() {
    init_tracing();
    let client = StubClient::returning(json!(21));
    let runtime = RetroApollo::builder()
        .execution_client(as_dyn(&client))
        .add_call_adapter_factory(Arc::new(DoublingAdapterFactory::default()))
        .build()
        .unwrap();

    let service: DoubledService = runtime.create().unwrap();

    assert_eq!(service.get_value().unwrap(), Doubled(42));
    assert_eq!(client.executions(), 1);
}

#[test]
fn test_custom_adapter_handles_floats_and_rejects_strings() {
    let runtime = RetroApollo::builder()
        .execution_client(as_dyn(&StubClient::returning(json!(1.25))))
        .add_call_adapter_factory(Arc::new(DoublingAdapterFactory::default()))
        .build()
        .unwrap();
    let service: DoubledService = runtime.create().unwrap();
    assert_eq!(service.get_ratio().unwrap(), Doubled(2.5));

    let runtime = RetroApollo::builder()
        .execution_client(as_dyn(&StubClient::returning(json!("luke"))))
        .add_call_adapter_factory(Arc::new(DoublingAdapterFactory::default()))
        .build()
        .unwrap();
    let service: DoubledService = runtime.create().unwrap();

    let err = service.get_name().unwrap_err();
    assert!(matches!(err, RetroApolloError::Adapter { .. }));
    assert!(err.to_string().contains("DoublingAdapter"));
}

#[test]
fn test_default_adapter_unwraps_call() {
    let client = StubClient::returning(json!({ "hero": { "name": "Luke" } }));
    let runtime = RetroApollo::builder()
        .execution_client(as_dyn(&client))
        .build()
        .unwrap();

    let api: StarWarsApi = runtime.create().unwrap();
    let data = api.hero("JEDI".into()).unwrap().into_inner();
    assert_eq!(data.hero.name, "Luke");

    let op = client.last_operation().unwrap();
    assert_eq!(op.kind, OperationKind::Query);
    assert_eq!(op.operation_name.as_deref(), Some("Hero"));
    assert_eq!(op.variable("episode"), Some(&json!("JEDI")));

    let descriptor = StarWarsApi::descriptor();
    let binding = runtime
        .resolve_binding(descriptor.qualified_name(), descriptor.find("hero").unwrap())
        .unwrap();
    assert_eq!(binding.adapter_name(), Some("DefaultCallAdapter"));
    assert_eq!(binding.response_type().to_string(), "HeroData");
}

#[test]
fn test_mutation_binds_all_variables() {
    let client = StubClient::returning(json!(5));
    let runtime = RetroApollo::builder()
        .execution_client(as_dyn(&client))
        .build()
        .unwrap();

    let api: StarWarsApi = runtime.create().unwrap();
    assert_eq!(*api.rate("EMPIRE".into(), 5).unwrap(), 5);

    let op = client.last_operation().unwrap();
    assert_eq!(op.kind, OperationKind::Mutation);
    assert_eq!(op.operation_name.as_deref(), Some("Rate"));
    assert_eq!(op.variable("stars"), Some(&json!(5)));
    assert_eq!(op.variables.len(), 2);
}

#[test]
fn test_execution_errors_propagate_unchanged() {
    let runtime = RetroApollo::builder()
        .execution_client(failing_client("upstream unavailable"))
        .build()
        .unwrap();
    let service: ValueService = runtime.create().unwrap();

    let err = service.get_value().unwrap_err();
    assert!(err.is_execution());
    assert_eq!(err.to_string(), "upstream unavailable");
}

#[test]
fn test_mapping_errors_surface_on_first_call() {
    let client = StubClient::returning(json!(1));
    let runtime = RetroApollo::builder()
        .execution_client(as_dyn(&client))
        .build()
        .unwrap();

    let service: BrokenService = runtime.create().unwrap();
    assert_eq!(service.works().unwrap(), 1);

    let err = service.unmapped(7).unwrap_err();
    assert_eq!(err.error_code(), "INVALID_METHOD");
    assert_eq!(client.executions(), 1);
}

#[test]
fn test_mapping_errors_surface_at_creation_when_eager() {
    let client = StubClient::returning(json!(1));
    let runtime = RetroApollo::builder()
        .execution_client(as_dyn(&client))
        .config(RetroApolloConfig {
            validate_eagerly: true,
            ..RetroApolloConfig::default()
        })
        .build()
        .unwrap();

    let err = runtime.create::<BrokenService>().unwrap_err();
    assert!(err.is_validation());
    assert_eq!(client.executions(), 0);

    let api: StarWarsApi = runtime.create().unwrap();
    assert_eq!(runtime.cached_bindings(), 3);
    assert_eq!(client.executions(), 0);
    drop(api);
}

#[test]
fn test_bindings_shared_across_proxies() {
    let client = StubClient::returning(json!(42));
    let runtime = RetroApollo::builder()
        .execution_client(as_dyn(&client))
        .build()
        .unwrap();

    let first: ValueService = runtime.create().unwrap();
    let second: ValueService = runtime.create().unwrap();

    first.get_value().unwrap();
    second.get_value().unwrap();
    first.get_value().unwrap();

    assert_ne!(first, second);
    assert_eq!(runtime.cached_bindings(), 1);
    assert_eq!(client.executions(), 3);
}

mod v1 {
    retroapollo::graphql_service! {
        pub struct Api {
            query fn get() -> i64 = "query V1 { v1 }";
        }
    }
}

mod v2 {
    use crate::common::Doubled;

    retroapollo::graphql_service! {
        pub struct Api {
            query fn get() -> Doubled<i64> = "query V2 { v2 }";
        }
    }
}

#[test]
fn test_same_named_services_in_different_modules_bind_separately() {
    let client = StubClient::returning(json!(21));
    let runtime = RetroApollo::builder()
        .execution_client(as_dyn(&client))
        .add_call_adapter_factory(Arc::new(DoublingAdapterFactory::default()))
        .build()
        .unwrap();

    let first: v1::Api = runtime.create().unwrap();
    let second: v2::Api = runtime.create().unwrap();

    assert_eq!(first.get().unwrap(), 21);
    let op = client.last_operation().unwrap();
    assert_eq!(op.operation_name.as_deref(), Some("V1"));

    assert_eq!(second.get().unwrap(), Doubled(42));
    let op = client.last_operation().unwrap();
    assert_eq!(op.operation_name.as_deref(), Some("V2"));

    assert_eq!(first.proxy().service_name(), second.proxy().service_name());
    assert_eq!(runtime.cached_bindings(), 2);
}

#[test]
fn test_universal_operations_do_not_dispatch() {
    let client = StubClient::returning(json!(42));
    let runtime = RetroApollo::builder()
        .execution_client(as_dyn(&client))
        .build()
        .unwrap();

    let service: StarWarsApi = runtime.create().unwrap();
    let copy = service.clone();

    assert_eq!(service, copy);
    assert_eq!(service.proxy().to_string(), "GraphQL service StarWarsApi");
    assert!(format!("{service:?}").contains("StarWarsApi"));

    let mut set = std::collections::HashSet::new();
    set.insert(service);
    set.insert(copy);
    assert_eq!(set.len(), 1);

    assert_eq!(client.executions(), 0);
    assert_eq!(runtime.cached_bindings(), 0);
}
