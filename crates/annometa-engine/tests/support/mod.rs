//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Once};

use annometa_engine::{ElementMetadata, MetadataBuilder};
use annometa_types::{
    AnnotationContract, AnnotationName, AttributeSpec, AttributeType, AttributeValue,
    ContractRegistry, EnumType,
};

pub const SCOPE: &str = "com.acme.inject.Scope";
pub const SINGLETON: &str = "com.acme.inject.Singleton";
pub const BEAN: &str = "com.acme.context.Bean";
pub const QUALIFIER: &str = "com.acme.inject.Qualifier";
pub const NAMED: &str = "com.acme.inject.Named";
pub const CONTROLLER: &str = "com.acme.http.Controller";
pub const REQUIRES: &str = "com.acme.context.Requires";
pub const REQUIREMENTS: &str = "com.acme.context.Requirements";
pub const MARKER: &str = "com.acme.Marker";
pub const TRANSACTIONAL: &str = "com.acme.tx.Transactional";

static TRACING: Once = Once::new();

/// Route engine logs to the test harness, filtered by `RUST_LOG`
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn propagation() -> EnumType {
    EnumType::new("com.acme.tx.Propagation", ["REQUIRED", "REQUIRES_NEW", "NEVER"])
}

/// Contracts of a small dependency-injection framework
pub fn registry() -> Arc<ContractRegistry> {
    let requires = AttributeType::Annotation(AnnotationName::new(REQUIRES));
    let lazy = [("lazy".to_string(), AttributeValue::Bool(true))].into_iter().collect();
    let required = AttributeValue::enum_constant("com.acme.tx.Propagation", "REQUIRED");
    let registry = ContractRegistry::new()
        .with(AnnotationContract::new(SCOPE))
        .unwrap()
        .with(AnnotationContract::new(QUALIFIER))
        .unwrap()
        .with(
            AnnotationContract::new(BEAN)
                .attribute(AttributeSpec::new("name", AttributeType::String).with_default(""))
                .attribute(AttributeSpec::new("order", AttributeType::Int).with_default(0))
                .attribute(AttributeSpec::new("lazy", AttributeType::Bool).with_default(false)),
        )
        .unwrap()
        .with(
            AnnotationContract::new(SINGLETON)
                .annotated_with(SCOPE)
                .annotated_with_values(BEAN, lazy),
        )
        .unwrap()
        .with(
            AnnotationContract::new(NAMED)
                .attribute(
                    AttributeSpec::new("value", AttributeType::String).alias_for(BEAN, "name"),
                )
                .annotated_with(QUALIFIER)
                .annotated_with(BEAN),
        )
        .unwrap()
        .with(
            AnnotationContract::new(CONTROLLER)
                .attribute(AttributeSpec::new("value", AttributeType::String).with_default("/"))
                .attribute(
                    AttributeSpec::new("produces", AttributeType::array(AttributeType::String))
                        .with_default(AttributeValue::strings(["application/json"])),
                )
                .annotated_with(SINGLETON),
        )
        .unwrap()
        .with(
            AnnotationContract::new(REQUIRES)
                .attribute(AttributeSpec::new("property", AttributeType::String))
                .attribute(AttributeSpec::new("value", AttributeType::String).with_default("true"))
                .repeatable_in(REQUIREMENTS),
        )
        .unwrap()
        .with(AnnotationContract::new(REQUIREMENTS).attribute(AttributeSpec::new(
            "value",
            AttributeType::array(requires),
        )))
        .unwrap()
        .with(AnnotationContract::new(MARKER).annotated_with(SINGLETON))
        .unwrap()
        .with(
            AnnotationContract::new(TRANSACTIONAL)
                .attribute(
                    AttributeSpec::new("propagation", AttributeType::Enum(propagation()))
                        .with_default(required),
                )
                .attribute(AttributeSpec::new("timeout", AttributeType::Double).with_default(-1.0))
                .attribute(AttributeSpec::new("readOnly", AttributeType::Bool).with_default(false)),
        )
        .unwrap();
    Arc::new(registry)
}

/// `@Controller("/users") @Named("users")`
pub fn users_controller() -> ElementMetadata {
    MetadataBuilder::new()
        .declare_with(CONTROLLER, [("value", "/users")])
        .declare_with(NAMED, [("value", "users")])
        .build(registry())
        .unwrap()
}

/// Only a meta-annotated marker
pub fn marked() -> ElementMetadata {
    MetadataBuilder::new().declare(MARKER).build(registry()).unwrap()
}
