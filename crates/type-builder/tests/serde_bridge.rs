//! Driving `Deserialize` impls from builder storage.

#![cfg(feature = "serde")]

use serde::Deserialize;
use serde_json::json;
use type_builder::{reflect, BuildError, Builder, DecodeError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Service {
    pub name: String,
    #[serde(default = "default_replicas")]
    pub replicas: u32,
    pub owner: Option<String>,
    pub endpoint: Endpoint,
}

fn default_replicas() -> u32 {
    1
}

reflect! {
    pub Endpoint => EndpointFields {
        leaf host: String,
        leaf port: u16,
    }
}

reflect! {
    pub Service => ServiceFields {
        leaf name: String,
        leaf replicas: u32,
        optional owner: String,
        nested endpoint: Endpoint,
    }
}

fn endpoint_builder() -> Builder<Service> {
    let builder = Builder::<Service>::new();
    builder.at(&Service::FIELDS.name).set("api".to_string());
    let endpoint = builder.at(&Service::FIELDS.endpoint);
    endpoint.at(&Endpoint::FIELDS.host).set("localhost".to_string());
    endpoint.at(&Endpoint::FIELDS.port).set(8080);
    builder
}

#[test]
fn test_matches_document_decode() {
    let builder = endpoint_builder();
    builder.at(&Service::FIELDS.owner).set(Some("ops".to_string()));
    builder.at(&Service::FIELDS.replicas).set(3);

    let document = json!({
        "name": "api",
        "replicas": 3,
        "owner": "ops",
        "endpoint": { "host": "localhost", "port": 8080 },
    });
    let expected: Service = serde_json::from_value(document).unwrap();

    assert_eq!(builder.deserialize(), Ok(expected));
}

#[test]
fn test_serde_defaults_apply_to_unwritten_fields() {
    let built = endpoint_builder().deserialize().unwrap();

    let document = json!({
        "name": "api",
        "endpoint": { "host": "localhost", "port": 8080 },
    });
    let expected: Service = serde_json::from_value(document).unwrap();

    assert_eq!(built, expected);
    assert_eq!(built.replicas, 1);
    assert_eq!(built.owner, None);
}

#[test]
fn test_nulled_optional() {
    let builder = endpoint_builder();
    builder.at(&Service::FIELDS.owner).set(Some("ops".to_string()));
    builder.at(&Service::FIELDS.owner).set_null();

    assert_eq!(builder.deserialize().unwrap().owner, None);
}

#[test]
fn test_missing_nested_field() {
    let builder = Builder::<Service>::new();
    builder.at(&Service::FIELDS.name).set("api".to_string());
    builder
        .at(&Service::FIELDS.endpoint)
        .at(&Endpoint::FIELDS.host)
        .set("localhost".to_string());

    assert_eq!(
        builder.deserialize(),
        Err(BuildError::Decode {
            type_name: "Service",
            source: DecodeError::Custom("missing field `port`".to_string()),
        })
    );
}

#[test]
fn test_missing_nested_struct() {
    let builder = Builder::<Service>::new();
    builder.at(&Service::FIELDS.name).set("api".to_string());

    assert_eq!(
        builder.deserialize().unwrap_err().as_decode(),
        Some(&DecodeError::Custom("missing field `endpoint`".to_string()))
    );
}

#[test]
fn test_cleared_nested_struct_matches_build() {
    let builder = endpoint_builder();
    builder.clear(&Service::FIELDS.endpoint).unwrap();

    let built = builder.deserialize().unwrap();
    assert_eq!(
        built.endpoint,
        Endpoint {
            host: "localhost".to_string(),
            port: 8080,
        }
    );
}

// =============================================================================
// Sequences
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tagged {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

reflect! {
    pub Tagged => TaggedFields {
        leaf name: String,
        sequence tags: String,
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Release {
    pub version: String,
    pub tagged: Tagged,
}

reflect! {
    pub Release => ReleaseFields {
        leaf version: String,
        nested tagged: Tagged,
    }
}

#[test]
#[should_panic(expected = "sequence field `tags` cannot be built field by field")]
fn test_written_sequence_panics() {
    let builder = Builder::<Tagged>::new();
    builder.at(&Tagged::FIELDS.name).set("x".to_string());
    builder
        .set(&Tagged::FIELDS.tags, vec!["a".to_string()])
        .unwrap();
    let _ = builder.deserialize();
}

#[test]
#[should_panic(expected = "sequence field `tags` cannot be built field by field")]
fn test_unwritten_sequence_panics_despite_default() {
    let builder = Builder::<Tagged>::new();
    builder.at(&Tagged::FIELDS.name).set("x".to_string());
    let _ = builder.deserialize();
}

#[test]
#[should_panic(expected = "sequence field `tagged.tags` cannot be built field by field")]
fn test_nested_sequence_panics() {
    let builder = Builder::<Release>::new();
    builder.at(&Release::FIELDS.version).set("1.0".to_string());
    let _ = builder.deserialize();
}
