//! Gateway resource provider boundary
//!
//! This module defines the capability interface the reconciler drives and
//! the value types that cross it. Everything provider-specific - transport,
//! authentication, request shaping, retry policy - lives behind
//! [`GatewayProvider`]; the core only sees [`ProviderError`] values whose
//! [`ErrorKind`] has already been discriminated by the adapter.
//!
//! In particular, adapters are responsible for translating their SDK's
//! not-found discriminator (for example the `NotFoundException` error code
//! returned by the AWS API Gateway service) into [`ErrorKind::NotFound`].
//! The reconciler treats that kind as "the target is already absent" in the
//! contexts where absence satisfies the operation's intent, and it never
//! inspects provider-specific error shapes itself.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::config::CorsConfig;
use crate::diff::PatchOperation;

/// Classes of failure a provider call can report
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The target method or response object does not exist
    NotFound,
    /// Any other failure (permissions, throttling, validation, transport)
    Other,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Other => write!(f, "provider error"),
        }
    }
}

/// Error returned by a gateway provider call
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ProviderError {
    /// Failure class, discriminated by the provider adapter
    pub kind: ErrorKind,
    /// Provider-supplied description, surfaced verbatim
    pub message: String,
}

impl ProviderError {
    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            message: message.into(),
        }
    }

    /// Create an error of any other kind
    pub fn other(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Other,
            message: message.into(),
        }
    }

    /// Whether this error reports the target as absent
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

/// A method definition ready to be created on a gateway resource
///
/// Carries everything the core decides about the method: the HTTP verb, the
/// status code of its single static response, and the full response header
/// map rendered from the CORS configuration. Adapters add whatever their
/// gateway additionally needs to realize it (authorization type, the mock
/// integration answering the preflight, content types); none of that is the
/// core's decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDefinition {
    /// HTTP method to create (OPTIONS for preflight)
    pub http_method: String,
    /// Status code of the static response carrying the headers
    pub status_code: String,
    /// Response header values, keyed by header name
    pub response_headers: BTreeMap<String, String>,
}

impl MethodDefinition {
    /// Build the preflight OPTIONS method definition for a configuration
    pub fn preflight(config: &CorsConfig) -> Self {
        Self {
            http_method: crate::OPTIONS_METHOD.to_string(),
            status_code: crate::PREFLIGHT_STATUS_CODE.to_string(),
            response_headers: config.response_headers(),
        }
    }
}

/// A deployed method as reported by the gateway
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// HTTP method of the deployed resource method
    pub http_method: String,
    /// Currently-applied response header values, keyed by header name
    pub response_headers: BTreeMap<String, String>,
}

/// Capability interface for the gateway resource provider
///
/// One implementation per gateway SDK. All calls are remote I/O and may
/// suspend; each eventually returns a definite success or error, and the
/// reconciler awaits completion before issuing the next dependent call.
/// There is no retry here or in the core - transient failures surface to
/// the caller, which owns retry policy.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GatewayProvider: Send + Sync {
    /// Delete a method from a gateway resource
    async fn delete_method(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        http_method: &str,
    ) -> Result<(), ProviderError>;

    /// Create a method on a gateway resource
    async fn create_method(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        definition: &MethodDefinition,
    ) -> Result<(), ProviderError>;

    /// Fetch a deployed method
    async fn get_method(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        http_method: &str,
    ) -> Result<MethodDescriptor, ProviderError>;

    /// Apply patch operations to a method response
    async fn update_method_response(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        http_method: &str,
        status_code: &str,
        operations: &[PatchOperation],
    ) -> Result<(), ProviderError>;

    /// Apply patch operations to an integration response
    async fn update_integration_response(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        http_method: &str,
        status_code: &str,
        operations: &[PatchOperation],
    ) -> Result<(), ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_distinguishable() {
        assert!(ProviderError::not_found("no such method").is_not_found());
        assert!(!ProviderError::other("access denied").is_not_found());
    }

    #[test]
    fn test_error_display_includes_kind_and_message() {
        let err = ProviderError::not_found("Invalid Method identifier specified");
        assert_eq!(err.to_string(), "not found: Invalid Method identifier specified");

        let err = ProviderError::other("throttled");
        assert_eq!(err.to_string(), "provider error: throttled");
    }

    #[test]
    fn test_preflight_definition_renders_full_configuration() {
        let config = CorsConfig {
            allow_methods: vec!["GET".to_string(), "PUT".to_string()],
            allow_origin: "*".to_string(),
            max_age: Some(123),
            ..Default::default()
        };

        let definition = MethodDefinition::preflight(&config);
        assert_eq!(definition.http_method, "OPTIONS");
        assert_eq!(definition.status_code, "200");
        assert_eq!(definition.response_headers, config.response_headers());
    }
}
