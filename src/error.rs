//! Error types for the Preflight reconciler

use thiserror::Error;

use crate::provider::ProviderError;

/// Main error type for reconciliation operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Gateway resource provider error
    #[error("gateway error: {0}")]
    Gateway(#[from] ProviderError),

    /// Validation error for CORS configurations
    #[error("validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Story: validation catches incomplete configurations before any
    /// provider call is made
    ///
    /// When a caller declares a CORS configuration without its required
    /// fields, the validation layer rejects it with a clear message instead
    /// of letting a half-rendered method reach the gateway.
    #[test]
    fn story_validation_rejects_incomplete_configuration() {
        let err = Error::validation("corsConfig requires at least one allowMethods entry");
        assert!(err.to_string().contains("validation error"));
        assert!(err.to_string().contains("allowMethods"));

        let err = Error::validation("corsConfig requires a non-empty allowOrigin");
        assert!(err.to_string().contains("allowOrigin"));

        match Error::validation("any message") {
            Error::Validation(msg) => assert_eq!(msg, "any message"),
            _ => panic!("Expected Validation variant"),
        }
    }

    /// Story: provider failures surface verbatim
    ///
    /// Throttling, permission, and validation failures from the gateway are
    /// not interpreted by the core; they abort the pipeline and reach the
    /// caller wrapped in the Gateway variant.
    #[test]
    fn story_gateway_errors_surface_provider_failures() {
        let err = Error::from(ProviderError::other("TooManyRequestsException: rate exceeded"));
        assert!(err.to_string().contains("gateway error"));
        assert!(err.to_string().contains("rate exceeded"));

        // NotFound keeps its kind through the conversion so callers can
        // still distinguish it where the core has not already absorbed it.
        match Error::from(ProviderError::not_found("no OPTIONS method")) {
            Error::Gateway(provider) => assert!(provider.is_not_found()),
            _ => panic!("Expected Gateway variant"),
        }
    }
}
