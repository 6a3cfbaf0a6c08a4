//! CORS configuration model
//!
//! [`CorsConfig`] is the value object a caller declares for a gateway
//! resource. Absence of a configuration means "CORS disabled for this
//! resource"; a present configuration always requires `allowMethods` and
//! `allowOrigin`. The wire shape is camelCase JSON:
//!
//! ```json
//! {
//!     "allowMethods": ["GET", "PUT"],
//!     "allowOrigin": "*",
//!     "allowHeaders": ["x-header"],
//!     "exposeHeaders": ["x-expose"],
//!     "maxAge": 123,
//!     "allowCredentials": true
//! }
//! ```
//!
//! The model also owns the rendering rules that turn configuration fields
//! into `Access-Control-*` response header values: list-valued fields render
//! comma-joined, `maxAge` renders as its decimal string, and
//! `allowCredentials` renders as `"true"`/`"false"`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Response header names driven by a CORS configuration
pub mod header {
    /// `Access-Control-Allow-Methods` header
    pub const ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
    /// `Access-Control-Allow-Origin` header
    pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
    /// `Access-Control-Allow-Headers` header
    pub const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
    /// `Access-Control-Expose-Headers` header
    pub const EXPOSE_HEADERS: &str = "Access-Control-Expose-Headers";
    /// `Access-Control-Max-Age` header
    pub const MAX_AGE: &str = "Access-Control-Max-Age";
    /// `Access-Control-Allow-Credentials` header
    pub const ALLOW_CREDENTIALS: &str = "Access-Control-Allow-Credentials";
}

/// Declared CORS configuration for a single gateway resource
///
/// `allow_origin` and `allow_methods` are baked into the shape of the
/// preflight OPTIONS method itself; changing either forces the method to be
/// rebuilt. The remaining fields only affect response header values and can
/// be patched in place.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CorsConfig {
    /// HTTP methods allowed for cross-origin requests (e.g. GET, PUT)
    pub allow_methods: Vec<String>,

    /// Allowed origin, either a concrete origin or `*`
    pub allow_origin: String,

    /// Request headers allowed on cross-origin requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_headers: Option<Vec<String>>,

    /// Response headers exposed to cross-origin callers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expose_headers: Option<Vec<String>>,

    /// How long (seconds) browsers may cache the preflight response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,

    /// Whether credentialed cross-origin requests are allowed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_credentials: Option<bool>,
}

impl CorsConfig {
    /// Validates that the required fields are present
    ///
    /// A configuration that is declared at all must name at least one
    /// allowed method and a non-empty origin.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.allow_methods.is_empty() {
            return Err(crate::Error::validation(
                "corsConfig requires at least one allowMethods entry",
            ));
        }
        if self.allow_origin.is_empty() {
            return Err(crate::Error::validation(
                "corsConfig requires a non-empty allowOrigin",
            ));
        }
        Ok(())
    }

    /// Rendered `Access-Control-Allow-Methods` header value
    pub fn allow_methods_value(&self) -> String {
        self.allow_methods.join(",")
    }

    /// Rendered `Access-Control-Allow-Headers` header value, if declared
    pub fn allow_headers_value(&self) -> Option<String> {
        self.allow_headers.as_ref().map(|headers| headers.join(","))
    }

    /// Rendered `Access-Control-Expose-Headers` header value, if declared
    pub fn expose_headers_value(&self) -> Option<String> {
        self.expose_headers.as_ref().map(|headers| headers.join(","))
    }

    /// Rendered `Access-Control-Max-Age` header value, if declared
    pub fn max_age_value(&self) -> Option<String> {
        self.max_age.map(|seconds| seconds.to_string())
    }

    /// Rendered `Access-Control-Allow-Credentials` header value, if declared
    pub fn allow_credentials_value(&self) -> Option<String> {
        self.allow_credentials.map(|allowed| allowed.to_string())
    }

    /// Render every present field into its response header
    ///
    /// This is the full header set the preflight OPTIONS method answers
    /// with; it is used when the method is (re)created from scratch.
    pub fn response_headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert(header::ALLOW_METHODS.to_string(), self.allow_methods_value());
        headers.insert(header::ALLOW_ORIGIN.to_string(), self.allow_origin.clone());
        if let Some(value) = self.allow_headers_value() {
            headers.insert(header::ALLOW_HEADERS.to_string(), value);
        }
        if let Some(value) = self.expose_headers_value() {
            headers.insert(header::EXPOSE_HEADERS.to_string(), value);
        }
        if let Some(value) = self.max_age_value() {
            headers.insert(header::MAX_AGE.to_string(), value);
        }
        if let Some(value) = self.allow_credentials_value() {
            headers.insert(header::ALLOW_CREDENTIALS.to_string(), value);
        }
        headers
    }

    /// Reconstruct a configuration from deployed response headers
    ///
    /// Inverse of [`response_headers`](Self::response_headers), used when
    /// reading the currently-applied state back from the gateway. Returns
    /// `None` when the headers do not carry the two required fields, which
    /// means CORS is not configured on the method. Unparseable `maxAge` or
    /// `allowCredentials` values are dropped rather than surfaced.
    pub fn from_response_headers(headers: &BTreeMap<String, String>) -> Option<Self> {
        let allow_methods = headers.get(header::ALLOW_METHODS)?;
        let allow_origin = headers.get(header::ALLOW_ORIGIN)?;
        Some(Self {
            allow_methods: split_header_list(allow_methods),
            allow_origin: allow_origin.clone(),
            allow_headers: headers.get(header::ALLOW_HEADERS).map(|v| split_header_list(v)),
            expose_headers: headers.get(header::EXPOSE_HEADERS).map(|v| split_header_list(v)),
            max_age: headers.get(header::MAX_AGE).and_then(|v| v.parse().ok()),
            allow_credentials: headers
                .get(header::ALLOW_CREDENTIALS)
                .and_then(|v| v.parse().ok()),
        })
    }
}

fn split_header_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_config() -> CorsConfig {
        CorsConfig {
            allow_methods: vec!["GET".to_string(), "PUT".to_string()],
            allow_origin: "*".to_string(),
            allow_headers: Some(vec!["x-header".to_string()]),
            expose_headers: Some(vec!["x-expose".to_string()]),
            max_age: Some(123),
            allow_credentials: Some(true),
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn test_full_config_is_valid() {
            assert!(full_config().validate().is_ok());
        }

        #[test]
        fn test_minimal_config_is_valid() {
            let config = CorsConfig {
                allow_methods: vec!["GET".to_string()],
                allow_origin: "http://example.com".to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_missing_methods_is_rejected() {
            let config = CorsConfig {
                allow_origin: "*".to_string(),
                ..Default::default()
            };
            let err = config.validate().expect_err("should be rejected");
            assert!(err.to_string().contains("allowMethods"));
        }

        #[test]
        fn test_empty_origin_is_rejected() {
            let config = CorsConfig {
                allow_methods: vec!["GET".to_string()],
                ..Default::default()
            };
            let err = config.validate().expect_err("should be rejected");
            assert!(err.to_string().contains("allowOrigin"));
        }
    }

    mod rendering {
        use super::*;

        #[test]
        fn test_list_fields_render_comma_joined() {
            let config = full_config();
            assert_eq!(config.allow_methods_value(), "GET,PUT");
            assert_eq!(config.allow_headers_value().as_deref(), Some("x-header"));
            assert_eq!(config.expose_headers_value().as_deref(), Some("x-expose"));
        }

        #[test]
        fn test_scalar_fields_render_as_strings() {
            let config = full_config();
            assert_eq!(config.max_age_value().as_deref(), Some("123"));
            assert_eq!(config.allow_credentials_value().as_deref(), Some("true"));
        }

        #[test]
        fn test_absent_fields_render_nothing() {
            let config = CorsConfig {
                allow_methods: vec!["GET".to_string()],
                allow_origin: "*".to_string(),
                ..Default::default()
            };
            assert!(config.allow_headers_value().is_none());
            assert!(config.expose_headers_value().is_none());
            assert!(config.max_age_value().is_none());
            assert!(config.allow_credentials_value().is_none());
        }

        #[test]
        fn test_response_headers_cover_all_present_fields() {
            let headers = full_config().response_headers();
            assert_eq!(headers.len(), 6);
            assert_eq!(headers.get(header::ALLOW_METHODS).map(String::as_str), Some("GET,PUT"));
            assert_eq!(headers.get(header::ALLOW_ORIGIN).map(String::as_str), Some("*"));
            assert_eq!(headers.get(header::MAX_AGE).map(String::as_str), Some("123"));
            assert_eq!(
                headers.get(header::ALLOW_CREDENTIALS).map(String::as_str),
                Some("true")
            );
        }

        #[test]
        fn test_response_headers_for_minimal_config() {
            let config = CorsConfig {
                allow_methods: vec!["GET".to_string()],
                allow_origin: "*".to_string(),
                ..Default::default()
            };
            let headers = config.response_headers();
            assert_eq!(headers.len(), 2);
            assert!(headers.contains_key(header::ALLOW_METHODS));
            assert!(headers.contains_key(header::ALLOW_ORIGIN));
        }
    }

    mod read_back {
        use super::*;

        #[test]
        fn test_round_trips_through_response_headers() {
            let config = full_config();
            let parsed = CorsConfig::from_response_headers(&config.response_headers())
                .expect("headers should parse");
            assert_eq!(parsed, config);
        }

        #[test]
        fn test_missing_required_headers_means_not_configured() {
            let mut headers = BTreeMap::new();
            headers.insert(header::MAX_AGE.to_string(), "60".to_string());
            assert!(CorsConfig::from_response_headers(&headers).is_none());
        }

        #[test]
        fn test_unparseable_scalars_are_dropped() {
            let mut headers = full_config().response_headers();
            headers.insert(header::MAX_AGE.to_string(), "soon".to_string());
            let parsed = CorsConfig::from_response_headers(&headers).expect("should parse");
            assert!(parsed.max_age.is_none());
            assert_eq!(parsed.allow_credentials, Some(true));
        }

        #[test]
        fn test_header_lists_are_trimmed_on_read() {
            let mut headers = BTreeMap::new();
            headers.insert(header::ALLOW_METHODS.to_string(), "GET, PUT".to_string());
            headers.insert(header::ALLOW_ORIGIN.to_string(), "*".to_string());
            let parsed = CorsConfig::from_response_headers(&headers).expect("should parse");
            assert_eq!(parsed.allow_methods, vec!["GET", "PUT"]);
        }
    }

    mod wire_shape {
        use super::*;

        #[test]
        fn test_deserializes_camel_case_fields() {
            let config: CorsConfig = serde_json::from_str(
                r#"{
                    "allowMethods": ["GET", "PUT"],
                    "allowOrigin": "*",
                    "allowHeaders": ["x-header"],
                    "exposeHeaders": ["x-expose"],
                    "maxAge": 123,
                    "allowCredentials": true
                }"#,
            )
            .expect("should deserialize");
            assert_eq!(config, full_config());
        }

        #[test]
        fn test_missing_optional_fields_deserialize_as_absent() {
            let config: CorsConfig =
                serde_json::from_str(r#"{"allowMethods": ["GET"], "allowOrigin": "*"}"#)
                    .expect("should deserialize");
            assert!(config.allow_headers.is_none());
            assert!(config.max_age.is_none());
        }

        #[test]
        fn test_absent_fields_are_skipped_on_serialize() {
            let config = CorsConfig {
                allow_methods: vec!["GET".to_string()],
                allow_origin: "*".to_string(),
                ..Default::default()
            };
            let json = serde_json::to_value(&config).expect("should serialize");
            assert_eq!(
                json,
                serde_json::json!({"allowMethods": ["GET"], "allowOrigin": "*"})
            );
        }
    }
}
