//! Preflight - CORS configuration reconciler for API gateway resources
//!
//! Preflight keeps the CORS (Cross-Origin Resource Sharing) configuration of a
//! single API gateway resource in sync with a declared desired state. It
//! compares the previously-applied configuration against the newly-declared
//! one and issues the minimal set of imperative calls against a gateway
//! resource provider, recreating the preflight OPTIONS method only when the
//! change actually requires it.
//!
//! # Architecture
//!
//! A reconciliation runs as a strictly sequential pipeline:
//! - the change between the old and new configuration is classified
//!   (no-op, create, delete, full rebuild, or incremental patch);
//! - for incremental patches, an ordered sequence of response-header patch
//!   operations is generated;
//! - the resulting provider calls are issued one at a time, short-circuiting
//!   on the first error.
//!
//! The gateway itself is reached through the [`provider::GatewayProvider`]
//! capability trait. Transport, authentication, and retry policy all live
//! behind that boundary; the core holds no shared state between invocations.
//!
//! # Modules
//!
//! - [`config`] - CORS configuration value object, validation, header rendering
//! - [`diff`] - change classification and patch operation generation
//! - [`provider`] - gateway resource provider boundary and its error taxonomy
//! - [`reconciler`] - orchestration of provider calls per classified change
//! - [`error`] - error types for the reconciler

#![deny(missing_docs)]

pub mod config;
pub mod diff;
pub mod error;
pub mod provider;
pub mod reconciler;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// HTTP method a gateway resource uses to answer CORS preflight requests
pub const OPTIONS_METHOD: &str = "OPTIONS";

/// Status code of the response that carries the CORS headers
///
/// The preflight OPTIONS method answers with a single static 200 response;
/// both its method response and integration response are keyed by this code.
pub const PREFLIGHT_STATUS_CODE: &str = "200";
