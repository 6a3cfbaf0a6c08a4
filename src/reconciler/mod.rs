//! CORS reconciliation logic
//!
//! This module implements the reconciliation entry points for a gateway
//! resource's CORS configuration. It follows the controller pattern:
//! observe the declared states, classify the difference, and apply the
//! minimal provider calls needed to converge.

mod cors;

pub use cors::CorsReconciler;
