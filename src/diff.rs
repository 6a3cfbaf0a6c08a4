//! Change classification and patch operation generation
//!
//! Given the previously-applied and newly-declared CORS configurations this
//! module decides what kind of provider action is required
//! ([`ChangeAction`]) and, for incremental changes, produces the ordered
//! response-header patch operations ([`operations`]).
//!
//! `allowOrigin` and `allowMethods` are primary fields: they shape the
//! preflight method itself, so any change to them forces a full rebuild.
//! `allowMethods` compares as a set (reordering is not a change). The
//! remaining fields are secondary and patchable; note that the list-valued
//! secondary fields (`allowHeaders`, `exposeHeaders`) compare by plain
//! sequence equality, so reordering one of them registers as a change even
//! though the rendered semantics are identical.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::{header, CorsConfig};

/// Patch paths for response header parameters live under this prefix
const RESPONSE_HEADER_PREFIX: &str = "/responseParameters/method.response.header.";

/// The provider action required to converge a resource's CORS state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChangeAction {
    /// Nothing differs; no provider call is needed
    None,
    /// No previous configuration; the preflight method must be created
    Create,
    /// Configuration was removed; the preflight method must be deleted
    Delete,
    /// A primary field changed; the method must be deleted and recreated
    Rebuild,
    /// Only secondary fields changed; response headers can be patched in place
    Patch,
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Create => write!(f, "create"),
            Self::Delete => write!(f, "delete"),
            Self::Rebuild => write!(f, "rebuild"),
            Self::Patch => write!(f, "patch"),
        }
    }
}

/// Classify the change between a previous and desired configuration
pub fn classify(previous: Option<&CorsConfig>, desired: Option<&CorsConfig>) -> ChangeAction {
    match (previous, desired) {
        (None, None) => ChangeAction::None,
        (None, Some(_)) => ChangeAction::Create,
        (Some(_), None) => ChangeAction::Delete,
        (Some(previous), Some(desired)) => {
            if previous.allow_origin != desired.allow_origin
                || !same_method_set(&previous.allow_methods, &desired.allow_methods)
            {
                ChangeAction::Rebuild
            } else if previous.allow_headers != desired.allow_headers
                || previous.expose_headers != desired.expose_headers
                || previous.max_age != desired.max_age
                || previous.allow_credentials != desired.allow_credentials
            {
                ChangeAction::Patch
            } else {
                ChangeAction::None
            }
        }
    }
}

fn same_method_set(previous: &[String], desired: &[String]) -> bool {
    let previous: BTreeSet<&str> = previous.iter().map(String::as_str).collect();
    let desired: BTreeSet<&str> = desired.iter().map(String::as_str).collect();
    previous == desired
}

/// Pairs the previously-applied and newly-declared configuration for one
/// gateway resource
///
/// Constructed fresh per reconciliation request; the core never persists it.
/// Keeping track of what was previously applied is the caller's concern.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CorsTransition {
    previous: Option<CorsConfig>,
    desired: Option<CorsConfig>,
}

impl CorsTransition {
    /// Create a transition from the previously-applied configuration (if
    /// any) to the desired one (if any)
    pub fn new(previous: Option<CorsConfig>, desired: Option<CorsConfig>) -> Self {
        Self { previous, desired }
    }

    /// The previously-applied configuration
    pub fn previous(&self) -> Option<&CorsConfig> {
        self.previous.as_ref()
    }

    /// The desired configuration
    pub fn desired(&self) -> Option<&CorsConfig> {
        self.desired.as_ref()
    }

    /// Classify the provider action this transition requires
    pub fn action(&self) -> ChangeAction {
        classify(self.previous.as_ref(), self.desired.as_ref())
    }
}

/// Kind of a patch operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    /// Add a value at a path that was previously absent
    Add,
    /// Replace the value at an existing path
    Replace,
    /// Remove the value at a path
    Remove,
}

/// A single add/replace/remove instruction against a response object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchOperation {
    /// Operation kind
    pub op: PatchOp,
    /// Field path the operation targets
    pub path: String,
    /// New value for add/replace operations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl PatchOperation {
    /// Create an `add` operation
    pub fn add(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Add,
            path: path.into(),
            value: Some(value.into()),
        }
    }

    /// Create a `replace` operation
    pub fn replace(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Replace,
            path: path.into(),
            value: Some(value.into()),
        }
    }

    /// Create a `remove` operation
    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Remove,
            path: path.into(),
            value: None,
        }
    }
}

/// Patch path for a response header parameter
pub fn response_header_path(header: &str) -> String {
    format!("{RESPONSE_HEADER_PREFIX}{header}")
}

/// Generate the patch operations that converge the secondary fields
///
/// Emits at most one operation per secondary field, in declaration order:
/// `allowHeaders`, `exposeHeaders`, `maxAge`, `allowCredentials`. The order
/// is stable for identical input. Returns an empty sequence when nothing
/// differs; callers treat that as "nothing to apply" rather than an error.
pub fn operations(previous: &CorsConfig, desired: &CorsConfig) -> Vec<PatchOperation> {
    let mut ops = Vec::new();
    diff_header(
        &mut ops,
        header::ALLOW_HEADERS,
        previous.allow_headers_value(),
        desired.allow_headers_value(),
    );
    diff_header(
        &mut ops,
        header::EXPOSE_HEADERS,
        previous.expose_headers_value(),
        desired.expose_headers_value(),
    );
    diff_header(
        &mut ops,
        header::MAX_AGE,
        previous.max_age_value(),
        desired.max_age_value(),
    );
    diff_header(
        &mut ops,
        header::ALLOW_CREDENTIALS,
        previous.allow_credentials_value(),
        desired.allow_credentials_value(),
    );
    ops
}

fn diff_header(
    ops: &mut Vec<PatchOperation>,
    header: &str,
    previous: Option<String>,
    desired: Option<String>,
) {
    let path = response_header_path(header);
    match (previous, desired) {
        (None, Some(value)) => ops.push(PatchOperation::add(path, value)),
        (Some(previous), Some(desired)) if previous != desired => {
            ops.push(PatchOperation::replace(path, desired));
        }
        (Some(_), None) => ops.push(PatchOperation::remove(path)),
        _ => {}
    }
}
