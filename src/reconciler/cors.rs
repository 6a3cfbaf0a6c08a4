//! CORS reconciler implementation
//!
//! Sequences gateway provider calls according to the classified change
//! between the previously-applied and desired configuration. A rebuild is
//! a delete followed by a create, never concurrent, so two conflicting
//! method definitions cannot coexist. Incremental changes patch the method
//! response and integration response of the existing OPTIONS method in
//! place.
//!
//! The first error aborts the pipeline and surfaces to the caller; there is
//! no retry and no rollback of already-applied steps. If a rebuild's delete
//! succeeds and its create fails, the resource is left without a preflight
//! method and the caller converges it by re-invoking. "Not found" is the
//! only error class treated as success, and only where absence already
//! satisfies the operation's intent.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::config::CorsConfig;
use crate::diff::{operations, ChangeAction, CorsTransition};
use crate::provider::{GatewayProvider, MethodDefinition, ProviderError};
use crate::{Result, OPTIONS_METHOD, PREFLIGHT_STATUS_CODE};

/// Reconciles a gateway resource's CORS configuration against its declared
/// state
///
/// Holds no state besides the injected provider; invocations for different
/// resources may run concurrently without locking.
pub struct CorsReconciler {
    provider: Arc<dyn GatewayProvider>,
}

impl CorsReconciler {
    /// Create a reconciler driving the given provider
    pub fn new(provider: Arc<dyn GatewayProvider>) -> Self {
        Self { provider }
    }

    /// Unconditionally (re)create the preflight OPTIONS method
    ///
    /// Deletes any existing OPTIONS method first (absence is not an error)
    /// and creates a new one carrying the full configuration rendered into
    /// its response headers. The delete completes before the create begins.
    #[instrument(skip(self, config))]
    pub async fn put_options_method(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        config: &CorsConfig,
    ) -> Result<()> {
        config.validate()?;

        info!("replacing preflight method");
        self.delete_preflight_method(rest_api_id, resource_id).await?;
        self.provider
            .create_method(rest_api_id, resource_id, &MethodDefinition::preflight(config))
            .await?;

        info!("preflight method created");
        Ok(())
    }

    /// Converge the resource's CORS state to the desired configuration
    ///
    /// Classifies the transition and issues the minimal provider calls:
    /// nothing for a no-op, delete-then-create for new or rebuilt
    /// configurations, a delete for removed ones, and response-header
    /// patches for secondary-field changes.
    #[instrument(skip(self, transition))]
    pub async fn update_cors_configuration(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        transition: &CorsTransition,
    ) -> Result<()> {
        let action = transition.action();
        debug!(%action, "classified cors configuration change");

        match action {
            ChangeAction::None => {
                debug!("cors configuration unchanged");
                Ok(())
            }
            ChangeAction::Create | ChangeAction::Rebuild => {
                let Some(desired) = transition.desired() else {
                    return Ok(());
                };
                self.put_options_method(rest_api_id, resource_id, desired).await
            }
            ChangeAction::Delete => {
                info!("removing preflight method");
                self.delete_preflight_method(rest_api_id, resource_id).await
            }
            ChangeAction::Patch => {
                let (Some(previous), Some(desired)) = (transition.previous(), transition.desired())
                else {
                    return Ok(());
                };
                desired.validate()?;
                self.patch_preflight_responses(rest_api_id, resource_id, previous, desired)
                    .await
            }
        }
    }

    /// Read the currently-applied CORS configuration back from the gateway
    ///
    /// Returns `Ok(None)` when the resource has no OPTIONS method, or when
    /// the deployed method's response headers do not carry a CORS
    /// configuration.
    #[instrument(skip(self))]
    pub async fn get_cors_configuration(
        &self,
        rest_api_id: &str,
        resource_id: &str,
    ) -> Result<Option<CorsConfig>> {
        match self
            .provider
            .get_method(rest_api_id, resource_id, OPTIONS_METHOD)
            .await
        {
            Ok(method) => Ok(CorsConfig::from_response_headers(&method.response_headers)),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn delete_preflight_method(&self, rest_api_id: &str, resource_id: &str) -> Result<()> {
        ignore_not_found(
            self.provider
                .delete_method(rest_api_id, resource_id, OPTIONS_METHOD)
                .await,
        )?;
        Ok(())
    }

    async fn patch_preflight_responses(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        previous: &CorsConfig,
        desired: &CorsConfig,
    ) -> Result<()> {
        let ops = operations(previous, desired);
        if ops.is_empty() {
            debug!("no response header updates required");
            return Ok(());
        }

        info!(operations = ops.len(), "patching preflight response headers");

        // A missing response object is equivalent to the state the patch
        // converges to: tolerated when removing, and created-on-patch by
        // the provider when adding.
        ignore_not_found(
            self.provider
                .update_method_response(
                    rest_api_id,
                    resource_id,
                    OPTIONS_METHOD,
                    PREFLIGHT_STATUS_CODE,
                    &ops,
                )
                .await,
        )?;
        ignore_not_found(
            self.provider
                .update_integration_response(
                    rest_api_id,
                    resource_id,
                    OPTIONS_METHOD,
                    PREFLIGHT_STATUS_CODE,
                    &ops,
                )
                .await,
        )?;
        Ok(())
    }
}

fn ignore_not_found(result: std::result::Result<(), ProviderError>) -> std::result::Result<(), ProviderError> {
    match result {
        Err(error) if error.is_not_found() => {
            debug!(%error, "target already absent");
            Ok(())
        }
        other => other,
    }
}
