use async_trait::async_trait;
use axum::Router;

/// Context provided to modules during initialization
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// Lifecycle contract for a feature module mounted by the HTTP server
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name for this module; also the path segment its routes are nested under
    fn name(&self) -> &'static str;

    /// Called once during startup before the server accepts requests
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Return the Axum router for this module's routes
    /// Routes will be mounted under `/{module_name}`
    fn routes(&self) -> Router {
        Router::new()
    }

    /// Return OpenAPI path and schema fragments for this module as JSON
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Release resources held by the module
    /// Called after the server has drained in-flight requests
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
