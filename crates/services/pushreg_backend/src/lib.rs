//! Server wiring for the push token registry.

pub mod app_state;
pub mod error;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use app_state::AppState;
pub use error::BackendError;

/// Builds the full application router.
///
/// With the `openapi` feature the Swagger UI is served at `/docs`.
pub fn build_app(state: &AppState) -> Router {
    #[allow(unused_mut)] // mutated only with the openapi feature
    let mut app = pushreg_registry::routes(state.registry.clone());

    #[cfg(feature = "openapi")]
    {
        use pushreg_registry::openapi::RegistryApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        tracing::info!("Adding Swagger UI at /docs");
        app = app.merge(SwaggerUi::new("/docs").url("/docs/openapi.json", RegistryApiDoc::openapi()));
    }

    app.layer(TraceLayer::new_for_http())
}
