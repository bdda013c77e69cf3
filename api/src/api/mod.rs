pub mod error;
pub mod stations;

pub use error::{ApiError, ErrorResponse, FieldErrors, MessageResponse, internal_error};

use axum::Router;
use sqlx::PgPool;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Weather Stations API",
        description = "Register weather stations with geographic coordinates and query the nearest one"
    ),
    tags(
        (name = "stations", description = "Station registry and nearest-station lookup"),
        (name = "readings", description = "Sensor readings recorded by stations")
    )
)]
pub struct ApiDoc;

/// Build the HTTP API with its OpenAPI document served at `/apispec.json`
pub fn router(pool: PgPool) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(stations::router())
        .with_state(pool)
        .split_for_parts();

    router.merge(SwaggerUi::new("/swagger-ui").url("/apispec.json", api))
}
