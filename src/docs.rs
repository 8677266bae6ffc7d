use utoipa::OpenApi;
use crate::{handlers, models};

#[derive(OpenApi)]
#[openapi(
    info(title = "Smart light energy server"),
    paths(
        handlers::get_light,
        handlers::update_light,
        handlers::health_check,
    ),
    components(
        schemas(
            models::LightReport,
            models::UpdateLightRequest,
            models::UpdateLightResponse,
            models::PowerStatus,
            models::HealthResponse,
            models::ErrorBody,
        )
    )
)]
pub struct ApiDoc;
