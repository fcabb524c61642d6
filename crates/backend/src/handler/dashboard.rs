use crate::{
    abstract_trait::DynDashboardService,
    domain::{
        CurrentUser,
        responses::{ApiResponse, DashboardResponse},
    },
    errors::HttpError,
    middleware::{
        jwt::auth_middleware,
        role::{ADMIN, ensure_role},
    },
    state::AppState,
};
use axum::{
    Json, extract::Extension, http::StatusCode, middleware, response::IntoResponse, routing::get,
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Business summary", body = ApiResponse<DashboardResponse>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn get_dashboard(
    Extension(service): Extension<DynDashboardService>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    let response = service.summary().await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn dashboard_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/admin/dashboard", get(get_dashboard))
        .route_layer(middleware::from_fn(auth_middleware))
        .layer(Extension(app_state.di_container.dashboard_service.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
