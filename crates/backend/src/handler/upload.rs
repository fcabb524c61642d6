use crate::{
    abstract_trait::DynUploadService,
    domain::{
        CurrentUser,
        responses::{ApiResponse, UploadResponse},
    },
    errors::HttpError,
    middleware::{
        jwt::auth_middleware,
        role::{ADMIN, ensure_role},
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Multipart},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::post,
};
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "Upload",
    security(("bearer_auth" = [])),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored", body = ApiResponse<UploadResponse>),
        (status = 400, description = "Missing, empty, oversized or non-image file"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn upload_image(
    Extension(service): Extension<DynUploadService>,
    Extension(user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| HttpError::BadRequest(format!("Failed to read upload: {e}")))?;

        let response = service
            .store_image(file_name.as_deref(), content_type.as_deref(), &bytes)
            .await?;
        return Ok((StatusCode::CREATED, Json(response)));
    }

    Err(HttpError::BadRequest("Missing 'file' field".into()))
}

pub fn upload_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/upload", post(upload_image))
        .route_layer(middleware::from_fn(auth_middleware))
        .layer(Extension(app_state.di_container.upload_service.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
