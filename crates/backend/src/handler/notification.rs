use crate::{
    abstract_trait::DynNotificationService,
    domain::{
        CurrentUser,
        responses::{ApiResponse, NotificationResponse},
    },
    errors::HttpError,
    middleware::jwt::auth_middleware,
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    middleware,
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, put},
};
use std::{convert::Infallible, sync::Arc};
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};
use tracing::warn;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notification",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own and role-wide notifications", body = ApiResponse<Vec<NotificationResponse>>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_notifications(
    Extension(service): Extension<DynNotificationService>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_for(&user).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    tag = "Notification",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked as read", body = ApiResponse<NotificationResponse>),
        (status = 404, description = "Not found or not addressed to the caller")
    )
)]
pub async fn mark_notification_read(
    Extension(service): Extension<DynNotificationService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.mark_read(id, &user).await?;
    Ok((StatusCode::OK, Json(response)))
}

/// Live feed of the caller's notifications as server-sent `notification` events.
#[utoipa::path(
    get,
    path = "/api/notifications/stream",
    tag = "Notification",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Notification events", body = String, content_type = "text/event-stream")
    )
)]
pub async fn notification_stream(
    Extension(service): Extension<DynNotificationService>,
    Extension(user): Extension<CurrentUser>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(service.subscribe()).filter_map(move |message| {
        match message {
            Ok(notification) if notification.is_addressed_to(&user) => Event::default()
                .event("notification")
                .id(notification.id.to_string())
                .json_data(&notification)
                .ok()
                .map(Ok),
            Ok(_) => None,
            Err(lagged) => {
                warn!("⚠️ Notification stream for user {} lagged: {lagged}", user.user_id);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub fn notification_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/notifications", get(get_notifications))
        .route("/api/notifications/stream", get(notification_stream))
        .route("/api/notifications/{id}/read", put(mark_notification_read))
        .route_layer(middleware::from_fn(auth_middleware))
        .layer(Extension(app_state.di_container.notification_service.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
