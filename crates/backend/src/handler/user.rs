use crate::{
    abstract_trait::{DynUserCommandService, DynUserQueryService},
    domain::{
        CurrentUser,
        requests::{
            CreateUserRequest, FindAllUsers, RecordScope, UpdateUserRequest,
            UpdateUserRoleRequest,
        },
        responses::{ApiResponse, ApiResponsePagination, UserResponse, UserResponseDeleteAt},
    },
    errors::HttpError,
    middleware::{
        jwt::auth_middleware,
        role::{ADMIN, ensure_role},
        validate::SimpleValidatedJson,
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

async fn list(
    service: DynUserQueryService,
    user: CurrentUser,
    params: FindAllUsers,
    scope: RecordScope,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    let response = service.find_all(&params, scope).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "User",
    security(("bearer_auth" = [])),
    params(FindAllUsers),
    responses(
        (status = 200, description = "All users", body = ApiResponsePagination<Vec<UserResponse>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn get_users(
    Extension(service): Extension<DynUserQueryService>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<FindAllUsers>,
) -> Result<impl IntoResponse, HttpError> {
    list(service, user, params, RecordScope::All).await
}

#[utoipa::path(
    get,
    path = "/api/users/active",
    tag = "User",
    security(("bearer_auth" = [])),
    params(FindAllUsers),
    responses(
        (status = 200, description = "Active users", body = ApiResponsePagination<Vec<UserResponse>>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn get_active_users(
    Extension(service): Extension<DynUserQueryService>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<FindAllUsers>,
) -> Result<impl IntoResponse, HttpError> {
    list(service, user, params, RecordScope::Active).await
}

#[utoipa::path(
    get,
    path = "/api/users/trashed",
    tag = "User",
    security(("bearer_auth" = [])),
    params(FindAllUsers),
    responses(
        (status = 200, description = "Soft-deleted users", body = ApiResponsePagination<Vec<UserResponse>>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn get_trashed_users(
    Extension(service): Extension<DynUserQueryService>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<FindAllUsers>,
) -> Result<impl IntoResponse, HttpError> {
    list(service, user, params, RecordScope::Trashed).await
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "User",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    Extension(service): Extension<DynUserQueryService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    let response = service.find_by_id(id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "User",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponse>),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn create_user(
    Extension(service): Extension<DynUserCommandService>,
    Extension(user): Extension<CurrentUser>,
    SimpleValidatedJson(body): SimpleValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    let response = service.create(&body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "User",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    Extension(service): Extension<DynUserCommandService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    SimpleValidatedJson(mut body): SimpleValidatedJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    body.user_id = id;
    let response = service.update(&body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}/role",
    tag = "User",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRoleRequest,
    responses(
        (status = 200, description = "Role changed", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user_role(
    Extension(service): Extension<DynUserCommandService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    SimpleValidatedJson(body): SimpleValidatedJson<UpdateUserRoleRequest>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    let response = service.update_role(id, body.role).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/users/trash/{id}",
    tag = "User",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User moved to trash", body = ApiResponse<UserResponseDeleteAt>),
        (status = 404, description = "User not found")
    )
)]
pub async fn trash_user_handler(
    Extension(service): Extension<DynUserCommandService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    let response = service.trash(id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/users/restore/{id}",
    tag = "User",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User restored", body = ApiResponse<UserResponseDeleteAt>),
        (status = 404, description = "User not found in trash")
    )
)]
pub async fn restore_user_handler(
    Extension(service): Extension<DynUserCommandService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    let response = service.restore(id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/users/delete/{id}",
    tag = "User",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted permanently", body = ApiResponse<()>),
        (status = 404, description = "User not found in trash")
    )
)]
pub async fn delete_user(
    Extension(service): Extension<DynUserCommandService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    let response = service.delete_permanent(id).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn user_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/users", get(get_users))
        .route("/api/users/active", get(get_active_users))
        .route("/api/users/trashed", get(get_trashed_users))
        .route("/api/users/{id}", get(get_user))
        .route("/api/users", post(create_user))
        .route("/api/users/{id}", put(update_user))
        .route("/api/users/{id}/role", put(update_user_role))
        .route("/api/users/trash/{id}", delete(trash_user_handler))
        .route("/api/users/restore/{id}", put(restore_user_handler))
        .route("/api/users/delete/{id}", delete(delete_user))
        .route_layer(middleware::from_fn(auth_middleware))
        .layer(Extension(app_state.di_container.user_query.clone()))
        .layer(Extension(app_state.di_container.user_command.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
