use crate::{
    abstract_trait::DynAuthService,
    domain::{
        CurrentUser,
        requests::{LoginRequest, RefreshTokenRequest, RegisterRequest},
        responses::{ApiResponse, TokenResponse, UserResponse},
    },
    errors::HttpError,
    middleware::{jwt::auth_middleware, validate::SimpleValidatedJson},
    state::AppState,
};
use axum::{
    Extension, Json,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

fn token_cookie(access_token: String) -> Cookie<'static> {
    Cookie::build(("token", access_token))
        .path("/")
        .http_only(true)
        .build()
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<UserResponse>),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Auth"
)]
pub async fn register_user_handler(
    Extension(service): Extension<DynAuthService>,
    SimpleValidatedJson(body): SimpleValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.register(&body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<TokenResponse>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login_user_handler(
    Extension(service): Extension<DynAuthService>,
    jar: CookieJar,
    SimpleValidatedJson(body): SimpleValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.login(&body).await?;
    let jar = jar.add(token_cookie(response.data.access_token.clone()));
    Ok((StatusCode::OK, jar, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Token refreshed", body = ApiResponse<TokenResponse>),
        (status = 401, description = "Invalid or expired refresh token")
    ),
    tag = "Auth"
)]
pub async fn refresh_token_handler(
    Extension(service): Extension<DynAuthService>,
    jar: CookieJar,
    SimpleValidatedJson(body): SimpleValidatedJson<RefreshTokenRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.refresh_token(&body.refresh_token).await?;
    let jar = jar.add(token_cookie(response.data.access_token.clone()));
    Ok((StatusCode::OK, jar, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<()>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout_handler(
    Extension(service): Extension<DynAuthService>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.logout(user.user_id).await?;
    let jar = jar.remove(Cookie::build("token").path("/"));
    Ok((StatusCode::OK, jar, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn get_me_handler(
    Extension(service): Extension<DynAuthService>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.get_me(user.user_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn auth_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    let public = OpenApiRouter::new()
        .route("/api/auth/register", post(register_user_handler))
        .route("/api/auth/login", post(login_user_handler))
        .route("/api/auth/refresh", post(refresh_token_handler));

    let private = OpenApiRouter::new()
        .route("/api/auth/logout", post(logout_handler))
        .route("/api/auth/me", get(get_me_handler))
        .route_layer(middleware::from_fn(auth_middleware));

    public
        .merge(private)
        .layer(Extension(app_state.di_container.auth_service.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
