use crate::{
    abstract_trait::DynQuoteService,
    domain::{
        CurrentUser,
        requests::{CreateQuoteRequest, FindAllQuotes, QuoteDecisionRequest, QuotePriceRequest},
        responses::{ApiResponse, ApiResponsePagination, QuoteResponse},
    },
    errors::HttpError,
    middleware::{
        jwt::{auth_middleware, optional_auth_middleware},
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
    routing::{get, post, put},
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    post,
    path = "/api/quotes",
    tag = "Quote",
    request_body = CreateQuoteRequest,
    responses(
        (status = 201, description = "Quote request received", body = ApiResponse<QuoteResponse>),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_quote(
    Extension(service): Extension<DynQuoteService>,
    user: Option<Extension<CurrentUser>>,
    SimpleValidatedJson(body): SimpleValidatedJson<CreateQuoteRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = user.map(|Extension(u)| u.user_id);
    let response = service.create(&body, user_id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/quotes",
    tag = "Quote",
    security(("bearer_auth" = [])),
    params(FindAllQuotes),
    responses(
        (status = 200, description = "Quote requests", body = ApiResponsePagination<Vec<QuoteResponse>>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn get_quotes(
    Extension(service): Extension<DynQuoteService>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<FindAllQuotes>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    let response = service.find_all(&params).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/quotes/{id}",
    tag = "Quote",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Quote request", body = ApiResponse<QuoteResponse>),
        (status = 404, description = "Quote not found")
    )
)]
pub async fn get_quote(
    Extension(service): Extension<DynQuoteService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    let response = service.find_by_id(id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/quotes/{id}/price",
    tag = "Quote",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quote ID")),
    request_body = QuotePriceRequest,
    responses(
        (status = 200, description = "Price quoted", body = ApiResponse<QuoteResponse>),
        (status = 409, description = "Quote already decided")
    )
)]
pub async fn set_quote_price(
    Extension(service): Extension<DynQuoteService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    SimpleValidatedJson(body): SimpleValidatedJson<QuotePriceRequest>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    let response = service.set_price(id, body.quoted_price).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/quotes/{id}/status",
    tag = "Quote",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Quote ID")),
    request_body = QuoteDecisionRequest,
    responses(
        (status = 200, description = "Quote decided", body = ApiResponse<QuoteResponse>),
        (status = 400, description = "Status is not a decision"),
        (status = 409, description = "Illegal transition")
    )
)]
pub async fn decide_quote(
    Extension(service): Extension<DynQuoteService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    SimpleValidatedJson(body): SimpleValidatedJson<QuoteDecisionRequest>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    let response = service.decide(id, body.status).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn quote_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    let intake = OpenApiRouter::new()
        .route("/api/quotes", post(create_quote))
        .route_layer(middleware::from_fn(optional_auth_middleware));

    let admin = OpenApiRouter::new()
        .route("/api/quotes", get(get_quotes))
        .route("/api/quotes/{id}", get(get_quote))
        .route("/api/quotes/{id}/price", put(set_quote_price))
        .route("/api/quotes/{id}/status", put(decide_quote))
        .route_layer(middleware::from_fn(auth_middleware));

    intake
        .merge(admin)
        .layer(Extension(app_state.di_container.quote_service.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
