use crate::{
    abstract_trait::DynSaleService,
    domain::{
        CurrentUser,
        requests::{CheckoutRequest, FindAllSales, PaymentWebhookRequest},
        responses::{ApiResponse, ApiResponsePagination, SaleResponse, SaleWithItemsResponse},
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
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

#[utoipa::path(
    post,
    path = "/api/checkout",
    tag = "Checkout",
    security(("bearer_auth" = [])),
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Sale created, payment pending", body = ApiResponse<SaleWithItemsResponse>),
        (status = 400, description = "Insufficient product stock"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn checkout_handler(
    Extension(service): Extension<DynSaleService>,
    Extension(user): Extension<CurrentUser>,
    SimpleValidatedJson(body): SimpleValidatedJson<CheckoutRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.checkout(&body, Some(user.user_id)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/checkout/webhook",
    tag = "Checkout",
    params(("x-webhook-secret" = String, Header, description = "Shared webhook secret")),
    request_body = PaymentWebhookRequest,
    responses(
        (status = 200, description = "Notification applied", body = ApiResponse<SaleResponse>),
        (status = 401, description = "Bad webhook secret"),
        (status = 404, description = "Sale not found")
    )
)]
pub async fn payment_webhook_handler(
    Extension(service): Extension<DynSaleService>,
    headers: HeaderMap,
    SimpleValidatedJson(body): SimpleValidatedJson<PaymentWebhookRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let secret = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());

    let response = service.handle_webhook(secret, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "Sale",
    security(("bearer_auth" = [])),
    params(FindAllSales),
    responses(
        (status = 200, description = "Storefront sales", body = ApiResponsePagination<Vec<SaleResponse>>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn get_sales(
    Extension(service): Extension<DynSaleService>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<FindAllSales>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    let response = service.find_all(&params).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    tag = "Sale",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Sale ID")),
    responses(
        (status = 200, description = "Sale with its lines", body = ApiResponse<SaleWithItemsResponse>),
        (status = 404, description = "Sale not found")
    )
)]
pub async fn get_sale(
    Extension(service): Extension<DynSaleService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    let response = service.find_by_id(id).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn checkout_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    let webhook =
        OpenApiRouter::new().route("/api/checkout/webhook", post(payment_webhook_handler));

    let private = OpenApiRouter::new()
        .route("/api/checkout", post(checkout_handler))
        .route("/api/sales", get(get_sales))
        .route("/api/sales/{id}", get(get_sale))
        .route_layer(middleware::from_fn(auth_middleware));

    webhook
        .merge(private)
        .layer(Extension(app_state.di_container.sale_service.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
