use crate::{
    abstract_trait::DynOrderService,
    domain::{
        CurrentUser,
        requests::{CreateOrderRequest, FindAllOrders, UpdateOrderStatusRequest},
        responses::{ApiResponse, ApiResponsePagination, OrderResponse},
    },
    errors::HttpError,
    middleware::{
        jwt::auth_middleware,
        role::{STAFF, STORE, ensure_role},
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
    routing::{get, put},
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Order",
    security(("bearer_auth" = [])),
    params(FindAllOrders),
    responses(
        (status = 200, description = "Dispatch orders", body = ApiResponsePagination<Vec<OrderResponse>>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn get_orders(
    Extension(service): Extension<DynOrderService>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<FindAllOrders>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, STAFF)?;
    let response = service.find_all(&params).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Order",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = ApiResponse<OrderResponse>),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    Extension(service): Extension<DynOrderService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, STAFF)?;
    let response = service.find_by_id(id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Order",
    security(("bearer_auth" = [])),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<OrderResponse>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn create_order(
    Extension(service): Extension<DynOrderService>,
    Extension(user): Extension<CurrentUser>,
    SimpleValidatedJson(body): SimpleValidatedJson<CreateOrderRequest>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, STORE)?;
    let response = service.create(&body, &user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    tag = "Order",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<OrderResponse>),
        (status = 403, description = "Role may not apply this transition"),
        (status = 409, description = "Illegal transition")
    )
)]
pub async fn update_order_status(
    Extension(service): Extension<DynOrderService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    SimpleValidatedJson(body): SimpleValidatedJson<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, STAFF)?;
    let response = service.update_status(id, body.status, &user).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn order_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/orders", get(get_orders).post(create_order))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/status", put(update_order_status))
        .route_layer(middleware::from_fn(auth_middleware))
        .layer(Extension(app_state.di_container.order_service.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
