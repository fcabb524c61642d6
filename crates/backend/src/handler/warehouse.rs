use crate::{
    abstract_trait::DynWarehouseService,
    domain::{
        CurrentUser,
        requests::{AssembleRequest, FindAllPurchases, FindAllWarehouse, PurchaseRequest},
        responses::{
            ApiResponse, ApiResponsePagination, AssemblyResponse, PurchaseResponse,
            PurchaseResultResponse, WarehouseItemResponse,
        },
    },
    errors::HttpError,
    middleware::{
        jwt::auth_middleware,
        role::{FACTORY, ensure_role},
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
    routing::{get, post},
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/warehouse",
    tag = "Warehouse",
    security(("bearer_auth" = [])),
    params(FindAllWarehouse),
    responses(
        (status = 200, description = "Stock rows", body = ApiResponsePagination<Vec<WarehouseItemResponse>>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn get_warehouse_items(
    Extension(service): Extension<DynWarehouseService>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<FindAllWarehouse>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, FACTORY)?;
    let response = service.find_all(&params).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/warehouse/{id}",
    tag = "Warehouse",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Warehouse row ID")),
    responses(
        (status = 200, description = "Stock row", body = ApiResponse<WarehouseItemResponse>),
        (status = 404, description = "Row not found")
    )
)]
pub async fn get_warehouse_item(
    Extension(service): Extension<DynWarehouseService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, FACTORY)?;
    let response = service.find_by_id(id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/warehouse/assemble",
    tag = "Warehouse",
    security(("bearer_auth" = [])),
    request_body = AssembleRequest,
    responses(
        (status = 200, description = "Doors assembled", body = ApiResponse<AssemblyResponse>),
        (status = 400, description = "Insufficient stock or incomplete composition"),
        (status = 404, description = "Product or stock row not found")
    )
)]
pub async fn assemble_handler(
    Extension(service): Extension<DynWarehouseService>,
    Extension(user): Extension<CurrentUser>,
    SimpleValidatedJson(body): SimpleValidatedJson<AssembleRequest>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, FACTORY)?;
    let response = service.assemble(&body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/warehouse/purchases",
    tag = "Warehouse",
    security(("bearer_auth" = [])),
    request_body = PurchaseRequest,
    responses(
        (status = 201, description = "Purchase registered", body = ApiResponse<PurchaseResultResponse>),
        (status = 404, description = "Item not in the catalog")
    )
)]
pub async fn register_purchase_handler(
    Extension(service): Extension<DynWarehouseService>,
    Extension(user): Extension<CurrentUser>,
    SimpleValidatedJson(body): SimpleValidatedJson<PurchaseRequest>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, FACTORY)?;
    let response = service.register_purchase(&body, Some(user.user_id)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/warehouse/purchases",
    tag = "Warehouse",
    security(("bearer_auth" = [])),
    params(FindAllPurchases),
    responses(
        (status = 200, description = "Purchase history", body = ApiResponsePagination<Vec<PurchaseResponse>>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn get_purchases(
    Extension(service): Extension<DynWarehouseService>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<FindAllPurchases>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, FACTORY)?;
    let response = service.find_purchases(&params).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn warehouse_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/warehouse", get(get_warehouse_items))
        .route("/api/warehouse/{id}", get(get_warehouse_item))
        .route("/api/warehouse/assemble", post(assemble_handler))
        .route(
            "/api/warehouse/purchases",
            get(get_purchases).post(register_purchase_handler),
        )
        .route_layer(middleware::from_fn(auth_middleware))
        .layer(Extension(app_state.di_container.warehouse_service.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
