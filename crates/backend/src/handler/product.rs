use crate::{
    abstract_trait::{DynProductCommandService, DynProductQueryService},
    domain::{
        CurrentUser,
        requests::{
            CreateProductRequest, FindAllProducts, RecordScope, UpdateFeaturedRequest,
            UpdateProductRequest,
        },
        responses::{
            ApiResponse, ApiResponsePagination, ProductResponse, ProductResponseDeleteAt,
        },
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

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Product",
    params(FindAllProducts),
    responses(
        (status = 200, description = "Products on sale", body = ApiResponsePagination<Vec<ProductResponse>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_products(
    Extension(service): Extension<DynProductQueryService>,
    Query(params): Query<FindAllProducts>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_all(&params, RecordScope::Active).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/products/featured",
    tag = "Product",
    responses(
        (status = 200, description = "Featured products", body = ApiResponse<Vec<ProductResponse>>)
    )
)]
pub async fn get_featured_products(
    Extension(service): Extension<DynProductQueryService>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_featured().await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Product",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product details", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    Extension(service): Extension<DynProductQueryService>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_by_id(id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/products/trashed",
    tag = "Product",
    security(("bearer_auth" = [])),
    params(FindAllProducts),
    responses(
        (status = 200, description = "Soft-deleted products", body = ApiResponsePagination<Vec<ProductResponse>>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn get_trashed_products(
    Extension(service): Extension<DynProductQueryService>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<FindAllProducts>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    let response = service.find_all(&params, RecordScope::Trashed).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Product",
    security(("bearer_auth" = [])),
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn create_product(
    Extension(service): Extension<DynProductCommandService>,
    Extension(user): Extension<CurrentUser>,
    SimpleValidatedJson(body): SimpleValidatedJson<CreateProductRequest>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    let response = service.create(&body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Product",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found")
    )
)]
pub async fn update_product(
    Extension(service): Extension<DynProductCommandService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    SimpleValidatedJson(mut body): SimpleValidatedJson<UpdateProductRequest>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    body.id = id;
    let response = service.update(&body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}/featured",
    tag = "Product",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Product ID")),
    request_body = UpdateFeaturedRequest,
    responses(
        (status = 200, description = "Featured flag updated", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found")
    )
)]
pub async fn set_featured_product(
    Extension(service): Extension<DynProductCommandService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    SimpleValidatedJson(body): SimpleValidatedJson<UpdateFeaturedRequest>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    let response = service.set_featured(id, body.featured).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/products/trash/{id}",
    tag = "Product",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product moved to trash", body = ApiResponse<ProductResponseDeleteAt>),
        (status = 404, description = "Product not found")
    )
)]
pub async fn trash_product_handler(
    Extension(service): Extension<DynProductCommandService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    let response = service.trash(id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/products/restore/{id}",
    tag = "Product",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product restored", body = ApiResponse<ProductResponseDeleteAt>),
        (status = 404, description = "Product not found in trash")
    )
)]
pub async fn restore_product_handler(
    Extension(service): Extension<DynProductCommandService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    let response = service.restore(id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/products/delete/{id}",
    tag = "Product",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted permanently", body = ApiResponse<()>),
        (status = 404, description = "Product not found in trash")
    )
)]
pub async fn delete_product(
    Extension(service): Extension<DynProductCommandService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, ADMIN)?;
    let response = service.delete_permanent(id).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn product_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    let storefront = OpenApiRouter::new()
        .route("/api/products", get(get_products))
        .route("/api/products/featured", get(get_featured_products))
        .route("/api/products/{id}", get(get_product));

    let admin = OpenApiRouter::new()
        .route("/api/products/trashed", get(get_trashed_products))
        .route("/api/products", post(create_product))
        .route("/api/products/{id}", put(update_product))
        .route("/api/products/{id}/featured", put(set_featured_product))
        .route("/api/products/trash/{id}", delete(trash_product_handler))
        .route("/api/products/restore/{id}", put(restore_product_handler))
        .route("/api/products/delete/{id}", delete(delete_product))
        .route_layer(middleware::from_fn(auth_middleware));

    storefront
        .merge(admin)
        .layer(Extension(app_state.di_container.product_query.clone()))
        .layer(Extension(app_state.di_container.product_command.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
