use crate::{
    abstract_trait::DynCatalogService,
    domain::{
        CatalogKind, CurrentUser,
        requests::{CatalogItemRequest, FindAllCatalog},
        responses::{ApiResponse, ApiResponsePagination, CatalogItemResponse},
    },
    errors::HttpError,
    middleware::{
        jwt::auth_middleware,
        role::{FACTORY, STAFF, ensure_role},
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
    routing::get,
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

async fn list(
    service: DynCatalogService,
    user: CurrentUser,
    kind: CatalogKind,
    params: FindAllCatalog,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, STAFF)?;
    let response = service.find_all(kind, &params).await?;
    Ok((StatusCode::OK, Json(response)))
}

async fn show(
    service: DynCatalogService,
    user: CurrentUser,
    kind: CatalogKind,
    id: i32,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, STAFF)?;
    let response = service.find_by_id(kind, id).await?;
    Ok((StatusCode::OK, Json(response)))
}

async fn create(
    service: DynCatalogService,
    user: CurrentUser,
    kind: CatalogKind,
    body: CatalogItemRequest,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, FACTORY)?;
    let response = service.create(kind, &body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update(
    service: DynCatalogService,
    user: CurrentUser,
    kind: CatalogKind,
    id: i32,
    body: CatalogItemRequest,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, FACTORY)?;
    let response = service.update(kind, id, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

async fn remove(
    service: DynCatalogService,
    user: CurrentUser,
    kind: CatalogKind,
    id: i32,
) -> Result<impl IntoResponse, HttpError> {
    ensure_role(&user, FACTORY)?;
    let response = service.delete(kind, id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/materials",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(FindAllCatalog),
    responses(
        (status = 200, description = "Door materials", body = ApiResponsePagination<Vec<CatalogItemResponse>>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn get_materials(
    Extension(service): Extension<DynCatalogService>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<FindAllCatalog>,
) -> Result<impl IntoResponse, HttpError> {
    list(service, user, CatalogKind::Material, params).await
}

#[utoipa::path(
    get,
    path = "/api/materials/{id}",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Material ID")),
    responses(
        (status = 200, description = "Material", body = ApiResponse<CatalogItemResponse>),
        (status = 404, description = "Material not found")
    )
)]
pub async fn get_material(
    Extension(service): Extension<DynCatalogService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    show(service, user, CatalogKind::Material, id).await
}

#[utoipa::path(
    post,
    path = "/api/materials",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    request_body = CatalogItemRequest,
    responses(
        (status = 201, description = "Material created", body = ApiResponse<CatalogItemResponse>),
        (status = 409, description = "Name already used")
    )
)]
pub async fn create_material(
    Extension(service): Extension<DynCatalogService>,
    Extension(user): Extension<CurrentUser>,
    SimpleValidatedJson(body): SimpleValidatedJson<CatalogItemRequest>,
) -> Result<impl IntoResponse, HttpError> {
    create(service, user, CatalogKind::Material, body).await
}

#[utoipa::path(
    put,
    path = "/api/materials/{id}",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Material ID")),
    request_body = CatalogItemRequest,
    responses(
        (status = 200, description = "Material updated", body = ApiResponse<CatalogItemResponse>),
        (status = 404, description = "Material not found")
    )
)]
pub async fn update_material(
    Extension(service): Extension<DynCatalogService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    SimpleValidatedJson(body): SimpleValidatedJson<CatalogItemRequest>,
) -> Result<impl IntoResponse, HttpError> {
    update(service, user, CatalogKind::Material, id, body).await
}

#[utoipa::path(
    delete,
    path = "/api/materials/{id}",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Material ID")),
    responses(
        (status = 200, description = "Material deleted", body = ApiResponse<()>),
        (status = 404, description = "Material not found")
    )
)]
pub async fn delete_material(
    Extension(service): Extension<DynCatalogService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    remove(service, user, CatalogKind::Material, id).await
}

#[utoipa::path(
    get,
    path = "/api/fillings",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(FindAllCatalog),
    responses(
        (status = 200, description = "Door fillings", body = ApiResponsePagination<Vec<CatalogItemResponse>>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn get_fillings(
    Extension(service): Extension<DynCatalogService>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<FindAllCatalog>,
) -> Result<impl IntoResponse, HttpError> {
    list(service, user, CatalogKind::Filling, params).await
}

#[utoipa::path(
    get,
    path = "/api/fillings/{id}",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Filling ID")),
    responses(
        (status = 200, description = "Filling", body = ApiResponse<CatalogItemResponse>),
        (status = 404, description = "Filling not found")
    )
)]
pub async fn get_filling(
    Extension(service): Extension<DynCatalogService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    show(service, user, CatalogKind::Filling, id).await
}

#[utoipa::path(
    post,
    path = "/api/fillings",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    request_body = CatalogItemRequest,
    responses(
        (status = 201, description = "Filling created", body = ApiResponse<CatalogItemResponse>),
        (status = 409, description = "Name already used")
    )
)]
pub async fn create_filling(
    Extension(service): Extension<DynCatalogService>,
    Extension(user): Extension<CurrentUser>,
    SimpleValidatedJson(body): SimpleValidatedJson<CatalogItemRequest>,
) -> Result<impl IntoResponse, HttpError> {
    create(service, user, CatalogKind::Filling, body).await
}

#[utoipa::path(
    put,
    path = "/api/fillings/{id}",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Filling ID")),
    request_body = CatalogItemRequest,
    responses(
        (status = 200, description = "Filling updated", body = ApiResponse<CatalogItemResponse>),
        (status = 404, description = "Filling not found")
    )
)]
pub async fn update_filling(
    Extension(service): Extension<DynCatalogService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    SimpleValidatedJson(body): SimpleValidatedJson<CatalogItemRequest>,
) -> Result<impl IntoResponse, HttpError> {
    update(service, user, CatalogKind::Filling, id, body).await
}

#[utoipa::path(
    delete,
    path = "/api/fillings/{id}",
    tag = "Catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Filling ID")),
    responses(
        (status = 200, description = "Filling deleted", body = ApiResponse<()>),
        (status = 404, description = "Filling not found")
    )
)]
pub async fn delete_filling(
    Extension(service): Extension<DynCatalogService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    remove(service, user, CatalogKind::Filling, id).await
}

pub fn catalog_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/materials", get(get_materials).post(create_material))
        .route(
            "/api/materials/{id}",
            get(get_material).put(update_material).delete(delete_material),
        )
        .route("/api/fillings", get(get_fillings).post(create_filling))
        .route(
            "/api/fillings/{id}",
            get(get_filling).put(update_filling).delete(delete_filling),
        )
        .route_layer(middleware::from_fn(auth_middleware))
        .layer(Extension(app_state.di_container.catalog_service.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
