mod auth;
mod catalog;
mod checkout;
mod dashboard;
mod notification;
mod order;
mod product;
mod quote;
mod upload;
mod user;
mod warehouse;

use crate::{service::UPLOADS_ROUTE, state::AppState};
use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
    routing::get,
};
use prometheus_client::encoding::text::encode;
use shared::utils::shutdown_signal;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

pub use self::auth::auth_routes;
pub use self::catalog::catalog_routes;
pub use self::checkout::checkout_routes;
pub use self::dashboard::dashboard_routes;
pub use self::notification::notification_routes;
pub use self::order::order_routes;
pub use self::product::product_routes;
pub use self::quote::quote_routes;
pub use self::upload::upload_routes;
pub use self::user::user_routes;
pub use self::warehouse::warehouse_routes;

#[derive(OpenApi)]
#[openapi(
    info(title = "MundoPuertas API", description = "Terplac door factory and storefront backend"),
    paths(
        auth::register_user_handler,
        auth::login_user_handler,
        auth::refresh_token_handler,
        auth::logout_handler,
        auth::get_me_handler,

        user::get_users,
        user::get_active_users,
        user::get_trashed_users,
        user::get_user,
        user::create_user,
        user::update_user,
        user::update_user_role,
        user::trash_user_handler,
        user::restore_user_handler,
        user::delete_user,

        catalog::get_materials,
        catalog::get_material,
        catalog::create_material,
        catalog::update_material,
        catalog::delete_material,
        catalog::get_fillings,
        catalog::get_filling,
        catalog::create_filling,
        catalog::update_filling,
        catalog::delete_filling,

        product::get_products,
        product::get_featured_products,
        product::get_product,
        product::get_trashed_products,
        product::create_product,
        product::update_product,
        product::set_featured_product,
        product::trash_product_handler,
        product::restore_product_handler,
        product::delete_product,

        warehouse::get_warehouse_items,
        warehouse::get_warehouse_item,
        warehouse::assemble_handler,
        warehouse::register_purchase_handler,
        warehouse::get_purchases,

        order::get_orders,
        order::get_order,
        order::create_order,
        order::update_order_status,

        quote::create_quote,
        quote::get_quotes,
        quote::get_quote,
        quote::set_quote_price,
        quote::decide_quote,

        checkout::checkout_handler,
        checkout::payment_webhook_handler,
        checkout::get_sales,
        checkout::get_sale,

        notification::get_notifications,
        notification::mark_notification_read,
        notification::notification_stream,

        upload::upload_image,

        dashboard::get_dashboard,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Authentication endpoints"),
        (name = "User", description = "User administration"),
        (name = "Catalog", description = "Door materials and fillings"),
        (name = "Product", description = "Storefront products"),
        (name = "Warehouse", description = "Factory stock, assembly and purchases"),
        (name = "Order", description = "Factory to store dispatch orders"),
        (name = "Quote", description = "Custom door quotes"),
        (name = "Checkout", description = "Storefront checkout and payment webhook"),
        (name = "Sale", description = "Storefront sales"),
        (name = "Notification", description = "In-app notifications"),
        (name = "Upload", description = "Image uploads"),
        (name = "Admin", description = "Administration dashboard"),
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut buffer = String::new();
    let registry = state.registry.lock().await;

    if let Err(e) = encode(&mut buffer, &registry) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}"),
        );
    }

    (
        StatusCode::OK,
        [(
            CONTENT_TYPE,
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        buffer,
    )
}

pub struct AppRouter;

impl AppRouter {
    pub fn build(app_state: AppState) -> Router {
        let shared_state = Arc::new(app_state);

        let api_router = OpenApiRouter::with_openapi(ApiDoc::openapi())
            .route("/metrics", get(metrics_handler))
            .with_state(shared_state.clone())
            .merge(auth_routes(shared_state.clone()))
            .merge(user_routes(shared_state.clone()))
            .merge(catalog_routes(shared_state.clone()))
            .merge(product_routes(shared_state.clone()))
            .merge(warehouse_routes(shared_state.clone()))
            .merge(order_routes(shared_state.clone()))
            .merge(quote_routes(shared_state.clone()))
            .merge(checkout_routes(shared_state.clone()))
            .merge(notification_routes(shared_state.clone()))
            .merge(upload_routes(shared_state.clone()))
            .merge(dashboard_routes(shared_state.clone()));

        let (app_router, api) = api_router.split_for_parts();

        app_router
            .nest_service(UPLOADS_ROUTE, ServeDir::new(&shared_state.upload_dir))
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(shared_state.body_limit))
            .layer(TraceLayer::new_for_http())
    }

    pub async fn serve(port: u16, app_state: AppState) -> Result<()> {
        let app = Self::build(app_state);

        let addr = format!("0.0.0.0:{port}");
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        info!("🚀 Server running on http://{}", listener.local_addr()?);
        info!("📖 Swagger UI: http://localhost:{port}/swagger-ui");
        info!("📊 Metrics: http://localhost:{port}/metrics");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server failed")?;

        Ok(())
    }
}
