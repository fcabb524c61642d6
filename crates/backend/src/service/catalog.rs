use crate::{
    abstract_trait::{CatalogServiceTrait, DynCatalogRepository},
    domain::{
        CatalogKind,
        requests::{CatalogItemRequest, FindAllCatalog},
        responses::{ApiResponse, ApiResponsePagination, CatalogItemResponse, Pagination},
    },
    errors::{RepositoryError, ServiceError},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::utils::{Method, Metrics, TracingMetrics};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Materials and fillings share one service; `kind` picks the table.
#[derive(Clone)]
pub struct CatalogService {
    repo: DynCatalogRepository,
    tracing_metrics: TracingMetrics,
}

impl CatalogService {
    pub async fn new(
        repo: DynCatalogRepository,
        metrics: Arc<Mutex<Metrics>>,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        let tracing_metrics =
            TracingMetrics::new("catalog-service", "catalog_service", metrics, registry).await;

        Self {
            repo,
            tracing_metrics,
        }
    }
}

fn attributes(kind: CatalogKind, extra: KeyValue) -> Vec<KeyValue> {
    vec![
        KeyValue::new("component", "catalog"),
        KeyValue::new("catalog.kind", kind.to_string()),
        extra,
    ]
}

#[async_trait]
impl CatalogServiceTrait for CatalogService {
    async fn find_all(
        &self,
        kind: CatalogKind,
        req: &FindAllCatalog,
    ) -> Result<ApiResponsePagination<Vec<CatalogItemResponse>>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "catalog_find_all",
            attributes(kind, KeyValue::new("search", req.search.clone())),
        );

        match self.repo.find_all(kind, req).await {
            Ok((entries, total)) => {
                let message = format!("{kind} catalog retrieved successfully");
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, &message)
                    .await;

                Ok(ApiResponsePagination::success(
                    message,
                    entries.into_iter().map(CatalogItemResponse::from).collect(),
                    Pagination::new(req.page, req.page_size, total),
                ))
            }
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, &e.to_string())
                    .await;
                Err(e.into())
            }
        }
    }

    async fn find_by_id(
        &self,
        kind: CatalogKind,
        id: i32,
    ) -> Result<ApiResponse<CatalogItemResponse>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "catalog_find_by_id",
            attributes(kind, KeyValue::new("catalog.id", id.to_string())),
        );

        match self.repo.find_by_id(kind, id).await {
            Ok(Some(entry)) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Catalog entry retrieved")
                    .await;
                Ok(ApiResponse::success(
                    format!("{kind} retrieved successfully"),
                    CatalogItemResponse::from(entry),
                ))
            }
            Ok(None) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, "Catalog entry not found")
                    .await;
                Err(RepositoryError::NotFound.into())
            }
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, &e.to_string())
                    .await;
                Err(e.into())
            }
        }
    }

    async fn create(
        &self,
        kind: CatalogKind,
        req: &CatalogItemRequest,
    ) -> Result<ApiResponse<CatalogItemResponse>, ServiceError> {
        let method = Method::Post;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "catalog_create",
            attributes(kind, KeyValue::new("catalog.name", req.name.clone())),
        );

        match self.repo.create(kind, req).await {
            Ok(entry) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Catalog entry created")
                    .await;
                Ok(ApiResponse::success(
                    format!("{kind} created successfully"),
                    CatalogItemResponse::from(entry),
                ))
            }
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, &e.to_string())
                    .await;
                Err(e.into())
            }
        }
    }

    async fn update(
        &self,
        kind: CatalogKind,
        id: i32,
        req: &CatalogItemRequest,
    ) -> Result<ApiResponse<CatalogItemResponse>, ServiceError> {
        let method = Method::Put;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "catalog_update",
            attributes(kind, KeyValue::new("catalog.id", id.to_string())),
        );

        match self.repo.update(kind, id, req).await {
            Ok(entry) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Catalog entry updated")
                    .await;
                Ok(ApiResponse::success(
                    format!("{kind} updated successfully"),
                    CatalogItemResponse::from(entry),
                ))
            }
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, &e.to_string())
                    .await;
                Err(e.into())
            }
        }
    }

    async fn delete(&self, kind: CatalogKind, id: i32) -> Result<ApiResponse<()>, ServiceError> {
        let method = Method::Delete;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "catalog_delete",
            attributes(kind, KeyValue::new("catalog.id", id.to_string())),
        );

        match self.repo.delete(kind, id).await {
            Ok(()) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Catalog entry deleted")
                    .await;
                Ok(ApiResponse::success(format!("{kind} deleted successfully"), ()))
            }
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, &e.to_string())
                    .await;
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::HttpError,
        testing::{FakeCatalogRepository, test_metrics},
    };
    use axum::{http::StatusCode, response::IntoResponse};

    async fn service() -> CatalogService {
        let (metrics, registry) = test_metrics();
        CatalogService::new(Arc::new(FakeCatalogRepository::default()), metrics, registry).await
    }

    fn item(name: &str) -> CatalogItemRequest {
        CatalogItemRequest {
            name: name.into(),
            description: None,
        }
    }

    fn search(term: &str) -> FindAllCatalog {
        FindAllCatalog {
            page: 1,
            page_size: 10,
            search: term.into(),
        }
    }

    #[tokio::test]
    async fn materials_and_fillings_are_separate_catalogs() {
        let service = service().await;

        service.create(CatalogKind::Material, &item("Roble")).await.unwrap();
        service.create(CatalogKind::Filling, &item("Panal")).await.unwrap();
        service.create(CatalogKind::Filling, &item("Roble")).await.unwrap();

        let materials = service.find_all(CatalogKind::Material, &search("")).await.unwrap();
        let fillings = service.find_all(CatalogKind::Filling, &search("")).await.unwrap();

        assert_eq!(materials.data.len(), 1);
        assert_eq!(fillings.data.len(), 2);
        assert_eq!(materials.message, "material catalog retrieved successfully");
    }

    #[tokio::test]
    async fn duplicate_names_conflict() {
        let service = service().await;
        service.create(CatalogKind::Material, &item("Roble")).await.unwrap();

        let err = service
            .create(CatalogKind::Material, &item("Roble"))
            .await
            .unwrap_err();

        assert_eq!(
            HttpError::from(err).into_response().status(),
            StatusCode::CONFLICT
        );
    }

    #[tokio::test]
    async fn missing_entries_are_not_found() {
        let service = service().await;
        let created = service.create(CatalogKind::Material, &item("Pino")).await.unwrap();

        assert!(matches!(
            service.find_by_id(CatalogKind::Filling, created.data.id).await,
            Err(ServiceError::Repo(RepositoryError::NotFound))
        ));

        service.delete(CatalogKind::Material, created.data.id).await.unwrap();
        assert!(matches!(
            service.delete(CatalogKind::Material, created.data.id).await,
            Err(ServiceError::Repo(RepositoryError::NotFound))
        ));
    }

    #[tokio::test]
    async fn update_renames_entry() {
        let service = service().await;
        let created = service.create(CatalogKind::Filling, &item("Panal")).await.unwrap();

        let updated = service
            .update(CatalogKind::Filling, created.data.id, &item("Poliestireno"))
            .await
            .unwrap();

        assert_eq!(updated.data.name, "Poliestireno");
        let found = service.find_all(CatalogKind::Filling, &search("Poli")).await.unwrap();
        assert_eq!(found.data.len(), 1);
    }
}
