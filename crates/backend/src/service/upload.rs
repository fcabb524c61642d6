use crate::{
    abstract_trait::UploadServiceTrait,
    domain::responses::{ApiResponse, UploadResponse},
    errors::ServiceError,
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::utils::{Method, Metrics, TracingMetrics};
use std::{path::PathBuf, sync::Arc};
use tokio::{fs, sync::Mutex};
use tracing::{error, info};
use uuid::Uuid;

/// Public prefix the upload directory is served under.
pub const UPLOADS_ROUTE: &str = "/uploads";

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

#[derive(Clone)]
pub struct UploadService {
    upload_dir: PathBuf,
    max_bytes: usize,
    tracing_metrics: TracingMetrics,
}

impl UploadService {
    pub async fn new(
        upload_dir: PathBuf,
        max_bytes: usize,
        metrics: Arc<Mutex<Metrics>>,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        let tracing_metrics =
            TracingMetrics::new("upload-service", "upload_service", metrics, registry).await;

        Self {
            upload_dir,
            max_bytes,
            tracing_metrics,
        }
    }

    async fn write(
        &self,
        original_name: Option<&str>,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<UploadResponse, ServiceError> {
        if bytes.is_empty() {
            return Err(ServiceError::Validation(vec!["file: is empty".into()]));
        }
        if bytes.len() > self.max_bytes {
            return Err(ServiceError::Validation(vec![format!(
                "file: {} bytes exceeds the {} byte limit",
                bytes.len(),
                self.max_bytes
            )]));
        }

        let extension = image_extension(original_name, content_type).ok_or_else(|| {
            ServiceError::Validation(vec!["file: only jpg, png, webp and gif images are accepted".into()])
        })?;

        let filename = format!("{}.{extension}", Uuid::new_v4());

        fs::create_dir_all(&self.upload_dir).await.map_err(|e| {
            error!("❌ Cannot create upload dir {}: {e}", self.upload_dir.display());
            ServiceError::Internal("upload storage unavailable".into())
        })?;
        fs::write(self.upload_dir.join(&filename), bytes)
            .await
            .map_err(|e| {
                error!("❌ Failed to write upload {filename}: {e}");
                ServiceError::Internal("failed to store upload".into())
            })?;

        info!("🖼️ Stored upload {filename} ({} bytes)", bytes.len());

        Ok(UploadResponse {
            url: format!("{UPLOADS_ROUTE}/{filename}"),
            filename,
            size: bytes.len(),
        })
    }
}

/// Picks the stored extension: the client's, when it is an allowed image one, else the
/// content type's. Anything that is not an image is refused.
fn image_extension(original_name: Option<&str>, content_type: Option<&str>) -> Option<&'static str> {
    let declared = content_type.map(str::to_ascii_lowercase);
    if declared
        .as_deref()
        .is_some_and(|ct| !ct.starts_with("image/"))
    {
        return None;
    }

    let from_name = original_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .and_then(|ext| ALLOWED_EXTENSIONS.into_iter().find(|allowed| *allowed == ext));

    from_name.or_else(|| match declared.as_deref()? {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    })
}

#[async_trait]
impl UploadServiceTrait for UploadService {
    async fn store_image(
        &self,
        original_name: Option<&str>,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<ApiResponse<UploadResponse>, ServiceError> {
        let method = Method::Post;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "upload_store_image",
            vec![
                KeyValue::new("component", "upload"),
                KeyValue::new("size", bytes.len().to_string()),
                KeyValue::new("content_type", content_type.unwrap_or("unknown").to_string()),
            ],
        );

        match self.write(original_name, content_type, bytes).await {
            Ok(stored) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Image stored")
                    .await;
                Ok(ApiResponse::success("Image uploaded successfully", stored))
            }
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, &e.to_string())
                    .await;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_metrics;

    async fn service(max_bytes: usize) -> (UploadService, PathBuf) {
        let dir = std::env::temp_dir().join(format!("mundopuertas-uploads-{}", Uuid::new_v4()));
        let (metrics, registry) = test_metrics();
        (
            UploadService::new(dir.clone(), max_bytes, metrics, registry).await,
            dir,
        )
    }

    #[test]
    fn extension_comes_from_name_or_content_type() {
        assert_eq!(image_extension(Some("puerta.PNG"), Some("image/png")), Some("png"));
        assert_eq!(image_extension(Some("blob"), Some("image/jpeg")), Some("jpg"));
        assert_eq!(image_extension(Some("foto.webp"), None), Some("webp"));
        assert_eq!(image_extension(Some("script.sh"), Some("image/png")), Some("png"));
        assert_eq!(image_extension(Some("doc.pdf"), Some("application/pdf")), None);
        assert_eq!(image_extension(Some("puerta.png"), Some("text/html")), None);
        assert_eq!(image_extension(None, None), None);
    }

    #[tokio::test]
    async fn stores_image_under_a_fresh_name() {
        let (service, dir) = service(1024).await;

        let stored = service
            .store_image(Some("puerta.jpg"), Some("image/jpeg"), b"\xFF\xD8\xFFdata")
            .await
            .unwrap()
            .data;

        assert!(stored.filename.ends_with(".jpg"));
        assert_eq!(stored.url, format!("/uploads/{}", stored.filename));
        assert_eq!(stored.size, 7);
        assert_eq!(
            fs::read(dir.join(&stored.filename)).await.unwrap(),
            b"\xFF\xD8\xFFdata"
        );

        let _ = fs::remove_dir_all(dir).await;
    }

    #[tokio::test]
    async fn rejects_oversized_empty_and_non_image_files() {
        let (service, _) = service(4).await;

        for (name, ct, bytes) in [
            (Some("a.png"), Some("image/png"), &b"12345"[..]),
            (Some("a.png"), Some("image/png"), &b""[..]),
            (Some("a.txt"), Some("text/plain"), &b"hi"[..]),
        ] {
            let err = service.store_image(name, ct, bytes).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
        }
    }
}
