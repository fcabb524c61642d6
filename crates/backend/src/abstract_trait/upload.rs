use crate::{
    domain::responses::{ApiResponse, UploadResponse},
    errors::ServiceError,
};
use async_trait::async_trait;
use std::sync::Arc;

pub type DynUploadService = Arc<dyn UploadServiceTrait + Send + Sync>;

#[async_trait]
pub trait UploadServiceTrait {
    async fn store_image(
        &self,
        original_name: Option<&str>,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<ApiResponse<UploadResponse>, ServiceError>;
}
