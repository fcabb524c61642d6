use crate::{
    domain::{
        Role,
        requests::{CreateUserRequest, FindAllUsers, RecordScope, UpdateUserRequest},
        responses::{ApiResponse, ApiResponsePagination, UserResponse, UserResponseDeleteAt},
    },
    errors::{RepositoryError, ServiceError},
    model::User,
};
use async_trait::async_trait;
use std::sync::Arc;

pub type DynUserQueryRepository = Arc<dyn UserQueryRepositoryTrait + Send + Sync>;
pub type DynUserCommandRepository = Arc<dyn UserCommandRepositoryTrait + Send + Sync>;
pub type DynUserQueryService = Arc<dyn UserQueryServiceTrait + Send + Sync>;
pub type DynUserCommandService = Arc<dyn UserCommandServiceTrait + Send + Sync>;

/// Insert payload; `password` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub store_name: Option<String>,
}

#[async_trait]
pub trait UserQueryRepositoryTrait {
    async fn find_all(
        &self,
        req: &FindAllUsers,
        scope: RecordScope,
    ) -> Result<(Vec<User>, i64), RepositoryError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepositoryError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
}

#[async_trait]
pub trait UserCommandRepositoryTrait {
    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError>;
    /// `password` is the new hash, `None` keeps the stored one.
    async fn update(
        &self,
        req: &UpdateUserRequest,
        password: Option<String>,
    ) -> Result<User, RepositoryError>;
    async fn update_role(&self, id: i32, role: Role) -> Result<User, RepositoryError>;
    async fn trash(&self, id: i32) -> Result<User, RepositoryError>;
    async fn restore(&self, id: i32) -> Result<User, RepositoryError>;
    async fn delete_permanent(&self, id: i32) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait UserQueryServiceTrait {
    async fn find_all(
        &self,
        req: &FindAllUsers,
        scope: RecordScope,
    ) -> Result<ApiResponsePagination<Vec<UserResponse>>, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<UserResponse>, ServiceError>;
}

#[async_trait]
pub trait UserCommandServiceTrait {
    async fn create(&self, req: &CreateUserRequest)
    -> Result<ApiResponse<UserResponse>, ServiceError>;
    async fn update(&self, req: &UpdateUserRequest)
    -> Result<ApiResponse<UserResponse>, ServiceError>;
    async fn update_role(
        &self,
        id: i32,
        role: Role,
    ) -> Result<ApiResponse<UserResponse>, ServiceError>;
    async fn trash(&self, id: i32) -> Result<ApiResponse<UserResponseDeleteAt>, ServiceError>;
    async fn restore(&self, id: i32) -> Result<ApiResponse<UserResponseDeleteAt>, ServiceError>;
    async fn delete_permanent(&self, id: i32) -> Result<ApiResponse<()>, ServiceError>;
}
