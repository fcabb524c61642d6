use crate::{
    abstract_trait::{
        DynHashing, DynUserCommandRepository, DynUserQueryRepository, NewUser,
        UserCommandServiceTrait,
    },
    domain::{
        Role,
        requests::{CreateUserRequest, UpdateUserRequest},
        responses::{ApiResponse, UserResponse, UserResponseDeleteAt},
    },
    errors::{RepositoryError, ServiceError},
    model::User,
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::utils::{Method, Metrics, TracingContext, TracingMetrics};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

pub struct UserCommandServiceDeps {
    pub query: DynUserQueryRepository,
    pub command: DynUserCommandRepository,
    pub hashing: DynHashing,
    pub metrics: Arc<Mutex<Metrics>>,
    pub registry: Arc<Mutex<Registry>>,
}

#[derive(Clone)]
pub struct UserCommandService {
    query: DynUserQueryRepository,
    command: DynUserCommandRepository,
    hashing: DynHashing,
    tracing_metrics: TracingMetrics,
}

impl UserCommandService {
    pub async fn new(deps: UserCommandServiceDeps) -> Self {
        let UserCommandServiceDeps {
            query,
            command,
            hashing,
            metrics,
            registry,
        } = deps;

        let tracing_metrics = TracingMetrics::new(
            "user-command-service",
            "user_command_service",
            metrics,
            registry,
        )
        .await;

        Self {
            query,
            command,
            hashing,
            tracing_metrics,
        }
    }

    /// An email may be reused only by the account that already owns it.
    async fn ensure_email_free(&self, email: &str, owner: Option<i32>) -> Result<(), ServiceError> {
        match self.query.find_by_email(email).await? {
            Some(existing) if Some(existing.user_id) != owner => Err(ServiceError::Repo(
                RepositoryError::AlreadyExists(format!("email {email}")),
            )),
            _ => Ok(()),
        }
    }

    async fn finish<T>(
        &self,
        tracing_ctx: &TracingContext,
        method: Method,
        result: Result<User, ServiceError>,
        message: &str,
    ) -> Result<ApiResponse<T>, ServiceError>
    where
        T: From<User>,
    {
        match result {
            Ok(user) => {
                self.tracing_metrics
                    .complete_tracing_success(tracing_ctx, method, message)
                    .await;
                Ok(ApiResponse::success(message, T::from(user)))
            }
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(tracing_ctx, method, &e.to_string())
                    .await;
                Err(e)
            }
        }
    }

    fn start(&self, operation: &str, id: i32) -> TracingContext {
        self.tracing_metrics.start_tracing(
            operation,
            vec![
                KeyValue::new("component", "user"),
                KeyValue::new("user.id", id.to_string()),
            ],
        )
    }
}

#[async_trait]
impl UserCommandServiceTrait for UserCommandService {
    async fn create(
        &self,
        req: &CreateUserRequest,
    ) -> Result<ApiResponse<UserResponse>, ServiceError> {
        info!("🆕 Creating {} user {}", req.role, req.email);

        let tracing_ctx = self.tracing_metrics.start_tracing(
            "CreateUser",
            vec![
                KeyValue::new("component", "user"),
                KeyValue::new("user.email", req.email.clone()),
                KeyValue::new("user.role", req.role.as_str()),
            ],
        );

        let result = async {
            self.ensure_email_free(&req.email, None).await?;
            let password = self.hashing.hash_password(&req.password).await?;

            let user = self
                .command
                .create(&NewUser {
                    firstname: req.firstname.clone(),
                    lastname: req.lastname.clone(),
                    email: req.email.clone(),
                    password,
                    role: req.role,
                    store_name: req.store_name.clone(),
                })
                .await?;
            Ok(user)
        }
        .await;

        self.finish(&tracing_ctx, Method::Post, result, "User created successfully")
            .await
    }

    async fn update(
        &self,
        req: &UpdateUserRequest,
    ) -> Result<ApiResponse<UserResponse>, ServiceError> {
        let tracing_ctx = self.start("UpdateUser", req.user_id);

        let result = async {
            self.ensure_email_free(&req.email, Some(req.user_id)).await?;

            let password = match &req.password {
                Some(plain) => Some(self.hashing.hash_password(plain).await?),
                None => None,
            };

            Ok(self.command.update(req, password).await?)
        }
        .await;

        self.finish(&tracing_ctx, Method::Put, result, "User updated successfully")
            .await
    }

    async fn update_role(
        &self,
        id: i32,
        role: Role,
    ) -> Result<ApiResponse<UserResponse>, ServiceError> {
        info!("🛡️ Changing role of user {id} to {role}");

        let tracing_ctx = self.start("UpdateUserRole", id);
        let result = self
            .command
            .update_role(id, role)
            .await
            .map_err(ServiceError::from);

        self.finish(&tracing_ctx, Method::Put, result, "User role updated successfully")
            .await
    }

    async fn trash(&self, id: i32) -> Result<ApiResponse<UserResponseDeleteAt>, ServiceError> {
        let tracing_ctx = self.start("TrashUser", id);
        let result = self.command.trash(id).await.map_err(ServiceError::from);

        self.finish(&tracing_ctx, Method::Delete, result, "User moved to trash successfully")
            .await
    }

    async fn restore(&self, id: i32) -> Result<ApiResponse<UserResponseDeleteAt>, ServiceError> {
        let tracing_ctx = self.start("RestoreUser", id);
        let result = self.command.restore(id).await.map_err(ServiceError::from);

        self.finish(&tracing_ctx, Method::Put, result, "User restored successfully")
            .await
    }

    async fn delete_permanent(&self, id: i32) -> Result<ApiResponse<()>, ServiceError> {
        let method = Method::Delete;
        let tracing_ctx = self.start("DeleteUser", id);

        match self.command.delete_permanent(id).await {
            Ok(()) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "User deleted permanently")
                    .await;
                Ok(ApiResponse::success("User deleted permanently", ()))
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
