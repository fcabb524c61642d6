use crate::{
    abstract_trait::{
        AuthServiceTrait, DynHashing, DynJwtService, DynRefreshTokenRepository,
        DynUserCommandRepository, DynUserQueryRepository, NewUser,
    },
    domain::{
        Role,
        requests::{LoginRequest, RegisterRequest},
        responses::{ApiResponse, TokenResponse, UserResponse},
    },
    errors::{RepositoryError, ServiceError},
    model::User,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::utils::{Method, Metrics, TracingMetrics};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

const REFRESH_TOKEN_DAYS: i64 = 7;

pub struct AuthServiceDeps {
    pub user_query: DynUserQueryRepository,
    pub user_command: DynUserCommandRepository,
    pub refresh_tokens: DynRefreshTokenRepository,
    pub hashing: DynHashing,
    pub jwt: DynJwtService,
    pub metrics: Arc<Mutex<Metrics>>,
    pub registry: Arc<Mutex<Registry>>,
}

#[derive(Clone)]
pub struct AuthService {
    user_query: DynUserQueryRepository,
    user_command: DynUserCommandRepository,
    refresh_tokens: DynRefreshTokenRepository,
    hashing: DynHashing,
    jwt: DynJwtService,
    tracing_metrics: TracingMetrics,
}

impl AuthService {
    pub async fn new(deps: AuthServiceDeps) -> Self {
        let AuthServiceDeps {
            user_query,
            user_command,
            refresh_tokens,
            hashing,
            jwt,
            metrics,
            registry,
        } = deps;

        let tracing_metrics =
            TracingMetrics::new("auth-service", "auth_service", metrics, registry).await;

        Self {
            user_query,
            user_command,
            refresh_tokens,
            hashing,
            jwt,
            tracing_metrics,
        }
    }

    /// Issues an access/refresh pair and stores the refresh token, replacing the previous one.
    async fn issue_tokens(&self, user: &User) -> Result<TokenResponse, ServiceError> {
        let role = user.role.parse::<Role>().map_err(|e| {
            error!("❌ User {} holds an unknown role: {e}", user.user_id);
            ServiceError::Internal(e)
        })?;
        let user_id = i64::from(user.user_id);

        let access_token = self.jwt.generate_token(user_id, role, "access")?;
        let refresh_token = self.jwt.generate_token(user_id, role, "refresh")?;

        let expires_at = (Utc::now() + Duration::days(REFRESH_TOKEN_DAYS)).naive_utc();
        self.refresh_tokens
            .upsert(user.user_id, &refresh_token, expires_at)
            .await?;

        Ok(TokenResponse {
            access_token,
            refresh_token,
        })
    }

    async fn verify_login(&self, req: &LoginRequest) -> Result<TokenResponse, ServiceError> {
        let user = self
            .user_query
            .find_by_email(&req.email)
            .await?
            .filter(|user| user.deleted_at.is_none())
            .ok_or(ServiceError::InvalidCredentials)?;

        self.hashing
            .compare_password(&user.password, &req.password)
            .await
            .map_err(|_| ServiceError::InvalidCredentials)?;

        self.issue_tokens(&user).await
    }

    async fn rotate(&self, token: &str) -> Result<TokenResponse, ServiceError> {
        let claims = self.jwt.verify_token(token, "refresh")?;

        let stored = self
            .refresh_tokens
            .find_by_token(token)
            .await?
            .ok_or(ServiceError::InvalidTokenType)?;

        if stored.expired_date < Utc::now().naive_utc() {
            self.refresh_tokens.delete_by_user_id(stored.user_id).await?;
            return Err(ServiceError::TokenExpired);
        }

        if i64::from(stored.user_id) != claims.user_id {
            warn!("⚠️ Refresh token does not belong to user {}", claims.user_id);
            return Err(ServiceError::InvalidTokenType);
        }

        // role is re-read so a role change takes effect on the next refresh
        let user = self
            .user_query
            .find_by_id(stored.user_id)
            .await?
            .filter(|user| user.deleted_at.is_none())
            .ok_or(ServiceError::InvalidCredentials)?;

        self.issue_tokens(&user).await
    }
}

#[async_trait]
impl AuthServiceTrait for AuthService {
    async fn register(
        &self,
        req: &RegisterRequest,
    ) -> Result<ApiResponse<UserResponse>, ServiceError> {
        info!("📝 Registering user: {}", req.email);

        let method = Method::Post;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "Register",
            vec![
                KeyValue::new("component", "auth"),
                KeyValue::new("user.email", req.email.clone()),
            ],
        );

        let result = async {
            if self.user_query.find_by_email(&req.email).await?.is_some() {
                return Err(ServiceError::Repo(RepositoryError::AlreadyExists(format!(
                    "email {}",
                    req.email
                ))));
            }

            let password = self.hashing.hash_password(&req.password).await?;
            let user = self
                .user_command
                .create(&NewUser {
                    firstname: req.firstname.clone(),
                    lastname: req.lastname.clone(),
                    email: req.email.clone(),
                    password,
                    role: Role::Cliente,
                    store_name: None,
                })
                .await?;

            Ok(user)
        }
        .await;

        match result {
            Ok(user) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "User registered")
                    .await;
                Ok(ApiResponse::success(
                    "User registered successfully",
                    UserResponse::from(user),
                ))
            }
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, &e.to_string())
                    .await;
                Err(e)
            }
        }
    }

    async fn login(&self, req: &LoginRequest) -> Result<ApiResponse<TokenResponse>, ServiceError> {
        info!("🔐 Attempting login for email: {}", req.email);

        let method = Method::Post;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "Login",
            vec![
                KeyValue::new("component", "auth"),
                KeyValue::new("user.email", req.email.clone()),
            ],
        );

        match self.verify_login(req).await {
            Ok(tokens) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Login successful")
                    .await;
                Ok(ApiResponse::success("Login successful", tokens))
            }
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, &e.to_string())
                    .await;
                Err(e)
            }
        }
    }

    async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<ApiResponse<TokenResponse>, ServiceError> {
        info!("🔄 Attempting to refresh token");

        let method = Method::Post;
        let tracing_ctx = self
            .tracing_metrics
            .start_tracing("RefreshToken", vec![KeyValue::new("component", "auth")]);

        match self.rotate(refresh_token).await {
            Ok(tokens) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Token refreshed")
                    .await;
                Ok(ApiResponse::success("Token refreshed successfully", tokens))
            }
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, &e.to_string())
                    .await;
                Err(e)
            }
        }
    }

    async fn logout(&self, user_id: i32) -> Result<ApiResponse<()>, ServiceError> {
        let method = Method::Post;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "Logout",
            vec![
                KeyValue::new("component", "auth"),
                KeyValue::new("user.id", user_id.to_string()),
            ],
        );

        match self.refresh_tokens.delete_by_user_id(user_id).await {
            Ok(()) => {
                info!("👋 User {user_id} logged out");
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Logged out")
                    .await;
                Ok(ApiResponse::success("Logged out successfully", ()))
            }
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, &e.to_string())
                    .await;
                Err(e.into())
            }
        }
    }

    async fn get_me(&self, user_id: i32) -> Result<ApiResponse<UserResponse>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "GetMe",
            vec![
                KeyValue::new("component", "auth"),
                KeyValue::new("user.id", user_id.to_string()),
            ],
        );

        match self.user_query.find_by_id(user_id).await {
            Ok(Some(user)) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Profile retrieved")
                    .await;
                Ok(ApiResponse::success(
                    "User retrieved successfully",
                    UserResponse::from(user),
                ))
            }
            Ok(None) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, "User not found")
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abstract_trait::JwtServiceTrait,
        config::{Hashing, JwtConfig},
        testing::{FakeRefreshTokenRepository, FakeUserRepository, test_metrics},
    };

    struct Setup {
        service: AuthService,
        users: Arc<FakeUserRepository>,
        tokens: Arc<FakeRefreshTokenRepository>,
        jwt: Arc<JwtConfig>,
    }

    async fn setup() -> Setup {
        let users = Arc::new(FakeUserRepository::default());
        let tokens = Arc::new(FakeRefreshTokenRepository::default());
        let jwt = Arc::new(JwtConfig::new("test-secret"));
        let (metrics, registry) = test_metrics();

        let service = AuthService::new(AuthServiceDeps {
            user_query: users.clone(),
            user_command: users.clone(),
            refresh_tokens: tokens.clone(),
            hashing: Arc::new(Hashing::with_cost(4)),
            jwt: jwt.clone(),
            metrics,
            registry,
        })
        .await;

        Setup {
            service,
            users,
            tokens,
            jwt,
        }
    }

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            firstname: "Marta".into(),
            lastname: "Rojas".into(),
            email: "marta@example.com".into(),
            password: "puertas123".into(),
            confirm_password: "puertas123".into(),
        }
    }

    fn login_request(password: &str) -> LoginRequest {
        LoginRequest {
            email: "marta@example.com".into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn registration_creates_a_customer_with_hashed_password() {
        let s = setup().await;

        let user = s.service.register(&register_request()).await.unwrap();

        assert_eq!(user.data.role, "cliente");
        let stored = s.users.by_email("marta@example.com").await.unwrap();
        assert_ne!(stored.password, "puertas123");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let s = setup().await;
        s.service.register(&register_request()).await.unwrap();

        let err = s.service.register(&register_request()).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Repo(RepositoryError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn login_issues_tokens_carrying_the_role() {
        let s = setup().await;
        let user_id = s.service.register(&register_request()).await.unwrap().data.id;

        let tokens = s.service.login(&login_request("puertas123")).await.unwrap().data;

        let claims = s.jwt.verify_token(&tokens.access_token, "access").unwrap();
        assert_eq!(claims.user_id, i64::from(user_id));
        assert_eq!(claims.role, Role::Cliente);
        assert_eq!(
            s.tokens.token_of(user_id).await.as_deref(),
            Some(tokens.refresh_token.as_str())
        );
    }

    #[tokio::test]
    async fn wrong_password_or_unknown_email_are_invalid_credentials() {
        let s = setup().await;
        s.service.register(&register_request()).await.unwrap();

        let err = s.service.login(&login_request("otra-clave")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));

        let err = s
            .service
            .login(&LoginRequest {
                email: "nadie@example.com".into(),
                password: "puertas123".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn refresh_rotates_and_picks_up_role_changes() {
        let s = setup().await;
        let user_id = s.service.register(&register_request()).await.unwrap().data.id;
        let first = s.service.login(&login_request("puertas123")).await.unwrap().data;
        s.users.set_role(user_id, Role::Tienda).await;

        let second = s.service.refresh_token(&first.refresh_token).await.unwrap().data;

        let claims = s.jwt.verify_token(&second.access_token, "access").unwrap();
        assert_eq!(claims.role, Role::Tienda);
        assert_eq!(
            s.tokens.token_of(user_id).await.as_deref(),
            Some(second.refresh_token.as_str())
        );
    }

    #[tokio::test]
    async fn access_tokens_cannot_refresh() {
        let s = setup().await;
        s.service.register(&register_request()).await.unwrap();
        let tokens = s.service.login(&login_request("puertas123")).await.unwrap().data;

        let err = s.service.refresh_token(&tokens.access_token).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTokenType));
    }

    #[tokio::test]
    async fn logout_revokes_the_refresh_token() {
        let s = setup().await;
        let user_id = s.service.register(&register_request()).await.unwrap().data.id;
        let tokens = s.service.login(&login_request("puertas123")).await.unwrap().data;

        s.service.logout(user_id).await.unwrap();

        assert!(s.tokens.token_of(user_id).await.is_none());
        let err = s.service.refresh_token(&tokens.refresh_token).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTokenType));
    }
}
