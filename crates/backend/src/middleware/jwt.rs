use crate::{
    abstract_trait::DynJwtService,
    domain::CurrentUser,
    errors::{HttpError, ServiceError},
};
use axum::{
    Extension,
    body::Body,
    http::{Request, header},
    middleware::Next,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

/// Access token from the `token` cookie, falling back to the bearer header.
fn bearer_token(cookie_jar: &CookieJar, req: &Request<Body>) -> Option<String> {
    cookie_jar
        .get("token")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::to_owned)
        })
}

fn resolve_user(jwt: &DynJwtService, token: &str) -> Result<CurrentUser, HttpError> {
    let claims = jwt.verify_token(token, "access").map_err(|e| match e {
        ServiceError::TokenExpired => HttpError::Unauthorized("Token expired".into()),
        ServiceError::InvalidTokenType => HttpError::Unauthorized("Invalid token type".into()),
        _ => HttpError::Unauthorized("Invalid token".into()),
    })?;

    let user_id = i32::try_from(claims.user_id)
        .map_err(|_| HttpError::Unauthorized("Invalid token".into()))?;

    Ok(CurrentUser::new(user_id, claims.role))
}

pub async fn auth_middleware(
    cookie_jar: CookieJar,
    Extension(jwt): Extension<DynJwtService>,
    mut req: Request<Body>,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let token = bearer_token(&cookie_jar, &req).ok_or_else(|| {
        HttpError::Unauthorized("You are not logged in, please provide token".into())
    })?;

    let user = resolve_user(&jwt, &token)?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Like [`auth_middleware`] for public routes: a valid token attaches the caller, anything
/// else lets the request through anonymously.
pub async fn optional_auth_middleware(
    cookie_jar: CookieJar,
    Extension(jwt): Extension<DynJwtService>,
    mut req: Request<Body>,
    next: Next,
) -> impl IntoResponse {
    if let Some(token) = bearer_token(&cookie_jar, &req) {
        match resolve_user(&jwt, &token) {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(_) => debug!("Ignoring invalid token on public route"),
        }
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{abstract_trait::JwtServiceTrait, config::JwtConfig, domain::Role};
    use axum::{
        Router,
        http::StatusCode,
        middleware,
        routing::get,
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn whoami(user: Option<Extension<CurrentUser>>) -> String {
        user.map(|Extension(u)| format!("{}:{}", u.user_id, u.role))
            .unwrap_or_else(|| "anonymous".into())
    }

    fn app(jwt: DynJwtService) -> Router {
        Router::new()
            .route("/private", get(whoami))
            .route_layer(middleware::from_fn(auth_middleware))
            .merge(
                Router::new()
                    .route("/public", get(whoami))
                    .route_layer(middleware::from_fn(optional_auth_middleware)),
            )
            .layer(Extension(jwt))
    }

    async fn call(app: Router, uri: &str, header: Option<(&str, String)>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri(uri);
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn bearer_token_identifies_the_caller() {
        let jwt: DynJwtService = Arc::new(JwtConfig::new("secret"));
        let token = jwt.generate_token(7, Role::Fabrica, "access").unwrap();

        let (status, body) = call(
            app(jwt),
            "/private",
            Some(("authorization", format!("Bearer {token}"))),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "7:fabrica");
    }

    #[tokio::test]
    async fn token_cookie_is_accepted() {
        let jwt: DynJwtService = Arc::new(JwtConfig::new("secret"));
        let token = jwt.generate_token(3, Role::Tienda, "access").unwrap();

        let (status, body) = call(app(jwt), "/private", Some(("cookie", format!("token={token}")))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "3:tienda");
    }

    #[tokio::test]
    async fn missing_or_wrong_tokens_are_unauthorized() {
        let jwt: DynJwtService = Arc::new(JwtConfig::new("secret"));
        let refresh = jwt.generate_token(7, Role::Cliente, "refresh").unwrap();

        let (status, _) = call(app(jwt.clone()), "/private", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(
            app(jwt.clone()),
            "/private",
            Some(("authorization", format!("Bearer {refresh}"))),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(
            app(jwt),
            "/private",
            Some(("authorization", "Bearer garbage".into())),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn public_routes_tolerate_bad_tokens() {
        let jwt: DynJwtService = Arc::new(JwtConfig::new("secret"));
        let token = jwt.generate_token(5, Role::Cliente, "access").unwrap();

        let (status, body) = call(app(jwt.clone()), "/public", None).await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "anonymous"));

        let (status, body) = call(
            app(jwt.clone()),
            "/public",
            Some(("authorization", "Bearer garbage".into())),
        )
        .await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "anonymous"));

        let (_, body) = call(
            app(jwt),
            "/public",
            Some(("authorization", format!("Bearer {token}"))),
        )
        .await;
        assert_eq!(body, "5:cliente");
    }
}
