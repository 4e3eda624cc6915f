use std::sync::Arc;

use assignments::inbound::{ErrorResponse, owner_extractor::UserContext};
use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};


/// The claims of a bearer token this service accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// the caller id
    pub sub: String,
    /// expiry as seconds since the epoch
    pub exp: usize,
}

/// What is needed to verify bearer tokens
#[derive(Clone)]
pub struct JwtValidationArgs {
    key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl JwtValidationArgs {
    /// verify HS256 tokens signed with `secret`
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            key: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            validation: Arc::new(validation),
        }
    }

    fn decode(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.key, &self.validation).map(|data| data.claims)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            message: "unauthorized",
        }),
    )
        .into_response()
}

/// Verifies the bearer token and attaches the caller as a [UserContext] extension.
/// With the `local_auth` feature every request is attributed to `LOCAL_USER_ID` instead.
pub async fn handler(
    State(args): State<JwtValidationArgs>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    if cfg!(feature = "local_auth") {
        req.extensions_mut().insert(UserContext {
            user_id: std::env::var("LOCAL_USER_ID").unwrap_or("local-user".to_string()),
        });
        return Ok(next.run(req).await);
    }

    let Some(token) = bearer_token(req.headers()) else {
        tracing::trace!("no bearer token provided");
        return Err(unauthorized());
    };

    let claims = args.decode(token).map_err(|e| {
        tracing::debug!(error=?e, "unable to decode jwt");
        unauthorized()
    })?;

    req.extensions_mut().insert(UserContext {
        user_id: claims.sub,
    });

    Ok(next.run(req).await)
}
