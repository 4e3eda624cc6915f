use axum::{
    Extension, Json, RequestPartsExt,
    extract::{FromRequestParts, rejection::ExtensionRejection},
    http::{StatusCode, request::Parts},
    response::IntoResponse,
};
use thiserror::Error;

use crate::{
    domain::models::{EmptyOwnerId, OwnerId},
    inbound::ErrorResponse,
};

/// The identity attached to a request by the authentication middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    /// the verified caller id
    pub user_id: String,
}

#[derive(Debug, Error)]
pub enum OwnerExtractorErr {
    #[error("unauthorized")]
    MissingContext(#[from] ExtensionRejection),
    #[error("unauthorized")]
    EmptyOwner(#[from] EmptyOwnerId),
}

impl IntoResponse for OwnerExtractorErr {
    fn into_response(self) -> axum::response::Response {
        tracing::debug!(error = ?self, "rejected request without a caller");
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                message: &self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Extracts the [OwnerId] of the caller from the [UserContext] extension
pub struct OwnerExtractor(pub OwnerId);

#[axum::async_trait]
impl<S> FromRequestParts<S> for OwnerExtractor
where
    S: Send + Sync,
{
    type Rejection = OwnerExtractorErr;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(context): Extension<UserContext> = parts.extract_with_state(state).await?;
        Ok(OwnerExtractor(OwnerId::parse(context.user_id)?))
    }
}
