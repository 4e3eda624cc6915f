//! The http adapter for the assignment domain

pub mod axum_router;
pub mod owner_extractor;

/// A plain json error response.
#[derive(serde::Serialize, serde::Deserialize, Debug, utoipa::ToSchema)]
pub struct ErrorResponse<'a> {
    /// Message to explain failure
    pub message: &'a str,
}
