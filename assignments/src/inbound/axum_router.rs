use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::{
        models::{Assignment, AssignmentErr, CreateAssignmentRequest},
        ports::AssignmentService,
    },
    inbound::{ErrorResponse, owner_extractor::OwnerExtractor},
};


pub struct AssignmentRouterState<T> {
    service: Arc<T>,
}

impl<T> Clone for AssignmentRouterState<T> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

impl<T> AssignmentRouterState<T>
where
    T: AssignmentService,
{
    pub fn new(service: T) -> Self {
        AssignmentRouterState {
            service: Arc::new(service),
        }
    }
}

/// The assignment routes. Every route expects a [crate::inbound::owner_extractor::UserContext]
/// extension, which the authentication middleware of the service attaches.
pub fn assignment_router<T, S>(state: AssignmentRouterState<T>) -> Router<S>
where
    T: AssignmentService,
    S: Send + Sync,
{
    Router::new()
        .route(
            "/api/assignments",
            get(list_assignments_handler).post(create_assignment_handler),
        )
        .route("/api/assignments/numbers", get(list_numbers_handler))
        .route(
            "/api/assignments/:id",
            get(get_assignment_handler).delete(delete_assignment_handler),
        )
        .with_state(state)
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignmentsResponse {
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignmentResponse {
    pub assignment: Assignment,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedAssignmentResponse {
    pub message: String,
    pub assignment: Assignment,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NumbersResponse {
    /// every DP number held by the caller in ascending numeric order
    #[schema(example = json!(["DP0002", "DP0005", "DP0010"]))]
    pub numbers: Vec<String>,
    pub total_numbers: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// The error body of every failed assignment request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignmentErrorResponse {
    pub message: String,
    /// stable machine readable error code
    #[schema(example = "cross_record_duplicate")]
    pub error: String,
    /// the offending raw token of an invalid identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// the offending canonical DP numbers of a duplicate rejection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numbers: Option<Vec<String>>,
}

impl AssignmentErr {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AssignmentErr::EmptyTitle => (StatusCode::BAD_REQUEST, "empty_title"),
            AssignmentErr::EmptyBatch => (StatusCode::BAD_REQUEST, "empty_batch"),
            AssignmentErr::InvalidIdentifierFormat { .. } => {
                (StatusCode::BAD_REQUEST, "invalid_identifier_format")
            }
            AssignmentErr::IntraBatchDuplicate(_) => (StatusCode::CONFLICT, "intra_batch_duplicate"),
            AssignmentErr::CrossRecordDuplicate(_) => {
                (StatusCode::CONFLICT, "cross_record_duplicate")
            }
            AssignmentErr::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            AssignmentErr::StorageUnavailable(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_unavailable")
            }
        }
    }
}

impl IntoResponse for AssignmentErr {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AssignmentErr::StorageUnavailable(source) => {
                tracing::error!(error = ?source, "assignment storage failure");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let token = match &self {
            AssignmentErr::InvalidIdentifierFormat { token, .. } => Some(token.clone()),
            _ => None,
        };
        let numbers = match &self {
            AssignmentErr::IntraBatchDuplicate(numbers)
            | AssignmentErr::CrossRecordDuplicate(numbers) => {
                Some(numbers.iter().map(ToString::to_string).collect())
            }
            _ => None,
        };

        (
            status,
            Json(AssignmentErrorResponse {
                message,
                error: code.to_string(),
                token,
                numbers,
            }),
        )
            .into_response()
    }
}

/// ids which are not even uuids cannot name an assignment of the caller
fn parse_id(id: &str) -> Result<Uuid, AssignmentErr> {
    Uuid::parse_str(id).map_err(|_| AssignmentErr::NotFound)
}

/// Lists the assignments of the caller, newest first
#[utoipa::path(
    get,
    operation_id = "list_assignments",
    path = "/api/assignments",
    responses(
            (status = 200, body=AssignmentsResponse),
            (status = 401, body=ErrorResponse),
            (status = 500, body=AssignmentErrorResponse),
    )
)]
pub async fn list_assignments_handler<T>(
    State(state): State<AssignmentRouterState<T>>,
    OwnerExtractor(owner): OwnerExtractor,
) -> Result<Json<AssignmentsResponse>, AssignmentErr>
where
    T: AssignmentService,
{
    let assignments = state.service.list_assignments(&owner).await?;
    Ok(Json(AssignmentsResponse { assignments }))
}

/// Creates an assignment from a batch of DP numbers.
/// The whole batch is rejected if any number is malformed, repeated, or already held by the caller.
#[utoipa::path(
    post,
    operation_id = "create_assignment",
    path = "/api/assignments",
    request_body = CreateAssignmentRequest,
    responses(
            (status = 201, body=CreatedAssignmentResponse),
            (status = 400, body=AssignmentErrorResponse),
            (status = 401, body=ErrorResponse),
            (status = 409, body=AssignmentErrorResponse),
            (status = 500, body=AssignmentErrorResponse),
    )
)]
pub async fn create_assignment_handler<T>(
    State(state): State<AssignmentRouterState<T>>,
    OwnerExtractor(owner): OwnerExtractor,
    Json(request): Json<CreateAssignmentRequest>,
) -> Result<(StatusCode, Json<CreatedAssignmentResponse>), AssignmentErr>
where
    T: AssignmentService,
{
    let assignment = state.service.create_assignment(&owner, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedAssignmentResponse {
            message: "Assignment created successfully".to_string(),
            assignment,
        }),
    ))
}

/// Lists every DP number held by the caller
#[utoipa::path(
    get,
    operation_id = "list_assignment_numbers",
    path = "/api/assignments/numbers",
    responses(
            (status = 200, body=NumbersResponse),
            (status = 401, body=ErrorResponse),
            (status = 500, body=AssignmentErrorResponse),
    )
)]
pub async fn list_numbers_handler<T>(
    State(state): State<AssignmentRouterState<T>>,
    OwnerExtractor(owner): OwnerExtractor,
) -> Result<Json<NumbersResponse>, AssignmentErr>
where
    T: AssignmentService,
{
    let numbers: Vec<String> = state
        .service
        .list_all_numbers(&owner)
        .await?
        .iter()
        .map(ToString::to_string)
        .collect();

    Ok(Json(NumbersResponse {
        total_numbers: numbers.len(),
        numbers,
    }))
}

/// Gets a single assignment of the caller
#[utoipa::path(
    get,
    operation_id = "get_assignment",
    path = "/api/assignments/{id}",
    params(
        ("id" = String, Path, description = "The id of the assignment"),
    ),
    responses(
            (status = 200, body=AssignmentResponse),
            (status = 401, body=ErrorResponse),
            (status = 404, body=AssignmentErrorResponse),
            (status = 500, body=AssignmentErrorResponse),
    )
)]
pub async fn get_assignment_handler<T>(
    State(state): State<AssignmentRouterState<T>>,
    OwnerExtractor(owner): OwnerExtractor,
    Path(id): Path<String>,
) -> Result<Json<AssignmentResponse>, AssignmentErr>
where
    T: AssignmentService,
{
    let assignment = state.service.get_assignment(&owner, parse_id(&id)?).await?;
    Ok(Json(AssignmentResponse { assignment }))
}

/// Deletes an assignment of the caller, releasing its DP numbers
#[utoipa::path(
    delete,
    operation_id = "delete_assignment",
    path = "/api/assignments/{id}",
    params(
        ("id" = String, Path, description = "The id of the assignment"),
    ),
    responses(
            (status = 200, body=MessageResponse),
            (status = 401, body=ErrorResponse),
            (status = 404, body=AssignmentErrorResponse),
            (status = 500, body=AssignmentErrorResponse),
    )
)]
pub async fn delete_assignment_handler<T>(
    State(state): State<AssignmentRouterState<T>>,
    OwnerExtractor(owner): OwnerExtractor,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AssignmentErr>
where
    T: AssignmentService,
{
    state
        .service
        .delete_assignment(&owner, parse_id(&id)?)
        .await?;
    Ok(Json(MessageResponse {
        message: "Assignment deleted successfully".to_string(),
    }))
}
