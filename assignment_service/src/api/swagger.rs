use assignments::{
    domain::models::{Assignment, CreateAssignmentRequest},
    inbound::{
        ErrorResponse,
        axum_router::{
            AssignmentErrorResponse, AssignmentResponse, AssignmentsResponse,
            CreatedAssignmentResponse, MessageResponse, NumbersResponse,
        },
    },
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        assignments::inbound::axum_router::list_assignments_handler,
        assignments::inbound::axum_router::create_assignment_handler,
        assignments::inbound::axum_router::list_numbers_handler,
        assignments::inbound::axum_router::get_assignment_handler,
        assignments::inbound::axum_router::delete_assignment_handler,
    ),
    components(
        schemas(
            Assignment,
            CreateAssignmentRequest,
            AssignmentsResponse,
            AssignmentResponse,
            CreatedAssignmentResponse,
            NumbersResponse,
            MessageResponse,
            AssignmentErrorResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "assignment service", description = "DP number assignments")
    )
)]
pub struct ApiDoc;
