use anyhow::Context;
use assignments::{
    domain::service::AssignmentServiceImpl,
    inbound::axum_router::{AssignmentRouterState, assignment_router},
    outbound::pg_assignment_repo::AssignmentPgRepo,
};
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::context::ApiContext;

pub mod context;
pub mod decode_jwt;
mod health;
pub mod swagger;

pub async fn setup_and_serve(state: ApiContext) -> anyhow::Result<()> {
    let port = state.config.port;
    let env = state.config.environment;
    let started_at = state.started_at;

    let app = api_router(state)
        .layer(TraceLayer::new_for_http())
        .merge(health::router(started_at))
        .layer(CorsLayer::permissive())
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", swagger::ApiDoc::openapi()));

    let bind_address = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind to address {}", bind_address))?;

    tracing::info!(
        "assignment service is up and running with environment {} on port {}",
        &env,
        &port
    );

    axum::serve(listener, app.into_make_service())
        .await
        .context("error running axum server")
}

fn api_router(app_state: ApiContext) -> Router {
    let service = AssignmentServiceImpl::new(AssignmentPgRepo::new(app_state.db.clone()));

    assignment_router(AssignmentRouterState::new(service)).layer(
        axum::middleware::from_fn_with_state(app_state.jwt_args.clone(), decode_jwt::handler),
    )
}
