use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Context;
use assignments::outbound::pg_assignment_repo::ASSIGNMENT_DB_MIGRATIONS;
use sqlx::postgres::PgPoolOptions;

use crate::{
    api::{context::ApiContext, decode_jwt::JwtValidationArgs},
    config::Config,
    entrypoint::Entrypoint,
};

mod api;
mod config;
mod entrypoint;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let started_at = Instant::now();
    Entrypoint.init();

    // Parse our configuration from the environment.
    let config = Config::from_env().context("expected to be able to generate config")?;

    tracing::info!(environment = %config.environment, "initialized config");

    let (min_connections, max_connections) = config.environment.pool_size();

    let db = PgPoolOptions::new()
        .min_connections(min_connections)
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .context("could not connect to the assignment database")?;

    tracing::info!(
        min_connections,
        max_connections,
        "initialized database connection"
    );

    ASSIGNMENT_DB_MIGRATIONS
        .run(&db)
        .await
        .context("could not run assignment migrations")?;

    tracing::info!("applied assignment migrations");

    let jwt_args = JwtValidationArgs::new(&config.jwt_secret);

    api::setup_and_serve(ApiContext {
        db,
        jwt_args,
        config: Arc::new(config),
        started_at,
    })
    .await?;
    Ok(())
}
