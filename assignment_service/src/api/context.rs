use std::{sync::Arc, time::Instant};

use sqlx::PgPool;

use crate::{api::decode_jwt::JwtValidationArgs, config::Config};

#[derive(Clone)]
pub struct ApiContext {
    /// Database holding the assignment tables
    pub db: PgPool,
    pub jwt_args: JwtValidationArgs,
    pub config: Arc<Config>,
    /// when the process came up, reported as uptime
    pub started_at: Instant,
}
