use std::{fmt::Display, str::FromStr};

use anyhow::Context;
use thiserror::Error;


/// The current environment the application is running in
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production environment
    Production,
    /// Dev and or staging environment
    Develop,
    /// The server is running on localhost
    Local,
}

impl Environment {
    /// read `ENVIRONMENT`, falling back to production if it is unset or unknown
    pub fn new_or_prod() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        lookup("ENVIRONMENT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(Environment::Production)
    }

    /// the (min, max) size of the database pool
    pub fn pool_size(&self) -> (u32, u32) {
        match self {
            Environment::Production => (5, 30),
            Environment::Develop => (3, 20),
            Environment::Local => (1, 10),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Production => write!(f, "prod"),
            Environment::Develop => write!(f, "dev"),
            Environment::Local => write!(f, "local"),
        }
    }
}

/// Represents a value which cannot be converted into an [Environment]
#[derive(Debug, Error)]
#[error("Could not convert {0} into an environment value")]
pub struct UnknownValue(String);

impl FromStr for Environment {
    type Err = UnknownValue;

    fn from_str(environment: &str) -> Result<Self, UnknownValue> {
        match environment {
            "prod" => Ok(Environment::Production),
            "dev" => Ok(Environment::Develop),
            "local" => Ok(Environment::Local),
            s => Err(UnknownValue(s.to_string())),
        }
    }
}

/// Configuration parameters for the application.
#[derive(Debug)]
pub struct Config {
    /// The connection URL for the Postgres database holding the assignment tables
    pub database_url: String,
    /// The HS256 secret bearer tokens are signed with
    pub jwt_secret: String,
    /// The port to listen for HTTP requests on.
    pub port: u16,
    /// The environment we are in
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be provided")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET must be provided")?;
        let port = match lookup("PORT") {
            Some(port) => port
                .parse::<u16>()
                .with_context(|| format!("PORT {port:?} is not a valid port"))?,
            None => 5000,
        };
        let environment = Environment::from_lookup(&lookup);

        Ok(Config {
            database_url,
            jwt_secret,
            port,
            environment,
        })
    }
}
