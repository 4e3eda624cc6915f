//! Process initialization shared by every way of starting the service

use tracing_subscriber::EnvFilter;

use crate::config::Environment;

/// defines how the binary is initialized
#[derive(Debug, Default)]
pub struct Entrypoint;

/// sentinel struct which guarantees that we called [Entrypoint::init]
#[derive(Debug)]
pub struct InitializedEntrypoint(());

impl Entrypoint {
    /// consume self, load `.env`, install the panic hook and the tracing subscriber
    pub fn init(self) -> InitializedEntrypoint {
        dotenv::dotenv().ok();
        // ENVIRONMENT may come from .env
        let env = Environment::new_or_prod();

        std::panic::set_hook(Box::new(tracing_panic::panic_hook));

        match env {
            Environment::Local => {
                tracing_subscriber::fmt()
                    .with_ansi(true)
                    .with_env_filter(EnvFilter::from_default_env())
                    .with_file(true)
                    .with_line_number(true)
                    .pretty()
                    .init();
            }
            Environment::Production | Environment::Develop => {
                tracing_subscriber::fmt()
                    .with_ansi(false)
                    .with_env_filter(EnvFilter::from_default_env())
                    .with_file(true)
                    .with_line_number(true)
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .flatten_event(true)
                    .init();
            }
        }

        InitializedEntrypoint(())
    }
}
