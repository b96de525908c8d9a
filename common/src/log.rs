use tracing::{warn, Level};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const DEFAULT_FILTER: &str = "api=debug,gateway=debug,common=debug,actix_web=info";

/// Install the global fmt subscriber, `RUST_LOG` overrides the default filter.
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_env_filter(filter)
        .finish();
    if let Err(info) = tracing::subscriber::set_global_default(subscriber) {
        //tests install the logger more than once
        warn!("a global default trace dispatcher has already been set: {}", info);
    }
}

pub fn generate_trace_id() -> String {
    let trace_id = Uuid::new_v4();
    trace_id.to_string()
}
