use crate::config::Config;
use crate::providers::ProviderRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Provider factories keyed by lower-cased name.
    pub providers: ProviderRegistry,
}
