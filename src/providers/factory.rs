use std::sync::Arc;
use tracing::info;

use crate::{
    config::{models::ModelRegistry, Config, ProviderMode},
    providers::{FallbackProviderChain, GatewayProvider, MockProvider, ProviderAdapter, RouterProvider},
    router::{CircuitBreakerStore, ModelRouter, OpenAiCompatBackend},
};

/// The assembled provider chain plus the router it wraps (for health reporting).
#[derive(Clone)]
pub struct ProviderStack {
    pub chain: Arc<dyn ProviderAdapter>,
    pub router: Arc<ModelRouter>,
}

/// Build the provider chain selected by `config.provider_mode`.
///
/// The model router is always constructed so its health stays observable, even
/// when the router family is disabled or not part of the active chain.
pub fn build_provider_stack(config: &Config) -> ProviderStack {
    build_provider_stack_with_registry(config, ModelRegistry::default())
}

pub fn build_provider_stack_with_registry(
    config: &Config,
    registry: ModelRegistry,
) -> ProviderStack {
    let router_key = config.router.resolved_api_key();
    let router_backend = OpenAiCompatBackend::new(
        config.router.resolved_base_url(),
        router_key.clone().unwrap_or_default(),
    )
    .with_max_tokens(config.router.max_tokens)
    .with_timeout(config.router.timeout());

    let circuits = Arc::new(CircuitBreakerStore::new(config.circuit.clone()));
    let router = Arc::new(ModelRouter::new(
        Arc::new(registry),
        circuits,
        Arc::new(router_backend),
    ));

    let gateway_key = config.gateway.resolved_api_key();
    let gateway_backend = OpenAiCompatBackend::new(
        config.gateway.resolved_base_url(),
        gateway_key.clone().unwrap_or_default(),
    )
    .with_max_tokens(config.gateway.max_tokens)
    .with_timeout(config.gateway.timeout());

    let router_provider: Arc<dyn ProviderAdapter> = Arc::new(RouterProvider::new(
        router.clone(),
        config.router.default_mode,
        router_key.is_some(),
    ));
    let gateway_provider: Arc<dyn ProviderAdapter> = Arc::new(GatewayProvider::new(
        Arc::new(gateway_backend),
        config.gateway.model.clone(),
        gateway_key.is_some(),
    ));
    let mock_provider: Arc<dyn ProviderAdapter> = Arc::new(MockProvider);

    let chain: Arc<dyn ProviderAdapter> = match config.provider_mode {
        ProviderMode::Router => Arc::new(FallbackProviderChain::new(
            router_provider,
            Arc::new(FallbackProviderChain::new(gateway_provider, mock_provider)),
        )),
        ProviderMode::Gateway => Arc::new(FallbackProviderChain::new(gateway_provider, mock_provider)),
        ProviderMode::Mock => mock_provider,
    };

    info!(
        mode = ?config.provider_mode,
        chain = chain.id(),
        router_enabled = router_key.is_some(),
        gateway_enabled = gateway_key.is_some(),
        models = router.registry().len(),
        "provider chain ready"
    );

    ProviderStack { chain, router }
}
