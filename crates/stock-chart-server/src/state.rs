use std::sync::Arc;

use stock_chart_providers::provider::ChartProvider;

/// Shared server state: the upstream chart provider.
/// The provider is stateless; one instance serves all requests.
pub struct AppState {
    pub provider: Box<dyn ChartProvider>,
}

impl AppState {
    pub fn new(provider: Box<dyn ChartProvider>) -> Arc<Self> {
        Arc::new(Self { provider })
    }
}
