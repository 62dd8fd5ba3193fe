use async_trait::async_trait;
use stock_chart_core::ohlc::OhlcRecord;
use stock_chart_core::period::ChartQuery;

use crate::error::ProviderError;

/// Trait for fetching OHLC chart data from an external source.
#[async_trait]
pub trait ChartProvider: Send + Sync {
    /// Provider name (for logging/display).
    fn name(&self) -> &str;

    /// Fetch OHLC records for a symbol with the given query parameters.
    /// Returns records sorted ascending by date, one per sampling interval.
    async fn fetch_chart(
        &self,
        symbol: &str,
        query: &ChartQuery,
    ) -> Result<Vec<OhlcRecord>, ProviderError>;
}
