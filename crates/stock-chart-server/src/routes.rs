use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use stock_chart_core::ohlc::OhlcRecord;
use stock_chart_core::period::Period;
use stock_chart_providers::provider::ChartProvider;

use crate::error::ApiError;
use crate::state::AppState;

/// Assemble the API router.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new().route("/api/stock", get(api_stock))
}

#[derive(Debug, Deserialize)]
pub struct StockQuery {
    symbol: Option<String>,
    period: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

async fn api_stock(
    State(state): State<Arc<AppState>>,
    Query(q): Query<StockQuery>,
) -> Result<Json<Vec<OhlcRecord>>, ApiError> {
    let records = fetch_stock(state.provider.as_ref(), &q).await?;
    Ok(Json(records))
}

/// Resolve the request into upstream query parameters and perform the fetch.
async fn fetch_stock(
    provider: &dyn ChartProvider,
    q: &StockQuery,
) -> Result<Vec<OhlcRecord>, ApiError> {
    let symbol = q.symbol.as_deref().filter(|s| !s.is_empty());
    let period = q.period.as_deref().filter(|s| !s.is_empty());

    let (Some(symbol), Some(period)) = (symbol, period) else {
        return Err(ApiError::InvalidRequest("Missing symbol or period".into()));
    };

    let period: Period = period.parse()?;
    let from = q.from.as_deref().map(parse_bound).transpose()?;
    let to = q.to.as_deref().map(parse_bound).transpose()?;

    let query = period.resolve(from, to)?;

    tracing::info!(
        symbol,
        period = period.as_str(),
        provider = provider.name(),
        "fetching stock data"
    );

    let records = provider.fetch_chart(symbol, &query).await?;

    tracing::debug!(symbol, count = records.len(), "received data points");
    Ok(records)
}

/// Parse a date bound: bare ISO date (what the calendar widget sends,
/// interpreted as UTC midnight) or a full RFC3339 timestamp.
fn parse_bound(s: &str) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(date) = s.parse::<NaiveDate>() {
        return Ok(date.and_hms_opt(0, 0, 0).unwrap().and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ApiError::InvalidRequest(format!("Invalid date: {s}")))
}
