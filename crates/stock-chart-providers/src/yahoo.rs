use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use stock_chart_core::ohlc::OhlcRecord;
use stock_chart_core::period::{ChartQuery, Span};

use crate::error::ProviderError;
use crate::provider::ChartProvider;

const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Upstream has no documented latency bound; cap requests so a stalled
/// connection surfaces as an error instead of suspending indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Yahoo Finance chart data provider.
/// No authentication required. Limited to ~60 days of intraday history.
pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new() -> Self {
        Self::with_base_url(YAHOO_CHART_URL.to_string())
    }

    /// Create with a custom base URL (for testing or proxying).
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .user_agent("Mozilla/5.0")
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("failed to build reqwest client"),
            base_url,
        }
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChartProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_chart(
        &self,
        symbol: &str,
        query: &ChartQuery,
    ) -> Result<Vec<OhlcRecord>, ProviderError> {
        let mut params = vec![("interval", query.interval.as_str().to_string())];
        match query.span {
            Span::Range(range) => {
                params.push(("range", range.as_str().to_string()));
            }
            Span::Bounds { period1, period2 } => {
                params.push(("period1", period1.to_string()));
                params.push(("period2", period2.to_string()));
            }
        }

        tracing::debug!(symbol, ?query, "fetching chart from {}", self.base_url);

        let response = self
            .client
            .get(format!("{}/{}", self.base_url, symbol))
            .query(&params)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 60,
            });
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status,
                message: body,
            });
        }

        let body: ChartResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("failed to parse response: {e}")))?;

        normalize_response(symbol, body)
    }
}

/// Validate a chart payload and zip its parallel arrays into OHLC records.
fn normalize_response(
    symbol: &str,
    body: ChartResponse,
) -> Result<Vec<OhlcRecord>, ProviderError> {
    if let Some(error) = body.chart.error {
        return Err(ProviderError::Chart {
            code: error.code,
            description: error.description,
        });
    }

    let results = body
        .chart
        .result
        .ok_or_else(|| ProviderError::Parse("no results in response".into()))?;

    let result = results.first().ok_or_else(|| ProviderError::NoData {
        symbol: symbol.to_string(),
    })?;

    let mut records = parse_chart_result(result)?;
    if records.is_empty() {
        return Err(ProviderError::NoData {
            symbol: symbol.to_string(),
        });
    }

    records.sort_by_key(|r| r.date);
    Ok(records)
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
}

fn f64_to_decimal(val: f64) -> Result<Decimal, ProviderError> {
    Decimal::try_from(val).map_err(|e| ProviderError::Parse(format!("invalid decimal value: {e}")))
}

fn parse_chart_result(result: &ChartResult) -> Result<Vec<OhlcRecord>, ProviderError> {
    let timestamps = result
        .timestamp
        .as_ref()
        .ok_or_else(|| ProviderError::Parse("missing timestamps".into()))?;

    let quote = result
        .indicators
        .quote
        .first()
        .ok_or_else(|| ProviderError::Parse("missing quote data".into()))?;

    for (name, field) in [
        ("open", &quote.open),
        ("high", &quote.high),
        ("low", &quote.low),
        ("close", &quote.close),
    ] {
        if field.len() != timestamps.len() {
            return Err(ProviderError::Parse(format!(
                "{name} array has {} value(s) for {} timestamp(s)",
                field.len(),
                timestamps.len()
            )));
        }
    }

    let mut records = Vec::with_capacity(timestamps.len());

    for (i, &ts) in timestamps.iter().enumerate() {
        // Halted or pre-open intervals come back as all-null rows; skip them.
        let (Some(open), Some(high), Some(low), Some(close)) =
            (quote.open[i], quote.high[i], quote.low[i], quote.close[i])
        else {
            continue;
        };

        let date = Utc
            .timestamp_opt(ts, 0)
            .single()
            .ok_or_else(|| ProviderError::Parse(format!("invalid unix timestamp: {ts}")))?;

        records.push(OhlcRecord {
            date,
            open: f64_to_decimal(open)?,
            high: f64_to_decimal(high)?,
            low: f64_to_decimal(low)?,
            close: f64_to_decimal(close)?,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse_body(json: &str) -> ChartResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn normalize_aligned_arrays() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1736942400, 1736942700, 1736943000, 1736943300, 1736943600],
                    "indicators": {
                        "quote": [{
                            "open": [150.12, 150.99, 151.20, 151.10, 151.40],
                            "high": [151.50, 152.00, 151.80, 151.70, 152.10],
                            "low": [149.00, 150.50, 150.90, 150.80, 151.00],
                            "close": [150.99, 151.75, 151.10, 151.40, 151.95]
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let records = normalize_response("AAPL", parse_body(json)).unwrap();

        assert_eq!(records.len(), 5);
        for i in 1..records.len() {
            assert!(records[i - 1].date < records[i].date);
        }
        assert_eq!(records[0].open, dec!(150.12));
        assert_eq!(records[0].high, dec!(151.50));
        assert_eq!(records[0].low, dec!(149.00));
        assert_eq!(records[0].close, dec!(150.99));
        assert_eq!(records[4].close, dec!(151.95));
    }

    #[test]
    fn normalize_sorts_out_of_order_timestamps() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1736943000, 1736942400],
                    "indicators": {
                        "quote": [{
                            "open": [151.20, 150.12],
                            "high": [151.80, 151.50],
                            "low": [150.90, 149.00],
                            "close": [151.10, 150.99]
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let records = normalize_response("AAPL", parse_body(json)).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].date < records[1].date);
        assert_eq!(records[0].open, dec!(150.12));
    }

    #[test]
    fn mismatched_array_lengths_are_malformed() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1736942400, 1736942700, 1736943000],
                    "indicators": {
                        "quote": [{
                            "open": [150.12, 150.99],
                            "high": [151.50, 152.00, 151.80],
                            "low": [149.00, 150.50, 150.90],
                            "close": [150.99, 151.75, 151.10]
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let err = normalize_response("AAPL", parse_body(json)).unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn missing_timestamps_are_malformed() {
        let json = r#"{
            "chart": {
                "result": [{
                    "indicators": {
                        "quote": [{
                            "open": [], "high": [], "low": [], "close": []
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let err = normalize_response("AAPL", parse_body(json)).unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn empty_timestamps_are_no_data() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [],
                    "indicators": {
                        "quote": [{
                            "open": [], "high": [], "low": [], "close": []
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let err = normalize_response("AAPL", parse_body(json)).unwrap_err();
        match err {
            ProviderError::NoData { symbol } => assert_eq!(symbol, "AAPL"),
            other => panic!("expected NoData, got {other:?}"),
        }
    }

    #[test]
    fn null_rows_are_skipped() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1736942400, 1736942700, 1736943000],
                    "indicators": {
                        "quote": [{
                            "open": [150.12, null, 151.00],
                            "high": [151.50, null, 152.00],
                            "low": [149.00, null, 150.50],
                            "close": [150.99, null, 151.75]
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let records = normalize_response("AAPL", parse_body(json)).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn error_payload_carries_provider_description() {
        let json = r#"{
            "chart": {
                "result": null,
                "error": {
                    "code": "Not Found",
                    "description": "No data found, symbol may be delisted"
                }
            }
        }"#;

        let err = normalize_response("INVALID", parse_body(json)).unwrap_err();
        match err {
            ProviderError::Chart { code, description } => {
                assert_eq!(code, "Not Found");
                assert_eq!(description, "No data found, symbol may be delisted");
            }
            other => panic!("expected Chart error, got {other:?}"),
        }
    }

    #[test]
    fn f64_to_decimal_converts() {
        let result = f64_to_decimal(150.12).unwrap();
        // f64 -> Decimal may have precision nuances, but should be close
        assert!(result > dec!(150.0) && result < dec!(151.0));
    }
}
