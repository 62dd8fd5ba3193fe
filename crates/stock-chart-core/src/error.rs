use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unknown period: {0}. Expected: 5m, 15m, 30m, 1h, 1d, 5d, 1mo, custom")]
    UnknownPeriod(String),

    #[error("Missing date range for custom period")]
    MissingBounds,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_bounds_message_matches_endpoint_contract() {
        assert_eq!(
            ResolveError::MissingBounds.to_string(),
            "Missing date range for custom period"
        );
    }
}
