use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::ResolveError;

/// User-facing time-range preset selected in the chart UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    M5,
    M15,
    M30,
    H1,
    D1,
    D5,
    Mo1,
    Custom,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::M5 => "5m",
            Period::M15 => "15m",
            Period::M30 => "30m",
            Period::H1 => "1h",
            Period::D1 => "1d",
            Period::D5 => "5d",
            Period::Mo1 => "1mo",
            Period::Custom => "custom",
        }
    }

    /// Map this preset to the upstream query parameters.
    ///
    /// Every fixed preset maps to a constant (interval, range) pair.
    /// `Custom` requires both bounds and maps to explicit epoch-second
    /// period1/period2 parameters at daily granularity.
    pub fn resolve(
        self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<ChartQuery, ResolveError> {
        let query = match self {
            Period::M5 => ChartQuery::ranged(Interval::M5, Range::D1),
            Period::M15 => ChartQuery::ranged(Interval::M15, Range::D1),
            Period::M30 => ChartQuery::ranged(Interval::M30, Range::D1),
            Period::H1 => ChartQuery::ranged(Interval::M60, Range::D1),
            Period::D1 => ChartQuery::ranged(Interval::D1, Range::D5),
            Period::D5 => ChartQuery::ranged(Interval::D1, Range::Mo1),
            Period::Mo1 => ChartQuery::ranged(Interval::D1, Range::Mo1),
            Period::Custom => {
                let (from, to) = match (from, to) {
                    (Some(from), Some(to)) => (from, to),
                    _ => return Err(ResolveError::MissingBounds),
                };
                ChartQuery {
                    interval: Interval::D1,
                    span: Span::Bounds {
                        period1: from.timestamp(),
                        period2: to.timestamp(),
                    },
                }
            }
        };
        Ok(query)
    }
}

impl FromStr for Period {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "5m" => Ok(Period::M5),
            "15m" => Ok(Period::M15),
            "30m" => Ok(Period::M30),
            "1h" => Ok(Period::H1),
            "1d" => Ok(Period::D1),
            "5d" => Ok(Period::D5),
            "1mo" => Ok(Period::Mo1),
            "custom" => Ok(Period::Custom),
            other => Err(ResolveError::UnknownPeriod(other.to_string())),
        }
    }
}

/// Upstream sampling granularity. `as_str` emits the exact wire token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    M5,
    M15,
    M30,
    M60,
    D1,
}

impl Interval {
    pub fn as_str(self) -> &'static str {
        match self {
            Interval::M5 => "5m",
            Interval::M15 => "15m",
            Interval::M30 => "30m",
            Interval::M60 => "60m",
            Interval::D1 => "1d",
        }
    }
}

/// Upstream lookback span. `as_str` emits the exact wire token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    D1,
    D5,
    Mo1,
}

impl Range {
    pub fn as_str(self) -> &'static str {
        match self {
            Range::D1 => "1d",
            Range::D5 => "5d",
            Range::Mo1 => "1mo",
        }
    }
}

/// Query parameters for one upstream chart request.
/// Built per request from a [`Period`], consumed once, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartQuery {
    pub interval: Interval,
    pub span: Span,
}

impl ChartQuery {
    fn ranged(interval: Interval, range: Range) -> Self {
        Self {
            interval,
            span: Span::Range(range),
        }
    }
}

/// Lookback span: either a named range or explicit epoch-second bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    Range(Range),
    Bounds { period1: i64, period2: i64 },
}
