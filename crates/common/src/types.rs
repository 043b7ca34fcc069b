use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Values of every series one indicator produced for a bar, keyed by series
/// name (`"value"`, `"macd"`, `"signal"`, `"k"`, ...).
pub type SeriesValues = HashMap<String, f64>;

/// All indicator values computed for one bar, keyed by indicator id.
///
/// Supplied by the host per bar. Evaluation only ever reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorSnapshot {
    indicators: HashMap<String, SeriesValues>,
}

impl IndicatorSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, indicator: &str, series: &str, value: f64) -> Self {
        self.insert(indicator, series, value);
        self
    }

    pub fn insert(&mut self, indicator: &str, series: &str, value: f64) {
        self.indicators
            .entry(indicator.to_string())
            .or_default()
            .insert(series.to_string(), value);
    }

    /// Replace every series of `indicator` at once.
    pub fn set_series(&mut self, indicator: &str, values: SeriesValues) {
        self.indicators.insert(indicator.to_string(), values);
    }

    /// Read one series value. `None` when either the indicator or the series is absent.
    pub fn get(&self, indicator: &str, series: &str) -> Option<f64> {
        self.indicators.get(indicator)?.get(series).copied()
    }

    pub fn series(&self, indicator: &str) -> Option<&SeriesValues> {
        self.indicators.get(indicator)
    }

    pub fn contains(&self, indicator: &str) -> bool {
        self.indicators.contains_key(indicator)
    }

    /// A copy holding only `indicator`'s series (empty if it is absent).
    pub fn only(&self, indicator: &str) -> Self {
        let mut out = Self::new();
        if let Some(values) = self.indicators.get(indicator) {
            out.set_series(indicator, values.clone());
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SeriesValues)> {
        self.indicators.iter()
    }
}

/// OHLCV values of one bar. The close is the "price" side of price-based conditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl PriceSnapshot {
    /// Snapshot where every OHLC field is `price`.
    pub fn flat(price: f64) -> Self {
        Self {
            open: price,
            high: price,
            low: price,
            close: price,
            volume: 0.0,
        }
    }

    pub fn price(&self) -> f64 {
        self.close
    }
}

/// One bar (or intra-bar tick) delivered by the host's data feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarEvent {
    pub symbol: String,
    #[serde(default)]
    pub exchange: String,
    /// Open time of the bar. Ticks inside the same bar share this value.
    pub time: DateTime<Utc>,
    #[serde(flatten)]
    pub price: PriceSnapshot,
    #[serde(default)]
    pub indicators: IndicatorSnapshot,
    /// True when the bar is final. Intra-bar ticks arrive with `false`.
    #[serde(default = "default_closed")]
    pub is_bar_closed: bool,
}

fn default_closed() -> bool {
    true
}

/// Emitted when an alert's condition fired on a bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertFired {
    pub alert_id: String,
    pub name: String,
    pub symbol: String,
    pub indicator: String,
    /// Wire name of the condition type, e.g. `crosses_above`.
    pub condition: String,
    /// Rendered message text.
    pub message: String,
    pub price: f64,
    pub time: DateTime<Utc>,
}
