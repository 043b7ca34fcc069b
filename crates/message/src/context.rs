use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use common::{BarEvent, IndicatorSnapshot};

/// Alert fields exposed as `{{alert.name}}` and `{{alert.condition}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertMeta {
    pub name: String,
    pub condition: String,
}

/// Data bag a message template is rendered against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageContext {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub exchange: String,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub indicators: IndicatorSnapshot,
    #[serde(default)]
    pub alert: Option<AlertMeta>,
}

impl MessageContext {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    /// Everything a bar carries: symbol, exchange, OHLCV, time, indicators.
    pub fn from_bar(bar: &BarEvent) -> Self {
        Self {
            symbol: bar.symbol.clone(),
            exchange: bar.exchange.clone(),
            open: Some(bar.price.open),
            high: Some(bar.price.high),
            low: Some(bar.price.low),
            close: Some(bar.price.close),
            volume: Some(bar.price.volume),
            time: Some(bar.time),
            indicators: bar.indicators.clone(),
            alert: None,
        }
    }

    pub fn with_alert(mut self, name: impl Into<String>, condition: impl Into<String>) -> Self {
        self.alert = Some(AlertMeta {
            name: name.into(),
            condition: condition.into(),
        });
        self
    }
}
