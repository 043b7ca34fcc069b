use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use common::{Error, Result};
use conditions::{ConditionOverrides, ConditionRegistry};

use crate::alert::{Alert, AlertFrequency};

/// Top-level alert config file (TOML).
///
/// Example `config/alerts.toml`:
/// ```toml
/// [[alert]]
/// name = "TCS overbought"
/// symbol = "TCS"
/// indicator = "rsi"
/// condition = "crosses_above_overbought"
/// value = 75.0
/// frequency = "once_per_bar"
/// message = "{{symbol}} RSI crossed {{rsi}} at {{close}}"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AlertFileConfig {
    #[serde(rename = "alert", default)]
    pub alerts: Vec<AlertConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AlertConfig {
    /// Generated when omitted.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub symbol: String,
    /// Indicator id from the condition registry, e.g. "rsi".
    pub indicator: String,
    /// Condition id within that indicator, e.g. "crosses_above_overbought".
    pub condition: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub frequency: AlertFrequency,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub zone: Option<[f64; 2]>,
    #[serde(default)]
    pub amount: Option<f64>,
}

impl AlertConfig {
    pub fn overrides(&self) -> ConditionOverrides {
        ConditionOverrides {
            value: self.value,
            zone: self.zone,
            amount: self.amount,
        }
    }

    /// Resolve the condition against `registry` and build the alert.
    pub fn to_alert(&self, registry: &ConditionRegistry) -> Result<Alert> {
        let condition = registry
            .instantiate(&self.indicator, &self.condition, &self.overrides())
            .map_err(|e| Error::Config(format!("alert '{}': {e}", self.name)))?;

        let mut alert = Alert::new(&self.name, &self.symbol, condition).with_frequency(self.frequency);
        if let Some(id) = &self.id {
            alert = alert.with_id(id);
        }
        if let Some(template) = &self.message {
            alert = alert.with_message(template);
        }
        Ok(alert)
    }
}

impl AlertFileConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read alert config at '{path}': {e}")))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Build every alert, failing on the first unresolvable one or a repeated id.
    pub fn to_alerts(&self, registry: &ConditionRegistry) -> Result<Vec<Alert>> {
        let mut seen = HashSet::new();
        let mut alerts = Vec::with_capacity(self.alerts.len());
        for cfg in &self.alerts {
            let alert = cfg.to_alert(registry)?;
            if !seen.insert(alert.id.clone()) {
                return Err(Error::Config(format!("duplicate alert id '{}'", alert.id)));
            }
            alerts.push(alert);
        }
        Ok(alerts)
    }
}
