use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

use common::{Error, Result};

use crate::catalog;
use crate::kind::validate_amount;
use crate::template::{ConditionInstance, ConditionOverrides, ConditionTemplate};

/// Alert support declared by one indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorAlertConfig {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Series names the indicator writes into each snapshot.
    pub series: Vec<String>,
    pub conditions: Vec<ConditionTemplate>,
}

impl IndicatorAlertConfig {
    pub fn condition(&self, condition_id: &str) -> Option<&ConditionTemplate> {
        self.conditions.iter().find(|c| c.id == condition_id)
    }
}

/// Read-only catalog of alertable indicators and their condition templates.
///
/// Immutable after construction, so a shared reference can be read from any
/// number of threads.
#[derive(Debug, Clone)]
pub struct ConditionRegistry {
    indicators: Vec<IndicatorAlertConfig>,
    index: HashMap<String, usize>,
}

static BUILTIN: OnceLock<ConditionRegistry> = OnceLock::new();

impl ConditionRegistry {
    /// Build a registry, rejecting duplicate ids and conditions that read
    /// series their indicator does not declare.
    pub fn new(indicators: Vec<IndicatorAlertConfig>) -> Result<Self> {
        let registry = Self::index(indicators);
        registry.validate()?;
        Ok(registry)
    }

    /// The catalog shipped with the crate, built on first use.
    pub fn builtin() -> &'static ConditionRegistry {
        BUILTIN.get_or_init(|| Self::index(catalog::builtin()))
    }

    fn index(indicators: Vec<IndicatorAlertConfig>) -> Self {
        let mut index = HashMap::with_capacity(indicators.len());
        for (pos, config) in indicators.iter().enumerate() {
            if index.insert(config.id.clone(), pos).is_some() {
                warn!(indicator = %config.id, "Duplicate indicator in condition catalog; later entry wins");
            }
        }
        Self { indicators, index }
    }

    /// Check catalog consistency.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for config in &self.indicators {
            if !seen.insert(config.id.as_str()) {
                return Err(Error::Config(format!(
                    "indicator '{}' is declared twice",
                    config.id
                )));
            }
            let mut condition_ids = HashSet::new();
            for template in &config.conditions {
                if !condition_ids.insert(template.id.as_str()) {
                    return Err(Error::Config(format!(
                        "condition '{}' is declared twice for '{}'",
                        template.id, config.id
                    )));
                }
                ConditionInstance {
                    indicator: config.id.clone(),
                    template_id: template.id.clone(),
                    label: template.label.clone(),
                    kind: template.kind.clone(),
                }
                .check_series(&config.series)?;
                if let Some(amount) = template.kind.amount() {
                    validate_amount(amount)?;
                }
            }
        }
        Ok(())
    }

    /// `None` when the indicator has no alert support.
    pub fn indicator_config(&self, indicator_id: &str) -> Option<&IndicatorAlertConfig> {
        self.index
            .get(indicator_id)
            .and_then(|&pos| self.indicators.get(pos))
    }

    pub fn alertable_indicators(&self) -> &[IndicatorAlertConfig] {
        &self.indicators
    }

    pub fn is_alertable(&self, indicator_id: &str) -> bool {
        self.index.contains_key(indicator_id)
    }

    pub fn condition_template(
        &self,
        indicator_id: &str,
        condition_id: &str,
    ) -> Option<&ConditionTemplate> {
        self.indicator_config(indicator_id)?.condition(condition_id)
    }

    /// Look up a template and bind it with the user's overrides.
    pub fn instantiate(
        &self,
        indicator_id: &str,
        condition_id: &str,
        overrides: &ConditionOverrides,
    ) -> Result<ConditionInstance> {
        let config = self
            .indicator_config(indicator_id)
            .ok_or_else(|| Error::UnknownIndicator(indicator_id.to_string()))?;
        let template = config
            .condition(condition_id)
            .ok_or_else(|| Error::UnknownCondition {
                indicator: indicator_id.to_string(),
                condition: condition_id.to_string(),
            })?;
        template.instantiate(indicator_id, overrides)
    }
}

// ─── Built-in catalog shortcuts ───────────────────────────────────────────────

pub fn indicator_config(indicator_id: &str) -> Option<&'static IndicatorAlertConfig> {
    ConditionRegistry::builtin().indicator_config(indicator_id)
}

pub fn alertable_indicators() -> &'static [IndicatorAlertConfig] {
    ConditionRegistry::builtin().alertable_indicators()
}

pub fn is_alertable(indicator_id: &str) -> bool {
    ConditionRegistry::builtin().is_alertable(indicator_id)
}

pub fn condition_template(
    indicator_id: &str,
    condition_id: &str,
) -> Option<&'static ConditionTemplate> {
    ConditionRegistry::builtin().condition_template(indicator_id, condition_id)
}
