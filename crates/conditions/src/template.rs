use serde::{Deserialize, Serialize};

use common::{Error, Result};

use crate::kind::{ConditionKind, ConditionType, Zone};

/// A condition an indicator supports, with its default operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionTemplate {
    /// Unique within the owning indicator.
    pub id: String,
    pub label: String,
    pub description: String,
    pub kind: ConditionKind,
}

impl ConditionTemplate {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
        kind: ConditionKind,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: description.into(),
            kind,
        }
    }

    pub fn condition_type(&self) -> ConditionType {
        self.kind.condition_type()
    }

    /// Bind the template to `indicator`, applying user overrides.
    pub fn instantiate(
        &self,
        indicator: &str,
        overrides: &ConditionOverrides,
    ) -> Result<ConditionInstance> {
        let mut kind = self.kind.clone();
        if let Some(value) = overrides.value {
            kind = kind.with_value(value)?;
        }
        if let Some([min, max]) = overrides.zone {
            kind = kind.with_zone(Zone::new(min, max)?)?;
        }
        if let Some(amount) = overrides.amount {
            kind = kind.with_amount(amount)?;
        }
        Ok(ConditionInstance {
            indicator: indicator.to_string(),
            template_id: self.id.clone(),
            label: self.label.clone(),
            kind,
        })
    }
}

/// User-supplied replacements for a template's default operands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionOverrides {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub zone: Option<[f64; 2]>,
    #[serde(default)]
    pub amount: Option<f64>,
}

impl ConditionOverrides {
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.zone.is_none() && self.amount.is_none()
    }
}

/// A template bound to an indicator with the user's parameters.
/// Immutable for the lifetime of the alert that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionInstance {
    pub indicator: String,
    pub template_id: String,
    pub label: String,
    pub kind: ConditionKind,
}

impl ConditionInstance {
    /// Instance not backed by a registry template; the label is the description.
    pub fn new(indicator: impl Into<String>, kind: ConditionKind) -> Self {
        let label = kind.describe();
        Self {
            indicator: indicator.into(),
            template_id: kind.condition_type().as_str().to_string(),
            label,
            kind,
        }
    }

    pub fn condition_type(&self) -> ConditionType {
        self.kind.condition_type()
    }

    pub fn requires_price(&self) -> bool {
        self.kind.requires_price()
    }

    /// `"rsi value crosses above 70"`.
    pub fn describe(&self) -> String {
        format!("{} {}", self.indicator, self.kind.describe())
    }

    /// Fails when the condition reads a series the indicator does not declare.
    pub fn check_series(&self, declared: &[String]) -> Result<()> {
        for name in self.kind.series_names() {
            if !declared.iter().any(|d| d == name) {
                return Err(Error::InvalidCondition(format!(
                    "{} has no series '{name}'",
                    self.indicator
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{Operand, Threshold};

    fn overbought() -> ConditionTemplate {
        ConditionTemplate::new(
            "crosses_above_overbought",
            "Crosses above overbought",
            "RSI crosses above the overbought level",
            ConditionKind::CrossesAbove {
                operand: Operand::series("value"),
                threshold: Threshold::Value(70.0),
            },
        )
    }

    #[test]
    fn instantiate_without_overrides_keeps_defaults() {
        let inst = overbought()
            .instantiate("rsi", &ConditionOverrides::default())
            .unwrap();
        assert_eq!(inst.indicator, "rsi");
        assert_eq!(inst.template_id, "crosses_above_overbought");
        assert_eq!(inst.kind.threshold(), Some(&Threshold::Value(70.0)));
        assert_eq!(inst.describe(), "rsi value crosses above 70");
    }

    #[test]
    fn instantiate_applies_value_override() {
        let overrides = ConditionOverrides {
            value: Some(80.0),
            ..Default::default()
        };
        let inst = overbought().instantiate("rsi", &overrides).unwrap();
        assert_eq!(inst.kind.threshold(), Some(&Threshold::Value(80.0)));
    }

    #[test]
    fn inapplicable_override_is_an_error() {
        let overrides = ConditionOverrides {
            zone: Some([0.0, 10.0]),
            ..Default::default()
        };
        assert!(overbought().instantiate("rsi", &overrides).is_err());
    }

    #[test]
    fn check_series_flags_undeclared_names() {
        let inst = ConditionInstance::new(
            "macd",
            ConditionKind::LineCrossesAbove {
                series1: "macd".into(),
                series2: "signal".into(),
            },
        );
        assert!(inst
            .check_series(&["macd".into(), "signal".into(), "histogram".into()])
            .is_ok());
        assert!(inst.check_series(&["macd".into()]).is_err());
    }
}
