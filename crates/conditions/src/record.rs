use serde::{Deserialize, Serialize};

use common::{Error, Result};

use crate::kind::{validate_amount, ConditionKind, ConditionType, Operand, Threshold, Zone};

/// Loosely-shaped condition as it arrives from user configuration or a
/// stored alert: every operand is optional and the type is a plain string.
///
/// Convert it with `ConditionKind::try_from(&record)`; the conversion names
/// the first field the type needs but the record lacks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionRecord {
    #[serde(rename = "type")]
    pub condition_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<String>,
    #[serde(default)]
    pub requires_price: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

impl ConditionRecord {
    fn operand(&self) -> Result<Operand> {
        if self.requires_price {
            return Ok(Operand::Price);
        }
        self.series
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(Operand::series)
            .ok_or_else(|| self.missing("series"))
    }

    fn threshold(&self) -> Result<Threshold> {
        if let Some(field) = self.comparison.as_deref().filter(|s| !s.is_empty()) {
            return Ok(Threshold::Field(field.to_string()));
        }
        match self.value.or(self.default_value) {
            Some(v) if v.is_finite() => Ok(Threshold::Value(v)),
            Some(v) => Err(Error::InvalidCondition(format!(
                "{}: value must be finite, got {v}",
                self.condition_type
            ))),
            None => Err(self.missing("value")),
        }
    }

    fn zone(&self) -> Result<Zone> {
        match self.zone.as_deref() {
            Some([min, max]) => Zone::new(*min, *max),
            Some(other) => Err(Error::InvalidCondition(format!(
                "{}: zone must hold exactly two bounds, got {}",
                self.condition_type,
                other.len()
            ))),
            None => Err(self.missing("zone")),
        }
    }

    fn amount(&self) -> Result<f64> {
        let amount = self
            .amount
            .or(self.value)
            .or(self.default_value)
            .ok_or_else(|| self.missing("amount"))?;
        validate_amount(amount)?;
        Ok(amount)
    }

    fn line(&self) -> Result<(String, String)> {
        let series1 = self.series1.clone().ok_or_else(|| self.missing("series1"))?;
        let series2 = self.series2.clone().ok_or_else(|| self.missing("series2"))?;
        Ok((series1, series2))
    }

    fn missing(&self, field: &str) -> Error {
        Error::InvalidCondition(format!(
            "{} requires '{field}' but it is absent",
            self.condition_type
        ))
    }
}

impl TryFrom<&ConditionRecord> for ConditionKind {
    type Error = Error;

    fn try_from(record: &ConditionRecord) -> Result<Self> {
        let condition_type: ConditionType = record.condition_type.parse()?;
        let kind = match condition_type {
            ConditionType::CrossesAbove => ConditionKind::CrossesAbove {
                operand: record.operand()?,
                threshold: record.threshold()?,
            },
            ConditionType::CrossesBelow => ConditionKind::CrossesBelow {
                operand: record.operand()?,
                threshold: record.threshold()?,
            },
            ConditionType::GreaterThan => ConditionKind::GreaterThan {
                operand: record.operand()?,
                threshold: record.threshold()?,
            },
            ConditionType::LessThan => ConditionKind::LessThan {
                operand: record.operand()?,
                threshold: record.threshold()?,
            },
            ConditionType::Equals => ConditionKind::Equals {
                operand: record.operand()?,
                target: record.threshold()?,
            },
            ConditionType::EntersZone => ConditionKind::EntersZone {
                operand: record.operand()?,
                zone: record.zone()?,
            },
            ConditionType::ExitsZone => ConditionKind::ExitsZone {
                operand: record.operand()?,
                zone: record.zone()?,
            },
            ConditionType::WithinZone => ConditionKind::WithinZone {
                operand: record.operand()?,
                zone: record.zone()?,
            },
            ConditionType::OutsideZone => ConditionKind::OutsideZone {
                operand: record.operand()?,
                zone: record.zone()?,
            },
            ConditionType::LineCrossesAbove => {
                let (series1, series2) = record.line()?;
                ConditionKind::LineCrossesAbove { series1, series2 }
            }
            ConditionType::LineCrossesBelow => {
                let (series1, series2) = record.line()?;
                ConditionKind::LineCrossesBelow { series1, series2 }
            }
            ConditionType::IncreasesBy => ConditionKind::IncreasesBy {
                operand: record.operand()?,
                amount: record.amount()?,
            },
            ConditionType::DecreasesBy => ConditionKind::DecreasesBy {
                operand: record.operand()?,
                amount: record.amount()?,
            },
            ConditionType::ChangesBy => ConditionKind::ChangesBy {
                operand: record.operand()?,
                amount: record.amount()?,
            },
        };
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(condition_type: &str) -> ConditionRecord {
        ConditionRecord {
            condition_type: condition_type.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn threshold_record_converts() {
        let rec = ConditionRecord {
            series: Some("value".into()),
            value: Some(70.0),
            ..record("crosses_above")
        };
        let kind = ConditionKind::try_from(&rec).unwrap();
        assert_eq!(
            kind,
            ConditionKind::CrossesAbove {
                operand: Operand::series("value"),
                threshold: Threshold::Value(70.0),
            }
        );
    }

    #[test]
    fn default_value_is_the_fallback() {
        let rec = ConditionRecord {
            series: Some("value".into()),
            default_value: Some(30.0),
            ..record("less_than")
        };
        let kind = ConditionKind::try_from(&rec).unwrap();
        assert_eq!(kind.threshold(), Some(&Threshold::Value(30.0)));

        let rec = ConditionRecord {
            value: Some(25.0),
            ..rec
        };
        let kind = ConditionKind::try_from(&rec).unwrap();
        assert_eq!(kind.threshold(), Some(&Threshold::Value(25.0)));
    }

    #[test]
    fn price_against_band_field() {
        let rec = ConditionRecord {
            comparison: Some("upper".into()),
            requires_price: true,
            ..record("crosses_above")
        };
        let kind = ConditionKind::try_from(&rec).unwrap();
        assert!(kind.requires_price());
        assert_eq!(kind.threshold(), Some(&Threshold::Field("upper".into())));
    }

    #[test]
    fn missing_operand_names_the_field() {
        let rec = ConditionRecord {
            value: Some(70.0),
            ..record("crosses_above")
        };
        let err = ConditionKind::try_from(&rec).unwrap_err();
        assert!(err.to_string().contains("'series'"), "{err}");

        let rec = ConditionRecord {
            series1: Some("macd".into()),
            ..record("line_crosses_above")
        };
        let err = ConditionKind::try_from(&rec).unwrap_err();
        assert!(err.to_string().contains("'series2'"), "{err}");
    }

    #[test]
    fn malformed_zones_are_rejected() {
        let base = ConditionRecord {
            series: Some("value".into()),
            ..record("within_zone")
        };
        for zone in [vec![1.0], vec![1.0, 2.0, 3.0], vec![100.0, 0.0]] {
            let rec = ConditionRecord {
                zone: Some(zone),
                ..base.clone()
            };
            assert!(ConditionKind::try_from(&rec).is_err());
        }
        assert!(ConditionKind::try_from(&base).is_err());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let rec = ConditionRecord {
            series: Some("value".into()),
            value: Some(1.0),
            ..record("crosses_sideways")
        };
        assert!(ConditionKind::try_from(&rec).is_err());
    }

    #[test]
    fn delta_amount_falls_back_to_value() {
        let rec = ConditionRecord {
            series: Some("value".into()),
            value: Some(5.0),
            ..record("increases_by")
        };
        let kind = ConditionKind::try_from(&rec).unwrap();
        assert_eq!(kind.amount(), Some(5.0));
    }

    #[test]
    fn parses_camel_case_json() {
        let json = r#"{"type":"crosses_below","comparison":"lower","requiresPrice":true}"#;
        let rec: ConditionRecord = serde_json::from_str(json).unwrap();
        assert!(rec.requires_price);
        let kind = ConditionKind::try_from(&rec).unwrap();
        assert_eq!(kind.condition_type(), ConditionType::CrossesBelow);
    }
}
