use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use common::{Error, Result};

/// The closed set of alert condition types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    CrossesAbove,
    CrossesBelow,
    GreaterThan,
    LessThan,
    Equals,
    EntersZone,
    ExitsZone,
    WithinZone,
    OutsideZone,
    LineCrossesAbove,
    LineCrossesBelow,
    IncreasesBy,
    DecreasesBy,
    ChangesBy,
}

impl ConditionType {
    pub const ALL: [ConditionType; 14] = [
        ConditionType::CrossesAbove,
        ConditionType::CrossesBelow,
        ConditionType::GreaterThan,
        ConditionType::LessThan,
        ConditionType::Equals,
        ConditionType::EntersZone,
        ConditionType::ExitsZone,
        ConditionType::WithinZone,
        ConditionType::OutsideZone,
        ConditionType::LineCrossesAbove,
        ConditionType::LineCrossesBelow,
        ConditionType::IncreasesBy,
        ConditionType::DecreasesBy,
        ConditionType::ChangesBy,
    ];

    /// Wire name, e.g. `"crosses_above"`.
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionType::CrossesAbove => "crosses_above",
            ConditionType::CrossesBelow => "crosses_below",
            ConditionType::GreaterThan => "greater_than",
            ConditionType::LessThan => "less_than",
            ConditionType::Equals => "equals",
            ConditionType::EntersZone => "enters_zone",
            ConditionType::ExitsZone => "exits_zone",
            ConditionType::WithinZone => "within_zone",
            ConditionType::OutsideZone => "outside_zone",
            ConditionType::LineCrossesAbove => "line_crosses_above",
            ConditionType::LineCrossesBelow => "line_crosses_below",
            ConditionType::IncreasesBy => "increases_by",
            ConditionType::DecreasesBy => "decreases_by",
            ConditionType::ChangesBy => "changes_by",
        }
    }

    /// Fires only on the bar where the state changes.
    pub fn is_edge_triggered(self) -> bool {
        matches!(
            self,
            ConditionType::CrossesAbove
                | ConditionType::CrossesBelow
                | ConditionType::Equals
                | ConditionType::EntersZone
                | ConditionType::ExitsZone
                | ConditionType::LineCrossesAbove
                | ConditionType::LineCrossesBelow
        )
    }

    /// Fires on every bar while the state holds. Only the current bar is read.
    pub fn is_level_triggered(self) -> bool {
        matches!(
            self,
            ConditionType::GreaterThan
                | ConditionType::LessThan
                | ConditionType::WithinZone
                | ConditionType::OutsideZone
        )
    }

    /// Compares the bar-to-bar change against an amount.
    pub fn is_delta(self) -> bool {
        matches!(
            self,
            ConditionType::IncreasesBy | ConditionType::DecreasesBy | ConditionType::ChangesBy
        )
    }

    pub fn uses_zone(self) -> bool {
        matches!(
            self,
            ConditionType::EntersZone
                | ConditionType::ExitsZone
                | ConditionType::WithinZone
                | ConditionType::OutsideZone
        )
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ConditionType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::InvalidCondition(format!("unknown condition type '{s}'")))
    }
}

/// The left-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// A named series of the alert's indicator.
    Series(String),
    /// The close of the external price snapshot.
    Price,
}

impl Operand {
    pub fn series(name: impl Into<String>) -> Self {
        Operand::Series(name.into())
    }

    pub fn is_price(&self) -> bool {
        matches!(self, Operand::Price)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Series(name) => f.write_str(name),
            Operand::Price => f.write_str("price"),
        }
    }
}

/// The right-hand side of a threshold comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    /// Fixed level.
    Value(f64),
    /// Another series of the same indicator, read from the current bar
    /// (e.g. price against a band's `upper`).
    Field(String),
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Value(v) => write!(f, "{}", trim_float(*v)),
            Threshold::Field(name) => f.write_str(name),
        }
    }
}

/// Inclusive `[min, max]` range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Zone {
    min: f64,
    max: f64,
}

impl Zone {
    /// Fails for non-finite bounds or `min > max`.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(Error::InvalidCondition(format!(
                "zone bounds must be finite, got [{min}, {max}]"
            )));
        }
        if min > max {
            return Err(Error::InvalidCondition(format!(
                "zone min must not exceed max, got [{min}, {max}]"
            )));
        }
        Ok(Self { min, max })
    }

    /// Caller guarantees finite bounds with `min <= max`.
    pub(crate) const fn new_unchecked(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl TryFrom<[f64; 2]> for Zone {
    type Error = Error;

    fn try_from(bounds: [f64; 2]) -> Result<Self> {
        Zone::new(bounds[0], bounds[1])
    }
}

impl From<Zone> for [f64; 2] {
    fn from(zone: Zone) -> Self {
        [zone.min, zone.max]
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", trim_float(self.min), trim_float(self.max))
    }
}

/// A condition with exactly the operands its type needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionKind {
    CrossesAbove { operand: Operand, threshold: Threshold },
    CrossesBelow { operand: Operand, threshold: Threshold },
    GreaterThan { operand: Operand, threshold: Threshold },
    LessThan { operand: Operand, threshold: Threshold },
    Equals { operand: Operand, target: Threshold },
    EntersZone { operand: Operand, zone: Zone },
    ExitsZone { operand: Operand, zone: Zone },
    WithinZone { operand: Operand, zone: Zone },
    OutsideZone { operand: Operand, zone: Zone },
    LineCrossesAbove { series1: String, series2: String },
    LineCrossesBelow { series1: String, series2: String },
    IncreasesBy {
        operand: Operand,
        #[serde(deserialize_with = "deserialize_amount")]
        amount: f64,
    },
    DecreasesBy {
        operand: Operand,
        #[serde(deserialize_with = "deserialize_amount")]
        amount: f64,
    },
    ChangesBy {
        operand: Operand,
        #[serde(deserialize_with = "deserialize_amount")]
        amount: f64,
    },
}

impl ConditionKind {
    pub fn condition_type(&self) -> ConditionType {
        match self {
            ConditionKind::CrossesAbove { .. } => ConditionType::CrossesAbove,
            ConditionKind::CrossesBelow { .. } => ConditionType::CrossesBelow,
            ConditionKind::GreaterThan { .. } => ConditionType::GreaterThan,
            ConditionKind::LessThan { .. } => ConditionType::LessThan,
            ConditionKind::Equals { .. } => ConditionType::Equals,
            ConditionKind::EntersZone { .. } => ConditionType::EntersZone,
            ConditionKind::ExitsZone { .. } => ConditionType::ExitsZone,
            ConditionKind::WithinZone { .. } => ConditionType::WithinZone,
            ConditionKind::OutsideZone { .. } => ConditionType::OutsideZone,
            ConditionKind::LineCrossesAbove { .. } => ConditionType::LineCrossesAbove,
            ConditionKind::LineCrossesBelow { .. } => ConditionType::LineCrossesBelow,
            ConditionKind::IncreasesBy { .. } => ConditionType::IncreasesBy,
            ConditionKind::DecreasesBy { .. } => ConditionType::DecreasesBy,
            ConditionKind::ChangesBy { .. } => ConditionType::ChangesBy,
        }
    }

    /// Left-hand side, `None` for two-line crossovers.
    pub fn operand(&self) -> Option<&Operand> {
        match self {
            ConditionKind::CrossesAbove { operand, .. }
            | ConditionKind::CrossesBelow { operand, .. }
            | ConditionKind::GreaterThan { operand, .. }
            | ConditionKind::LessThan { operand, .. }
            | ConditionKind::Equals { operand, .. }
            | ConditionKind::EntersZone { operand, .. }
            | ConditionKind::ExitsZone { operand, .. }
            | ConditionKind::WithinZone { operand, .. }
            | ConditionKind::OutsideZone { operand, .. }
            | ConditionKind::IncreasesBy { operand, .. }
            | ConditionKind::DecreasesBy { operand, .. }
            | ConditionKind::ChangesBy { operand, .. } => Some(operand),
            ConditionKind::LineCrossesAbove { .. } | ConditionKind::LineCrossesBelow { .. } => None,
        }
    }

    pub fn requires_price(&self) -> bool {
        self.operand().is_some_and(Operand::is_price)
    }

    pub fn threshold(&self) -> Option<&Threshold> {
        match self {
            ConditionKind::CrossesAbove { threshold, .. }
            | ConditionKind::CrossesBelow { threshold, .. }
            | ConditionKind::GreaterThan { threshold, .. }
            | ConditionKind::LessThan { threshold, .. }
            | ConditionKind::Equals { target: threshold, .. } => Some(threshold),
            _ => None,
        }
    }

    pub fn zone(&self) -> Option<Zone> {
        match self {
            ConditionKind::EntersZone { zone, .. }
            | ConditionKind::ExitsZone { zone, .. }
            | ConditionKind::WithinZone { zone, .. }
            | ConditionKind::OutsideZone { zone, .. } => Some(*zone),
            _ => None,
        }
    }

    pub fn amount(&self) -> Option<f64> {
        match self {
            ConditionKind::IncreasesBy { amount, .. }
            | ConditionKind::DecreasesBy { amount, .. }
            | ConditionKind::ChangesBy { amount, .. } => Some(*amount),
            _ => None,
        }
    }

    /// Every indicator series the condition reads.
    pub fn series_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        match self {
            ConditionKind::LineCrossesAbove { series1, series2 }
            | ConditionKind::LineCrossesBelow { series1, series2 } => {
                names.push(series1.as_str());
                names.push(series2.as_str());
            }
            _ => {
                if let Some(Operand::Series(name)) = self.operand() {
                    names.push(name.as_str());
                }
                if let Some(Threshold::Field(name)) = self.threshold() {
                    names.push(name.as_str());
                }
            }
        }
        names
    }

    /// Replace the fixed threshold. Rejected for kinds without one and for
    /// thresholds that read another series.
    pub fn with_value(mut self, value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::InvalidCondition(format!(
                "value must be finite, got {value}"
            )));
        }
        let kind = self.condition_type();
        match &mut self {
            ConditionKind::CrossesAbove { threshold, .. }
            | ConditionKind::CrossesBelow { threshold, .. }
            | ConditionKind::GreaterThan { threshold, .. }
            | ConditionKind::LessThan { threshold, .. }
            | ConditionKind::Equals { target: threshold, .. } => match threshold {
                Threshold::Value(v) => *v = value,
                Threshold::Field(name) => {
                    return Err(Error::InvalidCondition(format!(
                        "{kind} compares against series '{name}'; a fixed value does not apply"
                    )))
                }
            },
            _ => {
                return Err(Error::InvalidCondition(format!(
                    "{kind} does not take a value"
                )))
            }
        }
        Ok(self)
    }

    pub fn with_zone(mut self, new_zone: Zone) -> Result<Self> {
        match &mut self {
            ConditionKind::EntersZone { zone, .. }
            | ConditionKind::ExitsZone { zone, .. }
            | ConditionKind::WithinZone { zone, .. }
            | ConditionKind::OutsideZone { zone, .. } => *zone = new_zone,
            other => {
                return Err(Error::InvalidCondition(format!(
                    "{} does not take a zone",
                    other.condition_type()
                )))
            }
        }
        Ok(self)
    }

    pub fn with_amount(mut self, new_amount: f64) -> Result<Self> {
        validate_amount(new_amount)?;
        match &mut self {
            ConditionKind::IncreasesBy { amount, .. }
            | ConditionKind::DecreasesBy { amount, .. }
            | ConditionKind::ChangesBy { amount, .. } => *amount = new_amount,
            other => {
                return Err(Error::InvalidCondition(format!(
                    "{} does not take an amount",
                    other.condition_type()
                )))
            }
        }
        Ok(self)
    }

    /// Short human description, e.g. `"value crosses above 70"`.
    pub fn describe(&self) -> String {
        match self {
            ConditionKind::CrossesAbove { operand, threshold } => {
                format!("{operand} crosses above {threshold}")
            }
            ConditionKind::CrossesBelow { operand, threshold } => {
                format!("{operand} crosses below {threshold}")
            }
            ConditionKind::GreaterThan { operand, threshold } => {
                format!("{operand} is greater than {threshold}")
            }
            ConditionKind::LessThan { operand, threshold } => {
                format!("{operand} is less than {threshold}")
            }
            ConditionKind::Equals { operand, target } => format!("{operand} equals {target}"),
            ConditionKind::EntersZone { operand, zone } => format!("{operand} enters {zone}"),
            ConditionKind::ExitsZone { operand, zone } => format!("{operand} exits {zone}"),
            ConditionKind::WithinZone { operand, zone } => format!("{operand} is within {zone}"),
            ConditionKind::OutsideZone { operand, zone } => format!("{operand} is outside {zone}"),
            ConditionKind::LineCrossesAbove { series1, series2 } => {
                format!("{series1} crosses above {series2}")
            }
            ConditionKind::LineCrossesBelow { series1, series2 } => {
                format!("{series1} crosses below {series2}")
            }
            ConditionKind::IncreasesBy { operand, amount } => {
                format!("{operand} increases by {}", trim_float(*amount))
            }
            ConditionKind::DecreasesBy { operand, amount } => {
                format!("{operand} decreases by {}", trim_float(*amount))
            }
            ConditionKind::ChangesBy { operand, amount } => {
                format!("{operand} changes by {}", trim_float(*amount))
            }
        }
    }
}

pub(crate) fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidCondition(format!(
            "amount must be a finite non-negative number, got {amount}"
        )));
    }
    Ok(())
}

fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let amount = f64::deserialize(deserializer)?;
    validate_amount(amount).map_err(serde::de::Error::custom)?;
    Ok(amount)
}

/// `70.0` -> `"70"`, `0.5` -> `"0.5"`.
fn trim_float(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}
