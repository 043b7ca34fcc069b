use thiserror::Error;
use tracing::{debug, warn};

use common::{IndicatorSnapshot, PriceSnapshot};
use conditions::{ConditionInstance, ConditionKind, ConditionRecord, Operand, Threshold};

/// Why a bar could not be decided. Every variant evaluates to `false`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Indeterminate {
    #[error("no previous bar to compare against")]
    NoPreviousBar,

    #[error("series '{series}' of '{indicator}' is absent")]
    MissingSeries { indicator: String, series: String },

    #[error("price snapshot is absent")]
    MissingPrice,

    #[error("'{name}' is not a finite number ({value})")]
    NonFinite { name: String, value: f64 },
}

/// Read access to one bar: the alert's indicator series plus the price.
struct Bar<'a> {
    indicator: &'a str,
    snapshot: Option<&'a IndicatorSnapshot>,
    price: Option<&'a PriceSnapshot>,
}

impl<'a> Bar<'a> {
    fn series(&self, name: &str) -> Result<f64, Indeterminate> {
        let value = self
            .snapshot
            .and_then(|s| s.get(self.indicator, name))
            .ok_or_else(|| Indeterminate::MissingSeries {
                indicator: self.indicator.to_string(),
                series: name.to_string(),
            })?;
        finite(name, value)
    }

    fn operand(&self, operand: &Operand) -> Result<f64, Indeterminate> {
        match operand {
            Operand::Series(name) => self.series(name),
            Operand::Price => {
                let price = self.price.ok_or(Indeterminate::MissingPrice)?;
                finite("price", price.price())
            }
        }
    }

    fn threshold(&self, threshold: &Threshold) -> Result<f64, Indeterminate> {
        match threshold {
            Threshold::Value(v) => finite("threshold", *v),
            Threshold::Field(name) => self.series(name),
        }
    }
}

fn previous_bar<'a>(
    indicator: &'a str,
    snapshot: Option<&'a IndicatorSnapshot>,
    price: Option<&'a PriceSnapshot>,
) -> Result<Bar<'a>, Indeterminate> {
    if snapshot.is_none() && price.is_none() {
        return Err(Indeterminate::NoPreviousBar);
    }
    Ok(Bar {
        indicator,
        snapshot,
        price,
    })
}

fn finite(name: &str, value: f64) -> Result<f64, Indeterminate> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Indeterminate::NonFinite {
            name: name.to_string(),
            value,
        })
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < f64::EPSILON
}

/// Decide whether `condition` fires on the current bar.
///
/// `previous` and `previous_price` describe the immediately preceding bar;
/// pass `None` for both on the first bar. Edge-triggered and delta
/// conditions need the previous bar, level-triggered ones read only the
/// current bar. A fixed threshold or a `Field` threshold read from the
/// *current* snapshot is used for both sides of a cross.
pub fn try_evaluate(
    condition: &ConditionInstance,
    current: &IndicatorSnapshot,
    previous: Option<&IndicatorSnapshot>,
    current_price: Option<&PriceSnapshot>,
    previous_price: Option<&PriceSnapshot>,
) -> Result<bool, Indeterminate> {
    let indicator = condition.indicator.as_str();
    let cur = Bar {
        indicator,
        snapshot: Some(current),
        price: current_price,
    };
    let prev = || previous_bar(indicator, previous, previous_price);

    match &condition.kind {
        ConditionKind::CrossesAbove { operand, threshold } => {
            let t = cur.threshold(threshold)?;
            let c = cur.operand(operand)?;
            let p = prev()?.operand(operand)?;
            Ok(p <= t && c > t)
        }
        ConditionKind::CrossesBelow { operand, threshold } => {
            let t = cur.threshold(threshold)?;
            let c = cur.operand(operand)?;
            let p = prev()?.operand(operand)?;
            Ok(p >= t && c < t)
        }
        ConditionKind::GreaterThan { operand, threshold } => {
            Ok(cur.operand(operand)? > cur.threshold(threshold)?)
        }
        ConditionKind::LessThan { operand, threshold } => {
            Ok(cur.operand(operand)? < cur.threshold(threshold)?)
        }
        ConditionKind::Equals { operand, target } => {
            let t = cur.threshold(target)?;
            let c = cur.operand(operand)?;
            let p = prev()?.operand(operand)?;
            Ok(!approx_eq(p, t) && approx_eq(c, t))
        }
        ConditionKind::EntersZone { operand, zone } => {
            let (p, c) = (prev()?.operand(operand)?, cur.operand(operand)?);
            Ok(!zone.contains(p) && zone.contains(c))
        }
        ConditionKind::ExitsZone { operand, zone } => {
            let (p, c) = (prev()?.operand(operand)?, cur.operand(operand)?);
            Ok(zone.contains(p) && !zone.contains(c))
        }
        ConditionKind::WithinZone { operand, zone } => Ok(zone.contains(cur.operand(operand)?)),
        ConditionKind::OutsideZone { operand, zone } => Ok(!zone.contains(cur.operand(operand)?)),
        ConditionKind::LineCrossesAbove { series1, series2 } => {
            let (c1, c2) = (cur.series(series1)?, cur.series(series2)?);
            let before = prev()?;
            let (p1, p2) = (before.series(series1)?, before.series(series2)?);
            Ok(p1 <= p2 && c1 > c2)
        }
        ConditionKind::LineCrossesBelow { series1, series2 } => {
            let (c1, c2) = (cur.series(series1)?, cur.series(series2)?);
            let before = prev()?;
            let (p1, p2) = (before.series(series1)?, before.series(series2)?);
            Ok(p1 >= p2 && c1 < c2)
        }
        ConditionKind::IncreasesBy { operand, amount } => {
            let (p, c) = (prev()?.operand(operand)?, cur.operand(operand)?);
            Ok(c - p >= *amount)
        }
        ConditionKind::DecreasesBy { operand, amount } => {
            let (p, c) = (prev()?.operand(operand)?, cur.operand(operand)?);
            Ok(p - c >= *amount)
        }
        ConditionKind::ChangesBy { operand, amount } => {
            let (p, c) = (prev()?.operand(operand)?, cur.operand(operand)?);
            Ok((c - p).abs() >= *amount)
        }
    }
}

/// [`try_evaluate`] with every indeterminate outcome logged and folded to `false`.
pub fn evaluate(
    condition: &ConditionInstance,
    current: &IndicatorSnapshot,
    previous: Option<&IndicatorSnapshot>,
    current_price: Option<&PriceSnapshot>,
    previous_price: Option<&PriceSnapshot>,
) -> bool {
    match try_evaluate(condition, current, previous, current_price, previous_price) {
        Ok(fired) => fired,
        Err(reason) => {
            log_indeterminate(condition, &reason);
            false
        }
    }
}

/// Evaluate a loosely-shaped stored condition. A record that does not
/// describe a valid condition (unknown type, malformed zone, absent
/// operand) is logged and evaluates to `false`.
pub fn evaluate_record(
    record: &ConditionRecord,
    indicator: &str,
    current: &IndicatorSnapshot,
    previous: Option<&IndicatorSnapshot>,
    current_price: Option<&PriceSnapshot>,
    previous_price: Option<&PriceSnapshot>,
) -> bool {
    match ConditionKind::try_from(record) {
        Ok(kind) => {
            let condition = ConditionInstance::new(indicator, kind);
            evaluate(&condition, current, previous, current_price, previous_price)
        }
        Err(e) => {
            warn!(
                indicator = %indicator,
                condition = %record.condition_type,
                error = %e,
                "Cannot evaluate malformed condition"
            );
            false
        }
    }
}

fn log_indeterminate(condition: &ConditionInstance, reason: &Indeterminate) {
    match reason {
        // Expected on the first bar and during indicator warm-up.
        Indeterminate::NoPreviousBar | Indeterminate::NonFinite { .. } => debug!(
            indicator = %condition.indicator,
            condition = %condition.condition_type(),
            reason = %reason,
            "Condition indeterminate on this bar"
        ),
        Indeterminate::MissingSeries { .. } | Indeterminate::MissingPrice => warn!(
            indicator = %condition.indicator,
            condition = %condition.condition_type(),
            reason = %reason,
            "Condition indeterminate on this bar"
        ),
    }
}
