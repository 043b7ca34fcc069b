use std::collections::HashMap;

use common::{IndicatorSnapshot, PriceSnapshot};
use conditions::ConditionInstance;

use crate::evaluate::evaluate;

#[derive(Debug, Clone)]
struct PreviousBar {
    /// Only the alert's own indicator is kept.
    indicators: IndicatorSnapshot,
    price: Option<PriceSnapshot>,
}

/// Remembers the previous bar per alert so a host can pass only the current one.
///
/// Owned by the host and passed by `&mut`; each alert id has an independent
/// slot. Evaluation results are the same as calling [`evaluate`] with the
/// previous bar supplied explicitly.
#[derive(Debug, Default)]
pub struct PreviousValueCache {
    entries: HashMap<String, PreviousBar>,
}

impl PreviousValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate against the remembered previous bar, then remember `current`.
    pub fn evaluate(
        &mut self,
        alert_id: &str,
        condition: &ConditionInstance,
        current: &IndicatorSnapshot,
        current_price: Option<&PriceSnapshot>,
    ) -> bool {
        let fired = self.peek(alert_id, condition, current, current_price);
        self.record(alert_id, condition, current, current_price);
        fired
    }

    /// Evaluate against the remembered previous bar without replacing it.
    /// Used for intra-bar ticks, which compare against the last closed bar.
    pub fn peek(
        &self,
        alert_id: &str,
        condition: &ConditionInstance,
        current: &IndicatorSnapshot,
        current_price: Option<&PriceSnapshot>,
    ) -> bool {
        let previous = self.entries.get(alert_id);
        evaluate(
            condition,
            current,
            previous.map(|p| &p.indicators),
            current_price,
            previous.and_then(|p| p.price.as_ref()),
        )
    }

    /// Remember `current` as the previous bar for the next evaluation.
    pub fn record(
        &mut self,
        alert_id: &str,
        condition: &ConditionInstance,
        current: &IndicatorSnapshot,
        current_price: Option<&PriceSnapshot>,
    ) {
        self.entries.insert(
            alert_id.to_string(),
            PreviousBar {
                indicators: current.only(&condition.indicator),
                price: current_price.copied(),
            },
        );
    }

    /// Evict one alert. Returns whether it had a slot.
    pub fn remove_alert(&mut self, alert_id: &str) -> bool {
        self.entries.remove(alert_id).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, alert_id: &str) -> bool {
        self.entries.contains_key(alert_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conditions::{ConditionKind, Operand, Threshold};

    fn crosses_above(level: f64) -> ConditionInstance {
        ConditionInstance::new(
            "rsi",
            ConditionKind::CrossesAbove {
                operand: Operand::series("value"),
                threshold: Threshold::Value(level),
            },
        )
    }

    fn rsi(v: f64) -> IndicatorSnapshot {
        IndicatorSnapshot::new().with("rsi", "value", v).with("macd", "macd", 1.0)
    }

    #[test]
    fn first_bar_never_fires_then_cross_fires_once() {
        let c = crosses_above(70.0);
        let mut cache = PreviousValueCache::new();
        assert!(!cache.evaluate("a1", &c, &rsi(72.0), None));
        assert!(!cache.evaluate("a1", &c, &rsi(68.0), None));
        assert!(cache.evaluate("a1", &c, &rsi(72.0), None));
        assert!(!cache.evaluate("a1", &c, &rsi(72.0), None));
    }

    #[test]
    fn slots_are_independent_per_alert() {
        let c = crosses_above(70.0);
        let mut cache = PreviousValueCache::new();
        cache.evaluate("a1", &c, &rsi(68.0), None);
        // a2 has no history yet, so its first bar cannot cross.
        assert!(!cache.evaluate("a2", &c, &rsi(72.0), None));
        assert!(cache.evaluate("a1", &c, &rsi(72.0), None));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn peek_does_not_advance() {
        let c = crosses_above(70.0);
        let mut cache = PreviousValueCache::new();
        cache.evaluate("a1", &c, &rsi(68.0), None);
        assert!(cache.peek("a1", &c, &rsi(71.0), None));
        assert!(cache.peek("a1", &c, &rsi(73.0), None));
        assert!(cache.evaluate("a1", &c, &rsi(73.0), None));
    }

    #[test]
    fn remove_and_clear_reset_history() {
        let c = crosses_above(70.0);
        let mut cache = PreviousValueCache::new();
        cache.evaluate("a1", &c, &rsi(68.0), None);
        cache.evaluate("a2", &c, &rsi(68.0), None);

        assert!(cache.remove_alert("a1"));
        assert!(!cache.remove_alert("a1"));
        assert!(!cache.evaluate("a1", &c, &rsi(72.0), None));

        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.evaluate("a2", &c, &rsi(72.0), None));
    }

    #[test]
    fn only_the_alert_indicator_is_retained() {
        let c = crosses_above(70.0);
        let mut cache = PreviousValueCache::new();
        cache.evaluate("a1", &c, &rsi(68.0), None);
        let kept = &cache.entries["a1"].indicators;
        assert!(kept.contains("rsi"));
        assert!(!kept.contains("macd"));
    }
}
