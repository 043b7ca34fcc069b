//! Built-in alert conditions per indicator.

use crate::kind::{ConditionKind, Operand, Threshold, Zone};
use crate::registry::IndicatorAlertConfig;
use crate::template::ConditionTemplate;

fn value(series: &str) -> Operand {
    Operand::series(series)
}

fn level(v: f64) -> Threshold {
    Threshold::Value(v)
}

fn field(name: &str) -> Threshold {
    Threshold::Field(name.to_string())
}

// Bounds are literals below, always ordered.
fn zone(min: f64, max: f64) -> Zone {
    Zone::new_unchecked(min, max)
}

fn indicator(
    id: &str,
    name: &str,
    description: &str,
    series: &[&str],
    conditions: Vec<ConditionTemplate>,
) -> IndicatorAlertConfig {
    IndicatorAlertConfig {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        series: series.iter().map(|s| s.to_string()).collect(),
        conditions,
    }
}

fn cond(id: &str, label: &str, description: &str, kind: ConditionKind) -> ConditionTemplate {
    ConditionTemplate::new(id, label, description, kind)
}

pub fn builtin() -> Vec<IndicatorAlertConfig> {
    vec![
        rsi(),
        macd(),
        bollinger(),
        stochastic(),
        supertrend(),
        moving_average("ema", "EMA", "Exponential Moving Average"),
        moving_average("sma", "SMA", "Simple Moving Average"),
        atr(),
        adx(),
        cci(),
        williams_r(),
        vwap(),
        obv(),
    ]
}

fn rsi() -> IndicatorAlertConfig {
    indicator(
        "rsi",
        "RSI",
        "Relative Strength Index",
        &["value"],
        vec![
            cond(
                "crosses_above_overbought",
                "Crosses above overbought",
                "RSI crosses above the overbought level",
                ConditionKind::CrossesAbove { operand: value("value"), threshold: level(70.0) },
            ),
            cond(
                "crosses_below_oversold",
                "Crosses below oversold",
                "RSI crosses below the oversold level",
                ConditionKind::CrossesBelow { operand: value("value"), threshold: level(30.0) },
            ),
            cond(
                "crosses_above_midline",
                "Crosses above 50",
                "RSI crosses above the midline",
                ConditionKind::CrossesAbove { operand: value("value"), threshold: level(50.0) },
            ),
            cond(
                "crosses_below_midline",
                "Crosses below 50",
                "RSI crosses below the midline",
                ConditionKind::CrossesBelow { operand: value("value"), threshold: level(50.0) },
            ),
            cond(
                "greater_than",
                "Greater than",
                "RSI is above a level",
                ConditionKind::GreaterThan { operand: value("value"), threshold: level(70.0) },
            ),
            cond(
                "less_than",
                "Less than",
                "RSI is below a level",
                ConditionKind::LessThan { operand: value("value"), threshold: level(30.0) },
            ),
            cond(
                "enters_overbought",
                "Enters overbought zone",
                "RSI moves into the overbought zone",
                ConditionKind::EntersZone { operand: value("value"), zone: zone(70.0, 100.0) },
            ),
            cond(
                "enters_oversold",
                "Enters oversold zone",
                "RSI moves into the oversold zone",
                ConditionKind::EntersZone { operand: value("value"), zone: zone(0.0, 30.0) },
            ),
            cond(
                "exits_overbought",
                "Exits overbought zone",
                "RSI leaves the overbought zone",
                ConditionKind::ExitsZone { operand: value("value"), zone: zone(70.0, 100.0) },
            ),
            cond(
                "exits_oversold",
                "Exits oversold zone",
                "RSI leaves the oversold zone",
                ConditionKind::ExitsZone { operand: value("value"), zone: zone(0.0, 30.0) },
            ),
            cond(
                "changes_by",
                "Changes by",
                "RSI moves by at least the given amount in one bar",
                ConditionKind::ChangesBy { operand: value("value"), amount: 10.0 },
            ),
        ],
    )
}

fn macd() -> IndicatorAlertConfig {
    indicator(
        "macd",
        "MACD",
        "Moving Average Convergence Divergence",
        &["macd", "signal", "histogram"],
        vec![
            cond(
                "bullish_crossover",
                "MACD crosses above signal",
                "MACD line crosses above the signal line",
                ConditionKind::LineCrossesAbove { series1: "macd".into(), series2: "signal".into() },
            ),
            cond(
                "bearish_crossover",
                "MACD crosses below signal",
                "MACD line crosses below the signal line",
                ConditionKind::LineCrossesBelow { series1: "macd".into(), series2: "signal".into() },
            ),
            cond(
                "crosses_above_zero",
                "MACD crosses above zero",
                "MACD line crosses above the zero line",
                ConditionKind::CrossesAbove { operand: value("macd"), threshold: level(0.0) },
            ),
            cond(
                "crosses_below_zero",
                "MACD crosses below zero",
                "MACD line crosses below the zero line",
                ConditionKind::CrossesBelow { operand: value("macd"), threshold: level(0.0) },
            ),
            cond(
                "histogram_positive",
                "Histogram positive",
                "Histogram is above zero",
                ConditionKind::GreaterThan { operand: value("histogram"), threshold: level(0.0) },
            ),
            cond(
                "histogram_negative",
                "Histogram negative",
                "Histogram is below zero",
                ConditionKind::LessThan { operand: value("histogram"), threshold: level(0.0) },
            ),
        ],
    )
}

fn bollinger() -> IndicatorAlertConfig {
    indicator(
        "bb",
        "Bollinger Bands",
        "Bollinger Bands",
        &["upper", "middle", "lower"],
        vec![
            cond(
                "price_crosses_upper",
                "Price crosses above upper band",
                "Close crosses above the upper band",
                ConditionKind::CrossesAbove { operand: Operand::Price, threshold: field("upper") },
            ),
            cond(
                "price_crosses_lower",
                "Price crosses below lower band",
                "Close crosses below the lower band",
                ConditionKind::CrossesBelow { operand: Operand::Price, threshold: field("lower") },
            ),
            cond(
                "price_crosses_middle_up",
                "Price crosses above middle band",
                "Close crosses above the basis line",
                ConditionKind::CrossesAbove { operand: Operand::Price, threshold: field("middle") },
            ),
            cond(
                "price_crosses_middle_down",
                "Price crosses below middle band",
                "Close crosses below the basis line",
                ConditionKind::CrossesBelow { operand: Operand::Price, threshold: field("middle") },
            ),
            cond(
                "price_above_upper",
                "Price above upper band",
                "Close is above the upper band",
                ConditionKind::GreaterThan { operand: Operand::Price, threshold: field("upper") },
            ),
            cond(
                "price_below_lower",
                "Price below lower band",
                "Close is below the lower band",
                ConditionKind::LessThan { operand: Operand::Price, threshold: field("lower") },
            ),
        ],
    )
}

fn stochastic() -> IndicatorAlertConfig {
    indicator(
        "stoch",
        "Stochastic",
        "Stochastic Oscillator",
        &["k", "d"],
        vec![
            cond(
                "k_crosses_above_d",
                "%K crosses above %D",
                "Fast line crosses above the slow line",
                ConditionKind::LineCrossesAbove { series1: "k".into(), series2: "d".into() },
            ),
            cond(
                "k_crosses_below_d",
                "%K crosses below %D",
                "Fast line crosses below the slow line",
                ConditionKind::LineCrossesBelow { series1: "k".into(), series2: "d".into() },
            ),
            cond(
                "enters_overbought",
                "Enters overbought zone",
                "%K moves into the overbought zone",
                ConditionKind::EntersZone { operand: value("k"), zone: zone(80.0, 100.0) },
            ),
            cond(
                "enters_oversold",
                "Enters oversold zone",
                "%K moves into the oversold zone",
                ConditionKind::EntersZone { operand: value("k"), zone: zone(0.0, 20.0) },
            ),
            cond(
                "exits_overbought",
                "Exits overbought zone",
                "%K leaves the overbought zone",
                ConditionKind::ExitsZone { operand: value("k"), zone: zone(80.0, 100.0) },
            ),
            cond(
                "exits_oversold",
                "Exits oversold zone",
                "%K leaves the oversold zone",
                ConditionKind::ExitsZone { operand: value("k"), zone: zone(0.0, 20.0) },
            ),
        ],
    )
}

fn supertrend() -> IndicatorAlertConfig {
    indicator(
        "supertrend",
        "Supertrend",
        "ATR-based trend follower; direction is 1 when bullish, -1 when bearish",
        &["value", "direction"],
        vec![
            cond(
                "turns_bullish",
                "Turns bullish",
                "Direction flips to bullish",
                ConditionKind::Equals { operand: value("direction"), target: level(1.0) },
            ),
            cond(
                "turns_bearish",
                "Turns bearish",
                "Direction flips to bearish",
                ConditionKind::Equals { operand: value("direction"), target: level(-1.0) },
            ),
            cond(
                "price_crosses_above",
                "Price crosses above Supertrend",
                "Close crosses above the Supertrend line",
                ConditionKind::CrossesAbove { operand: Operand::Price, threshold: field("value") },
            ),
            cond(
                "price_crosses_below",
                "Price crosses below Supertrend",
                "Close crosses below the Supertrend line",
                ConditionKind::CrossesBelow { operand: Operand::Price, threshold: field("value") },
            ),
        ],
    )
}

fn moving_average(id: &str, name: &str, description: &str) -> IndicatorAlertConfig {
    indicator(
        id,
        name,
        description,
        &["value"],
        vec![
            cond(
                "price_crosses_above",
                "Price crosses above",
                "Close crosses above the average",
                ConditionKind::CrossesAbove { operand: Operand::Price, threshold: field("value") },
            ),
            cond(
                "price_crosses_below",
                "Price crosses below",
                "Close crosses below the average",
                ConditionKind::CrossesBelow { operand: Operand::Price, threshold: field("value") },
            ),
            cond(
                "price_above",
                "Price above",
                "Close is above the average",
                ConditionKind::GreaterThan { operand: Operand::Price, threshold: field("value") },
            ),
            cond(
                "price_below",
                "Price below",
                "Close is below the average",
                ConditionKind::LessThan { operand: Operand::Price, threshold: field("value") },
            ),
        ],
    )
}

fn atr() -> IndicatorAlertConfig {
    indicator(
        "atr",
        "ATR",
        "Average True Range",
        &["value"],
        vec![
            cond(
                "greater_than",
                "Greater than",
                "Volatility is above a level",
                ConditionKind::GreaterThan { operand: value("value"), threshold: level(1.0) },
            ),
            cond(
                "increases_by",
                "Increases by",
                "Volatility expands by at least the given amount in one bar",
                ConditionKind::IncreasesBy { operand: value("value"), amount: 1.0 },
            ),
            cond(
                "decreases_by",
                "Decreases by",
                "Volatility contracts by at least the given amount in one bar",
                ConditionKind::DecreasesBy { operand: value("value"), amount: 1.0 },
            ),
        ],
    )
}

fn adx() -> IndicatorAlertConfig {
    indicator(
        "adx",
        "ADX",
        "Average Directional Index",
        &["adx", "plus_di", "minus_di"],
        vec![
            cond(
                "trend_strengthens",
                "ADX crosses above 25",
                "Trend strength rises above the trending level",
                ConditionKind::CrossesAbove { operand: value("adx"), threshold: level(25.0) },
            ),
            cond(
                "trend_weakens",
                "ADX crosses below 20",
                "Trend strength falls below the ranging level",
                ConditionKind::CrossesBelow { operand: value("adx"), threshold: level(20.0) },
            ),
            cond(
                "plus_di_crosses_above",
                "+DI crosses above -DI",
                "Positive directional line crosses above the negative one",
                ConditionKind::LineCrossesAbove {
                    series1: "plus_di".into(),
                    series2: "minus_di".into(),
                },
            ),
            cond(
                "plus_di_crosses_below",
                "+DI crosses below -DI",
                "Positive directional line crosses below the negative one",
                ConditionKind::LineCrossesBelow {
                    series1: "plus_di".into(),
                    series2: "minus_di".into(),
                },
            ),
        ],
    )
}

fn cci() -> IndicatorAlertConfig {
    indicator(
        "cci",
        "CCI",
        "Commodity Channel Index",
        &["value"],
        vec![
            cond(
                "crosses_above",
                "Crosses above +100",
                "CCI crosses above the upper level",
                ConditionKind::CrossesAbove { operand: value("value"), threshold: level(100.0) },
            ),
            cond(
                "crosses_below",
                "Crosses below -100",
                "CCI crosses below the lower level",
                ConditionKind::CrossesBelow { operand: value("value"), threshold: level(-100.0) },
            ),
            cond(
                "within_range",
                "Within normal range",
                "CCI is inside the normal range",
                ConditionKind::WithinZone { operand: value("value"), zone: zone(-100.0, 100.0) },
            ),
            cond(
                "outside_range",
                "Outside normal range",
                "CCI is outside the normal range",
                ConditionKind::OutsideZone { operand: value("value"), zone: zone(-100.0, 100.0) },
            ),
        ],
    )
}

fn williams_r() -> IndicatorAlertConfig {
    indicator(
        "willr",
        "Williams %R",
        "Williams Percent Range",
        &["value"],
        vec![
            cond(
                "enters_overbought",
                "Enters overbought zone",
                "%R moves into the overbought zone",
                ConditionKind::EntersZone { operand: value("value"), zone: zone(-20.0, 0.0) },
            ),
            cond(
                "enters_oversold",
                "Enters oversold zone",
                "%R moves into the oversold zone",
                ConditionKind::EntersZone { operand: value("value"), zone: zone(-100.0, -80.0) },
            ),
            cond(
                "exits_overbought",
                "Exits overbought zone",
                "%R leaves the overbought zone",
                ConditionKind::ExitsZone { operand: value("value"), zone: zone(-20.0, 0.0) },
            ),
            cond(
                "exits_oversold",
                "Exits oversold zone",
                "%R leaves the oversold zone",
                ConditionKind::ExitsZone { operand: value("value"), zone: zone(-100.0, -80.0) },
            ),
        ],
    )
}

fn vwap() -> IndicatorAlertConfig {
    indicator(
        "vwap",
        "VWAP",
        "Volume Weighted Average Price",
        &["value"],
        vec![
            cond(
                "price_crosses_above",
                "Price crosses above VWAP",
                "Close crosses above VWAP",
                ConditionKind::CrossesAbove { operand: Operand::Price, threshold: field("value") },
            ),
            cond(
                "price_crosses_below",
                "Price crosses below VWAP",
                "Close crosses below VWAP",
                ConditionKind::CrossesBelow { operand: Operand::Price, threshold: field("value") },
            ),
        ],
    )
}

fn obv() -> IndicatorAlertConfig {
    indicator(
        "obv",
        "OBV",
        "On-Balance Volume",
        &["value"],
        vec![
            cond(
                "increases_by",
                "Increases by",
                "OBV rises by at least the given amount in one bar",
                ConditionKind::IncreasesBy { operand: value("value"), amount: 100_000.0 },
            ),
            cond(
                "decreases_by",
                "Decreases by",
                "OBV falls by at least the given amount in one bar",
                ConditionKind::DecreasesBy { operand: value("value"), amount: 100_000.0 },
            ),
            cond(
                "changes_by",
                "Changes by",
                "OBV moves by at least the given amount in one bar",
                ConditionKind::ChangesBy { operand: value("value"), amount: 100_000.0 },
            ),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ConditionType;

    #[test]
    fn catalog_zones_are_ordered() {
        for config in builtin() {
            for template in &config.conditions {
                if let Some(z) = template.kind.zone() {
                    assert!(z.min() <= z.max(), "{}/{}", config.id, template.id);
                }
            }
        }
    }

    #[test]
    fn every_condition_type_is_offered_somewhere() {
        let offered: Vec<ConditionType> = builtin()
            .iter()
            .flat_map(|c| c.conditions.iter().map(|t| t.condition_type()))
            .collect();
        for t in ConditionType::ALL {
            assert!(offered.contains(&t), "{t} missing from catalog");
        }
    }
}
