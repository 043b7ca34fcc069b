use conditions::{registry, ConditionInstance, ConditionKind, Operand, Threshold};

/// Default message for an alert that has no template of its own.
///
/// The symbol is embedded literally; indicator readings and the price stay
/// as tokens so [`render`](crate::render) fills them in per bar:
///
/// `TCS: RSI value crosses above 70 (value {{rsi.value}}) | price {{close}} at {{time}}`
pub fn default_message_template(condition: &ConditionInstance, symbol: &str) -> String {
    let name = registry::indicator_config(&condition.indicator)
        .map(|config| config.name.clone())
        .unwrap_or_else(|| condition.indicator.to_uppercase());

    let readings = reading_tokens(condition)
        .into_iter()
        .map(|series| format!("{series} {}", token(&condition.indicator, &series)))
        .collect::<Vec<_>>();

    let mut out = format!("{symbol}: {name} {}", condition.kind.describe());
    if !readings.is_empty() {
        out.push_str(" (");
        out.push_str(&readings.join(", "));
        out.push(')');
    }
    out.push_str(" | price {{close}} at {{time}}");
    out
}

/// Series whose current value is worth showing next to the condition.
fn reading_tokens(condition: &ConditionInstance) -> Vec<String> {
    let mut series = Vec::new();
    if let Some(Operand::Series(name)) = condition.kind.operand() {
        series.push(name.clone());
    }
    match &condition.kind {
        ConditionKind::LineCrossesAbove { series1, series2 }
        | ConditionKind::LineCrossesBelow { series1, series2 } => {
            series.push(series1.clone());
            series.push(series2.clone());
        }
        kind => {
            if let Some(Threshold::Field(name)) = kind.threshold() {
                series.push(name.clone());
            }
        }
    }
    series.dedup();
    series
}

fn token(indicator: &str, series: &str) -> String {
    format!("{{{{{indicator}.{series}}}}}")
}
