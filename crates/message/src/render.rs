use crate::context::MessageContext;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Series rendered as a trend word instead of a number.
const DIRECTION_SERIES: &str = "direction";

/// Replace every recognised `{{token}}` in `template`.
///
/// Unknown tokens, tokens whose value is absent from `ctx`, and an
/// unterminated `{{` are copied through unchanged. Prices and indicator
/// values get 2 decimals, volume and timestamp none.
pub fn render(template: &str, ctx: &MessageContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after = &rest[start + OPEN.len()..];
        let Some(end) = after.find(CLOSE) else {
            out.push_str(&rest[start..]);
            return out;
        };

        let raw = &after[..end];
        match resolve(raw.trim(), ctx) {
            Some(value) => out.push_str(&value),
            None => {
                out.push_str(OPEN);
                out.push_str(raw);
                out.push_str(CLOSE);
            }
        }
        rest = &after[end + CLOSE.len()..];
    }

    out.push_str(rest);
    out
}

fn resolve(token: &str, ctx: &MessageContext) -> Option<String> {
    match token {
        "symbol" => non_empty(&ctx.symbol),
        "exchange" => non_empty(&ctx.exchange),
        "open" => ctx.open.and_then(|v| format_number(v, 2)),
        "high" => ctx.high.and_then(|v| format_number(v, 2)),
        "low" => ctx.low.and_then(|v| format_number(v, 2)),
        "close" => ctx.close.and_then(|v| format_number(v, 2)),
        "volume" => ctx.volume.and_then(|v| format_number(v, 0)),
        "time" => ctx.time.map(|t| t.format("%H:%M:%S").to_string()),
        "date" => ctx.time.map(|t| t.format("%Y-%m-%d").to_string()),
        "timestamp" => ctx.time.map(|t| t.timestamp().to_string()),
        "alert.name" => ctx.alert.as_ref().and_then(|a| non_empty(&a.name)),
        "alert.condition" => ctx.alert.as_ref().and_then(|a| non_empty(&a.condition)),
        _ => resolve_indicator(token, ctx),
    }
}

/// `{{rsi}}` reads the `value` series, or the only series when there is
/// exactly one; `{{macd.signal}}` reads a named series.
fn resolve_indicator(token: &str, ctx: &MessageContext) -> Option<String> {
    let (indicator, series) = match token.split_once('.') {
        Some((indicator, series)) => (indicator, series),
        None => {
            let values = ctx.indicators.series(token)?;
            let series = if values.contains_key("value") {
                "value"
            } else if values.len() == 1 {
                values.keys().next()?.as_str()
            } else {
                return None;
            };
            (token, series)
        }
    };

    let value = ctx.indicators.get(indicator, series)?;
    if series == DIRECTION_SERIES {
        if !value.is_finite() {
            return None;
        }
        let word = if value > 0.0 { "Bullish" } else { "Bearish" };
        return Some(word.to_string());
    }
    format_number(value, 2)
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Fixed decimals, rounding half away from zero. `None` for NaN/inf.
pub(crate) fn format_number(value: f64, decimals: usize) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        // Too large to scale; such magnitudes have no fractional part anyway.
        return Some(format!("{value:.decimals$}"));
    }
    let mut rounded = scaled.round() / factor;
    if rounded == 0.0 {
        rounded = 0.0; // drop the sign of -0.0
    }
    Some(format!("{rounded:.decimals$}"))
}
