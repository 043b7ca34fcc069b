use common::BarEvent;
use conditions::ConditionRegistry;
use engine::{AlertEngine, AlertFileConfig};

const ALERTS: &str = r#"
[[alert]]
id = "macd-bull"
name = "MACD bullish"
symbol = "BTCUSDT"
indicator = "macd"
condition = "bullish_crossover"
message = "{{symbol}} MACD {{macd.macd}} over {{macd.signal}}"

[[alert]]
id = "bb-upper"
name = "Upper band breakout"
symbol = "BTCUSDT"
indicator = "bb"
condition = "price_crosses_upper"
frequency = "once"

[[alert]]
id = "st-flip"
name = "Supertrend flip"
symbol = "BTCUSDT"
indicator = "supertrend"
condition = "turns_bullish"
message = "{{supertrend.direction}} at {{close}}"
"#;

const FEED: &str = r#"
{"symbol":"BTCUSDT","time":"2024-03-01T09:00:00Z","open":100,"high":101,"low":99,"close":100,"indicators":{"macd":{"macd":-0.2,"signal":0.1},"bb":{"upper":102,"middle":100,"lower":98},"supertrend":{"value":103,"direction":-1}}}
{"symbol":"BTCUSDT","time":"2024-03-01T09:01:00Z","open":100,"high":103,"low":100,"close":102.5,"indicators":{"macd":{"macd":0.3,"signal":0.1},"bb":{"upper":102,"middle":100,"lower":98},"supertrend":{"value":99,"direction":1}}}
{"symbol":"BTCUSDT","time":"2024-03-01T09:02:00Z","open":102.5,"high":104,"low":102,"close":101,"indicators":{"macd":{"macd":0.4,"signal":0.2},"bb":{"upper":102.2,"middle":100.1,"lower":98},"supertrend":{"value":99.5,"direction":1}}}
{"symbol":"BTCUSDT","time":"2024-03-01T09:03:00Z","open":101,"high":104,"low":101,"close":103,"indicators":{"macd":{"macd":0.1,"signal":0.2},"bb":{"upper":102.4,"middle":100.2,"lower":98},"supertrend":{"value":100,"direction":1}}}
"#;

fn bars() -> Vec<BarEvent> {
    FEED.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn replaying_a_feed_fires_each_alert_on_its_bar() {
    let alerts = AlertFileConfig::parse(ALERTS)
        .unwrap()
        .to_alerts(ConditionRegistry::builtin())
        .unwrap();
    let mut engine = AlertEngine::new(alerts).unwrap();

    let per_bar: Vec<Vec<String>> = bars()
        .iter()
        .map(|bar| engine.process(bar).into_iter().map(|f| f.alert_id).collect())
        .collect();

    // Bar 0 has no previous bar, bar 1 crosses all three.
    assert!(per_bar[0].is_empty());
    let mut first = per_bar[1].clone();
    first.sort();
    assert_eq!(first, vec!["bb-upper", "macd-bull", "st-flip"]);
    assert!(per_bar[2].is_empty());
    // Price re-crosses the band, but the once-only alert has been retired.
    assert!(per_bar[3].is_empty());
    assert_eq!(engine.len(), 2);
}

#[test]
fn messages_use_the_bar_values() {
    let alerts = AlertFileConfig::parse(ALERTS)
        .unwrap()
        .to_alerts(ConditionRegistry::builtin())
        .unwrap();
    let mut engine = AlertEngine::new(alerts).unwrap();

    let fired: Vec<_> = bars().iter().flat_map(|bar| engine.process(bar)).collect();
    let message = |id: &str| {
        fired
            .iter()
            .find(|f| f.alert_id == id)
            .map(|f| f.message.clone())
            .unwrap()
    };

    assert_eq!(message("macd-bull"), "BTCUSDT MACD 0.30 over 0.10");
    assert_eq!(message("st-flip"), "Bullish at 102.50");
    assert!(message("bb-upper").starts_with("BTCUSDT: Bollinger"), "{}", message("bb-upper"));
}
