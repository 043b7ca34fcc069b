use conditions::registry;
use conditions::{ConditionKind, ConditionOverrides, ConditionRegistry, ConditionType};

#[test]
fn catalog_serializes_with_wire_type_names() {
    let config = registry::indicator_config("bb").expect("bb is alertable");
    let json = serde_json::to_value(config).unwrap();

    let first = &json["conditions"][0];
    assert_eq!(first["id"], "price_crosses_upper");
    assert_eq!(first["kind"]["type"], "crosses_above");
    assert_eq!(first["kind"]["operand"], "price");
    assert_eq!(first["kind"]["threshold"]["field"], "upper");
}

#[test]
fn zone_kinds_serialize_as_pairs() {
    let template = registry::condition_template("rsi", "enters_overbought").unwrap();
    let json = serde_json::to_value(&template.kind).unwrap();
    assert_eq!(json["zone"], serde_json::json!([70.0, 100.0]));

    let back: ConditionKind = serde_json::from_value(json).unwrap();
    assert_eq!(back.condition_type(), ConditionType::EntersZone);
}

#[test]
fn inverted_zone_fails_to_deserialize() {
    let json = serde_json::json!({
        "type": "within_zone",
        "operand": { "series": "value" },
        "zone": [100.0, 0.0]
    });
    assert!(serde_json::from_value::<ConditionKind>(json).is_err());
}

#[test]
fn negative_delta_amount_fails_to_deserialize() {
    for kind in ["increases_by", "decreases_by", "changes_by"] {
        let json = serde_json::json!({
            "type": kind,
            "operand": { "series": "value" },
            "amount": -5.0
        });
        let err = serde_json::from_value::<ConditionKind>(json).unwrap_err();
        assert!(err.to_string().contains("amount"), "{kind}: {err}");
    }

    let ok = serde_json::json!({
        "type": "increases_by",
        "operand": { "series": "value" },
        "amount": 5.0
    });
    let kind: ConditionKind = serde_json::from_value(ok).unwrap();
    assert_eq!(kind.amount(), Some(5.0));
}

#[test]
fn negative_amount_in_toml_template_is_rejected() {
    let toml = r#"
id = "jump"
label = "Jump"
description = ""

[kind]
type = "increases_by"
operand = "price"
amount = -1.0
"#;
    assert!(toml::from_str::<conditions::ConditionTemplate>(toml).is_err());
}

#[test]
fn overrides_parse_from_toml() {
    let overrides: ConditionOverrides = toml::from_str("zone = [75.0, 100.0]").unwrap();
    let inst = ConditionRegistry::builtin()
        .instantiate("rsi", "enters_overbought", &overrides)
        .unwrap();
    let zone = inst.kind.zone().unwrap();
    assert_eq!((zone.min(), zone.max()), (75.0, 100.0));
}

#[test]
fn every_indicator_lists_its_series() {
    for config in registry::alertable_indicators() {
        assert!(!config.series.is_empty(), "{} declares no series", config.id);
        assert!(!config.conditions.is_empty(), "{} has no conditions", config.id);
    }
}
