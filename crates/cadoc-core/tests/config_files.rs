use std::path::PathBuf;

use cadoc_core::{CadocConfig, CoreError, load_config};
use schemars::schema_for;

fn write_temp(content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("cadoc_config_{}.toml", uuid::Uuid::new_v4()));
    std::fs::write(&path, content).expect("write config");
    path
}

#[test]
fn loads_overrides_from_disk() {
    let path = write_temp(
        r#"
        years = [2024, 2025]
        quarters = [4]
        average_ticket = 120.0
        "#,
    );
    let config = load_config(&path).expect("load config");
    assert_eq!(config.periods().len(), 2);
    assert_eq!(config.average_ticket, 120.0);
    assert_eq!(config.segments, CadocConfig::default().segments);
    std::fs::remove_file(&path).ok();
}

#[test]
fn invalid_values_are_rejected_after_parsing() {
    let path = write_temp("quarters = [5]\n");
    assert!(matches!(load_config(&path), Err(CoreError::InvalidConfig(_))));
    std::fs::remove_file(&path).ok();

    let path = write_temp("average_ticket = \"high\"\n");
    assert!(matches!(load_config(&path), Err(CoreError::Toml(_))));
    std::fs::remove_file(&path).ok();
}

#[test]
fn json_schema_describes_every_section() {
    let schema = serde_json::to_value(schema_for!(CadocConfig)).expect("serialize schema");
    let properties = schema["properties"].as_object().expect("object schema");
    for key in [
        "years",
        "quarters",
        "average_ticket",
        "dimensions",
        "ranking",
        "conccred",
        "discount",
        "infresta",
        "infrterm",
        "intercam",
        "segments",
        "profit",
    ] {
        assert!(properties.contains_key(key), "missing {key}");
    }
}
