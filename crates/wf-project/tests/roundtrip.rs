use std::collections::BTreeMap;

use wf_project::*;

fn sample() -> Configuration {
    let mut config = Configuration::default();
    config.general_settings.liquid_name = "Screenwash -20".to_string();
    config.general_settings.liquid_volume = Measured {
        value: "4,5".to_string(),
        unit: VolumeUnit::Litre,
    };
    config.washing_components = vec![
        WashingComponentRow {
            nozzle_ref: "NZ-01".to_string(),
            target_performance: "85".to_string(),
            ..WashingComponentRow::new("wc-a", "A")
        },
        WashingComponentRow::new("wc-b", "B"),
    ];
    config.pumps = vec![PumpRow::new("pump-1", "WP-12", OutputCount::One)];
    config.circuits = CircuitsSection {
        circuits: vec![PumpCircuitDef {
            pump_index: 0,
            circuit: CircuitDef {
                components: vec![
                    CircuitNodeDef {
                        id: 0,
                        kind: "pump".to_string(),
                        name: "WP-12".to_string(),
                        position: [100.0, 300.0],
                        connections: 1,
                    },
                    CircuitNodeDef {
                        id: 1,
                        kind: "component".to_string(),
                        name: "A".to_string(),
                        position: [500.0, 300.0],
                        connections: 1,
                    },
                ],
                connections: vec![CircuitPipeDef {
                    from: 0,
                    to: 1,
                    from_name: "WP-12".to_string(),
                    to_name: "A".to_string(),
                    parameters: PipeParametersDef {
                        diameter: 8.0,
                        length: 1500.0,
                        pipe_type: "PA12".to_string(),
                        ..Default::default()
                    },
                }],
            },
        }],
        connection_summary: vec![PumpSummaryDef {
            pump_index: 0,
            pump_id: "pump-1".to_string(),
            pump_name: "WP-12".to_string(),
            outputs: BTreeMap::from([(
                "1".to_string(),
                vec![SummaryEntryDef {
                    id: "wc-a".to_string(),
                    name: "A".to_string(),
                    kind: "component".to_string(),
                }],
            )]),
        }],
        ..Default::default()
    };
    config.sequences.sequence_configuration = SequenceConfigurationDef {
        tasks: vec![TaskDef {
            name: "A".to_string(),
            duration: 5.0,
            unit: UnitDef::Seconds,
            priority: PriorityDef::Primary,
            duration_seconds: 5.0,
            pump_index: 0,
            output_num: "1".to_string(),
            component_id: "wc-a".to_string(),
        }],
        total_duration_seconds: 5.0,
        total_tasks: 1,
    };
    config
}

#[test]
fn roundtrip_store_through_file() {
    let path = std::env::temp_dir().join("wf_project_roundtrip.json");
    let mut store = DocumentStore::from_configuration(sample());
    validate_document(store.config()).unwrap();
    store.save_to(&path).unwrap();

    let mut loaded = DocumentStore::new();
    loaded.load_from(&path).unwrap();
    assert_eq!(loaded.config(), store.config());
    assert_eq!(loaded.drain_changes().len(), 5);

    store.reset();
    assert!(store.config().pumps.is_empty());
}

#[test]
fn persisted_layout_uses_document_keys() {
    let path = std::env::temp_dir().join("wf_project_layout.json");
    DocumentStore::from_configuration(sample())
        .save_to(&path)
        .unwrap();
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    assert!(raw["timestamp"].is_string());
    let config = &raw["configuration"];
    assert_eq!(config["pumps"][0]["Number of output"], "1");
    assert_eq!(config["circuits"]["circuits"][0]["pump_index"], 0);
    let node = &config["circuits"]["circuits"][0]["circuit"]["components"][1];
    assert_eq!(node["type"], "component");
    assert_eq!(node["position"][0], 500.0);
    let pipe = &config["circuits"]["circuits"][0]["circuit"]["connections"][0];
    assert_eq!(pipe["parameters"]["inclination"], "straight");
    assert_eq!(pipe["parameters"]["type"], "PA12");
    assert_eq!(
        config["circuits"]["connection_summary"][0]["outputs"]["1"][0]["name"],
        "A"
    );
    let task = &config["sequences"]["sequence_configuration"]["tasks"][0];
    assert_eq!(task["priority"], "P");
    assert_eq!(task["output_num"], "1");
}

#[test]
fn missing_sections_and_unknown_keys() {
    let path = std::env::temp_dir().join("wf_project_partial.json");
    std::fs::write(
        &path,
        r#"{
            "timestamp": "2024-03-01 10:00:00.000",
            "app_version": "0.9",
            "configuration": {
                "pumps": [{"id": "p", "Pump Name": "WP", "Number of output": "2"}],
                "notes": {"author": "lab"}
            }
        }"#,
    )
    .unwrap();

    let mut store = DocumentStore::new();
    store.load_from(&path).unwrap();
    assert_eq!(store.pumps()[0].outputs, OutputCount::Two);
    assert!(store.washing_components().is_empty());
    assert!(store.circuits().circuits.is_empty());

    let out = std::env::temp_dir().join("wf_project_partial_out.json");
    store.save_to(&out).unwrap();
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(raw["app_version"], "0.9");
    assert_eq!(raw["configuration"]["notes"]["author"], "lab");
}

#[test]
fn invalid_output_count_is_a_json_error() {
    let path = std::env::temp_dir().join("wf_project_bad_outputs.json");
    std::fs::write(
        &path,
        r#"{"configuration": {"pumps": [{"id": "p", "Number of output": "3"}]}}"#,
    )
    .unwrap();
    assert!(matches!(load_json(&path), Err(ProjectError::Json(_))));
}
