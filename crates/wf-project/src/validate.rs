//! Document validation logic.

use std::collections::HashSet;

use wf_core::{parse_non_negative, parse_percentage, WfError};

use crate::schema::{
    CircuitDef, Configuration, GeneralSettings, PumpRow, TaskDef, WashingComponentRow,
};

const NODE_TAGS: [&str; 5] = [
    "pump",
    "component",
    "t_connector",
    "y_connector",
    "straight_connector",
];

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing field: {field} in {context}")]
    MissingField { field: String, context: String },
}

impl ValidationError {
    fn from_input(err: WfError, value: &str) -> Self {
        match err {
            WfError::InvalidInput { field, reason } => ValidationError::InvalidValue {
                field,
                value: value.to_string(),
                reason,
            },
            other => ValidationError::InvalidValue {
                field: String::new(),
                value: value.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

/// Check a whole document for structural consistency.
///
/// Partially filled documents are valid: empty optional fields are allowed,
/// but every value that is present must parse and every reference must resolve.
pub fn validate_document(config: &Configuration) -> Result<(), ValidationError> {
    validate_general_settings(&config.general_settings)?;

    let mut component_ids = HashSet::new();
    for row in &config.washing_components {
        validate_washing_component(row)?;
        if !component_ids.insert(row.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: row.id.clone(),
                context: "washing_components".to_string(),
            });
        }
    }

    let mut pump_ids = HashSet::new();
    for pump in &config.pumps {
        validate_pump(pump)?;
        if !pump_ids.insert(pump.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: pump.id.clone(),
                context: "pumps".to_string(),
            });
        }
    }

    let mut seen_circuits = HashSet::new();
    for entry in &config.circuits.circuits {
        if entry.pump_index >= config.pumps.len() {
            return Err(ValidationError::MissingReference {
                id: entry.pump_index.to_string(),
                context: "circuits pump_index".to_string(),
            });
        }
        if !seen_circuits.insert(entry.pump_index) {
            return Err(ValidationError::DuplicateId {
                id: entry.pump_index.to_string(),
                context: "circuits".to_string(),
            });
        }
        validate_circuit(&entry.circuit)?;
    }

    for summary in &config.circuits.connection_summary {
        if summary.pump_index >= config.pumps.len() {
            return Err(ValidationError::MissingReference {
                id: summary.pump_index.to_string(),
                context: "connection_summary pump_index".to_string(),
            });
        }
    }

    for task in &config.sequences.sequence_configuration.tasks {
        validate_task(task, config, &component_ids)?;
    }

    Ok(())
}

pub fn validate_general_settings(settings: &GeneralSettings) -> Result<(), ValidationError> {
    for (field, value) in [
        ("liquid_volume", &settings.liquid_volume.value),
        ("power_voltage", &settings.power_voltage.value),
    ] {
        if !value.trim().is_empty() {
            parse_non_negative(value, field).map_err(|e| ValidationError::from_input(e, value))?;
        }
    }
    let temperature = &settings.liquid_temperature.value;
    if !temperature.trim().is_empty() {
        wf_core::parse_number(temperature, "liquid_temperature")
            .map_err(|e| ValidationError::from_input(e, temperature))?;
    }
    Ok(())
}

pub fn validate_washing_component(row: &WashingComponentRow) -> Result<(), ValidationError> {
    if row.id.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: "id".to_string(),
            context: "washing_components".to_string(),
        });
    }
    if row.name.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: "Component".to_string(),
            context: format!("washing component {}", row.id),
        });
    }
    for (field, value) in [
        ("D_C_N (mm)", &row.d_c_n_mm),
        ("DZ_P_N (mm)", &row.dz_p_n_mm),
    ] {
        if !value.trim().is_empty() {
            parse_non_negative(value, field).map_err(|e| ValidationError::from_input(e, value))?;
        }
    }
    if !row.integration_angle.trim().is_empty() {
        wf_core::parse_number(&row.integration_angle, "Intergration Angle")
            .map_err(|e| ValidationError::from_input(e, &row.integration_angle))?;
    }
    if !row.target_performance.trim().is_empty() {
        parse_percentage(&row.target_performance, "Targeted Washing Preformance")
            .map_err(|e| ValidationError::from_input(e, &row.target_performance))?;
    }
    Ok(())
}

pub fn validate_pump(pump: &PumpRow) -> Result<(), ValidationError> {
    if pump.id.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: "id".to_string(),
            context: "pumps".to_string(),
        });
    }
    if pump.name.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: "Pump Name".to_string(),
            context: format!("pump {}", pump.id),
        });
    }
    let per_output = [
        ("Number of WC (O1)", &pump.wc_output_1),
        ("Number of WC (O2)", &pump.wc_output_2),
    ];
    for (field, value) in per_output.iter().take(pump.outputs.count() as usize) {
        if value.trim().is_empty() {
            continue;
        }
        let n = parse_non_negative(value, field).map_err(|e| ValidationError::from_input(e, value))?;
        if n.fract() != 0.0 {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                value: value.to_string(),
                reason: "must be a whole number".to_string(),
            });
        }
    }
    Ok(())
}

pub fn validate_circuit(circuit: &CircuitDef) -> Result<(), ValidationError> {
    let mut ids = HashSet::new();
    let mut pumps = 0;
    for node in &circuit.components {
        if !NODE_TAGS.contains(&node.kind.as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "type".to_string(),
                value: node.kind.clone(),
                reason: "unknown node type".to_string(),
            });
        }
        if node.kind == "pump" {
            pumps += 1;
        }
        if !node.position.iter().all(|v| v.is_finite()) {
            return Err(ValidationError::InvalidValue {
                field: "position".to_string(),
                value: format!("{:?}", node.position),
                reason: "coordinates must be finite".to_string(),
            });
        }
        if !ids.insert(node.id) {
            return Err(ValidationError::DuplicateId {
                id: node.id.to_string(),
                context: "circuit components".to_string(),
            });
        }
    }
    if pumps > 1 {
        return Err(ValidationError::InvalidValue {
            field: "components".to_string(),
            value: pumps.to_string(),
            reason: "a circuit holds at most one pump".to_string(),
        });
    }
    for pipe in &circuit.connections {
        for end in [pipe.from, pipe.to] {
            if !ids.contains(&end) {
                return Err(ValidationError::MissingReference {
                    id: end.to_string(),
                    context: "circuit connections".to_string(),
                });
            }
        }
        let p = &pipe.parameters;
        if !(p.diameter >= 0.0 && p.length >= 0.0 && p.bend_radius >= 0.0) {
            return Err(ValidationError::InvalidValue {
                field: "parameters".to_string(),
                value: format!("{} -> {}", pipe.from_name, pipe.to_name),
                reason: "diameter, length and bend radius must not be negative".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_task(
    task: &TaskDef,
    config: &Configuration,
    component_ids: &HashSet<&str>,
) -> Result<(), ValidationError> {
    let Some(pump) = config.pumps.get(task.pump_index) else {
        return Err(ValidationError::MissingReference {
            id: task.pump_index.to_string(),
            context: format!("sequence task {}", task.name),
        });
    };
    if !component_ids.contains(task.component_id.as_str()) {
        return Err(ValidationError::MissingReference {
            id: task.component_id.clone(),
            context: format!("sequence task {}", task.name),
        });
    }
    let output_ok = task
        .output_num
        .trim()
        .parse::<u32>()
        .map(|n| (1..=pump.outputs.count()).contains(&n))
        .unwrap_or(false);
    if !output_ok {
        return Err(ValidationError::InvalidValue {
            field: "output_num".to_string(),
            value: task.output_num.clone(),
            reason: format!("pump {} has {} output(s)", pump.name, pump.outputs.count()),
        });
    }
    if !(task.duration.is_finite() && task.duration >= 0.0) {
        return Err(ValidationError::InvalidValue {
            field: "duration".to_string(),
            value: task.duration.to_string(),
            reason: "must be a non-negative number".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::*;

    fn config() -> Configuration {
        Configuration {
            washing_components: vec![
                WashingComponentRow::new("wc-a", "A"),
                WashingComponentRow::new("wc-b", "B"),
            ],
            pumps: vec![PumpRow::new("p1", "WP", OutputCount::Two)],
            ..Default::default()
        }
    }

    #[test]
    fn empty_document_is_valid() {
        assert!(validate_document(&Configuration::default()).is_ok());
    }

    #[test]
    fn duplicate_component_id() {
        let mut c = config();
        c.washing_components.push(WashingComponentRow::new("wc-a", "A2"));
        assert!(matches!(
            validate_document(&c),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn percentage_out_of_range() {
        let mut c = config();
        c.washing_components[0].target_performance = "120".into();
        assert!(matches!(
            validate_document(&c),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn negative_distance_rejected() {
        let mut row = WashingComponentRow::new("x", "X");
        row.d_c_n_mm = "-3".into();
        assert!(validate_washing_component(&row).is_err());
        row.d_c_n_mm = "3,5".into();
        assert!(validate_washing_component(&row).is_ok());
    }

    #[test]
    fn circuit_pump_index_must_exist() {
        let mut c = config();
        c.circuits.circuits.push(PumpCircuitDef {
            pump_index: 4,
            circuit: CircuitDef::default(),
        });
        assert!(matches!(
            validate_document(&c),
            Err(ValidationError::MissingReference { .. })
        ));
    }

    #[test]
    fn dangling_connection_rejected() {
        let circuit = CircuitDef {
            components: vec![CircuitNodeDef {
                id: 0,
                kind: "pump".into(),
                name: "WP".into(),
                position: [100.0, 100.0],
                connections: 1,
            }],
            connections: vec![CircuitPipeDef {
                from: 0,
                to: 7,
                from_name: "WP".into(),
                to_name: "A".into(),
                parameters: PipeParametersDef::default(),
            }],
        };
        assert!(matches!(
            validate_circuit(&circuit),
            Err(ValidationError::MissingReference { .. })
        ));
    }

    #[test]
    fn task_output_bounds() {
        let mut c = config();
        c.pumps[0].outputs = OutputCount::One;
        c.sequences.sequence_configuration.tasks.push(TaskDef {
            name: "A".into(),
            pump_index: 0,
            output_num: "2".into(),
            component_id: "wc-a".into(),
            ..Default::default()
        });
        assert!(matches!(
            validate_document(&c),
            Err(ValidationError::InvalidValue { field, .. }) if field == "output_num"
        ));
    }

    #[test]
    fn pump_counts_must_be_whole() {
        let mut pump = PumpRow::new("p", "P", OutputCount::One);
        pump.wc_output_1 = "1.5".into();
        assert!(validate_pump(&pump).is_err());
        pump.wc_output_1 = "2".into();
        pump.wc_output_2 = "garbage".into();
        // Second output is ignored for a single-output pump.
        assert!(validate_pump(&pump).is_ok());
    }
}
