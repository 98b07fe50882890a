//! Document schema definitions.
//!
//! Field names follow the persisted JSON layout exactly, including the
//! spreadsheet-derived column headers of the washing component and pump rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keys we do not model, kept so they survive a load/save round trip.
pub type Extra = BTreeMap<String, Value>;

/// The file written to disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DocumentFile {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub configuration: Configuration,
    #[serde(flatten)]
    pub extra: Extra,
}

/// The in-memory document: five named sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Configuration {
    pub general_settings: GeneralSettings,
    pub washing_components: Vec<WashingComponentRow>,
    pub pumps: Vec<PumpRow>,
    pub circuits: CircuitsSection,
    pub sequences: SequencesSection,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Configuration {
    pub fn washing_component(&self, id: &str) -> Option<&WashingComponentRow> {
        self.washing_components.iter().find(|r| r.id == id)
    }

    pub fn pump(&self, index: usize) -> Option<&PumpRow> {
        self.pumps.get(index)
    }
}

// ---------------------------------------------------------------------------
// General settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct GeneralSettings {
    pub liquid_name: String,
    pub vehicle: String,
    pub liquid_temperature: Measured<TemperatureUnit>,
    pub liquid_volume: Measured<VolumeUnit>,
    pub power_voltage: Measured<VoltageUnit>,
    pub dirt_type: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A form value kept as entered, with its unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Measured<U: Default> {
    pub value: String,
    pub unit: U,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    #[default]
    #[serde(rename = "°C")]
    Celsius,
    #[serde(rename = "°K")]
    Kelvin,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum VolumeUnit {
    #[default]
    #[serde(rename = "L")]
    Litre,
    #[serde(rename = "mL")]
    Millilitre,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum VoltageUnit {
    #[default]
    #[serde(rename = "V")]
    Volt,
    #[serde(rename = "mV")]
    Millivolt,
}

// ---------------------------------------------------------------------------
// Washing components and pumps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct WashingComponentRow {
    pub id: String,
    #[serde(rename = "Component")]
    pub name: String,
    #[serde(rename = "Nozzle Ref")]
    pub nozzle_ref: String,
    #[serde(rename = "D_C_N (mm)")]
    pub d_c_n_mm: String,
    #[serde(rename = "DZ_P_N (mm)")]
    pub dz_p_n_mm: String,
    #[serde(rename = "Intergration Angle")]
    pub integration_angle: String,
    #[serde(rename = "Targeted Washing Preformance")]
    pub target_performance: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl WashingComponentRow {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Number of pump outputs, persisted as `"1"` or `"2"`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum OutputCount {
    #[default]
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
}

impl OutputCount {
    pub fn count(self) -> u32 {
        match self {
            OutputCount::One => 1,
            OutputCount::Two => 2,
        }
    }

    pub fn from_count(n: u32) -> Option<Self> {
        match n {
            1 => Some(OutputCount::One),
            2 => Some(OutputCount::Two),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PumpRow {
    pub id: String,
    #[serde(rename = "Pump Category")]
    pub category: String,
    #[serde(rename = "Pump Name")]
    pub name: String,
    #[serde(rename = "Number of output")]
    pub outputs: OutputCount,
    #[serde(rename = "Number of WC (O1)")]
    pub wc_output_1: String,
    #[serde(rename = "Number of WC (O2)")]
    pub wc_output_2: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl PumpRow {
    pub fn new(id: impl Into<String>, name: impl Into<String>, outputs: OutputCount) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            outputs,
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Circuits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct CircuitsSection {
    pub circuits: Vec<PumpCircuitDef>,
    pub connection_summary: Vec<PumpSummaryDef>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl CircuitsSection {
    pub fn circuit_for(&self, pump_index: usize) -> Option<&CircuitDef> {
        self.circuits
            .iter()
            .find(|c| c.pump_index == pump_index)
            .map(|c| &c.circuit)
    }

    pub fn summary_for(&self, pump_index: usize) -> Option<&PumpSummaryDef> {
        self.connection_summary
            .iter()
            .find(|s| s.pump_index == pump_index)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PumpCircuitDef {
    pub pump_index: usize,
    #[serde(default)]
    pub circuit: CircuitDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct CircuitDef {
    pub components: Vec<CircuitNodeDef>,
    pub connections: Vec<CircuitPipeDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CircuitNodeDef {
    pub id: u32,
    /// One of `pump`, `component`, `t_connector`, `y_connector`, `straight_connector`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Original catalog name, never the display suffix.
    pub name: String,
    pub position: [f64; 2],
    #[serde(default)]
    pub connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CircuitPipeDef {
    pub from: u32,
    pub to: u32,
    #[serde(default)]
    pub from_name: String,
    #[serde(default)]
    pub to_name: String,
    #[serde(default)]
    pub parameters: PipeParametersDef,
}

/// Pipe parameters in millimetres and degrees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PipeParametersDef {
    pub diameter: f64,
    #[serde(rename = "type")]
    pub pipe_type: String,
    pub length: f64,
    pub inclination: InclinationDef,
    pub bend_radius: f64,
    pub bend_angle: f64,
    pub pipe_ref: String,
    pub supplier: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InclinationDef {
    #[default]
    Straight,
    Bent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PumpSummaryDef {
    pub pump_index: usize,
    #[serde(default)]
    pub pump_id: String,
    #[serde(default)]
    pub pump_name: String,
    /// Keyed by the 1-based output index as a string.
    #[serde(default)]
    pub outputs: BTreeMap<String, Vec<SummaryEntryDef>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SummaryEntryDef {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

// ---------------------------------------------------------------------------
// Sequences
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SequencesSection {
    pub sequence_configuration: SequenceConfigurationDef,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SequenceConfigurationDef {
    pub tasks: Vec<TaskDef>,
    pub total_duration_seconds: f64,
    pub total_tasks: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct TaskDef {
    pub name: String,
    pub duration: f64,
    pub unit: UnitDef,
    pub priority: PriorityDef,
    pub duration_seconds: f64,
    pub pump_index: usize,
    pub output_num: String,
    pub component_id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum UnitDef {
    #[default]
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "ms")]
    Millis,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PriorityDef {
    #[serde(rename = "P")]
    Primary,
    #[default]
    #[serde(rename = "S")]
    Secondary,
}

/// Fresh opaque identity for a new document row.
pub fn new_row_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
