//! Read-only reference tables consumed by the forms and the pipe dialog.
//!
//! Each table is a list of records stored as `<dir>/<Name>.yaml`, `.yml` or
//! `.json`. A table that cannot be read degrades to a minimal fallback list.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use crate::schema::Extra;

pub const WASHING_COMPONENTS: &str = "Washing_components";
pub const PIPES: &str = "Pipes";
pub const CONNECTORS: &str = "Connectors";
pub const DIRT_TYPES: &str = "Dirt_Types";
pub const FLUIDS: &str = "Fluids";
pub const BEND_RADIUS: &str = "Bend_Radius";

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("Catalog table {table} not found in {dir}")]
    NotFound { table: String, dir: PathBuf },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog table {table} is malformed: {reason}")]
    Parse { table: String, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PipeRow {
    #[serde(rename = "Pipe Type")]
    pub pipe_type: String,
    #[serde(rename = "Diam. (mm)", deserialize_with = "lenient_number")]
    pub diameter_mm: f64,
    #[serde(rename = "Pipe Ref", default)]
    pub pipe_ref: String,
    #[serde(rename = "Supplier", default)]
    pub supplier: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FluidRow {
    #[serde(rename = "LLG Name")]
    pub name: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DirtRow {
    #[serde(rename = "Dirt Type")]
    pub name: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ConnectorRow {
    /// Node type tag the connector belongs to (`t_connector`, ...).
    #[serde(rename = "Connector Type")]
    pub kind: String,
    #[serde(rename = "Connector Name")]
    pub name: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BendRow {
    #[serde(rename = "Diam. (mm)", deserialize_with = "lenient_number")]
    pub diameter_mm: f64,
    #[serde(rename = "Bend Radius (mm)", deserialize_with = "lenient_number")]
    pub radius_mm: f64,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Catalog entry for the washing components form; extra columns are forwarded as is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WashingComponentEntry {
    #[serde(rename = "Component")]
    pub name: String,
    #[serde(rename = "Nozzle Ref", default)]
    pub nozzle_ref: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Spreadsheet exports carry numbers either as numbers or as text.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Number(v) => Ok(v),
        Raw::Text(s) => wf_core::parse_number(&s, "catalog number").map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub washing_components: Vec<WashingComponentEntry>,
    pub pipes: Vec<PipeRow>,
    pub connectors: Vec<ConnectorRow>,
    pub dirt_types: Vec<DirtRow>,
    pub fluids: Vec<FluidRow>,
    pub bend_radii: Vec<BendRow>,
    /// Tables that fell back to built-in values.
    pub degraded: Vec<&'static str>,
}

impl Catalog {
    /// Load every table from `dir`, falling back per table.
    pub fn load(dir: &Path) -> Self {
        let mut degraded = Vec::new();
        let washing_components = load_or(dir, WASHING_COMPONENTS, &mut degraded, Vec::new);
        let pipes = load_or(dir, PIPES, &mut degraded, fallback_pipes);
        let connectors = load_or(dir, CONNECTORS, &mut degraded, fallback_connectors);
        let dirt_types = load_or(dir, DIRT_TYPES, &mut degraded, fallback_dirt);
        let fluids = load_or(dir, FLUIDS, &mut degraded, fallback_fluids);
        let bend_radii = load_or(dir, BEND_RADIUS, &mut degraded, Vec::new);
        info!(dir = %dir.display(), degraded = degraded.len(), "catalog loaded");
        Self {
            washing_components,
            pipes,
            connectors,
            dirt_types,
            fluids,
            bend_radii,
            degraded,
        }
    }

    /// The built-in minimal catalog.
    pub fn fallback() -> Self {
        Self {
            washing_components: Vec::new(),
            pipes: fallback_pipes(),
            connectors: fallback_connectors(),
            dirt_types: fallback_dirt(),
            fluids: fallback_fluids(),
            bend_radii: Vec::new(),
            degraded: vec![
                WASHING_COMPONENTS,
                PIPES,
                CONNECTORS,
                DIRT_TYPES,
                FLUIDS,
                BEND_RADIUS,
            ],
        }
    }

    pub fn fluid_names(&self) -> Vec<&str> {
        self.fluids.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn dirt_types(&self) -> Vec<&str> {
        self.dirt_types.iter().map(|d| d.name.as_str()).collect()
    }

    /// Distinct pipe types in catalog order.
    pub fn pipe_types(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for row in &self.pipes {
            if !out.contains(&row.pipe_type.as_str()) {
                out.push(&row.pipe_type);
            }
        }
        out
    }

    /// Diameters offered for `pipe_type`, ascending, without duplicates.
    pub fn diameters_for(&self, pipe_type: &str) -> Vec<f64> {
        let mut out: Vec<f64> = self
            .pipes
            .iter()
            .filter(|r| r.pipe_type == pipe_type)
            .map(|r| r.diameter_mm)
            .collect();
        out.sort_by(f64::total_cmp);
        out.dedup();
        out
    }

    pub fn pipe(&self, pipe_type: &str, diameter_mm: f64) -> Option<&PipeRow> {
        self.pipes
            .iter()
            .find(|r| r.pipe_type == pipe_type && (r.diameter_mm - diameter_mm).abs() < 1e-9)
    }

    /// Connector names listed for a node type tag.
    pub fn connector_names(&self, kind_tag: &str) -> Vec<&str> {
        self.connectors
            .iter()
            .filter(|c| c.kind == kind_tag)
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn bend_radii_for(&self, diameter_mm: f64) -> Vec<f64> {
        let mut out: Vec<f64> = self
            .bend_radii
            .iter()
            .filter(|b| (b.diameter_mm - diameter_mm).abs() < 1e-9)
            .map(|b| b.radius_mm)
            .collect();
        out.sort_by(f64::total_cmp);
        out.dedup();
        out
    }

    pub fn is_degraded(&self, table: &str) -> bool {
        self.degraded.iter().any(|t| *t == table)
    }
}

/// Read one table, trying the supported extensions in order.
pub fn load_table<T: DeserializeOwned>(dir: &Path, table: &str) -> Result<Vec<T>, CatalogError> {
    for ext in ["yaml", "yml", "json"] {
        let path = dir.join(format!("{table}.{ext}"));
        if !path.is_file() {
            continue;
        }
        let content = std::fs::read_to_string(&path).map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;
        let parsed = if ext == "json" {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        };
        return parsed.map_err(|reason| CatalogError::Parse {
            table: table.to_string(),
            reason,
        });
    }
    Err(CatalogError::NotFound {
        table: table.to_string(),
        dir: dir.to_path_buf(),
    })
}

fn load_or<T: DeserializeOwned>(
    dir: &Path,
    table: &'static str,
    degraded: &mut Vec<&'static str>,
    fallback: fn() -> Vec<T>,
) -> Vec<T> {
    match load_table(dir, table) {
        Ok(rows) => rows,
        Err(err) => {
            warn!(table, error = %err, "catalog unavailable, using fallback values");
            degraded.push(table);
            fallback()
        }
    }
}

fn fallback_pipes() -> Vec<PipeRow> {
    [4.0, 6.0, 8.0]
        .into_iter()
        .map(|d| PipeRow {
            pipe_type: "Standard".to_string(),
            diameter_mm: d,
            ..Default::default()
        })
        .collect()
}

fn fallback_connectors() -> Vec<ConnectorRow> {
    [
        ("t_connector", "T-Connector"),
        ("y_connector", "Y-Connector"),
        ("straight_connector", "Straight Connector"),
    ]
    .into_iter()
    .map(|(kind, name)| ConnectorRow {
        kind: kind.to_string(),
        name: name.to_string(),
        extra: Extra::new(),
    })
    .collect()
}

fn fallback_dirt() -> Vec<DirtRow> {
    vec![DirtRow {
        name: "Standard dirt".to_string(),
        extra: Extra::new(),
    }]
}

fn fallback_fluids() -> Vec<FluidRow> {
    vec![FluidRow {
        name: "Water".to_string(),
        extra: Extra::new(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("wf_catalog_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_dir_falls_back_everywhere() {
        let cat = Catalog::load(Path::new("/definitely/not/a/catalog"));
        assert_eq!(cat.fluid_names(), vec!["Water"]);
        assert!(cat.is_degraded(PIPES));
        assert_eq!(cat.degraded.len(), 6);
        assert_eq!(cat.connector_names("t_connector"), vec!["T-Connector"]);
    }

    #[test]
    fn yaml_pipes_are_read() {
        let dir = temp_dir("pipes");
        std::fs::write(
            dir.join("Pipes.yaml"),
            "- {\"Pipe Type\": PA12, \"Diam. (mm)\": 8, \"Pipe Ref\": R-8, Supplier: Acme}\n\
             - {\"Pipe Type\": PA12, \"Diam. (mm)\": \"6\", \"Pipe Ref\": R-6, Supplier: Acme}\n\
             - {\"Pipe Type\": EPDM, \"Diam. (mm)\": 10}\n",
        )
        .unwrap();
        let cat = Catalog::load(&dir);
        assert!(!cat.is_degraded(PIPES));
        assert!(cat.is_degraded(FLUIDS));
        assert_eq!(cat.pipe_types(), vec!["PA12", "EPDM"]);
        assert_eq!(cat.diameters_for("PA12"), vec![6.0, 8.0]);
        let row = cat.pipe("PA12", 8.0).unwrap();
        assert_eq!(row.pipe_ref, "R-8");
        assert_eq!(row.supplier, "Acme");
    }

    #[test]
    fn json_table_and_malformed_table() {
        let dir = temp_dir("json");
        std::fs::write(
            dir.join("Fluids.json"),
            r#"[{"LLG Name": "Screenwash -20"}, {"LLG Name": "Water"}]"#,
        )
        .unwrap();
        std::fs::write(dir.join("Dirt_Types.json"), "{ not json").unwrap();
        let cat = Catalog::load(&dir);
        assert_eq!(cat.fluid_names(), vec!["Screenwash -20", "Water"]);
        assert!(cat.is_degraded(DIRT_TYPES));
        assert!(matches!(
            load_table::<DirtRow>(&dir, DIRT_TYPES),
            Err(CatalogError::Parse { .. })
        ));
    }
}
