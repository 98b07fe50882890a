//! Pipes: the directed edges of a circuit.

use wf_core::{NodeHandle, PipeHandle, WfError};

/// Routing of a pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Inclination {
    #[default]
    Straight,
    Bent,
}

impl Inclination {
    pub fn tag(self) -> &'static str {
        match self {
            Inclination::Straight => "straight",
            Inclination::Bent => "bent",
        }
    }
}

/// Physical parameters of a pipe, lengths in millimetres and angles in degrees.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipeParameters {
    pub diameter_mm: f64,
    pub pipe_type: String,
    pub length_mm: f64,
    pub inclination: Inclination,
    /// Positive iff the pipe is bent.
    pub bend_radius_mm: f64,
    pub bend_angle_deg: f64,
    pub pipe_ref: String,
    pub supplier: String,
}

impl PipeParameters {
    /// Range checks on entered values.
    pub fn validate(&self) -> Result<(), WfError> {
        if !self.diameter_mm.is_finite() || self.diameter_mm <= 0.0 {
            return Err(WfError::invalid_input("diameter", "must be greater than zero"));
        }
        if !self.length_mm.is_finite() || self.length_mm < 0.0 {
            return Err(WfError::invalid_input("length", "must not be negative"));
        }
        match self.inclination {
            Inclination::Bent => {
                if !self.bend_radius_mm.is_finite() || self.bend_radius_mm <= 0.0 {
                    return Err(WfError::invalid_input(
                        "bend radius",
                        "must be greater than zero for a bent pipe",
                    ));
                }
                if !self.bend_angle_deg.is_finite() || !(0.0..=360.0).contains(&self.bend_angle_deg)
                {
                    return Err(WfError::invalid_input(
                        "bend angle",
                        "must be between 0 and 360 degrees",
                    ));
                }
            }
            Inclination::Straight => {
                if self.bend_radius_mm != 0.0 {
                    return Err(WfError::invalid_input(
                        "bend radius",
                        "must be zero for a straight pipe",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// A directed pipe between two circuit nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub handle: PipeHandle,
    pub source: NodeHandle,
    pub target: NodeHandle,
    pub parameters: PipeParameters,
}

impl Pipe {
    pub fn touches(&self, node: NodeHandle) -> bool {
        self.source == node || self.target == node
    }

    /// The endpoint opposite `node`, if `node` is an endpoint.
    pub fn other_end(&self, node: NodeHandle) -> Option<NodeHandle> {
        if self.source == node {
            Some(self.target)
        } else if self.target == node {
            Some(self.source)
        } else {
            None
        }
    }

    /// True when the pipe joins `a` and `b` regardless of direction.
    pub fn joins(&self, a: NodeHandle, b: NodeHandle) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}
