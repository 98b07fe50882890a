//! Circuit node types.

use std::str::FromStr;

use wf_core::{NodeHandle, Point};

use crate::error::GraphError;

/// Kind of a node placed on a circuit canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    /// The pump feeding this circuit.
    Pump,
    /// A washing component (nozzle target).
    Component,
    TConnector,
    YConnector,
    StraightConnector,
}

impl NodeKind {
    pub const ALL: [NodeKind; 5] = [
        NodeKind::Pump,
        NodeKind::Component,
        NodeKind::TConnector,
        NodeKind::YConnector,
        NodeKind::StraightConnector,
    ];

    pub const CONNECTORS: [NodeKind; 3] = [
        NodeKind::TConnector,
        NodeKind::YConnector,
        NodeKind::StraightConnector,
    ];

    /// Persisted type tag.
    pub fn tag(self) -> &'static str {
        match self {
            NodeKind::Pump => "pump",
            NodeKind::Component => "component",
            NodeKind::TConnector => "t_connector",
            NodeKind::YConnector => "y_connector",
            NodeKind::StraightConnector => "straight_connector",
        }
    }

    /// Human label for notices and palettes.
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Pump => "pump",
            NodeKind::Component => "washing component",
            NodeKind::TConnector => "T connector",
            NodeKind::YConnector => "Y connector",
            NodeKind::StraightConnector => "straight connector",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            NodeKind::Pump => Direction::Out,
            NodeKind::Component => Direction::In,
            _ => Direction::Both,
        }
    }

    pub fn is_connector(self) -> bool {
        self.direction() == Direction::Both
    }

    /// Capacity for kinds whose capacity does not depend on the catalog row.
    /// Pumps take their output count instead.
    pub fn fixed_capacity(self) -> Option<u32> {
        match self {
            NodeKind::Pump => None,
            NodeKind::Component => Some(1),
            NodeKind::TConnector | NodeKind::YConnector => Some(3),
            NodeKind::StraightConnector => Some(2),
        }
    }

    /// Original name given to connectors placed without a catalog entry.
    pub fn default_connector_name(self) -> &'static str {
        match self {
            NodeKind::TConnector => "T-Connector",
            NodeKind::YConnector => "Y-Connector",
            NodeKind::StraightConnector => "Straight Connector",
            NodeKind::Pump => "Pump",
            NodeKind::Component => "Component",
        }
    }
}

impl FromStr for NodeKind {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|k| k.tag() == s)
            .ok_or_else(|| GraphError::InvalidType { tag: s.to_string() })
    }
}

/// Flow capability of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Can only be a pipe source.
    Out,
    /// Can only be a pipe target.
    In,
    /// Can be either end.
    Both,
}

impl Direction {
    pub fn can_send(self) -> bool {
        matches!(self, Direction::Out | Direction::Both)
    }

    pub fn can_receive(self) -> bool {
        matches!(self, Direction::In | Direction::Both)
    }
}

/// Everything needed to place a node except its position.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub kind: NodeKind,
    /// Document row id for pumps and components; synthetic for connectors.
    pub identity: String,
    /// Catalog name without any display suffix. This is what gets persisted.
    pub original_name: String,
    pub display_name: String,
    pub max_connections: u32,
}

impl NodeSpec {
    pub fn pump(identity: impl Into<String>, name: impl Into<String>, outputs: u32) -> Self {
        let name = name.into();
        Self {
            kind: NodeKind::Pump,
            identity: identity.into(),
            display_name: name.clone(),
            original_name: name,
            max_connections: outputs,
        }
    }

    pub fn component(identity: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: NodeKind::Component,
            identity: identity.into(),
            display_name: name.clone(),
            original_name: name,
            max_connections: 1,
        }
    }

    /// Connector spec. Returns `None` when `kind` is not a connector.
    pub fn connector(
        kind: NodeKind,
        identity: impl Into<String>,
        name: impl Into<String>,
    ) -> Option<Self> {
        let capacity = kind.fixed_capacity().filter(|_| kind.is_connector())?;
        let name = name.into();
        Some(Self {
            kind,
            identity: identity.into(),
            display_name: name.clone(),
            original_name: name,
            max_connections: capacity,
        })
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }
}

/// A node placed on a circuit canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitNode {
    pub handle: NodeHandle,
    pub kind: NodeKind,
    pub identity: String,
    pub original_name: String,
    pub display_name: String,
    pub position: Point,
    pub direction: Direction,
    pub max_connections: u32,
    pub current_connections: u32,
}

impl CircuitNode {
    pub fn is_full(&self) -> bool {
        self.current_connections >= self.max_connections
    }
}
