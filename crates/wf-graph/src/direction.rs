//! Pipe orientation rules.

use wf_core::NodeHandle;

use crate::error::{GraphError, GraphResult};
use crate::node::{Direction, NodeKind};

/// Resolved source and target for a pipe between two clicked nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation {
    pub source: NodeHandle,
    pub target: NodeHandle,
    /// Both ends could send and receive; the clicked order was kept.
    pub ambiguous: bool,
    /// The clicked order was reversed to run from sender to receiver.
    pub flipped: bool,
}

/// Decide the orientation of a pipe clicked from `first` to `second`.
///
/// | first \ second | out      | in       | both      |
/// |----------------|----------|----------|-----------|
/// | out            | conflict | kept     | kept      |
/// | in             | flipped  | conflict | flipped   |
/// | both           | flipped  | kept     | ambiguous |
pub fn resolve_orientation(
    first: (NodeHandle, NodeKind),
    second: (NodeHandle, NodeKind),
) -> GraphResult<Orientation> {
    let (a, a_kind) = first;
    let (b, b_kind) = second;
    let kept = Orientation {
        source: a,
        target: b,
        ambiguous: false,
        flipped: false,
    };
    let flipped = Orientation {
        source: b,
        target: a,
        ambiguous: false,
        flipped: true,
    };

    match (a_kind.direction(), b_kind.direction()) {
        (Direction::Out, Direction::Out) | (Direction::In, Direction::In) => {
            Err(GraphError::DirectionConflict {
                a: a_kind,
                b: b_kind,
            })
        }
        (Direction::Out, _) | (_, Direction::In) => Ok(kept),
        (Direction::In, _) | (_, Direction::Out) => Ok(flipped),
        (Direction::Both, Direction::Both) => Ok(Orientation {
            ambiguous: true,
            ..kept
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_core::Id;

    fn h(i: u32) -> NodeHandle {
        Id::from_index(i)
    }

    #[test]
    fn pump_to_component_kept() {
        let o = resolve_orientation((h(0), NodeKind::Pump), (h(1), NodeKind::Component)).unwrap();
        assert_eq!((o.source, o.target), (h(0), h(1)));
        assert!(!o.ambiguous && !o.flipped);
    }

    #[test]
    fn component_to_pump_flipped() {
        let o = resolve_orientation((h(1), NodeKind::Component), (h(0), NodeKind::Pump)).unwrap();
        assert_eq!((o.source, o.target), (h(0), h(1)));
        assert!(o.flipped);
    }

    #[test]
    fn connector_to_pump_flipped() {
        let o = resolve_orientation((h(2), NodeKind::TConnector), (h(0), NodeKind::Pump)).unwrap();
        assert_eq!((o.source, o.target), (h(0), h(2)));
    }

    #[test]
    fn component_to_connector_flipped() {
        let o =
            resolve_orientation((h(1), NodeKind::Component), (h(2), NodeKind::YConnector)).unwrap();
        assert_eq!((o.source, o.target), (h(2), h(1)));
    }

    #[test]
    fn connectors_keep_clicked_order() {
        let o = resolve_orientation(
            (h(3), NodeKind::StraightConnector),
            (h(2), NodeKind::TConnector),
        )
        .unwrap();
        assert_eq!((o.source, o.target), (h(3), h(2)));
        assert!(o.ambiguous);
    }

    #[test]
    fn like_ends_conflict() {
        assert!(matches!(
            resolve_orientation((h(1), NodeKind::Component), (h(2), NodeKind::Component)),
            Err(GraphError::DirectionConflict { .. })
        ));
        assert!(matches!(
            resolve_orientation((h(1), NodeKind::Pump), (h(2), NodeKind::Pump)),
            Err(GraphError::DirectionConflict { .. })
        ));
    }
}
