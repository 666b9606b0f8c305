//! The ordered set of depots and stops for one request.

use std::collections::HashSet;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::{Node, NodeKind};
use crate::error::InputError;

/// Depots followed by stops.
///
/// Node index `i` addresses the combined list: indices `0..num_depots()` are
/// depots, the rest are stops. Every matrix in the crate uses this indexing.
///
/// # Examples
///
/// ```
/// use fleet_routing::models::{LocationSet, Node};
///
/// let set = LocationSet::new(
///     vec![Node::depot("D1", "Depot", 0.0, 0.0)],
///     vec![Node::stop("S1", "Shop", 0.0, 0.1, 5)],
/// );
/// assert_eq!(set.len(), 2);
/// assert_eq!(set.stop_indices(), 1..2);
/// assert_eq!(set.depot_index("D1"), Some(0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSet {
    nodes: Vec<Node>,
    num_depots: usize,
}

impl LocationSet {
    /// Combines depots and stops into one ordered list.
    pub fn new(depots: Vec<Node>, stops: Vec<Node>) -> Self {
        let num_depots = depots.len();
        let mut nodes = depots;
        nodes.extend(stops);
        Self { nodes, num_depots }
    }

    /// All nodes, depots first.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node at `index`, if any.
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` when there are neither depots nor stops.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of depots.
    pub fn num_depots(&self) -> usize {
        self.num_depots
    }

    /// Number of stops.
    pub fn num_stops(&self) -> usize {
        self.nodes.len() - self.num_depots
    }

    /// Depot nodes.
    pub fn depots(&self) -> &[Node] {
        &self.nodes[..self.num_depots]
    }

    /// Stop nodes.
    pub fn stops(&self) -> &[Node] {
        &self.nodes[self.num_depots..]
    }

    /// Node indices of the stops.
    pub fn stop_indices(&self) -> Range<usize> {
        self.num_depots..self.nodes.len()
    }

    /// Node index of the depot with the given identifier.
    pub fn depot_index(&self, depot_id: &str) -> Option<usize> {
        self.depots().iter().position(|d| d.id() == depot_id)
    }

    /// Checks kinds, coordinates, demands, and identifier uniqueness.
    pub fn validate(&self) -> Result<(), InputError> {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        for (index, node) in self.nodes.iter().enumerate() {
            let expected = if index < self.num_depots {
                NodeKind::Depot
            } else {
                NodeKind::Stop
            };
            if node.kind() != expected {
                return Err(InputError::WrongKind {
                    node: node.id().to_owned(),
                    expected: match expected {
                        NodeKind::Depot => "depot",
                        NodeKind::Stop => "stop",
                    },
                });
            }
            if !seen.insert(node.id()) {
                return Err(InputError::DuplicateId(node.id().to_owned()));
            }
            let c = node.coordinates();
            if !c.is_valid() {
                return Err(InputError::CoordinatesOutOfRange {
                    node: node.id().to_owned(),
                    latitude: c.latitude,
                    longitude: c.longitude,
                });
            }
            if expected == NodeKind::Stop && node.demand() <= 0 {
                return Err(InputError::NonPositiveDemand {
                    stop: node.id().to_owned(),
                    demand: node.demand(),
                });
            }
        }
        Ok(())
    }
}
