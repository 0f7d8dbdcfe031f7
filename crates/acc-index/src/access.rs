//! The outcome of snapping a point onto the network.

use acc_core::{NodeId, Point};
use acc_network::Network;

/// Where a point joins the network.
///
/// `OffNetwork` means no node lies within the search radius.  It is a
/// normal outcome: every distance from or to such a point is unreachable,
/// which is different from a zero-length path.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AccessNode {
    Snapped(NodeId),
    OffNetwork,
}

impl AccessNode {
    /// Snap `point` to its nearest node within `search_radius`.
    pub fn resolve(point: Point, network: &Network, search_radius: f64) -> Self {
        network.resolve(point, search_radius).into()
    }

    #[inline]
    pub fn node(self) -> Option<NodeId> {
        match self {
            AccessNode::Snapped(n) => Some(n),
            AccessNode::OffNetwork => None,
        }
    }

    #[inline]
    pub fn is_snapped(self) -> bool {
        matches!(self, AccessNode::Snapped(_))
    }
}

impl From<Option<NodeId>> for AccessNode {
    fn from(node: Option<NodeId>) -> Self {
        node.map_or(AccessNode::OffNetwork, AccessNode::Snapped)
    }
}
