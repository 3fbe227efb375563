//! A citizen's walking path and fractional progress along it.

use metro_core::NodeId;
use metro_graph::Route;

/// Why the citizen is walking — selects the arrival effect.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TripPurpose {
    Eat,
    Heal,
    Socialize,
    GoHome,
    GoHomeToSleep,
    GoToWork,
    GoToSchool,
    /// Heading for a transit stop because the real destination is beyond
    /// walking range.
    CatchTransit,
}

/// An in-progress walk: the node sequence, the index of the node most
/// recently reached, and fractional progress on the edge to the next node.
#[derive(Clone, Debug, PartialEq)]
pub struct CitizenPath {
    pub nodes: Vec<NodeId>,
    /// Index of the last node reached.
    pub index: usize,
    /// Progress along the edge `nodes[index] → nodes[index + 1]`, in `[0, 1)`.
    pub progress: f32,
    /// Final node of the walk.
    pub destination: NodeId,
    pub purpose: TripPurpose,
}

impl CitizenPath {
    pub fn from_route(route: Route, purpose: TripPurpose) -> Self {
        let destination = *route.nodes.last().expect("routes are never empty");
        Self {
            nodes: route.nodes,
            index: 0,
            progress: 0.0,
            destination,
            purpose,
        }
    }

    /// The node most recently reached.
    #[inline]
    pub fn current(&self) -> NodeId {
        self.nodes[self.index]
    }

    /// The node being walked towards, or `None` at the path end.
    #[inline]
    pub fn next(&self) -> Option<NodeId> {
        self.nodes.get(self.index + 1).copied()
    }

    #[inline]
    pub fn finished(&self) -> bool {
        self.index + 1 >= self.nodes.len()
    }

    /// Add fractional progress; snap to the next node on crossing 1.0.
    /// Returns `true` if a node boundary was crossed this call.
    pub fn advance(&mut self, fraction: f32) -> bool {
        if self.finished() {
            return false;
        }
        self.progress += fraction;
        if self.progress >= 1.0 {
            self.index += 1;
            self.progress = 0.0;
            true
        } else {
            false
        }
    }
}
