use super::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeState {
    Open,
    Closed,
}

/// Search node stored in a per-instance arena. `parent` is an arena index,
/// always pointing at a node that was closed before this one was created.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) position: Point,
    pub(crate) g_cost: f64,
    pub(crate) h_cost: f64,
    pub(crate) f_cost: f64,
    pub(crate) parent: Option<usize>,
    pub(crate) state: NodeState,
    pub(crate) heap_slot: Option<usize>,
}

impl Node {
    pub(crate) fn new(position: Point, g_cost: f64, h_cost: f64, parent: Option<usize>) -> Self {
        Node {
            position,
            g_cost,
            h_cost,
            f_cost: g_cost + h_cost,
            parent,
            state: NodeState::Open,
            heap_slot: None,
        }
    }

    /// Record a cheaper route to this node, keeping `f == g + h`.
    pub(crate) fn relax(&mut self, g_cost: f64, parent: usize) {
        self.g_cost = g_cost;
        self.f_cost = g_cost + self.h_cost;
        self.parent = Some(parent);
    }
}
