use super::heap::OpenList;
use super::heuristic::{heuristic, DIAGONAL_COST, STRAIGHT_COST};
use crate::common::{Node, NodeState, PathResult, Point};
use crate::cost::CostModel;
use crate::map::Grid;

use std::collections::HashMap;
use tracing::trace;

/// Callback receiving the outcome of one path request.
pub type PathCallback = Box<dyn FnOnce(PathResult)>;

const CARDINAL_MOVES: [(isize, isize); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const DIAGONAL_MOVES: [(isize, isize); 4] = [(-1, -1), (1, -1), (1, 1), (-1, 1)];

/// Read-only configuration borrowed from the engine for one step.
pub(crate) struct SearchContext<'a> {
    pub(crate) grid: &'a Grid,
    pub(crate) costs: &'a CostModel,
    pub(crate) diagonals: bool,
    pub(crate) corner_cutting: bool,
}

#[derive(Debug, PartialEq)]
pub(crate) enum Step {
    /// A node was closed and its neighbours generated.
    Expanded,
    Found(Vec<Point>),
    Exhausted,
}

/// Mutable state of a single in-flight path request.
pub(crate) struct SearchInstance {
    pub(crate) start: Point,
    pub(crate) goal: Point,
    open_list: OpenList,
    nodes: Vec<Node>,
    node_map: HashMap<Point, usize>,
    pub(crate) callback: PathCallback,
}

impl SearchInstance {
    pub(crate) fn new(start: Point, goal: Point, diagonals: bool, callback: PathCallback) -> Self {
        let mut instance = SearchInstance {
            start,
            goal,
            open_list: OpenList::new(),
            nodes: Vec::new(),
            node_map: HashMap::new(),
            callback,
        };
        instance.insert(Node::new(start, 0.0, heuristic(start, goal, diagonals), None));
        instance
    }

    fn insert(&mut self, node: Node) {
        let index = self.nodes.len();
        self.node_map.insert(node.position, index);
        self.nodes.push(node);
        self.open_list.push(&mut self.nodes, index);
    }

    /// Pop the best open node and either finish the search or expand it.
    pub(crate) fn step(&mut self, ctx: &SearchContext) -> Step {
        let Some(current) = self.open_list.pop(&mut self.nodes) else {
            return Step::Exhausted;
        };
        self.nodes[current].state = NodeState::Closed;

        if self.nodes[current].position == self.goal {
            return Step::Found(self.construct_path(current));
        }

        trace!(
            "expand node: {:?}, open list size {}",
            self.nodes[current],
            self.open_list.len()
        );
        self.explore_neighbors(ctx, current);
        Step::Expanded
    }

    fn explore_neighbors(&mut self, ctx: &SearchContext, current: usize) {
        let position = self.nodes[current].position;
        let g_cost = self.nodes[current].g_cost;

        let cardinal = CARDINAL_MOVES.iter().map(|&(dx, dy)| (dx, dy, STRAIGHT_COST));
        let diagonal = DIAGONAL_MOVES
            .iter()
            .filter(|_| ctx.diagonals)
            .map(|&(dx, dy)| (dx, dy, DIAGONAL_COST));

        for (dx, dy, base_cost) in cardinal.chain(diagonal) {
            let Some(neighbor) = position.offset(dx, dy).filter(|p| ctx.grid.contains(*p)) else {
                continue;
            };

            if dx != 0 && dy != 0 && !ctx.corner_cutting {
                // Both flanking cells must be enterable from the current cell.
                let flanks_walkable = [(dx, 0), (0, dy)].iter().all(|&(fx, fy)| {
                    position
                        .offset(fx, fy)
                        .is_some_and(|flank| ctx.costs.is_walkable(ctx.grid, flank, position))
                });
                if !flanks_walkable {
                    continue;
                }
            }

            if !ctx.costs.is_walkable(ctx.grid, neighbor, position) {
                continue;
            }

            let tentative_g_cost = g_cost + base_cost * ctx.costs.move_cost(ctx.grid, neighbor);

            match self.node_map.get(&neighbor) {
                None => {
                    let h_cost = heuristic(neighbor, self.goal, ctx.diagonals);
                    self.insert(Node::new(neighbor, tentative_g_cost, h_cost, Some(current)));
                }
                Some(&index) => {
                    let node = &mut self.nodes[index];
                    if node.state == NodeState::Closed || tentative_g_cost >= node.g_cost {
                        continue;
                    }
                    node.relax(tentative_g_cost, current);
                    self.open_list.update_item(&mut self.nodes, index);
                }
            }
        }
    }

    fn construct_path(&self, goal: usize) -> Vec<Point> {
        let mut path = Vec::new();
        let mut current = Some(goal);
        while let Some(index) = current {
            path.push(self.nodes[index].position);
            current = self.nodes[index].parent;
        }
        path.reverse();
        path
    }
}
