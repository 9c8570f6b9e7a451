mod astar;
mod heap;
mod heuristic;

pub use astar::PathCallback;
pub use heuristic::{heuristic, DIAGONAL_COST, STRAIGHT_COST};

pub(crate) use astar::{SearchContext, SearchInstance, Step};
