pub mod algorithm;
pub mod common;
pub mod config;
pub mod cost;
pub mod engine;
pub mod error;
pub mod map;
pub mod scenario;
pub mod stat;

pub use common::{Direction, InstanceId, PathResult, Point, Tile, IMMEDIATE_INSTANCE};
pub use engine::{Engine, Settings};
pub use error::PathfindError;
pub use map::Grid;
