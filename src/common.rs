mod node;

pub(crate) use node::{Node, NodeState};

use serde::{Deserialize, Serialize};

/// Tile code stored in a grid cell.
pub type Tile = i32;

/// Identifier handed out by `Engine::find_path`. Zero means the request was
/// resolved without being queued.
pub type InstanceId = usize;

pub const IMMEDIATE_INSTANCE: InstanceId = 0;

/// Result delivered to a path callback: `None` when the goal is unreachable,
/// an empty path when start and goal coincide, otherwise every cell from
/// start to goal inclusive.
pub type PathResult = Option<Vec<Point>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub fn new(x: usize, y: usize) -> Self {
        Point { x, y }
    }

    /// Offset this point, returning `None` if it would leave the
    /// non-negative quadrant.
    pub(crate) fn offset(&self, dx: isize, dy: isize) -> Option<Point> {
        Some(Point {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }
}

impl From<(usize, usize)> for Point {
    fn from((x, y): (usize, usize)) -> Self {
        Point { x, y }
    }
}

/// Compass direction a cell is entered from. `Top` means the mover comes
/// from the cell directly above (smaller `y`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    TopLeft,
}

impl Direction {
    /// Direction of `from` as seen from `cell`, if the two are adjacent.
    pub fn of_approach(cell: Point, from: Point) -> Option<Direction> {
        let dx = from.x as isize - cell.x as isize;
        let dy = from.y as isize - cell.y as isize;
        match (dx, dy) {
            (0, -1) => Some(Direction::Top),
            (1, -1) => Some(Direction::TopRight),
            (1, 0) => Some(Direction::Right),
            (1, 1) => Some(Direction::BottomRight),
            (0, 1) => Some(Direction::Bottom),
            (-1, 1) => Some(Direction::BottomLeft),
            (-1, 0) => Some(Direction::Left),
            (-1, -1) => Some(Direction::TopLeft),
            _ => None,
        }
    }
}
