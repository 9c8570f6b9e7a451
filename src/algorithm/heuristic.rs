use crate::common::Point;

pub const STRAIGHT_COST: f64 = 1.0;
pub const DIAGONAL_COST: f64 = std::f64::consts::SQRT_2;

/// Distance estimate from `from` to `to`: Manhattan on a 4-connected grid,
/// Octile when diagonal moves are enabled. Admissible only while every
/// cost multiplier is at least 1.
pub fn heuristic(from: Point, to: Point, diagonals: bool) -> f64 {
    let dx = from.x.abs_diff(to.x) as f64;
    let dy = from.y.abs_diff(to.y) as f64;

    if diagonals {
        let min = dx.min(dy);
        let max = dx.max(dy);
        DIAGONAL_COST * min + STRAIGHT_COST * (max - min)
    } else {
        STRAIGHT_COST * (dx + dy)
    }
}
