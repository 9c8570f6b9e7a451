use std::collections::{HashMap, HashSet};

use crate::common::{Direction, Point, Tile};
use crate::error::PathfindError;
use crate::map::Grid;

/// Walkability and movement cost rules shared by every search of an engine.
#[derive(Debug, Clone, Default)]
pub struct CostModel {
    acceptable_tiles: Option<HashSet<Tile>>,
    tile_costs: HashMap<Tile, f64>,
    point_costs: HashMap<Point, f64>,
    avoided: HashSet<Point>,
    directional: HashMap<Point, HashSet<Direction>>,
}

impl CostModel {
    pub fn has_acceptable_tiles(&self) -> bool {
        self.acceptable_tiles.is_some()
    }

    pub fn set_acceptable_tiles<I: IntoIterator<Item = Tile>>(&mut self, tiles: I) {
        self.acceptable_tiles = Some(tiles.into_iter().collect());
    }

    pub fn is_acceptable(&self, tile: Tile) -> bool {
        self.acceptable_tiles
            .as_ref()
            .is_some_and(|tiles| tiles.contains(&tile))
    }

    /// Give every tile code not seen before the default multiplier of 1.
    pub(crate) fn seed_tile_costs(&mut self, grid: &Grid) {
        for tile in grid.tile_codes() {
            self.tile_costs.entry(tile).or_insert(1.0);
        }
    }

    pub fn set_tile_cost(&mut self, tile: Tile, cost: f64) -> Result<(), PathfindError> {
        self.tile_costs.insert(tile, check_cost(cost)?);
        Ok(())
    }

    pub fn set_point_cost(&mut self, point: Point, cost: f64) -> Result<(), PathfindError> {
        self.point_costs.insert(point, check_cost(cost)?);
        Ok(())
    }

    pub fn remove_point_cost(&mut self, point: Point) {
        self.point_costs.remove(&point);
    }

    pub fn clear_point_costs(&mut self) {
        self.point_costs.clear();
    }

    pub fn set_directional_condition<I: IntoIterator<Item = Direction>>(
        &mut self,
        point: Point,
        allowed: I,
    ) {
        self.directional
            .insert(point, allowed.into_iter().collect());
    }

    pub fn clear_directional_conditions(&mut self) {
        self.directional.clear();
    }

    pub fn avoid(&mut self, point: Point) {
        self.avoided.insert(point);
    }

    pub fn stop_avoiding(&mut self, point: Point) {
        self.avoided.remove(&point);
    }

    pub fn clear_avoided(&mut self) {
        self.avoided.clear();
    }

    /// Whether `cell` may be entered by a move coming from `from`.
    pub fn is_walkable(&self, grid: &Grid, cell: Point, from: Point) -> bool {
        if self.avoided.contains(&cell) {
            return false;
        }

        if !self.is_acceptable(grid.tile(cell)) {
            return false;
        }

        if let Some(allowed) = self.directional.get(&cell) {
            return Direction::of_approach(cell, from)
                .is_some_and(|direction| allowed.contains(&direction));
        }

        true
    }

    /// Multiplier applied to the base step cost when entering `cell`.
    pub fn move_cost(&self, grid: &Grid, cell: Point) -> f64 {
        if let Some(&cost) = self.point_costs.get(&cell) {
            return cost;
        }
        self.tile_costs
            .get(&grid.tile(cell))
            .copied()
            .unwrap_or(1.0)
    }
}

fn check_cost(cost: f64) -> Result<f64, PathfindError> {
    if cost.is_finite() && cost > 0.0 {
        Ok(cost)
    } else {
        Err(PathfindError::Configuration(format!(
            "cost multiplier must be positive and finite, got {cost}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Grid, CostModel) {
        let grid = Grid::new(vec![vec![0, 0, 0], vec![0, 2, 1], vec![0, 0, 0]]).unwrap();
        let mut costs = CostModel::default();
        costs.seed_tile_costs(&grid);
        costs.set_acceptable_tiles([0, 2]);
        (grid, costs)
    }

    #[test]
    fn test_acceptable_tiles() {
        let (grid, costs) = setup();
        let from = Point::new(0, 1);
        assert!(costs.is_walkable(&grid, Point::new(1, 1), from));
        assert!(!costs.is_walkable(&grid, Point::new(2, 1), Point::new(2, 0)));
        assert!(!CostModel::default().has_acceptable_tiles());
        assert!(!CostModel::default().is_acceptable(0));
    }

    #[test]
    fn test_avoided_points_take_precedence() {
        let (grid, mut costs) = setup();
        let cell = Point::new(1, 0);
        costs.avoid(cell);
        assert!(!costs.is_walkable(&grid, cell, Point::new(0, 0)));
        costs.stop_avoiding(cell);
        assert!(costs.is_walkable(&grid, cell, Point::new(0, 0)));
        costs.avoid(cell);
        costs.avoid(Point::new(0, 2));
        costs.clear_avoided();
        assert!(costs.is_walkable(&grid, cell, Point::new(0, 0)));
        assert!(costs.is_walkable(&grid, Point::new(0, 2), Point::new(0, 1)));
    }

    #[test]
    fn test_directional_condition() {
        let (grid, mut costs) = setup();
        let cell = Point::new(1, 1);
        costs.set_directional_condition(cell, [Direction::Top, Direction::BottomRight]);

        assert!(costs.is_walkable(&grid, cell, Point::new(1, 0)));
        assert!(costs.is_walkable(&grid, cell, Point::new(2, 2)));
        assert!(!costs.is_walkable(&grid, cell, Point::new(0, 1)));
        assert!(!costs.is_walkable(&grid, cell, Point::new(1, 2)));

        costs.clear_directional_conditions();
        assert!(costs.is_walkable(&grid, cell, Point::new(1, 2)));
    }

    #[test]
    fn test_move_cost_precedence() {
        let (grid, mut costs) = setup();
        let cell = Point::new(1, 1);
        assert_eq!(costs.move_cost(&grid, cell), 1.0);

        costs.set_tile_cost(2, 3.0).unwrap();
        assert_eq!(costs.move_cost(&grid, cell), 3.0);

        costs.set_point_cost(cell, 5.0).unwrap();
        assert_eq!(costs.move_cost(&grid, cell), 5.0);
        assert_eq!(costs.move_cost(&grid, Point::new(0, 0)), 1.0);

        costs.remove_point_cost(cell);
        assert_eq!(costs.move_cost(&grid, cell), 3.0);

        costs.set_point_cost(cell, 0.5).unwrap();
        costs.clear_point_costs();
        assert_eq!(costs.move_cost(&grid, cell), 3.0);
    }

    #[test]
    fn test_unseeded_tile_defaults_to_unit_cost() {
        let grid = Grid::new(vec![vec![7]]).unwrap();
        let costs = CostModel::default();
        assert_eq!(costs.move_cost(&grid, Point::new(0, 0)), 1.0);
    }

    #[test]
    fn test_reject_invalid_costs() {
        let (_, mut costs) = setup();
        assert!(costs.set_tile_cost(0, 0.0).is_err());
        assert!(costs.set_tile_cost(0, -1.0).is_err());
        assert!(costs.set_point_cost(Point::new(0, 0), f64::NAN).is_err());
        assert!(costs.set_point_cost(Point::new(0, 0), f64::INFINITY).is_err());
        assert!(costs.set_tile_cost(0, 0.25).is_ok());
    }
}
