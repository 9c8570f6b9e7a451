use crate::algorithm::{
    PathCallback, SearchContext, SearchInstance, Step, DIAGONAL_COST, STRAIGHT_COST,
};
use crate::common::{Direction, InstanceId, PathResult, Point, Tile, IMMEDIATE_INSTANCE};
use crate::cost::CostModel;
use crate::error::PathfindError;
use crate::map::Grid;
use crate::stat::Stats;

use std::collections::{HashMap, VecDeque};
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub diagonals: bool,
    pub corner_cutting: bool,
    /// Deliver callbacks inside the call that resolves them and drain the
    /// whole queue on every `advance`.
    pub sync: bool,
    /// Expansion budget of one `advance` call when `sync` is off.
    pub iterations_per_calculation: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            diagonals: false,
            corner_cutting: true,
            sync: false,
            iterations_per_calculation: usize::MAX,
        }
    }
}

/// Incremental multi-request A* scheduler over a single grid.
///
/// Requests are resolved strictly in submission order: the instance at the
/// head of the queue is driven to completion before the next one starts.
/// Callbacks must not call back into the engine.
#[derive(Default)]
pub struct Engine {
    grid: Option<Grid>,
    costs: CostModel,
    settings: Settings,
    instances: HashMap<InstanceId, SearchInstance>,
    queue: VecDeque<InstanceId>,
    deferred: VecDeque<(PathCallback, PathResult)>,
    last_instance_id: InstanceId,
    stats: Stats,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Engine {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn set_grid(&mut self, grid: Grid) {
        self.costs.seed_tile_costs(&grid);
        self.grid = Some(grid);
    }

    pub fn set_acceptable_tiles<I: IntoIterator<Item = Tile>>(&mut self, tiles: I) {
        self.costs.set_acceptable_tiles(tiles);
    }

    pub fn set_tile_cost(&mut self, tile: Tile, cost: f64) -> Result<(), PathfindError> {
        self.costs.set_tile_cost(tile, cost)
    }

    pub fn set_additional_point_cost(
        &mut self,
        x: usize,
        y: usize,
        cost: f64,
    ) -> Result<(), PathfindError> {
        self.costs.set_point_cost(Point::new(x, y), cost)
    }

    pub fn remove_additional_point_cost(&mut self, x: usize, y: usize) {
        self.costs.remove_point_cost(Point::new(x, y));
    }

    pub fn remove_all_additional_point_costs(&mut self) {
        self.costs.clear_point_costs();
    }

    pub fn set_directional_condition<I: IntoIterator<Item = Direction>>(
        &mut self,
        x: usize,
        y: usize,
        allowed: I,
    ) {
        self.costs
            .set_directional_condition(Point::new(x, y), allowed);
    }

    pub fn remove_all_directional_conditions(&mut self) {
        self.costs.clear_directional_conditions();
    }

    pub fn avoid_additional_point(&mut self, x: usize, y: usize) {
        self.costs.avoid(Point::new(x, y));
    }

    pub fn stop_avoiding_additional_point(&mut self, x: usize, y: usize) {
        self.costs.stop_avoiding(Point::new(x, y));
    }

    pub fn stop_avoiding_all_additional_points(&mut self) {
        self.costs.clear_avoided();
    }

    pub fn enable_diagonals(&mut self) {
        self.settings.diagonals = true;
    }

    pub fn disable_diagonals(&mut self) {
        self.settings.diagonals = false;
    }

    pub fn enable_corner_cutting(&mut self) {
        self.settings.corner_cutting = true;
    }

    pub fn disable_corner_cutting(&mut self) {
        self.settings.corner_cutting = false;
    }

    pub fn enable_sync(&mut self) {
        self.settings.sync = true;
    }

    pub fn disable_sync(&mut self) {
        self.settings.sync = false;
    }

    pub fn set_iterations_per_calculation(&mut self, iterations: usize) -> Result<(), PathfindError> {
        if iterations == 0 {
            return Err(PathfindError::Configuration(
                "iterations per calculation must be at least 1".to_string(),
            ));
        }
        self.settings.iterations_per_calculation = iterations;
        Ok(())
    }

    /// Submit a path request. Returns the id of the queued instance, or
    /// `IMMEDIATE_INSTANCE` when the result was known without searching.
    pub fn find_path<F>(
        &mut self,
        start_x: usize,
        start_y: usize,
        end_x: usize,
        end_y: usize,
        callback: F,
    ) -> Result<InstanceId, PathfindError>
    where
        F: FnOnce(PathResult) + 'static,
    {
        if !self.costs.has_acceptable_tiles() {
            return Err(PathfindError::Configuration(
                "acceptable tiles must be set before requesting a path".to_string(),
            ));
        }
        let Some(grid) = self.grid.as_ref() else {
            return Err(PathfindError::Configuration(
                "a grid must be set before requesting a path".to_string(),
            ));
        };
        grid.bounds_check(start_x, start_y)?;
        grid.bounds_check(end_x, end_y)?;

        let start = Point::new(start_x, start_y);
        let goal = Point::new(end_x, end_y);
        let goal_acceptable = self.costs.is_acceptable(grid.tile(goal));
        self.stats.requests += 1;

        if start == goal {
            debug!("request {start:?} -> {goal:?} resolved immediately: start is goal");
            self.stats.found += 1;
            self.dispatch(Box::new(callback), Some(Vec::new()));
            return Ok(IMMEDIATE_INSTANCE);
        }

        if !goal_acceptable {
            debug!("request {start:?} -> {goal:?} resolved immediately: goal not walkable");
            self.stats.not_found += 1;
            self.dispatch(Box::new(callback), None);
            return Ok(IMMEDIATE_INSTANCE);
        }

        self.last_instance_id += 1;
        let id = self.last_instance_id;
        let instance =
            SearchInstance::new(start, goal, self.settings.diagonals, Box::new(callback));
        self.instances.insert(id, instance);
        self.queue.push_back(id);
        debug!("queued instance {id}: {start:?} -> {goal:?}");

        Ok(id)
    }

    /// Cancel a pending request. Its callback will never fire.
    pub fn cancel_path(&mut self, id: InstanceId) -> bool {
        let cancelled = self.instances.remove(&id).is_some();
        if cancelled {
            debug!("cancelled instance {id}");
            self.stats.cancelled += 1;
        }
        cancelled
    }

    /// Number of requests still waiting to be resolved.
    pub fn pending(&self) -> usize {
        self.instances.len()
    }

    /// True once every request is resolved and every callback delivered.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.deferred.is_empty()
    }

    /// Deliver callbacks whose results were computed by an earlier tick.
    pub fn dispatch_deferred(&mut self) {
        while let Some((callback, result)) = self.deferred.pop_front() {
            callback(result);
        }
    }

    /// Run one scheduling tick: deliver deferred callbacks, then expand
    /// queued instances in order until the iteration budget is spent or the
    /// queue is empty. In sync mode the budget never runs out.
    #[instrument(skip_all, name = "advance", fields(queued = self.queue.len()), level = "debug")]
    pub fn advance(&mut self) {
        self.dispatch_deferred();
        if self.queue.is_empty() || self.grid.is_none() || !self.costs.has_acceptable_tiles() {
            return;
        }
        self.stats.advance_calls += 1;

        let mut iterations = 0;
        while self.settings.sync || iterations < self.settings.iterations_per_calculation {
            let Some(&id) = self.queue.front() else {
                break;
            };

            let step = match (self.grid.as_ref(), self.instances.get_mut(&id)) {
                (Some(grid), Some(instance)) => instance.step(&SearchContext {
                    grid,
                    costs: &self.costs,
                    diagonals: self.settings.diagonals,
                    corner_cutting: self.settings.corner_cutting,
                }),
                _ => {
                    // Cancelled after it was queued.
                    self.queue.pop_front();
                    continue;
                }
            };

            match step {
                Step::Expanded => {
                    self.stats.expanded_nodes += 1;
                    iterations += 1;
                }
                Step::Found(path) => {
                    self.stats.found += 1;
                    self.resolve(id, Some(path));
                }
                Step::Exhausted => {
                    self.stats.not_found += 1;
                    self.resolve(id, None);
                }
            }
        }
    }

    /// Cost of walking `path` under the current configuration: the sum of
    /// each step's base cost times the entered cell's multiplier.
    pub fn path_cost(&self, path: &[Point]) -> Option<f64> {
        let grid = self.grid.as_ref()?;
        let mut total = 0.0;
        for step in path.windows(2) {
            let (from, to) = (step[0], step[1]);
            if !grid.contains(to) {
                return None;
            }
            let base = if from.x != to.x && from.y != to.y {
                DIAGONAL_COST
            } else {
                STRAIGHT_COST
            };
            total += base * self.costs.move_cost(grid, to);
        }
        Some(total)
    }

    fn resolve(&mut self, id: InstanceId, result: PathResult) {
        self.queue.pop_front();
        if let Some(instance) = self.instances.remove(&id) {
            debug!(
                "resolved instance {id}: {:?} -> {:?}, path length {:?}",
                instance.start,
                instance.goal,
                result.as_ref().map(Vec::len)
            );
            self.dispatch(instance.callback, result);
        }
    }

    fn dispatch(&mut self, callback: PathCallback, result: PathResult) {
        if self.settings.sync {
            callback(result);
        } else {
            self.deferred.push_back((callback, result));
        }
    }
}
