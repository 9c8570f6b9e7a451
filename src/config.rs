use anyhow::{anyhow, Context};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::common::{Direction, Point, Tile};
use crate::engine::Engine;

#[derive(Parser, Debug, Default)]
#[command(
    name = "grid_astar",
    about = "Incremental multi-request A* over a weighted tile grid.",
    version = "0.1"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Path to the MovingAI map file")]
    pub map_path: Option<String>,

    #[arg(long, help = "Path to the MovingAI scenario file")]
    pub scen_path: Option<String>,

    #[arg(long, help = "Path to write found paths as JSON")]
    pub output_path: Option<String>,

    #[arg(long, help = "Number of random routes to request")]
    pub num_requests: Option<usize>,

    #[arg(
        long,
        help = "Scenario buckets to draw one route from each",
        value_delimiter = ','
    )]
    pub buckets: Vec<usize>,

    #[arg(long, help = "Seed for the random number generator")]
    pub seed: Option<u64>,

    #[arg(long, help = "Allow diagonal moves", default_value_t = false)]
    pub diagonals: bool,

    #[arg(
        long,
        help = "Forbid diagonal moves past blocked corners",
        default_value_t = false
    )]
    pub no_corner_cutting: bool,

    #[arg(
        long,
        help = "Deliver callbacks on the following tick instead of immediately",
        default_value_t = false
    )]
    pub deferred: bool,

    #[arg(long, help = "Expansion budget per advance call in deferred mode")]
    pub iterations_per_calculation: Option<usize>,

    #[arg(
        long,
        help = "Dump the selected routes to debug.yaml",
        default_value_t = false
    )]
    pub debug_yaml: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCost {
    pub x: usize,
    pub y: usize,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionalCondition {
    pub x: usize,
    pub y: usize,
    pub allowed: Vec<Direction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub map_path: String,
    pub scen_path: String,
    pub output_path: Option<String>,
    pub num_requests: usize,
    pub buckets: Vec<usize>,
    pub seed: u64,
    pub acceptable_tiles: Vec<Tile>,
    pub tile_costs: BTreeMap<Tile, f64>,
    pub point_costs: Vec<PointCost>,
    pub avoid_points: Vec<Point>,
    pub directional_conditions: Vec<DirectionalCondition>,
    pub diagonals: bool,
    pub corner_cutting: bool,
    pub sync: bool,
    pub iterations_per_calculation: Option<usize>,
    pub debug_yaml: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            map_path: "map_file/test/test.map".to_string(),
            scen_path: "map_file/test/test.scen".to_string(),
            output_path: None,
            num_requests: 3,
            buckets: Vec::new(),
            seed: 0,
            acceptable_tiles: vec![0],
            tile_costs: BTreeMap::new(),
            point_costs: Vec::new(),
            avoid_points: Vec::new(),
            directional_conditions: Vec::new(),
            diagonals: false,
            corner_cutting: true,
            sync: true,
            iterations_per_calculation: None,
            debug_yaml: false,
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command line values on top of this config. Flags only ever
    /// switch a behaviour on; absent options keep the file's values.
    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(map_path) = &cli.map_path {
            self.map_path = map_path.clone();
        }
        if let Some(scen_path) = &cli.scen_path {
            self.scen_path = scen_path.clone();
        }
        if cli.output_path.is_some() {
            self.output_path = cli.output_path.clone();
        }
        if let Some(num_requests) = cli.num_requests {
            self.num_requests = num_requests;
        }
        if !cli.buckets.is_empty() {
            self.buckets = cli.buckets.clone();
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if cli.iterations_per_calculation.is_some() {
            self.iterations_per_calculation = cli.iterations_per_calculation;
        }
        self.diagonals |= cli.diagonals;
        self.corner_cutting &= !cli.no_corner_cutting;
        self.sync &= !cli.deferred;
        self.debug_yaml |= cli.debug_yaml;

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.acceptable_tiles.is_empty() {
            return Err(anyhow!("at least one acceptable tile is required"));
        }

        if self.buckets.is_empty() && self.num_requests == 0 {
            return Err(anyhow!("nothing to do: no buckets and zero requests"));
        }

        if let Some(0) = self.iterations_per_calculation {
            return Err(anyhow!("iterations per calculation must be at least 1"));
        }

        for (tile, cost) in &self.tile_costs {
            if !(cost.is_finite() && *cost > 0.0) {
                return Err(anyhow!(
                    "cost of tile {tile} must be positive and finite, got {cost}"
                ));
            }
        }

        Ok(())
    }

    /// Push every search setting of this config into `engine`.
    pub fn configure_engine(&self, engine: &mut Engine) -> anyhow::Result<()> {
        engine.set_acceptable_tiles(self.acceptable_tiles.iter().copied());
        for (&tile, &cost) in &self.tile_costs {
            engine.set_tile_cost(tile, cost)?;
        }
        for point_cost in &self.point_costs {
            engine
                .set_additional_point_cost(point_cost.x, point_cost.y, point_cost.cost)
                .with_context(|| format!("invalid point cost {point_cost:?}"))?;
        }
        for point in &self.avoid_points {
            engine.avoid_additional_point(point.x, point.y);
        }
        for condition in &self.directional_conditions {
            engine.set_directional_condition(
                condition.x,
                condition.y,
                condition.allowed.iter().copied(),
            );
        }

        if self.diagonals {
            engine.enable_diagonals();
        } else {
            engine.disable_diagonals();
        }
        if self.corner_cutting {
            engine.enable_corner_cutting();
        } else {
            engine.disable_corner_cutting();
        }
        if self.sync {
            engine.enable_sync();
        } else {
            engine.disable_sync();
        }
        if let Some(iterations) = self.iterations_per_calculation {
            engine.set_iterations_per_calculation(iterations)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Grid;

    const CONFIG: &str = r#"
map_path: map_file/test/test.map
acceptable_tiles: [0, 3]
tile_costs:
  3: 4.5
point_costs:
  - { x: 1, y: 1, cost: 2.0 }
avoid_points:
  - { x: 2, y: 2 }
directional_conditions:
  - { x: 4, y: 1, allowed: [BOTTOM, LEFT] }
diagonals: true
corner_cutting: false
sync: false
iterations_per_calculation: 50
"#;

    #[test]
    fn test_parse_config() {
        let config = Config::from_yaml_str(CONFIG).unwrap();
        assert_eq!(config.acceptable_tiles, vec![0, 3]);
        assert_eq!(config.tile_costs.get(&3), Some(&4.5));
        assert_eq!(config.avoid_points, vec![Point::new(2, 2)]);
        assert_eq!(
            config.directional_conditions[0].allowed,
            vec![Direction::Bottom, Direction::Left]
        );
        assert!(config.diagonals);
        assert!(!config.corner_cutting);
        assert_eq!(config.scen_path, Config::default().scen_path);
    }

    #[test]
    fn test_reject_invalid_config() {
        assert!(Config::from_yaml_str("acceptable_tiles: []").is_err());
        assert!(Config::from_yaml_str("iterations_per_calculation: 0").is_err());
        assert!(Config::from_yaml_str("tile_costs: { 0: -1.0 }").is_err());
        assert!(Config::from_yaml_str("unknown_key: 1").is_err());
    }

    #[test]
    fn test_command_line_override() {
        let cli = Cli::parse_from([
            "grid_astar",
            "--map-path",
            "other.map",
            "--buckets",
            "0,1",
            "--diagonals",
            "--no-corner-cutting",
            "--deferred",
        ]);
        let config = Config::default().override_from_command_line(&cli).unwrap();
        assert_eq!(config.map_path, "other.map");
        assert_eq!(config.buckets, vec![0, 1]);
        assert!(config.diagonals);
        assert!(!config.corner_cutting);
        assert!(!config.sync);
        assert_eq!(config.num_requests, 3);
    }

    #[test]
    fn test_configure_engine() {
        let config = Config::from_yaml_str(CONFIG).unwrap();
        let mut engine = Engine::new();
        engine.set_grid(Grid::from_file(&config.map_path).unwrap());
        config.configure_engine(&mut engine).unwrap();

        let settings = engine.settings();
        assert!(settings.diagonals);
        assert!(!settings.corner_cutting);
        assert!(!settings.sync);
        assert_eq!(settings.iterations_per_calculation, 50);

        // (2, 2) is avoided but its tile is acceptable, so the request is queued.
        let id = engine.find_path(1, 1, 2, 2, |_| {}).unwrap();
        assert_eq!(id, 1);
        let path = [Point::new(1, 1), Point::new(2, 1)];
        assert_eq!(engine.path_cost(&path), Some(1.0));
        let path = [Point::new(2, 1), Point::new(1, 1)];
        assert_eq!(engine.path_cost(&path), Some(2.0));
    }
}
