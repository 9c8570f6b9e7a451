use grid_astar::config::{Cli, Config};
use grid_astar::map::Grid;
use grid_astar::scenario::{Route, Scenario};
use grid_astar::{Engine, PathResult, Point};

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::cell::RefCell;
use std::fs::File;
use std::io::BufWriter;
use std::rc::Rc;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// MovingAI lengths are rounded to eight decimals.
const OPTIMAL_LENGTH_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Serialize)]
struct PathReport {
    start: Point,
    goal: Point,
    cost: Option<f64>,
    path: Option<Vec<Point>>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)
            .with_context(|| format!("cannot read config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        info!("No config file specified, using default config");
        Config::default()
    }
    .override_from_command_line(&cli)?;

    let grid = Grid::from_file(&config.map_path)?;
    let scenario = Scenario::load_from_scen(&config.scen_path)?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let routes = if config.buckets.is_empty() {
        scenario.routes_randomly(config.num_requests, &mut rng)?
    } else {
        scenario.routes_by_buckets(&config.buckets, &mut rng)?
    };
    if config.debug_yaml {
        Scenario::write_routes_to_yaml("debug.yaml", &routes)?;
    }

    let mut engine = Engine::new();
    engine.set_grid(grid);
    config.configure_engine(&mut engine)?;

    let results: Rc<RefCell<Vec<(usize, PathResult)>>> = Rc::default();
    for (index, route) in routes.iter().enumerate() {
        let results = Rc::clone(&results);
        engine
            .find_path(
                route.start.x,
                route.start.y,
                route.goal.x,
                route.goal.y,
                move |path| results.borrow_mut().push((index, path)),
            )
            .with_context(|| format!("route {index} rejected: {route:?}"))?;
    }

    let solve_start_time = Instant::now();
    while !engine.is_idle() {
        engine.advance();
    }
    info!(
        "Resolved {} routes in {} microseconds",
        routes.len(),
        solve_start_time.elapsed().as_micros()
    );

    // Published lengths assume octile moves without corner cutting and unit costs.
    let check_optimal = config.diagonals
        && !config.corner_cutting
        && config.tile_costs.values().all(|&cost| cost == 1.0)
        && config.point_costs.is_empty();

    let mut reports = Vec::with_capacity(routes.len());
    for (index, path) in results.borrow_mut().drain(..) {
        let route = &routes[index];
        let cost = match &path {
            Some(path) => Some(engine.path_cost(path).context("engine has no grid")?),
            None => {
                warn!("no path for route {index}: {:?} -> {:?}", route.start, route.goal);
                None
            }
        };
        if check_optimal {
            verify_optimal(index, route, cost);
        }
        reports.push(PathReport {
            start: route.start,
            goal: route.goal,
            cost,
            path,
        });
    }

    engine.stats().print();

    if let Some(output_path) = &config.output_path {
        let file = File::create(output_path)
            .with_context(|| format!("cannot create output file: {output_path}"))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &reports)?;
        info!("Wrote {} paths to {output_path}", reports.len());
    }

    Ok(())
}

fn verify_optimal(index: usize, route: &Route, cost: Option<f64>) {
    match (route.optimal_length, cost) {
        (Some(expected), Some(cost)) if (expected - cost).abs() > OPTIMAL_LENGTH_TOLERANCE => {
            warn!("route {index} cost {cost} differs from published optimum {expected}");
        }
        (Some(expected), None) => {
            warn!("route {index} has a published optimum {expected} but no path was found");
        }
        _ => {}
    }
}
