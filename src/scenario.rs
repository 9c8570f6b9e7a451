use anyhow::{anyhow, Context, Result};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use tracing::info;

use crate::common::Point;

/// One path request from a benchmark scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub start: Point,
    pub goal: Point,
    /// Published optimal length (octile moves, no corner cutting).
    pub optimal_length: Option<f64>,
}

type Bucket = Vec<Route>;

#[derive(Debug, Default)]
pub struct Scenario {
    pub map: String,
    pub map_width: usize,
    pub map_height: usize,
    pub buckets: BTreeMap<usize, Bucket>,
}

impl Scenario {
    /// Load a MovingAI `.scen` file: a `version` line followed by
    /// `bucket map width height start_x start_y goal_x goal_y optimal_length`.
    pub fn load_from_scen(path: &str) -> Result<Scenario> {
        let file = File::open(path).with_context(|| format!("cannot open scenario {path}"))?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        // First line is "version x.x" which we can skip
        let _version = lines
            .next()
            .ok_or_else(|| anyhow!("scenario {path} is empty"))??;

        let mut scenario = Scenario::default();

        for (line_number, line) in lines.enumerate() {
            let line = line?;
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }
            if parts.len() < 8 {
                return Err(anyhow!(
                    "scenario {path} line {} has {} fields, expected at least 8",
                    line_number + 2,
                    parts.len()
                ));
            }

            let field = |index: usize| -> Result<usize> {
                parts[index]
                    .parse()
                    .with_context(|| format!("invalid field {index} in scenario line: {line}"))
            };
            let bucket_index = field(0)?;
            let route = Route {
                start: Point::new(field(4)?, field(5)?),
                goal: Point::new(field(6)?, field(7)?),
                optimal_length: parts.get(8).and_then(|length| length.parse().ok()),
            };

            if scenario.map.is_empty() {
                // Initialize map details from the first route entry
                scenario.map = parts[1].to_string();
                scenario.map_width = field(2)?;
                scenario.map_height = field(3)?;
            }

            scenario.buckets.entry(bucket_index).or_default().push(route);
        }

        Ok(scenario)
    }

    pub fn num_routes(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Pick one unused route from each listed bucket, in order.
    pub fn routes_by_buckets<R: Rng + ?Sized>(
        &self,
        buckets: &[usize],
        rng: &mut R,
    ) -> Result<Vec<Route>> {
        let mut routes = Vec::new();
        let mut used_routes: HashSet<(usize, usize)> = HashSet::new();

        for &bucket_index in buckets {
            let bucket = self
                .buckets
                .get(&bucket_index)
                .ok_or_else(|| anyhow!("bucket {bucket_index} not found"))?;

            // Find unused routes
            let available_routes: Vec<usize> = (0..bucket.len())
                .filter(|idx| !used_routes.contains(&(bucket_index, *idx)))
                .collect();

            let route_index = available_routes
                .choose(rng)
                .ok_or_else(|| anyhow!("no available routes left in bucket {bucket_index}"))?;

            routes.push(bucket[*route_index].clone());
            used_routes.insert((bucket_index, *route_index));
        }

        info!("Selected {} routes from buckets {buckets:?}", routes.len());
        Ok(routes)
    }

    /// Pick `num_routes` distinct routes uniformly from all buckets.
    pub fn routes_randomly<R: Rng + ?Sized>(
        &self,
        num_routes: usize,
        rng: &mut R,
    ) -> Result<Vec<Route>> {
        let mut available_routes: Vec<Route> =
            self.buckets.values().flatten().cloned().collect();

        if available_routes.len() < num_routes {
            return Err(anyhow!(
                "scenario has {} routes, {num_routes} requested",
                available_routes.len()
            ));
        }

        // Shuffle the available routes to randomize the route selection
        available_routes.shuffle(rng);
        available_routes.truncate(num_routes);

        info!("Selected {} random routes", available_routes.len());
        Ok(available_routes)
    }

    pub fn load_routes_from_yaml(path: &str) -> Result<Vec<Route>> {
        let file = File::open(path).with_context(|| format!("cannot open {path}"))?;
        let reader = BufReader::new(file);
        let routes = serde_yaml::from_reader(reader)?;
        Ok(routes)
    }

    pub fn write_routes_to_yaml(path: &str, routes: &[Route]) -> Result<()> {
        let file = File::create(path).with_context(|| format!("cannot create {path}"))?;
        let mut writer = io::BufWriter::new(file);
        let yaml_data = serde_yaml::to_string(routes)?;
        writer.write_all(yaml_data.as_bytes())?;

        Ok(())
    }
}
