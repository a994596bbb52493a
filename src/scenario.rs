use anyhow::{anyhow, Context, Result};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::info;

use crate::common::Cell;
use crate::map::Map;

/// One start/goal query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Route {
    pub bucket: usize,
    pub start: Cell,
    pub goal: Cell,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scenario {
    pub map: String,
    pub map_width: usize,
    pub map_height: usize,
    pub routes: Vec<Route>,
}

impl Scenario {
    /// Loads a MovingAI `.scen` file. The x coordinate is the column.
    pub fn load_from_scen(path: &str) -> Result<Scenario> {
        let content =
            fs::read_to_string(path).with_context(|| format!("failed to read scenario {path}"))?;
        Self::parse_scen(&content).with_context(|| format!("malformed scenario file {path}"))
    }

    pub fn parse_scen(content: &str) -> Result<Scenario> {
        let mut lines = content.lines();

        // First line is "version x.x" which we can skip
        let _version = lines.next().ok_or_else(|| anyhow!("empty scenario"))?;

        let mut scenario = Scenario::default();
        for (line_number, line) in lines.enumerate() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }
            if parts.len() < 8 {
                return Err(anyhow!(
                    "line {} has {} fields, expected at least 8",
                    line_number + 2,
                    parts.len()
                ));
            }
            let field = |index: usize| -> Result<usize> {
                parts[index]
                    .parse()
                    .with_context(|| format!("line {}: bad field `{}`", line_number + 2, parts[index]))
            };

            let route = Route {
                bucket: field(0)?,
                start: Cell::new(field(4)?, field(5)?),
                goal: Cell::new(field(6)?, field(7)?),
            };

            if scenario.map.is_empty() {
                // Initialize map details from the first route entry
                scenario.map = parts[1].to_string();
                scenario.map_width = field(2)?;
                scenario.map_height = field(3)?;
            }
            scenario.routes.push(route);
        }

        Ok(scenario)
    }

    /// Picks `num_routes` distinct routes, or all of them in file order when
    /// `num_routes` is `None`.
    pub fn select_routes<R: Rng + ?Sized>(
        &self,
        num_routes: Option<usize>,
        rng: &mut R,
    ) -> Result<Vec<Route>> {
        let Some(num_routes) = num_routes else {
            return Ok(self.routes.clone());
        };
        if num_routes > self.routes.len() {
            return Err(anyhow!(
                "requested {num_routes} routes but the scenario only has {}",
                self.routes.len()
            ));
        }
        let routes: Vec<Route> = self
            .routes
            .choose_multiple(rng, num_routes)
            .copied()
            .collect();
        info!("Selected routes: {routes:?}");
        Ok(routes)
    }
}

/// Draws `num_routes` start/goal pairs uniformly from the traversable cells.
pub fn random_routes<R: Rng + ?Sized>(
    map: &Map,
    num_routes: usize,
    rng: &mut R,
) -> Result<Vec<Route>> {
    let cells = map.passable_cells();
    let mut pick = || {
        cells
            .choose(&mut *rng)
            .copied()
            .ok_or_else(|| anyhow!("map has no traversable cells"))
    };
    let routes = (0..num_routes)
        .map(|_| -> Result<Route> {
            Ok(Route {
                bucket: 0,
                start: pick()?,
                goal: pick()?,
            })
        })
        .collect::<Result<Vec<Route>>>()?;
    info!("Generate routes: {routes:?}");
    Ok(routes)
}
