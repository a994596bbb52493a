use astar_planner::config::{Cli, Config};
use astar_planner::map::Map;
use astar_planner::scenario::{random_routes, Route, Scenario};
use astar_planner::stat::Stats;
use astar_planner::{Cell, PathFinder, TracingNotifier};

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize)]
struct QueryResult {
    route: Route,
    path: Vec<Cell>,
    stats: Stats,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)
            .with_context(|| format!("failed to read config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        Config::default()
    }
    .override_from_command_line(&cli)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    if cli.config.is_none() {
        info!("No config file specified, using default config");
    }

    let mut rng = StdRng::seed_from_u64(config.seed);

    let map = if let Some(map_path) = &config.map_path {
        Map::from_file(map_path)?
    } else {
        info!(
            "No map file specified, generating {}x{} map with obstacle density {}",
            config.random_width, config.random_height, config.obstacle_density
        );
        Map::random(
            config.random_width,
            config.random_height,
            config.obstacle_density,
            &mut rng,
        )
    };

    let routes = match (config.start, config.goal, &config.scen_path) {
        (Some(start), Some(goal), _) => vec![Route {
            bucket: 0,
            start: start.into(),
            goal: goal.into(),
        }],
        (_, _, Some(scen_path)) => {
            let scenario = Scenario::load_from_scen(scen_path)?;
            if (scenario.map_width, scenario.map_height) != (map.width(), map.height()) {
                warn!(
                    "scenario was made for a {}x{} map, loaded map is {}x{}",
                    scenario.map_width, scenario.map_height, map.width(), map.height()
                );
            }
            scenario.select_routes(config.num_queries, &mut rng)?
        }
        _ => random_routes(&map, config.num_queries.unwrap_or(1), &mut rng)?,
    };

    let mut finder = PathFinder::new(config.step_budget);
    let mut notifier = TracingNotifier;
    let mut results = Vec::with_capacity(routes.len());
    for route in routes {
        info!("query {} -> {}", route.start, route.goal);
        let path = finder.find_path(map.grid(), route.start, route.goal, &mut notifier);
        finder.stats().print();
        results.push(QueryResult {
            route,
            path,
            stats: finder.stats().clone(),
        });
    }

    let solved = results.iter().filter(|result| !result.path.is_empty()).count();
    info!("Solved {solved} of {} queries", results.len());

    if let Some(output_path) = &config.output_path {
        let file = File::create(output_path)
            .with_context(|| format!("failed to create output file: {output_path}"))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &results)?;
        info!("Results written to {output_path}");
    }

    Ok(())
}
