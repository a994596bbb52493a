use anyhow::anyhow;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug, Default)]
#[command(
    name = "A* Planner",
    about = "Shortest 4-connected paths on occupancy grids with A*.",
    version = "0.1"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Path to the map file (MovingAI format)")]
    pub map_path: Option<String>,

    #[arg(long, help = "Path to a scenario file with start/goal queries")]
    pub scen_path: Option<String>,

    #[arg(long, help = "Start cell as COL,ROW", value_parser = parse_cell)]
    pub start: Option<(usize, usize)>,

    #[arg(long, help = "Goal cell as COL,ROW", value_parser = parse_cell)]
    pub goal: Option<(usize, usize)>,

    #[arg(long, help = "Number of queries to run")]
    pub num_queries: Option<usize>,

    #[arg(long, help = "Width of the generated map when no map file is given")]
    pub random_width: Option<usize>,

    #[arg(long, help = "Height of the generated map when no map file is given")]
    pub random_height: Option<usize>,

    #[arg(long, help = "Probability of a generated cell being blocked")]
    pub obstacle_density: Option<f64>,

    #[arg(long, help = "Seed for the random number generator")]
    pub seed: Option<u64>,

    #[arg(long, help = "Maximum number of node expansions per search")]
    pub step_budget: Option<usize>,

    #[arg(long, help = "Path to the JSON result file")]
    pub output_path: Option<String>,

    #[arg(long, help = "Log filter, e.g. info or astar_planner=debug")]
    pub log_level: Option<String>,
}

fn parse_cell(value: &str) -> Result<(usize, usize), String> {
    let (col, row) = value
        .split_once(',')
        .ok_or_else(|| format!("expected COL,ROW, got `{value}`"))?;
    let col = col
        .trim()
        .parse()
        .map_err(|err| format!("invalid column `{col}`: {err}"))?;
    let row = row
        .trim()
        .parse()
        .map_err(|err| format!("invalid row `{row}`: {err}"))?;
    Ok((col, row))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub map_path: Option<String>,
    pub scen_path: Option<String>,
    pub start: Option<(usize, usize)>,
    pub goal: Option<(usize, usize)>,
    pub num_queries: Option<usize>,
    pub random_width: usize,
    pub random_height: usize,
    pub obstacle_density: f64,
    pub seed: u64,
    pub step_budget: Option<usize>,
    pub output_path: Option<String>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            map_path: None,
            scen_path: None,
            start: None,
            goal: None,
            num_queries: None,
            random_width: 32,
            random_height: 32,
            obstacle_density: 0.2,
            seed: 0,
            step_budget: None,
            output_path: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Flags given on the command line win over the config file.
    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(map_path) = &cli.map_path {
            self.map_path = Some(map_path.clone());
        }
        if let Some(scen_path) = &cli.scen_path {
            self.scen_path = Some(scen_path.clone());
        }
        if cli.start.is_some() {
            self.start = cli.start;
        }
        if cli.goal.is_some() {
            self.goal = cli.goal;
        }
        if cli.num_queries.is_some() {
            self.num_queries = cli.num_queries;
        }
        if let Some(random_width) = cli.random_width {
            self.random_width = random_width;
        }
        if let Some(random_height) = cli.random_height {
            self.random_height = random_height;
        }
        if let Some(obstacle_density) = cli.obstacle_density {
            self.obstacle_density = obstacle_density;
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if cli.step_budget.is_some() {
            self.step_budget = cli.step_budget;
        }
        if let Some(output_path) = &cli.output_path {
            self.output_path = Some(output_path.clone());
        }
        if let Some(log_level) = &cli.log_level {
            self.log_level = log_level.clone();
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.start.is_some() != self.goal.is_some() {
            return Err(anyhow!("start and goal must be given together"));
        }

        if self.map_path.is_none() {
            if self.random_width == 0 || self.random_height == 0 {
                return Err(anyhow!(
                    "Generated map must not be empty, got {}x{}",
                    self.random_width,
                    self.random_height
                ));
            }
            if !(0.0..1.0).contains(&self.obstacle_density) {
                return Err(anyhow!(
                    "Obstacle density must be in [0, 1), got {}",
                    self.obstacle_density
                ));
            }
        }

        if self.step_budget == Some(0) {
            return Err(anyhow!("Step budget must be greater than 0"));
        }

        if self.num_queries == Some(0) {
            return Err(anyhow!("Number of queries must be greater than 0"));
        }
        Ok(())
    }
}
