use crate::common::{Cell, InvalidInput, Path, SearchError};
use crate::map::Grid;
use crate::notify::Notifier;
use crate::stat::Stats;

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, error, instrument, trace};

/// Entry of the open list.
///
/// Ordered by lowest `f_cost` first. Among equal `f_cost`, the node with the
/// higher `g_cost` (closer to the goal) wins, then the smaller cell in
/// (col, row) order, so the expansion order is fully deterministic.
#[derive(Debug, Clone, Copy)]
struct OpenNode {
    cell: Cell,
    f_cost: f64,
    g_cost: usize,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_cost
            .total_cmp(&other.f_cost)
            .then_with(|| other.g_cost.cmp(&self.g_cost))
            .then_with(|| self.cell.cmp(&other.cell))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

/// Euclidean distance. Never exceeds the Manhattan distance, which is the
/// exact cost on an obstacle-free 4-connected grid.
fn heuristic(cell: Cell, goal: Cell) -> f64 {
    cell.euclidean(&goal)
}

fn validate_endpoint(grid: &Grid, which: &'static str, cell: Cell) -> Result<(), InvalidInput> {
    if !grid.contains(cell) {
        return Err(InvalidInput::OutOfBounds {
            which,
            cell,
            cols: grid.cols(),
            rows: grid.rows(),
        });
    }
    if !grid.is_traversable(cell) {
        return Err(InvalidInput::BlockedEndpoint { which, cell });
    }
    Ok(())
}

/// A* over a column-major binary grid with unit-cost 4-connected moves.
///
/// Returns the start-to-end path together with its cost, which is always
/// `path.len() - 1`. `step_budget` caps the number of node expansions;
/// `None` lets the search run until the open list is exhausted.
#[instrument(skip_all, name = "a_star", fields(start = %start, end = %end), level = "debug")]
pub fn a_star_search(
    grid: &[Vec<u8>],
    start: Cell,
    end: Cell,
    step_budget: Option<usize>,
    stats: &mut Stats,
) -> Result<(Path, usize), SearchError> {
    let grid = Grid::new(grid)?;
    if grid.is_empty() {
        debug!("empty {}x{} grid", grid.cols(), grid.rows());
        return Err(SearchError::NoPath);
    }
    validate_endpoint(&grid, "start", start)?;
    validate_endpoint(&grid, "end", end)?;

    let mut open_list = BTreeSet::new();
    let mut closed_list = HashSet::new();
    let mut g_scores: HashMap<Cell, usize> = HashMap::new();
    let mut parents: HashMap<Cell, Cell> = HashMap::new();

    g_scores.insert(start, 0);
    open_list.insert(OpenNode {
        cell: start,
        f_cost: heuristic(start, end),
        g_cost: 0,
    });
    stats.generated_nodes += 1;

    let mut expanded = 0;
    while let Some(current) = open_list.pop_first() {
        trace!("expand node: {current:?}");

        if current.cell == end {
            let path = construct_path(&parents, start, end).ok_or_else(|| {
                error!("parent chain broken while backtracking from {end}");
                SearchError::ReconstructionFailed
            })?;
            debug_assert_eq!(path.len() - 1, current.g_cost);
            stats.costs = current.g_cost;
            return Ok((path, current.g_cost));
        }

        if step_budget.is_some_and(|budget| expanded >= budget) {
            debug!("step budget exhausted with {} open nodes", open_list.len());
            return Err(SearchError::BudgetExhausted { expanded });
        }

        closed_list.insert(current.cell);
        expanded += 1;
        stats.expanded_nodes += 1;

        // Assuming uniform cost.
        let tentative_g_cost = current.g_cost + 1;

        for neighbor in grid.get_neighbors(current.cell) {
            if closed_list.contains(&neighbor) {
                continue;
            }

            let h_cost = heuristic(neighbor, end);
            match g_scores.get(&neighbor) {
                Some(&g_cost) if g_cost <= tentative_g_cost => continue,
                // Same h, lower g: the new entry is strictly better, replace the old one.
                Some(&g_cost) => {
                    let removed = open_list.remove(&OpenNode {
                        cell: neighbor,
                        f_cost: g_cost as f64 + h_cost,
                        g_cost,
                    });
                    debug_assert!(removed, "scored node {neighbor} missing from open list");
                }
                None => {}
            }

            parents.insert(neighbor, current.cell);
            g_scores.insert(neighbor, tentative_g_cost);
            open_list.insert(OpenNode {
                cell: neighbor,
                f_cost: tentative_g_cost as f64 + h_cost,
                g_cost: tentative_g_cost,
            });
            stats.generated_nodes += 1;
        }
        trace!("open list size {}", open_list.len());
    }

    debug!("cannot find solution after {expanded} expansions");
    Err(SearchError::NoPath)
}

/// Walks the parent links back from `end`. `None` if the chain breaks (or
/// loops) before reaching `start`.
fn construct_path(parents: &HashMap<Cell, Cell>, start: Cell, end: Cell) -> Option<Path> {
    let mut path = vec![end];
    let mut current = end;
    while current != start {
        if path.len() > parents.len() {
            return None;
        }
        current = *parents.get(&current)?;
        path.push(current);
    }
    path.reverse();
    Some(path)
}

/// Single-pair path planner reporting its progress through a [`Notifier`].
#[derive(Debug, Clone, Default)]
pub struct PathFinder {
    step_budget: Option<usize>,
    stats: Stats,
}

impl PathFinder {
    pub fn new(step_budget: Option<usize>) -> Self {
        PathFinder {
            step_budget,
            stats: Stats::default(),
        }
    }

    /// Statistics of the last search.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn search(
        &mut self,
        grid: &[Vec<u8>],
        start: Cell,
        end: Cell,
    ) -> Result<(Path, usize), SearchError> {
        let search_start_time = Instant::now();
        self.stats = Stats::default();
        let result = a_star_search(grid, start, end, self.step_budget, &mut self.stats);
        self.stats.time_us =
            u64::try_from(search_start_time.elapsed().as_micros()).unwrap_or(u64::MAX);
        result
    }

    /// Returns the path from `start` to `end` inclusive, or an empty path
    /// when there is none. Every outcome is reported to `notifier`.
    pub fn find_path<N: Notifier + ?Sized>(
        &mut self,
        grid: &[Vec<u8>],
        start: Cell,
        end: Cell,
        notifier: &mut N,
    ) -> Path {
        match self.search(grid, start, end) {
            Ok((path, _)) => {
                notifier.notify("Path found between the start and end points");
                notifier.notify(&format!("Path found with length: {}", path.len()));
                path
            }
            Err(err) => {
                debug!("search from {start} to {end} failed: {err}");
                notifier.notify(&err.to_string());
                Vec::new()
            }
        }
    }
}

/// Uncapped search with a fresh [`PathFinder`].
pub fn find_path<N: Notifier + ?Sized>(
    grid: &[Vec<u8>],
    start: Cell,
    end: Cell,
    notifier: &mut N,
) -> Path {
    PathFinder::default().find_path(grid, start, end, notifier)
}
