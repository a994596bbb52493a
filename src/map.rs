use anyhow::{anyhow, Context};
use rand::Rng;
use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::common::{Cell, InvalidInput};

/// Grid value marking a traversable cell.
pub const TRAVERSABLE: u8 = 1;
/// Grid value written for blocked cells by the loaders.
pub const BLOCKED: u8 = 0;

/// Borrowed, shape-checked view over a column-major grid (`grid[col][row]`).
#[derive(Debug, Clone, Copy)]
pub struct Grid<'a> {
    columns: &'a [Vec<u8>],
    cols: usize,
    rows: usize,
}

impl<'a> Grid<'a> {
    /// Wraps `columns`, rejecting grids whose columns differ in length.
    pub fn new(columns: &'a [Vec<u8>]) -> Result<Self, InvalidInput> {
        let cols = columns.len();
        let rows = columns.first().map_or(0, |column| column.len());
        for (column, values) in columns.iter().enumerate() {
            if values.len() != rows {
                return Err(InvalidInput::RaggedGrid {
                    column,
                    expected: rows,
                    found: values.len(),
                });
            }
        }
        Ok(Grid {
            columns,
            cols,
            rows,
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// True for 0xN and Nx0 grids.
    pub fn is_empty(&self) -> bool {
        self.cols == 0 || self.rows == 0
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.col < self.cols && cell.row < self.rows
    }

    pub fn is_traversable(&self, cell: Cell) -> bool {
        self.contains(cell) && self.columns[cell.col][cell.row] == TRAVERSABLE
    }

    /// Traversable 4-connected neighbors, in left, right, up, down order.
    pub fn get_neighbors(&self, cell: Cell) -> Vec<Cell> {
        let directions: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        let mut neighbors = Vec::with_capacity(directions.len());

        for (dx, dy) in directions {
            let (Some(col), Some(row)) = (
                cell.col.checked_add_signed(dx),
                cell.row.checked_add_signed(dy),
            ) else {
                continue;
            };
            let neighbor = Cell::new(col, row);
            if self.is_traversable(neighbor) {
                neighbors.push(neighbor);
            }
        }

        neighbors
    }
}

/// Owned occupancy map. Cells are stored column-major so that
/// `grid()[col][row]` addresses the cell at (col, row).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    height: usize,
    width: usize,
    columns: Vec<Vec<u8>>,
}

impl Map {
    /// Loads a MovingAI benchmark map (`type`, `height`, `width`, `map` header).
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let file = File::open(path).with_context(|| format!("failed to open map {path}"))?;
        let lines = BufReader::new(file)
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("failed to read map {path}"))?;
        Self::parse_lines(lines.iter().map(String::as_str))
            .with_context(|| format!("malformed map file {path}"))
    }

    pub fn from_map_str(content: &str) -> anyhow::Result<Self> {
        Self::parse_lines(content.lines())
    }

    fn parse_lines<'s>(mut lines: impl Iterator<Item = &'s str>) -> anyhow::Result<Self> {
        let _type = lines.next().ok_or_else(|| anyhow!("missing type line"))?;
        let height = parse_header(lines.next(), "height")?;
        let width = parse_header(lines.next(), "width")?;
        let _map = lines.next().ok_or_else(|| anyhow!("missing map line"))?;

        if height == 0 || width == 0 {
            return Err(anyhow!("map must not be empty, got {width}x{height}"));
        }

        // Rows are read before anything is sized from the header.
        let mut rows: Vec<Vec<u8>> = Vec::new();
        for (row, line) in lines.take(height).enumerate() {
            let values: Vec<u8> = line
                .trim_end()
                .chars()
                .map(|ch| {
                    if matches!(ch, '.' | 'G' | 'S') {
                        TRAVERSABLE
                    } else {
                        BLOCKED
                    }
                })
                .collect();
            if values.len() != width {
                return Err(anyhow!(
                    "row {row} has {} cells, expected {width}",
                    values.len()
                ));
            }
            rows.push(values);
        }
        if rows.len() != height {
            return Err(anyhow!("found {} rows, expected {height}", rows.len()));
        }

        let columns: Vec<Vec<u8>> = (0..width)
            .map(|col| rows.iter().map(|values| values[col]).collect::<Vec<u8>>())
            .collect();
        Ok(Map {
            height,
            width,
            columns,
        })
    }

    /// Builds a map from column-major values, rejecting ragged input.
    pub fn from_columns(columns: Vec<Vec<u8>>) -> Result<Self, InvalidInput> {
        let grid = Grid::new(&columns)?;
        let (width, height) = (grid.cols(), grid.rows());
        Ok(Map {
            height,
            width,
            columns,
        })
    }

    /// Generates a `width` x `height` map where each cell is blocked with
    /// probability `obstacle_density`.
    pub fn random<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        obstacle_density: f64,
        rng: &mut R,
    ) -> Self {
        let columns: Vec<Vec<u8>> = (0..width)
            .map(|_| {
                (0..height)
                    .map(|_| {
                        if rng.gen_bool(obstacle_density) {
                            BLOCKED
                        } else {
                            TRAVERSABLE
                        }
                    })
                    .collect::<Vec<u8>>()
            })
            .collect();
        Map {
            height,
            width,
            columns,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn grid(&self) -> &[Vec<u8>] {
        &self.columns
    }

    pub fn view(&self) -> Grid<'_> {
        Grid {
            columns: &self.columns,
            cols: self.width,
            rows: self.height,
        }
    }

    pub fn is_passable(&self, col: usize, row: usize) -> bool {
        self.view().is_traversable(Cell::new(col, row))
    }

    pub fn passable_cells(&self) -> Vec<Cell> {
        let mut cells = Vec::new();
        for col in 0..self.width {
            for row in 0..self.height {
                if self.columns[col][row] == TRAVERSABLE {
                    cells.push(Cell::new(col, row));
                }
            }
        }
        cells
    }
}

fn parse_header(line: Option<&str>, key: &str) -> anyhow::Result<usize> {
    let line = line.ok_or_else(|| anyhow!("missing {key} line"))?;
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(name), Some(value)) if name == key => value
            .parse::<usize>()
            .with_context(|| format!("invalid {key} value: {value}")),
        _ => Err(anyhow!("expected `{key} <n>`, got `{line}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_read_map() {
        let map = Map::from_file("map_file/test/test.map").unwrap();

        assert_eq!(map.height(), 3);
        assert_eq!(map.width(), 3);
        assert!(map.passable_cells().len() == 9);

        let neighbors = map.view().get_neighbors(Cell::new(1, 1));
        assert_eq!(
            neighbors,
            vec![
                Cell::new(0, 1),
                Cell::new(2, 1),
                Cell::new(1, 0),
                Cell::new(1, 2)
            ]
        );
    }

    #[test]
    fn test_read_wall_map() {
        let map = Map::from_file("map_file/test/wall.map").unwrap();

        assert_eq!(map.height(), 4);
        assert_eq!(map.width(), 5);
        // Column 2 is a full wall.
        for row in 0..map.height() {
            assert!(!map.is_passable(2, row));
        }
        assert!(map.is_passable(0, 0));
        assert!(map.is_passable(4, 3));

        let neighbors = map.view().get_neighbors(Cell::new(1, 0));
        assert_eq!(neighbors, vec![Cell::new(0, 0), Cell::new(1, 1)]);
    }

    #[test]
    fn test_map_str_characters() {
        let map = Map::from_map_str("type octile\nheight 1\nwidth 4\nmap\n.@GT\n").unwrap();
        assert_eq!(map.grid(), &[vec![1u8], vec![0], vec![1], vec![0]]);
    }

    #[test]
    fn test_malformed_map() {
        assert!(Map::from_map_str("type octile\nheight 2\nwidth 2\nmap\n..\n").is_err());
        assert!(Map::from_map_str("type octile\nheight 1\nwidth 2\nmap\n...\n").is_err());
        assert!(Map::from_map_str("type octile\nwidth 2\nheight 1\nmap\n..\n").is_err());
        assert!(Map::from_file("map_file/test/missing.map").is_err());
    }

    #[test]
    fn test_oversized_header_is_rejected() {
        let err = Map::from_map_str(
            "type octile\nheight 100000000000\nwidth 100000000000\nmap\n..\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("expected 100000000000"), "{err}");

        let err =
            Map::from_map_str("type octile\nheight 100000000000\nwidth 2\nmap\n..\n").unwrap_err();
        assert_eq!(err.to_string(), "found 1 rows, expected 100000000000");

        assert!(Map::from_map_str("type octile\nheight 0\nwidth 100000000000\nmap\n").is_err());
        assert!(Map::from_map_str("type octile\nheight 1\nwidth 0\nmap\n\n").is_err());
    }

    #[test]
    fn test_dimensions_follow_columns() {
        let map = Map::from_columns(vec![vec![1, 0, 1], vec![0, 1, 1]]).unwrap();
        assert_eq!((map.width(), map.height()), (2, 3));
        assert_eq!(map.view().cols(), map.width());
        assert_eq!(map.view().rows(), map.height());
        assert_eq!(
            map.passable_cells(),
            vec![Cell::new(0, 0), Cell::new(0, 2), Cell::new(1, 1), Cell::new(1, 2)]
        );
        assert!(!map.is_passable(5, 0));
    }

    #[test]
    fn test_grid_shape() {
        let ragged: Vec<Vec<u8>> = vec![vec![1, 1], vec![1]];
        assert_eq!(
            Grid::new(&ragged).unwrap_err(),
            InvalidInput::RaggedGrid {
                column: 1,
                expected: 2,
                found: 1
            }
        );

        let empty: Vec<Vec<u8>> = Vec::new();
        let grid = Grid::new(&empty).unwrap();
        assert!(grid.is_empty());
        assert!(!grid.contains(Cell::new(0, 0)));

        let no_rows: Vec<Vec<u8>> = vec![Vec::new(), Vec::new()];
        let grid = Grid::new(&no_rows).unwrap();
        assert_eq!((grid.cols(), grid.rows()), (2, 0));
        assert!(grid.is_empty());
        assert!(grid.get_neighbors(Cell::new(0, 0)).is_empty());
    }

    #[test]
    fn test_neighbors_at_corner() {
        let columns: Vec<Vec<u8>> = vec![vec![1, 1], vec![1, 0]];
        let grid = Grid::new(&columns).unwrap();
        assert_eq!(
            grid.get_neighbors(Cell::new(0, 0)),
            vec![Cell::new(1, 0), Cell::new(0, 1)]
        );
        // (1, 1) is blocked, so it never shows up as a neighbor.
        assert_eq!(grid.get_neighbors(Cell::new(1, 0)), vec![Cell::new(0, 0)]);
    }

    #[test]
    fn test_random_map() {
        let mut rng = StdRng::seed_from_u64(7);
        let map = Map::random(8, 5, 0.3, &mut rng);
        assert_eq!((map.width(), map.height()), (8, 5));
        assert!(Grid::new(map.grid()).is_ok());

        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(map, Map::random(8, 5, 0.3, &mut rng));

        let open = Map::random(4, 4, 0.0, &mut rng);
        assert_eq!(open.passable_cells().len(), 16);
    }
}
