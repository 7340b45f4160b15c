use crate::utils::error::{OrderError, Result};

pub const GRID_ROWS: usize = 10;
pub const GRID_COLUMNS: usize = 14;

/// Where an occupied cell sits relative to its left and upper neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeighborCase {
    /// Left and top both occupied.
    InteriorCorner,
    TopEdge,
    LeftEdge,
    /// Neither neighbor occupied.
    Isolated,
}

impl NeighborCase {
    pub fn from_neighbors(left: bool, top: bool) -> Self {
        match (left, top) {
            (true, true) => NeighborCase::InteriorCorner,
            (false, true) => NeighborCase::TopEdge,
            (true, false) => NeighborCase::LeftEdge,
            (false, false) => NeighborCase::Isolated,
        }
    }
}

/// 壓載區的面板佈局（固定 10 × 14），`true` 代表該位置有面板。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OccupancyGrid {
    cells: [[bool; GRID_COLUMNS]; GRID_ROWS],
}

impl OccupancyGrid {
    pub fn new(cells: [[bool; GRID_COLUMNS]; GRID_ROWS]) -> Self {
        Self { cells }
    }

    /// Parses text rows: `#`, `x`, `X` or `1` mark a panel; `.`, `0`, `-`
    /// or a space mark an empty slot. Short rows are padded with empty cells.
    pub fn parse_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        if rows.len() > GRID_ROWS {
            return Err(OrderError::LayoutError {
                message: format!("{} rows given, at most {} allowed", rows.len(), GRID_ROWS),
            });
        }

        let mut grid = Self::default();
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref().trim_end();
            if row.chars().count() > GRID_COLUMNS {
                return Err(OrderError::LayoutError {
                    message: format!(
                        "row {} has {} cells, at most {} allowed",
                        i + 1,
                        row.chars().count(),
                        GRID_COLUMNS
                    ),
                });
            }
            for (j, cell) in row.chars().enumerate() {
                grid.cells[i][j] = match cell {
                    '#' | 'x' | 'X' | '1' => true,
                    '.' | '0' | '-' | ' ' => false,
                    other => {
                        return Err(OrderError::LayoutError {
                            message: format!(
                                "unexpected '{}' at row {}, column {}",
                                other,
                                i + 1,
                                j + 1
                            ),
                        })
                    }
                };
            }
        }
        Ok(grid)
    }

    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        row < GRID_ROWS && col < GRID_COLUMNS && self.cells[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, occupied: bool) -> Result<()> {
        if row >= GRID_ROWS || col >= GRID_COLUMNS {
            return Err(OrderError::LayoutError {
                message: format!(
                    "cell ({}, {}) is outside the {} x {} grid",
                    row, col, GRID_ROWS, GRID_COLUMNS
                ),
            });
        }
        self.cells[row][col] = occupied;
        Ok(())
    }

    pub fn occupied_count(&self) -> u32 {
        self.cells.iter().flatten().filter(|&&c| c).count() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.occupied_count() == 0
    }

    /// `None` for an empty cell.
    pub fn classify(&self, row: usize, col: usize) -> Option<NeighborCase> {
        if !self.is_occupied(row, col) {
            return None;
        }
        let left = col > 0 && self.cells[row][col - 1];
        let top = row > 0 && self.cells[row - 1][col];
        Some(NeighborCase::from_neighbors(left, top))
    }

    /// Occupied cells with their neighbor case, scanning every `row_step`-th
    /// row from the top and each row left to right.
    pub fn cells(&self, row_step: usize) -> impl Iterator<Item = (usize, usize, NeighborCase)> + '_ {
        (0..GRID_ROWS)
            .step_by(row_step.max(1))
            .flat_map(move |i| {
                (0..GRID_COLUMNS).filter_map(move |j| self.classify(i, j).map(|case| (i, j, case)))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pseudo_random_grid(seed: u64) -> OccupancyGrid {
        let mut state = seed;
        let mut grid = OccupancyGrid::default();
        for i in 0..GRID_ROWS {
            for j in 0..GRID_COLUMNS {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                grid.set(i, j, (state >> 33) % 3 != 0).unwrap();
            }
        }
        grid
    }

    #[test]
    fn test_parse_rows() {
        let grid = OccupancyGrid::parse_rows(&["##.", ".x", "", "1"]).unwrap();
        assert!(grid.is_occupied(0, 0));
        assert!(grid.is_occupied(0, 1));
        assert!(!grid.is_occupied(0, 2));
        assert!(grid.is_occupied(1, 1));
        assert!(grid.is_occupied(3, 0));
        assert_eq!(grid.occupied_count(), 4);
    }

    #[test]
    fn test_parse_rejects_oversized_layouts() {
        let too_wide = ["###############"];
        assert!(OccupancyGrid::parse_rows(&too_wide).is_err());

        let too_tall = vec!["#"; GRID_ROWS + 1];
        assert!(OccupancyGrid::parse_rows(&too_tall[..]).is_err());

        assert!(matches!(
            OccupancyGrid::parse_rows(&["#?"]),
            Err(OrderError::LayoutError { .. })
        ));
    }

    #[test]
    fn test_set_outside_grid_is_rejected() {
        let mut grid = OccupancyGrid::default();
        assert!(grid.set(GRID_ROWS - 1, GRID_COLUMNS - 1, true).is_ok());
        assert!(grid.is_occupied(GRID_ROWS - 1, GRID_COLUMNS - 1));

        assert!(matches!(
            grid.set(GRID_ROWS, 0, true),
            Err(OrderError::LayoutError { .. })
        ));
        assert!(grid.set(0, GRID_COLUMNS, true).is_err());
        assert_eq!(grid.occupied_count(), 1);
    }

    #[test]
    fn test_classify_cases() {
        let grid = OccupancyGrid::parse_rows(&["##", "##", ".#"]).unwrap();
        assert_eq!(grid.classify(0, 0), Some(NeighborCase::Isolated));
        assert_eq!(grid.classify(0, 1), Some(NeighborCase::LeftEdge));
        assert_eq!(grid.classify(1, 0), Some(NeighborCase::TopEdge));
        assert_eq!(grid.classify(1, 1), Some(NeighborCase::InteriorCorner));
        assert_eq!(grid.classify(2, 0), None);
        assert_eq!(grid.classify(2, 1), Some(NeighborCase::TopEdge));
    }

    #[test]
    fn test_every_occupied_cell_gets_exactly_one_case() {
        for seed in 1..20 {
            let grid = pseudo_random_grid(seed);
            let mut per_case = std::collections::HashMap::new();
            for (_, _, case) in grid.cells(1) {
                *per_case.entry(case).or_insert(0u32) += 1;
            }
            assert_eq!(per_case.values().sum::<u32>(), grid.occupied_count());
        }
    }

    #[test]
    fn test_row_step_skips_odd_rows() {
        let grid = OccupancyGrid::parse_rows(&["#", "#", "#"]).unwrap();
        let rows: Vec<usize> = grid.cells(2).map(|(i, _, _)| i).collect();
        assert_eq!(rows, vec![0, 2]);
        // row 2 still looks at row 1 above it
        assert_eq!(grid.classify(2, 0), Some(NeighborCase::TopEdge));
    }
}
