//! A dense row-major 2-D table.
//!
//! Gradient color tables are `[color bucket][gradient level]` matrices of
//! handles. Storing them flat with a two-level index keeps lookup and row
//! access as named operations instead of ad hoc reshaping.

/// `rows × cols` values stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Fill a grid by calling `f(row, col)` in row-major order.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(f(row, col));
            }
        }
        Self { rows, cols, cells }
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The value at `(row, col)`, if in bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col)
    }

    /// One full row.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[T]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        self.cells.get(start..start + self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Grid<(usize, usize)> {
        Grid::from_fn(3, 4, |r, c| (r, c))
    }

    #[test]
    fn get_in_and_out_of_bounds() {
        let g = sample();
        assert_eq!(g.get(2, 3), Some(&(2, 3)));
        assert_eq!(g.get(3, 0), None);
        assert_eq!(g.get(0, 4), None);
    }

    #[test]
    fn row_slices() {
        let g = sample();
        assert_eq!(g.row(1), Some(&[(1, 0), (1, 1), (1, 2), (1, 3)][..]));
        assert_eq!(g.row(3), None);
    }

    #[test]
    fn cells_are_row_major() {
        let g = sample();
        assert_eq!(g.cells.len(), 12);
        assert_eq!(g.cells[4], (1, 0));
        for r in 0..3 {
            for c in 0..4 {
                assert_eq!(g.get(r, c), Some(&(r, c)));
            }
        }
    }

    #[test]
    fn empty_grid() {
        let g: Grid<u8> = Grid::from_fn(0, 16, |_, _| 0);
        assert!(g.is_empty());
        assert_eq!(g.row(0), None);
        assert_eq!(g.get(0, 0), None);
    }
}
