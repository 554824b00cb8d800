//! The archive of elites: a dense N-dimensional grid holding at most one
//! solution per cell.

use crate::error::{ConfigError, MapElitesError, Result};
use crate::Genome;

/// Dense row-major grid addressed by one index per axis.
#[derive(Clone, Debug)]
pub struct Grid<T> {
    shape: Vec<usize>,
    cells: Vec<Option<T>>,
}

impl<T> Grid<T> {
    /// Create a grid with every cell empty. Fails when the number of cells
    /// overflows `usize`.
    pub fn new(shape: Vec<usize>) -> std::result::Result<Self, ConfigError> {
        let len = shape
            .iter()
            .try_fold(1usize, |len, &axis| len.checked_mul(axis))
            .ok_or_else(|| ConfigError::ArchiveTooLarge { shape: shape.clone() })?;
        let mut cells = Vec::new();
        cells.resize_with(len, || None);

        Ok(Self { shape, cells })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Flat index of `cell`, or an error when it does not fit the shape.
    pub fn offset(&self, cell: &[usize]) -> Result<usize> {
        if cell.len() != self.shape.len() || cell.iter().zip(&self.shape).any(|(&i, &n)| i >= n) {
            return Err(MapElitesError::InvalidCell {
                cell: cell.to_vec(),
                shape: self.shape.clone(),
            });
        }

        Ok(cell
            .iter()
            .zip(&self.shape)
            .fold(0, |offset, (&index, &len)| offset * len + index))
    }

    /// Coordinates of the flat index `offset`.
    pub fn coordinates(&self, mut offset: usize) -> Vec<usize> {
        let mut cell = vec![0; self.shape.len()];
        for (axis, &len) in self.shape.iter().enumerate().rev() {
            cell[axis] = offset % len;
            offset /= len;
        }
        cell
    }

    pub fn get(&self, cell: &[usize]) -> Result<Option<&T>> {
        let offset = self.offset(cell)?;
        Ok(self.cells[offset].as_ref())
    }

    /// Replace the content of `cell`, returning what was there.
    pub fn insert(&mut self, cell: &[usize], value: T) -> Result<Option<T>> {
        let offset = self.offset(cell)?;
        Ok(self.cells[offset].replace(value))
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Option<T>] {
        &self.cells
    }

    /// Occupied cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (Vec<usize>, &T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(offset, cell)| cell.as_ref().map(|value| (self.coordinates(offset), value)))
    }
}

/// Direction of the optimization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Objective {
    Minimize,
    Maximize,
}

impl Objective {
    pub fn from_minimization(minimization: bool) -> Self {
        if minimization {
            Objective::Minimize
        } else {
            Objective::Maximize
        }
    }

    /// Whether `candidate` should take the place of `incumbent`.
    ///
    /// Minimization keeps the incumbent on ties, maximization prefers the
    /// newcomer. An empty cell is always taken.
    pub fn replaces(self, candidate: f64, incumbent: Option<f64>) -> bool {
        match (self, incumbent) {
            (_, None) => true,
            (Objective::Minimize, Some(incumbent)) => candidate < incumbent,
            (Objective::Maximize, Some(incumbent)) => candidate >= incumbent,
        }
    }

    /// Whether `a` is strictly better than `b`.
    pub fn better(self, a: f64, b: f64) -> bool {
        match self {
            Objective::Minimize => a < b,
            Objective::Maximize => a > b,
        }
    }
}

/// The solution stored in a cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Elite {
    pub genome: Genome,
    pub performance: f64,
}

/// Result of offering a candidate to a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Placement {
    /// The candidate now occupies the cell. `replaced` is the previous
    /// performance, if the cell was occupied.
    Placed { replaced: Option<f64> },
    /// The incumbent was kept.
    Rejected { incumbent: f64 },
    /// The candidate's performance was not a finite number.
    Discarded,
}

impl Placement {
    pub fn is_placed(&self) -> bool {
        matches!(self, Placement::Placed { .. })
    }
}

/// Grid of elites with the elitist replacement rule.
#[derive(Clone, Debug)]
pub struct Archive {
    grid: Grid<Elite>,
    objective: Objective,
    occupied: usize,
}

impl Archive {
    pub fn new(shape: Vec<usize>, objective: Objective) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            grid: Grid::new(shape)?,
            objective,
            occupied: 0,
        })
    }

    pub fn shape(&self) -> &[usize] {
        self.grid.shape()
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    /// Total number of cells.
    pub fn capacity(&self) -> usize {
        self.grid.len()
    }

    /// Number of non-empty cells.
    pub fn occupied(&self) -> usize {
        self.occupied
    }

    /// Fraction of cells holding an elite.
    pub fn coverage(&self) -> f64 {
        if self.capacity() == 0 {
            return 0.0;
        }
        self.occupied as f64 / self.capacity() as f64
    }

    pub fn get(&self, cell: &[usize]) -> Result<Option<&Elite>> {
        self.grid.get(cell)
    }

    /// Offer `genome` with `performance` to `cell`.
    pub fn place(&mut self, cell: &[usize], genome: Genome, performance: f64) -> Result<Placement> {
        if !performance.is_finite() {
            // still validate the coordinates
            self.grid.offset(cell)?;
            return Ok(Placement::Discarded);
        }

        let incumbent = self.grid.get(cell)?.map(|elite| elite.performance);
        if let Some(incumbent) = incumbent {
            if !self.objective.replaces(performance, Some(incumbent)) {
                return Ok(Placement::Rejected { incumbent });
            }
        }

        let previous = self.grid.insert(cell, Elite { genome, performance })?;
        if previous.is_none() {
            self.occupied += 1;
        }

        Ok(Placement::Placed {
            replaced: previous.map(|elite| elite.performance),
        })
    }

    /// The elite with the best performance, with its cell.
    pub fn best(&self) -> Option<(Vec<usize>, &Elite)> {
        let mut best: Option<(Vec<usize>, &Elite)> = None;
        for (cell, elite) in self.grid.iter() {
            let improves = best.as_ref().map_or(true, |(_, current)| {
                self.objective.better(elite.performance, current.performance)
            });
            if improves {
                best = Some((cell, elite));
            }
        }
        best
    }

    /// Occupied cells with their elites, in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Vec<usize>, &Elite)> + '_ {
        self.grid.iter()
    }

    pub(crate) fn grid(&self) -> &Grid<Elite> {
        &self.grid
    }
}
