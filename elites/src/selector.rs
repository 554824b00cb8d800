//! Uniform selection of existing elites.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::archive::Archive;
use crate::error::{MapElitesError, Result};
use crate::Genome;

/// Draws distinct occupied cells by rejection sampling: one uniform index per
/// axis, retried while the cell is empty or already chosen.
#[derive(Clone, Debug)]
pub struct Selector {
    max_attempts: usize,
}

impl Selector {
    /// `max_attempts` bounds the rejection draws spent on each selected cell.
    /// Once spent, the cell is drawn directly from the remaining occupied
    /// cells, which has the same distribution.
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Coordinates of `n` distinct occupied cells.
    ///
    /// Fails when the archive holds fewer than `n` elites.
    pub fn sample_cells<R: Rng + ?Sized>(
        &self,
        archive: &Archive,
        n: usize,
        rng: &mut R,
    ) -> Result<Vec<Vec<usize>>> {
        if n > archive.occupied() {
            return Err(MapElitesError::SelectionExhausted {
                requested: n,
                occupied: archive.occupied(),
            });
        }

        let mut chosen: Vec<Vec<usize>> = Vec::with_capacity(n);
        while chosen.len() < n {
            let cell = match self.draw(archive, &chosen, rng)? {
                Some(cell) => cell,
                None => {
                    tracing::debug!(
                        attempts = self.max_attempts,
                        occupied = archive.occupied(),
                        capacity = archive.capacity(),
                        "rejection sampling exhausted, drawing from occupied cells"
                    );
                    self.draw_occupied(archive, &chosen, rng)?
                }
            };
            chosen.push(cell);
        }

        Ok(chosen)
    }

    /// Genomes of `n` distinct elites.
    pub fn sample<R: Rng + ?Sized>(&self, archive: &Archive, n: usize, rng: &mut R) -> Result<Vec<Genome>> {
        let cells = self.sample_cells(archive, n, rng)?;
        genomes_at(archive, &cells)
    }

    fn draw<R: Rng + ?Sized>(
        &self,
        archive: &Archive,
        chosen: &[Vec<usize>],
        rng: &mut R,
    ) -> Result<Option<Vec<usize>>> {
        for _ in 0..self.max_attempts {
            let cell: Vec<usize> = archive.shape().iter().map(|&len| rng.gen_range(0..len)).collect();

            if chosen.contains(&cell) || archive.get(&cell)?.is_none() {
                continue;
            }
            return Ok(Some(cell));
        }

        Ok(None)
    }

    fn draw_occupied<R: Rng + ?Sized>(
        &self,
        archive: &Archive,
        chosen: &[Vec<usize>],
        rng: &mut R,
    ) -> Result<Vec<usize>> {
        let remaining: Vec<Vec<usize>> = archive
            .iter()
            .map(|(cell, _)| cell)
            .filter(|cell| !chosen.contains(cell))
            .collect();

        remaining
            .choose(rng)
            .cloned()
            .ok_or(MapElitesError::SelectionExhausted {
                requested: chosen.len() + 1,
                occupied: archive.occupied(),
            })
    }
}

/// Genomes stored at `cells`; an empty cell is an error.
fn genomes_at(archive: &Archive, cells: &[Vec<usize>]) -> Result<Vec<Genome>> {
    cells
        .iter()
        .map(|cell| match archive.get(cell)? {
            Some(elite) => Ok(elite.genome.clone()),
            None => Err(MapElitesError::EmptyCell { cell: cell.clone() }),
        })
        .collect()
}
