
// imports
use crate::errors::{AssocError, Result};
use rayon::prelude::*;
use rustc_hash::FxHashMap;


/// Weight type of the association computations; f32 suffices for ~1e6 articles.
pub type Real = f32;

/// One sparse row: column index to nonzero weight.
pub type Row = FxHashMap<u32, Real>;

/// Square sparse matrix stored as one hash map per row.
///
/// Absent entries are zero. Rows are separate allocations, so the row-parallel
/// operations hand each worker exclusive access to one row while other rows
/// (or other matrices) are read concurrently.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseMatrix {
    rows: Vec<Row>,
}

impl SparseMatrix {

    /// Builds an all-zero `n x n` matrix.
    pub fn new(n: usize) -> Result<SparseMatrix> {

        if n > u32::MAX as usize {
            return Err(AssocError::OutOfMemory { what: "matrix rows" });
        }

        let mut rows: Vec<Row> = Vec::new();
        rows.try_reserve_exact(n).map_err(|_| AssocError::OutOfMemory { what: "matrix rows" })?;
        rows.resize_with(n, Row::default);
        Ok( Self { rows } )
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of stored entries over all rows.
    pub fn stored_entries(&self) -> usize {
        self.rows.par_iter().map(|row| row.len()).sum()
    }

    pub fn row(&self, i: usize) -> &Row {
        &self.rows[i]
    }

    pub fn get(&self, i: usize, j: usize) -> Real {
        match self.rows[i].get(&(j as u32)) {
            Some(w) => *w,
            None => 0.0
        }
    }

    /// Reference to the element at `(i, j)`, storing a zero first if absent.
    pub fn get_mut(&mut self, i: usize, j: usize) -> &mut Real {
        debug_assert!(j < self.rows.len(), "column {} out of range", j);
        self.rows[i].entry(j as u32).or_insert(0.0)
    }

    /// Adds `direct` into this matrix, which holds the square of `direct`.
    ///
    /// Only meant for the pf-ibf recombination step. Positions of `direct`
    /// absent here (a direct link without any 2-hop path alongside it) are
    /// inserted.
    pub(crate) fn add_assign(&mut self, direct: &SparseMatrix) {

        assert_eq!(self.row_count(), direct.row_count(), "matrices differ in size");

        self.rows.par_iter_mut().zip(direct.rows.par_iter()).for_each(|(row, other)| {
            for (j, w) in other {
                *row.entry(*j).or_insert(0.0) += *w;
            }
        });
    }

    /// Resets all values to zero.
    pub fn clear(&mut self) {
        self.rows.par_iter_mut().for_each(|row| row.clear());
    }

    pub fn clear_diagonal(&mut self) {
        self.rows.par_iter_mut().enumerate().for_each(|(i, row)| {
            row.remove(&(i as u32));
        });
    }

    /// Replaces every stored value `w` at column `j` by `f(j, w)`.
    /// Zero entries are not visited, so no new entries appear.
    pub fn transform<F>(&mut self, f: F)
    where
        F: Fn(usize, Real) -> Real + Sync,
    {
        self.rows.par_iter_mut().for_each(|row| {
            for (j, w) in row.iter_mut() {
                *w = f(*j as usize, *w);
            }
        });
    }

    /// Computes `out = self * self`. `out` must be all zero and of equal size.
    ///
    /// Only stored entries are visited: for row `i`, every `a(i,k)` is
    /// combined with every stored `a(k,j)`.
    pub fn square(&self, out: &mut SparseMatrix) {

        assert_eq!(self.row_count(), out.row_count(), "matrices differ in size");
        debug_assert!(out.rows.iter().all(|row| row.is_empty()), "square target must be empty");

        out.rows.par_iter_mut().enumerate().for_each(|(i, ri)| {
            for (k, a_ik) in &self.rows[i] {
                for (j, a_kj) in &self.rows[*k as usize] {
                    *ri.entry(*j).or_insert(0.0) += a_ik * a_kj;
                }
            }
        });
    }

    pub(crate) fn par_rows(&self) -> impl IndexedParallelIterator<Item = &Row> {
        self.rows.par_iter()
    }

}
