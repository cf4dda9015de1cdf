
// imports
use crate::errors::Result;
use crate::matrix::{Real, SparseMatrix};
use tracing::{debug, info};


/// Number of path lengths combined by pf-ibf (direct links and 2-hop paths).
pub const PATH_LENGTH: Real = 2.0;

/// Inverse backlink frequency: an edge into `j` is weighted by
/// `log2(N / incoming[j])`, N being the number of articles.
pub struct InverseBacklinkFrequency<'a> {
    narticles: Real,
    incoming: &'a [u32],
}

impl<'a> InverseBacklinkFrequency<'a> {

    pub fn new(incoming: &'a [u32]) -> InverseBacklinkFrequency<'a> {
        Self {
            narticles: incoming.len() as Real,
            incoming,
        }
    }

    /// `incoming[j]` is nonzero for every column holding a stored edge.
    pub fn weight(&self, j: usize, x: Real) -> Real {
        debug_assert!(self.incoming[j] > 0, "edge into {} without backlinks", j);
        x * (self.narticles / self.incoming[j] as Real).log2()
    }
}

/// Flat normalization by the number of combined path lengths.
pub fn normalize(_j: usize, x: Real) -> Real {
    x / PATH_LENGTH
}

pub struct Weighting {}

impl Weighting {

    /// Turns the link matrix into the pf-ibf association matrix.
    ///
    /// `links` holds 1.0 for every stored link and is ibf-weighted in place;
    /// `incoming` counts the backlinks of every article. The returned matrix
    /// is `(A^2 - diag(A^2) + A) / 2` where `A` is the ibf-weighted matrix.
    pub fn pf_ibf(links: &mut SparseMatrix, incoming: &[u32]) -> Result<SparseMatrix> {

        assert_eq!(links.row_count(), incoming.len(), "one backlink count per article");

        info!("applying ibf transformation");
        let ibf = InverseBacklinkFrequency::new(incoming);
        links.transform(|j, x| ibf.weight(j, x));

        info!("squaring matrix");
        let mut assoc = SparseMatrix::new(links.row_count())?;
        links.square(&mut assoc);
        debug!(entries = assoc.stored_entries(), "squared");

        info!("computing full pf-ibf");
        // an article is not associated with itself
        assoc.clear_diagonal();
        assoc.add_assign(links);
        assoc.transform(normalize);

        Ok(assoc)
    }
}
