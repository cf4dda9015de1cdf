
// imports
use crate::articles::ArticleRegistry;
use crate::matrix::{Real, SparseMatrix};
use rayon::prelude::*;
use regex::Regex;
use std::cmp::Ordering;
use std::io::{self, Write};
use std::sync::Mutex;


// heaviest first, ties by ascending article index
fn by_weight(a: &(u32, Real), b: &(u32, Real)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

/// Selects and formats the most associated articles of every article.
pub struct Ranking<'a> {
    assoc: &'a SparseMatrix,
    registry: &'a ArticleRegistry,
    excluded: Vec<bool>,
    k: usize,
    weights: bool,
}

impl<'a> Ranking<'a> {

    /// `exclude` removes candidates by title before the top `k` are taken;
    /// the article heading a block is always printed.
    pub fn new(assoc: &'a SparseMatrix,
        registry: &'a ArticleRegistry,
        exclude: Option<&Regex>,
        k: usize,
        weights: bool) -> Ranking<'a> {

        assert_eq!(assoc.row_count(), registry.size(), "one matrix row per article");

        // decided once per article rather than once per candidate entry
        let excluded = match exclude {
            Some(re) => (0..registry.size())
                .into_par_iter()
                .map(|j| re.is_match(registry.title_of(j)))
                .collect(),
            None => vec![false; registry.size()]
        };

        Self { assoc, registry, excluded, k, weights }
    }

    /// The up to `k` heaviest eligible entries of row `i`, heaviest first.
    ///
    /// Order among equal weights is not part of the contract. Stored zeros
    /// are not candidates; negative weights (more backlinks than articles,
    /// from repeated links) still are.
    pub fn top_k(&self, i: usize) -> Vec<(usize, Real)> {

        if self.k == 0 {
            return Vec::new()
        }

        let mut related: Vec<(u32, Real)> = self.assoc.row(i)
            .iter()
            .filter(|(j, w)| **w != 0.0 && !self.excluded[**j as usize])
            .map(|(j, w)| (*j, *w))
            .collect();

        if related.len() > self.k {
            related.select_nth_unstable_by(self.k - 1, by_weight);
            related.truncate(self.k);
        }
        related.sort_unstable_by(by_weight);

        related.into_iter().map(|(j, w)| (j as usize, w)).collect()
    }

    /// The output block of article `i`: its title, then one indented line per
    /// associated article.
    pub fn render_row(&self, i: usize) -> String {

        let mut block = String::with_capacity(64 * (self.k + 1));
        block.push_str(self.registry.title_of(i));
        block.push('\n');

        for (j, w) in self.top_k(i) {
            block.push_str("    ");
            block.push_str(self.registry.title_of(j));
            if self.weights {
                block.push(' ');
                block.push_str(&w.to_string());
            }
            block.push('\n');
        }
        block
    }

    /// Writes the blocks of all articles to `out`, rows in parallel.
    ///
    /// Every block is written whole while holding the sink, blocks of
    /// different articles come out in no particular order.
    pub fn write_all<W: Write + Send>(&self, out: W) -> io::Result<W> {

        let sink = Mutex::new(out);

        self.assoc.par_rows().enumerate().try_for_each(|(i, _)| {
            let block = self.render_row(i);
            let mut out = sink
                .lock()
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "output sink poisoned"))?;
            out.write_all(block.as_bytes())
        })?;

        let mut out = sink
            .into_inner()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "output sink poisoned"))?;
        out.flush()?;
        Ok(out)
    }

}
