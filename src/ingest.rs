
// imports
use crate::articles::ArticleRegistry;
use crate::dump::{sql_unescape, DumpParser, ParseStats, TupleHandler, MAIN_NAMESPACE};
use crate::errors::{AssocError, Result};
use crate::matrix::SparseMatrix;
use std::io::BufRead;
use tracing::{debug, info};


/// Registers every main-namespace row of the `page` table.
struct PageIngest<'a> {
    registry: &'a mut ArticleRegistry,
    other_namespaces: usize,
}

impl TupleHandler for PageIngest<'_> {
    fn page(&mut self, id: u32, namespace: u32, raw_title: &str) {
        if namespace != MAIN_NAMESPACE {
            self.other_namespaces += 1;
            return
        }
        self.registry.register(sql_unescape(raw_title).into_owned(), id);
    }
}

/// Links between registered articles, with the backlink count of every article.
#[derive(Debug)]
pub struct LinkGraph {
    pub links: SparseMatrix,
    pub incoming: Vec<u32>,
}

/// Counts of what happened to the rows of the `pagelinks` table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub stored: usize,
    pub other_namespaces: usize,
    pub red_links: usize,       // target title not registered
    pub unknown_sources: usize, // source id not registered
}

struct LinkIngest<'a> {
    registry: &'a ArticleRegistry,
    graph: &'a mut LinkGraph,
    stats: LinkStats,
}

impl TupleHandler for LinkIngest<'_> {
    fn link(&mut self, from_id: u32, namespace: u32, raw_title: &str) {

        if namespace != MAIN_NAMESPACE {
            self.stats.other_namespaces += 1;
            return
        }

        let to = match self.registry.find_by_title(&sql_unescape(raw_title)) {
            Some(to) => to,
            None => {
                self.stats.red_links += 1;
                return
            }
        };
        let from = match self.registry.find_by_external_id(from_id) {
            Some(from) => from,
            None => {
                self.stats.unknown_sources += 1;
                return
            }
        };

        // a repeated link keeps weight 1 but counts as another backlink
        *self.graph.links.get_mut(from, to) = 1.0;
        self.graph.incoming[to] += 1;
        self.stats.stored += 1;
    }
}

pub struct Ingest {}

impl Ingest {

    /// Reads a `page` table dump into `registry`.
    pub fn page_table<R: BufRead>(input: R, registry: &mut ArticleRegistry) -> Result<ParseStats> {

        info!("parsing page table");
        let mut handler = PageIngest { registry, other_namespaces: 0 };
        let stats = DumpParser::new(input).parse(&mut handler)?;
        let other_namespaces = handler.other_namespaces;

        info!(articles = registry.size(), tuples = stats.tuples, "page table parsed");
        debug!(other_namespaces, malformed = stats.malformed, other_statements = stats.other_statements,
            "page table details");
        Ok(stats)
    }

    /// Reads a `pagelinks` table dump into a link matrix over the articles of
    /// `registry`.
    pub fn link_table<R: BufRead>(input: R, registry: &ArticleRegistry) -> Result<(LinkGraph, LinkStats)> {

        let n = registry.size();
        let mut incoming: Vec<u32> = Vec::new();
        incoming.try_reserve_exact(n).map_err(|_| AssocError::OutOfMemory { what: "backlink counts" })?;
        incoming.resize(n, 0);
        let mut graph = LinkGraph { links: SparseMatrix::new(n)?, incoming };

        info!("parsing link table");
        let mut handler = LinkIngest { registry, graph: &mut graph, stats: LinkStats::default() };
        let parse_stats = DumpParser::new(input).parse(&mut handler)?;
        let stats = handler.stats;

        info!(links = stats.stored, entries = graph.links.stored_entries(), tuples = parse_stats.tuples,
            "link table parsed");
        debug!(red_links = stats.red_links, unknown_sources = stats.unknown_sources,
            other_namespaces = stats.other_namespaces, malformed = parse_stats.malformed, "link table details");
        Ok((graph, stats))
    }
}


#[cfg(test)]
mod tests {

    use super::{Ingest, LinkStats};
    use crate::articles::ArticleRegistry;
    use std::io::Cursor;

    const PAGES: &str = "INSERT INTO `page` VALUES \
        (1,0,'A','',0),(2,0,'B','',0),(3,0,'C','',0),(4,1,'A','',0),(5,0,'O\\'Brien','',0),(1,0,'Dup','',0);";

    fn registry() -> ArticleRegistry {
        let mut registry = ArticleRegistry::new();
        Ingest::page_table(Cursor::new(PAGES), &mut registry).unwrap();
        registry
    }

    #[test]
    fn pages_in_main_namespace_only() {
        let registry = registry();
        assert_eq!(registry.size(), 4);
        assert_eq!(registry.find_by_title("A"), Some(0));
        assert_eq!(registry.find_by_external_id(4), None);
        assert_eq!(registry.find_by_title("O'Brien"), Some(3));
        assert_eq!(registry.find_by_title("Dup"), None);
    }

    #[test]
    fn links_between_known_articles() {
        let registry = registry();
        let links = "INSERT INTO `pagelinks` VALUES \
            (1,0,'B'),(2,0,'C'),(1,0,'C'),(1,0,'C'),\
            (1,0,'Nowhere'),(9,0,'A'),(4,0,'A'),(5,10,'A'),(5,0,'A');";
        let (graph, stats) = Ingest::link_table(Cursor::new(links), &registry).unwrap();

        assert_eq!(stats, LinkStats {
            stored: 5,
            other_namespaces: 1,
            red_links: 1,
            unknown_sources: 2,
        });

        // duplicates are set, not accumulated
        assert_eq!(graph.links.get(0, 2), 1.0);
        assert_eq!(graph.links.get(0, 1), 1.0);
        assert_eq!(graph.links.get(1, 2), 1.0);
        assert_eq!(graph.links.get(3, 0), 1.0);
        assert_eq!(graph.links.stored_entries(), 4);
        assert_eq!(graph.incoming, vec![1, 1, 3, 0]);
    }

    #[test]
    fn other_namespace_pages_never_become_edges() {
        let registry = registry();
        // page 4 is `A` in namespace 1 and was never registered
        let links = "INSERT INTO `pagelinks` VALUES (4,0,'B'),(1,1,'B');";
        let (graph, stats) = Ingest::link_table(Cursor::new(links), &registry).unwrap();
        assert_eq!(graph.links.stored_entries(), 0);
        assert_eq!(graph.incoming.iter().sum::<u32>(), 0);
        assert_eq!(stats.stored, 0);
    }
}
