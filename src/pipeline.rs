
// imports
use crate::articles::ArticleRegistry;
use crate::config::{files_handling, Config, Invocation, Params};
use crate::errors::{AssocError, Result};
use crate::ingest::Ingest;
use crate::logging;
use crate::matrix::SparseMatrix;
use crate::ranking::Ranking;
use crate::weighting::Weighting;

use rayon::ThreadPoolBuilder;
use std::env;
use std::ffi::OsString;
use std::io::{self, BufRead, BufWriter, Write};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};


const PROGRAM: &str = "wikiassoc";

pub struct Pipeline {}

impl Pipeline {

    // runs the whole procedure
    // -> configuration of arguments
    // -> page table and link table ingestion
    // -> pf-ibf weighting
    // -> ranking output

    pub fn run() -> ExitCode {
        ExitCode::from(Pipeline::run_with(env::args_os()))
    }

    /// Runs with the given command line and returns the process exit status.
    pub fn run_with<I, T>(args: I) -> u8
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let params = match Config::from_args(args) {
            Ok(Invocation::Run(params)) => params,
            Ok(Invocation::Info(text)) => {
                print!("{}", text);
                return 0
            },
            Err(e) => {
                eprintln!("{}: error: {}", PROGRAM, e);
                return 1
            }
        };

        logging::init(PROGRAM, params.quiet);

        let out = BufWriter::with_capacity(1 << 20, io::stdout());
        match Pipeline::execute(&params, out) {
            Ok(_) => 0,
            Err(e) if e.is_usage() => {
                eprintln!("{}: error: {}", PROGRAM, e);
                1
            },
            Err(e) => {
                error!("FATAL: {}", e);
                1
            }
        }
    }

    /// Opens both dumps, computes the associations and writes them to `out`.
    pub fn execute<W: Write + Send>(params: &Params, out: W) -> Result<W> {

        info!("{}", params);

        // fail early if an input is not readable
        let page_input = files_handling::open_input(&params.page_dump)?;
        let link_input = files_handling::open_input(&params.link_dump)?;

        let timer = Instant::now();
        let out = if params.num_threads > 0 {
            // a pool of our own, the global one may already be running
            let pool = ThreadPoolBuilder::new().num_threads(params.num_threads).build()?;
            pool.install(|| Pipeline::associate(page_input, link_input, params, out))?
        } else {
            Pipeline::associate(page_input, link_input, params, out)?
        };
        info!("done, took {} seconds", timer.elapsed().as_secs());
        Ok(out)
    }

    /// The computation proper, on already opened inputs.
    pub fn associate<P, L, W>(page_input: P, link_input: L, params: &Params, out: W) -> Result<W>
    where
        P: BufRead,
        L: BufRead,
        W: Write + Send,
    {
        let mut registry = ArticleRegistry::new();
        Ingest::page_table(page_input, &mut registry)?;

        let (mut graph, _) = Ingest::link_table(link_input, &registry)?;
        let assoc: SparseMatrix = Weighting::pf_ibf(&mut graph.links, &graph.incoming)?;
        // the link matrix is not needed for output
        drop(graph);

        info!("writing output");
        let ranking = Ranking::new(&assoc, &registry, params.exclude.as_ref(), params.n_out, params.output_weights);
        let out = ranking.write_all(out).map_err(AssocError::Io)?;
        Ok(out)
    }
}
