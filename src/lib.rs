mod config;
mod errors;
mod logging;
mod articles;
mod dump;
mod ingest;
mod matrix;
mod weighting;
mod ranking;
mod pipeline;

pub use articles::{Article, ArticleRegistry};
pub use config::{files_handling, Config, Invocation, Params};
pub use dump::{parse_dump, sql_unescape, DumpParser, ParseStats, Table, TupleHandler, MAIN_NAMESPACE};
pub use errors::{AssocError, Result};
pub use ingest::{Ingest, LinkGraph, LinkStats};
pub use logging::LogLine;
pub use matrix::{Real, Row, SparseMatrix};
pub use pipeline::Pipeline;
pub use ranking::Ranking;
pub use weighting::{normalize, InverseBacklinkFrequency, Weighting, PATH_LENGTH};
