
// imports
use crate::errors::{AssocError, Result};
use clap::Parser;
use regex::Regex;
use std::ffi::OsString;
use std::fmt::Display;
use std::path::PathBuf;


/// Command line of the association run.
#[derive(Parser, Debug)]
#[command(name = "wikiassoc", version, about = "Wikipedia article associations ranked by pf-ibf")]
struct Cli {
    /// Exclude titles matching RE in output
    #[arg(short = 'e', long = "exclude", value_name = "RE")]
    exclude: Option<String>,

    /// Output N associations per term
    #[arg(short = 'n', long = "num", value_name = "N", default_value_t = 10)]
    num: usize,

    /// Quiet; no log output to standard error
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Output pf-ibf weights with associations
    #[arg(short = 'w', long = "weights")]
    weights: bool,

    /// Worker threads for the matrix computations, 0 for one per CPU
    #[arg(short = 'j', long = "threads", value_name = "N", default_value_t = 0)]
    threads: usize,

    /// page table dump, optionally .gz or .bz2
    #[arg(value_name = "PAGEDUMP")]
    pagedump: PathBuf,

    /// pagelinks table dump, optionally .gz or .bz2
    #[arg(value_name = "LINKDUMP")]
    linkdump: PathBuf,
}

#[derive(Clone, Debug)]
pub struct Params {
    pub page_dump: PathBuf,
    pub link_dump: PathBuf,
    pub exclude: Option<Regex>,
    pub n_out: usize,
    pub quiet: bool,
    pub output_weights: bool,
    pub num_threads: usize,
}

impl Display for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "using parameters:
        page_dump: {}
        link_dump: {}
        exclude: {}
        n_out: {}
        output_weights: {}
        num_threads: {}",
        self.page_dump.display(),
        self.link_dump.display(),
        self.exclude.as_ref().map(|re| re.as_str()).unwrap_or("-"),
        self.n_out,
        self.output_weights,
        self.num_threads
        )
    }
}

/// What the command line asked for.
pub enum Invocation {
    Run(Params),
    /// `--help` or `--version`: print the text and exit successfully
    Info(String),
}

pub struct Config {}

impl Config {

    pub fn from_args<I, T>(args: I) -> Result<Invocation>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = match Cli::try_parse_from(args) {
            Ok(cli) => cli,
            Err(e) => {
                return match e.kind() {
                    clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                        Ok(Invocation::Info(e.to_string()))
                    },
                    _ => Err(AssocError::Usage(e.to_string().trim_end().to_string()))
                }
            }
        };

        let exclude = match cli.exclude {
            Some(pattern) => Some(Regex::new(&pattern)?),
            None => None
        };

        Ok(Invocation::Run(Params {
            page_dump: cli.pagedump,
            link_dump: cli.linkdump,
            exclude,
            n_out: cli.num,
            quiet: cli.quiet,
            output_weights: cli.weights,
            num_threads: cli.threads,
        }))
    }

}


pub mod files_handling {

    use crate::errors::{AssocError, Result};
    use bzip2::read::MultiBzDecoder;
    use flate2::read::MultiGzDecoder;
    use std::fs::File;
    use std::io::{BufRead, BufReader};
    use std::path::Path;

    const READ_BUFFER: usize = 1 << 20;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Compression {
        Gzip,
        Bzip2,
        Plain,
    }

    /// Compression is told by the file name suffix, ignoring case.
    pub fn compression_of(path: &Path) -> Compression {
        let name = path.to_string_lossy().to_ascii_lowercase();
        if name.ends_with(".gz") {
            Compression::Gzip
        } else if name.ends_with(".bz2") {
            Compression::Bzip2
        } else {
            Compression::Plain
        }
    }

    /// Opens a dump file, decompressing it on the fly if its name says so.
    pub fn open_input(path: &Path) -> Result<Box<dyn BufRead + Send>> {

        let f = File::open(path).map_err(|source| AssocError::Open { path: path.to_path_buf(), source })?;

        let reader: Box<dyn BufRead + Send> = match compression_of(path) {
            Compression::Gzip => Box::new(BufReader::with_capacity(READ_BUFFER, MultiGzDecoder::new(f))),
            Compression::Bzip2 => Box::new(BufReader::with_capacity(READ_BUFFER, MultiBzDecoder::new(f))),
            Compression::Plain => Box::new(BufReader::with_capacity(READ_BUFFER, f)),
        };
        Ok(reader)
    }
}


#[cfg(test)]
mod tests {

    use super::files_handling::{compression_of, open_input, Compression};
    use super::{Config, Invocation, Params};
    use crate::errors::AssocError;
    use std::io::{Read, Write};
    use std::path::Path;

    fn run_params(args: &[&str]) -> Params {
        match Config::from_args(args.iter()) {
            Ok(Invocation::Run(params)) => params,
            Ok(Invocation::Info(text)) => panic!("unexpected info output {}", text),
            Err(e) => panic!("{}", e)
        }
    }

    #[test]
    fn defaults() {
        let params = run_params(&["wikiassoc", "page.sql", "pagelinks.sql.gz"]);
        assert_eq!(params.n_out, 10);
        assert!(!params.quiet);
        assert!(!params.output_weights);
        assert!(params.exclude.is_none());
        assert_eq!(params.num_threads, 0);
        assert_eq!(params.page_dump, Path::new("page.sql"));
        assert_eq!(params.link_dump, Path::new("pagelinks.sql.gz"));
    }

    #[test]
    fn short_flags() {
        let params = run_params(&["wikiassoc", "-e", "^List of", "-n", "3", "-qw", "-j", "2", "p", "l"]);
        assert_eq!(params.n_out, 3);
        assert!(params.quiet);
        assert!(params.output_weights);
        assert_eq!(params.num_threads, 2);
        assert!(params.exclude.unwrap().is_match("List of lists"));
    }

    #[test]
    fn usage_errors() {
        let bad = [
            vec!["wikiassoc", "only-one"],
            vec!["wikiassoc", "a", "b", "c"],
            vec!["wikiassoc", "-n", "ten", "a", "b"],
            vec!["wikiassoc", "-x", "a", "b"],
        ];
        for args in bad {
            match Config::from_args(args.iter()) {
                Err(AssocError::Usage(_)) => {},
                _ => panic!("expected usage error for {:?}", args)
            }
        }

        match Config::from_args(["wikiassoc", "-e", "(", "a", "b"]) {
            Err(e @ AssocError::Regex(_)) => assert!(e.is_usage()),
            _ => panic!("expected regex error")
        }
    }

    #[test]
    fn help_is_not_an_error() {
        assert!(matches!(Config::from_args(["wikiassoc", "--help"]), Ok(Invocation::Info(_))));
    }

    #[test]
    fn compression_by_suffix() {
        assert_eq!(compression_of(Path::new("enwiki-page.sql.gz")), Compression::Gzip);
        assert_eq!(compression_of(Path::new("enwiki-page.sql.BZ2")), Compression::Bzip2);
        assert_eq!(compression_of(Path::new("enwiki-page.sql")), Compression::Plain);
    }

    #[test]
    fn open_gzip_and_plain() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("page.sql");
        std::fs::write(&plain, "-- plain\n").unwrap();
        let mut text = String::new();
        open_input(&plain).unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "-- plain\n");

        let gz = dir.path().join("page.sql.gz");
        let mut enc = flate2::write::GzEncoder::new(std::fs::File::create(&gz).unwrap(), flate2::Compression::default());
        enc.write_all(b"-- gzipped\n").unwrap();
        enc.finish().unwrap();
        let mut text = String::new();
        open_input(&gz).unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "-- gzipped\n");
    }

    #[test]
    fn missing_file() {
        match open_input(Path::new("does/not/exist.sql")) {
            Err(AssocError::Open { path, .. }) => assert_eq!(path, Path::new("does/not/exist.sql")),
            _ => panic!("expected open error")
        }
    }
}
