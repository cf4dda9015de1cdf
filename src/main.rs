use std::process::ExitCode;
use wiki_assoc::Pipeline;

// usage: wikiassoc [-e RE] [-n N] [-qw] [-j N] pagedump linkdump

fn main() -> ExitCode {
    Pipeline::run()
}
