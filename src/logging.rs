
// imports
use chrono::Local;
use std::fmt;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::registry::LookupSpan;


// ctime(3) style, e.g. "Mon Oct 19 14:02:11 2026"
const TIMESTAMP: &str = "%a %b %e %H:%M:%S %Y";

/// Formats every event as `<program> [<timestamp>]: <message> <fields>`.
pub struct LogLine {
    program: String,
}

impl LogLine {
    pub fn new(program: &str) -> LogLine {
        Self { program: program.to_string() }
    }
}

impl<S, N> FormatEvent<S, N> for LogLine
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        write!(writer, "{} [{}]: ", self.program, Local::now().format(TIMESTAMP))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// The subscriber writing `LogLine`s to `writer`, none in quiet mode.
pub fn subscriber<W>(program: &str, quiet: bool, writer: W) -> Option<impl Subscriber + Send + Sync + 'static>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    if quiet {
        return None
    }

    let subscriber = tracing_subscriber::fmt()
        .with_writer(writer)
        .event_format(LogLine::new(program))
        .finish();
    Some(subscriber)
}

/// Sets up diagnostics on standard error, once per process.
///
/// In quiet mode no subscriber is installed and every event is dropped.
pub fn init(program: &str, quiet: bool) {
    if let Some(subscriber) = subscriber(program, quiet, std::io::stderr) {
        // a second call keeps the first subscriber
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}


#[cfg(test)]
mod tests {

    use super::subscriber;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;
        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn line_format() {
        let captured = Captured::default();
        let subscriber = subscriber("wikiassoc", false, captured.clone()).unwrap();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("squaring matrix");
            tracing::info!(articles = 3, "page table parsed");
        });

        let text = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("wikiassoc ["), "{}", lines[0]);
        assert!(lines[0].ends_with("]: squaring matrix"), "{}", lines[0]);
        assert!(lines[1].ends_with("]: page table parsed articles=3"), "{}", lines[1]);
    }

    #[test]
    fn quiet_installs_nothing() {
        assert!(subscriber("wikiassoc", true, Captured::default()).is_none());
        assert!(subscriber("wikiassoc", false, Captured::default()).is_some());
    }
}
