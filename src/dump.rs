
// imports
use std::borrow::Cow;
use std::io::{self, BufRead};


/// The Wikipedia main namespace, where the encyclopedic content resides.
pub const MAIN_NAMESPACE: u32 = 0;

/// The two tables whose INSERT statements are decoded into tuples.
///
/// `page` rows are `(page_id, page_namespace, page_title, ...)` and
/// `pagelinks` rows are `(pl_from, pl_namespace, pl_title, ...)`, following
/// the MySQL dumps of the MediaWiki database. Only the first three fields of
/// either table are decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Table {
    Page,
    PageLinks,
}

impl Table {
    fn from_name(name: &[u8]) -> Option<Table> {
        match name {
            b"`page`" => Some(Table::Page),
            b"`pagelinks`" => Some(Table::PageLinks),
            _ => None
        }
    }
}

/// Receives the tuples found by a [`DumpParser`].
///
/// Titles are passed exactly as they appear between the quotes, SQL escapes
/// included; see [`sql_unescape`]. Both methods default to ignoring the
/// tuple, so a handler only implements the table it cares about.
pub trait TupleHandler {
    fn page(&mut self, _id: u32, _namespace: u32, _raw_title: &str) {}
    fn link(&mut self, _from_id: u32, _namespace: u32, _raw_title: &str) {}
}

/// Counters kept while parsing, for diagnostics only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub inserts: usize,          // INSERT statements into a known table
    pub other_statements: usize, // everything skipped up to its `;`
    pub comments: usize,
    pub tuples: usize,           // tuples handed to the handler
    pub malformed: usize,        // INSERT statements abandoned at a bad tuple
}

// why decoding of the current construct stopped
enum Fault {
    Eof,
    Malformed,
    Io(io::Error),
}

impl From<io::Error> for Fault {
    fn from(e: io::Error) -> Self {
        Fault::Io(e)
    }
}

type Step<T> = Result<T, Fault>;

/// Removes the backslashes of SQL quoting: `\x` becomes `x` for any `x`.
///
/// A lone trailing backslash is dropped. Strings without backslashes are
/// returned borrowed.
pub fn sql_unescape(raw: &str) -> Cow<'_, str> {

    if !raw.contains('\\') {
        return Cow::Borrowed(raw)
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            },
            _ => out.push(c)
        }
    }
    Cow::Owned(out)
}


/// Single-pass scanner over a MySQL dump.
///
/// Input is split into statements at `;` outside single-quoted strings.
/// `INSERT INTO `page` VALUES ...;` and `INSERT INTO `pagelinks` VALUES ...;`
/// are decoded tuple by tuple, comments (`-- ...` and `/* ... */`) and every
/// other statement are skipped. Only the fields of the tuple being decoded
/// are held in memory.
///
/// Nothing in the input is fatal: a tuple that does not decode ends its
/// statement (tuples before it have already been delivered) and scanning
/// resumes after the statement's `;`. A truncated trailing statement is
/// dropped. Only read errors of the underlying reader are returned.
pub struct DumpParser<R> {
    reader: R,
    stats: ParseStats,
    word: Vec<u8>,
    title: Vec<u8>,
}

impl<R: BufRead> DumpParser<R> {

    pub fn new(reader: R) -> DumpParser<R> {
        Self {
            reader,
            stats: ParseStats::default(),
            word: Vec::with_capacity(16),
            title: Vec::with_capacity(256),
        }
    }

    /// Parses the whole input, calling `handler` for every decoded tuple.
    pub fn parse<H: TupleHandler>(&mut self, handler: &mut H) -> io::Result<ParseStats> {

        loop {
            let step = match self.statement(handler) {
                Err(Fault::Malformed) => {
                    self.stats.malformed += 1;
                    self.skip_statement()
                },
                other => other
            };

            match step {
                Ok(()) => continue,
                Err(Fault::Eof) => break,
                Err(Fault::Io(e)) => return Err(e),
                // skip_statement never reports malformed input
                Err(Fault::Malformed) => continue
            }
        }

        Ok(self.stats.clone())
    }

    fn statement<H: TupleHandler>(&mut self, handler: &mut H) -> Step<()> {

        self.skip_whitespace()?;

        match self.peek()? {
            b'-' => {
                self.bump()?;
                if self.peek()? == b'-' {
                    self.stats.comments += 1;
                    self.skip_while(|b| b != b'\n')?;
                    self.bump()?;
                    return Ok(())
                }
                self.other_statement()
            },
            b'/' => {
                self.bump()?;
                if self.peek()? == b'*' {
                    self.bump()?;
                    self.stats.comments += 1;
                    return self.skip_block_comment()
                }
                self.other_statement()
            },
            // left over after `/*!40101 ... */;` and the like
            b';' => {
                self.bump()?;
                Ok(())
            },
            b'I' => self.insert(handler),
            _ => self.other_statement()
        }
    }

    fn insert<H: TupleHandler>(&mut self, handler: &mut H) -> Step<()> {

        if !self.keyword(b"INSERT")? {
            return self.other_statement()
        }
        self.skip_whitespace()?;
        if !self.keyword(b"INTO")? {
            return self.other_statement()
        }
        self.skip_whitespace()?;
        self.read_word()?;
        let table = match Table::from_name(&self.word) {
            Some(table) => table,
            None => return self.other_statement()
        };
        self.skip_whitespace()?;
        if !self.keyword(b"VALUES")? {
            return self.other_statement()
        }

        self.stats.inserts += 1;
        self.values(table, handler)
    }

    fn values<H: TupleHandler>(&mut self, table: Table, handler: &mut H) -> Step<()> {

        loop {
            self.skip_whitespace()?;
            self.tuple(table, handler)?;
            self.skip_whitespace()?;

            match self.peek()? {
                b',' => self.bump()?,
                b';' => {
                    self.bump()?;
                    return Ok(())
                },
                _ => return Err(Fault::Malformed)
            };
        }
    }

    fn tuple<H: TupleHandler>(&mut self, table: Table, handler: &mut H) -> Step<()> {

        self.expect(b'(')?;
        self.skip_whitespace()?;
        let id = self.unsigned()?;
        self.field_separator()?;
        let namespace = self.unsigned()?;
        self.field_separator()?;
        self.quoted()?;
        self.skip_whitespace()?;

        // fields after the title are not decoded
        if self.peek()? == b',' {
            self.bump()?;
            self.skip_fields()?;
        }
        self.expect(b')')?;

        self.stats.tuples += 1;
        let title = String::from_utf8_lossy(&self.title);
        match table {
            Table::Page => handler.page(id, namespace, &title),
            Table::PageLinks => handler.link(id, namespace, &title),
        }
        Ok(())
    }

    fn field_separator(&mut self) -> Step<()> {
        self.skip_whitespace()?;
        self.expect(b',')?;
        self.skip_whitespace()
    }

    fn unsigned(&mut self) -> Step<u32> {

        let mut value: u32 = 0;
        let mut digits = 0;
        loop {
            let b = self.peek()?;
            if !b.is_ascii_digit() {
                break
            }
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add((b - b'0') as u32))
                .ok_or(Fault::Malformed)?;
            digits += 1;
            self.bump()?;
        }

        if digits == 0 {
            return Err(Fault::Malformed)
        }
        Ok(value)
    }

    // reads a single-quoted string into `self.title`, escapes kept
    fn quoted(&mut self) -> Step<()> {

        self.expect(b'\'')?;
        self.title.clear();
        loop {
            let title = &mut self.title;
            take_while(&mut self.reader, |b| b != b'\\' && b != b'\'', title)?;
            match self.bump()? {
                b'\\' => {
                    let escaped = self.bump()?;
                    self.title.push(b'\\');
                    self.title.push(escaped);
                },
                _ => return Ok(())
            }
        }
    }

    // skips to the unquoted `)` closing the tuple, leaving it unread
    fn skip_fields(&mut self) -> Step<()> {

        loop {
            self.skip_while(|b| b != b'\'' && b != b')' && b != b';')?;
            match self.peek()? {
                b'\'' => {
                    self.bump()?;
                    self.skip_quoted()?;
                },
                b')' => return Ok(()),
                _ => return Err(Fault::Malformed)
            }
        }
    }

    fn other_statement(&mut self) -> Step<()> {
        self.stats.other_statements += 1;
        self.skip_statement()
    }

    // skips past the next `;` that is not inside a quoted string
    fn skip_statement(&mut self) -> Step<()> {

        loop {
            self.skip_while(|b| b != b'\'' && b != b';')?;
            match self.bump()? {
                b'\'' => self.skip_quoted()?,
                _ => return Ok(())
            }
        }
    }

    // the opening quote has already been read
    fn skip_quoted(&mut self) -> Step<()> {

        loop {
            self.skip_while(|b| b != b'\\' && b != b'\'')?;
            match self.bump()? {
                b'\\' => {
                    self.bump()?;
                },
                _ => return Ok(())
            }
        }
    }

    // the opening `/*` has already been read
    fn skip_block_comment(&mut self) -> Step<()> {

        loop {
            self.skip_while(|b| b != b'*')?;
            self.bump()?;
            loop {
                match self.peek()? {
                    b'*' => {
                        self.bump()?;
                    },
                    b'/' => {
                        self.bump()?;
                        return Ok(())
                    },
                    _ => break
                }
            }
        }
    }

    fn keyword(&mut self, keyword: &[u8]) -> Step<bool> {
        self.read_word()?;
        Ok(self.word == keyword)
    }

    // identifiers, keywords and backquoted table names
    fn read_word(&mut self) -> Step<()> {

        const MAX_WORD: usize = 64;

        self.word.clear();
        while self.word.len() < MAX_WORD {
            let b = self.peek()?;
            if !(b.is_ascii_alphanumeric() || b == b'_' || b == b'`') {
                break
            }
            self.word.push(b);
            self.bump()?;
        }
        Ok(())
    }

    fn expect(&mut self, expected: u8) -> Step<()> {
        if self.peek()? != expected {
            return Err(Fault::Malformed)
        }
        self.bump()?;
        Ok(())
    }

    fn skip_whitespace(&mut self) -> Step<()> {
        self.skip_while(|b| b.is_ascii_whitespace())
    }

    fn skip_while(&mut self, mut pred: impl FnMut(u8) -> bool) -> Step<()> {

        loop {
            let buf = self.reader.fill_buf()?;
            if buf.is_empty() {
                return Err(Fault::Eof)
            }
            let n = buf.iter().position(|b| !pred(*b)).unwrap_or(buf.len());
            let found = n < buf.len();
            self.reader.consume(n);
            if found {
                return Ok(())
            }
        }
    }

    fn peek(&mut self) -> Step<u8> {
        match self.reader.fill_buf()?.first() {
            Some(b) => Ok(*b),
            None => Err(Fault::Eof)
        }
    }

    fn bump(&mut self) -> Step<u8> {
        let b = self.peek()?;
        self.reader.consume(1);
        Ok(b)
    }
}

// copies bytes matching `pred` into `out`, stopping before the first one
// that does not match
fn take_while<R: BufRead>(reader: &mut R, mut pred: impl FnMut(u8) -> bool, out: &mut Vec<u8>) -> Step<()> {

    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Err(Fault::Eof)
        }
        let n = buf.iter().position(|b| !pred(*b)).unwrap_or(buf.len());
        out.extend_from_slice(&buf[..n]);
        let found = n < buf.len();
        reader.consume(n);
        if found {
            return Ok(())
        }
    }
}

/// Convenience wrapper: parses `reader` to the end with a fresh parser.
pub fn parse_dump<R: BufRead, H: TupleHandler>(reader: R, handler: &mut H) -> io::Result<ParseStats> {
    DumpParser::new(reader).parse(handler)
}
