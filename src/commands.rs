use crate::date::DateKey;
use crate::error::{Error, ErrorKind, Result};
use crate::query::Condition;
use crate::store::{Entry, EventStore};
use serde::Serialize;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Yaml,
}

#[derive(Debug, Clone)]
pub enum Command {
    Add { date: DateKey, event: String },
    Print,
    Find(Condition),
    Del(Condition),
    Last(DateKey),
}

impl Command {
    /// Parses one input line. Blank lines yield `None`. Syntax error
    /// positions are byte offsets into `line`.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        // Every slice below is a suffix of `line`.
        let offset = |rest: &str| line.len() - rest.len();
        let (word, rest) = split_word(line.trim_start());

        let command = match word {
            "" => return Ok(None),
            "Add" => {
                let rest = rest.trim_start();
                let (date, event) = split_word(rest);
                if date.is_empty() {
                    return Err(Error::syntax("Missing date", offset(rest)));
                }
                let date = date.parse::<DateKey>()?;
                if event.trim_start().is_empty() {
                    return Err(Error::syntax("Missing event text", offset(event)));
                }
                Command::Add {
                    date,
                    event: event.trim_start().to_string(),
                }
            }
            "Print" => Command::Print,
            "Find" => Command::Find(parse_condition(rest, offset(rest))?),
            "Del" => Command::Del(parse_condition(rest, offset(rest))?),
            "Last" => Command::Last(rest.trim().parse::<DateKey>()?),
            other => return Err(Error::UnknownCommand(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn parse_condition(text: &str, offset: usize) -> Result<Condition> {
    Condition::parse(text).map_err(|e| e.offset_by(offset))
}

fn split_word(s: &str) -> (&str, &str) {
    match s.find(char::is_whitespace) {
        Some(idx) => (&s[..idx], &s[idx..]),
        None => (s, ""),
    }
}

#[derive(Serialize)]
struct FindReport<'a> {
    count: usize,
    entries: &'a [Entry],
}

/// Runs commands against one exclusively owned store and writes the
/// results to `out`.
pub struct Session<W: Write> {
    store: EventStore,
    out: W,
    format: OutputFormat,
}

impl<W: Write> Session<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            store: EventStore::new(),
            out,
            format,
        }
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Runs every line of `input`. Malformed commands are reported on the
    /// output and skipped; I/O and rendering failures stop the run. Bytes
    /// that are not UTF-8 are replaced rather than ending the run.
    /// Returns the number of lines that failed.
    pub fn run<R: BufRead>(&mut self, mut input: R) -> Result<usize> {
        let mut failed = 0;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\n', '\r']);
            match self.run_line(line) {
                Ok(()) => {}
                Err(e) if is_recoverable(&e) => {
                    log::debug!("line failed: {}", e);
                    writeln!(self.out, "{}", e)?;
                    failed += 1;
                }
                Err(e) => return Err(e),
            }
        }
        self.out.flush()?;
        Ok(failed)
    }

    pub fn run_line(&mut self, line: &str) -> Result<()> {
        match Command::parse(line)? {
            Some(command) => self.execute(command),
            None => Ok(()),
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<()> {
        log::debug!("executing {:?}", command);
        match command {
            Command::Add { date, event } => {
                self.store.add(date, &event);
            }
            Command::Print => match self.format {
                OutputFormat::Text => self.store.print(&mut self.out)?,
                OutputFormat::Yaml => {
                    let entries = self.store.entries();
                    write!(self.out, "{}", serde_yaml::to_string(&entries)?)?;
                }
            },
            Command::Find(condition) => {
                let entries = self.store.find_if(condition.predicate());
                match self.format {
                    OutputFormat::Text => {
                        for entry in &entries {
                            writeln!(self.out, "{}", entry)?;
                        }
                        writeln!(self.out, "Found {} entries", entries.len())?;
                    }
                    OutputFormat::Yaml => {
                        let report = FindReport {
                            count: entries.len(),
                            entries: &entries,
                        };
                        write!(self.out, "{}", serde_yaml::to_string(&report)?)?;
                    }
                }
            }
            Command::Del(condition) => {
                let count = self.store.remove_if(condition.predicate());
                writeln!(self.out, "Removed {} entries", count)?;
            }
            Command::Last(date) => match self.store.last(&date) {
                Ok(entry) => match self.format {
                    OutputFormat::Text => writeln!(self.out, "{}", entry)?,
                    OutputFormat::Yaml => write!(self.out, "{}", serde_yaml::to_string(&entry)?)?,
                },
                Err(Error::NotFound { .. }) => writeln!(self.out, "No entries")?,
                Err(e) => return Err(e),
            },
        }
        Ok(())
    }
}

fn is_recoverable(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::Syntax | ErrorKind::InvalidDate | ErrorKind::UnknownCommand
    )
}
