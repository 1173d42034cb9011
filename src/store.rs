use crate::date::DateKey;
use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io::{self, Write};

/// One stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub date: DateKey,
    pub event: String,
}

impl Entry {
    pub fn new(date: DateKey, event: impl Into<String>) -> Self {
        Self {
            date,
            event: event.into(),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.event)
    }
}

/// Events of a single date in arrival order, without duplicates.
#[derive(Debug, Default, Clone)]
struct Bucket {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl Bucket {
    fn push(&mut self, event: &str) -> bool {
        if self.seen.contains(event) {
            return false;
        }
        self.seen.insert(event.to_string());
        self.order.push(event.to_string());
        true
    }

    fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) -> usize {
        let before = self.order.len();
        let seen = &mut self.seen;
        self.order.retain(|event| {
            if keep(event.as_str()) {
                true
            } else {
                seen.remove(event.as_str());
                false
            }
        });
        before - self.order.len()
    }

    fn tail(&self) -> Option<&str> {
        self.order.last().map(String::as_str)
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Date-ordered event store. A date is present only while it has at least
/// one event.
#[derive(Debug, Default, Clone)]
pub struct EventStore {
    dates: BTreeMap<DateKey, Bucket>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `event` under `date` unless that date already holds it.
    /// Returns whether anything was added.
    pub fn add(&mut self, date: DateKey, event: &str) -> bool {
        let added = self.dates.entry(date).or_default().push(event);
        if added {
            log::debug!("added {} {}", date, event);
        } else {
            log::trace!("skipped duplicate {} {}", date, event);
        }
        added
    }

    pub fn find_if<P>(&self, predicate: P) -> Vec<Entry>
    where
        P: Fn(&DateKey, &str) -> bool,
    {
        let mut found = Vec::new();
        for (date, bucket) in &self.dates {
            for event in &bucket.order {
                if predicate(date, event.as_str()) {
                    log::trace!("matched {} {}", date, event);
                    found.push(Entry::new(*date, event.as_str()));
                }
            }
        }
        found
    }

    /// Removes every matching record and drops dates left empty. The
    /// predicate sees each record exactly once and only depends on that
    /// record, so earlier removals never change later verdicts.
    pub fn remove_if<P>(&mut self, predicate: P) -> usize
    where
        P: Fn(&DateKey, &str) -> bool,
    {
        let mut removed = 0;
        self.dates.retain(|date, bucket| {
            removed += bucket.retain(|event| !predicate(date, event));
            !bucket.is_empty()
        });
        log::debug!("removed {} entries", removed);
        removed
    }

    /// Latest event of the greatest stored date not after `date`.
    pub fn last(&self, date: &DateKey) -> Result<Entry> {
        self.dates
            .range(..=*date)
            .next_back()
            .and_then(|(found, bucket)| bucket.tail().map(|event| Entry::new(*found, event)))
            .ok_or_else(|| Error::NotFound { date: *date })
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.find_if(|_, _| true)
    }

    /// Writes every record as `<date> <event>` lines in store order.
    pub fn print<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (date, bucket) in &self.dates {
            for event in &bucket.order {
                writeln!(out, "{} {}", date, event)?;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.dates.values().map(|bucket| bucket.order.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn date_count(&self) -> usize {
        self.dates.len()
    }
}
