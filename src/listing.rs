use chrono::{Datelike, Local};

use crate::builder::build_entry;
use crate::errors::ListingResult;
use crate::grammar::GrammarRegistry;
use crate::model::{Entry, EntryKind, normalize_dir_path, normalize_host};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    host: String,
    path: String,
    entries: Vec<Entry>,
}

impl Listing {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn of_kind(&self, kind: EntryKind) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(move |entry| entry.kind() == kind)
    }

    pub fn files(&self) -> Vec<&Entry> {
        self.of_kind(EntryKind::File).collect()
    }

    pub fn directories(&self) -> Vec<&Entry> {
        self.of_kind(EntryKind::Directory).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(Entry::name).collect()
    }

    pub fn find(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.name() == name)
    }
}

/// Classifies and builds every line in order. Any failing line discards the
/// whole batch.
pub fn assemble_listing<I, S>(
    host: &str,
    dir_path: &str,
    lines: I,
    current_year: i32,
) -> ListingResult<Listing>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let registry = GrammarRegistry::standard();
    let entries = lines
        .into_iter()
        .map(|line| {
            let line = line.as_ref().trim_end_matches(['\r', '\n']);
            let matched = registry.classify(line)?;
            build_entry(host, dir_path, &matched, current_year)
        })
        .collect::<ListingResult<Vec<_>>>()?;

    Ok(Listing {
        host: normalize_host(host),
        path: normalize_dir_path(dir_path),
        entries,
    })
}

pub fn assemble_listing_now<I, S>(host: &str, dir_path: &str, lines: I) -> ListingResult<Listing>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    assemble_listing(host, dir_path, lines, Local::now().year())
}
