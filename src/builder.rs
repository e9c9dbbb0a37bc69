use chrono::NaiveDateTime;

use crate::errors::{ListingError, ListingResult};
use crate::grammar::ListingMatch;
use crate::model::{Entry, EntryAttributes, EntryKind};
use crate::timestamp::resolve_timestamp;

/// Builds one entry from a classified line. Unreadable `filecode` and
/// `size` fall back to -1 and 0; a timestamp failure rejects the entry.
pub fn build_entry(
    host: &str,
    dir_path: &str,
    matched: &ListingMatch,
    current_year: i32,
) -> ListingResult<Entry> {
    let timestamp = resolve_timestamp(matched.timestamp.as_ref(), current_year)
        .map_err(|err| ListingError::for_line(matched.line.as_str(), err))?;
    Ok(assemble_entry(host, dir_path, matched, timestamp))
}

pub fn entry_kind(is_dir: &str) -> EntryKind {
    match is_dir.trim() {
        "" | "-" => EntryKind::File,
        _ => EntryKind::Directory,
    }
}

fn assemble_entry(
    host: &str,
    dir_path: &str,
    matched: &ListingMatch,
    timestamp: NaiveDateTime,
) -> Entry {
    let attributes = EntryAttributes {
        name: matched.name.clone(),
        permissions: matched.permission.clone(),
        file_code: matched.filecode.trim().parse().unwrap_or(-1),
        owner: matched.owner.clone(),
        group: matched.group.clone(),
        size: matched.size.trim().parse().unwrap_or(0),
        timestamp: Some(timestamp),
    };
    Entry::new(entry_kind(&matched.is_dir), host, dir_path, attributes)
}
