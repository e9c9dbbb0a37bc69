use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::errors::{SessionError, SessionResult, TransportError};
use crate::listing::{Listing, assemble_listing_now};
use crate::model::{
    Entry, EntryKind, SEPARATOR, normalize_dir_path, normalize_item_path, split_item_path,
};
use crate::transport::{Request, Response, Transport, Verb};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Existence {
    Exists,
    Missing,
    Failed(TransportError),
}

impl Existence {
    pub fn exists(&self) -> bool {
        matches!(self, Self::Exists)
    }
}

pub struct Session<T: Transport> {
    config: SessionConfig,
    transport: T,
}

impl<T: Transport> Session<T> {
    pub fn new(config: SessionConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Probes with SIZE for files and CWD for directories. The root
    /// always exists and is never probed.
    pub fn probe(&self, path: &str, kind: EntryKind) -> Existence {
        let target = match kind {
            EntryKind::File => normalize_item_path(path),
            EntryKind::Directory => normalize_dir_path(path),
        };
        if target.is_empty() {
            return Existence::Exists;
        }

        let verb = match kind {
            EntryKind::File => Verb::GetFileSize,
            EntryKind::Directory => Verb::ChangeDirectory,
        };
        match self.perform(&target, verb, |_| Ok(())) {
            Ok(()) => Existence::Exists,
            Err(err) if err.is_not_found() => {
                debug!("{} {} does not exist: {err}", kind.label(), target);
                Existence::Missing
            }
            Err(err) => {
                warn!("existence probe for {} failed: {err}", target);
                Existence::Failed(err)
            }
        }
    }

    pub fn entry_exists(&self, path: &str, kind: EntryKind) -> bool {
        self.probe(path, kind).exists()
    }

    pub fn list_directory(&self, path: &str) -> SessionResult<Listing> {
        let dir = normalize_dir_path(path);
        self.require("list", &dir, EntryKind::Directory)?;

        // Some servers answer 450/550 to LIST on an empty directory.
        let lines = match self.perform(&dir, Verb::ListDirectoryDetails, |response| {
            response.lines()
        }) {
            Ok(lines) => lines,
            Err(err) if err.is_not_found() => {
                debug!("LIST of /{} reported not found after CWD, treating as empty: {err}", dir);
                Vec::new()
            }
            Err(err) => return Err(SessionError::transport("list", dir.as_str(), err)),
        };
        let listing = assemble_listing_now(&self.config.host, &dir, &lines).map_err(|source| {
            SessionError::Listing {
                path: dir.clone(),
                source,
            }
        })?;
        info!("listed {} entries in /{}", listing.len(), dir);
        Ok(listing)
    }

    pub fn list_files(&self, path: &str) -> SessionResult<Vec<Entry>> {
        self.list_kind(path, EntryKind::File)
    }

    pub fn list_directories(&self, path: &str) -> SessionResult<Vec<Entry>> {
        self.list_kind(path, EntryKind::Directory)
    }

    pub fn list_names(&self, path: &str) -> SessionResult<Vec<String>> {
        let listing = self.list_directory(path)?;
        Ok(listing.names().into_iter().map(str::to_string).collect())
    }

    pub fn file_size(&self, path: &str) -> SessionResult<u64> {
        let target = normalize_item_path(path);
        if target.is_empty() {
            return Err(SessionError::invalid_path("size", path, "missing file name"));
        }
        self.require("size", &target, EntryKind::File)?;

        let reply = self
            .perform(&target, Verb::GetFileSize, |response| {
                Ok(response.reply().to_string())
            })
            .map_err(|err| SessionError::transport("size", target.as_str(), err))?;
        parse_size_reply(&reply).ok_or(SessionError::InvalidSize {
            path: target,
            value: reply,
        })
    }

    pub fn timestamp(&self, path: &str) -> SessionResult<NaiveDateTime> {
        let target = normalize_item_path(path);
        if target.is_empty() {
            return Err(SessionError::invalid_path("timestamp", path, "missing file name"));
        }
        self.require("timestamp", &target, EntryKind::File)?;

        let reply = self
            .perform(&target, Verb::GetDateTimestamp, |response| {
                Ok(response.reply().to_string())
            })
            .map_err(|err| SessionError::transport("timestamp", target.as_str(), err))?;
        parse_mdtm_reply(&reply).ok_or(SessionError::InvalidTimestamp {
            path: target,
            value: reply,
        })
    }

    pub fn refresh_entry(&self, entry: &Entry) -> SessionResult<Entry> {
        match entry.kind() {
            EntryKind::Directory => Ok(entry.clone()),
            EntryKind::File => {
                let path = entry.remote_path();
                let size = self.file_size(&path)?;
                let timestamp = self.timestamp(&path)?;
                Ok(entry.with_size(size).with_timestamp(timestamp))
            }
        }
    }

    pub fn download(&self, path: &str) -> SessionResult<Vec<u8>> {
        let target = normalize_item_path(path);
        if target.is_empty() {
            return Err(SessionError::invalid_path("download", path, "missing file name"));
        }
        self.require("download", &target, EntryKind::File)?;

        let bytes = self
            .perform(&target, Verb::DownloadFile, |response| response.bytes())
            .map_err(|err| SessionError::transport("download", target.as_str(), err))?;
        debug!("downloaded {} bytes from {}", bytes.len(), target);
        Ok(bytes)
    }

    pub fn upload(&self, path: &str, bytes: &[u8]) -> SessionResult<()> {
        let target = normalize_item_path(path);
        if target.is_empty() {
            return Err(SessionError::invalid_path("upload", path, "missing file name"));
        }

        self.perform(&target, Verb::UploadFile(bytes), |_| Ok(()))
            .map_err(|err| SessionError::transport("upload", target.as_str(), err))?;
        debug!("uploaded {} bytes to {}", bytes.len(), target);
        Ok(())
    }

    pub fn delete(&self, path: &str) -> SessionResult<()> {
        let target = normalize_item_path(path);
        if target.is_empty() {
            return Err(SessionError::invalid_path("delete", path, "missing file name"));
        }
        self.require("delete", &target, EntryKind::File)?;

        self.perform(&target, Verb::DeleteFile, |_| Ok(()))
            .map_err(|err| SessionError::transport("delete", target.as_str(), err))?;
        info!("deleted {}", target);
        Ok(())
    }

    pub fn rename(&self, path: &str, kind: EntryKind, new_name: &str) -> SessionResult<()> {
        let target = normalize_item_path(path);
        if target.is_empty() {
            return Err(SessionError::invalid_path("rename", path, "cannot rename the root"));
        }
        let new_name = new_name.trim();
        if new_name.is_empty() || new_name.contains(SEPARATOR) {
            return Err(SessionError::invalid_path(
                "rename",
                new_name,
                "new name must be a bare name",
            ));
        }
        self.require("rename", &target, kind)?;

        let (parent, _) = split_item_path(&target);
        let destination = format!("{parent}{new_name}");
        self.perform(&target, Verb::Rename { to: &destination }, |_| Ok(()))
            .map_err(|err| SessionError::transport("rename", target.as_str(), err))?;
        info!("renamed {} to {}", target, destination);
        Ok(())
    }

    pub fn make_directory(&self, path: &str) -> SessionResult<()> {
        let target = normalize_item_path(path);
        if target.is_empty() {
            return Err(SessionError::invalid_path("mkdir", path, "root already exists"));
        }

        self.perform(&target, Verb::MakeDirectory, |_| Ok(()))
            .map_err(|err| SessionError::transport("mkdir", target.as_str(), err))?;
        info!("created directory {}", target);
        Ok(())
    }

    pub fn remove_directory(&self, path: &str) -> SessionResult<()> {
        let target = normalize_item_path(path);
        if target.is_empty() {
            return Err(SessionError::invalid_path("rmdir", path, "cannot remove the root"));
        }
        self.require("rmdir", &target, EntryKind::Directory)?;

        self.perform(&target, Verb::RemoveDirectory, |_| Ok(()))
            .map_err(|err| SessionError::transport("rmdir", target.as_str(), err))?;
        info!("removed directory {}", target);
        Ok(())
    }

    fn list_kind(&self, path: &str, kind: EntryKind) -> SessionResult<Vec<Entry>> {
        let listing = self.list_directory(path)?;
        Ok(listing
            .into_entries()
            .into_iter()
            .filter(|entry| entry.kind() == kind)
            .collect())
    }

    fn require(&self, operation: &'static str, path: &str, kind: EntryKind) -> SessionResult<()> {
        match self.probe(path, kind) {
            Existence::Exists => Ok(()),
            Existence::Missing => Err(SessionError::not_found(operation, format!("/{path}"))),
            Existence::Failed(err) => Err(SessionError::transport(operation, path, err)),
        }
    }

    // The response is dropped before returning, on success and on failure.
    fn perform<R>(
        &self,
        path: &str,
        verb: Verb<'_>,
        read: impl FnOnce(&mut dyn Response) -> Result<R, TransportError>,
    ) -> Result<R, TransportError> {
        let request = Request {
            verb,
            host: &self.config.host,
            port: self.config.port,
            path,
            credentials: &self.config.credentials,
            mode: self.config.mode,
        };
        debug!("{} {} via {}", verb.command(), request.url(), self.transport.name());

        let mut response = self.transport.open(&request)?;
        let result = read(response.as_mut());
        drop(response);
        result
    }
}

fn parse_size_reply(reply: &str) -> Option<u64> {
    let value = reply.trim();
    let value = value
        .strip_prefix("213 ")
        .map(str::trim_start)
        .unwrap_or(value);
    value.parse().ok()
}

// YYYYMMDDHHMMSS[.fff], optionally preceded by the 213 reply code.
fn parse_mdtm_reply(reply: &str) -> Option<NaiveDateTime> {
    let value = reply.trim();
    let value = value
        .strip_prefix("213 ")
        .map(str::trim_start)
        .unwrap_or(value);
    let digits = value.get(..14)?;
    NaiveDateTime::parse_from_str(digits, "%Y%m%d%H%M%S").ok()
}
