use chrono::NaiveDateTime;

pub const SEPARATOR: char = '/';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryAttributes {
    pub name: String,
    pub permissions: String,
    pub file_code: i64,
    pub owner: String,
    pub group: String,
    pub size: u64,
    pub timestamp: Option<NaiveDateTime>,
}

impl EntryAttributes {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: String::new(),
            file_code: -1,
            owner: String::new(),
            group: String::new(),
            size: 0,
            timestamp: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    kind: EntryKind,
    host: String,
    path: String,
    attributes: EntryAttributes,
}

impl Entry {
    pub fn new(kind: EntryKind, host: &str, path: &str, attributes: EntryAttributes) -> Self {
        Self {
            kind,
            host: normalize_host(host),
            path: normalize_dir_path(path),
            attributes,
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.attributes.name
    }

    pub fn permissions(&self) -> &str {
        &self.attributes.permissions
    }

    pub fn file_code(&self) -> i64 {
        self.attributes.file_code
    }

    pub fn owner(&self) -> &str {
        &self.attributes.owner
    }

    pub fn group(&self) -> &str {
        &self.attributes.group
    }

    pub fn size(&self) -> u64 {
        self.attributes.size
    }

    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        self.attributes.timestamp
    }

    pub fn attributes(&self) -> &EntryAttributes {
        &self.attributes
    }

    pub fn remote_path(&self) -> String {
        format!("{}{}", self.path, self.attributes.name)
    }

    pub fn canonical(&self) -> String {
        format!("ftp://{}{}{}", self.host, self.path, self.attributes.name)
    }

    pub fn formatted_size(&self) -> String {
        format_size(self.attributes.size)
    }

    pub fn parent_directory(&self) -> Option<String> {
        match self.kind {
            EntryKind::File => None,
            EntryKind::Directory => Some(parent_segment(&self.path)),
        }
    }

    pub fn with_size(&self, size: u64) -> Self {
        let mut next = self.clone();
        next.attributes.size = size;
        next
    }

    pub fn with_timestamp(&self, timestamp: NaiveDateTime) -> Self {
        let mut next = self.clone();
        next.attributes.timestamp = Some(timestamp);
        next
    }
}

pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut idx = 0usize;
    while size >= 1024.0 && idx < UNITS.len() - 1 {
        size /= 1024.0;
        idx += 1;
    }
    format!("{size:.2} {}", UNITS[idx])
}

pub fn normalize_host(host: &str) -> String {
    let trimmed = host.trim();
    let lower = trimmed.to_ascii_lowercase();
    let without_scheme = ["ftp://", "ftps://"]
        .iter()
        .find(|scheme| lower.starts_with(*scheme))
        .map(|scheme| &trimmed[scheme.len()..])
        .unwrap_or(trimmed);
    format!("{}{SEPARATOR}", without_scheme.trim_end_matches(SEPARATOR))
}

pub fn normalize_dir_path(path: &str) -> String {
    let joined = path_segments(path).collect::<Vec<_>>().join("/");
    if joined.is_empty() {
        joined
    } else {
        format!("{joined}{SEPARATOR}")
    }
}

pub fn normalize_item_path(path: &str) -> String {
    path_segments(path).collect::<Vec<_>>().join("/")
}

pub fn split_item_path(path: &str) -> (String, String) {
    let normalized = normalize_item_path(path);
    match normalized.rsplit_once(SEPARATOR) {
        Some((parent, name)) => (normalize_dir_path(parent), name.to_string()),
        None => (String::new(), normalized),
    }
}

fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty() && *segment != ".")
}

fn parent_segment(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    let trimmed = path.trim_end_matches(SEPARATOR);
    match trimmed.rsplit(SEPARATOR).next() {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => SEPARATOR.to_string(),
    }
}
