use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::errors::{ListingError, ListingResult};
use crate::timestamp::TimestampFields;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Unix,
    Dos,
}

impl Dialect {
    pub fn label(self) -> &'static str {
        match self {
            Self::Unix => "unix",
            Self::Dos => "dos",
        }
    }
}

#[derive(Debug)]
pub struct Grammar {
    dialect: Dialect,
    pattern: Regex,
}

impl Grammar {
    pub fn new(dialect: Dialect, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            dialect,
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn capture(&self, line: &str) -> Option<ListingMatch> {
        let caps = self.pattern.captures(line)?;
        Some(ListingMatch::from_captures(self.dialect, line, &caps))
    }
}

const UNIX_PATTERN: &str = r"(?x)
    ^(?P<is_dir>[-dlbcps])
    (?P<permission>(?:[-r][-w][-xsStT]){3})[+@.]?\s+
    (?P<filecode>\d+)\s+
    (?P<owner>\S+)\s+
    (?P<group>\S+)\s+
    (?P<size>\d+,\s*\d+|\d+)\s+
    (?P<timestamp>
        (?P<month>[A-Za-z]{3})\s+
        (?P<day>\d{1,2})\s+
        (?:(?P<hour>\d{1,2}):(?P<minute>\d{2})|(?P<year>\d{4}))
    )\s+
    (?P<name>.+)$";

const DOS_PATTERN: &str = r"(?x)
    ^(?P<timestamp>
        (?P<month>\d{2})-(?P<day>\d{2})-(?P<year>\d{2}(?:\d{2})?)\s+
        (?P<hour>\d{1,2}):(?P<minute>\d{2})\s*(?P<noon>[AaPp][Mm])
    )\s+
    (?:(?:(?P<is_dir><DIR>)|(?P<size>\d+))\s+)?
    (?P<name>.+)$";

#[derive(Debug)]
pub struct GrammarRegistry {
    grammars: Vec<Grammar>,
}

static STANDARD: LazyLock<GrammarRegistry> = LazyLock::new(|| {
    let grammars = [(Dialect::Unix, UNIX_PATTERN), (Dialect::Dos, DOS_PATTERN)]
        .into_iter()
        .map(|(dialect, pattern)| {
            Grammar::new(dialect, pattern).expect("built-in listing grammar compiles")
        })
        .collect();
    GrammarRegistry { grammars }
});

impl GrammarRegistry {
    pub fn new(grammars: Vec<Grammar>) -> Self {
        Self { grammars }
    }

    pub fn standard() -> &'static GrammarRegistry {
        &STANDARD
    }

    pub fn dialects(&self) -> Vec<Dialect> {
        self.grammars.iter().map(Grammar::dialect).collect()
    }

    pub fn classify(&self, line: &str) -> ListingResult<ListingMatch> {
        self.grammars
            .iter()
            .find_map(|grammar| grammar.capture(line))
            .ok_or_else(|| ListingError::unparseable(line))
    }
}

pub fn classify_line(line: &str) -> ListingResult<ListingMatch> {
    GrammarRegistry::standard().classify(line)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingMatch {
    pub dialect: Dialect,
    pub line: String,
    pub is_dir: String,
    pub permission: String,
    pub filecode: String,
    pub owner: String,
    pub group: String,
    pub size: String,
    pub name: String,
    pub timestamp: Option<TimestampFields>,
}

impl ListingMatch {
    fn from_captures(dialect: Dialect, line: &str, caps: &Captures<'_>) -> Self {
        let text = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        };
        let optional = |name: &str| caps.name(name).map(|m| m.as_str().to_string());

        let timestamp = caps.name("timestamp").map(|_| TimestampFields {
            month: text("month"),
            day: optional("day"),
            year: optional("year"),
            hour: optional("hour"),
            minute: optional("minute"),
            noon: optional("noon"),
        });

        Self {
            dialect,
            line: line.to_string(),
            is_dir: text("is_dir"),
            permission: text("permission"),
            filecode: text("filecode"),
            owner: text("owner"),
            group: text("group"),
            size: text("size"),
            name: text("name"),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DOS_PATTERN, Dialect, Grammar, GrammarRegistry, UNIX_PATTERN, classify_line};
    use crate::builder::build_entry;
    use crate::errors::ListingError;
    use crate::model::EntryKind;

    #[test]
    fn builtin_patterns_compile() {
        assert!(Grammar::new(Dialect::Unix, UNIX_PATTERN).is_ok());
        assert!(Grammar::new(Dialect::Dos, DOS_PATTERN).is_ok());
        assert_eq!(GrammarRegistry::standard().dialects().len(), 2);
    }

    #[test]
    fn device_lines_carry_major_minor_in_size_slot() {
        let null = classify_line("crw-rw-rw- 1 root root 1, 3 Jan 1 2001 null").expect("char device");
        assert_eq!(null.is_dir, "c");
        assert_eq!(null.size, "1, 3");
        assert_eq!(null.name, "null");

        let sda = classify_line("brw-rw---- 1 root disk 8,   0 Jan 1 2001 sda").expect("block device");
        assert_eq!(sda.is_dir, "b");
        assert_eq!(sda.owner, "root");
        assert_eq!(sda.group, "disk");
        assert_eq!(sda.name, "sda");

        let entry = build_entry("h/", "dev/", &null, 2024).expect("entry");
        assert_eq!(entry.kind(), EntryKind::Directory);
        assert_eq!(entry.size(), 0);
    }

    #[test]
    fn registry_tries_unix_before_dos() {
        assert_eq!(
            GrammarRegistry::standard().dialects(),
            vec![Dialect::Unix, Dialect::Dos]
        );
    }

    #[test]
    fn unix_line_with_year() {
        let matched = classify_line("drwxr-xr-x 2 bryancki bryancki 4096 Oct 28 2012 about")
            .expect("unix line");
        assert_eq!(matched.dialect, Dialect::Unix);
        assert_eq!(matched.is_dir, "d");
        assert_eq!(matched.permission, "rwxr-xr-x");
        assert_eq!(matched.filecode, "2");
        assert_eq!(matched.owner, "bryancki");
        assert_eq!(matched.group, "bryancki");
        assert_eq!(matched.size, "4096");
        assert_eq!(matched.name, "about");

        let timestamp = matched.timestamp.expect("timestamp captured");
        assert_eq!(timestamp.month, "Oct");
        assert_eq!(timestamp.day.as_deref(), Some("28"));
        assert_eq!(timestamp.year.as_deref(), Some("2012"));
        assert_eq!(timestamp.hour, None);
        assert_eq!(timestamp.minute, None);
    }

    #[test]
    fn unix_line_with_time_of_day_and_spaced_name() {
        let matched =
            classify_line("-rw-r--r--   1 ftp      ftp        123456 Mar  3 09:15 annual report.pdf")
                .expect("unix line");
        assert_eq!(matched.dialect, Dialect::Unix);
        assert_eq!(matched.is_dir, "-");
        assert_eq!(matched.name, "annual report.pdf");

        let timestamp = matched.timestamp.expect("timestamp captured");
        assert_eq!(timestamp.month, "Mar");
        assert_eq!(timestamp.day.as_deref(), Some("3"));
        assert_eq!(timestamp.year, None);
        assert_eq!(timestamp.hour.as_deref(), Some("09"));
        assert_eq!(timestamp.minute.as_deref(), Some("15"));
    }

    #[test]
    fn unix_symlink_keeps_arrow_in_name() {
        let matched = classify_line("lrwxrwxrwx 1 root root 7 Jan 01 2020 latest -> v1.2.3")
            .expect("symlink line");
        assert_eq!(matched.is_dir, "l");
        assert_eq!(matched.name, "latest -> v1.2.3");
    }

    #[test]
    fn dos_directory_line() {
        let matched = classify_line("10-28-12  09:15PM       <DIR>          about")
            .expect("dos line");
        assert_eq!(matched.dialect, Dialect::Dos);
        assert_eq!(matched.is_dir, "<DIR>");
        assert_eq!(matched.size, "");
        assert_eq!(matched.name, "about");

        let timestamp = matched.timestamp.expect("timestamp captured");
        assert_eq!(timestamp.month, "10");
        assert_eq!(timestamp.year.as_deref(), Some("12"));
        assert_eq!(timestamp.noon.as_deref(), Some("PM"));
    }

    #[test]
    fn dos_file_line() {
        let matched =
            classify_line("02-14-2021  11:02AM              1536 notes.txt").expect("dos line");
        assert_eq!(matched.dialect, Dialect::Dos);
        assert_eq!(matched.is_dir, "");
        assert_eq!(matched.size, "1536");
        assert_eq!(matched.name, "notes.txt");
        assert_eq!(
            matched.timestamp.and_then(|t| t.year).as_deref(),
            Some("2021")
        );
    }

    #[test]
    fn unmatched_lines_are_rejected_with_the_line() {
        for line in ["", "total 12", "this is not a listing line"] {
            let err = classify_line(line).unwrap_err();
            assert_eq!(err, ListingError::unparseable(line));
            assert_eq!(err.line(), Some(line));
        }
    }

    #[test]
    fn first_matching_grammar_wins() {
        let loose = Grammar::new(Dialect::Dos, r"^(?P<name>.+)$").expect("valid pattern");
        let strict = Grammar::new(Dialect::Unix, UNIX_PATTERN).expect("valid pattern");
        let line = "-rw-r--r-- 1 a b 10 Jan 1 2001 x";

        let loose_first = GrammarRegistry::new(vec![loose, strict]);
        assert_eq!(
            loose_first.classify(line).expect("match").dialect,
            Dialect::Dos
        );

        let strict_first = GrammarRegistry::new(vec![
            Grammar::new(Dialect::Unix, UNIX_PATTERN).expect("valid pattern"),
            Grammar::new(Dialect::Dos, r"^(?P<name>.+)$").expect("valid pattern"),
        ]);
        assert_eq!(
            strict_first.classify(line).expect("match").dialect,
            Dialect::Unix
        );
    }
}
