use std::{
    fmt::Display,
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::encoding::Encoding;
use crate::loader::{self, LoadError, LoadOptions};
use crate::models::{IniEntry, SectionId};
use crate::ordering;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Failed to merge with existing file: {0}")]
    Merge(#[source] LoadError),
    #[error("Failed to remove existing file {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Entry {key:?} in {section} cannot be written: {reason}")]
    Unrepresentable {
        section: SectionId,
        key: String,
        reason: &'static str,
    },
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How [`IniWriter::write`] treats a file that already exists.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// The existing entries are loaded and written back together with the pending ones.
    #[default]
    Add,
    /// The existing file is discarded.
    New,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    pub encoding: Encoding,
    pub mode: WriteMode,
}

impl WriteOptions {
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Collects entries and writes them out as an ini file in canonical order.
///
/// Pending entries are not deduplicated. If two entries share a section and key both are written
/// and the one added last wins when the file is loaded again.
#[derive(Debug, Default)]
pub struct IniWriter {
    pending: Vec<IniEntry>,
}

impl IniWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: IniEntry) -> &mut Self {
        self.pending.push(entry);
        self
    }

    pub fn add_all(&mut self, entries: impl IntoIterator<Item = IniEntry>) -> &mut Self {
        self.pending.extend(entries);
        self
    }

    pub fn pending(&self) -> &[IniEntry] {
        &self.pending
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Writes UTF-8 text, merging with an existing file.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), WriteError> {
        self.write_with(path, WriteOptions::default())
    }

    /// Writes the pending entries to `path`. The existing file is removed before the new content
    /// is written, so a failure part way leaves no file or a truncated one behind.
    ///
    /// Entries that would not load back unchanged are rejected before the file is touched.
    pub fn write_with(&self, path: impl AsRef<Path>, options: WriteOptions) -> Result<(), WriteError> {
        let path = path.as_ref();

        for entry in &self.pending {
            check_representable(entry)?;
        }

        let mut entries = match options.mode {
            WriteMode::Add if path.exists() => {
                let existing = load_existing(path, options.encoding)?;
                log::debug!("Merging {} existing entries from {}", existing.len(), path.display());
                existing
            }
            _ => Vec::new(),
        };
        entries.extend(self.pending.iter().cloned());

        if path.exists() {
            log::debug!("Removing existing file {}", path.display());
            fs::remove_file(path).map_err(|source| WriteError::Remove {
                path: path.to_path_buf(),
                source,
            })?;
        }

        ordering::sort_entries(&mut entries);

        let contents = render(&entries);

        fs::write(path, options.encoding.encode(&contents)).map_err(|source| {
            log::warn!("Writing {} failed: {source}", path.display());
            WriteError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;

        log::debug!("Wrote {} entries to {}", entries.len(), path.display());

        Ok(())
    }
}

fn load_existing(path: &Path, encoding: Encoding) -> Result<Vec<IniEntry>, WriteError> {
    let document = loader::read_document(path, LoadOptions::default().with_encoding(encoding))
        .map_err(WriteError::Merge)?;

    Ok(document.entries().into_iter().cloned().collect())
}

fn check_representable(entry: &IniEntry) -> Result<(), WriteError> {
    let key = entry.key();
    let value = entry.value();
    let has_line_break = |text: &str| text.contains(['\n', '\r']);

    let reason = if key.is_empty() {
        "empty key"
    } else if value.is_empty() {
        "empty value"
    } else if key.contains('=') {
        "key contains '='"
    } else if key.starts_with('#') {
        "key starts with '#'"
    } else if key.starts_with('[') && value.ends_with(']') {
        "line reads as a section header"
    } else if key.starts_with(char::is_whitespace) || value.ends_with(char::is_whitespace) {
        "leading or trailing whitespace"
    } else if has_line_break(key) || has_line_break(value) || entry.section().name().is_some_and(has_line_break) {
        "line break"
    } else {
        return Ok(());
    };

    Err(WriteError::Unrepresentable {
        section: entry.section().clone(),
        key: key.to_owned(),
        reason,
    })
}

struct Rendered<'a>(Vec<&'a IniEntry>);

impl Display for Rendered<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_entries(f, self.0.iter().copied())
    }
}

/// Renders entries that are already in canonical order as ini text.
pub fn render<'a>(entries: impl IntoIterator<Item = &'a IniEntry>) -> String {
    Rendered(entries.into_iter().collect()).to_string()
}

pub(crate) fn write_entries<'a>(
    out: &mut impl std::fmt::Write,
    entries: impl IntoIterator<Item = &'a IniEntry>,
) -> std::fmt::Result {
    let mut current_section: Option<&SectionId> = None;
    let mut first_line = true;

    for entry in entries {
        if current_section != Some(entry.section()) {
            if let SectionId::Named(name) = entry.section() {
                if !first_line {
                    writeln!(out)?;
                }
                writeln!(out, "[{name}]")?;
            }
            current_section = Some(entry.section());
        }

        if let Some(comment) = entry.comment() {
            for line in comment.split('\n') {
                writeln!(out, "# {line}")?;
            }
        }

        writeln!(out, "{entry}")?;
        first_line = false;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::encoding::Encoding;
    use crate::loader::{IniLoader, LoadOptions};
    use crate::models::{IniEntry, SectionId};
    use crate::ordering;
    use crate::writer::{IniWriter, WriteError, WriteMode, WriteOptions, render};

    #[test]
    fn render_groups_sections_and_comments() {
        let entries = [
            IniEntry::new(SectionId::Global, "name", "app"),
            IniEntry::new("db", "url", "localhost").with_comment("first line\nsecond line"),
            IniEntry::new("db", "user", "admin"),
            IniEntry::new("web", "port", "8080"),
        ];

        assert_eq!(
            render(&entries),
            "name=app\n\n[db]\n# first line\n# second line\nurl=localhost\nuser=admin\n\n[web]\nport=8080\n"
        );
    }

    #[test]
    fn render_skips_separator_before_first_line() {
        let entries = [IniEntry::new("db", "url", "localhost")];

        assert_eq!(render(&entries), "[db]\nurl=localhost\n");
        assert_eq!(render(Vec::<&IniEntry>::new()), "");
    }

    #[test]
    fn new_mode_round_trips_through_loader() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");

        let mut entries = vec![
            IniEntry::new("server", "port", "80"),
            IniEntry::new(SectionId::Global, "name", "my app").with_comment("application name"),
            IniEntry::new("Database", "url", "a = b").with_comment("one\ntwo"),
            IniEntry::new("server", "Host", "example.com"),
        ];

        let mut writer = IniWriter::new();
        writer.add_all(entries.clone());
        writer.write_with(&path, WriteOptions::default().with_mode(WriteMode::New)).unwrap();

        let mut loader = IniLoader::new();
        loader.load(&path).unwrap();

        ordering::sort_entries(&mut entries);
        let loaded: Vec<_> = loader.all_entries().unwrap().into_iter().cloned().collect();
        assert_eq!(loaded, entries);
    }

    #[test]
    fn new_mode_discards_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");
        fs::write(&path, "[old]\nkey=value\n").unwrap();

        let mut writer = IniWriter::new();
        writer.add(IniEntry::new("new", "key", "value"));
        writer.write_with(&path, WriteOptions::default().with_mode(WriteMode::New)).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[new]\nkey=value\n");
    }

    #[test]
    fn add_mode_merges_with_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");
        fs::write(&path, "[db]\n# existing\nurl=localhost\n").unwrap();

        let mut writer = IniWriter::new();
        writer.add(IniEntry::new("db", "user", "admin"));
        writer.write_with(&path, WriteOptions::default().with_mode(WriteMode::Add)).unwrap();

        let mut loader = IniLoader::new();
        loader.load(&path).unwrap();

        assert_eq!(loader.value(Some("db"), "url").unwrap(), Some("localhost"));
        assert_eq!(loader.value(Some("db"), "user").unwrap(), Some("admin"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[db]\n# existing\nurl=localhost\nuser=admin\n"
        );
    }

    #[test]
    fn add_mode_prefers_pending_value_for_same_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");
        fs::write(&path, "key=old\n").unwrap();

        let mut writer = IniWriter::new();
        writer.add(IniEntry::new(SectionId::Global, "key", "new"));
        writer.write(&path).unwrap();

        let mut loader = IniLoader::new();
        loader.load(&path).unwrap();

        assert_eq!(loader.value(None, "key").unwrap(), Some("new"));
    }

    #[test]
    fn add_mode_without_existing_file_writes_pending_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fresh.ini");

        let mut writer = IniWriter::new();
        writer.add(IniEntry::new(SectionId::Global, "key", "value"));
        writer.write_with(&path, WriteOptions::default().with_mode(WriteMode::Add)).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "key=value\n");
    }

    #[test]
    fn repeated_add_writes_do_not_retain_merged_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");
        fs::write(&path, "a=1\n").unwrap();

        let mut writer = IniWriter::new();
        writer.add(IniEntry::new(SectionId::Global, "b", "2"));
        writer.write_with(&path, WriteOptions::default().with_mode(WriteMode::Add)).unwrap();
        writer.write_with(&path, WriteOptions::default().with_mode(WriteMode::Add)).unwrap();

        assert_eq!(writer.pending().len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "a=1\nb=2\nb=2\n");
    }

    #[test]
    fn add_mode_keeps_file_that_cannot_be_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("binary.ini");
        fs::write(&path, b"key=\xFF\n").unwrap();

        let mut writer = IniWriter::new();
        writer.add(IniEntry::new(SectionId::Global, "other", "1"));

        let result = writer.write_with(&path, WriteOptions::default().with_mode(WriteMode::Add));

        assert!(matches!(result, Err(WriteError::Merge(_))));
        assert_eq!(fs::read(&path).unwrap(), b"key=\xFF\n");
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("app.ini");

        let mut writer = IniWriter::new();
        writer.add(IniEntry::new(SectionId::Global, "key", "value"));

        let result = writer.write_with(&path, WriteOptions::default().with_mode(WriteMode::New));

        assert!(matches!(result, Err(WriteError::Io { .. })));
        assert_eq!(writer.pending().len(), 1);
    }

    #[test]
    fn empty_value_is_rejected_before_touching_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");
        fs::write(&path, "[s]\nkept=1\n").unwrap();

        let mut writer = IniWriter::new();
        writer.add(IniEntry::new("s", "k", ""));

        let result = writer.write_with(&path, WriteOptions::default().with_mode(WriteMode::New));

        assert!(matches!(
            result,
            Err(WriteError::Unrepresentable { ref key, reason: "empty value", .. }) if key == "k"
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[s]\nkept=1\n");
    }

    #[test]
    fn empty_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");

        let mut writer = IniWriter::new();
        writer.add(IniEntry::new(SectionId::Global, "", "v"));

        let result = writer.write_with(&path, WriteOptions::default().with_mode(WriteMode::New));

        assert!(matches!(
            result,
            Err(WriteError::Unrepresentable { section: SectionId::Global, reason: "empty key", .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn entries_that_would_load_differently_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");

        let rejected = [
            IniEntry::new("s", "a=b", "v"),
            IniEntry::new("s", "#k", "v"),
            IniEntry::new("s", "[k", "v]"),
            IniEntry::new("s", " k", "v"),
            IniEntry::new("s", "k", "v "),
            IniEntry::new("s", "k", "one\ntwo"),
            IniEntry::new("a\nb", "k", "v"),
        ];

        for entry in rejected {
            let mut writer = IniWriter::new();
            writer.add(entry);

            assert!(matches!(writer.write(&path), Err(WriteError::Unrepresentable { .. })));
        }
        assert!(!path.exists());
    }

    #[test]
    fn clear_drops_pending_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");

        let mut writer = IniWriter::new();
        writer.add(IniEntry::new(SectionId::Global, "first", "1"));
        writer.clear();
        writer.add(IniEntry::new(SectionId::Global, "second", "2"));
        writer.write(&path).unwrap();

        assert_eq!(writer.pending().len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "second=2\n");
    }

    #[test]
    fn utf16_write_and_merge() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wide.ini");
        let options = WriteOptions::default().with_encoding(Encoding::Utf16Be);

        let mut first = IniWriter::new();
        first.add(IniEntry::new("s", "a", "あ"));
        first.write_with(&path, options).unwrap();

        let mut second = IniWriter::new();
        second.add(IniEntry::new("s", "b", "い"));
        second.write_with(&path, options.with_mode(WriteMode::Add)).unwrap();

        let mut loader = IniLoader::new();
        loader
            .load_with(&path, LoadOptions::default().with_encoding(Encoding::Utf16Be))
            .unwrap();

        assert_eq!(loader.value(Some("s"), "a").unwrap(), Some("あ"));
        assert_eq!(loader.value(Some("s"), "b").unwrap(), Some("い"));
    }
}
