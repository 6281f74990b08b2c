use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::encoding::{DecodeError, Encoding};
use crate::models::{IniDocument, IniEntry, IniSection};
use crate::{BlankLinePolicy, ParseError};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("reload requested before any load was attempted")]
    NoPreviousLoad,
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode {path} as {encoding}: {source}")]
    Decode {
        path: PathBuf,
        encoding: Encoding,
        #[source]
        source: DecodeError,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Returned by every accessor of an [`IniLoader`] that has no successfully loaded document.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("ini file isn't loaded")]
pub struct NotLoadedError;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub encoding: Encoding,
    pub blank_lines: BlankLinePolicy,
}

impl LoadOptions {
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_blank_lines(mut self, blank_lines: BlankLinePolicy) -> Self {
        self.blank_lines = blank_lines;
        self
    }
}

#[derive(Debug, Clone)]
struct Source {
    path: PathBuf,
    options: LoadOptions,
}

/// Loads an ini file from disk and answers queries about it.
///
/// Every load replaces the held document as a whole. A failed load leaves the loader without a
/// document, so all accessors return [`NotLoadedError`] until the next successful load.
#[derive(Debug, Default)]
pub struct IniLoader {
    document: Option<IniDocument>,
    source: Option<Source>,
}

impl IniLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a UTF-8 file.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        self.load_with(path, LoadOptions::default())
    }

    pub fn load_with(&mut self, path: impl AsRef<Path>, options: LoadOptions) -> Result<(), LoadError> {
        self.source = Some(Source {
            path: path.as_ref().to_path_buf(),
            options,
        });
        self.reload()
    }

    /// Repeats the last attempted load, whether or not it succeeded.
    pub fn reload(&mut self) -> Result<(), LoadError> {
        let Some(source) = &self.source else {
            return Err(LoadError::NoPreviousLoad);
        };

        match read_document(&source.path, source.options) {
            Ok(document) => {
                log::debug!("Loaded {}", source.path.display());
                self.document = Some(document);
                Ok(())
            }
            Err(error) => {
                log::warn!("Loading {} failed: {error}", source.path.display());
                self.document = None;
                Err(error)
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    /// Path of the last attempted load.
    pub fn path(&self) -> Option<&Path> {
        self.source.as_ref().map(|source| source.path.as_path())
    }

    pub fn document(&self) -> Result<&IniDocument, NotLoadedError> {
        self.document.as_ref().ok_or(NotLoadedError)
    }

    pub fn all_entries(&self) -> Result<Vec<&IniEntry>, NotLoadedError> {
        Ok(self.document()?.entries())
    }

    /// The key map of a section, `None` selecting the global section.
    pub fn section(&self, section: Option<&str>) -> Result<Option<&IniSection>, NotLoadedError> {
        Ok(self.document()?.get_section(section))
    }

    pub fn section_entries(&self, section: Option<&str>) -> Result<Option<Vec<&IniEntry>>, NotLoadedError> {
        Ok(self.section(section)?.map(IniSection::entries))
    }

    pub fn value(&self, section: Option<&str>, key: &str) -> Result<Option<&str>, NotLoadedError> {
        Ok(self.document()?.get_value(section, key))
    }

    pub fn contains_section(&self, section: Option<&str>) -> Result<bool, NotLoadedError> {
        Ok(self.document()?.contains_section(section))
    }

    pub fn contains_key(&self, section: Option<&str>, key: &str) -> Result<bool, NotLoadedError> {
        Ok(self.document()?.contains_key(section, key))
    }
}

pub(crate) fn read_document(path: &Path, options: LoadOptions) -> Result<IniDocument, LoadError> {
    let data = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let text = options.encoding.decode(&data).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        encoding: options.encoding,
        source,
    })?;

    Ok(crate::parse_with(&text, options.blank_lines)?)
}
