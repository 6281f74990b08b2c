use std::fmt::Display;

use thiserror::Error;

const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];
const BOM_UTF16_LE: &[u8] = &[0xFF, 0xFE];
const BOM_UTF16_BE: &[u8] = &[0xFE, 0xFF];

/// Character encoding used when reading and writing ini files.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Content is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("{0} content has an odd number of bytes")]
    TruncatedUtf16(Encoding),
    #[error("{encoding} content contains an unpaired surrogate: {source}")]
    InvalidUtf16 {
        encoding: Encoding,
        #[source]
        source: std::char::DecodeUtf16Error,
    },
}

impl Encoding {
    /// Decodes raw file content. A leading byte order mark is dropped.
    pub fn decode(self, data: &[u8]) -> Result<String, DecodeError> {
        match self {
            Self::Utf8 => {
                let data = data.strip_prefix(BOM_UTF8).unwrap_or(data);
                Ok(std::str::from_utf8(data)?.to_owned())
            }
            Self::Utf16Le => self.decode_utf16(data.strip_prefix(BOM_UTF16_LE).unwrap_or(data), u16::from_le_bytes),
            Self::Utf16Be => self.decode_utf16(data.strip_prefix(BOM_UTF16_BE).unwrap_or(data), u16::from_be_bytes),
        }
    }

    /// Encodes text for writing. UTF-16 output starts with a byte order mark, UTF-8 output does not.
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Utf16Le => BOM_UTF16_LE
                .iter()
                .copied()
                .chain(text.encode_utf16().flat_map(u16::to_le_bytes))
                .collect(),
            Self::Utf16Be => BOM_UTF16_BE
                .iter()
                .copied()
                .chain(text.encode_utf16().flat_map(u16::to_be_bytes))
                .collect(),
        }
    }

    fn decode_utf16(self, data: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String, DecodeError> {
        if data.len() % 2 != 0 {
            return Err(DecodeError::TruncatedUtf16(self));
        }

        let units = data.chunks_exact(2).map(|chunk| to_unit([chunk[0], chunk[1]]));

        char::decode_utf16(units)
            .collect::<Result<String, _>>()
            .map_err(|source| DecodeError::InvalidUtf16 { encoding: self, source })
    }
}

impl Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Utf8 => write!(f, "UTF-8"),
            Self::Utf16Le => write!(f, "UTF-16LE"),
            Self::Utf16Be => write!(f, "UTF-16BE"),
        }
    }
}
