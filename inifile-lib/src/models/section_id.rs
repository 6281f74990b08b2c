use std::fmt::Display;

/// Identifies the section an entry belongs to. Key/value lines that appear before any `[name]`
/// header live in the implicit global section.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub enum SectionId {
    #[default]
    Global,
    Named(String),
}

impl SectionId {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Global => None,
            Self::Named(name) => Some(name),
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }
}

impl From<Option<&str>> for SectionId {
    fn from(name: Option<&str>) -> Self {
        name.map_or(Self::Global, Self::named)
    }
}

impl From<&str> for SectionId {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for SectionId {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => write!(f, "<global>"),
            Self::Named(name) => write!(f, "[{name}]"),
        }
    }
}
