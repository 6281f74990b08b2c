mod document;
mod entry;
mod section;
mod section_id;

pub use document::IniDocument;
pub use entry::IniEntry;
pub use section::IniSection;
pub use section_id::SectionId;
