//! Pure, synchronous stages that turn a raw submission into section excerpts.

pub mod document;
pub mod header;
pub mod metadata;
pub mod section;
pub mod text;
pub mod types;

pub use document::{list_documents, unwrap};
pub use header::parse_sec_header;
pub use metadata::extract_metadata;
pub use section::{locate_section, SectionKind, SectionSpec};
pub use text::{normalize, normalize_markup};
pub use types::{
    EmbeddedDocument, FilingMetadata, FilingSubmission, MetadataField, NormalizedText,
    SectionExcerpt, SubmissionHeader,
};
