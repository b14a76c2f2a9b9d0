//! Upload validation and parsing.
//!
//! Most callers should use [`UploadPipeline`] (from [`unified`]) which:
//!
//! - rejects oversized payloads before anything else ([`guard`])
//! - sanitizes the client file name and classifies it by extension ([`filename`])
//! - parses the bytes into an in-memory [`crate::types::Table`]
//! - optionally reports parse start/success/failure/alerts to an [`UploadObserver`]
//!
//! Format-specific parsers are also available under:
//! - [`csv`]
//! - [`excel`] (feature `excel`)

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod filename;
pub mod guard;
pub mod observability;
pub mod unified;

pub use filename::{classify, sanitize_filename, FileClass};
pub use guard::check_size;
pub use observability::{
    CompositeObserver, FileObserver, StdErrObserver, UploadContext, UploadObserver, UploadSeverity,
    UploadStats,
};
pub use unified::{parse_table, ParsedUpload, TableFormat, UploadPipeline};
