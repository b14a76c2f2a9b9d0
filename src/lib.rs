//! `tabular-intake` turns an uploaded spreadsheet or CSV file into a validated, in-memory
//! [`types::Table`] and a bounded [`preview::PreviewResult`], and dispatches named operations
//! through an extensible [`operations::OperationRegistry`].
//!
//! The primary entrypoint is [`ingestion::UploadPipeline`], built once from a
//! [`config::PipelineConfig`] and shared across requests.
//!
//! ## Pipeline
//!
//! 1. **Size guard**: payloads over [`config::PipelineConfig::max_upload_bytes`] (16 MiB by
//!    default) are rejected before anything is parsed.
//! 2. **File name**: the client file name is sanitized (directory components and unsafe
//!    characters removed, at most 200 characters). Only the sanitized name is echoed back.
//! 3. **Classification** by extension against the allow-list (`csv`, `xlsx`, `xls`).
//! 4. **Parsing** into a [`types::Table`]: first row is the header, cells keep their natural
//!    types ([`types::Value`]).
//! 5. **Preview**: row/column counts, column names and the first 10 rows.
//!
//! Failures are reported as [`UploadError`], each classified as client- or server-caused.
//!
//! ## Quick example
//!
//! ```rust
//! use tabular_intake::ingestion::UploadPipeline;
//! use tabular_intake::types::UploadRequest;
//!
//! # fn main() -> Result<(), tabular_intake::UploadError> {
//! let pipeline = UploadPipeline::default();
//! let preview = pipeline.preview(&UploadRequest::new("people.csv", "id,name\n1,Ann\n"))?;
//! assert_eq!(preview.rows, 1);
//! assert_eq!(preview.preview[0]["name"], "Ann");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: size guard, file-name handling, parsers and the unified pipeline
//! - [`types`]: table and request types
//! - [`preview`]: bounded table summaries
//! - [`operations`]: named-operation dispatch
//! - [`api`]: JSON response shapes for transports
//! - [`config`]: pipeline configuration
//! - [`error`]: the error taxonomy

pub mod api;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod operations;
pub mod preview;
pub mod types;

pub use error::{ErrorClass, ParseCause, UploadError, UploadResult};
