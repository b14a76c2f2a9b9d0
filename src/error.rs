use std::error::Error as StdError;

use thiserror::Error;

/// Convenience result type for pipeline operations.
pub type UploadResult<T> = Result<T, UploadError>;

/// Who caused a failure, as seen by the caller of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request itself was unacceptable; resending it unchanged fails again.
    Client,
    /// The request passed validation but could not be processed.
    Server,
}

/// Error type returned by every pipeline entry point.
///
/// Validation variants carry fixed, human-readable messages. Only [`UploadError::ParseError`]
/// and [`UploadError::MalformedRequest`] surface decoder text.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The request did not contain a file part at all.
    #[error("No file provided")]
    MissingFile,

    /// The file part had an empty (or entirely unsafe) file name.
    #[error("No file selected")]
    EmptyFilename,

    /// The sanitized file name has no allow-listed extension.
    #[error("Unsupported file format for '{filename}'. Please upload Excel or CSV files.")]
    UnsupportedFormat { filename: String },

    /// The payload exceeds the configured ceiling; nothing was parsed.
    #[error("File too large: {size} bytes exceeds the limit of {limit} bytes")]
    PayloadTooLarge { size: u64, limit: u64 },

    /// The decoder rejected the payload.
    #[error("Error processing file: {0}")]
    ParseError(#[from] ParseCause),

    /// An operation request body could not be decoded into a key/value object.
    #[error("Error processing data: {message}")]
    MalformedRequest { message: String },

    /// An operation name was not registered and the registry is configured to reject it.
    #[error("Unsupported operation '{operation}'")]
    UnsupportedOperation { operation: String },
}

impl UploadError {
    /// Classify the failure as client- or server-caused.
    pub fn class(&self) -> ErrorClass {
        match self {
            UploadError::MissingFile
            | UploadError::EmptyFilename
            | UploadError::UnsupportedFormat { .. }
            | UploadError::PayloadTooLarge { .. }
            | UploadError::UnsupportedOperation { .. } => ErrorClass::Client,
            UploadError::ParseError(_) | UploadError::MalformedRequest { .. } => ErrorClass::Server,
        }
    }

    /// HTTP-equivalent status code for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            UploadError::PayloadTooLarge { .. } => 413,
            UploadError::ParseError(_) | UploadError::MalformedRequest { .. } => 500,
            UploadError::MissingFile
            | UploadError::EmptyFilename
            | UploadError::UnsupportedFormat { .. }
            | UploadError::UnsupportedOperation { .. } => 400,
        }
    }

    /// Returns `true` if an I/O error appears anywhere in the source chain.
    pub(crate) fn involves_io(&self) -> bool {
        let mut cur: Option<&(dyn StdError + 'static)> = StdError::source(self);
        while let Some(err) = cur {
            if err.is::<std::io::Error>() {
                return true;
            }
            if let Some(csv_err) = err.downcast_ref::<csv::Error>() {
                if matches!(csv_err.kind(), csv::ErrorKind::Io(_)) {
                    return true;
                }
            }
            cur = err.source();
        }
        false
    }
}

/// Underlying cause of a [`UploadError::ParseError`].
#[derive(Debug, Error)]
pub enum ParseCause {
    /// Zero-byte (or blank-only) input: there is no header row to read.
    #[error("no columns to parse from file")]
    EmptyInput,

    /// Text input was not valid UTF-8.
    #[error("invalid text encoding: {message}")]
    Encoding { message: String },

    /// CSV decoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "excel")]
    /// Workbook container or sheet decoding error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// The workbook opened but contains no worksheet.
    #[error("workbook has no worksheets")]
    NoWorksheet,

    /// Laying the first worksheet out as a table would need more cells than the budget
    /// derived from [`crate::config::PipelineConfig::max_upload_bytes`].
    #[error("worksheet needs {cells} cells, over the limit of {limit}")]
    SheetTooLarge { cells: u64, limit: u64 },

    /// Spreadsheet parsing was requested but the crate was built without `excel`.
    #[error("excel parsing not enabled (enable cargo feature 'excel')")]
    ExcelDisabled,
}
