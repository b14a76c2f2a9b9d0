//! Pipeline configuration.
//!
//! A [`PipelineConfig`] is built once at process start and handed to
//! [`crate::ingestion::UploadPipeline`]; it is never mutated afterwards.

use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;

/// Default payload ceiling: 16 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// Default number of rows returned in a preview.
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Upload bytes granted per spreadsheet cell when sizing the sheet budget.
pub const BYTES_PER_SHEET_CELL: u64 = 4;

/// What the operation dispatcher does with a name it has no handler for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownOperationPolicy {
    /// Reply with a generic "completed" acknowledgement.
    #[default]
    Acknowledge,
    /// Fail with [`crate::UploadError::UnsupportedOperation`].
    Reject,
}

/// Options controlling the upload pipeline.
///
/// Use [`Default`] for the standard limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Uploads larger than this are rejected before parsing.
    pub max_upload_bytes: u64,
    /// Lower-case extensions (without the dot) accepted by the classifier.
    ///
    /// Only extensions the classifier knows how to parse have any effect; adding e.g. `"txt"`
    /// here does not make it parseable.
    pub allowed_extensions: BTreeSet<String>,
    /// Staging directory provisioned by the transport at startup. Not used by the parse path.
    pub upload_dir: PathBuf,
    /// Maximum number of rows in a preview.
    pub preview_rows: usize,
    /// Fallback behaviour of the operation dispatcher.
    pub unknown_operation: UnknownOperationPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: ["xlsx", "xls", "csv"].into_iter().map(String::from).collect(),
            upload_dir: PathBuf::from("uploads"),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            unknown_operation: UnknownOperationPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Returns `true` if `ext` (any case) is on the allow-list.
    pub fn allows_extension(&self, ext: &str) -> bool {
        self.allowed_extensions.contains(&ext.to_ascii_lowercase())
    }

    /// Most cells a parsed worksheet may occupy once laid out as a table.
    ///
    /// Scales with [`PipelineConfig::max_upload_bytes`], so parser memory stays proportional
    /// to the largest accepted upload however sparse a workbook is.
    pub fn max_sheet_cells(&self) -> u64 {
        (self.max_upload_bytes / BYTES_PER_SHEET_CELL).max(1)
    }

    /// Create the upload staging directory if it does not exist yet.
    pub fn prepare_upload_dir(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.upload_dir)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    #[test]
    fn defaults_match_service_limits() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(cfg.preview_rows, 10);
        assert!(cfg.allows_extension("CSV"));
        assert!(cfg.allows_extension("xls"));
        assert!(!cfg.allows_extension("exe"));
        assert_eq!(cfg.unknown_operation, UnknownOperationPolicy::Acknowledge);
    }

    #[test]
    fn sheet_budget_follows_the_upload_ceiling() {
        assert_eq!(PipelineConfig::default().max_sheet_cells(), 4 * 1024 * 1024);

        let small = PipelineConfig {
            max_upload_bytes: 2,
            ..Default::default()
        };
        assert_eq!(small.max_sheet_cells(), 1);
    }

    #[test]
    fn prepare_upload_dir_is_idempotent() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("tabular-intake-uploads-{nanos}"));
        let cfg = PipelineConfig {
            upload_dir: dir.clone(),
            ..Default::default()
        };
        cfg.prepare_upload_dir().unwrap();
        cfg.prepare_upload_dir().unwrap();
        assert!(dir.is_dir());
        let _ = std::fs::remove_dir(&dir);
    }
}
