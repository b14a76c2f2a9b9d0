//! Unified upload pipeline.
//!
//! Most callers should use [`UploadPipeline::preview`], which runs
//! size guard → file-name sanitization → classification → parsing → preview
//! on a single [`crate::types::UploadRequest`].
//!
//! - Validation failures ([`UploadError::EmptyFilename`], [`UploadError::UnsupportedFormat`],
//!   [`UploadError::PayloadTooLarge`]) are raised before any parser runs.
//! - If an [`UploadObserver`] is configured, parse start, success, failure and alerts are
//!   reported to it.

use std::fmt;
use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::error::{UploadError, UploadResult};
use crate::operations::{OperationRegistry, OperationRequest, OperationResult};
use crate::preview::{preview_table, PreviewResult};
use crate::types::{Table, UploadRequest};

use super::filename::{classify, sanitize_filename};
use super::guard::check_size;
use super::observability::{UploadContext, UploadObserver, UploadSeverity, UploadStats};

/// Parser families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Comma-separated text with a header row.
    DelimitedText,
    /// Excel/workbook container (first worksheet).
    Spreadsheet,
}

/// Parse raw bytes with the parser for `format`.
///
/// Spreadsheets are held to [`PipelineConfig::max_sheet_cells`].
pub fn parse_table(
    bytes: &[u8],
    format: TableFormat,
    config: &PipelineConfig,
) -> UploadResult<Table> {
    match format {
        TableFormat::DelimitedText => super::csv::parse_csv_bytes(bytes),
        TableFormat::Spreadsheet => parse_spreadsheet(bytes, config.max_sheet_cells()),
    }
}

fn parse_spreadsheet(bytes: &[u8], max_cells: u64) -> UploadResult<Table> {
    #[cfg(feature = "excel")]
    {
        super::excel::parse_excel_bytes_with_limit(bytes, max_cells)
    }

    #[cfg(not(feature = "excel"))]
    {
        let _ = (bytes, max_cells);
        Err(crate::error::ParseCause::ExcelDisabled.into())
    }
}

/// Column name for header cell `idx`; blank headers become `Unnamed: {idx}`.
pub(crate) fn column_name(idx: usize, raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        format!("Unnamed: {idx}")
    } else {
        trimmed.to_string()
    }
}

/// A successfully parsed upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUpload {
    /// Sanitized file name.
    pub filename: String,
    /// Parser family that produced `table`.
    pub format: TableFormat,
    /// The parsed table.
    pub table: Table,
}

/// The ingestion-and-validation pipeline plus operation dispatch.
///
/// Holds only read-only state, so one instance can serve concurrent requests.
///
/// ```rust
/// use tabular_intake::ingestion::UploadPipeline;
/// use tabular_intake::types::UploadRequest;
///
/// # fn main() -> Result<(), tabular_intake::UploadError> {
/// let pipeline = UploadPipeline::default();
/// let req = UploadRequest::new("upload.csv", "id,name\n1,Ann\n2,Bo\n");
/// let preview = pipeline.preview(&req)?;
/// assert_eq!(preview.rows, 2);
/// assert_eq!(preview.column_names, vec!["id", "name"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct UploadPipeline {
    config: PipelineConfig,
    registry: OperationRegistry,
    observer: Option<Arc<dyn UploadObserver>>,
    alert_at_or_above: UploadSeverity,
}

impl fmt::Debug for UploadPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadPipeline")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for UploadPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl UploadPipeline {
    /// Create a pipeline with the built-in operations and no observer.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            registry: OperationRegistry::with_builtins(),
            observer: None,
            alert_at_or_above: UploadSeverity::Critical,
        }
    }

    /// Attach an observer for logging/alerts.
    pub fn with_observer(mut self, observer: Arc<dyn UploadObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Severity threshold at which `on_alert` is invoked (default [`UploadSeverity::Critical`]).
    pub fn with_alert_threshold(mut self, severity: UploadSeverity) -> Self {
        self.alert_at_or_above = severity;
        self
    }

    /// Replace the operation registry.
    pub fn with_registry(mut self, registry: OperationRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The configuration this pipeline was built with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The operation registry.
    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Validate and parse an upload.
    pub fn ingest(&self, request: &UploadRequest) -> UploadResult<ParsedUpload> {
        let filename = sanitize_filename(&request.declared_filename);
        let mut ctx = UploadContext {
            filename: filename.clone(),
            format: None,
            size: request.raw_bytes.len() as u64,
        };

        let result = self.ingest_inner(request, filename, &mut ctx);
        self.report(&ctx, &result);
        result
    }

    fn ingest_inner(
        &self,
        request: &UploadRequest,
        filename: String,
        ctx: &mut UploadContext,
    ) -> UploadResult<ParsedUpload> {
        check_size(
            request.raw_bytes.len(),
            request.declared_size,
            self.config.max_upload_bytes,
        )?;

        if filename.is_empty() {
            return Err(UploadError::EmptyFilename);
        }
        let format = classify(&filename, &self.config)
            .format()
            .ok_or_else(|| UploadError::UnsupportedFormat {
                filename: filename.clone(),
            })?;
        ctx.format = Some(format);

        if let Some(obs) = self.observer.as_ref() {
            obs.on_parse_started(ctx);
        }
        let table = parse_table(&request.raw_bytes, format, &self.config)?;

        Ok(ParsedUpload {
            filename,
            format,
            table,
        })
    }

    fn report(&self, ctx: &UploadContext, result: &UploadResult<ParsedUpload>) {
        let Some(obs) = self.observer.as_ref() else {
            return;
        };
        match result {
            Ok(parsed) => obs.on_success(
                ctx,
                UploadStats {
                    rows: parsed.table.row_count(),
                    columns: parsed.table.column_count(),
                },
            ),
            Err(e) => {
                let sev = UploadSeverity::for_error(e);
                obs.on_failure(ctx, sev, e);
                if sev >= self.alert_at_or_above {
                    obs.on_alert(ctx, sev, e);
                }
            }
        }
    }

    /// Validate, parse and summarize an upload.
    pub fn preview(&self, request: &UploadRequest) -> UploadResult<PreviewResult> {
        let parsed = self.ingest(request)?;
        Ok(preview_table(
            parsed.filename,
            &parsed.table,
            self.config.preview_rows,
        ))
    }

    /// Route an operation request through the registry using the configured unknown-name policy.
    pub fn dispatch(&self, request: &OperationRequest) -> UploadResult<OperationResult> {
        self.registry.dispatch(request, self.config.unknown_operation)
    }
}
