//! File-name sanitization and extension-based format classification.

use crate::config::PipelineConfig;

use super::unified::TableFormat;

/// Longest sanitized file name, in characters.
pub const MAX_FILENAME_LEN: usize = 200;

/// Longest extension kept intact when a name is shortened.
const MAX_KEPT_EXTENSION_LEN: usize = 16;

/// Result of classifying a (sanitized) file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    /// Comma-separated text.
    DelimitedText,
    /// Excel/workbook container.
    Spreadsheet,
    /// Missing extension, or an extension outside the allow-list.
    Unrecognized,
}

impl FileClass {
    /// Parser family for this class, or `None` for [`FileClass::Unrecognized`].
    pub fn format(self) -> Option<TableFormat> {
        match self {
            FileClass::DelimitedText => Some(TableFormat::DelimitedText),
            FileClass::Spreadsheet => Some(TableFormat::Spreadsheet),
            FileClass::Unrecognized => None,
        }
    }
}

/// Reduce an untrusted file name to a safe, flat name.
///
/// - Drops every directory component (both `/` and `\` separators).
/// - Replaces runs of whitespace with a single `_`.
/// - Keeps only ASCII letters, digits, `_`, `-` and `.`.
/// - Strips leading/trailing `.` and `_`.
/// - Shortens the name to [`MAX_FILENAME_LEN`] characters, keeping a short extension.
///
/// The result may be empty. Sanitizing an already-sanitized name returns it unchanged.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or("");
    let joined = base.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();
    truncate_name(trim_name(&kept))
}

fn trim_name(name: &str) -> &str {
    name.trim_matches(['.', '_'])
}

// Only ASCII survives filtering, so byte offsets are character offsets.
fn truncate_name(name: &str) -> String {
    if name.len() <= MAX_FILENAME_LEN {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if ext.len() <= MAX_KEPT_EXTENSION_LEN => {
            let stem = trim_name(&stem[..MAX_FILENAME_LEN - ext.len() - 1]);
            format!("{stem}.{ext}")
        }
        _ => trim_name(&name[..MAX_FILENAME_LEN]).to_string(),
    }
}

/// Lower-case extension of `filename`, if it has a non-empty one.
pub fn extension_of(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

/// Classify a sanitized file name by its extension.
///
/// The extension must be both allow-listed in `config` and one the parser understands.
pub fn classify(filename: &str, config: &PipelineConfig) -> FileClass {
    let Some(ext) = extension_of(filename) else {
        return FileClass::Unrecognized;
    };
    if !config.allows_extension(&ext) {
        return FileClass::Unrecognized;
    }
    match ext.as_str() {
        "csv" => FileClass::DelimitedText,
        "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => FileClass::Spreadsheet,
        _ => FileClass::Unrecognized,
    }
}
