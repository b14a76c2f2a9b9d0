//! Payload size ceiling enforced before any parsing work.

use crate::error::{UploadError, UploadResult};

/// Reject payloads larger than `limit` bytes.
///
/// Both the buffered length and the size declared by the transport are checked; the larger
/// of the two is reported.
pub fn check_size(actual: usize, declared: Option<u64>, limit: u64) -> UploadResult<()> {
    let size = (actual as u64).max(declared.unwrap_or(0));
    if size > limit {
        return Err(UploadError::PayloadTooLarge { size, limit });
    }
    Ok(())
}
