use serde_json::{Map, Value as JsonValue};

use crate::error::UploadResult;

use super::{OperationHandler, OperationResult};

/// The `summary` operation. Currently a fixed acknowledgement; the payload is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryOperation;

impl OperationHandler for SummaryOperation {
    fn run(&self, _payload: &Map<String, JsonValue>) -> UploadResult<OperationResult> {
        Ok(OperationResult::with_result(
            "Summary operation completed",
            "Data summary calculated successfully",
        ))
    }
}
