use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to pair the remaining mentees of a run
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReconcileRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "run_id", rename = "runId")]
    pub run_id: String,
}

/// Request to persist the pairings of a run
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SavePairingsRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "run_id", rename = "runId")]
    pub run_id: String,
    #[validate(length(min = 1, max = 256))]
    #[serde(alias = "assigned_by", rename = "assignedBy", default)]
    pub assigned_by: Option<String>,
}
