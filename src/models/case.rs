//! Case model and the closed status enumeration.

use serde::{Deserialize, Serialize};

/// The central investigative unit tracked by the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub status_id: i64,
    pub owner_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Case disposition statuses. The numeric ids are part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseStatus {
    Unknown = 0,
    FalsePositive = 1,
    TruePositiveWithImpact = 2,
    TruePositiveWithoutImpact = 3,
    NotApplicable = 4,
    Legitimate = 5,
}

impl CaseStatus {
    /// Parse a wire status id. Returns `None` for ids outside the known set.
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            0 => Some(CaseStatus::Unknown),
            1 => Some(CaseStatus::FalsePositive),
            2 => Some(CaseStatus::TruePositiveWithImpact),
            3 => Some(CaseStatus::TruePositiveWithoutImpact),
            4 => Some(CaseStatus::NotApplicable),
            5 => Some(CaseStatus::Legitimate),
            _ => None,
        }
    }

    pub fn as_id(self) -> i64 {
        self as i64
    }
}

/// Checksum over the UTF-8 encoding of a case description.
///
/// Advisory staleness token for collaborating clients, not an integrity
/// guarantee.
pub fn description_crc32(description: &str) -> u32 {
    crc32fast::hash(description.as_bytes())
}

/// Summary payload returned by `GET /case/summary/fetch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseSummary {
    pub case_description: String,
    pub crc32: u32,
}

/// Request body for `POST /case/summary/update`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSummaryRequest {
    pub case_description: String,
}

/// Request body for `POST /case/update-status`.
///
/// `status_id` is kept as raw JSON so that non-integer input is rejected with
/// the contract's generic validation error rather than a body-rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status_id: serde_json::Value,
}

impl UpdateStatusRequest {
    /// Interpret the submitted status id as an integer, if it is one.
    ///
    /// Accepts JSON numbers and numeric strings (the original form layer sent
    /// both); anything else is not a status id.
    pub fn status_id_as_int(&self) -> Option<i64> {
        match &self.status_id {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}
