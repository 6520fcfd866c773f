//! Processing pipeline descriptors served by the pipeline-selection modal.
//!
//! Pipeline discovery lives in the module framework outside this service; the
//! set exposed here is the static registry the modal renders from.

use serde::{Deserialize, Serialize};

/// A selectable processing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineInfo {
    pub pipeline_internal_name: String,
    pub pipeline_human_name: String,
    pub pipeline_args: Vec<String>,
}

impl PipelineInfo {
    /// The built-in pipeline registry.
    pub fn available() -> Vec<PipelineInfo> {
        vec![
            PipelineInfo {
                pipeline_internal_name: "evidence_import".to_string(),
                pipeline_human_name: "Evidence import".to_string(),
                pipeline_args: vec!["evidence_path".to_string()],
            },
            PipelineInfo {
                pipeline_internal_name: "event_log_import".to_string(),
                pipeline_human_name: "Event log import".to_string(),
                pipeline_args: vec!["log_path".to_string(), "hostname".to_string()],
            },
        ]
    }
}
