//! JSON output formats.

use nds_trim_core::Detection;
use serde::Serialize;

#[derive(Serialize)]
pub struct FileJson {
    pub path: String,
    /// Differs from `path` when trimming a copy.
    pub target: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_len: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_len: Option<u64>,
    pub difference: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection: Option<Detection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct TrimRunJson<'a> {
    pub status: &'a str,
    pub command: &'a str,
    pub files: Vec<FileJson>,
    pub total_difference: i64,
}

#[derive(Serialize)]
pub struct ErrorJson<'a> {
    pub status: &'a str,
    pub error: String,
    pub causes: Vec<String>,
}
