//! Document assistant shapes.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub size: usize,
    #[serde(rename = "type")]
    pub mime: String,
    pub url: Option<String>,
    #[serde(rename = "storageId")]
    pub storage_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AssistantData {
    pub answer: String,
    pub file_info: FileInfo,
    pub timestamp: String,
}
