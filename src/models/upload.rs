use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum UploadStatus {
    Processing,
    Completed,
    Error,
}

/// Metadata record for a spreadsheet upload. Only bookkeeping lives here;
/// the file content is never decoded.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExcelUpload {
    pub id: i64,
    pub filename: String,
    pub original_name: String,
    pub file_size: i64,
    pub status: UploadStatus,
    pub uploaded_at: String,
    pub processed_rows: i64,
    pub total_rows: i64,
}

/// Stored filename is generated server-side when the caller does not
/// provide one.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewExcelUploadRequest {
    pub filename: Option<String>,
    #[validate(length(min = 1, message = "originalName must not be empty"))]
    pub original_name: String,
    #[validate(range(min = 1, message = "fileSize must be at least 1"))]
    pub file_size: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUploadStatusRequest {
    pub status: UploadStatus,
    pub processed_rows: Option<i64>,
    pub total_rows: Option<i64>,
}
