use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::models::{UpdateUploadStatusRequest, UploadStatus};
use crate::storage::Storage;

/// Stands in for spreadsheet processing. No decoding happens: after a
/// delay the upload record is marked completed with row counts estimated
/// from the file size.
pub struct UploadProcessor {
    storage: Arc<dyn Storage>,
    delay: Duration,
}

impl UploadProcessor {
    pub fn new(storage: Arc<dyn Storage>, delay: Duration) -> Self {
        Self { storage, delay }
    }

    /// Fire-and-forget: the triggering request does not await the outcome
    /// and the task cannot be cancelled.
    pub fn spawn(self, upload_id: i64, file_size: i64) {
        tokio::spawn(async move {
            tokio::time::sleep(self.delay).await;
            self.process(upload_id, file_size).await;
        });
    }

    pub async fn process(&self, upload_id: i64, file_size: i64) {
        let rows = estimated_rows(file_size);
        let update = UpdateUploadStatusRequest {
            status: UploadStatus::Completed,
            processed_rows: Some(rows),
            total_rows: Some(rows),
        };
        match self.storage.set_upload_status(upload_id, update).await {
            Ok(Some(_)) => info!("upload {} processed ({} rows)", upload_id, rows),
            Ok(None) => warn!("upload {} disappeared before processing finished", upload_id),
            Err(err) => warn!("failed to finish processing upload {}: {:?}", upload_id, err),
        }
    }
}

fn estimated_rows(file_size: i64) -> i64 {
    (file_size / 64).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewExcelUploadRequest;
    use crate::storage::MemStorage;

    #[tokio::test]
    async fn process_marks_the_upload_completed() {
        let storage: Arc<dyn Storage> = Arc::new(MemStorage::new());
        let upload = storage
            .insert_upload(NewExcelUploadRequest {
                filename: None,
                original_name: "faculty.xlsx".to_string(),
                file_size: 640,
            })
            .await
            .unwrap();

        let processor = UploadProcessor::new(storage.clone(), Duration::ZERO);
        processor.process(upload.id, upload.file_size).await;

        let uploads = storage.fetch_uploads().await.unwrap();
        assert_eq!(uploads[0].status, UploadStatus::Completed);
        assert_eq!(uploads[0].processed_rows, 10);
        assert_eq!(uploads[0].total_rows, 10);
    }

    #[test]
    fn estimated_rows_never_reports_zero() {
        assert_eq!(estimated_rows(1), 1);
        assert_eq!(estimated_rows(64), 1);
        assert_eq!(estimated_rows(6400), 100);
    }
}
