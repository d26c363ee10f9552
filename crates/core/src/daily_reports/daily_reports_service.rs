use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, error};

use super::daily_reports_model::{DailyReportInput, DailyReportRecord};
use crate::backend::{BlobStore, FileUpload, RecordStore, Repository, Table};
use crate::constants::{DAILY_REPORT_PHOTO_PREFIX, DAILY_REPORT_PHOTO_SLOTS, GALLERY_BUCKET};
use crate::errors::{Error, Result, ValidationError};
use crate::session::CurrentUser;
use crate::utils::text::underscore_whitespace;

/// Object path of a daily report photo:
/// `daily-reports/{child}/report_{slot}/{millis}_{file name}` with whitespace
/// runs in the file name replaced by `_`.
pub fn photo_path(child_id: &str, slot: u8, timestamp_millis: i64, file_name: &str) -> String {
    format!(
        "{}/{}/report_{}/{}_{}",
        DAILY_REPORT_PHOTO_PREFIX,
        child_id,
        slot,
        timestamp_millis,
        underscore_whitespace(file_name)
    )
}

/// Service for creating daily reports.
pub struct DailyReportService {
    repository: Repository,
    blobs: Arc<dyn BlobStore>,
}

impl DailyReportService {
    pub fn new(store: Arc<dyn RecordStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            repository: Repository::new(store, Table::DailyReports),
            blobs,
        }
    }

    /// Creates a report authored by `actor`.
    ///
    /// Photos are uploaded first, one per slot. Any upload fault aborts
    /// before the report row is written.
    pub async fn create_report(
        &self,
        input: DailyReportInput,
        photos: Vec<FileUpload>,
        actor: &CurrentUser,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let staff_id = actor.staff_id.clone().ok_or_else(|| {
            ValidationError::InvalidInput(
                "Cannot create report: Staff profile not loaded or staff ID missing.".to_string(),
            )
        })?;
        input.validate()?;
        if photos.len() > usize::from(DAILY_REPORT_PHOTO_SLOTS) {
            return Err(ValidationError::InvalidInput(format!(
                "A daily report holds at most {} photos.",
                DAILY_REPORT_PHOTO_SLOTS
            ))
            .into());
        }

        let millis = now.timestamp_millis();
        let mut urls = Vec::with_capacity(photos.len());
        for (slot, photo) in (1..=DAILY_REPORT_PHOTO_SLOTS).zip(photos) {
            let path = photo_path(&input.child_id, slot, millis, &photo.file_name);
            debug!("Uploading report photo to {}/{}", GALLERY_BUCKET, path);
            self.blobs
                .upload(GALLERY_BUCKET, &path, photo)
                .await
                .map_err(|e| {
                    error!("Report photo upload failed for {}: {}", path, e);
                    match e {
                        Error::Upload(_) => e,
                        other => Error::Upload(other.to_string()),
                    }
                })?;
            urls.push(self.blobs.public_url(GALLERY_BUCKET, &path)?);
        }

        let mut urls = urls.into_iter();
        let record = DailyReportRecord {
            input,
            staff_id,
            photo_url_1: urls.next(),
            photo_url_2: urls.next(),
        };
        self.repository.insert(&record).await?;
        Ok(())
    }
}
