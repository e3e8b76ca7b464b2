//! Per-upload progress tracking.
//!
//! The transfer itself belongs to the external file store; this is the
//! value object its caller owns while the transfer runs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadProgress {
    Pending,
    InProgress { percent: u8 },
    Complete { url: String },
    Failed { message: String },
}

impl UploadProgress {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Failed { .. })
    }
}

/// One file's upload, keyed so many can be tracked side by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadState {
    pub key: Uuid,
    pub file_name: String,
    pub progress: UploadProgress,
}

impl UploadState {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            key: Uuid::new_v4(),
            file_name: file_name.into(),
            progress: UploadProgress::Pending,
        }
    }

    /// Record progress. Percent is capped at 100 and may not decrease.
    pub fn advance(&mut self, percent: u8) -> Result<(), CoreError> {
        let percent = percent.min(100);
        match &self.progress {
            UploadProgress::Pending => {}
            UploadProgress::InProgress { percent: current } if percent >= *current => {}
            UploadProgress::InProgress { percent: current } => {
                return Err(CoreError::Validation(format!(
                    "upload '{}' cannot go from {current}% back to {percent}%",
                    self.file_name
                )))
            }
            _ => return Err(self.finished()),
        }
        self.progress = UploadProgress::InProgress { percent };
        Ok(())
    }

    pub fn complete(&mut self, url: impl Into<String>) -> Result<(), CoreError> {
        if self.progress.is_terminal() {
            return Err(self.finished());
        }
        self.progress = UploadProgress::Complete { url: url.into() };
        Ok(())
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), CoreError> {
        if self.progress.is_terminal() {
            return Err(self.finished());
        }
        self.progress = UploadProgress::Failed {
            message: message.into(),
        };
        Ok(())
    }

    /// Resulting URL once complete.
    pub fn url(&self) -> Option<&str> {
        match &self.progress {
            UploadProgress::Complete { url } => Some(url),
            _ => None,
        }
    }

    fn finished(&self) -> CoreError {
        CoreError::Conflict(format!("upload '{}' has already finished", self.file_name))
    }
}

/// Completed URLs from a batch of uploads, in order.
pub fn completed_urls(uploads: &[UploadState]) -> Vec<String> {
    uploads
        .iter()
        .filter_map(|u| u.url().map(str::to_string))
        .collect()
}

/// Fail on the first upload still pending or in progress.
pub fn ensure_settled(uploads: &[UploadState]) -> Result<(), CoreError> {
    match uploads.iter().find(|u| !u.progress.is_terminal()) {
        Some(pending) => Err(CoreError::field(
            pending.file_name.clone(),
            "upload has not finished",
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn pending_to_complete() {
        let mut upload = UploadState::new("boiler.png");
        assert_eq!(upload.progress, UploadProgress::Pending);
        upload.advance(40).unwrap();
        upload.advance(40).unwrap();
        upload.advance(250).unwrap();
        assert_eq!(upload.progress, UploadProgress::InProgress { percent: 100 });
        upload.complete("https://cdn.example.com/boiler.png").unwrap();
        assert_eq!(upload.url(), Some("https://cdn.example.com/boiler.png"));
    }

    #[test]
    fn progress_cannot_regress() {
        let mut upload = UploadState::new("a.png");
        upload.advance(60).unwrap();
        assert_matches!(upload.advance(10), Err(CoreError::Validation(_)));
    }

    #[test]
    fn terminal_states_reject_transitions() {
        let mut upload = UploadState::new("a.png");
        upload.fail("network error").unwrap();
        assert_matches!(upload.advance(5), Err(CoreError::Conflict(_)));
        assert_matches!(upload.complete("x"), Err(CoreError::Conflict(_)));
        assert_eq!(upload.url(), None);
    }

    #[test]
    fn keys_are_unique_per_upload() {
        assert_ne!(UploadState::new("a").key, UploadState::new("a").key);
    }

    #[test]
    fn completed_urls_skips_unfinished() {
        let mut done = UploadState::new("a.png");
        done.complete("https://cdn/a.png").unwrap();
        let pending = UploadState::new("b.png");
        assert_eq!(completed_urls(&[done, pending]), vec!["https://cdn/a.png"]);
    }

    #[test]
    fn ensure_settled_names_unfinished_upload() {
        let mut failed = UploadState::new("a.png");
        failed.fail("too large").unwrap();
        let mut running = UploadState::new("b.png");
        running.advance(30).unwrap();

        assert!(ensure_settled(&[failed.clone()]).is_ok());
        assert_matches!(
            ensure_settled(&[failed, running]),
            Err(CoreError::FieldValidation { field, .. }) if field == "b.png"
        );
    }

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_value(UploadProgress::InProgress { percent: 5 }).unwrap();
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["percent"], 5);
    }
}
