//! Simulated audio upload and batch processing
//!
//! No bytes are transferred and nothing is analysed. Each accepted file runs
//! two independent timers: a progress ticker that adds a fixed step until it
//! reaches 100 (then marks the file `processing`), and a completion timer
//! that marks it `completed`. Timers only ever touch their own file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use wspm_common::uuid_utils;

/// Accepted audio file extensions (lowercase, without dot)
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["mp3", "wav", "m4a", "ogg"];

/// Largest accepted file (100 MiB)
pub const MAX_FILE_BYTES: u64 = 100 * 1024 * 1024;

/// Timer settings for the simulation
#[derive(Debug, Clone, Copy)]
pub struct UploadTiming {
    pub tick: Duration,
    pub progress_step: u8,
    /// Delay from acceptance until the file is `completed`
    pub completion_delay: Duration,
    /// Length of the "process all" batch
    pub batch_duration: Duration,
}

impl Default for UploadTiming {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(200),
            progress_step: 10,
            completion_delay: Duration::from_secs(3),
            batch_duration: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Uploading,
    Processing,
    Completed,
    Error,
}

/// File as announced by the client
#[derive(Debug, Clone, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub status: UploadStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// Snapshot for the upload page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSnapshot {
    pub files: Vec<UploadedFile>,
    pub completed: usize,
    pub total: usize,
    pub processing: bool,
}

/// Why a batch could not start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchRejection {
    AlreadyRunning,
    NothingCompleted,
}

/// Tracks simulated uploads for this process
#[derive(Debug, Clone)]
pub struct UploadTracker {
    files: Arc<RwLock<Vec<UploadedFile>>>,
    batch_running: Arc<AtomicBool>,
    timing: UploadTiming,
}

impl Default for UploadTracker {
    fn default() -> Self {
        Self::new(UploadTiming::default())
    }
}

impl UploadTracker {
    pub fn new(timing: UploadTiming) -> Self {
        Self {
            files: Arc::new(RwLock::new(Vec::new())),
            batch_running: Arc::new(AtomicBool::new(false)),
            timing,
        }
    }

    /// Register files; accepted ones start their timers immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn submit(&self, descriptors: Vec<FileDescriptor>) -> Vec<UploadedFile> {
        let mut added = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            let rejection = check_file(&descriptor);
            let file = UploadedFile {
                id: uuid_utils::short_id(),
                name: descriptor.name,
                size: descriptor.size,
                status: if rejection.is_some() {
                    UploadStatus::Error
                } else {
                    UploadStatus::Uploading
                },
                progress: 0,
                error: rejection,
                added_at: Utc::now(),
            };

            match &file.error {
                Some(reason) => warn!(file = %file.name, "Upload rejected: {}", reason),
                None => info!(file = %file.name, upload_id = %file.id, "Upload accepted"),
            }
            added.push(file);
        }

        self.files.write().await.extend(added.iter().cloned());

        for file in added.iter().filter(|f| f.status == UploadStatus::Uploading) {
            self.spawn_progress(file.id.clone());
            self.spawn_completion(file.id.clone());
        }
        added
    }

    pub async fn snapshot(&self) -> UploadSnapshot {
        let files = self.files.read().await.clone();
        UploadSnapshot {
            completed: files
                .iter()
                .filter(|f| f.status == UploadStatus::Completed)
                .count(),
            total: files.len(),
            files,
            processing: self.is_processing(),
        }
    }

    pub fn is_processing(&self) -> bool {
        self.batch_running.load(Ordering::Acquire)
    }

    /// Start the simulated batch over completed files; returns how many it covers
    pub async fn process_all(&self) -> Result<usize, BatchRejection> {
        let completed = self
            .files
            .read()
            .await
            .iter()
            .filter(|f| f.status == UploadStatus::Completed)
            .count();
        if completed == 0 {
            return Err(BatchRejection::NothingCompleted);
        }

        if self
            .batch_running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(BatchRejection::AlreadyRunning);
        }

        info!(files = completed, "Batch processing started");
        let running = self.batch_running.clone();
        let duration = self.timing.batch_duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            running.store(false, Ordering::Release);
            info!("Batch processing finished");
        });
        Ok(completed)
    }

    fn spawn_progress(&self, id: String) {
        let files = self.files.clone();
        let timing = self.timing;
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(timing.tick).await;
                let mut guard = files.write().await;
                let Some(file) = guard.iter_mut().find(|f| f.id == id) else {
                    return;
                };
                if file.status != UploadStatus::Uploading {
                    return;
                }

                let next = file.progress.saturating_add(timing.progress_step);
                if next >= 100 {
                    file.progress = 100;
                    file.status = UploadStatus::Processing;
                    debug!(upload_id = %id, "Upload reached 100%");
                    return;
                }
                file.progress = next;
            }
        });
    }

    fn spawn_completion(&self, id: String) {
        let files = self.files.clone();
        let delay = self.timing.completion_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(file) = files.write().await.iter_mut().find(|f| f.id == id) {
                file.progress = 100;
                file.status = UploadStatus::Completed;
                debug!(upload_id = %id, "Upload completed");
            }
        });
    }
}

/// Reason a file is refused, or `None` if it is acceptable
fn check_file(descriptor: &FileDescriptor) -> Option<String> {
    let extension = Path::new(&descriptor.name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension {
        Some(ext) if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) => {}
        _ => {
            return Some(format!(
                "unsupported file type (accepted: {})",
                ACCEPTED_EXTENSIONS.join(", ")
            ))
        }
    }

    if descriptor.size > MAX_FILE_BYTES {
        return Some(format!(
            "file is {} bytes; limit is {} bytes",
            descriptor.size, MAX_FILE_BYTES
        ));
    }
    None
}
