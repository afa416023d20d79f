//! Job state and submission request types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Classified job state as reported by the remote service.
///
/// The client never transitions a job itself; it only classifies the status
/// string from the latest poll. Anything outside the recognized set maps to
/// [`JobStatus::Unknown`] and is polled again under the in-progress policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted by the service, not yet running.
    Submitted,
    /// Generation in progress.
    InProgress,
    /// Terminal success; the artifact is ready.
    Completed,
    /// Terminal failure.
    Failed,
    /// Any status string the client does not recognize.
    Unknown,
}

impl JobStatus {
    /// Classifies a raw status string from the service.
    pub fn classify(raw: &str) -> Self {
        match raw {
            "submitted" => Self::Submitted,
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    /// Returns true once no further polling is meaningful.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns the canonical status string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a job was submitted with a reference image or text only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionMode {
    /// Text-only generation.
    Text,
    /// Generation guided by an uploaded reference image.
    Image,
}

impl SubmissionMode {
    /// Short tag used in default output filenames.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }
}

/// Supported output resolutions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VideoSize {
    /// 1280x720 landscape.
    #[default]
    Landscape,
    /// 720x1280 portrait.
    Portrait,
}

impl VideoSize {
    /// Returns the API size string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "1280x720",
            Self::Portrait => "720x1280",
        }
    }
}

/// Supported clip durations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VideoSeconds {
    /// 10 seconds.
    #[default]
    Ten,
    /// 15 seconds.
    Fifteen,
}

impl VideoSeconds {
    /// Returns the API duration string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ten => "10",
            Self::Fifteen => "15",
        }
    }
}

/// A request to generate a video, consumed once by the submitter.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    /// The text prompt describing the desired video.
    pub prompt: String,
    /// Model identifier sent to the service.
    pub model: String,
    /// Output resolution.
    pub size: VideoSize,
    /// Clip duration.
    pub seconds: VideoSeconds,
    /// Optional reference image for image-to-video generation.
    pub reference_image: Option<PathBuf>,
}

impl SubmissionRequest {
    /// Creates a new request with the given prompt and default settings.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: "sora-2".to_string(),
            size: VideoSize::default(),
            seconds: VideoSeconds::default(),
            reference_image: None,
        }
    }

    /// Sets the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the output resolution.
    pub fn with_size(mut self, size: VideoSize) -> Self {
        self.size = size;
        self
    }

    /// Sets the clip duration.
    pub fn with_seconds(mut self, seconds: VideoSeconds) -> Self {
        self.seconds = seconds;
        self
    }

    /// Sets a reference image for image-to-video generation.
    pub fn with_reference_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.reference_image = Some(path.into());
        self
    }

    /// Resolves the effective submission mode. A requested reference image
    /// that does not exist on disk degrades to text mode with a warning.
    pub(crate) fn resolve_mode(&self) -> SubmissionMode {
        match &self.reference_image {
            Some(path) if path.exists() => SubmissionMode::Image,
            Some(path) => {
                tracing::warn!(
                    path = %path.display(),
                    "reference image not found, falling back to text-only submission"
                );
                SubmissionMode::Text
            }
            None => SubmissionMode::Text,
        }
    }
}

/// Infers the multipart content type from a reference image extension.
pub(crate) fn mime_for_reference(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "image/png",
    }
}

/// One remote generation job.
///
/// Created by a successful submission; mutated only by poller observations.
#[derive(Debug, Clone)]
pub struct Job {
    /// Opaque identifier issued by the service; immutable once assigned.
    pub id: String,
    /// Last classified status.
    pub status: JobStatus,
    /// Last reported progress percentage (0-100).
    pub progress: u32,
    /// Creation timestamp (epoch seconds) reported by the service.
    pub created_at: Option<i64>,
    /// Completion timestamp (epoch seconds), set on terminal success.
    pub completed_at: Option<i64>,
    /// Artifact URL, set on terminal success.
    pub artifact_url: Option<String>,
    /// Submission mode the job was created with.
    pub mode: SubmissionMode,
}

impl Job {
    /// Default destination path: `{mode}_video_{suffix}.mp4`, where the
    /// suffix is the portion of the id after the last `_`.
    pub fn default_output_path(&self) -> PathBuf {
        let suffix = self.id.rsplit('_').next().unwrap_or(self.id.as_str());
        PathBuf::from(format!("{}_video_{}.mp4", self.mode.tag(), suffix))
    }
}

/// Deserialized body of the status endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StatusSnapshot {
    pub status: String,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub completed_at: Option<i64>,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub error: Option<StatusError>,
}

/// Error object some services attach to a failed status response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StatusError {
    #[serde(default)]
    pub message: Option<String>,
}

impl StatusSnapshot {
    pub fn classified(&self) -> JobStatus {
        JobStatus::classify(&self.status)
    }

    /// Best available failure description for a `failed` snapshot.
    pub fn failure_message(&self) -> String {
        self.failure_reason
            .clone()
            .or_else(|| self.error.as_ref().and_then(|e| e.message.clone()))
            .unwrap_or_else(|| "no failure reason reported".to_string())
    }
}
