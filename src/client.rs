//! The job client: submit, poll until terminal, download.

use crate::config::ClientConfig;
use crate::download::{self, DownloadProgress, DownloadedArtifact};
use crate::error::{Result, VidJobError};
use crate::job::{
    mime_for_reference, Job, JobStatus, StatusSnapshot, SubmissionMode, SubmissionRequest,
};
use crate::poll::{self, Probe};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Client for one remote generation service.
///
/// Drives a single job at a time through the submit → poll → download
/// pipeline; there is no shared state across jobs beyond the HTTP connection
/// pool.
pub struct JobClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl JobClient {
    /// Creates a client from the given configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.config.api_key)
    }

    /// Submits a generation job.
    ///
    /// A reference image that exists is uploaded as the `input_reference`
    /// multipart part; a missing one degrades the call to text-only mode
    /// with a warning. Any non-200 response or transport failure surfaces as
    /// [`VidJobError::Submission`] with no retry.
    pub async fn submit(&self, request: &SubmissionRequest) -> Result<Job> {
        let mode = request.resolve_mode();
        let form = self.build_form(request, mode).await?;

        tracing::info!(
            mode = mode.tag(),
            size = request.size.as_str(),
            seconds = request.seconds.as_str(),
            model = %request.model,
            "submitting generation job"
        );

        let response = self
            .client
            .post(&self.config.base_url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|e| VidJobError::Submission {
                status: None,
                body: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(VidJobError::Submission {
                status: Some(status),
                body,
            });
        }

        let created: SubmitResponse = response.json().await?;
        tracing::info!(job_id = %created.id, status = %created.status, "job accepted");

        Ok(Job {
            id: created.id,
            status: JobStatus::classify(&created.status),
            progress: 0,
            created_at: created.created_at,
            completed_at: None,
            artifact_url: None,
            mode,
        })
    }

    async fn build_form(
        &self,
        request: &SubmissionRequest,
        mode: SubmissionMode,
    ) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new()
            .text("prompt", request.prompt.clone())
            .text("model", request.model.clone())
            .text("size", request.size.as_str())
            .text("seconds", request.seconds.as_str());

        if let (SubmissionMode::Image, Some(path)) = (mode, request.reference_image.as_ref()) {
            let data = tokio::fs::read(path).await?;
            let filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("reference.png")
                .to_string();
            let part = reqwest::multipart::Part::bytes(data)
                .file_name(filename)
                .mime_str(mime_for_reference(path))
                .map_err(|e| VidJobError::InvalidRequest(e.to_string()))?;
            form = form.part("input_reference", part);
        }

        Ok(form)
    }

    /// Polls the status endpoint until the job reaches a terminal state,
    /// recording the terminal-success observation on `job`.
    ///
    /// Transport failures and non-200 status responses are logged and
    /// retried at the fixed interval; only the deadline bounds them. A
    /// `failed` report returns [`VidJobError::JobFailed`] immediately.
    pub async fn poll_until_terminal(&self, job: &mut Job) -> Result<()> {
        match job.status {
            JobStatus::Completed => return Ok(()),
            JobStatus::Failed => {
                return Err(VidJobError::JobFailed("job already reported failed".into()))
            }
            _ => {}
        }

        let url = format!("{}/{}", self.config.base_url, job.id);
        let snapshot = poll::drive(self.config.poll_interval, self.config.max_wait, || {
            let client = self.client.clone();
            let url = url.clone();
            let auth = self.auth_header();
            async move { probe_status(client, url, auth).await }
        })
        .await?;

        job.status = JobStatus::Completed;
        job.progress = snapshot.progress;
        job.completed_at = snapshot.completed_at;
        job.artifact_url = snapshot.url;
        Ok(())
    }

    /// Streams the artifact of a completed job to `dest`, or to
    /// [`Job::default_output_path`] when `dest` is `None`. Progress is
    /// reported through `tracing` at debug level.
    pub async fn download(&self, job: &Job, dest: Option<&Path>) -> Result<DownloadedArtifact> {
        self.download_with(job, dest, |progress| match progress.percent() {
            Some(percent) => tracing::debug!(
                downloaded = progress.downloaded,
                total = progress.total,
                "download progress: {percent:.1}%"
            ),
            None => tracing::debug!(downloaded = progress.downloaded, "download progress"),
        })
        .await
    }

    /// Like [`JobClient::download`], invoking `on_progress` after each
    /// written chunk.
    pub async fn download_with(
        &self,
        job: &Job,
        dest: Option<&Path>,
        on_progress: impl FnMut(DownloadProgress),
    ) -> Result<DownloadedArtifact> {
        let dest: PathBuf = match dest {
            Some(path) => path.to_path_buf(),
            None => job.default_output_path(),
        };

        let url = format!("{}/{}/content", self.config.base_url, job.id);
        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| VidJobError::Download {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let message = response.text().await.unwrap_or_default();
            return Err(VidJobError::Download {
                status: Some(status),
                message,
            });
        }

        let total = response.content_length();
        tracing::info!(job_id = %job.id, dest = %dest.display(), total_bytes = ?total, "downloading artifact");

        let bytes = download::write_stream(
            &dest,
            total,
            self.config.chunk_size,
            response.bytes_stream(),
            on_progress,
        )
        .await?;

        let path = dest.canonicalize().unwrap_or(dest);
        tracing::info!(path = %path.display(), bytes, "artifact saved");
        Ok(DownloadedArtifact { path, bytes })
    }

    /// Runs the full submit → poll → download pipeline, stopping at the
    /// first fatal error.
    pub async fn run(
        &self,
        request: &SubmissionRequest,
        dest: Option<&Path>,
    ) -> Result<DownloadedArtifact> {
        let mut job = self.submit(request).await?;
        self.poll_until_terminal(&mut job).await?;
        self.download(&job, dest).await
    }
}

/// One status query. All failure shapes collapse into [`Probe::Transport`]
/// so the poll loop retries them under the deadline.
async fn probe_status(client: reqwest::Client, url: String, auth: String) -> Probe {
    let response = match client.get(&url).header("Authorization", auth).send().await {
        Ok(response) => response,
        Err(e) => return Probe::Transport(e.to_string()),
    };

    let status = response.status().as_u16();
    if status != 200 {
        let body = response.text().await.unwrap_or_default();
        return Probe::Transport(format!("status query returned HTTP {status}: {body}"));
    }

    match response.json::<StatusSnapshot>().await {
        Ok(snapshot) => Probe::Snapshot(snapshot),
        Err(e) => Probe::Transport(format!("malformed status body: {e}")),
    }
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: String,
    status: String,
    #[serde(default)]
    created_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{VideoSeconds, VideoSize};
    use bytes::Bytes;

    fn test_config() -> ClientConfig {
        ClientConfig::builder()
            .api_key("sk-test")
            .base_url("https://example.com/v1/videos")
            .build()
            .unwrap()
    }

    #[test]
    fn test_submit_response_deserialization() {
        let json = r#"{"id": "video_abc123", "status": "submitted", "created_at": 1760000000}"#;
        let response: SubmitResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.id, "video_abc123");
        assert_eq!(response.status, "submitted");
        assert_eq!(response.created_at, Some(1_760_000_000));
    }

    #[test]
    fn test_submit_response_without_created_at() {
        let json = r#"{"id": "video_abc123", "status": "submitted"}"#;
        let response: SubmitResponse = serde_json::from_str(json).unwrap();
        assert!(response.created_at.is_none());
    }

    #[test]
    fn test_status_url_shapes() {
        let config = test_config();
        let id = "video_abc123";
        assert_eq!(
            format!("{}/{}", config.base_url, id),
            "https://example.com/v1/videos/video_abc123"
        );
        assert_eq!(
            format!("{}/{}/content", config.base_url, id),
            "https://example.com/v1/videos/video_abc123/content"
        );
    }

    #[tokio::test]
    async fn test_completed_job_is_not_repolled() {
        let client = JobClient::new(test_config());
        let mut job = Job {
            id: "video_abc123".to_string(),
            status: JobStatus::Completed,
            progress: 100,
            created_at: None,
            completed_at: Some(1_760_000_300),
            artifact_url: Some("https://example.com/final".to_string()),
            mode: SubmissionMode::Text,
        };
        // Returns without touching the network.
        client.poll_until_terminal(&mut job).await.unwrap();
        assert_eq!(job.artifact_url.as_deref(), Some("https://example.com/final"));
    }

    #[tokio::test]
    async fn test_failed_job_is_not_repolled() {
        let client = JobClient::new(test_config());
        let mut job = Job {
            id: "video_abc123".to_string(),
            status: JobStatus::Failed,
            progress: 0,
            created_at: None,
            completed_at: None,
            artifact_url: None,
            mode: SubmissionMode::Text,
        };
        let result = client.poll_until_terminal(&mut job).await;
        assert!(matches!(result, Err(VidJobError::JobFailed(_))));
    }

    /// Engine-level end-to-end: an immediately completed job drives a
    /// download to the id-derived default path.
    #[tokio::test(start_paused = true)]
    async fn test_pipeline_engines_end_to_end() {
        let snapshot = poll::drive(
            std::time::Duration::from_secs(5),
            std::time::Duration::from_secs(600),
            || async {
                Probe::Snapshot(StatusSnapshot {
                    status: "completed".to_string(),
                    progress: 100,
                    url: Some("https://example.com/v1/videos/video_abc123/content".to_string()),
                    completed_at: Some(1_760_000_300),
                    failure_reason: None,
                    error: None,
                })
            },
        )
        .await
        .unwrap();

        let request = SubmissionRequest::new("A dog and a cat chasing around the yard")
            .with_size(VideoSize::Landscape)
            .with_seconds(VideoSeconds::Fifteen);
        assert_eq!(request.size.as_str(), "1280x720");
        assert_eq!(request.seconds.as_str(), "15");

        let job = Job {
            id: "video_abc123".to_string(),
            status: JobStatus::Completed,
            progress: snapshot.progress,
            created_at: Some(1_760_000_000),
            completed_at: snapshot.completed_at,
            artifact_url: snapshot.url,
            mode: SubmissionMode::Image,
        };
        assert!(job.artifact_url.is_some());

        let filename = job.default_output_path();
        assert!(filename.to_string_lossy().contains("abc123"));

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join(filename);
        let body = vec![0x6du8; 32_768];
        let chunks: Vec<std::result::Result<Bytes, std::io::Error>> = body
            .chunks(8192)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();

        let bytes = download::write_stream(
            &dest,
            Some(body.len() as u64),
            8192,
            tokio_stream::iter(chunks),
            |_| {},
        )
        .await
        .unwrap();

        assert_eq!(bytes, body.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), body);
    }
}
