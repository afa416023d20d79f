//! Fixed-interval polling with a wall-clock deadline.
//!
//! The loop is generic over the probe so the exact sequencing (how many
//! status queries a given response sequence produces) is testable without a
//! network. [`crate::JobClient`] supplies a probe that GETs the status
//! endpoint.

use crate::error::{Result, VidJobError};
use crate::job::{JobStatus, StatusSnapshot};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// One observation of the status endpoint.
pub(crate) enum Probe {
    /// Transport failure, non-200 response, or malformed body. Retried after
    /// the interval, bounded only by the deadline.
    Transport(String),
    /// Parsed 200 body.
    Snapshot(StatusSnapshot),
}

/// Polls `probe` until the job completes, fails, or the deadline expires.
///
/// The deadline is checked against elapsed wall-clock time before each
/// iteration; a probe already in flight is never cut short. Cadence is a
/// fixed interval, not exponential backoff.
pub(crate) async fn drive<F, Fut>(
    interval: Duration,
    max_wait: Duration,
    mut probe: F,
) -> Result<StatusSnapshot>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Probe>,
{
    let start = Instant::now();

    loop {
        if start.elapsed() > max_wait {
            return Err(VidJobError::PollTimeout(max_wait));
        }

        match probe().await {
            Probe::Transport(reason) => {
                tracing::warn!(%reason, "status query failed, retrying after interval");
            }
            Probe::Snapshot(snapshot) => match snapshot.classified() {
                JobStatus::Completed => return Ok(snapshot),
                JobStatus::Failed => {
                    return Err(VidJobError::JobFailed(snapshot.failure_message()))
                }
                JobStatus::Submitted | JobStatus::InProgress => {
                    tracing::info!(
                        status = %snapshot.status,
                        progress = snapshot.progress,
                        elapsed_secs = start.elapsed().as_secs(),
                        "job still running"
                    );
                }
                JobStatus::Unknown => {
                    tracing::warn!(
                        status = %snapshot.status,
                        "unrecognized job status, treating as in progress"
                    );
                }
            },
        }

        tokio::time::sleep(interval).await;
    }
}
