#![warn(missing_docs)]
//! vidjob - async job client for generative video APIs.
//!
//! Drives one remote generation job through the submit → poll → download
//! pipeline used by Sora-2-style `/videos` endpoints: create the job
//! (text-only or with a reference image), poll its status at a fixed
//! interval until it reaches a terminal state or a deadline expires, then
//! stream the finished artifact to disk with chunk-level progress.
//!
//! # Quick Start
//!
//! ```no_run
//! use vidjob::{ClientConfig, JobClient, SubmissionRequest, VideoSeconds, VideoSize};
//!
//! #[tokio::main]
//! async fn main() -> vidjob::Result<()> {
//!     let config = ClientConfig::builder().build()?; // key from OPENAI_API_KEY
//!     let client = JobClient::new(config);
//!
//!     let request = SubmissionRequest::new("A dog and a cat chasing around the yard")
//!         .with_size(VideoSize::Landscape)
//!         .with_seconds(VideoSeconds::Fifteen)
//!         .with_reference_image("dog-and-cat.png");
//!
//!     let artifact = client.run(&request, None).await?;
//!     println!("saved {} ({} bytes)", artifact.path.display(), artifact.bytes);
//!     Ok(())
//! }
//! ```
//!
//! The stages are also callable individually ([`JobClient::submit`],
//! [`JobClient::poll_until_terminal`], [`JobClient::download`]) when the
//! caller wants to inspect the [`Job`] between them.

mod client;
mod config;
mod download;
mod error;
mod job;
mod poll;

pub use client::JobClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use download::{DownloadProgress, DownloadedArtifact};
pub use error::{Result, VidJobError};
pub use job::{Job, JobStatus, SubmissionMode, SubmissionRequest, VideoSeconds, VideoSize};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::client::JobClient;
    pub use crate::config::ClientConfig;
    pub use crate::error::{Result, VidJobError};
    pub use crate::job::{Job, JobStatus, SubmissionRequest, VideoSeconds, VideoSize};
}
