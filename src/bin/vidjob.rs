//! CLI for vidjob - submit a generation job, poll it, download the artifact.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use vidjob::{ClientConfig, JobClient, SubmissionRequest, VideoSeconds, VideoSize};

#[derive(Parser)]
#[command(name = "vidjob")]
#[command(about = "Generate a video via an async media job API (submit, poll, download)")]
#[command(version)]
struct Cli {
    /// The text prompt describing the video
    prompt: String,

    /// Reference image for image-to-video generation
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Output file path (defaults to a name derived from the job id)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output resolution
    #[arg(long, value_enum, default_value = "1280x720")]
    size: SizeArg,

    /// Clip duration in seconds
    #[arg(long, value_enum, default_value = "10")]
    seconds: SecondsArg,

    /// Model identifier
    #[arg(long, default_value = "sora-2")]
    model: String,

    /// Base URL of the job-creation endpoint
    #[arg(long)]
    base_url: Option<String>,

    /// Seconds between status polls
    #[arg(long, default_value_t = 5)]
    poll_interval: u64,

    /// Maximum seconds to wait for the job to finish
    #[arg(long, default_value_t = 600)]
    max_wait: u64,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SizeArg {
    #[value(name = "1280x720")]
    Landscape,
    #[value(name = "720x1280")]
    Portrait,
}

impl From<SizeArg> for VideoSize {
    fn from(arg: SizeArg) -> Self {
        match arg {
            SizeArg::Landscape => VideoSize::Landscape,
            SizeArg::Portrait => VideoSize::Portrait,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SecondsArg {
    #[value(name = "10")]
    Ten,
    #[value(name = "15")]
    Fifteen,
}

impl From<SecondsArg> for VideoSeconds {
    fn from(arg: SecondsArg) -> Self {
        match arg {
            SecondsArg::Ten => VideoSeconds::Ten,
            SecondsArg::Fifteen => VideoSeconds::Fifteen,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vidjob=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut builder = ClientConfig::builder()
        .poll_interval(Duration::from_secs(cli.poll_interval))
        .max_wait(Duration::from_secs(cli.max_wait));
    if let Some(base_url) = cli.base_url {
        builder = builder.base_url(base_url);
    }
    let client = JobClient::new(builder.build()?);

    let mut request = SubmissionRequest::new(&cli.prompt)
        .with_model(&cli.model)
        .with_size(cli.size.into())
        .with_seconds(cli.seconds.into());
    if let Some(image) = cli.image {
        request = request.with_reference_image(image);
    }

    let artifact = client.run(&request, cli.output.as_deref()).await?;

    if cli.json {
        let result = serde_json::json!({
            "success": true,
            "output": artifact.path.display().to_string(),
            "size_bytes": artifact.bytes,
            "model": cli.model,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Downloaded video: {} ({} bytes)",
            artifact.path.display(),
            artifact.bytes
        );
    }

    Ok(())
}
