//! Streaming artifact download with chunk-level progress.

use crate::error::{Result, VidJobError};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_stream::{Stream, StreamExt};

/// Cumulative progress after a chunk has been written.
#[derive(Debug, Clone, Copy)]
pub struct DownloadProgress {
    /// Bytes written so far; monotonically non-decreasing.
    pub downloaded: u64,
    /// Total size from `content-length`, when the header was present.
    pub total: Option<u64>,
}

impl DownloadProgress {
    /// Percentage of the transfer completed, when the total size is known.
    pub fn percent(&self) -> Option<f64> {
        self.total.map(|total| {
            if total == 0 {
                100.0
            } else {
                self.downloaded as f64 * 100.0 / total as f64
            }
        })
    }
}

/// A successfully persisted artifact.
#[derive(Debug, Clone)]
pub struct DownloadedArtifact {
    /// Absolute path of the written file.
    pub path: PathBuf,
    /// Final file size in bytes.
    pub bytes: u64,
}

/// Writes a chunked byte stream to `dest`, reporting progress per chunk.
///
/// The destination is created fresh, truncating any existing file. On a
/// stream error the partially written file is left on disk and the error
/// names the destination.
pub(crate) async fn write_stream<S, E, F>(
    dest: &Path,
    total: Option<u64>,
    buffer_capacity: usize,
    mut stream: S,
    mut on_chunk: F,
) -> Result<u64>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
    E: std::fmt::Display,
    F: FnMut(DownloadProgress),
{
    let file = File::create(dest).await?;
    let mut writer = BufWriter::with_capacity(buffer_capacity, file);
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| VidJobError::Download {
            status: None,
            message: format!("stream interrupted writing {}: {e}", dest.display()),
        })?;
        writer.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        on_chunk(DownloadProgress { downloaded, total });
    }

    writer.flush().await?;
    Ok(downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    type ChunkResult = std::result::Result<Bytes, std::io::Error>;

    fn chunks_of(body: &[u8], chunk_size: usize) -> Vec<ChunkResult> {
        body.chunks(chunk_size)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect()
    }

    #[tokio::test]
    async fn test_known_length_progress_is_monotone_and_complete() {
        let body = vec![0x5au8; 1_000_000];
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("artifact.mp4");

        let mut reports: Vec<DownloadProgress> = Vec::new();
        let written = write_stream(
            &dest,
            Some(body.len() as u64),
            8192,
            tokio_stream::iter(chunks_of(&body, 8192)),
            |progress| reports.push(progress),
        )
        .await
        .unwrap();

        assert_eq!(written, 1_000_000);
        assert_eq!(std::fs::metadata(&dest).unwrap().len(), 1_000_000);

        assert_eq!(reports.len(), body.len().div_ceil(8192));
        for pair in reports.windows(2) {
            assert!(pair[1].downloaded >= pair[0].downloaded);
            assert!(pair[1].percent().unwrap() >= pair[0].percent().unwrap());
        }
        let last = reports.last().unwrap();
        assert_eq!(last.downloaded, 1_000_000);
        assert_eq!(last.percent(), Some(100.0));
    }

    #[tokio::test]
    async fn test_unknown_length_writes_full_body() {
        let body: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("artifact.mp4");

        let mut percents_seen = 0;
        let written = write_stream(
            &dest,
            None,
            8192,
            tokio_stream::iter(chunks_of(&body, 8192)),
            |progress| {
                if progress.percent().is_some() {
                    percents_seen += 1;
                }
            },
        )
        .await
        .unwrap();

        assert_eq!(written, body.len() as u64);
        assert_eq!(percents_seen, 0);
        assert_eq!(std::fs::read(&dest).unwrap(), body);
    }

    #[tokio::test]
    async fn test_destination_is_overwritten_not_appended() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("artifact.mp4");
        std::fs::write(&dest, vec![0xffu8; 4096]).unwrap();

        let body = vec![0x01u8; 100];
        write_stream(
            &dest,
            Some(100),
            8192,
            tokio_stream::iter(chunks_of(&body, 64)),
            |_| {},
        )
        .await
        .unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), body);
    }

    #[tokio::test]
    async fn test_stream_error_leaves_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("artifact.mp4");

        let script: Vec<ChunkResult> = vec![
            Ok(Bytes::from_static(&[0x02; 64])),
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            )),
        ];

        let result = write_stream(&dest, Some(128), 8192, tokio_stream::iter(script), |_| {}).await;

        match result {
            Err(VidJobError::Download { status: None, message }) => {
                assert!(message.contains("artifact.mp4"));
                assert!(message.contains("connection reset"));
            }
            other => panic!("expected Download error, got {other:?}"),
        }
        // Partial output is deliberately not cleaned up.
        assert!(dest.exists());
    }

    #[test]
    fn test_percent_handles_zero_total() {
        let progress = DownloadProgress {
            downloaded: 0,
            total: Some(0),
        };
        assert_eq!(progress.percent(), Some(100.0));
    }
}
