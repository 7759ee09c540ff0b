use crate::models::ThumbnailSummary;
use crate::utils::thumbnail_output_path;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, error, info};
use walkdir::WalkDir;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi", "wmv", "flv"];

// Only format.duration is wanted from the ffprobe dump.
#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Walks `folder` recursively and extracts one midpoint frame per video
/// file into `output_dir`, one file at a time. Per-file ffmpeg failures are
/// logged and counted; only missing tools or a missing folder end the run.
pub async fn generate_thumbnails(folder: &Path, output_dir: &Path) -> Result<ThumbnailSummary> {
    if !folder.is_dir() {
        return Err(anyhow!("folder does not exist: {}", folder.display()));
    }
    check_tools().await?;
    fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let mut summary = ThumbnailSummary::default();
    for video in collect_videos(folder) {
        match generate_one(&video, output_dir).await {
            Ok(()) => summary.generated += 1,
            Err(e) => {
                error!("{}: {:#}", video.display(), e);
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

/// Every file under `folder` with a known video extension, case-insensitive.
pub fn collect_videos(folder: &Path) -> Vec<PathBuf> {
    WalkDir::new(folder)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_video(path))
        .collect()
}

fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.iter().any(|v| ext.eq_ignore_ascii_case(v)))
        .unwrap_or(false)
}

async fn generate_one(video: &Path, output_dir: &Path) -> Result<()> {
    let duration = probe_duration(video).await?;
    let timestamp = if duration > 0.0 { duration / 2.0 } else { 0.0 };
    let out = thumbnail_output_path(video, output_dir);
    extract_frame(video, &out, timestamp).await?;
    info!(
        "{}: duration={:.2}s, thumbnail at t={:.2}s",
        video.display(),
        duration,
        timestamp
    );
    Ok(())
}

/// Asks ffprobe for the container duration in seconds; 0 when the container
/// doesn't report one.
async fn probe_duration(video: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .arg("-v")
        .arg("quiet")
        .arg("-print_format")
        .arg("json")
        .arg("-show_format")
        .arg("-show_streams")
        .arg(video)
        .output()
        .await
        .context("failed to run ffprobe")?;

    let probe: ProbeOutput =
        serde_json::from_slice(&output.stdout).context("unreadable ffprobe output")?;
    Ok(probe
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0))
}

async fn extract_frame(video: &Path, output_path: &Path, time_sec: f64) -> Result<()> {
    let output = Command::new("ffmpeg")
        .arg("-y")
        .arg("-ss")
        .arg(format!("{}", time_sec))
        .arg("-i")
        .arg(video)
        .arg("-vframes")
        .arg("1")
        .arg(output_path)
        .output()
        .await
        .context("failed to run ffmpeg")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("ffmpeg error: {}", stderr);
        return Err(anyhow!("ffmpeg failed to extract a frame"));
    }
    debug!("created thumbnail at {:?}", output_path);
    Ok(())
}

async fn check_tools() -> Result<()> {
    Command::new("ffmpeg")
        .arg("-version")
        .output()
        .await
        .map_err(|_| anyhow!("ffmpeg is required but not found"))?;
    Command::new("ffprobe")
        .arg("-version")
        .output()
        .await
        .map_err(|_| anyhow!("ffprobe is required but not found"))?;
    Ok(())
}
