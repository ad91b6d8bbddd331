//! Clip batch executor.
//!
//! Each [`ClipJob`] is probed, validated and rendered on its own. A batch runs
//! jobs strictly in order and stops at the first failure.

use crate::clip_plan::{ClipJob, TrimWindow};
use crate::ffmpeg::{self, MediaInfo};
use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

/// Slack allowed between the trim end and the probed container duration.
const WINDOW_TOLERANCE_S: f64 = 0.001;

#[derive(Debug, Error)]
pub enum ClipError {
    #[error("speed multiplier must be positive and finite, got {0}")]
    InvalidMultiplier(f64),
    #[error("invalid trim window [{start}, {end})")]
    InvalidWindow { start: f64, end: f64 },
    #[error("source video not found: {}", .0.display())]
    SourceMissing(PathBuf),
    #[error("failed to probe {}: {reason}", .path.display())]
    Probe { path: PathBuf, reason: String },
    #[error("trim end {end}s is beyond source duration {duration:.3}s")]
    WindowOutOfRange { end: f64, duration: f64 },
    #[error("failed to render {}: {reason}", .target.display())]
    Render { target: PathBuf, reason: String },
}

#[async_trait]
pub trait MediaTool: Send + Sync {
    async fn probe(&self, path: &Path) -> anyhow::Result<MediaInfo>;

    async fn render(
        &self,
        source: &Path,
        trim: TrimWindow,
        fps: f64,
        target: &Path,
    ) -> anyhow::Result<()>;
}

/// [`MediaTool`] backed by the `ffmpeg` and `ffprobe` executables on `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ffmpeg;

#[async_trait]
impl MediaTool for Ffmpeg {
    async fn probe(&self, path: &Path) -> anyhow::Result<MediaInfo> {
        ffmpeg::ffprobe_media_info(path).await
    }

    async fn render(
        &self,
        source: &Path,
        trim: TrimWindow,
        fps: f64,
        target: &Path,
    ) -> anyhow::Result<()> {
        ffmpeg::ffmpeg_render_clip(source, trim, fps, target).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipReport {
    pub target: PathBuf,
    pub source_fps: f64,
    pub output_fps: f64,
    pub duration: f64,
}

pub fn output_frame_rate(source_fps: f64, speed_multiplier: f64) -> f64 {
    source_fps * speed_multiplier
}

pub async fn process_job<T>(tool: &T, job: &ClipJob) -> Result<ClipReport, ClipError>
where
    T: MediaTool + ?Sized,
{
    let exists = fs::metadata(&job.source)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !exists {
        return Err(ClipError::SourceMissing(job.source.clone()));
    }

    let info = tool.probe(&job.source).await.map_err(|e| ClipError::Probe {
        path: job.source.clone(),
        reason: format!("{:#}", e),
    })?;

    if job.trim.end > info.duration + WINDOW_TOLERANCE_S {
        return Err(ClipError::WindowOutOfRange {
            end: job.trim.end,
            duration: info.duration,
        });
    }

    let fps = output_frame_rate(info.frame_rate, job.speed_multiplier);
    info!(
        "Rendering {} -> {}: {:.3} fps x{} = {} fps, window {:.3}-{:.3}s",
        job.source.display(),
        job.target.display(),
        info.frame_rate,
        job.speed_multiplier,
        fps,
        job.trim.start,
        job.trim.end
    );

    let target_existed = fs::metadata(&job.target).await.is_ok();
    if let Err(err) = tool.render(&job.source, job.trim, fps, &job.target).await {
        // An earlier file at the target is not ours to delete.
        if !target_existed && fs::remove_file(&job.target).await.is_ok() {
            warn!("Removed partial output {}", job.target.display());
        }
        return Err(ClipError::Render {
            target: job.target.clone(),
            reason: format!("{:#}", err),
        });
    }

    Ok(ClipReport {
        target: job.target.clone(),
        source_fps: info.frame_rate,
        output_fps: fps,
        duration: job.trim.duration(),
    })
}

pub async fn run_batch<T>(tool: &T, jobs: &[ClipJob]) -> anyhow::Result<Vec<ClipReport>>
where
    T: MediaTool + ?Sized,
{
    let mut reports = Vec::with_capacity(jobs.len());
    for (idx, job) in jobs.iter().enumerate() {
        info!("=== Clip job {}/{}: {} ===", idx + 1, jobs.len(), job.source.display());
        let report = process_job(tool, job)
            .await
            .with_context(|| format!("clip job {}/{} failed", idx + 1, jobs.len()))?;
        info!("Wrote {} ({:.3}s at {} fps)", report.target.display(), report.duration, report.output_fps);
        reports.push(report);
    }
    Ok(reports)
}
