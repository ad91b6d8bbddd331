use crate::clip_plan::TrimWindow;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::process::Command;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaInfo {
    pub duration: f64,
    pub frame_rate: f64,
}

async fn run_cmd(program: &str, args: &[String]) -> Result<()> {
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .context("Command execution failed")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let snippet = stderr.trim().chars().take(800).collect::<String>();
        return Err(anyhow::anyhow!("{} exited with {}: {}", program, output.status, snippet));
    }

    Ok(())
}

async fn ffprobe_value(path: &Path, select_video: bool, entries: &str) -> Result<String> {
    let mut cmd = Command::new("ffprobe");
    cmd.args(["-v", "error"]);
    if select_video {
        cmd.args(["-select_streams", "v:0"]);
    }
    let output = cmd
        .args([
            "-show_entries",
            entries,
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .await
        .context("ffprobe execution failed")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow::anyhow!("ffprobe failed: {}", stderr.trim()));
    }

    let text = String::from_utf8_lossy(&output.stdout);
    Ok(text.lines().next().unwrap_or_default().trim().to_string())
}

pub async fn ffprobe_duration_seconds(path: &Path) -> Result<f64> {
    let text = ffprobe_value(path, false, "format=duration").await?;
    let duration = text.parse::<f64>().unwrap_or(-1.0);
    if duration <= 0.0 {
        return Err(anyhow::anyhow!("Invalid duration {:?}", text));
    }
    Ok(duration)
}

pub async fn ffprobe_frame_rate(path: &Path) -> Result<f64> {
    let text = ffprobe_value(path, true, "stream=r_frame_rate").await?;
    parse_frame_rate(&text).ok_or_else(|| anyhow::anyhow!("Invalid frame rate {:?}", text))
}

pub async fn ffprobe_media_info(path: &Path) -> Result<MediaInfo> {
    let duration = ffprobe_duration_seconds(path).await?;
    let frame_rate = ffprobe_frame_rate(path).await?;
    Ok(MediaInfo {
        duration,
        frame_rate,
    })
}

/// Parses ffprobe rates such as `30000/1001` or `25`.
pub fn parse_frame_rate(text: &str) -> Option<f64> {
    let text = text.trim();
    let rate = match text.split_once('/') {
        Some((num, den)) => {
            let num = num.trim().parse::<f64>().ok()?;
            let den = den.trim().parse::<f64>().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => text.parse::<f64>().ok()?,
    };

    if rate.is_finite() && rate > 0.0 {
        Some(rate)
    } else {
        None
    }
}

pub fn render_clip_args(source: &Path, trim: TrimWindow, fps: f64, target: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-ss".to_string(),
        format!("{:.3}", trim.start),
        "-to".to_string(),
        format!("{:.3}", trim.end),
        "-i".to_string(),
        source.display().to_string(),
        "-vf".to_string(),
        format!("fps={}", fps),
        target.display().to_string(),
    ]
}

/// Re-samples `source` to `fps` and keeps only `trim`. Codecs are ffmpeg's
/// defaults for the target container.
pub async fn ffmpeg_render_clip(
    source: &Path,
    trim: TrimWindow,
    fps: f64,
    target: &Path,
) -> Result<()> {
    run_cmd("ffmpeg", &render_clip_args(source, trim, fps, target)).await
}
