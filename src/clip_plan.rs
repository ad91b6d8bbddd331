use crate::clip::ClipError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Kept range `[start, end)` of a source clip, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimWindow {
    pub start: f64,
    pub end: f64,
}

impl TrimWindow {
    pub fn new(start: f64, end: f64) -> Result<Self, ClipError> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 || end <= start {
            return Err(ClipError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// One source-to-target transformation. Fields are fixed once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipJob {
    pub source: PathBuf,
    pub target: PathBuf,
    /// Factor applied to the source frame rate. Timing is not changed.
    pub speed_multiplier: f64,
    pub trim: TrimWindow,
}

impl ClipJob {
    pub fn new(
        source: impl Into<PathBuf>,
        target: impl Into<PathBuf>,
        speed_multiplier: f64,
        start: f64,
        end: f64,
    ) -> Result<Self, ClipError> {
        if !speed_multiplier.is_finite() || speed_multiplier <= 0.0 {
            return Err(ClipError::InvalidMultiplier(speed_multiplier));
        }
        Ok(Self {
            source: source.into(),
            target: target.into(),
            speed_multiplier,
            trim: TrimWindow::new(start, end)?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClipJobList {
    pub items: Vec<ClipJob>,
}

#[derive(Debug, Deserialize)]
struct ClipJobEntry {
    source: PathBuf,
    target: PathBuf,
    speed_multiplier: f64,
    start: f64,
    end: f64,
}

#[derive(Debug, Deserialize)]
struct ClipJobRoot {
    jobs: Vec<ClipJobEntry>,
}

impl ClipJobList {
    pub fn from_json(text: &str) -> Result<Self> {
        let root: ClipJobRoot =
            serde_json::from_str(text).with_context(|| "Failed to parse clip jobs JSON")?;

        let mut items = Vec::with_capacity(root.jobs.len());
        for (idx, entry) in root.jobs.into_iter().enumerate() {
            let job = ClipJob::new(
                entry.source,
                entry.target,
                entry.speed_multiplier,
                entry.start,
                entry.end,
            )
            .with_context(|| format!("clip job #{}", idx + 1))?;
            items.push(job);
        }
        Ok(Self { items })
    }

    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read clip jobs: {}", path.as_ref().display()))?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_rejects_empty_and_negative() {
        assert!(TrimWindow::new(5.0, 5.0).is_err());
        assert!(TrimWindow::new(-1.0, 5.0).is_err());
        assert!(TrimWindow::new(0.0, f64::NAN).is_err());
        assert_eq!(TrimWindow::new(1.5, 4.0).unwrap().duration(), 2.5);
    }

    #[test]
    fn job_rejects_non_positive_multiplier() {
        assert!(matches!(
            ClipJob::new("a.mp4", "b.mp4", 0.0, 0.0, 1.0),
            Err(ClipError::InvalidMultiplier(_))
        ));
        assert!(ClipJob::new("a.mp4", "b.mp4", -2.0, 0.0, 1.0).is_err());
        assert!(ClipJob::new("a.mp4", "b.mp4", f64::INFINITY, 0.0, 1.0).is_err());
    }

    #[test]
    fn parses_jobs_file_in_order() {
        let text = r#"{"jobs":[
            {"source":"in1.mp4","target":"out1.mp4","speed_multiplier":2.0,"start":0,"end":25},
            {"source":"in2.mp4","target":"out2.mp4","speed_multiplier":1.5,"start":3.5,"end":30}
        ]}"#;
        let list = ClipJobList::from_json(text).unwrap();
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].target, PathBuf::from("out1.mp4"));
        assert_eq!(list.items[1].trim, TrimWindow { start: 3.5, end: 30.0 });
        assert_eq!(list.items[1].speed_multiplier, 1.5);
    }

    #[test]
    fn jobs_file_names_bad_entry() {
        let text = r#"{"jobs":[
            {"source":"a","target":"b","speed_multiplier":2.0,"start":0,"end":5},
            {"source":"c","target":"d","speed_multiplier":2.0,"start":9,"end":5}
        ]}"#;
        let err = ClipJobList::from_json(text).unwrap_err();
        assert!(format!("{:#}", err).contains("clip job #2"));
    }

    #[tokio::test]
    async fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.json");
        tokio::fs::write(
            &path,
            r#"{"jobs":[{"source":"s","target":"t","speed_multiplier":2.0,"start":0,"end":1}]}"#,
        )
        .await
        .unwrap();
        let list = ClipJobList::load(&path).await.unwrap();
        assert_eq!(list.items.len(), 1);
        assert!(ClipJobList::load(dir.path().join("missing.json")).await.is_err());
    }
}
