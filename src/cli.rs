use anyhow::Result;
use chat_clip_tools::clip::{Ffmpeg, run_batch};
use chat_clip_tools::clip_plan::ClipJobList;
use chat_clip_tools::config::{self, ClipConfig};
use chat_clip_tools::init;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    config::load_dotenv();
    init::init_tracing("info");

    let missing = init::missing_media_tools().await;
    if !missing.is_empty() {
        warn!("Not found in PATH: {}. Please install FFmpeg.", missing.join(", "));
    }

    let jobs = match ClipConfig::from_env()? {
        ClipConfig::JobsFile(path) => {
            info!("Loading clip jobs from {}", path.display());
            ClipJobList::load(&path).await?
        }
        ClipConfig::Demo(list) => list,
    };

    let reports = run_batch(&Ffmpeg, &jobs.items).await?;
    info!("All done. Wrote {} clips", reports.len());
    Ok(())
}
