use tracing_subscriber::EnvFilter;

const REQUIRED_TOOLS: &[&str] = &["ffmpeg", "ffprobe"];

/// Diagnostics go to stderr, filtered by `RUST_LOG` or `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn tool_runs(name: &str) -> bool {
    match tokio::process::Command::new(name)
        .arg("-version")
        .output()
        .await
    {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}

/// Returns the required media tools that are not runnable from `PATH`.
pub async fn missing_media_tools() -> Vec<&'static str> {
    let mut missing = Vec::new();
    for tool in REQUIRED_TOOLS {
        if !tool_runs(tool).await {
            missing.push(*tool);
        }
    }
    missing
}
