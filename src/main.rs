use anyhow::{Context, Result};
use chat_clip_tools::api::OpenAiClient;
use chat_clip_tools::chat::ChatSession;
use chat_clip_tools::config::{self, ChatConfig};
use chat_clip_tools::init;
use chat_clip_tools::transcript::Transcript;
use tokio::io::BufReader;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    config::load_dotenv();
    init::init_tracing("warn");

    let cfg = ChatConfig::from_env()?;
    let client = OpenAiClient::new(&cfg).context("Failed to build HTTP client")?;
    let transcript = Transcript::create(&cfg.log_path, std::io::stdout())
        .with_context(|| format!("Failed to open log file {}", cfg.log_path.display()))?;
    info!("model {}, transcript {}", client.model(), cfg.log_path.display());

    let mut session = ChatSession::new(client, transcript);
    let stdin = BufReader::new(tokio::io::stdin());

    let interrupted = tokio::select! {
        result = session.run(stdin) => {
            let count = result?;
            info!("input closed after {} exchanges", count);
            false
        }
        _ = tokio::signal::ctrl_c() => true,
    };

    // Closes the transcript before a pending stdin read can hold up shutdown.
    drop(session);
    if interrupted {
        info!("interrupted");
        std::process::exit(130);
    }
    Ok(())
}
