//! Operator chat loop: one line in, one completion out, until input ends.

use crate::api::openai::CompletionService;
use crate::transcript::Transcript;
use anyhow::{Context, Result};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub const USER_MARKER: &str = "::Me: ";
pub const SERVICE_MARKER: &str = "::ChatGPT: ";
pub const SEPARATOR: &str = "--------------------------------------------------";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub prompt: String,
    pub response: String,
}

pub struct ChatSession<S, C: Write> {
    service: S,
    transcript: Transcript<C>,
}

impl<S, C> ChatSession<S, C>
where
    S: CompletionService,
    C: Write,
{
    pub fn new(service: S, transcript: Transcript<C>) -> Self {
        Self {
            service,
            transcript,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn transcript(&self) -> &Transcript<C> {
        &self.transcript
    }

    /// Reads lines from `input` until it is exhausted and returns how many
    /// exchanges completed. The first failed exchange ends the loop.
    pub async fn run<R>(&mut self, input: R) -> Result<usize>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut count = 0;

        loop {
            self.transcript.debug("")?;
            self.transcript.prompt(USER_MARKER)?;

            let Some(line) = lines
                .next_line()
                .await
                .context("Failed to read operator input")?
            else {
                self.transcript.console_line("")?;
                break;
            };

            self.exchange(&line).await?;
            count += 1;
        }

        self.transcript.flush()?;
        tracing::debug!("input closed after {} exchanges", count);
        Ok(count)
    }

    pub async fn exchange(&mut self, prompt: &str) -> Result<Exchange> {
        self.transcript.debug(SEPARATOR)?;
        self.transcript.info_quiet(&format!("{}{}", USER_MARKER, prompt))?;

        let response = self
            .service
            .complete(prompt)
            .await
            .context("Completion request failed")?;

        // Completions usually open with blank lines.
        self.transcript
            .info(&format!("{}{}", SERVICE_MARKER, response.trim()))?;
        self.transcript.debug(SEPARATOR)?;

        Ok(Exchange {
            prompt: prompt.to_string(),
            response,
        })
    }
}
