//! The extract module pulls candidate mentions out of a transcript using an
//! LLM model, one chunk at a time.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use llm::builder::LLMBuilder;
use llm::chat::{ChatMessage, ChatMessageBuilder, ChatProvider};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use rate_guard::{RateLimit, StdTokenBucket, TokenBucketBuilder};
use regex::Regex;

use crate::chunk::chunk_transcript;
use crate::constants::{BULLET_STRIPPER, DEFAULT_EXTRACTION_PROMPT, THINK_STRIPPER};

static THINK_STRIPPER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(THINK_STRIPPER).expect("Failed to compile THINK_STRIPPER regex"));

static BULLET_STRIPPER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(BULLET_STRIPPER).expect("Failed to compile BULLET_STRIPPER regex"));

/// Configuration containing shared data for extraction operations
pub struct ExtractContext<'a> {
    /// LLM model to use for extraction
    pub model: &'a dyn ChatProvider,
    /// Prompt template to use; `{transcript}` is replaced with the chunk
    pub prompt_template: Option<&'a str>,
    /// Maximum chunk size in characters, zero sends the transcript whole
    pub chunk_size: usize,
    /// Rate limiter for controlling request frequency
    pub rate_limiter: Option<&'a StdTokenBucket>,
}

/// Builds a token bucket allowing `rpm` requests per minute.
pub fn rate_limiter(rpm: Option<u32>) -> Option<StdTokenBucket> {
    rpm.and_then(|rpm| {
        let capacity = u64::from(rpm.max(1));
        let refill_interval = Duration::from_secs_f64(60.0 / capacity as f64);

        TokenBucketBuilder::builder()
            .capacity(capacity)
            .refill_amount(1_u64)
            .refill_every(refill_interval)
            .with_time(rate_guard::StdTimeSource::new())
            .with_precision::<rate_guard::Nanos>()
            .build()
            .ok()
    })
}

/// Extracts mentions from `transcript` and returns them newline-delimited.
///
/// # Arguments
///
/// * `llm_builder` - The LLM builder to create the model for processing
/// * `transcript` - Free text to extract mentions from
/// * `prompt_template` - Optional prompt template overriding the default one
/// * `chunk_size` - Maximum chunk size in characters, zero disables chunking
/// * `rpm` - Rate limit: requests per minute (default: no limit)
///
/// # Errors
///
/// Returns an error if:
/// * The LLM model fails to build
/// * Any LLM chat request fails
pub async fn extract(
    llm_builder: LLMBuilder,
    transcript: &str,
    prompt_template: Option<&str>,
    chunk_size: usize,
    rpm: Option<u32>,
) -> Result<String> {
    let model = llm_builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build LLM model: {}", e))?;
    let rate_limiter = rate_limiter(rpm);

    let ctx = ExtractContext {
        model: model.as_ref(),
        prompt_template,
        chunk_size,
        rate_limiter: rate_limiter.as_ref(),
    };

    let mentions = extract_mentions(transcript, &ctx).await?;
    info!("Extracted {} mentions", mentions.len());

    Ok(mentions.join("\n"))
}

/// Chunks `transcript`, extracts mentions from every chunk and deduplicates
/// them by exact text, keeping first-seen order.
///
/// # Errors
///
/// Returns an error if any LLM chat request fails.
pub async fn extract_mentions(transcript: &str, ctx: &ExtractContext<'_>) -> Result<Vec<String>> {
    let chunks = chunk_transcript(transcript, ctx.chunk_size);
    debug!("Transcript split into {} chunks", chunks.len());

    let mut seen = HashSet::new();
    let mut mentions = Vec::new();
    for (number, chunk) in chunks.iter().enumerate() {
        let found = extract_chunk(chunk, ctx).await?;
        debug!("Chunk {}: {} mentions", number + 1, found.len());

        for mention in found {
            if seen.insert(mention.clone()) {
                mentions.push(mention);
            }
        }
    }

    Ok(mentions)
}

/// Sends a single chunk to the model and parses its answer.
///
/// # Errors
///
/// Returns an error if the LLM chat request fails.
pub async fn extract_chunk(chunk: &str, ctx: &ExtractContext<'_>) -> Result<Vec<String>> {
    let prompt_template = ctx.prompt_template.unwrap_or(DEFAULT_EXTRACTION_PROMPT);
    let prompt = prompt_template.replace("{transcript}", chunk);

    let mut messages: Vec<ChatMessageBuilder> = vec![ChatMessage::user().content(prompt)];

    if !prompt_template.contains("{transcript}") {
        messages.push(ChatMessage::user().content(chunk));
    }

    let messages: Vec<ChatMessage> = messages
        .into_iter()
        .map(|message| message.build())
        .collect();

    if let Some(limiter) = ctx.rate_limiter {
        while limiter.try_acquire(1).is_err() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    let response = ctx
        .model
        .chat(&messages)
        .await
        .map_err(|err| anyhow::anyhow!("LLM error: {err}."))?
        .to_string();

    Ok(parse_response(&response))
}

/// Reads a model answer either as a JSON array of strings or as one mention
/// per line.
pub fn parse_response(response: &str) -> Vec<String> {
    let response = THINK_STRIPPER_REGEX.replace_all(response, "");
    let response = response.trim();

    if response.starts_with('[') {
        match serde_json::from_str::<Vec<String>>(response) {
            Ok(mentions) => return clean(mentions.iter().map(String::as_str)),
            Err(error) => warn!("Response looked like JSON but was not a string list: {error}"),
        }
    }

    clean(response.lines())
}

fn clean<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<String> {
    lines
        .map(|line| BULLET_STRIPPER_REGEX.replace(line.trim(), "").trim().to_owned())
        .filter(|line| !line.is_empty())
        .collect()
}
