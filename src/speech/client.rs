use super::chunk::split_text;
use crate::{Error, Result, config::SpeechConfig};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Complete audio for `text`.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

const RPC_ID: &str = "jQ1olc";
const RPC_PATH: &str = "/_/TranslateWebserverUi/data/batchexecute";
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Google Translate's text-to-speech endpoint. Produces MP3 audio.
pub struct GoogleTts {
    client: reqwest::Client,
    base_url: String,
    language: String,
}

impl GoogleTts {
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
        })
    }

    async fn synthesize_chunk(&self, chunk: &str) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url, RPC_PATH);

        let response = self
            .client
            .post(&url)
            .header("Referer", format!("{}/", self.base_url))
            .form(&[("f.req", rpc_envelope(chunk, &self.language)?)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::speech(format!("TTS endpoint returned {status}")));
        }

        let body = response.text().await?;
        extract_audio(&body)
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let chunks = split_text(text);
        if chunks.is_empty() {
            return Err(Error::speech("no text to speak"));
        }

        debug!("Synthesizing speech in {} chunks", chunks.len());

        let mut audio = Vec::new();
        for chunk in &chunks {
            audio.extend(self.synthesize_chunk(chunk).await?);
        }

        Ok(audio)
    }
}

/// The `f.req` form value asking for speech of `text` in `language`.
fn rpc_envelope(text: &str, language: &str) -> Result<String> {
    let parameter = serde_json::to_string(&serde_json::json!([text, language, null, "null"]))?;
    let rpc = serde_json::json!([[[RPC_ID, parameter, null, "generic"]]]);
    Ok(serde_json::to_string(&rpc)?)
}

/// Pulls the base64 audio out of a batchexecute response body.
///
/// The body is a series of lines, some of them JSON arrays of RPC results
/// such as `[["wrb.fr","jQ1olc","[\"<base64>\"]",...]]`.
fn extract_audio(body: &str) -> Result<Vec<u8>> {
    for line in body.lines().filter(|line| line.contains(RPC_ID)) {
        let Ok(Value::Array(results)) = serde_json::from_str::<Value>(line) else {
            continue;
        };

        for result in &results {
            if result.get(1).and_then(Value::as_str) != Some(RPC_ID) {
                continue;
            }

            let payload = result
                .get(2)
                .and_then(Value::as_str)
                .ok_or_else(|| Error::speech("TTS response carried no audio"))?;
            let payload: Value = serde_json::from_str(payload)?;
            let encoded = payload
                .get(0)
                .and_then(Value::as_str)
                .ok_or_else(|| Error::speech("TTS response carried no audio"))?;

            return general_purpose::STANDARD
                .decode(encoded)
                .map_err(|e| Error::speech(format!("TTS audio is not base64: {e}")));
        }
    }

    Err(Error::speech("TTS response did not contain an audio result"))
}
