//! AI completion gateway: one entry point normalizing three upstream
//! chat-completion protocols into a single request/response contract.
//!
//! Each supported provider maps to a fixed endpoint path, a default model,
//! a request-body shape, and an authentication convention (bearer header
//! for DeepSeek and Copilot, API key as a URL query parameter for Gemini).
//! One outbound POST per call - no caching, no retry, no streaming of
//! partial tokens. The outbound call carries a bounded timeout from
//! [`GatewayConfig`](crate::config::GatewayConfig) so a stalled provider
//! cannot hang the request indefinitely.

use crate::config::GatewayConfig;
use crate::errors::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Supported upstream chat-completion providers.
///
/// Adding a provider is a local, type-checked change: extend the enum and
/// the exhaustive matches below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Deepseek,
    Gemini,
    Copilot,
}

impl Provider {
    /// Parse the wire tag of a gateway request. Any tag outside the
    /// supported set fails immediately - no upstream call is attempted.
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "deepseek" => Ok(Provider::Deepseek),
            "gemini" => Ok(Provider::Gemini),
            "copilot" => Ok(Provider::Copilot),
            other => Err(Error::InvalidService {
                service: other.to_string(),
            }),
        }
    }

    /// Model identifier used when the request does not supply one.
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Deepseek => "deepseek-chat",
            Provider::Gemini => "gemini-pro",
            Provider::Copilot => "gpt-4",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Provider::Deepseek => "deepseek",
            Provider::Gemini => "gemini",
            Provider::Copilot => "copilot",
        }
    }
}

/// OpenAI-style chat completion reply (DeepSeek and Copilot).
#[derive(Debug, Deserialize)]
struct ChatCompletionReply {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Gemini generate-content reply.
#[derive(Debug, Deserialize)]
struct GenerateContentReply {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

/// Issues completion requests against the configured upstream providers.
///
/// The client maintains a single timeout-bounded HTTP client and constructs
/// the provider-appropriate payload per call.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    config: GatewayConfig,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, config })
    }

    /// Forward one prompt to `provider` and extract the generated text.
    ///
    /// On a non-success upstream status the call fails with the upstream
    /// status text; an unparseable reply shape is surfaced as a distinct
    /// malformed-response error rather than an empty string.
    pub async fn complete(&self, provider: Provider, api_key: &str, prompt: &str, model: Option<&str>) -> Result<String> {
        let model = model.unwrap_or_else(|| provider.default_model());
        debug!(provider = provider.name(), model = model, "Dispatching completion request");

        let request = match provider {
            Provider::Deepseek => {
                let url = format!("{}/chat/completions", self.base(provider));
                self.client
                    .post(url)
                    .bearer_auth(api_key)
                    .json(&chat_completion_body(model, prompt))
            }
            Provider::Copilot => {
                let url = format!("{}/v1/chat/completions", self.base(provider));
                self.client
                    .post(url)
                    .bearer_auth(api_key)
                    .json(&chat_completion_body(model, prompt))
            }
            Provider::Gemini => {
                let url = format!("{}/v1beta/models/{}:generateContent", self.base(provider), model);
                self.client.post(url).query(&[("key", api_key)]).json(&json!({
                    "contents": [{
                        "parts": [{ "text": prompt }]
                    }]
                }))
            }
        };

        // Send-level failures never saw an upstream status
        let response = request.send().await.map_err(|e| Error::UpstreamUnreachable { reason: e.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.to_string(),
            });
        }

        match provider {
            Provider::Deepseek | Provider::Copilot => {
                let reply: ChatCompletionReply = response.json().await.map_err(|_| Error::MalformedUpstream {
                    provider: provider.name(),
                })?;
                reply
                    .choices
                    .into_iter()
                    .next()
                    .map(|choice| choice.message.content)
                    .ok_or(Error::MalformedUpstream {
                        provider: provider.name(),
                    })
            }
            Provider::Gemini => {
                let reply: GenerateContentReply = response.json().await.map_err(|_| Error::MalformedUpstream {
                    provider: provider.name(),
                })?;
                reply
                    .candidates
                    .into_iter()
                    .next()
                    .and_then(|candidate| candidate.content.parts.into_iter().next())
                    .map(|part| part.text)
                    .ok_or(Error::MalformedUpstream {
                        provider: provider.name(),
                    })
            }
        }
    }

    fn base(&self, provider: Provider) -> &str {
        let url = match provider {
            Provider::Deepseek => &self.config.deepseek_url,
            Provider::Gemini => &self.config.gemini_url,
            Provider::Copilot => &self.config.openai_url,
        };
        url.as_str().trim_end_matches('/')
    }
}

fn chat_completion_body(model: &str, prompt: &str) -> serde_json::Value {
    json!({
        "model": model,
        "messages": [
            {
                "role": "user",
                "content": prompt
            }
        ]
    })
}
