//! Translation backend collaborator.
//!
//! The pipeline only ever sees [`TranslationBackend`]; [`HttpBackend`] is the
//! production implementation that posts to the configured provider's chat
//! endpoint and maps its response shape back to a [`Translation`].

use serde_json::{json, Value};

use crate::error::{TranslateError, TranslateResult};
use crate::providers::Provider;

/// Token usage reported by the provider for one request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Usage {
    pub total: u64,
    pub input: u64,
    pub output: u64,
}

impl Usage {
    /// Element-wise sum, used when aggregating a batch.
    pub fn add(&mut self, other: &Usage) {
        self.total += other.total;
        self.input += other.input;
        self.output += other.output;
    }
}

/// A successful translation response.
#[derive(Clone, Debug)]
pub struct Translation {
    pub text: String,
    pub usage: Option<Usage>,
}

/// The opaque remote translation operation.
///
/// Implementations may fail independently per request; the dispatcher
/// recovers per-unit failures without aborting sibling units.
pub trait TranslationBackend {
    fn translate(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = TranslateResult<Translation>>;
}

/// System prompt pinning the translation behavior: the model must return the
/// translation and nothing else.
const TRANSLATION_PROMPT: &str =
    "Translate Japanese text into English and text in any other language into Japanese. \
     Return only the translation, with no explanations or extra output.";

const TEMPERATURE: f64 = 0.3;

/// HTTP implementation of [`TranslationBackend`] for the provider catalog.
pub struct HttpBackend {
    client: reqwest::Client,
    provider: Provider,
    api_key: String,
    model: String,
}

impl HttpBackend {
    pub fn new(provider: Provider, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            provider,
            api_key,
            model,
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request(&self, text: &str) -> TranslateResult<Value> {
        let request = match self.provider {
            Provider::OpenAi | Provider::DeepSeek => self
                .client
                .post(self.provider.endpoint())
                .bearer_auth(&self.api_key)
                .json(&json!({
                    "model": self.model,
                    "temperature": TEMPERATURE,
                    "messages": [
                        { "role": "system", "content": TRANSLATION_PROMPT },
                        { "role": "user", "content": text },
                    ],
                })),
            Provider::Claude => self
                .client
                .post(self.provider.endpoint())
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
                .json(&json!({
                    "model": self.model,
                    "max_tokens": 1024,
                    "temperature": TEMPERATURE,
                    "system": TRANSLATION_PROMPT,
                    "messages": [
                        { "role": "user", "content": text },
                    ],
                })),
            Provider::Gemini => self
                .client
                .post(format!(
                    "{}/{}:generateContent?key={}",
                    self.provider.endpoint(),
                    self.model,
                    self.api_key
                ))
                .json(&json!({
                    "systemInstruction": { "parts": [{ "text": TRANSLATION_PROMPT }] },
                    "contents": [{ "parts": [{ "text": text }] }],
                    "generationConfig": { "temperature": TEMPERATURE },
                })),
        };

        let response = request.send().await?;
        let status = response.status();
        let body: Value = response.json().await?;

        if !status.is_success() {
            let detail = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("unknown provider error");
            return Err(TranslateError::RequestFailed(format!(
                "{} returned {}: {}",
                self.provider.id(),
                status,
                detail
            )));
        }

        Ok(body)
    }

    fn extract(&self, body: &Value) -> TranslateResult<Translation> {
        let (text_ptr, usage) = match self.provider {
            Provider::OpenAi | Provider::DeepSeek => (
                "/choices/0/message/content",
                read_usage(body, "/usage/prompt_tokens", "/usage/completion_tokens"),
            ),
            Provider::Claude => (
                "/content/0/text",
                read_usage(body, "/usage/input_tokens", "/usage/output_tokens"),
            ),
            Provider::Gemini => (
                "/candidates/0/content/parts/0/text",
                read_usage(
                    body,
                    "/usageMetadata/promptTokenCount",
                    "/usageMetadata/candidatesTokenCount",
                ),
            ),
        };

        let text = body
            .pointer(text_ptr)
            .and_then(Value::as_str)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                TranslateError::Parse(format!(
                    "no translated text in {} response",
                    self.provider.id()
                ))
            })?;

        Ok(Translation { text, usage })
    }
}

fn read_usage(body: &Value, input_ptr: &str, output_ptr: &str) -> Option<Usage> {
    let input = body.pointer(input_ptr).and_then(Value::as_u64)?;
    let output = body.pointer(output_ptr).and_then(Value::as_u64)?;
    Some(Usage {
        total: input + output,
        input,
        output,
    })
}

impl TranslationBackend for HttpBackend {
    async fn translate(&self, text: &str) -> TranslateResult<Translation> {
        let body = self.request(text).await?;
        self.extract(&body)
    }
}
