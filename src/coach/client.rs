use super::error::InferenceError;
use super::gateway::{GatewayFuture, InferenceGateway};
use super::image::CodeImage;
use super::models::GenProfile;
use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Longest slice of an error body kept for display
const ERROR_BODY_PREVIEW_CHARS: usize = 200;

/// Gateway backed by an OpenAI-compatible `/v1/chat/completions` endpoint
/// (lmdeploy's api_server, vLLM, or a hosted provider).
#[derive(Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    stream: bool,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    #[serde(default)]
    content: Option<String>,
}

impl HttpGateway {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, InferenceError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, InferenceError> {
        Self::new(
            config.endpoint.clone(),
            config.model.clone(),
            config.api_key(),
            config.request_timeout(),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn complete(
        &self,
        prompt: &str,
        image: &CodeImage,
        profile: GenProfile,
    ) -> Result<String, InferenceError> {
        let request = build_request(&self.model, prompt, image, profile);

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(
            profile = profile.label(),
            status = status.as_u16(),
            bytes = text.len(),
            "model response received"
        );

        if !status.is_success() {
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body: truncate_str(&text, ERROR_BODY_PREVIEW_CHARS).to_string(),
            });
        }

        extract_content(&text)
    }
}

impl InferenceGateway for HttpGateway {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        image: &'a CodeImage,
        profile: GenProfile,
    ) -> GatewayFuture<'a> {
        Box::pin(self.complete(prompt, image, profile))
    }
}

fn build_request<'a>(
    model: &'a str,
    prompt: &'a str,
    image: &CodeImage,
    profile: GenProfile,
) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![Message {
            role: "user",
            content: vec![
                ContentPart::Text { text: prompt },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image.to_data_url(),
                    },
                },
            ],
        }],
        max_tokens: profile.max_tokens(),
        temperature: profile.temperature(),
        top_p: profile.top_p(),
        stream: false,
    }
}

fn extract_content(body: &str) -> Result<String, InferenceError> {
    let parsed: ChatResponse = serde_json::from_str(body).map_err(|e| {
        InferenceError::Malformed(format!(
            "{} ({})",
            e,
            truncate_str(body, ERROR_BODY_PREVIEW_CHARS)
        ))
    })?;

    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.unwrap_or_default())
        .ok_or_else(|| InferenceError::Malformed("response carried no choices".to_string()))
}

/// Truncate a string for display (Unicode-safe)
pub(crate) fn truncate_str(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}
