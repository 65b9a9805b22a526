use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CompletionRequest, CompletionService};

pub const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API, single user turn.
pub struct AnthropicClient {
    api_key: String,
    model: String,
    client: Client,
    endpoint: String,
}

impl AnthropicClient {
    pub fn new(client: Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            client,
            endpoint: ANTHROPIC_MESSAGES_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(self.api_key.trim()).context("invalid Anthropic API key")?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl CompletionService for AnthropicClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![Message {
                role: "user",
                content: vec![ContentBlock {
                    kind: "text",
                    text: &request.prompt,
                }],
            }],
        };

        log::debug!(
            "Requesting completion from {} ({} prompt chars, max {} tokens)",
            self.model,
            request.prompt.len(),
            request.max_tokens
        );

        let resp = self
            .client
            .post(&self.endpoint)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .context("failed to call Anthropic messages API")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            bail!("Anthropic returned {}: {}", status, text);
        }

        let parsed: MessagesResponse = resp
            .json()
            .await
            .context("failed to parse Anthropic response")?;
        if let Some(usage) = &parsed.usage {
            log::debug!(
                "Completion used {} input / {} output tokens",
                usage.input_tokens,
                usage.output_tokens
            );
        }
        response_text(parsed)
    }
}

fn response_text(parsed: MessagesResponse) -> Result<String> {
    let answer = parsed
        .content
        .into_iter()
        .filter_map(|block| match block {
            ResponseBlock::Text { text } => Some(text),
            ResponseBlock::Other => None,
        })
        .collect::<Vec<_>>()
        .join("\n");
    if answer.trim().is_empty() {
        bail!("Anthropic response missing text content");
    }
    Ok(answer)
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Serialize)]
struct ContentBlock<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = MessagesRequest {
            model: "claude-sonnet-4-20250514",
            max_tokens: 500,
            temperature: None,
            messages: vec![Message {
                role: "user",
                content: vec![ContentBlock {
                    kind: "text",
                    text: "Summarize NVDA",
                }],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["max_tokens"], 500);
        assert_eq!(json["messages"][0]["content"][0]["type"], "text");
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_response_text_joins_text_blocks() {
        let parsed: MessagesResponse = serde_json::from_str(
            r#"{"content": [
                {"type": "text", "text": "Bullish."},
                {"type": "tool_use", "id": "x", "name": "y", "input": {}},
                {"type": "text", "text": "High confidence."}
            ], "usage": {"input_tokens": 10, "output_tokens": 4}}"#,
        )
        .unwrap();
        assert_eq!(response_text(parsed).unwrap(), "Bullish.\nHigh confidence.");
    }

    #[test]
    fn test_empty_response_is_error() {
        let parsed: MessagesResponse = serde_json::from_str(r#"{"content": []}"#).unwrap();
        assert!(response_text(parsed).is_err());
    }
}
