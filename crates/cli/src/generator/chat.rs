use super::{remove_thinking_trace, AnswerGenerator, MAX_TOKENS, SYSTEM_PROMPT, TEMPERATURE};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use gertaxlaw_client_api_messages::Question;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Generation is slow for reasoning models; this only guards against hung connections.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// Answers through an OpenAI compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct ChatCompletionsGenerator {
    client: Client,
    /// e.g. https://api.openai.com/v1
    base: String,
    api_key: String,
    model: String,
}

impl ChatCompletionsGenerator {
    pub fn new(base: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            bail!("an API key is required for the openai provider (set OPENAI_API_KEY or pass --api-key)");
        }
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base: base.into(),
            api_key,
            model: model.into(),
        })
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: [Msg<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OACompatResp {
    choices: Vec<Choice>,
}
#[derive(Debug, Deserialize)]
struct Choice {
    message: MsgOut,
}
#[derive(Debug, Deserialize)]
struct MsgOut {
    #[serde(default)]
    content: Option<String>,
}
impl OACompatResp {
    fn first_text(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|c| c.message.content)
    }
}

#[async_trait]
impl AnswerGenerator for ChatCompletionsGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn answer(&self, question: &Question) -> Result<String> {
        let url = self.url();
        let req = Req {
            model: &self.model,
            messages: [
                Msg {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Msg {
                    role: "user",
                    content: &question.question,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .with_context(|| format!("POST {url} send failed"))?;
        let status = resp.status();
        let body = resp.text().await.context("read chat completion body")?;
        if !status.is_success() {
            bail!("POST {} -> {}: {}", url, status, body);
        }

        let parsed: OACompatResp = serde_json::from_str(&body).context("parse chat completion response")?;
        let text = parsed
            .first_text()
            .ok_or_else(|| anyhow!("no content for question {}", question.id))?;
        Ok(remove_thinking_trace(&text).to_string())
    }
}
