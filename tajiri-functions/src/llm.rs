//! Minimal LLM client for the advisory and intent-classification calls.
//! Model choice and prompt quality are someone else's problem; this is
//! plumbing with two wire formats behind one `complete` call.

use anyhow::{Context, Result, bail};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    OpenAi,
}

impl Provider {
    pub fn from_name(name: &str) -> Result<Provider> {
        match name.to_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "openai" | "openai-compatible" => Ok(Provider::OpenAi),
            other => bail!("unknown llm provider: {other}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmClient {
    provider: Provider,
    model: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(provider: Provider, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        match self.provider {
            Provider::Gemini => self.gemini_complete(system, user).await,
            Provider::OpenAi => self.openai_complete(system, user).await,
        }
    }

    async fn gemini_complete(&self, system: &str, user: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Part {
            text: String,
        }

        #[derive(Serialize)]
        struct Content {
            #[serde(skip_serializing_if = "Option::is_none")]
            role: Option<String>,
            parts: Vec<Part>,
        }

        #[derive(Serialize)]
        struct Req {
            system_instruction: Content,
            contents: Vec<Content>,
        }

        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            content: RespContent,
        }

        #[derive(Deserialize)]
        struct RespContent {
            #[serde(default)]
            parts: Vec<RespPart>,
        }

        #[derive(Deserialize)]
        struct RespPart {
            #[serde(default)]
            text: Option<String>,
        }

        let body = Req {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system.to_string(),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: user.to_string(),
                }],
            }],
        };

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let client = reqwest::Client::new();
        let resp = client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("gemini request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("gemini error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse gemini response")?;
        let Some(candidate) = out.candidates.into_iter().next() else {
            bail!("no response from model");
        };
        let mut s = String::new();
        for p in candidate.content.parts {
            if let Some(t) = p.text {
                s.push_str(&t);
            }
        }
        Ok(s.trim().to_string())
    }

    async fn openai_complete(&self, system: &str, user: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Msg {
            role: String,
            content: String,
        }

        #[derive(Serialize)]
        struct Req {
            model: String,
            messages: Vec<Msg>,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MsgOut,
        }

        #[derive(Deserialize)]
        struct MsgOut {
            content: Option<String>,
        }

        let body = Req {
            model: self.model.clone(),
            messages: vec![
                Msg {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                Msg {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: 0.4,
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::new();
        let resp = client
            .post("https://api.openai.com/v1/chat/completions")
            .headers(headers)
            .json(&body)
            .send()
            .await
            .context("openai request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("openai error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse openai response")?;
        let content = out
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_names() {
        assert_eq!(Provider::from_name("Gemini").unwrap(), Provider::Gemini);
        assert_eq!(Provider::from_name("openai").unwrap(), Provider::OpenAi);
        assert!(Provider::from_name("vertex").is_err());
    }
}
