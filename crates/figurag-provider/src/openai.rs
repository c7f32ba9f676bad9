//! Client for OpenAI-compatible chat and embedding endpoints (OpenAI, Zhipu).
//!
//! Calls are blocking with a fixed timeout; every failure is mapped onto the
//! provider variants of `figurag_core::Error` so the engine can fall back.

use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use figurag_core::config::{ProviderKind, ProviderSettings};
use figurag_core::error::{Error, Result};
use figurag_core::traits::{Completer, Embedder};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const ZHIPUAI_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4";

/// Per-kind defaults: (base url, chat model, embedding model, key variable).
pub fn defaults_for(kind: ProviderKind) -> Option<(&'static str, &'static str, &'static str, &'static str)> {
    match kind {
        ProviderKind::OpenAi => Some((OPENAI_BASE_URL, "gpt-3.5-turbo", "text-embedding-ada-002", "OPENAI_API_KEY")),
        ProviderKind::ZhipuAi => Some((ZHIPUAI_BASE_URL, "glm-4-flash", "embedding-2", "ZHIPUAI_API_KEY")),
        ProviderKind::None | ProviderKind::Fake => None,
    }
}

fn known_dim(model: &str) -> usize {
    match model {
        "text-embedding-ada-002" | "text-embedding-3-small" => 1536,
        "text-embedding-3-large" => 3072,
        "embedding-2" => 1024,
        "embedding-3" => 2048,
        _ => 0,
    }
}

#[derive(Clone)]
pub struct OpenAiCompatClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    embedding_model: String,
    embedder_id: String,
    max_tokens: u32,
    temperature: f32,
    timeout_secs: u64,
}

impl OpenAiCompatClient {
    pub fn new(settings: &ProviderSettings, api_key: String) -> Result<Self> {
        let (base, chat, embed, _) = defaults_for(settings.kind).ok_or_else(|| {
            Error::InvalidConfig(format!("provider kind {:?} has no HTTP endpoint", settings.kind))
        })?;
        let base_url = settings.base_url.clone().unwrap_or_else(|| base.to_string());
        let chat_model = settings.chat_model.clone().unwrap_or_else(|| chat.to_string());
        let embedding_model = settings.embedding_model.clone().unwrap_or_else(|| embed.to_string());
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::ProviderUnavailable(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            embedder_id: format!("remote:{embedding_model}"),
            chat_model,
            embedding_model,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout_secs: settings.timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "Provider request");
        let res = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .map_err(|e| self.map_transport(e))?;
        let status = res.status();
        if !status.is_success() {
            let text = res.text().unwrap_or_default();
            let snippet: String = text.chars().take(200).collect();
            return Err(Error::ProviderUnavailable(format!("HTTP {status}: {snippet}")));
        }
        res.json::<Value>().map_err(|e| {
            if e.is_timeout() {
                Error::ProviderTimeout(self.timeout_secs)
            } else {
                Error::MalformedResponse(e.to_string())
            }
        })
    }

    fn map_transport(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::ProviderTimeout(self.timeout_secs)
        } else {
            Error::ProviderUnavailable(e.to_string())
        }
    }
}

impl Completer for OpenAiCompatClient {
    fn model(&self) -> &str { &self.chat_model }

    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.chat_model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "stream": false,
        });
        let payload = self.post("/chat/completions", &body)?;
        parse_chat_response(&payload)
    }
}

impl Embedder for OpenAiCompatClient {
    fn id(&self) -> &str { &self.embedder_id }
    fn dim(&self) -> usize { known_dim(&self.embedding_model) }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let body = json!({ "model": self.embedding_model, "input": texts });
        let payload = self.post("/embeddings", &body)?;
        parse_embedding_response(&payload, texts.len())
    }
}

pub fn parse_chat_response(payload: &Value) -> Result<String> {
    payload["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::MalformedResponse("missing choices[0].message.content".into()))
}

/// Reads `data[*].embedding`, ordered by `index` when present.
pub fn parse_embedding_response(payload: &Value, expected: usize) -> Result<Vec<Vec<f32>>> {
    let data = payload["data"]
        .as_array()
        .ok_or_else(|| Error::MalformedResponse("missing data array".into()))?;
    let mut rows: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());
    for (pos, item) in data.iter().enumerate() {
        let values = item["embedding"]
            .as_array()
            .ok_or_else(|| Error::MalformedResponse(format!("data[{pos}] has no embedding")))?;
        let vector: Vec<f32> = values.iter().filter_map(|v| v.as_f64().map(|f| f as f32)).collect();
        if vector.len() != values.len() || vector.is_empty() {
            return Err(Error::MalformedResponse(format!("data[{pos}] embedding is not numeric")));
        }
        let index = item["index"].as_u64().map_or(pos, |i| i as usize);
        rows.push((index, vector));
    }
    if rows.len() != expected {
        return Err(Error::MalformedResponse(format!("expected {expected} embeddings, got {}", rows.len())));
    }
    rows.sort_by_key(|(i, _)| *i);
    Ok(rows.into_iter().map(|(_, v)| v).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_content_is_extracted() {
        let payload = json!({"choices": [{"message": {"role": "assistant", "content": "推荐 FigureYa59volcanoV2"}}]});
        assert_eq!(parse_chat_response(&payload).unwrap(), "推荐 FigureYa59volcanoV2");
    }

    #[test]
    fn chat_without_choices_is_malformed() {
        let payload = json!({"error": {"message": "quota"}});
        assert!(matches!(parse_chat_response(&payload), Err(Error::MalformedResponse(_))));
    }

    #[test]
    fn embeddings_follow_index_order() {
        let payload = json!({"data": [
            {"index": 1, "embedding": [0.0, 1.0]},
            {"index": 0, "embedding": [1.0, 0.0]},
        ]});
        let rows = parse_embedding_response(&payload, 2).unwrap();
        assert_eq!(rows, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn embedding_count_mismatch_is_malformed() {
        let payload = json!({"data": [{"embedding": [0.5]}]});
        assert!(parse_embedding_response(&payload, 2).is_err());
        let bad = json!({"data": [{"embedding": ["x"]}]});
        assert!(parse_embedding_response(&bad, 1).is_err());
    }

    #[test]
    fn defaults_per_provider() {
        assert_eq!(defaults_for(ProviderKind::ZhipuAi).map(|d| d.1), Some("glm-4-flash"));
        assert_eq!(defaults_for(ProviderKind::OpenAi).map(|d| d.3), Some("OPENAI_API_KEY"));
        assert!(defaults_for(ProviderKind::Fake).is_none());
    }
}
