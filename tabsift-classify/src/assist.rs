//! AI Assist capability: an optional external collaborator that suggests a
//! dataset kind and column mappings when deterministic matching is not
//! confident enough.
//!
//! Modeled as a trait so the orchestrator's degrade logic stays testable
//! without a live network. The bundled implementation talks to an
//! OpenAI-compatible chat-completions endpoint and demands strict JSON.

use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::{Deserialize, Serialize};

use tabsift_core::catalog::{CANDIDATE_KINDS, catalog_for};

/// What the collaborator gets: headers plus a small row sample.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistRequest {
    pub file_name: String,
    pub headers: Vec<String>,
    pub sample_rows: Vec<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_context: Option<String>,
}

/// One suggested header binding. Unknown fields and wild confidences are
/// sanitized by the orchestrator, not trusted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistMapping {
    pub original_column: String,
    pub standard_field: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// Suggested classification for one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistResponse {
    pub file_type: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub column_mappings: Vec<AssistMapping>,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub business_insights: Option<String>,
}

/// The capability seam. Failures are returned as errors and recovered by
/// the orchestrator's rule-based fallback; they never abort a file.
pub trait AssistProvider {
    fn suggest(&self, request: &AssistRequest) -> Result<AssistResponse>;
}

/// Chat-completions-backed assist client.
#[derive(Debug, Clone)]
pub struct LlmAssist {
    base_url: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl LlmAssist {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            timeout,
        }
    }
}

impl AssistProvider for LlmAssist {
    fn suggest(&self, request: &AssistRequest) -> Result<AssistResponse> {
        // Callers are synchronous; when we're already inside a runtime,
        // creating a nested one and calling block_on would panic.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            tokio::task::block_in_place(|| handle.block_on(self.suggest_async(request)))
        } else {
            let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
            rt.block_on(self.suggest_async(request))
        }
    }
}

impl LlmAssist {
    async fn suggest_async(&self, request: &AssistRequest) -> Result<AssistResponse> {
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
                    content: system_prompt(),
                },
                Msg {
                    role: "user".to_string(),
                    content: serde_json::to_string_pretty(request)
                        .context("serialize assist request")?,
                },
            ],
            temperature: 0.1,
        };

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("build http client")?;
        let resp = client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("assist request")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("assist error: {status} {text}");
        }

        let out: Resp = resp.json().await.context("parse assist response")?;
        let content = out
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        parse_assist_payload(&content)
    }
}

static CODE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").unwrap());

/// Parse the model's reply, tolerating a code fence around the JSON.
pub fn parse_assist_payload(content: &str) -> Result<AssistResponse> {
    let trimmed = content.trim();
    let json = CODE_FENCE_RE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed);
    serde_json::from_str(json).context("malformed assist payload")
}

fn system_prompt() -> String {
    let mut prompt = String::from(
        "You classify uploaded spreadsheets. Reply with ONE JSON object, no prose, shaped as \
         {\"fileType\": ..., \"confidence\": 0..1, \"columnMappings\": [{\"originalColumn\", \
         \"standardField\", \"confidence\", \"dataType\"}], \"issues\": []}.\n\
         Valid fileType values: deals, transactions, budget, generic.\n\
         Valid standardField values per fileType (use \"ignore\" for unusable columns):\n",
    );
    for kind in CANDIDATE_KINDS {
        let fields: Vec<&str> = catalog_for(kind).iter().map(|f| f.name).collect();
        prompt.push_str(&format!("- {}: {}\n", kind, fields.join(", ")));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_payload() {
        let payload = r#"{"fileType":"transactions","confidence":0.85,"columnMappings":[
            {"originalColumn":"Datum","standardField":"date","confidence":0.9,"dataType":"date"}
        ]}"#;
        let resp = parse_assist_payload(payload).unwrap();
        assert_eq!(resp.file_type, "transactions");
        assert_eq!(resp.column_mappings.len(), 1);
        assert!(resp.issues.is_empty());
    }

    #[test]
    fn test_parse_fenced_payload() {
        let payload = "Here you go:\n```json\n{\"fileType\":\"budget\",\"confidence\":0.7}\n```";
        let resp = parse_assist_payload(payload).unwrap();
        assert_eq!(resp.file_type, "budget");
        assert!(resp.column_mappings.is_empty());
    }

    #[test]
    fn test_malformed_payload_is_error() {
        assert!(parse_assist_payload("the file looks like a budget").is_err());
        assert!(parse_assist_payload("{\"confidence\": 1}").is_err());
    }

    #[test]
    fn test_system_prompt_lists_fields() {
        let prompt = system_prompt();
        assert!(prompt.contains("deal_name"));
        assert!(prompt.contains("budgeted_amount"));
        assert!(prompt.contains("transactions"));
    }
}
