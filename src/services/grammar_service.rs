//! 语法检查服务 - 业务能力层
//!
//! 调用 LanguageTool 的 `/v2/check` 接口，只负责"检查一段题干"

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ReviewerError;
use crate::services::reviewer::StatementReviewer;

/// LanguageTool 响应
#[derive(Debug, Deserialize)]
pub struct CheckResponse {
    #[serde(default)]
    pub matches: Vec<GrammarMatch>,
}

#[derive(Debug, Deserialize)]
pub struct GrammarMatch {
    pub message: String,
    #[serde(default)]
    pub replacements: Vec<Replacement>,
    pub context: MatchContext,
}

#[derive(Debug, Deserialize)]
pub struct Replacement {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct MatchContext {
    pub text: String,
    pub offset: usize,
    pub length: usize,
}

impl GrammarMatch {
    /// 问题在上下文中对应的原文片段（按字符截取）
    pub fn offending_text(&self) -> String {
        self.context
            .text
            .chars()
            .skip(self.context.offset)
            .take(self.context.length)
            .collect()
    }

    /// 渲染为一条可读描述
    pub fn describe(&self) -> String {
        let suggestion = self
            .replacements
            .first()
            .map(|r| r.value.as_str())
            .unwrap_or("sem sugestão");
        format!(
            "{} (encontrado: \"{}\", sugerido: \"{}\")",
            self.message,
            self.offending_text(),
            suggestion
        )
    }
}

/// 语法检查服务
pub struct GrammarService {
    client: Client,
    endpoint: String,
    language: String,
}

impl GrammarService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.languagetool_url.clone(),
            language: config.languagetool_language.clone(),
        }
    }

    pub async fn check(&self, text: &str) -> Result<CheckResponse, ReviewerError> {
        debug!("调用语法检查 API: {} ({} 字符)", self.endpoint, text.chars().count());

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("language", self.language.as_str()), ("text", text)])
            .send()
            .await
            .map_err(|e| ReviewerError::request_failed(&self.endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("语法检查 API 返回错误状态: {}", status);
            return Err(ReviewerError::BadResponse {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        response
            .json::<CheckResponse>()
            .await
            .map_err(|e| ReviewerError::request_failed(&self.endpoint, e))
    }
}

#[async_trait]
impl StatementReviewer for GrammarService {
    async fn review(&self, statement: &str) -> Result<Vec<String>, ReviewerError> {
        let response = self.check(statement).await?;
        Ok(response.matches.iter().map(GrammarMatch::describe).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "software": {"name": "LanguageTool"},
        "matches": [
            {
                "message": "Possível erro de concordância.",
                "replacements": [{"value": "as casas"}, {"value": "a casa"}],
                "context": {"text": "Observe os casas azuis.", "offset": 8, "length": 8}
            },
            {
                "message": "Palavra desconhecida.",
                "replacements": [],
                "context": {"text": "Ação xyzw aqui", "offset": 5, "length": 4}
            }
        ]
    }"#;

    #[test]
    fn test_describe_matches() {
        let response: CheckResponse = serde_json::from_str(SAMPLE).unwrap();
        let described: Vec<String> = response.matches.iter().map(GrammarMatch::describe).collect();
        assert_eq!(
            described,
            vec![
                "Possível erro de concordância. (encontrado: \"os casas\", sugerido: \"as casas\")",
                "Palavra desconhecida. (encontrado: \"xyzw\", sugerido: \"sem sugestão\")",
            ]
        );
    }

    #[test]
    fn test_empty_matches() {
        let response: CheckResponse = serde_json::from_str("{}").unwrap();
        assert!(response.matches.is_empty());
    }

    /// 需要网络，手动运行：cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn test_languagetool_connectivity() {
        let service = GrammarService::new(&Config::default());
        let issues = service.review("Eu vai para escola amanhã.").await.unwrap();
        println!("{:#?}", issues);
    }
}
