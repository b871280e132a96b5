use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AppResult, ConfigError};

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// Web 服务监听地址
    pub server_addr: String,
    /// 评分规则文件（可选，TOML）
    pub rubric_file: Option<String>,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 语法检查配置 ---
    pub languagetool_url: String,
    pub languagetool_language: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose_logging: false,
            server_addr: "127.0.0.1:8080".to_string(),
            rubric_file: None,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            languagetool_url: "https://api.languagetool.org/v2/check".to_string(),
            languagetool_language: "pt-BR".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            server_addr: std::env::var("SERVER_ADDR").unwrap_or(default.server_addr),
            rubric_file: std::env::var("RUBRIC_FILE").ok().or(default.rubric_file),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            languagetool_url: std::env::var("LANGUAGETOOL_URL").unwrap_or(default.languagetool_url),
            languagetool_language: std::env::var("LANGUAGETOOL_LANGUAGE").unwrap_or(default.languagetool_language),
        }
    }

    /// 是否配置了 LLM 凭证
    pub fn llm_enabled(&self) -> bool {
        !self.llm_api_key.trim().is_empty()
    }

    /// 加载评分规则：配置了文件则读取文件，否则使用默认规则
    pub fn load_rubric(&self) -> AppResult<RubricConfig> {
        match &self.rubric_file {
            Some(path) => Ok(RubricConfig::from_file(Path::new(path))?),
            None => Ok(RubricConfig::default()),
        }
    }
}

/// "语境化"判断的长度阈值
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextThreshold {
    /// 至少 N 个词
    Words(usize),
    /// 至少 N 个字符且包含空格
    Chars(usize),
}

/// 图片引用检查的比较范围
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualCheck {
    /// 与本题是否检测到图片比较
    PerQuestion,
    /// 与整份文档是否检测到图片比较
    WholeDocument,
}

/// 分题策略
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentStrategy {
    /// 逐行扫描，题号与选项逐行识别
    LineScan,
    /// 先按题号切块，再在块内用正则提取选项
    Span,
}

/// 评分规则
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RubricConfig {
    pub min_questions: usize,
    pub max_questions: usize,
    pub alternatives_per_question: usize,
    pub context_threshold: ContextThreshold,
    pub visual_check: VisualCheck,
    pub strategy: SegmentStrategy,
    /// 为没有选项而被丢弃的题块输出意见
    pub strict_segmentation: bool,
}

impl Default for RubricConfig {
    fn default() -> Self {
        Self {
            min_questions: 15,
            max_questions: 20,
            alternatives_per_question: 5,
            context_threshold: ContextThreshold::Words(10),
            visual_check: VisualCheck::PerQuestion,
            strategy: SegmentStrategy::LineScan,
            strict_segmentation: false,
        }
    }
}

impl RubricConfig {
    /// 从 TOML 字符串解析，缺省字段使用默认值
    pub fn from_toml_str(content: &str, path: &str) -> Result<Self, ConfigError> {
        let rubric: RubricConfig =
            toml::from_str(content).map_err(|source| ConfigError::RubricParseFailed {
                path: path.to_string(),
                source,
            })?;
        rubric.validate()?;
        Ok(rubric)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::RubricReadFailed {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_questions > self.max_questions {
            return Err(ConfigError::InvalidRubric(format!(
                "min_questions ({}) 大于 max_questions ({})",
                self.min_questions, self.max_questions
            )));
        }
        if self.alternatives_per_question == 0 || self.alternatives_per_question > 5 {
            return Err(ConfigError::InvalidRubric(format!(
                "alternatives_per_question 必须在 1..=5 之间，当前为 {}",
                self.alternatives_per_question
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rubric() {
        let rubric = RubricConfig::default();
        assert_eq!((rubric.min_questions, rubric.max_questions), (15, 20));
        assert_eq!(rubric.context_threshold, ContextThreshold::Words(10));
        assert_eq!(rubric.visual_check, VisualCheck::PerQuestion);
    }

    #[test]
    fn test_rubric_from_partial_toml() {
        let content = r#"
            max_questions = 25
            visual_check = "whole-document"
            strategy = "span"
            context_threshold = { chars = 50 }
        "#;
        let rubric = RubricConfig::from_toml_str(content, "rubric.toml").unwrap();
        assert_eq!(rubric.min_questions, 15);
        assert_eq!(rubric.max_questions, 25);
        assert_eq!(rubric.visual_check, VisualCheck::WholeDocument);
        assert_eq!(rubric.strategy, SegmentStrategy::Span);
        assert_eq!(rubric.context_threshold, ContextThreshold::Chars(50));
    }

    #[test]
    fn test_rubric_rejects_inverted_range() {
        let err = RubricConfig::from_toml_str("min_questions = 30", "r.toml").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRubric(_)));
    }

    #[test]
    fn test_rubric_parse_error_keeps_path() {
        let err = RubricConfig::from_toml_str("min_questions = \"x\"", "r.toml").unwrap_err();
        assert!(err.to_string().contains("r.toml"));
    }

    #[test]
    fn test_llm_disabled_without_key() {
        assert!(!Config::default().llm_enabled());
    }
}
