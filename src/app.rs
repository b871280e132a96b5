//! 编排层
//!
//! 管理一次运行的生命周期：持有配置和分析流程，
//! 决定是分析单个文件还是启动网页服务。不做具体业务判断。

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{Config, RubricConfig};
use crate::models::{Document, Report};
use crate::presentation::{self, ServerState};
use crate::workflow::{ReviewFlow, ReviewOptions};

/// 应用主结构
pub struct App {
    config: Config,
    flow: ReviewFlow,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config, rubric: RubricConfig) -> Self {
        log_startup(&config, &rubric);

        let flow = ReviewFlow::new(&config, rubric);
        Self { config, flow }
    }

    /// 分析一个本地文件
    pub async fn check_file(&self, path: &Path, options: ReviewOptions) -> Result<Report> {
        let document = Document::load(path)
            .await
            .with_context(|| format!("无法读取试卷: {}", path.display()))?;

        let report = self
            .flow
            .run(document, options)
            .await
            .with_context(|| format!("分析失败: {}", path.display()))?;

        Ok(report)
    }

    /// 启动网页上传服务
    pub async fn serve(self, addr: Option<&str>) -> Result<()> {
        let addr = addr.unwrap_or(&self.config.server_addr).to_string();
        let state = Arc::new(ServerState { flow: self.flow });
        presentation::serve(&addr, state).await
    }
}

fn log_startup(config: &Config, rubric: &RubricConfig) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 试卷评审");
    info!(
        "📋 题目数量: {}-{}，每题 {} 个选项",
        rubric.min_questions, rubric.max_questions, rubric.alternatives_per_question
    );
    info!("🧩 分题策略: {:?}，图片检查: {:?}", rubric.strategy, rubric.visual_check);
    if config.llm_enabled() {
        info!("🤖 LLM 模型: {}", config.llm_model_name);
    } else {
        info!("🤖 未配置 LLM_API_KEY，LLM 审阅不可用");
    }
    info!("{}", "=".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_check_missing_file_reports_path() {
        let app = App::initialize(Config::default(), RubricConfig::default());
        let err = app
            .check_file(Path::new("/nonexistent/prova.docx"), ReviewOptions::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("/nonexistent/prova.docx"));
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_check_unsupported_extension() {
        let app = App::initialize(Config::default(), RubricConfig::default());
        let err = app
            .check_file(Path::new("prova.odt"), ReviewOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::UnsupportedFormat { .. })
        ));
    }
}
